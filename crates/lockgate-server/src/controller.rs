//! Controller actor.
//!
//! One tokio task owns the [`Lock`] and is the only code that touches it.
//! Request handlers hold a [`ControllerHandle`] and send commands through a
//! bounded mailbox, so issuance and verification from concurrent peers are
//! serialized and a response can never be checked against a challenge that
//! was swapped underneath it.
//!
//! # Hold
//!
//! A rejected verification is answered immediately, then the actor sleeps
//! out the hold before it reads its mailbox again. Every request that arrives
//! meanwhile (including challenge issuance) waits in the mailbox, and nothing
//! else can write the indicator until the hold ends. Other deadlines, such as
//! the optional unlock timeout, are awaited alongside the mailbox.

use std::time::Instant;

use lockgate_core::{
    Challenge, Environment, IndicatorSink, Lock, LockAction, LockError, LockStatus, VerifyOutcome,
};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, trace};

/// Commands queued beyond this many block their senders.
pub const MAILBOX_CAPACITY: usize = 64;

/// Errors returned through a [`ControllerHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The lock refused the operation.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// The controller task has stopped.
    #[error("lock controller is not running")]
    Closed,
}

enum Command {
    Issue { reply: oneshot::Sender<Result<Challenge, LockError>> },
    Verify { payload: Vec<u8>, reply: oneshot::Sender<Result<VerifyOutcome, LockError>> },
    Status { reply: oneshot::Sender<LockStatus> },
}

/// Handle to a running [`Controller`].
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<Command>,
}

impl ControllerHandle {
    /// Issue a fresh challenge.
    pub async fn issue_challenge(&self) -> Result<Challenge, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Issue { reply }).await?;
        Ok(rx.await.map_err(|_| ControllerError::Closed)??)
    }

    /// Verify a claimed response.
    ///
    /// A rejection is returned as soon as it is decided; the hold that
    /// follows delays the next command, not this one.
    pub async fn verify(&self, payload: Vec<u8>) -> Result<VerifyOutcome, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Verify { payload, reply }).await?;
        Ok(rx.await.map_err(|_| ControllerError::Closed)??)
    }

    /// Snapshot of the access and indicator states.
    pub async fn status(&self) -> Result<LockStatus, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Status { reply }).await?;
        rx.await.map_err(|_| ControllerError::Closed)
    }

    async fn send(&self, command: Command) -> Result<(), ControllerError> {
        self.tx.send(command).await.map_err(|_| ControllerError::Closed)
    }
}

enum Wake {
    Command(Option<Command>),
    Deadline,
}

/// Actor that owns the lock and executes its actions.
pub struct Controller<E, S> {
    lock: Lock,
    env: E,
    sink: S,
    rx: mpsc::Receiver<Command>,
    deadline: Option<Instant>,
}

impl<E: Environment, S: IndicatorSink> Controller<E, S> {
    /// Create a controller and the handle that feeds it.
    pub fn new(lock: Lock, env: E, sink: S) -> (Self, ControllerHandle) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        (Self { lock, env, sink, rx, deadline: None }, ControllerHandle { tx })
    }

    /// Spawn the controller on the current tokio runtime.
    pub fn spawn(lock: Lock, env: E, sink: S) -> (ControllerHandle, JoinHandle<()>) {
        let (controller, handle) = Self::new(lock, env, sink);
        (handle, tokio::spawn(controller.run()))
    }

    /// Run until every handle has been dropped.
    pub async fn run(mut self) {
        let startup = self.lock.startup();
        self.execute(startup);
        let config = self.lock.config();
        info!(
            hold = ?config.hold_duration,
            unlock_timeout = ?config.unlock_timeout,
            max_response_len = config.max_response_len,
            "lock controller running"
        );

        loop {
            if let Some(until) = self.lock.hold_until() {
                // Mailbox stays unread for the whole hold.
                let remaining = until.saturating_duration_since(self.env.now());
                self.env.sleep(remaining).await;
                self.fire_deadline();
                continue;
            }

            let wake = match self.deadline {
                Some(at) => {
                    let remaining = at.saturating_duration_since(self.env.now());
                    tokio::select! {
                        command = self.rx.recv() => Wake::Command(command),
                        () = self.env.sleep(remaining) => Wake::Deadline,
                    }
                },
                None => Wake::Command(self.rx.recv().await),
            };

            match wake {
                Wake::Deadline => self.fire_deadline(),
                Wake::Command(Some(command)) => self.handle(command),
                Wake::Command(None) => break,
            }
        }

        debug!("all handles dropped, lock controller stopping");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Issue { reply } => {
                let result = self.lock.issue_challenge(&self.env);
                let _ = reply.send(result);
            },
            Command::Verify { payload, reply } => {
                let now = self.env.now();
                let result = self.lock.verify(&payload, now).map(|(outcome, actions)| {
                    self.execute(actions);
                    outcome
                });
                if let Err(error) = &result {
                    debug!(%error, "malformed response refused");
                }
                let _ = reply.send(result);
            },
            Command::Status { reply } => {
                let _ = reply.send(self.lock.status());
            },
        }
    }

    fn fire_deadline(&mut self) {
        let now = self.env.now();
        if self.deadline.is_some_and(|at| now >= at) {
            self.deadline = None;
        }
        let actions = self.lock.tick(now);
        self.execute(actions);
    }

    fn execute(&mut self, actions: Vec<LockAction>) {
        for action in actions {
            match action {
                LockAction::SetIndicator(state) => {
                    if let Err(error) = self.sink.apply(state.color()) {
                        error!(%error, ?state, "indicator write failed");
                    }
                },
                LockAction::ScheduleTick { at } => {
                    trace!(?at, "tick scheduled");
                    self.deadline = Some(at);
                },
            }
        }
    }
}
