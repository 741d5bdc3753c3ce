//! Reference model of the lock.
//!
//! A deliberately naive re-statement of the lock's rules, used as the oracle
//! in model-based tests. Time is plain milliseconds since start and the hold
//! is a single optional deadline; there are no actions, only the resulting
//! states.

use std::time::Duration;

use arbitrary::{Arbitrary, Unstructured};
use lockgate_core::{AccessState, Environment, IndicatorState, LockStatus};

use crate::sim_env::SimEnv;

/// How a simulated client builds its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum ResponseKind {
    /// Latest issued token followed by the secret
    Correct,
    /// Token issued before the latest one, followed by the secret
    Stale,
    /// Correct response with its last byte altered
    Wrong {
        /// XOR mask for the last byte (forced non-zero)
        flip: u8,
    },
    /// Payload longer than the bound
    Oversized {
        /// Bytes beyond the bound
        extra: u8,
    },
    /// No payload at all
    Empty,
}

/// Operation applied to both the model and the real lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Issue a challenge
    Issue,
    /// Submit a response
    Respond(ResponseKind),
    /// Let virtual time pass
    AdvanceTime {
        /// Milliseconds to advance
        millis: u16,
    },
}

/// Observable result of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Challenge issued with this token
    Issued(String),
    /// Entropy unavailable
    Unavailable,
    /// Response accepted
    Accepted,
    /// Response rejected
    Rejected,
    /// Response malformed, never compared
    Malformed,
    /// Time advanced
    Advanced,
}

/// Decode an operation sequence from raw bytes (fuzzer input, regression
/// corpus).
pub fn decode_operations(data: &[u8]) -> arbitrary::Result<Vec<Operation>> {
    let mut input = Unstructured::new(data);
    let operations = input.arbitrary_iter()?.collect::<arbitrary::Result<Vec<_>>>()?;
    Ok(operations)
}

/// Build the payload a simulated client sends.
///
/// `latest` and `previous` are the two most recently issued tokens as the
/// client saw them.
pub fn build_payload(
    kind: ResponseKind,
    latest: Option<&str>,
    previous: Option<&str>,
    secret: &[u8],
    max_len: usize,
) -> Vec<u8> {
    let with_secret = |token: Option<&str>| [token.unwrap_or("0").as_bytes(), secret].concat();

    match kind {
        ResponseKind::Correct => with_secret(latest),
        ResponseKind::Stale => with_secret(previous),
        ResponseKind::Wrong { flip } => {
            let mut payload = with_secret(latest);
            if let Some(last) = payload.last_mut() {
                *last ^= flip | 1;
            }
            payload
        },
        ResponseKind::Oversized { extra } => vec![b'9'; max_len + usize::from(extra)],
        ResponseKind::Empty => Vec::new(),
    }
}

/// Reference lock.
pub struct ModelLock {
    secret: Vec<u8>,
    hold: Duration,
    max_len: usize,
    entropy: SimEnv,
    now: Duration,
    outstanding: Option<String>,
    latest: Option<String>,
    previous: Option<String>,
    access: AccessState,
    indicator: IndicatorState,
    hold_until: Option<Duration>,
}

impl ModelLock {
    /// Model drawing its challenges from a `SimEnv` seeded with `seed`.
    pub fn new(secret: &[u8], hold: Duration, max_len: usize, seed: u64) -> Self {
        Self {
            secret: secret.to_vec(),
            hold,
            max_len,
            entropy: SimEnv::with_seed(seed),
            now: Duration::ZERO,
            outstanding: None,
            latest: None,
            previous: None,
            access: AccessState::Locked,
            indicator: IndicatorState::Locked,
            hold_until: None,
        }
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: Operation) -> OperationResult {
        match op {
            Operation::Issue => self.issue(),
            Operation::Respond(kind) => {
                let payload = build_payload(
                    kind,
                    self.latest.as_deref(),
                    self.previous.as_deref(),
                    &self.secret,
                    self.max_len,
                );
                self.respond(&payload)
            },
            Operation::AdvanceTime { millis } => {
                self.now += Duration::from_millis(u64::from(millis));
                self.expire_hold();
                OperationResult::Advanced
            },
        }
    }

    /// Current states.
    pub fn status(&self) -> LockStatus {
        LockStatus { access: self.access, indicator: self.indicator }
    }

    /// Whether a hold is running.
    pub fn is_holding(&self) -> bool {
        self.hold_until.is_some()
    }

    fn issue(&mut self) -> OperationResult {
        match self.entropy.random_u32() {
            Ok(value) => {
                let token = value.to_string();
                self.outstanding = Some(token.clone());
                self.previous = self.latest.replace(token.clone());
                OperationResult::Issued(token)
            },
            Err(_) => {
                self.outstanding = None;
                OperationResult::Unavailable
            },
        }
    }

    fn respond(&mut self, payload: &[u8]) -> OperationResult {
        if payload.is_empty() || payload.len() >= self.max_len {
            return OperationResult::Malformed;
        }

        self.expire_hold();
        let outstanding = self.outstanding.take();
        if self.hold_until.is_some() {
            return OperationResult::Rejected;
        }

        let expected = outstanding.map(|token| [token.as_bytes(), self.secret.as_slice()].concat());
        if expected.as_deref() == Some(payload) {
            self.access = AccessState::Unlocked;
            self.indicator = IndicatorState::Unlocked;
            OperationResult::Accepted
        } else {
            self.indicator = IndicatorState::Rejected;
            self.hold_until = Some(self.now + self.hold);
            OperationResult::Rejected
        }
    }

    fn expire_hold(&mut self) {
        if self.hold_until.is_some_and(|until| self.now >= until) {
            self.hold_until = None;
            self.access = AccessState::Locked;
            self.indicator = IndicatorState::Locked;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"CORRECTKEY";
    const HOLD: Duration = Duration::from_millis(4000);

    fn model() -> ModelLock {
        ModelLock::new(SECRET, HOLD, 64, 3)
    }

    #[test]
    fn correct_then_replay() {
        let mut model = model();
        assert!(matches!(model.apply(Operation::Issue), OperationResult::Issued(_)));
        assert_eq!(model.apply(Operation::Respond(ResponseKind::Correct)), OperationResult::Accepted);
        assert_eq!(model.apply(Operation::Respond(ResponseKind::Correct)), OperationResult::Rejected);
    }

    #[test]
    fn hold_blocks_until_expiry() {
        let mut model = model();
        model.apply(Operation::Respond(ResponseKind::Wrong { flip: 0 }));
        assert!(model.is_holding());

        model.apply(Operation::AdvanceTime { millis: 3999 });
        assert_eq!(model.status().indicator, IndicatorState::Rejected);

        model.apply(Operation::AdvanceTime { millis: 1 });
        assert_eq!(model.status(), LockStatus {
            access: AccessState::Locked,
            indicator: IndicatorState::Locked,
        });
    }

    #[test]
    fn wrong_payload_always_differs() {
        for flip in [0u8, 1, 0xfe, 0xff] {
            let payload = build_payload(ResponseKind::Wrong { flip }, Some("12"), None, SECRET, 64);
            assert_ne!(payload, b"12CORRECTKEY");
        }
    }

    #[test]
    fn oversized_payload_reaches_bound() {
        let payload = build_payload(ResponseKind::Oversized { extra: 0 }, None, None, SECRET, 64);
        assert_eq!(payload.len(), 64);
    }

    #[test]
    fn decode_is_deterministic() {
        let data = [3u8, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7, 9];
        assert_eq!(decode_operations(&data).unwrap(), decode_operations(&data).unwrap());
    }
}
