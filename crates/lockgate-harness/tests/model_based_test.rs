//! Model-based property tests.
//!
//! Random operation sequences are applied to both the reference model and the
//! real lock. Results and observable states must agree after every step.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!       ModelLock      RealWorld       Compare
//!      (reference)   (Lock + SimEnv)   Results
//! ```
//!
//! Both sides draw challenges from a `SimEnv` built from the same seed, so
//! they issue identical tokens.

use std::time::Duration;

use lockgate_core::{
    AccessState, Environment, IndicatorState, Lock, LockConfig, LockError, LockStatus, Secret,
};
use lockgate_harness::{
    ModelLock, Operation, OperationResult, ResponseKind, SimEnv,
    model::{build_payload, decode_operations},
};
use proptest::prelude::*;

const SECRET: &[u8] = b"CORRECTKEY";
const HOLD: Duration = Duration::from_millis(4000);
const MAX_LEN: usize = 64;

/// Real lock wrapper that mirrors `ModelLock`'s interface.
struct RealWorld {
    lock: Lock,
    env: SimEnv,
    latest: Option<String>,
    previous: Option<String>,
}

impl RealWorld {
    fn new(seed: u64) -> Self {
        let lock = Lock::new(LockConfig::new(Secret::new(SECRET).unwrap())).unwrap();
        Self { lock, env: SimEnv::with_seed(seed), latest: None, previous: None }
    }

    fn apply(&mut self, op: Operation) -> OperationResult {
        match op {
            Operation::Issue => match self.lock.issue_challenge(&self.env) {
                Ok(challenge) => {
                    let token = challenge.into_string();
                    self.previous = self.latest.replace(token.clone());
                    OperationResult::Issued(token)
                },
                Err(_) => OperationResult::Unavailable,
            },
            Operation::Respond(kind) => {
                let payload = build_payload(
                    kind,
                    self.latest.as_deref(),
                    self.previous.as_deref(),
                    SECRET,
                    MAX_LEN,
                );
                match self.lock.verify(&payload, self.env.now()) {
                    Ok((outcome, _)) if outcome.is_accepted() => OperationResult::Accepted,
                    Ok(_) => OperationResult::Rejected,
                    Err(error) if error.is_malformed() => OperationResult::Malformed,
                    Err(_) => OperationResult::Unavailable,
                }
            },
            Operation::AdvanceTime { millis } => {
                self.env.advance(Duration::from_millis(u64::from(millis)));
                self.lock.tick(self.env.now());
                OperationResult::Advanced
            },
        }
    }

    fn status(&self) -> LockStatus {
        self.lock.status()
    }
}

/// Strategy for generating response kinds.
fn response_strategy() -> impl Strategy<Value = ResponseKind> {
    prop_oneof![
        // Weight towards responses that can actually succeed
        4 => Just(ResponseKind::Correct),
        1 => Just(ResponseKind::Stale),
        2 => any::<u8>().prop_map(|flip| ResponseKind::Wrong { flip }),
        1 => any::<u8>().prop_map(|extra| ResponseKind::Oversized { extra }),
        1 => Just(ResponseKind::Empty),
    ]
}

/// Strategy for generating operations.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => Just(Operation::Issue),
        4 => response_strategy().prop_map(Operation::Respond),
        2 => any::<u16>().prop_map(|millis| Operation::AdvanceTime { millis }),
    ]
}

proptest! {
    /// Results and states match between the model and the real lock.
    #[test]
    fn prop_model_matches_real(
        seed in any::<u64>(),
        ops in prop::collection::vec(operation_strategy(), 0..60)
    ) {
        let mut model = ModelLock::new(SECRET, HOLD, MAX_LEN, seed);
        let mut real = RealWorld::new(seed);

        for (i, op) in ops.iter().enumerate() {
            let model_result = model.apply(*op);
            let real_result = real.apply(*op);

            prop_assert_eq!(
                &model_result,
                &real_result,
                "Divergence at operation {}: {:?}",
                i, op
            );
            prop_assert_eq!(model.status(), real.status(), "State divergence after {:?}", op);
            prop_assert_eq!(model.is_holding(), real.lock.is_holding());
        }
    }

    /// The indicator always agrees with the access state outside a hold.
    #[test]
    fn prop_indicator_tracks_access(
        seed in any::<u64>(),
        ops in prop::collection::vec(operation_strategy(), 0..100)
    ) {
        let mut real = RealWorld::new(seed);

        for op in ops {
            real.apply(op);
            let status = real.status();

            if real.lock.is_holding() {
                prop_assert_eq!(status.indicator, IndicatorState::Rejected);
            } else {
                let expected = match status.access {
                    AccessState::Locked => IndicatorState::Locked,
                    AccessState::Unlocked => IndicatorState::Unlocked,
                };
                prop_assert_eq!(status.indicator, expected);
            }
        }
    }

    /// Malformed responses never change state or consume the challenge.
    #[test]
    fn prop_malformed_is_inert(
        seed in any::<u64>(),
        ops in prop::collection::vec(operation_strategy(), 0..40),
        extra in any::<u8>()
    ) {
        let mut real = RealWorld::new(seed);
        for op in &ops {
            real.apply(*op);
        }

        let before = real.status();
        let outstanding = real.lock.outstanding_challenge().cloned();

        for kind in [ResponseKind::Empty, ResponseKind::Oversized { extra }] {
            prop_assert_eq!(real.apply(Operation::Respond(kind)), OperationResult::Malformed);
        }

        prop_assert_eq!(real.status(), before);
        prop_assert_eq!(real.lock.outstanding_challenge().cloned(), outstanding);
    }

    /// An accepted response can never be replayed.
    #[test]
    fn prop_accepted_response_is_single_use(
        seed in any::<u64>(),
        ops in prop::collection::vec(operation_strategy(), 0..40)
    ) {
        let mut real = RealWorld::new(seed);
        for op in &ops {
            real.apply(*op);
        }
        real.apply(Operation::AdvanceTime { millis: u16::MAX });

        let token = match real.apply(Operation::Issue) {
            OperationResult::Issued(token) => token,
            other => return Err(TestCaseError::fail(format!("issue failed: {other:?}"))),
        };
        let payload = [token.as_bytes(), SECRET].concat();

        let (first, _) = real.lock.verify(&payload, real.env.now()).unwrap();
        prop_assert!(first.is_accepted());

        let (second, _) = real.lock.verify(&payload, real.env.now()).unwrap();
        prop_assert!(!second.is_accepted());
    }
}

#[test]
fn entropy_failure_matches_model_semantics() {
    let mut real = RealWorld::new(9);
    real.apply(Operation::Issue);

    real.env.set_entropy_failing(true);
    assert_eq!(real.apply(Operation::Issue), OperationResult::Unavailable);
    assert!(real.lock.outstanding_challenge().is_none());

    // The token issued before the failure is gone
    assert_eq!(real.apply(Operation::Respond(ResponseKind::Correct)), OperationResult::Rejected);
}

#[test]
fn error_variants_classify_as_malformed() {
    assert!(LockError::EmptyResponse.is_malformed());
    assert!(LockError::ResponseTooLong { len: 64, max: 64 }.is_malformed());
}

#[test]
fn decoded_sequence_replays_identically() {
    let data: Vec<u8> = (0u8..=255).rev().collect();
    let ops = decode_operations(&data).unwrap();

    let mut model = ModelLock::new(SECRET, HOLD, MAX_LEN, 17);
    let mut real = RealWorld::new(17);
    for op in &ops {
        assert_eq!(model.apply(*op), real.apply(*op), "divergence at {op:?}");
        assert_eq!(model.status(), real.status());
    }
}
