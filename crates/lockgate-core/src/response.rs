//! Response derivation and comparison.
//!
//! The expected response is the challenge token immediately followed by the
//! secret bytes. This is a concatenation check, not a keyed hash, and the
//! comparison below is ordinary slice equality (not constant-time). Both are
//! part of the wire contract with existing clients; replace them here, and
//! only here, when the protocol is hardened.

use crate::{challenge::Challenge, config::Secret, error::LockError};

/// Response a client holding `secret` computes for `challenge`.
pub fn expected_response(challenge: &Challenge, secret: &Secret) -> Vec<u8> {
    let mut expected = Vec::with_capacity(challenge.as_bytes().len() + secret.len());
    expected.extend_from_slice(challenge.as_bytes());
    expected.extend_from_slice(secret.as_bytes());
    expected
}

/// Exact byte equality. Prefixes and case variants do not match.
pub fn matches(claimed: &[u8], expected: &[u8]) -> bool {
    claimed == expected
}

/// Reject payloads that must never reach the comparison.
///
/// `max_len` is exclusive: a payload of exactly `max_len` bytes is malformed.
pub fn check_well_formed(claimed: &[u8], max_len: usize) -> Result<(), LockError> {
    if claimed.is_empty() {
        return Err(LockError::EmptyResponse);
    }
    if claimed.len() >= max_len {
        return Err(LockError::ResponseTooLong { len: claimed.len(), max: max_len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn secret() -> Secret {
        Secret::new("CORRECTKEY").unwrap()
    }

    #[test]
    fn concatenates_challenge_then_secret() {
        let expected = expected_response(&Challenge::from_value(482_913), &secret());
        assert_eq!(expected, b"482913CORRECTKEY");
    }

    #[test]
    fn exact_equality_only() {
        let expected = b"482913CORRECTKEY";
        assert!(matches(b"482913CORRECTKEY", expected));
        assert!(!matches(b"482913correctkey", expected));
        assert!(!matches(b"482913CORRECT", expected));
        assert!(!matches(b"482913CORRECTKEY\0", expected));
        assert!(!matches(b"", expected));
    }

    #[test]
    fn length_bound_is_exclusive() {
        assert!(check_well_formed(&[b'a'; 63], 64).is_ok());
        assert_eq!(
            check_well_formed(&[b'a'; 64], 64),
            Err(LockError::ResponseTooLong { len: 64, max: 64 })
        );
        assert_eq!(
            check_well_formed(&[b'a'; 65], 64),
            Err(LockError::ResponseTooLong { len: 65, max: 64 })
        );
    }

    #[test]
    fn empty_payload_is_malformed() {
        assert_eq!(check_well_formed(b"", 64), Err(LockError::EmptyResponse));
    }

    proptest! {
        #[test]
        fn only_the_expected_bytes_match(value in any::<u32>(), claimed in prop::collection::vec(any::<u8>(), 0..63)) {
            let expected = expected_response(&Challenge::from_value(value), &secret());
            prop_assert_eq!(matches(&claimed, &expected), claimed == expected);
        }
    }
}
