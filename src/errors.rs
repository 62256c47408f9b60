//! Error types.

use std::{error, fmt};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SrpError>;

/// SRP protocol error.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrpError {
    /// A group was used before being registered with
    /// [`register`](crate::groups::register).
    UnregisteredGroup {
        /// Name of the offending group.
        name: String,
    },
    /// A group with the same name is already registered.
    DuplicateGroup {
        /// Name of the offending group.
        name: String,
    },
    /// Username or salt exceeds the 255-byte triplet limit.
    TooLong {
        /// Which field overflowed.
        field: &'static str,
        /// Its actual length in bytes.
        len: usize,
    },
    /// A peer-supplied public ephemeral key failed validation.
    InvalidEphemeralKey {
        /// Which key is invalid: `"A"` or `"B"`.
        name: &'static str,
    },
    /// The scrambling parameter `u` hashed to zero; the session must be
    /// abandoned.
    InvalidU,
    /// A method was called before the prerequisite state transition.
    NotReady {
        /// What is missing.
        hint: &'static str,
    },
    /// A proof did not match. Latched as sticky on the server side.
    AuthenticationFailed {
        /// Which peer's proof is invalid: `"client"` or `"server"`.
        peer: &'static str,
    },
    /// A primitive failed in a way that should not occur in practice.
    Internal(&'static str),
}

impl fmt::Display for SrpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnregisteredGroup { name } => {
                write!(f, "unregistered_group: \"{name}\" is not in the registry")
            }
            Self::DuplicateGroup { name } => {
                write!(f, "duplicate_group: \"{name}\" is already registered")
            }
            Self::TooLong { field, len } => {
                write!(f, "too_long: {field} is {len} bytes, the limit is 255")
            }
            Self::InvalidEphemeralKey { name } => {
                write!(f, "illegal_parameter: bad '{name}' value")
            }
            Self::InvalidU => write!(f, "illegal_parameter: scrambling parameter u is zero"),
            Self::NotReady { hint } => write!(f, "not_ready: {hint}"),
            Self::AuthenticationFailed { peer } => {
                write!(f, "bad_record_mac: incorrect '{peer}' proof")
            }
            Self::Internal(msg) => write!(f, "internal: {msg}"),
        }
    }
}

impl error::Error for SrpError {}
