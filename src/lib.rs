//! An implementation of the Secure Remote Password protocol (SRP-6a) as
//! defined in [RFC 2945] and [RFC 5054].
//!
//! SRP lets a client prove knowledge of a password to a server that only
//! stores a one-way *verifier* of it, while both sides derive a fresh
//! shared session key. The password never crosses the wire, and neither
//! peer's messages let a network attacker (or a compromised server
//! database, absent the password) recover it more cheaply than by brute
//! force. Both peers authenticate each other: the server proves it knows
//! the verifier, the client proves it knows the password.
//!
//! The crate provides the protocol engine only. Transport, persistence
//! of user records and the use of the derived session key are left to
//! the caller; the server session serializes to a compact blob
//! ([`Server::save`]) so deployments can stay stateless between round
//! trips.
//!
//! # Groups
//!
//! Clients and servers agree on their Diffie-Hellman group, hash and
//! key-derivation function by *name*, through a process-wide registry
//! pre-loaded with the RFC 5054 groups (see [`groups`]). Custom groups
//! must be registered up front:
//!
//! ```ignore
//! srp6a::groups::register(Group {
//!     name: "my-group".into(),
//!     generator: BigUint::from(2u8),
//!     n: my_modulus,
//!     exponent_size: 27,
//!     hash: HashAlg::Sha256,
//!     derive: my_kdf,
//! })?;
//! ```
//!
//! # Usage
//!
//! ```
//! use srp6a::{compute_verifier, groups::G_2048, new_random_salt, Client, Server};
//!
//! # fn main() -> srp6a::Result<()> {
//! // Registration: the client derives a verifier and sends the whole
//! // triplet to the server over a protected channel for storage.
//! let salt = new_random_salt();
//! let user = compute_verifier(&G_2048, "alice@example.com", "p@$$w0rd", &salt)?;
//!
//! // Authentication, one side per peer in practice.
//! let mut client = Client::new(&G_2048, "alice@example.com", "p@$$w0rd", &salt)?;
//! let mut server = Server::new(&G_2048, user.username(), user.salt(), user.verifier())?;
//!
//! // The peers exchange public ephemeral keys...
//! server.set_a(&client.a_pub())?;
//! client.set_b(&server.b_pub())?;
//!
//! // ...then the client proves itself first...
//! let m1 = client.compute_m1()?;
//! assert!(server.check_m1(&m1)?);
//!
//! // ...and the server proves itself back.
//! let m2 = server.compute_m2()?;
//! assert!(client.check_m2(&m2)?);
//!
//! // Both sides now share a session key.
//! assert_eq!(client.session_key()?, server.session_key()?);
//! # Ok(())
//! # }
//! ```
//!
//! [RFC 2945]: https://datatracker.ietf.org/doc/html/rfc2945
//! [RFC 5054]: https://datatracker.ietf.org/doc/html/rfc5054

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod client;
pub mod errors;
pub mod groups;
pub mod server;
pub mod triplet;
pub mod types;
pub mod unicode;
pub mod utils;

pub use client::{compute_verifier, Client};
pub use errors::{Result, SrpError};
pub use server::Server;
pub use triplet::Triplet;
pub use types::{Group, HashAlg, Kdf};

use rand::rngs::OsRng;
use rand::RngCore;

/// Default length in bytes of a salt created with [`new_random_salt`].
pub const SALT_LENGTH: usize = 12;

/// Return a new random salt of [`SALT_LENGTH`] bytes.
pub fn new_random_salt() -> Vec<u8> {
    new_random_salt_len(SALT_LENGTH)
}

/// Return a new random salt with the given length.
///
/// If `length` is zero, [`SALT_LENGTH`] is used instead.
pub fn new_random_salt_len(length: usize) -> Vec<u8> {
    let length = if length == 0 { SALT_LENGTH } else { length };
    let mut salt = vec![0u8; length];
    OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_lengths() {
        assert_eq!(new_random_salt().len(), SALT_LENGTH);
        assert_eq!(new_random_salt_len(0).len(), SALT_LENGTH);
        assert_eq!(new_random_salt_len(32).len(), 32);
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(new_random_salt(), new_random_salt());
    }
}
