//! SRP client implementation.
//!
//! # Usage
//!
//! Create a client from the group shared with the server, the user's
//! credentials and the salt previously obtained from the server:
//!
//! ```ignore
//! let mut client = Client::new(&G_2048, username, password, &salt)?;
//! ```
//!
//! Send `client.a_pub()` to the server and configure the server's reply:
//!
//! ```ignore
//! client.set_b(&b_pub)?;
//! ```
//!
//! Then prove knowledge of the password and verify the server's own
//! proof; only after `check_m2` succeeds is the server authentic:
//!
//! ```ignore
//! send(client.compute_m1()?);
//! if !client.check_m2(&m2)? {
//!     return Err(/* server is not authentic */);
//! }
//! let key = client.session_key()?;
//! ```

use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;

use crate::errors::{Result, SrpError};
use crate::groups;
use crate::triplet::Triplet;
use crate::types::Group;
use crate::utils::{
    client_key_pair, compute_client_s, compute_k, compute_m1, compute_m2, compute_u, compute_x,
    is_valid_ephemeral,
};

use std::sync::Arc;

const NOT_READY: SrpError = SrpError::NotReady {
    hint: "the server's public ephemeral key (B) must be set first",
};

// Values derived once the server's B is known.
struct Handshake {
    m1: Vec<u8>,
    m2: Vec<u8>,
    key: Vec<u8>,
}

/// The client-side perspective of an SRP session.
///
/// A session is not safe for concurrent use; create one per
/// authentication attempt.
pub struct Client {
    group: Arc<Group>,
    username: String,
    salt: Vec<u8>,
    x: BigUint,
    a: BigUint,
    a_pub: BigUint,
    handshake: Option<Handshake>,
}

impl Client {
    /// Create a new client session, drawing ephemeral randomness from the
    /// operating system.
    ///
    /// Fails with [`SrpError::UnregisteredGroup`] if `group` has not been
    /// registered.
    pub fn new(group: &Arc<Group>, username: &str, password: &str, salt: &[u8]) -> Result<Self> {
        Self::new_with_rng(group, username, password, salt, &mut OsRng)
    }

    /// Like [`Client::new`], with a caller-supplied CSPRNG.
    pub fn new_with_rng<R: RngCore + CryptoRng>(
        group: &Arc<Group>,
        username: &str,
        password: &str,
        salt: &[u8],
        rng: &mut R,
    ) -> Result<Self> {
        groups::ensure_registered(group)?;
        let x = compute_x(group, username, password, salt)?;
        let (a, a_pub) = client_key_pair(rng, group);

        Ok(Self {
            group: Arc::clone(group),
            username: username.to_owned(),
            salt: salt.to_vec(),
            x,
            a,
            a_pub,
            handshake: None,
        })
    }

    /// The client's public ephemeral key `A`, minimal big-endian.
    pub fn a_pub(&self) -> Vec<u8> {
        self.a_pub.to_bytes_be()
    }

    /// Configure the server's public ephemeral key `B` and derive the
    /// session values.
    ///
    /// Fails with [`SrpError::InvalidEphemeralKey`] on a malicious `B`
    /// and with [`SrpError::InvalidU`] if the scrambling parameter hashes
    /// to zero; in both cases the session must be abandoned.
    pub fn set_b(&mut self, b_pub: &[u8]) -> Result<()> {
        let b_pub = BigUint::from_bytes_be(b_pub);
        if !is_valid_ephemeral(&self.group, &b_pub) {
            return Err(SrpError::InvalidEphemeralKey { name: "B" });
        }

        let k = compute_k(&self.group)?;
        let u = compute_u(&self.group, &self.a_pub, &b_pub)?;
        let s = compute_client_s(&self.group, &k, &self.x, &u, &b_pub, &self.a);
        let key = self.group.hash.digest(&s.to_bytes_be());
        let m1 = compute_m1(
            &self.group,
            self.username.as_bytes(),
            &self.salt,
            &self.a_pub,
            &b_pub,
            &key,
        )?;
        let m2 = compute_m2(&self.group, &self.a_pub, &m1, &key);

        self.handshake = Some(Handshake { m1, m2, key });
        Ok(())
    }

    /// The proof `M1` to send to the server.
    ///
    /// Fails with [`SrpError::NotReady`] until [`set_b`](Self::set_b)
    /// has succeeded.
    pub fn compute_m1(&self) -> Result<Vec<u8>> {
        let handshake = self.handshake.as_ref().ok_or(NOT_READY)?;
        Ok(handshake.m1.clone())
    }

    /// Verify the server proof `M2`. Returns true iff the proof matches;
    /// the comparison is constant-time.
    pub fn check_m2(&self, m2: &[u8]) -> Result<bool> {
        let handshake = self.handshake.as_ref().ok_or(NOT_READY)?;
        Ok(handshake.m2.ct_eq(m2).unwrap_u8() == 1)
    }

    /// The session key `K` shared with the server.
    ///
    /// Callers must not use the key unless [`check_m2`](Self::check_m2)
    /// returned true.
    pub fn session_key(&self) -> Result<Vec<u8>> {
        let handshake = self.handshake.as_ref().ok_or(NOT_READY)?;
        Ok(handshake.key.clone())
    }
}

/// Compute a verifier from the user's username, password and salt.
///
/// This runs client-side during registration; the returned [`Triplet`]
/// is what the server should persist, and must reach it over a secure
/// channel (e.g. TLS) to rule out interception at sign-up.
pub fn compute_verifier(
    group: &Arc<Group>,
    username: &str,
    password: &str,
    salt: &[u8],
) -> Result<Triplet> {
    groups::ensure_registered(group)?;
    let x = compute_x(group, username, password, salt)?;
    let v = group.generator.modpow(&x, &group.n);
    Triplet::new(username, salt, &v.to_bytes_be())
}
