//! SRP server implementation.
//!
//! # Usage
//!
//! Look up the user's [`Triplet`] and create a server session from it:
//!
//! ```ignore
//! let mut server = Server::new(&G_2048, user.username(), user.salt(), user.verifier())?;
//! ```
//!
//! Send `server.b_pub()` to the client, then configure the client's
//! public ephemeral key when it arrives:
//!
//! ```ignore
//! server.set_a(&a_pub)?;
//! ```
//!
//! The client must prove itself first. Only after `check_m1` accepts the
//! client proof will the server hand out its own proof and the session
//! key:
//!
//! ```ignore
//! if server.check_m1(&m1)? {
//!     send(server.compute_m2()?);
//!     let key = server.session_key()?;
//! }
//! ```
//!
//! A failed proof latches the session: every subsequent operation
//! returns the same [`SrpError::AuthenticationFailed`] and no secret
//! material can be extracted.
//!
//! # Stateless deployments
//!
//! [`Server::save`] serializes the session to a compact JSON blob that
//! can be handed to a store between round trips; [`Server::restore`]
//! rebuilds the session in another process. The premaster secret and
//! session key are never part of the blob; they are recomputed from the
//! stored `A` on restore.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::errors::{Result, SrpError};
use crate::groups;
use crate::triplet::Triplet;
use crate::types::Group;
use crate::utils::{
    compute_k, compute_m1, compute_m2, compute_server_s, compute_u, is_valid_ephemeral,
    server_key_pair,
};

// Values derived once the client's A is known.
struct Handshake {
    a_pub: BigUint,
    m1: Vec<u8>,
    m2: Vec<u8>,
    key: Vec<u8>,
}

// The session advances Fresh -> Primed -> Proven, or latches in Failed.
enum State {
    Fresh,
    Primed(Box<Handshake>),
    Proven(Box<Handshake>),
    Failed(SrpError),
}

/// Serialized form of a server session.
#[derive(Serialize, Deserialize)]
struct Session {
    group: String,
    triplet: String,
    b: String,
    #[serde(rename = "B")]
    b_pub: String,
    #[serde(rename = "A", default, skip_serializing_if = "Option::is_none")]
    a_pub: Option<String>,
    #[serde(rename = "verifiedM1")]
    verified_m1: bool,
}

/// The server-side perspective of an SRP session.
///
/// A session is not safe for concurrent use; create one per
/// authentication attempt (or [`restore`](Server::restore) one from a
/// saved blob).
pub struct Server {
    group: Arc<Group>,
    triplet: Triplet,
    b: BigUint,
    b_pub: BigUint,
    state: State,
}

impl Server {
    /// Create a new server session for the given user record, drawing
    /// ephemeral randomness from the operating system.
    ///
    /// Fails with [`SrpError::UnregisteredGroup`] if `group` has not
    /// been registered, and with [`SrpError::TooLong`] if the username
    /// or salt exceeds the triplet limits.
    pub fn new(group: &Arc<Group>, username: &str, salt: &[u8], verifier: &[u8]) -> Result<Self> {
        Self::new_with_rng(group, username, salt, verifier, &mut OsRng)
    }

    /// Like [`Server::new`], with a caller-supplied CSPRNG.
    pub fn new_with_rng<R: RngCore + CryptoRng>(
        group: &Arc<Group>,
        username: &str,
        salt: &[u8],
        verifier: &[u8],
        rng: &mut R,
    ) -> Result<Self> {
        groups::ensure_registered(group)?;
        let triplet = Triplet::new(username, salt, verifier)?;

        let k = compute_k(group)?;
        let v = BigUint::from_bytes_be(verifier);
        let (b, b_pub) = server_key_pair(rng, group, &k, &v);

        Ok(Self {
            group: Arc::clone(group),
            triplet,
            b,
            b_pub,
            state: State::Fresh,
        })
    }

    /// The server's public ephemeral key `B`, minimal big-endian.
    pub fn b_pub(&self) -> Vec<u8> {
        self.b_pub.to_bytes_be()
    }

    fn derive(&self, a_pub: BigUint) -> Result<Handshake> {
        let v = BigUint::from_bytes_be(self.triplet.verifier());
        let u = compute_u(&self.group, &a_pub, &self.b_pub)?;
        let s = compute_server_s(&self.group, &v, &u, &a_pub, &self.b);
        let key = self.group.hash.digest(&s.to_bytes_be());
        let m1 = compute_m1(
            &self.group,
            self.triplet.username().as_bytes(),
            self.triplet.salt(),
            &a_pub,
            &self.b_pub,
            &key,
        )?;
        let m2 = compute_m2(&self.group, &a_pub, &m1, &key);

        Ok(Handshake {
            a_pub,
            m1,
            m2,
            key,
        })
    }

    /// Configure the client's public ephemeral key `A` and derive the
    /// session values.
    ///
    /// Accepted before the client proof has been checked; calling it
    /// again replaces all derived values. Fails with
    /// [`SrpError::InvalidEphemeralKey`] on a malicious `A` and with
    /// [`SrpError::InvalidU`] if the scrambling parameter hashes to
    /// zero.
    pub fn set_a(&mut self, a_pub: &[u8]) -> Result<()> {
        match &self.state {
            State::Failed(err) => return Err(err.clone()),
            State::Proven(_) => {
                return Err(SrpError::NotReady {
                    hint: "the client proof has already been accepted",
                })
            }
            State::Fresh | State::Primed(_) => {}
        }

        let a_pub = BigUint::from_bytes_be(a_pub);
        if !is_valid_ephemeral(&self.group, &a_pub) {
            return Err(SrpError::InvalidEphemeralKey { name: "A" });
        }

        let handshake = self.derive(a_pub)?;
        self.state = State::Primed(Box::new(handshake));
        Ok(())
    }

    /// Verify the client proof `M1`. The comparison is constant-time.
    ///
    /// On success the session moves to its proven state and returns
    /// `Ok(true)`. On mismatch the session latches
    /// [`SrpError::AuthenticationFailed`]: the error is returned here
    /// and by every subsequent call, so no secret material leaks from a
    /// failed session.
    pub fn check_m1(&mut self, m1: &[u8]) -> Result<bool> {
        match std::mem::replace(&mut self.state, State::Fresh) {
            State::Failed(err) => {
                self.state = State::Failed(err.clone());
                Err(err)
            }
            State::Fresh => Err(SrpError::NotReady {
                hint: "the client's public ephemeral key (A) must be set first",
            }),
            State::Proven(handshake) => {
                self.state = State::Proven(handshake);
                Err(SrpError::NotReady {
                    hint: "the client proof has already been accepted",
                })
            }
            State::Primed(handshake) => {
                if handshake.m1.ct_eq(m1).unwrap_u8() == 1 {
                    self.state = State::Proven(handshake);
                    Ok(true)
                } else {
                    let err = SrpError::AuthenticationFailed { peer: "client" };
                    self.state = State::Failed(err.clone());
                    Err(err)
                }
            }
        }
    }

    /// The proof `M2` to send to the client.
    ///
    /// Fails with [`SrpError::NotReady`] until
    /// [`check_m1`](Self::check_m1) has accepted the client proof;
    /// handing out `M2` earlier would let a hostile client take it away
    /// for offline work.
    pub fn compute_m2(&self) -> Result<Vec<u8>> {
        match &self.state {
            State::Proven(handshake) => Ok(handshake.m2.clone()),
            State::Failed(err) => Err(err.clone()),
            State::Fresh | State::Primed(_) => Err(SrpError::NotReady {
                hint: "the client must show their proof first",
            }),
        }
    }

    /// The session key `K` shared with the client.
    ///
    /// Only available after [`check_m1`](Self::check_m1) has accepted
    /// the client proof, so a key derived from an unverified session can
    /// never be used by accident.
    pub fn session_key(&self) -> Result<Vec<u8>> {
        match &self.state {
            State::Proven(handshake) => Ok(handshake.key.clone()),
            State::Failed(err) => Err(err.clone()),
            State::Fresh | State::Primed(_) => Err(SrpError::NotReady {
                hint: "the client must show their proof first",
            }),
        }
    }

    /// Return the session to its just-constructed state with a new user
    /// record and a fresh ephemeral key pair.
    ///
    /// Clears any latched error and any previously derived values: a
    /// proof computed against the old state no longer verifies.
    pub fn reset(
        &mut self,
        group: &Arc<Group>,
        username: &str,
        salt: &[u8],
        verifier: &[u8],
    ) -> Result<()> {
        *self = Self::new(group, username, salt, verifier)?;
        Ok(())
    }

    /// Serialize the session for stateless deployments.
    ///
    /// The blob names the group and carries the triplet, both ephemeral
    /// keys and the verification flag; the premaster secret and session
    /// key are recomputed on [`restore`](Server::restore) and never
    /// stored. A latched session refuses to serialize and returns its
    /// sticky error.
    pub fn save(&self) -> Result<Vec<u8>> {
        let (a_pub, verified_m1) = match &self.state {
            State::Failed(err) => return Err(err.clone()),
            State::Fresh => (None, false),
            State::Primed(handshake) => (Some(&handshake.a_pub), false),
            State::Proven(handshake) => (Some(&handshake.a_pub), true),
        };

        let session = Session {
            group: self.group.name.clone(),
            triplet: BASE64.encode(self.triplet.as_bytes()),
            b: BASE64.encode(self.b.to_bytes_be()),
            b_pub: BASE64.encode(self.b_pub.to_bytes_be()),
            a_pub: a_pub.map(|a| BASE64.encode(a.to_bytes_be())),
            verified_m1,
        };
        serde_json::to_vec(&session).map_err(|_| SrpError::Internal("failed to encode session"))
    }

    /// Restore a session previously serialized with
    /// [`save`](Server::save).
    ///
    /// Fails with [`SrpError::UnregisteredGroup`] if the group named in
    /// the blob is absent from the registry of the restoring process.
    pub fn restore(data: &[u8]) -> Result<Self> {
        let session: Session = serde_json::from_slice(data)
            .map_err(|_| SrpError::Internal("malformed session blob"))?;

        let group = groups::lookup(&session.group)?;
        let decode = |field: &str| {
            BASE64
                .decode(field)
                .map_err(|_| SrpError::Internal("malformed base64 in session blob"))
        };

        let mut server = Self {
            group,
            triplet: Triplet::from(decode(&session.triplet)?),
            b: BigUint::from_bytes_be(&decode(&session.b)?),
            b_pub: BigUint::from_bytes_be(&decode(&session.b_pub)?),
            state: State::Fresh,
        };

        if let Some(a_pub) = &session.a_pub {
            server.set_a(&decode(a_pub)?)?;
            if session.verified_m1 {
                if let State::Primed(handshake) =
                    std::mem::replace(&mut server.state, State::Fresh)
                {
                    server.state = State::Proven(handshake);
                }
            }
        }

        Ok(server)
    }
}
