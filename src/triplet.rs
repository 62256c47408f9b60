//! The `(username, salt, verifier)` record a server stores per user.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::errors::{Result, SrpError};

/// Compact binary record holding the parameters the server should store
/// for one user.
///
/// A triplet is structured as follows:
///
/// ```text
/// +------------------------+
/// | usernameLen (1)        |
/// +------------------------+
/// | username (usernameLen) |
/// +------------------------+
/// | saltLen (1)            |
/// +------------------------+
/// | salt (saltLen)         |
/// +------------------------+
/// | verifier               |
/// +------------------------+
/// ```
///
/// The verifier length is not encoded; it is everything after the salt.
/// The accessors are tolerant of truncated buffers and return empty
/// fields rather than failing, so a triplet read back from storage never
/// needs unwrapping.
///
/// The JSON form produced by [`Serialize`] deliberately omits the
/// verifier, so a triplet can be exposed to the client (for the salt)
/// without revealing the stored secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triplet(Vec<u8>);

impl Triplet {
    /// Build a triplet from its parts.
    ///
    /// Fails with [`SrpError::TooLong`] if the username or the salt
    /// exceeds 255 bytes; the caller may be handling untrusted input.
    pub fn new(username: &str, salt: &[u8], verifier: &[u8]) -> Result<Self> {
        if username.len() > u8::MAX as usize {
            return Err(SrpError::TooLong {
                field: "username",
                len: username.len(),
            });
        }
        if salt.len() > u8::MAX as usize {
            return Err(SrpError::TooLong {
                field: "salt",
                len: salt.len(),
            });
        }

        let mut buf = Vec::with_capacity(2 + username.len() + salt.len() + verifier.len());
        buf.push(username.len() as u8);
        buf.extend_from_slice(username.as_bytes());
        buf.push(salt.len() as u8);
        buf.extend_from_slice(salt);
        buf.extend_from_slice(verifier);
        Ok(Self(buf))
    }

    /// The username, or `""` if the buffer is truncated.
    pub fn username(&self) -> &str {
        let len = *self.0.first().unwrap_or(&0) as usize;
        let raw = self.0.get(1..1 + len).unwrap_or(&[]);
        std::str::from_utf8(raw).unwrap_or("")
    }

    /// The salt, or `&[]` if the buffer is truncated.
    pub fn salt(&self) -> &[u8] {
        let ulen = *self.0.first().unwrap_or(&0) as usize;
        let slen = *self.0.get(1 + ulen).unwrap_or(&0) as usize;
        self.0.get(2 + ulen..2 + ulen + slen).unwrap_or(&[])
    }

    /// The verifier, or `&[]` if the buffer is truncated.
    pub fn verifier(&self) -> &[u8] {
        let ulen = *self.0.first().unwrap_or(&0) as usize;
        let slen = *self.0.get(1 + ulen).unwrap_or(&0) as usize;
        self.0.get(2 + ulen + slen..).unwrap_or(&[])
    }

    /// The raw encoded bytes, suitable for storage.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Triplet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Triplet {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<Triplet> for Vec<u8> {
    fn from(triplet: Triplet) -> Self {
        triplet.0
    }
}

impl Serialize for Triplet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Triplet", 2)?;
        state.serialize_field("salt", &BASE64.encode(self.salt()))?;
        state.serialize_field("username", self.username())?;
        state.end()
    }
}
