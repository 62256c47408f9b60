//! Core SRP types: the Diffie-Hellman group descriptor, the hash algorithm
//! selector and the key-derivation function signature.

use std::fmt;

use digest::{Digest, DynDigest};
use num_bigint::BigUint;

use crate::errors::Result;

/// Signature of a key-derivation function used to compute the user's
/// private value `x` from `(username, password, salt)`.
///
/// The output is interpreted as a big-endian integer.
pub type Kdf = fn(username: &str, password: &str, salt: &[u8]) -> Result<Vec<u8>>;

/// Hash algorithm paired with a [`Group`].
///
/// Groups carry their hash at runtime so that differently-parameterized
/// groups can coexist in the registry; hashing is dispatched through
/// [`DynDigest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HashAlg {
    /// SHA-1. Only provided for compatibility with RFC 5054 test vectors
    /// and legacy deployments.
    Sha1,
    /// SHA-256.
    Sha256,
}

impl HashAlg {
    /// Create a fresh hasher for incremental input.
    pub fn new_digest(&self) -> Box<dyn DynDigest> {
        match self {
            Self::Sha1 => Box::new(sha1::Sha1::new()),
            Self::Sha256 => Box::new(sha2::Sha256::new()),
        }
    }

    /// One-shot digest of `data`.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        let mut d = self.new_digest();
        d.update(data);
        d.finalize().into_vec()
    }

    /// Digest length in bytes.
    pub fn output_size(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }
}

/// An SRP group: the Diffie-Hellman parameters `(N, g)` together with the
/// hash and key-derivation function both peers agreed to use.
///
/// Groups are immutable once registered and are compared by name; two
/// different groups must not share a name. `N` must be a safe prime and
/// `g` a generator modulo `N` with `1 < g < N`.
#[derive(Debug, Clone)]
pub struct Group {
    /// Registry name, e.g. `"2048"`.
    pub name: String,
    /// The safe prime modulus.
    pub n: BigUint,
    /// The generator.
    pub generator: BigUint,
    /// Minimum byte length for ephemeral private exponents (RFC 3526 §8).
    pub exponent_size: usize,
    /// Hash algorithm used for all protocol digests.
    pub hash: HashAlg,
    /// Key-derivation function computing `x`.
    pub derive: Kdf,
}

impl Group {
    /// Width of the modulus in bytes; public ephemeral keys are padded to
    /// this length before hashing.
    pub fn width(&self) -> usize {
        (self.n.bits() as usize).div_ceil(8)
    }

    /// Hash `data` with this group's algorithm.
    pub(crate) fn hash_bytes(&self, data: &[u8]) -> Vec<u8> {
        self.hash.digest(data)
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Group {}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
