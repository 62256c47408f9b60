//! Groups from [RFC 5054](https://tools.ietf.org/html/rfc5054) and the
//! process-wide group registry.
//!
//! The five current groups (2048 to 8192 bits) are pre-registered with
//! SHA-256 and an updated key-derivation function. `G_1024` and `G_1536`
//! are provided only for compatibility with legacy software and the RFC
//! test vectors; it is strongly recommended not to use them.
//!
//! Custom groups must be registered with [`register`] before a client or
//! server session is created for them, so that both peers agree on the
//! full parameter set by name alone and a silent downgrade is impossible.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use hmac::Hmac;
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use sha2::Sha512_256;

use crate::errors::{Result, SrpError};
use crate::types::{Group, HashAlg};

/// Iteration count of the [`pbkdf2_sha512_256`] KDF.
const PBKDF2_ROUNDS: u32 = 100_000;

/// Output length in bytes of the [`pbkdf2_sha512_256`] KDF.
const PBKDF2_KEY_LEN: usize = 32;

/// Key-derivation function based on PBKDF2 with HMAC-SHA-512/256.
///
/// This is the recommended KDF for new deployments: unlike the plain
/// hashing scheme of RFC 5054 it is deliberately expensive to brute-force.
pub fn pbkdf2_sha512_256(username: &str, password: &str, salt: &[u8]) -> Result<Vec<u8>> {
    let mut key = vec![0u8; PBKDF2_KEY_LEN];
    let password = [username.as_bytes(), password.as_bytes()].concat();
    pbkdf2::pbkdf2::<Hmac<Sha512_256>>(&password, salt, PBKDF2_ROUNDS, &mut key)
        .map_err(|_| SrpError::Internal("pbkdf2 rejected the output length"))?;
    Ok(key)
}

// x = H(s | H(U ":" p))
fn rfc5054_kdf(hash: HashAlg, username: &str, password: &str, salt: &[u8]) -> Result<Vec<u8>> {
    let mut inner = hash.new_digest();
    inner.update(username.as_bytes());
    inner.update(b":");
    inner.update(password.as_bytes());
    let identity = inner.finalize();

    let mut outer = hash.new_digest();
    outer.update(salt);
    outer.update(&identity);
    Ok(outer.finalize().into_vec())
}

/// The key-derivation function defined in RFC 5054, with SHA-1.
///
/// Kept for compatibility with early implementations and for the RFC
/// test vectors.
#[deprecated(
    note = "SHA-1 is not suitable for password hashing; use pbkdf2_sha512_256 or rfc5054_kdf_sha256"
)]
pub fn rfc5054_kdf_sha1(username: &str, password: &str, salt: &[u8]) -> Result<Vec<u8>> {
    rfc5054_kdf(HashAlg::Sha1, username, password, salt)
}

/// A variation of the RFC 5054 key-derivation function using SHA-256
/// instead of the compromised SHA-1.
pub fn rfc5054_kdf_sha256(username: &str, password: &str, salt: &[u8]) -> Result<Vec<u8>> {
    rfc5054_kdf(HashAlg::Sha256, username, password, salt)
}

// Embedded moduli are hex text, one RFC-style block per group.
fn parse_hex(text: &str) -> BigUint {
    let hex: String = text.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    BigUint::parse_bytes(hex.as_bytes(), 16).expect("embedded group modulus is valid hex")
}

fn builtin(
    name: &str,
    modulus: &str,
    generator: u32,
    exponent_size: usize,
    hash: HashAlg,
    derive: crate::types::Kdf,
) -> Arc<Group> {
    Arc::new(Group {
        name: name.into(),
        n: parse_hex(modulus),
        generator: BigUint::from(generator),
        exponent_size,
        hash,
        derive,
    })
}

/// 1024-bit group from RFC 5054.
#[deprecated(note = "1024-bit moduli are not recommended for production use")]
pub static G_1024: Lazy<Arc<Group>> = Lazy::new(|| {
    #[allow(deprecated)]
    let kdf: crate::types::Kdf = rfc5054_kdf_sha1;
    builtin(
        "1024",
        include_str!("groups/1024.txt"),
        2,
        32,
        HashAlg::Sha1,
        kdf,
    )
});

/// 1536-bit group from RFC 5054.
#[deprecated(note = "1536-bit moduli are not recommended for production use")]
pub static G_1536: Lazy<Arc<Group>> = Lazy::new(|| {
    #[allow(deprecated)]
    let kdf: crate::types::Kdf = rfc5054_kdf_sha1;
    builtin(
        "1536",
        include_str!("groups/1536.txt"),
        2,
        23,
        HashAlg::Sha1,
        kdf,
    )
});

/// 2048-bit group from RFC 5054.
pub static G_2048: Lazy<Arc<Group>> = Lazy::new(|| {
    builtin(
        "2048",
        include_str!("groups/2048.txt"),
        2,
        27,
        HashAlg::Sha256,
        rfc5054_kdf_sha256,
    )
});

/// 3072-bit group from RFC 5054.
pub static G_3072: Lazy<Arc<Group>> = Lazy::new(|| {
    builtin(
        "3072",
        include_str!("groups/3072.txt"),
        5,
        32,
        HashAlg::Sha256,
        rfc5054_kdf_sha256,
    )
});

/// 4096-bit group from RFC 5054.
pub static G_4096: Lazy<Arc<Group>> = Lazy::new(|| {
    builtin(
        "4096",
        include_str!("groups/4096.txt"),
        5,
        38,
        HashAlg::Sha256,
        pbkdf2_sha512_256,
    )
});

/// 6144-bit group from RFC 5054.
pub static G_6144: Lazy<Arc<Group>> = Lazy::new(|| {
    builtin(
        "6144",
        include_str!("groups/6144.txt"),
        5,
        43,
        HashAlg::Sha256,
        pbkdf2_sha512_256,
    )
});

/// 8192-bit group from RFC 5054.
pub static G_8192: Lazy<Arc<Group>> = Lazy::new(|| {
    builtin(
        "8192",
        include_str!("groups/8192.txt"),
        19,
        48,
        HashAlg::Sha256,
        pbkdf2_sha512_256,
    )
});

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<Group>>>> = Lazy::new(|| {
    #[allow(deprecated)]
    let builtins = [
        &G_1024, &G_1536, &G_2048, &G_3072, &G_4096, &G_6144, &G_8192,
    ];
    let mut map = HashMap::new();
    for group in builtins {
        let group: &Arc<Group> = group;
        map.insert(group.name.clone(), Arc::clone(group));
    }
    RwLock::new(map)
});

/// Register a custom group so it can be used by [`Client`](crate::Client)
/// and [`Server`](crate::Server) sessions.
///
/// The caller is responsible for supplying sound parameters: `N` a safe
/// prime, `g` a generator with `1 < g < N`, and a deterministic hash and
/// KDF shared with the peer.
pub fn register(group: Group) -> Result<()> {
    let mut registry = REGISTRY
        .write()
        .map_err(|_| SrpError::Internal("group registry lock poisoned"))?;
    if registry.contains_key(&group.name) {
        return Err(SrpError::DuplicateGroup { name: group.name });
    }
    registry.insert(group.name.clone(), Arc::new(group));
    Ok(())
}

/// Look up a registered group by name.
pub fn lookup(name: &str) -> Result<Arc<Group>> {
    let registry = REGISTRY
        .read()
        .map_err(|_| SrpError::Internal("group registry lock poisoned"))?;
    registry
        .get(name)
        .cloned()
        .ok_or_else(|| SrpError::UnregisteredGroup { name: name.into() })
}

/// Fail with [`SrpError::UnregisteredGroup`] unless `group`'s name is in
/// the registry.
pub(crate) fn ensure_registered(group: &Group) -> Result<()> {
    lookup(&group.name).map(|_| ())
}
