//! Low-level protocol primitives.
//!
//! Everything here is a pure function over the group parameters; the
//! [`Client`](crate::Client) and [`Server`](crate::Server) state machines
//! are thin orchestration layers on top. All formulas are mod `N`, `|`
//! denotes concatenation and `H` is the group's hash.

use num_bigint::BigUint;
use num_integer::Integer;
use rand::{CryptoRng, RngCore};

use crate::errors::{Result, SrpError};
use crate::types::Group;

/// Smallest ephemeral private exponent size allowed, in bytes. Protects
/// against groups that specify a too-small `exponent_size`.
pub(crate) const MIN_EPHEMERAL_KEY_SIZE: usize = 32;

/// Left-pad `b` with zeros to the byte width of the group modulus.
///
/// Fails if `b` is already wider than the modulus.
pub fn pad(b: &[u8], group: &Group) -> Result<Vec<u8>> {
    let width = group.width();
    if b.len() > width {
        return Err(SrpError::Internal("value is wider than the group modulus"));
    }
    let mut padded = vec![0u8; width - b.len()];
    padded.extend_from_slice(b);
    Ok(padded)
}

/// XOR of two equal-length byte strings.
pub fn xor_bytes(a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
    if a.len() != b.len() {
        return Err(SrpError::Internal("xor operands differ in length"));
    }
    Ok(a.iter().zip(b).map(|(x, y)| x ^ y).collect())
}

/// Fill `length` bytes from the given CSPRNG.
pub(crate) fn random_bytes<R: RngCore + CryptoRng>(rng: &mut R, length: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; length];
    rng.fill_bytes(&mut bytes);
    bytes
}

// Private ephemeral exponents are at least 32 bytes regardless of what
// the group asks for.
fn ephemeral_exponent<R: RngCore + CryptoRng>(rng: &mut R, group: &Group) -> BigUint {
    let size = group.exponent_size.max(MIN_EPHEMERAL_KEY_SIZE);
    BigUint::from_bytes_be(&random_bytes(rng, size))
}

/// Returns true if `key` is a valid public ephemeral key for the group:
/// `key mod N != 0` and `gcd(key, N) == 1`.
pub fn is_valid_ephemeral(group: &Group, key: &BigUint) -> bool {
    if (key % &group.n) == BigUint::default() {
        return false;
    }
    key.gcd(&group.n) == BigUint::from(1u8)
}

// k = H(N | PAD(g))
/// Compute the SRP-6a multiplier parameter `k`.
pub fn compute_k(group: &Group) -> Result<BigUint> {
    let g = pad(&group.generator.to_bytes_be(), group)?;
    let mut d = group.hash.new_digest();
    d.update(&group.n.to_bytes_be());
    d.update(&g);
    Ok(BigUint::from_bytes_be(&d.finalize()))
}

// u = H(PAD(A) | PAD(B))
/// Compute the scrambling parameter `u`; `u == 0` is rejected with
/// [`SrpError::InvalidU`] as SRP-6a requires.
pub fn compute_u(group: &Group, a_pub: &BigUint, b_pub: &BigUint) -> Result<BigUint> {
    let a = pad(&a_pub.to_bytes_be(), group)?;
    let b = pad(&b_pub.to_bytes_be(), group)?;
    let mut d = group.hash.new_digest();
    d.update(&a);
    d.update(&b);
    let u = BigUint::from_bytes_be(&d.finalize());
    if u == BigUint::default() {
        return Err(SrpError::InvalidU);
    }
    Ok(u)
}

/// Compute the user's private value `x` with the group's KDF.
pub fn compute_x(group: &Group, username: &str, password: &str, salt: &[u8]) -> Result<BigUint> {
    let x = (group.derive)(username, password, salt)?;
    Ok(BigUint::from_bytes_be(&x))
}

// S = (B - k*g^x) ^ (a + u*x) % N
/// Client-side premaster secret.
pub fn compute_client_s(
    group: &Group,
    k: &BigUint,
    x: &BigUint,
    u: &BigUint,
    b_pub: &BigUint,
    a: &BigUint,
) -> BigUint {
    let n = &group.n;
    let interm = (k * group.generator.modpow(x, n)) % n;
    // After reduction B can be smaller than k*g^x; adding N keeps the
    // subtraction non-negative and leaves the result unchanged mod N.
    let b_red = b_pub % n;
    let base = if b_red >= interm {
        &b_red - &interm
    } else {
        n + &b_red - &interm
    };
    let exp = a + u * x;
    base.modpow(&exp, n)
}

// S = (A * v^u) ^ b % N
/// Server-side premaster secret.
pub fn compute_server_s(
    group: &Group,
    v: &BigUint,
    u: &BigUint,
    a_pub: &BigUint,
    b: &BigUint,
) -> BigUint {
    let n = &group.n;
    let base = (a_pub * v.modpow(u, n)) % n;
    base.modpow(b, n)
}

// M1 = H(H(N) XOR H(g) | H(U) | s | A | B | K)
/// Client proof of the session. `A` and `B` are hashed in their minimal
/// big-endian encoding, as is `g` inside `H(g)`.
pub fn compute_m1(
    group: &Group,
    username: &[u8],
    salt: &[u8],
    a_pub: &BigUint,
    b_pub: &BigUint,
    key: &[u8],
) -> Result<Vec<u8>> {
    let h_n = group.hash_bytes(&group.n.to_bytes_be());
    let h_g = group.hash_bytes(&group.generator.to_bytes_be());
    let group_xor = xor_bytes(&h_n, &h_g)?;

    let mut d = group.hash.new_digest();
    d.update(&group_xor);
    d.update(&group.hash_bytes(username));
    d.update(salt);
    d.update(&a_pub.to_bytes_be());
    d.update(&b_pub.to_bytes_be());
    d.update(key);
    Ok(d.finalize().into_vec())
}

// M2 = H(A | M1 | K)
/// Server proof of the session.
pub fn compute_m2(group: &Group, a_pub: &BigUint, m1: &[u8], key: &[u8]) -> Vec<u8> {
    let mut d = group.hash.new_digest();
    d.update(&a_pub.to_bytes_be());
    d.update(m1);
    d.update(key);
    d.finalize().into_vec()
}

/// Generate a client ephemeral key pair `(a, A)` with `A = g^a mod N`,
/// resampling until `A` passes [`is_valid_ephemeral`].
pub fn client_key_pair<R: RngCore + CryptoRng>(rng: &mut R, group: &Group) -> (BigUint, BigUint) {
    loop {
        let a = ephemeral_exponent(rng, group);
        let a_pub = group.generator.modpow(&a, &group.n);
        if is_valid_ephemeral(group, &a_pub) {
            return (a, a_pub);
        }
    }
}

/// Generate a server ephemeral key pair `(b, B)` with
/// `B = (k*v + g^b) mod N`, resampling until `B` passes
/// [`is_valid_ephemeral`].
pub fn server_key_pair<R: RngCore + CryptoRng>(
    rng: &mut R,
    group: &Group,
    k: &BigUint,
    v: &BigUint,
) -> (BigUint, BigUint) {
    let n = &group.n;
    loop {
        let b = ephemeral_exponent(rng, group);
        let b_pub = ((k * v) % n + group.generator.modpow(&b, n)) % n;
        if is_valid_ephemeral(group, &b_pub) {
            return (b, b_pub);
        }
    }
}
