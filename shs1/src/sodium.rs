//! Bindings and helpers for accessing the libsodium functions the handshake
//! consumes
//!
//! Calls that can legitimately fail during a handshake (scalar
//! multiplication, key-format conversion, envelope opening, library
//! initialization) go through [sodium_call!] and return a `Result`;
//! verification predicates return `bool`; primitives whose only failure mode
//! would be a libsodium bug assert their return code. Length preconditions
//! are asserted throughout.

use anyhow::{ensure, Result};
use libsodium_sys as libsodium;
use log::trace;
use shs1_util::attempt;
use std::os::raw::c_ulonglong;

/// HMAC-SHA-512-256 tag length (`crypto_auth`)
pub const AUTH_TAG_LEN: usize = 32;
/// HMAC-SHA-512-256 key length
pub const AUTH_KEY_LEN: usize = 32;
/// X25519 scalars, points and products are all this long
pub const SCALARMULT_LEN: usize = 32;
/// Ed25519 public key length
pub const SIGN_PK_LEN: usize = 32;
/// Ed25519 secret key length (seed plus embedded public key)
pub const SIGN_SK_LEN: usize = 64;
/// Seed length for deterministic Ed25519 keypairs
pub const SIGN_SEED_LEN: usize = 32;
/// Ed25519 detached signature length
pub const SIGNATURE_LEN: usize = 64;
/// Curve25519 public key length (`crypto_box`)
pub const BOX_PK_LEN: usize = 32;
/// Curve25519 secret key length
pub const BOX_SK_LEN: usize = 32;
/// Seed length for deterministic Curve25519 keypairs
pub const BOX_SEED_LEN: usize = 32;
/// SHA-256 digest length
pub const SHA256_LEN: usize = 32;
/// XSalsa20-Poly1305 secretbox key length
pub const SECRETBOX_KEY_LEN: usize = 32;
/// XSalsa20-Poly1305 secretbox nonce length
pub const SECRETBOX_NONCE_LEN: usize = 24;
/// Poly1305 tag length
pub const SECRETBOX_TAG_LEN: usize = 16;

/// The all-zero secretbox nonce
///
/// Only sound for keys that are freshly derived and used for exactly one
/// sealing operation, which is how the handshake uses its box keys.
pub const NONCE0: [u8; SECRETBOX_NONCE_LEN] = [0u8; SECRETBOX_NONCE_LEN];

macro_rules! sodium_call {
    ($name:ident, $($args:expr),*) => { attempt!({
        ensure!(unsafe { libsodium::$name($($args),*) } > -1,
            "Error in libsodium's {}.", stringify!($name));
        Ok(())
    })};
    ($name:ident) => { sodium_call!($name, ) };
}

#[inline]
pub fn init() -> Result<()> {
    trace!("initializing libsodium");
    sodium_call!(sodium_init)
}

/// `tag <- hmac_{key}(msg)` (HMAC-SHA-512-256)
#[inline]
pub fn auth_into(tag: &mut [u8], msg: &[u8], key: &[u8]) {
    assert!(tag.len() == AUTH_TAG_LEN);
    assert!(key.len() == AUTH_KEY_LEN);
    let ret = unsafe {
        libsodium::crypto_auth(
            tag.as_mut_ptr(),
            msg.as_ptr(),
            msg.len() as c_ulonglong,
            key.as_ptr(),
        )
    };
    assert!(ret == 0, "Error in libsodium's crypto_auth.");
}

/// Constant-time check of `tag == hmac_{key}(msg)`
#[inline]
pub fn auth_verify(tag: &[u8], msg: &[u8], key: &[u8]) -> bool {
    assert!(tag.len() == AUTH_TAG_LEN);
    assert!(key.len() == AUTH_KEY_LEN);
    unsafe {
        libsodium::crypto_auth_verify(
            tag.as_ptr(),
            msg.as_ptr(),
            msg.len() as c_ulonglong,
            key.as_ptr(),
        ) == 0
    }
}

/// `q <- n * p` on Curve25519
///
/// libsodium reports the all-zero product through the return code, which
/// this wrapper surfaces as an error; accepting it would admit small-subgroup
/// points into the key derivation.
#[inline]
pub fn scalarmult_into(q: &mut [u8], n: &[u8], p: &[u8]) -> Result<()> {
    assert!(q.len() == SCALARMULT_LEN);
    assert!(n.len() == SCALARMULT_LEN);
    assert!(p.len() == SCALARMULT_LEN);
    sodium_call!(crypto_scalarmult, q.as_mut_ptr(), n.as_ptr(), p.as_ptr())
}

/// Map an Ed25519 public key to its Curve25519 form
///
/// Fails on encodings libsodium refuses to convert (non-canonical or
/// small-order points).
#[inline]
pub fn sign_pk_to_curve25519_into(curve_pk: &mut [u8], ed_pk: &[u8]) -> Result<()> {
    assert!(curve_pk.len() == SCALARMULT_LEN);
    assert!(ed_pk.len() == SIGN_PK_LEN);
    sodium_call!(
        crypto_sign_ed25519_pk_to_curve25519,
        curve_pk.as_mut_ptr(),
        ed_pk.as_ptr()
    )
}

/// Map an Ed25519 secret key to its Curve25519 scalar
#[inline]
pub fn sign_sk_to_curve25519_into(curve_sk: &mut [u8], ed_sk: &[u8]) -> Result<()> {
    assert!(curve_sk.len() == SCALARMULT_LEN);
    assert!(ed_sk.len() == SIGN_SK_LEN);
    sodium_call!(
        crypto_sign_ed25519_sk_to_curve25519,
        curve_sk.as_mut_ptr(),
        ed_sk.as_ptr()
    )
}

/// `sig <- sign_{sk}(msg)` (Ed25519, detached)
#[inline]
pub fn sign_detached_into(sig: &mut [u8], msg: &[u8], sk: &[u8]) {
    assert!(sig.len() == SIGNATURE_LEN);
    assert!(sk.len() == SIGN_SK_LEN);
    let ret = unsafe {
        libsodium::crypto_sign_detached(
            sig.as_mut_ptr(),
            std::ptr::null_mut(), // detached signatures always fill SIGNATURE_LEN bytes
            msg.as_ptr(),
            msg.len() as c_ulonglong,
            sk.as_ptr(),
        )
    };
    assert!(ret == 0, "Error in libsodium's crypto_sign_detached.");
}

/// Check a detached Ed25519 signature
#[inline]
pub fn sign_verify_detached(sig: &[u8], msg: &[u8], pk: &[u8]) -> bool {
    assert!(sig.len() == SIGNATURE_LEN);
    assert!(pk.len() == SIGN_PK_LEN);
    unsafe {
        libsodium::crypto_sign_verify_detached(
            sig.as_ptr(),
            msg.as_ptr(),
            msg.len() as c_ulonglong,
            pk.as_ptr(),
        ) == 0
    }
}

/// `out <- sha256(data)`
#[inline]
pub fn sha256_into(out: &mut [u8], data: &[u8]) {
    assert!(out.len() == SHA256_LEN);
    let ret = unsafe {
        libsodium::crypto_hash_sha256(out.as_mut_ptr(), data.as_ptr(), data.len() as c_ulonglong)
    };
    assert!(ret == 0, "Error in libsodium's crypto_hash_sha256.");
}

/// `ct <- secretbox_{key}(pt)` under `nonce` (XSalsa20-Poly1305)
#[inline]
pub fn secretbox_into(ct: &mut [u8], key: &[u8], nonce: &[u8], pt: &[u8]) {
    assert!(ct.len() == pt.len() + SECRETBOX_TAG_LEN);
    assert!(key.len() == SECRETBOX_KEY_LEN);
    assert!(nonce.len() == SECRETBOX_NONCE_LEN);
    let ret = unsafe {
        libsodium::crypto_secretbox_easy(
            ct.as_mut_ptr(),
            pt.as_ptr(),
            pt.len() as c_ulonglong,
            nonce.as_ptr(),
            key.as_ptr(),
        )
    };
    assert!(ret == 0, "Error in libsodium's crypto_secretbox_easy.");
}

/// Open a secretbox envelope; fails on Poly1305 mismatch
#[inline]
pub fn secretbox_open_into(pt: &mut [u8], key: &[u8], nonce: &[u8], ct: &[u8]) -> Result<()> {
    assert!(ct.len() == pt.len() + SECRETBOX_TAG_LEN);
    assert!(key.len() == SECRETBOX_KEY_LEN);
    assert!(nonce.len() == SECRETBOX_NONCE_LEN);
    sodium_call!(
        crypto_secretbox_open_easy,
        pt.as_mut_ptr(),
        ct.as_ptr(),
        ct.len() as c_ulonglong,
        nonce.as_ptr(),
        key.as_ptr()
    )
}

/// Generate a fresh Ed25519 keypair
#[inline]
pub fn sign_keypair_into(pk: &mut [u8], sk: &mut [u8]) {
    assert!(pk.len() == SIGN_PK_LEN);
    assert!(sk.len() == SIGN_SK_LEN);
    let ret = unsafe { libsodium::crypto_sign_keypair(pk.as_mut_ptr(), sk.as_mut_ptr()) };
    assert!(ret == 0, "Error in libsodium's crypto_sign_keypair.");
}

/// Derive an Ed25519 keypair from a 32 byte seed
#[inline]
pub fn sign_seed_keypair_into(pk: &mut [u8], sk: &mut [u8], seed: &[u8]) {
    assert!(pk.len() == SIGN_PK_LEN);
    assert!(sk.len() == SIGN_SK_LEN);
    assert!(seed.len() == SIGN_SEED_LEN);
    let ret = unsafe {
        libsodium::crypto_sign_seed_keypair(pk.as_mut_ptr(), sk.as_mut_ptr(), seed.as_ptr())
    };
    assert!(ret == 0, "Error in libsodium's crypto_sign_seed_keypair.");
}

/// Generate a fresh Curve25519 keypair
#[inline]
pub fn box_keypair_into(pk: &mut [u8], sk: &mut [u8]) {
    assert!(pk.len() == BOX_PK_LEN);
    assert!(sk.len() == BOX_SK_LEN);
    let ret = unsafe { libsodium::crypto_box_keypair(pk.as_mut_ptr(), sk.as_mut_ptr()) };
    assert!(ret == 0, "Error in libsodium's crypto_box_keypair.");
}

/// Derive a Curve25519 keypair from a 32 byte seed
#[inline]
pub fn box_seed_keypair_into(pk: &mut [u8], sk: &mut [u8], seed: &[u8]) {
    assert!(pk.len() == BOX_PK_LEN);
    assert!(sk.len() == BOX_SK_LEN);
    assert!(seed.len() == BOX_SEED_LEN);
    let ret = unsafe {
        libsodium::crypto_box_seed_keypair(pk.as_mut_ptr(), sk.as_mut_ptr(), seed.as_ptr())
    };
    assert!(ret == 0, "Error in libsodium's crypto_box_seed_keypair.");
}
