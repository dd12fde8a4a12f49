//! Secret-Handshake v1 (SHS1): a four-message, mutually authenticating key
//! agreement between a client and a server that share a 32 byte application
//! key and each hold a long-term Ed25519 identity.
//!
//! The interesting parts live in [protocol]: one session type per role,
//! stepping through the fixed message sequence and deriving the outer
//! transport keys on success. [msgs] holds the wire views of the four
//! messages, [sodium] the libsodium primitive bindings.
//!
//! Transport I/O, framing and the box-stream cipher consuming the derived
//! keys are out of scope; callers move the fixed-length messages between the
//! two sessions however they like.

pub mod msgs;
pub mod protocol;
pub mod sodium;
pub mod testutils;

/// The ways a handshake session can fail
///
/// Every error is terminal for the session; there is no retry or partial
/// acceptance. Which step and primitive rejected is logged but deliberately
/// not encoded here — the remote peer only ever observes the connection
/// closing.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeError {
    /// An inbound message failed authentication: HMAC mismatch on a
    /// challenge, Poly1305 failure on an envelope, or an Ed25519 signature
    /// that does not verify
    #[error("inbound message failed authentication")]
    InvalidMessage,
    /// An Ed25519-to-Curve25519 conversion refused its input, or a scalar
    /// multiplication produced the all-zero output
    #[error("peer key rejected by a cryptographic primitive")]
    InvalidKey,
    /// A session operation was invoked outside its protocol position
    #[error("handshake operation invoked out of order")]
    Misuse,
}
