//! Wire views of the four handshake messages
//!
//! Every message is a fixed-length byte string; there are no length
//! prefixes, type tags or version fields. The structs here are plain
//! `repr(C)` byte layouts so a message can be overlaid on a network buffer
//! with [zerocopy] (`ref_from` / `mut_from` / `as_bytes`) without copying.

use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::sodium;

/// Length of the client's identity proof `H`: a detached signature followed
/// by the signer's long-term public key
pub const HELLO_LEN: usize = sodium::SIGNATURE_LEN + sodium::SIGN_PK_LEN;

/// [ClientChallenge] on the wire: 64 bytes
pub const CLIENT_CHALLENGE_LEN: usize = sodium::AUTH_TAG_LEN + sodium::BOX_PK_LEN;
/// [ServerChallenge] on the wire: 64 bytes
pub const SERVER_CHALLENGE_LEN: usize = sodium::AUTH_TAG_LEN + sodium::BOX_PK_LEN;
/// [ClientAuth] on the wire: 112 bytes
pub const CLIENT_AUTH_LEN: usize = HELLO_LEN + sodium::SECRETBOX_TAG_LEN;
/// [ServerAccept] on the wire: 80 bytes
pub const SERVER_ACCEPT_LEN: usize = sodium::SIGNATURE_LEN + sodium::SECRETBOX_TAG_LEN;

/// First message, client to server: `hmac_K(a_p) ‖ a_p`
#[derive(AsBytes, FromBytes, FromZeroes, Debug)]
#[repr(C)]
pub struct ClientChallenge {
    /// `hmac_K(a_p)`
    pub mac: [u8; sodium::AUTH_TAG_LEN],
    /// The client's ephemeral Curve25519 public key `a_p`
    pub eph_pub: [u8; sodium::BOX_PK_LEN],
}

/// Second message, server to client: `hmac_K(b_p) ‖ b_p`
#[derive(AsBytes, FromBytes, FromZeroes, Debug)]
#[repr(C)]
pub struct ServerChallenge {
    /// `hmac_K(b_p)`
    pub mac: [u8; sodium::AUTH_TAG_LEN],
    /// The server's ephemeral Curve25519 public key `b_p`
    pub eph_pub: [u8; sodium::BOX_PK_LEN],
}

/// Third message, client to server: the hello `H`, sealed with
/// `sha256(K ‖ a_s·b_p ‖ a_s·B_p)` under the zero nonce
#[derive(AsBytes, FromBytes, FromZeroes, Debug)]
#[repr(C)]
pub struct ClientAuth {
    /// 96 bytes of hello plus the Poly1305 tag
    pub envelope: [u8; CLIENT_AUTH_LEN],
}

/// Fourth message, server to client: the accept signature, sealed with
/// `sha256(K ‖ b_s·a_p ‖ B_s·a_p ‖ b_s·A_p)` under the zero nonce
#[derive(AsBytes, FromBytes, FromZeroes, Debug)]
#[repr(C)]
pub struct ServerAccept {
    /// 64 bytes of signature plus the Poly1305 tag
    pub envelope: [u8; SERVER_ACCEPT_LEN],
}
