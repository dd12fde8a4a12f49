//! Helpers used in tests, benchmarks and examples
//!
//! Key generation is deliberately not part of the handshake sessions; these
//! wrappers exist so tests and demos can mint inputs without pulling in a
//! separate identity layer.

use zerocopy::FromZeroes;

use crate::msgs::{ClientAuth, ClientChallenge, ServerAccept, ServerChallenge};
use crate::protocol::{AppKey, ClientHandshake, EphPk, EphSk, ServerHandshake, SignPk, SignSk};
use crate::{sodium, HandshakeError};

/// Generate a fresh Ed25519 identity keypair
pub fn sign_keypair() -> (SignPk, SignSk) {
    let mut pk = SignPk::zero();
    let mut sk = SignSk::zero();
    sodium::sign_keypair_into(&mut *pk, sk.secret_mut());
    (pk, sk)
}

/// Derive an Ed25519 identity keypair from a 32 byte seed
pub fn sign_seed_keypair(seed: &[u8; sodium::SIGN_SEED_LEN]) -> (SignPk, SignSk) {
    let mut pk = SignPk::zero();
    let mut sk = SignSk::zero();
    sodium::sign_seed_keypair_into(&mut *pk, sk.secret_mut(), seed);
    (pk, sk)
}

/// Generate a fresh ephemeral Curve25519 keypair
pub fn eph_keypair() -> (EphPk, EphSk) {
    let mut pk = EphPk::zero();
    let mut sk = EphSk::zero();
    sodium::box_keypair_into(&mut *pk, sk.secret_mut());
    (pk, sk)
}

/// Derive an ephemeral Curve25519 keypair from a 32 byte seed
pub fn eph_seed_keypair(seed: &[u8; sodium::BOX_SEED_LEN]) -> (EphPk, EphSk) {
    let mut pk = EphPk::zero();
    let mut sk = EphSk::zero();
    sodium::box_seed_keypair_into(&mut *pk, sk.secret_mut(), seed);
    (pk, sk)
}

/// A client and a server wired up with matching fresh keys, ready to shake
/// hands
pub fn session_pair(app: &AppKey) -> (ClientHandshake, ServerHandshake) {
    let (client_pk, client_sk) = sign_keypair();
    let (server_pk, server_sk) = sign_keypair();
    let (client_eph_pk, client_eph_sk) = eph_keypair();
    let (server_eph_pk, server_eph_sk) = eph_keypair();

    let client = ClientHandshake::new(
        app.clone(),
        client_pk,
        client_sk,
        client_eph_pk,
        client_eph_sk,
        server_pk,
    );
    let server = ServerHandshake::new(app.clone(), server_pk, server_sk, server_eph_pk, server_eph_sk);
    (client, server)
}

/// Pump the four messages between a client and a server, stopping at the
/// first failure
pub fn run_handshake(
    client: &mut ClientHandshake,
    server: &mut ServerHandshake,
) -> Result<(), HandshakeError> {
    let mut m1 = ClientChallenge::new_zeroed();
    client.produce_client_challenge(&mut m1)?;
    server.verify_client_challenge(&m1)?;

    let mut m2 = ServerChallenge::new_zeroed();
    server.produce_server_challenge(&mut m2)?;
    client.verify_server_challenge(&m2)?;

    let mut m3 = ClientAuth::new_zeroed();
    client.produce_client_auth(&mut m3)?;
    server.verify_client_auth(&m3)?;

    let mut m4 = ServerAccept::new_zeroed();
    server.produce_server_accept(&mut m4)?;
    client.verify_server_accept(&m4)?;

    Ok(())
}
