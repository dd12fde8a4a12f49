use zerocopy::{AsBytes, FromZeroes};

use shs1::msgs::{ClientAuth, ClientChallenge, ServerAccept, ServerChallenge};
use shs1::protocol::{
    AppKey, ClientHandshake, EphPk, EphSk, HandshakeOutcome, ServerHandshake, SignPk, SignSk,
};
use shs1::testutils::{
    eph_keypair, eph_seed_keypair, run_handshake, session_pair, sign_keypair, sign_seed_keypair,
};
use shs1::{sodium, HandshakeError};

fn setup() {
    sodium::init().unwrap();
    let _ = env_logger::builder().is_test(true).try_init();
}

/// All key material for one client/server pairing, so that fresh sessions
/// over the same keys can be minted at will
struct Keys {
    app: AppKey,
    client_id: (SignPk, SignSk),
    server_id: (SignPk, SignSk),
    client_eph: (EphPk, EphSk),
    server_eph: (EphPk, EphSk),
}

impl Keys {
    fn fresh() -> Self {
        Keys {
            app: AppKey::random(),
            client_id: sign_keypair(),
            server_id: sign_keypair(),
            client_eph: eph_keypair(),
            server_eph: eph_keypair(),
        }
    }

    fn seeded(app: AppKey) -> Self {
        Keys {
            app,
            client_id: sign_seed_keypair(&[1u8; 32]),
            server_id: sign_seed_keypair(&[2u8; 32]),
            client_eph: eph_seed_keypair(&[3u8; 32]),
            server_eph: eph_seed_keypair(&[4u8; 32]),
        }
    }

    fn client(&self) -> ClientHandshake {
        ClientHandshake::new(
            self.app.clone(),
            self.client_id.0,
            self.client_id.1.clone(),
            self.client_eph.0,
            self.client_eph.1.clone(),
            self.server_id.0,
        )
    }

    fn server(&self) -> ServerHandshake {
        ServerHandshake::new(
            self.app.clone(),
            self.server_id.0,
            self.server_id.1.clone(),
            self.server_eph.0,
            self.server_eph.1.clone(),
        )
    }
}

/// The four wire messages of an honest handshake over `keys`, together with
/// both outcomes
fn wire(keys: &Keys) -> ([u8; 64], [u8; 64], [u8; 112], [u8; 80], HandshakeOutcome, HandshakeOutcome) {
    let (mut client, mut server) = (keys.client(), keys.server());

    let mut m1 = ClientChallenge::new_zeroed();
    client.produce_client_challenge(&mut m1).unwrap();
    server.verify_client_challenge(&m1).unwrap();

    let mut m2 = ServerChallenge::new_zeroed();
    server.produce_server_challenge(&mut m2).unwrap();
    client.verify_server_challenge(&m2).unwrap();

    let mut m3 = ClientAuth::new_zeroed();
    client.produce_client_auth(&mut m3).unwrap();
    server.verify_client_auth(&m3).unwrap();

    let mut m4 = ServerAccept::new_zeroed();
    server.produce_server_accept(&mut m4).unwrap();
    client.verify_server_accept(&m4).unwrap();

    let mut w1 = [0u8; 64];
    let mut w2 = [0u8; 64];
    let mut w3 = [0u8; 112];
    let mut w4 = [0u8; 80];
    w1.copy_from_slice(m1.as_bytes());
    w2.copy_from_slice(m2.as_bytes());
    w3.copy_from_slice(m3.as_bytes());
    w4.copy_from_slice(m4.as_bytes());

    (w1, w2, w3, w4, client.outcome().unwrap(), server.outcome().unwrap())
}

#[test]
fn round_trip_derives_mirrored_outcomes() {
    setup();
    let (mut client, mut server) = session_pair(&AppKey::random());
    run_handshake(&mut client, &mut server).unwrap();

    let c = client.outcome().unwrap();
    let s = server.outcome().unwrap();
    assert_eq!(c.encryption_key.secret(), s.decryption_key.secret());
    assert_eq!(c.decryption_key.secret(), s.encryption_key.secret());
    assert_eq!(c.encryption_nonce, s.decryption_nonce);
    assert_eq!(c.decryption_nonce, s.encryption_nonce);

    // the two directions must not collapse into one key
    assert_ne!(c.encryption_key.secret(), c.decryption_key.secret());
}

#[test]
fn app_key_mismatch_fails_the_first_verification() {
    setup();

    // server holds a different application key
    let keys = Keys::fresh();
    let mut client = keys.client();
    let mut server = ServerHandshake::new(
        AppKey::random(),
        keys.server_id.0,
        keys.server_id.1.clone(),
        keys.server_eph.0,
        keys.server_eph.1.clone(),
    );

    let mut m1 = ClientChallenge::new_zeroed();
    client.produce_client_challenge(&mut m1).unwrap();
    assert_eq!(
        server.verify_client_challenge(&m1),
        Err(HandshakeError::InvalidMessage)
    );
}

#[test]
fn app_key_mismatch_is_caught_by_the_client_too() {
    setup();
    let keys = Keys::fresh();
    let mut client = keys.client();

    let mut m1 = ClientChallenge::new_zeroed();
    client.produce_client_challenge(&mut m1).unwrap();

    // a server challenge authenticated under some other application key
    let mut m2 = ServerChallenge::new_zeroed();
    m2.eph_pub = keys.server_eph.0.value;
    sodium::auth_into(&mut m2.mac, &m2.eph_pub, AppKey::random().secret());
    assert_eq!(
        client.verify_server_challenge(&m2),
        Err(HandshakeError::InvalidMessage)
    );
}

#[test]
fn wrong_server_identity_fails_the_handshake() {
    setup();
    let keys = Keys::fresh();

    // client expects a third party's identity instead of the real server's
    let (imposter_pk, _) = sign_keypair();
    let mut client = ClientHandshake::new(
        keys.app.clone(),
        keys.client_id.0,
        keys.client_id.1.clone(),
        keys.client_eph.0,
        keys.client_eph.1.clone(),
        imposter_pk,
    );
    let mut server = keys.server();

    let mut m1 = ClientChallenge::new_zeroed();
    client.produce_client_challenge(&mut m1).unwrap();
    server.verify_client_challenge(&m1).unwrap();

    let mut m2 = ServerChallenge::new_zeroed();
    server.produce_server_challenge(&mut m2).unwrap();
    client.verify_server_challenge(&m2).unwrap();

    // the auth envelope is keyed through a_s * B_p, so the honest server
    // cannot even open it
    let mut m3 = ClientAuth::new_zeroed();
    client.produce_client_auth(&mut m3).unwrap();
    assert_eq!(
        server.verify_client_auth(&m3),
        Err(HandshakeError::InvalidMessage)
    );
}

#[test]
fn wrong_client_identity_fails_signature_verification() {
    setup();
    let keys = Keys::fresh();

    // client claims identity A_p but signs with an unrelated secret key
    let (_, rogue_sk) = sign_keypair();
    let mut client = ClientHandshake::new(
        keys.app.clone(),
        keys.client_id.0,
        rogue_sk,
        keys.client_eph.0,
        keys.client_eph.1.clone(),
        keys.server_id.0,
    );
    let mut server = keys.server();

    let mut m1 = ClientChallenge::new_zeroed();
    client.produce_client_challenge(&mut m1).unwrap();
    server.verify_client_challenge(&m1).unwrap();

    let mut m2 = ServerChallenge::new_zeroed();
    server.produce_server_challenge(&mut m2).unwrap();
    client.verify_server_challenge(&m2).unwrap();

    let mut m3 = ClientAuth::new_zeroed();
    client.produce_client_auth(&mut m3).unwrap();
    assert_eq!(
        server.verify_client_auth(&m3),
        Err(HandshakeError::InvalidMessage)
    );
}

#[test]
fn any_flipped_bit_in_a_challenge_is_caught() {
    setup();
    let keys = Keys::fresh();
    let (w1, w2, _, _, _, _) = wire(&keys);

    for bit in 0..w1.len() * 8 {
        let mut m1 = ClientChallenge::new_zeroed();
        m1.as_bytes_mut().copy_from_slice(&w1);
        m1.as_bytes_mut()[bit / 8] ^= 1 << (bit % 8);
        assert_eq!(
            keys.server().verify_client_challenge(&m1),
            Err(HandshakeError::InvalidMessage),
            "client challenge bit {bit}"
        );
    }

    for bit in 0..w2.len() * 8 {
        let mut client = keys.client();
        let mut m1 = ClientChallenge::new_zeroed();
        client.produce_client_challenge(&mut m1).unwrap();

        let mut m2 = ServerChallenge::new_zeroed();
        m2.as_bytes_mut().copy_from_slice(&w2);
        m2.as_bytes_mut()[bit / 8] ^= 1 << (bit % 8);
        assert_eq!(
            client.verify_server_challenge(&m2),
            Err(HandshakeError::InvalidMessage),
            "server challenge bit {bit}"
        );
    }
}

#[test]
fn any_flipped_bit_in_an_envelope_is_caught() {
    setup();
    let keys = Keys::fresh();
    let (w1, w2, w3, w4, _, _) = wire(&keys);

    let m1 = {
        let mut m = ClientChallenge::new_zeroed();
        m.as_bytes_mut().copy_from_slice(&w1);
        m
    };
    let m2 = {
        let mut m = ServerChallenge::new_zeroed();
        m.as_bytes_mut().copy_from_slice(&w2);
        m
    };

    for bit in 0..w3.len() * 8 {
        let mut server = keys.server();
        server.verify_client_challenge(&m1).unwrap();
        let mut own_m2 = ServerChallenge::new_zeroed();
        server.produce_server_challenge(&mut own_m2).unwrap();

        let mut m3 = ClientAuth::new_zeroed();
        m3.as_bytes_mut().copy_from_slice(&w3);
        m3.as_bytes_mut()[bit / 8] ^= 1 << (bit % 8);
        assert_eq!(
            server.verify_client_auth(&m3),
            Err(HandshakeError::InvalidMessage),
            "client auth bit {bit}"
        );
    }

    for bit in 0..w4.len() * 8 {
        let mut client = keys.client();
        let mut own_m1 = ClientChallenge::new_zeroed();
        client.produce_client_challenge(&mut own_m1).unwrap();
        client.verify_server_challenge(&m2).unwrap();
        let mut own_m3 = ClientAuth::new_zeroed();
        client.produce_client_auth(&mut own_m3).unwrap();

        let mut m4 = ServerAccept::new_zeroed();
        m4.as_bytes_mut().copy_from_slice(&w4);
        m4.as_bytes_mut()[bit / 8] ^= 1 << (bit % 8);
        assert_eq!(
            client.verify_server_accept(&m4),
            Err(HandshakeError::InvalidMessage),
            "server accept bit {bit}"
        );
    }
}

#[test]
fn zero_point_from_the_peer_is_rejected_as_invalid_key() {
    setup();
    let keys = Keys::fresh();
    let mut client = keys.client();

    let mut m1 = ClientChallenge::new_zeroed();
    client.produce_client_challenge(&mut m1).unwrap();

    // a correctly authenticated challenge carrying the all-zero point, which
    // forces the scalar multiplication to its failure output
    let mut m2 = ServerChallenge::new_zeroed();
    sodium::auth_into(&mut m2.mac, &m2.eph_pub, keys.app.secret());
    client.verify_server_challenge(&m2).unwrap();

    let mut m3 = ClientAuth::new_zeroed();
    assert_eq!(
        client.produce_client_auth(&mut m3),
        Err(HandshakeError::InvalidKey)
    );

    // the session is dead afterwards
    assert_eq!(
        client.produce_client_auth(&mut m3),
        Err(HandshakeError::Misuse)
    );
}

#[test]
fn unusable_server_identity_is_rejected_as_invalid_key() {
    setup();
    let keys = Keys::fresh();

    // the all-zero encoding is refused by the Ed25519-to-Curve25519 conversion
    let mut client = ClientHandshake::new(
        keys.app.clone(),
        keys.client_id.0,
        keys.client_id.1.clone(),
        keys.client_eph.0,
        keys.client_eph.1.clone(),
        SignPk::zero(),
    );
    let mut server = keys.server();

    let mut m1 = ClientChallenge::new_zeroed();
    client.produce_client_challenge(&mut m1).unwrap();
    server.verify_client_challenge(&m1).unwrap();

    let mut m2 = ServerChallenge::new_zeroed();
    server.produce_server_challenge(&mut m2).unwrap();
    client.verify_server_challenge(&m2).unwrap();

    let mut m3 = ClientAuth::new_zeroed();
    assert_eq!(
        client.produce_client_auth(&mut m3),
        Err(HandshakeError::InvalidKey)
    );
}

#[test]
fn fixed_inputs_give_deterministic_wire_traffic() {
    setup();

    // with every input pinned nothing in the handshake consumes randomness:
    // signatures are deterministic, the box nonce is zero
    let run_a = wire(&Keys::seeded(AppKey::zero()));
    let run_b = wire(&Keys::seeded(AppKey::zero()));

    assert_eq!(run_a.0, run_b.0);
    assert_eq!(run_a.1, run_b.1);
    assert_eq!(run_a.2, run_b.2);
    assert_eq!(run_a.3, run_b.3);

    assert_eq!(run_a.4.encryption_key.secret(), run_b.4.encryption_key.secret());
    assert_eq!(run_a.4.decryption_key.secret(), run_b.4.decryption_key.secret());
    assert_eq!(run_a.4.encryption_nonce, run_b.4.encryption_nonce);
    assert_eq!(run_a.4.decryption_nonce, run_b.4.decryption_nonce);

    // and the server side of run A mirrors the client side of run B
    assert_eq!(run_a.5.encryption_key.secret(), run_b.4.decryption_key.secret());
    assert_eq!(run_a.5.decryption_key.secret(), run_b.4.encryption_key.secret());
}
