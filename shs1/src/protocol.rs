//! The handshake state machines for both roles
//!
//! # Overview
//!
//! A handshake is four messages long: the two parties first prove knowledge
//! of the shared application key by exchanging HMAC'd ephemeral keys
//! ([ClientChallenge](crate::msgs::ClientChallenge),
//! [ServerChallenge](crate::msgs::ServerChallenge)), then the client proves
//! its identity inside an encrypted envelope
//! ([ClientAuth](crate::msgs::ClientAuth)) and the server answers with a
//! signature over everything so far ([ServerAccept](crate::msgs::ServerAccept)).
//! Afterwards both sides derive the same [HandshakeOutcome] with the key and
//! nonce pairs swapped, ready to hand to an outer box-stream transport.
//!
//! Sessions are single use and strictly sequential; any verification failure
//! is terminal. Dropping a session wipes every intermediate secret it
//! accumulated.
//!
//! # Example
//!
//! ```
//! use shs1::msgs::{ClientAuth, ClientChallenge, ServerAccept, ServerChallenge};
//! use shs1::protocol::{AppKey, ClientHandshake, ServerHandshake};
//! use shs1::{sodium, testutils};
//! use zerocopy::FromZeroes;
//! # fn main() -> anyhow::Result<()> {
//!
//! // always initialize libsodium before anything
//! sodium::init()?;
//!
//! // the application key is shared out-of-band ...
//! let app = AppKey::random();
//!
//! // ... and both parties hold a long-term identity and a fresh ephemeral key
//! let (client_pk, client_sk) = testutils::sign_keypair();
//! let (server_pk, server_sk) = testutils::sign_keypair();
//! let (client_eph_pk, client_eph_sk) = testutils::eph_keypair();
//! let (server_eph_pk, server_eph_sk) = testutils::eph_keypair();
//!
//! let mut client = ClientHandshake::new(
//!     app.clone(), client_pk, client_sk, client_eph_pk, client_eph_sk, server_pk);
//! let mut server = ServerHandshake::new(
//!     app, server_pk, server_sk, server_eph_pk, server_eph_sk);
//!
//! // the four messages, in order
//! let mut m1 = ClientChallenge::new_zeroed();
//! client.produce_client_challenge(&mut m1)?;
//! server.verify_client_challenge(&m1)?;
//!
//! let mut m2 = ServerChallenge::new_zeroed();
//! server.produce_server_challenge(&mut m2)?;
//! client.verify_server_challenge(&m2)?;
//!
//! let mut m3 = ClientAuth::new_zeroed();
//! client.produce_client_auth(&mut m3)?;
//! server.verify_client_auth(&m3)?;
//!
//! let mut m4 = ServerAccept::new_zeroed();
//! server.produce_server_accept(&mut m4)?;
//! client.verify_server_accept(&m4)?;
//!
//! // all done! Both parties now hold mirrored transport keys
//! let c = client.outcome()?;
//! let s = server.outcome()?;
//! assert_eq!(c.encryption_key.secret(), s.decryption_key.secret());
//! assert_eq!(c.decryption_key.secret(), s.encryption_key.secret());
//! assert_eq!(c.encryption_nonce, s.decryption_nonce);
//! assert_eq!(c.decryption_nonce, s.encryption_nonce);
//! # Ok(())
//! # }
//! ```

use log::debug;
use zeroize::Zeroize;

use shs1_secret_memory::{Public, Secret};
use shs1_util::cat;

use crate::msgs::{ClientAuth, ClientChallenge, ServerAccept, ServerChallenge, HELLO_LEN};
use crate::{sodium, HandshakeError};

/// The 32 byte application key `K`, shared out-of-band
pub type AppKey = Secret<{ sodium::AUTH_KEY_LEN }>;
/// Long-term Ed25519 signing public key
pub type SignPk = Public<{ sodium::SIGN_PK_LEN }>;
/// Long-term Ed25519 signing secret key
pub type SignSk = Secret<{ sodium::SIGN_SK_LEN }>;
/// Ephemeral Curve25519 public key
pub type EphPk = Public<{ sodium::BOX_PK_LEN }>;
/// Ephemeral Curve25519 secret key
pub type EphSk = Secret<{ sodium::BOX_SK_LEN }>;
/// Symmetric transport key
pub type SymKey = Secret<{ sodium::SHA256_LEN }>;
/// Symmetric transport nonce (an HMAC tag; the transport truncates as needed)
pub type SymNonce = Public<{ sodium::AUTH_TAG_LEN }>;

/// The client's identity proof `H = sign_{A_s}(K ‖ B_p ‖ sha256(a_s·b_p)) ‖ A_p`
type Hello = Secret<HELLO_LEN>;
/// An X25519 shared secret
type DhSecret = Secret<{ sodium::SCALARMULT_LEN }>;
/// A Curve25519 scalar derived from an Ed25519 secret key
type CurveSk = Secret<{ sodium::SCALARMULT_LEN }>;

// Lengths of the concatenations hashed or signed during the handshake
const BOX_KEY_1_MSG_LEN: usize = sodium::AUTH_KEY_LEN + 2 * sodium::SCALARMULT_LEN;
const BOX_KEY_2_MSG_LEN: usize = sodium::AUTH_KEY_LEN + 3 * sodium::SCALARMULT_LEN;
const HELLO_SIGN_MSG_LEN: usize =
    sodium::AUTH_KEY_LEN + sodium::SIGN_PK_LEN + sodium::SHA256_LEN;
const ACCEPT_SIGN_MSG_LEN: usize = sodium::AUTH_KEY_LEN + HELLO_LEN + sodium::SHA256_LEN;
const OUTCOME_KEY_MSG_LEN: usize = sodium::SHA256_LEN + sodium::SIGN_PK_LEN;

/// The symmetric values a completed handshake hands to the outer transport
///
/// Client and server derive mirrored outcomes: one party's encryption pair
/// equals the other party's decryption pair.
#[derive(Debug)]
pub struct HandshakeOutcome {
    /// Key for the sending direction
    pub encryption_key: SymKey,
    /// Starting nonce for the sending direction
    pub encryption_nonce: SymNonce,
    /// Key for the receiving direction
    pub decryption_key: SymKey,
    /// Starting nonce for the receiving direction
    pub decryption_nonce: SymNonce,
}

/// Protocol position of a [ClientHandshake]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ClientStep {
    SendChallenge,
    AwaitServerChallenge,
    SendAuth,
    AwaitServerAccept,
    Complete,
    Failed,
}

/// Protocol position of a [ServerHandshake]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ServerStep {
    AwaitClientChallenge,
    SendChallenge,
    AwaitClientAuth,
    SendAccept,
    Complete,
    Failed,
}

/// Client role of the handshake
///
/// Construct one per connection attempt, call the four step operations in
/// order, read the [HandshakeOutcome], drop the session. All key material
/// handed in is copied into session-owned storage that is wiped on drop.
pub struct ClientHandshake {
    next: ClientStep,

    /// Application key `K`
    app: AppKey,
    /// Long-term signing public key mine (`A_p`)
    spkm: SignPk,
    /// Long-term signing secret key mine (`A_s`)
    sskm: SignSk,
    /// Ephemeral public key mine (`a_p`)
    epkm: EphPk,
    /// Ephemeral secret key mine (`a_s`)
    eskm: EphSk,
    /// Long-term signing public key theirs (`B_p`)
    spkt: SignPk,

    /// Ephemeral public key theirs (`b_p`), learned from the server challenge
    epkt: EphPk,
    /// `a_s * b_p`
    eph_shared: DhSecret,
    /// `a_s * B_p`
    lterm_shared: DhSecret,
    /// `sha256(a_s * b_p)`
    shared_hash: SymKey,
    /// `H`, as sent inside the client auth envelope
    hello: Hello,
    /// `sha256(K ‖ a_s·b_p ‖ a_s·B_p ‖ A_s·b_p)`, retained for [Self::outcome]
    box_sec: SymKey,
}

impl ClientHandshake {
    /// Create a client session from the application key, the client's
    /// long-term signing keypair, a fresh ephemeral Curve25519 keypair and
    /// the expected server identity
    pub fn new(
        app: AppKey,
        spkm: SignPk,
        sskm: SignSk,
        epkm: EphPk,
        eskm: EphSk,
        spkt: SignPk,
    ) -> Self {
        Self {
            next: ClientStep::SendChallenge,
            app,
            spkm,
            sskm,
            epkm,
            eskm,
            spkt,
            epkt: EphPk::zero(),
            eph_shared: DhSecret::zero(),
            lterm_shared: DhSecret::zero(),
            shared_hash: SymKey::zero(),
            hello: Hello::zero(),
            box_sec: SymKey::zero(),
        }
    }

    fn guard(&self, at: ClientStep) -> Result<(), HandshakeError> {
        if self.next != at {
            debug!(
                "client operation for {:?} refused at position {:?}",
                at, self.next
            );
            return Err(HandshakeError::Misuse);
        }
        Ok(())
    }

    fn fail(&mut self, err: HandshakeError) -> HandshakeError {
        self.next = ClientStep::Failed;
        err
    }

    /// First message: `hmac_K(a_p) ‖ a_p`
    pub fn produce_client_challenge(
        &mut self,
        out: &mut ClientChallenge,
    ) -> Result<(), HandshakeError> {
        self.guard(ClientStep::SendChallenge)?;

        sodium::auth_into(&mut out.mac, &*self.epkm, self.app.secret());
        out.eph_pub = self.epkm.value;

        self.next = ClientStep::AwaitServerChallenge;
        Ok(())
    }

    /// Check `hmac_K(b_p) ‖ b_p` and adopt the server's ephemeral key
    pub fn verify_server_challenge(
        &mut self,
        msg: &ServerChallenge,
    ) -> Result<(), HandshakeError> {
        self.guard(ClientStep::AwaitServerChallenge)?;

        if !sodium::auth_verify(&msg.mac, &msg.eph_pub, self.app.secret()) {
            debug!("server challenge: application key mac mismatch");
            return Err(self.fail(HandshakeError::InvalidMessage));
        }

        // b_p
        self.epkt = EphPk::new(msg.eph_pub);

        self.next = ClientStep::SendAuth;
        Ok(())
    }

    /// Third message: `secretbox_{sha256(K ‖ a_s·b_p ‖ a_s·B_p)}(H)` under
    /// the zero nonce, with `H = sign_{A_s}(K ‖ B_p ‖ sha256(a_s·b_p)) ‖ A_p`
    pub fn produce_client_auth(&mut self, out: &mut ClientAuth) -> Result<(), HandshakeError> {
        self.guard(ClientStep::SendAuth)?;

        // a_s * b_p
        if let Err(e) =
            sodium::scalarmult_into(self.eph_shared.secret_mut(), self.eskm.secret(), &*self.epkt)
        {
            debug!("client auth: ephemeral shared secret rejected: {e}");
            return Err(self.fail(HandshakeError::InvalidKey));
        }

        // B_p in its Curve25519 form
        let mut curve_spkt = [0u8; sodium::SCALARMULT_LEN];
        if let Err(e) = sodium::sign_pk_to_curve25519_into(&mut curve_spkt, &*self.spkt) {
            debug!("client auth: server identity key conversion refused: {e}");
            return Err(self.fail(HandshakeError::InvalidKey));
        }

        // a_s * B_p
        if let Err(e) = sodium::scalarmult_into(
            self.lterm_shared.secret_mut(),
            self.eskm.secret(),
            &curve_spkt,
        ) {
            debug!("client auth: long-term shared secret rejected: {e}");
            return Err(self.fail(HandshakeError::InvalidKey));
        }

        // sha256(a_s * b_p)
        sodium::sha256_into(self.shared_hash.secret_mut(), self.eph_shared.secret());

        // H = sign_{A_s}(K | B_p | sha256(a_s * b_p)) | A_p
        let mut to_sign = cat![HELLO_SIGN_MSG_LEN;
            self.app.secret(), &*self.spkt, self.shared_hash.secret()];
        let (sig, embedded_pk) = self.hello.secret_mut().split_at_mut(sodium::SIGNATURE_LEN);
        sodium::sign_detached_into(sig, &to_sign, self.sskm.secret());
        embedded_pk.copy_from_slice(&*self.spkm);
        to_sign.zeroize();

        // secretbox key: sha256(K | a_s * b_p | a_s * B_p)
        let mut box_key = SymKey::zero();
        let mut key_msg = cat![BOX_KEY_1_MSG_LEN;
            self.app.secret(), self.eph_shared.secret(), self.lterm_shared.secret()];
        sodium::sha256_into(box_key.secret_mut(), &key_msg);
        key_msg.zeroize();

        sodium::secretbox_into(
            &mut out.envelope,
            box_key.secret(),
            &sodium::NONCE0,
            self.hello.secret(),
        );

        self.next = ClientStep::AwaitServerAccept;
        Ok(())
    }

    /// Open the accept envelope and check the server's signature over the
    /// whole handshake
    pub fn verify_server_accept(&mut self, msg: &ServerAccept) -> Result<(), HandshakeError> {
        self.guard(ClientStep::AwaitServerAccept)?;

        // A_s in its Curve25519 form
        let mut curve_sskm = CurveSk::zero();
        if let Err(e) = sodium::sign_sk_to_curve25519_into(curve_sskm.secret_mut(), self.sskm.secret())
        {
            debug!("server accept: own identity key conversion refused: {e}");
            return Err(self.fail(HandshakeError::InvalidKey));
        }

        // A_s * b_p
        let mut own_lterm_shared = DhSecret::zero();
        if let Err(e) = sodium::scalarmult_into(
            own_lterm_shared.secret_mut(),
            curve_sskm.secret(),
            &*self.epkt,
        ) {
            debug!("server accept: own long-term shared secret rejected: {e}");
            return Err(self.fail(HandshakeError::InvalidKey));
        }

        // secretbox key: sha256(K | a_s * b_p | a_s * B_p | A_s * b_p)
        let mut key_msg = cat![BOX_KEY_2_MSG_LEN;
            self.app.secret(), self.eph_shared.secret(),
            self.lterm_shared.secret(), own_lterm_shared.secret()];
        sodium::sha256_into(self.box_sec.secret_mut(), &key_msg);
        key_msg.zeroize();

        let mut sig = [0u8; sodium::SIGNATURE_LEN];
        if sodium::secretbox_open_into(&mut sig, self.box_sec.secret(), &sodium::NONCE0, &msg.envelope)
            .is_err()
        {
            debug!("server accept: envelope failed to open");
            return Err(self.fail(HandshakeError::InvalidMessage));
        }

        // sig must cover K | H | sha256(a_s * b_p)
        let mut expected = cat![ACCEPT_SIGN_MSG_LEN;
            self.app.secret(), self.hello.secret(), self.shared_hash.secret()];
        let ok = sodium::sign_verify_detached(&sig, &expected, &*self.spkt);
        expected.zeroize();
        sig.zeroize();
        if !ok {
            debug!("server accept: server identity signature rejected");
            return Err(self.fail(HandshakeError::InvalidMessage));
        }

        self.next = ClientStep::Complete;
        Ok(())
    }

    /// Derive the transport keys; legal once [Self::verify_server_accept]
    /// has succeeded
    pub fn outcome(&self) -> Result<HandshakeOutcome, HandshakeError> {
        self.guard(ClientStep::Complete)?;
        Ok(derive_outcome(
            &self.app,
            &self.box_sec,
            &self.spkt,
            &self.epkt,
            &self.spkm,
            &self.epkm,
        ))
    }
}

/// Server role of the handshake
///
/// Mirror image of [ClientHandshake]: the server learns the client's
/// ephemeral key from the first challenge and the client's identity from the
/// auth envelope.
pub struct ServerHandshake {
    next: ServerStep,

    /// Application key `K`
    app: AppKey,
    /// Long-term signing public key mine (`B_p`)
    spkm: SignPk,
    /// Long-term signing secret key mine (`B_s`)
    sskm: SignSk,
    /// Ephemeral public key mine (`b_p`)
    epkm: EphPk,
    /// Ephemeral secret key mine (`b_s`)
    eskm: EphSk,

    /// Ephemeral public key theirs (`a_p`), learned from the client challenge
    epkt: EphPk,
    /// Long-term signing public key theirs (`A_p`), extracted from the hello
    spkt: SignPk,
    /// `H`, recovered from the client auth envelope
    hello: Hello,
    /// `sha256(b_s * a_p)`
    shared_hash: SymKey,
    /// `sha256(K ‖ b_s·a_p ‖ B_s·a_p ‖ b_s·A_p)`, keys the accept envelope
    /// and the outcome
    box_sec: SymKey,
}

impl ServerHandshake {
    /// Create a server session from the application key, the server's
    /// long-term signing keypair and a fresh ephemeral Curve25519 keypair
    pub fn new(app: AppKey, spkm: SignPk, sskm: SignSk, epkm: EphPk, eskm: EphSk) -> Self {
        Self {
            next: ServerStep::AwaitClientChallenge,
            app,
            spkm,
            sskm,
            epkm,
            eskm,
            epkt: EphPk::zero(),
            spkt: SignPk::zero(),
            hello: Hello::zero(),
            shared_hash: SymKey::zero(),
            box_sec: SymKey::zero(),
        }
    }

    fn guard(&self, at: ServerStep) -> Result<(), HandshakeError> {
        if self.next != at {
            debug!(
                "server operation for {:?} refused at position {:?}",
                at, self.next
            );
            return Err(HandshakeError::Misuse);
        }
        Ok(())
    }

    fn fail(&mut self, err: HandshakeError) -> HandshakeError {
        self.next = ServerStep::Failed;
        err
    }

    /// Check `hmac_K(a_p) ‖ a_p` and adopt the client's ephemeral key
    pub fn verify_client_challenge(
        &mut self,
        msg: &ClientChallenge,
    ) -> Result<(), HandshakeError> {
        self.guard(ServerStep::AwaitClientChallenge)?;

        if !sodium::auth_verify(&msg.mac, &msg.eph_pub, self.app.secret()) {
            debug!("client challenge: application key mac mismatch");
            return Err(self.fail(HandshakeError::InvalidMessage));
        }

        // a_p
        self.epkt = EphPk::new(msg.eph_pub);

        self.next = ServerStep::SendChallenge;
        Ok(())
    }

    /// Second message: `hmac_K(b_p) ‖ b_p`
    pub fn produce_server_challenge(
        &mut self,
        out: &mut ServerChallenge,
    ) -> Result<(), HandshakeError> {
        self.guard(ServerStep::SendChallenge)?;

        sodium::auth_into(&mut out.mac, &*self.epkm, self.app.secret());
        out.eph_pub = self.epkm.value;

        self.next = ServerStep::AwaitClientAuth;
        Ok(())
    }

    /// Open the auth envelope, recover the client's hello and verify the
    /// identity signature inside it
    pub fn verify_client_auth(&mut self, msg: &ClientAuth) -> Result<(), HandshakeError> {
        self.guard(ServerStep::AwaitClientAuth)?;

        // b_s * a_p
        let mut eph_shared = DhSecret::zero();
        if let Err(e) =
            sodium::scalarmult_into(eph_shared.secret_mut(), self.eskm.secret(), &*self.epkt)
        {
            debug!("client auth: ephemeral shared secret rejected: {e}");
            return Err(self.fail(HandshakeError::InvalidKey));
        }

        // B_s in its Curve25519 form
        let mut curve_sskm = CurveSk::zero();
        if let Err(e) = sodium::sign_sk_to_curve25519_into(curve_sskm.secret_mut(), self.sskm.secret())
        {
            debug!("client auth: own identity key conversion refused: {e}");
            return Err(self.fail(HandshakeError::InvalidKey));
        }

        // B_s * a_p
        let mut lterm_shared = DhSecret::zero();
        if let Err(e) = sodium::scalarmult_into(
            lterm_shared.secret_mut(),
            curve_sskm.secret(),
            &*self.epkt,
        ) {
            debug!("client auth: long-term shared secret rejected: {e}");
            return Err(self.fail(HandshakeError::InvalidKey));
        }

        // secretbox key: sha256(K | b_s * a_p | B_s * a_p)
        let mut box_key = SymKey::zero();
        let mut key_msg = cat![BOX_KEY_1_MSG_LEN;
            self.app.secret(), eph_shared.secret(), lterm_shared.secret()];
        sodium::sha256_into(box_key.secret_mut(), &key_msg);
        key_msg.zeroize();

        // H
        if sodium::secretbox_open_into(
            self.hello.secret_mut(),
            box_key.secret(),
            &sodium::NONCE0,
            &msg.envelope,
        )
        .is_err()
        {
            debug!("client auth: envelope failed to open");
            return Err(self.fail(HandshakeError::InvalidMessage));
        }

        // A_p is the trailing part of the hello
        self.spkt = SignPk::from_slice(&self.hello.secret()[sodium::SIGNATURE_LEN..]);

        // A_p in its Curve25519 form
        let mut curve_spkt = [0u8; sodium::SCALARMULT_LEN];
        if let Err(e) = sodium::sign_pk_to_curve25519_into(&mut curve_spkt, &*self.spkt) {
            debug!("client auth: client identity key conversion refused: {e}");
            return Err(self.fail(HandshakeError::InvalidKey));
        }

        // b_s * A_p
        let mut client_lterm_shared = DhSecret::zero();
        if let Err(e) = sodium::scalarmult_into(
            client_lterm_shared.secret_mut(),
            self.eskm.secret(),
            &curve_spkt,
        ) {
            debug!("client auth: client long-term shared secret rejected: {e}");
            return Err(self.fail(HandshakeError::InvalidKey));
        }

        // sha256(b_s * a_p)
        sodium::sha256_into(self.shared_hash.secret_mut(), eph_shared.secret());

        // the hello signature must cover K | B_p | sha256(b_s * a_p)
        let mut expected = cat![HELLO_SIGN_MSG_LEN;
            self.app.secret(), &*self.spkm, self.shared_hash.secret()];
        let ok = sodium::sign_verify_detached(
            &self.hello.secret()[..sodium::SIGNATURE_LEN],
            &expected,
            &*self.spkt,
        );
        expected.zeroize();
        if !ok {
            debug!("client auth: client identity signature rejected");
            return Err(self.fail(HandshakeError::InvalidMessage));
        }

        // sha256(K | b_s * a_p | B_s * a_p | b_s * A_p)
        let mut sec_msg = cat![BOX_KEY_2_MSG_LEN;
            self.app.secret(), eph_shared.secret(),
            lterm_shared.secret(), client_lterm_shared.secret()];
        sodium::sha256_into(self.box_sec.secret_mut(), &sec_msg);
        sec_msg.zeroize();

        self.next = ServerStep::SendAccept;
        Ok(())
    }

    /// Fourth message: `secretbox_{box_sec}(sign_{B_s}(K ‖ H ‖ sha256(b_s·a_p)))`
    /// under the zero nonce
    pub fn produce_server_accept(&mut self, out: &mut ServerAccept) -> Result<(), HandshakeError> {
        self.guard(ServerStep::SendAccept)?;

        // sign_{B_s}(K | H | sha256(b_s * a_p))
        let mut to_sign = cat![ACCEPT_SIGN_MSG_LEN;
            self.app.secret(), self.hello.secret(), self.shared_hash.secret()];
        let mut sig = [0u8; sodium::SIGNATURE_LEN];
        sodium::sign_detached_into(&mut sig, &to_sign, self.sskm.secret());
        to_sign.zeroize();

        sodium::secretbox_into(&mut out.envelope, self.box_sec.secret(), &sodium::NONCE0, &sig);
        sig.zeroize();

        self.next = ServerStep::Complete;
        Ok(())
    }

    /// Derive the transport keys; legal once [Self::produce_server_accept]
    /// has run
    pub fn outcome(&self) -> Result<HandshakeOutcome, HandshakeError> {
        self.guard(ServerStep::Complete)?;
        Ok(derive_outcome(
            &self.app,
            &self.box_sec,
            &self.spkt,
            &self.epkt,
            &self.spkm,
            &self.epkm,
        ))
    }
}

/// Outcome derivation, identical for both roles up to which party counts as
/// remote: keys are `sha256(sha256(box_sec) ‖ long-term pk)`, nonces are the
/// challenge HMACs over the ephemeral public keys recomputed
fn derive_outcome(
    app: &AppKey,
    box_sec: &SymKey,
    remote_pk: &SignPk,
    remote_eph_pk: &EphPk,
    own_pk: &SignPk,
    own_eph_pk: &EphPk,
) -> HandshakeOutcome {
    let mut outer = SymKey::zero();
    sodium::sha256_into(outer.secret_mut(), box_sec.secret());

    let mut outcome = HandshakeOutcome {
        encryption_key: SymKey::zero(),
        encryption_nonce: SymNonce::zero(),
        decryption_key: SymKey::zero(),
        decryption_nonce: SymNonce::zero(),
    };

    // sha256(sha256(box_sec) | remote long-term pk)
    let mut key_msg = cat![OUTCOME_KEY_MSG_LEN; outer.secret(), &**remote_pk];
    sodium::sha256_into(outcome.encryption_key.secret_mut(), &key_msg);

    // sha256(sha256(box_sec) | own long-term pk)
    key_msg[sodium::SHA256_LEN..].copy_from_slice(&**own_pk);
    sodium::sha256_into(outcome.decryption_key.secret_mut(), &key_msg);
    key_msg.zeroize();

    // hmac_K over the two ephemeral public keys
    sodium::auth_into(&mut *outcome.encryption_nonce, &**remote_eph_pk, app.secret());
    sodium::auth_into(&mut *outcome.decryption_nonce, &**own_eph_pk, app.secret());

    outcome
}
