//! Possession-gated reveal
//!
//! Decoding a stored payload for display requires the connected identity
//! to sign the session's challenge message first. Revealed plaintext is
//! kept per collection and record id for the lifetime of the workflow;
//! toggling a revealed record hides it again without touching the identity.

use std::collections::HashMap;

use log::{debug, info, warn};
use mood_museum_core::codec;
use mood_museum_core::config::RevealConfig;
use mood_museum_core::models::{Collection, MoodSnapshot};

use crate::error::{ClientError, Result};
use crate::identity::SignatureOutcome;
use crate::session::SessionContext;

/// Result of toggling a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The payload was decoded
    Revealed {
        /// Decoded plaintext
        plaintext: String,
    },

    /// The record was hidden again
    Hidden,

    /// The user declined to sign; the record stays hidden
    Declined,
}

impl RevealOutcome {
    /// Parse revealed plaintext as a mood snapshot
    pub fn mood(&self) -> Result<Option<MoodSnapshot>> {
        match self {
            RevealOutcome::Revealed { plaintext } => Ok(Some(MoodSnapshot::from_json(plaintext)?)),
            _ => Ok(None),
        }
    }
}

/// Tracks which records are revealed
#[derive(Debug, Default)]
pub struct RevealWorkflow {
    revealed: HashMap<(Collection, String), String>,
    config: RevealConfig,
}

impl RevealWorkflow {
    /// Create a workflow with nothing revealed
    pub fn new(config: RevealConfig) -> Self {
        Self {
            revealed: HashMap::new(),
            config,
        }
    }

    /// Whether `record_id` of `collection` is currently revealed
    pub fn is_revealed(&self, collection: Collection, record_id: &str) -> bool {
        self.revealed.contains_key(&(collection, record_id.to_string()))
    }

    /// Revealed plaintext for `record_id` of `collection`
    pub fn plaintext(&self, collection: Collection, record_id: &str) -> Option<&str> {
        self.revealed
            .get(&(collection, record_id.to_string()))
            .map(String::as_str)
    }

    /// Hide every revealed record
    pub fn hide_all(&mut self) {
        self.revealed.clear();
    }

    /// Reveal `record_id` if hidden, hide it if revealed
    pub async fn toggle(
        &mut self,
        session: &SessionContext,
        collection: Collection,
        record_id: &str,
        payload: &str,
    ) -> Result<RevealOutcome> {
        let key = (collection, record_id.to_string());
        if self.revealed.remove(&key).is_some() {
            debug!("Hiding {} {}", collection, record_id);
            return Ok(RevealOutcome::Hidden);
        }

        if !session.is_connected() {
            return Err(ClientError::NotAuthenticated);
        }

        let challenge = session.challenge().message();
        let signature = match session.identity().sign(&challenge).await? {
            SignatureOutcome::Signed(signature) => signature,
            SignatureOutcome::Declined => {
                info!("Reveal of {} {} declined", collection, record_id);
                return Ok(RevealOutcome::Declined);
            }
        };

        if self.config.verify_signer {
            let address = session.address().ok_or(ClientError::NotAuthenticated)?;
            if signature.verify(challenge.as_str(), address).is_err() {
                warn!("Challenge signature for {} does not match {:?}", record_id, address);
                return Err(ClientError::SignerMismatch);
            }
        }

        let plaintext = codec::decode(payload);
        self.revealed.insert(key, plaintext.clone());
        info!("Revealed {} {}", collection, record_id);

        Ok(RevealOutcome::Revealed { plaintext })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use ethers::signers::{LocalWallet, Signer};
    use ethers::types::Address;
    use mockall::predicate::eq;

    use crate::identity::{Disconnected, Identity, MockIdentity, WalletIdentity};

    fn session(identity: Arc<dyn Identity>) -> SessionContext {
        SessionContext::with_parameters(
            identity,
            Address::zero(),
            31337,
            "ab".repeat(1000),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            30,
        )
    }

    fn happy_payload() -> (MoodSnapshot, String) {
        let snapshot = MoodSnapshot::new("happy", 4, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()).unwrap();
        let payload = snapshot.encode().unwrap();
        (snapshot, payload)
    }

    async fn real_signature(message: &str) -> ethers::types::Signature {
        let wallet: LocalWallet = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
            .parse()
            .unwrap();
        wallet.sign_message(message).await.unwrap()
    }

    #[tokio::test]
    async fn test_reveal_then_hide_signs_once() {
        let expected = session(Arc::new(Disconnected)).challenge().message();
        let signature = real_signature(&expected).await;

        let mut mock = MockIdentity::new();
        mock.expect_is_connected().return_const(true);
        mock.expect_address().return_const(Some(Address::repeat_byte(1)));
        mock.expect_sign()
            .with(eq(expected))
            .times(1)
            .returning(move |_| Ok(SignatureOutcome::Signed(signature)));
        let session = session(Arc::new(mock));

        let (snapshot, payload) = happy_payload();
        let mut workflow = RevealWorkflow::default();

        let outcome = workflow.toggle(&session, Collection::Mood, "mood-1", &payload).await.unwrap();
        assert_eq!(outcome.mood().unwrap(), Some(snapshot));
        assert!(workflow.is_revealed(Collection::Mood, "mood-1"));

        // Hiding never asks for a signature
        let outcome = workflow.toggle(&session, Collection::Mood, "mood-1", &payload).await.unwrap();
        assert_eq!(outcome, RevealOutcome::Hidden);
        assert!(!workflow.is_revealed(Collection::Mood, "mood-1"));
    }

    #[tokio::test]
    async fn test_declined_stays_hidden() {
        let session = session(Arc::new(WalletIdentity::random().declining()));
        let (_, payload) = happy_payload();
        let mut workflow = RevealWorkflow::default();

        let outcome = workflow.toggle(&session, Collection::Mood, "mood-1", &payload).await.unwrap();

        assert_eq!(outcome, RevealOutcome::Declined);
        assert!(!workflow.is_revealed(Collection::Mood, "mood-1"));
    }

    #[tokio::test]
    async fn test_disconnected_is_not_authenticated() {
        let session = session(Arc::new(Disconnected));
        let mut workflow = RevealWorkflow::default();

        let err = workflow.toggle(&session, Collection::Mood, "mood-1", "FHE-e30=").await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_signing_error_propagates() {
        let mut mock = MockIdentity::new();
        mock.expect_is_connected().return_const(true);
        mock.expect_sign()
            .times(1)
            .returning(|_| Err(ClientError::Signing("device locked".to_string())));
        let session = session(Arc::new(mock));
        let mut workflow = RevealWorkflow::default();

        assert!(matches!(
            workflow.toggle(&session, Collection::Mood, "mood-1", "FHE-e30=").await,
            Err(ClientError::Signing(_))
        ));
        assert!(!workflow.is_revealed(Collection::Mood, "mood-1"));
    }

    #[tokio::test]
    async fn test_unencoded_payload_reveals_verbatim() {
        let session = session(Arc::new(WalletIdentity::random()));
        let mut workflow = RevealWorkflow::default();

        let outcome = workflow.toggle(&session, Collection::Mood, "legacy", "plain text").await.unwrap();
        assert_eq!(outcome, RevealOutcome::Revealed { plaintext: "plain text".to_string() });
        assert_eq!(workflow.plaintext(Collection::Mood, "legacy"), Some("plain text"));
        assert!(outcome.mood().is_err());
    }

    #[tokio::test]
    async fn test_verify_signer_accepts_own_signature() {
        let session = session(Arc::new(WalletIdentity::random()));
        let mut workflow = RevealWorkflow::new(RevealConfig { verify_signer: true });
        let (_, payload) = happy_payload();

        let outcome = workflow.toggle(&session, Collection::Mood, "mood-1", &payload).await.unwrap();
        assert!(matches!(outcome, RevealOutcome::Revealed { .. }));
    }

    #[tokio::test]
    async fn test_verify_signer_rejects_foreign_signature() {
        let expected = session(Arc::new(Disconnected)).challenge().message();
        let signature = real_signature(&expected).await;

        let mut mock = MockIdentity::new();
        mock.expect_is_connected().return_const(true);
        mock.expect_address().return_const(Some(Address::repeat_byte(1)));
        mock.expect_sign().returning(move |_| Ok(SignatureOutcome::Signed(signature)));
        let session = session(Arc::new(mock));

        let mut workflow = RevealWorkflow::new(RevealConfig { verify_signer: true });
        let (_, payload) = happy_payload();

        let err = workflow.toggle(&session, Collection::Mood, "mood-1", &payload).await.unwrap_err();
        assert!(matches!(err, ClientError::SignerMismatch));
        assert!(!workflow.is_revealed(Collection::Mood, "mood-1"));

        workflow.hide_all();
        assert!(!workflow.is_revealed(Collection::Mood, "mood-1"));
    }

    #[tokio::test]
    async fn test_same_id_in_two_collections_is_tracked_separately() {
        let mut mock = MockIdentity::new();
        mock.expect_is_connected().return_const(true);
        mock.expect_address().return_const(Some(Address::repeat_byte(1)));
        let expected = session(Arc::new(Disconnected)).challenge().message();
        let signature = real_signature(&expected).await;
        mock.expect_sign()
            .times(2)
            .returning(move |_| Ok(SignatureOutcome::Signed(signature)));
        let session = session(Arc::new(mock));

        let (snapshot, payload) = happy_payload();
        let mut workflow = RevealWorkflow::default();

        let outcome = workflow.toggle(&session, Collection::Mood, "r-1", &payload).await.unwrap();
        assert_eq!(outcome.mood().unwrap(), Some(snapshot.clone()));

        // Same id in the other collection is a different record
        let outcome = workflow.toggle(&session, Collection::Exhibit, "r-1", &payload).await.unwrap();
        assert_eq!(outcome.mood().unwrap(), Some(snapshot));
        assert!(workflow.is_revealed(Collection::Mood, "r-1"));
        assert!(workflow.is_revealed(Collection::Exhibit, "r-1"));

        let outcome = workflow.toggle(&session, Collection::Exhibit, "r-1", &payload).await.unwrap();
        assert_eq!(outcome, RevealOutcome::Hidden);
        assert!(workflow.is_revealed(Collection::Mood, "r-1"));
        assert!(!workflow.is_revealed(Collection::Exhibit, "r-1"));
    }
}
