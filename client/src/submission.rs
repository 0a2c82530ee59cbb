//! Mood submission workflow
//!
//! Encodes a mood, appends it to the `mood` collection, derives exhibit
//! recommendations from its emotion, appends each exhibit to the `exhibit`
//! collection and finally re-reads the exhibit list. Every write is
//! additive. Exhibit appends are independent: a failure in one does not
//! stop the others and nothing already written is rolled back.
//!
//! Progress is published through a `watch` channel so a caller can show
//! an "in progress" status while a backend round-trip is outstanding.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info};
use mood_museum_core::config::StoreConfig;
use mood_museum_core::models::{Collection, ExhibitRecord, MoodRecord, MoodSnapshot, Record};
use mood_museum_core::recommend;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{ClientError, Result};
use crate::session::SessionContext;
use crate::store::{read_exhibits, KeyedCollectionStore};

/// Progress of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    /// Nothing submitted yet
    Idle,
    /// Building and encoding the mood payload
    Encrypting,
    /// Writing the mood record
    Persisting,
    /// Looking up recommendations
    DerivingRecommendations,
    /// Writing exhibit records
    PersistingExhibits,
    /// Re-reading the exhibit list
    Refreshing,
    /// Finished successfully
    Done,
    /// Stopped with an error
    Failed,
}

impl SubmissionState {
    /// Whether a submission is underway
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, SubmissionState::Idle | SubmissionState::Done | SubmissionState::Failed)
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            SubmissionState::Idle => "Idle",
            SubmissionState::Encrypting => "Encrypting your mood...",
            SubmissionState::Persisting => "Storing your encrypted mood...",
            SubmissionState::DerivingRecommendations => "Processing your mood to find matching exhibits...",
            SubmissionState::PersistingExhibits => "Storing exhibit recommendations...",
            SubmissionState::Refreshing => "Refreshing recommendations...",
            SubmissionState::Done => "Personalized exhibit recommendations generated!",
            SubmissionState::Failed => "Submission failed",
        };
        f.write_str(status)
    }
}

/// What the caller reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodSubmission {
    /// Emotion tag
    pub emotion: String,

    /// Intensity in `[1, 10]`
    pub intensity: u8,
}

impl MoodSubmission {
    /// Create a submission
    pub fn new(emotion: impl Into<String>, intensity: u8) -> Self {
        Self {
            emotion: emotion.into(),
            intensity,
        }
    }
}

/// Result of a successful submission
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    /// Id of the stored mood record
    pub mood_id: String,

    /// Ids of the stored exhibit records
    pub exhibit_ids: Vec<String>,

    /// Exhibit list as re-read after the writes, newest first
    pub exhibits: Vec<ExhibitRecord>,
}

/// Runs mood submissions against a store
pub struct SubmissionWorkflow<S: ?Sized> {
    store: Arc<S>,
    config: StoreConfig,
    state: watch::Sender<SubmissionState>,
}

impl<S: KeyedCollectionStore + ?Sized> SubmissionWorkflow<S> {
    /// Create a workflow over `store`
    pub fn new(store: Arc<S>, config: StoreConfig) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self { store, config, state }
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Current state
    pub fn state(&self) -> SubmissionState {
        *self.state.borrow()
    }

    fn transition(&self, next: SubmissionState) {
        debug!("Submission state: {:?}", next);
        self.state.send_replace(next);
    }

    /// Submit a mood and store its recommendations
    ///
    /// Only a fully successful submission re-reads the exhibit list. After
    /// `PartialWriteFailure` the exhibits that did land stay stored and show
    /// up in the next `read_exhibits`.
    pub async fn submit(&self, session: &SessionContext, submission: &MoodSubmission) -> Result<SubmissionReport> {
        match self.run(session, submission).await {
            Ok(report) => {
                self.transition(SubmissionState::Done);
                Ok(report)
            }
            Err(e) => {
                error!("Submission failed: {}", e);
                self.transition(SubmissionState::Failed);
                Err(e)
            }
        }
    }

    async fn run(&self, session: &SessionContext, submission: &MoodSubmission) -> Result<SubmissionReport> {
        if !session.is_connected() {
            return Err(ClientError::NotAuthenticated);
        }

        self.transition(SubmissionState::Encrypting);
        // The id carries the only stored time of a mood entry
        let now = Utc::now();
        let snapshot = MoodSnapshot::new(submission.emotion.clone(), submission.intensity, now)?;
        let mood_id = Collection::Mood.new_id_at(now, self.config.id_suffix_len);
        let mood = MoodRecord::new(mood_id.clone(), &snapshot)?;

        self.transition(SubmissionState::Persisting);
        self.store.append_record(Collection::Mood, &Record::from(mood)).await?;
        info!("Stored mood {}", mood_id);

        self.transition(SubmissionState::DerivingRecommendations);
        let seeds = recommend(&snapshot.emotion);
        debug!("{} recommendations for '{}'", seeds.len(), snapshot.emotion);

        self.transition(SubmissionState::PersistingExhibits);
        let mut exhibit_ids = Vec::with_capacity(seeds.len());
        let mut failures = 0;
        for seed in &seeds {
            let id = Collection::Exhibit.new_id(self.config.id_suffix_len);
            let exhibit = ExhibitRecord::from_seed(id.clone(), seed, &snapshot, Utc::now())?;

            match self.store.append_record(Collection::Exhibit, &Record::from(exhibit)).await {
                Ok(()) => exhibit_ids.push(id),
                Err(e) => {
                    error!("Failed to store exhibit '{}' for mood {}: {}", seed.name, mood_id, e);
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            return Err(ClientError::PartialWriteFailure {
                persisted: exhibit_ids.len(),
                attempted: seeds.len(),
            });
        }

        self.transition(SubmissionState::Refreshing);
        let exhibits = read_exhibits(self.store.as_ref()).await?;

        Ok(SubmissionReport {
            mood_id,
            exhibit_ids,
            exhibits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::identity::{Disconnected, Identity, WalletIdentity};
    use crate::store::{read_moods, KvCollectionStore};
    use ethers::types::Address;
    use mood_museum_core::config::ChallengeConfig;

    fn setup() -> (Arc<InMemoryBackend>, Arc<KvCollectionStore<InMemoryBackend>>, SubmissionWorkflow<KvCollectionStore<InMemoryBackend>>) {
        let backend = Arc::new(InMemoryBackend::new());
        let store = Arc::new(KvCollectionStore::new(backend.clone()));
        let workflow = SubmissionWorkflow::new(store.clone(), StoreConfig::default());
        (backend, store, workflow)
    }

    fn session(identity: Arc<dyn Identity>) -> SessionContext {
        SessionContext::start(identity, Address::zero(), 31337, &ChallengeConfig::default())
    }

    #[tokio::test]
    async fn test_calm_submission_writes_one_mood_and_three_exhibits() {
        let (_, store, workflow) = setup();
        let session = session(Arc::new(WalletIdentity::random()));

        let report = workflow.submit(&session, &MoodSubmission::new("calm", 7)).await.unwrap();

        assert_eq!(workflow.state(), SubmissionState::Done);
        assert_eq!(store.list_ids(Collection::Mood).await.unwrap(), vec![report.mood_id.clone()]);
        assert_eq!(store.list_ids(Collection::Exhibit).await.unwrap(), report.exhibit_ids);
        assert_eq!(report.exhibits.len(), 3);
        assert!(report.exhibits.iter().all(|e| e.emotion_match == "calm"));

        let moods = read_moods(store.as_ref()).await.unwrap();
        let snapshot = moods[0].decode().unwrap();
        assert_eq!(snapshot.emotion, "calm");
        assert_eq!(snapshot.intensity, 7);

        // Every exhibit carries the originating mood, not a new one
        for exhibit in &report.exhibits {
            let carried = MoodSnapshot::from_json(&mood_museum_core::codec::decode(&exhibit.payload)).unwrap();
            assert_eq!(carried, snapshot);
        }
    }

    #[tokio::test]
    async fn test_stored_mood_time_matches_snapshot() {
        let (_, store, workflow) = setup();
        let session = session(Arc::new(WalletIdentity::random()));

        workflow.submit(&session, &MoodSubmission::new("contemplative", 6)).await.unwrap();

        let moods = read_moods(store.as_ref()).await.unwrap();
        let snapshot = moods[0].decode().unwrap();
        assert_eq!(moods[0].created_at, snapshot.timestamp);
    }

    #[tokio::test]
    async fn test_disconnected_fails_before_side_effects() {
        let (backend, _, workflow) = setup();
        let session = session(Arc::new(Disconnected));

        let err = workflow.submit(&session, &MoodSubmission::new("calm", 7)).await.unwrap_err();

        assert!(matches!(err, ClientError::NotAuthenticated));
        assert_eq!(workflow.state(), SubmissionState::Failed);
        assert_eq!(backend.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_intensity_fails_before_side_effects() {
        let (backend, _, workflow) = setup();
        let session = session(Arc::new(WalletIdentity::random()));

        let err = workflow.submit(&session, &MoodSubmission::new("calm", 0)).await.unwrap_err();

        assert!(matches!(err, ClientError::Core(_)));
        assert_eq!(backend.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_mood_write_failure_writes_no_exhibits() {
        let (backend, store, workflow) = setup();
        backend.fail_writes_with_prefix("mood_").await;
        let session = session(Arc::new(WalletIdentity::random()));

        let err = workflow.submit(&session, &MoodSubmission::new("happy", 3)).await.unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
        assert!(store.list_ids(Collection::Exhibit).await.unwrap().is_empty());
        assert_eq!(backend.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_partial_exhibit_failure_is_not_rolled_back() {
        let (backend, store, workflow) = setup();
        let session = session(Arc::new(WalletIdentity::random()));

        // Mood record and index, then the first exhibit's record and index
        backend.fail_writes_after(4).await;
        let result = workflow.submit(&session, &MoodSubmission::new("curious", 5)).await;

        match result {
            Err(ClientError::PartialWriteFailure { persisted, attempted }) => {
                assert_eq!(attempted, 3);
                assert_eq!(persisted, 1);
            }
            other => panic!("expected partial write failure, got {:?}", other.map(|r| r.mood_id)),
        }
        assert_eq!(workflow.state(), SubmissionState::Failed);
        assert_eq!(store.list_ids(Collection::Mood).await.unwrap().len(), 1);
        assert_eq!(store.list_ids(Collection::Exhibit).await.unwrap().len(), 1);

        // No refresh on failure; the exhibit that landed is visible to a later read
        backend.clear_failures().await;
        let exhibits = read_exhibits(store.as_ref()).await.unwrap();
        assert_eq!(exhibits.len(), 1);
        assert_eq!(exhibits[0].emotion_match, "curious");
    }

    #[tokio::test]
    async fn test_unknown_emotion_stores_mood_only() {
        let (_, store, workflow) = setup();
        let session = session(Arc::new(WalletIdentity::random()));

        let report = workflow.submit(&session, &MoodSubmission::new("bored", 2)).await.unwrap();

        assert!(report.exhibit_ids.is_empty());
        assert!(report.exhibits.is_empty());
        assert_eq!(store.list_ids(Collection::Mood).await.unwrap().len(), 1);
    }

    #[test]
    fn test_state_progress_flags() {
        assert!(!SubmissionState::Idle.is_in_progress());
        assert!(SubmissionState::Persisting.is_in_progress());
        assert!(!SubmissionState::Done.is_in_progress());
        assert_eq!(SubmissionState::Failed.to_string(), "Submission failed");
    }
}
