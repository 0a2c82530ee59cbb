//! Museum client
//!
//! Ties a backend, the collection store and the two workflows together
//! behind one handle.

use std::sync::Arc;

use log::{info, warn};
use mood_museum_core::config::MuseumConfig;
use mood_museum_core::models::{Collection, ExhibitRecord, MoodRecord, Record};
use tokio::sync::{watch, Mutex};

use crate::backend::KvBackend;
use crate::error::{ClientError, Result};
use crate::probe::{check_availability, Availability};
use crate::reveal::{RevealOutcome, RevealWorkflow};
use crate::session::SessionContext;
use crate::store::{read_exhibits, read_moods, KeyedCollectionStore, KvCollectionStore};
use crate::submission::{MoodSubmission, SubmissionReport, SubmissionState, SubmissionWorkflow};

/// Client for the mood museum
pub struct MuseumClient {
    backend: Arc<dyn KvBackend>,
    store: Arc<KvCollectionStore<dyn KvBackend>>,
    submissions: SubmissionWorkflow<KvCollectionStore<dyn KvBackend>>,
    reveals: Mutex<RevealWorkflow>,
}

impl MuseumClient {
    /// Create a client over `backend`
    pub fn new(backend: Arc<dyn KvBackend>, config: &MuseumConfig) -> Self {
        let store = Arc::new(KvCollectionStore::new(backend.clone()));
        let submissions = SubmissionWorkflow::new(store.clone(), config.store.clone());

        Self {
            backend,
            store,
            submissions,
            reveals: Mutex::new(RevealWorkflow::new(config.reveal.clone())),
        }
    }

    /// The collection store
    pub fn store(&self) -> &KvCollectionStore<dyn KvBackend> {
        &self.store
    }

    /// Check whether the backend is available
    pub async fn probe(&self) -> Availability {
        check_availability(self.backend.as_ref()).await
    }

    /// Exhibits, newest first
    ///
    /// Fails with `BackendUnavailable` if the probe says the backend is
    /// not accepting operations.
    pub async fn refresh_exhibits(&self) -> Result<Vec<ExhibitRecord>> {
        match self.probe().await {
            Availability::Available => {}
            Availability::Unavailable => return Err(ClientError::BackendUnavailable),
            Availability::ProbeError(reason) => {
                warn!("Refreshing exhibits without a successful probe: {}", reason);
                return Err(ClientError::Transport(reason));
            }
        }

        let exhibits = read_exhibits(self.store.as_ref()).await?;
        info!("Loaded {} exhibits", exhibits.len());
        Ok(exhibits)
    }

    /// Moods, newest first
    pub async fn list_moods(&self) -> Result<Vec<MoodRecord>> {
        read_moods(self.store.as_ref()).await
    }

    /// A single record
    pub async fn read_record(&self, collection: Collection, id: &str) -> Result<Option<Record>> {
        self.store.read_record(collection, id).await
    }

    /// Submit a mood and store its recommendations
    pub async fn submit_mood(&self, session: &SessionContext, submission: &MoodSubmission) -> Result<SubmissionReport> {
        self.submissions.submit(session, submission).await
    }

    /// Observe submission progress
    pub fn submission_state(&self) -> watch::Receiver<SubmissionState> {
        self.submissions.subscribe()
    }

    /// Reveal or hide a record's payload
    pub async fn toggle_reveal(&self, session: &SessionContext, collection: Collection, id: &str) -> Result<RevealOutcome> {
        let mut reveals = self.reveals.lock().await;
        if reveals.is_revealed(collection, id) {
            return reveals.toggle(session, collection, id, "").await;
        }

        let record = self
            .store
            .read_record(collection, id)
            .await?
            .ok_or_else(|| ClientError::NotFound(collection.record_key(id)))?;
        reveals.toggle(session, collection, id, &record.payload).await
    }
}
