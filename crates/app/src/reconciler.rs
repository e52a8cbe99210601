//! Reconciler — the periodic snapshot refresh and scene-status poll.
//!
//! Runs on its own timer task, independent of any request: fetch a fresh
//! directory snapshot, score every scene against it, and feed the scores to
//! the activation tracker. Request handlers read the cached snapshot
//! instead of calling the cloud per request; the cache is a copy, so no
//! lock is held across IO.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use luxhub_domain::directory::DirectorySnapshot;
use luxhub_domain::error::LuxhubError;
use luxhub_domain::id::SceneId;
use luxhub_domain::matcher::{self, Tolerances};
use luxhub_domain::time::now;

use crate::activation::{ActivationStatus, ActivationTracker, SceneScore};
use crate::ports::DeviceDirectory;

/// One scene's reconciled status for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SceneStatus {
    pub scene: SceneId,
    pub label: String,
    pub matched: usize,
    pub total: usize,
    pub score: f64,
    pub status: ActivationStatus,
}

/// Owns the snapshot cache and drives the activation tracker.
pub struct Reconciler<D> {
    directory: D,
    tracker: Arc<ActivationTracker>,
    tolerances: Tolerances,
    cache: RwLock<Option<DirectorySnapshot>>,
}

impl<D: DeviceDirectory> Reconciler<D> {
    /// Create a reconciler with an empty cache.
    pub fn new(directory: D, tracker: Arc<ActivationTracker>, tolerances: Tolerances) -> Self {
        Self {
            directory,
            tracker,
            tolerances,
            cache: RwLock::new(None),
        }
    }

    /// The shared activation tracker.
    #[must_use]
    pub fn tracker(&self) -> &Arc<ActivationTracker> {
        &self.tracker
    }

    /// The configured matcher tolerances.
    #[must_use]
    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Fetch a fresh snapshot, cache it, and tick the tracker.
    ///
    /// # Errors
    ///
    /// Propagates the directory fetch failure; the cache keeps its last
    /// good snapshot in that case.
    pub async fn refresh(&self) -> Result<DirectorySnapshot, LuxhubError> {
        let snapshot = self.directory.fetch_snapshot().await?;

        let scores: Vec<SceneScore> = snapshot
            .scenes
            .iter()
            .map(|scene| SceneScore {
                scene: scene.id,
                score: matcher::match_score(scene, &snapshot, &self.tolerances).score(),
            })
            .collect();
        self.tracker
            .observe(&scores, self.tolerances.threshold, now());

        *self.cache.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// One poll tick: refresh, logging instead of propagating failures.
    pub async fn tick(&self) {
        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "directory refresh failed, keeping last snapshot");
        }
    }

    /// The cached snapshot, if any poll has succeeded yet.
    pub async fn cached(&self) -> Option<DirectorySnapshot> {
        self.cache.read().await.clone()
    }

    /// The cached snapshot, fetching one when the cache is still cold.
    ///
    /// # Errors
    ///
    /// Propagates the directory fetch failure when the cache is empty.
    pub async fn snapshot(&self) -> Result<DirectorySnapshot, LuxhubError> {
        if let Some(snapshot) = self.cached().await {
            return Ok(snapshot);
        }
        self.refresh().await
    }

    /// Reconciled status for every scene in `snapshot`.
    #[must_use]
    pub fn scene_statuses(&self, snapshot: &DirectorySnapshot) -> Vec<SceneStatus> {
        let overview = self.tracker.overview();
        snapshot
            .scenes
            .iter()
            .map(|scene| {
                let result = matcher::match_score(scene, snapshot, &self.tolerances);
                SceneStatus {
                    scene: scene.id,
                    label: scene.label.clone(),
                    matched: result.matched,
                    total: result.total,
                    score: result.score(),
                    status: overview.status_of(scene.id),
                }
            })
            .collect()
    }
}
