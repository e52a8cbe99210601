//! Activation tracker — the per-process scene activation state machine.
//!
//! There is no cloud-side "scene active" signal, so the tracker fuses two
//! inputs: locally issued activation requests (recorded only *after* the
//! cloud accepted the command) and the matcher scores computed on each poll
//! tick. Hysteresis rules:
//!
//! - `Activating` promotes to `Active` when the scene's score reaches the
//!   threshold, or when the activation timeout elapses (fail-open: the
//!   cloud is assumed slow rather than permanently wrong).
//! - A scene scoring at threshold with no local activation in flight was
//!   activated externally and becomes `Active` directly.
//! - A previously confirmed scene dropping below threshold returns to
//!   `Idle`. A timeout-promoted scene that was never confirmed gets one
//!   extra timeout of grace before it is pruned.
//!
//! Every transition happens under a single mutex; readers take a copied
//! overview instead of holding the lock.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use luxhub_domain::id::SceneId;
use luxhub_domain::time::Timestamp;

/// Tracker tuning. All fields come from `luxhub.toml [activation]`.
#[derive(Debug, Clone, Copy)]
pub struct ActivationConfig {
    /// Seconds an activation may sit unconfirmed before failing open.
    pub timeout_secs: u64,
    /// Whether several scenes may show `Active` at once. With `false`
    /// (exclusive), detecting one active scene clears the rest.
    pub overlapping_active: bool,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            overlapping_active: false,
        }
    }
}

/// User-facing status of one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationStatus {
    Idle,
    Activating,
    Active,
}

/// One scene's match score at a poll tick.
#[derive(Debug, Clone, Copy)]
pub struct SceneScore {
    pub scene: SceneId,
    pub score: f64,
}

#[derive(Debug, Clone, Copy)]
struct ActiveEntry {
    /// Whether the matcher ever confirmed this scene at threshold.
    confirmed: bool,
    since: Timestamp,
}

#[derive(Debug, Default)]
struct TrackerState {
    /// At most one locally triggered activation is in flight at a time.
    activating: Option<(SceneId, Timestamp)>,
    active: BTreeMap<SceneId, ActiveEntry>,
}

/// Copy of the tracker state for rendering without holding the lock.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivationOverview {
    pub activating: Option<SceneId>,
    pub active: Vec<SceneId>,
}

impl ActivationOverview {
    /// Status of one scene in this overview.
    #[must_use]
    pub fn status_of(&self, scene: SceneId) -> ActivationStatus {
        if self.activating == Some(scene) {
            ActivationStatus::Activating
        } else if self.active.contains(&scene) {
            ActivationStatus::Active
        } else {
            ActivationStatus::Idle
        }
    }
}

/// The state machine. One instance per process; cleared on restart.
pub struct ActivationTracker {
    config: ActivationConfig,
    state: Mutex<TrackerState>,
}

impl ActivationTracker {
    /// Create a tracker with everything `Idle`.
    #[must_use]
    pub fn new(config: ActivationConfig) -> Self {
        Self {
            config,
            state: Mutex::new(TrackerState::default()),
        }
    }

    /// Record a locally triggered activation. Call only after the cloud
    /// accepted the command — a rejected command never enters `Activating`.
    ///
    /// A second activation while one is in flight replaces it (last
    /// request wins), keeping the at-most-one-`Activating` invariant.
    pub fn begin_activation(&self, scene: SceneId, at: Timestamp) {
        let mut state = self.lock();
        if let Some((previous, _)) = state.activating {
            if previous != scene {
                tracing::debug!(%previous, %scene, "superseding in-flight activation");
            }
        }
        state.activating = Some((scene, at));
        state.active.remove(&scene);
    }

    /// Explicitly drop a scene back to `Idle`.
    pub fn deactivate(&self, scene: SceneId) {
        let mut state = self.lock();
        if state.activating.is_some_and(|(s, _)| s == scene) {
            state.activating = None;
        }
        state.active.remove(&scene);
    }

    /// Apply one poll tick worth of matcher output.
    ///
    /// `threshold` is the matcher's activation threshold; scores at or
    /// above it count as confirmed.
    pub fn observe(&self, scores: &[SceneScore], threshold: f64, at: Timestamp) {
        let timeout =
            chrono::Duration::seconds(i64::try_from(self.config.timeout_secs).unwrap_or(i64::MAX / 1_000));
        let mut state = self.lock();

        let confirmed: BTreeMap<SceneId, f64> = scores
            .iter()
            .filter(|s| s.score >= threshold)
            .map(|s| (s.scene, s.score))
            .collect();

        // Promote the in-flight activation on confirmation or timeout.
        let mut promoted = None;
        if let Some((scene, started)) = state.activating {
            if confirmed.contains_key(&scene) {
                state.activating = None;
                state.active.insert(
                    scene,
                    ActiveEntry {
                        confirmed: true,
                        since: at,
                    },
                );
                promoted = Some(scene);
                tracing::info!(%scene, "activation confirmed by matcher");
            } else if at - started >= timeout {
                state.activating = None;
                state.active.insert(
                    scene,
                    ActiveEntry {
                        confirmed: false,
                        since: at,
                    },
                );
                promoted = Some(scene);
                tracing::info!(%scene, "activation timed out, assuming active");
            }
        }

        // Confirm, prune, and pick up external activations.
        for (scene, entry) in std::mem::take(&mut state.active) {
            let keep = if confirmed.contains_key(&scene) {
                state.active.insert(
                    scene,
                    ActiveEntry {
                        confirmed: true,
                        since: entry.since,
                    },
                );
                true
            } else if !entry.confirmed && at - entry.since < timeout {
                // Grace for fail-open promotions the matcher has not
                // caught up with yet.
                state.active.insert(scene, entry);
                true
            } else {
                false
            };
            if !keep {
                tracing::debug!(%scene, "scene no longer matches, back to idle");
            }
        }
        for (&scene, _) in &confirmed {
            if state.activating.is_some_and(|(s, _)| s == scene) {
                continue;
            }
            state.active.entry(scene).or_insert(ActiveEntry {
                confirmed: true,
                since: at,
            });
        }

        if !self.config.overlapping_active && state.active.len() > 1 {
            let keeper = promoted.or_else(|| {
                state
                    .active
                    .keys()
                    .copied()
                    .max_by(|a, b| {
                        let score = |id: &SceneId| confirmed.get(id).copied().unwrap_or(0.0);
                        score(a).total_cmp(&score(b))
                    })
            });
            if let Some(keeper) = keeper {
                state.active.retain(|scene, _| *scene == keeper);
            }
        }
    }

    /// Status of one scene.
    #[must_use]
    pub fn status(&self, scene: SceneId) -> ActivationStatus {
        self.overview().status_of(scene)
    }

    /// Copied snapshot of the whole tracker for rendering.
    #[must_use]
    pub fn overview(&self) -> ActivationOverview {
        let state = self.lock();
        ActivationOverview {
            activating: state.activating.map(|(scene, _)| scene),
            active: state.active.keys().copied().collect(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxhub_domain::time::now;

    const THRESHOLD: f64 = 0.70;

    fn tracker() -> ActivationTracker {
        ActivationTracker::new(ActivationConfig::default())
    }

    fn score(scene: SceneId, score: f64) -> SceneScore {
        SceneScore { scene, score }
    }

    #[test]
    fn should_start_idle() {
        let t = tracker();
        assert_eq!(t.status(SceneId::new()), ActivationStatus::Idle);
    }

    #[test]
    fn should_enter_activating_after_accepted_command() {
        let t = tracker();
        let scene = SceneId::new();
        t.begin_activation(scene, now());
        assert_eq!(t.status(scene), ActivationStatus::Activating);
    }

    #[test]
    fn should_promote_to_active_when_matcher_confirms() {
        let t = tracker();
        let scene = SceneId::new();
        let start = now();
        t.begin_activation(scene, start);
        t.observe(&[score(scene, 0.85)], THRESHOLD, start + chrono::Duration::seconds(2));
        assert_eq!(t.status(scene), ActivationStatus::Active);
    }

    #[test]
    fn should_stay_activating_below_threshold_before_timeout() {
        let t = tracker();
        let scene = SceneId::new();
        let start = now();
        t.begin_activation(scene, start);
        t.observe(&[score(scene, 0.40)], THRESHOLD, start + chrono::Duration::seconds(5));
        assert_eq!(t.status(scene), ActivationStatus::Activating);
    }

    #[test]
    fn should_fail_open_to_active_after_timeout() {
        let t = tracker();
        let scene = SceneId::new();
        let start = now();
        t.begin_activation(scene, start);
        t.observe(&[score(scene, 0.10)], THRESHOLD, start + chrono::Duration::seconds(16));
        assert_eq!(t.status(scene), ActivationStatus::Active);
    }

    #[test]
    fn should_detect_external_activation() {
        let t = tracker();
        let scene = SceneId::new();
        t.observe(&[score(scene, 0.90)], THRESHOLD, now());
        assert_eq!(t.status(scene), ActivationStatus::Active);
    }

    #[test]
    fn should_never_activate_idle_scene_below_threshold() {
        let t = tracker();
        let scene = SceneId::new();
        t.observe(&[score(scene, 0.69)], THRESHOLD, now());
        assert_eq!(t.status(scene), ActivationStatus::Idle);
    }

    #[test]
    fn should_return_to_idle_when_confirmed_scene_stops_matching() {
        let t = tracker();
        let scene = SceneId::new();
        let start = now();
        t.observe(&[score(scene, 0.90)], THRESHOLD, start);
        assert_eq!(t.status(scene), ActivationStatus::Active);

        t.observe(&[score(scene, 0.20)], THRESHOLD, start + chrono::Duration::seconds(2));
        assert_eq!(t.status(scene), ActivationStatus::Idle);
    }

    #[test]
    fn should_keep_unconfirmed_active_through_grace_then_prune() {
        let t = tracker();
        let scene = SceneId::new();
        let start = now();
        t.begin_activation(scene, start);
        // Fail-open promotion at +16s, never confirmed.
        t.observe(&[score(scene, 0.10)], THRESHOLD, start + chrono::Duration::seconds(16));
        assert_eq!(t.status(scene), ActivationStatus::Active);

        // Still inside the grace window.
        t.observe(&[score(scene, 0.10)], THRESHOLD, start + chrono::Duration::seconds(20));
        assert_eq!(t.status(scene), ActivationStatus::Active);

        // Grace elapsed without confirmation.
        t.observe(&[score(scene, 0.10)], THRESHOLD, start + chrono::Duration::seconds(40));
        assert_eq!(t.status(scene), ActivationStatus::Idle);
    }

    #[test]
    fn should_replace_in_flight_activation_on_new_request() {
        let t = tracker();
        let first = SceneId::new();
        let second = SceneId::new();
        let start = now();
        t.begin_activation(first, start);
        t.begin_activation(second, start + chrono::Duration::seconds(1));
        assert_eq!(t.status(first), ActivationStatus::Idle);
        assert_eq!(t.status(second), ActivationStatus::Activating);
        assert_eq!(t.overview().activating, Some(second));
    }

    #[test]
    fn should_clear_other_actives_in_exclusive_mode() {
        let t = tracker();
        let first = SceneId::new();
        let second = SceneId::new();
        let start = now();
        t.observe(&[score(first, 0.90)], THRESHOLD, start);
        assert_eq!(t.status(first), ActivationStatus::Active);

        t.observe(
            &[score(first, 0.71), score(second, 0.95)],
            THRESHOLD,
            start + chrono::Duration::seconds(2),
        );
        assert_eq!(t.status(second), ActivationStatus::Active);
        assert_eq!(t.status(first), ActivationStatus::Idle);
    }

    #[test]
    fn should_tolerate_overlapping_actives_when_configured() {
        let t = ActivationTracker::new(ActivationConfig {
            overlapping_active: true,
            ..ActivationConfig::default()
        });
        let first = SceneId::new();
        let second = SceneId::new();
        t.observe(&[score(first, 0.90), score(second, 0.95)], THRESHOLD, now());
        assert_eq!(t.status(first), ActivationStatus::Active);
        assert_eq!(t.status(second), ActivationStatus::Active);
    }

    #[test]
    fn should_prefer_locally_promoted_scene_in_exclusive_mode() {
        let t = tracker();
        let local = SceneId::new();
        let external = SceneId::new();
        let start = now();
        t.begin_activation(local, start);
        t.observe(
            &[score(local, 0.80), score(external, 0.99)],
            THRESHOLD,
            start + chrono::Duration::seconds(1),
        );
        assert_eq!(t.status(local), ActivationStatus::Active);
        assert_eq!(t.status(external), ActivationStatus::Idle);
    }

    #[test]
    fn should_deactivate_explicitly() {
        let t = tracker();
        let scene = SceneId::new();
        t.observe(&[score(scene, 0.90)], THRESHOLD, now());
        t.deactivate(scene);
        assert_eq!(t.status(scene), ActivationStatus::Idle);
    }
}
