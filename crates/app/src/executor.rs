//! Command executor — ordered batches with partial-failure semantics.
//!
//! Every operation is resolved, authorized, and dispatched independently;
//! the batch never short-circuits on one failure. The batch succeeds when
//! at least one operation succeeded, and the caller always gets the full
//! per-operation outcome list.

use std::sync::Arc;

use luxhub_domain::command::{BatchReport, Command, CommandKind, CommandOutcome};
use luxhub_domain::directory::DirectorySnapshot;
use luxhub_domain::error::LuxhubError;
use luxhub_domain::selector::Selector;
use luxhub_domain::time::now;
use luxhub_domain::user::{ResolvedPermissionSet, User};

use crate::activation::ActivationTracker;
use crate::authorization;
use crate::ports::{CommandReceipt, DeviceCommander, ProposedBatch};
use crate::resolver;

/// Executor tuning. From `luxhub.toml [executor]`.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    /// Delay between per-zone sub-commands, to avoid device-side command
    /// collision on multizone hardware.
    pub zone_delay_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { zone_delay_ms: 300 }
    }
}

/// Applies command batches through the device-cloud collaborator.
pub struct CommandExecutor<C> {
    commander: C,
    tracker: Arc<ActivationTracker>,
    config: ExecutorConfig,
}

impl<C: DeviceCommander> CommandExecutor<C> {
    /// Create an executor over the given commander and tracker.
    pub fn new(commander: C, tracker: Arc<ActivationTracker>, config: ExecutorConfig) -> Self {
        Self {
            commander,
            tracker,
            config,
        }
    }

    /// Run a batch in order, collecting one outcome per operation.
    ///
    /// `summary` is echoed into the report (the assistant's wording, when
    /// the batch came from the language-model collaborator).
    #[tracing::instrument(skip_all, fields(user = %user.username, ops = commands.len()))]
    pub async fn execute(
        &self,
        user: &User,
        permissions: &ResolvedPermissionSet,
        snapshot: &DirectorySnapshot,
        commands: Vec<Command>,
        summary: Option<String>,
    ) -> BatchReport {
        let mut results = Vec::with_capacity(commands.len());
        let total = commands.len();
        for (index, command) in commands.into_iter().enumerate() {
            let zoned = matches!(command.selector, Selector::Zoned { .. });
            let outcome = self
                .run_one(user, permissions, snapshot, command)
                .await;
            results.push(outcome);
            // Back-to-back zone commands collide on the device side.
            if zoned && index + 1 < total {
                self.pause().await;
            }
        }
        BatchReport { summary, results }
    }

    /// Run an assistant-proposed batch: validate every raw action against
    /// the closed kind set, then execute the survivors in order.
    ///
    /// Unknown kinds and malformed selectors become failed outcomes in
    /// place — never forwarded to the cloud, never aborting the batch. A
    /// batch the model declined (`error` set) produces an empty, failed
    /// report carrying the model's reason as summary.
    #[tracing::instrument(skip_all, fields(user = %user.username, ops = batch.actions.len()))]
    pub async fn execute_proposals(
        &self,
        user: &User,
        permissions: &ResolvedPermissionSet,
        snapshot: &DirectorySnapshot,
        batch: ProposedBatch,
    ) -> BatchReport {
        if let Some(reason) = batch.error {
            return BatchReport {
                summary: Some(reason),
                results: Vec::new(),
            };
        }

        let mut results = Vec::with_capacity(batch.actions.len());
        let total = batch.actions.len();
        for (index, action) in batch.actions.into_iter().enumerate() {
            match Command::parse(&action.kind, &action.selector, action.state, &action.description)
            {
                Ok(command) => {
                    let zoned = matches!(command.selector, Selector::Zoned { .. });
                    let outcome = self
                        .run_one(user, permissions, snapshot, command)
                        .await;
                    results.push(outcome);
                    if zoned && index + 1 < total {
                        self.pause().await;
                    }
                }
                Err(err) => {
                    tracing::warn!(kind = %action.kind, error = %err, "rejecting proposed action");
                    results.push(CommandOutcome::failed(
                        action.description,
                        format!("invalid selector: {err}"),
                    ));
                }
            }
        }
        BatchReport {
            summary: Some(batch.summary),
            results,
        }
    }

    async fn run_one(
        &self,
        user: &User,
        permissions: &ResolvedPermissionSet,
        snapshot: &DirectorySnapshot,
        command: Command,
    ) -> CommandOutcome {
        let description = command.description.clone();
        match self
            .dispatch(user, permissions, snapshot, command)
            .await
        {
            Ok(detail) => CommandOutcome::ok(description, detail),
            Err(err) => {
                tracing::warn!(error = %error_text(&err), "operation failed");
                CommandOutcome::failed(description, error_text(&err))
            }
        }
    }

    async fn dispatch(
        &self,
        user: &User,
        permissions: &ResolvedPermissionSet,
        snapshot: &DirectorySnapshot,
        command: Command,
    ) -> Result<Option<String>, LuxhubError> {
        if let CommandKind::ActivateScene = command.kind {
            let Selector::Scene(scene) = command.selector else {
                return Err(luxhub_domain::error::SelectorError::UnsupportedOperation(
                    "activate_scene requires a scene selector".to_string(),
                )
                .into());
            };
            authorization::authorize_scene_activation(user, permissions, scene, snapshot)?;
            self.commander.activate_scene(scene).await?;
            // Only an accepted command may enter Activating.
            self.tracker.begin_activation(scene, now());
            return Ok(None);
        }

        let targets = resolver::resolve(&command.selector, snapshot)?;
        let verdict = authorization::authorize(user, permissions, targets, snapshot);
        let verdict =
            authorization::require_any(verdict, user, &command.selector.to_string())?;

        if verdict.is_full() {
            let receipt = self.send(&command.selector, &command.kind).await?;
            return Ok(receipt_detail(&receipt, 0));
        }

        // Partially denied: dispatch the permitted subset device by device.
        let denied = verdict.denied.len();
        let total = verdict.permitted.len();
        let mut accepted = 0usize;
        let mut attempted = 0usize;
        let mut last_err: Option<LuxhubError> = None;
        for (index, target) in verdict.permitted.iter().enumerate() {
            match self.send(&target.selector(), &command.kind).await {
                Ok(receipt) => {
                    let (ok, n) = receipt.accepted();
                    accepted += if n == 0 { 1 } else { ok };
                    attempted += n.max(1);
                }
                Err(err) => {
                    attempted += 1;
                    last_err = Some(err);
                }
            }
            if index + 1 < total {
                self.pause().await;
            }
        }

        if let (0, Some(err)) = (accepted, last_err) {
            return Err(err);
        }
        Ok(Some(format!(
            "updated {accepted}/{attempted} devices ({denied} denied)"
        )))
    }

    async fn send(
        &self,
        selector: &Selector,
        kind: &CommandKind,
    ) -> Result<CommandReceipt, LuxhubError> {
        match kind {
            CommandKind::Toggle => self.commander.toggle(selector).await,
            CommandKind::SetState(change) => self.commander.set_state(selector, change).await,
            CommandKind::ActivateScene => unreachable!("handled before dispatch"),
        }
    }

    async fn pause(&self) {
        tokio::time::sleep(std::time::Duration::from_millis(self.config.zone_delay_ms)).await;
    }
}

fn receipt_detail(receipt: &CommandReceipt, denied: usize) -> Option<String> {
    let (ok, total) = receipt.accepted();
    if total == 0 && denied == 0 {
        return None;
    }
    if denied == 0 {
        Some(format!("updated {ok}/{total} devices"))
    } else {
        Some(format!("updated {ok}/{total} devices ({denied} denied)"))
    }
}

fn error_text(err: &LuxhubError) -> String {
    match err {
        LuxhubError::InvalidSelector(inner) => format!("invalid selector: {inner}"),
        LuxhubError::PermissionDenied(inner) => format!("permission denied: {inner}"),
        LuxhubError::DeviceUnreachable(source) => format!("device cloud unreachable: {source}"),
        LuxhubError::RateLimited(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::{ActivationConfig, ActivationStatus};
    use crate::ports::{AcceptanceStatus, DeviceAcceptance};
    use luxhub_domain::command::StateChange;
    use luxhub_domain::device::{Device, Power};
    use luxhub_domain::id::SceneId;
    use luxhub_domain::scene::{Scene, TargetState};
    use luxhub_domain::time;
    use luxhub_domain::user::{Role, UserId};
    use std::collections::HashSet;
    use std::future::Future;
    use std::sync::Mutex;

    /// Commander stub: selectors in `failing` error as unreachable,
    /// scene ids in `rejecting` refuse activation; every call is recorded.
    #[derive(Default)]
    struct StubCommander {
        failing: HashSet<String>,
        rejecting: HashSet<SceneId>,
        calls: Mutex<Vec<String>>,
    }

    impl StubCommander {
        fn respond(&self, selector: String) -> Result<CommandReceipt, LuxhubError> {
            self.calls.lock().unwrap().push(selector.clone());
            if self.failing.contains(&selector) {
                return Err(LuxhubError::unreachable(std::io::Error::other(
                    "connect timeout",
                )));
            }
            Ok(CommandReceipt {
                results: vec![DeviceAcceptance {
                    id: "stub".into(),
                    label: "stub".to_string(),
                    status: AcceptanceStatus::Ok,
                }],
                rate: None,
            })
        }
    }

    impl DeviceCommander for StubCommander {
        fn set_state(
            &self,
            selector: &Selector,
            _change: &StateChange,
        ) -> impl Future<Output = Result<CommandReceipt, LuxhubError>> + Send {
            let result = self.respond(selector.to_string());
            async { result }
        }

        fn toggle(
            &self,
            selector: &Selector,
        ) -> impl Future<Output = Result<CommandReceipt, LuxhubError>> + Send {
            let result = self.respond(selector.to_string());
            async { result }
        }

        fn activate_scene(
            &self,
            scene: SceneId,
        ) -> impl Future<Output = Result<CommandReceipt, LuxhubError>> + Send {
            let result = if self.rejecting.contains(&scene) {
                Err(LuxhubError::unreachable(std::io::Error::other(
                    "activation rejected",
                )))
            } else {
                self.respond(format!("scene_id:{scene}"))
            };
            async { result }
        }
    }

    fn device(id: &str, label: &str, group: Option<(&str, &str)>) -> Device {
        let mut builder = Device::builder().id(id).label(label).power(Power::Off);
        if let Some((gid, glabel)) = group {
            builder = builder.group(gid, glabel);
        }
        builder.build().unwrap()
    }

    fn snapshot_with_scene() -> (DirectorySnapshot, SceneId) {
        let scene = Scene {
            id: SceneId::new(),
            label: "Evening".to_string(),
            states: vec![
                TargetState::for_selector(Selector::Device("d1".into())),
                TargetState::for_selector(Selector::Device("d2".into())),
            ],
        };
        let id = scene.id;
        let snap = DirectorySnapshot::new(
            vec![
                device("d1", "Desk Lamp", Some(("g1", "Office"))),
                device("d2", "Shelf Light", Some(("g1", "Office"))),
                device("d3", "Bed Lamp", Some(("g2", "Bedroom"))),
            ],
            vec![scene],
            time::now(),
        );
        (snap, id)
    }

    fn admin() -> User {
        User {
            id: UserId::new(1),
            username: "admin".to_string(),
            role: Role::Admin,
            nlp_enabled: true,
        }
    }

    fn named() -> User {
        User {
            id: UserId::new(2),
            username: "frida".to_string(),
            role: Role::Named,
            nlp_enabled: true,
        }
    }

    fn office_perms() -> ResolvedPermissionSet {
        let mut set = ResolvedPermissionSet::default();
        set.allow_group("Office");
        set
    }

    fn executor(commander: StubCommander) -> CommandExecutor<StubCommander> {
        CommandExecutor::new(
            commander,
            Arc::new(ActivationTracker::new(ActivationConfig::default())),
            ExecutorConfig { zone_delay_ms: 0 },
        )
    }

    fn toggle(selector: &str, description: &str) -> Command {
        Command::parse("toggle", selector, None, description).unwrap()
    }

    #[tokio::test]
    async fn should_report_every_operation_in_a_mixed_batch() {
        // Op 1 succeeds, op 2 is denied by authorization, op 3 fails at
        // the collaborator — the batch still reports all three and counts
        // as an overall success.
        let mut commander = StubCommander::default();
        commander.failing.insert("id:d1".to_string());
        let exec = executor(commander);
        let (snap, _) = snapshot_with_scene();

        let commands = vec![
            toggle("id:d2", "toggle shelf light"),
            toggle("id:d3", "toggle bed lamp"),
            toggle("id:d1", "toggle desk lamp"),
        ];
        let report = exec
            .execute(&named(), &office_perms(), &snap, commands, None)
            .await;

        assert_eq!(report.results.len(), 3);
        assert!(report.results[0].success);
        assert!(!report.results[1].success);
        assert!(
            report.results[1]
                .error
                .as_deref()
                .unwrap()
                .contains("permission denied")
        );
        assert!(!report.results[2].success);
        assert!(
            report.results[2]
                .error
                .as_deref()
                .unwrap()
                .contains("device cloud unreachable")
        );
        assert!(report.success());
        assert!(report.is_partial());
    }

    #[tokio::test]
    async fn should_continue_past_invalid_selector() {
        let exec = executor(StubCommander::default());
        let (snap, _) = snapshot_with_scene();

        let commands = vec![
            Command {
                selector: Selector::Device("ghost".into()),
                kind: CommandKind::Toggle,
                description: "toggle ghost".to_string(),
            },
            toggle("id:d1", "toggle desk lamp"),
        ];
        let report = exec.execute(&admin(), &office_perms(), &snap, commands, None).await;

        assert!(!report.results[0].success);
        assert!(
            report.results[0]
                .error
                .as_deref()
                .unwrap()
                .contains("invalid selector")
        );
        assert!(report.results[1].success);
    }

    #[tokio::test]
    async fn should_dispatch_original_selector_when_fully_permitted() {
        let exec = executor(StubCommander::default());
        let (snap, _) = snapshot_with_scene();

        let report = exec
            .execute(
                &named(),
                &office_perms(),
                &snap,
                vec![toggle("group_id:g1", "toggle office")],
                None,
            )
            .await;

        assert!(report.results[0].success);
        let calls = exec.commander.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["group_id:g1".to_string()]);
    }

    #[tokio::test]
    async fn should_split_dispatch_when_partially_denied() {
        // `all` resolves to three devices; only the two Office ones are
        // permitted, so dispatch goes device by device.
        let exec = executor(StubCommander::default());
        let (snap, _) = snapshot_with_scene();

        let report = exec
            .execute(
                &named(),
                &office_perms(),
                &snap,
                vec![toggle("all", "toggle everything I can")],
                None,
            )
            .await;

        assert!(report.results[0].success);
        assert!(
            report.results[0]
                .detail
                .as_deref()
                .unwrap()
                .contains("(1 denied)")
        );
        let calls = exec.commander.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["id:d1".to_string(), "id:d2".to_string()]);
    }

    #[tokio::test]
    async fn should_enter_activating_only_after_accepted_activation() {
        let exec = executor(StubCommander::default());
        let (snap, scene_id) = snapshot_with_scene();

        let report = exec
            .execute(
                &admin(),
                &ResolvedPermissionSet::default(),
                &snap,
                vec![Command::parse(
                    "activate_scene",
                    &format!("scene_id:{scene_id}"),
                    None,
                    "activate evening",
                )
                .unwrap()],
                None,
            )
            .await;

        assert!(report.results[0].success);
        assert_eq!(exec.tracker.status(scene_id), ActivationStatus::Activating);
    }

    #[tokio::test]
    async fn should_not_enter_activating_when_cloud_rejects_activation() {
        let (snap, scene_id) = snapshot_with_scene();
        let mut commander = StubCommander::default();
        commander.rejecting.insert(scene_id);
        let exec = executor(commander);

        let report = exec
            .execute(
                &admin(),
                &ResolvedPermissionSet::default(),
                &snap,
                vec![Command::parse(
                    "activate_scene",
                    &format!("scene_id:{scene_id}"),
                    None,
                    "activate evening",
                )
                .unwrap()],
                None,
            )
            .await;

        assert!(!report.results[0].success);
        assert_eq!(exec.tracker.status(scene_id), ActivationStatus::Idle);
    }

    #[tokio::test]
    async fn should_reject_unknown_proposed_kinds_in_place() {
        use crate::ports::{ProposedAction, ProposedBatch};

        let exec = executor(StubCommander::default());
        let (snap, _) = snapshot_with_scene();

        let batch = ProposedBatch {
            summary: "mixed bag".to_string(),
            actions: vec![
                ProposedAction {
                    kind: "pulse".to_string(),
                    selector: "id:d1".to_string(),
                    state: None,
                    description: "strobe the desk lamp".to_string(),
                },
                ProposedAction {
                    kind: "toggle".to_string(),
                    selector: "id:d1".to_string(),
                    state: None,
                    description: "toggle desk lamp".to_string(),
                },
            ],
            error: None,
        };
        let report = exec
            .execute_proposals(&admin(), &ResolvedPermissionSet::default(), &snap, batch)
            .await;

        assert_eq!(report.results.len(), 2);
        assert!(!report.results[0].success);
        assert!(
            report.results[0]
                .error
                .as_deref()
                .unwrap()
                .contains("invalid selector")
        );
        assert!(report.results[1].success);
        assert_eq!(report.summary.as_deref(), Some("mixed bag"));
        // The unknown kind never reached the cloud.
        assert_eq!(exec.commander.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_surface_assistant_refusal_as_failed_empty_report() {
        use crate::ports::ProposedBatch;

        let exec = executor(StubCommander::default());
        let (snap, _) = snapshot_with_scene();

        let batch = ProposedBatch {
            summary: String::new(),
            actions: vec![],
            error: Some("no such room".to_string()),
        };
        let report = exec
            .execute_proposals(&admin(), &ResolvedPermissionSet::default(), &snap, batch)
            .await;

        assert!(report.results.is_empty());
        assert!(!report.success());
        assert_eq!(report.summary.as_deref(), Some("no such room"));
    }

    #[tokio::test]
    async fn should_reject_scene_activation_for_partially_permitted_user() {
        let exec = executor(StubCommander::default());
        let (snap, scene_id) = snapshot_with_scene();
        // Scene addresses d1+d2; permit only d1's label.
        let mut perms = ResolvedPermissionSet::default();
        perms.allow_device("Desk Lamp");

        let report = exec
            .execute(
                &named(),
                &perms,
                &snap,
                vec![Command::parse(
                    "activate_scene",
                    &format!("scene_id:{scene_id}"),
                    None,
                    "activate evening",
                )
                .unwrap()],
                None,
            )
            .await;

        assert!(!report.results[0].success);
        assert_eq!(exec.tracker.status(scene_id), ActivationStatus::Idle);
        // Nothing was dispatched to the cloud.
        assert!(exec.commander.calls.lock().unwrap().is_empty());
    }
}
