//! The LIFX HTTP client implementing the directory and commander ports.

use std::sync::{Mutex, PoisonError};

use reqwest::StatusCode;

use luxhub_app::ports::{
    AcceptanceStatus, CommandReceipt, DeviceAcceptance, DeviceCommander, DeviceDirectory,
    RateBudget,
};
use luxhub_domain::command::StateChange;
use luxhub_domain::directory::DirectorySnapshot;
use luxhub_domain::error::LuxhubError;
use luxhub_domain::id::SceneId;
use luxhub_domain::selector::Selector;
use luxhub_domain::time::{Timestamp, now};

use crate::config::LifxConfig;
use crate::error::LifxError;
use crate::model::{LightDto, ResultsDto, SceneDto};

/// Local view of the cloud's request quota, updated from response headers.
#[derive(Debug, Clone, Copy)]
struct Budget {
    remaining: u32,
    reset_at: Timestamp,
    window_max: u32,
}

impl Budget {
    fn new(window_max: u32) -> Self {
        Self {
            remaining: window_max,
            reset_at: now(),
            window_max,
        }
    }

    /// Gate a new dispatch. Past the reset time the window starts fresh;
    /// inside the window an exhausted budget fails fast.
    fn check(&mut self, at: Timestamp) -> Result<(), LifxError> {
        if at >= self.reset_at {
            self.remaining = self.window_max;
            return Ok(());
        }
        if self.remaining == 0 {
            let retry_after_secs = (self.reset_at - at).num_seconds().max(0).unsigned_abs();
            return Err(LifxError::RateLimited { retry_after_secs });
        }
        Ok(())
    }

    fn update(&mut self, remaining: u32, reset_at: Timestamp) {
        self.remaining = remaining;
        self.reset_at = reset_at;
    }
}

/// LIFX cloud client. One instance per process; cheap to share behind `Arc`.
pub struct LifxClient {
    http: reqwest::Client,
    config: LifxConfig,
    budget: Mutex<Budget>,
}

impl LifxClient {
    /// Build a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`LifxError::Http`] when the underlying client cannot be
    /// constructed.
    pub fn new(config: LifxConfig) -> Result<Self, LifxError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(LifxError::Http)?;
        Ok(Self {
            http,
            budget: Mutex::new(Budget::new(config.rate_limit_max)),
            config,
        })
    }

    fn budget_lock(&self) -> std::sync::MutexGuard<'_, Budget> {
        self.budget.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_budget(&self) -> Result<(), LifxError> {
        self.budget_lock().check(now())
    }

    /// Pull `X-RateLimit-*` metadata from a response and update the local
    /// budget. Returns the metadata for the receipt.
    fn absorb_rate_headers(&self, response: &reqwest::Response) -> Option<RateBudget> {
        let header_u64 = |name: &str| {
            response
                .headers()
                .get(name)?
                .to_str()
                .ok()?
                .parse::<u64>()
                .ok()
        };
        let remaining = u32::try_from(header_u64("x-ratelimit-remaining")?).ok()?;
        let reset_epoch = header_u64("x-ratelimit-reset")?;
        let reset_at =
            chrono::DateTime::from_timestamp(i64::try_from(reset_epoch).ok()?, 0)?;

        self.budget_lock().update(remaining, reset_at);
        Some(RateBudget {
            remaining,
            reset_at,
        })
    }

    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(reqwest::Response, Option<RateBudget>), LifxError> {
        self.check_budget()?;

        let url = format!("{}{path}", self.config.base_url);
        let mut builder = self
            .http
            .request(method, &url)
            .bearer_auth(&self.config.token);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(LifxError::Http)?;
        let rate = self.absorb_rate_headers(&response);

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = rate
                .map(|r| (r.reset_at - now()).num_seconds().max(0).unsigned_abs())
                .unwrap_or(60);
            return Err(LifxError::RateLimited { retry_after_secs });
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LifxError::Status { status, body });
        }
        Ok((response, rate))
    }

    async fn write(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<CommandReceipt, LifxError> {
        let (response, rate) = self.request(method, path, body).await?;
        let body: ResultsDto = response.json().await.unwrap_or_default();
        Ok(CommandReceipt {
            results: body
                .results
                .into_iter()
                .map(|r| DeviceAcceptance {
                    id: r.id.into(),
                    label: r.label,
                    status: acceptance_from(&r.status),
                })
                .collect(),
            rate,
        })
    }

    fn fill_duration(&self, change: &StateChange) -> StateChange {
        let mut change = change.clone();
        if change.duration.is_none() {
            change.duration = Some(self.config.default_duration_secs);
        }
        change
    }
}

fn acceptance_from(status: &str) -> AcceptanceStatus {
    match status {
        "ok" => AcceptanceStatus::Ok,
        "timed_out" => AcceptanceStatus::TimedOut,
        _ => AcceptanceStatus::Offline,
    }
}

impl DeviceDirectory for LifxClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_snapshot(&self) -> Result<DirectorySnapshot, LuxhubError> {
        let (lights, _) = self
            .request(reqwest::Method::GET, "/lights/all", None)
            .await?;
        let lights: Vec<LightDto> = lights.json().await.map_err(LifxError::Decode)?;

        let (scenes, _) = self.request(reqwest::Method::GET, "/scenes", None).await?;
        let scenes: Vec<SceneDto> = scenes.json().await.map_err(LifxError::Decode)?;

        let snapshot = DirectorySnapshot::new(
            lights.into_iter().map(LightDto::into_device).collect(),
            scenes.into_iter().map(SceneDto::into_scene).collect(),
            now(),
        );
        tracing::debug!(
            devices = snapshot.devices.len(),
            scenes = snapshot.scenes.len(),
            "directory snapshot fetched"
        );
        Ok(snapshot)
    }
}

impl DeviceCommander for LifxClient {
    #[tracing::instrument(skip(self, change), fields(selector = %selector))]
    async fn set_state(
        &self,
        selector: &Selector,
        change: &StateChange,
    ) -> Result<CommandReceipt, LuxhubError> {
        let body = serde_json::to_value(self.fill_duration(change))
            .map_err(LuxhubError::storage)?;
        let path = format!("/lights/{}/state", selector.to_wire());
        Ok(self.write(reqwest::Method::PUT, &path, Some(body)).await?)
    }

    #[tracing::instrument(skip(self), fields(selector = %selector))]
    async fn toggle(&self, selector: &Selector) -> Result<CommandReceipt, LuxhubError> {
        let path = format!("/lights/{}/toggle", selector.to_wire());
        Ok(self.write(reqwest::Method::POST, &path, None).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn activate_scene(&self, scene: SceneId) -> Result<CommandReceipt, LuxhubError> {
        let path = format!("/scenes/scene_id:{scene}/activate");
        Ok(self.write(reqwest::Method::PUT, &path, None).await?)
    }
}
