//! The fixed step sequence run for one design against the target page.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use designflow_core::DesignRecord;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::AutomationSettings;
use crate::error::AutomationError;
use crate::poller::{PollPolicy, try_wait_until};
use crate::target::{Intent, Probe, RemoteTarget, TargetProvider};

/// Runs one automation job. Implemented by [`JobRunner`] and by test doubles.
#[async_trait]
pub trait JobExecutor: Send + Sync + 'static {
    async fn run(&self, record: &DesignRecord) -> Result<JobReport, AutomationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStep {
    AcquireTarget,
    AwaitReady,
    EnsureAuthenticated,
    FillPrompt,
    SelectOption,
    Submit,
}

/// What a finished job did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub record_id: String,
    pub target_url: String,
    /// `true` when an already open page was reused.
    pub reused_target: bool,
    pub steps: Vec<JobStep>,
}

/// Production executor driving a [`TargetProvider`].
///
/// Live handles are cached by target URL so consecutive jobs share one page.
pub struct JobRunner {
    provider: Arc<dyn TargetProvider>,
    settings: AutomationSettings,
    live: Mutex<HashMap<String, Arc<dyn RemoteTarget>>>,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner").field("settings", &self.settings).finish_non_exhaustive()
    }
}

async fn poll_probe(
    target: &dyn RemoteTarget,
    policy: PollPolicy,
    probe: &Probe,
    what: &str,
) -> Result<u32, AutomationError> {
    try_wait_until(policy, || target.evaluate(probe)).await?.into_result(what)
}

impl JobRunner {
    pub fn new(provider: Arc<dyn TargetProvider>, settings: AutomationSettings) -> Self {
        Self { provider, settings, live: Mutex::new(HashMap::new()) }
    }

    #[must_use]
    pub const fn settings(&self) -> &AutomationSettings {
        &self.settings
    }

    /// Reuses a cached live handle, else an open tab, else opens a new one.
    async fn acquire(&self) -> Result<(Arc<dyn RemoteTarget>, bool), AutomationError> {
        let spec = &self.settings.target;
        let mut live = self.live.lock().await;

        if let Some(target) = live.get(&spec.url) {
            if target.is_live().await {
                tracing::debug!(url = %spec.url, "Reusing live target handle");
                return Ok((Arc::clone(target), true));
            }
            live.remove(&spec.url);
        }

        let (target, reused) = match self.provider.find(spec).await? {
            Some(target) => (target, true),
            None => (self.provider.open(spec).await?, false),
        };
        live.insert(spec.url.clone(), Arc::clone(&target));
        Ok((target, reused))
    }

    async fn evict(&self) {
        self.live.lock().await.remove(&self.settings.target.url);
    }

    async fn drive(
        &self,
        target: &dyn RemoteTarget,
        prompt: &str,
        steps: &mut Vec<JobStep>,
    ) -> Result<(), AutomationError> {
        let settings = &self.settings;

        let attempts =
            poll_probe(target, settings.page_load, &Probe::DocumentReady, "page load").await?;
        tracing::debug!(attempts, "Target page loaded");
        steps.push(JobStep::AwaitReady);

        if !target.evaluate(&Probe::Authenticated).await? {
            tracing::info!("Target not signed in yet, waiting for login");
            poll_probe(target, settings.auth, &Probe::Authenticated, "authentication").await?;
        }
        steps.push(JobStep::EnsureAuthenticated);

        target.fill(Intent::PromptField, prompt).await?.require(Intent::PromptField.as_str())?;
        steps.push(JobStep::FillPrompt);

        let label = settings.option_label.as_str();
        target.click(Intent::OptionMenu).await?.require(Intent::OptionMenu.as_str())?;
        poll_probe(
            target,
            settings.option_lookup,
            &Probe::OptionVisible(label.to_owned()),
            &format!("option '{label}'"),
        )
        .await?;
        target
            .select_option(Intent::OptionMenu, label)
            .await?
            .require(&format!("option '{label}'"))?;
        steps.push(JobStep::SelectOption);

        target.click(Intent::SubmitControl).await?.require(Intent::SubmitControl.as_str())?;
        steps.push(JobStep::Submit);
        Ok(())
    }
}

#[async_trait]
impl JobExecutor for JobRunner {
    async fn run(&self, record: &DesignRecord) -> Result<JobReport, AutomationError> {
        let prompt = record
            .prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AutomationError::MissingPrompt(record.id.clone()))?;

        let (target, reused_target) = self.acquire().await?;
        let mut steps = vec![JobStep::AcquireTarget];

        if let Err(e) = self.drive(target.as_ref(), prompt, &mut steps).await {
            if e.is_connection() {
                self.evict().await;
            }
            tracing::warn!(record_id = %record.id, ?steps, error = %e, "Automation job aborted");
            return Err(e);
        }

        tracing::info!(record_id = %record.id, reused_target, "Automation job submitted");
        Ok(JobReport {
            record_id: record.id.clone(),
            target_url: target.url().to_owned(),
            reused_target,
            steps,
        })
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
