use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::client::CdpClient;
use crate::error::AutomationError;
use crate::selectors::SelectorSet;
use crate::target::{ActionResult, Intent, Probe, RemoteTarget};

/// One browser tab driven through `Runtime.evaluate`.
#[derive(Debug)]
pub struct CdpTarget {
    client: CdpClient,
    page_id: String,
    url: String,
    selectors: Arc<SelectorSet>,
}

impl CdpTarget {
    pub fn new(
        client: CdpClient,
        page_id: String,
        url: String,
        selectors: Arc<SelectorSet>,
    ) -> Self {
        Self { client, page_id, url, selectors }
    }

    async fn evaluate_bool(&self, script: &str) -> Result<bool, AutomationError> {
        match self.client.evaluate_js(script).await? {
            Value::Bool(b) => Ok(b),
            other => Err(AutomationError::Protocol(format!("expected boolean, got {other}"))),
        }
    }

    async fn act(&self, script: &str) -> Result<ActionResult, AutomationError> {
        if self.evaluate_bool(script).await? {
            Ok(ActionResult::Applied)
        } else {
            Ok(ActionResult::ElementMissing)
        }
    }
}

#[async_trait]
impl RemoteTarget for CdpTarget {
    fn url(&self) -> &str {
        &self.url
    }

    async fn is_live(&self) -> bool {
        !self.client.is_closed()
    }

    async fn fill(&self, intent: Intent, value: &str) -> Result<ActionResult, AutomationError> {
        tracing::debug!(page_id = %self.page_id, intent = intent.as_str(), "Filling field");
        self.act(&self.selectors.fill_script(intent, value)).await
    }

    async fn select_option(
        &self,
        intent: Intent,
        label: &str,
    ) -> Result<ActionResult, AutomationError> {
        tracing::debug!(page_id = %self.page_id, intent = intent.as_str(), label, "Selecting option");
        self.act(&self.selectors.select_option_script(label)).await
    }

    async fn click(&self, intent: Intent) -> Result<ActionResult, AutomationError> {
        tracing::debug!(page_id = %self.page_id, intent = intent.as_str(), "Clicking");
        self.act(&self.selectors.click_script(intent)).await
    }

    async fn evaluate(&self, probe: &Probe) -> Result<bool, AutomationError> {
        match self.selectors.probe_script(probe) {
            Some(script) => self.evaluate_bool(&script).await,
            None => Ok(true),
        }
    }
}
