//! Tab discovery over the DevTools HTTP endpoints (`/json/*`).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::client::CdpClient;
use super::page::CdpTarget;
use crate::error::AutomationError;
use crate::selectors::SelectorSet;
use crate::target::{RemoteTarget, TargetProvider, TargetSpec};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// One entry of `/json/list`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub web_socket_debugger_url: Option<String>,
}

impl PageInfo {
    fn is_page(&self) -> bool {
        self.kind == "page"
    }
}

/// A Chrome instance started with `--remote-debugging-port`.
#[derive(Debug, Clone)]
pub struct CdpBrowser {
    http: reqwest::Client,
    endpoint: String,
    selectors: Arc<SelectorSet>,
}

impl CdpBrowser {
    /// # Errors
    /// Returns `AutomationError::Connection` if the HTTP client cannot be built.
    pub fn new(endpoint: &str, selectors: SelectorSet) -> Result<Self, AutomationError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AutomationError::Connection(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            selectors: Arc::new(selectors),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, AutomationError> {
        let response = request
            .send()
            .await
            .map_err(|e| AutomationError::Connection(format!("{what}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AutomationError::Protocol(format!("{what}: HTTP {status}")));
        }
        response.json().await.map_err(|e| AutomationError::Protocol(format!("{what}: {e}")))
    }

    async fn call(&self, path: &str) -> Result<(), AutomationError> {
        let response = self
            .http
            .get(format!("{}{path}", self.endpoint))
            .send()
            .await
            .map_err(|e| AutomationError::Connection(format!("{path}: {e}")))?;
        if !response.status().is_success() {
            return Err(AutomationError::Protocol(format!("{path}: HTTP {}", response.status())));
        }
        Ok(())
    }

    /// Every open page tab.
    ///
    /// # Errors
    /// Returns an error if the endpoint is unreachable or answers garbage.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, AutomationError> {
        let targets: Vec<PageInfo> = self
            .get_json(self.http.get(format!("{}/json/list", self.endpoint)), "/json/list")
            .await?;
        Ok(targets.into_iter().filter(PageInfo::is_page).collect())
    }

    async fn attach(&self, page: PageInfo) -> Result<Arc<dyn RemoteTarget>, AutomationError> {
        let ws_url = page.web_socket_debugger_url.ok_or_else(|| {
            AutomationError::Protocol(format!("page {} exposes no debugger URL", page.id))
        })?;
        let client = CdpClient::connect(&ws_url).await?;
        Ok(Arc::new(CdpTarget::new(client, page.id, page.url, Arc::clone(&self.selectors))))
    }
}

#[async_trait]
impl TargetProvider for CdpBrowser {
    async fn find(
        &self,
        spec: &TargetSpec,
    ) -> Result<Option<Arc<dyn RemoteTarget>>, AutomationError> {
        let pages = self.list_pages().await?;
        let mut exact = None;
        for page in pages.into_iter().filter(|p| p.url.starts_with(&spec.match_prefix)) {
            if page.url == spec.url && exact.is_none() {
                exact = Some(page);
                continue;
            }
            // Stray tabs on the same site would compete for the session.
            tracing::info!(page_id = %page.id, url = %page.url, "Closing stray target tab");
            if let Err(e) = self.call(&format!("/json/close/{}", page.id)).await {
                tracing::warn!(page_id = %page.id, error = %e, "Failed to close stray tab");
            }
        }

        let Some(page) = exact else {
            return Ok(None);
        };
        self.call(&format!("/json/activate/{}", page.id)).await?;
        tracing::info!(page_id = %page.id, "Switched to existing target tab");
        self.attach(page).await.map(Some)
    }

    async fn open(&self, spec: &TargetSpec) -> Result<Arc<dyn RemoteTarget>, AutomationError> {
        let page: PageInfo = self
            .get_json(
                self.http.put(format!("{}/json/new?{}", self.endpoint, spec.url)),
                "/json/new",
            )
            .await?;
        tracing::info!(page_id = %page.id, url = %spec.url, "Opened target tab");
        self.attach(page).await
    }
}
