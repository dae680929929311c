//! One entry point for every inbound trigger, keyed by action name.

use std::sync::Arc;

use designflow_core::{Ack, ScrapedDesign};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AutomationService, DesignService, EnrichmentService, ServiceError};

/// Inbound trigger, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    Import {
        #[serde(flatten)]
        design: ScrapedDesign,
    },
    AnalyzeAll,
    AnalyzeDesign {
        id: String,
    },
    StartAutomation {
        id: String,
    },
    StartBulkAutomation {
        ids: Vec<String>,
    },
    /// Drops queued jobs; the running one finishes.
    CancelAutomation,
    DeleteDesign {
        id: String,
    },
    ClearDesigns,
    ListDesigns,
}

impl Action {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Import { .. } => "import",
            Self::AnalyzeAll => "analyzeAll",
            Self::AnalyzeDesign { .. } => "analyzeDesign",
            Self::StartAutomation { .. } => "startAutomation",
            Self::StartBulkAutomation { .. } => "startBulkAutomation",
            Self::CancelAutomation => "cancelAutomation",
            Self::DeleteDesign { .. } => "deleteDesign",
            Self::ClearDesigns => "clearDesigns",
            Self::ListDesigns => "listDesigns",
        }
    }
}

pub struct Dispatcher {
    designs: Arc<DesignService>,
    enrichment: Arc<EnrichmentService>,
    automation: Arc<AutomationService>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        designs: Arc<DesignService>,
        enrichment: Arc<EnrichmentService>,
        automation: Arc<AutomationService>,
    ) -> Self {
        Self { designs, enrichment, automation }
    }

    /// Runs `action` and reports the result. Never fails: errors become `Ack::Error`.
    pub async fn dispatch(&self, action: Action) -> Ack {
        let name = action.name();
        match self.execute(action).await {
            Ok(ack) => ack,
            Err(e) => {
                tracing::warn!(action = name, error = %e, "Action failed");
                Ack::error(e.to_string())
            },
        }
    }

    /// Parses a raw `{"action": ...}` payload first; a malformed one is an error ack.
    pub async fn dispatch_value(&self, payload: serde_json::Value) -> Ack {
        match serde_json::from_value::<Action>(payload) {
            Ok(action) => self.dispatch(action).await,
            Err(e) => {
                tracing::warn!(error = %e, "Unrecognized action payload");
                Ack::error(format!("invalid action: {e}"))
            },
        }
    }

    async fn execute(&self, action: Action) -> Result<Ack, ServiceError> {
        let ack = match action {
            Action::Import { design } => Ack::ok_with(&self.designs.import(&design).await?),
            Action::AnalyzeAll => Ack::ok_with(&self.enrichment.analyze_all().await?),
            Action::AnalyzeDesign { id } => Ack::ok_with(&self.enrichment.analyze_one(&id).await?),
            Action::StartAutomation { id } => Ack::ok_with(&self.automation.start(&id).await?),
            Action::StartBulkAutomation { ids } => {
                Ack::ok_with(&self.automation.start_bulk(&ids).await?)
            },
            Action::CancelAutomation => {
                Ack::ok_with(&json!({ "cancelled": self.automation.cancel_pending() }))
            },
            Action::DeleteDesign { id } => {
                Ack::ok_with(&json!({ "deleted": self.designs.delete(&id).await? }))
            },
            Action::ClearDesigns => Ack::ok_with(&json!({ "removed": self.designs.clear().await? })),
            Action::ListDesigns => Ack::ok_with(&self.designs.list().await?),
        };
        Ok(ack)
    }
}
