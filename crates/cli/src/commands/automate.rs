use anyhow::Result;
use designflow_service::AutomationService;

use super::{job_executor, open_store};
use crate::print_json;

pub(crate) async fn run(ids: &[String]) -> Result<()> {
    let service = AutomationService::new(open_store()?, job_executor()?);
    let bulk = service.start_bulk(ids).await?;
    for rejected in &bulk.rejected {
        tracing::warn!(record_id = %rejected.record_id, reason = %rejected.reason, "Not submitted");
    }
    service.wait_idle().await;
    print_json(&serde_json::json!({ "submission": bulk, "status": service.status() }))
}
