pub(crate) mod analyze;
pub(crate) mod automate;
pub(crate) mod designs;
pub(crate) mod serve;

use std::sync::Arc;

use anyhow::Result;
use designflow_automation::cdp::CdpBrowser;
use designflow_automation::{AutomationSettings, JobExecutor, JobRunner};
use designflow_llm::{DescriptionGenerator, LlmClient};
use designflow_storage::{DesignStore, Storage};

use crate::{ensure_db_dir, get_api_key, get_base_url, get_db_path};

pub(crate) fn open_store() -> Result<Arc<dyn DesignStore>> {
    let db_path = get_db_path();
    ensure_db_dir(&db_path)?;
    Ok(Arc::new(Storage::new(&db_path)?))
}

pub(crate) fn description_generator() -> Result<Arc<dyn DescriptionGenerator>> {
    let llm = LlmClient::new(get_api_key()?, get_base_url())?;
    tracing::info!(model = llm.model(), base_url = llm.base_url(), "Inference client ready");
    Ok(Arc::new(llm))
}

/// Job runner driving the Chrome instance at `DESIGNFLOW_CDP_URL`.
pub(crate) fn job_executor() -> Result<Arc<dyn JobExecutor>> {
    let settings = AutomationSettings::from_env();
    let browser = CdpBrowser::new(&settings.cdp_url, settings.selectors.clone())?;
    tracing::info!(cdp_url = %settings.cdp_url, target = %settings.target.url, "Automation target configured");
    Ok(Arc::new(JobRunner::new(Arc::new(browser), settings)))
}
