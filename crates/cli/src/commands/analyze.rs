use anyhow::Result;
use designflow_service::EnrichmentService;

use super::{description_generator, open_store};
use crate::print_json;

pub(crate) async fn run(id: Option<String>) -> Result<()> {
    let service = EnrichmentService::new(open_store()?, description_generator()?);
    match id {
        Some(id) => print_json(&service.analyze_one(&id).await?),
        None => {
            let report = service.analyze_all().await?;
            tracing::info!(
                analyzed = report.analyzed,
                skipped = report.skipped,
                failed = report.failed.len(),
                "Analysis finished"
            );
            print_json(&report)
        },
    }
}
