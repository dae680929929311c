use std::sync::Arc;

use anyhow::Result;
use designflow_http::{AppState, create_router};
use designflow_service::{AutomationService, DesignService, Dispatcher, EnrichmentService};

use super::{description_generator, job_executor, open_store};

pub(crate) async fn run(port: u16, host: String) -> Result<()> {
    let store = open_store()?;
    let generator = description_generator()?;

    let design_service = Arc::new(DesignService::new(Arc::clone(&store)));
    let enrichment_service = Arc::new(EnrichmentService::new(Arc::clone(&store), generator));
    let automation_service = Arc::new(AutomationService::new(store, job_executor()?));
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&design_service),
        enrichment_service,
        Arc::clone(&automation_service),
    ));

    let state = Arc::new(AppState { dispatcher, design_service, automation_service });
    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
