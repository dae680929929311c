use anyhow::Result;
use designflow_core::ScrapedDesign;
use designflow_service::DesignService;
use serde_json::json;

use super::open_store;
use crate::print_json;

fn service() -> Result<DesignService> {
    Ok(DesignService::new(open_store()?))
}

pub(crate) async fn import(title: String, brand: String, url: String, image: String) -> Result<()> {
    let scrape = ScrapedDesign::new(title, brand, url, image);
    print_json(&service()?.import(&scrape).await?)
}

pub(crate) async fn list() -> Result<()> {
    print_json(&service()?.list().await?)
}

pub(crate) async fn get(id: &str) -> Result<()> {
    print_json(&service()?.get(id).await?)
}

pub(crate) async fn delete(id: &str) -> Result<()> {
    print_json(&json!({ "deleted": service()?.delete(id).await? }))
}

pub(crate) async fn clear() -> Result<()> {
    print_json(&json!({ "removed": service()?.clear().await? }))
}
