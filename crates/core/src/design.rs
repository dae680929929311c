//! Design records and the scraped fields they are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DESIGN_ID_PREFIX;
use crate::{Error, Result};

/// Fields captured from a product page by the import trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedDesign {
    pub title: Option<String>,
    pub brand: Option<String>,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
}

impl ScrapedDesign {
    pub fn new(
        title: impl Into<String>,
        brand: impl Into<String>,
        source_url: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            brand: Some(brand.into()),
            source_url: Some(source_url.into()),
            image_url: Some(image_url.into()),
        }
    }

    /// Checks that every field is present and non-blank, returning the trimmed values.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` naming the first missing field.
    pub fn validate(&self) -> Result<ValidScrape> {
        fn required(value: Option<&String>, field: &str) -> Result<String> {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(ToOwned::to_owned)
                .ok_or_else(|| Error::InvalidInput(format!("missing {field}")))
        }

        Ok(ValidScrape {
            title: required(self.title.as_ref(), "title")?,
            brand: required(self.brand.as_ref(), "brand")?,
            source_url: required(self.source_url.as_ref(), "sourceUrl")?,
            image_url: required(self.image_url.as_ref(), "imageUrl")?,
        })
    }
}

/// A scrape that passed validation. Only constructible through [`ScrapedDesign::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidScrape {
    title: String,
    brand: String,
    source_url: String,
    image_url: String,
}

impl ValidScrape {
    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

/// Whether a record still waits for its generated prompt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DesignStatus {
    Pending,
    Analyzed,
}

/// A persisted design entry keyed by `id`.
///
/// `source_url` is the deduplication key; `prompt` moves from `None` to
/// `Some` exactly once; `images` and `generated_outputs` only grow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DesignRecord {
    pub id: String,
    pub title: String,
    pub brand: String,
    pub source_url: Option<String>,
    pub images: Vec<String>,
    pub prompt: Option<String>,
    #[serde(default)]
    pub generated_outputs: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl DesignRecord {
    /// Builds a fresh, pending record with a generated id.
    pub fn from_scraped(scrape: ValidScrape) -> Self {
        Self {
            id: format!("{DESIGN_ID_PREFIX}{}", uuid::Uuid::new_v4()),
            title: scrape.title,
            brand: scrape.brand,
            source_url: Some(scrape.source_url),
            images: vec![scrape.image_url],
            prompt: None,
            generated_outputs: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> DesignStatus {
        if self.prompt.is_some() { DesignStatus::Analyzed } else { DesignStatus::Pending }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.prompt.is_none()
    }

    /// The image used for analysis; only the first one matters downstream.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Returns `true` when `url` identifies the same source item.
    pub fn has_source_url(&self, url: &str) -> bool {
        self.source_url.as_deref() == Some(url)
    }
}

/// Result of an import trigger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ImportOutcome {
    Imported { record: DesignRecord },
    /// The source URL is already stored; nothing was written.
    DuplicateSkipped { existing_id: String },
}

impl ImportOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateSkipped { .. })
    }
}
