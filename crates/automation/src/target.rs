//! Capability interface over the external page being automated.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AutomationError;

/// Logical element an action is aimed at. The adapter maps it to a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    PromptField,
    OptionMenu,
    SubmitControl,
}

impl Intent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PromptField => "prompt field",
            Self::OptionMenu => "option menu",
            Self::SubmitControl => "submit control",
        }
    }
}

/// State question evaluated against the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    DocumentReady,
    Authenticated,
    OptionVisible(String),
}

/// Outcome of a single action. A missing element is a result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    Applied,
    ElementMissing,
}

impl ActionResult {
    /// Turns `ElementMissing` into [`AutomationError::TargetNotFound`].
    ///
    /// # Errors
    /// Returns `TargetNotFound` naming `what` if the element was absent.
    pub fn require(self, what: &str) -> Result<(), AutomationError> {
        match self {
            Self::Applied => Ok(()),
            Self::ElementMissing => Err(AutomationError::TargetNotFound(what.to_owned())),
        }
    }
}

/// A live handle to one page of the external surface.
///
/// Each call is independent; nothing is rolled back when a later step fails.
#[async_trait]
pub trait RemoteTarget: Send + Sync {
    /// URL the handle was opened for.
    fn url(&self) -> &str;

    /// Whether the handle can still accept actions.
    async fn is_live(&self) -> bool;

    async fn fill(&self, intent: Intent, value: &str) -> Result<ActionResult, AutomationError>;

    /// Picks the entry labelled `label` in the (already opened) menu.
    async fn select_option(
        &self,
        intent: Intent,
        label: &str,
    ) -> Result<ActionResult, AutomationError>;

    async fn click(&self, intent: Intent) -> Result<ActionResult, AutomationError>;

    async fn evaluate(&self, probe: &Probe) -> Result<bool, AutomationError>;
}

/// Which page to drive. Pages sharing `match_prefix` belong to the same site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub url: String,
    pub match_prefix: String,
}

impl TargetSpec {
    pub fn new(url: impl Into<String>, match_prefix: impl Into<String>) -> Self {
        Self { url: url.into(), match_prefix: match_prefix.into() }
    }
}

/// Locates or opens target pages.
#[async_trait]
pub trait TargetProvider: Send + Sync {
    /// An already open page at exactly `spec.url`, if any.
    async fn find(&self, spec: &TargetSpec)
    -> Result<Option<Arc<dyn RemoteTarget>>, AutomationError>;

    /// Opens a fresh page at `spec.url`.
    async fn open(&self, spec: &TargetSpec) -> Result<Arc<dyn RemoteTarget>, AutomationError>;
}
