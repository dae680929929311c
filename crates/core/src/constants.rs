//! Shared constants for designflow.
//!
//! Defaults for the automation target and the inference collaborator live
//! here so the CLI, the HTTP server and tests agree on them.

/// Prefix of every generated design id.
pub const DESIGN_ID_PREFIX: &str = "design-";

/// Instruction sent alongside the product image when asking for a prompt.
pub const ANALYSIS_INSTRUCTION: &str = "Give a prompt create design like this. Must be similar in the same style with clean black background easy to delete. Important focus on the text if exist, must be the same like on image. Your answer must be only prompt about graphic don't write about t-shirt. Only prompt with graphic description!";

/// Default vision model for prompt generation.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com";

/// Completion token cap for a generated prompt.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Studio page the automation queue drives.
pub const DEFAULT_TARGET_URL: &str = "https://studio.creativefabrica.com/flow/?new=true";

/// Prefix identifying any tab that belongs to the studio site.
pub const DEFAULT_TARGET_PREFIX: &str = "https://studio.creativefabrica.com/";

/// Option picked in the studio's resolution menu for every job.
pub const DEFAULT_OPTION_LABEL: &str = "Square 1:1";

/// Chrome remote debugging endpoint.
pub const DEFAULT_CDP_URL: &str = "http://127.0.0.1:9222";

/// Delay between two readiness checks, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Page readiness checks before giving up (60s at the default interval).
pub const DEFAULT_PAGE_LOAD_ATTEMPTS: u32 = 120;

/// Login-state checks before giving up (30s at the default interval).
pub const DEFAULT_AUTH_ATTEMPTS: u32 = 60;

/// Lookups of an asynchronously rendered menu option.
pub const DEFAULT_OPTION_ATTEMPTS: u32 = 20;
