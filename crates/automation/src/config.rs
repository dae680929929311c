//! Automation settings read from the environment.

use std::time::Duration;

use designflow_core::constants::{
    DEFAULT_AUTH_ATTEMPTS, DEFAULT_CDP_URL, DEFAULT_OPTION_ATTEMPTS, DEFAULT_OPTION_LABEL,
    DEFAULT_PAGE_LOAD_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TARGET_PREFIX,
    DEFAULT_TARGET_URL,
};
use designflow_core::{env_parse_with_default, env_string};

use crate::poller::PollPolicy;
use crate::selectors::SelectorSet;
use crate::target::TargetSpec;

/// Everything a [`crate::JobRunner`] needs besides the target provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationSettings {
    pub cdp_url: String,
    pub target: TargetSpec,
    pub option_label: String,
    pub page_load: PollPolicy,
    pub auth: PollPolicy,
    pub option_lookup: PollPolicy,
    pub selectors: SelectorSet,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        let interval = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
        Self {
            cdp_url: DEFAULT_CDP_URL.to_owned(),
            target: TargetSpec::new(DEFAULT_TARGET_URL, DEFAULT_TARGET_PREFIX),
            option_label: DEFAULT_OPTION_LABEL.to_owned(),
            page_load: PollPolicy::bounded(interval, DEFAULT_PAGE_LOAD_ATTEMPTS),
            auth: PollPolicy::bounded(interval, DEFAULT_AUTH_ATTEMPTS),
            option_lookup: PollPolicy::bounded(interval, DEFAULT_OPTION_ATTEMPTS),
            selectors: SelectorSet::default(),
        }
    }
}

/// `https://host/path?q` -> `https://host/`
fn site_prefix(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_owned();
    };
    let host_start = scheme_end.saturating_add(3);
    match url.get(host_start..).and_then(|rest| rest.find('/')) {
        Some(slash) => url.get(..=host_start.saturating_add(slash)).unwrap_or(url).to_owned(),
        None => format!("{url}/"),
    }
}

impl AutomationSettings {
    /// Reads `DESIGNFLOW_CDP_URL`, `DESIGNFLOW_TARGET_URL`, `DESIGNFLOW_OPTION_LABEL`
    /// and the `DESIGNFLOW_*_ATTEMPTS` / `DESIGNFLOW_POLL_INTERVAL_MS` bounds.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let interval = Duration::from_millis(env_parse_with_default(
            "DESIGNFLOW_POLL_INTERVAL_MS",
            DEFAULT_POLL_INTERVAL_MS,
        ));
        let target = match env_string("DESIGNFLOW_TARGET_URL") {
            Some(url) => {
                let prefix = site_prefix(&url);
                TargetSpec::new(url, prefix)
            },
            None => defaults.target,
        };

        Self {
            cdp_url: env_string("DESIGNFLOW_CDP_URL").unwrap_or(defaults.cdp_url),
            target,
            option_label: env_string("DESIGNFLOW_OPTION_LABEL").unwrap_or(defaults.option_label),
            page_load: PollPolicy::bounded(
                interval,
                env_parse_with_default("DESIGNFLOW_PAGE_LOAD_ATTEMPTS", DEFAULT_PAGE_LOAD_ATTEMPTS),
            ),
            auth: PollPolicy::bounded(
                interval,
                env_parse_with_default("DESIGNFLOW_AUTH_ATTEMPTS", DEFAULT_AUTH_ATTEMPTS),
            ),
            option_lookup: PollPolicy::bounded(
                interval,
                env_parse_with_default("DESIGNFLOW_OPTION_ATTEMPTS", DEFAULT_OPTION_ATTEMPTS),
            ),
            selectors: defaults.selectors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_prefix() {
        assert_eq!(
            site_prefix("https://studio.creativefabrica.com/flow/?new=true"),
            "https://studio.creativefabrica.com/"
        );
        assert_eq!(site_prefix("https://ideogram.ai"), "https://ideogram.ai/");
        assert_eq!(site_prefix("about:blank"), "about:blank");
    }

    #[test]
    fn test_defaults_are_bounded() {
        let settings = AutomationSettings::default();
        assert!(settings.page_load.is_bounded());
        assert_eq!(settings.option_lookup.max_attempts, Some(20));
        assert_eq!(settings.option_lookup.interval, Duration::from_millis(500));
        assert_eq!(settings.target.match_prefix, DEFAULT_TARGET_PREFIX);
    }

    #[test]
    fn test_from_env_overrides() {
        // SAFETY: test-only env mutation on a variable no other test reads
        unsafe {
            std::env::set_var("DESIGNFLOW_OPTION_ATTEMPTS", "7");
        }
        let settings = AutomationSettings::from_env();
        assert_eq!(settings.option_lookup.max_attempts, Some(7));
        unsafe {
            std::env::remove_var("DESIGNFLOW_OPTION_ATTEMPTS");
        }
    }
}
