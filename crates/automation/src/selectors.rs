//! Selectors for the studio page and the scripts built from them.
//!
//! User-supplied strings are embedded as JSON string literals, never spliced raw.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::target::{Intent, Probe};

/// CSS selectors the page adapter resolves intents with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    pub prompt_field: String,
    pub option_menu: String,
    /// Elements whose trimmed text is compared with the option label.
    pub option_item: String,
    pub submit_control: String,
    /// Present only when logged in. `None` treats every page as authenticated.
    #[serde(default)]
    pub authenticated: Option<String>,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            prompt_field: "textarea".to_owned(),
            option_menu: "button[data-studiobuttonicon]".to_owned(),
            option_item: "button span".to_owned(),
            submit_control: r#"button[type="submit"]"#.to_owned(),
            authenticated: None,
        }
    }
}

fn js_string(s: &str) -> String {
    Value::String(s.to_owned()).to_string()
}

impl SelectorSet {
    #[must_use]
    pub fn selector_for(&self, intent: Intent) -> &str {
        match intent {
            Intent::PromptField => &self.prompt_field,
            Intent::OptionMenu => &self.option_menu,
            Intent::SubmitControl => &self.submit_control,
        }
    }

    /// Sets the element's value and fires `input` so the page's framework sees it.
    pub(crate) fn fill_script(&self, intent: Intent, value: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel}); if (!el) return false; \
             el.focus(); el.value = {val}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); return true; }})()",
            sel = js_string(self.selector_for(intent)),
            val = js_string(value),
        )
    }

    pub(crate) fn click_script(&self, intent: Intent) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel}); if (!el) return false; \
             el.click(); return true; }})()",
            sel = js_string(self.selector_for(intent)),
        )
    }

    fn find_option_expr(&self, label: &str) -> String {
        format!(
            "Array.from(document.querySelectorAll({item})).find(e => e.textContent.trim() === {label})",
            item = js_string(&self.option_item),
            label = js_string(label),
        )
    }

    pub(crate) fn select_option_script(&self, label: &str) -> String {
        format!(
            "(() => {{ const el = {find}; if (!el) return false; el.click(); return true; }})()",
            find = self.find_option_expr(label),
        )
    }

    /// `None` when the probe needs no page round-trip.
    pub(crate) fn probe_script(&self, probe: &Probe) -> Option<String> {
        match probe {
            Probe::DocumentReady => Some("document.readyState === 'complete'".to_owned()),
            Probe::Authenticated => self
                .authenticated
                .as_deref()
                .map(|sel| format!("document.querySelector({}) !== null", js_string(sel))),
            Probe::OptionVisible(label) => {
                Some(format!("({}) !== undefined", self.find_option_expr(label)))
            },
        }
    }
}
