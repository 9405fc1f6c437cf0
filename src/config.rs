use serde::{Deserialize, Serialize};

/// Branch link selector used when nothing usable is stored
pub const DEFAULT_BRANCH_SELECTOR: &str = r#"a[href*="odoo-dev"]"#;

/// Stricter branch link selector written by the settings surface on save/reset
pub const SETTINGS_DEFAULT_BRANCH_SELECTOR: &str = r#"a[href*="odoo-dev"][title^="odoo-dev"]"#;

pub const DEFAULT_PULL_REQUEST_BODY_SELECTOR: &str = ".js-command-palette-pull-body";

/// Selectors the augmentation pass depends on. Never blank once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Anchor(s) showing the pull request's source branch
    pub branch_selector: String,
    /// Element holding the pull request description
    pub pull_request_body_selector: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            branch_selector: DEFAULT_BRANCH_SELECTOR.to_string(),
            pull_request_body_selector: DEFAULT_PULL_REQUEST_BODY_SELECTOR.to_string(),
        }
    }
}

impl Configuration {
    /// Values the settings surface falls back to.
    pub fn settings_defaults() -> Self {
        Self {
            branch_selector: SETTINGS_DEFAULT_BRANCH_SELECTOR.to_string(),
            pull_request_body_selector: DEFAULT_PULL_REQUEST_BODY_SELECTOR.to_string(),
        }
    }

    /// Fills every missing or blank stored value from `defaults`.
    pub fn resolve(stored: &StoredSettings, defaults: &Configuration) -> Self {
        fn pick(value: Option<&String>, fallback: &str) -> String {
            match value.map(|v| v.trim()) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => fallback.to_string(),
            }
        }
        Self {
            branch_selector: pick(stored.branch_selector.as_ref(), &defaults.branch_selector),
            pull_request_body_selector: pick(
                stored.pull_request_body_selector.as_ref(),
                &defaults.pull_request_body_selector,
            ),
        }
    }
}

/// Raw settings as persisted; either key may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoredSettings {
    #[serde(
        rename = "branchSelector",
        alias = "branchselector",
        alias = "branch_selector",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub branch_selector: Option<String>,
    #[serde(
        rename = "pullRequestBodySelector",
        alias = "pullrequestbodyselector",
        alias = "pull_request_body_selector",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pull_request_body_selector: Option<String>,
}

impl From<&Configuration> for StoredSettings {
    fn from(config: &Configuration) -> Self {
        Self {
            branch_selector: Some(config.branch_selector.clone()),
            pull_request_body_selector: Some(config.pull_request_body_selector.clone()),
        }
    }
}
