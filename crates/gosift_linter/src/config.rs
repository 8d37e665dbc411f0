//! Configuration document
//!
//! Configuration is a JSON document with rule groups. A rule runs only if
//! some group lists it and that group is enabled; a rule absent from every
//! group is off. Unknown rule names are ignored with a warning so configs
//! stay forward-compatible.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::LintError;
use crate::messages::RuleId;
use crate::severity::Severity;

pub const ALL_RULES: [RuleId; 8] = [
    RuleId::NoDotImports,
    RuleId::ErrorStringFormat,
    RuleId::MaxParams,
    RuleId::NoDeferInLoop,
    RuleId::AlwaysPreferConst,
    RuleId::PreferIncDec,
    RuleId::MaxFuncLines,
    RuleId::EmptyBlock,
];

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Global cap on reported issues; `None` means unlimited
    pub max_issues: Option<usize>,
    /// Path substrings to skip during discovery
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub assistance: Assistance,
    /// Rule groups; group names are free-form
    #[serde(default, flatten)]
    pub groups: FxHashMap<String, RuleGroup>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Assistance {
    /// Apply safe fixes when running with `--write`
    #[serde(default)]
    pub autofix: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleGroup {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub rules: FxHashMap<String, RuleSetting>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetting {
    /// Override for the rule's default severity
    pub severity: Option<String>,
    /// Numeric threshold for limit-style rules
    pub limit: Option<u32>,
}

impl Config {
    /// Load a configuration document from a JSON file
    pub fn load(path: &Path) -> Result<Config, LintError> {
        let text = std::fs::read_to_string(path).map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| LintError::Config(format!("{}: {}", path.display(), e)))?;

        for group in config.groups.values() {
            for name in group.rules.keys() {
                if !ALL_RULES.iter().any(|id| id.name() == name) {
                    tracing::warn!(rule = %name, "unknown rule in config, ignoring");
                }
            }
        }

        Ok(config)
    }

    /// Configuration with every rule enabled at its default severity,
    /// used when no config file is given.
    pub fn all_rules() -> Config {
        let mut rules = FxHashMap::default();
        for id in ALL_RULES {
            rules.insert(id.name().to_string(), RuleSetting::default());
        }
        let mut groups = FxHashMap::default();
        groups.insert(
            "default".to_string(),
            RuleGroup {
                enabled: true,
                rules,
            },
        );
        Config {
            max_issues: None,
            exclude: Vec::new(),
            assistance: Assistance::default(),
            groups,
        }
    }

    /// The setting for a rule, if it is enabled by any active group
    pub fn rule_setting(&self, id: RuleId) -> Option<&RuleSetting> {
        self.groups
            .values()
            .filter(|g| g.enabled)
            .find_map(|g| g.rules.get(id.name()))
    }

    /// Severity for a rule, honoring any config override
    pub fn severity_for(&self, id: RuleId, default: Severity) -> Severity {
        self.rule_setting(id)
            .and_then(|s| s.severity.as_deref())
            .map(Severity::parse)
            .unwrap_or(default)
    }

    /// Threshold for a limit-style rule, honoring any config override
    pub fn limit_for(&self, id: RuleId, default: u32) -> u32 {
        self.rule_setting(id)
            .and_then(|s| s.limit)
            .unwrap_or(default)
    }

    /// Whether a path is excluded by an `exclude` entry
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let text = path.to_string_lossy();
        self.exclude.iter().any(|pat| text.contains(pat.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_rule_is_disabled() {
        let config: Config = serde_json::from_str(
            r#"{
                "style": {
                    "rules": { "empty-block": {} }
                }
            }"#,
        )
        .unwrap();
        assert!(config.rule_setting(RuleId::EmptyBlock).is_some());
        assert!(config.rule_setting(RuleId::MaxParams).is_none());
    }

    #[test]
    fn disabled_group_turns_rules_off() {
        let config: Config = serde_json::from_str(
            r#"{
                "style": {
                    "enabled": false,
                    "rules": { "empty-block": {} }
                }
            }"#,
        )
        .unwrap();
        assert!(config.rule_setting(RuleId::EmptyBlock).is_none());
    }

    #[test]
    fn severity_and_limit_overrides() {
        let config: Config = serde_json::from_str(
            r#"{
                "maxIssues": 50,
                "style": {
                    "rules": {
                        "max-params": { "severity": "error", "limit": 3 }
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_issues, Some(50));
        assert_eq!(
            config.severity_for(RuleId::MaxParams, Severity::Warning),
            Severity::Error
        );
        assert_eq!(config.limit_for(RuleId::MaxParams, 5), 3);
    }

    #[test]
    fn all_rules_config_enables_everything() {
        let config = Config::all_rules();
        for id in ALL_RULES {
            assert!(config.rule_setting(id).is_some(), "{} missing", id);
        }
    }

    #[test]
    fn exclude_matches_substring() {
        let config: Config =
            serde_json::from_str(r#"{ "exclude": ["generated", "vendor_extra"] }"#).unwrap();
        assert!(config.is_excluded(Path::new("pkg/generated/api.go")));
        assert!(!config.is_excluded(Path::new("pkg/server/api.go")));
    }
}
