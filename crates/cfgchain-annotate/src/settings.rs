//! Annotation settings.

use serde::{Deserialize, Serialize};

/// Controls whether new blocks carry annotations and who writes them.
///
/// Read from the `[annotation]` table of the settings file:
///
/// ```toml
/// [annotation]
/// enabled = true
/// provider = { external = { command = ["./analyze-change"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationSettings {
    /// When false, blocks record a plain set-difference diff.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub provider: AnnotationProvider,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationProvider {
    /// LCS diff with counted summary, computed in-process
    #[default]
    BuiltinDiff,
    /// An external program speaking the annotation JSON protocol
    External { command: Vec<String> },
}

fn default_enabled() -> bool {
    true
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: AnnotationProvider::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AnnotationSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.provider, AnnotationProvider::BuiltinDiff);
    }

    #[test]
    fn test_parse_builtin_provider() {
        let settings: AnnotationSettings =
            toml::from_str("enabled = false\nprovider = \"builtin-diff\"").unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.provider, AnnotationProvider::BuiltinDiff);
    }

    #[test]
    fn test_parse_external_provider() {
        let settings: AnnotationSettings =
            toml::from_str("provider = { external = { command = [\"analyze\", \"--json\"] } }")
                .unwrap();
        assert!(settings.enabled);
        assert_eq!(
            settings.provider,
            AnnotationProvider::External {
                command: vec!["analyze".to_string(), "--json".to_string()]
            }
        );
    }

    #[test]
    fn test_empty_table_uses_defaults() {
        let settings: AnnotationSettings = toml::from_str("").unwrap();
        assert_eq!(settings, AnnotationSettings::default());
    }
}
