//! Diagram engine options.
//!
//! Read from the `[diagrams]` table with snake_case keys and handed to the
//! diagram engine in its camelCase shape:
//!
//! ```json
//! {"theme":"dark","securityLevel":"loose","startOnLoad":true,
//!  "flowchart":{"useMaxWidth":false,"htmlLabels":true}}
//! ```

use serde::{Deserialize, Serialize};

/// Visual palette of rendered diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// The engine's stock palette.
    #[serde(rename = "default")]
    Classic,
    #[default]
    Dark,
    Forest,
    Neutral,
    Base,
}

/// How much embedded content (links, HTML labels, scripts) diagrams may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Strict,
    #[default]
    Loose,
    Antiscript,
    Sandbox,
}

/// Flowchart layout options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct FlowchartConfig {
    /// Constrain diagrams to the container width.
    pub use_max_width: bool,
    /// Allow rich markup in node labels.
    pub html_labels: bool,
}

impl Default for FlowchartConfig {
    fn default() -> Self {
        Self {
            use_max_width: false,
            html_labels: true,
        }
    }
}

/// Options passed to the diagram engine's configure entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct DiagramsConfig {
    /// Visual palette.
    pub theme: Theme,
    /// Embedded content permissiveness.
    pub security_level: SecurityLevel,
    /// Whether the engine scans the page on its own at startup.
    pub start_on_load: bool,
    /// Flowchart layout options.
    pub flowchart: FlowchartConfig,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            security_level: SecurityLevel::default(),
            start_on_load: true,
            flowchart: FlowchartConfig::default(),
        }
    }
}

impl DiagramsConfig {
    /// Engine-shaped JSON for this configuration.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        // Plain enums and bools always serialize
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_default_json_shape() {
        assert_eq!(
            DiagramsConfig::default().to_json(),
            json!({
                "theme": "dark",
                "securityLevel": "loose",
                "startOnLoad": true,
                "flowchart": {"useMaxWidth": false, "htmlLabels": true}
            })
        );
    }

    #[test]
    fn test_parse_snake_case_toml() {
        let toml = r#"
theme = "forest"
security_level = "strict"
start_on_load = false

[flowchart]
use_max_width = true
"#;
        let config: DiagramsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.theme, Theme::Forest);
        assert_eq!(config.security_level, SecurityLevel::Strict);
        assert!(!config.start_on_load);
        assert!(config.flowchart.use_max_width);
        assert!(config.flowchart.html_labels);
    }

    #[test]
    fn test_classic_theme_serializes_as_default() {
        let config = DiagramsConfig {
            theme: Theme::Classic,
            ..DiagramsConfig::default()
        };
        assert_eq!(config.to_json()["theme"], "default");
        let parsed: DiagramsConfig = toml::from_str(r#"theme = "default""#).unwrap();
        assert_eq!(parsed.theme, Theme::Classic);
    }

    #[test]
    fn test_theme_names_agree_between_toml_and_json() {
        for name in ["default", "dark", "forest", "neutral", "base"] {
            let config: DiagramsConfig = toml::from_str(&format!("theme = \"{name}\"")).unwrap();
            assert_eq!(config.to_json()["theme"], name);
        }
        let result: Result<DiagramsConfig, _> = toml::from_str(r#"theme = "midnight""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_security_level_is_rejected() {
        let result: Result<DiagramsConfig, _> = toml::from_str(r#"security_level = "open""#);
        assert!(result.is_err());
    }
}
