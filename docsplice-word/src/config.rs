use serde::{
    Deserialize,
    Serialize,
};

use crate::Result;

/// Number of passes the simplifier consists of.
pub const PASS_COUNT: usize = 5;

/// Controls how far the simplifier runs and which optional rules are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Number of passes to run, values above [PASS_COUNT] run everything.
    pub limit: usize,

    /// Prefix labels and references with a readable name derived from the caption.
    pub use_nice_reference_names: bool,

    /// Insert a soft hyphen after dots between letters (`System.IO`) so long names can wrap.
    pub wrap_dotted_names: bool,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            limit: PASS_COUNT,
            use_nice_reference_names: false,
            wrap_dotted_names: false,
        }
    }
}

impl SimplifyConfig {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Output layout of the [crate::Renderer].
///
/// Templates are filled by plain text replacement of the placeholders
/// `{label}`, `{key}` and `{caption}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output receiving the main document.
    pub document_key: String,
    /// Output receiving `preamble` tokens.
    pub preamble_key: String,
    /// Appended to `{float kind}_{label}` to name a float output.
    pub float_extension: String,

    /// Float kinds whose content is not run through the prose substitutions.
    /// A kind also covers its `_` suffixed variants like `listing_python`.
    pub verbatim_floats: Vec<String>,
    /// Float kinds whose body directly follows the label without a separator.
    pub inline_floats: Vec<String>,

    /// A converted value ending with this suffix swallows the next end of paragraph.
    pub no_break_suffix: Option<String>,

    pub label_template: String,
    pub verbatim_label_template: String,
    /// Written into the float output after the buffered caption.
    pub float_label_template: String,
    /// Written into the main document where a float has been redirected.
    pub float_reference_template: String,

    /// Written once before the first appendix heading.
    pub appendix_marker: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            document_key: "document.tex".to_string(),
            preamble_key: "preamble.tex".to_string(),
            float_extension: ".tex".to_string(),

            verbatim_floats: vec!["listing".to_string()],
            inline_floats: vec!["equation".to_string()],

            no_break_suffix: Some("\\wxnobreak".to_string()),

            label_template: "\\label{{label}}".to_string(),
            verbatim_label_template: "@\\label{{label}}@".to_string(),
            float_label_template: "{{label}}".to_string(),
            float_reference_template: "\n% {caption}\n\\input{{key}}\n".to_string(),

            appendix_marker: "\\appendix\n".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }
}

#[cfg(test)]
mod test {
    use super::{
        RenderConfig,
        SimplifyConfig,
        PASS_COUNT,
    };

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SimplifyConfig::from_json(r#"{ "limit": 2 }"#).unwrap();
        assert_eq!(config.limit, 2);
        assert!(!config.use_nice_reference_names);

        let config = SimplifyConfig::from_json("{}").unwrap();
        assert_eq!(config.limit, PASS_COUNT);
    }

    #[test]
    fn render_config_from_json() {
        let config = RenderConfig::from_json(r#"{ "document_key": "thesis.tex", "no_break_suffix": null }"#).unwrap();
        assert_eq!(config.document_key, "thesis.tex");
        assert_eq!(config.no_break_suffix, None);
        assert_eq!(config.preamble_key, RenderConfig::default().preamble_key);
    }

    #[test]
    fn invalid_json() {
        assert!(SimplifyConfig::from_json(r#"{ "limit": "all" }"#).is_err());
    }
}
