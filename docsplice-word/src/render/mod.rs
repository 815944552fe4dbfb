use std::collections::{
    BTreeMap,
    HashMap,
};

use docsplice::Token;

use crate::{
    Diagnostic,
    Diagnostics,
    RenderConfig,
};

mod substitutions;
pub use substitutions::Substitutions;

/// Converts the value of one token kind into at most one output token.
pub type Conversion = Box<dyn FnMut(Option<&str>) -> Option<Token>>;

/// Maps token kinds to their [Conversion].
///
/// A conversion returns an untagged token for literal output or one of the
/// routing kinds understood by the [Renderer]:
/// `error`, `preamble`, `float_<kind>`, `label`, `end_float` and `appendix`.
#[derive(Default)]
pub struct ConversionTable {
    entries: HashMap<String, Conversion>,
}

impl ConversionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, kind: impl Into<String>, conversion: F)
    where
        F: FnMut(Option<&str>) -> Option<Token> + 'static,
    {
        self.entries.insert(kind.into(), Box::new(conversion));
    }

    pub fn with<F>(mut self, kind: impl Into<String>, conversion: F) -> Self
    where
        F: FnMut(Option<&str>) -> Option<Token> + 'static,
    {
        self.insert(kind, conversion);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// `None` if the kind is unknown, `Some(None)` if the conversion dropped the token.
    fn convert(&mut self, kind: &str, value: Option<&str>) -> Option<Option<Token>> {
        self.entries.get_mut(kind).map(|conversion| conversion(value))
    }
}

/// The named outputs of a [Renderer] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    document_key: String,
    outputs: BTreeMap<String, String>,
}

impl Rendered {
    pub fn document(&self) -> &str {
        self.get(&self.document_key).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    pub fn into_outputs(self) -> BTreeMap<String, String> {
        self.outputs
    }
}

fn fill(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(placeholder, value)
}

fn matches_float(kinds: &[String], float: &str) -> bool {
    kinds.iter().any(|kind| {
        float
            .strip_prefix(kind.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('_'))
    })
}

struct State {
    outputs: BTreeMap<String, String>,
    target: String,

    /// Caption of a float which has not been labeled yet.
    pending_float: Option<String>,
    /// Kind of the open float, extended by its label once it is known.
    open_float: Option<String>,

    verbatim: bool,
    appendix: bool,
    skip_paragraph_ends: usize,
}

impl State {
    fn new(document_key: &str) -> Self {
        let mut outputs = BTreeMap::new();
        outputs.insert(document_key.to_string(), String::new());

        Self {
            outputs,
            target: document_key.to_string(),

            pending_float: None,
            open_float: None,

            verbatim: false,
            appendix: false,
            skip_paragraph_ends: 0,
        }
    }

    fn write(&mut self, key: &str, text: &str) {
        self.outputs.entry(key.to_string()).or_default().push_str(text);
    }

    fn write_target(&mut self, text: &str) {
        self.outputs
            .entry(self.target.clone())
            .or_default()
            .push_str(text);
    }

    fn close_float(&mut self, document_key: &str) {
        self.pending_float = None;
        self.open_float = None;
        self.verbatim = false;
        self.target = document_key.to_string();
    }
}

/// Writes a simplified token stream into one or more text outputs.
///
/// Floats are buffered until their label is known and then redirected into an
/// output of their own, named `{kind}_{label}{float_extension}`. The main document
/// receives a reference to that output in place of the float.
pub struct Renderer {
    conversions: ConversionTable,
    prose: Substitutions,
    formula: Substitutions,
    config: RenderConfig,
}

impl Renderer {
    pub fn new(conversions: ConversionTable) -> Self {
        Self {
            conversions,
            prose: Substitutions::new(),
            formula: Substitutions::new(),
            config: RenderConfig::default(),
        }
    }

    /// Substitutions applied to untagged text outside of verbatim floats.
    pub fn with_prose(mut self, substitutions: Substitutions) -> Self {
        self.prose = substitutions;
        self
    }

    /// Substitutions applied to the output of every `math*` kind.
    pub fn with_formula(mut self, substitutions: Substitutions) -> Self {
        self.formula = substitutions;
        self
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render<'a>(
        &mut self,
        tokens: impl IntoIterator<Item = &'a Token>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Rendered {
        let mut state = State::new(&self.config.document_key);

        for token in tokens {
            let Some(output) = self.convert(&mut state, token, diagnostics) else {
                continue;
            };

            self.dispatch(&mut state, output, diagnostics);
        }

        if let Some(float) = state.open_float.take() {
            diagnostics.report(Diagnostic::UnterminatedFloat { float });
        }

        tracing::debug!(outputs = state.outputs.len(), "rendered document");
        Rendered {
            document_key: self.config.document_key.clone(),
            outputs: state.outputs,
        }
    }

    fn convert(
        &mut self,
        state: &mut State,
        token: &Token,
        diagnostics: &mut dyn Diagnostics,
    ) -> Option<Token> {
        if token.is_kind("eop") && state.skip_paragraph_ends > 0 {
            state.skip_paragraph_ends -= 1;
            return None;
        }

        let mut output = match token.kind() {
            None => {
                let text = token.value()?;
                if state.verbatim {
                    Token::text(text)
                } else {
                    Token::text(self.prose.apply(text))
                }
            }
            Some(kind) => {
                let Some(output) = self.conversions.convert(kind, token.value()) else {
                    diagnostics.report(Diagnostic::UnhandledKind {
                        kind: kind.to_string(),
                    });
                    return None;
                };

                let mut output = output?;
                let is_formula = kind
                    .get(..4)
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case("math"));
                if is_formula {
                    let value = self.formula.apply(output.value()?);
                    output.set_value(value);
                }
                output
            }
        };

        if let Some(suffix) = self.config.no_break_suffix.as_deref().filter(|suffix| !suffix.is_empty()) {
            if let Some(value) = output.value().and_then(|value| value.strip_suffix(suffix)) {
                let value = value.to_string();
                output.set_value(value);
                state.skip_paragraph_ends += 1;
            }
        }

        Some(output)
    }

    fn dispatch(&self, state: &mut State, output: Token, diagnostics: &mut dyn Diagnostics) {
        let config = &self.config;
        let value = output.value_or_empty();

        let Some(kind) = output.kind() else {
            match state.pending_float.as_mut() {
                Some(caption) => caption.push_str(value),
                None => state.write_target(value),
            }
            return;
        };

        if kind.eq_ignore_ascii_case("error") {
            diagnostics.report(Diagnostic::ErrorToken {
                message: value.to_string(),
            });
        } else if kind.eq_ignore_ascii_case("preamble") {
            state.write(&config.preamble_key, value);
        } else if let Some(float) = kind.strip_prefix("float_") {
            if let Some(caption) = state.pending_float.take() {
                diagnostics.report(Diagnostic::FloatWithinFloat { caption });
            } else if let Some(float) = state.open_float.take() {
                diagnostics.report(Diagnostic::UnterminatedFloat { float });
            }
            state.close_float(&config.document_key);

            state.pending_float = Some(value.to_string());
            state.open_float = Some(float.to_string());
        } else if kind.eq_ignore_ascii_case("label") {
            if let Some(caption) = state.pending_float.take() {
                let float = state.open_float.take().unwrap_or_default();
                let key = format!("{}_{}{}", float, value, config.float_extension);

                let reference = fill(&config.float_reference_template, "{key}", &key);
                let reference = fill(&reference, "{caption}", &caption.replace('\n', "//"));
                state.write(&config.document_key, &reference);

                state.target = key.clone();
                state.write_target(&caption);
                state.write_target(&fill(&config.float_label_template, "{label}", value));

                if matches_float(&config.verbatim_floats, &float) {
                    state.verbatim = true;
                    state.write_target("\n");
                } else if !matches_float(&config.inline_floats, &float) {
                    state.write_target("\n\n");
                }

                state.open_float = Some(key);
            } else if state.verbatim {
                state.write_target(&fill(&config.verbatim_label_template, "{label}", value));
            } else {
                state.write_target(&fill(&config.label_template, "{label}", value));
            }
        } else if kind.eq_ignore_ascii_case("end_float") {
            if let Some(caption) = state.pending_float.take() {
                diagnostics.report(Diagnostic::FloatTerminatedEarly { caption });
            } else if state.open_float.is_none() {
                diagnostics.report(Diagnostic::UnexpectedFloatTerminator);
            } else {
                state.write_target(value);
            }
            state.close_float(&config.document_key);
        } else if kind.eq_ignore_ascii_case("appendix") {
            if !state.appendix {
                state.write_target(&config.appendix_marker);
                state.appendix = true;
            }
            state.write_target(value);
        } else {
            diagnostics.report(Diagnostic::UnhandledKind {
                kind: kind.to_string(),
            });
        }
    }
}
