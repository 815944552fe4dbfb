use docsplice::{
    Pipeline,
    Sequence,
};

use crate::{
    rules,
    Context,
    Diagnostics,
    DocumentParts,
    Error,
    FormulaTranslator,
    Result,
    SimplifyConfig,
};

/// Rewrites the raw token stream of a document into the structural tokens
/// consumed by the [crate::Renderer].
///
/// The five passes can be executed incrementally. A pass is never executed twice and
/// asking for a pass runs every pass before it first.
pub struct Simplifier {
    pipeline: Pipeline<Context, Error>,
    context: Context,
}

impl Simplifier {
    pub fn new(parts: DocumentParts, config: SimplifyConfig) -> Self {
        Self {
            pipeline: Pipeline::new(rules::passes()),
            context: Context::new(parts, config),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.context.diagnostics = Box::new(diagnostics);
        self
    }

    pub fn with_formula(mut self, formula: impl FormulaTranslator + 'static) -> Self {
        self.context.formula = Box::new(formula);
        self
    }

    /// Number of passes which have been executed.
    pub fn level(&self) -> usize {
        self.pipeline.level()
    }

    /// Run pass `pass` (one based) and all passes before it.
    pub fn run_pass(&mut self, pass: usize) -> Result<()> {
        self.pipeline.run_until(&mut self.context, pass)
    }

    /// Run the first `limit` passes.
    pub fn run_until(&mut self, limit: usize) -> Result<()> {
        self.run_pass(limit)
    }

    /// Run as many passes as the configured limit allows.
    pub fn run(&mut self) -> Result<()> {
        let limit = self.context.config.limit;
        tracing::debug!(limit, "simplifying document");
        self.run_until(limit)
    }

    pub fn run_all(&mut self) -> Result<()> {
        self.pipeline.run_all(&mut self.context)
    }

    pub fn document(&self) -> &Sequence {
        &self.context.parts.document
    }

    pub fn into_document(self) -> Sequence {
        self.context.parts.document
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

#[cfg(test)]
mod test {
    use docsplice::Token;

    use super::Simplifier;
    use crate::{
        CollectedDiagnostics,
        DocumentParts,
        SimplifyConfig,
        PASS_COUNT,
    };

    fn parts() -> DocumentParts {
        DocumentParts::from_document([
            Token::tagged("S<", "body"),
            Token::tagged("S<", "p"),
            Token::tagged("S<", "r"),
            Token::tagged("S<", "t"),
            Token::text("Hello"),
            Token::tagged("S>", "t"),
            Token::tagged("S>", "r"),
            Token::tagged("S>", "p"),
            Token::tagged("S>", "body"),
        ])
    }

    #[test]
    fn levels_only_increase() {
        let mut simplifier = Simplifier::new(parts(), SimplifyConfig::default());
        assert_eq!(simplifier.level(), 0);

        simplifier.run_pass(2).unwrap();
        assert_eq!(simplifier.level(), 2);

        simplifier.run_pass(1).unwrap();
        assert_eq!(simplifier.level(), 2);

        simplifier.run_all().unwrap();
        assert_eq!(simplifier.level(), PASS_COUNT);
    }

    #[test]
    fn configured_limit() {
        let config = SimplifyConfig {
            limit: 1,
            ..Default::default()
        };
        let mut simplifier = Simplifier::new(parts(), config);
        simplifier.run().unwrap();
        assert_eq!(simplifier.level(), 1);

        let mut simplifier = Simplifier::new(parts(), SimplifyConfig::default());
        simplifier.run_until(0).unwrap();
        assert_eq!(simplifier.level(), 0);
        assert_eq!(simplifier.document().len(), 9);
    }

    #[test]
    fn diagnostics_are_forwarded() {
        let diagnostics = CollectedDiagnostics::new();
        let mut simplifier = Simplifier::new(parts(), SimplifyConfig::default())
            .with_diagnostics(diagnostics.clone());

        simplifier.run_all().unwrap();
        assert!(diagnostics.is_empty());
        assert!(simplifier
            .into_document()
            .iter()
            .any(|token| token.value() == Some("Hello")));
    }
}
