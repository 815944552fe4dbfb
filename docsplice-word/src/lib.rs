//! Simplification of flattened word-processing documents.
//!
//! The [Simplifier] rewrites the raw element stream of a document in five passes
//! into structural tokens (`eop`, `float`, `label`, `ref`, ...) which the
//! [Renderer] finally writes into one or more text outputs.

mod config;
pub use config::{
    RenderConfig,
    SimplifyConfig,
    PASS_COUNT,
};

mod context;
pub use context::Context;

mod diagnostics;
pub use diagnostics::{
    CollectedDiagnostics,
    Diagnostic,
    Diagnostics,
    TracingDiagnostics,
};

mod error;
pub use error::{
    Error,
    Result,
};

mod formula;
pub use formula::{
    FormulaError,
    FormulaTranslator,
    PlainFormula,
};

mod xml;
pub use xml::{
    flatten,
    XmlElement,
};

mod source;
pub use source::{
    DocumentParts,
    ElementParts,
    PartKind,
    PartSource,
    SourceError,
    TokenDump,
};

mod render;
pub use render::{
    Conversion,
    ConversionTable,
    Rendered,
    Renderer,
    Substitutions,
};

mod rules;

mod simplifier;
pub use simplifier::Simplifier;
