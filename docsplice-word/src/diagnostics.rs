use std::{
    cell::RefCell,
    rc::Rc,
};

use thiserror::Error;

/// A structural anomaly which has been handled with a local fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("unresolved url reference {id}")]
    UnresolvedUrl { id: String },

    #[error("caption {name} occurs multiple times")]
    CaptionCollision { name: String },

    #[error("list of type {list_type} is not terminated by a paragraph end")]
    BrokenList { list_type: String },

    #[error("formula translation failed: {reason}")]
    FormulaFailed { reason: String },

    #[error("unhandled token kind {kind}")]
    UnhandledKind { kind: String },

    #[error("unexpected token: {message}")]
    ErrorToken { message: String },

    #[error("unexpected float within float: {caption}")]
    FloatWithinFloat { caption: String },

    #[error("unterminated float: {float}")]
    UnterminatedFloat { float: String },

    #[error("float terminated early: {caption}")]
    FloatTerminatedEarly { caption: String },

    #[error("unexpected float terminator")]
    UnexpectedFloatTerminator,
}

/// Receives the [Diagnostic]s of a simplifier or renderer run.
pub trait Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Logs every diagnostic as a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic, "document anomaly");
    }
}

/// Stores every diagnostic.
///
/// Clones share the same storage, so a handle can be kept while another one
/// is handed to the simplifier.
#[derive(Debug, Default, Clone)]
pub struct CollectedDiagnostics {
    entries: Rc<RefCell<Vec<Diagnostic>>>,
}

impl CollectedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Diagnostics for CollectedDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(%diagnostic, "collected document anomaly");
        self.entries.borrow_mut().push(diagnostic);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}
