use std::collections::{
    BTreeMap,
    HashSet,
};

use crate::{
    Diagnostic,
    Diagnostics,
    DocumentParts,
    FormulaTranslator,
    PlainFormula,
    SimplifyConfig,
    TracingDiagnostics,
};

/// State shared by all rewrite rules of one simplifier run.
pub struct Context {
    pub parts: DocumentParts,

    /// Bookmarks which are not cross reference targets. References to them are dropped.
    pub ignored_bookmarks: HashSet<String>,
    /// Label to readable name, derived from float captions.
    pub nice_reference_names: BTreeMap<String, String>,
    /// Labels handed out to captions without a bookmark.
    pub used_caption_names: HashSet<String>,
    next_label: usize,

    pub diagnostics: Box<dyn Diagnostics>,
    pub formula: Box<dyn FormulaTranslator>,
    pub config: SimplifyConfig,
}

impl Context {
    pub fn new(parts: DocumentParts, config: SimplifyConfig) -> Self {
        Self {
            parts,

            ignored_bookmarks: HashSet::new(),
            nice_reference_names: BTreeMap::new(),
            used_caption_names: HashSet::new(),
            next_label: 0,

            diagnostics: Box::new(TracingDiagnostics),
            formula: Box::new(PlainFormula),
            config,
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }

    /// A label which has neither been handed out to a caption nor by an earlier call.
    pub fn unique_label(&mut self) -> String {
        loop {
            self.next_label += 1;
            let label = format!("float{}", self.next_label);
            if !self.used_caption_names.contains(&label) {
                return label;
            }
        }
    }
}
