use std::{
    collections::HashMap,
    fmt,
};

use docsplice::{
    Sequence,
    Token,
};
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::{
    xml::flatten,
    XmlElement,
};

/// The parts of a word-processing document that take part in the simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Document,
    DocumentRels,
    Footnotes,
    FootnoteRels,
    Numbering,
}

impl PartKind {
    pub fn name(&self) -> &'static str {
        match self {
            PartKind::Document => "document",
            PartKind::DocumentRels => "document_rels",
            PartKind::Footnotes => "footnotes",
            PartKind::FootnoteRels => "footnote_rels",
            PartKind::Numbering => "numbering",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("the document part {0} is missing")]
    MissingPart(PartKind),

    #[error("malformed token dump: {0}")]
    MalformedDump(#[from] serde_json::Error),
}

/// Supplies the token streams of the individual document parts.
pub trait PartSource {
    /// Returns `Ok(None)` if the document does not contain the part.
    fn part(&self, kind: PartKind) -> Result<Option<Vec<Token>>, SourceError>;
}

/// The main document stream and its read-only lookup companions.
#[derive(Debug, Default, Clone)]
pub struct DocumentParts {
    pub document: Sequence,
    pub document_rels: Sequence,
    pub footnotes: Sequence,
    pub footnote_rels: Sequence,
    pub numbering: Sequence,
}

impl DocumentParts {
    /// Load all parts. Only the main document is required,
    /// every other missing part becomes an empty sequence.
    pub fn load(source: &dyn PartSource) -> Result<Self, SourceError> {
        let document = source
            .part(PartKind::Document)?
            .ok_or(SourceError::MissingPart(PartKind::Document))?;

        let load_optional = |kind: PartKind| -> Result<Sequence, SourceError> {
            match source.part(kind)? {
                Some(tokens) => Ok(tokens.into_iter().collect()),
                None => {
                    tracing::debug!(part = %kind, "document part not present");
                    Ok(Sequence::new())
                }
            }
        };

        Ok(Self {
            document: document.into_iter().collect(),
            document_rels: load_optional(PartKind::DocumentRels)?,
            footnotes: load_optional(PartKind::Footnotes)?,
            footnote_rels: load_optional(PartKind::FootnoteRels)?,
            numbering: load_optional(PartKind::Numbering)?,
        })
    }

    /// Build the parts directly from the main document tokens.
    pub fn from_document(document: impl IntoIterator<Item = Token>) -> Self {
        Self {
            document: document.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// A [PartSource] over a JSON dump of token streams:
/// `{ "document": [["S<", "p"], [null, "text"], ...], "numbering": [...] }`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDump {
    parts: HashMap<PartKind, Vec<(Option<String>, Option<String>)>>,
}

impl TokenDump {
    pub fn from_json(source: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json(&self) -> Result<String, SourceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn insert(&mut self, kind: PartKind, tokens: &[Token]) {
        let tokens = tokens
            .iter()
            .map(|token| {
                (
                    token.kind().map(String::from),
                    token.value().map(String::from),
                )
            })
            .collect();
        self.parts.insert(kind, tokens);
    }
}

impl PartSource for TokenDump {
    fn part(&self, kind: PartKind) -> Result<Option<Vec<Token>>, SourceError> {
        Ok(self.parts.get(&kind).map(|tokens| {
            tokens
                .iter()
                .map(|(kind, value)| Token::new(kind.clone(), value.clone()))
                .collect()
        }))
    }
}

/// A [PartSource] over element trees, flattened on access.
#[derive(Debug, Default, Clone)]
pub struct ElementParts {
    parts: HashMap<PartKind, XmlElement>,
}

impl ElementParts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_part(mut self, kind: PartKind, root: XmlElement) -> Self {
        self.parts.insert(kind, root);
        self
    }
}

impl PartSource for ElementParts {
    fn part(&self, kind: PartKind) -> Result<Option<Vec<Token>>, SourceError> {
        Ok(self.parts.get(&kind).map(flatten))
    }
}

#[cfg(test)]
mod test {
    use docsplice::Token;

    use super::{
        DocumentParts,
        ElementParts,
        PartKind,
        SourceError,
        TokenDump,
    };
    use crate::XmlElement;

    #[test]
    fn missing_document_is_fatal() {
        let dump = TokenDump::from_json(r#"{ "numbering": [] }"#).unwrap();
        let result = DocumentParts::load(&dump);
        assert!(matches!(
            result,
            Err(SourceError::MissingPart(PartKind::Document))
        ));
    }

    #[test]
    fn optional_parts_default_to_empty() {
        let dump = TokenDump::from_json(r#"{ "document": [["S<", "p"], [null, "x"], ["S>", "p"]] }"#).unwrap();
        let parts = DocumentParts::load(&dump).unwrap();

        assert_eq!(parts.document.len(), 3);
        assert_eq!(parts.document.to_vec()[1], Token::text("x"));
        assert!(parts.footnotes.is_empty());
        assert!(parts.numbering.is_empty());
    }

    #[test]
    fn dump_survives_serialization() {
        let mut dump = TokenDump::default();
        dump.insert(PartKind::Footnotes, &[Token::tagged("S<", "footnote")]);
        dump.insert(PartKind::Document, &[Token::marker("eop")]);

        let dump = TokenDump::from_json(&dump.to_json().unwrap()).unwrap();
        let parts = DocumentParts::load(&dump).unwrap();
        assert_eq!(parts.document.to_vec(), vec![Token::marker("eop")]);
        assert_eq!(parts.footnotes.to_vec(), vec![Token::tagged("S<", "footnote")]);
    }

    #[test]
    fn malformed_dump() {
        assert!(matches!(
            TokenDump::from_json(r#"{ "document": 12 }"#),
            Err(SourceError::MalformedDump(_))
        ));
    }

    #[test]
    fn element_parts_are_flattened() {
        let source = ElementParts::new().with_part(PartKind::Document, XmlElement::new("body"));
        let parts = DocumentParts::load(&source).unwrap();
        assert_eq!(
            parts.document.to_vec(),
            vec![Token::tagged("S<", "body"), Token::tagged("S>", "body")]
        );
    }
}
