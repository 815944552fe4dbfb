use core::fmt;

use serde::{
    Deserialize,
    Serialize,
};

/// The literal marker which matches anything in the field it occupies.
pub const WILDCARD: &str = "*";

/// The smallest unit of a token stream: an optional kind tag and an optional value.
///
/// Untagged tokens (no kind) carry plain text. Both fields being absent is legal but
/// does not occur in streams produced from real documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawToken")]
pub struct Token {
    kind: Option<String>,
    value: Option<String>,
}

/// Serialized form of a [Token], normalised through [Token::new] on load.
#[derive(Deserialize)]
struct RawToken {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

impl From<RawToken> for Token {
    fn from(raw: RawToken) -> Self {
        Self::new(raw.kind, raw.value)
    }
}

fn normalize(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

impl Token {
    /// Create a new token. Empty strings are treated as absent.
    pub fn new(kind: Option<String>, value: Option<String>) -> Self {
        Self {
            kind: normalize(kind),
            value: normalize(value),
        }
    }

    /// An untagged text token.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(None, Some(value.into()))
    }

    /// A tagged token carrying a value.
    pub fn tagged(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Some(kind.into()), Some(value.into()))
    }

    /// A tagged token without a value.
    pub fn marker(kind: impl Into<String>) -> Self {
        Self::new(Some(kind.into()), None)
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The value or an empty string.
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }

    pub fn is_text(&self) -> bool {
        self.kind.is_none()
    }

    pub fn set_kind(&mut self, kind: impl Into<String>) {
        self.kind = normalize(Some(kind.into()));
    }

    pub fn clear_kind(&mut self) {
        self.kind = None;
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = normalize(Some(value.into()));
    }

    pub fn clear_value(&mut self) {
        self.value = None;
    }

    /// Replace both fields at once.
    pub fn retag(&mut self, kind: impl Into<String>, value: Option<String>) {
        self.kind = normalize(Some(kind.into()));
        self.value = normalize(value);
    }

    /// Append text to the value, treating an absent value as empty.
    pub fn append_value(&mut self, suffix: &str) {
        match &mut self.value {
            Some(value) => value.push_str(suffix),
            None => self.value = normalize(Some(suffix.to_string())),
        }
    }

    /// Field-wise comparison where a [WILDCARD] on either side matches anything.
    pub fn wildcard_eq(&self, other: &Token) -> bool {
        fn field_eq(lhs: Option<&str>, rhs: Option<&str>) -> bool {
            lhs == Some(WILDCARD) || rhs == Some(WILDCARD) || lhs == rhs
        }

        field_eq(self.kind(), other.kind()) && field_eq(self.value(), other.value())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{}:{}", kind, self.value_or_empty()),
            None => write!(f, "{}", self.value_or_empty()),
        }
    }
}
