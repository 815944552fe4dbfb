use crate::{
    Token,
    WILDCARD,
};

/// How a single token field is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field<'a> {
    /// The field must be absent.
    Empty,
    /// Anything matches, including an absent field.
    Any,
    /// The field must be exactly this text.
    Exact(&'a str),
}

impl<'a> Field<'a> {
    /// Parse the textual form of a field: empty, `*` or literal text.
    pub fn parse(text: &'a str) -> Self {
        match text {
            "" => Field::Empty,
            WILDCARD => Field::Any,
            text => Field::Exact(text),
        }
    }

    /// Wildcard comparison against a token field.
    /// A token field carrying the wildcard marker matches as well.
    pub fn matches(&self, actual: Option<&str>) -> bool {
        if actual == Some(WILDCARD) {
            return true;
        }

        match self {
            Field::Empty => actual.is_none(),
            Field::Any => true,
            Field::Exact(expected) => actual == Some(*expected),
        }
    }

    /// The concrete value of this field, `None` for a wildcard.
    fn concrete(&self) -> Option<Option<&'a str>> {
        match self {
            Field::Empty => Some(None),
            Field::Any => None,
            Field::Exact(value) => Some(Some(value)),
        }
    }
}

/// A `(kind, value)` description which consumes exactly one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal<'a> {
    pub kind: Field<'a>,
    pub value: Field<'a>,
}

impl<'a> Literal<'a> {
    pub const fn new(kind: Field<'a>, value: Field<'a>) -> Self {
        Self { kind, value }
    }

    /// Parse `kind:value`, `kind:`, `:value`, a bare `*` or bare text.
    /// The split happens at the first `:`. Bare text describes an untagged token.
    pub fn parse(text: &'a str) -> Self {
        match text.split_once(':') {
            Some((kind, value)) => Self::new(Field::parse(kind), Field::parse(value)),
            None if text == WILDCARD => Self::new(Field::Any, Field::Any),
            None => Self::new(Field::Empty, Field::parse(text)),
        }
    }

    pub fn matches(&self, token: &Token) -> bool {
        self.kind.matches(token.kind()) && self.value.matches(token.value())
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.kind, Field::Any) || matches!(self.value, Field::Any)
    }

    /// Convert into a concrete token. Returns `None` if any field is a wildcard.
    pub fn to_token(&self) -> Option<Token> {
        let kind = self.kind.concrete()?;
        let value = self.value.concrete()?;
        Some(Token::new(kind.map(String::from), value.map(String::from)))
    }
}

/// A single step of a compiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element<'a> {
    /// Consume one token which matches the literal.
    Literal(Literal<'a>),

    /// Consume tokens until one matches the following literal element.
    /// If a token matches `abort` first, the match attempt starts over at that token.
    Skip { abort: Option<Literal<'a>> },
}

impl<'a> Element<'a> {
    pub fn as_literal(&self) -> Option<&Literal<'a>> {
        match self {
            Element::Literal(literal) => Some(literal),
            Element::Skip { .. } => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Element::Skip { .. })
    }
}
