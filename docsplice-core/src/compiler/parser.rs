use core::ops::Range;

use thiserror::Error;

use super::{
    Lexeme,
    Lexer,
    PositionedError,
};
use crate::{
    Element,
    Literal,
    OwnedPattern,
    Token,
};

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum ParseError {
    #[error("unexpected token")]
    UnexpectedToken,

    #[error("the pattern does not contain any element")]
    EmptyPattern,

    #[error("a pattern must not start with a skip")]
    LeadingSkip,

    #[error("a pattern must not end with a skip")]
    TrailingSkip,

    #[error("a skip must be followed by a literal element")]
    ConsecutiveSkips,

    #[error("the mark is not followed by a literal element")]
    DanglingMark,

    #[error("a pattern can only contain one mark")]
    DuplicateMark,

    #[error("a replacement must not contain wildcards")]
    WildcardInReplacement,
}

pub struct PatternParser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,

    elements: Vec<Element<'a>>,
    mark: Option<usize>,

    /// Position of a mark which is still waiting for its literal element.
    pending_mark: Option<Range<usize>>,
    /// Position of the last element if it has been a skip.
    trailing_skip: Option<Range<usize>>,
}

impl<'a> PatternParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            lexer: Lexer::new(input),

            elements: Vec::with_capacity(16),
            mark: None,

            pending_mark: None,
            trailing_skip: None,
        }
    }

    pub fn parse(mut self) -> Result<OwnedPattern<'a>, PositionedError<ParseError>> {
        while let Some(lexeme) = self.lexer.next_lexeme() {
            match lexeme {
                Lexeme::Text(text) => self.parse_literal(text),
                Lexeme::Skip => self.parse_skip(None)?,
                Lexeme::SkipUntil(target) => self.parse_skip(Some(Literal::parse(target)))?,
                Lexeme::Mark => self.parse_mark()?,
            }
        }

        if let Some(position) = self.pending_mark {
            return Err(PositionedError::new(position, ParseError::DanglingMark));
        }

        if self.elements.is_empty() {
            return Err(PositionedError::new(
                0..self.input.len(),
                ParseError::EmptyPattern,
            ));
        }

        if let Some(position) = self.trailing_skip {
            return Err(PositionedError::new(position, ParseError::TrailingSkip));
        }

        Ok(OwnedPattern::new(self.elements, self.mark))
    }

    fn parse_literal(&mut self, text: &'a str) {
        if self.pending_mark.take().is_some() {
            self.mark = Some(self.elements.len());
        }

        self.trailing_skip = None;
        self.elements.push(Element::Literal(Literal::parse(text)));
    }

    fn parse_skip(&mut self, abort: Option<Literal<'a>>) -> Result<(), PositionedError<ParseError>> {
        if self.elements.is_empty() {
            return Err(PositionedError::new(
                self.lexer.token_range(),
                ParseError::LeadingSkip,
            ));
        }

        if self.trailing_skip.is_some() {
            return Err(PositionedError::new(
                self.lexer.token_range(),
                ParseError::ConsecutiveSkips,
            ));
        }

        self.trailing_skip = Some(self.lexer.token_range());
        self.elements.push(Element::Skip { abort });
        Ok(())
    }

    fn parse_mark(&mut self) -> Result<(), PositionedError<ParseError>> {
        if self.mark.is_some() || self.pending_mark.is_some() {
            return Err(PositionedError::new(
                self.lexer.token_range(),
                ParseError::DuplicateMark,
            ));
        }

        self.pending_mark = Some(self.lexer.token_range());
        Ok(())
    }
}

/// Compile a pattern source into a matchable pattern.
///
/// The grammar is a whitespace separated list of elements:
/// - `kind:value`, `kind:`, `:value`, `*` or bare text: a literal consuming one token
/// - `!`: skip tokens until the next literal matches
/// - `!kind:value`: skip, but restart the match when a token matches the abort literal
/// - `|`: report the position matched by the following literal as the mark
pub fn compile_pattern(pattern: &str) -> Result<OwnedPattern<'_>, PositionedError<ParseError>> {
    PatternParser::new(pattern).parse()
}

/// Compile a replacement source into the tokens it describes.
/// Only literals without wildcards are allowed. An empty source yields no tokens.
pub fn compile_replacement(replacement: &str) -> Result<Vec<Token>, PositionedError<ParseError>> {
    let mut lexer = Lexer::new(replacement);
    let mut result = Vec::new();

    while let Some(lexeme) = lexer.next_lexeme() {
        let Lexeme::Text(text) = lexeme else {
            return Err(PositionedError::new(
                lexer.token_range(),
                ParseError::UnexpectedToken,
            ));
        };

        let Some(token) = Literal::parse(text).to_token() else {
            return Err(PositionedError::new(
                lexer.token_range(),
                ParseError::WildcardInReplacement,
            ));
        };

        result.push(token);
    }

    Ok(result)
}

#[cfg(test)]
mod test {
    use super::{
        compile_pattern,
        compile_replacement,
        ParseError,
    };
    use crate::{
        compiler::PositionedError,
        Element,
        Field,
        Literal,
        Token,
        TokenPattern,
    };

    fn literal(text: &str) -> Element<'_> {
        Element::Literal(Literal::parse(text))
    }

    #[test]
    fn test_literals() {
        let result = compile_pattern("S<:p S>:p").unwrap();
        assert_eq!(result.elements(), &[literal("S<:p"), literal("S>:p")]);
        assert_eq!(result.mark(), None);

        let result = compile_pattern(":* eop:").unwrap();
        assert_eq!(
            result.elements(),
            &[
                Element::Literal(Literal::new(Field::Empty, Field::Any)),
                Element::Literal(Literal::new(Field::Exact("eop"), Field::Empty)),
            ]
        );
    }

    #[test]
    fn test_skip() {
        let result = compile_pattern("S<:r !S>:r S<:vanish ! S>:r").unwrap();
        assert_eq!(
            result.elements(),
            &[
                literal("S<:r"),
                Element::Skip {
                    abort: Some(Literal::parse("S>:r"))
                },
                literal("S<:vanish"),
                Element::Skip { abort: None },
                literal("S>:r"),
            ]
        );
        assert_eq!(result.min_len(), 3);
    }

    #[test]
    fn test_mark() {
        let result = compile_pattern("S<:fldChar Sa:fldCharType | S=:* S>:fldChar").unwrap();
        assert_eq!(result.mark(), Some(2));

        /* the mark attaches to the next literal, even across a skip */
        let result = compile_pattern("float:* | ! label:*");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().mark(), Some(2));

        assert_eq!(
            compile_pattern("a | b | c").unwrap_err(),
            PositionedError::new(6..7, ParseError::DuplicateMark)
        );
        assert_eq!(
            compile_pattern("a b |").unwrap_err(),
            PositionedError::new(4..5, ParseError::DanglingMark)
        );
    }

    #[test]
    fn test_invalid_skips() {
        assert_eq!(
            compile_pattern("! S>:p").unwrap_err(),
            PositionedError::new(0..1, ParseError::LeadingSkip)
        );
        assert_eq!(
            compile_pattern("S<:p !S>:p").unwrap_err(),
            PositionedError::new(5..10, ParseError::TrailingSkip)
        );
        assert_eq!(
            compile_pattern("S<:p ! !x S>:p").unwrap_err(),
            PositionedError::new(7..9, ParseError::ConsecutiveSkips)
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(
            compile_pattern("  ").unwrap_err(),
            PositionedError::new(0..2, ParseError::EmptyPattern)
        );
        assert_eq!(
            compile_pattern("/* nothing */").unwrap_err().inner(),
            &ParseError::EmptyPattern
        );
    }

    #[test]
    fn test_replacement() {
        assert_eq!(compile_replacement("").unwrap(), Vec::<Token>::new());
        assert_eq!(
            compile_replacement("footnote_ref:12 eop: text").unwrap(),
            vec![
                Token::tagged("footnote_ref", "12"),
                Token::marker("eop"),
                Token::text("text"),
            ]
        );

        assert_eq!(
            compile_replacement("eop: :*").unwrap_err(),
            PositionedError::new(5..7, ParseError::WildcardInReplacement)
        );
        assert_eq!(
            compile_replacement("eop: !x").unwrap_err(),
            PositionedError::new(5..7, ParseError::UnexpectedToken)
        );
        assert_eq!(
            compile_replacement("| eop:").unwrap_err(),
            PositionedError::new(0..1, ParseError::UnexpectedToken)
        );
    }
}
