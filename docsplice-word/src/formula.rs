use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("malformed formula markup: {0}")]
    Malformed(String),

    #[error("formula does not contain any text")]
    Empty,
}

/// Converts the raw markup of a captured formula into the target notation.
pub trait FormulaTranslator {
    fn translate(&self, markup: &str) -> Result<String, FormulaError>;
}

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]*>").expect("valid tag expression"));

/// Extracts the text runs of the formula markup and concatenates them.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormula;

impl FormulaTranslator for PlainFormula {
    fn translate(&self, markup: &str) -> Result<String, FormulaError> {
        let text = MARKUP_TAG.replace_all(markup, "");
        if let Some(position) = text.find(['<', '>']) {
            return Err(FormulaError::Malformed(format!(
                "unbalanced tag delimiter at {}",
                position
            )));
        }

        let text = text
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&");

        if text.trim().is_empty() {
            return Err(FormulaError::Empty);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod test {
    use super::{
        FormulaError,
        FormulaTranslator,
        PlainFormula,
    };

    #[test]
    fn extracts_text_runs() {
        let markup = "<oMath><r><t>x</t></r><r><t>&lt;y</t></r></oMath>";
        assert_eq!(PlainFormula.translate(markup).unwrap(), "x<y");
    }

    #[test]
    fn rejects_broken_markup() {
        assert!(matches!(
            PlainFormula.translate("<oMath><r>x</r"),
            Err(FormulaError::Malformed(_))
        ));
        assert_eq!(
            PlainFormula.translate("<oMath/>"),
            Err(FormulaError::Empty)
        );
    }
}
