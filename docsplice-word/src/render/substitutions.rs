use crate::{
    Error,
    Result,
};

/// Ordered literal text replacements.
///
/// Each entry is applied to the result of the previous one, so later entries see
/// the output of earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    entries: Vec<(String, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one `pattern<TAB>replacement` entry per line.
    /// A pattern written as `0x2013` stands for the character with that code point.
    pub fn parse(source: &str) -> Result<Self> {
        let mut result = Self::new();
        for (index, line) in source.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            let Some((pattern, replacement)) = line.split_once('\t') else {
                return Err(Error::Substitution {
                    line: index + 1,
                    reason: "missing tab separator".to_string(),
                });
            };

            let pattern = match pattern.strip_prefix("0x") {
                Some(code) => {
                    let character = u32::from_str_radix(code, 16)
                        .ok()
                        .and_then(char::from_u32)
                        .ok_or_else(|| Error::Substitution {
                            line: index + 1,
                            reason: format!("invalid code point {}", pattern),
                        })?;
                    character.to_string()
                }
                None => pattern.to_string(),
            };

            if pattern.is_empty() {
                return Err(Error::Substitution {
                    line: index + 1,
                    reason: "empty pattern".to_string(),
                });
            }

            /* only the first two columns are significant */
            let replacement = replacement.split('\t').next().unwrap_or_default();
            result.push(pattern, replacement);
        }

        Ok(result)
    }

    pub fn push(&mut self, pattern: impl Into<String>, replacement: impl Into<String>) {
        self.entries.push((pattern.into(), replacement.into()));
    }

    pub fn extend(&mut self, other: Substitutions) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn apply(&self, text: &str) -> String {
        let mut text = text.to_string();
        for (pattern, replacement) in &self.entries {
            if text.contains(pattern.as_str()) {
                text = text.replace(pattern.as_str(), replacement);
            }
        }
        text
    }
}

#[cfg(test)]
mod test {
    use super::Substitutions;
    use crate::Error;

    #[test]
    fn parse_code_points() {
        let substitutions = Substitutions::parse("0x2013\t--\n%\t\\%\r\n\n&\t\\&\tcomment").unwrap();
        assert_eq!(substitutions.len(), 3);
        assert_eq!(substitutions.apply("1\u{2013}2 & 50%"), "1--2 \\& 50\\%");
    }

    #[test]
    fn substitutions_compound() {
        let mut substitutions = Substitutions::new();
        substitutions.push("a", "b");
        substitutions.push("b", "c");
        assert_eq!(substitutions.apply("ab"), "cc");

        let mut reversed = Substitutions::new();
        reversed.push("b", "c");
        reversed.push("a", "b");
        assert_eq!(reversed.apply("ab"), "bc");
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            Substitutions::parse("a\tb\nmissing"),
            Err(Error::Substitution { line: 2, .. })
        ));
        assert!(matches!(
            Substitutions::parse("0xZZ\tb"),
            Err(Error::Substitution { line: 1, .. })
        ));
        assert!(matches!(
            Substitutions::parse("0xD800\tb"),
            Err(Error::Substitution { line: 1, .. })
        ));
    }
}
