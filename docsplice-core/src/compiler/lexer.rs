use core::{
    ops::Range,
    str::CharIndices,
};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Lexeme<'a> {
    /// A literal element description without any spaces: "kind:value"
    Text(&'a str),

    /// A skip without an abort target: "!"
    Skip,
    /// A skip with an abort target: "!kind:value"
    SkipUntil(&'a str),

    /// Marks the next literal element: "|"
    Mark,
}

pub struct Lexer<'a> {
    input: &'a str,
    iter: CharIndices<'a>,

    token_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            iter: input.char_indices(),

            token_start: 0,
        }
    }

    pub fn token_range(&self) -> Range<usize> {
        self.token_start..self.iter.offset()
    }

    /// Skips a comment if one starts at the current token.
    /// Returns false if the current `/` does not start a comment.
    fn skip_comment(&mut self) -> bool {
        let next_char = self.iter.clone().next().map(|(_, v)| v);
        if matches!(next_char, Some('/')) {
            /* single line comment */
            for (_position, value) in self.iter.by_ref() {
                if value == '\n' {
                    break;
                }
            }

            true
        } else if matches!(next_char, Some('*')) {
            /* multi line comment, the opening star must not close it */
            self.iter.next();
            let mut previous_star = false;
            for (_position, value) in self.iter.by_ref() {
                if value == '/' && previous_star {
                    break;
                }

                previous_star = value == '*';
            }

            true
        } else {
            false
        }
    }

    pub fn next_lexeme(&mut self) -> Option<Lexeme<'a>> {
        loop {
            let Some((token_pos, value)) = self.iter.next() else {
                /* end reached */
                return None;
            };

            if value.is_whitespace() {
                continue;
            }

            self.token_start = token_pos;
            if value == '/' && self.skip_comment() {
                continue;
            }

            let token_end = loop {
                let mut iter_local = self.iter.clone();
                let Some((position, value)) = iter_local.next() else {
                    break self.input.len();
                };

                if value.is_whitespace() {
                    break position;
                }

                self.iter.next();
            };

            let text = &self.input[token_pos..token_end];
            return Some(match text {
                "|" => Lexeme::Mark,
                "!" => Lexeme::Skip,
                text => match text.strip_prefix('!') {
                    Some(target) => Lexeme::SkipUntil(target),
                    None => Lexeme::Text(text),
                },
            });
        }
    }
}
