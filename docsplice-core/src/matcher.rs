use crate::{
    Element,
    Position,
    Sequence,
    TokenPattern,
};

/// The result of a successful [find_sequence] call.
///
/// `start` and `end` are the first and last tokens consumed by the match (inclusive).
/// `mark` is the token matched by the marked literal, if the pattern has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pub start: Position,
    pub mark: Option<Position>,
    pub end: Position,
}

impl Match {
    /// The marked position, falling back to the start of the match.
    pub fn marked(&self) -> Position {
        self.mark.unwrap_or(self.start)
    }
}

/// Search for the first match of `pattern` beginning at `start` or any later token.
///
/// Literal elements consume one token each. A skip element consumes tokens until one
/// matches the following literal. If a token matches the skip's abort literal first,
/// the attempt restarts by comparing that token against the first element.
/// After a mismatch the search resumes directly after the token where the failed
/// attempt started.
///
/// Returns `None` for an empty or invalid `start`, or when no match exists.
pub fn find_sequence(
    sequence: &Sequence,
    start: Option<Position>,
    pattern: &dyn TokenPattern,
) -> Option<Match> {
    let elements = pattern.elements();
    let mark_index = pattern.mark();
    if elements.is_empty() {
        return None;
    }

    let mut cursor = start.filter(|position| sequence.contains(*position));
    let mut index = 0;

    let mut match_start: Option<Position> = None;
    let mut match_mark: Option<Position> = None;

    while let Some(mut current) = cursor {
        if let Element::Skip { abort } = &elements[index] {
            index += 1;
            let next_literal = elements.get(index).and_then(Element::as_literal);

            let abort_matched = loop {
                let token = sequence.get(current)?;
                if abort.is_some_and(|abort| abort.matches(token)) {
                    break true;
                }

                if next_literal.is_some_and(|literal| literal.matches(token)) {
                    break false;
                }

                current = sequence.next(current)?;
            };

            if abort_matched {
                index = 0;
            }
        }

        let token = sequence.get(current)?;
        let matched = elements
            .get(index)
            .and_then(Element::as_literal)
            .is_some_and(|literal| literal.matches(token));

        if matched {
            if index == 0 {
                match_start = Some(current);
            }
            if Some(index) == mark_index {
                match_mark = Some(current);
            }

            index += 1;
            if index >= elements.len() {
                return Some(Match {
                    start: match_start.unwrap_or(current),
                    mark: match_mark,
                    end: current,
                });
            }
        } else {
            index = 0;
            current = match_start.take().unwrap_or(current);
            match_mark = None;
        }

        cursor = sequence.next(current);
    }

    None
}
