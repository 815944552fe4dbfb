use crate::{
    find_sequence,
    Match,
    Position,
    Sequence,
    TokenPattern,
};

#[derive(Debug, Clone, Copy)]
enum Resume {
    /// Start at the head of the sequence.
    Head,
    /// Start at the given token.
    At(Position),
    /// The last match started at the head, resume after the token now at the head.
    AfterHead,
    /// Resume two tokens after the token which preceded the last match.
    After(Position),
    Done,
}

/// Lazily yields the matches of a pattern while the caller mutates the sequence in between.
///
/// The sequence is passed to every [Finder::next_match] call instead of being borrowed by
/// the finder, so the caller is free to edit it after each match. The resume point is
/// derived from the token preceding the last match since that token survives most edits:
/// - if the match started at the head, the search resumes at the second token
/// - otherwise it resumes two tokens after the predecessor
/// - if the predecessor has been removed or has no successor, the iteration ends
pub struct Finder<'p> {
    pattern: &'p dyn TokenPattern,
    resume: Resume,
}

impl<'p> Finder<'p> {
    pub fn new(pattern: &'p dyn TokenPattern) -> Self {
        Self {
            pattern,
            resume: Resume::Head,
        }
    }

    /// Start the search at `start` instead of the head of the sequence.
    pub fn starting_at(pattern: &'p dyn TokenPattern, start: Position) -> Self {
        Self {
            pattern,
            resume: Resume::At(start),
        }
    }

    fn resume_position(&self, sequence: &Sequence) -> Option<Position> {
        match self.resume {
            Resume::Head => sequence.first(),
            Resume::At(position) => Some(position),
            Resume::AfterHead => sequence.first().and_then(|first| sequence.next(first)),
            Resume::After(predecessor) => {
                if !sequence.contains(predecessor) {
                    return None;
                }

                sequence
                    .next(predecessor)
                    .and_then(|next| sequence.next(next))
            }
            Resume::Done => None,
        }
    }

    pub fn next_match(&mut self, sequence: &Sequence) -> Option<Match> {
        let Some(start) = self.resume_position(sequence) else {
            self.resume = Resume::Done;
            return None;
        };

        let Some(result) = find_sequence(sequence, Some(start), self.pattern) else {
            self.resume = Resume::Done;
            return None;
        };

        self.resume = match sequence.prev(result.start) {
            Some(predecessor) => Resume::After(predecessor),
            None => Resume::AfterHead,
        };
        Some(result)
    }
}
