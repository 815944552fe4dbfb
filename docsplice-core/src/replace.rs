use crate::{
    find_sequence,
    Position,
    Sequence,
    SequenceError,
    Token,
    TokenPattern,
};

/// Replace up to `limit` matches of `pattern` at or after `start` with copies of `replacement`.
///
/// Each match (including everything a skip consumed) is removed and the replacement
/// tokens are inserted where it used to be. The search resumes at the token which
/// followed the removed match, so inserted tokens are never matched again.
/// Returns the number of replacements performed.
pub fn replace_sequence(
    sequence: &mut Sequence,
    start: Option<Position>,
    pattern: &dyn TokenPattern,
    replacement: &[Token],
    limit: Option<usize>,
) -> Result<usize, SequenceError> {
    let limit = limit.unwrap_or(usize::MAX);

    let mut cursor = start;
    let mut replacements = 0;
    while replacements < limit {
        let Some(found) = find_sequence(sequence, cursor, pattern) else {
            break;
        };

        let predecessor = sequence.prev(found.start);
        let successor = sequence.next(found.end);
        sequence.remove_range(found.start, found.end)?;

        let mut insert_at = predecessor;
        for token in replacement {
            insert_at = Some(sequence.insert_after_or_head(insert_at, token.clone())?);
        }

        replacements += 1;
        cursor = successor;
        if cursor.is_none() {
            break;
        }
    }

    tracing::trace!(?pattern, replacements, "replaced sequences");
    Ok(replacements)
}
