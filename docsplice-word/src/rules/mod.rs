use docsplice::{
    compiler::compile_replacement,
    replace_sequence,
    Position,
    Rule,
    Sequence,
    Stage,
    TokenPattern,
};

use crate::{
    Context,
    Error,
    Result,
};

mod pass1;
mod pass2;
mod pass3;
mod pass4;
mod pass5;

/// The five simplification passes in execution order.
pub(crate) fn passes() -> Vec<Stage<Context, Error>> {
    vec![
        Stage::new("pass1", pass1::rules()),
        Stage::new("pass2", pass2::rules()),
        Stage::new("pass3", pass3::rules()),
        Stage::new("pass4", pass4::rules()),
        Stage::new("pass5", pass5::rules()),
    ]
}

macro_rules! rules {
    ($($rule:ident),* $(,)?) => {
        vec![$(docsplice::Rule::new(stringify!($rule), $rule)),*]
    };
}
pub(crate) use rules;

pub(crate) type Rules = Vec<Rule<Context, Error>>;

/// Replace every match in `sequence` with the tokens described by `replacement`.
pub(crate) fn replace_all(
    sequence: &mut Sequence,
    pattern: &dyn TokenPattern,
    replacement: &str,
) -> Result<usize> {
    replace_limited(sequence, pattern, replacement, None)
}

pub(crate) fn replace_limited(
    sequence: &mut Sequence,
    pattern: &dyn TokenPattern,
    replacement: &str,
    limit: Option<usize>,
) -> Result<usize> {
    let replacement = compile_replacement(replacement)?;
    let start = sequence.first();
    Ok(replace_sequence(
        sequence,
        start,
        pattern,
        &replacement,
        limit,
    )?)
}

/// The value of the token at `position`, empty if it has none.
pub(crate) fn value_of(sequence: &Sequence, position: Position) -> Result<String> {
    Ok(sequence.token(position)?.value_or_empty().to_string())
}

pub(crate) fn retag(
    sequence: &mut Sequence,
    position: Position,
    kind: &str,
    value: Option<String>,
) -> Result<()> {
    sequence.token_mut(position)?.retag(kind, value);
    Ok(())
}

pub(crate) fn set_kind(sequence: &mut Sequence, position: Position, kind: &str) -> Result<()> {
    sequence.token_mut(position)?.set_kind(kind);
    Ok(())
}

/// Remove the tokens after `start` up to and including `end`.
pub(crate) fn remove_after(sequence: &mut Sequence, start: Position, end: Position) -> Result<()> {
    if start == end {
        return Ok(());
    }

    if let Some(next) = sequence.next(start) {
        sequence.remove_range(next, end)?;
    }
    Ok(())
}

/// Remove the tokens strictly between `start` and `end`.
pub(crate) fn remove_between(sequence: &mut Sequence, start: Position, end: Position) -> Result<()> {
    let (Some(first), Some(last)) = (sequence.next(start), sequence.prev(end)) else {
        return Ok(());
    };

    if start == end || first == end {
        return Ok(());
    }

    sequence.remove_range(first, last)?;
    Ok(())
}

pub(crate) fn remove_next(sequence: &mut Sequence, position: Position) -> Result<()> {
    if let Some(next) = sequence.next(position) {
        sequence.remove(next)?;
    }
    Ok(())
}

pub(crate) fn remove_prev(sequence: &mut Sequence, position: Position) -> Result<()> {
    if let Some(prev) = sequence.prev(position) {
        sequence.remove(prev)?;
    }
    Ok(())
}

pub(crate) fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
pub(crate) mod test_util {
    use docsplice::{
        Sequence,
        Token,
    };

    use crate::{
        Context,
        DocumentParts,
        SimplifyConfig,
    };

    /// Parse `kind:value` words into tokens. `~` inside a value stands for a space.
    /// A leading `:` keeps a word containing `:` untagged.
    pub fn tokens(source: &str) -> Vec<Token> {
        source
            .split_whitespace()
            .map(|text| {
                let (kind, value) = match text.split_once(':') {
                    Some((kind, value)) => (Some(kind.to_string()), value),
                    None => (None, text),
                };
                Token::new(kind, Some(value.replace('~', " ")))
            })
            .collect()
    }

    pub fn sequence(source: &str) -> Sequence {
        tokens(source).into_iter().collect()
    }

    pub fn context(document: &str) -> Context {
        Context::new(
            DocumentParts::from_document(tokens(document)),
            SimplifyConfig::default(),
        )
    }

    pub fn render(sequence: &Sequence) -> String {
        sequence
            .iter()
            .map(|token| token.to_string().replace(' ', "~"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
