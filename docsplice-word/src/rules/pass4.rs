use std::collections::BTreeMap;

use docsplice::{
    compiler::compile_pattern,
    find_sequence,
    pattern,
    replace_sequence,
    BorrowedPattern,
    Finder,
    Position,
    Sequence,
    Token,
};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    remove_after,
    replace_all,
    retag,
    rules,
    set_kind,
    value_of,
    Rules,
};
use crate::{
    Context,
    Diagnostic,
    Result,
};

pub(super) fn rules() -> Rules {
    rules![
        convert_tables,
        convert_named_captions,
        convert_anonymous_captions,
        convert_floats,
        convert_other_bookmarks,
    ]
}

static TABLE_COLUMN_DEFINITION: BorrowedPattern<'static> = pattern!("table:* table_def_col:*");

/// Tables become `table:{columns} ... end_table_col: ... end_table_row: ... end_table:`.
fn convert_tables(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    replace_all(document, &pattern!("S<:tbl"), "table:")?;
    replace_all(document, &pattern!("S<:tblGrid"), "")?;
    replace_all(document, &pattern!("S>:tblGrid"), "")?;
    replace_all(document, &pattern!("S<:tr para_style:*"), "")?;
    replace_all(document, &pattern!("S<:tr"), "")?;
    replace_all(document, &pattern!("S<:tc para_style:*"), "")?;
    replace_all(document, &pattern!("S<:tc"), "")?;
    replace_all(document, &pattern!("eop: S>:tc"), "end_table_col:")?;
    replace_all(document, &pattern!("end_table_col:* S>:tr"), "end_table_row:")?;
    replace_all(document, &pattern!("S>:tbl"), "end_table:")?;

    /* columns are folded into the table token one at a time */
    let mut cursor = document.first();
    while let Some(found) = find_sequence(document, cursor, &TABLE_COLUMN_DEFINITION) {
        let token = document.token_mut(found.start)?;
        let columns = format!("{}L|", token.value().unwrap_or("|").to_lowercase());
        token.set_value(columns);

        document.remove(found.end)?;
        cursor = Some(found.start);
    }

    Ok(())
}

const CAPTION_PUNCTUATION: [char; 7] = [' ', '-', '.', ':', '\u{2012}', '\u{2013}', '\u{2014}'];

/// Strip the separator between the caption number and its text.
fn trim_caption_start(document: &mut Sequence, float: Position) -> Result<()> {
    let Some(text) = document.next(float) else {
        return Ok(());
    };

    let token = document.token_mut(text)?;
    if token.is_text() {
        let trimmed = token.value_or_empty().trim_start_matches(CAPTION_PUNCTUATION).to_string();
        token.set_value(trimmed);
    }
    Ok(())
}

static NAMED_CAPTION: BorrowedPattern<'static> =
    pattern!("para_style:Caption | bookmark_start:* ! seq:* bookmark_end:* ! eop:*");

/// Captions with a bookmarked number become `float:{type} caption end_caption: label:{bookmark}`.
fn convert_named_captions(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&NAMED_CAPTION);
    while let Some(found) = finder.next_match(document) {
        let label = value_of(document, found.marked())?;

        let source = format!("seq:* bookmark_end:{}", label);
        let Some(number) = find_sequence(document, Some(found.start), &compile_pattern(&source)?) else {
            continue;
        };
        let float_type = value_of(document, number.start)?.to_lowercase();

        retag(document, found.start, "float", Some(float_type))?;
        remove_after(document, found.start, number.end)?;
        trim_caption_start(document, found.start)?;

        set_kind(document, found.end, "end_caption")?;
        document.insert_after(found.end, Token::tagged("label", label))?;
    }

    Ok(())
}

const BORING_WORDS: [&str; 12] = [
    "the", "a", "an", "and", "in", "to", "for", "as", "of", "show", "shows", "shown",
];

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^a-z0-9]").expect("valid word separator expression"));

/// Derive a readable reference name like `ParserPipelineOverview` from the caption text
/// starting at `caption`, unless a `possibility` is given.
/// Names already present in `names` receive a numeric suffix.
fn nice_name(
    document: &Sequence,
    caption: Option<Position>,
    possibility: Option<String>,
    names: &BTreeMap<String, String>,
) -> Option<String> {
    let possibility = match possibility.filter(|name| !name.trim().is_empty()) {
        Some(name) => name,
        None => {
            let mut name = String::new();

            let mut cursor = caption;
            while let Some(position) = cursor {
                let Some(token) = document.get(position) else {
                    break;
                };
                if token.is_kind("end_caption") {
                    break;
                }
                cursor = document.next(position);

                if !token.is_text() {
                    continue;
                }

                let words = token.value_or_empty().to_lowercase();
                let words = NON_ALPHANUMERIC.replace_all(&words, " ");
                for word in words.split_whitespace() {
                    if BORING_WORDS.contains(&word) {
                        continue;
                    }

                    name.push_str(&word[..1].to_uppercase());
                    name.push_str(&word[1..]);
                }
            }

            name
        }
    };

    if possibility.trim().is_empty() {
        return None;
    }

    let is_taken = |name: &str| names.values().any(|value| value == name);
    if !is_taken(&possibility) {
        return Some(possibility);
    }

    (1..)
        .map(|counter| format!("{}{}", possibility, counter))
        .find(|name| !is_taken(name))
}

static ANONYMOUS_CAPTION: BorrowedPattern<'static> =
    pattern!("para_style:Caption ! | seq:* ! eop:*");

/// Captions without a bookmark receive a label derived from their text.
fn convert_anonymous_captions(context: &mut Context) -> Result<()> {
    let mut finder = Finder::new(&ANONYMOUS_CAPTION);
    while let Some(found) = finder.next_match(&context.parts.document) {
        let document = &mut context.parts.document;
        let float_type = value_of(document, found.marked())?.to_lowercase();

        retag(document, found.start, "float", Some(float_type))?;
        remove_after(document, found.start, found.marked())?;
        trim_caption_start(document, found.start)?;
        set_kind(document, found.end, "end_caption")?;

        let caption = document.next(found.start);
        let name = nice_name(document, caption, None, &context.nice_reference_names);
        let mut name = match name {
            Some(name) => name,
            None => context.unique_label(),
        };

        if context.used_caption_names.contains(&name) {
            context.report(Diagnostic::CaptionCollision { name: name.clone() });

            let mut counter = 1;
            while context.used_caption_names.contains(&format!("{}{}", name, counter)) {
                counter += 1;
            }
            name = format!("{}{}", name, counter);
        }

        context.used_caption_names.insert(name.clone());
        context
            .parts
            .document
            .insert_after(found.end, Token::tagged("label", name))?;
    }

    Ok(())
}

static TABLE_FLOAT: BorrowedPattern<'static> = pattern!("float:* ! | label:* table:* ! end_table:*");
static IMAGE_FLOAT: BorrowedPattern<'static> = pattern!("float:* ! | label:* image:* eop:*");
static EQUATION_FLOAT: BorrowedPattern<'static> = pattern!("float:* ! label:* | math_para:* eop:*");
static STYLED_FLOAT: BorrowedPattern<'static> = pattern!("float:* ! label:* | para_style:*");
static PARAGRAPH_END: BorrowedPattern<'static> = pattern!("eop:*");

/// Close every float with `end_float:{type}` after its content and remember the
/// readable name of its label.
fn convert_floats(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    let names = &mut context.nice_reference_names;

    let mut finder = Finder::new(&TABLE_FLOAT);
    while let Some(found) = finder.next_match(document) {
        if let Some(name) = nice_name(document, Some(found.start), None, names) {
            names.insert(value_of(document, found.marked())?, name);
        }

        let float_type = document.token(found.start)?.value().map(String::from);
        document.insert_after(found.end, Token::new(Some("end_float".into()), float_type))?;
    }

    let mut finder = Finder::new(&IMAGE_FLOAT);
    while let Some(found) = finder.next_match(document) {
        let title = document
            .next(found.marked())
            .map(|image| value_of(document, image))
            .transpose()?;
        if let Some(name) = nice_name(document, Some(found.start), title, names) {
            names.insert(value_of(document, found.marked())?, name);
        }

        let float_type = document.token(found.start)?.value().map(String::from);
        retag(document, found.end, "end_float", float_type)?;
    }

    let mut finder = Finder::new(&EQUATION_FLOAT);
    while let Some(found) = finder.next_match(document) {
        if let Some(label) = document.prev(found.marked()) {
            if let Some(name) = nice_name(document, Some(found.start), None, names) {
                names.insert(value_of(document, label)?, name);
            }
        }

        set_kind(document, found.marked(), "math_float")?;
        let float_type = document.token(found.start)?.value().map(String::from);
        retag(document, found.end, "end_float", float_type)?;
    }

    /* the float spans all following paragraphs of the same style */
    let mut cursor = document.first();
    while let Some(found) = find_sequence(document, cursor, &STYLED_FLOAT) {
        if let Some(label) = document.prev(found.marked()) {
            if let Some(name) = nice_name(document, Some(found.start), None, names) {
                names.insert(value_of(document, label)?, name);
            }
        }

        let style = document.token(found.marked())?.clone();
        let mut end = found.end;
        let mut search = Some(found.end);
        while let Some(paragraph) = find_sequence(document, search, &PARAGRAPH_END) {
            end = paragraph.end;

            let next = document.next(paragraph.end);
            if next.and_then(|next| document.get(next)) != Some(&style) {
                break;
            }
            search = next;
        }

        let float_type = document.token(found.start)?.value().map(String::from);
        document.insert_after(end, Token::new(Some("end_float".into()), float_type))?;
        cursor = document.next(found.start);
    }

    Ok(())
}

static BOOKMARK_START: BorrowedPattern<'static> = pattern!("bookmark_start:*");

/// Remaining bookmarks become plain labels at their start.
fn convert_other_bookmarks(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&BOOKMARK_START);
    while let Some(found) = finder.next_match(document) {
        set_kind(document, found.start, "label")?;

        let source = format!("bookmark_end:{}", value_of(document, found.start)?);
        replace_sequence(
            document,
            Some(found.start),
            &compile_pattern(&source)?,
            &[],
            Some(1),
        )?;
    }

    Ok(())
}
