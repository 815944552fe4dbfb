use docsplice::{
    compiler::compile_pattern,
    find_sequence,
    pattern,
    BorrowedPattern,
    Finder,
    Match,
    Position,
    Sequence,
    Token,
};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    remove_after,
    remove_between,
    remove_next,
    replace_all,
    replace_limited,
    retag,
    rules,
    set_kind,
    starts_with_ignore_case,
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
        simplify_paragraphs,
        combine_run_styles,
        convert_styles_to_environments,
        convert_bookmarks_to_labels,
        tidy_footnotes,
        combine_numbered_lists,
        tidy_document_start_end,
        convert_simple_fields,
        convert_fields,
        resolve_urls,
    ]
}

static ADJACENT_TEXT: BorrowedPattern<'static> = pattern!(":* :*");

/// Paragraphs end with `eop:`, adjacent text tokens are merged.
fn simplify_paragraphs(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    replace_all(document, &pattern!("S<:p"), "")?;
    replace_all(document, &pattern!("S>:p"), "eop:")?;
    replace_all(document, &pattern!("para_style:BodyText"), "")?;

    let mut cursor = document.first();
    while let Some(found) = find_sequence(document, cursor, &ADJACENT_TEXT) {
        let tail = document.remove(found.end)?;
        document.token_mut(found.start)?.append_value(tail.value_or_empty());
        cursor = Some(found.start);
    }

    Ok(())
}

static RUN_STYLE_BOUNDARY: BorrowedPattern<'static> = pattern!("end_run_style:* run_style:*");

/// Join neighbouring runs of the same style.
fn combine_run_styles(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&RUN_STYLE_BOUNDARY);
    while let Some(found) = finder.next_match(document) {
        if document.token(found.start)?.value() == document.token(found.end)?.value() {
            document.remove(found.start)?;
            document.remove(found.end)?;
        }
    }

    Ok(())
}

const ENVIRONMENT_STYLES: [&str; 1] = ["Abstract"];

static STYLED_TEXT: BorrowedPattern<'static> = pattern!("para_style:* !eop:* | :*");
static APPENDIX_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)appendix.*?(:|\.) *(.+)").expect("valid appendix expression"));

/// Environment paragraph styles become `wxbegin:{style} ... wxend:{style}`.
/// Headings starting with "Appendix" are restyled as appendix headings.
fn convert_styles_to_environments(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    for style in ENVIRONMENT_STYLES {
        let source = format!("para_style:{} ! | eop:", style);
        let pattern = compile_pattern(&source)?;
        let environment = style.to_lowercase();

        let mut finder = Finder::new(&pattern);
        while let Some(found) = finder.next_match(document) {
            retag(document, found.start, "wxbegin", Some(environment.clone()))?;
            retag(document, found.marked(), "wxend", Some(environment.clone()))?;
        }
    }

    let mut finder = Finder::new(&STYLED_TEXT);
    while let Some(found) = finder.next_match(document) {
        if !starts_with_ignore_case(&value_of(document, found.start)?, "heading") {
            continue;
        }

        let text = value_of(document, found.marked())?;
        if !starts_with_ignore_case(&text, "appendix") {
            continue;
        }

        document.token_mut(found.start)?.set_value("Appendix");
        if let Some(title) = APPENDIX_HEADING.captures(&text).and_then(|captures| captures.get(2)) {
            document.token_mut(found.marked())?.set_value(title.as_str());
        }
    }

    Ok(())
}

static HEADING_BOOKMARK: BorrowedPattern<'static> =
    pattern!("para_style:* bookmark_start:* ! bookmark_end:* eop:*");

fn is_heading_style(style: &str) -> bool {
    starts_with_ignore_case(style, "heading") || starts_with_ignore_case(style, "appendix")
}

/// Bookmarks spanning a whole heading become a `label:` token after the heading.
fn convert_bookmarks_to_labels(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&HEADING_BOOKMARK);
    while let Some(found) = finder.next_match(document) {
        if !is_heading_style(&value_of(document, found.start)?) {
            continue;
        }

        let Some(bookmark) = document.next(found.start) else {
            continue;
        };
        let label = value_of(document, bookmark)?
            .trim_start_matches('_')
            .to_string();

        document.remove(bookmark)?;
        if let Some(bookmark_end) = document.prev(found.end) {
            document.remove(bookmark_end)?;
        }
        document.insert_after(found.end, Token::tagged("label", label))?;
    }

    Ok(())
}

static FOOTNOTE_TEXT: BorrowedPattern<'static> = pattern!("footnote:* ! :*");
static FOOTNOTE_PARAGRAPH_END: BorrowedPattern<'static> = pattern!("eop:* end_footnote:*");

/// A footnote starts directly with its text and does not end with a paragraph.
fn tidy_footnotes(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&FOOTNOTE_TEXT);
    while let Some(found) = finder.next_match(document) {
        remove_between(document, found.start, found.end)?;

        let token = document.token_mut(found.end)?;
        let text = token.value_or_empty().trim_start_matches(' ').to_string();
        if text.is_empty() {
            document.remove(found.end)?;
        } else {
            token.set_value(text);
        }
    }

    let mut finder = Finder::new(&FOOTNOTE_PARAGRAPH_END);
    while let Some(found) = finder.next_match(document) {
        document.remove(found.start)?;
    }

    Ok(())
}

static STYLED_LIST_ITEM: BorrowedPattern<'static> = pattern!("para_style:* listitem:*");
static LIST_ITEM: BorrowedPattern<'static> = pattern!("listitem:*");
static ITEM_END: BorrowedPattern<'static> = pattern!("item: ! eop:*");

/// Consecutive list items of the same kind form a `list:{type} item: ... end_list:{type}` block.
fn combine_numbered_lists(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&STYLED_LIST_ITEM);
    while let Some(found) = finder.next_match(document) {
        document.remove(found.start)?;
    }

    let mut cursor = document.first();
    while let Some(found) = find_sequence(document, cursor, &LIST_ITEM) {
        let item = value_of(document, found.start)?;
        let list_type = match item.split_once(',') {
            Some((list_type, _level)) => list_type.to_string(),
            None => item.clone(),
        };
        document.insert_before(found.start, Token::tagged("list", list_type.clone()))?;

        let source = format!("listitem:{0} ! eop:* !eop:* | listitem:{0}", item);
        let successor = compile_pattern(&source)?;

        let mut expected = found.start;
        while let Some(next) = find_sequence(document, Some(expected), &successor) {
            if next.start != expected {
                break;
            }

            retag(document, next.start, "item", None)?;
            expected = next.marked();
        }

        retag(document, expected, "item", None)?;
        match find_sequence(document, Some(expected), &ITEM_END) {
            Some(last) if last.start == expected => {
                document.insert_after(last.end, Token::tagged("end_list", list_type))?;
            }
            _ => context.diagnostics.report(Diagnostic::BrokenList { list_type }),
        }

        cursor = Some(expected);
    }

    Ok(())
}

const DOCUMENT_METADATA: [&str; 2] = ["Title", "Author"];

/// Mark the document boundaries and promote title and author paragraphs.
fn tidy_document_start_end(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    replace_limited(document, &pattern!("S<:document ! S<:body"), "document:", Some(1))?;
    replace_limited(document, &pattern!("S>:body S>:document"), "end:document", Some(1))?;

    for part in DOCUMENT_METADATA {
        let source = format!("para_style:{} | :* eop:*", part);
        let pattern = compile_pattern(&source)?;
        let kind = part.to_lowercase();

        let mut finder = Finder::new(&pattern);
        while let Some(found) = finder.next_match(document) {
            document.remove(found.start)?;
            document.remove(found.end)?;
            set_kind(document, found.marked(), &kind)?;
        }
    }

    Ok(())
}

static SIMPLE_FIELD: BorrowedPattern<'static> =
    pattern!("S<:fldSimple Sa:instr | S=:* ! S>:fldSimple");

/// Simple fields are rewritten into the `field_begin ... field_end` form of complex fields.
fn convert_simple_fields(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&SIMPLE_FIELD);
    while let Some(found) = finder.next_match(document) {
        set_kind(document, found.start, "field_begin")?;
        remove_next(document, found.start)?;
        document.token_mut(found.marked())?.clear_kind();
        set_kind(document, found.end, "field_end")?;
    }

    Ok(())
}

/// A field instruction split into the upper case command and its options.
#[derive(Debug, PartialEq, Eq)]
struct FieldInstruction {
    command: String,
    options: String,
}

impl FieldInstruction {
    fn parse(instruction: &str) -> Self {
        let instruction = instruction.trim();
        let (command, options) = match instruction.split_once(' ') {
            Some((command, options)) => (command, options.trim_start()),
            None => (instruction, ""),
        };

        Self {
            command: command.to_uppercase(),
            options: options.to_string(),
        }
    }

    fn first_option(&self) -> &str {
        match self.options.split_once(' ') {
            Some((first, _)) => first,
            None => &self.options,
        }
    }

    /// The `XE` index term, `:` separated levels are written with `!`.
    fn index_term(&self) -> (String, usize) {
        let Some(open) = self.options.find('"') else {
            return (self.options.trim().replace(':', "!"), self.options.len());
        };

        let rest = &self.options[open + 1..];
        let close = rest.find('"').unwrap_or(rest.len());
        (rest[..close].replace(':', "!"), open + 1 + close)
    }
}

static FIELD: BorrowedPattern<'static> = pattern!("field_begin:* | :* ! field_end:*");
static FIELD_SEPARATE: BorrowedPattern<'static> = pattern!("field_separate:*");
static SEE_ALSO_TERM: BorrowedPattern<'static> = pattern!(":* !:* field_end:*");

fn see_also_term(document: &Sequence, instruction: Match) -> Result<Option<String>> {
    let Some(after) = document.next(instruction.marked()) else {
        return Ok(None);
    };
    let Some(found) = find_sequence(document, Some(after), &SEE_ALSO_TERM) else {
        return Ok(None);
    };

    let term = value_of(document, found.start)?;
    let term = if term.starts_with("See") {
        term.get(4..).unwrap_or("")
    } else {
        term.as_str()
    };
    Ok(Some(term.trim_matches(['"', ' ']).replace(':', "!")))
}

/// Collapse fields into a single token chosen by the field command.
fn convert_fields(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&FIELD);
    while let Some(found) = finder.next_match(document) {
        let instruction = FieldInstruction::parse(&value_of(document, found.marked())?);
        let first_option = instruction.first_option().to_string();

        let mut command = Some(instruction.command.as_str());
        match instruction.command.as_str() {
            "CITATION" | "SEQ" => {
                let kind = instruction.command.to_lowercase();
                retag(document, found.start, &kind, Some(first_option))?;
                remove_after(document, found.start, found.end)?;
            }
            "HYPERLINK" => {
                let target = instruction.options.trim_matches([' ', '"', '\'']).to_string();
                retag(document, found.start, "hyperlink", Some(target))?;
                remove_after(document, found.start, found.end)?;
            }
            "REF" | "PAGEREF" if context.ignored_bookmarks.contains(&first_option) => {
                /* the target bookmark has been dropped, keep only the displayed text */
                let instruction_end = find_sequence(document, Some(found.start), &FIELD_SEPARATE)
                    .map(|separate| separate.start)
                    .filter(|separate| is_before(document, *separate, found.end))
                    .unwrap_or(found.marked());

                document.remove_range(found.start, instruction_end)?;
                document.remove(found.end)?;
                command = None;
            }
            "REF" | "PAGEREF" => {
                let kind = instruction.command.to_lowercase();
                retag(document, found.start, &kind, Some(first_option))?;
                remove_after(document, found.start, found.end)?;
            }
            "XE" => {
                let (mut term, term_end) = instruction.index_term();
                if instruction.options[term_end..].contains("\\t") {
                    if let Some(see_also) = see_also_term(document, found)? {
                        term = format!("{}|see{{{}}}", term, see_also);
                    }
                }

                retag(document, found.start, "index", Some(term))?;
                remove_after(document, found.start, found.end)?;
            }
            "INDEX" => {
                retag(document, found.start, "printindex", None)?;
                remove_after(document, found.start, found.end)?;
            }
            other => tracing::debug!(command = other, "unhandled field"),
        }

        if command == Some("REF") {
            let token = document.token_mut(found.start)?;
            let target = token.value_or_empty().trim_start_matches('_').to_string();
            token.set_value(target);

            if instruction.options.contains("\\# 0") {
                token.set_kind("ref_number");
            } else if instruction.options.contains("\\#") {
                document.remove(found.start)?;
            }
        }
    }

    Ok(())
}

/// Returns true if `end` can be reached by walking forward from `position`.
fn is_before(sequence: &Sequence, position: Position, end: Position) -> bool {
    let mut cursor = sequence.next(position);
    while let Some(current) = cursor {
        if current == end {
            return true;
        }
        cursor = sequence.next(current);
    }

    false
}

static URL_REFERENCE: BorrowedPattern<'static> = pattern!("url_ref:*");
static FOOTNOTE_URL_REFERENCE: BorrowedPattern<'static> = pattern!("url_ref_footnote:*");

/// Replace relationship ids with their hyperlink targets.
fn resolve_urls(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let lookups = [
        (&URL_REFERENCE, &context.parts.document_rels),
        (&FOOTNOTE_URL_REFERENCE, &context.parts.footnote_rels),
    ];
    for (pattern, relationships) in lookups {
        let mut finder = Finder::new(pattern);
        while let Some(found) = finder.next_match(document) {
            let id = value_of(document, found.start)?;
            let source = format!("Sa:Id S=:{} !S>:Relationship Sa:Target | S=:*", id);
            let relationship = compile_pattern(&source)?;

            match find_sequence(relationships, relationships.first(), &relationship) {
                Some(target) => {
                    let target = value_of(relationships, target.marked())?;
                    retag(document, found.start, "hyperlink", Some(target))?;
                }
                None => {
                    let message = format!("Unresolved url reference {}", id);
                    retag(document, found.start, "error", Some(message))?;
                    context.diagnostics.report(Diagnostic::UnresolvedUrl { id });
                }
            }
        }
    }

    Ok(())
}
