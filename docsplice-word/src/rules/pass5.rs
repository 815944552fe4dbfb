use docsplice::{
    find_sequence,
    pattern,
    BorrowedPattern,
    Finder,
    Sequence,
};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    rules,
    set_kind,
    value_of,
    Rules,
};
use crate::{
    Context,
    Result,
};

pub(super) fn rules() -> Rules {
    rules![
        detect_code_listings,
        use_nice_reference_names,
        combine_references,
        combine_citations,
        wrap_dotted_names,
        mark_table_first_row,
    ]
}

static KNOWN_LISTING_LANGUAGES: [(&str, &str); 5] = [
    ("python", "python"),
    ("esdl", "esdl"),
    ("ruby", "ruby"),
    ("c++", "cpp"),
    ("pseudocode", "pseudocode"),
];

static LANGUAGE_TERMINATORS: [char; 4] = [' ', ',', '.', ')'];

/// The language named first in a listing caption, if any.
fn listing_language(caption: &str) -> &'static str {
    let caption = format!("{} ", caption.replace([',', '.'], " ")).to_lowercase();

    KNOWN_LISTING_LANGUAGES
        .iter()
        .flat_map(|(name, language)| {
            LANGUAGE_TERMINATORS
                .iter()
                .map(move |terminator| (format!("{}{}", name, terminator), *language))
        })
        .filter_map(|(needle, language)| caption.find(&needle).map(|index| (index, language)))
        .min_by_key(|(index, _)| *index)
        .map(|(_, language)| language)
        .unwrap_or("unknownlanguage")
}

static CODE_LISTING: BorrowedPattern<'static> =
    pattern!("float:listing ! | end_caption:* !float:* end_float:listing");

/// Listings are tagged with the language their caption mentions, `float:listing_python`.
fn detect_code_listings(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&CODE_LISTING);
    while let Some(found) = finder.next_match(document) {
        let mut caption = String::new();

        let mut cursor = document.next(found.start);
        while let Some(position) = cursor.filter(|position| *position != found.marked()) {
            let token = document.token(position)?;
            if token.is_text() {
                caption.push_str(token.value_or_empty());
            }
            cursor = document.next(position);
        }

        let listing = format!("listing_{}", listing_language(&caption));
        document.token_mut(found.start)?.set_value(listing.clone());
        document.token_mut(found.end)?.set_value(listing);
    }

    Ok(())
}

/// Prefix labels and references with the readable name of their float, `PlotOverview_Ref12`.
fn use_nice_reference_names(context: &mut Context) -> Result<()> {
    if !context.config.use_nice_reference_names {
        return Ok(());
    }

    let document = &mut context.parts.document;
    let names = &context.nice_reference_names;

    let mut cursor = document.first();
    while let Some(position) = cursor {
        cursor = document.next(position);

        let token = document.token_mut(position)?;
        let is_reference = token
            .kind()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("ref") || kind.eq_ignore_ascii_case("label"));
        let Some(value) = token.value().filter(|_| is_reference) else {
            continue;
        };

        let name = names
            .get(value.trim_start_matches('_'))
            .or_else(|| names.get(value))
            .or_else(|| names.get(&format!("_{}", value)));
        if let Some(name) = name {
            let value = format!("{}_{}", name, value.trim_matches([' ', '_', '-']));
            token.set_value(value);
        }
    }

    Ok(())
}

static REFERENCE_SEPARATOR: BorrowedPattern<'static> = pattern!("ref:* | :* ref:*");
static ADJACENT_REFERENCES: BorrowedPattern<'static> = pattern!("ref:* ref:*");
static SENTENCE_REFERENCE: BorrowedPattern<'static> = pattern!(":* ref:*");
static PARAGRAPH_REFERENCE: BorrowedPattern<'static> = pattern!("eop:* ref:*");

/// Merge `tag:a tag:b` into `tag:a,b` until no neighbours remain.
fn merge_adjacent(document: &mut Sequence, pattern: &BorrowedPattern<'_>) -> Result<()> {
    let mut cursor = document.first();
    while let Some(found) = find_sequence(document, cursor, pattern) {
        let tail = document.remove(found.end)?;
        let merged = format!(
            "{},{}",
            document.token(found.start)?.value_or_empty(),
            tail.value_or_empty()
        );
        document.token_mut(found.start)?.set_value(merged);
        cursor = Some(found.start);
    }

    Ok(())
}

/// `ref:a, ref:b and ref:c` becomes `ref:a,b,c`.
/// References starting a sentence are tagged `Ref` to be rendered capitalized.
fn combine_references(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&REFERENCE_SEPARATOR);
    while let Some(found) = finder.next_match(document) {
        let separator = value_of(document, found.marked())?;
        let separator = separator.trim();
        if separator == "," || separator.eq_ignore_ascii_case("and") {
            document.remove(found.marked())?;
        }
    }

    merge_adjacent(document, &ADJACENT_REFERENCES)?;

    let mut finder = Finder::new(&SENTENCE_REFERENCE);
    while let Some(found) = finder.next_match(document) {
        if value_of(document, found.start)?.trim_end().ends_with('.') {
            set_kind(document, found.end, "Ref")?;
        }
    }

    let mut finder = Finder::new(&PARAGRAPH_REFERENCE);
    while let Some(found) = finder.next_match(document) {
        set_kind(document, found.end, "Ref")?;
    }

    Ok(())
}

static ADJACENT_CITATIONS: BorrowedPattern<'static> = pattern!("citation:* citation:*");

fn combine_citations(context: &mut Context) -> Result<()> {
    merge_adjacent(&mut context.parts.document, &ADJACENT_CITATIONS)
}

static DOTTED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Ll}|\p{Lu})\.(\p{Ll}|\p{Lu})").expect("valid dotted name expression"));

/// Allow line breaks after dots inside names like `System.Collections`.
fn wrap_dotted_names(context: &mut Context) -> Result<()> {
    if !context.config.wrap_dotted_names {
        return Ok(());
    }

    let document = &mut context.parts.document;
    let mut cursor = document.first();
    while let Some(position) = cursor {
        cursor = document.next(position);

        let token = document.token_mut(position)?;
        if !token.is_text() {
            continue;
        }

        let wrapped = DOTTED_NAME.replace_all(token.value_or_empty(), "${1}.\u{AD}${2}");
        let wrapped = wrapped.into_owned();
        token.set_value(wrapped);
    }

    Ok(())
}

static TABLE_FIRST_ROW: BorrowedPattern<'static> =
    pattern!("table:* !end_table_row_first:* end_table_row:*");

/// The end of the first row of every table becomes `end_table_row_first:`.
fn mark_table_first_row(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&TABLE_FIRST_ROW);
    while let Some(found) = finder.next_match(document) {
        set_kind(document, found.end, "end_table_row_first")?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::{
        combine_citations,
        combine_references,
        detect_code_listings,
        listing_language,
        mark_table_first_row,
        use_nice_reference_names,
        wrap_dotted_names,
    };
    use crate::rules::test_util::{
        context,
        render,
    };

    #[rstest]
    #[case("Parser written in Python", "python")]
    #[case("Pseudocode of the C++ visitor.", "pseudocode")]
    #[case("Ruby, then Python", "ruby")]
    #[case("Pythonic helpers", "unknownlanguage")]
    #[case("Written in C++", "cpp")]
    fn listing_languages(#[case] caption: &str, #[case] expected: &str) {
        assert_eq!(listing_language(caption), expected);
    }

    #[test]
    fn listings() {
        let mut context = context(
            "float:listing Lexer~in~Python end_caption: label:_Ref1 code end_float:listing",
        );
        detect_code_listings(&mut context).unwrap();
        assert_eq!(
            render(&context.parts.document),
            "float:listing_python Lexer~in~Python end_caption: label:_Ref1 code end_float:listing_python"
        );
    }

    #[test]
    fn references_are_combined() {
        let mut context = context(
            "See ref:Ref1 , ref:Ref2 ~and~ ref:Ref3 done. ref:Ref4 eop: ref:Ref5",
        );
        combine_references(&mut context).unwrap();
        assert_eq!(
            render(&context.parts.document),
            "See ref:Ref1,Ref2,Ref3 done. Ref:Ref4 eop: Ref:Ref5"
        );
    }

    #[test]
    fn citations_are_combined() {
        let mut context = context("citation:Knuth84 citation:Wirth76 text citation:Hoare69");
        combine_citations(&mut context).unwrap();
        assert_eq!(
            render(&context.parts.document),
            "citation:Knuth84,Wirth76 text citation:Hoare69"
        );
    }

    #[test]
    fn nice_reference_names_are_optional() {
        let mut context = context("label:_Ref1 ref:Ref1 ref:Other");
        context
            .nice_reference_names
            .insert("_Ref1".to_string(), "PlotOverview".to_string());

        use_nice_reference_names(&mut context).unwrap();
        assert_eq!(render(&context.parts.document), "label:_Ref1 ref:Ref1 ref:Other");

        context.config.use_nice_reference_names = true;
        use_nice_reference_names(&mut context).unwrap();
        assert_eq!(
            render(&context.parts.document),
            "label:PlotOverview_Ref1 ref:PlotOverview_Ref1 ref:Other"
        );
    }

    #[test]
    fn dotted_names() {
        let mut context = context("System.IO 3.14 ref:a.b");
        context.config.wrap_dotted_names = true;
        wrap_dotted_names(&mut context).unwrap();
        assert_eq!(
            context.parts.document.to_vec()[0].value(),
            Some("System.\u{AD}IO")
        );
        assert_eq!(render(&context.parts.document), "System.\u{AD}IO 3.14 ref:a.b");
    }

    #[test]
    fn first_table_row() {
        let mut context = context(
            "table:|L| a end_table_row: b end_table_row: end_table: table:|L| c end_table_row: end_table:",
        );
        mark_table_first_row(&mut context).unwrap();
        assert_eq!(
            render(&context.parts.document),
            "table:|L| a end_table_row_first: b end_table_row: end_table: \
             table:|L| c end_table_row_first: end_table:"
        );
    }
}
