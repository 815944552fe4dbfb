use docsplice::{
    compiler::compile_pattern,
    find_sequence,
    pattern,
    BorrowedPattern,
    Finder,
    Sequence,
};

use super::{
    remove_after,
    remove_next,
    remove_prev,
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
        remove_text_brackets,
        extract_structured_content,
        convert_math,
        convert_hyperlinks,
        convert_numbering,
        convert_styles,
        ignore_properties,
        remove_properties,
        simplify_runs,
    ]
}

fn remove_text_brackets(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    replace_all(document, &pattern!("S<:t Sa:space S=:preserve"), "")?;
    replace_all(document, &pattern!("S<:t"), "")?;
    replace_all(document, &pattern!("S>:t"), "")?;
    Ok(())
}

/// Unwrap structured document tags, keeping only their content.
fn extract_structured_content(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    replace_all(document, &pattern!("S<:sdt ! S<:sdtContent"), "")?;
    replace_all(document, &pattern!("S>:sdtContent S>:sdt"), "")?;
    Ok(())
}

static CAPTURED_FORMULA: BorrowedPattern<'static> = pattern!("Smath:*");
static TABLE_CELL_FORMULA: BorrowedPattern<'static> =
    pattern!("S<:tc !S>:tc S<:oMathPara | math:* S>:oMathPara");
static FORMULA_PARAGRAPH: BorrowedPattern<'static> = pattern!("S<:oMathPara | math:* S>:oMathPara");

fn normalize_formula(text: &str) -> String {
    let text = text.trim_matches(['$', ' ']);
    match text.strip_suffix("\\right\\") {
        Some(head) => format!("{}\\right.", head),
        None => text.to_string(),
    }
}

/// Translate captured formula markup into `math:{formula}` tokens.
/// Formulas which fill a whole paragraph become `math_para`, except inside table cells.
fn convert_math(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&CAPTURED_FORMULA);
    while let Some(found) = finder.next_match(document) {
        let markup = value_of(document, found.marked())?;
        match context.formula.translate(&markup) {
            Ok(formula) => {
                retag(document, found.marked(), "math", Some(normalize_formula(&formula)))?;
            }
            Err(error) => {
                let reason = error.to_string();
                retag(
                    document,
                    found.marked(),
                    "error",
                    Some(format!("Formula conversion failed: {}", reason)),
                )?;
                context.diagnostics.report(Diagnostic::FormulaFailed { reason });
            }
        }
    }

    let mut finder = Finder::new(&TABLE_CELL_FORMULA);
    while let Some(found) = finder.next_match(document) {
        let formula = found.marked();
        remove_prev(document, formula)?;
        remove_next(document, formula)?;
    }

    let mut finder = Finder::new(&FORMULA_PARAGRAPH);
    while let Some(found) = finder.next_match(document) {
        let formula = found.marked();
        set_kind(document, formula, "math_para")?;
        remove_prev(document, formula)?;
        remove_next(document, formula)?;
    }

    Ok(())
}

static HYPERLINK: BorrowedPattern<'static> = pattern!("S<:hyperlink !S<:r Sa:id | S=:* ! S>:hyperlink");
static FOOTNOTE_HYPERLINK: BorrowedPattern<'static> = pattern!("footnote:* !end_footnote:* | url_ref:*");

/// External hyperlinks become `url_ref:{relationship id}`, internal ones are unwrapped.
fn convert_hyperlinks(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&HYPERLINK);
    while let Some(found) = finder.next_match(document) {
        let id = value_of(document, found.marked())?;
        retag(document, found.start, "url_ref", Some(id))?;
        remove_after(document, found.start, found.end)?;
    }

    replace_all(document, &pattern!("S<:hyperlink ! S>:hyperlink"), "")?;

    /* links inside footnotes resolve against the footnote relationships */
    let mut finder = Finder::new(&FOOTNOTE_HYPERLINK);
    while let Some(found) = finder.next_match(document) {
        set_kind(document, found.marked(), "url_ref_footnote")?;
    }

    Ok(())
}

static NUMBERED_PARAGRAPH: BorrowedPattern<'static> =
    pattern!("S<:pPr !S>:pPr | S<:numPr !S>:pPr S>:numPr");
static NUMBERING_LEVEL: BorrowedPattern<'static> = pattern!("S<:ilvl Sa:val | S=:*");
static NUMBERING_ID: BorrowedPattern<'static> = pattern!("S<:numId Sa:val | S=:*");

/// Look up the number format of a list level in the numbering definitions.
fn numbering_format(numbering: &Sequence, id: &str, level: &str) -> Result<Option<String>> {
    let source = format!("S<:num Sa:numId S=:{} S<:abstractNumId Sa:val | S=:*", id);
    let Some(instance) = find_sequence(numbering, numbering.first(), &compile_pattern(&source)?) else {
        return Ok(None);
    };
    let abstract_id = value_of(numbering, instance.marked())?;

    let source = format!(
        "S<:abstractNum Sa:abstractNumId S=:{} !S>:abstractNum S<:lvl Sa:ilvl S=:{} !S>:lvl S<:numFmt Sa:val | S=:*",
        abstract_id, level
    );
    match find_sequence(numbering, numbering.first(), &compile_pattern(&source)?) {
        Some(format) => Ok(Some(value_of(numbering, format.marked())?)),
        None => Ok(None),
    }
}

/// Numbering properties become `listitem:{format},{level}`.
fn convert_numbering(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    let numbering = &context.parts.numbering;

    let mut finder = Finder::new(&NUMBERED_PARAGRAPH);
    while let Some(found) = finder.next_match(document) {
        let level = match find_sequence(document, Some(found.start), &NUMBERING_LEVEL) {
            Some(level) => value_of(document, level.marked())?,
            None => "0".to_string(),
        };

        let format = match find_sequence(document, Some(found.start), &NUMBERING_ID) {
            Some(id) => numbering_format(numbering, &value_of(document, id.marked())?, &level)?,
            None => None,
        };
        let format = format.unwrap_or_else(|| "unknown".to_string());

        let item = found.marked();
        retag(document, item, "listitem", Some(format!("{},{}", format, level)))?;
        remove_after(document, item, found.end)?;
    }

    Ok(())
}

static RUN_STYLE: BorrowedPattern<'static> =
    pattern!("S<:r !S>:r S<:rPr !S>:rPr S<:rStyle Sa:val | S=:* S>:rStyle");
static PARAGRAPH_STYLE: BorrowedPattern<'static> =
    pattern!("S<:pPr !S>:pPr S<:pStyle Sa:val | S=:* S>:pStyle");

/// Run and paragraph styles become `run_style:{style}` and `para_style:{style}`.
/// The style token takes the place of the first token after the run or paragraph start.
fn convert_styles(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    for (pattern, kind) in [(&RUN_STYLE, "run_style"), (&PARAGRAPH_STYLE, "para_style")] {
        let mut finder = Finder::new(pattern);
        while let Some(found) = finder.next_match(document) {
            let Some(first) = document.next(found.start) else {
                continue;
            };

            let style = value_of(document, found.marked())?;
            retag(document, first, kind, Some(style))?;
            remove_after(document, first, found.end)?;
        }

        if kind == "run_style" {
            replace_all(document, &pattern!("S<:rStyle ! S>:rStyle"), "")?;
        }
    }

    Ok(())
}

const IGNORED_RUN_PROPERTIES: [&str; 6] = ["kern", "rFonts", "b", "bCs", "sz", "szCs"];
const IGNORED_PARAGRAPH_PROPERTIES: [&str; 2] = ["jc", "ind"];
const IGNORED_ELEMENTS: [&str; 6] = ["lang", "proofErr", "numForm", "highlight", "cnfStyle", "spacing"];

/// Drop formatting properties which have no counterpart in the output.
fn ignore_properties(context: &mut Context) -> Result<()> {
    let run_properties = IGNORED_RUN_PROPERTIES
        .iter()
        .map(|property| format!("S<:rPr !S>:rPr | S<:{0} ! S>:{0}", property));
    let paragraph_properties = IGNORED_PARAGRAPH_PROPERTIES
        .iter()
        .map(|property| format!("S<:pPr !S>:pPr | S<:{0} ! S>:{0}", property));
    let elements = IGNORED_ELEMENTS
        .iter()
        .map(|element| format!("S<:{0} ! S>:{0}", element));

    let document = &mut context.parts.document;
    for source in run_properties.chain(paragraph_properties).chain(elements) {
        let pattern = compile_pattern(&source)?;

        let mut finder = Finder::new(&pattern);
        while let Some(found) = finder.next_match(document) {
            document.remove_range(found.marked(), found.end)?;
        }
    }

    Ok(())
}

fn remove_properties(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    replace_all(document, &pattern!("S<:rPr"), "")?;
    replace_all(document, &pattern!("S>:rPr"), "")?;
    replace_all(document, &pattern!("S<:pPr"), "")?;
    replace_all(document, &pattern!("S>:pPr"), "")?;
    Ok(())
}

static STYLED_RUN: BorrowedPattern<'static> = pattern!("S<:r | run_style:* ! S>:r");
static PLAIN_RUN: BorrowedPattern<'static> = pattern!("S<:r ! S>:r");
static STYLED_FIELD_CHARACTERS: [BorrowedPattern<'static>; 3] = [
    pattern!("run_style:* field_begin:* end_run_style:*"),
    pattern!("run_style:* field_separate:* end_run_style:*"),
    pattern!("run_style:* field_end:* end_run_style:*"),
];

/// Unwrap runs. Styled runs become `run_style:{style} ... end_run_style:{style}`.
fn simplify_runs(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&STYLED_RUN);
    while let Some(found) = finder.next_match(document) {
        let style = value_of(document, found.marked())?;
        document.remove(found.start)?;
        retag(document, found.end, "end_run_style", Some(style))?;
    }

    let mut finder = Finder::new(&PLAIN_RUN);
    while let Some(found) = finder.next_match(document) {
        document.remove(found.start)?;
        document.remove(found.end)?;
    }

    /* styling a lone field character has no effect */
    for pattern in &STYLED_FIELD_CHARACTERS {
        let mut finder = Finder::new(pattern);
        while let Some(found) = finder.next_match(document) {
            document.remove(found.start)?;
            document.remove(found.end)?;
        }
    }

    Ok(())
}
