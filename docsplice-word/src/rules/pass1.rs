use docsplice::{
    compiler::compile_pattern,
    find_sequence,
    pattern,
    BorrowedPattern,
    Finder,
    Token,
};

use super::{
    remove_after,
    remove_between,
    replace_all,
    retag,
    rules,
    value_of,
    Rules,
};
use crate::{
    Context,
    Result,
};

pub(super) fn rules() -> Rules {
    rules![
        convert_footnote_characters,
        convert_footnote_runs,
        convert_soft_hyphens,
        rename_instruction_text,
        remove_deleted_text,
        remove_invisible_text,
        remove_bibliography,
        convert_field_characters,
        convert_bookmarks,
        convert_images,
        remove_revision_ids,
        remove_empty_elements,
        remove_proofing_errors,
        condense_tables,
        convert_breaks,
        convert_tabs,
    ]
}

static FOOTNOTE_CHARACTER: BorrowedPattern<'static> =
    pattern!("S<:r !S>:r S<:footnoteReference Sa:id | S=:* S>:footnoteReference ! S>:r");

static FOOTNOTE_REFERENCE: BorrowedPattern<'static> = pattern!("footnote_ref:*");

/// Collapse runs holding a footnote reference into `footnote_ref:{id}`.
fn convert_footnote_characters(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&FOOTNOTE_CHARACTER);
    while let Some(found) = finder.next_match(document) {
        let id = value_of(document, found.marked())?;
        retag(document, found.start, "footnote_ref", Some(id))?;
        remove_after(document, found.start, found.end)?;
    }

    Ok(())
}

/// Inline the footnote bodies behind their references, `footnote:{id} ... end_footnote:{id}`.
fn convert_footnote_runs(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    let footnotes = &context.parts.footnotes;

    let mut finder = Finder::new(&FOOTNOTE_REFERENCE);
    while let Some(found) = finder.next_match(document) {
        let reference = found.marked();
        let id = value_of(document, reference)?;

        let source = format!("S<:footnote !S>:footnote Sa:id | S=:{} ! S>:footnote", id);
        let body_pattern = compile_pattern(&source)?;
        let Some(body) = find_sequence(footnotes, footnotes.first(), &body_pattern) else {
            tracing::debug!(%id, "footnote body not found");
            continue;
        };

        let (Some(from), Some(to)) = (footnotes.next(body.marked()), footnotes.prev(body.end)) else {
            continue;
        };

        let last = document.copy_range_after(Some(reference), footnotes, from, to)?;
        document.token_mut(reference)?.set_kind("footnote");
        document.insert_after_or_head(last, Token::tagged("end_footnote", id))?;
    }

    Ok(())
}

fn convert_soft_hyphens(context: &mut Context) -> Result<()> {
    replace_all(
        &mut context.parts.document,
        &pattern!("S<:softHyphen S>:softHyphen"),
        ":\u{AD}",
    )?;
    Ok(())
}

/// Field instructions are treated as ordinary text.
fn rename_instruction_text(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    replace_all(document, &pattern!("S<:instrText"), "S<:t")?;
    replace_all(document, &pattern!("S>:instrText"), "S>:t")?;
    Ok(())
}

fn remove_deleted_text(context: &mut Context) -> Result<()> {
    replace_all(
        &mut context.parts.document,
        &pattern!("S<:p ! S<:rPr !S>:rPr S<:del ! S>:p"),
        "",
    )?;
    Ok(())
}

fn remove_invisible_text(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    replace_all(
        document,
        &pattern!("S<:r S<:rPr !S>:rPr S<:vanish S>:vanish ! S>:r"),
        "",
    )?;
    replace_all(
        document,
        &pattern!("S<:p !S<:r S<:rPr !S>:rPr S<:vanish S>:vanish ! S>:p"),
        "",
    )?;
    Ok(())
}

fn remove_bibliography(context: &mut Context) -> Result<()> {
    replace_all(
        &mut context.parts.document,
        &pattern!("S<:sdt !S>:sdt S<:sdt !S>:sdt S<:bibliography S>:bibliography ! S>:sdt ! S>:sdt"),
        "bibliography:",
    )?;
    Ok(())
}

static FIELD_CHARACTER: BorrowedPattern<'static> =
    pattern!("S<:fldChar Sa:fldCharType | S=:* S>:fldChar");

/// `field_begin`, `field_separate` and `field_end` markers of complex fields.
fn convert_field_characters(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&FIELD_CHARACTER);
    while let Some(found) = finder.next_match(document) {
        let field_type = value_of(document, found.marked())?;
        retag(document, found.start, &format!("field_{}", field_type), None)?;
        remove_after(document, found.start, found.end)?;
    }

    Ok(())
}

static BOOKMARK_START: BorrowedPattern<'static> = pattern!(
    "S<:bookmarkStart !S>:bookmarkStart Sa:id S=:* !S>:bookmarkStart Sa:name | S=:* ! S>:bookmarkStart"
);

static BOOKMARK_ID: BorrowedPattern<'static> = pattern!("Sa:id | S=:*");

/// Bookmarks become `bookmark_start:{name}` and `bookmark_end:{name}`.
/// Only cross reference targets (`_Ref...`) are kept, all others are remembered as ignored.
fn convert_bookmarks(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&BOOKMARK_START);
    while let Some(found) = finder.next_match(document) {
        let name = value_of(document, found.marked())?;
        retag(document, found.start, "bookmark_start", Some(name.clone()))?;

        let id = match find_sequence(document, Some(found.start), &BOOKMARK_ID) {
            Some(id) => value_of(document, id.marked())?,
            None => String::new(),
        };
        remove_after(document, found.start, found.end)?;

        let source = format!("| S<:bookmarkEnd Sa:id S=:{} ! S>:bookmarkEnd", id);
        let end_pattern = compile_pattern(&source)?;
        let Some(end) = find_sequence(document, Some(found.start), &end_pattern) else {
            continue;
        };

        retag(document, end.marked(), "bookmark_end", Some(name.clone()))?;
        remove_after(document, end.start, end.end)?;

        if !name.starts_with("_Ref") {
            document.remove(found.start)?;
            document.remove(end.marked())?;
            context.ignored_bookmarks.insert(name);
        }
    }

    replace_all(
        document,
        &pattern!("bookmark_start:_GoBack bookmark_end:_GoBack"),
        "",
    )?;
    Ok(())
}

static IMAGE_PARAGRAPH: BorrowedPattern<'static> =
    pattern!("S<:p !S>:p S<:drawing !S>:drawing S<:docPr !S>:docPr Sa:title | S=:* ! S>:p");

/// Paragraphs holding a titled drawing become `image:{title}` followed by the paragraph end,
/// other drawings `image:`.
fn convert_images(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&IMAGE_PARAGRAPH);
    while let Some(found) = finder.next_match(document) {
        let title = value_of(document, found.marked())?;
        retag(document, found.start, "image", Some(title))?;
        remove_between(document, found.start, found.end)?;
    }

    replace_all(document, &pattern!("S<:drawing ! S>:drawing"), "image:")?;
    Ok(())
}

const REVISION_ATTRIBUTES: [&str; 6] = [
    "rsidR",
    "rsidRPr",
    "rsidRDefault",
    "rsidP",
    "rsidPPr",
    "rsidTr",
];

fn remove_revision_ids(context: &mut Context) -> Result<()> {
    for attribute in REVISION_ATTRIBUTES {
        let source = format!("Sa:{} S=:*", attribute);
        replace_all(&mut context.parts.document, &compile_pattern(&source)?, "")?;
    }
    Ok(())
}

const EMPTY_ELEMENTS: [&str; 3] = ["noProof", "lastRenderedPageBreak", "rPr"];

fn remove_empty_elements(context: &mut Context) -> Result<()> {
    for element in EMPTY_ELEMENTS {
        let source = format!("S<:{0} S>:{0}", element);
        replace_all(&mut context.parts.document, &compile_pattern(&source)?, "")?;
    }
    Ok(())
}

fn remove_proofing_errors(context: &mut Context) -> Result<()> {
    replace_all(
        &mut context.parts.document,
        &pattern!("S<:proofErr ! S>:proofErr"),
        "",
    )?;
    Ok(())
}

/// Drop table properties and keep one `table_def_col:` per grid column.
fn condense_tables(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;
    replace_all(document, &pattern!("S<:tblPr ! S>:tblPr"), "")?;
    replace_all(document, &pattern!("S<:gridCol ! S>:gridCol"), "table_def_col:")?;
    replace_all(document, &pattern!("S<:tcPr ! S>:tcPr"), "")?;
    replace_all(document, &pattern!("S<:trPr ! S>:trPr"), "")?;
    Ok(())
}

static LINE_BREAK: BorrowedPattern<'static> = pattern!("S<:br S>:br");
static TYPED_BREAK: BorrowedPattern<'static> = pattern!("S<:br Sa:type | S=:* S>:br");
static ODD_SECTION_BREAK: BorrowedPattern<'static> =
    pattern!("S<:sectPr !S>:sectPr S<:type Sa:val S=:oddPage ! S>:sectPr");
static SECTION_BREAK: BorrowedPattern<'static> = pattern!("S<:sectPr ! S>:sectPr");

fn convert_breaks(context: &mut Context) -> Result<()> {
    let document = &mut context.parts.document;

    let mut finder = Finder::new(&LINE_BREAK);
    while let Some(found) = finder.next_match(document) {
        retag(document, found.start, "linebreak", None)?;
        document.remove(found.end)?;
    }

    let mut finder = Finder::new(&TYPED_BREAK);
    while let Some(found) = finder.next_match(document) {
        let break_type = value_of(document, found.marked())?;
        retag(document, found.start, &format!("{}break", break_type), None)?;
        remove_after(document, found.start, found.end)?;
    }

    for (pattern, kind) in [
        (&ODD_SECTION_BREAK, "oddsectionbreak"),
        (&SECTION_BREAK, "sectionbreak"),
    ] {
        let mut finder = Finder::new(pattern);
        while let Some(found) = finder.next_match(document) {
            retag(document, found.start, kind, None)?;
            remove_after(document, found.start, found.end)?;
        }
    }

    Ok(())
}

fn convert_tabs(context: &mut Context) -> Result<()> {
    replace_all(
        &mut context.parts.document,
        &pattern!("S<:tab S>:tab"),
        "hspace:",
    )?;
    Ok(())
}

#[cfg(test)]
mod test {
    use docsplice::Token;

    use super::{
        convert_bookmarks,
        convert_breaks,
        convert_field_characters,
        convert_footnote_characters,
        convert_footnote_runs,
        convert_images,
        remove_invisible_text,
        remove_revision_ids,
    };
    use crate::rules::test_util::{
        context,
        render,
        tokens,
    };

    #[test]
    fn footnotes_are_inlined() {
        let mut context = context(
            "S<:p S<:r S<:rPr S>:rPr S<:footnoteReference Sa:id S=:2 S>:footnoteReference S>:r S>:p",
        );
        context.parts.footnotes = tokens(
            "S<:footnote Sa:id S=:1 S<:p first S>:p S>:footnote \
             S<:footnote Sa:id S=:2 S<:p second S>:p S>:footnote",
        )
        .into_iter()
        .collect();

        convert_footnote_characters(&mut context).unwrap();
        assert_eq!(render(&context.parts.document), "S<:p footnote_ref:2 S>:p");

        convert_footnote_runs(&mut context).unwrap();
        assert_eq!(
            render(&context.parts.document),
            "S<:p footnote:2 S<:p second S>:p end_footnote:2 S>:p"
        );
        assert_eq!(context.parts.footnotes.len(), 14);
    }

    #[test]
    fn missing_footnote_body_keeps_reference() {
        let mut context = context("footnote_ref:9");
        convert_footnote_runs(&mut context).unwrap();
        assert_eq!(render(&context.parts.document), "footnote_ref:9");
    }

    #[test]
    fn invisible_runs() {
        let mut context = context(
            "S<:p S<:r S<:rPr S<:vanish S>:vanish S>:rPr hidden S>:r S<:r visible S>:r S>:p",
        );
        remove_invisible_text(&mut context).unwrap();
        assert_eq!(
            render(&context.parts.document),
            "S<:p S<:r visible S>:r S>:p"
        );
    }

    #[test]
    fn field_characters() {
        let mut context = context("S<:fldChar Sa:fldCharType S=:begin S>:fldChar x S<:fldChar Sa:fldCharType S=:end S>:fldChar");
        convert_field_characters(&mut context).unwrap();
        assert_eq!(render(&context.parts.document), "field_begin: x field_end:");
    }

    #[test]
    fn bookmarks() {
        let mut context = context(
            "S<:bookmarkStart Sa:id S=:0 Sa:name S=:_Ref42 S>:bookmarkStart text \
             S<:bookmarkEnd Sa:id S=:0 S>:bookmarkEnd \
             S<:bookmarkStart Sa:id S=:1 Sa:name S=:_Toc7 S>:bookmarkStart more \
             S<:bookmarkEnd Sa:id S=:1 S>:bookmarkEnd",
        );
        convert_bookmarks(&mut context).unwrap();

        assert_eq!(
            render(&context.parts.document),
            "bookmark_start:_Ref42 text bookmark_end:_Ref42 more"
        );
        assert!(context.ignored_bookmarks.contains("_Toc7"));
    }

    #[test]
    fn images() {
        let mut context = context(
            "S<:p S<:r S<:drawing S<:docPr Sa:title S=:chart S>:docPr S>:drawing S>:r S>:p \
             S<:p S<:drawing S<:docPr S>:docPr S>:drawing S>:p",
        );
        convert_images(&mut context).unwrap();
        assert_eq!(
            render(&context.parts.document),
            "image:chart S>:p S<:p image: S>:p"
        );
    }

    #[test]
    fn revision_ids() {
        let mut context = context("S<:p Sa:rsidR S=:00A1 Sa:rsidRDefault S=:00A2 Sa:other S=:x S>:p");
        remove_revision_ids(&mut context).unwrap();
        assert_eq!(render(&context.parts.document), "S<:p Sa:other S=:x S>:p");
    }

    #[test]
    fn breaks() {
        let mut context = context(
            "S<:br S>:br S<:br Sa:type S=:page S>:br \
             S<:sectPr S<:type Sa:val S=:oddPage S>:type S>:sectPr S<:sectPr S<:pgSz S>:pgSz S>:sectPr",
        );
        convert_breaks(&mut context).unwrap();
        assert_eq!(
            context.parts.document.to_vec(),
            vec![
                Token::marker("linebreak"),
                Token::marker("pagebreak"),
                Token::marker("oddsectionbreak"),
                Token::marker("sectionbreak"),
            ]
        );
    }
}
