mod common;

use common::{
    conversions,
    document,
    element,
    field,
    paragraph,
    styled_paragraph,
    text_run,
};
use docsplice::Token;
use docsplice_word::{
    CollectedDiagnostics,
    Diagnostic,
    DocumentParts,
    ElementParts,
    PartKind,
    RenderConfig,
    Renderer,
    Simplifier,
    SimplifyConfig,
    Substitutions,
};

#[test]
fn figure_is_written_to_its_own_output() {
    let mut caption = vec![
        element("bookmarkStart")
            .with_attribute("id", "0")
            .with_attribute("name", "_Ref100"),
        text_run("Figure "),
    ];
    caption.extend(field(" SEQ Figure ", "1"));
    caption.push(element("bookmarkEnd").with_attribute("id", "0"));
    caption.push(text_run(": Parser pipeline overview"));

    let image = element("r").with_child(
        element("drawing").with_child(element("docPr").with_attribute("title", "Pipeline")),
    );

    let mut reference = vec![text_run("See ")];
    reference.extend(field(" REF _Ref100 \\h ", "Figure 1"));

    let root = document(vec![
        styled_paragraph("Caption", caption),
        paragraph(vec![image]),
        paragraph(reference),
    ]);

    let parts = DocumentParts::load(&ElementParts::new().with_part(PartKind::Document, root)).unwrap();
    let mut simplifier = Simplifier::new(parts, SimplifyConfig::default());
    simplifier.run_all().unwrap();

    let mut diagnostics = CollectedDiagnostics::new();
    let rendered = Renderer::new(conversions()).render(simplifier.document(), &mut diagnostics);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.entries());
    assert_eq!(
        rendered.document(),
        "\n% \\begin{figure}{Parser pipeline overview}\n\\input{figure_Ref100.tex}\nSee \\cref{Ref100}\n\n"
    );
    assert_eq!(
        rendered.get("figure_Ref100.tex"),
        Some("\\begin{figure}{Parser pipeline overview}{Ref100}\n\n\\includegraphics{Pipeline}\\end{figure}\n")
    );
}

#[test]
fn footnotes_and_lists() {
    let tokens = vec![
        Token::marker("document"),
        Token::text("Text"),
        Token::tagged("footnote", "2"),
        Token::text("Note"),
        Token::tagged("end_footnote", "2"),
        Token::marker("eop"),
        Token::tagged("list", "bullet"),
        Token::marker("item"),
        Token::text("one"),
        Token::marker("eop"),
        Token::tagged("end_list", "bullet"),
        Token::tagged("end", "document"),
    ];

    let mut diagnostics = CollectedDiagnostics::new();
    let rendered = Renderer::new(conversions()).render(&tokens, &mut diagnostics);

    assert_eq!(
        rendered.document(),
        "Text\\footnote{Note}\n\n\\begin{itemize}\n\\item one\n\n\\end{itemize}\n"
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn substitutions_from_tables() {
    let prose = Substitutions::parse("0x2013\t--\n%\t\\%\n").unwrap();
    let formula = Substitutions::parse("0x3B1\t\\alpha \n").unwrap();

    let tokens = vec![
        Token::text("50% of 1\u{2013}2"),
        Token::tagged("math_para", "\u{3b1}"),
        Token::marker("eop"),
        Token::text("next"),
    ];

    let mut diagnostics = CollectedDiagnostics::new();
    let rendered = Renderer::new(conversions())
        .with_prose(prose)
        .with_formula(formula)
        .render(&tokens, &mut diagnostics);

    assert_eq!(rendered.document(), "50\\% of 1--2$$\\alpha $$next");
}

#[test]
fn error_tokens_are_diagnostics() {
    let tokens = vec![
        Token::text("before "),
        Token::tagged("error", "Unresolved url reference rId9"),
        Token::tagged("printindex", ""),
    ];

    let mut diagnostics = CollectedDiagnostics::new();
    let config = RenderConfig {
        document_key: "thesis.tex".to_string(),
        ..Default::default()
    };
    let rendered = Renderer::new(conversions())
        .with_config(config)
        .render(&tokens, &mut diagnostics);

    assert_eq!(rendered.get("thesis.tex"), Some("before "));
    assert_eq!(
        diagnostics.entries(),
        vec![
            Diagnostic::ErrorToken {
                message: "Unresolved url reference rId9".to_string()
            },
            Diagnostic::UnhandledKind {
                kind: "printindex".to_string()
            },
        ]
    );
}
