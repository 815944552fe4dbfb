use docsplice::Token;
use docsplice_word::{
    ConversionTable,
    DocumentParts,
    ElementParts,
    PartKind,
    Renderer,
    Simplifier,
    SimplifyConfig,
    Substitutions,
    TracingDiagnostics,
    XmlElement,
};
use tracing_subscriber::EnvFilter;

fn run(text: &str) -> XmlElement {
    XmlElement::new("r").with_child(XmlElement::new("t").with_text(text))
}

fn paragraph(style: Option<&str>, runs: Vec<XmlElement>) -> XmlElement {
    let mut paragraph = XmlElement::new("p");
    if let Some(style) = style {
        paragraph = paragraph.with_child(
            XmlElement::new("pPr").with_child(XmlElement::new("pStyle").with_attribute("val", style)),
        );
    }
    paragraph.children.extend(runs);
    paragraph
}

fn sample_document() -> XmlElement {
    let body = XmlElement::new("body")
        .with_child(paragraph(Some("Title"), vec![run("Token stream rewriting")]))
        .with_child(paragraph(Some("Heading1"), vec![run("Introduction")]))
        .with_child(paragraph(
            None,
            vec![
                run("Rewriting 100% of the "),
                XmlElement::new("proofErr").with_attribute("type", "spellStart"),
                run("docu"),
                run("ment in five passes."),
            ],
        ));

    XmlElement::new("document").with_child(body)
}

fn conversions() -> ConversionTable {
    ConversionTable::new()
        .with("document", |_| Some(Token::text("\\begin{document}\n\\maketitle\n\n")))
        .with("end", |value| {
            Some(Token::text(format!("\\end{{{}}}\n", value.unwrap_or_default())))
        })
        .with("title", |value| {
            Some(Token::tagged("preamble", format!("\\title{{{}}}\n", value.unwrap_or_default())))
        })
        .with("para_style", |_| None)
        .with("eop", |_| Some(Token::text("\n\n")))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let source = ElementParts::new().with_part(PartKind::Document, sample_document());
    let parts = match DocumentParts::load(&source) {
        Ok(parts) => parts,
        Err(error) => {
            eprintln!("failed to load document: {}", error);
            return;
        }
    };

    let mut simplifier = Simplifier::new(parts, SimplifyConfig::default());
    if let Err(error) = simplifier.run() {
        eprintln!("failed to simplify document: {}", error);
        return;
    }

    for token in simplifier.document() {
        println!("{}", token);
    }

    let mut prose = Substitutions::new();
    prose.push("%", "\\%");

    let mut renderer = Renderer::new(conversions()).with_prose(prose);
    let rendered = renderer.render(simplifier.document(), &mut TracingDiagnostics);
    for key in rendered.keys() {
        println!("==> {} <==", key);
        println!("{}", rendered.get(key).unwrap_or_default());
    }
}
