#![allow(dead_code)]

use docsplice::{
    Sequence,
    Token,
};
use docsplice_word::{
    ConversionTable,
    XmlElement,
};

pub fn element(name: &str) -> XmlElement {
    XmlElement::new(name)
}

pub fn with_children(mut parent: XmlElement, children: Vec<XmlElement>) -> XmlElement {
    parent.children.extend(children);
    parent
}

pub fn text_run(text: &str) -> XmlElement {
    element("r").with_child(element("t").with_text(text))
}

pub fn paragraph(children: Vec<XmlElement>) -> XmlElement {
    with_children(element("p"), children)
}

pub fn styled_paragraph(style: &str, children: Vec<XmlElement>) -> XmlElement {
    let properties = element("pPr").with_child(element("pStyle").with_attribute("val", style));
    with_children(element("p").with_child(properties), children)
}

/// `document > body > paragraphs`
pub fn document(paragraphs: Vec<XmlElement>) -> XmlElement {
    element("document").with_child(with_children(element("body"), paragraphs))
}

fn field_character(field_type: &str) -> XmlElement {
    element("r").with_child(element("fldChar").with_attribute("fldCharType", field_type))
}

/// The runs of a complex field showing `display` for `instruction`.
pub fn field(instruction: &str, display: &str) -> Vec<XmlElement> {
    vec![
        field_character("begin"),
        element("r").with_child(element("instrText").with_text(instruction)),
        field_character("separate"),
        text_run(display),
        field_character("end"),
    ]
}

/// `kind:value` words joined by blanks, a blank inside a value is written as `~`.
pub fn render(sequence: &Sequence) -> String {
    sequence
        .iter()
        .map(|token| token.to_string().replace(' ', "~"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn argument(value: Option<&str>) -> &str {
    value.unwrap_or_default().trim_matches(['_', ' ', '.'])
}

/// A small LaTeX flavoured table covering the kinds produced by the simplifier tests.
pub fn conversions() -> ConversionTable {
    ConversionTable::new()
        .with("document", |_| None)
        .with("end", |_| None)
        .with("eop", |_| Some(Token::text("\n\n")))
        .with("ref", |value| Some(Token::text(format!("\\cref{{{}}}", argument(value)))))
        .with("label", |value| Some(Token::tagged("label", argument(value))))
        .with("float", |value| {
            let kind = value.unwrap_or_default();
            Some(Token::tagged(format!("float_{}", kind), format!("\\begin{{{}}}{{", kind)))
        })
        .with("end_caption", |_| Some(Token::text("}")))
        .with("end_float", |value| {
            Some(Token::tagged("end_float", format!("\\end{{{}}}\n", value.unwrap_or_default())))
        })
        .with("image", |value| {
            Some(Token::text(format!("\\includegraphics{{{}}}", value.unwrap_or_default())))
        })
        .with("footnote", |_| Some(Token::text("\\footnote{")))
        .with("end_footnote", |_| Some(Token::text("}")))
        .with("list", |value| {
            Some(Token::text(format!("\\begin{{{}}}\n", list_environment(value))))
        })
        .with("end_list", |value| {
            Some(Token::text(format!("\\end{{{}}}\n", list_environment(value))))
        })
        .with("item", |_| Some(Token::text("\\item ")))
        .with("hyperlink", |value| {
            Some(Token::text(format!("\\url{{{}}}", value.unwrap_or_default())))
        })
        .with("error", |value| Some(Token::tagged("error", value.unwrap_or_default())))
        .with("math_para", |value| {
            value.map(|value| Token::text(format!("$${}$$\\wxnobreak", value)))
        })
}

fn list_environment(value: Option<&str>) -> &'static str {
    match value {
        Some("bullet") => "itemize",
        _ => "enumerate",
    }
}
