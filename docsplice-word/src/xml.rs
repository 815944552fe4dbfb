use std::fmt::Write;

use docsplice::Token;

/// Local name of the formula element which is captured as one token.
const FORMULA_ELEMENT: &str = "oMath";

/// An in-memory markup element as produced by an upstream document reader.
/// Names are local names without namespace prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Text content, only considered for elements without children.
    pub text: Option<String>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Serialize the element and its subtree as markup.
    pub fn to_markup(&self) -> String {
        let mut output = String::new();
        self.write_markup(&mut output);
        output
    }

    fn write_markup(&self, output: &mut String) {
        let _ = write!(output, "<{}", self.name);
        for (name, value) in &self.attributes {
            let _ = write!(output, " {}=\"{}\"", name, escape(value));
        }

        let text = self.text.as_deref().filter(|_| self.children.is_empty());
        if self.children.is_empty() && text.is_none() {
            output.push_str("/>");
            return;
        }

        output.push('>');
        for child in &self.children {
            child.write_markup(output);
        }
        if let Some(text) = text {
            output.push_str(&escape(text));
        }

        let _ = write!(output, "</{}>", self.name);
    }
}

fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for value in text.chars() {
        match value {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            value => result.push(value),
        }
    }
    result
}

/// Flatten an element tree into its token stream.
///
/// Every element yields `S<:name`, then `Sa:attribute S=:value` per attribute,
/// then its children, then its text (if it has no children) and finally `S>:name`.
/// A text consisting of `*` alone is emitted as `\*` so it is not taken as wildcard.
/// Formula elements become a single `Smath` token carrying their markup.
pub fn flatten(root: &XmlElement) -> Vec<Token> {
    let mut buffer = Vec::new();
    flatten_into(root, &mut buffer);
    buffer
}

fn flatten_into(element: &XmlElement, buffer: &mut Vec<Token>) {
    if element.name == FORMULA_ELEMENT {
        buffer.push(Token::tagged("Smath", element.to_markup()));
        return;
    }

    buffer.push(Token::tagged("S<", element.name.as_str()));
    for (name, value) in &element.attributes {
        buffer.push(Token::tagged("Sa", name.as_str()));
        buffer.push(Token::new(Some("S=".to_string()), Some(value.clone())));
    }

    for child in &element.children {
        flatten_into(child, buffer);
    }

    if element.children.is_empty() {
        match element.text.as_deref() {
            None | Some("") => {}
            Some("*") => buffer.push(Token::text("\\*")),
            Some(text) => buffer.push(Token::text(text)),
        }
    }

    buffer.push(Token::tagged("S>", element.name.as_str()));
}

#[cfg(test)]
mod test {
    use docsplice::Token;

    use super::{
        flatten,
        XmlElement,
    };

    #[test]
    fn flatten_order() {
        let run = XmlElement::new("r")
            .with_attribute("rsidR", "00AB")
            .with_child(XmlElement::new("t").with_text("Hello"));

        assert_eq!(
            flatten(&run),
            vec![
                Token::tagged("S<", "r"),
                Token::tagged("Sa", "rsidR"),
                Token::tagged("S=", "00AB"),
                Token::tagged("S<", "t"),
                Token::text("Hello"),
                Token::tagged("S>", "t"),
                Token::tagged("S>", "r"),
            ]
        );
    }

    #[test]
    fn wildcard_text_is_escaped() {
        let text = XmlElement::new("t").with_text("*");
        assert_eq!(flatten(&text)[1], Token::text("\\*"));
    }

    #[test]
    fn formula_is_captured_whole() {
        let formula = XmlElement::new("oMath").with_child(
            XmlElement::new("r").with_child(XmlElement::new("t").with_text("a<b")),
        );
        let paragraph = XmlElement::new("p").with_child(formula);

        assert_eq!(
            flatten(&paragraph),
            vec![
                Token::tagged("S<", "p"),
                Token::tagged("Smath", "<oMath><r><t>a&lt;b</t></r></oMath>"),
                Token::tagged("S>", "p"),
            ]
        );
    }

    #[test]
    fn empty_elements_serialize_self_closing() {
        let element = XmlElement::new("tab").with_attribute("val", "a\"b");
        assert_eq!(element.to_markup(), "<tab val=\"a&quot;b\"/>");
    }
}
