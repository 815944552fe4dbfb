use std::fmt::{
    self,
    Write,
};

use docsplice_core::{
    compiler,
    Element,
    Field,
    Literal,
    TokenPattern,
};
use proc_macro2::TokenStream;
use quote::ToTokens;
use syn::{
    parse2,
    Error,
    Expr,
    LitStr,
    Result,
};

fn emit_field(output: &mut dyn Write, field: &Field<'_>) -> fmt::Result {
    match field {
        Field::Empty => write!(output, "docsplice::Field::Empty"),
        Field::Any => write!(output, "docsplice::Field::Any"),
        Field::Exact(value) => write!(output, "docsplice::Field::Exact({:?})", value),
    }
}

fn emit_literal(output: &mut dyn Write, literal: &Literal<'_>) -> fmt::Result {
    write!(output, "docsplice::Literal::new(")?;
    emit_field(output, &literal.kind)?;
    write!(output, ", ")?;
    emit_field(output, &literal.value)?;
    write!(output, ")")
}

fn emit_element(output: &mut dyn Write, element: &Element<'_>) -> fmt::Result {
    match element {
        Element::Literal(literal) => {
            write!(output, "docsplice::Element::Literal(")?;
            emit_literal(output, literal)?;
            write!(output, ")")
        }
        Element::Skip { abort: None } => write!(output, "docsplice::Element::Skip {{ abort: None }}"),
        Element::Skip {
            abort: Some(literal),
        } => {
            write!(output, "docsplice::Element::Skip {{ abort: Some(")?;
            emit_literal(output, literal)?;
            write!(output, ") }}")
        }
    }
}

fn pattern_to_const_str(pattern: &dyn TokenPattern) -> std::result::Result<String, fmt::Error> {
    let mut result = String::with_capacity(1024);

    write!(&mut result, "docsplice::BorrowedPattern::new_const(&[")?;
    for (index, element) in pattern.elements().iter().enumerate() {
        if index > 0 {
            write!(&mut result, ", ")?;
        }

        emit_element(&mut result, element)?;
    }
    write!(&mut result, "], ")?;

    match pattern.mark() {
        Some(mark) => write!(&mut result, "Some({})", mark)?,
        None => write!(&mut result, "None")?,
    }
    write!(&mut result, ")")?;

    Ok(result)
}

pub fn pattern(item: TokenStream) -> Result<TokenStream> {
    let pattern_str = parse2::<LitStr>(item)?;
    let source = pattern_str.value();
    let pattern = match compiler::compile_pattern(&source) {
        Ok(result) => result,
        Err(error) => {
            let error_span = pattern_str
                .token()
                .subspan(error.position().start + 1..error.position().end + 1)
                .unwrap_or(pattern_str.span());
            return Err(Error::new(error_span, format!("{}", error.inner())));
        }
    };

    let pattern = pattern_to_const_str(&pattern)
        .map_err(|_| Error::new(pattern_str.span(), "failed to emit the pattern"))?;
    let pattern = syn::parse_str::<Expr>(&pattern)?;
    Ok(pattern.to_token_stream())
}

#[cfg(test)]
mod test {
    use docsplice_core::compiler;

    use super::pattern_to_const_str;

    #[test]
    fn emits_const_constructor() {
        let pattern = compiler::compile_pattern("S<:r !S>:r | :* eop:").unwrap();
        assert_eq!(
            pattern_to_const_str(&pattern).unwrap(),
            concat!(
                "docsplice::BorrowedPattern::new_const(&[",
                "docsplice::Element::Literal(docsplice::Literal::new(docsplice::Field::Exact(\"S<\"), docsplice::Field::Exact(\"r\"))), ",
                "docsplice::Element::Skip { abort: Some(docsplice::Literal::new(docsplice::Field::Exact(\"S>\"), docsplice::Field::Exact(\"r\"))) }, ",
                "docsplice::Element::Literal(docsplice::Literal::new(docsplice::Field::Empty, docsplice::Field::Any)), ",
                "docsplice::Element::Literal(docsplice::Literal::new(docsplice::Field::Exact(\"eop\"), docsplice::Field::Empty))",
                "], Some(2))"
            )
        );
    }
}
