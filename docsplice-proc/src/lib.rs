use proc_macro::TokenStream;
use syn::parse_macro_input;

extern crate proc_macro;

mod macro_pattern;

/// Compile a token pattern and generate an instance of <a href="struct.BorrowedPattern.html">BorrowedPattern</a> at compile time.
/// Syntax errors are reported at the offending element of the pattern string.
/// An overview of the pattern syntax can be found here: <a href="index.html">docsplice</a>.
///
/// # Example
/// ```
/// # use docsplice_core as docsplice;
/// # use docsplice_core::*;
/// # use docsplice_proc::*;
/// static PROOFING_ERROR: BorrowedPattern<'static> = pattern!("S<:proofErr ! S>:proofErr");
/// ```
#[proc_macro]
pub fn pattern(item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item);

    macro_pattern::pattern(item)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
