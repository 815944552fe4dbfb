/*!
Pattern based rewriting of token streams.

A [Sequence] holds tokens made of an optional kind and an optional value. Patterns
written in a small text language locate runs of tokens which are then rewritten in
place through stable [Position] handles, either with [replace_sequence] or by editing
the sequence while iterating with a [Finder]. Rules are grouped into stages of a
[Pipeline] which can be executed incrementally.

*/
#![doc = include_str!("../../GRAMMAR.md")]
pub use docsplice_core::*;
pub use docsplice_proc::pattern;
