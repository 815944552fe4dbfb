use core::fmt::Debug;

use crate::Element;

/// A compiled pattern is an ordered list of [Element]s and optionally the index
/// of the literal element whose matched position is reported as the mark.
pub trait TokenPattern: Send + Sync + Debug {
    /// Retrieves the elements of this pattern.
    fn elements(&self) -> &[Element<'_>];

    /// Index into [TokenPattern::elements] of the marked literal element.
    fn mark(&self) -> Option<usize>;

    /// Returns the minimum number of tokens a match consumes.
    fn min_len(&self) -> usize {
        self.elements()
            .iter()
            .filter(|element| !element.is_skip())
            .count()
    }
}

/// An implementation of the [TokenPattern] interface that borrows its elements.
///
/// This struct is primarily used alongside the `pattern!` macro to embed patterns
/// which have been compiled at build time.
#[derive(Debug, Clone, Copy)]
pub struct BorrowedPattern<'a> {
    elements: &'a [Element<'a>],
    mark: Option<usize>,
}

impl<'a> BorrowedPattern<'a> {
    pub const fn new_const(elements: &'a [Element<'a>], mark: Option<usize>) -> Self {
        Self { elements, mark }
    }
}

impl TokenPattern for BorrowedPattern<'_> {
    fn elements(&self) -> &[Element<'_>] {
        self.elements
    }

    fn mark(&self) -> Option<usize> {
        self.mark
    }
}

/// An implementation of the [TokenPattern] interface that owns its element list.
/// Field texts are borrowed from the pattern source.
///
/// This struct is primarily used with [crate::compiler::compile_pattern] to compile patterns at runtime.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OwnedPattern<'a> {
    elements: Vec<Element<'a>>,
    mark: Option<usize>,
}

impl<'a> OwnedPattern<'a> {
    pub fn new(elements: Vec<Element<'a>>, mark: Option<usize>) -> Self {
        Self { elements, mark }
    }
}

impl TokenPattern for OwnedPattern<'_> {
    fn elements(&self) -> &[Element<'_>] {
        &self.elements
    }

    fn mark(&self) -> Option<usize> {
        self.mark
    }
}
