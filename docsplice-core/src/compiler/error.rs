use core::{
    fmt::{
        self,
        Debug,
        Display,
    },
    ops::Range,
};

/// A PositionedError representing an error that is associated with a specific position in the given pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedError<E: Debug + PartialEq> {
    position: Range<usize>,
    inner: E,
}

impl<E: Debug + PartialEq> PositionedError<E> {
    pub fn new(position: Range<usize>, inner: E) -> Self {
        Self { position, inner }
    }

    pub fn position(&self) -> &Range<usize> {
        &self.position
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Debug + PartialEq + Display> Display for PositionedError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (at {}..{})",
            self.inner, self.position.start, self.position.end
        )
    }
}

impl<E: std::error::Error + PartialEq + 'static> std::error::Error for PositionedError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}
