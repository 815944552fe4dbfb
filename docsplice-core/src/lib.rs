pub mod compiler;

mod token;
pub use token::{
    Token,
    WILDCARD,
};

mod sequence;
pub use sequence::{
    Iter,
    Position,
    Positions,
    Sequence,
    SequenceError,
};

mod element;
pub use element::{
    Element,
    Field,
    Literal,
};

mod pattern;
pub use pattern::{
    BorrowedPattern,
    OwnedPattern,
    TokenPattern,
};

mod matcher;
pub use matcher::{
    find_sequence,
    Match,
};

mod find;
pub use find::Finder;

mod replace;
pub use replace::replace_sequence;

mod pipeline;
pub use pipeline::{
    Pipeline,
    Rule,
    Stage,
};
