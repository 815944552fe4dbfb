mod error;
pub use error::PositionedError;

mod lexer;
use lexer::{
    Lexeme,
    Lexer,
};

mod parser;
pub use parser::{
    compile_pattern,
    compile_replacement,
    ParseError,
};
