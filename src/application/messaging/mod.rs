//! Message handling - parsing raw chat text

pub mod parser;

pub use parser::MessageParser;
