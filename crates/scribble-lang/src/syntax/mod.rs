pub mod ast;
pub mod line;
pub mod parser;
pub mod token;
