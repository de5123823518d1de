pub mod ast;
mod display;
mod expr;
pub mod parser;
pub mod statement_list;
pub mod tokenizer;

pub use parser::{parse, parse_statement, Parser, ParserConfig};
pub use statement_list::StatementList;
