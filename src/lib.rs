//! SQL front end: turns query text into a typed statement tree, or a
//! positioned syntax error.
//!
//! ```
//! let list = sqltree::parse("SELECT * FROM foo WHERE id = 1;");
//! assert!(list.is_valid());
//! assert_eq!(list.statement_count(), 1);
//! ```

pub mod error;
pub mod sql;

pub use error::{LexError, SyntaxError};
pub use sql::{ast, parse, parse_statement, Parser, ParserConfig, StatementList};
