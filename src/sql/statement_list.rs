use std::fmt;

use crate::{error::SyntaxError, sql::ast::Statement};

/// Outcome of parsing one input: either every statement it contained, or
/// the first syntax error.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementList {
    statements: Vec<Statement>,
    diagnostic: Option<SyntaxError>,
}

impl StatementList {
    pub(crate) fn valid(statements: Vec<Statement>) -> Self {
        debug_assert!(!statements.is_empty());
        Self {
            statements,
            diagnostic: None,
        }
    }

    pub(crate) fn invalid(diagnostic: SyntaxError) -> Self {
        Self {
            statements: Vec::new(),
            diagnostic: Some(diagnostic),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.diagnostic.is_none()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    /// # Panics
    ///
    /// Panics if the parse failed or `index` is out of range.
    pub fn statement_at(&self, index: usize) -> &Statement {
        if let Some(diagnostic) = &self.diagnostic {
            panic!("statement_at() called on an invalid parse result: {diagnostic}");
        }
        &self.statements[index]
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn diagnostic(&self) -> Option<&SyntaxError> {
        self.diagnostic.as_ref()
    }

    pub fn into_result(self) -> Result<Vec<Statement>, SyntaxError> {
        match self.diagnostic {
            Some(diagnostic) => Err(diagnostic),
            None => Ok(self.statements),
        }
    }

    /// Human readable dump of the whole tree, one node per line.
    ///
    /// Meant for logs and the shell; the format is not stable and cannot be
    /// parsed back.
    pub fn summary(&self) -> String {
        let mut dump = super::display::Dump::default();
        match &self.diagnostic {
            Some(diagnostic) => dump.line(format!("invalid: {diagnostic}")),
            None => {
                dump.line(format!("statements: {}", self.statements.len()));
                dump.nested(|d| {
                    for statement in &self.statements {
                        d.statement(statement);
                    }
                });
            }
        }
        dump.finish()
    }
}

impl fmt::Display for StatementList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{ast::StatementKind, parser::parse};

    #[test]
    fn valid_result() {
        let list = parse("select * from foo; delete from bar");
        assert!(list.is_valid());
        assert_eq!(list.statement_count(), 2);
        assert_eq!(list.statement_at(1).kind(), StatementKind::Delete);
        assert_eq!(list.diagnostic(), None);
        assert_eq!(list.into_result().map(|s| s.len()), Ok(2));
    }

    #[test]
    fn one_error_invalidates_everything() {
        let list = parse("select * from foo;\nselect * frm bar;");
        assert!(!list.is_valid());
        assert_eq!(list.statement_count(), 0);
        assert!(list.statements().is_empty());
        let diagnostic = list.diagnostic().unwrap();
        assert_eq!((diagnostic.line, diagnostic.column), (2, 10));
        assert!(list.into_result().is_err());
    }

    #[test]
    #[should_panic(expected = "invalid parse result")]
    fn statement_at_on_invalid_result_panics() {
        parse("selec * from foo").statement_at(0);
    }

    #[test]
    #[should_panic]
    fn statement_at_out_of_range_panics() {
        parse("select * from foo").statement_at(1);
    }

    #[test]
    fn summary_of_invalid_result() {
        let list = parse("select * from");
        assert_eq!(
            list.summary(),
            "invalid: 1:14: syntax error at end of input, expected an identifier\n"
        );
        assert_eq!(list.to_string(), list.summary());
    }
}
