use thiserror::Error;

/// Failure to split the input into tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character: {ch:?}")]
    UnexpectedChar { ch: char, line: u32, column: u32 },

    #[error("unterminated string literal")]
    UnterminatedString { line: u32, column: u32 },

    #[error("unterminated quoted identifier")]
    UnterminatedIdentifier { line: u32, column: u32 },

    #[error("unterminated block comment")]
    UnterminatedComment { line: u32, column: u32 },
}

impl LexError {
    /// Position (line, column) where the offending construct starts.
    pub fn position(&self) -> (u32, u32) {
        match *self {
            LexError::UnexpectedChar { line, column, .. }
            | LexError::UnterminatedString { line, column }
            | LexError::UnterminatedIdentifier { line, column }
            | LexError::UnterminatedComment { line, column } => (line, column),
        }
    }
}

/// The single diagnostic a failed parse produces.
///
/// Lexical failures are folded into this type so callers only ever deal
/// with one error shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl From<LexError> for SyntaxError {
    fn from(err: LexError) -> Self {
        let (line, column) = err.position();
        SyntaxError::new(err.to_string(), line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_keeps_position() {
        let err: SyntaxError = LexError::UnexpectedChar {
            ch: '@',
            line: 2,
            column: 7,
        }
        .into();
        assert_eq!(err, SyntaxError::new("unexpected character: '@'", 2, 7));
        assert_eq!(err.to_string(), "2:7: unexpected character: '@'");
    }
}
