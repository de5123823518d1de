use std::{fmt, iter::Peekable, str::CharIndices};

use crate::error::LexError;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TokenKind {
    // keywords
    Select,
    Distinct,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    Asc,
    Desc,
    Limit,
    Offset,
    As,
    And,
    Or,
    Not,
    Null,
    True,
    False,
    Is,
    In,
    Like,
    Between,
    Exists,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    On,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Create,
    Table,
    Index,
    Unique,
    Primary,
    Key,
    Default,
    If,
    Drop,
    Begin,
    Transaction,
    Commit,
    Rollback,

    // operators
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Concat,

    // punctuation
    LPar,
    RPar,
    Comma,
    Dot,
    SemiColon,

    Identifier(String),
    String(String),
    Number(String),
    Eof,
}

/// Coarse classification of a token, independent of its exact value.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TokenCategory {
    Keyword,
    Identifier,
    StringLiteral,
    NumericLiteral,
    Operator,
    Punctuation,
    End,
}

impl TokenKind {
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            TokenKind::Identifier(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn category(&self) -> TokenCategory {
        use TokenKind::*;
        match self {
            Identifier(_) => TokenCategory::Identifier,
            String(_) => TokenCategory::StringLiteral,
            Number(_) => TokenCategory::NumericLiteral,
            Eq | NotEq | Lt | LtEq | Gt | GtEq | Plus | Minus | Star | Slash | Percent
            | Concat => TokenCategory::Operator,
            LPar | RPar | Comma | Dot | SemiColon => TokenCategory::Punctuation,
            Eof => TokenCategory::End,
            _ => TokenCategory::Keyword,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            TokenKind::Eq => "=",
            TokenKind::NotEq => "<>",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Concat => "||",
            TokenKind::LPar => "(",
            TokenKind::RPar => ")",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::SemiColon => ";",
            TokenKind::Identifier(_) => return f.write_str("identifier"),
            TokenKind::String(_) => return f.write_str("string literal"),
            TokenKind::Number(_) => return f.write_str("number"),
            TokenKind::Eof => return f.write_str("end of input"),
            keyword => return write!(f, "{}", format!("{keyword:?}").to_uppercase()),
        };
        write!(f, "\"{symbol}\"")
    }
}

fn keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match ident {
        "select" => Select,
        "distinct" => Distinct,
        "from" => From,
        "where" => Where,
        "group" => Group,
        "by" => By,
        "having" => Having,
        "order" => Order,
        "asc" => Asc,
        "desc" => Desc,
        "limit" => Limit,
        "offset" => Offset,
        "as" => As,
        "and" => And,
        "or" => Or,
        "not" => Not,
        "null" => Null,
        "true" => True,
        "false" => False,
        "is" => Is,
        "in" => In,
        "like" => Like,
        "between" => Between,
        "exists" => Exists,
        "join" => Join,
        "inner" => Inner,
        "left" => Left,
        "right" => Right,
        "full" => Full,
        "outer" => Outer,
        "on" => On,
        "insert" => Insert,
        "into" => Into,
        "values" => Values,
        "update" => Update,
        "set" => Set,
        "delete" => Delete,
        "create" => Create,
        "table" => Table,
        "index" => Index,
        "unique" => Unique,
        "primary" => Primary,
        "key" => Key,
        "default" => Default,
        "if" => If,
        "drop" => Drop,
        "begin" => Begin,
        "transaction" => Transaction,
        "commit" => Commit,
        "rollback" => Rollback,
        _ => return None,
    };
    Some(kind)
}

/// A lexeme tagged with the 1-based position of its first character.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
}

struct Scanner<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: u32,
    column: u32,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.input.len(), |&(i, _)| i)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n).map(|(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn bump_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match (self.peek(), self.peek_nth(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('-'), Some('-')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => continue,
                            None => return Err(LexError::UnterminatedComment { line, column }),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn string(&mut self, line: u32, column: u32) -> Result<String, LexError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\'') if self.bump_if('\'') => value.push('\''),
                Some('\'') => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(LexError::UnterminatedString { line, column }),
            }
        }
    }

    fn quoted_identifier(&mut self, line: u32, column: u32) -> Result<String, LexError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') if self.bump_if('"') => value.push('"'),
                Some('"') => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(LexError::UnterminatedIdentifier { line, column }),
            }
        }
    }

    fn digits(&mut self, number: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            self.bump();
            number.push(c);
        }
    }

    fn number(&mut self, first: char) -> String {
        let mut number = first.to_string();
        self.digits(&mut number);

        if first != '.' && self.peek() == Some('.') {
            self.bump();
            number.push('.');
            self.digits(&mut number);
        }

        let exponent = match (self.peek(), self.peek_nth(1), self.peek_nth(2)) {
            (Some('e' | 'E'), Some(d), _) if d.is_ascii_digit() => true,
            (Some('e' | 'E'), Some('+' | '-'), Some(d)) if d.is_ascii_digit() => true,
            _ => false,
        };
        if exponent {
            number.extend(self.bump());
            if let Some(sign) = self.peek().filter(|c| matches!(c, '+' | '-')) {
                self.bump();
                number.push(sign);
            }
            self.digits(&mut number);
        }

        number
    }

    fn word(&mut self, first: char) -> TokenKind {
        let mut ident = first.to_lowercase().to_string();
        while let Some(c) = self.peek().filter(|&c| c.is_alphanumeric() || c == '_') {
            self.bump();
            ident.extend(c.to_lowercase());
        }

        keyword(&ident).unwrap_or(TokenKind::Identifier(ident))
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut scanner = Scanner::new(input);
    let mut tokens = Vec::new();

    loop {
        scanner.skip_trivia()?;

        let (line, column) = (scanner.line, scanner.column);
        let start = scanner.offset();

        let Some(c) = scanner.bump() else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line,
                column,
            });
            break;
        };

        let kind = match c {
            '(' => TokenKind::LPar,
            ')' => TokenKind::RPar,
            '*' => TokenKind::Star,
            ',' => TokenKind::Comma,
            ';' => TokenKind::SemiColon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Eq,
            '<' if scanner.bump_if('=') => TokenKind::LtEq,
            '<' if scanner.bump_if('>') => TokenKind::NotEq,
            '<' => TokenKind::Lt,
            '>' if scanner.bump_if('=') => TokenKind::GtEq,
            '>' => TokenKind::Gt,
            '!' if scanner.bump_if('=') => TokenKind::NotEq,
            '|' if scanner.bump_if('|') => TokenKind::Concat,
            '.' if scanner.peek().is_some_and(|c| c.is_ascii_digit()) => {
                TokenKind::Number(scanner.number(c))
            }
            '.' => TokenKind::Dot,
            '\'' => TokenKind::String(scanner.string(line, column)?),
            '"' => TokenKind::Identifier(scanner.quoted_identifier(line, column)?),
            c if c.is_ascii_digit() => TokenKind::Number(scanner.number(c)),
            c if c.is_alphabetic() || c == '_' => scanner.word(c),
            ch => return Err(LexError::UnexpectedChar { ch, line, column }),
        };

        let text = input[start..scanner.offset()].to_string();
        tokens.push(Token {
            kind,
            text,
            line,
            column,
        });
    }

    tracing::trace!(tokens = tokens.len(), "tokenized sql input");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenize_select() {
        let input = "SeLect *, col as c FroM TableName_1;";
        let expected = vec![
            TokenKind::Select,
            TokenKind::Star,
            TokenKind::Comma,
            TokenKind::Identifier("col".to_string()),
            TokenKind::As,
            TokenKind::Identifier("c".to_string()),
            TokenKind::From,
            TokenKind::Identifier("tablename_1".to_string()),
            TokenKind::SemiColon,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn tokenize_literals_and_operators() {
        let input = "'it''s' 42 3.5 .5 1e3 a<>b c!=d e<=f g>=h i||j";
        let expected = vec![
            TokenKind::String("it's".to_string()),
            TokenKind::Number("42".to_string()),
            TokenKind::Number("3.5".to_string()),
            TokenKind::Number(".5".to_string()),
            TokenKind::Number("1e3".to_string()),
            TokenKind::Identifier("a".to_string()),
            TokenKind::NotEq,
            TokenKind::Identifier("b".to_string()),
            TokenKind::Identifier("c".to_string()),
            TokenKind::NotEq,
            TokenKind::Identifier("d".to_string()),
            TokenKind::Identifier("e".to_string()),
            TokenKind::LtEq,
            TokenKind::Identifier("f".to_string()),
            TokenKind::Identifier("g".to_string()),
            TokenKind::GtEq,
            TokenKind::Identifier("h".to_string()),
            TokenKind::Identifier("i".to_string()),
            TokenKind::Concat,
            TokenKind::Identifier("j".to_string()),
            TokenKind::Eof,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn quoted_identifier_keeps_case() {
        assert_eq!(
            kinds("\"MyTable\".id"),
            vec![
                TokenKind::Identifier("MyTable".to_string()),
                TokenKind::Dot,
                TokenKind::Identifier("id".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn positions_advance_through_comments_and_literals() {
        let input = "-- header\nselect 'a\nb' /* x\n */ from t";
        let tokens = tokenize(input).unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(positions, vec![(2, 1), (2, 8), (4, 5), (4, 10), (4, 11)]);
        assert_eq!(tokens[1].text, "'a\nb'");
    }

    #[test]
    fn token_categories() {
        let categories: Vec<_> = tokenize("select x, 'y', 1 + 2")
            .unwrap()
            .iter()
            .map(|t| t.kind.category())
            .collect();
        assert_eq!(
            categories,
            vec![
                TokenCategory::Keyword,
                TokenCategory::Identifier,
                TokenCategory::Punctuation,
                TokenCategory::StringLiteral,
                TokenCategory::Punctuation,
                TokenCategory::NumericLiteral,
                TokenCategory::Operator,
                TokenCategory::NumericLiteral,
                TokenCategory::End,
            ]
        );
    }

    #[test]
    fn tokenize_invalid_char() {
        let input = "select @ from table;";
        assert_eq!(
            tokenize(input),
            Err(LexError::UnexpectedChar {
                ch: '@',
                line: 1,
                column: 8
            })
        );
    }

    #[test]
    fn tokenize_unterminated() {
        assert_eq!(
            tokenize("select 'abc"),
            Err(LexError::UnterminatedString { line: 1, column: 8 })
        );
        assert_eq!(
            tokenize("select /* abc"),
            Err(LexError::UnterminatedComment { line: 1, column: 8 })
        );
        assert!(tokenize("select \"abc").is_err());
    }
}
