use crate::{
    error::SyntaxError,
    sql::{
        ast,
        statement_list::StatementList,
        tokenizer::{self, Token, TokenKind},
    },
};

const DEFAULT_MAX_DEPTH: usize = 128;

/// Knobs for a [`Parser`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ParserConfig {
    /// How deep expressions and subqueries may nest before the parse is
    /// rejected with a syntax error.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Entry point for turning SQL text into statements.
///
/// Holds nothing but its configuration, so it can be copied freely and
/// shared between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    pub fn parse(&self, input: &str) -> StatementList {
        match self.parse_statements(input) {
            Ok(statements) => {
                tracing::debug!(statements = statements.len(), "parsed sql input");
                StatementList::valid(statements)
            }
            Err(err) => {
                tracing::debug!(
                    line = err.line,
                    column = err.column,
                    message = %err.message,
                    "failed to parse sql input"
                );
                StatementList::invalid(err)
            }
        }
    }

    pub fn parse_statements(&self, input: &str) -> Result<Vec<ast::Statement>, SyntaxError> {
        let tokens = tokenizer::tokenize(input)?;
        let mut state = ParserState::new(tokens, self.config.max_depth);
        state.parse_statements()
    }
}

/// Parse `input` with the default configuration.
pub fn parse(input: &str) -> StatementList {
    Parser::new().parse(input)
}

/// Parse exactly one statement, optionally terminated by a semicolon.
pub fn parse_statement(input: &str) -> Result<ast::Statement, SyntaxError> {
    let tokens = tokenizer::tokenize(input)?;
    let mut state = ParserState::new(tokens, DEFAULT_MAX_DEPTH);
    let statement = state.parse_statement()?;
    state.eat(&TokenKind::SemiColon);
    state.expect_eq(TokenKind::Eof)?;
    Ok(statement)
}

#[derive(Debug)]
pub(crate) struct ParserState {
    // always terminated by an Eof token
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl ParserState {
    fn new(tokens: Vec<Token>, max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    fn parse_statements(&mut self) -> Result<Vec<ast::Statement>, SyntaxError> {
        let mut statements = Vec::new();

        loop {
            while self.eat(&TokenKind::SemiColon) {}
            if self.current_token_is(&TokenKind::Eof) {
                break;
            }

            statements.push(self.parse_statement()?);

            if !self.eat(&TokenKind::SemiColon) {
                self.expect_eq(TokenKind::Eof)?;
                break;
            }
        }

        if statements.is_empty() {
            return Err(self.unexpected("a statement"));
        }

        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<ast::Statement, SyntaxError> {
        let statement = match self.peek().kind {
            TokenKind::Select => ast::Statement::Select(self.parse_select()?),
            TokenKind::Insert => ast::Statement::Insert(self.parse_insert()?),
            TokenKind::Update => ast::Statement::Update(self.parse_update()?),
            TokenKind::Delete => ast::Statement::Delete(self.parse_delete()?),
            TokenKind::Create => self.parse_create()?,
            TokenKind::Drop => ast::Statement::Drop(self.parse_drop()?),
            TokenKind::Begin | TokenKind::Commit | TokenKind::Rollback => {
                ast::Statement::Transaction(self.parse_transaction()?)
            }
            _ => return Err(self.unexpected("a statement")),
        };
        Ok(statement)
    }

    pub(crate) fn parse_select(&mut self) -> Result<ast::SelectStatement, SyntaxError> {
        self.nested(|p| {
            p.expect_eq(TokenKind::Select)?;
            let distinct = p.eat(&TokenKind::Distinct);
            let select_list = p.parse_comma_separated(Self::parse_result_column)?;

            let from = if p.eat(&TokenKind::From) {
                Some(p.parse_from()?)
            } else {
                None
            };

            let where_clause = if p.eat(&TokenKind::Where) {
                Some(p.parse_expr()?)
            } else {
                None
            };

            let group_by = if p.eat(&TokenKind::Group) {
                p.expect_eq(TokenKind::By)?;
                Some(p.parse_group_by()?)
            } else {
                None
            };

            let order_by = if p.eat(&TokenKind::Order) {
                p.expect_eq(TokenKind::By)?;
                p.parse_comma_separated(Self::parse_order_by_item)?
            } else {
                Vec::new()
            };

            let limit = if p.eat(&TokenKind::Limit) {
                let count = p.parse_expr()?;
                let offset = if p.eat(&TokenKind::Offset) {
                    Some(p.parse_expr()?)
                } else {
                    None
                };
                Some(ast::Limit { count, offset })
            } else {
                None
            };

            Ok(ast::SelectStatement {
                distinct,
                select_list,
                from,
                where_clause,
                group_by,
                order_by,
                limit,
            })
        })
    }

    fn parse_result_column(&mut self) -> Result<ast::ResultColumn, SyntaxError> {
        if self.eat(&TokenKind::Star) {
            return Ok(ast::ResultColumn::Star);
        }

        if let TokenKind::Identifier(table) = &self.peek().kind {
            if self.peek_nth(1) == &TokenKind::Dot && self.peek_nth(2) == &TokenKind::Star {
                let table = table.clone();
                self.pos += 3;
                return Ok(ast::ResultColumn::TableStar(table));
            }
        }

        let expr = self.parse_expr()?;
        let alias = self.parse_optional_alias()?;
        Ok(ast::ResultColumn::Expr { expr, alias })
    }

    fn parse_optional_alias(&mut self) -> Result<Option<String>, SyntaxError> {
        if self.eat(&TokenKind::As) {
            return Ok(Some(self.expect_identifier()?));
        }

        match &self.peek().kind {
            TokenKind::Identifier(alias) => {
                let alias = alias.clone();
                self.advance();
                Ok(Some(alias))
            }
            _ => Ok(None),
        }
    }

    fn parse_from(&mut self) -> Result<ast::TableRef, SyntaxError> {
        let mut tables = self.parse_comma_separated(Self::parse_joined_table)?;
        if tables.len() == 1 {
            Ok(tables.swap_remove(0))
        } else {
            Ok(ast::TableRef::CrossProduct(tables))
        }
    }

    fn parse_joined_table(&mut self) -> Result<ast::TableRef, SyntaxError> {
        let depth = self.depth;
        let table = self.parse_join_chain();
        self.depth = depth;
        table
    }

    fn parse_join_chain(&mut self) -> Result<ast::TableRef, SyntaxError> {
        let mut left = self.parse_table_factor()?;

        while let Some(kind) = self.parse_join_kind()? {
            self.deepen()?;
            let right = self.parse_table_factor()?;
            self.expect_eq(TokenKind::On)?;
            let condition = self.parse_expr()?;
            left = ast::TableRef::Join(Box::new(ast::Join {
                kind,
                left,
                right,
                condition,
            }));
        }

        Ok(left)
    }

    fn parse_join_kind(&mut self) -> Result<Option<ast::JoinKind>, SyntaxError> {
        let kind = match self.peek().kind {
            TokenKind::Join => ast::JoinKind::Inner,
            TokenKind::Inner => {
                self.advance();
                ast::JoinKind::Inner
            }
            TokenKind::Left => {
                self.advance();
                self.eat(&TokenKind::Outer);
                ast::JoinKind::Left
            }
            TokenKind::Right => {
                self.advance();
                self.eat(&TokenKind::Outer);
                ast::JoinKind::Right
            }
            TokenKind::Full => {
                self.advance();
                self.eat(&TokenKind::Outer);
                ast::JoinKind::FullOuter
            }
            _ => return Ok(None),
        };
        self.expect_eq(TokenKind::Join)?;
        Ok(Some(kind))
    }

    fn parse_table_factor(&mut self) -> Result<ast::TableRef, SyntaxError> {
        if self.eat(&TokenKind::LPar) {
            if self.current_token_is(&TokenKind::Select) {
                let subquery = self.parse_select()?;
                self.expect_eq(TokenKind::RPar)?;
                self.eat(&TokenKind::As);
                let alias = self.expect_identifier()?;
                return Ok(ast::TableRef::Derived {
                    subquery: Box::new(subquery),
                    alias,
                });
            }

            let table = self.nested(Self::parse_joined_table)?;
            self.expect_eq(TokenKind::RPar)?;
            return Ok(table);
        }

        let name = self.expect_identifier()?;
        let alias = self.parse_optional_alias()?;
        Ok(ast::TableRef::Table { name, alias })
    }

    fn parse_group_by(&mut self) -> Result<ast::GroupBy, SyntaxError> {
        let columns = self.parse_comma_separated(Self::parse_expr)?;
        let having = if self.eat(&TokenKind::Having) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(ast::GroupBy { columns, having })
    }

    fn parse_order_by_item(&mut self) -> Result<ast::OrderByItem, SyntaxError> {
        let expr = self.parse_expr()?;
        let direction = if self.eat(&TokenKind::Desc) {
            ast::SortDirection::Desc
        } else {
            self.eat(&TokenKind::Asc);
            ast::SortDirection::Asc
        };
        Ok(ast::OrderByItem { expr, direction })
    }

    fn parse_insert(&mut self) -> Result<ast::InsertStatement, SyntaxError> {
        self.expect_eq(TokenKind::Insert)?;
        self.expect_eq(TokenKind::Into)?;
        let table_name = self.expect_identifier()?;

        if self.current_token_is(&TokenKind::LPar) && self.peek_nth(1) == &TokenKind::Select {
            self.advance();
            let select = self.parse_select()?;
            self.expect_eq(TokenKind::RPar)?;
            return Ok(ast::InsertStatement {
                table_name,
                columns: Vec::new(),
                source: ast::InsertSource::Select(Box::new(select)),
            });
        }

        // A leading parenthesized list is a column list only when VALUES or
        // SELECT follows it; otherwise it is the first row. A row made only
        // of bare names is a column list missing its source.
        let mut columns = Vec::new();
        if self.current_token_is(&TokenKind::LPar) {
            let start = self.pos;
            let row = self.parse_tuple()?;
            let is_column_list = matches!(self.peek().kind, TokenKind::Values | TokenKind::Select);
            let names_only = row
                .iter()
                .all(|expr| matches!(expr, ast::Expr::Column(ast::ColumnRef { table: None, .. })));
            if !is_column_list && names_only {
                return Err(self.unexpected("VALUES or SELECT"));
            }
            self.pos = start;
            if is_column_list {
                columns = self.parse_column_list()?;
            }
        }

        let source = if self.current_token_is(&TokenKind::Select) {
            ast::InsertSource::Select(Box::new(self.parse_select()?))
        } else {
            self.eat(&TokenKind::Values);
            ast::InsertSource::Values(self.parse_comma_separated(Self::parse_tuple)?)
        };

        Ok(ast::InsertStatement {
            table_name,
            columns,
            source,
        })
    }

    fn parse_tuple(&mut self) -> Result<Vec<ast::Expr>, SyntaxError> {
        self.expect_eq(TokenKind::LPar)?;
        let values = self.parse_comma_separated(Self::parse_expr)?;
        self.expect_eq(TokenKind::RPar)?;
        Ok(values)
    }

    fn parse_column_list(&mut self) -> Result<Vec<String>, SyntaxError> {
        self.expect_eq(TokenKind::LPar)?;
        let columns = self.parse_comma_separated(Self::expect_identifier)?;
        self.expect_eq(TokenKind::RPar)?;
        Ok(columns)
    }

    fn parse_update(&mut self) -> Result<ast::UpdateStatement, SyntaxError> {
        self.expect_eq(TokenKind::Update)?;
        let table_name = self.expect_identifier()?;
        self.expect_eq(TokenKind::Set)?;
        let assignments = self.parse_comma_separated(|p| {
            let column = p.expect_identifier()?;
            p.expect_eq(TokenKind::Eq)?;
            let value = p.parse_expr()?;
            Ok(ast::Assignment { column, value })
        })?;
        let where_clause = if self.eat(&TokenKind::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(ast::UpdateStatement {
            table_name,
            assignments,
            where_clause,
        })
    }

    fn parse_delete(&mut self) -> Result<ast::DeleteStatement, SyntaxError> {
        self.expect_eq(TokenKind::Delete)?;
        self.expect_eq(TokenKind::From)?;
        let table_name = self.expect_identifier()?;
        let where_clause = if self.eat(&TokenKind::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(ast::DeleteStatement {
            table_name,
            where_clause,
        })
    }

    fn parse_create(&mut self) -> Result<ast::Statement, SyntaxError> {
        self.expect_eq(TokenKind::Create)?;
        match self.peek().kind {
            TokenKind::Table => Ok(ast::Statement::CreateTable(self.parse_create_table()?)),
            TokenKind::Unique | TokenKind::Index => {
                Ok(ast::Statement::CreateIndex(self.parse_create_index()?))
            }
            _ => Err(self.unexpected("TABLE or INDEX")),
        }
    }

    fn parse_create_table(&mut self) -> Result<ast::CreateTableStatement, SyntaxError> {
        self.expect_eq(TokenKind::Table)?;
        let if_not_exists = if self.eat(&TokenKind::If) {
            self.expect_eq(TokenKind::Not)?;
            self.expect_eq(TokenKind::Exists)?;
            true
        } else {
            false
        };
        let name = self.expect_identifier()?;

        self.expect_eq(TokenKind::LPar)?;
        let mut columns = Vec::new();
        let mut primary_key = Vec::new();
        loop {
            if self.eat(&TokenKind::Primary) {
                self.expect_eq(TokenKind::Key)?;
                primary_key = self.parse_column_list()?;
            } else {
                columns.push(self.parse_column_def()?);
            }

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_eq(TokenKind::RPar)?;

        Ok(ast::CreateTableStatement {
            name,
            if_not_exists,
            columns,
            primary_key,
        })
    }

    fn parse_column_def(&mut self) -> Result<ast::ColumnDef, SyntaxError> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;
        let mut column = ast::ColumnDef {
            name,
            data_type,
            not_null: false,
            primary_key: false,
            unique: false,
            default: None,
        };

        loop {
            match self.peek().kind {
                TokenKind::Not => {
                    self.advance();
                    self.expect_eq(TokenKind::Null)?;
                    column.not_null = true;
                }
                TokenKind::Null => {
                    self.advance();
                    column.not_null = false;
                }
                TokenKind::Primary => {
                    self.advance();
                    self.expect_eq(TokenKind::Key)?;
                    column.primary_key = true;
                }
                TokenKind::Unique => {
                    self.advance();
                    column.unique = true;
                }
                TokenKind::Default => {
                    self.advance();
                    column.default = Some(self.parse_signed_literal()?);
                }
                _ => break,
            }
        }

        Ok(column)
    }

    fn parse_data_type(&mut self) -> Result<ast::DataType, SyntaxError> {
        let token = self.peek().clone();
        let Some(name) = token.kind.as_identifier() else {
            return Err(self.unexpected("a type name"));
        };
        self.advance();

        let data_type = match name {
            "tinyint" => ast::DataType::TinyInt,
            "smallint" => ast::DataType::SmallInt,
            "int" | "integer" => ast::DataType::Integer,
            "bigint" => ast::DataType::BigInt,
            "decimal" | "numeric" => {
                if self.current_token_is(&TokenKind::LPar) {
                    self.advance();
                    self.parse_comma_separated(Self::parse_type_length)?;
                    self.expect_eq(TokenKind::RPar)?;
                }
                ast::DataType::Decimal
            }
            "real" | "float" => ast::DataType::Real,
            "double" => {
                if self.peek().kind.as_identifier() == Some("precision") {
                    self.advance();
                }
                ast::DataType::Double
            }
            "boolean" | "bool" => ast::DataType::Boolean,
            "char" | "character" => {
                let length = if self.current_token_is(&TokenKind::LPar) {
                    self.parse_parenthesized_length()?
                } else {
                    1
                };
                ast::DataType::Char(length)
            }
            "varchar" => ast::DataType::Varchar(self.parse_parenthesized_length()?),
            "text" => ast::DataType::Text,
            "date" => ast::DataType::Date,
            "timestamp" => ast::DataType::Timestamp,
            other => {
                return Err(SyntaxError::new(
                    format!("type \"{other}\" does not exist"),
                    token.line,
                    token.column,
                ))
            }
        };
        Ok(data_type)
    }

    fn parse_parenthesized_length(&mut self) -> Result<u32, SyntaxError> {
        self.expect_eq(TokenKind::LPar)?;
        let length = self.parse_type_length()?;
        self.expect_eq(TokenKind::RPar)?;
        Ok(length)
    }

    fn parse_type_length(&mut self) -> Result<u32, SyntaxError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Number(text) => {
                let length = text.parse::<u32>().map_err(|_| {
                    SyntaxError::new(
                        format!("invalid type length \"{text}\""),
                        token.line,
                        token.column,
                    )
                })?;
                self.advance();
                Ok(length)
            }
            _ => Err(self.unexpected("a type length")),
        }
    }

    fn parse_create_index(&mut self) -> Result<ast::CreateIndexStatement, SyntaxError> {
        let unique = self.eat(&TokenKind::Unique);
        self.expect_eq(TokenKind::Index)?;
        let name = self.expect_identifier()?;
        self.expect_eq(TokenKind::On)?;
        let table_name = self.expect_identifier()?;
        let columns = self.parse_column_list()?;
        Ok(ast::CreateIndexStatement {
            name,
            table_name,
            columns,
            unique,
        })
    }

    fn parse_drop(&mut self) -> Result<ast::DropStatement, SyntaxError> {
        self.expect_eq(TokenKind::Drop)?;
        let object = match self.peek().kind {
            TokenKind::Table => ast::DropObject::Table,
            TokenKind::Index => ast::DropObject::Index,
            _ => return Err(self.unexpected("TABLE or INDEX")),
        };
        self.advance();
        let if_exists = if self.eat(&TokenKind::If) {
            self.expect_eq(TokenKind::Exists)?;
            true
        } else {
            false
        };
        let name = self.expect_identifier()?;
        Ok(ast::DropStatement {
            object,
            name,
            if_exists,
        })
    }

    fn parse_transaction(&mut self) -> Result<ast::TransactionStatement, SyntaxError> {
        let statement = match self.peek().kind {
            TokenKind::Begin => ast::TransactionStatement::Begin,
            TokenKind::Commit => ast::TransactionStatement::Commit,
            TokenKind::Rollback => ast::TransactionStatement::Rollback,
            _ => return Err(self.unexpected("BEGIN, COMMIT or ROLLBACK")),
        };
        self.advance();
        self.eat(&TokenKind::Transaction);
        Ok(statement)
    }

    /// Run `f` one nesting level deeper, failing once the configured depth
    /// is exhausted. Levels taken inside `f` are given back on return.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        let depth = self.depth;
        self.deepen()?;
        let result = f(self);
        self.depth = depth;
        result
    }

    /// Take one more nesting level. Loops that fold their result into a
    /// left-deep tree call this once per fold, so the tree height stays
    /// within `max_depth` even without recursion.
    pub(crate) fn deepen(&mut self) -> Result<(), SyntaxError> {
        if self.depth >= self.max_depth {
            let token = self.peek();
            return Err(SyntaxError::new(
                "query nested too deeply",
                token.line,
                token.column,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn parse_comma_separated<T>(
        &mut self,
        mut f: impl FnMut(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<Vec<T>, SyntaxError> {
        let mut items = vec![f(self)?];
        while self.eat(&TokenKind::Comma) {
            items.push(f(self)?);
        }
        Ok(items)
    }

    pub(crate) fn current_token_is(&self, expected: &TokenKind) -> bool {
        &self.peek().kind == expected
    }

    pub(crate) fn eat(&mut self, expected: &TokenKind) -> bool {
        if self.current_token_is(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        match &self.peek().kind {
            TokenKind::Identifier(ident) => {
                let ident = ident.clone();
                self.advance();
                Ok(ident)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    pub(crate) fn expect_eq(&mut self, expected: TokenKind) -> Result<&Token, SyntaxError> {
        if self.current_token_is(&expected) {
            Ok(self.next_token())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    /// Syntax error pointing at the current token.
    pub(crate) fn unexpected(&self, expected: &str) -> SyntaxError {
        unexpected_token(self.peek(), expected)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn peek_nth(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)].kind
    }

    pub(crate) fn next_token(&mut self) -> &Token {
        let pos = self.pos;
        self.advance();
        &self.tokens[pos]
    }

    pub(crate) fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }
}

pub(crate) fn unexpected_token(token: &Token, expected: &str) -> SyntaxError {
    let message = match token.kind {
        TokenKind::Eof => format!("syntax error at end of input, expected {expected}"),
        _ => format!(
            "syntax error at or near \"{}\", expected {expected}",
            token.text
        ),
    };
    SyntaxError::new(message, token.line, token.column)
}
