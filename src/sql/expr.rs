// Pratt expression parsing. Binding powers, loosest first:
//
//   OR
//   AND
//   NOT (prefix)
//   = <> != < <= > >= LIKE IS IN BETWEEN
//   + - ||
//   * / %
//   - + (prefix)

use crate::{
    error::SyntaxError,
    sql::{
        ast::{BinaryOp, ColumnRef, Expr, FunctionArgs, FunctionCall, Literal, UnaryOp},
        parser::{unexpected_token, ParserState},
        tokenizer::{Token, TokenKind},
    },
};

// (left, right) for infix operators; a right power above the left one makes
// the operator left-associative.
mod bp {
    pub const OR: (u8, u8) = (1, 2);
    pub const AND: (u8, u8) = (3, 4);
    pub const NOT_PREFIX: u8 = 5;
    pub const COMPARISON: (u8, u8) = (7, 8);
    pub const ADD: (u8, u8) = (9, 10);
    pub const MUL: (u8, u8) = (11, 12);
    pub const UNARY: u8 = 13;
}

impl ParserState {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, SyntaxError> {
        self.nested(|p| {
            let mut lhs = p.parse_prefix()?;

            while let Some((l_bp, r_bp)) = p.infix_bp() {
                if l_bp < min_bp {
                    break;
                }
                p.deepen()?;
                lhs = p.parse_infix(lhs, r_bp)?;
            }

            Ok(lhs)
        })
    }

    fn infix_bp(&self) -> Option<(u8, u8)> {
        match self.peek().kind {
            TokenKind::Or => Some(bp::OR),
            TokenKind::And => Some(bp::AND),
            TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::Like
            | TokenKind::Is
            | TokenKind::In
            | TokenKind::Between => Some(bp::COMPARISON),
            TokenKind::Not
                if matches!(
                    self.peek_nth(1),
                    TokenKind::Like | TokenKind::In | TokenKind::Between
                ) =>
            {
                Some(bp::COMPARISON)
            }
            TokenKind::Plus | TokenKind::Minus | TokenKind::Concat => Some(bp::ADD),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(bp::MUL),
            _ => None,
        }
    }

    fn parse_infix(&mut self, lhs: Expr, r_bp: u8) -> Result<Expr, SyntaxError> {
        let kind = self.next_token().kind.clone();

        let op = match kind {
            TokenKind::Or => BinaryOp::Or,
            TokenKind::And => BinaryOp::And,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::Like => BinaryOp::Like,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Concat => BinaryOp::Concat,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::Is => {
                let negated = self.eat(&TokenKind::Not);
                self.expect_eq(TokenKind::Null)?;
                return Ok(Expr::IsNull {
                    expr: Box::new(lhs),
                    negated,
                });
            }
            TokenKind::In => return self.parse_in(lhs, false),
            TokenKind::Between => return self.parse_between(lhs, false, r_bp),
            TokenKind::Not => {
                if self.eat(&TokenKind::In) {
                    return self.parse_in(lhs, true);
                }
                if self.eat(&TokenKind::Between) {
                    return self.parse_between(lhs, true, r_bp);
                }
                self.expect_eq(TokenKind::Like)?;
                BinaryOp::NotLike
            }
            _ => return Err(self.unexpected("an operator")),
        };

        let rhs = self.parse_expr_bp(r_bp)?;
        Ok(Expr::binary(op, lhs, rhs))
    }

    fn parse_in(&mut self, lhs: Expr, negated: bool) -> Result<Expr, SyntaxError> {
        self.expect_eq(TokenKind::LPar)?;

        if self.current_token_is(&TokenKind::Select) {
            let subquery = self.parse_select()?;
            self.expect_eq(TokenKind::RPar)?;
            return Ok(Expr::InSubquery {
                expr: Box::new(lhs),
                subquery: Box::new(subquery),
                negated,
            });
        }

        let list = self.parse_comma_separated(Self::parse_expr)?;
        self.expect_eq(TokenKind::RPar)?;
        Ok(Expr::InList {
            expr: Box::new(lhs),
            list,
            negated,
        })
    }

    fn parse_between(&mut self, lhs: Expr, negated: bool, r_bp: u8) -> Result<Expr, SyntaxError> {
        let low = self.parse_expr_bp(r_bp)?;
        self.expect_eq(TokenKind::And)?;
        let high = self.parse_expr_bp(r_bp)?;
        Ok(Expr::Between {
            expr: Box::new(lhs),
            low: Box::new(low),
            high: Box::new(high),
            negated,
        })
    }

    fn parse_prefix(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.next_token().clone();

        let expr = match token.kind {
            TokenKind::Number(ref text) => Expr::Constant(parse_number(text, &token)?),
            TokenKind::String(value) => Expr::Constant(Literal::String(value)),
            TokenKind::True => Expr::Constant(Literal::Boolean(true)),
            TokenKind::False => Expr::Constant(Literal::Boolean(false)),
            TokenKind::Null => Expr::Constant(Literal::Null),
            TokenKind::Not => Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(self.parse_expr_bp(bp::NOT_PREFIX)?),
            },
            TokenKind::Minus => Expr::Unary {
                op: UnaryOp::Minus,
                operand: Box::new(self.parse_expr_bp(bp::UNARY)?),
            },
            TokenKind::Plus => Expr::Unary {
                op: UnaryOp::Plus,
                operand: Box::new(self.parse_expr_bp(bp::UNARY)?),
            },
            TokenKind::Exists => {
                self.expect_eq(TokenKind::LPar)?;
                let subquery = self.parse_select()?;
                self.expect_eq(TokenKind::RPar)?;
                Expr::Exists(Box::new(subquery))
            }
            TokenKind::LPar if self.current_token_is(&TokenKind::Select) => {
                let subquery = self.parse_select()?;
                self.expect_eq(TokenKind::RPar)?;
                Expr::Subquery(Box::new(subquery))
            }
            TokenKind::LPar => {
                let inner = self.parse_expr()?;
                self.expect_eq(TokenKind::RPar)?;
                inner
            }
            TokenKind::Identifier(name) if self.current_token_is(&TokenKind::LPar) => {
                Expr::Function(self.parse_function_call(name)?)
            }
            TokenKind::Identifier(table) if self.current_token_is(&TokenKind::Dot) => {
                self.advance();
                let column = self.expect_identifier()?;
                Expr::Column(ColumnRef {
                    table: Some(table),
                    column,
                })
            }
            TokenKind::Identifier(column) => Expr::Column(ColumnRef {
                table: None,
                column,
            }),
            _ => return Err(unexpected_token(&token, "an expression")),
        };

        Ok(expr)
    }

    fn parse_function_call(&mut self, name: String) -> Result<FunctionCall, SyntaxError> {
        self.expect_eq(TokenKind::LPar)?;

        let distinct = self.eat(&TokenKind::Distinct);
        let args = if !distinct && self.eat(&TokenKind::Star) {
            FunctionArgs::Star
        } else if !distinct && self.current_token_is(&TokenKind::RPar) {
            FunctionArgs::List(Vec::new())
        } else {
            FunctionArgs::List(self.parse_comma_separated(Self::parse_expr)?)
        };

        self.expect_eq(TokenKind::RPar)?;
        Ok(FunctionCall {
            name,
            args,
            distinct,
        })
    }

    /// A literal with an optional leading sign, as used by column defaults.
    pub(crate) fn parse_signed_literal(&mut self) -> Result<Literal, SyntaxError> {
        let negative = self.eat(&TokenKind::Minus);
        if !negative {
            self.eat(&TokenKind::Plus);
        }

        let token = self.peek().clone();
        let literal = match token.kind {
            TokenKind::Number(ref text) => {
                let text = if negative {
                    format!("-{text}")
                } else {
                    text.clone()
                };
                parse_number(&text, &token)?
            }
            TokenKind::String(value) if !negative => Literal::String(value),
            TokenKind::True if !negative => Literal::Boolean(true),
            TokenKind::False if !negative => Literal::Boolean(false),
            TokenKind::Null if !negative => Literal::Null,
            _ => return Err(self.unexpected("a literal")),
        };
        self.advance();
        Ok(literal)
    }
}

fn parse_number(text: &str, token: &Token) -> Result<Literal, SyntaxError> {
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(value) = text.parse::<i64>() {
            return Ok(Literal::Integer(value));
        }
    }

    text.parse::<f64>().map(Literal::Float).map_err(|_| {
        SyntaxError::new(
            format!("invalid numeric literal \"{text}\""),
            token.line,
            token.column,
        )
    })
}

#[cfg(test)]
mod tests {
    use crate::sql::{
        ast::*,
        parser::parse_statement,
    };

    fn where_clause(input: &str) -> Expr {
        let statement = parse_statement(input).unwrap();
        statement.as_select().where_clause.clone().unwrap()
    }

    fn first_column(input: &str) -> Expr {
        let statement = parse_statement(input).unwrap();
        match &statement.as_select().select_list[0] {
            ResultColumn::Expr { expr, .. } => expr.clone(),
            other => panic!("expected an expression, got {other:?}"),
        }
    }

    fn int(value: i64) -> Expr {
        Expr::Constant(Literal::Integer(value))
    }

    fn c(name: &str) -> Expr {
        Expr::column(None, name)
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = where_clause("select * from foo where a > 3 and b < 10 or c < 3 and d > 10");
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Or,
                Expr::binary(
                    BinaryOp::And,
                    Expr::binary(BinaryOp::Gt, c("a"), int(3)),
                    Expr::binary(BinaryOp::Lt, c("b"), int(10)),
                ),
                Expr::binary(
                    BinaryOp::And,
                    Expr::binary(BinaryOp::Lt, c("c"), int(3)),
                    Expr::binary(BinaryOp::Gt, c("d"), int(10)),
                ),
            )
        );
    }

    #[test]
    fn arithmetic_precedence_and_associativity() {
        assert_eq!(
            first_column("select 1 - 2 - 3 * 4"),
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, int(1), int(2)),
                Expr::binary(BinaryOp::Mul, int(3), int(4)),
            )
        );
        assert_eq!(
            first_column("select (1 + 2) * 3"),
            Expr::binary(
                BinaryOp::Mul,
                Expr::binary(BinaryOp::Add, int(1), int(2)),
                int(3),
            )
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(
            where_clause("select * from t where not a = 1"),
            Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(Expr::binary(BinaryOp::Eq, c("a"), int(1))),
            }
        );
        assert_eq!(
            first_column("select -a * 2"),
            Expr::binary(
                BinaryOp::Mul,
                Expr::Unary {
                    op: UnaryOp::Minus,
                    operand: Box::new(c("a")),
                },
                int(2),
            )
        );
    }

    #[test]
    fn literals_keep_their_type() {
        let types: Vec<_> = ["1", "1.5", "2e3", "'x'", "true", "null", "99999999999999999999"]
            .iter()
            .map(|lit| match first_column(&format!("select {lit}")) {
                Expr::Constant(literal) => literal.literal_type(),
                other => panic!("expected a constant, got {other:?}"),
            })
            .collect();
        assert_eq!(
            types,
            vec![
                LiteralType::Integer,
                LiteralType::Float,
                LiteralType::Float,
                LiteralType::String,
                LiteralType::Boolean,
                LiteralType::Null,
                LiteralType::Float,
            ]
        );
    }

    #[test]
    fn qualified_columns_and_functions() {
        assert_eq!(
            where_clause("select * from a, b where a.id = b.id"),
            Expr::binary(
                BinaryOp::Eq,
                Expr::column(Some("a"), "id"),
                Expr::column(Some("b"), "id"),
            )
        );
        assert_eq!(
            first_column("select count(distinct a.id, b) from a"),
            Expr::Function(FunctionCall {
                name: "count".to_string(),
                args: FunctionArgs::List(vec![Expr::column(Some("a"), "id"), c("b")]),
                distinct: true,
            })
        );
        assert_eq!(
            first_column("select now()"),
            Expr::Function(FunctionCall {
                name: "now".to_string(),
                args: FunctionArgs::List(vec![]),
                distinct: false,
            })
        );
        assert!(parse_statement("select count(distinct *) from a").is_err());
    }

    #[test]
    fn predicates() {
        assert_eq!(
            where_clause("select * from t where a is not null and b is null"),
            Expr::binary(
                BinaryOp::And,
                Expr::IsNull {
                    expr: Box::new(c("a")),
                    negated: true,
                },
                Expr::IsNull {
                    expr: Box::new(c("b")),
                    negated: false,
                },
            )
        );
        assert_eq!(
            where_clause("select * from t where a not in (1, 2)"),
            Expr::InList {
                expr: Box::new(c("a")),
                list: vec![int(1), int(2)],
                negated: true,
            }
        );
        assert_eq!(
            where_clause("select * from t where a between 1 and 2 and b not like 'x%'"),
            Expr::binary(
                BinaryOp::And,
                Expr::Between {
                    expr: Box::new(c("a")),
                    low: Box::new(int(1)),
                    high: Box::new(int(2)),
                    negated: false,
                },
                Expr::binary(
                    BinaryOp::NotLike,
                    c("b"),
                    Expr::Constant(Literal::String("x%".to_string())),
                ),
            )
        );
    }

    #[test]
    fn subquery_expressions() {
        assert!(matches!(
            where_clause("select * from t where a in (select id from u)"),
            Expr::InSubquery { negated: false, .. }
        ));
        assert!(matches!(
            where_clause("select * from t where exists (select * from u)"),
            Expr::Exists(_)
        ));
        let Expr::Binary { right, .. } =
            where_clause("select * from t where a = (select max(id) from u)")
        else {
            panic!("expected a comparison");
        };
        assert!(matches!(*right, Expr::Subquery(_)));
    }

    #[test]
    fn missing_operand_reports_position() {
        let err = parse_statement("select * from t where a = ;").unwrap_err();
        assert_eq!((err.line, err.column), (1, 27));
        assert_eq!(
            err.message,
            "syntax error at or near \";\", expected an expression"
        );

        let err = parse_statement("select * from t where (a = 1").unwrap_err();
        assert_eq!(
            err.message,
            "syntax error at end of input, expected \")\""
        );
    }
}
