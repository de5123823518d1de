use std::fmt;

use crate::sql::ast::*;

/// Indented, line-per-node text dump of statement trees.
#[derive(Debug, Default)]
pub(crate) struct Dump {
    out: String,
    indent: usize,
}

impl Dump {
    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    pub(crate) fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn section(&mut self, title: &str, f: impl FnOnce(&mut Self)) {
        self.line(title);
        self.nested(f);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    pub(crate) fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Select(select) => self.select(select),
            Statement::Insert(insert) => {
                self.line(format!("INSERT INTO {}", insert.table_name));
                self.nested(|d| {
                    if !insert.columns.is_empty() {
                        d.line(format!("columns: {}", insert.columns.join(", ")));
                    }
                    match &insert.source {
                        InsertSource::Values(rows) => d.section("values:", |d| {
                            for (i, row) in rows.iter().enumerate() {
                                d.section(&format!("row {i}:"), |d| {
                                    row.iter().for_each(|e| d.expr(e));
                                });
                            }
                        }),
                        InsertSource::Select(select) => d.section("select:", |d| d.select(select)),
                    }
                });
            }
            Statement::Update(update) => {
                self.line(format!("UPDATE {}", update.table_name));
                self.nested(|d| {
                    for assignment in &update.assignments {
                        d.section(&format!("set {}:", assignment.column), |d| {
                            d.expr(&assignment.value)
                        });
                    }
                    if let Some(e) = &update.where_clause {
                        d.section("where:", |d| d.expr(e));
                    }
                });
            }
            Statement::Delete(delete) => {
                self.line(format!("DELETE FROM {}", delete.table_name));
                if let Some(e) = &delete.where_clause {
                    self.nested(|d| d.section("where:", |d| d.expr(e)));
                }
            }
            Statement::CreateTable(create) => {
                let if_not_exists = if create.if_not_exists {
                    " IF NOT EXISTS"
                } else {
                    ""
                };
                self.line(format!("CREATE TABLE{if_not_exists} {}", create.name));
                self.nested(|d| {
                    for column in &create.columns {
                        d.line(column.to_string());
                    }
                    if !create.primary_key.is_empty() {
                        d.line(format!("primary key: {}", create.primary_key.join(", ")));
                    }
                });
            }
            Statement::CreateIndex(index) => {
                let unique = if index.unique { "UNIQUE " } else { "" };
                self.line(format!(
                    "CREATE {unique}INDEX {} ON {} ({})",
                    index.name,
                    index.table_name,
                    index.columns.join(", ")
                ));
            }
            Statement::Drop(drop) => {
                let object = match drop.object {
                    DropObject::Table => "TABLE",
                    DropObject::Index => "INDEX",
                };
                let if_exists = if drop.if_exists { " IF EXISTS" } else { "" };
                self.line(format!("DROP {object}{if_exists} {}", drop.name));
            }
            Statement::Transaction(t) => self.line(match t {
                TransactionStatement::Begin => "BEGIN",
                TransactionStatement::Commit => "COMMIT",
                TransactionStatement::Rollback => "ROLLBACK",
            }),
        }
    }

    fn select(&mut self, select: &SelectStatement) {
        self.line(if select.distinct {
            "SELECT DISTINCT"
        } else {
            "SELECT"
        });
        self.nested(|d| {
            d.section("select list:", |d| {
                for column in &select.select_list {
                    match column {
                        ResultColumn::Star => d.line("*"),
                        ResultColumn::TableStar(table) => d.line(format!("{table}.*")),
                        ResultColumn::Expr { expr, alias: None } => d.expr(expr),
                        ResultColumn::Expr {
                            expr,
                            alias: Some(alias),
                        } => d.section(&format!("as {alias}:"), |d| d.expr(expr)),
                    }
                }
            });
            if let Some(from) = &select.from {
                d.section("from:", |d| d.table_ref(from));
            }
            if let Some(e) = &select.where_clause {
                d.section("where:", |d| d.expr(e));
            }
            if let Some(group_by) = &select.group_by {
                d.section("group by:", |d| group_by.columns.iter().for_each(|e| d.expr(e)));
                if let Some(having) = &group_by.having {
                    d.section("having:", |d| d.expr(having));
                }
            }
            if !select.order_by.is_empty() {
                d.section("order by:", |d| {
                    for item in &select.order_by {
                        let direction = match item.direction {
                            SortDirection::Asc => "asc:",
                            SortDirection::Desc => "desc:",
                        };
                        d.section(direction, |d| d.expr(&item.expr));
                    }
                });
            }
            if let Some(limit) = &select.limit {
                d.section("limit:", |d| d.expr(&limit.count));
                if let Some(offset) = &limit.offset {
                    d.section("offset:", |d| d.expr(offset));
                }
            }
        });
    }

    fn table_ref(&mut self, table: &TableRef) {
        match table {
            TableRef::Table { name, alias: None } => self.line(format!("table {name}")),
            TableRef::Table {
                name,
                alias: Some(alias),
            } => self.line(format!("table {name} as {alias}")),
            TableRef::Join(join) => {
                self.line(format!("{} join", join.kind));
                self.nested(|d| {
                    d.table_ref(&join.left);
                    d.table_ref(&join.right);
                    d.section("on:", |d| d.expr(&join.condition));
                });
            }
            TableRef::Derived { subquery, alias } => {
                self.section(&format!("subquery as {alias}:"), |d| d.select(subquery))
            }
            TableRef::CrossProduct(tables) => {
                self.section("cross product:", |d| {
                    tables.iter().for_each(|t| d.table_ref(t))
                })
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Column(ColumnRef {
                table: Some(table),
                column,
            }) => self.line(format!("column {table}.{column}")),
            Expr::Column(ColumnRef {
                table: None,
                column,
            }) => self.line(format!("column {column}")),
            Expr::Constant(literal) => self.line(format!(
                "constant {literal} ({})",
                literal.literal_type().name()
            )),
            Expr::Unary { op, operand } => self.section(&format!("unary {op}"), |d| d.expr(operand)),
            Expr::Binary { op, left, right } => self.section(&format!("binary {op}"), |d| {
                d.expr(left);
                d.expr(right);
            }),
            Expr::Function(call) => {
                let distinct = if call.distinct { " distinct" } else { "" };
                self.section(&format!("function {}{distinct}", call.name), |d| {
                    match &call.args {
                        FunctionArgs::Star => d.line("*"),
                        FunctionArgs::List(args) => args.iter().for_each(|a| d.expr(a)),
                    }
                })
            }
            Expr::Subquery(select) => self.section("subquery", |d| d.select(select)),
            Expr::Exists(select) => self.section("exists", |d| d.select(select)),
            Expr::IsNull { expr, negated } => {
                let label = if *negated { "is not null" } else { "is null" };
                self.section(label, |d| d.expr(expr))
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                let label = if *negated { "not in list" } else { "in list" };
                self.section(label, |d| {
                    d.expr(expr);
                    d.section("list:", |d| list.iter().for_each(|e| d.expr(e)));
                })
            }
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                let label = if *negated { "not in subquery" } else { "in subquery" };
                self.section(label, |d| {
                    d.expr(expr);
                    d.select(subquery);
                })
            }
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let label = if *negated { "not between" } else { "between" };
                self.section(label, |d| {
                    d.expr(expr);
                    d.expr(low);
                    d.expr(high);
                })
            }
        }
    }
}

impl LiteralType {
    pub fn name(&self) -> &'static str {
        match self {
            LiteralType::Integer => "integer",
            LiteralType::Float => "float",
            LiteralType::String => "string",
            LiteralType::Boolean => "boolean",
            LiteralType::Null => "null",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Boolean(true) => f.write_str("TRUE"),
            Literal::Boolean(false) => f.write_str("FALSE"),
            Literal::Null => f.write_str("NULL"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Like => "LIKE",
            BinaryOp::NotLike => "NOT LIKE",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Concat => "||",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Not => "NOT",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
        })
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::FullOuter => "full outer",
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::TinyInt => f.write_str("TINYINT"),
            DataType::SmallInt => f.write_str("SMALLINT"),
            DataType::Integer => f.write_str("INTEGER"),
            DataType::BigInt => f.write_str("BIGINT"),
            DataType::Decimal => f.write_str("DECIMAL"),
            DataType::Real => f.write_str("REAL"),
            DataType::Double => f.write_str("DOUBLE"),
            DataType::Boolean => f.write_str("BOOLEAN"),
            DataType::Char(n) => write!(f, "CHAR({n})"),
            DataType::Varchar(n) => write!(f, "VARCHAR({n})"),
            DataType::Text => f.write_str("TEXT"),
            DataType::Date => f.write_str("DATE"),
            DataType::Timestamp => f.write_str("TIMESTAMP"),
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if self.not_null {
            f.write_str(" NOT NULL")?;
        }
        if self.primary_key {
            f.write_str(" PRIMARY KEY")?;
        }
        if self.unique {
            f.write_str(" UNIQUE")?;
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {default}")?;
        }
        Ok(())
    }
}
