//! Statement and expression trees produced by the parser.
//!
//! Every node owns its children, so dropping a [`Statement`] releases the
//! whole tree. Nothing here is checked against a schema.

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    CreateTable(CreateTableStatement),
    CreateIndex(CreateIndexStatement),
    Drop(DropStatement),
    Transaction(TransactionStatement),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Transaction,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Select(_) => StatementKind::Select,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
            Statement::CreateTable(_) | Statement::CreateIndex(_) => StatementKind::Create,
            Statement::Drop(_) => StatementKind::Drop,
            Statement::Transaction(_) => StatementKind::Transaction,
        }
    }

    /// Name of the table the statement targets.
    ///
    /// # Panics
    ///
    /// Panics for statements that have no single target table (SELECT and
    /// transaction control).
    pub fn table_name(&self) -> &str {
        match self {
            Statement::Insert(s) => &s.table_name,
            Statement::Update(s) => &s.table_name,
            Statement::Delete(s) => &s.table_name,
            Statement::CreateTable(s) => &s.name,
            Statement::CreateIndex(s) => &s.table_name,
            Statement::Drop(s) => &s.name,
            Statement::Select(_) | Statement::Transaction(_) => {
                panic!("table_name() called on a {:?} statement", self.kind())
            }
        }
    }

    /// # Panics
    ///
    /// Panics if this is not a SELECT.
    pub fn as_select(&self) -> &SelectStatement {
        match self {
            Statement::Select(s) => s,
            other => panic!("expected a SELECT statement, found {:?}", other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if this is not an INSERT.
    pub fn as_insert(&self) -> &InsertStatement {
        match self {
            Statement::Insert(s) => s,
            other => panic!("expected an INSERT statement, found {:?}", other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if this is not an UPDATE.
    pub fn as_update(&self) -> &UpdateStatement {
        match self {
            Statement::Update(s) => s,
            other => panic!("expected an UPDATE statement, found {:?}", other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if this is not a DELETE.
    pub fn as_delete(&self) -> &DeleteStatement {
        match self {
            Statement::Delete(s) => s,
            other => panic!("expected a DELETE statement, found {:?}", other.kind()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub distinct: bool,
    pub select_list: Vec<ResultColumn>,
    pub from: Option<TableRef>,
    pub where_clause: Option<Expr>,
    pub group_by: Option<GroupBy>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Limit>,
}

impl SelectStatement {
    pub fn from(&self) -> Option<&TableRef> {
        self.from.as_ref()
    }

    pub fn where_clause(&self) -> Option<&Expr> {
        self.where_clause.as_ref()
    }

    pub fn group_by(&self) -> Option<&GroupBy> {
        self.group_by.as_ref()
    }

    pub fn order_by(&self) -> &[OrderByItem] {
        &self.order_by
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultColumn {
    Star,
    TableStar(String),
    Expr { expr: Expr, alias: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    pub columns: Vec<Expr>,
    pub having: Option<Expr>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expr,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub count: Expr,
    pub offset: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    Table {
        name: String,
        alias: Option<String>,
    },
    Join(Box<Join>),
    Derived {
        subquery: Box<SelectStatement>,
        alias: String,
    },
    /// Comma separated FROM items, an implicit cross join.
    CrossProduct(Vec<TableRef>),
}

impl TableRef {
    /// Name of a base table, `None` for joins and subqueries.
    pub fn table_name(&self) -> Option<&str> {
        match self {
            TableRef::Table { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    FullOuter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub left: TableRef,
    pub right: TableRef,
    pub condition: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table_name: String,
    pub columns: Vec<String>,
    pub source: InsertSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Select(Box<SelectStatement>),
}

impl InsertStatement {
    pub fn insert_values(&self) -> Option<&[Vec<Expr>]> {
        match &self.source {
            InsertSource::Values(rows) => Some(rows),
            InsertSource::Select(_) => None,
        }
    }

    pub fn select(&self) -> Option<&SelectStatement> {
        match &self.source {
            InsertSource::Select(select) => Some(select),
            InsertSource::Values(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table_name: String,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table_name: String,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: String,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    /// Table level `PRIMARY KEY (..)` columns.
    pub primary_key: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub not_null: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default: Option<Literal>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DataType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Real,
    Double,
    Boolean,
    Char(u32),
    Varchar(u32),
    Text,
    Date,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndexStatement {
    pub name: String,
    pub table_name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DropObject {
    Table,
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropStatement {
    pub object: DropObject,
    pub name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransactionStatement {
    Begin,
    Commit,
    Rollback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Constant(Literal),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Function(FunctionCall),
    Subquery(Box<SelectStatement>),
    Exists(Box<SelectStatement>),
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<SelectStatement>,
        negated: bool,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn column(table: Option<&str>, column: &str) -> Self {
        Expr::Column(ColumnRef {
            table: table.map(str::to_string),
            column: column.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LiteralType {
    Integer,
    Float,
    String,
    Boolean,
    Null,
}

impl Literal {
    pub fn literal_type(&self) -> LiteralType {
        match self {
            Literal::Integer(_) => LiteralType::Integer,
            Literal::Float(_) => LiteralType::Float,
            Literal::String(_) => LiteralType::String,
            Literal::Boolean(_) => LiteralType::Boolean,
            Literal::Null => LiteralType::Null,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: FunctionArgs,
    pub distinct: bool,
}

impl FunctionCall {
    pub fn is_aggregate(&self) -> bool {
        matches!(self.name.as_str(), "count" | "min" | "max" | "sum" | "avg")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArgs {
    Star,
    List(Vec<Expr>),
}
