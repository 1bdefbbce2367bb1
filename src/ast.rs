//! Provider-neutral relational expression tree.
//!
//! Trees are built upstream and handed to a [`SqlGenerator`](crate::generator::SqlGenerator)
//! for a single emission pass. Every node owns its children; nothing is shared
//! between trees.
//!
//! The tree is generic over an extension payload `X` so that a dialect can add
//! node kinds of its own (see [`mysql`]) without the base grammar knowing about
//! them. Trees that only use the base grammar use [`NoExtension`].
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub mod mysql;

/// Extension payload for trees that never carry dialect-specific nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoExtension {}

/// Abstract category of the value a node produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    String,
    Integer,
    Decimal,
    Double,
    Float,
    Boolean,
    DateTime,
    Date,
    Time,
    Binary,
    Other,
}

/// Pairs the database type name of a value with its abstract category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeMapping {
    /// The dialect-specific type name, e.g. `decimal(10,2)` or `int unsigned`.
    pub store_type: String,
    pub value_kind: ValueKind,
}

impl TypeMapping {
    pub fn new(store_type: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            store_type: store_type.into(),
            value_kind,
        }
    }

    pub fn is_string(&self) -> bool {
        self.value_kind == ValueKind::String
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Null,
    Bool(bool),
    /// Numeric text, emitted verbatim.
    Number(String),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Binary(Vec<u8>),
}

impl From<&str> for Constant {
    fn from(s: &str) -> Self {
        Constant::String(s.to_string())
    }
}
impl From<String> for Constant {
    fn from(s: String) -> Self {
        Constant::String(s)
    }
}
impl From<i64> for Constant {
    fn from(v: i64) -> Self {
        Constant::Number(v.to_string())
    }
}
impl From<bool> for Constant {
    fn from(v: bool) -> Self {
        Constant::Bool(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum BinaryOperator {
    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Subtract,
    #[strum(to_string = "*")]
    Multiply,
    #[strum(to_string = "/")]
    Divide,
    #[strum(to_string = "%")]
    Modulo,
    #[strum(to_string = "=")]
    Equal,
    #[strum(to_string = "<>")]
    NotEqual,
    #[strum(to_string = "<")]
    LessThan,
    #[strum(to_string = "<=")]
    LessThanOrEqual,
    #[strum(to_string = ">")]
    GreaterThan,
    #[strum(to_string = ">=")]
    GreaterThanOrEqual,
    #[strum(to_string = "AND")]
    And,
    #[strum(to_string = "OR")]
    Or,
    #[strum(to_string = "&")]
    BitwiseAnd,
    #[strum(to_string = "|")]
    BitwiseOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Negate,
    /// Type conversion; the node's type mapping names the target type.
    Convert,
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFunctionExpression<X = NoExtension> {
    pub name: String,
    pub arguments: Vec<SqlExpression<X>>,
    /// Niladic functions (`CURRENT_TIMESTAMP`) are emitted without parentheses.
    pub niladic: bool,
    pub type_mapping: Option<TypeMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlUnaryExpression<X = NoExtension> {
    pub operator: UnaryOperator,
    pub operand: Box<SqlExpression<X>>,
    pub type_mapping: Option<TypeMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlBinaryExpression<X = NoExtension> {
    pub operator: BinaryOperator,
    pub left: Box<SqlExpression<X>>,
    pub right: Box<SqlExpression<X>>,
    /// Category of the result, independent of the operands.
    pub value_kind: ValueKind,
    pub type_mapping: Option<TypeMapping>,
}

/// A WHEN branch for CASE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseWhen<X = NoExtension> {
    pub test: SqlExpression<X>,
    pub result: SqlExpression<X>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlExpression<X = NoExtension> {
    Constant {
        value: Constant,
        type_mapping: Option<TypeMapping>,
    },
    /// A bound parameter; `name` is the placeholder text, emitted as-is.
    Parameter {
        name: String,
        type_mapping: Option<TypeMapping>,
    },
    Column {
        table: Option<String>,
        name: String,
        type_mapping: Option<TypeMapping>,
    },
    /// Raw SQL text such as `*`.
    Fragment(String),
    Function(SqlFunctionExpression<X>),
    Unary(SqlUnaryExpression<X>),
    Binary(SqlBinaryExpression<X>),
    Like {
        match_expression: Box<SqlExpression<X>>,
        pattern: Box<SqlExpression<X>>,
        escape: Option<Box<SqlExpression<X>>>,
    },
    In {
        item: Box<SqlExpression<X>>,
        values: Vec<SqlExpression<X>>,
        negated: bool,
    },
    Case {
        operand: Option<Box<SqlExpression<X>>>,
        when_clauses: Vec<CaseWhen<X>>,
        else_result: Option<Box<SqlExpression<X>>>,
        type_mapping: Option<TypeMapping>,
    },
    Exists {
        subquery: Box<SelectExpression<X>>,
        negated: bool,
    },
    /// A scalar subquery.
    Subquery(Box<SelectExpression<X>>),
    Extension(X),
}

impl<X> SqlExpression<X> {
    /// The type mapping carried by this node, if it has one.
    pub fn type_mapping(&self) -> Option<&TypeMapping> {
        match self {
            Self::Constant { type_mapping, .. }
            | Self::Parameter { type_mapping, .. }
            | Self::Column { type_mapping, .. }
            | Self::Case { type_mapping, .. } => type_mapping.as_ref(),
            Self::Function(f) => f.type_mapping.as_ref(),
            Self::Unary(u) => u.type_mapping.as_ref(),
            Self::Binary(b) => b.type_mapping.as_ref(),
            Self::Fragment(_)
            | Self::Like { .. }
            | Self::In { .. }
            | Self::Exists { .. }
            | Self::Subquery(_)
            | Self::Extension(_) => None,
        }
    }

    pub fn constant(value: impl Into<Constant>) -> Self {
        Self::Constant {
            value: value.into(),
            type_mapping: None,
        }
    }

    /// A numeric constant; the value's text is emitted verbatim.
    pub fn number(value: impl std::fmt::Display) -> Self {
        Self::constant(Constant::Number(value.to_string()))
    }

    pub fn typed_constant(value: impl Into<Constant>, type_mapping: TypeMapping) -> Self {
        Self::Constant {
            value: value.into(),
            type_mapping: Some(type_mapping),
        }
    }

    pub fn parameter(name: impl Into<String>, type_mapping: Option<TypeMapping>) -> Self {
        Self::Parameter {
            name: name.into(),
            type_mapping,
        }
    }

    pub fn column(
        table: Option<&str>,
        name: impl Into<String>,
        type_mapping: Option<TypeMapping>,
    ) -> Self {
        Self::Column {
            table: table.map(str::to_string),
            name: name.into(),
            type_mapping,
        }
    }

    pub fn function(name: impl Into<String>, arguments: Vec<SqlExpression<X>>) -> Self {
        Self::Function(SqlFunctionExpression {
            name: name.into(),
            arguments,
            niladic: false,
            type_mapping: None,
        })
    }

    pub fn niladic_function(name: impl Into<String>) -> Self {
        Self::Function(SqlFunctionExpression {
            name: name.into(),
            arguments: Vec::new(),
            niladic: true,
            type_mapping: None,
        })
    }

    pub fn unary(operator: UnaryOperator, operand: SqlExpression<X>) -> Self {
        Self::Unary(SqlUnaryExpression {
            operator,
            operand: Box::new(operand),
            type_mapping: None,
        })
    }

    /// A type conversion of `operand` to `type_mapping`.
    pub fn convert(operand: SqlExpression<X>, type_mapping: TypeMapping) -> Self {
        Self::Unary(SqlUnaryExpression {
            operator: UnaryOperator::Convert,
            operand: Box::new(operand),
            type_mapping: Some(type_mapping),
        })
    }

    pub fn binary(
        operator: BinaryOperator,
        left: SqlExpression<X>,
        right: SqlExpression<X>,
        value_kind: ValueKind,
    ) -> Self {
        Self::Binary(SqlBinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            value_kind,
            type_mapping: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection<X = NoExtension> {
    pub expression: SqlExpression<X>,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering<X = NoExtension> {
    pub expression: SqlExpression<X>,
    pub ascending: bool,
}

/// A row source in the FROM clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource<X = NoExtension> {
    Table {
        name: String,
        schema: Option<String>,
        alias: Option<String>,
    },
    Subquery {
        select: Box<SelectExpression<X>>,
        alias: String,
    },
    InnerJoin {
        table: Box<TableSource<X>>,
        predicate: SqlExpression<X>,
    },
    LeftJoin {
        table: Box<TableSource<X>>,
        predicate: SqlExpression<X>,
    },
    CrossJoin(Box<TableSource<X>>),
    /// Correlated join: the inner source may reference sources to its left.
    CrossApply(Box<TableSource<X>>),
    /// Like [`TableSource::CrossApply`] but keeps outer rows with no match.
    OuterApply(Box<TableSource<X>>),
}

impl<X> TableSource<X> {
    pub fn table(name: impl Into<String>, alias: Option<&str>) -> Self {
        Self::Table {
            name: name.into(),
            schema: None,
            alias: alias.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectExpression<X = NoExtension> {
    pub distinct: bool,
    pub projection: Vec<Projection<X>>,
    pub tables: Vec<TableSource<X>>,
    pub predicate: Option<SqlExpression<X>>,
    pub group_by: Vec<SqlExpression<X>>,
    pub having: Option<SqlExpression<X>>,
    pub orderings: Vec<Ordering<X>>,
    pub limit: Option<SqlExpression<X>>,
    pub offset: Option<SqlExpression<X>>,
}

impl<X> Default for SelectExpression<X> {
    fn default() -> Self {
        Self {
            distinct: false,
            projection: Vec::new(),
            tables: Vec::new(),
            predicate: None,
            group_by: Vec::new(),
            having: None,
            orderings: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

impl<X> SelectExpression<X> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, expression: SqlExpression<X>, alias: Option<&str>) -> Self {
        self.projection.push(Projection {
            expression,
            alias: alias.map(str::to_string),
        });
        self
    }

    pub fn with_table(mut self, table: TableSource<X>) -> Self {
        self.tables.push(table);
        self
    }

    pub fn filter(mut self, predicate: SqlExpression<X>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn order_by(mut self, expression: SqlExpression<X>, ascending: bool) -> Self {
        self.orderings.push(Ordering {
            expression,
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: SqlExpression<X>) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: SqlExpression<X>) -> Self {
        self.offset = Some(offset);
        self
    }
}
