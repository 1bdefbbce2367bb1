//! Node kinds that only exist in MySQL trees.
use super::SqlExpression;

/// A tree that may contain MySQL extension nodes.
pub type MySqlSqlExpression = SqlExpression<MySqlExpression>;
pub type MySqlSelectExpression = super::SelectExpression<MySqlExpression>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MySqlBinaryOperator {
    /// `DIV`
    IntegerDivision,
    /// Equality that must bypass index-friendly rewriting. Upstream builders
    ///  may produce it, but it has no emission rule here.
    NonOptimizedEqual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MySqlExpression {
    Regexp {
        match_expression: Box<MySqlSqlExpression>,
        pattern: Box<MySqlSqlExpression>,
    },
    Collate {
        value: Box<MySqlSqlExpression>,
        charset: String,
        collation: String,
    },
    Binary {
        operator: MySqlBinaryOperator,
        left: Box<MySqlSqlExpression>,
        right: Box<MySqlSqlExpression>,
    },
    /// Several tokens occupying one argument position, e.g. the
    ///  `INTERVAL 1 DAY` argument of `DATE_ADD`.
    ComplexFunctionArgument { parts: Vec<MySqlSqlExpression> },
}

impl MySqlExpression {
    pub fn regexp(
        match_expression: MySqlSqlExpression,
        pattern: MySqlSqlExpression,
    ) -> MySqlSqlExpression {
        SqlExpression::Extension(Self::Regexp {
            match_expression: Box::new(match_expression),
            pattern: Box::new(pattern),
        })
    }

    pub fn collate(
        value: MySqlSqlExpression,
        charset: impl Into<String>,
        collation: impl Into<String>,
    ) -> MySqlSqlExpression {
        SqlExpression::Extension(Self::Collate {
            value: Box::new(value),
            charset: charset.into(),
            collation: collation.into(),
        })
    }

    pub fn binary(
        operator: MySqlBinaryOperator,
        left: MySqlSqlExpression,
        right: MySqlSqlExpression,
    ) -> MySqlSqlExpression {
        SqlExpression::Extension(Self::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn integer_division(
        left: MySqlSqlExpression,
        right: MySqlSqlExpression,
    ) -> MySqlSqlExpression {
        Self::binary(MySqlBinaryOperator::IntegerDivision, left, right)
    }

    pub fn complex_function_argument(parts: Vec<MySqlSqlExpression>) -> MySqlSqlExpression {
        SqlExpression::Extension(Self::ComplexFunctionArgument { parts })
    }
}
