use crate::{
    ast::{
        SelectExpression, SqlBinaryExpression, SqlExpression, SqlFunctionExpression,
        SqlUnaryExpression, TableSource,
    },
    error::Result,
};

pub mod ansi;
pub mod mysql;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Parenthesize {
    #[default]
    Yes,
    No,
}

impl Parenthesize {
    /// Operands that are themselves operator expressions get parentheses so
    ///  that the emitted text keeps the tree's grouping.
    pub fn for_operand<X>(operand: &SqlExpression<X>) -> Self {
        match operand {
            SqlExpression::Binary(_) | SqlExpression::Like { .. } => Parenthesize::Yes,
            _ => Parenthesize::No,
        }
    }

    pub fn open(&self, out: &mut String) {
        self.write(out, "(")
    }
    pub fn close(&self, out: &mut String) {
        self.write(out, ")")
    }
    fn write(&self, out: &mut String, s: &str) {
        if self == &Parenthesize::Yes {
            out.push_str(s);
        }
    }
}

/// Emits SQL text for an expression tree into a buffer it owns.
///
/// Every node kind has a method here whose default forwards to the function
///  of the same name in [`ansi`]. A dialect overrides the methods for the nodes
///  it renders differently and calls back into [`ansi`] for the cases it does
///  not care about:
///
/// ```rust
/// # use mysql_expr::{ast::{NoExtension, SqlFunctionExpression}, generator::{ansi, SqlGenerator}, Result};
/// #[derive(Default)]
/// struct Shouting {
///     sql: String,
/// }
///
/// impl SqlGenerator for Shouting {
///     type Extension = NoExtension;
///
///     fn sql(&mut self) -> &mut String {
///         &mut self.sql
///     }
///
///     fn visit_sql_function(&mut self, function: &SqlFunctionExpression) -> Result<()> {
///         if function.name == "NOW" {
///             // This is the place to handle what differs from ANSI
///             self.sql.push_str("CURRENT_TIMESTAMP");
///             return Ok(());
///         }
///
///         // Everything else can be delegated
///         ansi::visit_sql_function(self, function)
///     }
///
///     fn visit_extension(&mut self, extension: &NoExtension) -> Result<()> {
///         match *extension {}
///     }
/// }
/// ```
///
/// Traversal is a single depth-first, left-to-right pass. Nothing is visited
///  twice and nothing already written is revisited.
pub trait SqlGenerator {
    /// The dialect's extension node payload.
    type Extension;

    /// The output buffer for the current compilation.
    fn sql(&mut self) -> &mut String;

    fn quote_identifier(&self, identifier: &str) -> String {
        ansi::quote_identifier(identifier, '"')
    }

    /// Escapes the body of a single-quoted string literal.
    fn escape_string_literal(&self, literal: &str) -> String {
        ansi::escape_string_literal(literal)
    }

    fn visit(&mut self, expr: &SqlExpression<Self::Extension>) -> Result<()> {
        ansi::visit(self, expr)
    }

    fn visit_select(&mut self, select: &SelectExpression<Self::Extension>) -> Result<()> {
        ansi::visit_select(self, select)
    }

    /// Emits the row-limiting clause of `select`, or nothing when it has
    ///  neither a limit nor an offset.
    fn generate_limit_offset(&mut self, select: &SelectExpression<Self::Extension>) -> Result<()> {
        ansi::generate_limit_offset(self, select)
    }

    fn visit_table_source(&mut self, table: &TableSource<Self::Extension>) -> Result<()> {
        ansi::visit_table_source(self, table)
    }

    fn visit_sql_function(
        &mut self,
        function: &SqlFunctionExpression<Self::Extension>,
    ) -> Result<()> {
        ansi::visit_sql_function(self, function)
    }

    fn visit_sql_unary(&mut self, unary: &SqlUnaryExpression<Self::Extension>) -> Result<()> {
        ansi::visit_sql_unary(self, unary)
    }

    fn visit_sql_binary(&mut self, binary: &SqlBinaryExpression<Self::Extension>) -> Result<()> {
        ansi::visit_sql_binary(self, binary)
    }

    /// `table` is the correlated source being applied.
    fn visit_cross_apply(&mut self, table: &TableSource<Self::Extension>) -> Result<()> {
        ansi::visit_cross_apply(self, table)
    }

    /// `table` is the correlated source being applied.
    fn visit_outer_apply(&mut self, table: &TableSource<Self::Extension>) -> Result<()> {
        ansi::visit_outer_apply(self, table)
    }

    /// Called for every [`SqlExpression::Extension`] node.
    fn visit_extension(&mut self, extension: &Self::Extension) -> Result<()>;

    /// Compiles a whole query. The buffer is reset first; on error nothing
    ///  partial is returned.
    fn generate(&mut self, select: &SelectExpression<Self::Extension>) -> Result<String> {
        self.sql().clear();
        let res = self.visit_select(select);
        let sql = std::mem::take(self.sql());
        res?;
        tracing::trace!(target: "mysql_expr", %sql, "generated query");
        Ok(sql)
    }

    /// Compiles a single expression, see [`SqlGenerator::generate`].
    fn generate_expression(&mut self, expr: &SqlExpression<Self::Extension>) -> Result<String> {
        self.sql().clear();
        let res = self.visit(expr);
        let sql = std::mem::take(self.sql());
        res?;
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, ValueKind};

    #[test]
    fn only_operator_operands_are_parenthesized() {
        let column: SqlExpression = SqlExpression::column(None, "a", None);
        assert_eq!(Parenthesize::for_operand(&column), Parenthesize::No);

        let sum = SqlExpression::binary(
            BinaryOperator::Add,
            column.clone(),
            column,
            ValueKind::Integer,
        );
        assert_eq!(Parenthesize::for_operand(&sum), Parenthesize::Yes);

        let mut out = String::new();
        Parenthesize::Yes.open(&mut out);
        Parenthesize::No.open(&mut out);
        Parenthesize::Yes.close(&mut out);
        assert_eq!(out, "()");
    }
}
