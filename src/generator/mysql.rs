//! MySQL (and MariaDB) emission.
//!
//! Only the node kinds MySQL spells differently are overridden here; every
//! other node falls through to [`ansi`].
use std::fmt::Write;

use super::{SqlGenerator, ansi};
use crate::{
    ast::{
        BinaryOperator, SelectExpression, SqlBinaryExpression, SqlExpression,
        SqlFunctionExpression, SqlUnaryExpression, TableSource, UnaryOperator, ValueKind,
        mysql::{MySqlBinaryOperator, MySqlExpression},
    },
    capabilities::{Capabilities, ServerVersion},
    cast::CastTable,
    error::{Error, Result},
};

/// MySQL cannot express OFFSET without a LIMIT, so a LIMIT this large is
///  emitted when only an offset is wanted.
pub const LIMIT_UPPER_BOUND: u64 = 18_446_744_073_709_551_610;

/// Function names with this prefix are system variables, not calls.
pub const SYSTEM_VARIABLE_SIGIL: &str = "@@";

#[derive(Debug, Clone)]
pub struct MySqlGenerator {
    sql: String,
    capabilities: Capabilities,
    cast_table: CastTable,
}

impl MySqlGenerator {
    pub fn new(capabilities: Capabilities) -> Self {
        Self::with_cast_table(capabilities, CastTable::mysql())
    }

    pub fn with_cast_table(capabilities: Capabilities, cast_table: CastTable) -> Self {
        Self {
            sql: String::new(),
            capabilities,
            cast_table,
        }
    }

    pub fn for_server_version(version: &ServerVersion) -> Self {
        Self::new(Capabilities::from_provider(version))
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn is_string_concatenation(binary: &SqlBinaryExpression<MySqlExpression>) -> bool {
        // A nested operator without its own mapping is typed by its value kind,
        //  so `a + b + c` stays a concatenation all the way up.
        let is_string = |e: &SqlExpression<MySqlExpression>| match e {
            SqlExpression::Binary(inner) if inner.type_mapping.is_none() => {
                inner.value_kind == ValueKind::String
            }
            e => e.type_mapping().is_some_and(|mapping| mapping.is_string()),
        };
        binary.operator == BinaryOperator::Add
            && binary.value_kind == ValueKind::String
            && is_string(&binary.left)
            && is_string(&binary.right)
    }

    fn visit_convert(&mut self, unary: &SqlUnaryExpression<MySqlExpression>) -> Result<()> {
        let mapping = unary
            .type_mapping
            .as_ref()
            .ok_or(Error::MissingSubExpression {
                node: "Convert",
                field: "type mapping",
            })?;
        let target = self
            .cast_table
            .resolve(&mapping.store_type, &self.capabilities)?;

        // Casting to DECIMAL and adding 0e0 yields a DOUBLE on servers that
        //  cannot CAST to DOUBLE/FLOAT directly.
        if target.decimal_workaround {
            self.sql.push('(');
        }
        self.sql.push_str("CAST(");
        self.visit(&unary.operand)?;
        write!(self.sql, " AS {})", target.keyword)?;
        if target.decimal_workaround {
            self.sql.push_str(" + 0e0)");
        }
        Ok(())
    }
}

impl SqlGenerator for MySqlGenerator {
    type Extension = MySqlExpression;

    fn sql(&mut self) -> &mut String {
        &mut self.sql
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        ansi::quote_identifier(identifier, '`')
    }

    // Backslash is an escape character inside MySQL string literals
    fn escape_string_literal(&self, literal: &str) -> String {
        let mut res = String::with_capacity(literal.len());
        for c in literal.chars() {
            match c {
                '\'' => res.push_str("''"),
                '\\' => res.push_str("\\\\"),
                c => res.push(c),
            }
        }
        res
    }

    fn generate_limit_offset(&mut self, select: &SelectExpression<MySqlExpression>) -> Result<()> {
        if let Some(limit) = &select.limit {
            self.sql.push_str("LIMIT ");
            self.visit(limit)?;
        }

        if let Some(offset) = &select.offset {
            if select.limit.is_none() {
                tracing::debug!(
                    target: "mysql_expr",
                    "offset without limit, emitting LIMIT {LIMIT_UPPER_BOUND}"
                );
                write!(self.sql, "LIMIT {LIMIT_UPPER_BOUND}")?;
            }
            self.sql.push_str(" OFFSET ");
            self.visit(offset)?;
        }
        Ok(())
    }

    fn visit_sql_function(
        &mut self,
        function: &SqlFunctionExpression<MySqlExpression>,
    ) -> Result<()> {
        if function.name.starts_with(SYSTEM_VARIABLE_SIGIL) {
            self.sql.push_str(&function.name);
            return Ok(());
        }
        ansi::visit_sql_function(self, function)
    }

    fn visit_sql_unary(&mut self, unary: &SqlUnaryExpression<MySqlExpression>) -> Result<()> {
        match unary.operator {
            UnaryOperator::Convert => self.visit_convert(unary),
            _ => ansi::visit_sql_unary(self, unary),
        }
    }

    fn visit_sql_binary(&mut self, binary: &SqlBinaryExpression<MySqlExpression>) -> Result<()> {
        // '+' never concatenates in MySQL
        if Self::is_string_concatenation(binary) {
            self.sql.push_str("CONCAT(");
            self.visit(&binary.left)?;
            self.sql.push_str(", ");
            self.visit(&binary.right)?;
            self.sql.push(')');
            return Ok(());
        }
        ansi::visit_sql_binary(self, binary)
    }

    // No APPLY in MySQL: a LATERAL join on an always-true condition is
    //  equivalent.
    fn visit_cross_apply(&mut self, table: &TableSource<MySqlExpression>) -> Result<()> {
        self.sql.push_str("JOIN LATERAL ");
        self.visit_table_source(table)?;
        self.sql.push_str(" ON TRUE");
        Ok(())
    }

    fn visit_outer_apply(&mut self, table: &TableSource<MySqlExpression>) -> Result<()> {
        self.sql.push_str("LEFT JOIN LATERAL ");
        self.visit_table_source(table)?;
        self.sql.push_str(" ON TRUE");
        Ok(())
    }

    fn visit_extension(&mut self, extension: &MySqlExpression) -> Result<()> {
        match extension {
            MySqlExpression::Regexp {
                match_expression,
                pattern,
            } => {
                self.visit(match_expression)?;
                self.sql.push_str(" REGEXP ");
                self.visit(pattern)
            }
            MySqlExpression::Collate {
                value,
                charset,
                collation,
            } => {
                if charset.is_empty() {
                    return Err(Error::MissingSubExpression {
                        node: "Collate",
                        field: "charset",
                    });
                }
                if collation.is_empty() {
                    return Err(Error::MissingSubExpression {
                        node: "Collate",
                        field: "collation",
                    });
                }
                self.sql.push_str("CONVERT(");
                self.visit(value)?;
                write!(self.sql, " USING {charset}) COLLATE {collation}")?;
                Ok(())
            }
            MySqlExpression::Binary {
                operator,
                left,
                right,
            } => {
                let token = match operator {
                    MySqlBinaryOperator::IntegerDivision => "DIV",
                    other => return Err(Error::UnsupportedOperator(format!("{other:?}"))),
                };
                self.sql.push('(');
                self.visit(left)?;
                write!(self.sql, ") {token} (")?;
                self.visit(right)?;
                self.sql.push(')');
                Ok(())
            }
            MySqlExpression::ComplexFunctionArgument { parts } => {
                ansi::generate_list(self, parts, " ", |g, part| g.visit(part))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Constant, TypeMapping, mysql::MySqlSqlExpression};

    type Expr = MySqlSqlExpression;

    fn capable() -> MySqlGenerator {
        MySqlGenerator::new(Capabilities::all())
    }

    fn legacy() -> MySqlGenerator {
        MySqlGenerator::new(Capabilities::none())
    }

    fn sql(expr: &Expr) -> String {
        capable().generate_expression(expr).unwrap()
    }

    fn x() -> Expr {
        Expr::column(None, "x", None)
    }

    fn string_column(name: &str) -> Expr {
        Expr::column(None, name, Some(TypeMapping::new("varchar(50)", ValueKind::String)))
    }

    fn int_column(name: &str) -> Expr {
        Expr::column(None, name, Some(TypeMapping::new("int", ValueKind::Integer)))
    }

    fn cast(store_type: &str) -> Expr {
        Expr::convert(x(), TypeMapping::new(store_type, ValueKind::Other))
    }

    fn limit_offset(limit: Option<u32>, offset: Option<u32>) -> String {
        let mut select = SelectExpression::new();
        select.limit = limit.map(|v| Expr::number(v));
        select.offset = offset.map(|v| Expr::number(v));
        let mut g = capable();
        g.generate_limit_offset(&select).unwrap();
        g.sql
    }

    #[test]
    fn offset_without_limit_gets_the_sentinel() {
        assert_eq!(
            limit_offset(None, Some(5)),
            "LIMIT 18446744073709551610 OFFSET 5"
        );
    }

    #[test]
    fn limit_and_offset() {
        assert_eq!(limit_offset(Some(10), Some(5)), "LIMIT 10 OFFSET 5");
        assert_eq!(limit_offset(Some(10), None), "LIMIT 10");
        assert_eq!(limit_offset(None, None), "");
    }

    #[test]
    fn limit_can_be_a_parameter() {
        let select = SelectExpression::new()
            .limit(Expr::parameter("@__p_0", None))
            .offset(Expr::parameter("@__p_1", None));
        let mut g = capable();
        g.generate_limit_offset(&select).unwrap();
        assert_eq!(g.sql, "LIMIT @__p_0 OFFSET @__p_1");
    }

    #[test]
    fn casts() {
        assert_eq!(sql(&cast("int")), "CAST(`x` AS signed)");
        assert_eq!(sql(&cast("bigint")), "CAST(`x` AS signed)");
        assert_eq!(sql(&cast("int unsigned")), "CAST(`x` AS unsigned)");
        assert_eq!(sql(&cast("decimal(10,2)")), "CAST(`x` AS decimal(65,30))");
        assert_eq!(sql(&cast("varchar(255)")), "CAST(`x` AS char)");
        assert_eq!(sql(&cast("datetime(6)")), "CAST(`x` AS datetime(6))");
    }

    #[test]
    fn unsupported_cast() {
        assert_eq!(
            capable().generate_expression(&cast("geometry")),
            Err(Error::UnsupportedCast {
                store_type: "geometry".into()
            })
        );
    }

    #[test]
    fn floating_point_casts_depend_on_the_server() {
        assert_eq!(sql(&cast("double")), "CAST(`x` AS double)");
        assert_eq!(sql(&cast("float")), "CAST(`x` AS float)");

        let mut g = legacy();
        assert_eq!(
            g.generate_expression(&cast("double")).unwrap(),
            "(CAST(`x` AS decimal(65,30)) + 0e0)"
        );
        assert_eq!(
            g.generate_expression(&cast("float")).unwrap(),
            "(CAST(`x` AS decimal(65,30)) + 0e0)"
        );
        // Non floating point casts are untouched by the workaround
        assert_eq!(
            g.generate_expression(&cast("int")).unwrap(),
            "CAST(`x` AS signed)"
        );
    }

    #[test]
    fn generator_from_server_version() {
        let version: ServerVersion = "5.7.31-log".parse().unwrap();
        let mut g = MySqlGenerator::for_server_version(&version);
        assert_eq!(g.capabilities(), Capabilities::none());
        assert_eq!(
            g.generate_expression(&cast("double")).unwrap(),
            "(CAST(`x` AS decimal(65,30)) + 0e0)"
        );
    }

    #[test]
    fn custom_cast_table() {
        let table = CastTable::mysql().with_mapping(crate::cast::CastMapping::new("char", &["enum"]));
        let mut g = MySqlGenerator::with_cast_table(Capabilities::all(), table);
        assert_eq!(
            g.generate_expression(&cast("enum('a')")).unwrap(),
            "CAST(`x` AS char)"
        );
    }

    #[test]
    fn string_addition_becomes_concat() {
        let add = Expr::binary(
            BinaryOperator::Add,
            string_column("a"),
            string_column("b"),
            ValueKind::String,
        );
        assert_eq!(sql(&add), "CONCAT(`a`, `b`)");
    }

    #[test]
    fn chained_string_addition_nests_concat() {
        let ab = Expr::binary(
            BinaryOperator::Add,
            string_column("a"),
            string_column("b"),
            ValueKind::String,
        );
        let abc = Expr::binary(BinaryOperator::Add, ab, string_column("c"), ValueKind::String);
        assert_eq!(sql(&abc), "CONCAT(CONCAT(`a`, `b`), `c`)");

        // a numeric sum on the left keeps the outer `+` numeric
        let sum = Expr::binary(
            BinaryOperator::Add,
            int_column("a"),
            int_column("b"),
            ValueKind::Integer,
        );
        let mixed = Expr::binary(BinaryOperator::Add, sum, string_column("c"), ValueKind::String);
        assert_eq!(sql(&mixed), "(`a` + `b`) + `c`");
    }

    #[test]
    fn numeric_addition_stays_infix() {
        let add = Expr::binary(
            BinaryOperator::Add,
            int_column("a"),
            int_column("b"),
            ValueKind::Integer,
        );
        assert_eq!(sql(&add), "`a` + `b`");
    }

    #[test]
    fn concat_needs_every_side_to_be_a_string() {
        // untyped right operand
        let add = Expr::binary(BinaryOperator::Add, string_column("a"), x(), ValueKind::String);
        assert_eq!(sql(&add), "`a` + `x`");

        let sub = Expr::binary(
            BinaryOperator::Subtract,
            string_column("a"),
            string_column("b"),
            ValueKind::String,
        );
        assert_eq!(sql(&sub), "`a` - `b`");
    }

    #[test]
    fn lateral_joins() {
        let t = || TableSource::table("t", None);
        let mut g = capable();
        g.visit_table_source(&TableSource::CrossApply(Box::new(t()))).unwrap();
        assert_eq!(g.sql, "JOIN LATERAL `t` ON TRUE");

        let mut g = capable();
        g.visit_table_source(&TableSource::OuterApply(Box::new(t()))).unwrap();
        assert_eq!(g.sql, "LEFT JOIN LATERAL `t` ON TRUE");
    }

    #[test]
    fn regexp() {
        let expr = MySqlExpression::regexp(Expr::column(None, "a", None), Expr::column(None, "b", None));
        assert_eq!(sql(&expr), "`a` REGEXP `b`");
    }

    #[test]
    fn collate() {
        let expr = MySqlExpression::collate(Expr::column(None, "v", None), "utf8", "utf8_general_ci");
        assert_eq!(sql(&expr), "CONVERT(`v` USING utf8) COLLATE utf8_general_ci");
    }

    #[test]
    fn collate_requires_charset_and_collation() {
        let expr = MySqlExpression::collate(x(), "", "utf8_general_ci");
        assert_eq!(
            capable().generate_expression(&expr),
            Err(Error::MissingSubExpression {
                node: "Collate",
                field: "charset"
            })
        );
        let expr = MySqlExpression::collate(x(), "utf8", "");
        assert!(capable().generate_expression(&expr).is_err());
    }

    #[test]
    fn integer_division() {
        let expr = MySqlExpression::integer_division(Expr::column(None, "a", None), Expr::column(None, "b", None));
        assert_eq!(sql(&expr), "(`a`) DIV (`b`)");
    }

    #[test]
    fn other_custom_operators_fail_fast() {
        let expr = MySqlExpression::binary(MySqlBinaryOperator::NonOptimizedEqual, x(), x());
        assert_eq!(
            capable().generate_expression(&expr),
            Err(Error::UnsupportedOperator("NonOptimizedEqual".into()))
        );
    }

    #[test]
    fn complex_function_argument_is_space_separated() {
        let interval = MySqlExpression::complex_function_argument(vec![
            Expr::Fragment("INTERVAL".into()),
            Expr::number(1),
            Expr::Fragment("DAY".into()),
        ]);
        let expr = Expr::function("DATE_ADD", vec![Expr::column(None, "d", None), interval]);
        assert_eq!(sql(&expr), "DATE_ADD(`d`, INTERVAL 1 DAY)");
    }

    #[test]
    fn system_variables_are_not_called() {
        assert_eq!(sql(&Expr::function("@@version", vec![])), "@@version");
        assert_eq!(sql(&Expr::function("VERSION", vec![])), "VERSION()");
    }

    #[test]
    fn string_literals_escape_backslashes() {
        assert_eq!(sql(&Expr::constant(r"C:\temp's")), r"'C:\\temp''s'");
        assert_eq!(sql(&Expr::constant(Constant::Null)), "NULL");
    }
}
