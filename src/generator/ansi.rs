//! Default emission for every base node kind.
//!
//! These functions are what [`SqlGenerator`]'s provided methods forward to. A
//! dialect that overrides a method calls the matching function here for the
//! cases it leaves alone.
use std::fmt::Write;

use super::{Parenthesize, SqlGenerator};
use crate::{
    ast::{
        Constant, NoExtension, SelectExpression, SqlBinaryExpression, SqlExpression as E,
        SqlFunctionExpression, SqlUnaryExpression, TableSource, UnaryOperator,
    },
    error::{Error, Result},
};

/// Generator for trees without extension nodes, using standard SQL syntax.
#[derive(Debug, Default)]
pub struct AnsiGenerator {
    sql: String,
}

impl AnsiGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SqlGenerator for AnsiGenerator {
    type Extension = NoExtension;

    fn sql(&mut self) -> &mut String {
        &mut self.sql
    }

    fn visit_extension(&mut self, extension: &NoExtension) -> Result<()> {
        match *extension {}
    }
}

/// Wraps `identifier` in `quote`, doubling any `quote` inside it.
pub fn quote_identifier(identifier: &str, quote: char) -> String {
    let mut res = String::with_capacity(identifier.len() + 2);
    res.push(quote);
    for c in identifier.chars() {
        if c == quote {
            res.push(quote);
        }
        res.push(c);
    }
    res.push(quote);
    res
}

pub fn escape_string_literal(s: &str) -> String {
    s.replace('\'', "''")
}

/// Runs `each` over `items`, writing `separator` between them.
pub fn generate_list<G, T>(
    g: &mut G,
    items: &[T],
    separator: &str,
    mut each: impl FnMut(&mut G, &T) -> Result<()>,
) -> Result<()>
where
    G: SqlGenerator + ?Sized,
{
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            g.sql().push_str(separator);
        }
        each(g, item)?;
    }
    Ok(())
}

pub fn visit<G: SqlGenerator + ?Sized>(g: &mut G, expr: &E<G::Extension>) -> Result<()> {
    match expr {
        E::Constant { value, .. } => visit_constant(g, value),
        E::Parameter { name, .. } => {
            g.sql().push_str(name);
            Ok(())
        }
        E::Column { table, name, .. } => {
            let column = match table {
                Some(table) => format!(
                    "{}.{}",
                    g.quote_identifier(table),
                    g.quote_identifier(name)
                ),
                None => g.quote_identifier(name),
            };
            g.sql().push_str(&column);
            Ok(())
        }
        E::Fragment(text) => {
            g.sql().push_str(text);
            Ok(())
        }
        E::Function(function) => g.visit_sql_function(function),
        E::Unary(unary) => g.visit_sql_unary(unary),
        E::Binary(binary) => g.visit_sql_binary(binary),
        E::Like {
            match_expression,
            pattern,
            escape,
        } => {
            g.visit(match_expression)?;
            g.sql().push_str(" LIKE ");
            g.visit(pattern)?;
            if let Some(escape) = escape {
                g.sql().push_str(" ESCAPE ");
                g.visit(escape)?;
            }
            Ok(())
        }
        E::In {
            item,
            values,
            negated,
        } => {
            visit_operand(g, item)?;
            g.sql()
                .push_str(if *negated { " NOT IN (" } else { " IN (" });
            generate_list(g, values, ", ", |g, v| g.visit(v))?;
            g.sql().push(')');
            Ok(())
        }
        E::Case {
            operand,
            when_clauses,
            else_result,
            ..
        } => {
            g.sql().push_str("CASE");
            if let Some(operand) = operand {
                g.sql().push(' ');
                g.visit(operand)?;
            }
            for when in when_clauses {
                g.sql().push_str(" WHEN ");
                g.visit(&when.test)?;
                g.sql().push_str(" THEN ");
                g.visit(&when.result)?;
            }
            if let Some(else_result) = else_result {
                g.sql().push_str(" ELSE ");
                g.visit(else_result)?;
            }
            g.sql().push_str(" END");
            Ok(())
        }
        E::Exists { subquery, negated } => {
            if *negated {
                g.sql().push_str("NOT ");
            }
            g.sql().push_str("EXISTS (");
            g.visit_select(subquery)?;
            g.sql().push(')');
            Ok(())
        }
        E::Subquery(select) => {
            g.sql().push('(');
            g.visit_select(select)?;
            g.sql().push(')');
            Ok(())
        }
        E::Extension(extension) => g.visit_extension(extension),
    }
}

/// Visits `operand`, parenthesized when it is itself an operator expression.
pub fn visit_operand<G: SqlGenerator + ?Sized>(g: &mut G, operand: &E<G::Extension>) -> Result<()> {
    let parens = Parenthesize::for_operand(operand);
    parens.open(g.sql());
    g.visit(operand)?;
    parens.close(g.sql());
    Ok(())
}

pub fn visit_constant<G: SqlGenerator + ?Sized>(g: &mut G, value: &Constant) -> Result<()> {
    match value {
        Constant::Null => g.sql().push_str("NULL"),
        Constant::Bool(v) => g.sql().push_str(if *v { "TRUE" } else { "FALSE" }),
        Constant::Number(v) => g.sql().push_str(v),
        Constant::String(v) => {
            let escaped = g.escape_string_literal(v);
            write!(g.sql(), "'{escaped}'")?;
        }
        Constant::Date(d) => write!(g.sql(), "DATE '{}'", d.format("%Y-%m-%d"))?,
        Constant::DateTime(dt) => write!(
            g.sql(),
            "TIMESTAMP '{}'",
            dt.format("%Y-%m-%d %H:%M:%S%.6f")
        )?,
        Constant::Time(t) => write!(g.sql(), "TIME '{}'", t.format("%H:%M:%S%.6f"))?,
        Constant::Binary(bytes) => {
            let sql = g.sql();
            sql.push_str("X'");
            for b in bytes {
                write!(sql, "{b:02X}")?;
            }
            sql.push('\'');
        }
    }
    Ok(())
}

pub fn visit_select<G: SqlGenerator + ?Sized>(
    g: &mut G,
    select: &SelectExpression<G::Extension>,
) -> Result<()> {
    g.sql().push_str("SELECT ");
    if select.distinct {
        g.sql().push_str("DISTINCT ");
    }

    if select.projection.is_empty() {
        g.sql().push('1');
    } else {
        generate_list(g, &select.projection, ", ", |g, projection| {
            g.visit(&projection.expression)?;
            if let Some(alias) = &projection.alias {
                let alias = g.quote_identifier(alias);
                write!(g.sql(), " AS {alias}")?;
            }
            Ok(())
        })?;
    }

    if !select.tables.is_empty() {
        g.sql().push_str("\nFROM ");
        generate_list(g, &select.tables, "\n", |g, table| g.visit_table_source(table))?;
    }

    if let Some(predicate) = &select.predicate {
        g.sql().push_str("\nWHERE ");
        g.visit(predicate)?;
    }

    if !select.group_by.is_empty() {
        g.sql().push_str("\nGROUP BY ");
        generate_list(g, &select.group_by, ", ", |g, e| g.visit(e))?;
    }

    if let Some(having) = &select.having {
        g.sql().push_str("\nHAVING ");
        g.visit(having)?;
    }

    if !select.orderings.is_empty() {
        g.sql().push_str("\nORDER BY ");
        generate_list(g, &select.orderings, ", ", |g, ordering| {
            g.visit(&ordering.expression)?;
            if !ordering.ascending {
                g.sql().push_str(" DESC");
            }
            Ok(())
        })?;
    }

    if select.limit.is_some() || select.offset.is_some() {
        g.sql().push('\n');
        g.generate_limit_offset(select)?;
    }
    Ok(())
}

/// `OFFSET n ROWS FETCH FIRST m ROWS ONLY`
pub fn generate_limit_offset<G: SqlGenerator + ?Sized>(
    g: &mut G,
    select: &SelectExpression<G::Extension>,
) -> Result<()> {
    if let Some(offset) = &select.offset {
        g.sql().push_str("OFFSET ");
        g.visit(offset)?;
        g.sql().push_str(" ROWS");
    }
    if let Some(limit) = &select.limit {
        if select.offset.is_some() {
            g.sql().push(' ');
        }
        g.sql().push_str("FETCH FIRST ");
        g.visit(limit)?;
        g.sql().push_str(" ROWS ONLY");
    }
    Ok(())
}

pub fn visit_table_source<G: SqlGenerator + ?Sized>(
    g: &mut G,
    table: &TableSource<G::Extension>,
) -> Result<()> {
    match table {
        TableSource::Table {
            name,
            schema,
            alias,
        } => {
            let mut text = String::new();
            if let Some(schema) = schema {
                text.push_str(&g.quote_identifier(schema));
                text.push('.');
            }
            text.push_str(&g.quote_identifier(name));
            if let Some(alias) = alias {
                text.push_str(" AS ");
                text.push_str(&g.quote_identifier(alias));
            }
            g.sql().push_str(&text);
            Ok(())
        }
        TableSource::Subquery { select, alias } => {
            g.sql().push('(');
            g.visit_select(select)?;
            let alias = g.quote_identifier(alias);
            write!(g.sql(), ") AS {alias}")?;
            Ok(())
        }
        TableSource::InnerJoin { table, predicate } => {
            g.sql().push_str("INNER JOIN ");
            g.visit_table_source(table)?;
            g.sql().push_str(" ON ");
            g.visit(predicate)
        }
        TableSource::LeftJoin { table, predicate } => {
            g.sql().push_str("LEFT JOIN ");
            g.visit_table_source(table)?;
            g.sql().push_str(" ON ");
            g.visit(predicate)
        }
        TableSource::CrossJoin(table) => {
            g.sql().push_str("CROSS JOIN ");
            g.visit_table_source(table)
        }
        TableSource::CrossApply(table) => g.visit_cross_apply(table),
        TableSource::OuterApply(table) => g.visit_outer_apply(table),
    }
}

pub fn visit_cross_apply<G: SqlGenerator + ?Sized>(
    g: &mut G,
    table: &TableSource<G::Extension>,
) -> Result<()> {
    g.sql().push_str("CROSS APPLY ");
    g.visit_table_source(table)
}

pub fn visit_outer_apply<G: SqlGenerator + ?Sized>(
    g: &mut G,
    table: &TableSource<G::Extension>,
) -> Result<()> {
    g.sql().push_str("OUTER APPLY ");
    g.visit_table_source(table)
}

pub fn visit_sql_function<G: SqlGenerator + ?Sized>(
    g: &mut G,
    function: &SqlFunctionExpression<G::Extension>,
) -> Result<()> {
    g.sql().push_str(&function.name);
    if function.niladic {
        return Ok(());
    }
    g.sql().push('(');
    generate_list(g, &function.arguments, ", ", |g, arg| g.visit(arg))?;
    g.sql().push(')');
    Ok(())
}

pub fn visit_sql_unary<G: SqlGenerator + ?Sized>(
    g: &mut G,
    unary: &SqlUnaryExpression<G::Extension>,
) -> Result<()> {
    match unary.operator {
        UnaryOperator::Not => {
            g.sql().push_str("NOT (");
            g.visit(&unary.operand)?;
            g.sql().push(')');
        }
        UnaryOperator::Negate => {
            g.sql().push('-');
            visit_operand(g, &unary.operand)?;
        }
        UnaryOperator::IsNull => {
            visit_operand(g, &unary.operand)?;
            g.sql().push_str(" IS NULL");
        }
        UnaryOperator::IsNotNull => {
            visit_operand(g, &unary.operand)?;
            g.sql().push_str(" IS NOT NULL");
        }
        UnaryOperator::Convert => {
            let mapping = unary
                .type_mapping
                .as_ref()
                .ok_or(Error::MissingSubExpression {
                    node: "Convert",
                    field: "type mapping",
                })?;
            g.sql().push_str("CAST(");
            g.visit(&unary.operand)?;
            write!(g.sql(), " AS {})", mapping.store_type)?;
        }
    }
    Ok(())
}

pub fn visit_sql_binary<G: SqlGenerator + ?Sized>(
    g: &mut G,
    binary: &SqlBinaryExpression<G::Extension>,
) -> Result<()> {
    visit_operand(g, &binary.left)?;
    write!(g.sql(), " {} ", binary.operator)?;
    visit_operand(g, &binary.right)
}
