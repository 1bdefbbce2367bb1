//! Compiles provider-neutral relational expression trees into MySQL SQL text.
//!
//! Build a tree with [`ast`], pick the server's [`capabilities::Capabilities`]
//! and hand both to a [`generator::mysql::MySqlGenerator`]:
//!
//! ```rust
//! use mysql_expr::{
//!     ast::{SelectExpression, SqlExpression, TableSource, TypeMapping, ValueKind},
//!     capabilities::ServerVersion,
//!     generator::{SqlGenerator, mysql::MySqlGenerator},
//! };
//!
//! let version: ServerVersion = "5.7.31-log".parse()?;
//! let query = SelectExpression::new()
//!     .project(
//!         SqlExpression::convert(
//!             SqlExpression::column(Some("o"), "Total", None),
//!             TypeMapping::new("double", ValueKind::Double),
//!         ),
//!         None,
//!     )
//!     .with_table(TableSource::table("Orders", Some("o")))
//!     .offset(SqlExpression::number(20));
//!
//! let sql = MySqlGenerator::for_server_version(&version).generate(&query)?;
//! assert_eq!(
//!     sql,
//!     "SELECT (CAST(`o`.`Total` AS decimal(65,30)) + 0e0)\n\
//!      FROM `Orders` AS `o`\n\
//!      LIMIT 18446744073709551610 OFFSET 20"
//! );
//! # Ok::<(), mysql_expr::Error>(())
//! ```
pub mod ast;
pub mod capabilities;
pub mod cast;
pub mod error;
pub mod generator;


pub use error::{Error, Result};
