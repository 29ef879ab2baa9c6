//! Filter and ordering compiler.
//!
//! Lowers a [`Filter`] tree into SQL predicate text plus the ordered list of
//! bindings for its placeholders.
//!
//! # Modes
//!
//! - **Parametric**: each comparison renders `?` and appends `(root type,
//!   value)` to the binding list. Bindings are collected depth-first, left to
//!   right, which is exactly the order the placeholders appear in the text.
//! - **Literal**: each comparison renders its value inline through the root
//!   type's literal encoding. Used only for constants, e.g. index filters.
//!
//! # Example
//!
//! ```ignore
//! let filter = eq(&age, 5).and(gt(&id, 10));
//! let compiled = compile_filter(&filter, None, Mode::Parametric)?;
//! assert_eq!(compiled.sql, r#"("age" = ? AND "id" > ?)"#);
//! ```

pub mod params;

pub use params::{PLACEHOLDER, ParamBuilder};

use crate::db::DbError;
use crate::db::backend::Binding;
use crate::db::escape::{qualified_column, quote_identifier};
use crate::queries::filter::{Filter, SortBy};

/// How comparison values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Parametric,
    Literal,
}

/// Statement or fragment text with its positional bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub bindings: Vec<Binding>,
}

impl CompiledQuery {
    pub fn new(sql: impl Into<String>, bindings: Vec<Binding>) -> Self {
        Self {
            sql: sql.into(),
            bindings,
        }
    }

    /// A statement with no parameters.
    pub fn plain(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// Get the number of parameters in this query.
    pub fn param_count(&self) -> usize {
        self.bindings.len()
    }
}

/// Compile a filter. Columns are qualified with `table` when given.
pub fn compile_filter<R>(filter: &Filter<R>, table: Option<&str>, mode: Mode) -> Result<CompiledQuery, DbError> {
    let mut params = ParamBuilder::new();
    let sql = write_filter(filter, table, mode, &mut params)?;
    Ok(CompiledQuery::new(sql, params.build()))
}

fn write_filter<R>(
    filter: &Filter<R>,
    table: Option<&str>,
    mode: Mode,
    params: &mut ParamBuilder,
) -> Result<String, DbError> {
    match filter {
        Filter::Compare(comparison) => {
            let column = qualified_column(table, &comparison.field.label);
            let symbol = comparison.operator.symbol()?;
            let operand = match mode {
                Mode::Parametric => params
                    .push(comparison.field.root, comparison.value.clone())
                    .to_string(),
                Mode::Literal => comparison.field.root.literal(&comparison.value),
            };
            Ok(format!("{} {} {}", column, symbol, operand))
        }
        Filter::Not(child) => Ok(format!("NOT ({})", write_filter(child, table, mode, params)?)),
        // Empty groups keep their identity element so the text stays valid.
        Filter::And(children) => write_group(children, " AND ", "1 = 1", table, mode, params),
        Filter::Or(children) => write_group(children, " OR ", "1 = 0", table, mode, params),
    }
}

fn write_group<R>(
    children: &[Filter<R>],
    separator: &str,
    empty: &str,
    table: Option<&str>,
    mode: Mode,
    params: &mut ParamBuilder,
) -> Result<String, DbError> {
    if children.is_empty() {
        return Ok(format!("({})", empty));
    }
    let parts = children
        .iter()
        .map(|child| write_filter(child, table, mode, params))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", parts.join(separator)))
}

/// Render an ordering term: `"label" ASC|DESC`.
pub fn compile_ordering<R>(ordering: &SortBy<R>) -> String {
    format!("{} {}", quote_identifier(&ordering.field.label), ordering.order.keyword())
}
