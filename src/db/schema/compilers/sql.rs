//! SQL statement compiler.
//!
//! Generates the DDL and DML a typed table issues, from its [`Schema`]. Every
//! identifier is double-quoted and every caller-supplied value is bound as a
//! `?` parameter. Only index filters and column defaults are rendered inline.

use crate::db::DbError;
use crate::db::backend::Binding;
use crate::db::escape::{qualified_column, quote_identifier};
use crate::db::schema::definition::{Column, Schema};
use crate::db::schema::index::Index;
use crate::db::schema::naming;
use crate::db::schema::types::RootType;
use crate::db::value::Value;
use crate::queries::builder::{CompiledQuery, Mode, PLACEHOLDER, compile_filter, compile_ordering};
use crate::queries::filter::{Filter, SortBy};

/// Compiler for generating SQL statements from schema definitions.
pub struct SqlCompiler;

impl SqlCompiler {
    /// Column definition: `"label" TYPE [PRIMARY KEY] [NOT NULL] [UNIQUE] [DEFAULT lit]`.
    pub fn column_def<R>(column: &dyn Column<R>, primary_key: bool) -> String {
        let mut def = format!("{} {}", quote_identifier(column.label()), column.root_type().sql_type());
        if primary_key {
            def.push_str(" PRIMARY KEY");
        }
        for constraint in column.column_constraints() {
            def.push(' ');
            def.push_str(&constraint.sql());
        }
        def
    }

    /// `CREATE TABLE "<table>" (<pk def>, <field defs>)`
    pub fn compile_create_table<K, R>(schema: &Schema<K, R>, table: &str) -> String
    where
        K: Clone + Send + Sync + 'static,
        R: 'static,
    {
        let defs = schema
            .columns()
            .enumerate()
            .map(|(i, column)| Self::column_def(column, i == 0))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({})", quote_identifier(table), defs)
    }

    /// Comma-separated column list, optionally table-qualified.
    pub fn column_list<'a>(table: Option<&str>, labels: impl IntoIterator<Item = &'a str>) -> String {
        labels
            .into_iter()
            .map(|label| qualified_column(table, label))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn placeholders(count: usize) -> String {
        vec![PLACEHOLDER; count].join(", ")
    }

    /// `INSERT INTO "<table>" (<cols>) VALUES (?, ...)` bound to one row.
    pub fn compile_insert<K, R>(schema: &Schema<K, R>, table: &str, row: &R) -> CompiledQuery
    where
        K: Clone + Send + Sync + 'static,
        R: 'static,
    {
        let labels = schema.labels();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(table),
            Self::column_list(None, labels.iter().copied()),
            Self::placeholders(labels.len())
        );
        CompiledQuery::new(sql, Self::row_bindings(schema, row))
    }

    /// `UPDATE "<table>" SET "c" = ?, ... WHERE "<table>"."<pk>" = ?`.
    ///
    /// Binds every column of the row (primary key first), then the key again
    /// for the WHERE clause.
    pub fn compile_update<K, R>(schema: &Schema<K, R>, table: &str, row: &R) -> CompiledQuery
    where
        K: Clone + Send + Sync + 'static,
        R: 'static,
    {
        let assignments = schema
            .columns()
            .map(|c| format!("{} = {}", quote_identifier(c.label()), PLACEHOLDER))
            .collect::<Vec<_>>()
            .join(", ");
        let primary_key = schema.primary_key();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = {}",
            quote_identifier(table),
            assignments,
            qualified_column(Some(table), primary_key.label()),
            PLACEHOLDER
        );

        let mut bindings = Self::row_bindings(schema, row);
        bindings.push(Binding::new(
            Column::root_type(primary_key),
            Column::encode_row(primary_key, row),
        ));
        CompiledQuery::new(sql, bindings)
    }

    fn row_bindings<K, R>(schema: &Schema<K, R>, row: &R) -> Vec<Binding>
    where
        K: Clone + Send + Sync + 'static,
        R: 'static,
    {
        schema
            .columns()
            .map(|c| Binding::new(c.root_type(), c.encode_row(row)))
            .collect()
    }

    /// `SELECT "<t>"."<c>", ... FROM "<t>" [WHERE ...] [ORDER BY ...]`
    pub fn compile_select<K, R>(
        schema: &Schema<K, R>,
        table: &str,
        filter: Option<&Filter<R>>,
        ordering: Option<&SortBy<R>>,
    ) -> Result<CompiledQuery, DbError>
    where
        K: Clone + Send + Sync + 'static,
        R: 'static,
    {
        let mut sql = format!(
            "SELECT {} FROM {}",
            Self::column_list(Some(table), schema.labels()),
            quote_identifier(table)
        );
        let mut bindings = Vec::new();
        if let Some(filter) = filter {
            let compiled = compile_filter(filter, Some(table), Mode::Parametric)?;
            sql.push_str(" WHERE ");
            sql.push_str(&compiled.sql);
            bindings = compiled.bindings;
        }
        if let Some(ordering) = ordering {
            sql.push_str(" ORDER BY ");
            sql.push_str(&compile_ordering(ordering));
        }
        Ok(CompiledQuery::new(sql, bindings))
    }

    /// Append `LIMIT ?` to a compiled select, binding `limit` last.
    pub fn with_limit(mut compiled: CompiledQuery, limit: usize) -> CompiledQuery {
        compiled.sql.push_str(" LIMIT ");
        compiled.sql.push_str(PLACEHOLDER);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        compiled.bindings.push(Binding::new(RootType::BigInt, Value::Integer(limit)));
        compiled
    }

    /// `DELETE FROM "<t>" [WHERE ...]`
    pub fn compile_delete<R>(table: &str, filter: Option<&Filter<R>>) -> Result<CompiledQuery, DbError> {
        let mut sql = format!("DELETE FROM {}", quote_identifier(table));
        let mut bindings = Vec::new();
        if let Some(filter) = filter {
            let compiled = compile_filter(filter, Some(table), Mode::Parametric)?;
            sql.push_str(" WHERE ");
            sql.push_str(&compiled.sql);
            bindings = compiled.bindings;
        }
        Ok(CompiledQuery::new(sql, bindings))
    }

    /// `INSERT INTO "<to>" (<cols>) SELECT "<from>"."<c>", ... FROM "<from>"`
    pub fn compile_copy(from: &str, to: &str, columns: &[&str]) -> String {
        format!(
            "INSERT INTO {} ({}) SELECT {} FROM {}",
            quote_identifier(to),
            Self::column_list(None, columns.iter().copied()),
            Self::column_list(Some(from), columns.iter().copied()),
            quote_identifier(from)
        )
    }

    pub fn compile_rename(from: &str, to: &str) -> String {
        format!("ALTER TABLE {} RENAME TO {}", quote_identifier(from), quote_identifier(to))
    }

    pub fn compile_drop(table: &str) -> String {
        format!("DROP TABLE {}", quote_identifier(table))
    }

    /// `CREATE INDEX "<t>:indexes:<name>" ON "<t>" (<filters>, <orderings>, <fields>)`
    ///
    /// Filters are rendered with inline literals and unqualified columns.
    pub fn compile_index<R>(index: &Index<R>, table: &str) -> Result<String, DbError> {
        let mut terms = Vec::new();
        for filter in index.filters() {
            terms.push(compile_filter(filter, None, Mode::Literal)?.sql);
        }
        terms.extend(index.ordering().iter().map(compile_ordering));
        terms.extend(index.fields().iter().map(|f| quote_identifier(&f.label)));

        Ok(format!(
            "CREATE INDEX {} ON {} ({})",
            quote_identifier(&naming::index_name(table, index.name())),
            quote_identifier(table),
            terms.join(", ")
        ))
    }

    pub fn compile_drop_index<R>(index: &Index<R>, table: &str) -> String {
        format!(
            "DROP INDEX IF EXISTS {}",
            quote_identifier(&naming::index_name(table, index.name()))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{Constraint, Field, RootType, types};
    use crate::db::value::Value;
    use crate::queries::filter;

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        id: i32,
        name: String,
        age: i32,
    }

    fn id() -> Field<User, i32> {
        Field::new("id", types::int(), |u: &User| u.id)
    }

    fn name() -> Field<User, String> {
        Field::new("name", types::fixed_string(20), |u: &User| u.name.clone()).with(Constraint::NotNull)
    }

    fn age() -> Field<User, i32> {
        Field::new("age", types::int(), |u: &User| u.age).with(Constraint::Defaulted(0))
    }

    fn schema() -> Schema<i32, User> {
        Schema::of2(id(), name(), age(), |id, name, age| User { id, name, age })
    }

    fn ada() -> User {
        User {
            id: 1,
            name: "ada".to_string(),
            age: 36,
        }
    }

    #[test]
    fn test_compile_create_table() {
        assert_eq!(
            SqlCompiler::compile_create_table(&schema(), "t:v1"),
            r#"CREATE TABLE "t:v1" ("id" INTEGER PRIMARY KEY, "name" NVARCHAR(20) NOT NULL, "age" INTEGER DEFAULT 0)"#
        );
    }

    #[test]
    fn test_compile_create_table_key_only() {
        let schema: Schema<i64, i64> = Schema::of0(Field::new("id", types::big_int(), |v: &i64| *v), |k| k);
        assert_eq!(
            SqlCompiler::compile_create_table(&schema, "k"),
            r#"CREATE TABLE "k" ("id" BIGINT PRIMARY KEY)"#
        );
    }

    #[test]
    fn test_column_def_all_constraints() {
        let field = name()
            .with(Constraint::Unique)
            .with(Constraint::Defaulted("n/a".to_string()));
        assert_eq!(
            SqlCompiler::column_def::<User>(&field, false),
            r#""name" NVARCHAR(20) NOT NULL UNIQUE DEFAULT 'n/a'"#
        );
    }

    #[test]
    fn test_compile_insert() {
        let compiled = SqlCompiler::compile_insert(&schema(), "t:v1", &ada());
        assert_eq!(
            compiled.sql,
            r#"INSERT INTO "t:v1" ("id", "name", "age") VALUES (?, ?, ?)"#
        );
        let values: Vec<_> = compiled.bindings.into_iter().map(|b| b.value).collect();
        assert_eq!(values, vec![Value::Integer(1), Value::from("ada"), Value::Integer(36)]);
    }

    #[test]
    fn test_compile_update_binds_key_last() {
        let compiled = SqlCompiler::compile_update(&schema(), "t:v1", &ada());
        assert_eq!(
            compiled.sql,
            r#"UPDATE "t:v1" SET "id" = ?, "name" = ?, "age" = ? WHERE "t:v1"."id" = ?"#
        );
        assert_eq!(compiled.param_count(), 4);
        assert_eq!(
            compiled.bindings.last(),
            Some(&Binding::new(RootType::Int, Value::Integer(1)))
        );
    }

    #[test]
    fn test_compile_select_full() {
        let filter = filter::gt(&age(), 18);
        let ordering = filter::SortBy::descending(&name());
        let compiled = SqlCompiler::compile_select(&schema(), "t:v1", Some(&filter), Some(&ordering)).unwrap();
        assert_eq!(
            compiled.sql,
            r#"SELECT "t:v1"."id", "t:v1"."name", "t:v1"."age" FROM "t:v1" WHERE "t:v1"."age" > ? ORDER BY "name" DESC"#
        );
        assert_eq!(compiled.param_count(), 1);
    }

    #[test]
    fn test_compile_select_unfiltered() {
        let compiled = SqlCompiler::compile_select(&schema(), "t", None, None).unwrap();
        assert_eq!(compiled.sql, r#"SELECT "t"."id", "t"."name", "t"."age" FROM "t""#);
        assert!(compiled.bindings.is_empty());
    }

    #[test]
    fn test_with_limit_binds_after_filter() {
        let filter = filter::gt(&age(), 18);
        let compiled = SqlCompiler::compile_select(&schema(), "t", Some(&filter), None).unwrap();
        let limited = SqlCompiler::with_limit(compiled, 1);
        assert!(limited.sql.ends_with(r#"WHERE "t"."age" > ? LIMIT ?"#));
        assert_eq!(
            limited.bindings.last(),
            Some(&Binding::new(RootType::BigInt, Value::Integer(1)))
        );
        assert_eq!(limited.param_count(), 2);
    }

    #[test]
    fn test_compile_delete() {
        let all = SqlCompiler::compile_delete::<User>("t:v1", None).unwrap();
        assert_eq!(all.sql, r#"DELETE FROM "t:v1""#);

        let some = SqlCompiler::compile_delete("t:v1", Some(&filter::eq(&id(), 3))).unwrap();
        assert_eq!(some.sql, r#"DELETE FROM "t:v1" WHERE "t:v1"."id" = ?"#);
        assert_eq!(some.param_count(), 1);
    }

    #[test]
    fn test_compile_copy_rename_drop() {
        assert_eq!(
            SqlCompiler::compile_copy("t:v1", "t:v2", &["id", "name"]),
            r#"INSERT INTO "t:v2" ("id", "name") SELECT "t:v1"."id", "t:v1"."name" FROM "t:v1""#
        );
        assert_eq!(
            SqlCompiler::compile_rename("t:v1", "t:backup:x"),
            r#"ALTER TABLE "t:v1" RENAME TO "t:backup:x""#
        );
        assert_eq!(SqlCompiler::compile_drop("t:v1"), r#"DROP TABLE "t:v1""#);
    }

    #[test]
    fn test_compile_index_orders_filters_orderings_fields() {
        let index = Index::on_field("adults", &name())
            .with_filter(filter::ge(&age(), 18))
            .with_ordering(filter::SortBy::ascending(&age()));
        assert_eq!(
            SqlCompiler::compile_index(&index, "t:v2").unwrap(),
            r#"CREATE INDEX "t:v2:indexes:adults" ON "t:v2" ("age" >= 18, "age" ASC, "name")"#
        );
        assert_eq!(
            SqlCompiler::compile_drop_index(&index, "t:v2"),
            r#"DROP INDEX IF EXISTS "t:v2:indexes:adults""#
        );
    }
}
