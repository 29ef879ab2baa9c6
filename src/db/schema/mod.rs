//! Typed schema model.
//!
//! Application code declares a row type's storage shape once and the rest of
//! the crate compiles it into statements.
//!
//! # Overview
//!
//! 1. **Type chain** (`types.rs`):
//!    - `RootType` - the physical column types a backend stores
//!    - `FieldType<T>` - a root type or a mapped type layered over one
//!
//! 2. **Declarations** (`definition.rs`, `index.rs`):
//!    - `Field<R, T>` - named, typed projection from a row to a column
//!    - `Schema<K, R>` - primary key, ordered fields, row factory, indexes, version
//!    - `Index<R>` - constant filters, orderings and fields
//!
//! 3. **Storage** (`naming.rs`, `compilers/`, `migrations.rs`):
//!    - Physical table names for versions, backups and indexes
//!    - `SqlCompiler` - DDL and DML generation
//!    - `run_migration` - create / migrate / skip
//!
//! # Type Mapping
//!
//! | Rust Type | Root Type     | Physical Type  |
//! |-----------|---------------|----------------|
//! | i8        | TinyInt       | TINYINT        |
//! | i16       | SmallInt      | SMALLINT       |
//! | i32       | Int           | INTEGER        |
//! | i64       | BigInt        | BIGINT         |
//! | f32       | Real          | REAL           |
//! | f64       | Double        | FLOAT          |
//! | String    | Text          | NVARCHAR       |
//! | String    | FixedString(n)| NVARCHAR(n)    |

pub mod compilers;
mod definition;
pub mod index;
pub mod migrations;
pub mod naming;
pub mod types;

pub use definition::{
    ALWAYS_MIGRATE, Column, ColumnConstraint, Constraint, Factory, Field, FieldRef, FieldValues, Schema,
};
pub use index::Index;
pub use migrations::{MigrationPlan, MigrationReport, plan_migration, run_migration};
pub use types::{DecodeError, FieldType, RootType};
