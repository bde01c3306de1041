//! # Error Types
//!
//! Defines `SeedKitError`, the unified error enum for every failure mode in
//! the SeedKit pipeline. Every variant includes enough context (table name,
//! column name, row index, SQL snippet) to debug immediately without digging
//! through logs.

use thiserror::Error;

/// All errors that can occur in SeedKit operations.
#[derive(Error, Debug)]
pub enum SeedKitError {
    #[error("Database connection failed: {message}\n  Connection string: {connection_hint}\n  Cause: {source}")]
    Connection {
        message: String,
        connection_hint: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("No database URL provided. SeedKit looks for a connection in this order:\n  1. --db flag\n  2. DATABASE_URL environment variable\n  3. .env file with DATABASE_URL\n  4. seedkit.toml [database] section\n\nExample: seedkit generate --db postgres://localhost/myapp --rows 100")]
    NoDatabaseUrl,

    #[error("Unsupported database driver '{scheme}'. Supported: postgres://, mysql://, sqlite://")]
    UnsupportedDriver { scheme: String },

    #[error("Table '{table}' was not found in the extracted schema\n  It may have been dropped, renamed, or excluded by include_tables/exclude_tables.")]
    SchemaNotFound { table: String },

    #[error("Schema extraction failed while running '{query}': {source}")]
    ExtractionFailed {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Cannot resolve a parent value for {source_table}.{source_column} -> {target_table}.{target_column}: no existing and no generated rows are available\n  Add {target_table} to this run, mark it use_existing_data, or make the column nullable.")]
    NoParentValues {
        source_table: String,
        source_column: String,
        target_table: String,
        target_column: String,
    },

    #[error("Donor table '{table}' has no existing rows to draw '{column}' values from\n  Populate {table} before generating, or remove it from use_existing_tables.")]
    NoDonorValues { table: String, column: String },

    #[error("Failed to generate a unique value for {table}.{column} at row {row_index}: {max_retries} retries exhausted\n  Consider reducing rows_to_generate or adding more variation to the column's generator")]
    UniquenessExhausted {
        table: String,
        column: String,
        row_index: usize,
        max_retries: usize,
    },

    #[error("Composite unique constraint exhausted on {table}.({columns}) at row {row_index}: {max_retries} retries exhausted\n  The combination of values for these columns could not be made unique")]
    CompositeUniquenessExhausted {
        table: String,
        columns: String,
        row_index: usize,
        max_retries: usize,
    },

    #[error("Dependency cycle involving {tables} could not be resolved: {detail}\n  Override the break point explicitly:\n  [graph]\n  break_cycle_at = [\"<table>.<column>\"]")]
    CycleUnresolvable { tables: String, detail: String },

    #[error("Generated value for {table}.{column} violates check constraint '{constraint}': {value}")]
    ConstraintViolation {
        table: String,
        column: String,
        constraint: String,
        value: String,
    },

    #[error("Insert failed on {table} row {row_index}: {message}\n  SQL: {sql_preview}\n  DB error: {source}")]
    InsertFailed {
        table: String,
        row_index: usize,
        message: String,
        sql_preview: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output error: {message}: {source}")]
    Output {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SeedKitError>;
