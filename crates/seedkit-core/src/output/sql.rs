use std::io::Write;

use crate::error::{Result, SeedKitError};
use crate::generate::engine::{DeferredUpdate, GeneratedData};
use crate::generate::value::Value;
use crate::schema::types::{DatabaseSchema, DatabaseType};

/// Row count per multi-row INSERT statement in file output.
const INSERT_BATCH_SIZE: usize = 500;

/// Write generated data as batched multi-row `INSERT` statements, followed by
/// `UPDATE` statements resolving any deferred foreign keys (from cycle
/// breaking). Statement dialect (quoting, boolean literals) follows the
/// schema's database type.
pub fn write_sql<W: Write>(writer: &mut W, data: &GeneratedData, schema: &DatabaseSchema) -> Result<()> {
    let db_type = &schema.database_type;

    for (table_name, rows) in &data.tables {
        if rows.is_empty() {
            continue;
        }

        let columns: Vec<&String> = rows[0].keys().collect();
        let quoted_table = quote_identifier(table_name, db_type);
        let quoted_columns: Vec<String> = columns
            .iter()
            .map(|c| quote_identifier(c, db_type))
            .collect();
        let col_list = quoted_columns.join(", ");

        for chunk in rows.chunks(INSERT_BATCH_SIZE) {
            let sql = build_batched_insert(&quoted_table, &col_list, &columns, chunk, db_type);
            writeln!(writer, "{};", sql).map_err(|e| SeedKitError::Output {
                message: format!("writing INSERT for {}", table_name),
                source: e,
            })?;
        }
        writeln!(writer).map_err(|e| SeedKitError::Output {
            message: "writing newline".to_string(),
            source: e,
        })?;
    }

    if !data.deferred_updates.is_empty() {
        writeln!(writer, "-- Deferred foreign key updates (circular dependencies)")
            .map_err(|e| SeedKitError::Output {
                message: "writing deferred update header".to_string(),
                source: e,
            })?;
        for update in &data.deferred_updates {
            if let Some(sql) = build_deferred_update(update, data, schema, db_type) {
                writeln!(writer, "{};", sql).map_err(|e| SeedKitError::Output {
                    message: format!("writing deferred UPDATE for {}", update.table_name),
                    source: e,
                })?;
            }
        }
    }

    Ok(())
}

/// Write generated data as PostgreSQL `COPY ... FROM stdin` blocks, which
/// load an order of magnitude faster than batched INSERTs for large datasets.
/// Deferred FK updates (not expressible in COPY) are appended as plain
/// `UPDATE` statements.
pub fn write_postgres_copy<W: Write>(
    writer: &mut W,
    data: &GeneratedData,
    schema: &DatabaseSchema,
) -> Result<()> {
    let db_type = &DatabaseType::PostgreSQL;

    for (table_name, rows) in &data.tables {
        if rows.is_empty() {
            continue;
        }

        let columns: Vec<&String> = rows[0].keys().collect();
        let quoted_table = quote_identifier(table_name, db_type);
        let quoted_columns: Vec<String> = columns
            .iter()
            .map(|c| quote_identifier(c, db_type))
            .collect();

        writeln!(
            writer,
            "COPY {} ({}) FROM stdin;",
            quoted_table,
            quoted_columns.join(", ")
        )
        .map_err(|e| SeedKitError::Output {
            message: format!("writing COPY header for {}", table_name),
            source: e,
        })?;

        for row in rows {
            let fields: Vec<String> = columns
                .iter()
                .map(|col| {
                    row.get(*col)
                        .map(copy_field)
                        .unwrap_or_else(|| "\\N".to_string())
                })
                .collect();
            writeln!(writer, "{}", fields.join("\t")).map_err(|e| SeedKitError::Output {
                message: format!("writing COPY row for {}", table_name),
                source: e,
            })?;
        }

        writeln!(writer, "\\.\n").map_err(|e| SeedKitError::Output {
            message: "writing COPY terminator".to_string(),
            source: e,
        })?;
    }

    if !data.deferred_updates.is_empty() {
        writeln!(writer, "-- Deferred foreign key updates (circular dependencies)")
            .map_err(|e| SeedKitError::Output {
                message: "writing deferred update header".to_string(),
                source: e,
            })?;
        for update in &data.deferred_updates {
            if let Some(sql) = build_deferred_update(update, data, schema, db_type) {
                writeln!(writer, "{};", sql).map_err(|e| SeedKitError::Output {
                    message: format!("writing deferred UPDATE for {}", update.table_name),
                    source: e,
                })?;
            }
        }
    }

    Ok(())
}

/// Build a batched multi-row INSERT statement.
fn build_batched_insert(
    quoted_table: &str,
    col_list: &str,
    columns: &[&String],
    rows: &[indexmap::IndexMap<String, Value>],
    db_type: &DatabaseType,
) -> String {
    let mut sql = format!("INSERT INTO {} ({}) VALUES ", quoted_table, col_list);

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for (j, col) in columns.iter().enumerate() {
            if j > 0 {
                sql.push_str(", ");
            }
            let literal = row
                .get(*col)
                .map(|v| v.to_sql_literal(db_type))
                .unwrap_or_else(|| "NULL".to_string());
            sql.push_str(&literal);
        }
        sql.push(')');
    }

    sql
}

/// Build an UPDATE statement for a deferred FK update.
///
/// Requires the row's primary key value to identify which row to update.
/// Returns `None` if the table has no PK or the PK value isn't available.
fn build_deferred_update(
    update: &DeferredUpdate,
    data: &GeneratedData,
    schema: &DatabaseSchema,
    db_type: &DatabaseType,
) -> Option<String> {
    let table = schema.tables.get(&update.table_name)?;
    let pk = table.primary_key.as_ref()?;

    let rows = data.tables.get(&update.table_name)?;
    let row = rows.get(update.row_index)?;

    let mut where_parts = Vec::new();
    for pk_col in &pk.columns {
        if let Some(pk_val) = row.get(pk_col) {
            where_parts.push(format!(
                "{} = {}",
                quote_identifier(pk_col, db_type),
                pk_val.to_sql_literal(db_type),
            ));
        } else {
            let id = update.row_index as i64 + 1;
            where_parts.push(format!("{} = {}", quote_identifier(pk_col, db_type), id));
        }
    }

    if where_parts.is_empty() {
        return None;
    }

    Some(format!(
        "UPDATE {} SET {} = {} WHERE {}",
        quote_identifier(&update.table_name, db_type),
        quote_identifier(&update.column_name, db_type),
        update.value.to_sql_literal(db_type),
        where_parts.join(" AND "),
    ))
}

/// Render a value in COPY text format: tab/newline/backslash escaped,
/// `\N` for NULL, `t`/`f` for booleans.
fn copy_field(value: &Value) -> String {
    match value {
        Value::Null => "\\N".to_string(),
        Value::Bool(b) => if *b { "t" } else { "f" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{}", f),
        Value::String(s) => copy_escape(s),
        Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Time(t) => t.format("%H:%M:%S").to_string(),
        Value::Uuid(u) => u.to_string(),
        Value::Json(j) => copy_escape(&j.to_string()),
        Value::Bytes(b) => format!("\\\\x{}", hex_encode(b)),
    }
}

/// Escape backslash, tab, newline, and carriage return per the COPY text format.
fn copy_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Quote a SQL identifier based on database type.
fn quote_identifier(name: &str, db_type: &DatabaseType) -> String {
    match db_type {
        DatabaseType::MySQL => format!("`{}`", name),
        _ => format!("\"{}\"", name),
    }
}
