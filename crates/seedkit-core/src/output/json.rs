use std::io::Write;

use base64::Engine;

use crate::error::{Result, SeedKitError};
use crate::generate::engine::GeneratedData;
use crate::generate::value::Value;

/// Write generated data as JSON using streaming serialization.
///
/// Writes directly to the writer table-by-table and row-by-row, avoiding
/// the OOM trap of building the entire JSON tree in memory before serializing.
/// Includes `_deferred_updates` when present (for circular FK resolution).
pub fn write_json<W: Write>(writer: &mut W, data: &GeneratedData) -> Result<()> {
    let table_count = data.tables.len();
    let has_deferred = !data.deferred_updates.is_empty();
    let total_keys = table_count + if has_deferred { 1 } else { 0 };

    write_str(writer, "{\n")?;

    for (table_idx, (table_name, rows)) in data.tables.iter().enumerate() {
        // Use serde_json for RFC 8259-compliant key escaping (not Rust's {:?} Debug format)
        let safe_table_key = json_key(table_name)?;
        write_str(writer, &format!("  {}: [\n", safe_table_key))?;

        for (row_idx, row) in rows.iter().enumerate() {
            write_str(writer, "    {")?;

            let col_count = row.len();
            for (col_idx, (col_name, value)) in row.iter().enumerate() {
                let safe_col_key = json_key(col_name)?;
                let val_str = json_value(value)?;
                write_str(writer, &format!("\n      {}: {}", safe_col_key, val_str))?;
                if col_idx < col_count - 1 {
                    write_str(writer, ",")?;
                }
            }

            write_str(writer, "\n    }")?;
            if row_idx < rows.len() - 1 {
                write_str(writer, ",")?;
            }
            write_str(writer, "\n")?;
        }

        write_str(writer, "  ]")?;
        if table_idx < total_keys - 1 {
            write_str(writer, ",")?;
        }
        write_str(writer, "\n")?;
    }

    // Deferred updates for circular FK resolution
    if has_deferred {
        write_str(writer, "  \"_deferred_updates\": [\n")?;
        for (i, update) in data.deferred_updates.iter().enumerate() {
            let safe_table = json_key(&update.table_name)?;
            let safe_col = json_key(&update.column_name)?;
            let val_str = json_value(&update.value)?;
            write_str(
                writer,
                &format!(
                    "    {{\"table\": {}, \"row_index\": {}, \"column\": {}, \"value\": {}}}",
                    safe_table, update.row_index, safe_col, val_str
                ),
            )?;
            if i < data.deferred_updates.len() - 1 {
                write_str(writer, ",")?;
            }
            write_str(writer, "\n")?;
        }
        write_str(writer, "  ]\n")?;
    }

    write_str(writer, "}\n")?;

    Ok(())
}

/// Helper to write a string slice and map IO errors.
fn write_str<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    writer
        .write_all(s.as_bytes())
        .map_err(|e| SeedKitError::Output {
            message: "writing JSON".to_string(),
            source: e,
        })
}

/// Serialize a string as an RFC 8259-compliant JSON key.
/// Uses serde_json instead of Rust's Debug format (`{:?}`) which does not
/// properly escape unicode control characters per the JSON spec.
fn json_key(s: &str) -> Result<String> {
    serde_json::to_string(s).map_err(|e| SeedKitError::Other(format!("JSON key error: {}", e)))
}

/// Serialize a Value as an RFC 8259-compliant JSON value string.
fn json_value(value: &Value) -> Result<String> {
    let json_val = value_to_json(value);
    serde_json::to_string(&json_val)
        .map_err(|e| SeedKitError::Other(format!("JSON serialization error: {}", e)))
}

/// Convert a Value to its JSON representation.
///
/// Timestamps use ISO 8601 format with milliseconds and trailing 'Z'.
/// Bytes use Base64 encoding (standard alphabet with padding).
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::json!(*i),
        Value::Float(f) => serde_json::json!(*f),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Timestamp(ts) => {
            serde_json::Value::String(format!("{}Z", ts.format("%Y-%m-%dT%H:%M:%S%.3f")))
        }
        Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        Value::Time(t) => serde_json::Value::String(t.format("%H:%M:%S").to_string()),
        Value::Uuid(u) => serde_json::Value::String(u.to_string()),
        Value::Json(j) => j.clone(),
        Value::Bytes(b) => {
            serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(b))
        }
    }
}
