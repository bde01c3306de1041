use indexmap::IndexMap;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::error::{Result, SeedKitError};
use crate::schema::introspect::SchemaIntrospector;
use crate::schema::types::*;

pub struct SqliteIntrospector {
    pool: SqlitePool,
}

impl SqliteIntrospector {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn introspect_tables(&self) -> Result<IndexMap<String, Table>> {
        let query = "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SeedKitError::ExtractionFailed {
                query: "fetch tables".to_string(),
                source: e,
            })?;

        let mut tables = IndexMap::new();
        for row in rows {
            let name: String = row.get("name");
            tables.insert(name.clone(), Table::new(name));
        }
        Ok(tables)
    }

    async fn introspect_columns(&self, tables: &mut IndexMap<String, Table>) -> Result<()> {
        let table_names: Vec<String> = tables.keys().cloned().collect();
        for table_name in table_names {
            let query = format!("PRAGMA table_info(\"{}\")", table_name);
            let rows = sqlx::query(&query)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| SeedKitError::ExtractionFailed {
                    query: format!("PRAGMA table_info({})", table_name),
                    source: e,
                })?;

            for row in rows {
                let cid: i32 = row.get("cid");
                let name: String = row.get("name");
                let type_str: String = row.get("type");
                let notnull: i32 = row.get("notnull");
                let dflt_value: Option<String> = row.get("dflt_value");
                let pk: i32 = row.get("pk");

                let data_type = DataType::from_raw(&type_str);
                let is_auto = pk > 0 && type_str.to_uppercase().contains("INTEGER");

                let mut column = Column::new(name.clone(), data_type, type_str);
                column.nullable = notnull == 0;
                column.has_default = dflt_value.is_some();
                column.default_value = dflt_value;
                column.is_auto_increment = is_auto;
                column.ordinal_position = cid as u32;
                column.derive_numeric_bounds();

                if let Some(table) = tables.get_mut(&table_name) {
                    // Set primary key if pk > 0
                    if pk > 0 {
                        let primary_key = table.primary_key.get_or_insert_with(|| PrimaryKey {
                            columns: Vec::new(),
                            name: None,
                        });
                        primary_key.columns.push(name.clone());
                    }
                    table.columns.insert(name, column);
                }
            }
        }

        Ok(())
    }

    async fn introspect_foreign_keys(&self, tables: &mut IndexMap<String, Table>) -> Result<()> {
        let table_names: Vec<String> = tables.keys().cloned().collect();
        for table_name in table_names {
            let query = format!("PRAGMA foreign_key_list(\"{}\")", table_name);
            let rows = sqlx::query(&query)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| SeedKitError::ExtractionFailed {
                    query: format!("PRAGMA foreign_key_list({})", table_name),
                    source: e,
                })?;

            // Group by id (FK id)
            let mut fk_map: IndexMap<i32, ForeignKey> = IndexMap::new();
            for row in &rows {
                let id: i32 = row.get("id");
                let table: String = row.get("table");
                let from: String = row.get("from");
                let to: String = row.get("to");
                let on_delete: String = row.get("on_delete");
                let on_update: String = row.get("on_update");

                let entry = fk_map.entry(id).or_insert_with(|| ForeignKey {
                    name: None,
                    source_columns: Vec::new(),
                    referenced_table: table,
                    referenced_columns: Vec::new(),
                    on_delete: ForeignKeyAction::parse_action(&on_delete),
                    on_update: ForeignKeyAction::parse_action(&on_update),
                    is_deferrable: false,
                });
                entry.source_columns.push(from);
                entry.referenced_columns.push(to);
            }

            if let Some(table) = tables.get_mut(&table_name) {
                for (_, fk) in fk_map {
                    table.foreign_keys.push(fk);
                }
            }
        }

        Ok(())
    }

    async fn introspect_unique_constraints(
        &self,
        tables: &mut IndexMap<String, Table>,
    ) -> Result<()> {
        let table_names: Vec<String> = tables.keys().cloned().collect();
        for table_name in table_names {
            let query = format!("PRAGMA index_list(\"{}\")", table_name);
            let indexes = sqlx::query(&query)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| SeedKitError::ExtractionFailed {
                    query: format!("PRAGMA index_list({})", table_name),
                    source: e,
                })?;

            for idx_row in &indexes {
                let unique: i32 = idx_row.get("unique");
                let idx_name: String = idx_row.get("name");

                if unique == 1 {
                    let info_query = format!("PRAGMA index_info(\"{}\")", idx_name);
                    let cols = sqlx::query(&info_query)
                        .fetch_all(&self.pool)
                        .await
                        .map_err(|e| SeedKitError::ExtractionFailed {
                            query: format!("PRAGMA index_info({})", idx_name),
                            source: e,
                        })?;

                    let columns: Vec<String> = cols.iter().map(|r| r.get("name")).collect();

                    if let Some(table) = tables.get_mut(&table_name) {
                        table.unique_constraints.push(UniqueConstraint {
                            name: Some(idx_name),
                            columns,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// SQLite has no `information_schema`; CHECK constraints only exist as
    /// text inside each table's `CREATE TABLE` statement in `sqlite_master`.
    async fn introspect_check_constraints(&self, tables: &mut IndexMap<String, Table>) -> Result<()> {
        let query = "SELECT name, sql FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SeedKitError::ExtractionFailed {
                query: "fetch table definitions".to_string(),
                source: e,
            })?;

        for row in rows {
            let table_name: String = row.get("name");
            let sql: Option<String> = row.get("sql");
            let Some(sql) = sql else { continue };

            for clause in extract_check_clauses(&sql) {
                let parsed = parse_sqlite_check_constraint(&clause);
                if let Some(table) = tables.get_mut(&table_name) {
                    table.check_constraints.push(CheckConstraint {
                        name: None,
                        expression: clause,
                        parsed,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Pull out the contents of each `CHECK (...)` clause in a `CREATE TABLE`
/// statement, tracking paren depth so a clause containing its own nested
/// parens (e.g. `CHECK (status IN ('a', 'b'))`) is captured whole.
fn extract_check_clauses(create_sql: &str) -> Vec<String> {
    let bytes = create_sql.as_bytes();
    let upper = create_sql.to_uppercase();
    let mut clauses = Vec::new();
    let mut search_start = 0;

    while let Some(rel_idx) = upper[search_start..].find("CHECK") {
        let check_idx = search_start + rel_idx;
        let after_check = check_idx + "CHECK".len();
        let Some(paren_offset) = create_sql[after_check..].find('(') else {
            break;
        };
        let open = after_check + paren_offset;

        let mut depth = 0i32;
        let mut close = None;
        for (i, &b) in bytes[open..].iter().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(open + i);
                        break;
                    }
                }
                _ => {}
            }
        }

        match close {
            Some(close_idx) => {
                clauses.push(create_sql[open + 1..close_idx].trim().to_string());
                search_start = close_idx + 1;
            }
            None => break,
        }
    }

    clauses
}

/// Parse a SQLite CHECK clause (identifiers may be unquoted, `"quoted"`, or
/// `` `backtick` ``-quoted).
fn parse_sqlite_check_constraint(expr: &str) -> Option<ParsedCheck> {
    let cleaned = expr.replace(['"', '`'], "");
    let expr = cleaned.trim();

    let re_gte = regex::Regex::new(r"^(\w+)\s*>=\s*(-?[\d.]+)$").ok()?;
    if let Some(caps) = re_gte.captures(expr) {
        return Some(ParsedCheck::GreaterThanOrEqual {
            column: caps[1].to_string(),
            value: caps[2].parse().ok()?,
        });
    }

    let re_gt = regex::Regex::new(r"^(\w+)\s*>\s*(-?[\d.]+)$").ok()?;
    if let Some(caps) = re_gt.captures(expr) {
        return Some(ParsedCheck::GreaterThan {
            column: caps[1].to_string(),
            value: caps[2].parse().ok()?,
        });
    }

    let re_lte = regex::Regex::new(r"^(\w+)\s*<=\s*(-?[\d.]+)$").ok()?;
    if let Some(caps) = re_lte.captures(expr) {
        return Some(ParsedCheck::LessThanOrEqual {
            column: caps[1].to_string(),
            value: caps[2].parse().ok()?,
        });
    }

    let re_lt = regex::Regex::new(r"^(\w+)\s*<\s*(-?[\d.]+)$").ok()?;
    if let Some(caps) = re_lt.captures(expr) {
        return Some(ParsedCheck::LessThan {
            column: caps[1].to_string(),
            value: caps[2].parse().ok()?,
        });
    }

    let re_between =
        regex::Regex::new(r"(?i)^(\w+)\s+between\s+(-?[\d.]+)\s+and\s+(-?[\d.]+)$").ok()?;
    if let Some(caps) = re_between.captures(expr) {
        return Some(ParsedCheck::Between {
            column: caps[1].to_string(),
            low: caps[2].parse().ok()?,
            high: caps[3].parse().ok()?,
        });
    }

    let re_in = regex::Regex::new(r"(?i)^(\w+)\s+in\s*\((.+)\)$").ok()?;
    if let Some(caps) = re_in.captures(expr) {
        let values: Vec<String> = caps[2]
            .split(',')
            .map(|v| v.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if !values.is_empty() {
            return Some(ParsedCheck::InValues {
                column: caps[1].to_string(),
                values,
            });
        }
    }

    let re_col_lt = regex::Regex::new(r"^(\w+)\s*<\s*(\w+)$").ok()?;
    if let Some(caps) = re_col_lt.captures(expr) {
        let left = &caps[1];
        let right = &caps[2];
        if right.parse::<f64>().is_err() {
            return Some(ParsedCheck::ColumnLessThan {
                left: left.to_string(),
                right: right.to_string(),
            });
        }
    }

    let re_len =
        regex::Regex::new(r"^(?:length|char_length|character_length)\((\w+)\)\s*>\s*(\d+)$")
            .ok()?;
    if let Some(caps) = re_len.captures(expr) {
        return Some(ParsedCheck::MinLength {
            column: caps[1].to_string(),
            min: caps[2].parse().ok()?,
        });
    }

    None
}

impl SchemaIntrospector for SqliteIntrospector {
    async fn introspect(&self) -> Result<DatabaseSchema> {
        let mut schema = DatabaseSchema::new(DatabaseType::SQLite, "sqlite".to_string());

        schema.tables = self.introspect_tables().await?;
        self.introspect_columns(&mut schema.tables).await?;
        self.introspect_foreign_keys(&mut schema.tables).await?;
        self.introspect_unique_constraints(&mut schema.tables)
            .await?;
        self.introspect_check_constraints(&mut schema.tables)
            .await?;

        Ok(schema)
    }
}
