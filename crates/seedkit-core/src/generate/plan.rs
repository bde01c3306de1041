use std::collections::{BTreeMap, HashMap};

use crate::classify::semantic::{CorrelationGroup, SemanticType};
use crate::config::ColumnConfig;
use crate::generate::value::Value;
use crate::graph::topo::DeferredEdge;
use crate::schema::types::{DataType, DatabaseSchema, ParsedCheck};

/// Probability of using a column's declared default value instead of
/// fabricating one, when a coercible default is present.
pub const DEFAULT_USE_PROBABILITY: f64 = 0.3;

/// Coerce a raw default-value expression reported by the database into a
/// [`Value`] of the column's base type, for use by the `default use` step of
/// the fabricator's decision order. Returns `None` for the null token, for
/// function-call defaults (`CURRENT_TIMESTAMP`, `nextval(...)`, `uuid()`,
/// ...) that can't be evaluated without a database round-trip, and for
/// anything that fails to parse as the column's type.
pub fn coerce_default_literal(raw: &str, data_type: &DataType) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    // Function-call-shaped defaults (CURRENT_TIMESTAMP, nextval('seq'), now())
    // require database evaluation; leave them to type-directed fabrication.
    if trimmed.contains('(')
        || trimmed.eq_ignore_ascii_case("current_timestamp")
        || trimmed.eq_ignore_ascii_case("current_date")
        || trimmed.eq_ignore_ascii_case("current_time")
    {
        return None;
    }

    // Strip a single layer of matching quotes, and MySQL/Postgres-style
    // trailing type casts like `'active'::character varying`.
    let unquoted = trimmed
        .split("::")
        .next()
        .unwrap_or(trimmed)
        .trim()
        .trim_matches(|c| c == '\'' || c == '"');

    if data_type.is_integer() {
        unquoted.parse::<i64>().ok().map(Value::Int)
    } else if data_type.is_numeric() {
        unquoted.parse::<f64>().ok().map(Value::Float)
    } else if matches!(data_type, DataType::Boolean) {
        match unquoted.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        }
    } else if data_type.is_string() {
        Some(Value::String(std::borrow::Cow::Owned(unquoted.to_string())))
    } else {
        None
    }
}

/// The complete generation plan for all tables.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    /// Tables in insertion order (respects FK dependencies).
    pub table_plans: Vec<TableGenerationPlan>,
    /// Deferred FK edges to resolve after all inserts.
    pub deferred_edges: Vec<DeferredEdge>,
    /// Global seed for deterministic generation.
    pub seed: u64,
    /// Default row count per table (can be overridden per-table).
    pub default_row_count: usize,
    /// Pinned base timestamp for deterministic temporal generation.
    /// Captured once at plan creation time (or read from lockfile),
    /// so regeneration from a lockfile produces identical timestamps
    /// regardless of when it runs.
    pub base_time: chrono::NaiveDateTime,
    /// Offset added to synthesized auto-increment IDs.
    ///
    /// When seeding into an empty database with reset sequences, this is 0
    /// (the default). When seeding into a database where sequences already
    /// have a known starting value, set this via `with_sequence_offset` (or
    /// the CLI's `--sequence-offset` flag) to that value so FK references
    /// match the real database-assigned IDs.
    pub sequence_offset: u64,
    /// Mixed-mode FK routing tiebreak: prefer existing (database) rows over
    /// rows generated this run when both pools are non-empty.
    pub prefer_existing_fk_values: bool,
}

/// Generation plan for a single table.
#[derive(Debug, Clone)]
pub struct TableGenerationPlan {
    pub table_name: String,
    pub row_count: usize,
    pub column_plans: Vec<ColumnGenerationPlan>,
    pub correlation_groups: Vec<CorrelationGroupPlan>,
}

/// Generation plan for a single column.
#[derive(Debug, Clone)]
pub struct ColumnGenerationPlan {
    pub column_name: String,
    pub semantic_type: SemanticType,
    pub strategy: GenerationStrategy,
    pub nullable: bool,
    /// Probability of generating NULL (0.0 to 1.0), only if nullable.
    pub null_probability: f64,
    /// A coercible declared default, if the database reported one. When
    /// present, the fabricator uses it with probability [`DEFAULT_USE_PROBABILITY`]
    /// before falling through to type-directed fabrication.
    pub default_value: Option<Value>,
    /// Check constraints that apply to this column.
    pub check_constraints: Vec<ParsedCheck>,
    /// Maximum length/size hint (string length or byte count), from the
    /// column's declared `max_length`.
    pub max_length: Option<u32>,
    /// Numeric lower bound, from `Column::min_value` (type default or CHECK-derived).
    pub min_value: Option<f64>,
    /// Numeric upper bound counterpart to `min_value`.
    pub max_value: Option<f64>,
}

/// How a column's value should be generated.
#[derive(Debug, Clone)]
pub enum GenerationStrategy {
    /// Auto-incrementing (serial/bigserial) — skip, let DB handle it.
    AutoIncrement,
    /// Reference a value from a parent table's column.
    ForeignKeyReference {
        referenced_table: String,
        referenced_column: String,
    },
    /// Use the semantic type's provider to generate a value.
    SemanticProvider,
    /// Pick from a fixed list of enum values.
    EnumValue { values: Vec<String> },
    /// Generate as part of a correlation group — handled by the group.
    Correlated { group_index: usize },
    /// Deferred — insert NULL now, UPDATE later (for cycle-breaking).
    Deferred,
    /// Skip entirely (e.g., generated columns, columns with server defaults).
    Skip,
    /// Custom provider (JS or WASM).
    Custom { provider_path: String },
    /// Pick from a user-configured value list (from seedkit.toml).
    /// Distinct from EnumValue which comes from database schema enum types.
    ValueList {
        values: Vec<String>,
        weights: Option<Vec<f64>>,
    },
}

/// Plan for generating correlated column values.
#[derive(Debug, Clone)]
pub struct CorrelationGroupPlan {
    pub group: CorrelationGroup,
    pub columns: Vec<(String, SemanticType)>,
}

impl GenerationPlan {
    /// Build a generation plan from a schema and classification results.
    ///
    /// `base_time` is pinned at plan creation so temporal values are deterministic.
    /// When restoring from a lockfile, pass the lockfile's stored `base_time`.
    /// When creating fresh, pass `None` to capture the current wall-clock time.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        schema: &DatabaseSchema,
        classifications: &HashMap<(String, String), SemanticType>,
        insertion_order: &[String],
        deferred_edges: Vec<DeferredEdge>,
        default_row_count: usize,
        table_row_overrides: &BTreeMap<String, usize>,
        seed: u64,
        base_time: Option<chrono::NaiveDateTime>,
        column_overrides: &BTreeMap<String, ColumnConfig>,
    ) -> Self {
        let deferred_columns: HashMap<(&str, &str), bool> = deferred_edges
            .iter()
            .flat_map(|e| {
                e.source_columns
                    .iter()
                    .map(move |col| (e.source_table.as_str(), col.as_str()))
            })
            .map(|k| (k, true))
            .collect();

        let mut table_plans = Vec::new();

        for table_name in insertion_order {
            let table = match schema.tables.get(table_name) {
                Some(t) => t,
                None => continue,
            };

            // Row count: explicit override > default
            let row_count = table_row_overrides
                .get(table_name)
                .copied()
                .unwrap_or(default_row_count);

            // Detect correlation groups for this table
            let mut correlation_groups = Vec::new();
            let mut correlated_columns: HashMap<String, usize> = HashMap::new();

            // Group columns by their correlation group
            let mut group_map: HashMap<CorrelationGroup, Vec<(String, SemanticType)>> =
                HashMap::new();
            for (col_name, _column) in &table.columns {
                if let Some(st) = classifications.get(&(table_name.clone(), col_name.clone())) {
                    if let Some(group) = st.correlation_group() {
                        group_map
                            .entry(group)
                            .or_default()
                            .push((col_name.clone(), *st));
                    }
                }
            }

            for (group, columns) in group_map {
                if columns.len() >= 2 {
                    let group_index = correlation_groups.len();
                    for (col_name, _) in &columns {
                        correlated_columns.insert(col_name.clone(), group_index);
                    }
                    correlation_groups.push(CorrelationGroupPlan { group, columns });
                }
            }

            // Build column plans
            let mut column_plans = Vec::new();
            let pk_columns: Vec<&str> = table
                .primary_key
                .as_ref()
                .map(|pk| pk.columns.iter().map(|s| s.as_str()).collect())
                .unwrap_or_default();

            for (col_name, column) in &table.columns {
                let semantic_type = classifications
                    .get(&(table_name.clone(), col_name.clone()))
                    .copied()
                    .unwrap_or(SemanticType::Unknown);

                // Check for user-configured column overrides (seedkit.toml)
                let col_key = format!("{}.{}", table_name, col_name);
                let config_strategy = column_overrides.get(&col_key).and_then(|cfg| {
                    cfg.values
                        .as_ref()
                        .map(|values| GenerationStrategy::ValueList {
                            values: values.clone(),
                            weights: cfg.weights.clone(),
                        })
                        .or_else(|| {
                            cfg.custom.as_ref().map(|path| GenerationStrategy::Custom {
                                provider_path: path.clone(),
                            })
                        })
                });

                // Determine generation strategy — config overrides take priority
                let strategy = if let Some(s) = config_strategy {
                    s
                } else if column.is_auto_increment || column.data_type.is_serial() {
                    if pk_columns.contains(&col_name.as_str()) {
                        GenerationStrategy::AutoIncrement
                    } else {
                        GenerationStrategy::SemanticProvider
                    }
                } else if deferred_columns.contains_key(&(table_name.as_str(), col_name.as_str())) {
                    GenerationStrategy::Deferred
                } else if let Some(fk) = table
                    .foreign_keys
                    .iter()
                    .find(|fk| fk.source_columns.len() == 1 && fk.source_columns[0] == *col_name)
                {
                    // GUARD: Only use ForeignKeyReference if the referenced table
                    // is actually in this generation plan's insertion order.
                    // If the parent was excluded (via --exclude or --include that
                    // didn't capture it), fall back to semantic generation so the
                    // engine doesn't crash looking for an empty FK pool.
                    if insertion_order.contains(&fk.referenced_table) {
                        GenerationStrategy::ForeignKeyReference {
                            referenced_table: fk.referenced_table.clone(),
                            referenced_column: fk.referenced_columns[0].clone(),
                        }
                    } else {
                        GenerationStrategy::SemanticProvider
                    }
                } else if let Some(ref values) = column.enum_values {
                    GenerationStrategy::EnumValue {
                        values: values.clone(),
                    }
                } else if let Some(&group_index) = correlated_columns.get(col_name) {
                    GenerationStrategy::Correlated { group_index }
                } else {
                    GenerationStrategy::SemanticProvider
                };

                // Collect applicable check constraints
                let check_constraints: Vec<ParsedCheck> = table
                    .check_constraints
                    .iter()
                    .filter_map(|cc| {
                        cc.parsed.as_ref().and_then(|p| {
                            if check_applies_to_column(p, col_name) {
                                Some(p.clone())
                            } else {
                                None
                            }
                        })
                    })
                    .collect();

                let null_probability =
                    if column.nullable && !pk_columns.contains(&col_name.as_str()) {
                        match semantic_type {
                            SemanticType::DeletedAt => 0.8, // Most rows aren't soft-deleted
                            _ => 0.05, // Small chance of NULL for nullable columns
                        }
                    } else {
                        0.0
                    };

                let default_value = column
                    .default_value
                    .as_deref()
                    .and_then(|raw| coerce_default_literal(raw, &column.data_type));

                column_plans.push(ColumnGenerationPlan {
                    column_name: col_name.clone(),
                    semantic_type,
                    strategy,
                    nullable: column.nullable,
                    null_probability,
                    default_value,
                    check_constraints,
                    max_length: column.max_length,
                    min_value: column.min_value,
                    max_value: column.max_value,
                });
            }

            table_plans.push(TableGenerationPlan {
                table_name: table_name.clone(),
                row_count,
                column_plans,
                correlation_groups,
            });
        }

        GenerationPlan {
            table_plans,
            deferred_edges,
            seed,
            default_row_count,
            base_time: base_time.unwrap_or_else(|| chrono::Utc::now().naive_utc()),
            sequence_offset: 0,
            prefer_existing_fk_values: false,
        }
    }

    /// Set the mixed-mode FK routing tiebreak (builder-style, called after `build`
    /// so existing call sites and tests don't need to thread an extra argument).
    pub fn with_prefer_existing_fk_values(mut self, prefer: bool) -> Self {
        self.prefer_existing_fk_values = prefer;
        self
    }

    /// Set the offset added to synthesized auto-increment IDs (builder-style,
    /// same reasoning as `with_prefer_existing_fk_values`).
    pub fn with_sequence_offset(mut self, offset: u64) -> Self {
        self.sequence_offset = offset;
        self
    }
}

/// Filter an insertion order by include/exclude lists.
///
/// When `include` is non-empty, only tables in the list (plus their FK
/// dependencies) are kept. When `exclude` is non-empty, listed tables are
/// removed. `include` takes priority: if both are set, `include` is applied
/// first and `exclude` is then applied to the result.
///
/// FK dependencies are automatically added — if you `--include orders` and
/// `orders` FK-references `users`, then `users` is included automatically so
/// FK generation doesn't break.
pub fn filter_insertion_order(
    insertion_order: &[String],
    schema: &DatabaseSchema,
    include: &[String],
    exclude: &[String],
) -> Vec<String> {
    if include.is_empty() && exclude.is_empty() {
        return insertion_order.to_vec();
    }

    let mut wanted: std::collections::HashSet<String> = if include.is_empty() {
        // Start with all tables
        insertion_order.iter().cloned().collect()
    } else {
        // Start with explicitly included tables
        let mut set: std::collections::HashSet<String> = include.iter().cloned().collect();
        // Close over FK dependencies: walk each included table's FKs
        // and add referenced tables (transitively).
        let mut queue: Vec<String> = include.to_vec();
        while let Some(table_name) = queue.pop() {
            if let Some(table) = schema.tables.get(&table_name) {
                for fk in &table.foreign_keys {
                    if set.insert(fk.referenced_table.clone()) {
                        queue.push(fk.referenced_table.clone());
                    }
                }
            }
        }
        set
    };

    // Apply excludes
    for table_name in exclude {
        wanted.remove(table_name);
    }

    // Preserve original insertion order (topological)
    insertion_order
        .iter()
        .filter(|t| wanted.contains(t.as_str()))
        .cloned()
        .collect()
}

fn check_applies_to_column(check: &ParsedCheck, column_name: &str) -> bool {
    match check {
        ParsedCheck::GreaterThanOrEqual { column, .. }
        | ParsedCheck::GreaterThan { column, .. }
        | ParsedCheck::LessThanOrEqual { column, .. }
        | ParsedCheck::LessThan { column, .. }
        | ParsedCheck::MinLength { column, .. }
        | ParsedCheck::InValues { column, .. } => column == column_name,
        ParsedCheck::Between { column, .. } => column == column_name,
        ParsedCheck::ColumnLessThan { left, right } => left == column_name || right == column_name,
    }
}
