//! # Foreign-Key Value Router
//!
//! For each foreign-key column of each row, returns a value that refers to an
//! existing parent row. Three modes compose:
//!
//! - **Donor mode**: a parent table marked `use_existing_tables` is never
//!   generated; children draw only from its `existing` pool, populated by the
//!   caller via [`ForeignKeyPool::seed_existing`] (a lazy `SELECT DISTINCT`
//!   the executor runs before generation starts).
//! - **Unselected-parent mode**: a parent with zero rows_to_generate behaves
//!   the same as donor mode from the child's point of view.
//! - **Mixed mode**: a generated parent's children draw from the union of
//!   `existing` and `generated`; `prefer_existing` biases sampling toward the
//!   `existing` pool when both are non-empty.
//!
//! Both caches are keyed by `(table, column)` and remain valid for the
//! lifetime of the run — there is no persistence between runs.

use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::generate::value::Value;

/// Manages the existing/generated value pools used to route foreign keys.
pub struct ForeignKeyPool {
    /// Values generated earlier in this run, keyed by (table, column).
    generated: HashMap<(String, String), Vec<Value>>,
    /// Values drawn from the live database, keyed by (table, column).
    existing: HashMap<(String, String), Vec<Value>>,
    /// Tables configured as donor-only (use_existing_tables, or zero rows_to_generate).
    donor_tables: HashSet<String>,
}

impl ForeignKeyPool {
    pub fn new() -> Self {
        Self {
            generated: HashMap::new(),
            existing: HashMap::new(),
            donor_tables: HashSet::new(),
        }
    }

    /// Mark a table as donor-only: its children must draw exclusively from
    /// `existing` values, never from rows generated this run (there are none).
    pub fn mark_donor(&mut self, table_name: &str) {
        self.donor_tables.insert(table_name.to_string());
    }

    pub fn is_donor(&self, table_name: &str) -> bool {
        self.donor_tables.contains(table_name)
    }

    /// Record a value generated for a column this run (typically a PK column).
    pub fn record_value(&mut self, table_name: &str, column_name: &str, value: Value) {
        self.generated
            .entry((table_name.to_string(), column_name.to_string()))
            .or_default()
            .push(value);
    }

    /// Seed the existing-value cache for a (table, column), e.g. from the
    /// result of `SELECT DISTINCT column FROM table WHERE column IS NOT NULL`.
    /// Idempotent — later calls replace the cached values.
    pub fn seed_existing(&mut self, table_name: &str, column_name: &str, values: Vec<Value>) {
        self.existing
            .insert((table_name.to_string(), column_name.to_string()), values);
    }

    pub fn has_existing(&self, table_name: &str, column_name: &str) -> bool {
        self.existing
            .get(&(table_name.to_string(), column_name.to_string()))
            .is_some_and(|v| !v.is_empty())
    }

    /// Pick a value for a FK reference to `table_name.column_name`, honoring
    /// donor/unselected-parent/mixed routing. Returns `None` if no source has
    /// a value — the caller decides whether that is `NoDonorValues` (donor
    /// table) or `NoParentValues` (mixed/unselected parent).
    pub fn pick_reference(
        &self,
        table_name: &str,
        column_name: &str,
        prefer_existing: bool,
        rng: &mut impl Rng,
    ) -> Option<Value> {
        let key = (table_name.to_string(), column_name.to_string());
        let existing = self.existing.get(&key).filter(|v| !v.is_empty());

        if self.is_donor(table_name) {
            return existing.map(|pool| pool[rng.random_range(0..pool.len())].clone());
        }

        let generated = self.generated.get(&key).filter(|v| !v.is_empty());

        match (existing, generated) {
            (Some(e), Some(g)) => {
                if prefer_existing {
                    Some(e[rng.random_range(0..e.len())].clone())
                } else {
                    // Uniform choice over the union without materializing it.
                    let total = e.len() + g.len();
                    let idx = rng.random_range(0..total);
                    if idx < e.len() {
                        Some(e[idx].clone())
                    } else {
                        Some(g[idx - e.len()].clone())
                    }
                }
            }
            (Some(e), None) => Some(e[rng.random_range(0..e.len())].clone()),
            (None, Some(g)) => Some(g[rng.random_range(0..g.len())].clone()),
            (None, None) => None,
        }
    }

    /// Get the number of values available (existing + generated) for a pool.
    pub fn pool_size(&self, table_name: &str, column_name: &str) -> usize {
        let key = (table_name.to_string(), column_name.to_string());
        self.existing.get(&key).map(|p| p.len()).unwrap_or(0)
            + self.generated.get(&key).map(|p| p.len()).unwrap_or(0)
    }

    /// Get the generated-this-run values (used to resolve deferred FK updates,
    /// which only ever reference rows inserted in the current run).
    pub fn get_generated(&self, table_name: &str, column_name: &str) -> Option<&[Value]> {
        self.generated
            .get(&(table_name.to_string(), column_name.to_string()))
            .map(|v| v.as_slice())
    }
}

impl Default for ForeignKeyPool {
    fn default() -> Self {
        Self::new()
    }
}
