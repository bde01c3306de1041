use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::visit::EdgeRef;

use crate::error::Result;
use crate::graph::dag::DependencyGraph;

/// A foreign key edge that was broken to resolve a cycle.
/// After all tables are populated, these FKs need UPDATE statements.
#[derive(Debug, Clone)]
pub struct DeferredEdge {
    pub source_table: String,
    pub source_columns: Vec<String>,
    pub target_table: String,
    pub target_columns: Vec<String>,
}

/// The ordered, batched plan for inserting rows across a set of tables so that
/// every foreign key's parent exists before its child is generated.
#[derive(Debug, Clone)]
pub struct InsertionPlan {
    /// Tables in insertion order (parents before children).
    pub order: Vec<String>,
    /// table -> direct dependencies (the tables it foreign-keys to).
    pub graph: HashMap<String, Vec<String>>,
    /// Cycles detected in the dependency graph, each a sequence of table names
    /// that close back on the first.
    pub cycles: Vec<Vec<String>>,
    /// Tables with no outgoing foreign keys.
    pub independent_tables: Vec<String>,
}

impl InsertionPlan {
    /// Partition `order` into maximal antichains: every table in batch *k* has
    /// all its dependencies satisfied by batches `< k`. Tables that cannot make
    /// progress any other way (cyclic remainder) are emitted as a singleton
    /// batch to force forward progress.
    pub fn batches(&self) -> Vec<Vec<String>> {
        let mut batches = Vec::new();
        let mut done: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<&str> = self.order.iter().map(|s| s.as_str()).collect();

        while !remaining.is_empty() {
            let ready: Vec<&str> = remaining
                .iter()
                .copied()
                .filter(|t| {
                    self.graph
                        .get(*t)
                        .map(|deps| deps.iter().all(|d| done.contains(d.as_str())))
                        .unwrap_or(true)
                })
                .collect();

            let batch: Vec<&str> = if ready.is_empty() {
                // Cycle blocks all progress; force the first remaining table through.
                vec![remaining[0]]
            } else {
                ready
            };

            for t in &batch {
                done.insert(t);
            }
            remaining.retain(|t| !batch.contains(t));
            batches.push(batch.into_iter().map(|s| s.to_string()).collect());
        }

        batches
    }
}

/// Compute the insertion order via Kahn's algorithm. Tables with in-degree
/// zero (no outstanding foreign keys) are emitted first; as each table's
/// dependents lose their last outstanding edge they become emittable. If
/// emission terminates with tables remaining, those tables form one or more
/// cycles — they are appended in sorted-name order and `cycles` is populated
/// via a separate depth-first pass for reporting. This tolerates cycles
/// deliberately: callers that want a strictly acyclic order should run
/// `graph::cycle::break_cycles` first.
pub fn topological_sort(graph: &DependencyGraph) -> Result<InsertionPlan> {
    let table_names: Vec<String> = graph.table_names().iter().map(|s| s.to_string()).collect();

    // dependency map: child -> [parents], built from child->parent edges.
    let mut deps: HashMap<String, Vec<String>> = HashMap::new();
    let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
    let mut in_degree: HashMap<String, usize> = HashMap::new();

    for name in &table_names {
        deps.insert(name.clone(), Vec::new());
        dependents.insert(name.clone(), Vec::new());
        in_degree.insert(name.clone(), 0);
    }

    for idx in graph.graph.node_indices() {
        let child = graph.table_name(idx).to_string();
        for edge in graph.graph.edges(idx) {
            let parent = graph.table_name(edge.target()).to_string();
            if parent == child {
                continue; // self-references don't constrain ordering
            }
            deps.get_mut(&child).unwrap().push(parent.clone());
            dependents.get_mut(&parent).unwrap().push(child.clone());
            *in_degree.get_mut(&child).unwrap() += 1;
        }
    }

    // Deterministic emission order among ties.
    let mut initial: Vec<String> = table_names
        .iter()
        .filter(|t| in_degree[*t] == 0)
        .cloned()
        .collect();
    initial.sort();
    let mut queue: VecDeque<String> = initial.into();

    let mut order = Vec::with_capacity(table_names.len());
    let mut remaining_degree = in_degree.clone();

    while let Some(table) = queue.pop_front() {
        order.push(table.clone());
        let mut newly_ready = Vec::new();
        for dependent in &dependents[&table] {
            let d = remaining_degree.get_mut(dependent).unwrap();
            *d -= 1;
            if *d == 0 {
                newly_ready.push(dependent.clone());
            }
        }
        newly_ready.sort();
        for t in newly_ready {
            queue.push_back(t);
        }
    }

    let cycles = detect_cycles(graph);

    if order.len() != table_names.len() {
        let emitted: HashSet<&str> = order.iter().map(|s| s.as_str()).collect();
        let mut remaining: Vec<String> = table_names
            .iter()
            .filter(|t| !emitted.contains(t.as_str()))
            .cloned()
            .collect();
        remaining.sort();
        order.extend(remaining);
    }

    let independent_tables: Vec<String> = table_names
        .iter()
        .filter(|t| deps[*t].is_empty())
        .cloned()
        .collect();

    Ok(InsertionPlan {
        order,
        graph: deps,
        cycles,
        independent_tables,
    })
}

/// Depth-first cycle detection for reporting, independent of the Kahn's pass
/// above. Uses a recursion stack; when a back edge is found, the path slice
/// from the first occurrence of the destination is recorded as a cycle.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let mut cycles = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut rec_stack: Vec<String> = Vec::new();
    let mut in_stack: HashSet<String> = HashSet::new();

    let mut table_names: Vec<String> = graph.table_names().iter().map(|s| s.to_string()).collect();
    table_names.sort();

    for start in &table_names {
        if !visited.contains(start) {
            visit(
                graph,
                start,
                &mut visited,
                &mut rec_stack,
                &mut in_stack,
                &mut cycles,
            );
        }
    }

    cycles
}

fn visit(
    graph: &DependencyGraph,
    table: &str,
    visited: &mut HashSet<String>,
    rec_stack: &mut Vec<String>,
    in_stack: &mut HashSet<String>,
    cycles: &mut Vec<Vec<String>>,
) {
    visited.insert(table.to_string());
    rec_stack.push(table.to_string());
    in_stack.insert(table.to_string());

    if let Some(idx) = graph.node_index(table) {
        for edge in graph.graph.edges(idx) {
            let next = graph.table_name(edge.target()).to_string();
            if next == table {
                continue; // self-reference reported separately by cycle::break_cycles
            }
            if in_stack.contains(&next) {
                let start_pos = rec_stack.iter().position(|t| t == &next).unwrap();
                cycles.push(rec_stack[start_pos..].to_vec());
            } else if !visited.contains(&next) {
                visit(graph, &next, visited, rec_stack, in_stack, cycles);
            }
        }
    }

    rec_stack.pop();
    in_stack.remove(table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::dag::DependencyGraph;
    use crate::schema::types::*;

    fn fk(source_col: &str, target: &str, nullable: bool) -> (Column, ForeignKey) {
        let mut col = Column::new(source_col.to_string(), DataType::Integer, "integer".to_string());
        col.nullable = nullable;
        let fk = ForeignKey {
            name: None,
            source_columns: vec![source_col.to_string()],
            referenced_table: target.to_string(),
            referenced_columns: vec!["id".to_string()],
            on_delete: ForeignKeyAction::NoAction,
            on_update: ForeignKeyAction::NoAction,
            is_deferrable: false,
        };
        (col, fk)
    }

    #[test]
    fn test_topological_sort_simple() {
        let mut schema = DatabaseSchema::new(DatabaseType::PostgreSQL, "test".to_string());

        let users = Table::new("users".to_string());
        schema.tables.insert("users".to_string(), users);

        let mut orders = Table::new("orders".to_string());
        let (col, fk) = fk("user_id", "users", false);
        orders.columns.insert("user_id".to_string(), col);
        orders.foreign_keys.push(fk);
        schema.tables.insert("orders".to_string(), orders);

        let graph = DependencyGraph::from_schema(&schema);
        let plan = topological_sort(&graph).unwrap();

        let users_pos = plan.order.iter().position(|t| t == "users").unwrap();
        let orders_pos = plan.order.iter().position(|t| t == "orders").unwrap();
        assert!(users_pos < orders_pos);
        assert!(plan.cycles.is_empty());
    }

    #[test]
    fn test_cycle_tolerant_ordering_appends_cyclic_tables() {
        let mut schema = DatabaseSchema::new(DatabaseType::PostgreSQL, "test".to_string());

        let mut a = Table::new("table_a".to_string());
        let (col_a, fk_a) = fk("b_id", "table_b", true);
        a.columns.insert("b_id".to_string(), col_a);
        a.foreign_keys.push(fk_a);
        schema.tables.insert("table_a".to_string(), a);

        let mut b = Table::new("table_b".to_string());
        let (col_b, fk_b) = fk("a_id", "table_a", false);
        b.columns.insert("a_id".to_string(), col_b);
        b.foreign_keys.push(fk_b);
        schema.tables.insert("table_b".to_string(), b);

        let graph = DependencyGraph::from_schema(&schema);
        let plan = topological_sort(&graph).unwrap();

        assert_eq!(plan.order.len(), 2);
        assert_eq!(plan.cycles.len(), 1);
        assert!(plan.order.contains(&"table_a".to_string()));
        assert!(plan.order.contains(&"table_b".to_string()));
    }

    #[test]
    fn test_batches_partition_respects_dependencies() {
        let mut schema = DatabaseSchema::new(DatabaseType::PostgreSQL, "test".to_string());
        schema
            .tables
            .insert("users".to_string(), Table::new("users".to_string()));

        let mut orders = Table::new("orders".to_string());
        let (col, fk) = fk("user_id", "users", false);
        orders.columns.insert("user_id".to_string(), col);
        orders.foreign_keys.push(fk);
        schema.tables.insert("orders".to_string(), orders);

        let graph = DependencyGraph::from_schema(&schema);
        let plan = topological_sort(&graph).unwrap();
        let batches = plan.batches();

        let users_batch = batches.iter().position(|b| b.contains(&"users".to_string())).unwrap();
        let orders_batch = batches
            .iter()
            .position(|b| b.contains(&"orders".to_string()))
            .unwrap();
        assert!(users_batch < orders_batch);
    }
}
