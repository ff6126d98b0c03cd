use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::DatasetSchema;

/// Summary of dependency graph structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Report for entity dependency ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub summary: GraphSummary,
    pub order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}

/// Entity dependency graph over an arena of entity names.
///
/// An edge runs from a referenced entity to the entity referencing it.
/// Nullable self references carry no edge. References to entities missing
/// from the schema are skipped; validation reports them separately.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    index: BTreeMap<String, usize>,
    /// referenced -> referencing
    dependents: Vec<BTreeSet<usize>>,
    /// referencing -> referenced
    dependencies: Vec<BTreeSet<usize>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl DependencyGraph {
    pub fn build(schema: &DatasetSchema) -> Self {
        let nodes: Vec<String> = schema.entities.keys().cloned().collect();
        let index: BTreeMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        let mut dependents = vec![BTreeSet::new(); nodes.len()];
        let mut dependencies = vec![BTreeSet::new(); nodes.len()];

        for (name, entity) in &schema.entities {
            let owner = index[name];
            for relationship in entity.relationships.values() {
                if relationship.is_exempt_self_reference(name) {
                    continue;
                }
                let Some(&target) = index.get(&relationship.references) else {
                    continue;
                };
                dependents[target].insert(owner);
                dependencies[owner].insert(target);
            }
        }

        Self {
            nodes,
            index,
            dependents,
            dependencies,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.dependents.iter().map(BTreeSet::len).sum()
    }

    /// Entities `name` must be generated after.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.index
            .get(name)
            .map(|&idx| {
                self.dependencies[idx]
                    .iter()
                    .map(|&dep| self.nodes[dep].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Depth-first search with a recursion stack.
    ///
    /// Returns the first cycle found as entity names in reference direction,
    /// with the starting entity repeated at the end (`A -> B -> A`).
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut stack = Vec::new();

        for start in 0..self.nodes.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            if let Some(cycle) = self.visit(start, &mut marks, &mut stack) {
                return Some(
                    cycle
                        .into_iter()
                        .map(|idx| self.nodes[idx].clone())
                        .collect(),
                );
            }
        }

        None
    }

    fn visit(&self, node: usize, marks: &mut [Mark], stack: &mut Vec<usize>) -> Option<Vec<usize>> {
        marks[node] = Mark::OnStack;
        stack.push(node);

        for &next in &self.dependencies[node] {
            match marks[next] {
                Mark::OnStack => {
                    let start = stack.iter().position(|&idx| idx == next)?;
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Mark::Unvisited => {
                    if let Some(cycle) = self.visit(next, marks, stack) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }

        stack.pop();
        marks[node] = Mark::Done;
        None
    }

    /// Kahn's algorithm. Ready entities are taken in schema key order.
    ///
    /// Returns whatever order could be produced; a short order means a cycle.
    pub fn toposort(&self) -> Vec<String> {
        let mut indegree: Vec<usize> = self.dependencies.iter().map(BTreeSet::len).collect();
        let mut ready: BTreeSet<usize> = indegree
            .iter()
            .enumerate()
            .filter_map(|(idx, count)| (*count == 0).then_some(idx))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node) = ready.pop_first() {
            order.push(self.nodes[node].clone());
            for &dependent in &self.dependents[node] {
                let count = &mut indegree[dependent];
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ready.insert(dependent);
                }
            }
        }

        order
    }
}

/// Build a deterministic dependency report for a dataset schema.
pub fn build_dependency_report(schema: &DatasetSchema) -> DependencyReport {
    let graph = DependencyGraph::build(schema);
    let summary = GraphSummary {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    };

    match graph.find_cycle() {
        Some(cycle) => DependencyReport {
            summary,
            order: None,
            cycle: Some(cycle),
        },
        None => DependencyReport {
            summary,
            order: Some(graph.toposort()),
            cycle: None,
        },
    }
}

/// Resolve the order in which entities must be generated.
pub fn resolve_generation_order(schema: &DatasetSchema) -> Result<Vec<String>> {
    let graph = DependencyGraph::build(schema);
    if let Some(path) = graph.find_cycle() {
        return Err(Error::Cycle { path });
    }

    let order = graph.toposort();
    if order.len() != graph.node_count() {
        let missing: Vec<&str> = schema
            .entities
            .keys()
            .filter(|name| !order.contains(name))
            .map(String::as_str)
            .collect();
        return Err(Error::InternalOrdering(format!(
            "order omits entities after cycle pre-check: {}",
            missing.join(", ")
        )));
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Archetype, EntityDefinition, RelationshipDefinition};

    fn custom(count: i64) -> EntityDefinition {
        EntityDefinition::new(count, Archetype::Custom).with_fields(["name"])
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|item| item == name).unwrap()
    }

    #[test]
    fn toposort_orders_dependencies() {
        let mut schema = DatasetSchema::default();
        schema.entities.insert(
            "orders".to_string(),
            custom(5).with_relationship("user_id", RelationshipDefinition::new("users")),
        );
        schema.entities.insert("users".to_string(), custom(3));

        let order = resolve_generation_order(&schema).expect("expected order");
        assert!(position(&order, "users") < position(&order, "orders"));
    }

    #[test]
    fn toposort_handles_diamond() {
        let mut schema = DatasetSchema::default();
        schema.entities.insert(
            "line_items".to_string(),
            custom(5)
                .with_relationship("order_id", RelationshipDefinition::new("orders"))
                .with_relationship("product_id", RelationshipDefinition::new("products")),
        );
        schema.entities.insert(
            "orders".to_string(),
            custom(5).with_relationship("user_id", RelationshipDefinition::new("users")),
        );
        schema.entities.insert(
            "products".to_string(),
            custom(5).with_relationship("vendor_id", RelationshipDefinition::new("users")),
        );
        schema.entities.insert("users".to_string(), custom(3));

        let order = resolve_generation_order(&schema).expect("expected order");
        assert_eq!(order.len(), 4);
        assert!(position(&order, "users") < position(&order, "orders"));
        assert!(position(&order, "users") < position(&order, "products"));
        assert!(position(&order, "orders") < position(&order, "line_items"));
        assert!(position(&order, "products") < position(&order, "line_items"));
        assert_eq!(order, resolve_generation_order(&schema).unwrap());
    }

    #[test]
    fn reports_two_entity_cycle_path() {
        let mut schema = DatasetSchema::default();
        schema.entities.insert(
            "A".to_string(),
            custom(1).with_relationship("b_id", RelationshipDefinition::new("B")),
        );
        schema.entities.insert(
            "B".to_string(),
            custom(1).with_relationship("a_id", RelationshipDefinition::new("A")),
        );

        let err = resolve_generation_order(&schema).unwrap_err();
        assert_eq!(
            err,
            Error::Cycle {
                path: vec!["A".to_string(), "B".to_string(), "A".to_string()]
            }
        );
        assert!(err.to_string().contains("A -> B -> A"));
    }

    #[test]
    fn reports_cycle_in_reference_direction() {
        let mut schema = DatasetSchema::default();
        schema.entities.insert(
            "a".to_string(),
            custom(1).with_relationship("b_id", RelationshipDefinition::new("b")),
        );
        schema.entities.insert(
            "b".to_string(),
            custom(1).with_relationship("c_id", RelationshipDefinition::new("c")),
        );
        schema.entities.insert(
            "c".to_string(),
            custom(1).with_relationship("a_id", RelationshipDefinition::new("a")),
        );

        let report = build_dependency_report(&schema);
        assert!(report.order.is_none());
        assert_eq!(
            report.cycle.unwrap(),
            vec!["a", "b", "c", "a"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn nullable_self_reference_is_not_an_edge() {
        let mut schema = DatasetSchema::default();
        schema.entities.insert(
            "employees".to_string(),
            custom(4).with_relationship(
                "manager_id",
                RelationshipDefinition::new("employees").nullable(),
            ),
        );

        let report = build_dependency_report(&schema);
        assert_eq!(report.summary.edges, 0);
        assert_eq!(report.order, Some(vec!["employees".to_string()]));
    }

    #[test]
    fn required_self_reference_is_a_cycle() {
        let mut schema = DatasetSchema::default();
        schema.entities.insert(
            "nodes".to_string(),
            custom(4).with_relationship("parent_id", RelationshipDefinition::new("nodes")),
        );

        let err = resolve_generation_order(&schema).unwrap_err();
        assert_eq!(
            err,
            Error::Cycle {
                path: vec!["nodes".to_string(), "nodes".to_string()]
            }
        );
    }

    #[test]
    fn dangling_reference_is_ignored_by_graph() {
        let mut schema = DatasetSchema::default();
        schema.entities.insert(
            "orders".to_string(),
            custom(1).with_relationship("user_id", RelationshipDefinition::new("ghosts")),
        );

        let graph = DependencyGraph::build(&schema);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.dependencies_of("orders").is_empty());
    }
}
