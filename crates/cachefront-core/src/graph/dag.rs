//! DAG validation and parallel wave computation for resource declarations.
//!
//! Uses `petgraph` to model dependency edges as a directed graph.
//! Topological sort detects cycles at graph-construction time -- before any
//! remote mutation -- and depth-based grouping produces materialization
//! waves where every resource in a wave can materialize concurrently.

use std::collections::HashMap;

use cachefront_types::error::ConfigError;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use super::ResourceGraph;

/// Compute materialization waves over the declared resources.
///
/// Each wave holds indices into the graph's declaration list. All resources
/// in a wave have every dependency satisfied by prior waves; no other
/// ordering is guaranteed. The algorithm:
///
/// 1. Build a `DiGraph` with declarations as nodes and `depends_on` edges.
/// 2. Run `petgraph::algo::toposort` to verify acyclicity.
/// 3. Compute each node's depth (max dependency depth + 1).
/// 4. Group declarations by depth into waves.
pub fn execution_waves(graph: &ResourceGraph) -> Result<Vec<Vec<usize>>, ConfigError> {
    let decls = graph.declarations();
    if decls.is_empty() {
        return Ok(vec![]);
    }

    let name_to_idx: HashMap<&str, usize> = decls
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name.as_str(), i))
        .collect();

    // Edge from dependency -> dependent
    let mut dag = DiGraph::<&str, ()>::new();
    let node_indices: Vec<_> = decls.iter().map(|d| dag.add_node(d.name.as_str())).collect();

    for (idx, decl) in decls.iter().enumerate() {
        for dep in &decl.depends_on {
            let from = name_to_idx.get(dep.as_str()).ok_or_else(|| {
                ConfigError::UnknownDependency {
                    resource: decl.name.to_string(),
                    dependency: dep.to_string(),
                }
            })?;
            dag.add_edge(node_indices[*from], node_indices[idx], ());
        }
    }

    let sorted = toposort(&dag, None).map_err(|cycle| {
        ConfigError::CircularDependency(dag[cycle.node_id()].to_string())
    })?;

    // Root declarations have depth 0
    let mut depths: HashMap<&str, usize> = HashMap::new();
    for &node in &sorted {
        let name = dag[node];
        let decl = &decls[name_to_idx[name]];
        let depth = decl
            .depends_on
            .iter()
            .map(|dep| depths.get(dep.as_str()).copied().unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);
        depths.insert(name, depth);
    }

    let max_depth = depths.values().copied().max().unwrap_or(0);
    let mut waves: Vec<Vec<usize>> = vec![vec![]; max_depth + 1];
    for (idx, decl) in decls.iter().enumerate() {
        waves[depths[decl.name.as_str()]].push(idx);
    }

    Ok(waves)
}
