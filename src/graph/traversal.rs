//! Graph walks, paths, components, neighbourhoods and impact analysis.
//!
//! Every walk expands neighbours in edge order, so results are deterministic
//! for a given snapshot. Cycles are handled with a seen-set.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use super::types::MemoryGraph;
use crate::error::Result;

/// Which edges a walk may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// source → target
    Outbound,
    /// target → source
    Inbound,
    /// Either way.
    Both,
}

/// Visit order plus the hop distance at which each node was reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Traversal {
    pub visited: Vec<String>,
    pub depths: BTreeMap<String, usize>,
}

impl Traversal {
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.depths.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.depths.contains_key(id)
    }

    fn record(&mut self, id: &str, depth: usize) {
        self.visited.push(id.to_string());
        self.depths.insert(id.to_string(), depth);
    }
}

/// Dependents of a node: everything that (transitively) points at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactReport {
    pub id: String,
    /// Nodes with an edge straight into `id`.
    pub direct: Vec<String>,
    /// Every dependent, direct ones included, in breadth-first order.
    pub transitive: Vec<String>,
    /// Deepest level of the dependent closure; 0 when nothing depends on `id`.
    pub max_depth: usize,
}

fn adjacency(graph: &MemoryGraph, direction: Direction) -> HashMap<&str, Vec<&str>> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        let (s, t) = (edge.source.as_str(), edge.target.as_str());
        match direction {
            Direction::Outbound => adj.entry(s).or_default().push(t),
            Direction::Inbound => adj.entry(t).or_default().push(s),
            Direction::Both => {
                adj.entry(s).or_default().push(t);
                adj.entry(t).or_default().push(s);
            }
        }
    }
    adj
}

/// Level-order walk. Nodes at exactly `max_depth` are kept but not expanded.
fn walk(
    graph: &MemoryGraph,
    start: &str,
    direction: Direction,
    max_depth: Option<usize>,
) -> Result<Traversal> {
    graph.require_node(start)?;
    let adj = adjacency(graph, direction);

    let mut result = Traversal::default();
    let mut queue = VecDeque::from([(start, 0usize)]);
    result.record(start, 0);

    while let Some((current, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        for &next in adj.get(current).map(Vec::as_slice).unwrap_or_default() {
            if !result.contains(next) {
                result.record(next, depth + 1);
                queue.push_back((next, depth + 1));
            }
        }
    }

    Ok(result)
}

/// Breadth-first walk along outbound edges.
pub fn bfs(graph: &MemoryGraph, start: &str, max_depth: Option<usize>) -> Result<Traversal> {
    walk(graph, start, Direction::Outbound, max_depth)
}

/// Depth-first (pre-order) walk along outbound edges.
///
/// Reaches the same set as [`bfs`]; depths are those along the DFS tree.
pub fn dfs(graph: &MemoryGraph, start: &str) -> Result<Traversal> {
    graph.require_node(start)?;
    let adj = adjacency(graph, Direction::Outbound);

    let mut result = Traversal::default();
    let mut stack = vec![(start, 0usize)];
    while let Some((current, depth)) = stack.pop() {
        if result.contains(current) {
            continue;
        }
        result.record(current, depth);
        if let Some(next) = adj.get(current) {
            // reversed so the first edge is explored first
            for &n in next.iter().rev() {
                if !result.contains(n) {
                    stack.push((n, depth + 1));
                }
            }
        }
    }
    Ok(result)
}

/// Every node reachable from `start` along outbound edges, `start` included.
pub fn find_reachable(graph: &MemoryGraph, start: &str) -> Result<Vec<String>> {
    Ok(bfs(graph, start, None)?.visited)
}

/// Unweighted shortest path along outbound edges.
///
/// `Ok(None)` when `to` is unreachable, including when it is not a node.
/// Among equal-length paths the one found first in level order wins.
pub fn shortest_path(graph: &MemoryGraph, from: &str, to: &str) -> Result<Option<Vec<String>>> {
    graph.require_node(from)?;
    if !graph.contains_node(to) {
        return Ok(None);
    }
    if from == to {
        return Ok(Some(vec![from.to_string()]));
    }

    let adj = adjacency(graph, Direction::Outbound);
    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut seen: HashSet<&str> = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);

    while let Some(current) = queue.pop_front() {
        for &next in adj.get(current).map(Vec::as_slice).unwrap_or_default() {
            if !seen.insert(next) {
                continue;
            }
            parent.insert(next, current);
            if next == to {
                let mut path = vec![to.to_string()];
                let mut cursor = to;
                while let Some(&p) = parent.get(cursor) {
                    path.push(p.to_string());
                    cursor = p;
                }
                path.reverse();
                return Ok(Some(path));
            }
            queue.push_back(next);
        }
    }

    Ok(None)
}

/// Partition all nodes into weakly connected components.
///
/// Components are ordered by their first node in graph order; members are in
/// breadth-first order from that node.
pub fn connected_components(graph: &MemoryGraph) -> Vec<Vec<String>> {
    let adj = adjacency(graph, Direction::Both);
    let mut assigned: HashSet<&str> = HashSet::new();
    let mut components = Vec::new();

    for root in graph.node_ids() {
        if !assigned.insert(root) {
            continue;
        }
        let mut component = vec![root.to_string()];
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            for &next in adj.get(current).map(Vec::as_slice).unwrap_or_default() {
                if assigned.insert(next) {
                    component.push(next.to_string());
                    queue.push_back(next);
                }
            }
        }
        components.push(component);
    }

    components
}

/// Nodes within `depth` hops of `start`, following edges in both directions.
pub fn nodes_at_depth(graph: &MemoryGraph, start: &str, depth: usize) -> Result<Traversal> {
    walk(graph, start, Direction::Both, Some(depth))
}

/// The neighbourhood of `start` as a graph: nodes within `max_depth` hops
/// (either direction) and the edges between them.
pub fn subgraph(graph: &MemoryGraph, start: &str, max_depth: usize) -> Result<MemoryGraph> {
    let keep = nodes_at_depth(graph, start, max_depth)?;
    Ok(restrict(graph, |id| keep.contains(id)))
}

/// Keep the nodes accepted by `keep` (in graph order) and the edges between them.
pub(crate) fn restrict(graph: &MemoryGraph, keep: impl Fn(&str) -> bool) -> MemoryGraph {
    MemoryGraph {
        version: graph.version,
        nodes: graph.nodes.iter().filter(|n| keep(&n.id)).cloned().collect(),
        edges: graph
            .edges
            .iter()
            .filter(|e| keep(&e.source) && keep(&e.target))
            .cloned()
            .collect(),
    }
}

/// What would be affected if `id` changed: the closure over inbound edges.
pub fn calculate_impact(graph: &MemoryGraph, id: &str) -> Result<ImpactReport> {
    let closure = walk(graph, id, Direction::Inbound, None)?;

    let dependents: Vec<String> = closure.visited.iter().skip(1).cloned().collect();
    let direct = dependents
        .iter()
        .filter(|d| closure.depth_of(d) == Some(1))
        .cloned()
        .collect();
    let max_depth = closure.depths.values().copied().max().unwrap_or(0);

    Ok(ImpactReport {
        id: id.to_string(),
        direct,
        transitive: dependents,
        max_depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edges::add_edge;
    use crate::graph::labels::EdgeLabel;
    use crate::graph::store::add_node;
    use crate::memory::MemoryType;

    /// a → b → d, a → c → d, d → a (cycle), e isolated
    fn diamond() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        for id in ["a", "b", "c", "d", "e"] {
            g = add_node(&g, id, MemoryType::Learning).unwrap();
        }
        for (s, t) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("d", "a")] {
            g = add_edge(&g, s, t, &EdgeLabel::RELATES_TO).unwrap();
        }
        g
    }

    #[test]
    fn bfs_orders_by_level() {
        let t = bfs(&diamond(), "a", None).unwrap();
        assert_eq!(t.visited, vec!["a", "b", "c", "d"]);
        assert_eq!(t.depth_of("a"), Some(0));
        assert_eq!(t.depth_of("d"), Some(2));
        assert!(!t.contains("e"));
    }

    #[test]
    fn bfs_max_depth_keeps_boundary() {
        let t = bfs(&diamond(), "a", Some(1)).unwrap();
        assert_eq!(t.visited, vec!["a", "b", "c"]);
        assert!(t.depths.values().all(|&d| d <= 1));

        let t = bfs(&diamond(), "a", Some(0)).unwrap();
        assert_eq!(t.visited, vec!["a"]);
    }

    #[test]
    fn dfs_reaches_same_set_in_depth_order() {
        let g = diamond();
        let d = dfs(&g, "a").unwrap();
        assert_eq!(d.visited, vec!["a", "b", "d", "c"]);

        let mut from_dfs = d.visited.clone();
        let mut from_bfs = bfs(&g, "a", None).unwrap().visited;
        from_dfs.sort();
        from_bfs.sort();
        assert_eq!(from_dfs, from_bfs);
    }

    #[test]
    fn walks_reject_unknown_start() {
        assert!(bfs(&diamond(), "ghost", None).unwrap_err().is_not_found());
        assert!(dfs(&diamond(), "ghost").unwrap_err().is_not_found());
    }

    #[test]
    fn shortest_path_cases() {
        let g = diamond();
        assert_eq!(shortest_path(&g, "a", "a").unwrap(), Some(vec!["a".to_string()]));
        assert_eq!(
            shortest_path(&g, "a", "d").unwrap(),
            Some(vec!["a".to_string(), "b".to_string(), "d".to_string()])
        );
        assert_eq!(
            shortest_path(&g, "d", "c").unwrap(),
            Some(vec!["d".to_string(), "a".to_string(), "c".to_string()])
        );
        assert_eq!(shortest_path(&g, "a", "e").unwrap(), None);
    }

    #[test]
    fn components_partition_nodes() {
        let comps = connected_components(&diamond());
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0], vec!["a", "b", "c", "d"]);
        assert_eq!(comps[1], vec!["e"]);
    }

    #[test]
    fn subgraph_is_bidirectional_and_bounded() {
        let g = diamond();
        let sub = subgraph(&g, "b", 1).unwrap();
        let ids: Vec<&str> = sub.node_ids().collect();
        assert_eq!(ids, vec!["a", "b", "d"]);
        assert!(sub
            .edges
            .iter()
            .all(|e| sub.contains_node(&e.source) && sub.contains_node(&e.target)));
        assert_eq!(sub.edges.len(), 3);
    }

    #[test]
    fn impact_follows_inbound_edges() {
        let g = diamond();
        let report = calculate_impact(&g, "d").unwrap();
        assert_eq!(report.direct, vec!["b", "c"]);
        assert_eq!(report.transitive, vec!["b", "c", "a"]);
        assert_eq!(report.max_depth, 2);

        let none = calculate_impact(&g, "e").unwrap();
        assert!(none.direct.is_empty());
        assert!(none.transitive.is_empty());
        assert_eq!(none.max_depth, 0);
    }
}
