//! # Weighted graph
//!
//! A generic directed graph with nonnegative link weights and cached single-source shortest path
//! tables. Nodes are small copyable identities (the arm uses [`super::ArmNode`]), the graph keeps
//! them in insertion order so that every search is deterministic.
//!
//! Shortest paths are found with Dijkstra's algorithm. The table for a source node is computed the
//! first time a path from that source is requested and kept until the graph is next mutated.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
    fmt::Debug,
    hash::Hash,
};

use conquer_once::OnceCell;
use log::trace;
use ordered_float::OrderedFloat;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Weight used for links which have not been given a tuned cost.
pub const DEFAULT_LINK_WEIGHT: f64 = 1.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A directed link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphLink<N> {
    pub from: N,
    pub to: N,
    pub weight: f64,
}

/// Result of a single-source shortest path search.
///
/// Only valid for the source it was computed from.
#[derive(Debug, Clone)]
pub struct ShortestPathTable<N> {
    source: N,

    /// Predecessor of each reachable node on its optimal path. The source has no entry.
    predecessors: HashMap<N, N>,

    /// Optimal cost from the source to each reachable node.
    distances: HashMap<N, f64>,
}

/// Directed weighted graph.
pub struct WeightedGraph<N> {
    /// Nodes in insertion order
    nodes: Vec<N>,

    /// Map from node to its index in `nodes`
    index: HashMap<N, usize>,

    /// Outgoing links of each node as `(to_index, weight)`, in the order they were connected
    adjacency: Vec<Vec<(usize, f64)>>,

    /// Lazily computed shortest path table for each source node
    path_cache: Vec<OnceCell<ShortestPathTable<N>>>,
}

/// Entry in the Dijkstra frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    cost: OrderedFloat<f64>,
    index: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("Node {0} is not in the graph")]
    UnknownNode(String),

    #[error(
        "Optimal path from {start} to {end} does not begin at {start}, {end} is unreachable"
    )]
    PathInvariant { start: String, end: String },

    #[error("The shortest path table for {0} could not be retrieved from the cache")]
    CacheUnavailable(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<N> WeightedGraph<N>
where
    N: Copy + Eq + Hash + Debug,
{
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            path_cache: Vec::new(),
        }
    }

    /// Add a node to the graph. Adding a node which is already present has no effect.
    pub fn add_node(&mut self, node: N) {
        self.node_index_or_insert(node);
    }

    /// Add a directed link from `from` to `to`. Endpoints which are not yet in the graph are added.
    ///
    /// # Panics
    /// - If `weight` is negative or NaN. Dijkstra is only correct for nonnegative weights, so such
    ///   a link is a programming error in the graph definition.
    pub fn connect(&mut self, from: N, to: N, weight: f64) {
        assert!(
            weight >= 0.0,
            "Link weight from {:?} to {:?} must be nonnegative, found {}",
            from,
            to,
            weight
        );

        let from_idx = self.node_index_or_insert(from);
        let to_idx = self.node_index_or_insert(to);

        self.adjacency[from_idx].push((to_idx, weight));
        self.reset_cache();
    }

    /// Add a link in each direction between `a` and `b`.
    ///
    /// `weight` is used from `a` to `b`, and `weight_b_to_a` (or `weight` if `None`) from `b` to
    /// `a`.
    pub fn connect_bidirectional(&mut self, a: N, b: N, weight: f64, weight_b_to_a: Option<f64>) {
        self.connect(a, b, weight);
        self.connect(b, a, weight_b_to_a.unwrap_or(weight));
    }

    /// Returns true if the node is in the graph.
    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Number of nodes in the graph.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over the nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.iter()
    }

    /// All links leaving `node`, in the order they were connected.
    pub fn links_from(&self, node: N) -> Vec<GraphLink<N>> {
        match self.index.get(&node) {
            Some(&idx) => self.adjacency[idx]
                .iter()
                .map(|&(to, weight)| GraphLink {
                    from: node,
                    to: self.nodes[to],
                    weight,
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Run Dijkstra's algorithm from `source` over the whole graph.
    ///
    /// This always performs the search, use [`WeightedGraph::optimal_path`] to benefit from the
    /// cache.
    pub fn shortest_path_tree(&self, source: N) -> Result<ShortestPathTable<N>, GraphError> {
        let source_idx = self.node_index(&source)?;
        Ok(self.dijkstra(source_idx))
    }

    /// Get the cached shortest path table for `source`, computing it if this is the first request.
    pub fn cached_tree(&self, source: N) -> Result<&ShortestPathTable<N>, GraphError> {
        let source_idx = self.node_index(&source)?;
        let cell = &self.path_cache[source_idx];

        if let Some(table) = cell.get() {
            return Ok(table);
        }

        trace!("Computing shortest path table for {:?}", source);

        // If another thread initialised the cell first its table is identical, so the error from
        // losing the race is ignored.
        cell.try_init_once(|| self.dijkstra(source_idx)).ok();

        cell.get()
            .ok_or_else(|| GraphError::CacheUnavailable(format!("{:?}", source)))
    }

    /// Get the minimum cost path from `start` to `end`, including both endpoints.
    ///
    /// A path from a node to itself is the single element path `[start]`.
    ///
    /// If `end` cannot be reached from `start` the reconstructed path does not begin at `start`,
    /// which is reported as [`GraphError::PathInvariant`].
    pub fn optimal_path(&self, start: N, end: N) -> Result<Vec<N>, GraphError> {
        self.node_index(&end)?;

        let table = self.cached_tree(start)?;
        let path = table.path_to(end);

        match path.first() {
            Some(first) if *first == start => Ok(path),
            _ => Err(GraphError::PathInvariant {
                start: format!("{:?}", start),
                end: format!("{:?}", end),
            }),
        }
    }

    /// Total weight of a path, using the cheapest link between each pair of consecutive nodes.
    ///
    /// Returns `None` if two consecutive nodes are not linked.
    pub fn path_cost(&self, path: &[N]) -> Option<f64> {
        let mut cost = 0.0;

        for pair in path.windows(2) {
            let from = *self.index.get(&pair[0])?;
            let to = *self.index.get(&pair[1])?;

            let link = self.adjacency[from]
                .iter()
                .filter(|(t, _)| *t == to)
                .map(|(_, w)| OrderedFloat(*w))
                .min()?;

            cost += link.into_inner();
        }

        Some(cost)
    }

    fn node_index(&self, node: &N) -> Result<usize, GraphError> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(format!("{:?}", node)))
    }

    fn node_index_or_insert(&mut self, node: N) -> usize {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }

        let idx = self.nodes.len();
        self.nodes.push(node);
        self.index.insert(node, idx);
        self.adjacency.push(Vec::new());
        self.reset_cache();

        idx
    }

    /// Drop all cached tables, they are invalid once the graph changes.
    fn reset_cache(&mut self) {
        self.path_cache = (0..self.nodes.len()).map(|_| OnceCell::uninit()).collect();
    }

    fn dijkstra(&self, source_idx: usize) -> ShortestPathTable<N> {
        let num_nodes = self.nodes.len();

        let mut dist = vec![std::f64::INFINITY; num_nodes];
        let mut pred: Vec<Option<usize>> = vec![None; num_nodes];
        let mut visited = vec![false; num_nodes];

        let mut frontier = BinaryHeap::new();

        dist[source_idx] = 0.0;
        frontier.push(FrontierEntry {
            cost: OrderedFloat(0.0),
            index: source_idx,
        });

        while let Some(FrontierEntry { cost, index }) = frontier.pop() {
            // Stale entries are left in the heap rather than decreasing keys
            if visited[index] {
                continue;
            }
            visited[index] = true;

            for &(to, weight) in &self.adjacency[index] {
                let candidate = cost.into_inner() + weight;

                // Strictly less, so the first relaxation wins between equal cost routes
                if !visited[to] && candidate < dist[to] {
                    dist[to] = candidate;
                    pred[to] = Some(index);
                    frontier.push(FrontierEntry {
                        cost: OrderedFloat(candidate),
                        index: to,
                    });
                }
            }
        }

        let mut predecessors = HashMap::new();
        let mut distances = HashMap::new();

        for idx in 0..num_nodes {
            if dist[idx].is_finite() {
                distances.insert(self.nodes[idx], dist[idx]);
            }
            if let Some(p) = pred[idx] {
                predecessors.insert(self.nodes[idx], self.nodes[p]);
            }
        }

        ShortestPathTable {
            source: self.nodes[source_idx],
            predecessors,
            distances,
        }
    }
}

impl<N> Default for WeightedGraph<N>
where
    N: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Eq + Hash> PartialEq for ShortestPathTable<N> {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.predecessors == other.predecessors
            && self.distances == other.distances
    }
}

impl<N: Copy + Eq + Hash> ShortestPathTable<N> {
    /// The node this table was computed from.
    pub fn source(&self) -> N {
        self.source
    }

    /// Predecessor of `node` on its optimal path, `None` for the source and unreachable nodes.
    pub fn predecessor(&self, node: &N) -> Option<N> {
        self.predecessors.get(node).copied()
    }

    /// Optimal cost from the source to `node`, `None` if unreachable.
    pub fn distance(&self, node: &N) -> Option<f64> {
        self.distances.get(node).copied()
    }

    /// Walk the predecessors back from `goal`.
    ///
    /// The result ends at `goal`. It only begins at the source if `goal` is reachable, otherwise it
    /// is just `[goal]`.
    pub fn path_to(&self, goal: N) -> Vec<N> {
        let mut path = vec![goal];
        let mut current = goal;

        while let Some(&prev) = self.predecessors.get(&current) {
            path.push(prev);
            current = prev;
        }

        path.reverse();
        path
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Note that we flip the order here so that the heap will be a min-heap, not a max-heap.
        // Equal costs pop the earliest inserted node first.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    type Coord = (i32, i32);

    const A: Coord = (0, 0);
    const B: Coord = (10, 0);
    const C: Coord = (10, 10);
    const D: Coord = (0, 10);

    /// Reference all-pairs shortest path costs.
    fn floyd_warshall(num_nodes: usize, links: &[(usize, usize, f64)]) -> Vec<Vec<f64>> {
        let mut dist = vec![vec![std::f64::INFINITY; num_nodes]; num_nodes];

        for i in 0..num_nodes {
            dist[i][i] = 0.0;
        }
        for &(from, to, w) in links {
            if w < dist[from][to] {
                dist[from][to] = w;
            }
        }
        for k in 0..num_nodes {
            for i in 0..num_nodes {
                for j in 0..num_nodes {
                    if dist[i][k] + dist[k][j] < dist[i][j] {
                        dist[i][j] = dist[i][k] + dist[k][j];
                    }
                }
            }
        }

        dist
    }

    #[test]
    fn test_simple_chain() -> Result<(), GraphError> {
        let mut graph = WeightedGraph::new();
        graph.add_node(A);
        graph.connect(A, B, 1.0);
        graph.connect(B, C, 1.0);

        let path = graph.optimal_path(A, C)?;

        assert_eq!(path, vec![A, B, C]);
        assert_eq!(graph.path_cost(&path), Some(2.0));

        Ok(())
    }

    #[test]
    fn test_path_to_self() -> Result<(), GraphError> {
        let mut graph = WeightedGraph::new();
        graph.connect(A, B, 1.0);

        assert_eq!(graph.optimal_path(A, A)?, vec![A]);
        assert_eq!(graph.optimal_path(B, B)?, vec![B]);
        assert_eq!(graph.path_cost(&[A]), Some(0.0));

        Ok(())
    }

    #[test]
    fn test_bidirectional() -> Result<(), GraphError> {
        let mut graph = WeightedGraph::new();
        graph.connect_bidirectional(A, B, 2.5, None);
        graph.connect_bidirectional(B, C, 1.0, Some(4.0));

        assert_eq!(graph.optimal_path(A, B)?, vec![A, B]);
        assert_eq!(graph.optimal_path(B, A)?, vec![B, A]);
        assert_eq!(graph.path_cost(&[A, B]), Some(2.5));
        assert_eq!(graph.path_cost(&[B, A]), Some(2.5));

        // Asymmetric weights
        assert_eq!(graph.path_cost(&[B, C]), Some(1.0));
        assert_eq!(graph.path_cost(&[C, B]), Some(4.0));

        Ok(())
    }

    #[test]
    fn test_prefers_cheaper_multi_hop() -> Result<(), GraphError> {
        let mut graph = WeightedGraph::new();
        graph.connect_bidirectional(A, C, 5.0, None);
        graph.connect_bidirectional(A, B, 1.0, None);
        graph.connect_bidirectional(B, C, 1.0, None);

        assert_eq!(graph.optimal_path(A, C)?, vec![A, B, C]);
        assert_eq!(graph.optimal_path(C, A)?, vec![C, B, A]);

        Ok(())
    }

    #[test]
    fn test_add_node_idempotent() {
        let mut graph = WeightedGraph::new();
        graph.add_node(A);
        graph.add_node(A);
        graph.connect(A, B, 1.0);
        graph.add_node(B);

        assert_eq!(graph.num_nodes(), 2);
        assert_eq!(graph.nodes().copied().collect::<Vec<_>>(), vec![A, B]);
        assert_eq!(graph.links_from(A).len(), 1);
    }

    #[test]
    fn test_unreachable() {
        let mut graph = WeightedGraph::new();
        graph.connect(A, B, 1.0);
        graph.add_node(D);

        // Directed, so A cannot be reached from B
        assert!(matches!(
            graph.optimal_path(B, A),
            Err(GraphError::PathInvariant { .. })
        ));
        assert!(matches!(
            graph.optimal_path(A, D),
            Err(GraphError::PathInvariant { .. })
        ));
        assert!(matches!(
            graph.optimal_path(A, C),
            Err(GraphError::UnknownNode(_))
        ));
        assert!(matches!(
            graph.optimal_path(C, A),
            Err(GraphError::UnknownNode(_))
        ));
    }

    #[test]
    #[should_panic]
    fn test_negative_weight() {
        let mut graph = WeightedGraph::new();
        graph.connect(A, B, -1.0);
    }

    #[test]
    fn test_cache() -> Result<(), GraphError> {
        let mut graph = WeightedGraph::new();
        graph.connect_bidirectional(A, B, 1.0, None);
        graph.connect_bidirectional(B, C, 1.0, None);

        let table = graph.cached_tree(A)?;
        assert_eq!(table.source(), A);
        assert_eq!(table.distance(&C), Some(2.0));
        assert_eq!(table.predecessor(&C), Some(B));
        assert_eq!(table.predecessor(&A), None);

        // Cached tables are per source
        assert_eq!(graph.cached_tree(C)?.source(), C);
        assert_eq!(graph.cached_tree(C)?.distance(&A), Some(2.0));

        // Second lookup is the same table
        assert!(std::ptr::eq(graph.cached_tree(A)?, graph.cached_tree(A)?));

        // A cached table matches a fresh search
        assert_eq!(graph.cached_tree(B)?, &graph.shortest_path_tree(B)?);
        assert_ne!(graph.cached_tree(A)?, graph.cached_tree(C)?);

        // Mutating the graph discards the cache
        graph.connect(A, C, 0.5);
        assert_eq!(graph.optimal_path(A, C)?, vec![A, C]);
        assert_eq!(graph.cached_tree(A)?.distance(&C), Some(0.5));

        Ok(())
    }

    #[test]
    fn test_equal_cost_tie_break() -> Result<(), GraphError> {
        // Two routes of equal cost, A-B-C and A-D-C. B was inserted first so wins.
        let mut graph = WeightedGraph::new();
        graph.connect(A, B, 1.0);
        graph.connect(A, D, 1.0);
        graph.connect(B, C, 1.0);
        graph.connect(D, C, 1.0);

        for _ in 0..10 {
            assert_eq!(graph.shortest_path_tree(A)?.path_to(C), vec![A, B, C]);
        }

        Ok(())
    }

    #[test]
    fn test_against_reference() -> Result<(), GraphError> {
        const NUM_NODES: usize = 12;

        // Small linear congruential generator so the graph is the same every run
        let mut seed: u64 = 0x2545_f491;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as usize
        };

        let mut links = Vec::new();
        for _ in 0..30 {
            let from = next() % NUM_NODES;
            let to = next() % NUM_NODES;
            let weight = (next() % 100) as f64 / 10.0;
            links.push((from, to, weight));
        }

        let mut graph = WeightedGraph::new();
        for i in 0..NUM_NODES {
            graph.add_node(i);
        }
        for &(from, to, w) in &links {
            graph.connect(from, to, w);
        }

        let reference = floyd_warshall(NUM_NODES, &links);

        for from in 0..NUM_NODES {
            for to in 0..NUM_NODES {
                match graph.optimal_path(from, to) {
                    Ok(path) => {
                        let cost = graph.path_cost(&path).unwrap_or(std::f64::NAN);
                        assert!(
                            (cost - reference[from][to]).abs() < 1e-9,
                            "{} -> {}: got {}, expected {}",
                            from,
                            to,
                            cost,
                            reference[from][to]
                        );
                        assert_eq!(path.first(), Some(&from));
                        assert_eq!(path.last(), Some(&to));
                    }
                    Err(GraphError::PathInvariant { .. }) => {
                        assert!(reference[from][to].is_infinite())
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(())
    }
}
