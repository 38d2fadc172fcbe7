//! Weighted graph for MaxCut problems
//!
//! Nodes are the qubits `0..n-1`. Edges keep their insertion order, which is
//! also the row order of the edge term tables and the order of the per-edge
//! angles in the multi-angle layout.

use crate::error::QaoaError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Undirected weighted edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub u: usize,
    pub v: usize,
    pub weight: f64,
}

impl Edge {
    /// Create a new edge
    pub fn new(u: usize, v: usize, weight: f64) -> Self {
        Self { u, v, weight }
    }

    /// Endpoints as an ordered pair (smaller node first)
    #[inline]
    pub fn key(&self) -> (usize, usize) {
        edge_key(self.u, self.v)
    }
}

#[inline]
fn edge_key(u: usize, v: usize) -> (usize, usize) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

/// Serialized form of a graph: node count plus edge list
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphData {
    num_nodes: usize,
    edges: Vec<Edge>,
}

/// Graph representation for QAOA problems
///
/// Immutable once built. Evaluators share it behind an `Arc`.
///
/// # Example
///
/// ```
/// use maqaoa_core::Graph;
///
/// let graph = Graph::from_edges(3, &[(0, 1, 1.0), (1, 2, 2.0)]).unwrap();
/// assert_eq!(graph.num_edges(), 2);
/// assert_eq!(graph.edge_index(2, 1), Some(1));
/// assert_eq!(graph.total_weight(), 3.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct Graph {
    num_nodes: usize,
    edges: Vec<Edge>,
    /// Per node: neighbor -> index of the connecting edge
    adjacency: Vec<BTreeMap<usize, usize>>,
    edge_lookup: HashMap<(usize, usize), usize>,
}

impl Graph {
    /// Create a new graph from edges given as `(u, v, weight)`
    ///
    /// Fails on nodes outside `0..num_nodes`, self loops and duplicate edges.
    pub fn from_edges(num_nodes: usize, edges: &[(usize, usize, f64)]) -> Result<Self> {
        let mut adjacency = vec![BTreeMap::new(); num_nodes];
        let mut edge_lookup = HashMap::with_capacity(edges.len());
        let mut stored = Vec::with_capacity(edges.len());

        for (index, &(u, v, weight)) in edges.iter().enumerate() {
            for node in [u, v] {
                if node >= num_nodes {
                    return Err(QaoaError::invalid_node(node, num_nodes));
                }
            }
            if u == v {
                return Err(QaoaError::SelfLoop(u));
            }
            if edge_lookup.insert(edge_key(u, v), index).is_some() {
                return Err(QaoaError::DuplicateEdge(u, v));
            }
            adjacency[u].insert(v, index);
            adjacency[v].insert(u, index);
            stored.push(Edge::new(u, v, weight));
        }

        Ok(Self {
            num_nodes,
            edges: stored,
            adjacency,
            edge_lookup,
        })
    }

    /// Create a graph where every edge has weight 1
    pub fn unweighted(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let weighted: Vec<_> = edges.iter().map(|&(u, v)| (u, v, 1.0)).collect();
        Self::from_edges(num_nodes, &weighted)
    }

    /// Create a complete graph with n vertices
    pub fn complete(num_nodes: usize) -> Self {
        let mut edges = Vec::new();
        for i in 0..num_nodes {
            for j in (i + 1)..num_nodes {
                edges.push((i, j));
            }
        }
        Self::from_trusted(num_nodes, &edges)
    }

    /// Create a cycle graph with n vertices
    pub fn cycle(num_nodes: usize) -> Self {
        let edges: Vec<_> = if num_nodes < 3 {
            (1..num_nodes).map(|i| (i - 1, i)).collect()
        } else {
            (0..num_nodes).map(|i| (i, (i + 1) % num_nodes)).collect()
        };
        Self::from_trusted(num_nodes, &edges)
    }

    /// Create a path graph with n vertices
    pub fn path(num_nodes: usize) -> Self {
        let edges: Vec<_> = (1..num_nodes).map(|i| (i - 1, i)).collect();
        Self::from_trusted(num_nodes, &edges)
    }

    /// Create a star graph with n vertices (node 0 is the center)
    pub fn star(num_nodes: usize) -> Self {
        let edges: Vec<_> = (1..num_nodes).map(|i| (0, i)).collect();
        Self::from_trusted(num_nodes, &edges)
    }

    // Families above never produce loops, duplicates or out of range nodes.
    fn from_trusted(num_nodes: usize, edges: &[(usize, usize)]) -> Self {
        let mut adjacency = vec![BTreeMap::new(); num_nodes];
        let mut edge_lookup = HashMap::with_capacity(edges.len());
        let mut stored = Vec::with_capacity(edges.len());
        for (index, &(u, v)) in edges.iter().enumerate() {
            adjacency[u].insert(v, index);
            adjacency[v].insert(u, index);
            edge_lookup.insert(edge_key(u, v), index);
            stored.push(Edge::new(u, v, 1.0));
        }
        Self {
            num_nodes,
            edges: stored,
            adjacency,
            edge_lookup,
        }
    }

    /// Number of nodes (qubits)
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edges in insertion order
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Neighbors of a node, in increasing order
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[node].keys().copied()
    }

    /// Neighbors of a node mapped to the index of the connecting edge
    pub fn incident_edges(&self, node: usize) -> &BTreeMap<usize, usize> {
        &self.adjacency[node]
    }

    /// Degree of a node
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency.get(node).map_or(0, BTreeMap::len)
    }

    /// Index of the edge between `u` and `v`, in either orientation
    pub fn edge_index(&self, u: usize, v: usize) -> Option<usize> {
        self.edge_lookup.get(&edge_key(u, v)).copied()
    }

    /// Weight of the edge between `u` and `v`
    pub fn weight(&self, u: usize, v: usize) -> Option<f64> {
        self.edge_index(u, v).map(|i| self.edges[i].weight)
    }

    /// Sum of all edge weights (the MaxCut upper bound)
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Resolve an edge list into edge indices
    ///
    /// `None` selects every edge in order.
    pub fn edge_indices(&self, edge_list: Option<&[(usize, usize)]>) -> Result<Vec<usize>> {
        match edge_list {
            None => Ok((0..self.edges.len()).collect()),
            Some(list) => list
                .iter()
                .map(|&(u, v)| self.edge_index(u, v).ok_or(QaoaError::UnknownEdge(u, v)))
                .collect(),
        }
    }
}

impl TryFrom<GraphData> for Graph {
    type Error = QaoaError;

    fn try_from(data: GraphData) -> Result<Self> {
        let edges: Vec<_> = data.edges.iter().map(|e| (e.u, e.v, e.weight)).collect();
        Self::from_edges(data.num_nodes, &edges)
    }
}

impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        Self {
            num_nodes: graph.num_nodes,
            edges: graph.edges,
        }
    }
}
