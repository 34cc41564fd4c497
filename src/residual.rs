//! Paired-arc residual graph
//!
//! The solver-facing view of an input [`Graph`]. Every input edge becomes a
//! pair of arcs stored adjacently in one flat sequence: the forward arc at an
//! even index and its reverse at the next odd index, so the opposite arc of
//! `a` is always `a ^ 1`. External node ids are translated to dense indices
//! on build; the inverse mapping is kept for result emission.
//!
//! A residual graph is built at solve-start, owned exclusively by one solver
//! invocation, and dropped at solve-end.

use std::collections::HashMap;

use crate::types::{Cost, Flow, Graph, NodeId};
use crate::{Error, Result};

/// One directed arc of the residual graph
#[derive(Debug, Clone, Copy)]
pub struct Arc {
    /// Opposite endpoint as a dense node index
    pub head: u32,
    /// Remaining capacity
    pub residual: Flow,
    /// Unit cost (`+cost` on forward arcs, `-cost` on reverse arcs)
    pub cost: Cost,
    /// Index of the originating input edge
    pub edge: u32,
}

/// Residual graph over dense node indices
#[derive(Debug, Clone)]
pub struct ResidualGraph {
    /// Arcs, inserted pairwise: arc `2e` is the forward arc of input edge `e`
    arcs: Vec<Arc>,
    /// Out-arc indices per node
    out: Vec<Vec<u32>>,
    /// External id -> dense index
    index_of: HashMap<NodeId, u32>,
    /// Dense index -> external id
    id_of: Vec<NodeId>,
    source: u32,
    sink: u32,
}

impl ResidualGraph {
    /// Build the residual graph for a solve starting from zero flow
    ///
    /// Parallel input edges yield distinct arc pairs; self-loops get their
    /// pair too but can never lie on a source-to-sink path.
    pub fn build(graph: &Graph) -> Result<Self> {
        let mut index_of = HashMap::with_capacity(graph.nodes.len());
        let mut id_of = Vec::with_capacity(graph.nodes.len());

        for node in &graph.nodes {
            if index_of.insert(node.id, id_of.len() as u32).is_some() {
                return Err(Error::invalid_graph(format!(
                    "duplicate node id {}",
                    node.id
                )));
            }
            id_of.push(node.id);
        }

        let source = *index_of
            .get(&graph.source_id)
            .ok_or_else(|| Error::invalid_graph(format!("unknown source {}", graph.source_id)))?;
        let sink = *index_of
            .get(&graph.sink_id)
            .ok_or_else(|| Error::invalid_graph(format!("unknown sink {}", graph.sink_id)))?;

        let mut out = vec![Vec::new(); id_of.len()];
        let mut arcs = Vec::with_capacity(graph.edges.len() * 2);

        for (e, edge) in graph.edges.iter().enumerate() {
            let u = *index_of.get(&edge.from).ok_or_else(|| {
                Error::invalid_graph(format!("edge {e} references unknown node {}", edge.from))
            })?;
            let v = *index_of.get(&edge.to).ok_or_else(|| {
                Error::invalid_graph(format!("edge {e} references unknown node {}", edge.to))
            })?;

            let forward = arcs.len() as u32;
            arcs.push(Arc {
                head: v,
                residual: edge.capacity,
                cost: edge.cost,
                edge: e as u32,
            });
            arcs.push(Arc {
                head: u,
                residual: 0.0,
                cost: -edge.cost,
                edge: e as u32,
            });
            out[u as usize].push(forward);
            out[v as usize].push(forward ^ 1);
        }

        Ok(Self {
            arcs,
            out,
            index_of,
            id_of,
            source,
            sink,
        })
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.id_of.len()
    }

    /// Number of arcs (twice the number of input edges)
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Number of input edges
    pub fn edge_count(&self) -> usize {
        self.arcs.len() / 2
    }

    /// Dense index of the source
    pub fn source(&self) -> u32 {
        self.source
    }

    /// Dense index of the sink
    pub fn sink(&self) -> u32 {
        self.sink
    }

    /// Out-arc indices of a node, in input order
    pub fn out_arcs(&self, node: u32) -> &[u32] {
        &self.out[node as usize]
    }

    /// The arc at the given index
    pub fn arc(&self, arc: u32) -> &Arc {
        &self.arcs[arc as usize]
    }

    /// Remaining capacity of an arc
    pub fn residual(&self, arc: u32) -> Flow {
        self.arcs[arc as usize].residual
    }

    /// Index of the paired arc
    pub fn paired(arc: u32) -> u32 {
        arc ^ 1
    }

    /// Whether an arc is the forward half of its pair
    pub fn is_forward(arc: u32) -> bool {
        arc % 2 == 0
    }

    /// Push `delta` units along an arc, crediting the paired arc
    pub fn push(&mut self, arc: u32, delta: Flow) {
        self.arcs[arc as usize].residual -= delta;
        self.arcs[(arc ^ 1) as usize].residual += delta;
    }

    /// Flow currently assigned to an input edge
    ///
    /// Solves start from zero flow, so the pushed amount is exactly the
    /// residual accumulated on the reverse arc.
    pub fn edge_flow(&self, edge: usize) -> Flow {
        self.arcs[edge * 2 + 1].residual
    }

    /// Reset every pair back to the zero-flow state
    pub fn reset(&mut self) {
        for e in 0..self.edge_count() {
            let fwd = e * 2;
            self.arcs[fwd].residual += self.arcs[fwd + 1].residual;
            self.arcs[fwd + 1].residual = 0.0;
        }
    }

    /// External id of a dense node index
    pub fn node_id(&self, node: u32) -> NodeId {
        self.id_of[node as usize]
    }

    /// Dense index of an external node id
    pub fn node_index(&self, id: NodeId) -> Option<u32> {
        self.index_of.get(&id).copied()
    }
}
