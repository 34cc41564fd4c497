//! Successive shortest paths: minimum-cost maximum flow
//!
//! Maintains node potentials so that reduced costs
//! `cost + potential[u] - potential[v]` stay non-negative, which keeps the
//! per-iteration shortest-path search inside Dijkstra territory. Each
//! iteration augments along the cheapest residual path and folds the
//! computed distances back into the potentials. Input costs must be
//! non-negative; the dispatcher rejects anything else before this strategy
//! runs.
//!
//! Equal-cost paths resolve deterministically: the heap breaks distance ties
//! by node index and arcs are scanned in arc-index order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use super::{augment, backtrack_path, SolveRun};
use crate::residual::ResidualGraph;
use crate::Result;

pub(crate) fn run(residual: &mut ResidualGraph, run: &mut SolveRun<'_>) -> Result<()> {
    let n = residual.node_count();
    let source = residual.source();
    let sink = residual.sink();

    let mut potential = vec![0.0f64; n];
    let mut dist = vec![f64::INFINITY; n];
    let mut parent = vec![u32::MAX; n];

    loop {
        if !shortest_path(residual, run, &potential, &mut dist, &mut parent) {
            // Tripped mid-search; the flow is consistent between augmentations.
            break;
        }
        if !dist[sink as usize].is_finite() {
            break;
        }
        if !run.begin_iteration()? {
            break;
        }

        for v in 0..n {
            if dist[v].is_finite() {
                potential[v] += dist[v];
            }
        }

        let path = backtrack_path(residual, &parent, source, sink);
        augment(residual, run, &path);
    }
    Ok(())
}

/// Dijkstra over reduced costs; returns false when the run tripped
fn shortest_path(
    residual: &ResidualGraph,
    run: &mut SolveRun<'_>,
    potential: &[f64],
    dist: &mut [f64],
    parent: &mut [u32],
) -> bool {
    let source = residual.source();
    let epsilon = run.epsilon();

    dist.fill(f64::INFINITY);
    parent.fill(u32::MAX);
    dist[source as usize] = 0.0;

    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, u32)>> = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((d, u))) = heap.pop() {
        if let Some(status) = run.trip() {
            run.stop(status);
            return false;
        }
        if d.0 > dist[u as usize] {
            continue;
        }
        for &arc in residual.out_arcs(u) {
            if residual.residual(arc) <= epsilon {
                continue;
            }
            let head = residual.arc(arc).head;
            // Float error can drive a reduced cost a hair below zero.
            let reduced = (residual.arc(arc).cost + potential[u as usize]
                - potential[head as usize])
                .max(0.0);
            let next = d.0 + reduced;
            if next < dist[head as usize] {
                dist[head as usize] = next;
                parent[head as usize] = arc;
                heap.push(Reverse((OrderedFloat(next), head)));
            }
        }
    }
    true
}
