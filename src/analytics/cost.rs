//! Cost decomposition
//!
//! Total cost starts from per-edge transport (`flow * cost`, scaled by an
//! optional per-road-type multiplier), adds a fixed cost per active edge and
//! a handling cost per unit passing through warehouse and delivery-point
//! nodes, then applies the discount followed by the markup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Flow, Graph, NodeKind};

/// Tunable cost model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostOptions {
    /// Currency tag echoed into the report
    pub currency: String,
    /// Multiplier applied to the transport cost of edges with a matching
    /// road type; unlisted road types use 1.0
    pub road_type_multipliers: HashMap<String, f64>,
    /// Flat cost charged for every edge that carries flow
    pub fixed_cost_per_active_edge: f64,
    /// Cost per unit of flow arriving at a warehouse or delivery point
    pub handling_cost_per_unit: f64,
    /// Final discount, in percent, applied before the markup
    pub discount_percent: f64,
    /// Final markup, in percent, applied after the discount
    pub markup_percent: f64,
}

impl Default for CostOptions {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            road_type_multipliers: HashMap::new(),
            fixed_cost_per_active_edge: 0.0,
            handling_cost_per_unit: 0.0,
            discount_percent: 0.0,
            markup_percent: 0.0,
        }
    }
}

/// Cost totals with their decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    /// Final cost after discount and markup
    pub total_cost: f64,
    /// Currency tag from the options
    pub currency: String,
    /// How the total came together
    pub breakdown: CostBreakdown,
}

/// The individual contributions to the total cost
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Transport cost after road-type multipliers
    pub transport_cost: f64,
    /// Transport cost before multipliers
    pub road_base_cost: f64,
    /// Fixed contribution of active edges
    pub fixed_cost: f64,
    /// Handling contribution at warehouse/delivery nodes
    pub handling_cost: f64,
    /// Amount removed by the discount
    pub discount_amount: f64,
    /// Amount added by the markup
    pub markup_amount: f64,
    /// Transport cost partitioned by road type
    pub cost_by_road_type: HashMap<String, f64>,
    /// Handling cost partitioned by node kind
    pub cost_by_node_type: HashMap<String, f64>,
    /// Edges with positive flow
    pub active_edges: usize,
    /// Net flow delivered to the sink
    pub total_flow: Flow,
}

/// Decompose the cost of the flow assignment carried by `graph`
pub fn calculate_cost(graph: &Graph, options: &CostOptions) -> CostReport {
    let mut breakdown = CostBreakdown::default();

    for edge in &graph.edges {
        let flow = edge.current_flow;
        if flow <= 0.0 {
            continue;
        }
        breakdown.active_edges += 1;

        let base = flow * edge.cost;
        let road_key = edge.road_type.clone().unwrap_or_else(|| "untyped".into());
        let multiplier = options
            .road_type_multipliers
            .get(&road_key)
            .copied()
            .unwrap_or(1.0);
        let transport = base * multiplier;

        breakdown.road_base_cost += base;
        breakdown.transport_cost += transport;
        *breakdown.cost_by_road_type.entry(road_key).or_insert(0.0) += transport;

        if edge.to == graph.sink_id {
            breakdown.total_flow += flow;
        }
        if edge.from == graph.sink_id {
            breakdown.total_flow -= flow;
        }
    }

    breakdown.fixed_cost = options.fixed_cost_per_active_edge * breakdown.active_edges as f64;

    if options.handling_cost_per_unit > 0.0 {
        for node in &graph.nodes {
            let kind = match node.kind {
                Some(k @ (NodeKind::Warehouse | NodeKind::DeliveryPoint)) => k,
                _ => continue,
            };
            let inflow: Flow = graph
                .edges
                .iter()
                .filter(|e| e.to == node.id && !e.is_self_loop())
                .map(|e| e.current_flow)
                .sum();
            if inflow > 0.0 {
                let handling = inflow * options.handling_cost_per_unit;
                breakdown.handling_cost += handling;
                *breakdown
                    .cost_by_node_type
                    .entry(kind.as_str().to_string())
                    .or_insert(0.0) += handling;
            }
        }
    }

    let subtotal = breakdown.transport_cost + breakdown.fixed_cost + breakdown.handling_cost;
    breakdown.discount_amount = subtotal * options.discount_percent / 100.0;
    let discounted = subtotal - breakdown.discount_amount;
    breakdown.markup_amount = discounted * options.markup_percent / 100.0;
    let total_cost = discounted + breakdown.markup_amount;

    CostReport {
        total_cost,
        currency: options.currency.clone(),
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, Node};

    fn flowing_graph() -> Graph {
        let mut graph = Graph::new(1, 3);
        graph
            .add_node(Node::new(1))
            .add_node(Node::new(2).with_kind(NodeKind::Warehouse))
            .add_node(Node::new(3));
        graph
            .add_edge(
                Edge::new(1, 2, 10.0, 2.0)
                    .with_road_type("highway")
                    .with_flow(5.0),
            )
            .add_edge(Edge::new(2, 3, 10.0, 4.0).with_flow(5.0));
        graph
    }

    #[test]
    fn test_plain_transport_cost() {
        let report = calculate_cost(&flowing_graph(), &CostOptions::default());
        // 5 * 2 + 5 * 4
        assert_eq!(report.total_cost, 30.0);
        assert_eq!(report.breakdown.transport_cost, 30.0);
        assert_eq!(report.breakdown.active_edges, 2);
        assert_eq!(report.breakdown.total_flow, 5.0);
        assert_eq!(report.currency, "USD");
    }

    #[test]
    fn test_road_type_multiplier() {
        let mut options = CostOptions::default();
        options
            .road_type_multipliers
            .insert("highway".to_string(), 2.0);

        let report = calculate_cost(&flowing_graph(), &options);
        // Highway leg doubles: 5*2*2 + 5*4 = 40; base stays 30.
        assert_eq!(report.breakdown.transport_cost, 40.0);
        assert_eq!(report.breakdown.road_base_cost, 30.0);
        assert_eq!(report.breakdown.cost_by_road_type["highway"], 20.0);
        assert_eq!(report.breakdown.cost_by_road_type["untyped"], 20.0);
    }

    #[test]
    fn test_fixed_and_handling_costs() {
        let options = CostOptions {
            fixed_cost_per_active_edge: 10.0,
            handling_cost_per_unit: 1.0,
            ..Default::default()
        };

        let report = calculate_cost(&flowing_graph(), &options);
        assert_eq!(report.breakdown.fixed_cost, 20.0);
        // 5 units arrive at the warehouse.
        assert_eq!(report.breakdown.handling_cost, 5.0);
        assert_eq!(report.breakdown.cost_by_node_type["warehouse"], 5.0);
        assert_eq!(report.total_cost, 30.0 + 20.0 + 5.0);
    }

    #[test]
    fn test_discount_then_markup() {
        let options = CostOptions {
            discount_percent: 10.0,
            markup_percent: 50.0,
            ..Default::default()
        };

        let report = calculate_cost(&flowing_graph(), &options);
        // 30 -> 27 after discount -> 40.5 after markup.
        assert_eq!(report.breakdown.discount_amount, 3.0);
        assert_eq!(report.breakdown.markup_amount, 13.5);
        assert_eq!(report.total_cost, 40.5);
    }
}
