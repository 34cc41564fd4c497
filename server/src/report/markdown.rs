//! Markdown renderer
//!
//! Sectioned output driven by which payloads are present; byte-identical
//! for identical inputs (map-backed sections are emitted in key order).

use super::{ReportData, ReportFormat, ReportRenderer};
use crate::error::Result;

pub(crate) struct MarkdownRenderer;

impl ReportRenderer for MarkdownRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }

    fn render(&self, data: &ReportData) -> Result<Vec<u8>> {
        let mut out = String::new();

        out.push_str(&format!("# {}\n\n", data.title));
        out.push_str(&format!(
            "_{} report, generated {} UTC_\n\n",
            data.report_type,
            data.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        if let Some(author) = &data.author {
            out.push_str(&format!("**Author:** {author}\n\n"));
        }
        if let Some(description) = &data.description {
            out.push_str(&format!("{description}\n\n"));
        }
        for (key, value) in sorted(&data.custom_fields) {
            out.push_str(&format!("- **{key}:** {value}\n"));
        }
        if !data.custom_fields.is_empty() {
            out.push('\n');
        }

        if let Some(graph) = &data.graph {
            out.push_str("## Network\n\n");
            out.push_str(&format!(
                "{} nodes, {} edges, source {}, sink {}, total capacity {}\n\n",
                graph.node_count(),
                graph.edge_count(),
                graph.source_id,
                graph.sink_id,
                num(graph.total_capacity())
            ));
        }

        if let Some(flow) = &data.flow {
            out.push_str("## Flow Result\n\n");
            out.push_str(&format!("- **Status:** {:?}\n", flow.status));
            out.push_str(&format!("- **Max flow:** {}\n", num(flow.max_flow)));
            out.push_str(&format!("- **Total cost:** {}\n", num(flow.total_cost)));
            out.push_str(&format!("- **Iterations:** {}\n", flow.iterations));
            out.push_str(&format!(
                "- **Solve time:** {:.6} s\n\n",
                flow.solve_time_seconds
            ));

            if data.options.include_raw_data && !flow.edge_flows.is_empty() {
                out.push_str("| From | To | Flow | Capacity | Utilization | Cost |\n");
                out.push_str("|------|----|------|----------|-------------|------|\n");
                for edge in &flow.edge_flows {
                    out.push_str(&format!(
                        "| {} | {} | {} | {} | {:.1}% | {} |\n",
                        edge.from,
                        edge.to,
                        num(edge.flow),
                        num(edge.capacity),
                        edge.utilization * 100.0,
                        num(edge.cost)
                    ));
                }
                out.push('\n');
            }

            if !flow.paths.is_empty() {
                out.push_str("### Augmenting Paths\n\n");
                for path in &flow.paths {
                    let nodes: Vec<String> = path.nodes.iter().map(|n| n.to_string()).collect();
                    out.push_str(&format!(
                        "- {} ({} units)\n",
                        nodes.join(" -> "),
                        num(path.amount)
                    ));
                }
                out.push('\n');
            }
        }

        if let Some(cost) = &data.cost {
            out.push_str("## Cost\n\n");
            out.push_str(&format!(
                "**Total: {} {}**\n\n",
                num(cost.total_cost),
                cost.currency
            ));
            let b = &cost.breakdown;
            out.push_str(&format!("- Transport: {}\n", num(b.transport_cost)));
            out.push_str(&format!("- Road base: {}\n", num(b.road_base_cost)));
            out.push_str(&format!("- Fixed: {}\n", num(b.fixed_cost)));
            out.push_str(&format!("- Handling: {}\n", num(b.handling_cost)));
            out.push_str(&format!("- Discount: -{}\n", num(b.discount_amount)));
            out.push_str(&format!("- Markup: +{}\n", num(b.markup_amount)));
            out.push_str(&format!("- Active edges: {}\n", b.active_edges));
            out.push_str(&format!("- Total flow: {}\n\n", num(b.total_flow)));
            if !b.cost_by_road_type.is_empty() {
                out.push_str("By road type:\n\n");
                for (road, amount) in sorted_f64(&b.cost_by_road_type) {
                    out.push_str(&format!("- {road}: {}\n", num(amount)));
                }
                out.push('\n');
            }
            if !b.cost_by_node_type.is_empty() {
                out.push_str("Handling by node type:\n\n");
                for (kind, amount) in sorted_f64(&b.cost_by_node_type) {
                    out.push_str(&format!("- {kind}: {}\n", num(amount)));
                }
                out.push('\n');
            }
        }

        if let Some(bottlenecks) = &data.bottlenecks {
            out.push_str("## Bottlenecks\n\n");
            if bottlenecks.bottlenecks.is_empty() {
                out.push_str(&format!(
                    "No edges at or above {:.0}% utilization.\n\n",
                    bottlenecks.threshold * 100.0
                ));
            } else {
                out.push_str("| Edge | Utilization | Severity | Impact |\n");
                out.push_str("|------|-------------|----------|--------|\n");
                for b in &bottlenecks.bottlenecks {
                    out.push_str(&format!(
                        "| {} -> {} | {:.1}% | {:?} | {:.3} |\n",
                        b.from,
                        b.to,
                        b.utilization * 100.0,
                        b.severity,
                        b.impact_score
                    ));
                }
                out.push('\n');
            }
            if data.options.include_recommendations && !bottlenecks.recommendations.is_empty() {
                out.push_str("### Recommendations\n\n");
                for recommendation in &bottlenecks.recommendations {
                    out.push_str(&format!("- {recommendation}\n"));
                }
                out.push('\n');
            }
        }

        if let Some(efficiency) = &data.efficiency {
            out.push_str("## Efficiency\n\n");
            out.push_str(&format!("**Grade: {}**\n\n", efficiency.grade));
            out.push_str(&format!(
                "- Capacity utilization: {:.1}%\n",
                efficiency.capacity_utilization * 100.0
            ));
            out.push_str(&format!(
                "- Cost efficiency: {:.3}\n",
                efficiency.cost_efficiency
            ));
            out.push_str(&format!(
                "- Overall: {:.3}\n\n",
                efficiency.overall_efficiency
            ));
        }

        if let Some(simulation) = &data.simulation {
            out.push_str("## Simulation\n\n");
            out.push_str(&format!("- Samples: {}\n", simulation.sample_count));
            out.push_str(&format!("- Mean: {}\n", num(simulation.mean)));
            out.push_str(&format!("- Std dev: {}\n", num(simulation.std_dev)));
            out.push_str(&format!(
                "- Range: {} .. {}\n",
                num(simulation.min),
                num(simulation.max)
            ));
            out.push_str(&format!(
                "- Percentiles: p5 {}, p50 {}, p95 {}\n",
                num(simulation.p5),
                num(simulation.p50),
                num(simulation.p95)
            ));
            out.push_str(&format!(
                "- {:.0}% CI: [{}, {}]\n\n",
                simulation.confidence_level * 100.0,
                num(simulation.ci_lower),
                num(simulation.ci_upper)
            ));
        }

        if let Some(comparison) = &data.comparison {
            out.push_str("## Scenario Comparison\n\n");
            out.push_str("| Scenario | Max Flow | Cost | Efficiency | Improvement |\n");
            out.push_str("|----------|----------|------|------------|-------------|\n");
            let baseline = &comparison.baseline;
            out.push_str(&format!(
                "| {} | {} | {} | {:.3} | - |\n",
                baseline.name,
                num(baseline.max_flow),
                num(baseline.total_cost),
                baseline.efficiency
            ));
            for scenario in &comparison.scenarios {
                out.push_str(&format!(
                    "| {} | {} | {} | {:.3} | {:+.1}% |\n",
                    scenario.name,
                    num(scenario.max_flow),
                    num(scenario.total_cost),
                    scenario.efficiency,
                    scenario.improvement_vs_baseline * 100.0
                ));
            }
            out.push('\n');
            if comparison.best_scenario.is_empty() {
                out.push_str("No scenario improves on the baseline.\n\n");
            } else {
                out.push_str(&format!("**Best scenario: {}**\n\n", comparison.best_scenario));
            }
        }

        if let Some(history) = &data.history {
            out.push_str("## Stored Reports\n\n");
            out.push_str("| Title | Type | Format | Size | Created |\n");
            out.push_str("|-------|------|--------|------|--------|\n");
            for entry in history {
                out.push_str(&format!(
                    "| {} | {} | {} | {} B | {} |\n",
                    entry.title,
                    entry.report_type,
                    entry.format,
                    entry.size_bytes,
                    entry.created_at.format("%Y-%m-%d %H:%M:%S")
                ));
            }
            out.push('\n');
        }

        Ok(out.into_bytes())
    }
}

/// Compact float formatting: integers without the fraction, everything else
/// with three decimals
pub(crate) fn num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.3}")
    }
}

/// Deterministic iteration over a string map
pub(crate) fn sorted(map: &std::collections::HashMap<String, String>) -> Vec<(&str, &str)> {
    let mut entries: Vec<(&str, &str)> = map
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    entries.sort_by_key(|&(k, _)| k);
    entries
}

/// Deterministic iteration over a numeric map
pub(crate) fn sorted_f64(map: &std::collections::HashMap<String, f64>) -> Vec<(&str, f64)> {
    let mut entries: Vec<(&str, f64)> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by_key(|&(k, _)| k);
    entries
}

#[cfg(test)]
mod tests {
    use super::super::tests::full_report;
    use super::super::{render, ReportFormat};

    #[test]
    fn test_sections_follow_payloads() {
        let mut data = full_report();
        data.comparison = None;
        let text = String::from_utf8(render(&data, ReportFormat::Markdown).unwrap()).unwrap();

        assert!(text.starts_with("# Network Study\n"));
        assert!(text.contains("## Network"));
        assert!(text.contains("## Flow Result"));
        assert!(text.contains("## Cost"));
        assert!(text.contains("## Efficiency"));
        assert!(text.contains("## Simulation"));
        assert!(!text.contains("## Scenario Comparison"));
    }

    #[test]
    fn test_raw_data_toggle() {
        let mut data = full_report();
        data.options.include_raw_data = false;
        let text = String::from_utf8(render(&data, ReportFormat::Markdown).unwrap()).unwrap();
        assert!(!text.contains("| From | To |"));
        assert!(text.contains("**Max flow:** 18"));
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(super::num(20.0), "20");
        assert_eq!(super::num(0.5), "0.500");
        assert_eq!(super::num(-3.25), "-3.250");
    }
}
