//! HTML renderer
//!
//! A self-contained page mirroring the Markdown sections, with everything
//! user-controlled escaped.

use super::markdown::{num, sorted_f64};
use super::{ReportData, ReportFormat, ReportRenderer};
use crate::error::Result;

pub(crate) struct HtmlRenderer;

impl ReportRenderer for HtmlRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }

    fn render(&self, data: &ReportData) -> Result<Vec<u8>> {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str(&format!("<html lang=\"{}\">\n<head>\n", escape(&data.language)));
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape(&data.title)));
        out.push_str(
            "<style>body{font-family:sans-serif;margin:2em}table{border-collapse:collapse}\
             td,th{border:1px solid #ccc;padding:4px 8px}th{background:#f0f0f0}</style>\n",
        );
        out.push_str("</head>\n<body>\n");

        out.push_str(&format!("<h1>{}</h1>\n", escape(&data.title)));
        out.push_str(&format!(
            "<p><em>{} report, generated {} UTC</em></p>\n",
            data.report_type,
            data.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        if let Some(author) = &data.author {
            out.push_str(&format!("<p><strong>Author:</strong> {}</p>\n", escape(author)));
        }
        if let Some(description) = &data.description {
            out.push_str(&format!("<p>{}</p>\n", escape(description)));
        }

        if let Some(graph) = &data.graph {
            out.push_str("<h2>Network</h2>\n");
            out.push_str(&format!(
                "<p>{} nodes, {} edges, source {}, sink {}, total capacity {}</p>\n",
                graph.node_count(),
                graph.edge_count(),
                graph.source_id,
                graph.sink_id,
                num(graph.total_capacity())
            ));
        }

        if let Some(flow) = &data.flow {
            out.push_str("<h2>Flow Result</h2>\n<ul>\n");
            out.push_str(&format!("<li>Status: {:?}</li>\n", flow.status));
            out.push_str(&format!("<li>Max flow: {}</li>\n", num(flow.max_flow)));
            out.push_str(&format!("<li>Total cost: {}</li>\n", num(flow.total_cost)));
            out.push_str(&format!("<li>Iterations: {}</li>\n", flow.iterations));
            out.push_str("</ul>\n");

            if data.options.include_raw_data && !flow.edge_flows.is_empty() {
                out.push_str(
                    "<table>\n<tr><th>From</th><th>To</th><th>Flow</th>\
                     <th>Capacity</th><th>Utilization</th><th>Cost</th></tr>\n",
                );
                for edge in &flow.edge_flows {
                    out.push_str(&format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td><td>{}</td></tr>\n",
                        edge.from,
                        edge.to,
                        num(edge.flow),
                        num(edge.capacity),
                        edge.utilization * 100.0,
                        num(edge.cost)
                    ));
                }
                out.push_str("</table>\n");
            }
        }

        if let Some(cost) = &data.cost {
            out.push_str("<h2>Cost</h2>\n");
            out.push_str(&format!(
                "<p><strong>Total: {} {}</strong></p>\n<ul>\n",
                num(cost.total_cost),
                escape(&cost.currency)
            ));
            let b = &cost.breakdown;
            out.push_str(&format!("<li>Transport: {}</li>\n", num(b.transport_cost)));
            out.push_str(&format!("<li>Fixed: {}</li>\n", num(b.fixed_cost)));
            out.push_str(&format!("<li>Handling: {}</li>\n", num(b.handling_cost)));
            out.push_str(&format!("<li>Discount: -{}</li>\n", num(b.discount_amount)));
            out.push_str(&format!("<li>Markup: +{}</li>\n", num(b.markup_amount)));
            out.push_str("</ul>\n");
            if !b.cost_by_road_type.is_empty() {
                out.push_str("<ul>\n");
                for (road, amount) in sorted_f64(&b.cost_by_road_type) {
                    out.push_str(&format!(
                        "<li>{}: {}</li>\n",
                        escape(road),
                        num(amount)
                    ));
                }
                out.push_str("</ul>\n");
            }
        }

        if let Some(bottlenecks) = &data.bottlenecks {
            out.push_str("<h2>Bottlenecks</h2>\n");
            if bottlenecks.bottlenecks.is_empty() {
                out.push_str("<p>None at the configured threshold.</p>\n");
            } else {
                out.push_str(
                    "<table>\n<tr><th>Edge</th><th>Utilization</th>\
                     <th>Severity</th><th>Impact</th></tr>\n",
                );
                for b in &bottlenecks.bottlenecks {
                    out.push_str(&format!(
                        "<tr><td>{} &rarr; {}</td><td>{:.1}%</td><td>{:?}</td><td>{:.3}</td></tr>\n",
                        b.from,
                        b.to,
                        b.utilization * 100.0,
                        b.severity,
                        b.impact_score
                    ));
                }
                out.push_str("</table>\n");
            }
            if data.options.include_recommendations && !bottlenecks.recommendations.is_empty() {
                out.push_str("<h3>Recommendations</h3>\n<ul>\n");
                for recommendation in &bottlenecks.recommendations {
                    out.push_str(&format!("<li>{}</li>\n", escape(recommendation)));
                }
                out.push_str("</ul>\n");
            }
        }

        if let Some(efficiency) = &data.efficiency {
            out.push_str("<h2>Efficiency</h2>\n");
            out.push_str(&format!(
                "<p><strong>Grade: {}</strong> (capacity {:.1}%, overall {:.3})</p>\n",
                efficiency.grade,
                efficiency.capacity_utilization * 100.0,
                efficiency.overall_efficiency
            ));
        }

        if let Some(simulation) = &data.simulation {
            out.push_str("<h2>Simulation</h2>\n<ul>\n");
            out.push_str(&format!("<li>Samples: {}</li>\n", simulation.sample_count));
            out.push_str(&format!(
                "<li>Mean {} (std dev {})</li>\n",
                num(simulation.mean),
                num(simulation.std_dev)
            ));
            out.push_str(&format!(
                "<li>p5 {}, p50 {}, p95 {}</li>\n",
                num(simulation.p5),
                num(simulation.p50),
                num(simulation.p95)
            ));
            out.push_str(&format!(
                "<li>{:.0}% CI [{}, {}]</li>\n",
                simulation.confidence_level * 100.0,
                num(simulation.ci_lower),
                num(simulation.ci_upper)
            ));
            out.push_str("</ul>\n");
        }

        if let Some(comparison) = &data.comparison {
            out.push_str("<h2>Scenario Comparison</h2>\n");
            out.push_str(
                "<table>\n<tr><th>Scenario</th><th>Max Flow</th><th>Cost</th>\
                 <th>Efficiency</th><th>Improvement</th></tr>\n",
            );
            let baseline = &comparison.baseline;
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.3}</td><td>-</td></tr>\n",
                escape(&baseline.name),
                num(baseline.max_flow),
                num(baseline.total_cost),
                baseline.efficiency
            ));
            for scenario in &comparison.scenarios {
                out.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.3}</td><td>{:+.1}%</td></tr>\n",
                    escape(&scenario.name),
                    num(scenario.max_flow),
                    num(scenario.total_cost),
                    scenario.efficiency,
                    scenario.improvement_vs_baseline * 100.0
                ));
            }
            out.push_str("</table>\n");
        }

        if let Some(history) = &data.history {
            out.push_str("<h2>Stored Reports</h2>\n");
            out.push_str(
                "<table>\n<tr><th>Title</th><th>Type</th><th>Format</th>\
                 <th>Size</th><th>Created</th></tr>\n",
            );
            for entry in history {
                out.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{} B</td><td>{}</td></tr>\n",
                    escape(&entry.title),
                    entry.report_type,
                    entry.format,
                    entry.size_bytes,
                    entry.created_at.format("%Y-%m-%d %H:%M:%S")
                ));
            }
            out.push_str("</table>\n");
        }

        out.push_str("</body>\n</html>\n");
        Ok(out.into_bytes())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
