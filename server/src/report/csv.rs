//! CSV renderer
//!
//! Flat `section,key,value` rows for the scalar payloads plus one table
//! block per list payload. Deterministic for identical inputs.

use super::markdown::{num, sorted_f64};
use super::{ReportData, ReportFormat, ReportRenderer};
use crate::error::Result;

pub(crate) struct CsvRenderer;

impl ReportRenderer for CsvRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }

    fn render(&self, data: &ReportData) -> Result<Vec<u8>> {
        let mut out = String::new();

        out.push_str("section,key,value\n");
        row(&mut out, "report", "title", &data.title);
        row(&mut out, "report", "type", data.report_type.as_str());
        row(
            &mut out,
            "report",
            "generated_at",
            &data.generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        );
        if let Some(author) = &data.author {
            row(&mut out, "report", "author", author);
        }

        if let Some(graph) = &data.graph {
            row(&mut out, "network", "nodes", &graph.node_count().to_string());
            row(&mut out, "network", "edges", &graph.edge_count().to_string());
            row(&mut out, "network", "source", &graph.source_id.to_string());
            row(&mut out, "network", "sink", &graph.sink_id.to_string());
        }

        if let Some(flow) = &data.flow {
            row(&mut out, "flow", "status", &format!("{:?}", flow.status));
            row(&mut out, "flow", "max_flow", &num(flow.max_flow));
            row(&mut out, "flow", "total_cost", &num(flow.total_cost));
            row(&mut out, "flow", "iterations", &flow.iterations.to_string());
        }

        if let Some(cost) = &data.cost {
            row(&mut out, "cost", "total", &num(cost.total_cost));
            row(&mut out, "cost", "currency", &cost.currency);
            row(
                &mut out,
                "cost",
                "transport",
                &num(cost.breakdown.transport_cost),
            );
            row(&mut out, "cost", "fixed", &num(cost.breakdown.fixed_cost));
            row(
                &mut out,
                "cost",
                "handling",
                &num(cost.breakdown.handling_cost),
            );
            for (road, amount) in sorted_f64(&cost.breakdown.cost_by_road_type) {
                row(&mut out, "cost_by_road_type", road, &num(amount));
            }
        }

        if let Some(efficiency) = &data.efficiency {
            row(&mut out, "efficiency", "grade", &efficiency.grade.to_string());
            row(
                &mut out,
                "efficiency",
                "capacity_utilization",
                &format!("{:.6}", efficiency.capacity_utilization),
            );
            row(
                &mut out,
                "efficiency",
                "overall",
                &format!("{:.6}", efficiency.overall_efficiency),
            );
        }

        if let Some(simulation) = &data.simulation {
            row(&mut out, "simulation", "samples", &simulation.sample_count.to_string());
            row(&mut out, "simulation", "mean", &num(simulation.mean));
            row(&mut out, "simulation", "std_dev", &num(simulation.std_dev));
            row(&mut out, "simulation", "p5", &num(simulation.p5));
            row(&mut out, "simulation", "p50", &num(simulation.p50));
            row(&mut out, "simulation", "p95", &num(simulation.p95));
        }

        if let Some(comparison) = &data.comparison {
            out.push('\n');
            out.push_str("scenario,max_flow,total_cost,efficiency,improvement\n");
            let baseline = &comparison.baseline;
            out.push_str(&format!(
                "{},{},{},{:.6},\n",
                escape(&baseline.name),
                num(baseline.max_flow),
                num(baseline.total_cost),
                baseline.efficiency
            ));
            for scenario in &comparison.scenarios {
                out.push_str(&format!(
                    "{},{},{},{:.6},{:.6}\n",
                    escape(&scenario.name),
                    num(scenario.max_flow),
                    num(scenario.total_cost),
                    scenario.efficiency,
                    scenario.improvement_vs_baseline
                ));
            }
        }

        if data.options.include_raw_data {
            if let Some(flow) = &data.flow {
                out.push('\n');
                out.push_str("from,to,flow,capacity,utilization,cost\n");
                for edge in &flow.edge_flows {
                    out.push_str(&format!(
                        "{},{},{},{},{:.6},{}\n",
                        edge.from,
                        edge.to,
                        num(edge.flow),
                        num(edge.capacity),
                        edge.utilization,
                        num(edge.cost)
                    ));
                }
            }
        }

        if let Some(history) = &data.history {
            out.push('\n');
            out.push_str("id,title,type,format,size_bytes,created_at\n");
            for entry in history {
                out.push_str(&format!(
                    "{},{},{},{},{},{}\n",
                    entry.id,
                    escape(&entry.title),
                    entry.report_type,
                    entry.format,
                    entry.size_bytes,
                    entry.created_at.format("%Y-%m-%dT%H:%M:%SZ")
                ));
            }
        }

        Ok(out.into_bytes())
    }
}

fn row(out: &mut String, section: &str, key: &str, value: &str) {
    out.push_str(&format!("{},{},{}\n", escape(section), escape(key), escape(value)));
}

/// Quote a field when it holds a comma, quote, or newline
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::full_report;
    use super::super::{render, ReportFormat};

    #[test]
    fn test_sections_present() {
        let text = String::from_utf8(render(&full_report(), ReportFormat::Csv).unwrap()).unwrap();
        assert!(text.starts_with("section,key,value\n"));
        assert!(text.contains("report,title,Network Study\n"));
        assert!(text.contains("flow,max_flow,18\n"));
        assert!(text.contains("from,to,flow,capacity,utilization,cost\n"));
    }

    #[test]
    fn test_escaping() {
        assert_eq!(super::escape("plain"), "plain");
        assert_eq!(super::escape("a,b"), "\"a,b\"");
        assert_eq!(super::escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
