//! PDF renderer
//!
//! Paginated text layout over the built-in Helvetica faces: heading,
//! section titles, simple fixed-layout tables with a row cap, and a page
//! footer. Layout specifics stay deliberately simple; the renderer exists
//! so every format tag in the closed set has a real implementation.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::markdown::num;
use super::{ReportData, ReportFormat, ReportRenderer};
use crate::error::{Error, Result};

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 20.0;
const LINE_HEIGHT: f64 = 6.0;

/// Edge tables are capped; the remainder collapses into one marker row.
const EDGE_ROW_CAP: usize = 40;

/// Millimeter coordinate from the f64 layout cursor
fn mm(value: f64) -> Mm {
    Mm(value as _)
}

pub(crate) struct PdfRenderer;

impl ReportRenderer for PdfRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Pdf
    }

    fn render(&self, data: &ReportData) -> Result<Vec<u8>> {
        let mut page = Page::new(&data.title)?;

        page.heading(&data.title);
        page.text(&format!(
            "{} report, generated {} UTC",
            data.report_type,
            data.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        if let Some(author) = &data.author {
            page.text(&format!("Author: {author}"));
        }
        if let Some(description) = &data.description {
            page.text(description);
        }

        if let Some(graph) = &data.graph {
            page.section("Network");
            page.text(&format!(
                "{} nodes, {} edges, source {}, sink {}",
                graph.node_count(),
                graph.edge_count(),
                graph.source_id,
                graph.sink_id
            ));
        }

        if let Some(flow) = &data.flow {
            page.section("Flow Result");
            page.text(&format!(
                "Status {:?}, max flow {}, total cost {}, {} iterations",
                flow.status,
                num(flow.max_flow),
                num(flow.total_cost),
                flow.iterations
            ));

            if data.options.include_raw_data && !flow.edge_flows.is_empty() {
                page.table_header("From      To        Flow      Capacity  Util");
                for edge in flow.edge_flows.iter().take(EDGE_ROW_CAP) {
                    page.text(&format!(
                        "{:<9} {:<9} {:<9} {:<9} {:.1}%",
                        edge.from,
                        edge.to,
                        num(edge.flow),
                        num(edge.capacity),
                        edge.utilization * 100.0
                    ));
                }
                if flow.edge_flows.len() > EDGE_ROW_CAP {
                    page.text(&format!(
                        "... {} more rows",
                        flow.edge_flows.len() - EDGE_ROW_CAP
                    ));
                }
            }
        }

        if let Some(cost) = &data.cost {
            page.section("Cost");
            page.text(&format!("Total: {} {}", num(cost.total_cost), cost.currency));
            let b = &cost.breakdown;
            page.text(&format!(
                "Transport {}, fixed {}, handling {}, discount {}, markup {}",
                num(b.transport_cost),
                num(b.fixed_cost),
                num(b.handling_cost),
                num(b.discount_amount),
                num(b.markup_amount)
            ));
        }

        if let Some(bottlenecks) = &data.bottlenecks {
            page.section("Bottlenecks");
            if bottlenecks.bottlenecks.is_empty() {
                page.text("None at the configured threshold.");
            }
            for b in &bottlenecks.bottlenecks {
                page.text(&format!(
                    "{} -> {}: {:.1}% ({:?})",
                    b.from,
                    b.to,
                    b.utilization * 100.0,
                    b.severity
                ));
            }
            if data.options.include_recommendations {
                for recommendation in &bottlenecks.recommendations {
                    page.text(&format!("* {recommendation}"));
                }
            }
        }

        if let Some(efficiency) = &data.efficiency {
            page.section("Efficiency");
            page.text(&format!(
                "Grade {}, capacity utilization {:.1}%, overall {:.3}",
                efficiency.grade,
                efficiency.capacity_utilization * 100.0,
                efficiency.overall_efficiency
            ));
        }

        if let Some(simulation) = &data.simulation {
            page.section("Simulation");
            page.text(&format!(
                "{} samples, mean {}, std dev {}",
                simulation.sample_count,
                num(simulation.mean),
                num(simulation.std_dev)
            ));
            page.text(&format!(
                "p5 {}, p50 {}, p95 {}, {:.0}% CI [{}, {}]",
                num(simulation.p5),
                num(simulation.p50),
                num(simulation.p95),
                simulation.confidence_level * 100.0,
                num(simulation.ci_lower),
                num(simulation.ci_upper)
            ));
        }

        if let Some(comparison) = &data.comparison {
            page.section("Scenario Comparison");
            page.text(&format!(
                "baseline: max flow {}, cost {}",
                num(comparison.baseline.max_flow),
                num(comparison.baseline.total_cost)
            ));
            for scenario in &comparison.scenarios {
                page.text(&format!(
                    "{}: max flow {}, cost {}, improvement {:+.1}%",
                    scenario.name,
                    num(scenario.max_flow),
                    num(scenario.total_cost),
                    scenario.improvement_vs_baseline * 100.0
                ));
            }
        }

        if let Some(history) = &data.history {
            page.section("Stored Reports");
            for entry in history.iter().take(EDGE_ROW_CAP) {
                page.text(&format!(
                    "{} [{} / {}] {} B, {}",
                    entry.title,
                    entry.report_type,
                    entry.format,
                    entry.size_bytes,
                    entry.created_at.format("%Y-%m-%d %H:%M")
                ));
            }
            if history.len() > EDGE_ROW_CAP {
                page.text(&format!("... {} more rows", history.len() - EDGE_ROW_CAP));
            }
        }

        page.finish()
    }
}

/// Cursor-based page writer over the printpdf document
struct Page {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    y: f64,
    page_number: usize,
}

impl Page {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            mm(PAGE_WIDTH),
            mm(PAGE_HEIGHT),
            "content",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| Error::render(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| Error::render(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            font,
            font_bold,
            y: PAGE_HEIGHT - MARGIN,
            page_number: 1,
        })
    }

    fn heading(&mut self, text: &str) {
        self.ensure_room(2.0 * LINE_HEIGHT);
        self.layer
            .use_text(text, 18.0, mm(MARGIN), mm(self.y), &self.font_bold);
        self.y -= 2.0 * LINE_HEIGHT;
    }

    fn section(&mut self, text: &str) {
        self.ensure_room(2.0 * LINE_HEIGHT);
        self.y -= LINE_HEIGHT / 2.0;
        self.layer
            .use_text(text, 13.0, mm(MARGIN), mm(self.y), &self.font_bold);
        self.y -= 1.5 * LINE_HEIGHT;
    }

    fn table_header(&mut self, text: &str) {
        self.ensure_room(LINE_HEIGHT);
        self.layer
            .use_text(text, 10.0, mm(MARGIN), mm(self.y), &self.font_bold);
        self.y -= LINE_HEIGHT;
    }

    fn text(&mut self, text: &str) {
        self.ensure_room(LINE_HEIGHT);
        self.layer
            .use_text(text, 10.0, mm(MARGIN), mm(self.y), &self.font);
        self.y -= LINE_HEIGHT;
    }

    fn ensure_room(&mut self, needed: f64) {
        if self.y - needed > MARGIN {
            return;
        }
        self.footer();
        let (page, layer) = self
            .doc
            .add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_number += 1;
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn footer(&mut self) {
        self.layer.use_text(
            format!("Page {}", self.page_number),
            9.0,
            mm(MARGIN),
            mm(MARGIN / 2.0),
            &self.font,
        );
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        self.footer();
        self.doc
            .save_to_bytes()
            .map_err(|e| Error::render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::full_report;
    use super::super::{render, ReportFormat};

    #[test]
    fn test_produces_pdf_magic() {
        let bytes = render(&full_report(), ReportFormat::Pdf).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
    }

    #[test]
    fn test_row_cap_marker() {
        let mut data = full_report();
        let flow = data.flow.as_mut().unwrap();
        let template = flow.edge_flows[0].clone();
        for _ in 0..100 {
            flow.edge_flows.push(template.clone());
        }
        let bytes = render(&data, ReportFormat::Pdf).unwrap();
        assert!(!bytes.is_empty());
    }
}
