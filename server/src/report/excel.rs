//! Excel renderer
//!
//! Multi-sheet workbook: an overview sheet plus one sheet per present
//! payload, headers in bold.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::markdown::{num, sorted_f64};
use super::{ReportData, ReportFormat, ReportRenderer};
use crate::error::{Error, Result};

pub(crate) struct ExcelRenderer;

impl ReportRenderer for ExcelRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Excel
    }

    fn render(&self, data: &ReportData) -> Result<Vec<u8>> {
        build(data).map_err(|e| Error::render(e.to_string()))
    }
}

fn build(data: &ReportData) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    overview_sheet(workbook.add_worksheet(), data, &bold)?;

    if let Some(graph) = &data.graph {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Nodes")?;
        write_header(sheet, &["Id", "Kind", "Supply"], &bold)?;
        for (i, node) in graph.nodes.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_number(row, 0, node.id as f64)?;
            sheet.write_string(
                row,
                1,
                node.kind.map(|k| k.as_str()).unwrap_or("untyped"),
            )?;
            if let Some(supply) = node.supply {
                sheet.write_number(row, 2, supply)?;
            }
        }

        if data.options.include_raw_data {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Edges")?;
            write_header(
                sheet,
                &["From", "To", "Capacity", "Cost", "Flow", "Utilization"],
                &bold,
            )?;
            for (i, edge) in graph.edges.iter().enumerate() {
                let row = (i + 1) as u32;
                sheet.write_number(row, 0, edge.from as f64)?;
                sheet.write_number(row, 1, edge.to as f64)?;
                sheet.write_number(row, 2, edge.capacity)?;
                sheet.write_number(row, 3, edge.cost)?;
                sheet.write_number(row, 4, edge.current_flow)?;
                sheet.write_number(row, 5, edge.utilization())?;
            }
        }
    }

    if let Some(cost) = &data.cost {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Cost")?;
        write_header(sheet, &["Component", "Amount"], &bold)?;
        let b = &cost.breakdown;
        let rows = [
            ("Transport", b.transport_cost),
            ("Road base", b.road_base_cost),
            ("Fixed", b.fixed_cost),
            ("Handling", b.handling_cost),
            ("Discount", -b.discount_amount),
            ("Markup", b.markup_amount),
            ("Total", cost.total_cost),
        ];
        for (i, (label, amount)) in rows.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, *label)?;
            sheet.write_number(row, 1, *amount)?;
        }
        let mut row = rows.len() as u32 + 2;
        for (road, amount) in sorted_f64(&b.cost_by_road_type) {
            sheet.write_string(row, 0, road)?;
            sheet.write_number(row, 1, amount)?;
            row += 1;
        }
    }

    if let Some(bottlenecks) = &data.bottlenecks {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Bottlenecks")?;
        write_header(
            sheet,
            &["From", "To", "Utilization", "Severity", "Impact"],
            &bold,
        )?;
        for (i, b) in bottlenecks.bottlenecks.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_number(row, 0, b.from as f64)?;
            sheet.write_number(row, 1, b.to as f64)?;
            sheet.write_number(row, 2, b.utilization)?;
            sheet.write_string(row, 3, format!("{:?}", b.severity))?;
            sheet.write_number(row, 4, b.impact_score)?;
        }
    }

    if let Some(simulation) = &data.simulation {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Simulation")?;
        write_header(sheet, &["Statistic", "Value"], &bold)?;
        let rows = [
            ("Samples", simulation.sample_count as f64),
            ("Mean", simulation.mean),
            ("Std dev", simulation.std_dev),
            ("Min", simulation.min),
            ("Max", simulation.max),
            ("p5", simulation.p5),
            ("p50", simulation.p50),
            ("p95", simulation.p95),
            ("CI lower", simulation.ci_lower),
            ("CI upper", simulation.ci_upper),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, *label)?;
            sheet.write_number(row, 1, *value)?;
        }
    }

    if let Some(comparison) = &data.comparison {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Comparison")?;
        write_header(
            sheet,
            &["Scenario", "Max Flow", "Cost", "Efficiency", "Improvement"],
            &bold,
        )?;
        sheet.write_string(1, 0, &comparison.baseline.name)?;
        sheet.write_number(1, 1, comparison.baseline.max_flow)?;
        sheet.write_number(1, 2, comparison.baseline.total_cost)?;
        sheet.write_number(1, 3, comparison.baseline.efficiency)?;
        for (i, scenario) in comparison.scenarios.iter().enumerate() {
            let row = (i + 2) as u32;
            sheet.write_string(row, 0, &scenario.name)?;
            sheet.write_number(row, 1, scenario.max_flow)?;
            sheet.write_number(row, 2, scenario.total_cost)?;
            sheet.write_number(row, 3, scenario.efficiency)?;
            sheet.write_number(row, 4, scenario.improvement_vs_baseline)?;
        }
    }

    if let Some(history) = &data.history {
        let sheet = workbook.add_worksheet();
        sheet.set_name("History")?;
        write_header(
            sheet,
            &["Id", "Title", "Type", "Format", "Size", "Created"],
            &bold,
        )?;
        for (i, entry) in history.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, entry.id.to_string())?;
            sheet.write_string(row, 1, &entry.title)?;
            sheet.write_string(row, 2, entry.report_type.as_str())?;
            sheet.write_string(row, 3, entry.format.as_str())?;
            sheet.write_number(row, 4, entry.size_bytes as f64)?;
            sheet.write_string(
                row,
                5,
                entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            )?;
        }
    }

    workbook.save_to_buffer()
}

fn overview_sheet(
    sheet: &mut Worksheet,
    data: &ReportData,
    bold: &Format,
) -> std::result::Result<(), XlsxError> {
    sheet.set_name("Overview")?;
    sheet.write_string_with_format(0, 0, &data.title, bold)?;
    sheet.write_string(1, 0, "Type")?;
    sheet.write_string(1, 1, data.report_type.as_str())?;
    sheet.write_string(2, 0, "Generated")?;
    sheet.write_string(
        2,
        1,
        data.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    )?;
    let mut row = 3;
    if let Some(author) = &data.author {
        sheet.write_string(row, 0, "Author")?;
        sheet.write_string(row, 1, author)?;
        row += 1;
    }
    if let Some(flow) = &data.flow {
        sheet.write_string(row, 0, "Max flow")?;
        sheet.write_string(row, 1, num(flow.max_flow))?;
        row += 1;
        sheet.write_string(row, 0, "Total cost")?;
        sheet.write_string(row, 1, num(flow.total_cost))?;
        row += 1;
    }
    if let Some(efficiency) = &data.efficiency {
        sheet.write_string(row, 0, "Grade")?;
        sheet.write_string(row, 1, efficiency.grade.to_string())?;
    }
    Ok(())
}

fn write_header(
    sheet: &mut Worksheet,
    labels: &[&str],
    bold: &Format,
) -> std::result::Result<(), XlsxError> {
    for (col, label) in labels.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *label, bold)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::full_report;
    use super::super::{render, ReportFormat};

    #[test]
    fn test_produces_xlsx_container() {
        let bytes = render(&full_report(), ReportFormat::Excel).unwrap();
        // XLSX is a ZIP container.
        assert_eq!(&bytes[..2], b"PK");
    }
}
