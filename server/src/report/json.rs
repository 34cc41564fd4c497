//! JSON renderer
//!
//! The report data itself, pretty-printed. Serialization goes through
//! `serde_json::Value` so that map-backed fields come out key-sorted and the
//! bytes are deterministic for identical inputs.

use super::{ReportData, ReportFormat, ReportRenderer};
use crate::error::Result;

pub(crate) struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }

    fn render(&self, data: &ReportData) -> Result<Vec<u8>> {
        let value = serde_json::to_value(data)?;
        let mut bytes = serde_json::to_vec_pretty(&value)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::full_report;
    use super::super::{render, ReportData, ReportFormat};

    #[test]
    fn test_round_trips() {
        let data = full_report();
        let bytes = render(&data, ReportFormat::Json).unwrap();
        let back: ReportData = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_deterministic_across_rebuilt_inputs() {
        // Two separately built (but equal) inputs must serialize identically,
        // map ordering included.
        let first = render(&full_report(), ReportFormat::Json).unwrap();
        let second = render(&full_report(), ReportFormat::Json).unwrap();
        assert_eq!(first, second);
    }
}
