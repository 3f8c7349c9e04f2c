//! Metric extraction from the broadband stats page.
//!
//! The page lays each metric out as a labeled section: a title ("Line
//! Rate") whose enclosing block also holds an upstream and a downstream
//! value carrying the unit ("1.05 Mbps"). The page itself has no
//! up/down marker, so pairing is strictly by document order: the first
//! unit-suffixed value in a section is upstream, the second downstream.
//! Values are never reordered by magnitude - on a healthy DSL line the
//! downstream rate is the larger one, but that is the line's property,
//! not the parser's.

use scraper::{ElementRef, Html, Node};
use serde::Serialize;

use crate::error::ExtractionError;

/// Line metrics extracted from the stats page, all as floats in the
/// units shown on the page (Mbps, dBm, dB).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModemStats {
    pub up_rate: f64,
    pub down_rate: f64,
    pub up_power: f64,
    pub down_power: f64,
    pub up_attenuation: f64,
    pub down_attenuation: f64,
    pub up_noisemargin: f64,
    pub down_noisemargin: f64,
}

impl ModemStats {
    /// Render as one `key value` line per metric, in fixed key order.
    pub fn to_plain(&self) -> String {
        [
            format!("up_rate {}", self.up_rate),
            format!("down_rate {}", self.down_rate),
            format!("up_power {}", self.up_power),
            format!("down_power {}", self.down_power),
            format!("up_attenuation {}", self.up_attenuation),
            format!("down_attenuation {}", self.down_attenuation),
            format!("up_noisemargin {}", self.up_noisemargin),
            format!("down_noisemargin {}", self.down_noisemargin),
        ]
        .join("\n")
    }
}

/// Extract the four metric pairs from the raw stats page HTML.
///
/// Fails on the first section that cannot produce both values; there is
/// no partial result. Use the CLI's offline parse mode with a saved page
/// to debug extraction against a particular firmware.
pub fn parse_stats(html: &str) -> Result<ModemStats, ExtractionError> {
    let doc = Html::parse_document(html);

    let (up_rate, down_rate) = fetch_pair(&doc, "Line Rate", "Mbps")?;
    let (up_power, down_power) = fetch_pair(&doc, "Output Power", "dBm")?;
    let (up_attenuation, down_attenuation) = fetch_pair(&doc, "Line Attenuation", "dB")?;
    let (up_noisemargin, down_noisemargin) = fetch_pair(&doc, "Noise Margin", "dB")?;

    Ok(ModemStats {
        up_rate,
        down_rate,
        up_power,
        down_power,
        up_attenuation,
        down_attenuation,
        up_noisemargin,
        down_noisemargin,
    })
}

/// Find the section whose title text matches `label`, then the first two
/// `unit`-suffixed values inside it, in document order.
///
/// The section is the grandparent element of the title text node: the
/// title sits in its own label element and the values in sibling markup,
/// so the grandparent is the smallest block that contains both.
fn fetch_pair(doc: &Html, label: &str, unit: &str) -> Result<(f64, f64), ExtractionError> {
    let section = doc
        .tree
        .nodes()
        .find(|node| matches!(node.value(), Node::Text(text) if text.trim() == label))
        .and_then(|node| node.parent())
        .and_then(|parent| parent.parent())
        .and_then(ElementRef::wrap)
        .ok_or_else(|| ExtractionError::SectionNotFound(label.to_string()))?;

    let mut values = section
        .text()
        .filter(|text| text.contains(unit))
        .filter_map(|text| text.replace(unit, "").trim().parse::<f64>().ok());

    let missing = || ExtractionError::MissingValues {
        label: label.to_string(),
        unit: unit.to_string(),
    };
    let up = values.next().ok_or_else(missing)?;
    let down = values.next().ok_or_else(missing)?;
    Ok((up, down))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="modal-body">
          <form class="form-horizontal">
            <div class="control-group">
              <label class="control-label">DSL Status</label>
              <div class="controls"><strong>Up</strong></div>
            </div>
            <div class="control-group">
              <label class="control-label">Line Rate</label>
              <div class="controls">
                <strong>1.05 Mbps</strong>
                <strong>24.51 Mbps</strong>
              </div>
            </div>
            <div class="control-group">
              <label class="control-label">Output Power</label>
              <div class="controls">
                <strong>6.5 dBm</strong>
                <strong>12.8 dBm</strong>
              </div>
            </div>
            <div class="control-group">
              <label class="control-label">Line Attenuation</label>
              <div class="controls">
                <strong>13.1 dB</strong>
                <strong>25.3 dB</strong>
              </div>
            </div>
            <div class="control-group">
              <label class="control-label">Noise Margin</label>
              <div class="controls">
                <strong>12.6 dB</strong>
                <strong>11.2 dB</strong>
              </div>
            </div>
          </form>
        </div>
    "#;

    #[test]
    fn test_parse_full_page() {
        let stats = parse_stats(PAGE).unwrap();
        assert_eq!(
            stats,
            ModemStats {
                up_rate: 1.05,
                down_rate: 24.51,
                up_power: 6.5,
                down_power: 12.8,
                up_attenuation: 13.1,
                down_attenuation: 25.3,
                up_noisemargin: 12.6,
                down_noisemargin: 11.2,
            }
        );
    }

    #[test]
    fn test_pair_order_is_document_order() {
        let doc = Html::parse_document(
            r#"<div><label>Line Rate</label>
               <span>12.3 Mbps</span><span>98.7 Mbps</span></div>"#,
        );
        let (up, down) = fetch_pair(&doc, "Line Rate", "Mbps").unwrap();
        assert_eq!(up, 12.3);
        assert_eq!(down, 98.7);
    }

    #[test]
    fn test_pair_never_sorted_by_magnitude() {
        // First value larger than the second stays first
        let doc = Html::parse_document(
            r#"<div><label>Line Rate</label>
               <span>98.7 Mbps</span><span>12.3 Mbps</span></div>"#,
        );
        let (up, down) = fetch_pair(&doc, "Line Rate", "Mbps").unwrap();
        assert_eq!(up, 98.7);
        assert_eq!(down, 12.3);
    }

    #[test]
    fn test_single_value_fails() {
        let doc = Html::parse_document(
            r#"<div><label>Line Rate</label><span>12.3 Mbps</span></div>"#,
        );
        let err = fetch_pair(&doc, "Line Rate", "Mbps").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::MissingValues {
                label: "Line Rate".to_string(),
                unit: "Mbps".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_section_fails() {
        let err = fetch_pair(&Html::parse_document("<div></div>"), "Line Rate", "Mbps")
            .unwrap_err();
        assert_eq!(err, ExtractionError::SectionNotFound("Line Rate".to_string()));
    }

    #[test]
    fn test_plain_output_order() {
        let stats = parse_stats(PAGE).unwrap();
        let plain = stats.to_plain();
        let keys: Vec<&str> = plain
            .lines()
            .map(|line| line.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(
            keys,
            [
                "up_rate",
                "down_rate",
                "up_power",
                "down_power",
                "up_attenuation",
                "down_attenuation",
                "up_noisemargin",
                "down_noisemargin",
            ]
        );
        assert!(plain.starts_with("up_rate 1.05\ndown_rate 24.51\n"));
    }

    #[test]
    fn test_json_has_exactly_the_eight_keys() {
        let stats = parse_stats(PAGE).unwrap();
        let value = serde_json::to_value(&stats).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 8);
        for key in [
            "up_rate",
            "down_rate",
            "up_power",
            "down_power",
            "up_attenuation",
            "down_attenuation",
            "up_noisemargin",
            "down_noisemargin",
        ] {
            assert!(object[key].is_number(), "missing {}", key);
        }
    }
}
