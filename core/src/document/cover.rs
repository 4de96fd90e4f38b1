//! document/cover.rs
//! Human-readable summary page shown before the symbol pages.
//!
//! Industry notes:
//! - Everything on the cover is informational; the symbols carry the payload.
//! - Values missing from the statement display as "N/A" (text) or 0 (amounts
//!   and counts) rather than failing the encode.

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::constants::page;
use crate::document::DocumentError;
use crate::utils::{format_amount, format_amount_value};

const NOT_AVAILABLE: &str = "N/A";

/// Positions of one security category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    pub value: f64,
}

impl CategorySummary {
    pub fn label(&self) -> &str {
        match self.category.as_str() {
            "SHARE" => "Stocks/ETFs",
            "OTHER" => "Cash & Other",
            "BOND" => "Bonds",
            "OPTION" => "Options",
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverSummary {
    pub tax_period: String,
    pub period_from: String,
    pub period_to: String,
    pub canton: String,
    pub client_number: Option<String>,
    pub institution: String,
    pub depot_number: String,
    pub security_count: usize,
    pub payment_count: usize,
    pub mutation_count: usize,
    pub total_tax_value: String,
    pub total_gross_revenue_b: String,
    pub total_withholding_tax_claim: String,
    /// Non-empty categories, largest value first.
    pub positions: Vec<CategorySummary>,
}

impl Default for CoverSummary {
    fn default() -> Self {
        Self {
            tax_period: NOT_AVAILABLE.into(),
            period_from: NOT_AVAILABLE.into(),
            period_to: NOT_AVAILABLE.into(),
            canton: NOT_AVAILABLE.into(),
            client_number: None,
            institution: NOT_AVAILABLE.into(),
            depot_number: NOT_AVAILABLE.into(),
            security_count: 0,
            payment_count: 0,
            mutation_count: 0,
            total_tax_value: "0".into(),
            total_gross_revenue_b: "0".into(),
            total_withholding_tax_claim: "0".into(),
            positions: Vec::new(),
        }
    }
}

fn by_name<'a, 'input>(doc: &'a Document<'input>, name: &'a str) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants().filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn first_attr(doc: &Document<'_>, element: &str, attr: &str) -> Option<String> {
    by_name(doc, element).find_map(|n| n.attribute(attr)).map(str::to_string)
}

impl CoverSummary {
    /// Read the display values out of an eCH-0196 statement.
    pub fn from_statement_xml(xml: &str) -> Result<Self, DocumentError> {
        let doc = Document::parse(xml).map_err(|e| DocumentError::Cover(e.to_string()))?;
        let root = doc.root_element();
        let defaults = Self::default();
        let root_attr = |name: &str, fallback: &str| root.attribute(name).unwrap_or(fallback).to_string();

        let mut positions: Vec<CategorySummary> = ["SHARE", "OTHER", "BOND", "OPTION"]
            .iter()
            .map(|c| CategorySummary { category: (*c).into(), count: 0, value: 0.0 })
            .collect();

        for security in by_name(&doc, "security") {
            let Some(tax_value) = security
                .children()
                .find(|c| c.is_element() && c.tag_name().name() == "taxValue")
            else {
                continue;
            };
            let category = security.attribute("securityCategory").unwrap_or("OTHER");
            let value = tax_value.attribute("value").and_then(|v| v.trim().parse::<f64>().ok()).unwrap_or(0.0);

            match positions.iter_mut().find(|p| p.category == category) {
                Some(entry) => {
                    entry.count += 1;
                    entry.value += value;
                }
                None => positions.push(CategorySummary { category: category.into(), count: 1, value }),
            }
        }
        positions.retain(|p| p.count > 0);
        positions.sort_by(|a, b| b.value.total_cmp(&a.value));

        Ok(Self {
            tax_period: root_attr("taxPeriod", NOT_AVAILABLE),
            period_from: root_attr("periodFrom", NOT_AVAILABLE),
            period_to: root_attr("periodTo", NOT_AVAILABLE),
            canton: root_attr("canton", NOT_AVAILABLE),
            client_number: first_attr(&doc, "client", "clientNumber"),
            institution: first_attr(&doc, "institution", "name").unwrap_or(defaults.institution),
            depot_number: first_attr(&doc, "depot", "depotNumber").unwrap_or(defaults.depot_number),
            security_count: by_name(&doc, "security").count(),
            payment_count: by_name(&doc, "payment").count(),
            mutation_count: by_name(&doc, "stock").count(),
            total_tax_value: root_attr("totalTaxValue", "0"),
            total_gross_revenue_b: root_attr("totalGrossRevenueB", "0"),
            total_withholding_tax_claim: root_attr("totalWithHoldingTaxClaim", "0"),
            positions,
        })
    }

    pub fn position_total(&self) -> f64 {
        self.positions.iter().map(|p| p.value).sum()
    }
}

/// Barcode facts printed at the bottom of the cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeInfo {
    pub document_id: String,
    pub segments: usize,
    pub symbol_pages: usize,
}

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub bold: bool,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

impl TextRun {
    fn new(bold: bool, size: f32, x: f32, y: f32, text: impl Into<String>) -> Self {
        Self { bold, size, x, y, text: text.into() }
    }
}

/// Rough Helvetica advance, enough to centre a title.
fn approx_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Lines of the cover page laid out in two columns.
pub fn cover_lines(summary: &CoverSummary, info: &BarcodeInfo) -> Vec<TextRun> {
    const TITLE: &str = "eCH-0196 Tax Statement Summary";
    const BODY: f32 = 12.0;
    const LEADING: f32 = 14.0;
    const MARGIN_X: f32 = 60.0;

    let width = page::WIDTH_PT;
    let mut lines = Vec::new();
    let mut y = page::HEIGHT_PT - 50.0 - 24.0;
    lines.push(TextRun::new(false, 24.0, (width - approx_width(TITLE, 24.0)) / 2.0, y, TITLE));
    let column_top = y - 30.0 - 24.0;

    // Left column: label on one line, value on the next, blank line between.
    y = column_top;
    let labelled = [
        ("Tax Period:", format!("{} ({} to {})", summary.tax_period, summary.period_from, summary.period_to)),
        ("Canton:", summary.canton.clone()),
        ("Client Number:", summary.client_number.clone().unwrap_or_else(|| NOT_AVAILABLE.into())),
        ("Financial Institution:", summary.institution.clone()),
        ("Depot Number:", summary.depot_number.clone()),
    ];
    for (label, value) in labelled {
        lines.push(TextRun::new(true, BODY, MARGIN_X, y, label));
        y -= LEADING;
        lines.push(TextRun::new(false, BODY, MARGIN_X, y, value));
        y -= 2.0 * LEADING;
    }
    for (label, count) in [
        ("Securities: ", summary.security_count),
        ("Payments: ", summary.payment_count),
        ("Stock Mutations: ", summary.mutation_count),
    ] {
        lines.push(TextRun::new(true, BODY, MARGIN_X, y, format!("{}{}", label, count)));
        y -= LEADING;
    }
    let left_bottom = y;

    // Right column.
    let right_x = width / 2.0;
    y = column_top;
    for (label, raw) in [
        ("Total Tax Value:", &summary.total_tax_value),
        ("Total Gross Revenue:", &summary.total_gross_revenue_b),
        ("Total Withholding Tax:", &summary.total_withholding_tax_claim),
    ] {
        lines.push(TextRun::new(true, BODY, right_x, y, label));
        y -= LEADING;
        lines.push(TextRun::new(false, BODY, right_x, y, format!("CHF {}", format_amount(raw))));
        y -= 2.0 * LEADING;
    }
    if !summary.positions.is_empty() {
        lines.push(TextRun::new(true, BODY, right_x, y, "Position Summary:"));
        y -= LEADING;
        for p in &summary.positions {
            let text = format!("{}: {} pos, CHF {}", p.label(), p.count, format_amount_value(p.value));
            lines.push(TextRun::new(false, BODY, right_x, y, text));
            y -= LEADING;
        }
        let total = format!("Total: CHF {}", format_amount_value(summary.position_total()));
        lines.push(TextRun::new(true, BODY, right_x, y, total));
        y -= LEADING;
    }

    let info_y = left_bottom.min(y) - 20.0;
    lines.push(TextRun::new(
        false,
        9.0,
        MARGIN_X,
        info_y,
        format!(
            "Barcode ID: {}  |  Barcode Segments: {}  |  Barcode Pages: {}",
            info.document_id, info.segments, info.symbol_pages
        ),
    ));
    lines
}

/// `Page X of N`, as drawn at the label anchor.
pub fn page_label(page_number: usize, total_pages: usize) -> String {
    format!("Page {} of {}", page_number, total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<taxStatement xmlns="http://www.ech.ch/xmlns/eCH-0196/2" minorVersion="2" taxPeriod="2024"
    periodFrom="2024-01-01" periodTo="2024-12-31" canton="ZH" totalTaxValue="12345.5"
    totalGrossRevenueB="321" totalWithHoldingTaxClaim="12.3">
  <institution name="Example Bank"/>
  <client clientNumber="C-42"/>
  <listOfSecurities>
    <depot depotNumber="D-1">
      <security securityCategory="SHARE"><taxValue value="1000"/><payment/></security>
      <security securityCategory="BOND"><taxValue value="5000"/></security>
      <security securityCategory="SHARE"><taxValue value="250"/><stock/></security>
      <security securityCategory="OPTION"/>
    </depot>
  </listOfSecurities>
</taxStatement>"#;

    #[test]
    fn statement_values_are_collected() {
        let s = CoverSummary::from_statement_xml(STATEMENT).unwrap();
        assert_eq!(s.tax_period, "2024");
        assert_eq!(s.canton, "ZH");
        assert_eq!(s.client_number.as_deref(), Some("C-42"));
        assert_eq!(s.institution, "Example Bank");
        assert_eq!(s.depot_number, "D-1");
        assert_eq!((s.security_count, s.payment_count, s.mutation_count), (4, 1, 1));

        let categories: Vec<_> = s.positions.iter().map(|p| (p.label(), p.count)).collect();
        assert_eq!(categories, vec![("Bonds", 1), ("Stocks/ETFs", 2)]);
        assert_eq!(s.position_total(), 6250.0);
    }

    #[test]
    fn missing_values_fall_back() {
        let s = CoverSummary::from_statement_xml("<taxStatement/>").unwrap();
        assert_eq!(s.canton, "N/A");
        assert_eq!(s.client_number, None);
        assert_eq!(s.total_tax_value, "0");
        assert!(s.positions.is_empty());
    }

    #[test]
    fn cover_mentions_barcode_facts() {
        let info = BarcodeInfo { document_id: "abc".into(), segments: 7, symbol_pages: 2 };
        let lines = cover_lines(&CoverSummary::default(), &info);
        assert!(lines.iter().any(|l| l.text == "eCH-0196 Tax Statement Summary"));
        assert!(lines
            .iter()
            .any(|l| l.text == "Barcode ID: abc  |  Barcode Segments: 7  |  Barcode Pages: 2"));
    }
}
