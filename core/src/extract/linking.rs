//! extract/linking.rs
//! Per-page checks of the linking 1D symbol.

use log::warn;

use crate::extract::reader::LinkingReading;
use crate::headers::{decode_linking_code, LinkingForm};
use crate::validate::{IssueKind, ValidationResult};

/// Check the linking symbols of pages `1..=page_count`, recording issues on
/// `result`. Returns the number of pages whose record parsed.
pub fn check_linking(page_count: u32, readings: &[LinkingReading], result: &mut ValidationResult) -> usize {
    let mut parsed = 0;

    for page in 1..=page_count {
        let mut on_page = readings.iter().filter(|r| r.page == page);
        let Some(reading) = on_page.next() else {
            result.error(IssueKind::LinkingSymbol, format!("Page {}: no linking symbol found", page));
            continue;
        };
        if let Some(other) = on_page.find(|r| r.text != reading.text) {
            result.warn(
                IssueKind::LinkingSymbol,
                format!("Page {}: conflicting linking symbols {} and {}", page, reading.text, other.text),
            );
        }

        let code = match decode_linking_code(&reading.text) {
            Ok(code) => code,
            Err(e) => {
                result.error(IssueKind::LinkingSymbol, format!("Page {}: linking symbol '{}': {}", page, reading.text, e));
                continue;
            }
        };
        let form = match code.form_kind() {
            Ok(form) => form,
            Err(e) => {
                result.error(IssueKind::LinkingSymbol, format!("Page {}: {}", page, e));
                continue;
            }
        };
        parsed += 1;

        if !code.is_known_version() {
            result.warn(IssueKind::LinkingSymbol, format!("Page {}: unexpected version {:02}", page, code.version));
        }
        if form != LinkingForm::expected_for_page(page) {
            result.warn(
                IssueKind::LinkingSymbol,
                format!("Page {}: form {:03} not expected on this page", page, code.form),
            );
        }
        if u32::from(code.page) != page {
            result.warn(
                IssueKind::LinkingSymbol,
                format!("Page {}: linking symbol numbers itself page {}", page, code.page),
            );
        }
        if form == LinkingForm::Summary && code.has_2d == 1 {
            result.warn(IssueKind::LinkingSymbol, format!("Page {}: cover page flags 2D symbols", page));
        }
    }

    if parsed < page_count as usize {
        warn!("{} of {} pages carry a readable linking symbol", parsed, page_count);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(page: u32, text: &str) -> LinkingReading {
        LinkingReading { page, text: text.to_string() }
    }

    #[test]
    fn well_formed_pages_pass() {
        let mut result = ValidationResult::new();
        let readings = [reading(1, "1972100000001003"), reading(2, "1962100000002003")];
        assert_eq!(check_linking(2, &readings, &mut result), 2);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn missing_and_unknown_forms_are_errors() {
        let mut result = ValidationResult::new();
        let readings = [reading(1, "1232100000001003")];
        assert_eq!(check_linking(2, &readings, &mut result), 0);
        assert_eq!(result.errors.len(), 2);
        assert!(result.has_error(IssueKind::LinkingSymbol));
    }

    #[test]
    fn soft_mismatches_are_warnings() {
        let mut result = ValidationResult::new();
        // version 30, page field 5, cover flagged as carrying 2D symbols
        let readings = [reading(1, "1973000000005103")];
        assert_eq!(check_linking(1, &readings, &mut result), 1);
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 3);
    }
}
