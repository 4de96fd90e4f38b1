//! validate/structure.rs
//! Well-formedness, root element and namespace of the recovered payload.

use roxmltree::Document;

use crate::constants::{ECH0196_NAMESPACE, ROOT_ELEMENT};
use crate::validate::result::{IssueKind, ValidationResult};

/// Check `xml` and record findings. Returns whether the root is usable for
/// further (schema) validation.
pub fn check_structure(xml: &str, result: &mut ValidationResult) -> bool {
    let doc = match Document::parse(xml) {
        Ok(doc) => doc,
        Err(e) => {
            result.error(IssueKind::StructuralError, format!("Payload is not well-formed XML: {}", e));
            return false;
        }
    };
    let root = doc.root_element();

    let name = root.tag_name().name();
    if name != ROOT_ELEMENT {
        result.error(
            IssueKind::StructuralError,
            format!("Root element is '{}', expected '{}'", name, ROOT_ELEMENT),
        );
        return false;
    }

    match root.tag_name().namespace() {
        Some(ns) if ns == ECH0196_NAMESPACE => {}
        Some(ns) => result.warn(
            IssueKind::NamespaceMismatch,
            format!("Unexpected namespace '{}', expected '{}'", ns, ECH0196_NAMESPACE),
        ),
        None => result.warn(
            IssueKind::NamespaceMismatch,
            format!("Root element has no namespace, expected '{}'", ECH0196_NAMESPACE),
        ),
    }

    if let Some(minor) = root.attribute("minorVersion") {
        result.set_meta("minor_version", minor);
    }
    if let Some(period) = root.attribute("taxPeriod") {
        result.set_meta("tax_period", period);
    }
    if let Some(canton) = root.attribute("canton") {
        result.set_meta("canton", canton);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_statement_root() {
        let mut r = ValidationResult::new();
        let xml = r#"<taxStatement xmlns="http://www.ech.ch/xmlns/eCH-0196/2" minorVersion="2"/>"#;
        assert!(check_structure(xml, &mut r));
        assert!(r.errors.is_empty() && r.warnings.is_empty());
        assert_eq!(r.meta("minor_version").and_then(|v| v.as_str()), Some("2"));
    }

    #[test]
    fn wrong_root_is_an_error_and_wrong_namespace_a_warning() {
        let mut r = ValidationResult::new();
        assert!(!check_structure("<invoice/>", &mut r));
        assert!(r.has_error(IssueKind::StructuralError));

        let mut r = ValidationResult::new();
        assert!(check_structure(r#"<taxStatement xmlns="urn:other"/>"#, &mut r));
        assert!(r.errors.is_empty());
        assert_eq!(r.warnings.len(), 1);
        assert!(r.has_warning(IssueKind::NamespaceMismatch));
        assert!(!r.has_warning(IssueKind::StructuralError));
    }

    #[test]
    fn missing_namespace_is_a_namespace_mismatch() {
        let mut r = ValidationResult::new();
        assert!(check_structure("<taxStatement/>", &mut r));
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.warnings[0].kind, IssueKind::NamespaceMismatch);
    }

    #[test]
    fn malformed_xml_is_reported() {
        let mut r = ValidationResult::new();
        assert!(!check_structure("<taxStatement>", &mut r));
        assert!(!r.is_valid);
    }
}
