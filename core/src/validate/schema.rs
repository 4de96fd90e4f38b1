//! validate/schema.rs
//! Optional grammar validation against an XSD.
//!
//! Industry notes:
//! - Full XSD validation needs a schema engine; the codec only defines the
//!   seam (`SchemaValidator`) and ships a declaration-level check.
//! - `XsdDeclarationValidator` catches the common mistakes: wrong target
//!   namespace, undeclared root element and missing required root attributes.

use roxmltree::{Document, Node};

/// Grammar check of a payload against schema text.
pub trait SchemaValidator {
    fn name(&self) -> &str;

    /// Violations found; empty when the payload conforms.
    fn validate(&self, payload: &str, schema: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XsdDeclarationValidator;

fn local(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn xs_children<'a, 'input>(node: Node<'a, 'input>, kind: &'a str) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| c.is_element() && c.tag_name().name() == kind)
}

/// `use="required"` attribute names under a complex type, attribute groups excluded.
fn required_attributes(complex_type: Node<'_, '_>) -> Vec<String> {
    complex_type
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "attribute" && n.attribute("use") == Some("required"))
        .filter_map(|n| n.attribute("name").or_else(|| n.attribute("ref")).map(|a| local(a).to_string()))
        .collect()
}

impl SchemaValidator for XsdDeclarationValidator {
    fn name(&self) -> &str {
        "xsd-declaration"
    }

    fn validate(&self, payload: &str, schema: &str) -> Vec<String> {
        let xsd = match Document::parse(schema) {
            Ok(doc) => doc,
            Err(e) => return vec![format!("schema is not well-formed: {}", e)],
        };
        let xml = match Document::parse(payload) {
            Ok(doc) => doc,
            Err(e) => return vec![format!("payload is not well-formed: {}", e)],
        };

        let schema_root = xsd.root_element();
        let root = xml.root_element();
        let mut violations = Vec::new();

        let target = schema_root.attribute("targetNamespace");
        if target != root.tag_name().namespace() {
            violations.push(format!(
                "payload namespace {:?} does not match schema targetNamespace {:?}",
                root.tag_name().namespace().unwrap_or(""),
                target.unwrap_or("")
            ));
        }

        let root_name = root.tag_name().name();
        let Some(declaration) = xs_children(schema_root, "element").find(|e| e.attribute("name") == Some(root_name))
        else {
            violations.push(format!("element '{}' is not declared as a global element", root_name));
            return violations;
        };

        let complex_type = xs_children(declaration, "complexType").next().or_else(|| {
            let type_name = local(declaration.attribute("type")?);
            xs_children(schema_root, "complexType").find(|t| t.attribute("name") == Some(type_name))
        });

        if let Some(complex_type) = complex_type {
            for attr in required_attributes(complex_type) {
                if root.attribute(attr.as_str()).is_none() {
                    violations.push(format!("required attribute '{}' missing on '{}'", attr, root_name));
                }
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        xmlns:eCH-0196="http://www.ech.ch/xmlns/eCH-0196/2"
        targetNamespace="http://www.ech.ch/xmlns/eCH-0196/2">
      <xs:element name="taxStatement" type="eCH-0196:taxStatementType"/>
      <xs:complexType name="taxStatementType">
        <xs:attribute name="minorVersion" type="xs:int" use="required"/>
        <xs:attribute name="canton" type="xs:string"/>
      </xs:complexType>
    </xs:schema>"#;

    #[test]
    fn conforming_root_passes() {
        let xml = r#"<taxStatement xmlns="http://www.ech.ch/xmlns/eCH-0196/2" minorVersion="2"/>"#;
        assert!(XsdDeclarationValidator.validate(xml, XSD).is_empty());
    }

    #[test]
    fn missing_required_attribute_is_reported() {
        let xml = r#"<taxStatement xmlns="http://www.ech.ch/xmlns/eCH-0196/2"/>"#;
        let v = XsdDeclarationValidator.validate(xml, XSD);
        assert_eq!(v.len(), 1);
        assert!(v[0].contains("minorVersion"));
    }

    #[test]
    fn namespace_and_declaration_mismatches_are_reported() {
        let v = XsdDeclarationValidator.validate(r#"<other xmlns="urn:x"/>"#, XSD);
        assert_eq!(v.len(), 2);
    }
}
