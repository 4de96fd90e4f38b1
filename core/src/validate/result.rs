//! validate/result.rs
//! The report every decode run fills in.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::telemetry::TelemetrySnapshot;

/// What went wrong, independent of the wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    RenderingFailure,
    FormatUnrecognized,
    SequenceError,
    DecompressionFailure,
    StructuralError,
    /// Right root element in an unexpected (or no) namespace.
    NamespaceMismatch,
    SchemaViolation,
    MissingResource,
    LinkingSymbol,
    Harvest,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::RenderingFailure => "RenderingFailure",
            IssueKind::FormatUnrecognized => "FormatUnrecognized",
            IssueKind::SequenceError => "SequenceError",
            IssueKind::DecompressionFailure => "DecompressionFailure",
            IssueKind::StructuralError => "StructuralError",
            IssueKind::NamespaceMismatch => "NamespaceMismatch",
            IssueKind::SchemaViolation => "SchemaViolation",
            IssueKind::MissingResource => "MissingResource",
            IssueKind::LinkingSymbol => "LinkingSymbol",
            IssueKind::Harvest => "Harvest",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub extracted_payload: Option<String>,
    pub metadata: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub telemetry: Option<TelemetrySnapshot>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            extracted_payload: None,
            metadata: BTreeMap::new(),
            telemetry: None,
        }
    }

    /// Record an error; the result can no longer be valid.
    pub fn error(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.errors.push(Issue { kind, message: message.into() });
        self.is_valid = false;
    }

    /// Record a warning; validity is unaffected.
    pub fn warn(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.warnings.push(Issue { kind, message: message.into() });
    }

    pub fn set_meta(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn has_error(&self, kind: IssueKind) -> bool {
        self.errors.iter().any(|i| i.kind == kind)
    }

    pub fn has_warning(&self, kind: IssueKind) -> bool {
        self.warnings.iter().any(|i| i.kind == kind)
    }

    /// Validity is the conjunction of every step: any error makes it false.
    pub fn finalize(&mut self) {
        self.is_valid = self.errors.is_empty();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Multi-line human summary.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(if self.is_valid { "Document is VALID\n" } else { "Document is INVALID\n" });
        for (key, value) in &self.metadata {
            out.push_str(&format!("  {}: {}\n", key, value));
        }
        if !self.errors.is_empty() {
            out.push_str(&format!("Errors ({}):\n", self.errors.len()));
            for issue in &self.errors {
                out.push_str(&format!("  - {}\n", issue));
            }
        }
        if !self.warnings.is_empty() {
            out.push_str(&format!("Warnings ({}):\n", self.warnings.len()));
            for issue in &self.warnings {
                out.push_str(&format!("  - {}\n", issue));
            }
        }
        out
    }
}
