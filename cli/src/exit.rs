//! Process exit codes.

use std::process::ExitCode;

use etax_core::prelude::{CodecError, IssueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CliExitCode {
    Success = 0,
    NotFound = 2,
    /// Processing error or invalid document.
    Invalid = 3,
    MissingField = 4,
}

impl From<CliExitCode> for ExitCode {
    fn from(code: CliExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Map a failed command onto its exit code.
pub fn exit_code_for_error(err: &anyhow::Error) -> CliExitCode {
    for cause in err.chain() {
        if let Some(codec) = cause.downcast_ref::<CodecError>() {
            return match codec {
                CodecError::MissingField(_) => CliExitCode::MissingField,
                CodecError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => CliExitCode::NotFound,
                _ => CliExitCode::Invalid,
            };
        }
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::NotFound {
                return CliExitCode::NotFound;
            }
        }
    }
    CliExitCode::Invalid
}

/// Report category of the first codec error in the chain, if any.
pub fn issue_kind_of(err: &anyhow::Error) -> Option<IssueKind> {
    err.chain().find_map(|cause| cause.downcast_ref::<CodecError>()).and_then(CodecError::issue_kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_maps_to_four() {
        let err = anyhow::Error::new(CodecError::MissingField("clientNumber")).context("encoding x.xml");
        assert_eq!(exit_code_for_error(&err), CliExitCode::MissingField);
    }

    #[test]
    fn not_found_maps_to_two() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = anyhow::Error::new(CodecError::Io(io));
        assert_eq!(exit_code_for_error(&err), CliExitCode::NotFound);
    }

    #[test]
    fn other_errors_map_to_three() {
        let err = anyhow::Error::new(CodecError::Payload("empty payload".into()));
        assert_eq!(exit_code_for_error(&err), CliExitCode::Invalid);
    }

    #[test]
    fn geometry_failures_are_rendering_failures() {
        let symbol = etax_core::symbol::SymbolError::Capacity { len: 506, max: 505 };
        let err = anyhow::Error::new(CodecError::Symbol(symbol)).context("encoding x.xml");
        assert_eq!(issue_kind_of(&err), Some(IssueKind::RenderingFailure));
        assert_eq!(exit_code_for_error(&err), CliExitCode::Invalid);
        assert_eq!(issue_kind_of(&anyhow::anyhow!("plain failure")), None);
    }
}
