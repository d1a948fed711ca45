use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type Result<T, E = ResidueError> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum ResidueError {
    #[error("no known amino-acid code matches the sequence at position {position}")]
    #[diagnostic(help(
        "codes are case-sensitive — check the reference table for the residue you meant"
    ))]
    InvalidResidue {
        #[source_code]
        sequence: String,
        #[label("unrecognized from here")]
        span: SourceSpan,
        position: usize,
        remaining: String,
    },

    #[error("the amino acid {code:?} could not be found in the reference table")]
    UnknownResidue { code: String },

    #[error("the amino acid {code:?} appears more than once in the reference table")]
    DuplicateCode { code: String },

    #[error("malformed amino-acid table: {reason}")]
    MalformedTable { reason: String },
}

impl ResidueError {
    pub(crate) fn invalid_residue(sequence: &str, offset: usize) -> Self {
        let position = sequence[..offset].chars().count() + 1;
        let remaining = sequence[offset..].to_owned();
        let span = (offset, sequence.len() - offset).into();
        let sequence = sequence.to_owned();

        Self::InvalidResidue {
            sequence,
            span,
            position,
            remaining,
        }
    }

    pub(crate) fn unknown_residue(code: &str) -> Self {
        let code = code.to_owned();

        Self::UnknownResidue { code }
    }

    pub(crate) fn duplicate_code(code: &str) -> Self {
        let code = code.to_owned();

        Self::DuplicateCode { code }
    }

    pub(crate) fn malformed_table(reason: impl Into<String>) -> Self {
        let reason = reason.into();

        Self::MalformedTable { reason }
    }
}
