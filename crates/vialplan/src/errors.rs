use miette::Diagnostic;
use residues::ResidueError;
use thiserror::Error;

pub type Result<T, E = PlanError> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum PlanError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Residue {
        #[from]
        error: ResidueError,
    },

    #[error("not enough rack space for deprotection vials: need {required}, available {available}")]
    #[diagnostic(help(
        "the deprotection region holds {available} vials — shorten the sequence or use a larger deprotection vial volume"
    ))]
    InsufficientRackSpace { required: u32, available: u32 },
}
