use miette::Diagnostic;
use thiserror::Error;
use vialplan::PlanError;

pub type Result<T, E = ReplanError> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum ReplanError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Plan {
        #[from]
        error: PlanError,
    },

    #[error("no prior {what} rows were found — the file may be missing or empty")]
    MissingPriorPlan { what: String },

    #[error("the vial name {name:?} from the prior vial map could not be parsed")]
    UnrecognizedVialName { name: String },

    #[error("the prior synthesis plan contains the row {name:?} and cannot be extended")]
    #[diagnostic(help(
        "ERROR rows mean the prior plan was never valid for the instrument — rebuild it from scratch instead"
    ))]
    PriorPlanInvalid { name: String },
}

impl ReplanError {
    pub(crate) fn missing_prior_plan(what: &str) -> Self {
        let what = what.to_owned();

        Self::MissingPriorPlan { what }
    }

    pub(crate) fn unrecognized_vial_name(name: &str) -> Self {
        let name = name.to_owned();

        Self::UnrecognizedVialName { name }
    }

    pub(crate) fn prior_plan_invalid(name: &str) -> Self {
        let name = name.to_owned();

        Self::PriorPlanInvalid { name }
    }
}
