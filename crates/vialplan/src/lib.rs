//! Vial allocation and synthesis-step scheduling for automated flow peptide synthesis

pub mod allocator;
pub mod builder;
pub mod config;
pub mod deprotection;
pub mod errors;
pub mod records;
pub mod vial;

pub use allocator::{allocate, allocate_from};
pub use builder::{ResidueFailure, SynthesisPlan, build};
pub use config::{PlanConfig, StepParams};
pub use deprotection::DeprotectionAllocation;
pub use errors::{PlanError, Result};
pub use records::{SynthesisStep, VialRecord};
pub use vial::{RackCursor, VialEntry, VialId, VialMap};
