// Local Crate Imports
use crate::{
    config::PlanConfig,
    errors::{PlanError, Result},
};

// Public API ==========================================================================================================

/// The deprotection-reagent vials reserved for one run. These live in a fixed autosampler
/// region (sites 28–54 on rack 2 by default), separate from the amino-acid racks.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DeprotectionAllocation {
    positions: Vec<u32>,
    uses_per_vial: u32,
}

impl DeprotectionAllocation {
    /// Size the deprotection pool for a sequence of `sequence_length` residues.
    ///
    /// Fails with `InsufficientRackSpace` when the reserved region cannot hold the required
    /// vial count — checked here, before any synthesis step is built, so an oversized sequence
    /// never produces a partial plan.
    pub fn for_sequence(sequence_length: usize, config: &PlanConfig) -> Result<Self> {
        let length = u32::try_from(sequence_length).unwrap_or(u32::MAX);
        let required = length.div_ceil(config.deprotection_samples_per_vial());
        let available = config.deprotection_slots();

        if required > available {
            return Err(PlanError::InsufficientRackSpace {
                required,
                available,
            });
        }

        let start = *config.deprotection_region.start();
        let positions = (start..start + required).collect();
        let uses_per_vial = if required == 0 {
            1
        } else {
            length.div_ceil(required)
        };

        Ok(Self {
            positions,
            uses_per_vial,
        })
    }

    #[must_use]
    pub fn required_vials(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    #[must_use]
    pub fn uses_per_vial(&self) -> u32 {
        self.uses_per_vial
    }

    /// Autosampler site serving the given 0-based usage count, clamped to the last vial
    pub(crate) fn position_for(&self, uses: u32) -> u32 {
        let index = ((uses / self.uses_per_vial) as usize).min(self.positions.len() - 1);
        self.positions[index]
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_residues_need_one_vial() {
        // samples_per_vial = ceil(16 / 1.5) = 11, so 10 deprotections fit in one vial
        let allocation = DeprotectionAllocation::for_sequence(10, &PlanConfig::default()).unwrap();
        assert_eq!(allocation.required_vials(), 1);
        assert_eq!(allocation.positions(), [28]);
        assert_eq!(allocation.uses_per_vial(), 10);
    }

    #[test]
    fn twelve_residues_spill_into_a_second_vial() {
        let allocation = DeprotectionAllocation::for_sequence(12, &PlanConfig::default()).unwrap();
        assert_eq!(allocation.positions(), [28, 29]);
        assert_eq!(allocation.uses_per_vial(), 6);
    }

    #[test]
    fn region_fits_exactly_27_vials() {
        // 27 vials * 11 samples = 297 residues is the longest sequence the region serves
        let allocation = DeprotectionAllocation::for_sequence(297, &PlanConfig::default()).unwrap();
        assert_eq!(allocation.required_vials(), 27);
        assert_eq!(*allocation.positions().last().unwrap(), 54);

        let result = DeprotectionAllocation::for_sequence(298, &PlanConfig::default());
        assert_eq!(
            result,
            Err(PlanError::InsufficientRackSpace {
                required: 28,
                available: 27,
            })
        );
    }

    #[test]
    fn empty_sequence_reserves_nothing() {
        let allocation = DeprotectionAllocation::for_sequence(0, &PlanConfig::default()).unwrap();
        assert_eq!(allocation.required_vials(), 0);
    }

    #[test]
    fn usage_counter_walks_through_the_vials() {
        let allocation = DeprotectionAllocation::for_sequence(22, &PlanConfig::default()).unwrap();
        assert_eq!(allocation.uses_per_vial(), 11);
        assert_eq!(allocation.position_for(0), 28);
        assert_eq!(allocation.position_for(10), 28);
        assert_eq!(allocation.position_for(11), 29);
        // Clamped to the last vial if usage somehow overruns
        assert_eq!(allocation.position_for(40), 29);
    }
}
