// Standard Library Imports
use std::ops::RangeInclusive;

// External Crate Imports
use rust_decimal::{Decimal, prelude::ToPrimitive};

// Public API ==========================================================================================================

/// Instrument and reagent constants for one planning run. These are configuration, not
/// chemistry: `Default` reproduces the values the synthesizer is calibrated for, but every one
/// of them can be overridden per run.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PlanConfig {
    /// Stock concentration of the amino-acid solutions (M)
    pub concentration: Decimal,
    /// Residue-equivalent basis used to derive mmol per occurrence
    pub max_occurrence: u32,
    /// Maximum working volume of one vial (mL)
    pub max_volume: Decimal,
    /// Volume drawn from an amino-acid vial per coupling (mL)
    pub dispense_volume: Decimal,
    /// Volume drawn from a deprotection vial per step (mL)
    pub inject_volume: Decimal,
    /// Vial positions per autosampler rack
    pub rack_size: u32,
    /// Autosampler sites reserved for deprotection vials (rack 2)
    pub deprotection_region: RangeInclusive<u32>,
    pub step: StepParams,
}

/// Fixed per-row instrument parameters emitted into every synthesis step.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StepParams {
    pub coupling_flow_rate_a: Decimal,
    pub coupling_flow_rate_b: Decimal,
    pub deprotection_flow_rate_d: Decimal,
    pub reagent_conc_a: Decimal,
    pub coupling_reagent_conc_b: Decimal,
    pub deprotection_reagent_conc_b: Decimal,
    pub reagent_use: Decimal,
    pub reactor_temperature: Decimal,
    pub cleaning_flow_rate: Decimal,
    pub manual_clean: Decimal,
}

impl PlanConfig {
    /// Residue-equivalents one amino-acid vial can supply. A vial always supplies at least one
    /// residue, even under a degenerate volume configuration.
    #[must_use]
    pub fn vial_capacity(&self) -> u32 {
        (self.max_volume / self.dispense_volume)
            .floor()
            .to_u32()
            .unwrap_or(0)
            .max(1)
    }

    /// mmol of reagent one occurrence consumes from its vial
    #[must_use]
    pub fn mmol_per_occurrence(&self) -> Decimal {
        self.max_volume * self.concentration / Decimal::from(self.max_occurrence)
    }

    /// Deprotection injections one vial can serve
    #[must_use]
    pub fn deprotection_samples_per_vial(&self) -> u32 {
        (self.max_volume / self.inject_volume)
            .ceil()
            .to_u32()
            .unwrap_or(1)
            .max(1)
    }

    /// Vial slots in the reserved deprotection region
    #[must_use]
    pub fn deprotection_slots(&self) -> u32 {
        self.deprotection_region.end() - self.deprotection_region.start() + 1
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            concentration: Decimal::new(4, 1),
            max_occurrence: 6,
            max_volume: Decimal::from(16),
            dispense_volume: Decimal::new(25, 1),
            inject_volume: Decimal::new(15, 1),
            rack_size: 27,
            deprotection_region: 28..=54,
            step: StepParams::default(),
        }
    }
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            coupling_flow_rate_a: Decimal::new(889, 3),
            coupling_flow_rate_b: Decimal::new(444, 3),
            deprotection_flow_rate_d: Decimal::new(8, 1),
            reagent_conc_a: Decimal::new(1, 1),
            coupling_reagent_conc_b: Decimal::new(24, 2),
            deprotection_reagent_conc_b: Decimal::new(1, 1),
            reagent_use: Decimal::from(4),
            reactor_temperature: Decimal::from(75),
            cleaning_flow_rate: Decimal::from(2),
            manual_clean: Decimal::from(4),
        }
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_capacity_is_six_residues() {
        let config = PlanConfig::default();
        assert_eq!(config.vial_capacity(), 6);
    }

    #[test]
    fn default_mmol_per_occurrence() {
        let config = PlanConfig::default();
        // 16 mL * 0.4 M / 6 equivalents
        assert_eq!(
            config.mmol_per_occurrence().round_dp(4),
            dec!(1.0667)
        );
    }

    #[test]
    fn default_deprotection_samples_per_vial() {
        let config = PlanConfig::default();
        // ceil(16 / 1.5) = 11
        assert_eq!(config.deprotection_samples_per_vial(), 11);
    }

    #[test]
    fn deprotection_region_holds_27_slots() {
        let config = PlanConfig::default();
        assert_eq!(config.deprotection_slots(), 27);
    }

    #[test]
    fn degenerate_volume_still_supplies_one_residue() {
        let config = PlanConfig {
            max_volume: dec!(1),
            ..PlanConfig::default()
        };
        assert_eq!(config.vial_capacity(), 1);
    }
}
