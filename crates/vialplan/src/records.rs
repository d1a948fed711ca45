//! Persisted row schemas. Field names are a byte-for-byte compatibility contract: the vial-map
//! columns with the spreadsheet scientists prepare vials from, and the synthesis-step columns
//! with the instrument's control software.

// External Crate Imports
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Local Crate Imports
use crate::{
    config::StepParams,
    vial::{VialEntry, VialId},
};

// Public API ==========================================================================================================

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct VialRecord {
    #[serde(rename = "Amino Acid")]
    pub amino_acid: String,
    #[serde(rename = "Rack")]
    pub rack: u32,
    #[serde(rename = "Position")]
    pub position: u32,
    #[serde(rename = "Occurrences")]
    pub occurrences: u32,
    #[serde(rename = "mmol")]
    pub mmol: Decimal,
    #[serde(rename = "Mass (g)")]
    pub mass_g: Decimal,
    #[serde(rename = "Volume (mL)")]
    pub volume_ml: Decimal,
}

impl VialRecord {
    /// Rebuild the structured entry this record was flattened from. `None` when the persisted
    /// name cannot be a vial name (empty, or digits only).
    #[must_use]
    pub fn to_entry(&self) -> Option<VialEntry> {
        let id = VialId::from_name(&self.amino_acid)?;

        Some(VialEntry {
            id,
            rack: self.rack,
            position: self.position,
            occurrences: self.occurrences,
            mmol: self.mmol,
            mass_g: self.mass_g,
            volume_ml: self.volume_ml,
        })
    }
}

impl crate::vial::VialMap {
    /// Flatten the map into its persisted row form, in allocation order
    #[must_use]
    pub fn records(&self) -> Vec<VialRecord> {
        self.entries().iter().map(VialRecord::from).collect()
    }
}

impl From<&VialEntry> for VialRecord {
    fn from(entry: &VialEntry) -> Self {
        Self {
            amino_acid: entry.id.to_string(),
            rack: entry.rack,
            position: entry.position,
            occurrences: entry.occurrences,
            mmol: entry.mmol,
            mass_g: entry.mass_g,
            volume_ml: entry.volume_ml,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct SynthesisStep {
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "FLOW RATE A (ml/min)")]
    pub flow_rate_a: Decimal,
    #[serde(rename = "FLOW RATE B (ml/min)")]
    pub flow_rate_b: Decimal,
    #[serde(rename = "FLOW RATE D (ml/min)")]
    pub flow_rate_d: Decimal,
    #[serde(rename = "RESIDENCE 2")]
    pub residence_2: bool,
    #[serde(rename = "AUTOSAMPLER SITE A")]
    pub autosampler_site_a: u32,
    #[serde(rename = "REAGENT CONC A (M)")]
    pub reagent_conc_a: Decimal,
    #[serde(rename = "AUTOSAMPLER SITE B")]
    pub autosampler_site_b: u32,
    #[serde(rename = "REAGENT CONC B (M)")]
    pub reagent_conc_b: Decimal,
    #[serde(rename = "DO NOT FILL")]
    pub do_not_fill: bool,
    #[serde(rename = "REAGENT USE (ml)")]
    pub reagent_use: Decimal,
    #[serde(rename = "REACTOR TEMPERATURE 2 (C)")]
    pub reactor_temperature_2: Decimal,
    #[serde(rename = "REACTOR TEMPERATURE 3 (C)")]
    pub reactor_temperature_3: Decimal,
    #[serde(rename = "WHOLE PEAK")]
    pub whole_peak: bool,
    #[serde(rename = "DO NOT COLLECT")]
    pub do_not_collect: bool,
    #[serde(rename = "CLEANING FLOW RATE (ml/min)")]
    pub cleaning_flow_rate: Decimal,
    #[serde(rename = "MANUAL CLEAN (ml)")]
    pub manual_clean: Decimal,
}

impl SynthesisStep {
    pub(crate) fn coupling(
        code: &str,
        synthesis_position: usize,
        vial_site: u32,
        deprotection_site: u32,
        params: &StepParams,
    ) -> Self {
        Self {
            name: format!("{code}{synthesis_position}"),
            flow_rate_a: params.coupling_flow_rate_a,
            flow_rate_b: params.coupling_flow_rate_b,
            flow_rate_d: Decimal::ZERO,
            residence_2: true,
            autosampler_site_a: vial_site,
            reagent_conc_a: params.reagent_conc_a,
            autosampler_site_b: deprotection_site,
            reagent_conc_b: params.coupling_reagent_conc_b,
            do_not_fill: false,
            reagent_use: params.reagent_use,
            reactor_temperature_2: params.reactor_temperature,
            reactor_temperature_3: params.reactor_temperature,
            whole_peak: false,
            do_not_collect: true,
            cleaning_flow_rate: params.cleaning_flow_rate,
            manual_clean: params.manual_clean,
        }
    }

    pub(crate) fn deprotection(
        synthesis_position: usize,
        vial_site: u32,
        deprotection_site: u32,
        params: &StepParams,
    ) -> Self {
        Self {
            name: format!("deprotection {synthesis_position}"),
            flow_rate_a: Decimal::ZERO,
            flow_rate_b: Decimal::ZERO,
            flow_rate_d: params.deprotection_flow_rate_d,
            residence_2: true,
            autosampler_site_a: vial_site,
            reagent_conc_a: params.reagent_conc_a,
            autosampler_site_b: deprotection_site,
            reagent_conc_b: params.deprotection_reagent_conc_b,
            do_not_fill: false,
            reagent_use: params.reagent_use,
            reactor_temperature_2: params.reactor_temperature,
            reactor_temperature_3: params.reactor_temperature,
            whole_peak: false,
            do_not_collect: true,
            cleaning_flow_rate: params.cleaning_flow_rate,
            manual_clean: params.manual_clean,
        }
    }

    /// The zeroed placeholder emitted when no vial has capacity left for a residue. Flagged so
    /// the instrument neither fills nor collects anything for it.
    pub(crate) fn failure(code: &str) -> Self {
        Self {
            name: format!("ERROR_{code}"),
            flow_rate_a: Decimal::ZERO,
            flow_rate_b: Decimal::ZERO,
            flow_rate_d: Decimal::ZERO,
            residence_2: false,
            autosampler_site_a: 0,
            reagent_conc_a: Decimal::ZERO,
            autosampler_site_b: 0,
            reagent_conc_b: Decimal::ZERO,
            do_not_fill: true,
            reagent_use: Decimal::ZERO,
            reactor_temperature_2: Decimal::ZERO,
            reactor_temperature_3: Decimal::ZERO,
            whole_peak: false,
            do_not_collect: true,
            cleaning_flow_rate: Decimal::ZERO,
            manual_clean: Decimal::ZERO,
        }
    }

    /// Whether this row is an ERROR placeholder rather than a real instruction
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.name.starts_with("ERROR_")
    }
}
