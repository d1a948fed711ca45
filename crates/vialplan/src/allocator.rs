// External Crate Imports
use ahash::HashMap;
use itertools::Itertools;
use residues::AminoAcidTable;
use rust_decimal::Decimal;

// Local Crate Imports
use crate::{
    config::PlanConfig,
    errors::Result,
    vial::{RackCursor, VialEntry, VialId, VialMap},
};

// Public API ==========================================================================================================

/// Lay out amino-acid vials for a fresh plan, starting at the given cursor.
pub fn allocate(
    table: &AminoAcidTable,
    tokens: &[String],
    config: &PlanConfig,
    cursor: RackCursor,
) -> Result<VialMap> {
    let entries = allocate_from(table, tokens, config, cursor, &HashMap::default())?;
    Ok(VialMap::from_entries(entries))
}

/// Lay out vials for `tokens`, continuing split numbering from `prior_splits` (base code to the
/// highest split index already in use — empty for a fresh allocation).
///
/// Each distinct code's occurrence count is chunked greedily from the front into vials of at
/// most `PlanConfig::vial_capacity` residues, so every chunk but the last is full. Slots are
/// assigned densely across all codes in first-encounter order, rolling to the next rack once a
/// rack's positions are exhausted.
pub fn allocate_from(
    table: &AminoAcidTable,
    tokens: &[String],
    config: &PlanConfig,
    mut cursor: RackCursor,
    prior_splits: &HashMap<String, u32>,
) -> Result<Vec<VialEntry>> {
    let capacity = config.vial_capacity();
    let counts = tokens.iter().counts();
    let mut entries = Vec::new();

    for code in tokens.iter().unique() {
        let molecular_weight = table.molecular_weight(code)?;
        let mut remaining = u32::try_from(counts[code]).unwrap_or(u32::MAX);
        let mut split = prior_splits.get(code.as_str()).copied().unwrap_or(0) + 1;

        while remaining > 0 {
            let occurrences = remaining.min(capacity);
            remaining -= occurrences;

            let (rack, position) = cursor.next_slot(config.rack_size);
            // Capacity arithmetic stays on the unrounded values; only the reported quantities
            // are rounded to 2 decimal places
            let mmol = Decimal::from(occurrences) * config.mmol_per_occurrence();
            let mass_g = mmol * molecular_weight / Decimal::from(1000);
            let volume_ml = Decimal::from(occurrences) * config.dispense_volume;

            entries.push(VialEntry {
                id: VialId::new(code.clone(), split),
                rack,
                position,
                occurrences,
                mmol: mmol.round_dp(2),
                mass_g: mass_g.round_dp(2),
                volume_ml: volume_ml.round_dp(2),
            });
            split += 1;
        }
    }

    Ok(entries)
}

// Module Tests ========================================================================================================
