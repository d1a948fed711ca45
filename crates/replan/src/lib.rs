//! Incremental re-planning: recover the sequence a persisted plan was built for, diff it
//! against a modified sequence, and extend the existing vial layout with only the new material.

pub mod errors;

// Standard Library Imports
use std::iter::zip;

// External Crate Imports
use ahash::{HashMap, HashMapExt};
use residues::AminoAcidTable;
use vialplan::{
    DeprotectionAllocation, PlanConfig, RackCursor, SynthesisPlan, SynthesisStep, VialMap,
    VialRecord,
};

pub use errors::{ReplanError, Result};

// Public API ==========================================================================================================

/// Residues of `new` that differ from `old` at the same index, plus the whole tail of `new`
/// beyond `old`'s length.
///
/// This is a purely positional comparison: it assumes the two sequences are aligned
/// residue-for-residue from the start (substitution, truncation, or extension only). An
/// insertion or deletion mid-sequence shifts the alignment and misattributes every downstream
/// residue as changed.
#[must_use]
pub fn diff(old: &[String], new: &[String]) -> Vec<String> {
    let mut changed: Vec<String> = zip(old, new)
        .filter(|(old_code, new_code)| old_code != new_code)
        .map(|(_, new_code)| new_code.clone())
        .collect();
    if new.len() > old.len() {
        changed.extend(new[old.len()..].iter().cloned());
    }

    changed
}

/// Recover the original (N→C) token sequence a persisted plan was built for.
///
/// Coupling rows are the NAME entries not containing "deprotection"; their trailing digits are
/// the synthesis position, and the plan is stored in synthesis (C→N) order, so stripping and
/// reversing yields the sequence as the user entered it.
pub fn recover_sequence(steps: &[SynthesisStep]) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    for step in steps {
        let name = step.name.trim();
        if name.to_ascii_lowercase().contains("deprotection") {
            continue;
        }
        if step.is_failure() {
            return Err(ReplanError::prior_plan_invalid(name));
        }

        let code = name.trim_end_matches(|c: char| c.is_ascii_digit());
        if code.is_empty() {
            return Err(ReplanError::prior_plan_invalid(name));
        }
        tokens.push(code.to_owned());
    }

    if tokens.is_empty() {
        return Err(ReplanError::missing_prior_plan("synthesis plan"));
    }
    tokens.reverse();

    Ok(tokens)
}

/// Append vials for `changed` residues to a persisted vial map, never touching the old rows.
///
/// Allocation resumes at the slot after the furthest (rack, position) the old layout reached,
/// and split numbering continues from the highest index each base code already uses — if `K`
/// and `K2` exist, the next K vial is `K3`. Changed residues may carry a trailing `*` marker
/// flagging the substitution; markers are stripped before counting.
pub fn extend_vial_map(
    table: &AminoAcidTable,
    old_records: &[VialRecord],
    changed: &[String],
    config: &PlanConfig,
) -> Result<Vec<VialRecord>> {
    let Some((last_rack, last_position)) = old_records
        .iter()
        .map(|record| (record.rack, record.position))
        .max()
    else {
        return Err(ReplanError::missing_prior_plan("vial map"));
    };
    let cursor = if last_position >= config.rack_size {
        RackCursor::new(last_rack + 1, 1)
    } else {
        RackCursor::new(last_rack, last_position + 1)
    };

    let mut prior_splits: HashMap<String, u32> = HashMap::new();
    for record in old_records {
        let Some(id) = vialplan::VialId::from_name(&record.amino_acid) else {
            return Err(ReplanError::unrecognized_vial_name(&record.amino_acid));
        };
        let highest = prior_splits.entry(id.code).or_insert(0);
        *highest = (*highest).max(id.split);
    }

    let cleaned: Vec<String> = changed.iter().map(|code| code.replace('*', "")).collect();
    let appended = vialplan::allocate_from(table, &cleaned, config, cursor, &prior_splits)?;

    let mut combined = old_records.to_vec();
    combined.extend(appended.iter().map(VialRecord::from));

    Ok(combined)
}

/// Rebuild the full synthesis plan against an extended vial map.
///
/// This is a complete rebuild over the current token list, not an incremental edit of the old
/// step rows — only the vial map is extended incrementally.
pub fn extend_plan(
    combined_records: &[VialRecord],
    synthesis_tokens: &[String],
    config: &PlanConfig,
) -> Result<SynthesisPlan> {
    let entries = combined_records
        .iter()
        .map(|record| {
            record
                .to_entry()
                .ok_or_else(|| ReplanError::unrecognized_vial_name(&record.amino_acid))
        })
        .collect::<Result<Vec<_>>>()?;
    let vial_map = VialMap::from_entries(entries);
    let deprotection = DeprotectionAllocation::for_sequence(synthesis_tokens.len(), config)?;

    Ok(vialplan::build(
        synthesis_tokens,
        &vial_map,
        &deprotection,
        config,
    ))
}

// Module Tests ========================================================================================================
