// Local Crate Imports
use crate::{
    errors::{ResidueError, Result},
    table::AminoAcidTable,
};

// Public API ==========================================================================================================

/// A validated peptide sequence in both orders downstream consumers need: `original` is the
/// N-terminus-to-C-terminus order the user typed, and `synthesis` is its exact reverse (the
/// instrument deposits residues C-terminus first).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Tokenization {
    pub original: Vec<String>,
    pub synthesis: Vec<String>,
}

impl Tokenization {
    #[must_use]
    pub fn from_original(original: Vec<String>) -> Self {
        let synthesis = original.iter().rev().cloned().collect();
        Self {
            original,
            synthesis,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.original.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

/// Tokenize a raw peptide sequence against the reference table.
///
/// Input may be whitespace-delimited or one contiguous string. Matching is greedy, taking the
/// longest known code at each position, so a multi-character code always wins over a
/// single-character prefix of itself.
pub fn tokenize(table: &AminoAcidTable, raw: &str) -> Result<Tokenization> {
    let mut original = Vec::new();
    let mut offset = 0;

    while offset < raw.len() {
        let rest = &raw[offset..];

        let whitespace = rest.len() - rest.trim_start().len();
        if whitespace > 0 {
            offset += whitespace;
            continue;
        }

        let code = table
            .codes_longest_first()
            .iter()
            .find(|code| rest.starts_with(code.as_str()))
            .ok_or_else(|| ResidueError::invalid_residue(raw, offset))?;
        original.push(code.clone());
        offset += code.len();
    }

    Ok(Tokenization::from_original(original))
}

// Module Tests ========================================================================================================
