// Standard Library Imports
use std::cmp::Reverse;

// External Crate Imports
use ahash::{HashMap, HashMapExt};
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Local Crate Imports
use crate::errors::{ResidueError, Result};

// Public API ==========================================================================================================

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct AminoAcid {
    #[serde(rename = "AA")]
    pub code: String,
    #[serde(rename = "MW")]
    pub molecular_weight: Decimal,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct AminoAcidTable {
    residues: HashMap<String, AminoAcid>,
    // NOTE: Codes are kept sorted longest-first so that greedy tokenization prefers a multi-character code like "Aib"
    // over its single-character prefix "A"
    codes: Vec<String>,
}

impl AminoAcidTable {
    pub fn from_records(records: impl IntoIterator<Item = AminoAcid>) -> Result<Self> {
        let mut residues = HashMap::new();
        for mut amino_acid in records {
            amino_acid.code = amino_acid.code.trim().to_owned();
            let code = amino_acid.code.clone();

            if code.is_empty() {
                return Err(ResidueError::malformed_table("empty amino-acid code"));
            }
            // Trailing digits are reserved for split-vial suffixes ("K2"), so a code carrying its own digit would
            // make persisted vial names unparseable
            if code.ends_with(|c: char| c.is_ascii_digit()) {
                return Err(ResidueError::malformed_table(format!(
                    "amino-acid code {code:?} ends in a digit, which collides with split-vial naming"
                )));
            }
            if residues.insert(code.clone(), amino_acid).is_some() {
                return Err(ResidueError::duplicate_code(&code));
            }
        }

        let mut codes: Vec<_> = residues.keys().cloned().collect();
        codes.sort_unstable_by_key(|code| (Reverse(code.len()), code.clone()));

        Ok(Self { residues, codes })
    }

    pub fn from_csv(csv_text: impl AsRef<str>) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(csv_text.as_ref().as_bytes());
        let records: Vec<AminoAcid> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .map_err(|e| ResidueError::malformed_table(e.to_string()))?;

        Self::from_records(records)
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&AminoAcid> {
        self.residues.get(code)
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.residues.contains_key(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn molecular_weight(&self, code: &str) -> Result<Decimal> {
        self.residues
            .get(code)
            .map(|amino_acid| amino_acid.molecular_weight)
            .ok_or_else(|| ResidueError::unknown_residue(code))
    }

    /// Sum of per-residue molecular weights, in g/mol. An empty token list sums to zero.
    pub fn total_mass<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Decimal> {
        tokens
            .iter()
            .map(|token| self.molecular_weight(token.as_ref()))
            .sum()
    }

    pub(crate) fn codes_longest_first(&self) -> &[String] {
        &self.codes
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal_macros::dec;

    use super::*;

    const TABLE_CSV: &str = indoc! {"
        AA,MW,Name
        A,71.08,Alanine
        C,103.14,Cysteine
        T,101.10,Threonine
        Aib,85.10,2-Aminoisobutyric acid
    "};

    #[test]
    fn load_table_from_csv() {
        let table = AminoAcidTable::from_csv(TABLE_CSV).unwrap();
        assert_eq!(table.len(), 4);
        assert!(table.contains("Aib"));
        assert!(!table.contains("a"));
        assert_eq!(table.molecular_weight("C"), Ok(dec!(103.14)));
        assert_eq!(
            table.get("Aib").unwrap().name.as_deref(),
            Some("2-Aminoisobutyric acid")
        );
    }

    #[test]
    fn load_table_without_name_column() {
        let table = AminoAcidTable::from_csv("AA,MW\nA,71.08\n").unwrap();
        assert_eq!(table.get("A").unwrap().name, None);
    }

    #[test]
    fn codes_are_sorted_longest_first() {
        let table = AminoAcidTable::from_csv(TABLE_CSV).unwrap();
        assert_eq!(table.codes_longest_first(), ["Aib", "A", "C", "T"]);
    }

    #[test]
    fn reject_duplicate_codes() {
        let result = AminoAcidTable::from_csv("AA,MW\nA,71.08\nA,72.00\n");
        assert_eq!(result, Err(ResidueError::duplicate_code("A")));
    }

    #[test]
    fn reject_codes_ending_in_digits() {
        let result = AminoAcidTable::from_csv("AA,MW\nK2,128.17\n");
        assert!(matches!(result, Err(ResidueError::MalformedTable { .. })));
    }

    #[test]
    fn reject_unparseable_weights() {
        let result = AminoAcidTable::from_csv("AA,MW\nA,heavy\n");
        assert!(matches!(result, Err(ResidueError::MalformedTable { .. })));
    }

    #[test]
    fn mass_is_additive() {
        let table = AminoAcidTable::from_csv(TABLE_CSV).unwrap();
        assert_eq!(table.total_mass::<&str>(&[]), Ok(dec!(0)));
        assert_eq!(table.total_mass(&["A", "C"]), Ok(dec!(174.22)));
        assert_eq!(table.total_mass(&["A"; 7]), Ok(dec!(497.56)));
    }

    #[test]
    fn mass_of_unknown_residue_fails() {
        let table = AminoAcidTable::from_csv(TABLE_CSV).unwrap();
        assert_eq!(
            table.total_mass(&["A", "X"]),
            Err(ResidueError::unknown_residue("X"))
        );
    }
}
