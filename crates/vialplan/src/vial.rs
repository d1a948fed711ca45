// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use ahash::{HashMap, HashMapExt};
use rust_decimal::Decimal;

// Public API ==========================================================================================================

/// Structured vial identity: a base amino-acid code plus a 1-based split index. Split 1 is the
/// first (or only) vial for a code and renders as the bare code; later splits render with their
/// index appended ("K2", "K3", ...).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VialId {
    pub code: String,
    pub split: u32,
}

impl VialId {
    #[must_use]
    pub fn new(code: impl Into<String>, split: u32) -> Self {
        let code = code.into();

        Self { code, split }
    }

    /// Parse a persisted vial name back into its structured form.
    ///
    /// This exists only for the persistence boundary, when resuming from an old vial-map CSV —
    /// in-run logic never round-trips identities through their display names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let code = name.trim_end_matches(|c: char| c.is_ascii_digit());
        if code.is_empty() {
            return None;
        }
        let split = if code.len() == name.len() {
            1
        } else {
            name[code.len()..].parse().ok().filter(|&split| split >= 1)?
        };

        Some(Self::new(code, split))
    }
}

impl Display for VialId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.split <= 1 {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}{}", self.code, self.split)
        }
    }
}

/// One physical reagent vial: where it sits, how many residues it can supply, and the prepared
/// quantities (already rounded for reporting).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct VialEntry {
    pub id: VialId,
    pub rack: u32,
    pub position: u32,
    pub occurrences: u32,
    pub mmol: Decimal,
    pub mass_g: Decimal,
    pub volume_ml: Decimal,
}

/// The vial layout for one plan, in allocation order, with a per-code index so the builder can
/// enumerate a residue's vials in ascending split order without any name matching.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct VialMap {
    entries: Vec<VialEntry>,
    by_code: HashMap<String, Vec<usize>>,
}

impl VialMap {
    #[must_use]
    pub fn from_entries(entries: Vec<VialEntry>) -> Self {
        let mut by_code: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            by_code.entry(entry.id.code.clone()).or_default().push(index);
        }
        for indices in by_code.values_mut() {
            indices.sort_unstable_by_key(|&index| entries[index].id.split);
        }

        Self { entries, by_code }
    }

    #[must_use]
    pub fn entries(&self) -> &[VialEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vials able to supply `code`, in ascending split order
    pub fn vials_for(&self, code: &str) -> impl Iterator<Item = &VialEntry> {
        self.by_code
            .get(code)
            .into_iter()
            .flatten()
            .map(|&index| &self.entries[index])
    }
}

/// The next free autosampler slot. Positions are handed out densely and roll over to position 1
/// of the next rack once a rack is full.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct RackCursor {
    rack: u32,
    position: u32,
}

impl RackCursor {
    #[must_use]
    pub const fn new(rack: u32, position: u32) -> Self {
        Self { rack, position }
    }

    #[must_use]
    pub const fn start() -> Self {
        Self::new(1, 1)
    }

    pub fn next_slot(&mut self, rack_size: u32) -> (u32, u32) {
        let slot = (self.rack, self.position);
        self.position += 1;
        if self.position > rack_size {
            self.rack += 1;
            self.position = 1;
        }
        slot
    }
}

// Module Tests ========================================================================================================
