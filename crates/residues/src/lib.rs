//! Amino-acid reference data and peptide sequence tokenization

pub mod errors;
mod table;
mod tokenizer;

pub use errors::{ResidueError, Result};
pub use table::{AminoAcid, AminoAcidTable};
pub use tokenizer::{Tokenization, tokenize};
