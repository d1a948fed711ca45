use std::path::PathBuf;

use clap::Parser;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use residues::{AminoAcid, AminoAcidTable, ResidueError};
use rust_decimal::Decimal;
use rustyline::DefaultEditor;
use thiserror::Error;

/// Append a new amino-acid code to the reference table.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Amino-acid reference table (AA,MW,Name)
    #[arg(short, long, default_value = "amino_acids.csv")]
    table: PathBuf,
}

#[derive(Debug, Diagnostic, Error)]
enum ToolError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Residue(#[from] ResidueError),

    #[error("molecular weight must be a positive number, got {input:?}")]
    InvalidWeight { input: String },

    #[error("failed to rewrite {path}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn main() {
    let args = Args::parse();
    match add_amino_acid(&args) {
        Ok(summary) => print!("{summary}"),
        Err(diagnostic) => render_error(diagnostic),
    }
}

fn add_amino_acid(args: &Args) -> Result<String, ToolError> {
    let mut rl = DefaultEditor::new().unwrap();
    let Ok(code) = rl.readline("Amino-acid code: ") else {
        return Ok(String::new());
    };
    let Ok(weight) = rl.readline("Molecular weight (g/mol): ") else {
        return Ok(String::new());
    };
    let Ok(name) = rl.readline("Descriptive name (optional): ") else {
        return Ok(String::new());
    };

    let molecular_weight = parse_weight(&weight)?;
    let name = match name.trim() {
        "" => None,
        name => Some(name.to_owned()),
    };
    let amino_acid = AminoAcid {
        code: code.trim().to_owned(),
        molecular_weight,
        name,
    };

    let csv_error = |source| ToolError::Csv {
        path: args.table.display().to_string(),
        source,
    };

    let mut records: Vec<AminoAcid> = if args.table.exists() {
        let mut reader = csv::Reader::from_path(&args.table).map_err(csv_error)?;
        reader
            .deserialize()
            .collect::<Result<_, _>>()
            .map_err(csv_error)?
    } else {
        Vec::new()
    };
    records.push(amino_acid.clone());

    // Validates the amended table as a whole: duplicate codes, empty codes, and codes ending
    // in digits are all rejected before anything is written
    AminoAcidTable::from_records(records.iter().cloned())?;

    let mut writer = csv::Writer::from_path(&args.table).map_err(csv_error)?;
    for record in &records {
        writer.serialize(record).map_err(csv_error)?;
    }
    writer.flush()?;

    Ok(format!(
        "Added {} ({} g/mol) to {}\n",
        amino_acid.code,
        amino_acid.molecular_weight,
        args.table.display()
    ))
}

fn parse_weight(input: &str) -> Result<Decimal, ToolError> {
    let invalid = || ToolError::InvalidWeight {
        input: input.trim().to_owned(),
    };
    let weight: Decimal = input.trim().parse().map_err(|_| invalid())?;
    if weight <= Decimal::ZERO {
        return Err(invalid());
    }

    Ok(weight)
}

fn render_error(diagnostic: impl Into<Box<dyn Diagnostic + 'static>>) {
    let mut buf = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode())
        .render_report(&mut buf, diagnostic.into().as_ref())
        .unwrap();
    println!("{buf}");
}
