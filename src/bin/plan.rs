use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use residues::{AminoAcidTable, ResidueError, tokenize};
use rustyline::DefaultEditor;
use thiserror::Error;
use vialplan::{DeprotectionAllocation, PlanConfig, PlanError, RackCursor, allocate, build};

/// Interactive synthesis planner: prompts for a peptide sequence, reports its total mass and
/// vial layout, and writes `vial_map.csv` and `synthesis_plan.csv` for the instrument.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Amino-acid reference table (AA,MW,Name); seeded with the bundled table if missing
    #[arg(short, long, default_value = "amino_acids.csv")]
    table: PathBuf,
    /// Directory for the generated CSVs
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

const BUNDLED_TABLE: &str = include_str!("../../crates/residues/data/amino_acids.csv");

#[derive(Debug, Diagnostic, Error)]
enum ToolError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Residue(#[from] ResidueError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Plan(#[from] PlanError),

    #[error("failed to write {path}")]
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
    let table = match load_table(&args.table) {
        Ok(table) => table,
        Err(diagnostic) => return render_error(diagnostic),
    };
    let config = PlanConfig::default();

    let mut rl = DefaultEditor::new().unwrap();
    while let Ok(sequence) = rl.readline("Sequence: ") {
        if sequence.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(&sequence).unwrap();
        match plan_sequence(&table, &config, &sequence, &args.output_dir) {
            Ok(summary) => print!("{summary}"),
            Err(diagnostic) => render_error(diagnostic),
        }
    }
}

fn plan_sequence(
    table: &AminoAcidTable,
    config: &PlanConfig,
    sequence: &str,
    output_dir: &Path,
) -> Result<String, ToolError> {
    let tokenization = tokenize(table, sequence)?;
    let mass = table.total_mass(&tokenization.original)?;
    let deprotection = DeprotectionAllocation::for_sequence(tokenization.len(), config)?;
    let vial_map = allocate(table, &tokenization.synthesis, config, RackCursor::start())?;
    let plan = build(&tokenization.synthesis, &vial_map, &deprotection, config);

    write_records(&output_dir.join("vial_map.csv"), vial_map.records())?;
    write_records(&output_dir.join("synthesis_plan.csv"), plan.steps.clone())?;

    let mut buf = String::new();
    writeln!(buf, "Residues: {}", tokenization.len()).unwrap();
    writeln!(buf, "Total Mass: {} g/mol", mass.round_dp(2)).unwrap();
    writeln!(buf, "Amino-Acid Vials: {}", vial_map.len()).unwrap();
    writeln!(buf, "Deprotection Vials: {}", deprotection.required_vials()).unwrap();
    for failure in &plan.failures {
        writeln!(
            buf,
            "WARNING: no vial capacity left for {} at synthesis step {}",
            failure.code, failure.synthesis_position
        )
        .unwrap();
    }
    if !plan.is_submittable() {
        writeln!(
            buf,
            "WARNING: the plan contains ERROR rows and must not be sent to the instrument"
        )
        .unwrap();
    }
    writeln!(
        buf,
        "Wrote vial_map.csv and synthesis_plan.csv to {}",
        output_dir.display()
    )
    .unwrap();
    writeln!(buf).unwrap();

    Ok(buf)
}

fn load_table(path: &Path) -> Result<AminoAcidTable, ToolError> {
    // First run: seed the reference table next to the tool so scientists can amend it
    if !path.exists() {
        fs::write(path, BUNDLED_TABLE)?;
    }
    let csv_text = fs::read_to_string(path)?;

    Ok(AminoAcidTable::from_csv(csv_text)?)
}

fn write_records<R: serde::Serialize>(
    path: &Path,
    records: impl IntoIterator<Item = R>,
) -> Result<(), ToolError> {
    let csv_error = |source| ToolError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for record in records {
        writer.serialize(record).map_err(csv_error)?;
    }
    writer.flush()?;

    Ok(())
}

fn render_error(diagnostic: impl Into<Box<dyn Diagnostic + 'static>>) {
    let mut buf = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode())
        .render_report(&mut buf, diagnostic.into().as_ref())
        .unwrap();
    println!("{buf}");
}
