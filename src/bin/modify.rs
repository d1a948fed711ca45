use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use replan::ReplanError;
use residues::{AminoAcidTable, ResidueError, tokenize};
use rustyline::DefaultEditor;
use serde::de::DeserializeOwned;
use thiserror::Error;
use vialplan::{PlanConfig, SynthesisStep, VialRecord};

/// Incremental re-planner: loads a previously written vial map and synthesis plan, prompts for
/// the modified sequence, and appends only the changed residues to the vial layout before
/// rebuilding the plan.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Amino-acid reference table (AA,MW,Name)
    #[arg(short, long, default_value = "amino_acids.csv")]
    table: PathBuf,
    /// The vial map the original plan was written with
    #[arg(long, default_value = "vial_map.csv")]
    vial_map: PathBuf,
    /// The synthesis plan to recover the original sequence from
    #[arg(long, default_value = "synthesis_plan.csv")]
    synthesis_plan: PathBuf,
    /// Directory for the updated CSVs
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Debug, Diagnostic, Error)]
enum ToolError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Residue(#[from] ResidueError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Replan(#[from] ReplanError),

    #[error("failed to read or write {path}")]
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
    match load_inputs(&args) {
        Ok((table, old_steps, old_vials)) => run(&args, &table, &old_steps, &old_vials),
        Err(diagnostic) => render_error(diagnostic),
    }
}

fn run(args: &Args, table: &AminoAcidTable, old_steps: &[SynthesisStep], old_vials: &[VialRecord]) {
    let config = PlanConfig::default();
    let mut rl = DefaultEditor::new().unwrap();
    while let Ok(sequence) = rl.readline("Modified sequence: ") {
        if sequence.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(&sequence).unwrap();
        match replan_sequence(table, &config, old_steps, old_vials, &sequence, &args.output_dir) {
            Ok(summary) => print!("{summary}"),
            Err(diagnostic) => render_error(diagnostic),
        }
    }
}

fn load_inputs(args: &Args) -> Result<(AminoAcidTable, Vec<SynthesisStep>, Vec<VialRecord>), ToolError> {
    let table = AminoAcidTable::from_csv(fs::read_to_string(&args.table)?)?;
    let old_steps = read_records(&args.synthesis_plan, "synthesis plan")?;
    let old_vials = read_records(&args.vial_map, "vial map")?;

    Ok((table, old_steps, old_vials))
}

fn replan_sequence(
    table: &AminoAcidTable,
    config: &PlanConfig,
    old_steps: &[SynthesisStep],
    old_vials: &[VialRecord],
    sequence: &str,
    output_dir: &Path,
) -> Result<String, ToolError> {
    // Scientists may mark substituted residues with a trailing '*'; the marker is not a code
    let tokenization = tokenize(table, &sequence.replace('*', ""))?;

    let old_sequence = replan::recover_sequence(old_steps)?;
    let changed = replan::diff(&old_sequence, &tokenization.original);

    let combined = replan::extend_vial_map(table, old_vials, &changed, config)?;
    let plan = replan::extend_plan(&combined, &tokenization.synthesis, config)?;

    write_records(&output_dir.join("vial_map_updated.csv"), combined.clone())?;
    write_records(&output_dir.join("synthesis_plan_updated.csv"), plan.steps.clone())?;

    let mut buf = String::new();
    writeln!(buf, "Changed Residues: {}", changed.len()).unwrap();
    writeln!(
        buf,
        "Appended Vials: {}",
        combined.len() - old_vials.len()
    )
    .unwrap();
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
        "Wrote vial_map_updated.csv and synthesis_plan_updated.csv to {}",
        output_dir.display()
    )
    .unwrap();
    writeln!(buf).unwrap();

    Ok(buf)
}

fn read_records<R: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<R>, ToolError> {
    if !path.exists() {
        return Err(ReplanError::MissingPriorPlan {
            what: what.to_owned(),
        }
        .into());
    }

    let csv_error = |source| ToolError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    reader
        .deserialize()
        .collect::<Result<_, _>>()
        .map_err(csv_error)
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
