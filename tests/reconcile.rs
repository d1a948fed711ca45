//! End-to-end: plan a sequence, persist it as CSV, recover and modify it, and check the
//! extended plan against the instrument's schema contract.

use residues::{AminoAcidTable, tokenize};
use vialplan::{
    DeprotectionAllocation, PlanConfig, RackCursor, SynthesisStep, VialRecord, allocate, build,
};

fn table() -> AminoAcidTable {
    AminoAcidTable::from_csv("AA,MW\nA,71.08\nC,103.14\nT,101.10\nQ,128.13\nK,128.17\n").unwrap()
}

fn to_csv<R: serde::Serialize>(records: &[R]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record).unwrap();
    }
    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

fn from_csv<R: serde::de::DeserializeOwned>(text: &str) -> Vec<R> {
    csv::Reader::from_reader(text.as_bytes())
        .deserialize()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn persisted_csvs_use_the_instrument_column_names() {
    let table = table();
    let config = PlanConfig::default();
    let tokenization = tokenize(&table, "TTCQ").unwrap();
    let vial_map = allocate(&table, &tokenization.synthesis, &config, RackCursor::start()).unwrap();
    let deprotection = DeprotectionAllocation::for_sequence(tokenization.len(), &config).unwrap();
    let plan = build(&tokenization.synthesis, &vial_map, &deprotection, &config);

    let vial_csv = to_csv(&vial_map.records());
    assert!(vial_csv.starts_with(
        "Amino Acid,Rack,Position,Occurrences,mmol,Mass (g),Volume (mL)\n"
    ));

    let plan_csv = to_csv(&plan.steps);
    assert!(plan_csv.starts_with(
        "NAME,FLOW RATE A (ml/min),FLOW RATE B (ml/min),FLOW RATE D (ml/min),RESIDENCE 2,\
         AUTOSAMPLER SITE A,REAGENT CONC A (M),AUTOSAMPLER SITE B,REAGENT CONC B (M),\
         DO NOT FILL,REAGENT USE (ml),REACTOR TEMPERATURE 2 (C),REACTOR TEMPERATURE 3 (C),\
         WHOLE PEAK,DO NOT COLLECT,CLEANING FLOW RATE (ml/min),MANUAL CLEAN (ml)\n"
    ));
}

#[test]
fn modification_round_trips_through_persisted_csvs() {
    let table = table();
    let config = PlanConfig::default();

    // Original run, as the `plan` tool would persist it
    let original = tokenize(&table, "TTCQ").unwrap();
    let vial_map = allocate(&table, &original.synthesis, &config, RackCursor::start()).unwrap();
    let deprotection = DeprotectionAllocation::for_sequence(original.len(), &config).unwrap();
    let plan = build(&original.synthesis, &vial_map, &deprotection, &config);

    let vial_csv = to_csv(&vial_map.records());
    let plan_csv = to_csv(&plan.steps);

    // Modification run, starting from nothing but the persisted rows
    let old_steps: Vec<SynthesisStep> = from_csv(&plan_csv);
    let old_vials: Vec<VialRecord> = from_csv(&vial_csv);

    let old_sequence = replan::recover_sequence(&old_steps).unwrap();
    assert_eq!(old_sequence, ["T", "T", "C", "Q"]);

    let modified = tokenize(&table, "TTCK").unwrap();
    let changed = replan::diff(&old_sequence, &modified.original);
    assert_eq!(changed, ["K"]);

    let combined = replan::extend_vial_map(&table, &old_vials, &changed, &config).unwrap();
    assert_eq!(&combined[..old_vials.len()], &old_vials[..]);
    assert_eq!(combined.len(), old_vials.len() + 1);

    let new_plan = replan::extend_plan(&combined, &modified.synthesis, &config).unwrap();
    assert!(new_plan.is_submittable());
    assert_eq!(new_plan.steps.len(), 8);
    assert_eq!(new_plan.steps[0].name, "K1");
}
