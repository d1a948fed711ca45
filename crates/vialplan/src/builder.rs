// External Crate Imports
use ahash::{HashMap, HashMapExt};

// Local Crate Imports
use crate::{
    config::PlanConfig,
    deprotection::DeprotectionAllocation,
    records::SynthesisStep,
    vial::{VialId, VialMap},
};

// Public API ==========================================================================================================

/// A per-residue vial exhaustion. The corresponding plan row is an ERROR placeholder and the
/// walk continues, but a plan carrying any of these must not be sent to the instrument.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ResidueFailure {
    pub synthesis_position: usize,
    pub code: String,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SynthesisPlan {
    pub steps: Vec<SynthesisStep>,
    pub failures: Vec<ResidueFailure>,
}

impl SynthesisPlan {
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Walk the synthesis-order tokens, consuming vial capacity and deprotection uses, and emit one
/// (coupling, deprotection) step pair per residue.
///
/// Usage counters are locals of this one call, so the builder is a pure function — repeated
/// calls over the same inputs yield the same plan.
#[must_use]
pub fn build(
    synthesis_tokens: &[String],
    vial_map: &VialMap,
    deprotection: &DeprotectionAllocation,
    config: &PlanConfig,
) -> SynthesisPlan {
    let mut steps = Vec::with_capacity(2 * synthesis_tokens.len());
    let mut failures = Vec::new();
    let mut vial_uses: HashMap<VialId, u32> = HashMap::new();
    let mut deprotection_uses = 0;

    for (index, code) in synthesis_tokens.iter().enumerate() {
        let synthesis_position = index + 1;
        let deprotection_site = deprotection.position_for(deprotection_uses);

        let assigned = vial_map
            .vials_for(code)
            .find(|vial| vial_uses.get(&vial.id).copied().unwrap_or(0) < vial.occurrences);

        let Some(vial) = assigned else {
            steps.push(SynthesisStep::failure(code));
            failures.push(ResidueFailure {
                synthesis_position,
                code: code.clone(),
            });
            continue;
        };

        *vial_uses.entry(vial.id.clone()).or_insert(0) += 1;
        // Both rows of the pair reference the one deprotection site selected above, even if
        // the usage counter would land the second row on the next vial
        steps.push(SynthesisStep::coupling(
            code,
            synthesis_position,
            vial.position,
            deprotection_site,
            &config.step,
        ));
        steps.push(SynthesisStep::deprotection(
            synthesis_position,
            vial.position,
            deprotection_site,
            &config.step,
        ));
        deprotection_uses += 1;
    }

    SynthesisPlan { steps, failures }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use residues::AminoAcidTable;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{allocator::allocate, vial::RackCursor};

    static TABLE: LazyLock<AminoAcidTable> = LazyLock::new(|| {
        AminoAcidTable::from_csv("AA,MW\nA,71.08\nC,103.14\nT,101.10\n").unwrap()
    });

    fn tokens(codes: &[&str]) -> Vec<String> {
        codes.iter().map(ToString::to_string).collect()
    }

    fn plan_for(synthesis: &[&str]) -> SynthesisPlan {
        let config = PlanConfig::default();
        let synthesis = tokens(synthesis);
        let vial_map = allocate(&TABLE, &synthesis, &config, RackCursor::start()).unwrap();
        let deprotection =
            DeprotectionAllocation::for_sequence(synthesis.len(), &config).unwrap();
        build(&synthesis, &vial_map, &deprotection, &config)
    }

    #[test]
    fn plan_has_two_alternating_rows_per_residue() {
        let plan = plan_for(&["T", "C", "A", "T"]);
        assert!(plan.is_submittable());
        assert_eq!(plan.steps.len(), 8);

        let names: Vec<_> = plan.steps.iter().map(|step| step.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "T1",
                "deprotection 1",
                "C2",
                "deprotection 2",
                "A3",
                "deprotection 3",
                "T4",
                "deprotection 4",
            ]
        );
    }

    #[test]
    fn pair_rows_share_both_autosampler_sites() {
        let plan = plan_for(&["T", "C", "A"]);
        for pair in plan.steps.chunks(2) {
            let [coupling, deprotection] = pair else {
                panic!("odd row count in a clean plan");
            };
            assert_eq!(coupling.autosampler_site_a, deprotection.autosampler_site_a);
            assert_eq!(coupling.autosampler_site_b, deprotection.autosampler_site_b);
        }
    }

    #[test]
    fn coupling_and_deprotection_rows_carry_the_instrument_constants() {
        let plan = plan_for(&["T"]);
        let [coupling, deprotection] = plan.steps.as_slice() else {
            panic!("expected one step pair");
        };

        assert_eq!(coupling.flow_rate_a, dec!(0.889));
        assert_eq!(coupling.flow_rate_b, dec!(0.444));
        assert_eq!(coupling.flow_rate_d, dec!(0));
        assert_eq!(coupling.reagent_conc_b, dec!(0.24));
        assert!(coupling.residence_2);
        assert!(!coupling.do_not_fill);
        assert!(coupling.do_not_collect);

        assert_eq!(deprotection.flow_rate_a, dec!(0));
        assert_eq!(deprotection.flow_rate_b, dec!(0));
        assert_eq!(deprotection.flow_rate_d, dec!(0.8));
        assert_eq!(deprotection.reagent_conc_b, dec!(0.1));
        assert_eq!(deprotection.reactor_temperature_2, dec!(75));
    }

    #[test]
    fn seventh_occurrence_switches_to_the_split_vial() {
        let plan = plan_for(&["A"; 7]);
        let coupling_sites: Vec<_> = plan
            .steps
            .iter()
            .step_by(2)
            .map(|step| step.autosampler_site_a)
            .collect();
        // Vial A at position 1 serves six residues; the seventh draws from A2 at position 2
        assert_eq!(coupling_sites, [1, 1, 1, 1, 1, 1, 2]);
    }

    #[test]
    fn deprotection_site_advances_after_uses_per_vial() {
        let plan = plan_for(&["A"; 12]);
        let sites: Vec<_> = plan
            .steps
            .iter()
            .step_by(2)
            .map(|step| step.autosampler_site_b)
            .collect();
        // 12 residues over 2 vials = 6 uses per vial
        assert_eq!(sites, [28, 28, 28, 28, 28, 28, 29, 29, 29, 29, 29, 29]);
    }

    #[test]
    fn exhausted_code_yields_a_single_error_row_and_continues() {
        let config = PlanConfig::default();
        let synthesis = tokens(&["A", "A", "C"]);
        // A map for just one A starves the second occurrence
        let vial_map = allocate(&TABLE, &tokens(&["A", "C"]), &config, RackCursor::start()).unwrap();
        let deprotection = DeprotectionAllocation::for_sequence(3, &config).unwrap();

        let plan = build(&synthesis, &vial_map, &deprotection, &config);
        assert!(!plan.is_submittable());
        assert_eq!(
            plan.failures,
            [ResidueFailure {
                synthesis_position: 2,
                code: "A".into(),
            }]
        );

        let names: Vec<_> = plan.steps.iter().map(|step| step.name.as_str()).collect();
        assert_eq!(
            names,
            ["A1", "deprotection 1", "ERROR_A", "C3", "deprotection 3"]
        );
        assert!(plan.steps[2].is_failure());
        assert!(plan.steps[2].do_not_fill);
        assert_eq!(plan.steps[2].autosampler_site_a, 0);
    }

    #[test]
    fn error_rows_do_not_consume_deprotection_uses() {
        let config = PlanConfig {
            // One sample per vial, so every successful residue moves to the next site
            inject_volume: PlanConfig::default().max_volume,
            ..PlanConfig::default()
        };
        let synthesis = tokens(&["A", "A", "C"]);
        let vial_map = allocate(&TABLE, &tokens(&["A", "C"]), &config, RackCursor::start()).unwrap();
        let deprotection = DeprotectionAllocation::for_sequence(3, &config).unwrap();
        assert_eq!(deprotection.uses_per_vial(), 1);

        let plan = build(&synthesis, &vial_map, &deprotection, &config);
        let sites: Vec<_> = plan
            .steps
            .iter()
            .filter(|step| !step.is_failure())
            .step_by(2)
            .map(|step| step.autosampler_site_b)
            .collect();
        // The failed second residue must not advance the counter, so C lands on site 29
        assert_eq!(sites, [28, 29]);
    }

    #[test]
    fn empty_sequence_builds_an_empty_plan() {
        let plan = plan_for(&[]);
        assert!(plan.steps.is_empty());
        assert!(plan.is_submittable());
    }
}
