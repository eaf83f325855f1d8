mod common;

use molql::core::element::Loci;
use molql::engine::config::QueryConfig;
use molql::engine::script::to_script_expression;
use molql::workflows::select;

#[test]
fn printed_scripts_reselect_the_same_loci() {
    let config = QueryConfig::default();
    for structure in [common::structure(), common::assembly()] {
        for loci in common::loci_family(&structure) {
            let text = to_script_expression(&loci).to_string();
            let result = select::run(&structure, &text, &config).unwrap();
            assert!(
                Loci::are_equal(&result.loci, &loci),
                "script did not reproduce its loci: {text}"
            );
        }
    }
}

#[test]
fn scripts_are_stable_across_a_round_trip() {
    let structure = common::assembly();
    let config = QueryConfig::default();
    let first = select::run(
        &structure,
        "(include-surroundings :0 (atom-groups :residue-test (= label_comp_id ATP)) :radius 4 :as-whole-residues true)",
        &config,
    )
    .unwrap();
    let second = select::run(&structure, &first.script.to_string(), &config).unwrap();
    assert_eq!(second.script, first.script);
    assert_eq!(second.query, first.query);
}
