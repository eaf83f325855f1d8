mod common;

use molql::core::element::{Loci, Query, ReplayError};
use molql::core::structure::Structure;
use molql::workflows::replay;

#[test]
fn queries_replay_to_the_same_loci() {
    for structure in [common::structure(), common::assembly()] {
        for loci in common::loci_family(&structure) {
            let query = Query::from_loci(&loci);
            let replayed = query.to_loci(&structure).unwrap();
            assert!(Loci::are_equal(&replayed, &loci));
        }
    }
}

#[test]
fn long_runs_are_stored_as_ranges() {
    let structure = common::structure();
    let indices: Vec<u32> = (0..=12).chain([50, 51]).collect();
    let loci = common::loci(&structure, &[(0, indices)]);
    let query = Query::from_loci(&loci);
    assert_eq!(query.elements.len(), 1);
    let element = &query.elements[0];
    assert_eq!(element.ranges.as_slice(), &[0, 12]);
    assert_eq!(element.set.as_slice(), &[50, 51]);
}

#[test]
fn symmetry_copies_share_one_pattern() {
    let structure = common::assembly();
    let half = structure.units().len() / 2;
    let loci = common::loci(&structure, &[(0, vec![1, 4]), (half, vec![1, 4])]);
    let query = Query::from_loci(&loci);
    assert_eq!(query.elements.len(), 1);
    assert_eq!(query.elements[0].grouped_units.len(), 1);
    assert_eq!(query.elements[0].grouped_units[0].len(), 2);
}

#[test]
fn replay_rejects_a_different_structure() {
    let original = common::structure();
    let loci = common::loci(&original, &[(0, vec![0, 1, 2])]);
    let query = Query::from_loci(&loci);

    let other = common::assembly();
    assert!(matches!(
        query.to_loci(&other),
        Err(ReplayError::IncompatibleStructure { .. })
    ));
    assert!(replay::run(&other, &query).is_err());
}

#[test]
fn unbound_queries_replay_anywhere() {
    let original = common::structure();
    let loci = common::loci(&original, &[(2, vec![0, 2])]);
    let query = Query::from_loci(&loci).for_any_structure();
    let other = common::assembly();
    let replayed = query.to_loci(&other).unwrap();
    assert_eq!(replayed.size(), 2);
}

#[test]
fn child_structures_replay_against_their_root() {
    let structure = common::structure();
    let loci = common::loci(&structure, &[(0, (0..9).collect())]);
    let child = loci.to_structure();
    assert!(std::sync::Arc::ptr_eq(&child.root(), &structure));
    let query = Query::from_loci(&Loci::all(&child));
    let rebuilt: std::sync::Arc<Structure> = query.to_structure(&structure).unwrap();
    assert_eq!(rebuilt.element_count(), 9);
}

#[test]
fn queries_survive_json() {
    let structure = common::assembly();
    for loci in common::loci_family(&structure) {
        let query = Query::from_loci(&loci);
        let json = serde_json::to_string(&query).unwrap();
        let parsed: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, query);
    }
}
