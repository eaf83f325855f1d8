//! # Script Expressions
//!
//! Turns a [`Loci`] back into query text that selects exactly the same
//! elements when run against the same structure.
//!
//! Elements are grouped per operator (and per model and unit kind when the
//! structure has more than one), their source indices split into long runs
//! and loose members, and operators sharing an identical index pattern are
//! folded into one `atom-groups` clause.

use super::config::DEFAULT_SCRIPT_RANGE_CUTOFF;
use super::expression::builder::{apply, apply_named, call, num, string};
use super::expression::Expression;
use super::symbols::names;
use crate::core::element::loci::Loci;
use crate::core::element::query::split_runs;
use crate::core::sets::{SortedArray, SortedRanges};
use crate::core::structure::UnitKind;
use crate::core::utils::hash::hash2;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    model_num: i32,
    kind: UnitKind,
    operator: String,
}

struct Clause {
    model_num: i32,
    kind: UnitKind,
    operators: Vec<String>,
    set: SortedArray,
    ranges: SortedRanges,
}

pub fn to_script_expression(loci: &Loci) -> Expression {
    to_script_expression_with_cutoff(loci, DEFAULT_SCRIPT_RANGE_CUTOFF)
}

pub fn to_script_expression_with_cutoff(loci: &Loci, range_cutoff: usize) -> Expression {
    let structure = loci.structure();
    let test_model = structure.models().len() > 1;
    let test_kind = structure.unit_kinds().len() > 1;

    let mut keys: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey, Vec<u32>)> = Vec::new();
    for element in loci.elements() {
        let unit = &element.unit;
        let key = GroupKey {
            model_num: unit.model().model_num(),
            kind: unit.kind(),
            operator: unit.operator().name.clone(),
        };
        let slot = *keys.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        let elements = unit.elements();
        groups[slot]
            .1
            .extend(element.indices.iter().map(|i| elements[i as usize]));
    }

    let mut clauses: Vec<Clause> = Vec::new();
    let mut buckets: HashMap<i32, Vec<usize>> = HashMap::new();
    for (key, mut values) in groups {
        values.sort_unstable();
        values.dedup();
        let (set, ranges) = split_runs(&values, range_cutoff);
        let bucket = buckets
            .entry(hash2(set.hash_code(), ranges.hash_code()))
            .or_default();
        let existing = bucket.iter().copied().find(|&i| {
            let c = &clauses[i];
            c.model_num == key.model_num && c.kind == key.kind && c.set == set && c.ranges == ranges
        });
        match existing {
            Some(i) => clauses[i].operators.push(key.operator),
            None => {
                bucket.push(clauses.len());
                clauses.push(Clause {
                    model_num: key.model_num,
                    kind: key.kind,
                    operators: vec![key.operator],
                    set,
                    ranges,
                });
            }
        }
    }
    debug!(clauses = clauses.len(), "Built script expression");

    let mut parts: Vec<Expression> = clauses
        .iter()
        .map(|c| clause_expression(c, test_model, test_kind))
        .collect();
    match parts.len() {
        0 => call(names::GENERATOR_EMPTY),
        1 => parts.remove(0),
        _ => apply(names::COMBINATOR_MERGE, parts),
    }
}

fn all_of(mut tests: Vec<Expression>) -> Expression {
    if tests.len() == 1 {
        tests.remove(0)
    } else {
        apply(names::LOGIC_AND, tests)
    }
}

fn any_of(mut tests: Vec<Expression>) -> Expression {
    if tests.len() == 1 {
        tests.remove(0)
    } else {
        apply(names::LOGIC_OR, tests)
    }
}

fn membership(property: &str, values: Vec<Expression>) -> Expression {
    apply(
        names::SET_HAS,
        vec![apply(names::TYPE_SET, values), call(property)],
    )
}

fn clause_expression(clause: &Clause, test_model: bool, test_kind: bool) -> Expression {
    let mut unit_tests = Vec::new();
    unit_tests.push(if let [operator] = clause.operators.as_slice() {
        apply(names::REL_EQ, vec![call(names::PROP_OPERATOR_NAME), string(operator)])
    } else {
        membership(
            names::PROP_OPERATOR_NAME,
            clause.operators.iter().map(|o| string(o)).collect(),
        )
    });
    if test_model {
        unit_tests.push(apply(
            names::REL_EQ,
            vec![call(names::PROP_MODEL_INDEX), num(clause.model_num as f64)],
        ));
    }
    if test_kind {
        unit_tests.push(apply(
            names::REL_EQ,
            vec![call(names::PROP_UNIT_KIND), string(clause.kind.as_str())],
        ));
    }

    let mut atom_tests: Vec<Expression> = clause
        .ranges
        .ranges()
        .map(|(lo, hi)| {
            apply(
                names::REL_IN_RANGE,
                vec![call(names::PROP_SOURCE_INDEX), num(lo as f64), num(hi as f64)],
            )
        })
        .collect();
    match clause.set.as_slice() {
        [] => {}
        [single] => atom_tests.push(apply(
            names::REL_EQ,
            vec![call(names::PROP_SOURCE_INDEX), num(*single as f64)],
        )),
        values => atom_tests.push(membership(
            names::PROP_SOURCE_INDEX,
            values.iter().map(|&v| num(v as f64)).collect(),
        )),
    }

    apply_named(
        names::GENERATOR_ATOM_GROUPS,
        [
            ("unit-test", all_of(unit_tests)),
            ("atom-test", any_of(atom_tests)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::testing::{
        create_coarse_test_structure, create_standard_test_structure,
        create_symmetric_test_structure,
    };
    use crate::core::structure::{ElementIndex, Structure, StructureSubsetBuilder};
    use crate::engine::compiler::compile;
    use crate::engine::config::QueryConfig;
    use crate::engine::context::QueryContext;
    use crate::engine::parser::parse;
    use std::sync::Arc;

    fn loci_of(structure: &Arc<Structure>, picks: &[(u32, &[ElementIndex])]) -> Loci {
        let mut builder = StructureSubsetBuilder::new(structure.clone());
        for (unit, elements) in picks {
            builder.add_elements(*unit, elements);
        }
        Loci::from_structure(structure, &builder.build())
    }

    /// Prints the script, parses it back and runs it on the loci's structure.
    fn replay(loci: &Loci) -> Loci {
        let text = to_script_expression(loci).to_string();
        let query = compile(&parse(&text).unwrap()).unwrap();
        let mut ctx = QueryContext::new(loci.structure().clone(), QueryConfig::default());
        query.run(&mut ctx).unwrap().to_loci()
    }

    mod round_trip {
        use super::*;

        #[test]
        fn scattered_atoms() {
            let structure = create_standard_test_structure();
            let loci = loci_of(&structure, &[(0, &[1, 6, 10, 16]), (2, &[24])]);
            assert!(Loci::are_equal(&replay(&loci), &loci));
        }

        #[test]
        fn long_runs_become_ranges() {
            let structure = create_standard_test_structure();
            let chain: Vec<u32> = (0..20).collect();
            let loci = loci_of(&structure, &[(0, &chain[..]), (1, &[21])]);
            let text = to_script_expression(&loci).to_string();
            assert!(text.contains(names::REL_IN_RANGE));
            assert!(Loci::are_equal(&replay(&loci), &loci));
        }

        #[test]
        fn symmetry_copies_with_one_pattern_share_a_clause() {
            let structure = create_symmetric_test_structure();
            let loci = loci_of(&structure, &[(0, &[0, 1, 2]), (3, &[0, 1, 2])]);
            let expression = to_script_expression(&loci);
            assert_eq!(expression.head_name(), Some(names::GENERATOR_ATOM_GROUPS));
            assert!(Loci::are_equal(&replay(&loci), &loci));
        }

        #[test]
        fn symmetry_copies_with_different_patterns() {
            let structure = create_symmetric_test_structure();
            let loci = loci_of(&structure, &[(1, &[20]), (3, &[4, 5])]);
            let expression = to_script_expression(&loci);
            assert_eq!(expression.head_name(), Some(names::COMBINATOR_MERGE));
            assert!(Loci::are_equal(&replay(&loci), &loci));
        }

        #[test]
        fn mixed_unit_kinds_are_kept_apart() {
            let structure = create_coarse_test_structure();
            let loci = loci_of(&structure, &[(0, &[0, 1]), (1, &[0, 1])]);
            let text = to_script_expression(&loci).to_string();
            assert!(text.contains(names::PROP_UNIT_KIND));
            assert!(Loci::are_equal(&replay(&loci), &loci));
        }

        #[test]
        fn whole_structure() {
            let structure = create_standard_test_structure();
            let loci = Loci::all(&structure);
            assert!(Loci::are_equal(&replay(&loci), &loci));
        }
    }

    #[test]
    fn empty_loci_is_the_empty_generator() {
        let structure = create_standard_test_structure();
        let loci = Loci::none(&structure);
        assert_eq!(to_script_expression(&loci), call(names::GENERATOR_EMPTY));
        assert!(replay(&loci).is_empty());
    }

    #[test]
    fn cutoff_controls_range_emission() {
        let structure = create_standard_test_structure();
        let loci = loci_of(&structure, &[(0, &[0, 1, 2, 3])]);
        let loose = to_script_expression_with_cutoff(&loci, 12).to_string();
        assert!(!loose.contains(names::REL_IN_RANGE));
        let ranged = to_script_expression_with_cutoff(&loci, 2).to_string();
        assert!(ranged.contains(names::REL_IN_RANGE));
    }
}
