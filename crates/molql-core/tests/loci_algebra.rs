mod common;

use molql::core::element::Loci;
use molql::core::sets::{Interval, OrderedSet};

#[test]
fn union_with_none_is_identity() {
    for structure in [common::structure(), common::assembly()] {
        let none = Loci::none(&structure);
        for a in common::loci_family(&structure) {
            assert!(Loci::are_equal(&a.union(&none), &a));
            assert!(Loci::are_equal(&none.union(&a), &a));
        }
    }
}

#[test]
fn union_is_commutative() {
    let structure = common::assembly();
    let family = common::loci_family(&structure);
    for a in &family {
        for b in &family {
            assert!(Loci::are_equal(&a.union(b), &b.union(a)));
        }
    }
}

#[test]
fn subtract_undoes_a_disjoint_union() {
    let structure = common::structure();
    let a = common::loci(&structure, &[(0, (0..10).collect()), (2, vec![0])]);
    let b = common::loci(&structure, &[(0, (10..60).step_by(3).collect()), (1, vec![0, 1])]);
    assert!(!Loci::are_intersecting(&a, &b));
    assert!(Loci::are_equal(&a.union(&b).subtract(&b), &a));
    assert!(Loci::are_equal(&a.union(&b).subtract(&a), &b));
}

#[test]
fn extending_to_whole_residues_never_shrinks_the_boundary() {
    let structure = common::assembly();
    for loci in common::loci_family(&structure) {
        let before = loci.get_boundary();
        let after = loci.extend_to_whole_residues().get_boundary();
        assert!(after.bounding_box.contains_box(&before.bounding_box));
        assert!(loci.is_subset(&loci.extend_to_whole_residues()));
    }
}

#[test]
fn overlapping_intervals_union_to_an_interval() {
    let union = OrderedSet::of_range(0, 5).union(&OrderedSet::of_range(3, 8));
    assert!(union.is_interval());
    assert_eq!(union, OrderedSet::Interval(Interval::of_range(0, 8)));
}

#[test]
fn empty_loci_do_not_intersect() {
    let structure = common::structure();
    let none = Loci::none(&structure);
    assert!(!Loci::are_intersecting(&none, &none));
    assert!(!Loci::are_intersecting(&none, &Loci::all(&structure)));
}

#[test]
fn whole_chain_extension_covers_the_chain() {
    let structure = common::structure();
    let one_atom = common::loci(&structure, &[(0, vec![7])]);
    let chain = one_atom.extend_to_whole_chains();
    assert_eq!(chain.size(), 60);
    assert_eq!(one_atom.extend_to_whole_residues().size(), 3);
}
