//! Shared model and structure fixtures for unit tests.

use super::bonds::{BondOrder, LinkFlags};
use super::model::{AtomRecord, CoarseElement, EntityType, Model, ModelBuilder};
use super::properties::MissingResidue;
use super::structure::Structure;
use super::unit::SymmetryOperator;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};
use std::collections::HashMap;
use std::sync::Arc;

/// Atom `i` of a fixture sits on a skewed line so that every coordinate axis
/// varies and distinct atoms are at least 1.2 apart.
pub fn fixture_position(i: usize) -> Point3<f64> {
    Point3::new(1.2 * i as f64, 0.8 * (i % 3) as f64, 0.6 * (i % 5) as f64)
}

fn element_of(name: &str) -> &str {
    match name {
        "SE" => "SE",
        _ => &name[..1],
    }
}

struct ResidueSpec {
    comp_id: &'static str,
    seq_id: i32,
    atoms: &'static [&'static str],
}

/// Chain A: ALA 1, GLY 2, SER 3, MSE 4 (polymer, residue 5 missing).
/// Chain B: one NAG bonded to SER 3 OG (branched).
/// Chain C: two waters.
pub fn create_standard_test_model() -> Arc<Model> {
    let chains: [(&str, EntityType, &[ResidueSpec]); 3] = [
        (
            "A",
            EntityType::Polymer,
            &[
                ResidueSpec { comp_id: "ALA", seq_id: 1, atoms: &["N", "CA", "C", "O", "CB"] },
                ResidueSpec { comp_id: "GLY", seq_id: 2, atoms: &["N", "CA", "C", "O"] },
                ResidueSpec { comp_id: "SER", seq_id: 3, atoms: &["N", "CA", "C", "O", "CB", "OG"] },
                ResidueSpec { comp_id: "MSE", seq_id: 4, atoms: &["N", "CA", "C", "O", "SE"] },
            ],
        ),
        (
            "B",
            EntityType::Branched,
            &[ResidueSpec { comp_id: "NAG", seq_id: 1, atoms: &["C1", "C2", "O5"] }],
        ),
        (
            "C",
            EntityType::Water,
            &[
                ResidueSpec { comp_id: "HOH", seq_id: 1, atoms: &["O"] },
                ResidueSpec { comp_id: "HOH", seq_id: 2, atoms: &["O"] },
            ],
        ),
    ];

    let mut builder = ModelBuilder::new("TEST", 1);
    let mut atom_index: HashMap<(&str, i32, &str), u32> = HashMap::new();
    let mut serial = 0usize;
    for (entity_number, (asym_id, entity_type, residues)) in chains.iter().enumerate() {
        let entity = builder.add_entity(&(entity_number + 1).to_string(), *entity_type, asym_id);
        builder.start_chain(asym_id, asym_id, entity).unwrap();
        for residue in residues.iter() {
            builder
                .start_residue(residue.comp_id, residue.seq_id, residue.seq_id, "")
                .unwrap();
            for &name in residue.atoms {
                let mut atom =
                    AtomRecord::new(serial as i32 + 1, name, element_of(name), fixture_position(serial));
                atom.b_iso = 10.0 + serial as f64;
                let index = builder.add_atom(atom).unwrap();
                atom_index.insert((*asym_id, residue.seq_id, name), index);
                serial += 1;
            }
        }
    }

    let intra: &[(&str, &str)] = &[
        ("N", "CA"),
        ("CA", "C"),
        ("C", "O"),
        ("CA", "CB"),
        ("CB", "OG"),
        ("CA", "SE"),
    ];
    for seq_id in 1..=4 {
        for (a, b) in intra {
            if let (Some(&x), Some(&y)) = (
                atom_index.get(&("A", seq_id, *a)),
                atom_index.get(&("A", seq_id, *b)),
            ) {
                builder.add_bond(x, y, BondOrder::Single, LinkFlags::COVALENT);
            }
        }
        if let (Some(&c), Some(&n)) = (
            atom_index.get(&("A", seq_id, "C")),
            atom_index.get(&("A", seq_id + 1, "N")),
        ) {
            builder.add_bond(c, n, BondOrder::Single, LinkFlags::COVALENT);
        }
    }
    let nag = |name| atom_index[&("B", 1, name)];
    builder.add_bond(nag("C1"), nag("C2"), BondOrder::Single, LinkFlags::COVALENT);
    builder.add_bond(nag("C1"), nag("O5"), BondOrder::Single, LinkFlags::COVALENT);
    builder.add_bond(
        nag("C1"),
        atom_index[&("A", 3, "OG")],
        BondOrder::Single,
        LinkFlags::COVALENT,
    );

    builder
        .add_modified_residue("MSE", "MET", "selenomethionine")
        .add_missing_residue(
            "A",
            5,
            MissingResidue {
                comp_id: "LYS".into(),
                auth_seq_id: 5,
            },
        );

    Arc::new(builder.build().unwrap())
}

pub fn create_standard_test_structure() -> Arc<Structure> {
    Structure::from_model(create_standard_test_model())
}

/// The standard model under the identity and one translated copy.
pub fn create_symmetric_test_structure() -> Arc<Structure> {
    let shift = Isometry3::from_parts(
        Translation3::new(50.0, 3.0, -7.0),
        UnitQuaternion::identity(),
    );
    Structure::from_model_with_operators(
        create_standard_test_model(),
        &[SymmetryOperator::identity(), SymmetryOperator::new("2_555", shift)],
    )
}

/// One atomic chain plus spheres for chains A and B and gaussians for chain A.
pub fn create_coarse_test_model() -> Arc<Model> {
    let mut builder = ModelBuilder::new("COARSE", 1);
    let entity = builder.add_entity("1", EntityType::Polymer, "protein");
    builder.start_chain("A", "A", entity).unwrap();
    builder.start_residue("GLY", 1, 1, "").unwrap();
    for (i, name) in ["N", "CA", "C", "O"].iter().enumerate() {
        builder
            .add_atom(AtomRecord::new(i as i32 + 1, name, &name[..1], fixture_position(i)))
            .unwrap();
    }
    let coarse = |asym: &str, begin: i32, end: i32, slot: usize| CoarseElement {
        entity_index: entity,
        asym_id: asym.to_string(),
        seq_id_begin: begin,
        seq_id_end: end,
        position: fixture_position(slot + 10),
        radius: 3.0,
    };
    builder
        .add_sphere(coarse("A", 2, 4, 0))
        .add_sphere(coarse("A", 5, 9, 1))
        .add_sphere(coarse("A", 10, 12, 2))
        .add_sphere(coarse("B", 1, 5, 3))
        .add_sphere(coarse("B", 6, 8, 4))
        .add_gaussian(coarse("A", 2, 9, 5))
        .add_gaussian(coarse("A", 10, 20, 6));
    Arc::new(builder.build().unwrap())
}

pub fn create_coarse_test_structure() -> Arc<Structure> {
    Structure::from_model(create_coarse_test_model())
}
