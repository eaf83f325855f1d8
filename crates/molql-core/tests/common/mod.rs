#![allow(dead_code)]

use molql::core::element::{Loci, LociElement};
use molql::core::sets::OrderedSet;
use molql::core::structure::model::{AtomRecord, EntityType};
use molql::core::structure::{
    BondOrder, LinkFlags, Model, ModelBuilder, Structure, SymmetryOperator,
};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};
use std::sync::Arc;

pub const CHAIN_RESIDUES: i32 = 20;

fn position(i: usize) -> Point3<f64> {
    Point3::new(1.5 * i as f64, (i % 4) as f64, 0.5 * (i % 7) as f64)
}

/// Chain A: twenty three-atom residues (60 atoms, backbone bonded).
/// Chain B: one ATP ligand. Chain C: three waters.
pub fn model() -> Arc<Model> {
    let mut builder = ModelBuilder::new("FIXTURE", 1);
    let mut serial = 0usize;
    let mut add = |builder: &mut ModelBuilder, name: &str, element: &str| {
        let index = builder
            .add_atom(AtomRecord::new(serial as i32 + 1, name, element, position(serial)))
            .unwrap();
        serial += 1;
        index
    };

    let protein = builder.add_entity("1", EntityType::Polymer, "protein");
    builder.start_chain("A", "A", protein).unwrap();
    let mut previous_c = None;
    for seq in 1..=CHAIN_RESIDUES {
        let comp = if seq % 2 == 0 { "GLY" } else { "ALA" };
        builder.start_residue(comp, seq, seq, "").unwrap();
        let n = add(&mut builder, "N", "N");
        let ca = add(&mut builder, "CA", "C");
        let c = add(&mut builder, "C", "C");
        builder.add_bond(n, ca, BondOrder::Single, LinkFlags::COVALENT);
        builder.add_bond(ca, c, BondOrder::Single, LinkFlags::COVALENT);
        if let Some(prev) = previous_c {
            builder.add_bond(prev, n, BondOrder::Single, LinkFlags::COVALENT);
        }
        previous_c = Some(c);
    }

    let ligand = builder.add_entity("2", EntityType::NonPolymer, "ATP");
    builder.start_chain("B", "B", ligand).unwrap();
    builder.start_residue("ATP", 1, 101, "").unwrap();
    let pg = add(&mut builder, "PG", "P");
    let o1 = add(&mut builder, "O1G", "O");
    builder.add_bond(pg, o1, BondOrder::Double, LinkFlags::COVALENT);

    let water = builder.add_entity("3", EntityType::Water, "water");
    builder.start_chain("C", "C", water).unwrap();
    for seq in 1..=3 {
        builder.start_residue("HOH", seq, 200 + seq, "").unwrap();
        add(&mut builder, "O", "O");
    }

    Arc::new(builder.build().unwrap())
}

pub fn structure() -> Arc<Structure> {
    Structure::from_model(model())
}

/// The fixture model plus one translated copy.
pub fn assembly() -> Arc<Structure> {
    let shift = Isometry3::from_parts(
        Translation3::new(40.0, -5.0, 12.0),
        UnitQuaternion::identity(),
    );
    Structure::from_model_with_operators(
        model(),
        &[SymmetryOperator::identity(), SymmetryOperator::new("2_555", shift)],
    )
}

/// Loci from unit-local positions per unit position.
pub fn loci(structure: &Arc<Structure>, picks: &[(usize, Vec<u32>)]) -> Loci {
    let elements = picks
        .iter()
        .map(|(unit, indices)| LociElement {
            unit: structure.units()[*unit].clone(),
            indices: OrderedSet::of_unsorted(indices.clone()),
        })
        .collect();
    Loci::new(structure.clone(), elements)
}

/// A deterministic family of loci over `structure`: empty, whole, strided,
/// runs mixed with loose members, and single elements.
pub fn loci_family(structure: &Arc<Structure>) -> Vec<Loci> {
    let mut family = vec![Loci::none(structure), Loci::all(structure)];
    for stride in [2u32, 3, 7] {
        let picks = structure
            .units()
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                let n = unit.element_count() as u32;
                (i, (0..n).filter(|k| (k + i as u32) % stride == 0).collect::<Vec<u32>>())
            })
            .collect::<Vec<_>>();
        family.push(loci(structure, &picks));
    }
    family.push(loci(structure, &[(0, (0..15).chain([30, 31, 45]).collect())]));
    family.push(loci(structure, &[(0, vec![59]), (2, vec![1])]));
    family
}
