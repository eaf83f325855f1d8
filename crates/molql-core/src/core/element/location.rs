use crate::core::structure::model::{AtomRecord, ChainRecord, CoarseElement, Entity, ResidueRecord};
use crate::core::structure::{ElementIndex, PropertyError, Unit, UnitKind};
use nalgebra::Point3;
use std::sync::Arc;

/// Cursor onto one element of a unit.
///
/// Reused across iteration: generators move it with [`set`](Self::set) instead
/// of allocating a new location per element. Equality is by unit id and
/// element.
#[derive(Debug, Clone)]
pub struct Location {
    pub unit: Arc<Unit>,
    pub element: ElementIndex,
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.unit.id() == other.unit.id() && self.element == other.element
    }
}

impl Eq for Location {}

impl Location {
    pub fn new(unit: Arc<Unit>, element: ElementIndex) -> Self {
        Self { unit, element }
    }

    pub fn set(&mut self, unit: &Arc<Unit>, element: ElementIndex) {
        if !Arc::ptr_eq(&self.unit, unit) {
            self.unit = unit.clone();
        }
        self.element = element;
    }

    pub fn kind(&self) -> UnitKind {
        self.unit.kind()
    }

    fn check_range(&self) -> Result<(), PropertyError> {
        let count = self.unit.model_element_count();
        if (self.element as usize) < count {
            Ok(())
        } else {
            Err(PropertyError::ElementOutOfRange {
                element: self.element,
                count,
            })
        }
    }

    fn require_atomic(&self, property: &'static str) -> Result<(), PropertyError> {
        if self.unit.kind() != UnitKind::Atomic {
            return Err(PropertyError::WrongUnitKind {
                property,
                expected: UnitKind::Atomic,
                found: self.unit.kind(),
            });
        }
        self.check_range()
    }

    fn atom(&self, property: &'static str) -> Result<&AtomRecord, PropertyError> {
        self.require_atomic(property)?;
        Ok(&self.unit.model().atomic().atoms[self.element as usize])
    }

    fn residue(&self, property: &'static str) -> Result<&ResidueRecord, PropertyError> {
        self.require_atomic(property)?;
        let atomic = self.unit.model().atomic();
        Ok(&atomic.residues[atomic.residue_index(self.element) as usize])
    }

    fn chain(&self, property: &'static str) -> Result<&ChainRecord, PropertyError> {
        self.require_atomic(property)?;
        let atomic = self.unit.model().atomic();
        Ok(&atomic.chains[atomic.chain_index(self.element) as usize])
    }

    fn coarse(&self, property: &'static str) -> Result<&CoarseElement, PropertyError> {
        match self.unit.coarse_elements() {
            None => Err(PropertyError::WrongUnitKind {
                property,
                expected: UnitKind::Spheres,
                found: UnitKind::Atomic,
            }),
            Some(elements) => {
                self.check_range()?;
                Ok(&elements[self.element as usize])
            }
        }
    }

    // Available on every unit kind.

    pub fn position(&self) -> Result<Point3<f64>, PropertyError> {
        self.check_range()?;
        Ok(self.unit.position(self.element))
    }

    pub fn vdw_radius(&self) -> Result<f64, PropertyError> {
        self.check_range()?;
        Ok(self.unit.conformation_radius(self.element))
    }

    pub fn source_index(&self) -> ElementIndex {
        self.element
    }

    pub fn operator_name(&self) -> &str {
        &self.unit.operator().name
    }

    pub fn model_num(&self) -> i32 {
        self.unit.model().model_num()
    }

    pub fn model_label(&self) -> &str {
        self.unit.model().label()
    }

    pub fn entity(&self) -> Result<&Entity, PropertyError> {
        self.check_range()?;
        let index = self.unit.entity_index(self.element);
        let model = self.unit.model();
        model
            .entity(index)
            .ok_or(PropertyError::ElementOutOfRange {
                element: index,
                count: model.entities().len(),
            })
    }

    pub fn label_asym_id(&self) -> Result<&str, PropertyError> {
        match self.unit.kind() {
            UnitKind::Atomic => Ok(&self.chain("label_asym_id")?.label_asym_id),
            _ => Ok(&self.coarse("label_asym_id")?.asym_id),
        }
    }

    pub fn auth_asym_id(&self) -> Result<&str, PropertyError> {
        match self.unit.kind() {
            UnitKind::Atomic => Ok(&self.chain("auth_asym_id")?.auth_asym_id),
            _ => Ok(&self.coarse("auth_asym_id")?.asym_id),
        }
    }

    /// Residue index within the model for atoms, the element itself for
    /// coarse units where every element stands for its own residue range.
    pub fn residue_key(&self) -> Result<u32, PropertyError> {
        self.check_range()?;
        Ok(match self.unit.kind() {
            UnitKind::Atomic => self.unit.model().atomic().residue_index(self.element),
            _ => self.element,
        })
    }

    // Atomic only.

    pub fn type_symbol(&self) -> Result<&str, PropertyError> {
        Ok(&self.atom("type_symbol")?.type_symbol)
    }

    pub fn atom_id(&self) -> Result<i32, PropertyError> {
        Ok(self.atom("id")?.id)
    }

    pub fn label_atom_id(&self) -> Result<&str, PropertyError> {
        Ok(&self.atom("label_atom_id")?.label_atom_id)
    }

    pub fn auth_atom_id(&self) -> Result<&str, PropertyError> {
        Ok(&self.atom("auth_atom_id")?.auth_atom_id)
    }

    pub fn label_alt_id(&self) -> Result<&str, PropertyError> {
        Ok(&self.atom("label_alt_id")?.label_alt_id)
    }

    pub fn occupancy(&self) -> Result<f64, PropertyError> {
        Ok(self.atom("occupancy")?.occupancy)
    }

    pub fn b_iso(&self) -> Result<f64, PropertyError> {
        Ok(self.atom("B_iso_or_equiv")?.b_iso)
    }

    pub fn formal_charge(&self) -> Result<i32, PropertyError> {
        Ok(self.atom("formal_charge")?.formal_charge)
    }

    pub fn label_comp_id(&self) -> Result<&str, PropertyError> {
        Ok(&self.residue("label_comp_id")?.label_comp_id)
    }

    pub fn auth_comp_id(&self) -> Result<&str, PropertyError> {
        Ok(&self.residue("auth_comp_id")?.auth_comp_id)
    }

    pub fn label_seq_id(&self) -> Result<i32, PropertyError> {
        Ok(self.residue("label_seq_id")?.label_seq_id)
    }

    pub fn auth_seq_id(&self) -> Result<i32, PropertyError> {
        Ok(self.residue("auth_seq_id")?.auth_seq_id)
    }

    pub fn ins_code(&self) -> Result<&str, PropertyError> {
        Ok(&self.residue("pdbx_PDB_ins_code")?.ins_code)
    }

    pub fn chem_comp_type(&self) -> Result<String, PropertyError> {
        let comp_id = self.label_comp_id()?;
        let map = &self.unit.model().properties().chemical_component_map;
        Ok(match map.get(comp_id) {
            Some(component) => component.comp_type.to_ascii_lowercase(),
            None => String::from("other"),
        })
    }

    pub fn is_modified(&self) -> Result<bool, PropertyError> {
        let comp_id = self.label_comp_id()?;
        Ok(self
            .unit
            .model()
            .properties()
            .modified_residues
            .is_modified(comp_id))
    }

    /// Parent residue name of a modified residue, or the residue's own name.
    pub fn modified_parent_name(&self) -> Result<&str, PropertyError> {
        let comp_id = self.label_comp_id()?;
        Ok(self
            .unit
            .model()
            .properties()
            .modified_residues
            .parent_of(comp_id)
            .unwrap_or(comp_id))
    }

    pub fn is_saccharide(&self) -> Result<bool, PropertyError> {
        let comp_id = self.label_comp_id()?;
        Ok(self
            .unit
            .model()
            .properties()
            .saccharide_component_map
            .has(comp_id))
    }

    /// True when the next residue of the chain is recorded as unobserved.
    pub fn next_residue_missing(&self) -> Result<bool, PropertyError> {
        let seq_id = self.label_seq_id()?;
        let asym_id = self.label_asym_id()?;
        Ok(self.unit.model().properties().missing_residues.has(
            self.model_num(),
            asym_id,
            seq_id + 1,
        ))
    }

    // Coarse only.

    pub fn seq_id_begin(&self) -> Result<i32, PropertyError> {
        Ok(self.coarse("seq_id_begin")?.seq_id_begin)
    }

    pub fn seq_id_end(&self) -> Result<i32, PropertyError> {
        Ok(self.coarse("seq_id_end")?.seq_id_end)
    }
}
