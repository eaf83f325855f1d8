use super::ids::{ElementIndex, UnitId};
use super::model::{CoarseElement, Model};
use crate::core::sets::SortedArray;
use crate::core::utils::elements::vdw_radius;
use nalgebra::{Isometry3, Point3};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitKind {
    Atomic,
    Spheres,
    Gaussians,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Atomic => "atomic",
            UnitKind::Spheres => "spheres",
            UnitKind::Gaussians => "gaussians",
        }
    }

    pub fn is_coarse(&self) -> bool {
        !matches!(self, UnitKind::Atomic)
    }
}

#[derive(Debug, Error)]
#[error("Invalid unit kind string")]
pub struct ParseUnitKindError;

impl FromStr for UnitKind {
    type Err = ParseUnitKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "atomic" => Ok(UnitKind::Atomic),
            "spheres" => Ok(UnitKind::Spheres),
            "gaussians" => Ok(UnitKind::Gaussians),
            _ => Err(ParseUnitKindError),
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named rigid transform placing a unit, e.g. a crystallographic symmetry mate.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperator {
    pub name: String,
    pub transform: Isometry3<f64>,
}

impl SymmetryOperator {
    pub const IDENTITY_NAME: &'static str = "1_555";

    pub fn identity() -> Self {
        Self {
            name: Self::IDENTITY_NAME.to_string(),
            transform: Isometry3::identity(),
        }
    }

    pub fn new(name: &str, transform: Isometry3<f64>) -> Self {
        Self {
            name: name.to_string(),
            transform,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.transform == Isometry3::identity()
    }

    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.transform.transform_point(point)
    }
}

/// A homogeneous chunk of a structure: elements of one kind from one model
/// placed by one operator.
///
/// `elements` are model element indices in ascending order. Loci and queries
/// address a unit's elements by their position in this array.
#[derive(Debug, Clone)]
pub struct Unit {
    id: UnitId,
    invariant_id: u32,
    kind: UnitKind,
    model: Arc<Model>,
    operator: Arc<SymmetryOperator>,
    elements: SortedArray,
}

impl Unit {
    pub fn new(
        id: UnitId,
        invariant_id: u32,
        kind: UnitKind,
        model: Arc<Model>,
        operator: Arc<SymmetryOperator>,
        elements: SortedArray,
    ) -> Self {
        Self {
            id,
            invariant_id,
            kind,
            model,
            operator,
            elements,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn invariant_id(&self) -> u32 {
        self.invariant_id
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn operator(&self) -> &Arc<SymmetryOperator> {
        &self.operator
    }

    pub fn elements(&self) -> &SortedArray {
        &self.elements
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// The same unit restricted to (or re-targeted at) another element array.
    pub fn with_elements(&self, elements: SortedArray) -> Unit {
        Unit {
            elements,
            ..self.clone()
        }
    }

    /// Number of elements of this unit's kind in the model.
    pub fn model_element_count(&self) -> usize {
        match self.kind {
            UnitKind::Atomic => self.model.atomic().atom_count(),
            UnitKind::Spheres => self.model.coarse().spheres.len(),
            UnitKind::Gaussians => self.model.coarse().gaussians.len(),
        }
    }

    pub fn coarse_elements(&self) -> Option<&[CoarseElement]> {
        match self.kind {
            UnitKind::Atomic => None,
            UnitKind::Spheres => Some(&self.model.coarse().spheres),
            UnitKind::Gaussians => Some(&self.model.coarse().gaussians),
        }
    }

    /// Position of a model element after applying this unit's operator.
    pub fn position(&self, element: ElementIndex) -> Point3<f64> {
        let local = match self.coarse_elements() {
            None => self.model.atomic().atoms[element as usize].position,
            Some(coarse) => coarse[element as usize].position,
        };
        self.operator.apply(&local)
    }

    /// Van der Waals radius for atoms, the element radius for coarse units.
    pub fn conformation_radius(&self, element: ElementIndex) -> f64 {
        match self.coarse_elements() {
            None => vdw_radius(&self.model.atomic().atoms[element as usize].type_symbol),
            Some(coarse) => coarse[element as usize].radius,
        }
    }

    pub fn entity_index(&self, element: ElementIndex) -> u32 {
        match self.coarse_elements() {
            None => {
                let atomic = self.model.atomic();
                atomic.chains[atomic.chain_index(element) as usize].entity_index
            }
            Some(coarse) => coarse[element as usize].entity_index,
        }
    }
}
