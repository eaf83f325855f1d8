use super::bonds::{BondOrder, LinkFlags};
use super::ids::{ElementIndex, UnitId, UnitIndex};
use super::lookup::StructureLookup3D;
use super::model::Model;
use super::unit::{SymmetryOperator, Unit, UnitKind};
use crate::core::sets::{OrderedSet, SortedArray};
use crate::core::utils::hash::hash1;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// An immutable set of units, optionally derived from a larger parent.
///
/// Units are kept sorted by id. A derived structure records the root of the
/// family it was cut from as its parent, so `root()` is always one hop away.
pub struct Structure {
    units: Vec<Arc<Unit>>,
    unit_map: HashMap<UnitId, usize>,
    parent: Option<Arc<Structure>>,
    element_count: usize,
    hash_code: i32,
    lookup: OnceLock<StructureLookup3D>,
    bonds: OnceLock<StructureBonds>,
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Structure")
            .field("units", &self.units.len())
            .field("elements", &self.element_count)
            .field("hash_code", &self.hash_code)
            .field("derived", &self.parent.is_some())
            .finish()
    }
}

impl Structure {
    pub fn new(units: Vec<Arc<Unit>>) -> Self {
        Self::create(units, None)
    }

    /// Builds a structure derived from `parent`. The stored parent is the root
    /// of `parent`'s family.
    pub fn child_of(parent: &Arc<Structure>, units: Vec<Arc<Unit>>) -> Arc<Structure> {
        Arc::new(Self::create(units, Some(parent.root())))
    }

    fn create(mut units: Vec<Arc<Unit>>, parent: Option<Arc<Structure>>) -> Self {
        units.retain(|u| u.element_count() > 0);
        units.sort_by_key(|u| u.id());
        units.dedup_by_key(|u| u.id());
        let unit_map = units.iter().enumerate().map(|(i, u)| (u.id(), i)).collect();
        let element_count = units.iter().map(|u| u.element_count()).sum();
        let hash_code = compute_hash(&units, element_count);
        Self {
            units,
            unit_map,
            parent,
            element_count,
            hash_code,
            lookup: OnceLock::new(),
            bonds: OnceLock::new(),
        }
    }

    pub fn from_model(model: Arc<Model>) -> Arc<Structure> {
        Self::from_models_with_operators(&[model], &[SymmetryOperator::identity()])
    }

    pub fn from_model_with_operators(
        model: Arc<Model>,
        operators: &[SymmetryOperator],
    ) -> Arc<Structure> {
        Self::from_models_with_operators(&[model], operators)
    }

    pub fn from_models(models: &[Arc<Model>]) -> Arc<Structure> {
        Self::from_models_with_operators(models, &[SymmetryOperator::identity()])
    }

    /// One unit per chain (atomic) or per contiguous chain run (coarse), per
    /// operator. Copies of one template under different operators share an
    /// invariant id.
    pub fn from_models_with_operators(
        models: &[Arc<Model>],
        operators: &[SymmetryOperator],
    ) -> Arc<Structure> {
        let operators: Vec<Arc<SymmetryOperator>> =
            operators.iter().cloned().map(Arc::new).collect();
        let mut units = Vec::new();
        let mut next_id: UnitId = 0;
        let mut invariant_offset = 0u32;
        for model in models {
            let templates = unit_templates(model);
            for operator in &operators {
                for (invariant, (kind, elements)) in templates.iter().enumerate() {
                    units.push(Arc::new(Unit::new(
                        next_id,
                        invariant_offset + invariant as u32,
                        *kind,
                        model.clone(),
                        operator.clone(),
                        elements.clone(),
                    )));
                    next_id += 1;
                }
            }
            invariant_offset += templates.len() as u32;
        }
        Arc::new(Self::new(units))
    }

    pub fn units(&self) -> &[Arc<Unit>] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Arc<Unit>> {
        self.unit_map.get(&id).map(|&i| &self.units[i])
    }

    pub fn unit_position(&self, id: UnitId) -> Option<usize> {
        self.unit_map.get(&id).copied()
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    /// Identity hash over unit ids and element arrays. Structures built the
    /// same way from the same model agree on it.
    pub fn hash_code(&self) -> i32 {
        self.hash_code
    }

    pub fn parent(&self) -> Option<&Arc<Structure>> {
        self.parent.as_ref()
    }

    pub fn root(self: &Arc<Self>) -> Arc<Structure> {
        match &self.parent {
            Some(parent) => parent.clone(),
            None => self.clone(),
        }
    }

    /// Distinct models in unit order.
    pub fn models(&self) -> Vec<Arc<Model>> {
        let mut models: Vec<Arc<Model>> = Vec::new();
        for unit in &self.units {
            if !models.iter().any(|m| m.id() == unit.model().id()) {
                models.push(unit.model().clone());
            }
        }
        models
    }

    pub fn unit_kinds(&self) -> Vec<UnitKind> {
        let mut kinds: Vec<UnitKind> = self.units.iter().map(|u| u.kind()).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    pub fn lookup(&self) -> &StructureLookup3D {
        self.lookup.get_or_init(|| StructureLookup3D::build(self))
    }

    pub fn bonds(&self) -> &StructureBonds {
        self.bonds.get_or_init(|| StructureBonds::build(self))
    }

    /// Same units and same elements, compared by content.
    pub fn are_equal(a: &Structure, b: &Structure) -> bool {
        a.hash_code == b.hash_code
            && a.units.len() == b.units.len()
            && a.units
                .iter()
                .zip(&b.units)
                .all(|(x, y)| x.id() == y.id() && x.elements() == y.elements())
    }

    pub fn union(source: &Arc<Structure>, structures: &[Arc<Structure>]) -> Arc<Structure> {
        if structures.len() == 1 {
            return structures[0].clone();
        }
        let mut merged: BTreeMap<UnitId, (Arc<Unit>, OrderedSet)> = BTreeMap::new();
        for structure in structures {
            for unit in &structure.units {
                let set = OrderedSet::of_sorted_array(unit.elements().clone());
                match merged.entry(unit.id()) {
                    Entry::Occupied(mut existing) => {
                        let union = existing.get().1.union(&set);
                        existing.get_mut().1 = union;
                    }
                    Entry::Vacant(slot) => {
                        slot.insert((unit.clone(), set));
                    }
                }
            }
        }
        let units = merged
            .into_values()
            .map(|(unit, set)| rebuild_unit(&unit, set))
            .collect();
        Structure::child_of(source, units)
    }

    pub fn intersect(a: &Arc<Structure>, b: &Structure) -> Arc<Structure> {
        let mut units = Vec::new();
        for unit in &a.units {
            let Some(other) = b.unit(unit.id()) else {
                continue;
            };
            let set = OrderedSet::of_sorted_array(unit.elements().clone())
                .intersect(&OrderedSet::of_sorted_array(other.elements().clone()));
            if !set.is_empty() {
                units.push(rebuild_unit(unit, set));
            }
        }
        Structure::child_of(a, units)
    }

    pub fn subtract(a: &Arc<Structure>, b: &Structure) -> Arc<Structure> {
        let mut units = Vec::new();
        for unit in &a.units {
            match b.unit(unit.id()) {
                None => units.push(unit.clone()),
                Some(other) => {
                    let set = OrderedSet::of_sorted_array(unit.elements().clone())
                        .subtract(&OrderedSet::of_sorted_array(other.elements().clone()));
                    if !set.is_empty() {
                        units.push(rebuild_unit(unit, set));
                    }
                }
            }
        }
        Structure::child_of(a, units)
    }

    pub fn are_intersecting(a: &Structure, b: &Structure) -> bool {
        a.units.iter().any(|unit| {
            b.unit(unit.id()).is_some_and(|other| {
                OrderedSet::of_sorted_array(unit.elements().clone())
                    .are_intersecting(&OrderedSet::of_sorted_array(other.elements().clone()))
            })
        })
    }

    /// True when every element of `a` is also in `b`.
    pub fn is_subset(a: &Structure, b: &Structure) -> bool {
        a.units.iter().all(|unit| {
            b.unit(unit.id()).is_some_and(|other| {
                OrderedSet::of_sorted_array(unit.elements().clone())
                    .is_subset(&OrderedSet::of_sorted_array(other.elements().clone()))
            })
        })
    }
}

fn rebuild_unit(unit: &Arc<Unit>, elements: OrderedSet) -> Arc<Unit> {
    if elements.size() == unit.element_count() {
        return unit.clone();
    }
    Arc::new(unit.with_elements(SortedArray::of_sorted(elements.to_vec())))
}

fn compute_hash(units: &[Arc<Unit>], element_count: usize) -> i32 {
    let mut hash: i32 = 23;
    for unit in units {
        hash = hash.wrapping_mul(31).wrapping_add(unit.id() as i32);
        hash = hash.wrapping_mul(31).wrapping_add(unit.elements().hash_code());
    }
    hash = hash.wrapping_mul(31).wrapping_add(element_count as i32);
    hash1(hash)
}

fn unit_templates(model: &Model) -> Vec<(UnitKind, SortedArray)> {
    let mut templates = Vec::new();
    let chains = &model.atomic().chain_segments;
    for chain in 0..chains.count() {
        let bounds = chains.bounds(chain as u32);
        if bounds.end > bounds.start {
            templates.push((UnitKind::Atomic, SortedArray::of_range(bounds.start, bounds.end - 1)));
        }
    }
    let coarse = model.coarse();
    for (kind, elements) in [
        (UnitKind::Spheres, &coarse.spheres),
        (UnitKind::Gaussians, &coarse.gaussians),
    ] {
        let mut start = 0usize;
        for i in 1..=elements.len() {
            if i == elements.len() || elements[i].asym_id != elements[start].asym_id {
                templates.push((kind, SortedArray::of_range(start as u32, i as u32 - 1)));
                start = i;
            }
        }
    }
    templates
}

/// Collects the elements of a new child structure unit by unit.
pub struct StructureSubsetBuilder {
    source: Arc<Structure>,
    units: BTreeMap<UnitId, Vec<ElementIndex>>,
}

impl StructureSubsetBuilder {
    pub fn new(source: Arc<Structure>) -> Self {
        Self {
            source,
            units: BTreeMap::new(),
        }
    }

    pub fn add_element(&mut self, unit: UnitId, element: ElementIndex) {
        self.units.entry(unit).or_default().push(element);
    }

    pub fn add_elements(&mut self, unit: UnitId, elements: &[ElementIndex]) {
        self.units.entry(unit).or_default().extend_from_slice(elements);
    }

    pub fn is_empty(&self) -> bool {
        self.units.values().all(|v| v.is_empty())
    }

    /// Elements of units unknown to the source are ignored.
    pub fn build(self) -> Arc<Structure> {
        let mut units = Vec::with_capacity(self.units.len());
        for (id, elements) in self.units {
            let Some(unit) = self.source.unit(id) else {
                continue;
            };
            let elements = SortedArray::of_unsorted(elements);
            if elements.len() == unit.element_count() {
                units.push(unit.clone());
            } else if !elements.is_empty() {
                units.push(Arc::new(unit.with_elements(elements)));
            }
        }
        Structure::child_of(&self.source, units)
    }
}

/// A bonded partner as seen from one element of a structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondedElement {
    /// Position of the partner's unit within the structure's unit list.
    pub unit: usize,
    pub index: UnitIndex,
    pub order: BondOrder,
    pub flags: LinkFlags,
}

struct UnitBonds {
    offsets: Vec<u32>,
    edges: Vec<BondedElement>,
}

/// Model bonds resolved to structure positions. Only bonds whose partners are
/// both present in the structure under the same model and operator are kept.
pub struct StructureBonds {
    units: Vec<UnitBonds>,
    bond_count: usize,
}

impl StructureBonds {
    fn build(structure: &Structure) -> Self {
        let mut groups: HashMap<(u64, &str), u32> = HashMap::new();
        let mut located: HashMap<(u32, ElementIndex), (usize, UnitIndex)> = HashMap::new();
        for (position, unit) in structure.units.iter().enumerate() {
            if unit.kind() != UnitKind::Atomic {
                continue;
            }
            let next = groups.len() as u32;
            let group = *groups
                .entry((unit.model().id(), unit.operator().name.as_str()))
                .or_insert(next);
            for (index, &element) in unit.elements().iter().enumerate() {
                located.insert((group, element), (position, index as UnitIndex));
            }
        }

        let mut units = Vec::with_capacity(structure.units.len());
        let mut half_edges = 0usize;
        for unit in &structure.units {
            let mut offsets = Vec::with_capacity(unit.element_count() + 1);
            let mut edges = Vec::new();
            offsets.push(0);
            let group = groups
                .get(&(unit.model().id(), unit.operator().name.as_str()))
                .copied();
            for &element in unit.elements().iter() {
                if let (Some(group), UnitKind::Atomic) = (group, unit.kind()) {
                    for edge in unit.model().bonds().neighbors(element) {
                        if let Some(&(partner_unit, index)) = located.get(&(group, edge.partner)) {
                            edges.push(BondedElement {
                                unit: partner_unit,
                                index,
                                order: edge.order,
                                flags: edge.flags,
                            });
                        }
                    }
                }
                offsets.push(edges.len() as u32);
            }
            half_edges += edges.len();
            units.push(UnitBonds { offsets, edges });
        }

        Self {
            units,
            bond_count: half_edges / 2,
        }
    }

    pub fn bond_count(&self) -> usize {
        self.bond_count
    }

    pub fn neighbors(&self, unit: usize, index: UnitIndex) -> &[BondedElement] {
        let Some(bonds) = self.units.get(unit) else {
            return &[];
        };
        let index = index as usize;
        if index + 1 >= bonds.offsets.len() {
            return &[];
        }
        &bonds.edges[bonds.offsets[index] as usize..bonds.offsets[index + 1] as usize]
    }
}
