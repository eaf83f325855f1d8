use super::location::Location;
use crate::core::sets::{OrderedSet, Segmentation, SortedArray};
use crate::core::structure::{Structure, Unit, UnitKind};
use crate::core::utils::geometry::{BoundaryHelper, Box3D, Sphere3D};
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs longer than this many indices are rebuilt as intervals by `remap`.
pub const DEFAULT_REMAP_INTERVAL_CUTOFF: usize = 12;

/// Selected positions within one unit.
#[derive(Debug, Clone)]
pub struct LociElement {
    pub unit: Arc<Unit>,
    /// Positions into `unit.elements()`, not model element indices.
    pub indices: OrderedSet,
}

/// An immutable selection of element positions across the units of one
/// structure.
///
/// Elements are kept sorted by unit id with at most one entry per unit and no
/// empty index sets. Every operation returns a new value.
#[derive(Debug, Clone)]
pub struct Loci {
    structure: Arc<Structure>,
    elements: Vec<LociElement>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub bounding_box: Box3D,
    pub sphere: Sphere3D,
}

impl Loci {
    pub fn new(structure: Arc<Structure>, elements: Vec<LociElement>) -> Self {
        let mut merged: BTreeMap<u32, LociElement> = BTreeMap::new();
        for element in elements {
            if element.indices.is_empty() {
                continue;
            }
            match merged.entry(element.unit.id()) {
                Entry::Occupied(mut existing) => {
                    let indices = existing.get().indices.union(&element.indices);
                    existing.get_mut().indices = indices;
                }
                Entry::Vacant(slot) => {
                    slot.insert(element);
                }
            }
        }
        Self {
            structure,
            elements: merged.into_values().collect(),
        }
    }

    /// Builds a loci directly from elements already sorted by unit id.
    fn from_sorted(structure: Arc<Structure>, elements: Vec<LociElement>) -> Self {
        debug_assert!(elements.windows(2).all(|w| w[0].unit.id() < w[1].unit.id()));
        debug_assert!(elements.iter().all(|e| !e.indices.is_empty()));
        Self {
            structure,
            elements,
        }
    }

    pub fn all(structure: &Arc<Structure>) -> Self {
        let elements = structure
            .units()
            .iter()
            .map(|unit| LociElement {
                unit: unit.clone(),
                indices: OrderedSet::of_bounds(0, unit.element_count() as u32),
            })
            .collect();
        Self::from_sorted(structure.clone(), elements)
    }

    pub fn none(structure: &Arc<Structure>) -> Self {
        Self::from_sorted(structure.clone(), Vec::new())
    }

    /// Positions of every element of `selected` within the matching units of
    /// `source`. Elements missing from `source` are skipped.
    pub fn from_structure(source: &Arc<Structure>, selected: &Structure) -> Self {
        let mut elements = Vec::with_capacity(selected.units().len());
        for unit in selected.units() {
            let Some(source_unit) = source.unit(unit.id()) else {
                continue;
            };
            let indices = if source_unit.elements().ptr_eq(unit.elements()) {
                OrderedSet::of_bounds(0, unit.element_count() as u32)
            } else {
                OrderedSet::of_sorted(source_unit.elements().indices_of(unit.elements()))
            };
            if !indices.is_empty() {
                elements.push(LociElement {
                    unit: source_unit.clone(),
                    indices,
                });
            }
        }
        Self::from_sorted(source.clone(), elements)
    }

    pub fn structure(&self) -> &Arc<Structure> {
        &self.structure
    }

    pub fn elements(&self) -> &[LociElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of selected elements.
    pub fn size(&self) -> usize {
        self.elements.iter().map(|e| e.indices.size()).sum()
    }

    pub fn is_whole_structure(&self) -> bool {
        self.size() == self.structure.element_count()
    }

    pub fn first_location(&self) -> Option<Location> {
        let first = self.elements.first()?;
        let index = first.indices.min()?;
        Some(Location::new(
            first.unit.clone(),
            first.unit.elements()[index as usize],
        ))
    }

    /// A child structure holding exactly the selected elements.
    pub fn to_structure(&self) -> Arc<Structure> {
        let units = self
            .elements
            .iter()
            .map(|e| {
                if e.indices.size() == e.unit.element_count() {
                    return e.unit.clone();
                }
                let elements = e.unit.elements();
                let selected = e.indices.iter().map(|i| elements[i as usize]).collect();
                Arc::new(e.unit.with_elements(SortedArray::of_sorted(selected)))
            })
            .collect();
        Structure::child_of(&self.structure, units)
    }

    pub fn are_equal(a: &Loci, b: &Loci) -> bool {
        a.structure.hash_code() == b.structure.hash_code()
            && a.elements.len() == b.elements.len()
            && a.elements
                .iter()
                .zip(&b.elements)
                .all(|(x, y)| x.unit.id() == y.unit.id() && x.indices == y.indices)
    }

    pub fn union(&self, other: &Loci) -> Loci {
        if self.is_empty() {
            return Loci::from_sorted(self.structure.clone(), other.elements.clone());
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut elements = Vec::with_capacity(self.elements.len() + other.elements.len());
        let (mut i, mut j) = (0, 0);
        while i < self.elements.len() || j < other.elements.len() {
            let order = match (self.elements.get(i), other.elements.get(j)) {
                (Some(x), Some(y)) => x.unit.id().cmp(&y.unit.id()),
                (Some(_), None) => Ordering::Less,
                _ => Ordering::Greater,
            };
            match order {
                Ordering::Less => {
                    elements.push(self.elements[i].clone());
                    i += 1;
                }
                Ordering::Greater => {
                    elements.push(other.elements[j].clone());
                    j += 1;
                }
                Ordering::Equal => {
                    let x = &self.elements[i];
                    elements.push(LociElement {
                        unit: x.unit.clone(),
                        indices: x.indices.union(&other.elements[j].indices),
                    });
                    i += 1;
                    j += 1;
                }
            }
        }
        Loci::from_sorted(self.structure.clone(), elements)
    }

    pub fn subtract(&self, other: &Loci) -> Loci {
        if other.is_empty() {
            return self.clone();
        }
        let mut elements = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            match other.find(element.unit.id()) {
                None => elements.push(element.clone()),
                Some(removed) => {
                    let indices = element.indices.subtract(&removed.indices);
                    if !indices.is_empty() {
                        elements.push(LociElement {
                            unit: element.unit.clone(),
                            indices,
                        });
                    }
                }
            }
        }
        Loci::from_sorted(self.structure.clone(), elements)
    }

    /// False whenever either side is empty, including two empty loci.
    pub fn are_intersecting(a: &Loci, b: &Loci) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        a.elements.iter().any(|x| {
            b.find(x.unit.id())
                .is_some_and(|y| x.indices.are_intersecting(&y.indices))
        })
    }

    /// True when every selected position of `self` is also selected in `other`.
    pub fn is_subset(&self, other: &Loci) -> bool {
        self.elements.iter().all(|x| {
            other
                .find(x.unit.id())
                .is_some_and(|y| x.indices.is_subset(&y.indices))
        })
    }

    fn find(&self, unit_id: u32) -> Option<&LociElement> {
        self.elements
            .binary_search_by_key(&unit_id, |e| e.unit.id())
            .ok()
            .map(|i| &self.elements[i])
    }

    pub fn extend_to_whole_residues(&self) -> Loci {
        self.map_elements(|element| match element.unit.kind() {
            UnitKind::Atomic => {
                let model = element.unit.model();
                extend_by_segments(element, &model.atomic().residue_segments)
            }
            _ => element.indices.clone(),
        })
    }

    pub fn extend_to_whole_chains(&self) -> Loci {
        self.map_elements(|element| match element.unit.kind() {
            UnitKind::Atomic => {
                let model = element.unit.model();
                extend_by_segments(element, &model.atomic().chain_segments)
            }
            // A coarse unit covers a single chain.
            _ => OrderedSet::of_bounds(0, element.unit.element_count() as u32),
        })
    }

    /// Every element, across all units, belonging to an entity touched by the
    /// selection.
    pub fn extend_to_whole_entities(&self) -> Loci {
        let mut entities: HashSet<(u64, u32)> = HashSet::new();
        for element in &self.elements {
            let unit = &element.unit;
            for i in element.indices.iter() {
                let entity = unit.entity_index(unit.elements()[i as usize]);
                entities.insert((unit.model().id(), entity));
            }
        }
        let mut extended = Vec::new();
        for unit in self.structure.units() {
            let model_id = unit.model().id();
            let positions: Vec<u32> = unit
                .elements()
                .iter()
                .enumerate()
                .filter(|&(_, &e)| entities.contains(&(model_id, unit.entity_index(e))))
                .map(|(i, _)| i as u32)
                .collect();
            if !positions.is_empty() {
                extended.push(LociElement {
                    unit: unit.clone(),
                    indices: OrderedSet::of_sorted(positions),
                });
            }
        }
        self.union(&Loci::from_sorted(self.structure.clone(), extended))
    }

    /// Applies the selected pattern of each unit to every unit sharing its
    /// invariant id.
    pub fn extend_to_all_instances(&self) -> Loci {
        let mut patterns: BTreeMap<u32, OrderedSet> = BTreeMap::new();
        for element in &self.elements {
            patterns
                .entry(element.unit.invariant_id())
                .and_modify(|p| *p = p.union(&element.indices))
                .or_insert_with(|| element.indices.clone());
        }
        let mut elements = Vec::new();
        for unit in self.structure.units() {
            let Some(pattern) = patterns.get(&unit.invariant_id()) else {
                continue;
            };
            let limit = OrderedSet::of_bounds(0, unit.element_count() as u32);
            let indices = pattern.intersect(&limit);
            if !indices.is_empty() {
                elements.push(LociElement {
                    unit: unit.clone(),
                    indices,
                });
            }
        }
        Loci::from_sorted(self.structure.clone(), elements)
    }

    fn map_elements<F>(&self, extend: F) -> Loci
    where
        F: Fn(&LociElement) -> OrderedSet,
    {
        let elements = self
            .elements
            .iter()
            .map(|element| LociElement {
                unit: element.unit.clone(),
                indices: extend(element),
            })
            .filter(|element| !element.indices.is_empty())
            .collect();
        Loci::from_sorted(self.structure.clone(), elements)
    }

    /// Axis-aligned box and bounding sphere over every selected element,
    /// padded by its radius.
    pub fn get_boundary(&self) -> Boundary {
        let mut helper = BoundaryHelper::new();
        self.for_each_ball(|p, r| helper.include_position_radius(&p, r));
        helper.finished_include_step();
        self.for_each_ball(|p, r| helper.extend_position_radius(&p, r));
        Boundary {
            bounding_box: helper.get_box(),
            sphere: helper.get_sphere(),
        }
    }

    fn for_each_ball<F>(&self, mut visit: F)
    where
        F: FnMut(nalgebra::Point3<f64>, f64),
    {
        for element in &self.elements {
            let unit = &element.unit;
            let elements = unit.elements();
            for i in element.indices.iter() {
                let e = elements[i as usize];
                visit(unit.position(e), unit.conformation_radius(e));
            }
        }
    }

    pub fn remap(&self, target: &Arc<Structure>) -> Loci {
        self.remap_with_cutoff(target, DEFAULT_REMAP_INTERVAL_CUTOFF)
    }

    /// Re-targets this selection onto a related structure, matching units by
    /// id. Elements missing from the target are dropped.
    pub fn remap_with_cutoff(&self, target: &Arc<Structure>, interval_cutoff: usize) -> Loci {
        if Arc::ptr_eq(&self.structure, target) {
            return self.clone();
        }
        let mut elements = Vec::with_capacity(self.elements.len());
        let mut dropped = 0usize;
        for element in &self.elements {
            let Some(unit) = target.unit(element.unit.id()) else {
                dropped += element.indices.size();
                continue;
            };
            if unit.elements().ptr_eq(element.unit.elements()) {
                elements.push(LociElement {
                    unit: unit.clone(),
                    indices: element.indices.clone(),
                });
                continue;
            }
            let source = element.unit.elements();
            let mut positions = Vec::with_capacity(element.indices.size());
            for i in element.indices.iter() {
                match unit.elements().index_of(source[i as usize]) {
                    Some(position) => positions.push(position as u32),
                    None => dropped += 1,
                }
            }
            let indices = match (positions.first(), positions.last()) {
                (Some(&first), Some(&last))
                    if positions.len() > interval_cutoff
                        && (last - first) as usize == positions.len() - 1 =>
                {
                    OrderedSet::of_range(first, last)
                }
                _ => OrderedSet::of_sorted(positions),
            };
            if !indices.is_empty() {
                elements.push(LociElement {
                    unit: unit.clone(),
                    indices,
                });
            }
        }
        if dropped > 0 {
            warn!(dropped, "Remapped selection lost elements absent from the target structure");
        }
        debug!(units = elements.len(), "Remapped selection");
        Loci::from_sorted(target.clone(), elements)
    }
}

/// Expands the selected positions of an atomic unit to whole segments,
/// keeping only segment members present in the unit.
fn extend_by_segments(element: &LociElement, segments: &Segmentation) -> OrderedSet {
    let elements = element.unit.elements();
    let mut positions: Vec<u32> = Vec::with_capacity(element.indices.size());
    let mut last_segment = None;
    for i in element.indices.iter() {
        let segment = segments.segment_of(elements[i as usize]);
        if last_segment == Some(segment) {
            continue;
        }
        last_segment = Some(segment);
        let bounds = segments.bounds(segment);
        let start = elements.find_predecessor_index(bounds.start);
        let end = elements.find_predecessor_index(bounds.end);
        positions.extend(start as u32..end as u32);
    }
    OrderedSet::of_sorted(positions)
}
