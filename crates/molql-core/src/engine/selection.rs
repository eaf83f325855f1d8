use crate::core::element::loci::Loci;
use crate::core::sets::SortedArray;
use crate::core::structure::Structure;
use std::collections::HashMap;
use std::sync::Arc;

/// The result of a structure query.
///
/// `Singletons` is a flat set of elements where every element counts as its
/// own structure; generators produce it when no grouping is requested.
/// `Sequence` holds explicit sub-structures, deduplicated by the builders.
#[derive(Debug, Clone)]
pub enum StructureSelection {
    Singletons {
        source: Arc<Structure>,
        structure: Arc<Structure>,
    },
    Sequence {
        source: Arc<Structure>,
        structures: Vec<Arc<Structure>>,
    },
}

impl PartialEq for StructureSelection {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Singletons { source: a, structure: x },
                Self::Singletons { source: b, structure: y },
            ) => a.hash_code() == b.hash_code() && Structure::are_equal(x, y),
            (
                Self::Sequence { source: a, structures: xs },
                Self::Sequence { source: b, structures: ys },
            ) => {
                a.hash_code() == b.hash_code()
                    && xs.len() == ys.len()
                    && xs.iter().zip(ys).all(|(x, y)| Structure::are_equal(x, y))
            }
            _ => false,
        }
    }
}

impl StructureSelection {
    pub fn empty(source: &Arc<Structure>) -> Self {
        Self::Sequence {
            source: source.clone(),
            structures: Vec::new(),
        }
    }

    pub fn singletons(source: &Arc<Structure>, structure: Arc<Structure>) -> Self {
        Self::Singletons {
            source: source.clone(),
            structure,
        }
    }

    pub fn source(&self) -> &Arc<Structure> {
        match self {
            Self::Singletons { source, .. } | Self::Sequence { source, .. } => source,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Singletons { structure, .. } => structure.is_empty(),
            Self::Sequence { structures, .. } => structures.is_empty(),
        }
    }

    /// Number of structures in the selection.
    pub fn len(&self) -> usize {
        match self {
            Self::Singletons { structure, .. } => structure.element_count(),
            Self::Sequence { structures, .. } => structures.len(),
        }
    }

    /// Every member as a structure. Singletons expand into one single-element
    /// structure per element.
    pub fn structures(&self) -> Vec<Arc<Structure>> {
        match self {
            Self::Sequence { structures, .. } => structures.clone(),
            Self::Singletons { source, structure } => {
                let mut result = Vec::with_capacity(structure.element_count());
                for unit in structure.units() {
                    for &element in unit.elements().iter() {
                        let single = unit.with_elements(SortedArray::of_sorted(vec![element]));
                        result.push(Structure::child_of(source, vec![Arc::new(single)]));
                    }
                }
                result
            }
        }
    }

    /// All selected elements merged into one structure.
    pub fn union_structure(&self) -> Arc<Structure> {
        match self {
            Self::Singletons { structure, .. } => structure.clone(),
            Self::Sequence { source, structures } => match structures.as_slice() {
                [] => Structure::child_of(source, Vec::new()),
                [single] => single.clone(),
                _ => Structure::union(source, structures),
            },
        }
    }

    pub fn to_loci(&self) -> Loci {
        Loci::from_structure(self.source(), &self.union_structure())
    }

    /// Transforms every member. Singletons are transformed as one structure
    /// and stay singletons; sequence results are deduplicated and empty
    /// results dropped.
    pub fn try_map<E>(
        &self,
        mut f: impl FnMut(&Arc<Structure>) -> Result<Arc<Structure>, E>,
    ) -> Result<StructureSelection, E> {
        match self {
            Self::Singletons { source, structure } => {
                Ok(Self::singletons(source, f(structure)?))
            }
            Self::Sequence { source, structures } => {
                let mut builder = UniqueSelectionBuilder::new(source);
                for structure in structures {
                    builder.add(f(structure)?);
                }
                Ok(builder.build())
            }
        }
    }
}

/// Collects a sequence, dropping structures equal to one already added.
pub struct UniqueSelectionBuilder {
    source: Arc<Structure>,
    structures: Vec<Arc<Structure>>,
    by_hash: HashMap<i32, Vec<usize>>,
}

impl UniqueSelectionBuilder {
    pub fn new(source: &Arc<Structure>) -> Self {
        Self {
            source: source.clone(),
            structures: Vec::new(),
            by_hash: HashMap::new(),
        }
    }

    /// Returns false when an equal structure was already present. Empty
    /// structures are never added.
    pub fn add(&mut self, structure: Arc<Structure>) -> bool {
        if structure.is_empty() {
            return false;
        }
        let bucket = self.by_hash.entry(structure.hash_code()).or_default();
        if bucket
            .iter()
            .any(|&i| Structure::are_equal(&self.structures[i], &structure))
        {
            return false;
        }
        bucket.push(self.structures.len());
        self.structures.push(structure);
        true
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn build(self) -> StructureSelection {
        StructureSelection::Sequence {
            source: self.source,
            structures: self.structures,
        }
    }
}

/// Collects a sequence in insertion order without deduplication.
pub struct LinearSelectionBuilder {
    source: Arc<Structure>,
    structures: Vec<Arc<Structure>>,
}

impl LinearSelectionBuilder {
    pub fn new(source: &Arc<Structure>) -> Self {
        Self {
            source: source.clone(),
            structures: Vec::new(),
        }
    }

    pub fn add(&mut self, structure: Arc<Structure>) {
        if !structure.is_empty() {
            self.structures.push(structure);
        }
    }

    pub fn build(self) -> StructureSelection {
        StructureSelection::Sequence {
            source: self.source,
            structures: self.structures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::testing::create_standard_test_structure;
    use crate::core::structure::StructureSubsetBuilder;

    fn subset(source: &Arc<Structure>, unit: u32, elements: &[u32]) -> Arc<Structure> {
        let mut builder = StructureSubsetBuilder::new(source.clone());
        builder.add_elements(unit, elements);
        builder.build()
    }

    #[test]
    fn singletons_expand_per_element() {
        let source = create_standard_test_structure();
        let selection = StructureSelection::singletons(&source, subset(&source, 0, &[1, 5, 9]));
        assert_eq!(selection.len(), 3);
        let parts = selection.structures();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|s| s.element_count() == 1));
        assert_eq!(selection.to_loci().size(), 3);
    }

    #[test]
    fn unique_builder_drops_equal_structures() {
        let source = create_standard_test_structure();
        let mut builder = UniqueSelectionBuilder::new(&source);
        assert!(builder.add(subset(&source, 0, &[0, 1])));
        assert!(!builder.add(subset(&source, 0, &[1, 0])));
        assert!(builder.add(subset(&source, 0, &[2])));
        assert!(!builder.add(subset(&source, 0, &[])));
        let selection = builder.build();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.union_structure().element_count(), 3);
    }

    #[test]
    fn empty_selection_has_empty_loci() {
        let source = create_standard_test_structure();
        let selection = StructureSelection::empty(&source);
        assert!(selection.is_empty());
        assert!(selection.to_loci().is_empty());
        assert!(selection.union_structure().is_empty());
    }

    #[test]
    fn try_map_keeps_the_selection_kind() {
        let source = create_standard_test_structure();
        let singletons = StructureSelection::singletons(&source, subset(&source, 0, &[1, 2]));
        let mapped = singletons
            .try_map(|_| Ok::<_, ()>(subset(&source, 0, &[3])))
            .unwrap();
        assert!(matches!(mapped, StructureSelection::Singletons { .. }));
        assert_eq!(mapped.len(), 1);

        let mut builder = LinearSelectionBuilder::new(&source);
        builder.add(subset(&source, 0, &[0]));
        builder.add(subset(&source, 0, &[1]));
        let collapsed = builder
            .build()
            .try_map(|_| Ok::<_, ()>(subset(&source, 0, &[5])))
            .unwrap();
        assert!(matches!(collapsed, StructureSelection::Sequence { .. }));
        assert_eq!(collapsed.len(), 1);
    }

    #[test]
    fn sequence_union_spans_units() {
        let source = create_standard_test_structure();
        let mut builder = LinearSelectionBuilder::new(&source);
        builder.add(subset(&source, 0, &[0]));
        builder.add(subset(&source, 1, &[20, 21]));
        let loci = builder.build().to_loci();
        assert_eq!(loci.elements().len(), 2);
        assert_eq!(loci.size(), 3);
    }
}
