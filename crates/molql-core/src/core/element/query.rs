use super::loci::{Loci, LociElement};
use crate::core::sets::{OrderedSet, SortedArray, SortedRanges};
use crate::core::structure::{Structure, UnitId};
use crate::core::utils::hash::hash2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Runs longer than this many consecutive indices are stored as ranges.
pub const DEFAULT_QUERY_RANGE_CUTOFF: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error(
        "Query was recorded against structure hash {expected} but the target structure hashes to {found}"
    )]
    IncompatibleStructure { expected: i32, found: i32 },
}

/// One index pattern and the units it applies to.
///
/// `set` and `ranges` never share a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQueryElement")]
pub struct QueryElement {
    /// Unit ids grouped by invariant id; every listed unit has this pattern.
    pub grouped_units: Vec<SortedArray>,
    pub set: SortedArray,
    pub ranges: SortedRanges,
}

#[derive(Deserialize)]
struct RawQueryElement {
    grouped_units: Vec<SortedArray>,
    set: SortedArray,
    ranges: SortedRanges,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid query element: index {0} is listed in both the set and the ranges")]
pub struct OverlappingIndicesError(pub u32);

impl TryFrom<RawQueryElement> for QueryElement {
    type Error = OverlappingIndicesError;

    fn try_from(raw: RawQueryElement) -> Result<Self, Self::Error> {
        if let Some(&shared) = raw.set.as_slice().iter().find(|&&i| raw.ranges.has(i)) {
            return Err(OverlappingIndicesError(shared));
        }
        Ok(QueryElement {
            grouped_units: raw.grouped_units,
            set: raw.set,
            ranges: raw.ranges,
        })
    }
}

impl QueryElement {
    /// Ascending, deduplicated pattern members below `count`. Ranges are
    /// clipped before they are expanded.
    fn indices_below(&self, count: u32) -> Vec<u32> {
        let mut indices: Vec<u32> = self
            .set
            .as_slice()
            .iter()
            .copied()
            .filter(|&i| i < count)
            .collect();
        for (lo, hi) in self.ranges.ranges() {
            if lo >= count {
                break;
            }
            indices.extend(lo..=hi.min(count - 1));
        }
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    fn exceeds(&self, count: u32) -> bool {
        self.set.max().is_some_and(|i| i >= count) || self.ranges.max().is_some_and(|i| i >= count)
    }
}

/// Structure-independent, replayable encoding of a [`Loci`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Root structure hash, or [`Query::ANY_STRUCTURE`].
    pub hash: i32,
    pub elements: Vec<QueryElement>,
}

struct Pattern {
    set: SortedArray,
    ranges: SortedRanges,
    groups: BTreeMap<u32, Vec<UnitId>>,
}

impl Query {
    pub const ANY_STRUCTURE: i32 = -1;

    pub fn from_loci(loci: &Loci) -> Query {
        Self::from_loci_with_cutoff(loci, DEFAULT_QUERY_RANGE_CUTOFF)
    }

    pub fn from_loci_with_cutoff(loci: &Loci, range_cutoff: usize) -> Query {
        let mut patterns: Vec<Pattern> = Vec::new();
        let mut buckets: HashMap<i32, Vec<usize>> = HashMap::new();

        for element in loci.elements() {
            let (set, ranges) = split_indices(&element.indices, range_cutoff);
            let key = hash2(set.hash_code(), ranges.hash_code());
            let bucket = buckets.entry(key).or_default();
            let slot = match bucket
                .iter()
                .copied()
                .find(|&i| patterns[i].set == set && patterns[i].ranges == ranges)
            {
                Some(i) => i,
                None => {
                    patterns.push(Pattern {
                        set,
                        ranges,
                        groups: BTreeMap::new(),
                    });
                    bucket.push(patterns.len() - 1);
                    patterns.len() - 1
                }
            };
            patterns[slot]
                .groups
                .entry(element.unit.invariant_id())
                .or_default()
                .push(element.unit.id());
        }

        let elements = patterns
            .into_iter()
            .map(|pattern| {
                let mut grouped_units: Vec<SortedArray> = pattern
                    .groups
                    .into_values()
                    .map(SortedArray::of_unsorted)
                    .collect();
                grouped_units.sort_by_key(|group| group.min());
                QueryElement {
                    grouped_units,
                    set: pattern.set,
                    ranges: pattern.ranges,
                }
            })
            .collect();

        Query {
            hash: loci.structure().root().hash_code(),
            elements,
        }
    }

    /// The same query without a structure binding.
    pub fn for_any_structure(mut self) -> Self {
        self.hash = Self::ANY_STRUCTURE;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn check_compatible(&self, parent: &Arc<Structure>) -> Result<(), ReplayError> {
        let found = parent.root().hash_code();
        if self.hash != Self::ANY_STRUCTURE && self.hash != found {
            error!(
                expected = self.hash,
                found, "Query does not belong to the target structure family"
            );
            return Err(ReplayError::IncompatibleStructure {
                expected: self.hash,
                found,
            });
        }
        Ok(())
    }

    /// Unit positions of every listed unit present in `parent`, with indices
    /// beyond the unit's size removed.
    fn resolve(&self, parent: &Arc<Structure>) -> Vec<LociElement> {
        let mut resolved = Vec::new();
        for element in &self.elements {
            let mut last: Option<(u32, OrderedSet)> = None;
            for id in element.grouped_units.iter().flat_map(|g| g.iter()) {
                let Some(unit) = parent.unit(*id) else {
                    warn!(unit = id, "Query references a unit missing from the target structure");
                    continue;
                };
                let count = unit.element_count() as u32;
                if element.exceeds(count) {
                    warn!(unit = id, size = count, "Query indices exceed the unit size");
                }
                let indices = match &last {
                    Some((size, indices)) if *size == count => indices.clone(),
                    _ => {
                        let indices = OrderedSet::of_sorted(element.indices_below(count));
                        last = Some((count, indices.clone()));
                        indices
                    }
                };
                resolved.push(LociElement {
                    unit: unit.clone(),
                    indices,
                });
            }
        }
        resolved
    }

    #[instrument(skip_all, fields(elements = self.elements.len()))]
    pub fn to_loci(&self, parent: &Arc<Structure>) -> Result<Loci, ReplayError> {
        self.check_compatible(parent)?;
        let loci = Loci::new(parent.clone(), self.resolve(parent));
        debug!(size = loci.size(), "Query replayed");
        Ok(loci)
    }

    #[instrument(skip_all, fields(elements = self.elements.len()))]
    pub fn to_structure(&self, parent: &Arc<Structure>) -> Result<Arc<Structure>, ReplayError> {
        self.check_compatible(parent)?;
        let mut units = Vec::new();
        for element in self.resolve(parent) {
            let source = element.unit.elements();
            let mut selected: Vec<u32> = element
                .indices
                .iter()
                .map(|i| source[i as usize])
                .collect();
            selected.sort_unstable();
            if selected.is_empty() {
                continue;
            }
            units.push(Arc::new(
                element.unit.with_elements(SortedArray::of_sorted(selected)),
            ));
        }
        Ok(Structure::child_of(parent, units))
    }

    /// Positional comparison of two encodings. Equivalent selections encoded
    /// in a different order compare unequal.
    pub fn are_equal(a: &Query, b: &Query) -> bool {
        a == b
    }
}

/// Splits positions into isolated members and runs longer than `cutoff`.
fn split_indices(indices: &OrderedSet, cutoff: usize) -> (SortedArray, SortedRanges) {
    match indices {
        OrderedSet::Interval(interval) => match (interval.min(), interval.max()) {
            (Some(min), Some(max)) if min == max => {
                (SortedArray::of_sorted(vec![min]), SortedRanges::empty())
            }
            (Some(min), Some(max)) => (
                SortedArray::empty(),
                SortedRanges::of_sorted_ranges(vec![min, max]),
            ),
            _ => (SortedArray::empty(), SortedRanges::empty()),
        },
        OrderedSet::Sorted(array) => split_runs(array.as_slice(), cutoff),
    }
}

/// Splits ascending `values` into runs longer than `cutoff`, returned as
/// ranges, and everything else, returned as a set.
pub(crate) fn split_runs(values: &[u32], cutoff: usize) -> (SortedArray, SortedRanges) {
    let mut set = Vec::new();
    let mut ranges = Vec::new();
    let mut start = 0;
    while start < values.len() {
        let mut end = start + 1;
        while end < values.len() && values[end] == values[end - 1] + 1 {
            end += 1;
        }
        if end - start > cutoff {
            ranges.push(values[start]);
            ranges.push(values[end - 1]);
        } else {
            set.extend_from_slice(&values[start..end]);
        }
        start = end;
    }
    (
        SortedArray::of_sorted(set),
        SortedRanges::of_sorted_ranges(ranges),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::testing::{
        create_standard_test_structure, create_symmetric_test_structure,
    };

    fn select(structure: &Arc<Structure>, picks: &[(usize, &[u32])]) -> Loci {
        let elements = picks
            .iter()
            .map(|(unit, indices)| LociElement {
                unit: structure.units()[*unit].clone(),
                indices: OrderedSet::of_unsorted(indices.to_vec()),
            })
            .collect();
        Loci::new(structure.clone(), elements)
    }

    mod encoding {
        use super::*;

        #[test]
        fn long_runs_become_ranges_and_short_runs_stay_in_set() {
            let indices: Vec<u32> = (0..=12).chain([50, 51]).collect();
            let (set, ranges) = split_indices(&OrderedSet::of_sorted(indices), 2);
            assert_eq!(ranges.as_slice(), &[0, 12]);
            assert_eq!(set.as_slice(), &[50, 51]);
        }

        #[test]
        fn intervals_split_by_size() {
            let (set, ranges) = split_indices(&OrderedSet::of_single(4), 2);
            assert_eq!(set.as_slice(), &[4]);
            assert!(ranges.is_empty());
            let (set, ranges) = split_indices(&OrderedSet::of_range(4, 5), 2);
            assert!(set.is_empty());
            assert_eq!(ranges.as_slice(), &[4, 5]);
        }

        #[test]
        fn symmetric_units_share_one_element() {
            let s = create_symmetric_test_structure();
            let half = s.units().len() / 2;
            let loci = select(&s, &[(0, &[1, 2, 3, 9]), (half, &[1, 2, 3, 9])]);
            let query = Query::from_loci(&loci);
            assert_eq!(query.elements.len(), 1);
            let element = &query.elements[0];
            assert_eq!(element.grouped_units.len(), 1);
            assert_eq!(
                element.grouped_units[0].as_slice(),
                &[s.units()[0].id(), s.units()[half].id()]
            );
            assert_eq!(element.ranges.as_slice(), &[1, 3]);
            assert_eq!(element.set.as_slice(), &[9]);
        }

        #[test]
        fn identical_patterns_across_invariants_are_merged() {
            let s = create_standard_test_structure();
            let loci = select(&s, &[(0, &[0, 2]), (1, &[0, 2])]);
            let query = Query::from_loci(&loci);
            assert_eq!(query.elements.len(), 1);
            assert_eq!(query.elements[0].grouped_units.len(), 2);
            assert_eq!(query.hash, s.hash_code());
        }

        #[test]
        fn query_serializes_to_json() {
            let s = create_standard_test_structure();
            let query = Query::from_loci(&select(&s, &[(0, &[0, 1, 2, 3, 7])]));
            let text = serde_json::to_string(&query).unwrap();
            let back: Query = serde_json::from_str(&text).unwrap();
            assert!(Query::are_equal(&query, &back));
        }

        #[test]
        fn malformed_ranges_are_rejected_on_deserialize() {
            let text = r#"{"hash":-1,"elements":[{"grouped_units":[[0]],"set":[],"ranges":[5,1]}]}"#;
            assert!(serde_json::from_str::<Query>(text).is_err());
        }

        #[test]
        fn overlapping_set_and_ranges_are_rejected_on_deserialize() {
            let text = r#"{"hash":-1,"elements":[{"grouped_units":[[0]],"set":[1,2],"ranges":[0,3]}]}"#;
            let err = serde_json::from_str::<Query>(text).unwrap_err();
            assert!(err.to_string().contains("index 1"));

            let disjoint = r#"{"hash":-1,"elements":[{"grouped_units":[[0]],"set":[5],"ranges":[0,3]}]}"#;
            assert!(serde_json::from_str::<Query>(disjoint).is_ok());
        }
    }

    mod replay {
        use super::*;

        #[test]
        fn round_trip_reproduces_the_selection() {
            let s = create_symmetric_test_structure();
            let loci = select(
                &s,
                &[(0, &[0, 1, 2, 3, 4, 10, 12]), (2, &[1]), (3, &[0, 1, 2, 3, 4, 10, 12])],
            );
            let back = Query::from_loci(&loci).to_loci(&s).unwrap();
            assert!(Loci::are_equal(&back, &loci));
        }

        #[test]
        fn hash_mismatch_is_rejected() {
            let s = create_standard_test_structure();
            let other = create_symmetric_test_structure();
            let query = Query::from_loci(&select(&s, &[(0, &[0])]));
            assert_eq!(
                query.to_loci(&other).unwrap_err(),
                ReplayError::IncompatibleStructure {
                    expected: s.hash_code(),
                    found: other.hash_code(),
                }
            );
            assert!(query.to_structure(&other).is_err());
        }

        #[test]
        fn any_structure_skips_the_check_and_drops_missing_units() {
            let s = create_symmetric_test_structure();
            let small = create_standard_test_structure();
            let half = s.units().len() / 2;
            let query =
                Query::from_loci(&select(&s, &[(0, &[0, 1]), (half, &[0, 1])])).for_any_structure();
            let loci = query.to_loci(&small).unwrap();
            assert_eq!(loci.elements().len(), 1);
            assert_eq!(loci.size(), 2);
        }

        #[test]
        fn out_of_range_indices_are_skipped() {
            let s = create_standard_test_structure();
            let query = Query {
                hash: Query::ANY_STRUCTURE,
                elements: vec![QueryElement {
                    grouped_units: vec![SortedArray::of_sorted(vec![s.units()[1].id()])],
                    set: SortedArray::of_sorted(vec![0, 99]),
                    ranges: SortedRanges::empty(),
                }],
            };
            assert_eq!(query.to_loci(&s).unwrap().size(), 1);
        }

        #[test]
        fn huge_ranges_are_clipped_to_the_unit() {
            let s = create_standard_test_structure();
            let unit = &s.units()[0];
            let query = Query {
                hash: Query::ANY_STRUCTURE,
                elements: vec![QueryElement {
                    grouped_units: vec![SortedArray::of_sorted(vec![unit.id()])],
                    set: SortedArray::empty(),
                    ranges: SortedRanges::of_sorted_ranges(vec![0, u32::MAX]),
                }],
            };
            let loci = query.to_loci(&s).unwrap();
            assert_eq!(loci.size(), unit.element_count());
        }

        #[test]
        fn overlapping_members_built_in_code_are_not_duplicated() {
            let s = create_standard_test_structure();
            let query = Query {
                hash: Query::ANY_STRUCTURE,
                elements: vec![QueryElement {
                    grouped_units: vec![SortedArray::of_sorted(vec![s.units()[0].id()])],
                    set: SortedArray::of_sorted(vec![1, 2]),
                    ranges: SortedRanges::of_sorted_ranges(vec![0, 3]),
                }],
            };
            let loci = query.to_loci(&s).unwrap();
            assert_eq!(loci.size(), 4);
            assert_eq!(loci.elements()[0].indices.to_vec(), vec![0, 1, 2, 3]);
        }

        #[test]
        fn to_structure_builds_sorted_child() {
            let s = create_standard_test_structure();
            let loci = select(&s, &[(0, &[1, 2, 3, 4, 5, 15])]);
            let child = Query::from_loci(&loci).to_structure(&s).unwrap();
            assert_eq!(child.element_count(), 6);
            assert!(Arc::ptr_eq(&child.root(), &s));
            let elements = child.units()[0].elements();
            assert!(elements.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn encodings_compare_positionally() {
            let s = create_standard_test_structure();
            let a = Query::from_loci(&select(&s, &[(0, &[0]), (1, &[1])]));
            let mut b = a.clone();
            b.elements.reverse();
            assert!(!Query::are_equal(&a, &b));
        }
    }
}
