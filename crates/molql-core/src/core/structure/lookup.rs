use super::ids::UnitIndex;
use super::structure::Structure;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;

/// An element found by a spatial query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupResult {
    /// Position of the unit within the structure's unit list.
    pub unit: usize,
    pub index: UnitIndex,
    pub distance: f64,
}

/// k-d tree over every element position of a structure.
pub struct StructureLookup3D {
    tree: Option<KdTree<f64, 3>>,
    entries: Vec<(usize, UnitIndex)>,
    positions: Vec<[f64; 3]>,
}

impl StructureLookup3D {
    pub fn build(structure: &Structure) -> Self {
        let mut entries = Vec::with_capacity(structure.element_count());
        let mut positions = Vec::with_capacity(structure.element_count());
        for (unit_position, unit) in structure.units().iter().enumerate() {
            for (index, &element) in unit.elements().iter().enumerate() {
                let p = unit.position(element);
                entries.push((unit_position, index as UnitIndex));
                positions.push([p.x, p.y, p.z]);
            }
        }
        let tree = if positions.is_empty() {
            None
        } else {
            let tree: KdTree<f64, 3> = (&positions).into();
            Some(tree)
        };
        Self {
            tree,
            entries,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every element whose position lies within `radius` of `point`, bounds
    /// included.
    pub fn find(&self, point: &Point3<f64>, radius: f64) -> Vec<LookupResult> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        if radius < 0.0 {
            return Vec::new();
        }
        let query = [point.x, point.y, point.z];
        let radius_sq = radius * radius;
        let slack = radius_sq * 1e-9 + 1e-12;
        tree.within_unsorted::<SquaredEuclidean>(&query, radius_sq + slack)
            .into_iter()
            .filter_map(|hit| {
                let item = hit.item as usize;
                let distance_sq = squared_distance(&self.positions[item], &query);
                (distance_sq <= radius_sq).then(|| {
                    let (unit, index) = self.entries[item];
                    LookupResult {
                        unit,
                        index,
                        distance: distance_sq.sqrt(),
                    }
                })
            })
            .collect()
    }

    pub fn nearest(&self, point: &Point3<f64>) -> Option<LookupResult> {
        let tree = self.tree.as_ref()?;
        let hit = tree.nearest_one::<SquaredEuclidean>(&[point.x, point.y, point.z]);
        let (unit, index) = *self.entries.get(hit.item as usize)?;
        Some(LookupResult {
            unit,
            index,
            distance: hit.distance.sqrt(),
        })
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (0..3).map(|i| (a[i] - b[i]) * (a[i] - b[i])).sum()
}
