use std::ops::Range;

/// Partition of `0..n` into consecutive segments (atoms into residues, atoms
/// into chains, and so on).
///
/// `offsets` has one more entry than there are segments; segment `s` spans
/// `offsets[s]..offsets[s + 1]`. `index` maps every member back to its segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segmentation {
    offsets: Vec<u32>,
    index: Vec<u32>,
}

/// One segment as seen through a unit's element array: `start..end` are
/// positions into that array, not element indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: u32,
    pub start: usize,
    pub end: usize,
}

impl Segmentation {
    pub fn from_offsets(offsets: Vec<u32>) -> Self {
        debug_assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        let total = offsets.last().copied().unwrap_or(0) as usize;
        let mut index = vec![0u32; total];
        for (segment, bounds) in offsets.windows(2).enumerate() {
            for slot in &mut index[bounds[0] as usize..bounds[1] as usize] {
                *slot = segment as u32;
            }
        }
        Self { offsets, index }
    }

    /// Builds the segmentation from the segment each member belongs to. The
    /// input must be non-decreasing.
    pub fn from_membership(membership: &[u32], segment_count: usize) -> Self {
        let mut offsets = vec![0u32; segment_count + 1];
        for &segment in membership {
            offsets[segment as usize + 1] += 1;
        }
        for s in 0..segment_count {
            offsets[s + 1] += offsets[s];
        }
        Self {
            offsets,
            index: membership.to_vec(),
        }
    }

    pub fn count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    #[inline]
    pub fn segment_of(&self, member: u32) -> u32 {
        self.index[member as usize]
    }

    #[inline]
    pub fn bounds(&self, segment: u32) -> Range<u32> {
        self.offsets[segment as usize]..self.offsets[segment as usize + 1]
    }

    /// Iterates the segments touched by a sorted element array.
    pub fn transient_segments<'a>(&'a self, elements: &'a [u32]) -> SegmentIterator<'a> {
        self.transient_segments_in(elements, 0..elements.len())
    }

    /// Like [`transient_segments`](Self::transient_segments) but restricted to
    /// positions `range` of `elements`.
    pub fn transient_segments_in<'a>(
        &'a self,
        elements: &'a [u32],
        range: Range<usize>,
    ) -> SegmentIterator<'a> {
        SegmentIterator {
            segmentation: self,
            elements,
            position: range.start,
            end: range.end.min(elements.len()),
        }
    }
}

pub struct SegmentIterator<'a> {
    segmentation: &'a Segmentation,
    elements: &'a [u32],
    position: usize,
    end: usize,
}

impl Iterator for SegmentIterator<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.position >= self.end {
            return None;
        }
        let start = self.position;
        let segment = self.segmentation.segment_of(self.elements[start]);
        let segment_end = self.segmentation.offsets[segment as usize + 1];
        let end = start
            + self.elements[start..self.end].partition_point(|&element| element < segment_end);
        self.position = end;
        Some(Segment {
            index: segment,
            start,
            end,
        })
    }
}
