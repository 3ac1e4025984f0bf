//! Division of the pixel list into per-worker ranges.
//!
//! Every pass splits the flat accumulator array into contiguous,
//! disjoint ranges, one per worker thread, so no pixel is written by two
//! workers.

/// A contiguous run of pixel indices handed to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRange {
    /// First pixel index
    pub start: usize,
    /// One past the last pixel index
    pub end: usize,
    /// Index of this range within the pass
    pub index: usize,
}

impl PixelRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `pixel_count` pixels into `count` contiguous ranges.
///
/// Ranges are equal-sized except the last, which also takes the
/// remainder. `count` of zero is treated as one.
pub fn split_ranges(pixel_count: usize, count: usize) -> Vec<PixelRange> {
    let count = count.max(1);
    let per_range = pixel_count / count;

    (0..count)
        .map(|index| {
            let start = index * per_range;
            let end = if index + 1 == count {
                pixel_count
            } else {
                start + per_range
            };
            PixelRange { start, end, index }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_cover_all_pixels() {
        let ranges = split_ranges(1000, 6);
        assert_eq!(ranges.len(), 6);
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges.last().unwrap().end, 1000);

        let total: usize = ranges.iter().map(|r| r.len()).sum();
        assert_eq!(total, 1000);
    }

    #[test]
    fn test_ranges_are_contiguous_and_disjoint() {
        let ranges = split_ranges(97, 8);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for (i, range) in ranges.iter().enumerate() {
            assert_eq!(range.index, i);
        }
    }

    #[test]
    fn test_last_range_takes_remainder() {
        let ranges = split_ranges(10, 3);
        assert_eq!(ranges[0].len(), 3);
        assert_eq!(ranges[1].len(), 3);
        assert_eq!(ranges[2].len(), 4);
    }

    #[test]
    fn test_more_ranges_than_pixels() {
        let ranges = split_ranges(2, 4);
        assert_eq!(ranges.len(), 4);
        assert!(ranges[..3].iter().all(|r| r.is_empty()));
        assert_eq!((ranges[3].start, ranges[3].end), (0, 2));
    }

    #[test]
    fn test_zero_count_is_one_range() {
        let ranges = split_ranges(5, 0);
        assert_eq!(ranges, vec![PixelRange { start: 0, end: 5, index: 0 }]);
    }
}
