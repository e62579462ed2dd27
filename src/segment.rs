use crate::error::{Result, SieveError};

/// One contiguous slice of [0, N], inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: usize, // Position in the plan, used to detect duplicate reports
    pub low: u64,
    pub high: u64,
}

impl Segment {
    /// Count of integers covered by this segment
    pub fn width(&self) -> u64 {
        self.high - self.low + 1
    }
}

/// Primes found in one segment, handed off to the aggregator by value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentResult {
    pub segment: Segment,
    pub primes: Vec<u64>,
}

/// Lazy partition of [0, limit] into segments of `width` numbers
///
/// Segments come out in ascending order of `low`, tile the range with no gaps
/// or overlaps, and only the last one may be shorter than `width`.
#[derive(Debug, Clone)]
pub struct SegmentPlan {
    limit: u64,
    width: u64,
    next_low: Option<u64>,
    next_index: usize,
    total: usize,
}

impl SegmentPlan {
    /// Fails with `InvalidConfiguration` when `width` is zero.
    pub fn new(limit: u64, width: u64) -> Result<Self> {
        if width == 0 {
            return Err(SieveError::InvalidConfiguration(
                "segment width must be greater than 0".to_string(),
            ));
        }

        // ceil((N + 1) / W), widened so N = u64::MAX stays representable
        let total = (limit as u128 + 1).div_ceil(width as u128);

        Ok(Self {
            limit,
            width,
            next_low: Some(0),
            next_index: 0,
            total: usize::try_from(total).unwrap_or(usize::MAX),
        })
    }
}

impl Iterator for SegmentPlan {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let low = self.next_low?;
        let high = low.saturating_add(self.width - 1).min(self.limit);

        // high == limit ends the plan; this also covers limit == u64::MAX
        self.next_low = if high == self.limit {
            None
        } else {
            Some(high + 1)
        };

        let segment = Segment {
            index: self.next_index,
            low,
            high,
        };
        self.next_index += 1;
        Some(segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next_index.min(self.total);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SegmentPlan {}

/// Bit-vector with one bit per integer of a segment.
///
/// A set bit means "composite". Bits are packed into u64 words; the tail of
/// the last word beyond `len` is never reported.
#[derive(Debug, Clone)]
pub struct SegmentBits {
    words: Vec<u64>,
    len: usize,
}

impl SegmentBits {
    /// All `len` bits start cleared ("not composite")
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0_u64; len.div_ceil(64)],
            len,
        }
    }

    #[inline]
    pub fn set(&mut self, idx: usize) {
        self.words[idx / 64] |= 1_u64 << (idx % 64);
    }

    #[inline]
    pub fn is_set(&self, idx: usize) -> bool {
        (self.words[idx / 64] & (1_u64 << (idx % 64))) != 0
    }

    /// Set every `step`-th bit from `start` to the end
    #[inline]
    pub fn mark_every(&mut self, start: usize, step: usize) {
        let mut idx = start;
        while idx < self.len {
            self.set(idx);
            idx += step;
        }
    }

    /// Indices of the cleared bits, ascending
    pub fn clear_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let len = self.len;
        self.words.iter().enumerate().flat_map(move |(word_idx, &word)| {
            let base = word_idx * 64;
            let mut candidates = !word;

            // Drop padding bits past the end of the segment
            let valid = len - base;
            if valid < 64 {
                candidates &= (1_u64 << valid) - 1;
            }

            std::iter::from_fn(move || {
                if candidates == 0 {
                    return None;
                }
                let bit_idx = candidates.trailing_zeros() as usize;
                candidates &= candidates - 1; // Clear lowest set bit
                Some(base + bit_idx)
            })
        })
    }
}

/// Sieve one segment against the base primes.
///
/// Returns the ascending primes in [max(low, 2), high]. `base` must contain
/// every prime up to sqrt(high).
pub fn sieve_segment(segment: Segment, base: &[u64]) -> SegmentResult {
    let low = segment.low as u128;
    let high = segment.high as u128;
    let mut bits = SegmentBits::new(segment.width() as usize);

    for &p in base {
        let p = p as u128;
        let square = p * p;
        if square > high {
            break; // No larger base prime has a multiple to mark here
        }

        // Multiples below p*p were already marked by smaller primes, and
        // starting there never marks p itself.
        let first_multiple = low.div_ceil(p) * p;
        let start = first_multiple.max(square);
        if start > high {
            continue;
        }

        bits.mark_every((start - low) as usize, p as usize);
    }

    let primes = bits
        .clear_indices()
        .map(|idx| segment.low + idx as u64)
        .filter(|&num| num >= 2)
        .collect();

    SegmentResult { segment, primes }
}
