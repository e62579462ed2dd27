use std::ops::Deref;
use std::sync::Arc;

/// Odd-only, bit-packed Sieve of Eratosthenes
///
/// Produces the primes used to seed every segment.
/// - Memory: 1 bit per odd number (packed in u64 words)
/// - Time complexity: O(n log log n)
/// - Index mapping: bit i represents number (2*i + 3)
/// - 2 is handled as a special case and never sieved
pub fn base_primes(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return vec![];
    }
    if limit == 2 {
        return vec![2];
    }

    let mut primes = vec![2];

    // Only track odd numbers: 3, 5, 7, 9, 11, ...
    let odd_count = ((limit - 1) / 2) as usize;
    let size = odd_count.div_ceil(64);
    let mut is_prime = vec![!0_u64; size]; // All bits set to 1 (true)

    #[inline]
    fn get_bit(bits: &[u64], idx: usize) -> bool {
        (bits[idx / 64] & (1_u64 << (idx % 64))) != 0
    }

    #[inline]
    fn clear_bit(bits: &mut [u64], idx: usize) {
        bits[idx / 64] &= !(1_u64 << (idx % 64));
    }

    // Exact root; only odd p with p*p <= limit can mark anything
    let root = limit.isqrt();
    let mut i = 0;
    loop {
        let p = 2 * i as u64 + 3;
        if p > root {
            break;
        }
        if get_bit(&is_prime, i) {
            // Odd multiples of p starting at p*p, i.e. steps of 2p in value
            let mut j = ((p * p - 3) / 2) as usize;
            while j < odd_count {
                clear_bit(&mut is_prime, j);
                j += p as usize;
            }
        }
        i += 1;
    }

    // Collect odd primes word by word, skipping to set bits
    for (word_idx, &word) in is_prime.iter().enumerate() {
        let mut word = word;
        while word != 0 {
            let bit_idx = word.trailing_zeros() as usize;
            let i = word_idx * 64 + bit_idx;
            if i >= odd_count {
                break; // Past the end of valid bits
            }
            primes.push(2 * i as u64 + 3);
            word &= word - 1; // Clear the lowest set bit
        }
    }

    primes
}

/// The primes up to the square root of the sieve limit.
///
/// Built once per run and then only read, so workers share it through an
/// `Arc` without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePrimes(Arc<[u64]>);

impl BasePrimes {
    /// Base primes sufficient to sieve every segment of [0, limit]
    pub fn for_limit(limit: u64) -> Self {
        Self(base_primes(limit.isqrt()).into())
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }
}

impl From<Vec<u64>> for BasePrimes {
    fn from(primes: Vec<u64>) -> Self {
        Self(primes.into())
    }
}

impl Deref for BasePrimes {
    type Target = [u64];

    fn deref(&self) -> &[u64] {
        &self.0
    }
}
