//! Cross-check of a sieve result against GMP's primality test.

use rug::Integer;
use rug::integer::IsPrime;

/// Miller-Rabin rounds passed to GMP
const REPS: u32 = 25;

/// Independent primality predicate used to audit sieve output
pub fn is_prime(n: u64) -> bool {
    Integer::from(n).is_probably_prime(REPS) != IsPrime::No
}

/// Where a prime list disagrees with the oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Listed value that is not prime
    Composite(u64),
    /// Prime missing from the list
    Missing(u64),
    /// Listed value outside [0, limit]
    OutOfRange(u64),
    /// Not strictly ascending at this position
    Unordered { index: usize, value: u64 },
}

/// Result of auditing one prime list
#[derive(Debug, Default)]
pub struct Report {
    pub checked: u64,
    pub mismatches: Vec<Mismatch>,
}

impl Report {
    pub fn is_ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Check every value in [0, limit]: listed values must be prime, unlisted
/// values must not be, and the list must be strictly ascending.
///
/// Stops collecting after `max_mismatches` problems.
pub fn audit(primes: &[u64], limit: u64, max_mismatches: usize) -> Report {
    let mut report = Report::default();

    for (index, pair) in primes.windows(2).enumerate() {
        if pair[0] >= pair[1] && report.mismatches.len() < max_mismatches {
            report.mismatches.push(Mismatch::Unordered {
                index: index + 1,
                value: pair[1],
            });
        }
    }
    if let Some(&last) = primes.last() {
        if last > limit && report.mismatches.len() < max_mismatches {
            report.mismatches.push(Mismatch::OutOfRange(last));
        }
    }

    let mut listed = primes.iter().copied().peekable();
    for n in 0..=limit {
        let mut in_list = false;
        while let Some(&p) = listed.peek() {
            if p > n {
                break;
            }
            in_list |= p == n;
            listed.next();
        }

        let prime = is_prime(n);
        report.checked += 1;
        if report.mismatches.len() >= max_mismatches {
            continue;
        }
        match (in_list, prime) {
            (true, false) => report.mismatches.push(Mismatch::Composite(n)),
            (false, true) => report.mismatches.push(Mismatch::Missing(n)),
            _ => {}
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_small_values() {
        let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn test_oracle_large_values() {
        assert!(is_prime(18_446_744_073_709_551_557));
        assert!(!is_prime(u64::MAX));
        assert!(!is_prime(4_294_967_297)); // 641 * 6700417
    }

    #[test]
    fn test_audit_accepts_correct_list() {
        let report = audit(&[2, 3, 5, 7], 10, 10);
        assert!(report.is_ok());
        assert_eq!(report.checked, 11);
    }

    #[test]
    fn test_audit_flags_problems() {
        let report = audit(&[2, 3, 9, 7], 10, 10);
        assert!(report.mismatches.contains(&Mismatch::Composite(9)));
        assert!(report.mismatches.contains(&Mismatch::Missing(5)));
        assert!(report.mismatches.contains(&Mismatch::Unordered { index: 3, value: 7 }));

        let report = audit(&[2, 3, 11], 10, 10);
        assert!(report.mismatches.contains(&Mismatch::OutOfRange(11)));
    }

    #[test]
    fn test_audit_caps_mismatches() {
        let report = audit(&[], 1_000, 3);
        assert_eq!(report.mismatches.len(), 3);
        assert_eq!(report.checked, 1_001);
    }
}
