//! Prime sizing for bucket arrays.
//!
//! Table capacities are always drawn from [`next_prime`]. Using a prime
//! modulus keeps clustering in the key distribution from aligning with the
//! bucket count, which matters here because keys are reduced by plain
//! `key mod capacity` rather than run through a hasher.

/// Curated ascending primes, roughly doubling at each step and avoiding
/// small common factors. Capacities beyond the last entry fall back to a
/// trial-division search.
const PRIMES: &[usize] = &[
    3, 7, 11, 17, 23, 29, 37, 47, 59, 71, 89, 107, 131, 163, 197, 239, 293, 353, 431, 521, 631,
    761, 919, 1103, 1327, 1597, 1931, 2333, 2801, 3371, 4049, 4861, 5839, 7013, 8419, 10103,
    12143, 14591, 17519, 21023, 25229, 30293, 36353, 43627, 52361, 62851, 75431, 90523, 108631,
    130363, 156437, 187751, 225307, 270371, 324449, 389357, 467237, 560689, 672827, 807403,
    968897, 1162687, 1395263, 1674319, 2009191, 2411033, 2893249, 3471899, 4166287, 4999559,
    5999471, 7199369,
];

/// Returns the smallest usable table size that is at least `min`.
///
/// The result is the first entry of the curated prime table not below `min`,
/// or, past the end of the table, the next prime found by checking odd
/// candidates upward from `min`.
///
/// # Examples
///
/// ```rust
/// # use glossary::primes::next_prime;
/// #
/// assert_eq!(next_prime(0), 3);
/// assert_eq!(next_prime(4), 7);
/// assert_eq!(next_prime(7), 7);
/// assert_eq!(next_prime(1000), 1103);
/// ```
pub fn next_prime(min: usize) -> usize {
    for &prime in PRIMES {
        if prime >= min {
            return prime;
        }
    }

    let mut candidate = min | 1;
    while !is_prime(candidate) {
        candidate += 2;
    }
    candidate
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }

    let mut divisor = 3;
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_hints_use_the_curated_table() {
        assert_eq!(next_prime(0), 3);
        assert_eq!(next_prime(1), 3);
        assert_eq!(next_prime(3), 3);
        assert_eq!(next_prime(4), 7);
        assert_eq!(next_prime(8), 11);
        assert_eq!(next_prime(7199369), 7199369);
    }

    #[test]
    fn table_is_ascending_and_prime() {
        let mut previous = 0;
        for &prime in PRIMES {
            assert!(prime > previous);
            assert!(is_prime(prime), "{prime} is not prime");
            previous = prime;
        }
    }

    #[test]
    fn hints_past_the_table_fall_back_to_search() {
        let hint = 7_199_370;
        let prime = next_prime(hint);
        assert!(prime >= hint);
        assert!(prime % 2 == 1);
        assert!(is_prime(prime));

        // The search starts at the hint itself when the hint is odd and
        // prime.
        let known_prime = next_prime(7_199_370 + 100);
        assert_eq!(next_prime(known_prime), known_prime);
    }

    #[test]
    fn is_prime_handles_edges() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(9));
        assert!(!is_prime(49));
        assert!(is_prime(104_729));
    }
}
