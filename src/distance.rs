//! Distance model: Euclidean legs and the periodic leg penalty.
//!
//! Every `PENALTY_PERIOD`-th leg of a depot-bounded tour costs
//! `PENALTY_FACTOR` times its distance unless it departs from a city whose id
//! is prime.

/// Multiplier applied to a penalised leg.
pub const PENALTY_FACTOR: f64 = 1.1;

/// Legs whose 1-based step is a multiple of this are candidates for the penalty.
pub const PENALTY_PERIOD: usize = 10;

/// Euclidean distance between two points.
#[inline]
pub fn euclidean(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Primality by trial division. Ids below 2 are not prime.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    let mut i = 5;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Whether the leg leaving `from_id` at `step` is penalised.
///
/// `step` is the 1-based index of the leg in the tour with the depot
/// prepended, which is also the 1-based position of the source city.
#[inline]
pub fn is_penalized(from_id: usize, step: usize) -> bool {
    step % PENALTY_PERIOD == 0 && !is_prime(from_id)
}

/// Cost of one leg given the raw distance between its endpoints.
#[inline]
pub fn penalized_cost(distance: f64, from_id: usize, step: usize) -> f64 {
    if is_penalized(from_id, step) {
        distance * PENALTY_FACTOR
    } else {
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean() {
        assert!((euclidean((0.0, 0.0), (3.0, 4.0)) - 5.0).abs() < 1e-12);
        assert_eq!(euclidean((1.5, -2.0), (1.5, -2.0)), 0.0);
    }

    #[test]
    fn test_primes() {
        let primes: Vec<usize> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(is_prime(7919));
        assert!(!is_prime(7917));
    }

    #[test]
    fn test_penalty_only_on_tenth_step_from_non_prime() {
        // 4 is not prime, 7 is.
        assert!(is_penalized(4, 10));
        assert!(is_penalized(4, 20));
        assert!(!is_penalized(7, 10));
        assert!(!is_penalized(4, 9));
        assert!(!is_penalized(4, 11));
        // depot and 1 count as non-prime
        assert!(is_penalized(0, 10));
        assert!(is_penalized(1, 30));

        assert!((penalized_cost(2.0, 4, 10) - 2.2).abs() < 1e-12);
        assert_eq!(penalized_cost(2.0, 7, 10), 2.0);
        assert_eq!(penalized_cost(2.0, 4, 3), 2.0);
    }
}
