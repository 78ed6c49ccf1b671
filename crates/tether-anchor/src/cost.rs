//! Idle energy cost of holding regions.
//!
//! Cost grows with the triangular number of held regions:
//!
//! ```text
//! idle_cost(n) = base + n(n + 1) / 2
//! ```
//!
//! so each extra region costs one more than the previous one did. Large
//! holdings get expensive quickly.

/// Base idle cost of an anchor holding nothing.
pub const DEFAULT_BASE_IDLE_COST: u64 = 80;

// T(n) = n(n + 1) / 2
#[inline]
const fn triangular(n: u64) -> u64 {
    n * (n + 1) / 2
}

/// Idle cost of holding `held` regions on top of `base`.
///
/// # Examples
///
/// ```
/// use tether_anchor::idle_cost;
///
/// assert_eq!(idle_cost(80, 0), 80);
/// assert_eq!(idle_cost(80, 3), 86);
/// ```
#[inline]
pub const fn idle_cost(base: u64, held: usize) -> u64 {
    base + triangular(held as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_regions() {
        let base = DEFAULT_BASE_IDLE_COST;
        assert_eq!(idle_cost(base, 0), base);
        assert_eq!(idle_cost(base, 1), base + 1);
        assert_eq!(idle_cost(base, 2), base + 3);
        assert_eq!(idle_cost(base, 3), base + 6);
    }

    #[test]
    fn next_region_costs_one_more() {
        for n in 0..100usize {
            assert_eq!(
                idle_cost(0, n + 1) - idle_cost(0, n),
                n as u64 + 1,
                "marginal cost at {}",
                n
            );
        }
    }

    #[test]
    fn relocation_square_cost() {
        // 9x9 bridge neighborhood
        assert_eq!(idle_cost(80, 81), 80 + 3321);
    }

    #[test]
    fn cost_strictly_increasing() {
        let mut prev = idle_cost(0, 0);
        for n in 1..=64 {
            let c = idle_cost(0, n);
            assert!(c > prev);
            prev = c;
        }
    }
}
