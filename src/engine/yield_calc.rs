//! Yield calculator - how many child pieces one parent unit gives, and what
//! that means for the maximum child stock

/// Ratios this close to the next integer count as that integer. Lengths are
/// entered as decimals, so `0.3 / 0.1` must give 3 and not 2.
const RATIO_EPSILON: f64 = 1e-9;

/// Pieces of `child_length` cut from one parent of `parent_length`
///
/// `floor((parent + kerf) / (child + kerf))`: the kerf is added to both terms,
/// which models one saw cut per piece with the last piece needing no cut.
/// Non-positive or non-finite lengths give 0; a negative kerf counts as 0.
pub fn compute_yield(parent_length: f64, child_length: f64, kerf_margin: f64) -> u64 {
    if !(parent_length.is_finite() && child_length.is_finite()) {
        return 0;
    }
    if parent_length <= 0.0 || child_length <= 0.0 {
        return 0;
    }

    let kerf = if kerf_margin.is_finite() && kerf_margin > 0.0 {
        kerf_margin
    } else {
        0.0
    };

    let ratio = (parent_length + kerf) / (child_length + kerf);
    let nearest = ratio.round();
    let pieces = if (ratio - nearest).abs() < RATIO_EPSILON {
        nearest
    } else {
        ratio.floor()
    };

    // f64 -> u64 casts saturate
    pieces as u64
}

/// Maximum child stock producible from the parent's current stock
pub fn compute_max_stock(pieces_per_parent: u64, parent_stock: u64) -> u64 {
    pieces_per_parent.saturating_mul(parent_stock)
}

/// Capacity of an assembled part: the binding (minimum) parent constraint
///
/// Each entry is `(parent_stock, units_consumed_per_child)`. A parent that
/// consumes zero units is malformed and contributes zero capacity; no parents
/// at all also means zero.
pub fn assembly_capacity(parents: &[(u64, u32)]) -> u64 {
    parents
        .iter()
        .map(|&(stock, units)| if units == 0 { 0 } else { stock / u64::from(units) })
        .min()
        .unwrap_or(0)
}

/// Skid capacity using the registry's fixed board/block ratio
pub fn skid_capacity(board_type_stock: u64, block_type_stock: u64) -> u64 {
    use crate::engine::units::{SKID_BLOCK_UNITS, SKID_BOARD_UNITS};

    assembly_capacity(&[
        (board_type_stock, SKID_BOARD_UNITS),
        (block_type_stock, SKID_BLOCK_UNITS),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yield_with_kerf() {
        // floor(240.5 / 100.5) = 2
        assert_eq!(compute_yield(240.0, 100.0, 0.5), 2);
        // floor(120.5 / 40.5) = 2, not 3: three pieces need two cuts
        assert_eq!(compute_yield(120.0, 40.0, 0.5), 2);
        assert_eq!(compute_yield(120.0, 40.0, 0.0), 3);
    }

    #[test]
    fn test_yield_same_length_is_one() {
        assert_eq!(compute_yield(240.0, 240.0, 0.5), 1);
        assert_eq!(compute_yield(0.7, 0.7, 0.0), 1);
    }

    #[test]
    fn test_yield_absorbs_decimal_rounding() {
        assert_eq!(compute_yield(0.3, 0.1, 0.0), 3);
        assert_eq!(compute_yield(244.0, 12.2, 0.0), 20);
    }

    #[test]
    fn test_yield_degenerate_inputs() {
        assert_eq!(compute_yield(0.0, 10.0, 0.5), 0);
        assert_eq!(compute_yield(100.0, 0.0, 0.5), 0);
        assert_eq!(compute_yield(-100.0, 10.0, 0.5), 0);
        assert_eq!(compute_yield(100.0, -10.0, 0.5), 0);
        assert_eq!(compute_yield(f64::NAN, 10.0, 0.5), 0);
        assert_eq!(compute_yield(f64::INFINITY, 10.0, 0.5), 0);
        assert_eq!(compute_yield(100.0, 10.0, -2.0), 10);
    }

    #[test]
    fn test_child_longer_than_parent() {
        assert_eq!(compute_yield(100.0, 100.5, 0.0), 0);
    }

    #[test]
    fn test_max_stock() {
        assert_eq!(compute_max_stock(2, 40), 80);
        assert_eq!(compute_max_stock(0, 40), 0);
        assert_eq!(compute_max_stock(u64::MAX, 2), u64::MAX);
    }

    #[test]
    fn test_assembly_capacity_takes_minimum() {
        assert_eq!(skid_capacity(10, 30), 10);
        assert_eq!(skid_capacity(10, 29), 9);
        assert_eq!(skid_capacity(2, 300), 2);
        assert_eq!(assembly_capacity(&[(10, 1), (30, 0)]), 0);
        assert_eq!(assembly_capacity(&[]), 0);
    }
}
