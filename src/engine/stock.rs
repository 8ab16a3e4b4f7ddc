//! Stock availability gate

use crate::engine::error::InsufficientStock;

/// Accept `requested` only if it fits within `capacity`
///
/// Must run before any write, and again on update against the parent stock
/// at that moment, not the stock when the part was first created.
pub fn validate_stock_request(requested: u64, capacity: u64) -> Result<(), InsufficientStock> {
    if requested <= capacity {
        Ok(())
    } else {
        Err(InsufficientStock {
            required_additional: requested - capacity,
            available: capacity,
        })
    }
}

/// Unused capacity, zero when the stock already overdraws it
pub fn headroom(stock: u64, capacity: u64) -> u64 {
    capacity.saturating_sub(stock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_capacity() {
        assert!(validate_stock_request(80, 80).is_ok());
        assert!(validate_stock_request(0, 0).is_ok());
    }

    #[test]
    fn test_over_capacity_reports_shortfall() {
        let err = validate_stock_request(81, 80).unwrap_err();
        assert_eq!(err.required_additional, 1);
        assert_eq!(err.available, 80);

        let err = validate_stock_request(5, 0).unwrap_err();
        assert_eq!(err.required_additional, 5);
        assert_eq!(err.available, 0);
    }

    #[test]
    fn test_headroom() {
        assert_eq!(headroom(30, 80), 50);
        assert_eq!(headroom(90, 80), 0);
    }
}
