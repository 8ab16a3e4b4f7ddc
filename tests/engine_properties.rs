//! Property tests for the yield, pricing, stock-gate and composition rules

use proptest::prelude::*;

use pws::engine::bom::{validate_prototype, BomLine, Nominal, SkidRef};
use pws::engine::pricing::{composite_unit_price, order_total, prototype_cost, LineCost, OrderLineCost, ParentCost};
use pws::engine::stock::validate_stock_request;
use pws::engine::units::ItemKind;
use pws::engine::yield_calc::{compute_max_stock, compute_yield};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn nominal() -> Nominal<'static> {
    Nominal {
        title: "Euro 120x80",
        length: Some(120.0),
        width: Some(80.0),
    }
}

proptest! {
    #[test]
    fn yield_of_equal_lengths_is_one(length in 0.1f64..1000.0, kerf in 0.0f64..5.0) {
        prop_assert_eq!(compute_yield(length, length, kerf), 1);
    }

    #[test]
    fn yield_of_longer_child_is_zero(
        parent in 0.1f64..1000.0,
        extra in 0.01f64..500.0,
        kerf in 0.0f64..5.0,
    ) {
        prop_assert_eq!(compute_yield(parent, parent + extra, kerf), 0);
    }

    #[test]
    fn yield_never_panics_on_garbage(
        parent in prop::num::f64::ANY,
        child in prop::num::f64::ANY,
        kerf in prop::num::f64::ANY,
    ) {
        let pieces = compute_yield(parent, child, kerf);
        if !(parent.is_finite() && parent > 0.0 && child.is_finite() && child > 0.0) {
            prop_assert_eq!(pieces, 0);
        }
    }

    #[test]
    fn yield_fits_inside_parent(parent in 1.0f64..1000.0, child in 1.0f64..200.0, kerf in 0.0f64..5.0) {
        prop_assert!(compute_yield(parent, child, kerf + 0.5) <= compute_yield(parent, child, kerf) + 1);
        prop_assert!(compute_yield(parent, child, kerf) as f64 * child <= parent + kerf + 1e-6);
    }

    #[test]
    fn max_stock_is_product(pieces in 0u64..10_000, stock in 0u64..1_000_000) {
        prop_assert_eq!(compute_max_stock(pieces, stock), pieces * stock);
    }

    #[test]
    fn gate_accepts_exactly_within_capacity(requested in 0u64..100_000, capacity in 0u64..100_000) {
        match validate_stock_request(requested, capacity) {
            Ok(()) => prop_assert!(requested <= capacity),
            Err(e) => {
                prop_assert!(requested > capacity);
                prop_assert_eq!(e.required_additional, requested - capacity);
                prop_assert_eq!(e.available, capacity);
            }
        }
    }

    #[test]
    fn composite_price_scales_with_units(
        prices in prop::collection::vec(0.0f64..500.0, 1..5),
        k in 1u32..20,
    ) {
        let base: Vec<ParentCost> = prices.iter().map(|&p| ParentCost { unit_price: p, units: 1 }).collect();
        let scaled: Vec<ParentCost> = prices.iter().map(|&p| ParentCost { unit_price: p, units: k }).collect();
        prop_assert!(close(composite_unit_price(&scaled), f64::from(k) * composite_unit_price(&base)));
    }

    #[test]
    fn prototype_cost_ignores_line_order(
        lines in prop::collection::vec((0.0f64..100.0, 1u32..200), 0..8),
    ) {
        let forward: Vec<LineCost> = lines.iter().map(|&(unit_price, quantity)| LineCost { unit_price, quantity }).collect();
        let mut backward = forward.clone();
        backward.reverse();

        let cost = prototype_cost(&forward);
        prop_assert!(cost >= 0.0);
        prop_assert!(close(cost, prototype_cost(&backward)));
    }

    #[test]
    fn order_total_is_linear_in_quantity(cost in 0.0f64..1000.0, quantity in 1u32..10_000) {
        let total = order_total(&[OrderLineCost { prototype_cost: cost, quantity }]);
        prop_assert!(close(total, cost * f64::from(quantity)));
    }

    #[test]
    fn prototype_without_nails_is_rejected(boards in 1u32..10, blocks in 1u32..20) {
        let lines = vec![
            BomLine::new(ItemKind::BoardType, "PART-B", boards),
            BomLine::new(ItemKind::BlockType, "PART-K", blocks),
        ];
        let err = validate_prototype(nominal(), &lines, None).unwrap_err();
        prop_assert_eq!(err.field.as_deref(), Some("lines"));
    }

    #[test]
    fn prototype_with_nails_and_skid_or_parts_is_accepted(
        nails in 1u32..200,
        skids in 1u32..5,
        use_skid in any::<bool>(),
    ) {
        let mut lines = vec![BomLine::new(ItemKind::Nail, "RAW-N", nails)];
        let skid = if use_skid {
            Some(SkidRef { part: "PART-S".to_string(), quantity: skids })
        } else {
            lines.push(BomLine::new(ItemKind::BoardType, "PART-B", 9));
            lines.push(BomLine::new(ItemKind::BlockType, "PART-K", 9));
            None
        };
        prop_assert!(validate_prototype(nominal(), &lines, skid.as_ref()).is_ok());
    }
}

#[test]
fn empty_prototype_costs_nothing() {
    assert_eq!(prototype_cost(&[]), 0.0);
    assert_eq!(order_total(&[]), 0.0);
}

#[test]
fn board_without_block_is_rejected() {
    let lines = vec![
        BomLine::new(ItemKind::Nail, "RAW-N", 50),
        BomLine::new(ItemKind::BoardType, "PART-B", 9),
    ];
    let err = validate_prototype(nominal(), &lines, None).unwrap_err();
    assert!(err.message.contains("block type"));
}
