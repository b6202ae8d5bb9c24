use rust_decimal::Decimal;

use super::value_objects::OrderLine;

// ============================================================================
// Pricing Engine
// ============================================================================
//
// positions  = sum(price * quantity)
// discount   = positions * (discount_percent + volume points) / 100
// tax        = (positions - discount) * tax_percent / 100
// shipping   = 0 once (positions - discount) exceeds the free-shipping level
// total      = positions - discount + tax + shipping
//
// All arithmetic is exact decimal arithmetic; nothing is rounded. Inputs
// are not guarded, so negative prices or quantities compute silently.
//
// ============================================================================

/// Pre-discount item total above which the volume promotion applies.
pub const VOLUME_PROMOTION_THRESHOLD: Decimal = Decimal::from_parts(150_000, 0, 0, false, 0);

/// Percentage points added to the order discount by the volume promotion.
pub const VOLUME_PROMOTION_POINTS: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Post-discount item total above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(2_000, 0, 0, false, 0);

/// Intermediate values of one pricing run.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub positions_total: Decimal,
    pub global_discount: Decimal,
    pub discount_total: Decimal,
    pub tax_total: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
}

impl PriceBreakdown {
    pub fn free_shipping(&self) -> bool {
        self.positions_total - self.discount_total > FREE_SHIPPING_THRESHOLD
    }
}

pub fn price_lines(
    lines: &[OrderLine],
    discount_percent: Decimal,
    tax_percent: Decimal,
    shipping_cost: Decimal,
) -> PriceBreakdown {
    let positions_total: Decimal = lines.iter().map(OrderLine::subtotal).sum();

    let global_discount = if positions_total > VOLUME_PROMOTION_THRESHOLD {
        VOLUME_PROMOTION_POINTS
    } else {
        Decimal::ZERO
    };

    let discount_total = positions_total * (discount_percent + global_discount) / Decimal::ONE_HUNDRED;
    let tax_total = (positions_total - discount_total) * tax_percent / Decimal::ONE_HUNDRED;

    let shipping_cost = if positions_total - discount_total > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        shipping_cost
    };

    PriceBreakdown {
        positions_total,
        global_discount,
        discount_total,
        tax_total,
        shipping_cost,
        total: positions_total - discount_total + tax_total + shipping_cost,
    }
}
