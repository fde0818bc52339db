//! Waterfall calculation - the ordered deduction chain of a single project.
//!
//! Deductions are applied in a fixed order: platform fee (percentage of the gross
//! price), then allocated expenses (absolute, already in the project currency),
//! then an optional charity deduction (percentage of what is left). Intermediate
//! amounts may go negative; only the final amount is clamped to zero.
//!
//! Everything here is a pure function of its inputs. Persisting the result is the
//! job of [`crate::core::recalc`].

/// Share of the post-expense amount that goes to charity when it is enabled.
pub const CHARITY_RATE: f64 = 0.05;

/// Every intermediate and final amount of one project's waterfall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waterfall {
    /// `price * fee_percent / 100`
    pub platform_fee_amount: f64,
    /// `price - platform_fee_amount`
    pub after_platform_fee: f64,
    /// Total of linked active expenses in the project currency
    pub allocated_expenses: f64,
    /// `after_platform_fee - allocated_expenses`, may be negative
    pub after_expenses: f64,
    /// 5% of the non-negative part of `after_expenses` when charity is enabled
    pub charity_amount: f64,
    /// `after_expenses - charity_amount`, may be negative
    pub after_charity: f64,
    /// `max(after_charity, 0)`, the base for partner distribution
    pub final_amount: f64,
}

/// Computes the deduction chain for one project.
///
/// # Arguments
/// * `price` - Gross project price
/// * `fee_percent` - Platform fee percentage (0-100)
/// * `allocated_expenses` - Linked expense total, already converted to the project currency
/// * `charity_enabled` - Whether the charity deduction applies
#[must_use]
pub fn compute_waterfall(
    price: f64,
    fee_percent: f64,
    allocated_expenses: f64,
    charity_enabled: bool,
) -> Waterfall {
    let platform_fee_amount = price * fee_percent / 100.0;
    let after_platform_fee = price - platform_fee_amount;
    let after_expenses = after_platform_fee - allocated_expenses;

    // An underwater project never produces negative charity.
    let charity_amount = if charity_enabled {
        after_expenses.max(0.0) * CHARITY_RATE
    } else {
        0.0
    };

    let after_charity = after_expenses - charity_amount;
    let final_amount = after_charity.max(0.0);

    Waterfall {
        platform_fee_amount,
        after_platform_fee,
        allocated_expenses,
        after_expenses,
        charity_amount,
        after_charity,
        final_amount,
    }
}
