//! Partner share distribution.
//!
//! Payouts are advisory: they say how a project's final amount would be split, no
//! money moves. Shares on one project may total less than 100% (the remainder stays
//! with the owner) but never more.

use crate::errors::{Error, Result};
use std::collections::HashSet;

/// Slack allowed when comparing a share total against 100%, so evenly split
/// headroom like `3 x 33.333...` is not rejected for rounding.
pub const SHARE_TOLERANCE: f64 = 1e-9;

/// One partner's share percentage on a project.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerShare {
    /// Stable partner id
    pub partner_id: String,
    /// Share of the final amount (0-100)
    pub share_percent: f64,
}

impl PartnerShare {
    /// Builds a share entry.
    pub fn new(partner_id: impl Into<String>, share_percent: f64) -> Self {
        Self {
            partner_id: partner_id.into(),
            share_percent,
        }
    }
}

/// A partner's computed payout.
#[derive(Debug, Clone, PartialEq)]
pub struct Payout {
    /// Stable partner id
    pub partner_id: String,
    /// `final_amount * share_percent / 100`
    pub amount: f64,
}

/// Sum of all share percentages.
#[must_use]
pub fn total_share_percent(partners: &[PartnerShare]) -> f64 {
    partners.iter().map(|p| p.share_percent).sum()
}

/// Splits `final_amount` among partners by their share percentages.
#[must_use]
pub fn distribute(final_amount: f64, partners: &[PartnerShare]) -> Vec<Payout> {
    partners
        .iter()
        .map(|partner| Payout {
            partner_id: partner.partner_id.clone(),
            amount: final_amount * partner.share_percent / 100.0,
        })
        .collect()
}

/// Checks a partner list before it is persisted.
///
/// # Errors
/// - [`Error::InvalidPercentage`] if any share is outside `0..=100` or not finite
/// - [`Error::DuplicatePartner`] if a partner id appears twice
/// - [`Error::SharesExceedLimit`] if the shares total more than 100%
pub fn validate_shares(partners: &[PartnerShare]) -> Result<()> {
    let mut seen = HashSet::new();
    for partner in partners {
        if !partner.share_percent.is_finite() || !(0.0..=100.0).contains(&partner.share_percent) {
            return Err(Error::InvalidPercentage {
                value: partner.share_percent,
            });
        }
        if !seen.insert(partner.partner_id.as_str()) {
            return Err(Error::DuplicatePartner {
                partner_id: partner.partner_id.clone(),
            });
        }
    }

    let total = total_share_percent(partners);
    if total > 100.0 + SHARE_TOLERANCE {
        return Err(Error::SharesExceedLimit { total });
    }
    Ok(())
}

/// Percentage still unassigned on a project.
#[must_use]
pub fn remaining_headroom(existing: &[PartnerShare]) -> f64 {
    (100.0 - total_share_percent(existing)).max(0.0)
}

/// Gives each newly added partner an equal slice of the remaining headroom.
///
/// Used when several partners are added at once ("add all"): with `R%`
/// unassigned and `n` new partners, each one gets `R / n`.
#[must_use]
pub fn split_headroom(existing: &[PartnerShare], new_partner_ids: &[String]) -> Vec<PartnerShare> {
    if new_partner_ids.is_empty() {
        return Vec::new();
    }

    #[allow(clippy::cast_precision_loss)] // partner counts are tiny
    let each = remaining_headroom(existing) / new_partner_ids.len() as f64;

    new_partner_ids
        .iter()
        .map(|id| PartnerShare::new(id.clone(), each))
        .collect()
}
