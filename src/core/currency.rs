//! Currency codes and the fixed exchange-rate table.
//!
//! All conversions go through a single base currency (US dollars). The rate table
//! is the one source of truth for every calculation in the crate: per-project
//! allocation and dashboard summaries both read [`Currency::rate_to_base`].
//! Adding a currency means adding one enum variant and one table entry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::warn;

use crate::errors::Error;

/// Version tag of the rate table below. Bump whenever a rate changes.
pub const RATE_TABLE_VERSION: &str = "2024-06";

/// The currency every rate in the table is expressed against.
pub const BASE_CURRENCY: Currency = Currency::Dollars;

/// Supported currency codes. Stored as their lowercase code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Indian rupee
    #[sea_orm(string_value = "inr")]
    Inr,
    /// US dollar (base currency)
    #[sea_orm(string_value = "dollars")]
    Dollars,
    /// Euro
    #[sea_orm(string_value = "euro")]
    Euro,
    /// Pakistani rupee
    #[sea_orm(string_value = "pkr")]
    Pkr,
    /// Pound sterling
    #[sea_orm(string_value = "gbp")]
    Gbp,
    /// Canadian dollar
    #[sea_orm(string_value = "cad")]
    Cad,
    /// Australian dollar
    #[sea_orm(string_value = "aud")]
    Aud,
}

impl Currency {
    /// Every supported currency, in table order.
    pub const ALL: [Self; 7] = [
        Self::Inr,
        Self::Dollars,
        Self::Euro,
        Self::Pkr,
        Self::Gbp,
        Self::Cad,
        Self::Aud,
    ];

    /// Units of this currency that one unit of the base currency buys.
    #[must_use]
    pub const fn rate_to_base(self) -> f64 {
        match self {
            Self::Inr => 83.0,
            Self::Dollars => 1.0,
            Self::Euro => 0.92,
            Self::Pkr => 278.0,
            Self::Gbp => 0.79,
            Self::Cad => 1.36,
            Self::Aud => 1.52,
        }
    }

    /// Canonical lowercase code, as stored in the database.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Inr => "inr",
            Self::Dollars => "dollars",
            Self::Euro => "euro",
            Self::Pkr => "pkr",
            Self::Gbp => "gbp",
            Self::Cad => "cad",
            Self::Aud => "aud",
        }
    }

    /// Normalizes a user-supplied code or alias to a supported currency.
    ///
    /// Matching ignores case and surrounding whitespace. Both `"usd"` and
    /// `"dollars"` map to [`Currency::Dollars`], `"eur"` and `"euro"` to
    /// [`Currency::Euro`], and so on.
    #[must_use]
    pub fn normalize(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "inr" | "rupees" => Some(Self::Inr),
            "dollars" | "dollar" | "usd" | "$" => Some(Self::Dollars),
            "euro" | "euros" | "eur" => Some(Self::Euro),
            "pkr" => Some(Self::Pkr),
            "gbp" | "pound" | "pounds" => Some(Self::Gbp),
            "cad" => Some(Self::Cad),
            "aud" => Some(Self::Aud),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s).ok_or_else(|| Error::UnknownCurrency {
            code: s.to_string(),
        })
    }
}

/// Converts `amount` from one supported currency to another.
///
/// Same-currency conversions return the input untouched so no-op conversions
/// never pick up floating-point drift. Everything else goes through the base.
#[must_use]
pub fn convert(amount: f64, from: Currency, to: Currency) -> f64 {
    if from == to {
        return amount;
    }

    let amount_in_base = if from == BASE_CURRENCY {
        amount
    } else {
        amount / from.rate_to_base()
    };

    if to == BASE_CURRENCY {
        amount_in_base
    } else {
        amount_in_base * to.rate_to_base()
    }
}

/// Converts between two raw currency codes, failing open.
///
/// Codes are normalized through [`Currency::normalize`] first. If either code
/// is unknown the amount is returned unconverted and a warning is logged, so a
/// bad import degrades display accuracy instead of breaking a summary. Callers
/// that need strict conversion should parse codes with [`Currency::from_str`].
#[must_use]
pub fn convert_codes(amount: f64, from: &str, to: &str) -> f64 {
    match (Currency::normalize(from), Currency::normalize(to)) {
        (Some(from), Some(to)) => convert(amount, from, to),
        (from_currency, to_currency) => {
            warn!(
                from,
                to,
                from_known = from_currency.is_some(),
                to_known = to_currency.is_some(),
                "Unknown currency code, returning amount unconverted"
            );
            amount
        }
    }
}
