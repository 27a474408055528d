use crate::error::{Result, StorefrontError};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places used when rendering cart totals.
pub const TOTAL_DECIMAL_PLACES: u32 = 3;
/// Largest accepted unit price.
pub const MAX_PRICE_AMOUNT: Decimal = dec!(1000000000000);
/// Most decimal places a unit price may carry (wei precision).
pub const MAX_PRICE_SCALE: u32 = 18;

/// A unit price: a non-negative decimal amount tagged with a currency unit.
///
/// The text form is `"<amount> <UNIT>"` (e.g. `"2.5 ETH"`), which is also how
/// a price is serialized so persisted carts keep the storefront's layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Price {
    amount: Decimal,
    unit: String,
}

impl Price {
    /// Amounts must be non-negative, at most [`MAX_PRICE_AMOUNT`] and carry
    /// no more than [`MAX_PRICE_SCALE`] decimals. The unit is one word.
    pub fn new(amount: Decimal, unit: impl Into<String>) -> Result<Self> {
        let unit = unit.into();
        if amount.is_sign_negative()
            || amount > MAX_PRICE_AMOUNT
            || amount.normalize().scale() > MAX_PRICE_SCALE
            || unit.is_empty()
            || unit.chars().any(char::is_whitespace)
        {
            return Err(StorefrontError::InvalidPrice {
                input: format!("{} {}", amount, unit),
            });
        }
        Ok(Self { amount, unit })
    }

    /// Parses `"<amount> <UNIT>"`. Both parts are required.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || StorefrontError::InvalidPrice {
            input: input.to_string(),
        };

        let mut parts = input.split_whitespace();
        let (Some(amount), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let amount = Decimal::from_str(amount).map_err(|_| invalid())?;
        Self::new(amount, unit).map_err(|_| invalid())
    }

    /// Parses a price, accepting a bare amount and tagging it with `unit`.
    pub fn parse_with_default_unit(input: &str, unit: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.split_whitespace().count() == 1 {
            let amount = Decimal::from_str(trimmed).map_err(|_| StorefrontError::InvalidPrice {
                input: input.to_string(),
            })?;
            Self::new(amount, unit)
        } else {
            Self::parse(trimmed)
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

impl FromStr for Price {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Price::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Renders a total with exactly three decimals followed by the unit label.
///
/// Amounts too wide for three decimals keep as many as fit.
pub fn format_total(amount: Decimal, unit: &str) -> String {
    let mut rounded = amount.round_dp_with_strategy(
        TOTAL_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    );
    rounded.rescale(TOTAL_DECIMAL_PLACES);
    format!("{} {}", rounded, unit)
}
