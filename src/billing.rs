use std::fmt;
use std::str::FromStr;

use num_format::{Buffer, Locale};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, VariantNames};

use crate::error::RunError;

#[derive(
    Display,
    EnumString,
    VariantNames,
    Serialize,
    Deserialize,
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
)]
pub enum Currency {
    #[strum(serialize = "USD")]
    #[serde(rename = "USD")]
    Usd,
    #[strum(serialize = "CAD")]
    #[serde(rename = "CAD")]
    Cad,
    #[strum(serialize = "EUR")]
    #[serde(rename = "EUR")]
    Eur,
    #[strum(serialize = "GBP")]
    #[serde(rename = "GBP")]
    Gbp,
    #[strum(serialize = "JPY")]
    #[serde(rename = "JPY")]
    Jpy,
}

impl Currency {
    pub fn from_code(code: &str) -> Result<Self, RunError> {
        Self::from_str(code.trim().to_uppercase().as_str()).map_err(|_| {
            RunError::UnknownCurrency {
                code: code.to_string(),
            }
        })
    }

    fn symbol(self) -> &'static str {
        match self {
            Currency::Usd | Currency::Cad => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
        }
    }

    /// Number of minor-unit digits after the decimal mark.
    fn exponent(self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    fn grouping(self) -> Locale {
        match self {
            Currency::Eur => Locale::de,
            _ => Locale::en,
        }
    }

    fn decimal_mark(self) -> char {
        match self {
            Currency::Eur => ',',
            _ => '.',
        }
    }
}

/// An amount in integer minor units of its currency.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub struct Money(Currency, i64);

impl Money {
    pub fn new(currency: Currency, minor_units: i64) -> Self {
        Self(currency, minor_units)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let factor = 10u64.pow(self.0.exponent());
        let abs = self.1.unsigned_abs();
        let mut whole = Buffer::default();
        whole.write_formatted(&(abs / factor), &self.0.grouping());

        if self.1 < 0 {
            write!(f, "-")?;
        }
        write!(f, "{}{}", self.0.symbol(), whole.as_str())?;
        if self.0.exponent() > 0 {
            write!(
                f,
                "{}{:0width$}",
                self.0.decimal_mark(),
                abs % factor,
                width = self.0.exponent() as usize
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: i64,
}

impl LineItem {
    /// Decode one item out of the YAML `items` sequence. Each element must be
    /// a 3-element sequence: `[description, quantity, unit_price]`.
    pub fn from_yaml(index: usize, value: &serde_yaml::Value) -> Result<Self, RunError> {
        let fields = value
            .as_sequence()
            .filter(|seq| seq.len() == 3)
            .ok_or_else(|| RunError::malformed_item(index))?;

        let description = fields[0]
            .as_str()
            .ok_or_else(|| RunError::malformed_item(index))?
            .to_string();
        let quantity = match &fields[1] {
            serde_yaml::Value::Number(n) if n.is_i64() => {
                n.as_i64().and_then(Decimal::from_i64)
            }
            serde_yaml::Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
            _ => None,
        }
        .ok_or_else(|| RunError::malformed_item(index))?;
        let unit_price = fields[2]
            .as_i64()
            .ok_or_else(|| RunError::malformed_item(index))?;

        Ok(Self {
            description,
            quantity,
            unit_price,
        })
    }

    /// Line total in minor units, rounded half-to-even for fractional
    /// quantities.
    pub fn line_total(&self) -> i64 {
        (Decimal::from(self.unit_price) * self.quantity)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .expect("line total out of range")
    }
}

/// Grand total of all line items in minor units.
pub fn total(items: &[LineItem]) -> i64 {
    items.iter().map(LineItem::line_total).sum()
}
