// ── Deck pricing engine ──
//
// Price adjustments (flat or percent, add or subtract), scoped to all
// sites, a set of site codes, or a base-price range. Adjusted prices can
// be converted into a client currency and expanded into a rate table
// across lease durations. Arithmetic is plain `f64` with no rounding;
// rounding happens only at display time through `Money`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::Site;

// ── Primitives ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Flat,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
}

/// Apply a single adjustment to `price`.
///
/// Percent: `delta = price * amount / 100`. Flat: `delta = amount`.
pub fn adjust(price: f64, amount: f64, kind: AdjustmentKind, operation: Operation) -> f64 {
    let delta = match kind {
        AdjustmentKind::Percent => price * amount / 100.0,
        AdjustmentKind::Flat => amount,
    };
    match operation {
        Operation::Add => price + delta,
        Operation::Subtract => price - delta,
    }
}

/// Inclusive price bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl FromStr for PriceRange {
    type Err = CoreError;

    /// `min..max`, `min..`, or `..max`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lo, hi) = s
            .split_once("..")
            .ok_or_else(|| CoreError::validation(format!("price range '{s}' must look like MIN..MAX")))?;
        let range = Self {
            min: parse_bound(lo)?,
            max: parse_bound(hi)?,
        };
        if let (Some(min), Some(max)) = (range.min, range.max) {
            if min > max {
                return Err(CoreError::validation(format!(
                    "price range minimum {min} exceeds maximum {max}"
                )));
            }
        }
        Ok(range)
    }
}

fn parse_bound(raw: &str) -> Result<Option<f64>, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_amount(raw).map(Some)
}

fn parse_amount(raw: &str) -> Result<f64, CoreError> {
    let value: f64 = raw
        .replace(['_', ','], "")
        .parse()
        .map_err(|_| CoreError::validation(format!("'{raw}' is not a number")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CoreError::validation(format!("'{raw}' is not a finite number")))
    }
}

// ── Adjustments ──────────────────────────────────────────────────────

/// Which sites an adjustment applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum AdjustmentScope {
    All,
    Sites(BTreeSet<String>),
    /// Matches on the site's base price, before any adjustment.
    PriceRange(PriceRange),
}

/// One price adjustment rule composed while building a deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAdjustment {
    pub amount: f64,
    pub kind: AdjustmentKind,
    pub operation: Operation,
    pub scope: AdjustmentScope,
}

impl PriceAdjustment {
    pub fn apply(&self, price: f64) -> f64 {
        adjust(price, self.amount, self.kind, self.operation)
    }

    pub fn applies_to(&self, site: &Site) -> bool {
        match &self.scope {
            AdjustmentScope::All => true,
            AdjustmentScope::Sites(codes) => {
                codes.iter().any(|c| c.eq_ignore_ascii_case(&site.code))
            }
            AdjustmentScope::PriceRange(range) => range.contains(site.price),
        }
    }
}

impl FromStr for PriceAdjustment {
    type Err = CoreError;

    /// Parse `[+|-]AMOUNT[%][@SCOPE]`.
    ///
    /// SCOPE is `all` (default), `MIN..MAX`, or a comma-separated list of
    /// site codes. Examples: `+10%`, `-5000@EDSA-001,EDSA-002`,
    /// `-5%@100000..200000`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, scope) = match s.split_once('@') {
            Some((value, scope)) => (value.trim(), Some(scope.trim())),
            None => (s.trim(), None),
        };

        let (operation, value) = if let Some(rest) = value.strip_prefix('-') {
            (Operation::Subtract, rest)
        } else {
            (Operation::Add, value.strip_prefix('+').unwrap_or(value))
        };

        let (kind, value) = match value.strip_suffix('%') {
            Some(rest) => (AdjustmentKind::Percent, rest),
            None => (AdjustmentKind::Flat, value),
        };

        let amount = parse_amount(value)?;
        if amount < 0.0 {
            return Err(CoreError::validation(format!(
                "adjustment '{s}' has a negative amount; use '-' for subtraction"
            )));
        }

        let scope = match scope {
            None => AdjustmentScope::All,
            Some(scope) if scope.eq_ignore_ascii_case("all") => AdjustmentScope::All,
            Some(scope) if scope.contains("..") => AdjustmentScope::PriceRange(scope.parse()?),
            Some(scope) => {
                let codes: BTreeSet<String> = scope
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect();
                if codes.is_empty() {
                    return Err(CoreError::validation(format!(
                        "adjustment '{s}' has an empty site list"
                    )));
                }
                AdjustmentScope::Sites(codes)
            }
        };

        Ok(Self {
            amount,
            kind,
            operation,
            scope,
        })
    }
}

/// Apply every matching adjustment, in list order, to the site's base price.
pub fn price_for(site: &Site, adjustments: &[PriceAdjustment]) -> f64 {
    adjustments
        .iter()
        .filter(|adj| adj.applies_to(site))
        .fold(site.price, |price, adj| adj.apply(price))
}

// ── Currency conversion ─────────────────────────────────────────────

/// Manually entered exchange rate: base-currency units per one unit of `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConversion {
    code: String,
    exchange_rate: f64,
}

impl CurrencyConversion {
    pub fn new(code: impl Into<String>, exchange_rate: f64) -> Result<Self, CoreError> {
        let code = code.into().trim().to_uppercase();
        if code.is_empty() {
            return Err(CoreError::validation("currency code is required"));
        }
        if !exchange_rate.is_finite() || exchange_rate <= 0.0 {
            return Err(CoreError::validation(format!(
                "exchange rate for {code} must be a positive number, got {exchange_rate}"
            )));
        }
        Ok(Self {
            code,
            exchange_rate,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn exchange_rate(&self) -> f64 {
        self.exchange_rate
    }

    pub fn convert(&self, price: f64) -> f64 {
        price / self.exchange_rate
    }
}

impl FromStr for CurrencyConversion {
    type Err = CoreError;

    /// `CODE:RATE`, e.g. `USD:56.2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, rate) = s
            .split_once(':')
            .ok_or_else(|| CoreError::validation(format!("currency '{s}' must look like CODE:RATE")))?;
        Self::new(code, parse_amount(rate.trim())?)
    }
}

// ── Rate table ───────────────────────────────────────────────────────

/// A lease length with its own discount off the monthly price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateDuration {
    pub months: u32,
    pub discount: f64,
    pub kind: AdjustmentKind,
}

impl RateDuration {
    pub fn new(months: u32, discount: f64, kind: AdjustmentKind) -> Result<Self, CoreError> {
        if months == 0 {
            return Err(CoreError::validation("rate duration must be at least one month"));
        }
        if !discount.is_finite() || discount < 0.0 {
            return Err(CoreError::validation(format!(
                "discount for {months} months must be non-negative"
            )));
        }
        Ok(Self {
            months,
            discount,
            kind,
        })
    }
}

impl FromStr for RateDuration {
    type Err = CoreError;

    /// `MONTHS[:DISCOUNT[%]]`, e.g. `3`, `6:5%`, `12:20000`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (months, discount) = match s.split_once(':') {
            Some((m, d)) => (m.trim(), Some(d.trim())),
            None => (s.trim(), None),
        };
        let months: u32 = months
            .parse()
            .map_err(|_| CoreError::validation(format!("'{months}' is not a month count")))?;

        let (discount, kind) = match discount {
            None => (0.0, AdjustmentKind::Flat),
            Some(d) => match d.strip_suffix('%') {
                Some(pct) => (parse_amount(pct)?, AdjustmentKind::Percent),
                None => (parse_amount(d)?, AdjustmentKind::Flat),
            },
        };
        Self::new(months, discount, kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub months: u32,
    pub monthly_rate: f64,
    pub total: f64,
}

/// One row per duration, in the configured order.
pub fn rate_table(price: f64, durations: &[RateDuration]) -> Vec<RateRow> {
    durations
        .iter()
        .map(|d| {
            let monthly_rate = adjust(price, d.discount, d.kind, Operation::Subtract);
            RateRow {
                months: d.months,
                monthly_rate,
                total: monthly_rate * f64::from(d.months),
            }
        })
        .collect()
}

// ── Display ──────────────────────────────────────────────────────────

/// Display-only amount with a currency code: `PHP 1,234,567.89`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Money<'a> {
    pub amount: f64,
    pub currency: &'a str,
}

impl fmt::Display for Money<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, format_amount(self.amount))
    }
}

/// Two decimals with thousands separators.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // `-0.00` reads as noise
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
