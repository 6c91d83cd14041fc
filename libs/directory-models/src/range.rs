use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Inclusive numeric range used by experience, fee and rating filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeFilter {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl RangeFilter {
    pub fn between(min: Decimal, max: Decimal) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: Decimal) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Parse `"min-max"` or `"N+"`.
    ///
    /// Malformed input yields `None`: callers treat it as "no filter" rather than
    /// rejecting the request.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(min) = raw.strip_suffix('+') {
            return parse_bound(min).map(Self::at_least);
        }
        let (min, max) = raw.split_once('-')?;
        let (min, max) = (parse_bound(min)?, parse_bound(max)?);
        if min <= max {
            Some(Self::between(min, max))
        } else {
            Some(Self::between(max, min))
        }
    }

    /// Parse a minimum-only filter: a bare number, `"N+"`, or a full range.
    pub fn parse_minimum(raw: &str) -> Option<Self> {
        parse_bound(raw)
            .map(Self::at_least)
            .or_else(|| Self::parse(raw))
    }

    pub fn contains(&self, value: Decimal) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

fn parse_bound(raw: &str) -> Option<Decimal> {
    let value = Decimal::from_str(raw.trim()).ok()?;
    (!value.is_sign_negative()).then_some(value)
}
