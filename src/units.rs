//! Length parsing and formatting in the host's display units.
//!
//! The engine itself is unit-agnostic. Labels produced here are used as
//! hardware keys (trade sizes such as `3/8"` or `1 1/4"`) and in
//! human-readable diagnostics.

use serde::{Deserialize, Serialize};

use crate::error::{HangerError, HangerResult};

/// Parse and format lengths expressed in the host's linear unit
pub trait LengthFormat {
    /// Parse a display string into a length, `None` if it cannot be read
    fn parse(&self, text: &str) -> Option<f64>;

    /// Format a length for diagnostics
    fn format(&self, length: f64) -> String;

    /// Format a small length (diameter, rod size) as a fractional-inch label
    fn size_label(&self, length: f64) -> String;
}

/// Feet-and-inches display over a host unit holding `units_per_inch`
/// units per inch (1/12 when the host works in feet)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeetInches {
    pub units_per_inch: f64,
    /// Fraction denominator used when rounding inch labels
    pub denominator: i64,
}

impl Default for FeetInches {
    fn default() -> Self {
        Self::new(1.0 / 12.0)
    }
}

impl FeetInches {
    pub fn new(units_per_inch: f64) -> Self {
        Self {
            units_per_inch,
            denominator: 16,
        }
    }

    /// Reject unit settings that cannot convert or round lengths
    pub fn validate(&self) -> HangerResult<()> {
        if !(self.units_per_inch > 0.0) || !self.units_per_inch.is_finite() {
            return Err(HangerError::InvalidInput(format!(
                "units per inch must be positive, got {}",
                self.units_per_inch
            )));
        }
        if self.denominator <= 0 {
            return Err(HangerError::InvalidInput(format!(
                "fraction denominator must be positive, got {}",
                self.denominator
            )));
        }
        Ok(())
    }

    /// Convert a length in host units to inches
    pub fn to_inches(&self, length: f64) -> f64 {
        length / self.units_per_inch
    }

    /// Convert inches to host units
    pub fn from_inches(&self, inches: f64) -> f64 {
        inches * self.units_per_inch
    }

    fn fraction(&self, inches: f64) -> String {
        let sign = if inches < 0.0 { "-" } else { "" };
        let ticks = (inches.abs() * self.denominator as f64).round() as i64;
        let whole = ticks / self.denominator;
        let rem = ticks % self.denominator;
        if rem == 0 {
            return format!("{sign}{whole}");
        }
        let g = gcd(rem, self.denominator);
        let (num, den) = (rem / g, self.denominator / g);
        if whole == 0 {
            format!("{sign}{num}/{den}")
        } else {
            format!("{sign}{whole} {num}/{den}")
        }
    }
}

impl LengthFormat for FeetInches {
    fn parse(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let (feet, rest) = match text.split_once('\'') {
            Some((ft, rest)) => (ft.trim().parse::<f64>().ok()?, rest),
            None => (0.0, text),
        };
        let rest = rest.trim().trim_end_matches('"').trim();
        let inches = if rest.is_empty() {
            0.0
        } else {
            parse_inches(rest)?
        };
        Some(self.from_inches(feet * 12.0 + inches))
    }

    fn format(&self, length: f64) -> String {
        let inches = self.to_inches(length);
        let sign = if inches < 0.0 { "-" } else { "" };
        let ticks = (inches.abs() * self.denominator as f64).round() as i64;
        let per_foot = 12 * self.denominator;
        let feet = ticks / per_foot;
        let rem_inches = (ticks % per_foot) as f64 / self.denominator as f64;
        format!("{sign}{feet}' {}\"", self.fraction(rem_inches))
    }

    fn size_label(&self, length: f64) -> String {
        format!("{}\"", self.fraction(self.to_inches(length)))
    }
}

/// Parse `1 1/4`, `1-1/4`, `3/8`, `2` or `1.25` as inches
fn parse_inches(text: &str) -> Option<f64> {
    let normalized = text.replace('-', " ");
    let mut total = 0.0;
    let mut parts = 0;
    for part in normalized.split_whitespace() {
        parts += 1;
        total += match part.split_once('/') {
            Some((num, den)) => {
                let num: f64 = num.parse().ok()?;
                let den: f64 = den.parse().ok()?;
                if den == 0.0 {
                    return None;
                }
                num / den
            }
            None => part.parse::<f64>().ok()?,
        };
    }
    if parts == 0 || parts > 2 {
        return None;
    }
    Some(total)
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}
