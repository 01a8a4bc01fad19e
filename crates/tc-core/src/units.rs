//! Length units and conversion to millimeters

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported length units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Mm,
    Cm,
    M,
    In,
    Ft,
}

impl Units {
    pub const ALL: [Units; 5] = [Units::Mm, Units::Cm, Units::M, Units::In, Units::Ft];

    /// Millimeters per unit
    pub fn factor(&self) -> f64 {
        match self {
            Units::Mm => 1.0,
            Units::Cm => 10.0,
            Units::M => 1000.0,
            Units::In => 25.4,
            Units::Ft => 304.8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Mm => "mm",
            Units::Cm => "cm",
            Units::M => "m",
            Units::In => "in",
            Units::Ft => "ft",
        }
    }

    /// Recognize a unit from its abbreviation or long form
    pub fn parse(text: &str) -> Option<Units> {
        let text = text.trim().trim_end_matches('.').to_ascii_lowercase();
        let unit = match text.as_str() {
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => Units::Mm,
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => Units::Cm,
            "m" | "meter" | "meters" | "metre" | "metres" => Units::M,
            "in" | "inch" | "inches" | "\"" => Units::In,
            "ft" | "foot" | "feet" | "'" => Units::Ft,
            _ => return None,
        };
        Some(unit)
    }

    /// Convert a value in this unit to millimeters
    pub fn to_mm(&self, value: f64) -> f64 {
        value * self.factor()
    }

    /// Convert a value with a free-text unit to millimeters.
    ///
    /// Unrecognized units are treated as millimeters.
    pub fn convert_to_mm(value: f64, unit: &str) -> f64 {
        match Units::parse(unit) {
            Some(u) => u.to_mm(value),
            None => {
                tracing::warn!(unit, "Unknown unit, assuming millimeters");
                value
            }
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Units::parse(s).ok_or_else(|| format!("unknown unit '{}'", s))
    }
}
