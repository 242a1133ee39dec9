//! Rational frame rate used for every frame/time conversion in a run.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a frame rate string cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateParseError {
    #[error("Invalid frame rate '{0}'")]
    Invalid(String),

    #[error("Frame rate '{0}' must be greater than zero")]
    Zero(String),
}

/// Frames per second as an exact rational (`numerator / denominator`).
///
/// Accepts `"30000/1001"`, `"24"` or a decimal such as `"23.976"`. NTSC
/// style decimals are snapped to their exact `/1001` rational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScaleRate {
    numerator: u64,
    denominator: u64,
}

impl ScaleRate {
    /// NTSC video, 29.97 fps.
    pub const NTSC: ScaleRate = ScaleRate {
        numerator: 30000,
        denominator: 1001,
    };

    /// NTSC film, 23.976 fps.
    pub const NTSC_FILM: ScaleRate = ScaleRate {
        numerator: 24000,
        denominator: 1001,
    };

    /// Create a rate from a numerator and denominator.
    ///
    /// The fraction is reduced. Returns `None` if either part is zero.
    pub fn new(numerator: u64, denominator: u64) -> Option<Self> {
        if numerator == 0 || denominator == 0 {
            return None;
        }
        let divisor = gcd(numerator, denominator);
        Some(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    /// Whole frames per second.
    pub fn integer(fps: u64) -> Option<Self> {
        Self::new(fps, 1)
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Approximate frames per second.
    pub fn fps(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Duration of `frames` frames in milliseconds, rounded to the nearest
    /// millisecond with halves rounded up. Saturates at `u64::MAX`.
    pub fn frames_to_ms(&self, frames: u64) -> u64 {
        // round(1000 * frames * den / num) == floor((2 * 1000 * frames * den + num) / (2 * num))
        let num = self.numerator as u128;
        (frames as u128)
            .checked_mul(self.denominator as u128)
            .and_then(|v| v.checked_mul(2 * 1000))
            .and_then(|v| v.checked_add(num))
            .and_then(|v| u64::try_from(v / (2 * num)).ok())
            .unwrap_or(u64::MAX)
    }

    fn parse_decimal(s: &str) -> Option<Self> {
        let (whole, frac) = s.split_once('.')?;
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) || frac.len() > 9 {
            return None;
        }

        let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let scale = 10u64.pow(frac.len() as u32);
        let frac: u64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
        let exact = Self::new(whole.checked_mul(scale)?.checked_add(frac)?, scale)?;

        // 23.976, 29.97, 59.94 and friends are really N * 1000 / 1001.
        let value = exact.fps();
        let nominal = value.round();
        if exact.denominator != 1 && nominal >= 1.0 {
            let ntsc = nominal * 1000.0 / 1001.0;
            if (value - ntsc).abs() < 0.001 {
                return Self::new(nominal as u64 * 1000, 1001);
            }
        }
        Some(exact)
    }
}

impl Default for ScaleRate {
    fn default() -> Self {
        Self::NTSC
    }
}

impl std::fmt::Display for ScaleRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl FromStr for ScaleRate {
    type Err = RateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || RateParseError::Invalid(s.to_string());

        if let Some((num, den)) = trimmed.split_once('/') {
            let num: u64 = num.trim().parse().map_err(|_| invalid())?;
            let den: u64 = den.trim().parse().map_err(|_| invalid())?;
            return Self::new(num, den).ok_or_else(|| RateParseError::Zero(s.to_string()));
        }

        if trimmed.contains('.') {
            return match Self::parse_decimal(trimmed) {
                Some(rate) => Ok(rate),
                None if trimmed.chars().all(|c| c == '0' || c == '.') && trimmed != "." => {
                    Err(RateParseError::Zero(s.to_string()))
                }
                None => Err(invalid()),
            };
        }

        let fps: u64 = trimmed.parse().map_err(|_| invalid())?;
        Self::integer(fps).ok_or_else(|| RateParseError::Zero(s.to_string()))
    }
}

impl TryFrom<String> for ScaleRate {
    type Error = RateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScaleRate> for String {
    fn from(rate: ScaleRate) -> Self {
        rate.to_string()
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}
