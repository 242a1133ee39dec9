//! Series identifiers and episode ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A supported series release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Series {
    DB,
    DBZ,
    DBoxZ,
    DBGT,
    DBM,
}

impl Series {
    pub const ALL: [Series; 5] = [
        Series::DB,
        Series::DBZ,
        Series::DBoxZ,
        Series::DBGT,
        Series::DBM,
    ];

    /// Short name used for folders and data files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Series::DB => "DB",
            Series::DBZ => "DBZ",
            Series::DBoxZ => "DBoxZ",
            Series::DBGT => "DBGT",
            Series::DBM => "DBM",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown series '{0}' (expected one of DB, DBZ, DBoxZ, DBGT, DBM)")]
pub struct SeriesParseError(pub String);

impl FromStr for Series {
    type Err = SeriesParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Series::ALL
            .into_iter()
            .find(|series| series.as_str() == s.trim())
            .ok_or_else(|| SeriesParseError(s.to_string()))
    }
}

/// Errors from parsing an episode range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("Invalid episode number '{0}'")]
    InvalidNumber(String),

    #[error("Episode numbers start at 1")]
    Zero,

    #[error("Episode range {first}:{last} is reversed")]
    Reversed { first: u32, last: u32 },
}

/// Inclusive range of episodes, written `first:last` or `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRange {
    first: u32,
    last: u32,
}

impl EpisodeRange {
    pub fn new(first: u32, last: u32) -> Result<Self, RangeParseError> {
        if first == 0 || last == 0 {
            return Err(RangeParseError::Zero);
        }
        if first > last {
            return Err(RangeParseError::Reversed { first, last });
        }
        Ok(Self { first, last })
    }

    pub fn single(episode: u32) -> Result<Self, RangeParseError> {
        Self::new(episode, episode)
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    /// Number of episodes in the range.
    pub fn count(&self) -> usize {
        (self.last - self.first + 1) as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }
}

impl fmt::Display for EpisodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}:{}", self.first, self.last)
        }
    }
}

impl FromStr for EpisodeRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| RangeParseError::InvalidNumber(part.to_string()))
        };

        match s.split_once(':') {
            Some((first, last)) => Self::new(number(first)?, number(last)?),
            None => Self::single(number(s)?),
        }
    }
}

/// Zero-pad an episode number to three digits.
pub fn pad_episode(episode: u32) -> String {
    format!("{:03}", episode)
}
