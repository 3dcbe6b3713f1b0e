//! Gymnastics apparatus codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PodiumError;

/// One of the four women's artistic gymnastics apparatuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Apparatus {
    #[serde(rename = "BB")]
    BalanceBeam,
    #[serde(rename = "VT")]
    Vault,
    #[serde(rename = "FX")]
    FloorExercise,
    #[serde(rename = "UB")]
    UnevenBars,
}

impl Apparatus {
    /// Canonical simulation order.
    pub const ALL: [Apparatus; 4] = [
        Apparatus::BalanceBeam,
        Apparatus::Vault,
        Apparatus::FloorExercise,
        Apparatus::UnevenBars,
    ];

    /// Two-letter code used in score tables.
    pub fn code(self) -> &'static str {
        match self {
            Apparatus::BalanceBeam => "BB",
            Apparatus::Vault => "VT",
            Apparatus::FloorExercise => "FX",
            Apparatus::UnevenBars => "UB",
        }
    }

    /// Human-readable event name.
    pub fn name(self) -> &'static str {
        match self {
            Apparatus::BalanceBeam => "Balance Beam",
            Apparatus::Vault => "Vault",
            Apparatus::FloorExercise => "Floor Exercise",
            Apparatus::UnevenBars => "Uneven Bars",
        }
    }

    /// Parse a comma-separated list such as `"BB,VT"`.
    pub fn parse_list(list: &str) -> Result<Vec<Apparatus>, PodiumError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for Apparatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Apparatus {
    type Err = PodiumError;

    /// Accepts the two-letter code, the legacy `<code>_PredictedScore` column
    /// name, and the split vault codes `VT1`/`VT2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let code = upper.strip_suffix("_PREDICTEDSCORE").unwrap_or(&upper);
        match code {
            "BB" => Ok(Apparatus::BalanceBeam),
            "VT" | "VT1" | "VT2" => Ok(Apparatus::Vault),
            "FX" => Ok(Apparatus::FloorExercise),
            "UB" => Ok(Apparatus::UnevenBars),
            _ => Err(PodiumError::UnknownApparatus(s.to_string())),
        }
    }
}
