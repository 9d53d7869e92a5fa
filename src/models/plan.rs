// src/models/plan.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The pricing tiers, totally ordered by quota ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlanName {
    #[default]
    Basic,
    Standard,
    Premium,
}

impl PlanName {
    /// The next tier up, or `None` at the top of the staircase.
    pub fn next(self) -> Option<PlanName> {
        match self {
            PlanName::Basic => Some(PlanName::Standard),
            PlanName::Standard => Some(PlanName::Premium),
            PlanName::Premium => None,
        }
    }
}

impl fmt::Display for PlanName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanName::Basic => "Basic",
            PlanName::Standard => "Standard",
            PlanName::Premium => "Premium",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PlanName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Basic" => Ok(PlanName::Basic),
            "Standard" => Ok(PlanName::Standard),
            "Premium" => Ok(PlanName::Premium),
            _ => Err(()),
        }
    }
}

/// One catalog entry: monthly price plus the inclusive house-count band the
/// plan covers.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlanBase {
    pub name: PlanName,
    pub price: f64,
    pub min_house: u64,
    pub max_house: u64,
}

/// The static plan catalog. Plans are not stored per user beyond the name
/// reference on the user record.
pub const CATALOG: [PlanBase; 3] = [
    PlanBase {
        name: PlanName::Basic,
        price: 0.0,
        min_house: 0,
        max_house: 2,
    },
    PlanBase {
        name: PlanName::Standard,
        price: 5000.0,
        min_house: 3,
        max_house: 7,
    },
    PlanBase {
        name: PlanName::Premium,
        price: 10000.0,
        min_house: 8,
        max_house: 12,
    },
];

pub fn get_plan(name: PlanName) -> PlanBase {
    // The catalog covers every enum variant.
    CATALOG
        .iter()
        .copied()
        .find(|p| p.name == name)
        .expect("plan catalog is total")
}

/// The maximum number of properties a user on this plan may list.
pub fn quota_for(name: PlanName) -> u64 {
    get_plan(name).max_house
}
