// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Policies controlling how many measurements are taken and how they are packaged.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// How many replicate measurements are taken per parameter set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMethodology {
    /// `sample_size` stochastic replicates per parameter set
    #[default]
    Random,
    /// One measurement per parameter set over the full population
    Exhaustive,
}

/// How measurement results are handed back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMethodology {
    /// Measure everything, return one assembled table
    #[default]
    Batch,
    /// Yield one single-row measurement per parameter set, lazily
    Serial,
}

impl Display for SamplingMethodology {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplingMethodology::Random => write!(f, "random"),
            SamplingMethodology::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

impl Display for ProcessingMethodology {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingMethodology::Batch => write!(f, "batch"),
            ProcessingMethodology::Serial => write!(f, "serial"),
        }
    }
}

impl FromStr for SamplingMethodology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(SamplingMethodology::Random),
            "exhaustive" => Ok(SamplingMethodology::Exhaustive),
            other => Err(format!(
                "unknown sampling methodology '{}' (expected random or exhaustive)",
                other
            )),
        }
    }
}

impl FromStr for ProcessingMethodology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "batch" => Ok(ProcessingMethodology::Batch),
            "serial" => Ok(ProcessingMethodology::Serial),
            other => Err(format!(
                "unknown processing methodology '{}' (expected batch or serial)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "Exhaustive".parse::<SamplingMethodology>(),
            Ok(SamplingMethodology::Exhaustive)
        );
        assert_eq!(
            " serial ".parse::<ProcessingMethodology>(),
            Ok(ProcessingMethodology::Serial)
        );
        assert!("sometimes".parse::<SamplingMethodology>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&SamplingMethodology::Random).unwrap(),
            "\"random\""
        );
        assert_eq!(
            serde_json::from_str::<ProcessingMethodology>("\"batch\"").unwrap(),
            ProcessingMethodology::Batch
        );
    }
}
