//! Supported distribution versions and architectures.

use serde::{Deserialize, Serialize};

pub const ANY_VERSION: &str = "any";
pub const ANY_ARCH: &str = "any";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionVersion {
    /// Human-readable form of the version.
    pub name: String,
    /// Value stored on a repository configuration.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionArch {
    /// Human-readable form of the architecture.
    pub name: String,
    /// Value stored on a repository configuration.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryParameterResponse {
    pub distribution_versions: Vec<DistributionVersion>,
    pub distribution_arches: Vec<DistributionArch>,
}

const VERSIONS: &[(&str, &str)] = &[
    ("Any version", ANY_VERSION),
    ("el7", "7"),
    ("el8", "8"),
    ("el9", "9"),
];

const ARCHES: &[(&str, &str)] = &[
    ("Any architecture", ANY_ARCH),
    ("x86_64", "x86_64"),
    ("s390x", "s390x"),
    ("ppc64le", "ppc64le"),
    ("aarch64", "aarch64"),
];

impl RepositoryParameterResponse {
    pub fn catalogue() -> Self {
        Self {
            distribution_versions: VERSIONS
                .iter()
                .map(|(name, label)| DistributionVersion {
                    name: name.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            distribution_arches: ARCHES
                .iter()
                .map(|(name, label)| DistributionArch {
                    name: name.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        }
    }
}
