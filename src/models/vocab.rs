//! Coded values used by patient properties.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Values of the `gender` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SexType {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl SexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SexType::Male => "M",
            SexType::Female => "F",
            SexType::Other => "O",
        }
    }
}

/// Values of the `relative_type` property of relative objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeType {
    AuntUncle,
    Child,
    Cousin,
    Grandchild,
    Grandparent,
    NieceNephew,
    Parent,
    Sibling,
    Twin,
}

impl RelativeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelativeType::AuntUncle => "aunt_uncle",
            RelativeType::Child => "child",
            RelativeType::Cousin => "cousin",
            RelativeType::Grandchild => "grandchild",
            RelativeType::Grandparent => "grandparent",
            RelativeType::NieceNephew => "niece_nephew",
            RelativeType::Parent => "parent",
            RelativeType::Sibling => "sibling",
            RelativeType::Twin => "twin",
        }
    }
}

/// Non-numeric value of the Apgar score properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApgarType {
    Unknown,
}

impl ApgarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApgarType::Unknown => "unknown",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(SexType, RelativeType, ApgarType);
