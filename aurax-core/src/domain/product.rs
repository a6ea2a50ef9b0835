//! Product categories understood by the image endpoints

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of product shown in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    Garment,
    Dress,
    Outfit,
    Footwear,
    Bag,
    Jewellery,
    Eyewear,
    Beauty,
    Other,
}

impl ProductType {
    pub const ALL: [ProductType; 9] = [
        Self::Garment,
        Self::Dress,
        Self::Outfit,
        Self::Footwear,
        Self::Bag,
        Self::Jewellery,
        Self::Eyewear,
        Self::Beauty,
        Self::Other,
    ];

    /// Wire label, e.g. `GARMENT`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Garment => "GARMENT",
            Self::Dress => "DRESS",
            Self::Outfit => "OUTFIT",
            Self::Footwear => "FOOTWEAR",
            Self::Bag => "BAG",
            Self::Jewellery => "JEWELLERY",
            Self::Eyewear => "EYEWEAR",
            Self::Beauty => "BEAUTY",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown product type `{}`", s))
    }
}
