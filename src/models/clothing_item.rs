use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Weather condition sentinel matching every condition
pub const ANY_CONDITION: &str = "Any";

/// Stable identity of a wardrobe item
pub type ItemId = i64;

/// Identity of a wardrobe owner
pub type UserId = i64;

/// Garment role of a clothing item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GarmentRole {
    Shirt,
    Pants,
    Shoes,
    Top,
    Outerwear,
}

impl GarmentRole {
    /// Parses a stored type string, case-insensitively. Unknown roles yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "shirt" => Some(GarmentRole::Shirt),
            "pants" => Some(GarmentRole::Pants),
            "shoes" => Some(GarmentRole::Shoes),
            "top" => Some(GarmentRole::Top),
            "outerwear" => Some(GarmentRole::Outerwear),
            _ => None,
        }
    }
}

/// Coarse color bucket used by the rule-based scorer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ColorFamily {
    Neutral,
    Blue,
    Brown,
    Bold,
}

impl ColorFamily {
    pub const ALL: [ColorFamily; 4] = [
        ColorFamily::Neutral,
        ColorFamily::Blue,
        ColorFamily::Brown,
        ColorFamily::Bold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorFamily::Neutral => "Neutral",
            ColorFamily::Blue => "Blue",
            ColorFamily::Brown => "Brown",
            ColorFamily::Bold => "Bold",
        }
    }
}

impl Display for ColorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColorFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorFamily::ALL
            .into_iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown color family '{}'", s))
    }
}

/// A single item of a user's wardrobe, as delivered by storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClothingItem {
    pub id: ItemId,
    pub name: String,
    /// Raw garment role as stored; see [`ClothingItem::role`]
    #[serde(rename = "type")]
    pub item_type: String,
    pub style: String,
    pub color: String,
    pub color_family: ColorFamily,
    pub pattern: String,
    pub min_temp: i32,
    pub max_temp: i32,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl ClothingItem {
    pub fn role(&self) -> Option<GarmentRole> {
        GarmentRole::parse(&self.item_type)
    }

    pub fn fits_temperature(&self, temperature: i32) -> bool {
        self.min_temp <= temperature && temperature <= self.max_temp
    }

    pub fn fits_condition(&self, condition: &str) -> bool {
        self.condition == ANY_CONDITION || self.condition == condition
    }

    /// Text handed to the style encoder for this item
    pub fn description(&self) -> String {
        format!(
            "A {} {} {} {} suitable for {} weather.",
            self.style, self.color, self.pattern, self.item_type, self.condition
        )
    }
}

/// Payload for adding an item to a wardrobe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewClothingItem {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub style: String,
    pub color: String,
    pub color_family: ColorFamily,
    #[serde(default = "default_pattern")]
    pub pattern: String,
    #[serde(default = "default_min_temp")]
    pub min_temp: i32,
    #[serde(default = "default_max_temp")]
    pub max_temp: i32,
    #[serde(default = "default_condition")]
    pub condition: String,
    #[serde(default)]
    pub image_path: Option<String>,
}

fn default_pattern() -> String {
    "Solid".to_string()
}

fn default_min_temp() -> i32 {
    15
}

fn default_max_temp() -> i32 {
    30
}

fn default_condition() -> String {
    ANY_CONDITION.to_string()
}

impl NewClothingItem {
    /// Checks the invariants storage relies on
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Item name must not be empty".to_string());
        }
        if self.min_temp > self.max_temp {
            return Err(format!(
                "min_temp ({}) must not exceed max_temp ({})",
                self.min_temp, self.max_temp
            ));
        }
        Ok(())
    }

    pub fn into_item(self, id: ItemId) -> ClothingItem {
        ClothingItem {
            id,
            name: self.name,
            item_type: self.item_type,
            style: self.style,
            color: self.color,
            color_family: self.color_family,
            pattern: self.pattern,
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            condition: self.condition,
            image_path: self.image_path,
        }
    }
}
