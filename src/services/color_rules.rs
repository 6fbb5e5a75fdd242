use std::collections::{HashMap, HashSet};

use crate::models::{ClothingItem, ColorFamily};

/// Directional color-family compatibility table
///
/// `compatible(a, b)` answers "may an item of family `a` be followed by one of
/// family `b`" (shirt → pants, pants → shoes). Each declared direction stands
/// on its own; the table is never symmetrized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRules {
    table: HashMap<ColorFamily, HashSet<ColorFamily>>,
}

impl Default for ColorRules {
    fn default() -> Self {
        use ColorFamily::*;

        Self::from_table([
            (Neutral, vec![Neutral, Blue, Brown, Bold]),
            (Blue, vec![Neutral, Brown]),
            (Brown, vec![Neutral, Blue]),
            (Bold, vec![Neutral]),
        ])
    }
}

impl ColorRules {
    pub fn from_table<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ColorFamily, Vec<ColorFamily>)>,
    {
        let table = entries
            .into_iter()
            .map(|(from, to)| (from, to.into_iter().collect()))
            .collect();

        Self { table }
    }

    pub fn compatible(&self, from: ColorFamily, to: ColorFamily) -> bool {
        self.table.get(&from).is_some_and(|set| set.contains(&to))
    }

    /// Formal shirt, black pants and brown shoes never pass
    pub fn is_formal_black_brown(shirt: &ClothingItem, pants: &ClothingItem, shoes: &ClothingItem) -> bool {
        shirt.style.trim() == "Formal" && pants.color == "Black" && shoes.color_family == ColorFamily::Brown
    }

    pub fn accepts(&self, shirt: &ClothingItem, pants: &ClothingItem, shoes: &ClothingItem) -> bool {
        if Self::is_formal_black_brown(shirt, pants, shoes) {
            return false;
        }

        self.compatible(shirt.color_family, pants.color_family)
            && self.compatible(pants.color_family, shoes.color_family)
    }
}
