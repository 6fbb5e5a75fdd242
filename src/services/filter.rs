use crate::models::{ClothingItem, GarmentRole};

/// The request context a wardrobe is filtered against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfitContext {
    pub occasion: String,
    pub temperature: i32,
    pub condition: String,
}

impl OutfitContext {
    pub fn new(occasion: impl Into<String>, temperature: i32, condition: impl Into<String>) -> Self {
        Self {
            occasion: occasion.into(),
            temperature,
            condition: condition.into(),
        }
    }

    /// Inclusion predicate shared by every role bucket
    pub fn admits(&self, item: &ClothingItem) -> bool {
        item.style.trim() == self.occasion
            && item.fits_temperature(self.temperature)
            && item.fits_condition(&self.condition)
    }
}

/// A wardrobe item that passed the filter, with its position in the wardrobe
#[derive(Debug, Clone, Copy)]
pub struct FilteredItem<'a> {
    pub index: usize,
    pub item: &'a ClothingItem,
}

/// Role buckets produced by [`filter_wardrobe`]
#[derive(Debug, Default)]
pub struct FilteredWardrobe<'a> {
    pub shirts: Vec<FilteredItem<'a>>,
    pub pants: Vec<FilteredItem<'a>>,
    pub shoes: Vec<FilteredItem<'a>>,
    /// Optional layers: tops and outerwear
    pub tops: Vec<FilteredItem<'a>>,
}

impl FilteredWardrobe<'_> {
    /// Whether at least one shirt, pants and shoes survived the filter
    pub fn is_viable(&self) -> bool {
        !self.shirts.is_empty() && !self.pants.is_empty() && !self.shoes.is_empty()
    }

    /// Size of the shirts × pants × shoes search space
    pub fn candidate_count(&self) -> usize {
        self.shirts.len() * self.pants.len() * self.shoes.len()
    }
}

/// Partitions a wardrobe into role buckets for the given context.
///
/// Items with an unrecognized role are dropped silently; empty buckets are
/// a normal outcome.
pub fn filter_wardrobe<'a>(wardrobe: &'a [ClothingItem], context: &OutfitContext) -> FilteredWardrobe<'a> {
    let mut filtered = FilteredWardrobe::default();

    for (index, item) in wardrobe.iter().enumerate() {
        if !context.admits(item) {
            continue;
        }

        let bucket = match item.role() {
            Some(GarmentRole::Shirt) => &mut filtered.shirts,
            Some(GarmentRole::Pants) => &mut filtered.pants,
            Some(GarmentRole::Shoes) => &mut filtered.shoes,
            Some(GarmentRole::Top) | Some(GarmentRole::Outerwear) => &mut filtered.tops,
            None => {
                tracing::trace!(item_id = item.id, item_type = %item.item_type, "Unrecognized garment role");
                continue;
            }
        };

        bucket.push(FilteredItem { index, item });
    }

    tracing::debug!(
        occasion = %context.occasion,
        temperature = context.temperature,
        condition = %context.condition,
        shirts = filtered.shirts.len(),
        pants = filtered.pants.len(),
        shoes = filtered.shoes.len(),
        tops = filtered.tops.len(),
        "Wardrobe filtered"
    );

    filtered
}
