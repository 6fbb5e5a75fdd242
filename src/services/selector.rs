/// Outfit selection over a filtered wardrobe
///
/// The search space is the full shirts × pants × shoes cross product, so the
/// cost is O(S·P·H) scorer calls in the worst case. The rule scorer stops at
/// the first accepted triple.
use rand::{seq::SliceRandom, Rng};

use crate::{
    models::{ClothingItem, Outfit},
    services::{
        filter::{filter_wardrobe, FilteredItem, FilteredWardrobe, OutfitContext},
        scorer::{ScoreError, Scorer, SearchPolicy},
    },
};

/// A scored (shirt, pants, shoes) triple
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    shirt: &'a ClothingItem,
    pants: &'a ClothingItem,
    shoes: &'a ClothingItem,
    score: Option<f32>,
}

/// Filters the wardrobe for `context` and picks an outfit.
///
/// `Ok(None)` means no outfit is possible with this wardrobe and context;
/// `Err` is reserved for scorer failures.
pub fn select_outfit<R: Rng + ?Sized>(
    wardrobe: &[ClothingItem],
    context: &OutfitContext,
    scorer: &Scorer,
    rng: &mut R,
) -> Result<Option<Outfit>, ScoreError> {
    let filtered = filter_wardrobe(wardrobe, context);
    select_from(&filtered, scorer, rng)
}

/// Search and layering phases over already filtered buckets
pub fn select_from<R: Rng + ?Sized>(
    filtered: &FilteredWardrobe<'_>,
    scorer: &Scorer,
    rng: &mut R,
) -> Result<Option<Outfit>, ScoreError> {
    if !filtered.is_viable() {
        return Ok(None);
    }

    let candidate = match scorer.search_policy() {
        SearchPolicy::FirstAccepted => first_accepted(filtered, scorer, rng)?,
        SearchPolicy::BestScore => best_scored(filtered, scorer)?,
    };

    let Some(candidate) = candidate else {
        tracing::debug!(
            candidates = filtered.candidate_count(),
            "No compatible combination found"
        );
        return Ok(None);
    };

    let top = filtered.tops.choose(rng).map(|layer| layer.item.clone());

    let score = match scorer.search_policy() {
        SearchPolicy::BestScore => candidate.score,
        SearchPolicy::FirstAccepted => None,
    };

    Ok(Some(Outfit {
        shirt: candidate.shirt.clone(),
        pants: candidate.pants.clone(),
        shoes: candidate.shoes.clone(),
        top,
        score,
    }))
}

/// Shuffles each bucket independently and returns the first accepted triple
fn first_accepted<'a, R: Rng + ?Sized>(
    filtered: &FilteredWardrobe<'a>,
    scorer: &Scorer,
    rng: &mut R,
) -> Result<Option<Candidate<'a>>, ScoreError> {
    let shirts = shuffled(&filtered.shirts, rng);
    let pants = shuffled(&filtered.pants, rng);
    let shoes = shuffled(&filtered.shoes, rng);

    for &shirt in &shirts {
        for &pant in &pants {
            for &shoe in &shoes {
                if scorer.score(shirt, pant, shoe)?.is_accepted() {
                    return Ok(Some(Candidate {
                        shirt,
                        pants: pant,
                        shoes: shoe,
                        score: None,
                    }));
                }
            }
        }
    }

    Ok(None)
}

fn shuffled<'a, R: Rng + ?Sized>(bucket: &[FilteredItem<'a>], rng: &mut R) -> Vec<&'a ClothingItem> {
    let mut items: Vec<&'a ClothingItem> = bucket.iter().map(|f| f.item).collect();
    items.shuffle(rng);
    items
}

/// Evaluates every triple in bucket order and keeps the strict maximum,
/// so ties go to the earliest triple.
fn best_scored<'a>(
    filtered: &FilteredWardrobe<'a>,
    scorer: &Scorer,
) -> Result<Option<Candidate<'a>>, ScoreError> {
    let mut best: Option<Candidate<'a>> = None;
    let mut evaluated = 0usize;

    for shirt in &filtered.shirts {
        for pant in &filtered.pants {
            for shoe in &filtered.shoes {
                evaluated += 1;
                let Some(value) = scorer.score(shirt.item, pant.item, shoe.item)?.value() else {
                    continue;
                };
                // A NaN best would never be beaten by `>`.
                if !value.is_finite() {
                    tracing::warn!(
                        shirt = shirt.item.id,
                        pants = pant.item.id,
                        shoes = shoe.item.id,
                        "Skipping non-finite outfit score"
                    );
                    continue;
                }

                if best.map_or(true, |b| b.score.is_some_and(|s| value > s)) {
                    best = Some(Candidate {
                        shirt: shirt.item,
                        pants: pant.item,
                        shoes: shoe.item,
                        score: Some(value),
                    });
                }
            }
        }
    }

    tracing::debug!(
        evaluated,
        best_score = best.and_then(|b| b.score),
        "Scored all candidate outfits"
    );

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColorFamily, ItemId};
    use crate::services::{color_rules::ColorRules, embedding_cache::WardrobeEmbeddings, scorer::cosine_similarity};
    use rand::{rngs::StdRng, SeedableRng};

    fn garment(id: ItemId, item_type: &str, style: &str, color: &str, family: ColorFamily) -> ClothingItem {
        ClothingItem {
            id,
            name: format!("{} {}", color, item_type),
            item_type: item_type.to_string(),
            style: style.to_string(),
            color: color.to_string(),
            color_family: family,
            pattern: "Solid".to_string(),
            min_temp: 10,
            max_temp: 35,
            condition: "Any".to_string(),
            image_path: None,
        }
    }

    fn formal_wardrobe(shoes_family: ColorFamily) -> Vec<ClothingItem> {
        vec![
            garment(1, "Shirt", "Formal", "White", ColorFamily::Neutral),
            garment(2, "Pants", "Formal", "Black", ColorFamily::Neutral),
            garment(3, "Shoes", "Formal", "Brown", shoes_family),
        ]
    }

    fn formal_context() -> OutfitContext {
        OutfitContext::new("Formal", 20, "Clear")
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_formal_black_brown_wardrobe_yields_no_outfit() {
        let scorer = Scorer::Rules(ColorRules::default());
        let result = select_outfit(&formal_wardrobe(ColorFamily::Brown), &formal_context(), &scorer, &mut rng());

        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_neutral_shoes_yield_the_single_triple() {
        let wardrobe = formal_wardrobe(ColorFamily::Neutral);
        let scorer = Scorer::Rules(ColorRules::default());

        let outfit = select_outfit(&wardrobe, &formal_context(), &scorer, &mut rng())
            .unwrap()
            .unwrap();

        assert_eq!(outfit.shirt.id, 1);
        assert_eq!(outfit.pants.id, 2);
        assert_eq!(outfit.shoes.id, 3);
        assert_eq!(outfit.top, None);
        assert_eq!(outfit.score, None);
    }

    #[test]
    fn test_missing_role_yields_none_for_both_strategies() {
        let wardrobe = vec![
            garment(1, "Shirt", "Casual", "White", ColorFamily::Neutral),
            garment(2, "Pants", "Casual", "Grey", ColorFamily::Neutral),
            garment(3, "Top", "Casual", "Navy", ColorFamily::Blue),
        ];
        let context = OutfitContext::new("Casual", 20, "Clear");

        let rules = Scorer::Rules(ColorRules::default());
        // An empty embedding map would error if the scorer were ever reached.
        let embedding = Scorer::Embedding(WardrobeEmbeddings::default());

        assert_eq!(select_outfit(&wardrobe, &context, &rules, &mut rng()).unwrap(), None);
        assert_eq!(select_outfit(&wardrobe, &context, &embedding, &mut rng()).unwrap(), None);
    }

    #[test]
    fn test_rules_pick_only_accepted_combinations() {
        let wardrobe = vec![
            garment(1, "Shirt", "Casual", "Red", ColorFamily::Bold),
            garment(2, "Shirt", "Casual", "Navy", ColorFamily::Blue),
            garment(3, "Pants", "Casual", "Khaki", ColorFamily::Brown),
            garment(4, "Pants", "Casual", "Red", ColorFamily::Bold),
            garment(5, "Shoes", "Casual", "White", ColorFamily::Neutral),
        ];
        let context = OutfitContext::new("Casual", 20, "Clear");
        let scorer = Scorer::Rules(ColorRules::default());

        // Only Navy shirt -> Khaki pants -> White shoes passes the table.
        for seed in 0..20 {
            let outfit = select_outfit(&wardrobe, &context, &scorer, &mut StdRng::seed_from_u64(seed))
                .unwrap()
                .unwrap();
            assert_eq!((outfit.shirt.id, outfit.pants.id, outfit.shoes.id), (2, 3, 5));
        }
    }

    #[test]
    fn test_rules_search_is_reproducible_with_fixed_seed() {
        let wardrobe: Vec<ClothingItem> = (1..=4)
            .map(|i| garment(i, "Shirt", "Casual", "Grey", ColorFamily::Neutral))
            .chain((5..=8).map(|i| garment(i, "Pants", "Casual", "Grey", ColorFamily::Neutral)))
            .chain((9..=12).map(|i| garment(i, "Shoes", "Casual", "Grey", ColorFamily::Neutral)))
            .collect();
        let context = OutfitContext::new("Casual", 20, "Clear");
        let scorer = Scorer::Rules(ColorRules::default());

        let a = select_outfit(&wardrobe, &context, &scorer, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = select_outfit(&wardrobe, &context, &scorer, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);

        // Shuffling spreads picks across the wardrobe.
        let distinct_shirts: std::collections::HashSet<ItemId> = (0..50)
            .map(|seed| {
                select_outfit(&wardrobe, &context, &scorer, &mut StdRng::seed_from_u64(seed))
                    .unwrap()
                    .unwrap()
                    .shirt
                    .id
            })
            .collect();
        assert!(distinct_shirts.len() > 1);
    }

    #[test]
    fn test_layer_comes_from_tops_bucket() {
        let mut wardrobe = formal_wardrobe(ColorFamily::Neutral);
        wardrobe.push(garment(4, "Outerwear", "Formal", "Navy", ColorFamily::Blue));
        wardrobe.push(garment(5, "Top", "Formal", "Grey", ColorFamily::Neutral));
        wardrobe.push(garment(6, "Top", "Casual", "Red", ColorFamily::Bold));

        let scorer = Scorer::Rules(ColorRules::default());
        for seed in 0..20 {
            let outfit = select_outfit(&wardrobe, &formal_context(), &scorer, &mut StdRng::seed_from_u64(seed))
                .unwrap()
                .unwrap();
            let top = outfit.top.expect("a formal layer is available");
            assert!(top.id == 4 || top.id == 5);
        }
    }

    #[test]
    fn test_embedding_strategy_returns_global_maximum() {
        let wardrobe = vec![
            garment(1, "Shirt", "Casual", "A", ColorFamily::Neutral),
            garment(2, "Shirt", "Casual", "B", ColorFamily::Neutral),
            garment(3, "Shirt", "Casual", "C", ColorFamily::Neutral),
            garment(4, "Pants", "Casual", "D", ColorFamily::Neutral),
            garment(5, "Pants", "Casual", "E", ColorFamily::Neutral),
            garment(6, "Shoes", "Casual", "F", ColorFamily::Neutral),
            garment(7, "Shoes", "Casual", "G", ColorFamily::Neutral),
        ];

        let mut vector_rng = StdRng::seed_from_u64(2024);
        let vectors: Vec<(ItemId, Vec<f32>)> = wardrobe
            .iter()
            .map(|item| (item.id, (0..8).map(|_| vector_rng.gen_range(-1.0..1.0)).collect()))
            .collect();
        let embeddings = WardrobeEmbeddings::from_pairs(vectors.clone());
        let vec_of = |id: ItemId| vectors.iter().find(|(i, _)| *i == id).map(|(_, v)| v.clone()).unwrap();

        // Brute-force the 12 triples independently.
        let mut expected = (0, 0, 0);
        let mut expected_score = f32::NEG_INFINITY;
        for s in 1..=3 {
            for p in 4..=5 {
                for h in 6..=7 {
                    let score = (cosine_similarity(&vec_of(s), &vec_of(p)) + cosine_similarity(&vec_of(p), &vec_of(h))) / 2.0;
                    if score > expected_score {
                        expected_score = score;
                        expected = (s, p, h);
                    }
                }
            }
        }

        let scorer = Scorer::Embedding(embeddings);
        let context = OutfitContext::new("Casual", 20, "Clear");
        let filtered = filter_wardrobe(&wardrobe, &context);
        assert_eq!(filtered.candidate_count(), 12);

        let outfit = select_from(&filtered, &scorer, &mut rng()).unwrap().unwrap();
        assert_eq!((outfit.shirt.id, outfit.pants.id, outfit.shoes.id), expected);
        assert_eq!(outfit.score, Some(expected_score));
    }

    #[test]
    fn test_embedding_ties_keep_first_enumerated() {
        let wardrobe = vec![
            garment(1, "Shirt", "Casual", "A", ColorFamily::Neutral),
            garment(2, "Shirt", "Casual", "B", ColorFamily::Neutral),
            garment(3, "Pants", "Casual", "C", ColorFamily::Neutral),
            garment(4, "Shoes", "Casual", "D", ColorFamily::Neutral),
        ];
        // Both shirts are identical, so both triples tie.
        let embeddings = WardrobeEmbeddings::from_pairs(vec![
            (1, vec![1.0, 0.0]),
            (2, vec![1.0, 0.0]),
            (3, vec![1.0, 1.0]),
            (4, vec![0.0, 1.0]),
        ]);

        let scorer = Scorer::Embedding(embeddings);
        let outfit = select_outfit(&wardrobe, &OutfitContext::new("Casual", 20, "Clear"), &scorer, &mut rng())
            .unwrap()
            .unwrap();

        assert_eq!(outfit.shirt.id, 1);
    }

    #[test]
    fn test_non_finite_score_never_wins() {
        let wardrobe = vec![
            garment(1, "Shirt", "Casual", "A", ColorFamily::Neutral),
            garment(2, "Shirt", "Casual", "B", ColorFamily::Neutral),
            garment(3, "Pants", "Casual", "C", ColorFamily::Neutral),
            garment(4, "Shoes", "Casual", "D", ColorFamily::Neutral),
        ];
        // Shirt 1 comes first but its infinite component makes the score NaN.
        let embeddings = WardrobeEmbeddings::from_pairs(vec![
            (1, vec![f32::INFINITY, 1.0]),
            (2, vec![1.0, 0.0]),
            (3, vec![1.0, 0.0]),
            (4, vec![1.0, 0.0]),
        ]);

        let scorer = Scorer::Embedding(embeddings);
        let outfit = select_outfit(&wardrobe, &OutfitContext::new("Casual", 20, "Clear"), &scorer, &mut rng())
            .unwrap()
            .unwrap();

        assert_eq!(outfit.shirt.id, 2);
        assert_eq!(outfit.score, Some(1.0));
    }

    #[test]
    fn test_only_non_finite_scores_yield_no_outfit() {
        let wardrobe = formal_wardrobe(ColorFamily::Neutral);
        let embeddings = WardrobeEmbeddings::from_pairs(vec![
            (1, vec![f32::NAN, 1.0]),
            (2, vec![1.0, 0.0]),
            (3, vec![f32::NAN, 0.0]),
        ]);

        let scorer = Scorer::Embedding(embeddings);
        assert_eq!(select_outfit(&wardrobe, &formal_context(), &scorer, &mut rng()).unwrap(), None);
    }

    #[test]
    fn test_embedding_strategy_propagates_missing_embedding() {
        let wardrobe = formal_wardrobe(ColorFamily::Neutral);
        let scorer = Scorer::Embedding(WardrobeEmbeddings::from_pairs(vec![(1, vec![1.0]), (2, vec![1.0])]));

        let result = select_outfit(&wardrobe, &formal_context(), &scorer, &mut rng());
        assert!(matches!(result, Err(ScoreError::MissingEmbedding { item_id: 3 })));
    }
}
