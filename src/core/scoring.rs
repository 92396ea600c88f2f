use std::sync::Arc;

use crate::core::compat::{
    material_affinity, materials_match, location_matches, quantity_matches, CompatTables,
};
use crate::core::distance::haversine_distance;
use crate::models::{CounterpartEntry, MatchQuery, QuerySide, ScoringWeights};

/// Capped score plus ordered, truncated reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    /// Always within 0..=100.
    pub score: u8,
    /// At most 3 entries; order encodes priority.
    pub reasons: Vec<String>,
}

impl ScoreCard {
    fn capped(raw: f64, mut reasons: Vec<String>) -> Self {
        reasons.truncate(3);
        Self {
            score: raw.clamp(0.0, 100.0).round() as u8,
            reasons,
        }
    }
}

/// Seam between the two scoring formulas that coexist in the product.
///
/// The additive rubric and the gated blend disagree on whether material
/// compatibility is a hard gate. Both are kept as named strategies and are
/// never merged; callers choose explicitly.
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score a counterpart against a query. `None` means the strategy
    /// rejects the pairing outright (or cannot apply).
    fn score(&self, counterpart: &CounterpartEntry, query: &MatchQuery) -> Option<ScoreCard>;
}

/// Weighted additive rubric: material +40, quantity +30, location +30, with
/// a +10 floor instead of zero when regions differ. Every pairing gets a
/// score; material is heavily weighted but not a gate.
#[derive(Clone)]
pub struct AdditiveScorer {
    weights: ScoringWeights,
    tables: Arc<CompatTables>,
}

impl AdditiveScorer {
    pub fn new(weights: ScoringWeights, tables: Arc<CompatTables>) -> Self {
        Self { weights, tables }
    }

    /// Mirror rubric, consumer side: how well a consumer counterpart fits a
    /// producer's offer.
    pub fn score_against_offer(
        &self,
        counterpart: &CounterpartEntry,
        query: &MatchQuery,
    ) -> ScoreCard {
        let w = &self.weights;
        let mut score = 0.0;
        let mut reasons = Vec::new();

        if materials_match(&counterpart.material_type, &query.material_type, &self.tables) {
            score += w.material;
            reasons.push(format!(
                "Material '{}' matches your listing",
                counterpart.material_type
            ));
        }
        if quantity_matches(query.quantity_kg, counterpart.quantity_kg) {
            score += w.quantity;
            reasons.push("Quantity in acceptable range".to_string());
        }
        if location_matches(&counterpart.city, &query.city, &self.tables) {
            score += w.location;
            reasons.push(format!("Location: {}", counterpart.city));
        } else {
            score += w.location_fallback;
            reasons.push("Different region - logistics can be arranged".to_string());
        }

        ScoreCard::capped(score, reasons)
    }

    /// Mirror rubric, producer side: how well a producer counterpart fits a
    /// consumer's requirement.
    pub fn score_against_requirement(
        &self,
        counterpart: &CounterpartEntry,
        query: &MatchQuery,
    ) -> ScoreCard {
        let w = &self.weights;
        let mut score = 0.0;
        let mut reasons = Vec::new();

        if materials_match(&counterpart.material_type, &query.material_type, &self.tables) {
            score += w.material;
            reasons.push(format!("Supplies '{}'", counterpart.material_type));
        }
        if quantity_matches(query.quantity_kg, counterpart.quantity_kg) {
            score += w.quantity;
            reasons.push("Quantity matches your requirement".to_string());
        }
        if location_matches(&counterpart.city, &query.city, &self.tables) {
            score += w.location;
            reasons.push(format!("Location: {}", counterpart.city));
        } else {
            score += w.location_fallback;
            reasons.push("Different region - delivery possible".to_string());
        }

        ScoreCard::capped(score, reasons)
    }

    /// Fuller buyer-discovery rubric with flat bonuses, used when analyzing
    /// an offer against the stored counterpart directory. Nominal weights
    /// sum past 100; an all-signals match still caps there.
    pub fn score_buyer_for_offer(
        &self,
        buyer: &CounterpartEntry,
        offer: &MatchQuery,
    ) -> ScoreCard {
        let w = &self.weights;
        let mut score = 0.0;
        let mut reasons = Vec::new();

        if materials_match(&buyer.material_type, &offer.material_type, &self.tables) {
            score += w.material;
            reasons.push(format!(
                "Material '{}' matches industrial processing capacity",
                offer.material_type
            ));
        }
        if crate::core::compat::normalize(&buyer.city)
            == crate::core::compat::normalize(&offer.city)
            && !offer.city.trim().is_empty()
        {
            score += w.same_city;
            reasons.push(format!("Strategic regional proximity: {}", buyer.city));
        }
        if quantity_matches(offer.quantity_kg, buyer.quantity_kg) {
            score += w.quantity_range;
            reasons.push("Supply volume fits optimal operational threshold".to_string());
        }
        if !offer.hazardous {
            score += w.non_hazard;
            reasons.push("Standard material handling (Non-hazardous)".to_string());
        }
        score += w.circular;
        reasons.push("Circular integration potential".to_string());

        ScoreCard::capped(score, reasons)
    }
}

impl ScoringStrategy for AdditiveScorer {
    fn name(&self) -> &'static str {
        "additive"
    }

    fn score(&self, counterpart: &CounterpartEntry, query: &MatchQuery) -> Option<ScoreCard> {
        Some(match query.side {
            QuerySide::Offer => self.score_against_offer(counterpart, query),
            QuerySide::Requirement => self.score_against_requirement(counterpart, query),
        })
    }
}

/// Continuous blend used when both records carry real coordinates.
///
/// Material is a hard gate here: a 0 material sub-score rejects the pairing,
/// unlike the additive rubric. Sub-scores are blended as
/// round(0.4 * material + 0.3 * proximity + 0.3 * quantity).
#[derive(Clone)]
pub struct GatedBlendScorer {
    tables: Arc<CompatTables>,
}

impl GatedBlendScorer {
    pub fn new(tables: Arc<CompatTables>) -> Self {
        Self { tables }
    }

    fn proximity_score(distance_km: f64) -> u8 {
        if distance_km < 50.0 {
            100
        } else if distance_km < 150.0 {
            80
        } else if distance_km < 500.0 {
            50
        } else if distance_km < 1000.0 {
            25
        } else {
            10
        }
    }

    fn quantity_overlap(a: f64, b: f64) -> f64 {
        if !(a > 0.0) || !(b > 0.0) {
            return 0.0;
        }
        a.min(b) / a.max(b) * 100.0
    }
}

impl ScoringStrategy for GatedBlendScorer {
    fn name(&self) -> &'static str {
        "gated-blend"
    }

    fn score(&self, counterpart: &CounterpartEntry, query: &MatchQuery) -> Option<ScoreCard> {
        let (qlat, qlon) = (query.latitude?, query.longitude?);
        let (clat, clon) = (counterpart.latitude?, counterpart.longitude?);

        let material = material_affinity(
            &counterpart.material_type,
            &query.material_type,
            &self.tables,
        );
        if material == 0 {
            return None;
        }

        let distance_km = haversine_distance(qlat, qlon, clat, clon);
        let proximity = Self::proximity_score(distance_km);
        let overlap = Self::quantity_overlap(query.quantity_kg, counterpart.quantity_kg);

        let blended =
            0.4 * f64::from(material) + 0.3 * f64::from(proximity) + 0.3 * overlap;

        let reasons = vec![
            if material == 100 {
                "Exact material match".to_string()
            } else {
                "Compatible material stream".to_string()
            },
            format!("{:.0} km apart", distance_km),
            format!("Quantity overlap {:.0}%", overlap),
        ];

        Some(ScoreCard::capped(blended, reasons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn consumer(material: &str, qty: f64, city: &str) -> CounterpartEntry {
        CounterpartEntry {
            id: "cons-1".to_string(),
            company_name: "National Steel Corp".to_string(),
            city: city.to_string(),
            role: Role::Consumer,
            material_type: material.to_string(),
            quantity_kg: qty,
            price_per_kg: Some(14.0),
            industry: Some("Steel".to_string()),
            owner_id: None,
            latitude: None,
            longitude: None,
        }
    }

    fn offer_query(material: &str, qty: f64, city: &str) -> MatchQuery {
        MatchQuery {
            side: QuerySide::Offer,
            id: "offer-1".to_string(),
            owner_id: "user-1".to_string(),
            material_type: material.to_string(),
            quantity_kg: qty,
            city: city.to_string(),
            hazardous: false,
            latitude: None,
            longitude: None,
        }
    }

    fn scorer() -> AdditiveScorer {
        AdditiveScorer::new(ScoringWeights::default(), Arc::new(CompatTables::default()))
    }

    #[test]
    fn test_full_additive_match() {
        let card = scorer().score_against_offer(
            &consumer("steel slag", 5500.0, "Mumbai"),
            &offer_query("steel slag", 5000.0, "Mumbai"),
        );
        assert_eq!(card.score, 100);
        assert_eq!(card.reasons.len(), 3);
        assert!(card.reasons[0].contains("steel slag"));
    }

    #[test]
    fn test_location_floor_not_zero() {
        let card = scorer().score_against_offer(
            &consumer("steel slag", 5500.0, "Chennai"),
            &offer_query("steel slag", 5000.0, "Mumbai"),
        );
        // 40 material + 30 quantity + 10 different-region floor
        assert_eq!(card.score, 80);
        assert!(card.reasons[2].contains("Different region"));
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let c = consumer("cotton waste", 1000.0, "Surat");
        let q = offer_query("textile offcuts", 900.0, "Coimbatore");
        let s = scorer();
        let first = s.score_against_offer(&c, &q);
        let second = s.score_against_offer(&c, &q);
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_query_still_scored() {
        let card = scorer().score_against_offer(
            &consumer("steel slag", 5500.0, "Mumbai"),
            &offer_query("", 0.0, ""),
        );
        // Only the different-region floor fires.
        assert_eq!(card.score, 10);
        assert!(card.reasons.len() <= 3);
    }

    #[test]
    fn test_buyer_rubric_caps_at_100() {
        let s = scorer();
        let card = s.score_buyer_for_offer(
            &consumer("steel slag", 5500.0, "Mumbai"),
            &offer_query("steel slag", 5000.0, "Mumbai"),
        );
        // 40 + 25 + 15 + 10 + 10 = 100 exactly
        assert_eq!(card.score, 100);
        assert_eq!(card.reasons.len(), 3);
    }

    #[test]
    fn test_buyer_rubric_hazardous_loses_bonus() {
        let s = scorer();
        let mut q = offer_query("steel slag", 5000.0, "Mumbai");
        q.hazardous = true;
        let card = s.score_buyer_for_offer(&consumer("steel slag", 5500.0, "Mumbai"), &q);
        assert_eq!(card.score, 90);
    }

    #[test]
    fn test_gated_blend_requires_coordinates() {
        let g = GatedBlendScorer::new(Arc::new(CompatTables::default()));
        let c = consumer("steel slag", 5000.0, "Mumbai");
        let q = offer_query("steel slag", 5000.0, "Mumbai");
        assert!(g.score(&c, &q).is_none());
    }

    #[test]
    fn test_gated_blend_material_gate() {
        let g = GatedBlendScorer::new(Arc::new(CompatTables::default()));
        let mut c = consumer("cotton waste", 5000.0, "Mumbai");
        c.latitude = Some(19.0760);
        c.longitude = Some(72.8777);
        let mut q = offer_query("steel slag", 5000.0, "Mumbai");
        q.latitude = Some(19.0760);
        q.longitude = Some(72.8777);
        // Materials incompatible: rejected outright, no floor.
        assert!(g.score(&c, &q).is_none());
    }

    #[test]
    fn test_gated_blend_exact_match_nearby() {
        let g = GatedBlendScorer::new(Arc::new(CompatTables::default()));
        let mut c = consumer("steel slag", 5000.0, "Mumbai");
        c.latitude = Some(19.0760);
        c.longitude = Some(72.8777);
        let mut q = offer_query("steel slag", 5000.0, "Mumbai");
        q.latitude = Some(19.0800);
        q.longitude = Some(72.8800);
        let card = g.score(&c, &q).unwrap();
        // 0.4*100 + 0.3*100 + 0.3*100 = 100
        assert_eq!(card.score, 100);
    }

    #[test]
    fn test_gated_blend_affinity_tier() {
        let g = GatedBlendScorer::new(Arc::new(CompatTables::default()));
        let mut c = consumer("metal shavings", 2500.0, "Mumbai");
        c.latitude = Some(19.0760);
        c.longitude = Some(72.8777);
        let mut q = offer_query("steel slag", 5000.0, "Mumbai");
        q.latitude = Some(19.0760);
        q.longitude = Some(72.8777);
        let card = g.score(&c, &q).unwrap();
        // 0.4*75 + 0.3*100 + 0.3*50 = 75
        assert_eq!(card.score, 75);
    }
}
