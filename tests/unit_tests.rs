// Unit tests for reCircle Match

use recircle_match::core::{
    compat::{location_matches, materials_match, normalize, quantity_matches},
    distance::haversine_distance,
    estimate_impact, AdditiveScorer, CompatTables, GatedBlendScorer, ScoringStrategy,
};
use recircle_match::models::{CounterpartEntry, MatchQuery, QuerySide, Role, ScoringWeights};
use recircle_match::services::oracle::extract_json;
use std::sync::Arc;

fn consumer_entry(material: &str, qty: f64, city: &str) -> CounterpartEntry {
    CounterpartEntry {
        id: "c1".to_string(),
        company_name: "Tata Steel Processing".to_string(),
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
        id: "o1".to_string(),
        owner_id: "u1".to_string(),
        material_type: material.to_string(),
        quantity_kg: qty,
        city: city.to_string(),
        hazardous: false,
        latitude: None,
        longitude: None,
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(19.0760, 72.8777, 19.0760, 72.8777);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_mumbai_to_pune() {
    // Mumbai to Pune is roughly 120 km as the crow flies
    let distance = haversine_distance(19.0760, 72.8777, 18.5204, 73.8567);
    assert!(distance > 100.0 && distance < 150.0);
}

#[test]
fn test_haversine_distance_mumbai_to_chennai() {
    let distance = haversine_distance(19.0760, 72.8777, 13.0827, 80.2707);
    assert!(distance > 1000.0 && distance < 1100.0);
}

#[test]
fn test_normalize_is_idempotent() {
    let once = normalize("  Steel SLAG  ");
    let twice = normalize(&once);
    assert_eq!(once, twice);
    assert_eq!(once, "steel slag");
}

#[test]
fn test_materials_match_is_reflexive_and_symmetric() {
    let tables = CompatTables::default();
    for material in ["steel slag", "Cotton Waste", "e-waste", "plastic scrap"] {
        assert!(materials_match(material, material, &tables));
    }
    assert_eq!(
        materials_match("steel slag", "metal shavings", &tables),
        materials_match("metal shavings", "steel slag", &tables)
    );
}

#[test]
fn test_materials_match_rejects_cross_category() {
    let tables = CompatTables::default();
    assert!(!materials_match("steel slag", "cotton waste", &tables));
    assert!(!materials_match("e-waste", "organic waste", &tables));
}

#[test]
fn test_quantity_band_boundaries_inclusive() {
    // Exactly half and exactly double both count.
    assert!(quantity_matches(1000.0, 500.0));
    assert!(quantity_matches(1000.0, 2000.0));
    assert!(!quantity_matches(1000.0, 499.0));
    assert!(!quantity_matches(1000.0, 2001.0));
}

#[test]
fn test_quantity_band_symmetric_for_oversupply() {
    // 5000 required vs 9000 available: 9000 <= 2*5000, matches.
    assert!(quantity_matches(5000.0, 9000.0));
    assert!(quantity_matches(9000.0, 5000.0));
}

#[test]
fn test_location_region_clusters() {
    let tables = CompatTables::default();
    assert!(location_matches("Mumbai", "Navi Mumbai", &tables));
    assert!(location_matches("Delhi", "Noida", &tables));
    assert!(location_matches("Bangalore", "Bengaluru", &tables));
    assert!(!location_matches("Mumbai", "Kolkata", &tables));
    assert!(!location_matches("", "Mumbai", &tables));
}

#[test]
fn test_additive_score_always_bounded() {
    let scorer = AdditiveScorer::new(ScoringWeights::default(), Arc::new(CompatTables::default()));
    let cases = [
        ("steel slag", 5000.0, "Mumbai"),
        ("", 0.0, ""),
        ("unknown sludge", -10.0, "Nowhere"),
        ("cotton waste", f64::NAN, "Surat"),
    ];
    for (material, qty, city) in cases {
        let card = scorer.score_against_offer(
            &consumer_entry("steel slag", 5500.0, "Mumbai"),
            &offer_query(material, qty, city),
        );
        assert!(card.score <= 100);
        assert!(card.reasons.len() <= 3);
    }
}

#[test]
fn test_strategies_disagree_on_material_gate() {
    // The additive rubric still produces a score for incompatible materials;
    // the gated blend rejects the pairing outright.
    let tables = Arc::new(CompatTables::default());
    let additive = AdditiveScorer::new(ScoringWeights::default(), tables.clone());
    let gated = GatedBlendScorer::new(tables);

    let mut entry = consumer_entry("cotton waste", 5000.0, "Mumbai");
    entry.latitude = Some(19.0760);
    entry.longitude = Some(72.8777);
    let mut query = offer_query("steel slag", 5000.0, "Mumbai");
    query.latitude = Some(19.0760);
    query.longitude = Some(72.8777);

    let additive_card = additive.score(&entry, &query).unwrap();
    assert!(additive_card.score > 0);
    assert!(gated.score(&entry, &query).is_none());
}

#[test]
fn test_extract_json_handles_markdown_fences() {
    let value = extract_json("```json\n{\"score\": 85}\n```").unwrap();
    assert_eq!(value["score"], 85);
}

#[test]
fn test_extract_json_handles_surrounding_prose() {
    let value =
        extract_json("Based on my analysis: [{\"companyName\": \"X\"}] Let me know!").unwrap();
    assert!(value.is_array());
}

#[test]
fn test_extract_json_rejects_garbage() {
    assert!(extract_json("no structure at all").is_none());
    assert!(extract_json("} backwards {").is_none());
}

#[test]
fn test_impact_estimate_formula() {
    let impact = estimate_impact(1000.0);
    assert_eq!(impact.co2_saved, 500.0);
    assert_eq!(impact.waste_diverted, 1000.0);
    assert_eq!(impact.energy_saved, 300.0);
}

#[test]
fn test_impact_estimate_degrades_on_bad_input() {
    let impact = estimate_impact(f64::NAN);
    assert_eq!(impact.co2_saved, 0.0);
    assert_eq!(impact.waste_diverted, 0.0);
    assert_eq!(impact.energy_saved, 0.0);
}
