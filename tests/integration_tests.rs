// Integration tests for reCircle Match

use async_trait::async_trait;
use recircle_match::core::{CompatTables, Matcher};
use recircle_match::models::{
    CounterpartEntry, MatchQuery, MatchSource, MaterialRequirement, QuerySide, Role, ScoringWeights,
};
use recircle_match::services::oracle::{AiDiscovery, Oracle, OracleError};
use recircle_match::services::{DiscoveryEngine, StaticDirectory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct ScriptedOracle {
    calls: AtomicUsize,
    response: Box<dyn Fn() -> Result<String, OracleError> + Send + Sync>,
}

impl ScriptedOracle {
    fn new(response: impl Fn() -> Result<String, OracleError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            response: Box::new(response),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn generate(&self, _prompt: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.response)()
    }
}

fn engine(directory: StaticDirectory, ai: AiDiscovery) -> DiscoveryEngine {
    let matcher = Matcher::new(
        ScoringWeights::default(),
        Arc::new(CompatTables::default()),
        20,
    );
    DiscoveryEngine::new(Arc::new(directory), Arc::new(ai), matcher, 60)
}

fn steel_requirement() -> MatchQuery {
    MaterialRequirement {
        id: "req-1".to_string(),
        owner_id: "user-1".to_string(),
        material_type: "steel slag".to_string(),
        quantity_kg: 5000.0,
        city: "Mumbai".to_string(),
        price_per_kg: None,
        hazardous: false,
        latitude: None,
        longitude: None,
        created_at: None,
    }
    .as_query()
}

#[tokio::test]
async fn test_seeded_directory_serves_steel_requirement_locally() {
    let oracle = ScriptedOracle::new(|| Err(OracleError::Api("should not be called".into())));
    let engine = engine(StaticDirectory::seeded(), AiDiscovery::new(oracle.clone()));

    let discovery = engine.discover(&steel_requirement()).await.unwrap();

    assert_eq!(discovery.source, MatchSource::Directory);
    assert!(!discovery.matches.is_empty());
    // Raj Steel Works: same material, 5000 kg, same city.
    let best = &discovery.matches[0];
    assert_eq!(best.counterpart_id, "prod-1");
    assert!(best.score >= 70);
    assert!(best.reasons.len() <= 3);
    assert!(!best.is_synthetic);
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn test_oracle_stage_serves_when_directory_is_empty() {
    let body = r#"[
        {"companyName": "EcoCement Industries", "city": "Nagpur",
         "pricePerKg": 9, "compatibilityScore": 86,
         "reasons": ["Kiln co-processing capacity", "Rail siding on site", "Annual offtake contracts"]},
        {"companyName": "Vindhya Smelters", "city": "Bhopal",
         "pricePerKg": 11, "compatibilityScore": 78,
         "reasons": ["Slag granulation line", "Mid-haul logistics", "Flexible settlement"]}
    ]"#;
    let owned = body.to_string();
    let oracle = ScriptedOracle::new(move || Ok(owned.clone()));
    let engine = engine(StaticDirectory::empty(), AiDiscovery::new(oracle.clone()));

    let discovery = engine.discover(&steel_requirement()).await.unwrap();

    assert_eq!(discovery.source, MatchSource::Oracle);
    assert_eq!(discovery.matches.len(), 2);
    assert_eq!(discovery.matches[0].counterpart_name, "EcoCement Industries");
    assert_eq!(discovery.matches[0].score, 86);
    // Synthesized candidates are oracle output, not the demo fixtures.
    assert!(discovery.matches.iter().all(|m| !m.is_synthetic));
    assert_eq!(oracle.call_count(), 1);
}

#[tokio::test]
async fn test_cascade_falls_through_on_malformed_oracle_output() {
    let oracle = ScriptedOracle::new(|| Ok("I'm sorry, I cannot help with that.".to_string()));
    let engine = engine(StaticDirectory::empty(), AiDiscovery::new(oracle.clone()));

    let discovery = engine.discover(&steel_requirement()).await.unwrap();

    assert_eq!(discovery.source, MatchSource::Fallback);
    assert_eq!(discovery.matches.len(), 3);
    assert!(discovery.matches.iter().all(|m| m.is_synthetic));
    assert_eq!(oracle.call_count(), 1);
}

#[tokio::test]
async fn test_breaker_stays_tripped_across_requests() {
    let oracle = ScriptedOracle::new(|| Err(OracleError::ModelGone("gemini-pro".to_string())));
    let engine = engine(StaticDirectory::empty(), AiDiscovery::new(oracle.clone()));

    let first = engine.discover(&steel_requirement()).await.unwrap();
    let second = engine.discover(&steel_requirement()).await.unwrap();
    let third = engine.discover(&steel_requirement()).await.unwrap();

    assert_eq!(first.source, MatchSource::Fallback);
    assert_eq!(second.source, MatchSource::Fallback);
    assert_eq!(third.source, MatchSource::Fallback);
    // The transport is hit exactly once for the whole process lifetime.
    assert_eq!(oracle.call_count(), 1);
}

#[tokio::test]
async fn test_disabled_ai_goes_straight_to_fallback() {
    let engine = engine(StaticDirectory::empty(), AiDiscovery::disabled());

    let discovery = engine.discover(&steel_requirement()).await.unwrap();

    assert_eq!(discovery.source, MatchSource::Fallback);
    assert_eq!(discovery.matches.len(), 3);
    // Fixtures are ordered best-first and carry full reason sets.
    assert!(discovery.matches.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(discovery.matches.iter().all(|m| m.reasons.len() == 3));
}

#[tokio::test]
async fn test_discover_many_dedupes_counterparts_across_queries() {
    let oracle = ScriptedOracle::new(|| Err(OracleError::Api("down".into())));
    let engine = engine(StaticDirectory::seeded(), AiDiscovery::new(oracle));

    let mumbai = steel_requirement();
    let mut pune = steel_requirement();
    pune.id = "req-2".to_string();
    pune.city = "Pune".to_string();

    let discovery = engine.discover_many(&[mumbai, pune]).await.unwrap();

    assert_eq!(discovery.source, MatchSource::Directory);
    let mut ids: Vec<&str> = discovery
        .matches
        .iter()
        .map(|m| m.counterpart_id.as_str())
        .collect();
    ids.sort_unstable();
    let before = ids.len();
    ids.dedup();
    assert_eq!(ids.len(), before);
    // Equal scores keep the counterpart attached to the earliest query.
    let prod1 = discovery
        .matches
        .iter()
        .find(|m| m.counterpart_id == "prod-1")
        .unwrap();
    assert_eq!(prod1.query_id, "req-1");
}

#[tokio::test]
async fn test_own_listings_never_matched_back() {
    let entry = CounterpartEntry {
        id: "mirror-1".to_string(),
        company_name: "My Own Plant".to_string(),
        city: "Mumbai".to_string(),
        role: Role::Producer,
        material_type: "steel slag".to_string(),
        quantity_kg: 5000.0,
        price_per_kg: Some(12.0),
        industry: None,
        owner_id: Some("user-1".to_string()),
        latitude: None,
        longitude: None,
    };
    let other = {
        let mut e = entry.clone();
        e.id = "other-1".to_string();
        e.owner_id = Some("user-2".to_string());
        e
    };

    let directory = StaticDirectory::new(vec![], vec![], vec![entry, other]);
    let engine = engine(directory, AiDiscovery::disabled());

    let discovery = engine.discover(&steel_requirement()).await.unwrap();

    assert_eq!(discovery.source, MatchSource::Directory);
    assert_eq!(discovery.matches.len(), 1);
    assert_eq!(discovery.matches[0].counterpart_id, "other-1");
}

#[tokio::test]
async fn test_analyze_offer_prefers_oracle_verdict() {
    let oracle = ScriptedOracle::new(|| {
        Ok(r#"{"score": 72, "reasons": ["Verified offtake demand", "Shared freight corridor"],
               "consultation": "Negotiate a trial shipment first."}"#
            .to_string())
    });
    let directory = StaticDirectory::new(
        vec![],
        vec![],
        vec![CounterpartEntry {
            id: "cons-x".to_string(),
            company_name: "Kaveri Alloys".to_string(),
            city: "Chennai".to_string(),
            role: Role::Consumer,
            material_type: "steel slag".to_string(),
            quantity_kg: 4000.0,
            price_per_kg: Some(15.0),
            industry: Some("Steel".to_string()),
            owner_id: None,
            latitude: None,
            longitude: None,
        }],
    );
    let engine = engine(directory, AiDiscovery::new(oracle));

    let mut offer = steel_requirement();
    offer.side = QuerySide::Offer;
    let results = engine.analyze_offer(&offer).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 72);
    assert_eq!(results[0].source, MatchSource::Oracle);
    assert_eq!(results[0].reasons.len(), 2);
}

#[tokio::test]
async fn test_match_results_carry_impact_figures() {
    let engine = engine(StaticDirectory::seeded(), AiDiscovery::disabled());

    let discovery = engine.discover(&steel_requirement()).await.unwrap();

    // co2 estimate is half the queried quantity, rounded.
    assert!(discovery
        .matches
        .iter()
        .all(|m| m.co2_saved_kg == (m.quantity_kg * 0.5).round()));
}
