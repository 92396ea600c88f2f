use std::collections::HashMap;
use std::sync::Arc;

use crate::core::compat::{materials_match, location_matches, quantity_matches, CompatTables};
use crate::core::distance::haversine_distance;
use crate::core::scoring::AdditiveScorer;
use crate::models::{
    CounterpartEntry, MatchQuery, MatchResult, MatchSource, QuerySide, Role, ScoringWeights,
};

/// Candidate filter/rank pipeline.
///
/// A strict boolean pre-filter (material AND quantity AND location) decides
/// who survives; the softer additive scorer then ranks and annotates the
/// survivors. The two layers are deliberately different: the filter gates,
/// the scorer grades.
#[derive(Clone)]
pub struct Matcher {
    scorer: AdditiveScorer,
    tables: Arc<CompatTables>,
    limit: usize,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, tables: Arc<CompatTables>, limit: usize) -> Self {
        Self {
            scorer: AdditiveScorer::new(weights, tables.clone()),
            tables,
            limit,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            ScoringWeights::default(),
            Arc::new(CompatTables::default()),
            20,
        )
    }

    pub fn scorer(&self) -> &AdditiveScorer {
        &self.scorer
    }

    /// Rank compatible counterparts for a single query, best first.
    pub fn rank(&self, query: &MatchQuery, pool: &[CounterpartEntry]) -> Vec<MatchResult> {
        let mut results: Vec<(usize, MatchResult)> = pool
            .iter()
            .enumerate()
            .filter(|(_, c)| self.passes_prefilter(c, query))
            .map(|(idx, c)| (idx, self.build_result(c, query)))
            .collect();

        // Stable by construction: equal scores keep original pool order.
        results.sort_by(|a, b| b.1.score.cmp(&a.1.score).then(a.0.cmp(&b.0)));

        results
            .into_iter()
            .map(|(_, r)| r)
            .take(self.limit)
            .collect()
    }

    /// Rank across several queries from the same user, deduplicating by
    /// counterpart: each counterpart appears once, attached to its single
    /// best-scoring query.
    pub fn rank_many(
        &self,
        queries: &[MatchQuery],
        pool: &[CounterpartEntry],
    ) -> Vec<MatchResult> {
        let mut best: HashMap<String, (usize, MatchResult)> = HashMap::new();

        for query in queries {
            for (idx, c) in pool.iter().enumerate() {
                if !self.passes_prefilter(c, query) {
                    continue;
                }
                let result = self.build_result(c, query);
                match best.get(&c.id) {
                    Some((_, held)) if held.score >= result.score => {}
                    _ => {
                        best.insert(c.id.clone(), (idx, result));
                    }
                }
            }
        }

        let mut results: Vec<(usize, MatchResult)> = best.into_values().collect();
        results.sort_by(|a, b| b.1.score.cmp(&a.1.score).then(a.0.cmp(&b.0)));

        results
            .into_iter()
            .map(|(_, r)| r)
            .take(self.limit)
            .collect()
    }

    fn passes_prefilter(&self, counterpart: &CounterpartEntry, query: &MatchQuery) -> bool {
        // Never match a user's own records back to them.
        if counterpart
            .owner_id
            .as_deref()
            .is_some_and(|owner| owner == query.owner_id)
        {
            return false;
        }
        if counterpart.role != expected_role(query.side) {
            return false;
        }
        materials_match(&counterpart.material_type, &query.material_type, &self.tables)
            && quantity_matches(query.quantity_kg, counterpart.quantity_kg)
            && location_matches(&counterpart.city, &query.city, &self.tables)
    }

    fn build_result(&self, counterpart: &CounterpartEntry, query: &MatchQuery) -> MatchResult {
        let card = match query.side {
            QuerySide::Offer => self.scorer.score_against_offer(counterpart, query),
            QuerySide::Requirement => self.scorer.score_against_requirement(counterpart, query),
        };

        let distance_km = match (
            query.latitude,
            query.longitude,
            counterpart.latitude,
            counterpart.longitude,
        ) {
            (Some(qlat), Some(qlon), Some(clat), Some(clon)) => {
                Some(haversine_distance(qlat, qlon, clat, clon))
            }
            _ => None,
        };

        MatchResult {
            query_id: query.id.clone(),
            counterpart_id: counterpart.id.clone(),
            counterpart_name: counterpart.company_name.clone(),
            counterpart_city: counterpart.city.clone(),
            score: card.score,
            reasons: card.reasons,
            material_type: query.material_type.clone(),
            quantity_kg: query.quantity_kg,
            city: query.city.clone(),
            price_per_kg: counterpart.price_per_kg,
            co2_saved_kg: (query.quantity_kg * 0.5).round(),
            distance_km,
            source: MatchSource::Directory,
            is_synthetic: false,
            created_at: chrono::Utc::now(),
        }
    }
}

fn expected_role(side: QuerySide) -> Role {
    match side {
        // A producer's offer is matched against consumers, and vice versa.
        QuerySide::Offer => Role::Consumer,
        QuerySide::Requirement => Role::Producer,
    }
}
