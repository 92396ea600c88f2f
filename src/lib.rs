//! reCircle Match - compatibility scoring and match discovery for an
//! industrial waste-exchange marketplace.
//!
//! Producers list surplus material, consumers list requirements, and this
//! service scores the two sides against each other. Discovery runs as a
//! fallback cascade: the local directory first, an AI synthesis stage when
//! the directory comes up empty, and a curated demo set as the last resort.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    distance::haversine_distance, estimate_impact, AdditiveScorer, CompatTables, GatedBlendScorer,
    Matcher, ScoringStrategy,
};
pub use models::{
    CounterpartEntry, ImpactEstimate, MatchQuery, MatchResult, MatchSource, MaterialOffer,
    MaterialRequirement, Role, ScoringWeights,
};
pub use services::{AiDiscovery, DirectoryProvider, DiscoveryEngine, StaticDirectory};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let km = haversine_distance(19.0760, 72.8777, 18.5204, 73.8567);
        assert!(km > 100.0 && km < 150.0);
    }
}
