// Core algorithm exports
pub mod compat;
pub mod distance;
pub mod impact;
pub mod matcher;
pub mod scoring;

pub use compat::{
    material_affinity, materials_match, location_matches, normalize, quantity_matches,
    CompatTables,
};
pub use distance::haversine_distance;
pub use impact::estimate_impact;
pub use matcher::Matcher;
pub use scoring::{AdditiveScorer, GatedBlendScorer, ScoreCard, ScoringStrategy};
