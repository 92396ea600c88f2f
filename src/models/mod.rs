// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CounterpartEntry, ImpactEstimate, MatchQuery, MatchResult, MatchSource, MaterialOffer,
    MaterialRequirement, QuerySide, Role, ScoringWeights,
};
pub use requests::{AnalyzeOfferRequest, DiscoverMatchesRequest};
pub use responses::{
    AnalyzeOfferResponse, DiscoverMatchesResponse, ErrorResponse, HealthResponse, ImpactResponse,
};
