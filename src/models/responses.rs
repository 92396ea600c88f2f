use serde::{Deserialize, Serialize};

use crate::models::domain::{ImpactEstimate, MatchResult, MatchSource};

/// Response for the discover endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverMatchesResponse {
    pub matches: Vec<MatchResult>,
    /// Which cascade stage served this request.
    pub source: MatchSource,
    #[serde(rename = "totalQueries")]
    pub total_queries: usize,
}

/// Response for the analyze endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeOfferResponse {
    pub matches: Vec<MatchResult>,
}

/// Response for the impact endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactResponse {
    #[serde(rename = "quantityKg")]
    pub quantity_kg: f64,
    pub impact: ImpactEstimate,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(rename = "oracleAvailable")]
    pub oracle_available: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
