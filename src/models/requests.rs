use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to discover counterparts for a user's records
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiscoverMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "owner_id", rename = "ownerId")]
    pub owner_id: String,
    /// "offer" to find buyers for the user's listings, "requirement" to
    /// find suppliers for the user's needs.
    #[serde(default = "default_side")]
    pub side: String,
    /// Optional cap on returned matches, applied after ranking.
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<usize>,
}

fn default_side() -> String {
    "offer".to_string()
}

/// Request to analyze one offer against the full consumer directory
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzeOfferRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "owner_id", rename = "ownerId")]
    pub owner_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "offer_id", rename = "offerId")]
    pub offer_id: String,
}
