use serde::{Deserialize, Serialize};

/// Which side of the marketplace a counterpart sits on.
///
/// Exactly two values; the role determines which scoring rubric applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Producer,
    Consumer,
}

/// A producer's listed surplus material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialOffer {
    pub id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    #[serde(rename = "materialType")]
    pub material_type: String,
    #[serde(rename = "quantityKg")]
    pub quantity_kg: f64,
    pub city: String,
    #[serde(default)]
    pub hazardous: bool,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A consumer's declared material need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    #[serde(rename = "materialType")]
    pub material_type: String,
    #[serde(rename = "quantityKg")]
    pub quantity_kg: f64,
    pub city: String,
    #[serde(rename = "pricePerKg", default)]
    pub price_per_kg: Option<f64>,
    #[serde(default)]
    pub hazardous: bool,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Directory record being evaluated against a query.
///
/// Read-only reference data: sourced from the static directory, from other
/// users' live records, or synthesized by the AI facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartEntry {
    pub id: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    pub city: String,
    pub role: Role,
    #[serde(rename = "materialType")]
    pub material_type: String,
    #[serde(rename = "quantityKg")]
    pub quantity_kg: f64,
    #[serde(rename = "pricePerKg", default)]
    pub price_per_kg: Option<f64>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Set when the entry mirrors a live user record, so a user never
    /// matches their own listings.
    #[serde(rename = "ownerId", default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Which kind of record a query was built from. Picks the reason templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySide {
    Offer,
    Requirement,
}

/// Unified, engine-internal view of an offer or requirement.
///
/// Missing fields degrade every heuristic to "no match" instead of failing;
/// a malformed query is still scored.
#[derive(Debug, Clone)]
pub struct MatchQuery {
    pub side: QuerySide,
    pub id: String,
    pub owner_id: String,
    pub material_type: String,
    pub quantity_kg: f64,
    pub city: String,
    pub hazardous: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl MaterialOffer {
    pub fn as_query(&self) -> MatchQuery {
        MatchQuery {
            side: QuerySide::Offer,
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            material_type: self.material_type.clone(),
            quantity_kg: self.quantity_kg,
            city: self.city.clone(),
            hazardous: self.hazardous,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl MaterialRequirement {
    pub fn as_query(&self) -> MatchQuery {
        MatchQuery {
            side: QuerySide::Requirement,
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            material_type: self.material_type.clone(),
            quantity_kg: self.quantity_kg,
            city: self.city.clone(),
            hazardous: self.hazardous,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Where a match result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Directory,
    Oracle,
    Fallback,
}

/// A scored match, produced fresh on every discovery call and never
/// persisted by the engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "queryId")]
    pub query_id: String,
    #[serde(rename = "counterpartId")]
    pub counterpart_id: String,
    #[serde(rename = "counterpartName")]
    pub counterpart_name: String,
    #[serde(rename = "counterpartCity")]
    pub counterpart_city: String,
    /// Compatibility score in 0..=100.
    pub score: u8,
    /// At most 3 entries, most salient first.
    pub reasons: Vec<String>,
    #[serde(rename = "materialType")]
    pub material_type: String,
    #[serde(rename = "quantityKg")]
    pub quantity_kg: f64,
    pub city: String,
    #[serde(rename = "pricePerKg", default)]
    pub price_per_kg: Option<f64>,
    #[serde(rename = "co2SavedKg")]
    pub co2_saved_kg: f64,
    #[serde(rename = "distanceKm", default)]
    pub distance_km: Option<f64>,
    pub source: MatchSource,
    /// True only for the fixed illustrative set; a presentation safety net,
    /// never a business recommendation.
    #[serde(rename = "isSynthetic")]
    pub is_synthetic: bool,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Simplified sustainability estimate derived from quantity alone.
/// A linear proxy, documented as an estimate rather than a guarantee.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImpactEstimate {
    #[serde(rename = "co2Saved")]
    pub co2_saved: f64,
    #[serde(rename = "wasteDiverted")]
    pub waste_diverted: f64,
    #[serde(rename = "energySaved")]
    pub energy_saved: f64,
}

/// Additive rubric weights. Nominal weights can exceed 100; the summed
/// score is capped there.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub material: f64,
    pub quantity: f64,
    pub location: f64,
    /// Awarded instead of `location` when regions differ; different-region
    /// deals are still viable.
    pub location_fallback: f64,
    pub same_city: f64,
    pub quantity_range: f64,
    pub non_hazard: f64,
    pub circular: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            material: 40.0,
            quantity: 30.0,
            location: 30.0,
            location_fallback: 10.0,
            same_city: 25.0,
            quantity_range: 15.0,
            non_hazard: 10.0,
            circular: 10.0,
        }
    }
}
