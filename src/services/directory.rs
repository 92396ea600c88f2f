use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{CounterpartEntry, MaterialOffer, MaterialRequirement, Role};

/// Errors from the directory collaborator.
///
/// These propagate to the engine's caller untouched; retry policy belongs to
/// the collaborator, not to this crate.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read access to listings, requirements, and the counterpart directory.
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    async fn offers_by_owner(&self, owner_id: &str) -> Result<Vec<MaterialOffer>, DirectoryError>;

    async fn requirements_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<MaterialRequirement>, DirectoryError>;

    async fn counterparts(&self, role: Role) -> Result<Vec<CounterpartEntry>, DirectoryError>;
}

/// Collection names in the document store
#[derive(Debug, Clone)]
pub struct DirectoryCollections {
    pub offers: String,
    pub requirements: String,
    pub counterparts: String,
}

/// Document-store REST client backing the live directory.
pub struct HttpDirectory {
    base_url: String,
    api_key: String,
    client: Client,
    collections: DirectoryCollections,
}

impl HttpDirectory {
    pub fn new(base_url: String, api_key: String, collections: DirectoryCollections) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
            collections,
        }
    }

    async fn fetch_documents(
        &self,
        collection: &str,
        queries: &[String],
    ) -> Result<Vec<Value>, DirectoryError> {
        let queries_json = serde_json::to_string(queries)
            .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;
        let encoded = urlencoding::encode(&queries_json);

        let url = format!(
            "{}/collections/{}/documents?query={}",
            self.base_url.trim_end_matches('/'),
            collection,
            encoded
        );

        tracing::debug!("Fetching documents from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Failed to fetch {}: {}",
                collection,
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| DirectoryError::InvalidResponse("Missing documents array".into()))?;

        Ok(documents.clone())
    }
}

#[async_trait]
impl DirectoryProvider for HttpDirectory {
    async fn offers_by_owner(&self, owner_id: &str) -> Result<Vec<MaterialOffer>, DirectoryError> {
        let queries = vec![format!("equal(\"ownerId\", \"{}\")", owner_id)];
        let documents = self
            .fetch_documents(&self.collections.offers, &queries)
            .await?;

        // Tolerant decode: a single malformed document must not sink the
        // whole read.
        let offers: Vec<MaterialOffer> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value(data.clone()).ok()
            })
            .collect();

        tracing::debug!("Fetched {} offers for owner {}", offers.len(), owner_id);
        Ok(offers)
    }

    async fn requirements_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<MaterialRequirement>, DirectoryError> {
        let queries = vec![format!("equal(\"ownerId\", \"{}\")", owner_id)];
        let documents = self
            .fetch_documents(&self.collections.requirements, &queries)
            .await?;

        let requirements: Vec<MaterialRequirement> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value(data.clone()).ok()
            })
            .collect();

        tracing::debug!(
            "Fetched {} requirements for owner {}",
            requirements.len(),
            owner_id
        );
        Ok(requirements)
    }

    async fn counterparts(&self, role: Role) -> Result<Vec<CounterpartEntry>, DirectoryError> {
        let role_str = match role {
            Role::Producer => "producer",
            Role::Consumer => "consumer",
        };
        let queries = vec![format!("equal(\"role\", \"{}\")", role_str)];
        let documents = self
            .fetch_documents(&self.collections.counterparts, &queries)
            .await?;

        let entries: Vec<CounterpartEntry> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value(data.clone()).ok()
            })
            .filter(|e: &CounterpartEntry| e.role == role)
            .collect();

        tracing::debug!("Fetched {} {} counterparts", entries.len(), role_str);
        Ok(entries)
    }
}

/// In-memory directory for tests and for deployments running off the seeded
/// marketplace snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    pub offers: Vec<MaterialOffer>,
    pub requirements: Vec<MaterialRequirement>,
    pub entries: Vec<CounterpartEntry>,
}

impl StaticDirectory {
    pub fn new(
        offers: Vec<MaterialOffer>,
        requirements: Vec<MaterialRequirement>,
        entries: Vec<CounterpartEntry>,
    ) -> Self {
        Self {
            offers,
            requirements,
            entries,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The curated marketplace snapshot: 10 producers and 10 consumers.
    pub fn seeded() -> Self {
        fn entry(
            id: &str,
            name: &str,
            city: &str,
            role: Role,
            material: &str,
            qty: f64,
            price: f64,
            industry: &str,
        ) -> CounterpartEntry {
            CounterpartEntry {
                id: id.to_string(),
                company_name: name.to_string(),
                city: city.to_string(),
                role,
                material_type: material.to_string(),
                quantity_kg: qty,
                price_per_kg: Some(price),
                industry: Some(industry.to_string()),
                owner_id: None,
                latitude: None,
                longitude: None,
            }
        }

        let entries = vec![
            entry("prod-1", "Raj Steel Works", "Mumbai", Role::Producer, "Steel slag", 5000.0, 12.0, "Steel"),
            entry("prod-2", "Shree Textiles Ltd", "Surat", Role::Producer, "Cotton waste", 2000.0, 8.0, "Textile"),
            entry("prod-3", "MediPharm Labs", "Hyderabad", Role::Producer, "Chemical effluents (treated)", 800.0, 25.0, "Pharma"),
            entry("prod-4", "TechRecycle India", "Bangalore", Role::Producer, "E-waste (processed)", 1500.0, 45.0, "Electronics"),
            entry("prod-5", "GreenPlast Industries", "Pune", Role::Producer, "Plastic scrap", 3000.0, 18.0, "Chemical"),
            entry("prod-6", "Bharat Cement Unit", "Raipur", Role::Producer, "Ceramic waste", 4000.0, 6.0, "Cement"),
            entry("prod-7", "Southern Spinning Co", "Coimbatore", Role::Producer, "Textile offcuts", 1200.0, 10.0, "Textile"),
            entry("prod-8", "Metalloy Foundry", "Jamshedpur", Role::Producer, "Metal shavings", 2500.0, 22.0, "Steel"),
            entry("prod-9", "Sunrise Pharma Waste", "Ahmedabad", Role::Producer, "Organic waste", 600.0, 5.0, "Pharma"),
            entry("prod-10", "EcoBattery Solutions", "Chennai", Role::Producer, "Battery scrap", 900.0, 55.0, "Electronics"),
            entry("cons-1", "National Steel Corp", "Mumbai", Role::Consumer, "Steel slag", 6000.0, 14.0, "Steel"),
            entry("cons-2", "Premier Fabrics", "Surat", Role::Consumer, "Cotton waste", 2500.0, 9.0, "Textile"),
            entry("cons-3", "LifeCare Pharmaceuticals", "Hyderabad", Role::Consumer, "Chemical effluents (treated)", 1000.0, 28.0, "Pharma"),
            entry("cons-4", "Digital Components Ltd", "Bangalore", Role::Consumer, "E-waste (processed)", 2000.0, 48.0, "Electronics"),
            entry("cons-5", "Polymer Solutions", "Pune", Role::Consumer, "Plastic scrap", 4000.0, 20.0, "Chemical"),
            entry("cons-6", "Mega Cement Ltd", "Raipur", Role::Consumer, "Ceramic waste", 5000.0, 7.0, "Cement"),
            entry("cons-7", "Weave India Exports", "Coimbatore", Role::Consumer, "Textile offcuts", 1500.0, 11.0, "Textile"),
            entry("cons-8", "Alloy Manufacturing Co", "Jamshedpur", Role::Consumer, "Metal shavings", 3000.0, 24.0, "Steel"),
            entry("cons-9", "BioPharm Research", "Ahmedabad", Role::Consumer, "Organic waste", 800.0, 6.0, "Pharma"),
            entry("cons-10", "PowerCell Industries", "Chennai", Role::Consumer, "Battery scrap", 1200.0, 58.0, "Electronics"),
        ];

        Self::new(vec![], vec![], entries)
    }
}

#[async_trait]
impl DirectoryProvider for StaticDirectory {
    async fn offers_by_owner(&self, owner_id: &str) -> Result<Vec<MaterialOffer>, DirectoryError> {
        Ok(self
            .offers
            .iter()
            .filter(|o| o.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn requirements_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<MaterialRequirement>, DirectoryError> {
        Ok(self
            .requirements
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn counterparts(&self, role: Role) -> Result<Vec<CounterpartEntry>, DirectoryError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.role == role)
            .cloned()
            .collect())
    }
}
