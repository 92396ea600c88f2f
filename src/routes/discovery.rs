use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::core::estimate_impact;
use crate::models::{
    AnalyzeOfferRequest, AnalyzeOfferResponse, DiscoverMatchesRequest, DiscoverMatchesResponse,
    ErrorResponse, HealthResponse, ImpactResponse, MatchQuery,
};
use crate::services::{AiDiscovery, DirectoryProvider, DiscoveryEngine};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DiscoveryEngine>,
    pub directory: Arc<dyn DirectoryProvider>,
    pub ai: Arc<AiDiscovery>,
}

/// Configure all discovery-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/discover", web::post().to(discover_matches))
        .route("/matches/analyze", web::post().to(analyze_offer))
        .route("/impact", web::get().to(impact_estimate));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        oracle_available: state.ai.is_available(),
        timestamp: chrono::Utc::now(),
    })
}

/// Discover counterparts for a user's records
///
/// POST /api/v1/matches/discover
///
/// Request body:
/// ```json
/// {
///   "ownerId": "string",
///   "side": "offer|requirement"
/// }
/// ```
async fn discover_matches(
    state: web::Data<AppState>,
    req: web::Json<DiscoverMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let request_id = uuid::Uuid::new_v4();
    let owner_id = &req.owner_id;
    tracing::info!(
        "[{}] Discovering matches for owner: {}, side: {}",
        request_id,
        owner_id,
        req.side
    );

    let queries: Vec<MatchQuery> = match req.side.to_lowercase().as_str() {
        "offer" => match state.directory.offers_by_owner(owner_id).await {
            Ok(offers) => offers.iter().map(|o| o.as_query()).collect(),
            Err(e) => {
                tracing::error!("Failed to load offers for {}: {}", owner_id, e);
                return directory_failure(e);
            }
        },
        "requirement" => match state.directory.requirements_by_owner(owner_id).await {
            Ok(reqs) => reqs.iter().map(|r| r.as_query()).collect(),
            Err(e) => {
                tracing::error!("Failed to load requirements for {}: {}", owner_id, e);
                return directory_failure(e);
            }
        },
        other => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid side".to_string(),
                message: format!("side must be 'offer' or 'requirement', got '{}'", other),
                status_code: 400,
            });
        }
    };

    let total_queries = queries.len();

    match state.engine.discover_many(&queries).await {
        Ok(mut discovery) => {
            if let Some(limit) = req.limit {
                discovery.matches.truncate(limit);
            }
            tracing::info!(
                "[{}] Returning {} matches for owner {} (stage: {:?})",
                request_id,
                discovery.matches.len(),
                owner_id,
                discovery.source
            );
            HttpResponse::Ok().json(DiscoverMatchesResponse {
                matches: discovery.matches,
                source: discovery.source,
                total_queries,
            })
        }
        Err(e) => {
            tracing::error!("Discovery failed for {}: {}", owner_id, e);
            directory_failure(e)
        }
    }
}

/// Analyze one offer against the full consumer directory
///
/// POST /api/v1/matches/analyze
///
/// Request body:
/// ```json
/// {
///   "ownerId": "string",
///   "offerId": "string"
/// }
/// ```
async fn analyze_offer(
    state: web::Data<AppState>,
    req: web::Json<AnalyzeOfferRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let offers = match state.directory.offers_by_owner(&req.owner_id).await {
        Ok(offers) => offers,
        Err(e) => {
            tracing::error!("Failed to load offers for {}: {}", req.owner_id, e);
            return directory_failure(e);
        }
    };

    let offer = match offers.iter().find(|o| o.id == req.offer_id) {
        Some(offer) => offer,
        None => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Offer not found".to_string(),
                message: format!("No offer '{}' for owner '{}'", req.offer_id, req.owner_id),
                status_code: 404,
            });
        }
    };

    match state.engine.analyze_offer(&offer.as_query()).await {
        Ok(matches) => {
            tracing::info!(
                "Analyzed offer {} against directory: {} matches kept",
                req.offer_id,
                matches.len()
            );
            HttpResponse::Ok().json(AnalyzeOfferResponse { matches })
        }
        Err(e) => {
            tracing::error!("Analysis failed for offer {}: {}", req.offer_id, e);
            directory_failure(e)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImpactQuery {
    #[serde(rename = "quantityKg")]
    quantity_kg: f64,
}

/// Sustainability estimate for a quantity
///
/// GET /api/v1/impact?quantityKg=1000
async fn impact_estimate(query: web::Query<ImpactQuery>) -> impl Responder {
    HttpResponse::Ok().json(ImpactResponse {
        quantity_kg: query.quantity_kg,
        impact: estimate_impact(query.quantity_kg),
    })
}

fn directory_failure(e: crate::services::DirectoryError) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "Directory read failed".to_string(),
        message: e.to_string(),
        status_code: 500,
    })
}
