mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use config::Settings;
use core::{CompatTables, Matcher};
use models::ScoringWeights;
use routes::discovery::AppState;
use services::{
    AiDiscovery, DirectoryCollections, DirectoryProvider, DiscoveryEngine, GeminiClient,
    HttpDirectory, StaticDirectory,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting reCircle match service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Shared material/region tables used by every scoring path
    let tables = Arc::new(CompatTables::default());

    // Directory backend: live document store or the seeded snapshot
    let directory: Arc<dyn DirectoryProvider> = match settings.directory.mode.as_str() {
        "http" => {
            let collections = DirectoryCollections {
                offers: settings.directory.collections.offers,
                requirements: settings.directory.collections.requirements,
                counterparts: settings.directory.collections.counterparts,
            };
            info!("Directory backend: http ({})", settings.directory.endpoint);
            Arc::new(HttpDirectory::new(
                settings.directory.endpoint,
                settings.directory.api_key,
                collections,
            ))
        }
        _ => {
            info!("Directory backend: static seeded snapshot");
            Arc::new(StaticDirectory::seeded())
        }
    };

    // AI discovery is optional; without a key the cascade skips straight
    // from the directory to the demo fallback.
    let ai = if settings.oracle.api_key.is_empty() {
        warn!("No oracle API key configured, AI discovery disabled");
        Arc::new(AiDiscovery::disabled())
    } else {
        let oracle = GeminiClient::new(
            settings.oracle.endpoint,
            settings.oracle.api_key,
            settings.oracle.model.clone(),
            settings.oracle.timeout_secs,
        );
        info!("AI discovery enabled (model: {})", settings.oracle.model);
        Arc::new(AiDiscovery::new(Arc::new(oracle)))
    };

    // Initialize matcher with configured weights
    let weights = ScoringWeights::from(settings.scoring.weights);
    let matcher = Matcher::new(weights, Arc::clone(&tables), settings.matching.limit);

    info!(
        "Matcher initialized (limit: {}, min deal score: {})",
        settings.matching.limit, settings.matching.min_deal_score
    );

    let engine = Arc::new(DiscoveryEngine::new(
        Arc::clone(&directory),
        Arc::clone(&ai),
        matcher,
        settings.matching.min_deal_score,
    ));

    // Build application state
    let app_state = AppState {
        engine,
        directory,
        ai,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
