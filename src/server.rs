//! HTTP wrapper around the engine
//!
//! A thin actix-web layer exposing one operation: `POST /linkedin/jobs/search`
//! with a `{filters, maxJobs}` body, forwarded directly to
//! [`JobAcquisitionEngine::search`]. One engine (one authenticated session) per
//! server process; searches are serialized on it.

use crate::config::Config;
use crate::engine::JobAcquisitionEngine;
use crate::model::JobRecord;
use crate::search::SearchFilters;
use crate::ScoutError;
use actix_cors::Cors;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};

const PLATFORM: &str = "linkedin";

fn default_max_jobs() -> usize {
    25
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub filters: SearchFilters,

    #[serde(rename = "maxJobs", default = "default_max_jobs")]
    pub max_jobs: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub platform: &'static str,
    pub count: usize,
    pub data: Vec<JobRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl SearchResponse {
    fn ok(data: Vec<JobRecord>) -> Self {
        Self {
            success: true,
            platform: PLATFORM,
            count: data.len(),
            data,
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn failed(error: &ScoutError) -> Self {
        Self {
            success: false,
            platform: PLATFORM,
            count: 0,
            data: Vec::new(),
            error: Some(error.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

struct AppState {
    engine: tokio::sync::Mutex<JobAcquisitionEngine>,
}

#[get("/api/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok", "platform": PLATFORM }))
}

#[post("/linkedin/jobs/search")]
async fn search_jobs(
    body: web::Json<SearchRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let request = body.into_inner();
    tracing::info!(
        "Search request: maxJobs={}, filters={:?}",
        request.max_jobs,
        request.filters
    );

    let mut engine = data.engine.lock().await;
    match engine.search(&request.filters, request.max_jobs).await {
        Ok(records) => HttpResponse::Ok().json(SearchResponse::ok(records)),
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            HttpResponse::InternalServerError().json(SearchResponse::failed(&e))
        }
    }
}

/// Launches the engine and serves the API until interrupted.
pub async fn run_server(config: Config) -> Result<(), ScoutError> {
    let engine = JobAcquisitionEngine::launch(&config).await?;
    let state = web::Data::new(AppState {
        engine: tokio::sync::Mutex::new(engine),
    });

    let host = config.server.host.clone();
    let port = config.server.port;
    tracing::info!("Serving on http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .service(health_check)
            .service(search_jobs)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
