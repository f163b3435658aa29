use axum::{
    Json, Router,
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::config::ResponseStyle;
use crate::error::SearchError;
use crate::models::{ProductListing, SearchOutcome, SearchStatus};
use crate::search::ProductSearch;

#[derive(Clone)]
pub struct AppState {
    pub search: ProductSearch,
    pub style: ResponseStyle,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

/// JSON body of a successful `/search`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchEnvelope {
    Detailed {
        query: String,
        count: usize,
        status: SearchStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        results: Vec<ProductListing>,
    },
    Bare {
        results: Vec<ProductListing>,
    },
}

impl SearchEnvelope {
    pub fn new(outcome: SearchOutcome, style: ResponseStyle) -> Self {
        let results: Vec<ProductListing> = outcome
            .results
            .into_iter()
            .map(ProductListing::from)
            .collect();

        match style {
            ResponseStyle::Detailed => Self::Detailed {
                query: outcome.query,
                count: results.len(),
                status: outcome.status,
                message: outcome.message,
                results,
            },
            ResponseStyle::Bare => Self::Bare { results },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiError {
    MissingQuery {
        error: &'static str,
        example: &'static str,
    },
    SearchFailed {
        error: &'static str,
        details: String,
    },
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::MissingQuery => Self::MissingQuery {
                error: "Please provide a search query",
                example: "/search?q=laptop",
            },
            SearchError::Fetch(e) => {
                error!("Search Error: {}", e);
                Self::SearchFailed {
                    error: "Failed to fetch products",
                    details: e.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::MissingQuery { .. } => StatusCode::BAD_REQUEST,
            Self::SearchFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/search", get(search))
        .layer(build_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<h1>{} Product Search API</h1>\n\
         <p>Use the /search endpoint with a query parameter:</p>\n\
         <a href=\"/search?q=laptop\">Example: /search?q=laptop</a>\n",
        state.search.source_name()
    ))
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchEnvelope>, ApiError> {
    let query = params.q.unwrap_or_default();
    let outcome = state.search.search(&query).await?;
    Ok(Json(SearchEnvelope::new(outcome, state.style)))
}
