use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    middleware,
    routing::{get, post},
};
use axum_helpers::{
    AppError, TokenAuth,
    auth::{ACCESS_TOKEN_HEADER, require_token},
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, MissingTokenResponse,
        ServiceUnavailableResponse, UnauthorizedResponse,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::domain::Domain;
use crate::error::SimilarityError;
use crate::index::VectorIndex;
use crate::models::{Record, SimilarityResult, VectorIds, effective_limit};
use crate::service::ContentService;

pub const ROOT_MESSAGE: &str = "ML Service API";
pub const STORED_MESSAGE: &str = "Added records to index";
pub const DELETED_MESSAGE: &str = "Deleted records from index";

/// OpenAPI documentation for the similarity endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        root,
        similar_problems,
        store_problems,
        delete_problems,
        similar_places,
        store_places,
        delete_places,
    ),
    components(
        schemas(
            RootResponse, Record, StoreRequest, DeleteRequest, MutationResponse,
            ProblemMatch, SimilarProblemsResponse, PlaceMatch, SimilarPlacesResponse
        ),
        responses(
            BadRequestResponse,
            MissingTokenResponse,
            UnauthorizedResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    modifiers(&AccessTokenAddon),
    tags(
        (name = "autoinsider", description = "Similar vehicle-repair problems"),
        (name = "europeanrailguide", description = "Similar travel places")
    )
)]
pub struct ApiDoc;

struct AccessTokenAddon;

impl Modify for AccessTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "access_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    ACCESS_TOKEN_HEADER.as_str(),
                ))),
            );
        }
    }
}

/// Both domain services, shared by every handler.
pub struct SimilarityState<R: VectorIndex> {
    pub autoinsider: Arc<ContentService<R>>,
    pub erg: Arc<ContentService<R>>,
}

impl<R: VectorIndex> SimilarityState<R> {
    pub fn new(autoinsider: Arc<ContentService<R>>, erg: Arc<ContentService<R>>) -> Self {
        Self { autoinsider, erg }
    }

    pub fn service(&self, domain: Domain) -> &Arc<ContentService<R>> {
        match domain {
            Domain::AutoInsider => &self.autoinsider,
            Domain::EuropeanRailGuide => &self.erg,
        }
    }
}

impl<R: VectorIndex> Clone for SimilarityState<R> {
    fn clone(&self) -> Self {
        Self {
            autoinsider: self.autoinsider.clone(),
            erg: self.erg.clone(),
        }
    }
}

/// Public root plus the token-protected domain routes.
pub fn router<R: VectorIndex + 'static>(state: SimilarityState<R>, auth: TokenAuth) -> Router {
    let ai = Domain::AutoInsider.base_path();
    let erg = Domain::EuropeanRailGuide.base_path();

    let protected = Router::new()
        .route(&format!("{ai}/index"), get(similar_problems::<R>))
        .route(&format!("{ai}/store"), post(store_problems::<R>))
        .route(&format!("{ai}/delete"), post(delete_problems::<R>))
        .route(&format!("{erg}/index"), get(similar_places::<R>))
        .route(&format!("{erg}/store"), post(store_places::<R>))
        .route(&format!("{erg}/delete"), post(delete_places::<R>))
        .route_layer(middleware::from_fn_with_state(auth, require_token))
        .with_state(state);

    Router::new().route("/", get(root)).merge(protected)
}

// ===== Request/Response DTOs =====

#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    #[schema(example = "ML Service API")]
    pub message: String,
}

/// Body of the `store` endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreRequest {
    pub data: Vec<Record>,
}

/// Body of the `delete` endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteRequest {
    #[schema(example = json!(["1", "2"]))]
    pub data: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MutationResponse {
    pub message: String,
    pub records: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProblemMatch {
    pub ai_id: String,
    pub problem_title: String,
    pub score: f32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceMatch {
    pub erg_id: String,
    pub place_name: String,
    pub score: f32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SimilarProblemsResponse {
    pub message: String,
    pub question: String,
    pub requested: u64,
    #[serde(rename = "similar-questions")]
    #[schema(value_type = Vec<ProblemMatch>)]
    pub similar_questions: Vec<SimilarityResult>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SimilarPlacesResponse {
    pub message: String,
    pub query: String,
    pub requested: u64,
    #[serde(rename = "similar-places")]
    #[schema(value_type = Vec<PlaceMatch>)]
    pub similar_places: Vec<SimilarityResult>,
}

// ===== Shared request handling =====

struct SimilarOutcome {
    text: String,
    limit: u64,
    results: Vec<SimilarityResult>,
}

async fn find_similar<R: VectorIndex>(
    service: &ContentService<R>,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<SimilarOutcome, AppError> {
    let Query(params) = params?;
    let domain = service.domain();
    let limit = effective_limit(params.get("limit").map(String::as_str));

    let text = params
        .get(domain.query_param())
        .filter(|t| !t.trim().is_empty())
        .cloned()
        .ok_or_else(|| SimilarityError::Validation(domain.missing_query_message().to_string()))?;

    let results = service.get_similar_for(&text, limit).await?;
    Ok(SimilarOutcome {
        text,
        limit,
        results,
    })
}

/// Extract the `data` member of a JSON body.
fn data_field(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    let Json(body) = payload?;
    match body {
        Value::Object(mut map) => map
            .remove("data")
            .ok_or_else(|| AppError::BadRequest("Missing 'data' field".to_string())),
        _ => Err(AppError::BadRequest("Body must be a JSON object".to_string())),
    }
}

async fn store_records<R: VectorIndex>(
    service: &ContentService<R>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MutationResponse>, AppError> {
    let records: Vec<Record> = serde_json::from_value(data_field(payload)?)
        .map_err(|e| AppError::BadRequest(format!("Invalid records: {}", e)))?;

    let indexed = service.add_to_index(&records).await?;
    Ok(Json(MutationResponse {
        message: STORED_MESSAGE.to_string(),
        records: indexed,
    }))
}

async fn delete_records<R: VectorIndex>(
    service: &ContentService<R>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MutationResponse>, AppError> {
    let ids = VectorIds::try_from(data_field(payload)?)?;
    let count = ids.len();

    service.delete_from_index(ids).await?;
    Ok(Json(MutationResponse {
        message: DELETED_MESSAGE.to_string(),
        records: count,
    }))
}

// ===== Handlers =====

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = RootResponse)
    )
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

/// Problems similar to a free-text question
#[utoipa::path(
    get,
    path = "/autoinsider/similar/problems/index",
    tag = "autoinsider",
    params(
        ("question" = String, Query, description = "Free-text question"),
        ("limit" = Option<i64>, Query, description = "Number of results, 1-10 (default 5)")
    ),
    security(("access_token" = [])),
    responses(
        (status = 200, description = "Similar problems, best first", body = SimilarProblemsResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn similar_problems<R: VectorIndex>(
    State(state): State<SimilarityState<R>>,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<SimilarProblemsResponse>, AppError> {
    let outcome = find_similar(&state.autoinsider, params).await?;

    Ok(Json(SimilarProblemsResponse {
        message: Domain::AutoInsider.message().to_string(),
        question: outcome.text,
        requested: outcome.limit,
        similar_questions: outcome.results,
    }))
}

/// Index problems
#[utoipa::path(
    post,
    path = "/autoinsider/similar/problems/store",
    tag = "autoinsider",
    request_body = StoreRequest,
    security(("access_token" = [])),
    responses(
        (status = 200, description = "Records indexed", body = MutationResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn store_problems<R: VectorIndex>(
    State(state): State<SimilarityState<R>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MutationResponse>, AppError> {
    store_records(&state.autoinsider, payload).await
}

/// Remove problems by id
#[utoipa::path(
    post,
    path = "/autoinsider/similar/problems/delete",
    tag = "autoinsider",
    request_body = DeleteRequest,
    security(("access_token" = [])),
    responses(
        (status = 200, description = "Records deleted", body = MutationResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn delete_problems<R: VectorIndex>(
    State(state): State<SimilarityState<R>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MutationResponse>, AppError> {
    delete_records(&state.autoinsider, payload).await
}

/// Places similar to a free-text query
#[utoipa::path(
    get,
    path = "/europeanrailguide/similar/places/index",
    tag = "europeanrailguide",
    params(
        ("query" = String, Query, description = "Free-text query"),
        ("limit" = Option<i64>, Query, description = "Number of results, 1-10 (default 5)")
    ),
    security(("access_token" = [])),
    responses(
        (status = 200, description = "Similar places, best first", body = SimilarPlacesResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn similar_places<R: VectorIndex>(
    State(state): State<SimilarityState<R>>,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<SimilarPlacesResponse>, AppError> {
    let outcome = find_similar(&state.erg, params).await?;

    Ok(Json(SimilarPlacesResponse {
        message: Domain::EuropeanRailGuide.message().to_string(),
        query: outcome.text,
        requested: outcome.limit,
        similar_places: outcome.results,
    }))
}

/// Index places
#[utoipa::path(
    post,
    path = "/europeanrailguide/similar/places/store",
    tag = "europeanrailguide",
    request_body = StoreRequest,
    security(("access_token" = [])),
    responses(
        (status = 200, description = "Records indexed", body = MutationResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn store_places<R: VectorIndex>(
    State(state): State<SimilarityState<R>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MutationResponse>, AppError> {
    store_records(&state.erg, payload).await
}

/// Remove places by id
#[utoipa::path(
    post,
    path = "/europeanrailguide/similar/places/delete",
    tag = "europeanrailguide",
    request_body = DeleteRequest,
    security(("access_token" = [])),
    responses(
        (status = 200, description = "Records deleted", body = MutationResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn delete_places<R: VectorIndex>(
    State(state): State<SimilarityState<R>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MutationResponse>, AppError> {
    delete_records(&state.erg, payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_domain_paths() {
        let doc = ApiDoc::openapi();
        for domain in Domain::ALL {
            for action in ["index", "store", "delete"] {
                let path = format!("{}/{}", domain.base_path(), action);
                assert!(doc.paths.paths.contains_key(&path), "missing {path}");
            }
        }
    }

    #[test]
    fn test_openapi_declares_access_token_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("access_token"));
    }
}
