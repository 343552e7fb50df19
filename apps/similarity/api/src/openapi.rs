use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Similarity API",
        version = "0.1.0",
        description = "Similar AutoInsider problems and European Rail Guide places by free-text query"
    )
)]
struct ServiceDoc;

/// Service metadata merged with the similarity domain's paths.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = ServiceDoc::openapi();
        doc.merge(domain_similarity::ApiDoc::openapi());
        doc
    }
}
