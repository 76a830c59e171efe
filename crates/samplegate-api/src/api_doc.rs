//! OpenAPI documentation definition.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Samplegate API",
        description = "Read-only gateway resolving sample identifiers to stored videos and streaming them with range support"
    ),
    paths(
        crate::handlers::resolve::resolve_sample,
        crate::handlers::stream::stream_object,
    ),
    components(schemas(
        crate::handlers::resolve::SampleResponse,
        crate::handlers::resolve::ResolveErrorCode,
        crate::error::ErrorResponse,
    )),
    tags(
        (name = "resolve", description = "Identifier resolution"),
        (name = "stream", description = "Range-aware object delivery")
    )
)]
pub struct ApiDoc;
