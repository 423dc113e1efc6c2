use utoipa::OpenApi;

use super::api::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::sky::list_visible,
        super::api::sky::status,
        super::api::sky::get_track,
    ),
    components(
        schemas(
            ErrorResponse,
            crate::service::VisibleSummary,
            crate::service::ServiceStatus,
            crate::precompute::PrecomputedTrack,
            crate::precompute::TrajectorySample,
            crate::catalog::Category,
            crate::catalog::LoadReport,
            crate::elements::FetchOrigin,
        )
    ),
    info(
        title = "Sky Cache API",
        description = "Satellites visible from the configured ground location",
        version = "0.1.0"
    ),
    tags(
        (name = "sky", description = "Visibility snapshot queries")
    )
)]
pub struct ApiDoc;
