use utoipa::OpenApi;

use super::api::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::poller::start,
        super::api::poller::stop,
        super::api::poller::status,
        super::api::poller::position,
    ),
    components(
        schemas(
            ErrorResponse,
            crate::poller::RequestParameters,
            crate::poller::TaskState,
            crate::poller::TaskStatus,
            crate::position::PositionRecord,
        )
    ),
    info(
        title = "Eyetrack Poller API",
        description = "Start, stop and observe the satellite position poller",
        version = "0.1.0"
    ),
    tags(
        (name = "poller", description = "Position poller control")
    )
)]
pub struct ApiDoc;
