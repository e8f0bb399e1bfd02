use utoipa::OpenApi;

/// Main API documentation
///
/// Domain docs are nested under the same prefix their routers are mounted on.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tasks API",
        version = "0.1.0",
        description = "Task records stored in PostgreSQL with a Redis read-through cache"
    ),
    nest(
        (path = "/api/v1/tasks", api = domain_tasks::ApiDoc)
    )
)]
pub struct ApiDoc;
