//! API route configuration.

use axum::Router;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::handlers::{
    self, ContactMessageResponse, ContactRequest, CreateSectorRequest, DashboardStats,
    ErrorResponse, HealthResponse, LoginRequest, LoginResponse, MessageResponse,
    ProjectDetailResponse, ProjectRequest, ProjectResponse, SectorDetailResponse, SectorResponse,
    StatsResponse, UpdateSectorRequest,
};
use super::state::AppState;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Metamax CMS API",
        version = "0.3.0",
        description = "Content API backed by MySQL with an in-process fallback",
        license(name = "MIT")
    ),
    paths(
        handlers::health,
        handlers::list_projects,
        handlers::get_project,
        handlers::create_project,
        handlers::update_project,
        handlers::delete_project,
        handlers::list_sectors,
        handlers::get_sector,
        handlers::create_sector,
        handlers::update_sector,
        handlers::delete_sector,
        handlers::submit_contact,
        handlers::list_contact_messages,
        handlers::dashboard_stats,
        handlers::login,
    ),
    components(
        schemas(
            HealthResponse,
            ProjectResponse,
            ProjectDetailResponse,
            ProjectRequest,
            SectorResponse,
            SectorDetailResponse,
            CreateSectorRequest,
            UpdateSectorRequest,
            ContactMessageResponse,
            ContactRequest,
            DashboardStats,
            StatsResponse,
            LoginRequest,
            LoginResponse,
            MessageResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "projects", description = "Portfolio project endpoints"),
        (name = "sectors", description = "Industry sector endpoints"),
        (name = "contact", description = "Contact form endpoints"),
        (name = "dashboard", description = "Admin dashboard endpoints"),
        (name = "auth", description = "Administrator login")
    )
)]
pub struct ApiDoc;

/// Create the API router with OpenAPI documentation
pub fn create_router(state: AppState) -> Router {
    let api = ApiDoc::openapi();

    let system_routes = Router::new().route("/health", get(handlers::health));

    let project_routes = Router::new()
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        );

    let sector_routes = Router::new()
        .route(
            "/api/sectors",
            get(handlers::list_sectors).post(handlers::create_sector),
        )
        .route(
            "/api/sectors/{id}",
            get(handlers::get_sector)
                .put(handlers::update_sector)
                .delete(handlers::delete_sector),
        );

    let admin_routes = Router::new()
        .route(
            "/api/contact",
            get(handlers::list_contact_messages).post(handlers::submit_contact),
        )
        .route("/api/dashboard/stats", get(handlers::dashboard_stats))
        .route("/api/auth/login", post(handlers::login));

    system_routes
        .merge(project_routes)
        .merge(sector_routes)
        .merge(admin_routes)
        .merge(Scalar::with_url("/docs", api))
        .with_state(state)
}
