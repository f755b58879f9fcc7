use anyhow::Context;
use axum::Router;
use storage::Database;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;

use config::Config;
use features::{events, heats, sub_events};
use middleware::auth::ApiKeys;

#[derive(OpenApi)]
#[openapi(
    paths(
        sub_events::handlers::generate_heats,
        sub_events::handlers::list_round_heats,
        sub_events::handlers::get_round_summary,
        sub_events::handlers::advance_round,
        sub_events::handlers::preview_score,
        sub_events::handlers::get_leaderboard,
        heats::handlers::get_heat,
        heats::handlers::get_heat_standings,
        heats::handlers::start_heat,
        heats::handlers::schedule_heat,
        heats::handlers::record_results,
        events::handlers::get_department_statistics,
    ),
    components(
        schemas(
            storage::dto::heat::HeatDetailResponse,
            storage::dto::heat::GenerateHeatsResponse,
            storage::dto::heat::HeatResultEntry,
            storage::dto::heat::RecordResultsRequest,
            storage::dto::heat::RecordResultsResponse,
            storage::dto::heat::ScheduleHeatRequest,
            storage::dto::round::RoundState,
            storage::dto::round::RoundSummary,
            storage::dto::scoring::ScorePreviewRequest,
            storage::dto::scoring::ScorePreviewResponse,
            storage::dto::ranking::LeaderboardEntry,
            storage::dto::ranking::RegistrationInfo,
            storage::dto::ranking::HeatStanding,
            storage::dto::ranking::DepartmentStatistics,
            storage::dto::common::PaginationMeta,
            storage::models::Event,
            storage::models::SubEvent,
            storage::models::ParticipationMode,
            storage::models::RoundFormat,
            storage::models::CriterionDefinition,
            storage::models::Registration,
            storage::models::RegistrationStatus,
            storage::models::Participation,
            storage::models::Member,
            storage::models::Heat,
            storage::models::HeatStatus,
            storage::models::HeatParticipant,
            storage::models::Score,
        )
    ),
    tags(
        (name = "rounds", description = "Heat generation and round progression"),
        (name = "heats", description = "Heat lifecycle and results"),
        (name = "rankings", description = "Leaderboards and statistics"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

fn app(db: Database, api_keys: ApiKeys) -> Router {
    let api = Router::new()
        .nest("/sub-events", sub_events::routes::routes(api_keys.clone()))
        .nest("/heats", heats::routes::routes(api_keys))
        .nest("/events", events::routes::routes());

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(db)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting festival heats API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty, protected endpoints will reject every request");
    } else {
        tracing::info!("Loaded {} API keys", api_keys.len());
    }

    let bind_address = config.bind_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app(db, api_keys)).await?;

    Ok(())
}
