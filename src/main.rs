use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use secret_santa::config::{LoggingSettings, Settings};
use secret_santa::core::AssignmentGenerator;
use secret_santa::routes::{self, AppState};
use secret_santa::services::{ExchangeService, SessionVerifier, SupabaseClient, SupabaseTables};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

/// Initialize logging; LOG_LEVEL and LOG_FORMAT override the config file
fn init_logging(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Logging depends on settings, so configuration errors go to stderr
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging);

    info!("Starting Secret Santa service...");

    let tables = SupabaseTables {
        groups: settings.tables.groups.clone(),
        group_members: settings.tables.group_members.clone(),
        profiles: settings.tables.profiles.clone(),
        wishlist_items: settings.tables.wishlist_items.clone(),
    };

    let timeout = Duration::from_secs(settings.supabase.timeout_secs.unwrap_or(30));

    let supabase = Arc::new(
        SupabaseClient::new(
            settings.supabase.url.clone(),
            settings.supabase.api_key.clone(),
            tables,
            timeout,
        )
        .map_err(|e| {
            error!("Failed to create backend client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?,
    );

    info!("Backend client initialized for {}", supabase.base_url());

    let sessions = Arc::new(SessionVerifier::new(
        settings.supabase.jwt_secret.as_deref(),
        Arc::clone(&supabase),
    ));

    if settings.supabase.jwt_secret.is_some() {
        info!("Session tokens verified locally");
    } else {
        info!("Session tokens verified through the auth API");
    }

    let generator = AssignmentGenerator::new(
        settings.assignment.strategy,
        settings.assignment.max_attempts,
    );

    info!(
        "Assignment generator initialized (strategy: {}, max attempts: {})",
        settings.assignment.strategy,
        settings.assignment.max_attempts
    );

    let app_state = AppState {
        supabase: Arc::clone(&supabase),
        sessions,
        exchange: ExchangeService::new(supabase, generator),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
