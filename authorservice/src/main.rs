use std::env;
use std::sync::Arc;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use authorservice::api::ErrorBody;
use authorservice::app_config::config_app;
use authorservice::auth::{hash_password, TokenIssuer};
use authorservice::authors_repository::{
    AuthorsRepository, InMemoryAuthorsRepository, PostgresAuthorsRepository,
    PostgresAuthorsRepositoryConfig,
};
use authorservice::users_repository::{
    InMemoryUsersRepository, PostgresUsersRepository, PostgresUsersRepositoryConfig,
    UsersRepository, UsersRepositoryError,
};

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() {
    let app_name = "authorservice";

    // Start a new Jaeger trace pipeline.
    // Spans are exported in batch - recommended setup for a production application.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .expect("Failed to install OpenTelemetry tracer.");

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    // Create a `tracing` layer using the Jaeger tracer
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    // Create a `tracing` layer to emit spans as structured logs to stdout
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    // Combined them all together in a `tracing` subscriber
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.")
}

fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    let details = err.to_string();
    actix_web::error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ErrorBody::with_details("Invalid request body", details)),
    )
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();
    println!("starting HTTP server at http://localhost:8080");

    let use_in_memory_db = env::var("USE_IN_MEMORY_DB")
        .map(|value| value.to_lowercase() == "true")
        .unwrap_or_default();
    let pg_hostname = env::var("DB_HOST").unwrap_or("127.0.0.1".to_string());
    let pg_username = env::var("DB_USERNAME").unwrap_or("postgres".to_string());
    let pg_password = env::var("DB_PASSWORD").unwrap_or("postgres".to_string());
    let token_secret =
        env::var("AUTH_TOKEN_SECRET").unwrap_or("authorservice-dev-secret".to_string());

    let authors_repository: Arc<dyn AuthorsRepository + Send + Sync> = if use_in_memory_db {
        Arc::new(InMemoryAuthorsRepository::default())
    } else {
        Arc::new(
            PostgresAuthorsRepository::init(PostgresAuthorsRepositoryConfig {
                hostname: pg_hostname.clone(),
                username: pg_username.clone(),
                password: pg_password.clone(),
            })
            .await
            .expect("Failed to init postgres"),
        )
    };

    let users_repository: Arc<dyn UsersRepository + Send + Sync> = if use_in_memory_db {
        Arc::new(InMemoryUsersRepository::default())
    } else {
        Arc::new(
            PostgresUsersRepository::init(PostgresUsersRepositoryConfig {
                hostname: pg_hostname,
                username: pg_username,
                password: pg_password,
            })
            .await
            .expect("Failed to init postgres"),
        )
    };

    // Optional startup seeding of a single login user
    if let (Ok(seed_username), Ok(seed_password)) =
        (env::var("SEED_USERNAME"), env::var("SEED_PASSWORD"))
    {
        let password_hash = hash_password(&seed_password).expect("Failed to hash seed password");
        match users_repository.add_user(&seed_username, &password_hash).await {
            Ok(_) => tracing::info!("Seeded login user {}", seed_username),
            Err(UsersRepositoryError::UsernameTaken(_)) => {
                tracing::info!("Login user {} already present", seed_username)
            }
            Err(err) => tracing::error!("Failed to seed login user: {}", err),
        }
    }

    let token_issuer = Arc::new(TokenIssuer::new(token_secret.as_bytes()));

    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(authors_repository.clone()))
            .app_data(web::Data::new(users_repository.clone()))
            .app_data(web::Data::new(token_issuer.clone()))
            .app_data(actix_web::web::JsonConfig::default().error_handler(json_error_handler))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
