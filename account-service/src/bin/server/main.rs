use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::account::ports::AccountServicePort;
use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::session::CookieSettings;
use account_service::mailer::HttpResetMailer;
use account_service::repositories::PostgresUserRepository;
use auth::Authenticator;
use auth::PasswordHasher;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        session_hours = config.session.validity().num_hours(),
        secure_cookie = config.session.secure_cookie,
        reset_ttl_minutes = config.reset.token_ttl_minutes,
        mailer_endpoint = %config.mailer.endpoint,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let session_validity = config.session.validity();
    let password_hasher = PasswordHasher::with_cost((&config.password).into())?;
    let authenticator = Arc::new(Authenticator::new(
        config.session.secret.as_bytes(),
        session_validity,
        password_hasher,
    ));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let reset_mailer = Arc::new(HttpResetMailer::new(&config.mailer)?);

    let account_service: Arc<dyn AccountServicePort> = Arc::new(AccountService::new(
        user_repository,
        reset_mailer,
        Arc::clone(&authenticator),
        chrono::Duration::minutes(config.reset.token_ttl_minutes),
    ));

    let cookie_settings = CookieSettings::new(config.session.secure_cookie, session_validity);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(account_service, authenticator, cookie_settings);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");
    Ok(())
}
