use std::{future::IntoFuture, process, sync::Arc};

use product_service::{
    application::{
        cache::ProductCache, error::AppError, products::ProductService, repos::ProductsRepo,
    },
    config,
    infra::{
        cache::LruProductCache,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use sqlx::PgPool;
use tokio::sync::watch;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_and_migrate(&settings).await?;
    let repositories = Arc::new(PostgresRepositories::new(pool));

    let store: Arc<dyn ProductsRepo> = repositories;
    let cache: Arc<dyn ProductCache> = Arc::new(LruProductCache::new(settings.cache.capacity));
    let products = Arc::new(ProductService::new(store, cache));

    let state = ApiState::new(products, settings.server.request_timeout);
    serve_http(&settings.server, state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    connect_and_migrate(&settings).await?;
    info!(target: "products::migrate", "Migrations applied");
    Ok(())
}

async fn connect_and_migrate(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::database)?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;

    Ok(pool)
}

async fn serve_http(server: &config::ServerSettings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(target: "products::serve", addr = %server.addr, "Listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let mut graceful_rx = shutdown_rx.clone();
    let server_future = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = graceful_rx.wait_for(|requested| *requested).await;
            info!(target: "products::serve", "Shutdown requested, draining connections");
        })
        .into_future();

    let grace = server.graceful_shutdown;
    let mut deadline_rx = shutdown_rx;
    let drain_deadline = async move {
        let _ = deadline_rx.wait_for(|requested| *requested).await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server_future => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        () = drain_deadline => {
            warn!(
                target: "products::serve",
                grace_secs = grace.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
