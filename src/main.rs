use std::{error::Error as StdError, future::IntoFuture, process, sync::Arc, time::Duration};

use quillpost::{
    application::{
        auth::SessionService,
        bootstrap::{self, AdminCredentials, BootstrapOutcome},
        error::AppError,
        posts::PostService,
        render::MarkdownRenderer,
        repos::{AuthorsRepo, HealthRepo, PostsRepo, PostsWriteRepo, SessionsRepo},
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiRateLimiter, ApiState, HttpState, RouterState},
        telemetry,
    },
};
use tokio::sync::Notify;
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
    let mut chain = Vec::new();
    let mut cause = StdError::source(error);
    while let Some(inner) = cause {
        chain.push(inner.to_string());
        cause = inner.source();
    }

    if dispatcher::has_been_set() {
        error!(error = %error, causes = ?chain, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, causes = ?chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::CreateAdmin(args) => run_create_admin(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_router_state(repositories.clone(), &settings);
    let app = http::build_app(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| InfraError::bind(settings.server.addr, err))?;
    info!(
        target = "quillpost::server",
        addr = %settings.server.addr,
        "listening"
    );

    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(listener, app.into_make_service()).with_graceful_shutdown({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            info!(target = "quillpost::server", "shutdown signal received");
            shutdown.notify_one();
        }
    });

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = server.into_future() => {
            result.map_err(InfraError::Serve)?;
        }
        _ = shutdown_deadline(shutdown, grace) => {
            warn!(
                target = "quillpost::server",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
        }
    }

    repositories.close().await;
    info!(target = "quillpost::server", "database pool closed");
    Ok(())
}

async fn run_create_admin(
    settings: config::Settings,
    args: config::CreateAdminArgs,
) -> Result<(), AppError> {
    let credentials = AdminCredentials::resolve(args.email.as_deref(), args.password.as_deref())?;
    let repositories = init_repositories(&settings).await?;

    let outcome = bootstrap::create_admin(repositories.as_ref(), credentials).await;
    repositories.close().await;

    match outcome? {
        BootstrapOutcome::Created(author) => {
            info!(
                target = "quillpost::bootstrap",
                author_id = %author.id,
                "bootstrap complete"
            );
        }
        BootstrapOutcome::AlreadyExists { .. } => {}
    }
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or(InfraError::MissingDatabaseUrl)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::Connect)?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::Migration)?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_router_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> RouterState {
    let posts_reader: Arc<dyn PostsRepo> = repositories.clone();
    let posts_writer: Arc<dyn PostsWriteRepo> = repositories.clone();
    let authors: Arc<dyn AuthorsRepo> = repositories.clone();
    let sessions_repo: Arc<dyn SessionsRepo> = repositories.clone();
    let health: Arc<dyn HealthRepo> = repositories;

    let renderer = Arc::new(MarkdownRenderer::from_settings(&settings.render));
    let posts = Arc::new(PostService::new(posts_reader, posts_writer, renderer));
    let sessions = Arc::new(SessionService::new(
        authors,
        sessions_repo,
        settings.auth.session_ttl,
    ));
    let rate_limiter = Arc::new(ApiRateLimiter::new(
        Duration::from_secs(u64::from(settings.rate_limit.window_seconds.get())),
        settings.rate_limit.max_requests.get(),
    ));

    RouterState {
        http: HttpState {
            posts: posts.clone(),
            health,
        },
        api: ApiState {
            posts,
            sessions,
            rate_limiter,
            secure_cookie: settings.auth.secure_cookie,
        },
    }
}

async fn shutdown_deadline(shutdown: Arc<Notify>, grace: Duration) {
    shutdown.notified().await;
    tokio::time::sleep(grace).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(target = "quillpost::server", error = %err, "failed to listen for ctrl-c");
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
                error!(target = "quillpost::server", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
