//! Quillpost server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use quillpost_api::{middleware::AppState, middleware::with_layers, router as api_router};
use quillpost_common::Config;
use quillpost_core::{
    BlogService, CommentService, InMemoryDraftCache, Mailer, OtpService, ReactionService,
    SubmissionService, SubscriberService,
};
use quillpost_db::repositories::{
    CommentRepository, OtpRepository, PostRepository, ReactionRepository, SubscriberRepository,
};
use quillpost_queue::{Notifier, run_notifier};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install signal handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quillpost=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting quillpost server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = quillpost_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    quillpost_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let reaction_repo = ReactionRepository::new(Arc::clone(&db));
    let subscriber_repo = SubscriberRepository::new(Arc::clone(&db));
    let otp_repo = OtpRepository::new(Arc::clone(&db));

    // Initialize outbound email
    let site_name = config
        .email
        .as_ref()
        .map_or_else(|| "Quillpost".to_string(), |e| e.from_name.clone());
    let mailer = Mailer::from_config(
        config.email.as_ref(),
        site_name,
        config.notification.frontend_url.clone(),
    )?;

    // Initialize services
    let otp_service = OtpService::new(otp_repo, mailer.clone(), config.otp.clone());
    let blog_service = BlogService::new(post_repo.clone(), comment_repo.clone());
    let comment_service = CommentService::new(
        comment_repo,
        post_repo.clone(),
        config.rate_limit.comments_per_minute,
    );
    let reaction_service = ReactionService::new(
        reaction_repo,
        post_repo,
        config.rate_limit.reactions_per_minute,
    );
    let submission_service = SubmissionService::new(
        otp_service.clone(),
        Arc::new(InMemoryDraftCache::new()),
        blog_service.clone(),
        mailer.clone(),
    );
    let subscriber_service = SubscriberService::new(subscriber_repo, otp_service, mailer.clone());

    // Start the subscriber notification scheduler
    if config.notification.enabled {
        let notifier = Notifier::new(
            blog_service.clone(),
            subscriber_service.clone(),
            mailer.clone(),
        );
        run_notifier(&config.notification, Arc::new(notifier));
        info!("Subscriber notification scheduler started");
    }

    // Create app state
    let state = AppState {
        blog_service,
        comment_service,
        reaction_service,
        submission_service,
        subscriber_service,
        admin_token: Arc::from(config.server.admin_token.as_str()),
    };

    // Build router
    let app = with_layers(Router::new().nest("/api", api_router().with_state(state)));

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
