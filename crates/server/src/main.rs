//! posts-rs server entry point.

use std::sync::Arc;

use posts_api::AppState;
use posts_common::Config;
use posts_core::{
    CommentService, EventPublisherService, JobService, JobWorkerContext, LikeService,
    MediaServiceRef, NotificationDispatcher, PostLocks, PostService, RestMediaClient,
    RestUserDirectory,
};
use posts_db::{CommentRepository, LikeRepository, PostRepository};
use posts_queue::RedisStreamBus;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
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
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "posts=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting posts-rs server...");

    let config = Config::load()?;

    // Database
    let db = posts_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    posts_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let post_repo = Arc::new(PostRepository::new(Arc::clone(&db)));
    let like_repo = Arc::new(LikeRepository::new(Arc::clone(&db)));
    let comment_repo = Arc::new(CommentRepository::new(Arc::clone(&db)));

    // Message bus
    info!("Connecting to Redis...");
    let bus = Arc::new(
        RedisStreamBus::new(
            &config.redis.url,
            config.redis.prefix.clone(),
            config.redis.stream_max_len,
        )
        .await?,
    );
    let events: EventPublisherService = bus.clone();

    // Upstream services
    let http_client = reqwest::Client::builder()
        .user_agent(format!("posts-rs/{}", env!("CARGO_PKG_VERSION")))
        .build()?;
    let upstream_timeout = config.services.upstream_timeout();

    let media: MediaServiceRef = Arc::new(RestMediaClient::new(
        http_client.clone(),
        config.services.media_url.clone(),
        upstream_timeout,
        events.clone(),
        config.bus.media_delete_channel.clone(),
    ));
    let users = Arc::new(RestUserDirectory::new(
        http_client,
        config.services.user_directory_url.clone(),
        upstream_timeout,
    ));

    // Background jobs
    let job_service = JobService::new(&config.jobs);
    let locks = PostLocks::new();

    let post_service = PostService::new(
        post_repo.clone(),
        like_repo.clone(),
        comment_repo.clone(),
        media.clone(),
        locks.clone(),
        job_service.sender(),
    );
    let like_service = LikeService::new(
        like_repo,
        post_repo.clone(),
        locks.clone(),
        job_service.sender(),
        config.engagement.orphan_like_policy,
    );
    let comment_service = CommentService::new(
        comment_repo,
        post_repo,
        locks,
        job_service.sender(),
        config.engagement.comment_policy,
    );

    let jobs = job_service.start(JobWorkerContext {
        notifications: NotificationDispatcher::new(
            users,
            events,
            config.bus.notification_channel.clone(),
        ),
        media,
    });

    let state = AppState {
        post_service,
        like_service,
        comment_service,
        request_timeout: config.server.request_timeout(),
    };

    let app = posts_api::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Draining background jobs...");
    jobs.shutdown().await;

    if let Err(e) = bus.shutdown().await {
        warn!(error = %e, "Failed to close Redis connection");
    }

    info!("Server shutdown complete");
    Ok(())
}
