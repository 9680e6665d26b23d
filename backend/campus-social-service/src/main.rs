use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use campus_social_service::db::{self, Stores};
use campus_social_service::{handlers, metrics, middleware, AppState, Config};
use sqlx::PgPool;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct HealthState {
    db_pool: PgPool,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "campus-social-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => {
            tracing::warn!(error = %e, "health check: PostgreSQL unreachable");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "error": "PostgreSQL connection failed",
                "service": "campus-social-service"
            }))
        }
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Campus Social Service
///
/// Posts, threaded comments, likes, follows and notifications.
///
/// # Routes
///
/// - `POST /api/v1/users` - Registration (public)
/// - `/api/v1/comments`, `/api/v1/posts/*` - Comment trees, posts, like toggle
/// - `/api/v1/users/*` - Profiles and follow graph
/// - `/api/v1/notifications/*` - Notification inbox
/// - `/api/v1/health`, `/api/v1/health/live`, `/metrics` - Operations
#[actix_web::main]
async fn main() -> io::Result<()> {
    // Container healthcheck: `campus-social-service healthcheck`
    {
        let mut args = std::env::args();
        let _bin = args.next();
        if let Some(cmd) = args.next() {
            if cmd == "healthcheck" || cmd == "healthcheck-http" {
                let port = std::env::var("APP_PORT").unwrap_or_else(|_| "8085".to_string());
                let url = format!("http://127.0.0.1:{}/api/v1/health", port);
                match reqwest::Client::new().get(&url).send().await {
                    Ok(resp) if resp.status().is_success() => return Ok(()),
                    Ok(resp) => {
                        eprintln!("healthcheck HTTP status: {}", resp.status());
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"));
                    }
                    Err(e) => {
                        eprintln!("healthcheck HTTP error: {}", e);
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"));
                    }
                }
            }
        }
    }

    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting campus-social-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(env = %config.app.env, social = ?config.social, "configuration loaded");

    let db_pool = db::create_pool(&config.database).await.map_err(|e| {
        tracing::error!("Database pool creation failed: {:#}", e);
        io::Error::new(io::ErrorKind::Other, format!("Failed to create database pool: {e}"))
    })?;

    if config.database.run_migrations {
        db::run_migrations(&db_pool).await.map_err(|e| {
            io::Error::new(io::ErrorKind::Other, format!("Failed to run migrations: {e}"))
        })?;
        tracing::info!("Database migrations applied");
    }

    let app_state = web::Data::new(AppState::new(
        Stores::postgres(db_pool.clone()),
        config.social.clone(),
    ));
    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
    });
    let jwt = middleware::JwtAuthMiddleware::new(&config.auth.jwt_secret);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .app_data(health_state.clone())
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .configure(handlers::configure_public)
            .service(
                web::scope("/api/v1")
                    .wrap(jwt.clone())
                    .wrap(middleware::MetricsMiddleware)
                    .configure(handlers::configure),
            )
    })
    .bind(&bind_address)?
    .shutdown_timeout(30)
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, stopping HTTP server");
        handle.stop(true).await;
    });

    server.await?;

    db_pool.close().await;
    tracing::info!("campus-social-service stopped");
    Ok(())
}
