//! Walletgate application entry point.
//!
//! Bootstraps the server:
//! 1. Load configuration from environment
//! 2. Build the auth service (nonce store, user directory, session issuer)
//! 3. Start the challenge sweeper if enabled
//! 4. Build router with API routes, tracing, CORS and security headers
//! 5. Start Axum server with graceful shutdown
//!
//! Also supports `gen-secret` subcommand for generating a `SESSION_SECRET`.

use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use walletgate::{
    auth::middleware::AppState,
    cleanup,
    clock::SystemClock,
    config::Config,
    middleware::security_headers,
    routes,
    service::{AuthService, AuthSettings},
};

/// Random bytes in a generated session secret.
const GENERATED_SECRET_BYTES: usize = 32;

/// Generate a random base64 session secret.
fn gen_secret() -> String {
    let mut bytes = [0u8; GENERATED_SECRET_BYTES];
    rand::fill(&mut bytes);
    let secret = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes);

    // Zero the raw bytes
    bytes.fill(0);
    secret
}

fn print_gen_secret_usage() {
    eprintln!("Usage: walletgate gen-secret");
    eprintln!();
    eprintln!("Print a random secret suitable for SESSION_SECRET.");
    eprintln!();
    eprintln!("Then set in .env:");
    eprintln!("  SESSION_SECRET=<output>");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    // Check for gen-secret subcommand
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && args[1] == "gen-secret" {
        if args.len() != 2 {
            print_gen_secret_usage();
            std::process::exit(1);
        }
        println!("{}", gen_secret());
        return;
    }

    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load config");
            std::process::exit(1);
        }
    };
    tracing::info!("Starting walletgate on {}", config.bind_addr);

    let auth = Arc::new(AuthService::new(
        AuthSettings {
            challenge_ttl_secs: config.challenge_ttl_secs,
            session_ttl_secs: config.session_ttl_secs,
        },
        &config.session_secret,
        Arc::new(SystemClock),
    ));

    if config.sweep_interval_secs > 0 {
        let interval = Duration::from_secs(config.sweep_interval_secs);
        tokio::spawn(cleanup::run_sweep_loop(auth.clone(), interval));
        tracing::info!(
            interval_secs = config.sweep_interval_secs,
            "Challenge sweeper started"
        );
    }

    let bind_addr = config.bind_addr;
    let state = AppState {
        auth,
        config: Arc::new(config),
    };

    // Explicit CORS: deny all cross-origin requests (single-origin deployment).
    // CorsLayer::new() with no allowed origins rejects all CORS preflight requests.
    let cors = CorsLayer::new();

    let app = routes::api_router()
        .layer(cors)
        .layer(axum::middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .expect("Failed to bind");
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}
