use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use marquee_api::{app, state::{AppState, AuthConfig}};
use marquee_booking::{BookingEngine, BookingRules};
use marquee_domain::SeatGrid;
use marquee_store::{
    DbClient, PgBookingRepository, PgHoldRepository, PgLoyaltyStore, PgShowtimeRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = marquee_store::app_config::Config::load().context("failed to load config")?;
    tracing::info!("Starting Marquee API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .context("failed to connect to Postgres")?;
    db.migrate().await.context("failed to run migrations")?;

    let rules = BookingRules {
        hold_duration: chrono::Duration::seconds(config.business_rules.hold_seconds as i64),
        seat_price_amount: config.business_rules.seat_price_amount,
        default_loyalty_rate: config.business_rules.default_loyalty_rate,
        grid: SeatGrid::new(
            config.business_rules.seat_rows,
            config.business_rules.seat_columns,
        ),
    };

    let loyalty = Arc::new(PgLoyaltyStore {
        pool: db.pool.clone(),
    });
    let engine = Arc::new(BookingEngine::new(
        Arc::new(PgShowtimeRepository {
            pool: db.pool.clone(),
        }),
        Arc::new(PgHoldRepository {
            pool: db.pool.clone(),
        }),
        Arc::new(PgBookingRepository {
            pool: db.pool.clone(),
        }),
        loyalty.clone(),
        loyalty,
        rules,
    ));

    let app_state = AppState {
        engine,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
