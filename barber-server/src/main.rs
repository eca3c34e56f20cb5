use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use barber_server::backend::{Backend, MockBackend, SupabaseClient, SupabaseConfig};
use barber_server::cache::{CacheConfig, CachedBackend};
use barber_server::config::AppConfig;
use barber_server::domain::Availability;
use barber_server::listing::ListingConfig;
use barber_server::location::{LastKnownLocation, LocationCacheConfig};
use barber_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("barber_server=info,tower_http=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let backend: Backend = match &config.mock_data {
        Some(dir) => MockBackend::new(dir)
            .expect("Failed to load mock shop data")
            .into(),
        None => {
            let supabase = SupabaseConfig::new(&config.supabase_url, &config.supabase_anon_key);
            match SupabaseClient::new(supabase) {
                Ok(client) => client.into(),
                Err(e) => {
                    error!(error = %e, "cannot create Supabase client; set BARBER_MOCK_DATA to run without one");
                    std::process::exit(1);
                }
            }
        }
    };
    if backend.is_mock() {
        info!("serving mock data, changes are not persisted");
    }

    let state = AppState::new(
        CachedBackend::new(backend, &CacheConfig::default()),
        Availability::new(config.timezone),
        ListingConfig::default(),
        LastKnownLocation::new(LocationCacheConfig::new(&config.location_cache)),
    );

    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind address");
    info!(
        addr = %config.bind,
        timezone = %config.timezone,
        "barbershop server listening on http://{}",
        config.bind
    );

    axum::serve(listener, app).await.expect("Server error");
}
