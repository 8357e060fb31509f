use std::error::Error;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use meetpoint_server::config::AppConfig;
use meetpoint_server::finalize::{Finalizer, FinalizerConfig};
use meetpoint_server::providers::{
    GooglePlacesClient, GoogleRoutesClient, HotPepperClient, HotPepperConfig, PlacesConfig,
    RoutesConfig,
};
use meetpoint_server::store::{EventStore, MemoryStore, PostgrestConfig, PostgrestStore};
use meetpoint_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("meetpoint_server=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let missing = config.credentials.missing();
    if !missing.is_empty() {
        warn!(missing = ?missing, "provider credentials not set, finalize calls will fail");
    }

    match &config.supabase {
        Some(supabase) => {
            let store = PostgrestStore::new(
                PostgrestConfig::new(&supabase.url, &supabase.service_key)
                    .with_http(config.http.clone()),
            )?;
            info!(url = %supabase.url, "using Supabase record store");
            serve(config, store).await
        }
        None => {
            warn!(
                "SUPABASE_URL not set, serving an empty in-memory record store: \
                 every event is unknown and finalize will return 404"
            );
            serve(config, MemoryStore::new()).await
        }
    }
}

async fn serve<S: EventStore + 'static>(config: AppConfig, store: S) -> Result<(), Box<dyn Error>> {
    let google_key = config.credentials.google_maps_key.clone().unwrap_or_default();
    let hotpepper_key = config.credentials.hotpepper_key.clone().unwrap_or_default();

    let places =
        GooglePlacesClient::new(PlacesConfig::new(&google_key).with_http(config.http.clone()))?;
    let routes =
        GoogleRoutesClient::new(RoutesConfig::new(&google_key).with_http(config.http.clone()))?;
    let venues =
        HotPepperClient::new(HotPepperConfig::new(hotpepper_key).with_http(config.http.clone()))?;

    let finalizer = Finalizer::new(
        store,
        places,
        routes,
        venues,
        FinalizerConfig::from(&config),
    );
    let app = create_router(AppState::new(finalizer));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, timezone = %config.timezone, "meetpoint server listening");
    info!("  GET  /health");
    info!("  POST /finalize");
    info!("  GET  /events/:event_id/readiness");

    axum::serve(listener, app).await?;
    Ok(())
}
