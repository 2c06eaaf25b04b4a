use mimalloc::MiMalloc;
use modules::{
    context::AppState, error::RelayResult, logger, rest::start_http_server,
    settings::cli::SETTINGS,
};
use tracing::{error, info};

mod modules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> RelayResult<()> {
    logger::initialize_logging()?;
    info!("Starting inbound-relay");
    info!("Version:  {}", relay_version!());
    info!("Git:      [{}]", env!("GIT_HASH"));

    let state = match AppState::from_settings(&SETTINGS) {
        Ok(state) => state,
        Err(error) => {
            error!("Failed to initialize: {}", error);
            return Err(error);
        }
    };

    let routing = state.processor.routing();
    info!(
        rules = routing.rules().len(),
        default_destination = routing.default_destination(),
        "Routing configured"
    );

    if let Err(e) = start_http_server(state, &SETTINGS).await {
        error!("Failed to start REST server: {}", e);
        return Err(e);
    }
    info!("Server stopped");
    Ok(())
}
