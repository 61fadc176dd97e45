use tracing::info;

use urldispatch_service::config::DispatcherConfig;
use urldispatch_service::lifecycle::FakeDispatcherService;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = DispatcherConfig::from_env();
    let mut service = FakeDispatcherService::new(config);

    let addr = service
        .start()
        .await
        .expect("failed to start the fake dispatcher");
    info!(%addr, "fake url-dispatcher ready, press ctrl-c to stop");

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
    service.stop().await;
}
