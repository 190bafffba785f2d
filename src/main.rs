use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod pictures;
mod routing;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!(workers, "Using configured worker threads");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let picture_dir = cfg.picture_dir()?;

    let listener = server::create_listener(addr)?;
    let root = pictures::PictureRoot::new(picture_dir);
    let root_exists = tokio::fs::metadata(root.path())
        .await
        .is_ok_and(|meta| meta.is_dir());
    logger::log_server_start(&addr, root.path(), root_exists, &cfg);

    let state = Arc::new(config::AppState::new(cfg, root));

    server::run(listener, state, server::signal::shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
