use devserve::{logger, Config, DevServer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg.logging)?;

    let server = DevServer::bind(cfg)?;

    println!("Serving on port {}...", server.local_addr().port());
    println!("CORS enabled, JavaScript MIME types fixed");

    server.run().await;
    Ok(())
}
