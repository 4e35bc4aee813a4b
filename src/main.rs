#[tokio::main]
async fn main() {
    mdt_import::init_tracing();

    if let Err(e) = mdt_import::run().await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
