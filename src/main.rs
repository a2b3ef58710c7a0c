use marketplace::{config::Config, init_tracing, make_router, run_app};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("invalid configuration: {error:#}");
            std::process::exit(1);
        }
    };
    let router = make_router();
    if let Err(error) = run_app(router, config).await {
        tracing::error!("server stopped: {error:#}");
        std::process::exit(1);
    }
}
