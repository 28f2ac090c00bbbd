use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = networth::api::Cli::parse();
    if let Err(e) = networth::api::run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
