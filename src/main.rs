#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gwctl::cli::run_cli().await
}
