use clap::Parser;
use pedidos::cli::{self, Cli};
use pedidos::env::setup_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv_override().ok();
    let Cli { env, command } = Cli::parse();
    let _telemetry = setup_tracing(&env);

    cli::run_command(env, command).await?;
    Ok(())
}
