use anyhow::Result;
use teampulse::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.common.log_level()))
        .format_timestamp(None)
        .init();
    cli.execute()
}
