use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use table_schema::cli::Args;
use table_schema::db::DatabaseConfig;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("table_schema=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.db {
        Some(url) => DatabaseConfig::from_url(url)?,
        None => DatabaseConfig::resolve()?,
    };
    let backend = config.connect()?;
    let output = args.command.run(backend.as_ref(), args.format)?;
    println!("{}", output);
    backend.close()?;
    Ok(())
}
