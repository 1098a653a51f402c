use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ipdata::api::handlers::TOP_ISP_LIMIT;
use ipdata::config::Config;
use ipdata::service::LookupService;
use ipdata::storage;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "ipdata-cli")]
#[command(about = "Query the IP range table from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the range covering an IPv4 address
    Lookup {
        /// Dotted-decimal address, e.g. 8.8.8.8
        ip: String,
    },
    /// Count the addresses allocated to a country
    Count {
        /// Country name as listed in ISO-3166 (case-insensitive)
        country_name: String,
    },
    /// Rank the ISPs of a country by allocated addresses
    TopIsp {
        /// ISO-3166 alpha-2 code
        country_code: String,
        #[arg(long, default_value_t = TOP_ISP_LIMIT)]
        limit: u32,
    },
    /// Top 10 ISPs of Switzerland
    Top10Switzerland,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to encode result")?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let service = LookupService::new(storage::connect(&config.database).await?);

    match cli.command {
        Commands::Lookup { ip } => {
            print_json(&service.get_data_from_ip(&ip).await?)?;
        }
        Commands::Count { country_name } => {
            let ip_count = service.get_ip_count_by_country(&country_name).await?;
            print_json(&serde_json::json!({
                "country_name": country_name,
                "ip_count": ip_count,
            }))?;
        }
        Commands::TopIsp {
            country_code,
            limit,
        } => {
            print_json(
                &service
                    .get_top_isp_by_country_code(&country_code, limit)
                    .await?,
            )?;
        }
        Commands::Top10Switzerland => {
            print_json(&service.get_top_isp_for_switzerland().await?)?;
        }
    }

    Ok(())
}
