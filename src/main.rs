use anyhow::Result;
use clap::Parser;
use storage_http::commands::{
    self,
    config::{Config, Settings},
};

/// storage-http - object storage request probe
///
/// Sends requests to an object storage HTTP API and reports whether the
/// response status codes are acceptable.
///
/// Examples:
///   storage-http send https://storage.example.com/container/object
///   storage-http --good-status 200,204 batch -m HEAD URL1 URL2
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Status codes treated as success (also via STORAGE_HTTP_GOOD_STATUS)
    #[arg(
        long = "good-status",
        env = "STORAGE_HTTP_GOOD_STATUS",
        value_name = "CODES",
        value_delimiter = ',',
        default_value = "200",
        global = true
    )]
    good_status: Vec<u16>,

    /// Header sent with every request, e.g. "X-Auth-Token: abc" (repeatable)
    #[arg(long = "header", short = 'H', value_name = "NAME: VALUE", global = true)]
    headers: Vec<String>,

    /// User agent (also via STORAGE_HTTP_USER_AGENT)
    #[arg(long = "user-agent", env = "STORAGE_HTTP_USER_AGENT", global = true)]
    user_agent: Option<String>,

    /// Report 404 responses as "Object not found"
    #[arg(long = "not-found-error", global = true)]
    not_found_error: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Send a single request
    Send(SendArgs),

    /// Send requests to several URLs concurrently and print a JSON report
    Batch(BatchArgs),
}

#[derive(clap::Args, Debug)]
struct SendArgs {
    #[arg(value_name = "URL")]
    url: String,

    /// HTTP method
    #[arg(long, short = 'm', default_value = "GET")]
    method: String,
}

#[derive(clap::Args, Debug)]
struct BatchArgs {
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// HTTP method
    #[arg(long, short = 'm', default_value = "GET")]
    method: String,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            good_status_codes: self.good_status.clone(),
            headers: self.headers.clone(),
            user_agent: self.user_agent.clone(),
            not_found_error: self.not_found_error,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = Config::new(&cli.settings())?;

    match cli.command {
        Commands::Send(args) => commands::send(&config.client, &args.method, &args.url).await?,
        Commands::Batch(args) => {
            commands::batch(&config.client, &args.method, &args.urls).await?
        }
    }
    Ok(())
}
