// Probe CLI for the node admin API: issues calls through the typed client
// and prints what the node returns.
use clap::Parser;
use tracing::debug;

use ziladmin::admin::AdminClient;
use ziladmin::config::Config;
use ziladmin::rpc::Request;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Admin API address, host:port (overrides ADMIN_API_ADDRESS)
    #[arg(short, long)]
    address: Option<String>,

    /// Per-call timeout in seconds; 0 waits indefinitely
    #[arg(long)]
    timeout: Option<u64>,

    /// Connect over TLS
    #[arg(long)]
    tls: bool,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Method to call; without one, prints a status summary
    method: Option<String>,

    /// Positional string params for the method
    params: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env().unwrap_or_else(|e| {
        eprintln!(
            "Warning: failed to load config from env, using defaults: {}",
            e
        );
        Config::default()
    });

    // CLI flags overlay env
    if let Some(addr) = &cli.address {
        config.address = addr.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout = std::time::Duration::from_secs(secs);
    }
    if cli.tls {
        config.tls = true;
    }
    if cli.insecure {
        config.tls_insecure = true;
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }
    debug!(address = %config.address, timeout = ?config.timeout, "probe starting");

    let client = AdminClient::from_config(&config);

    match cli.method {
        Some(method) => {
            let params: Vec<&str> = cli.params.iter().map(String::as_str).collect();
            let request = if params.is_empty() {
                Request::new(method, None)
            } else {
                Request::with_string_params(method, &params)
            };
            let result = client.fetch(request).await?;
            println!("{}", result);
        }
        None => print_summary(&client).await?,
    }

    Ok(())
}

/// The default view: the gauges the exporter scrapes, one per line.
async fn print_summary(client: &AdminClient) -> anyhow::Result<()> {
    let (mini_epoch, ds_epoch) = client.epochs().await?;
    println!("current mini epoch:  {}", mini_epoch);
    println!("current DS epoch:    {}", ds_epoch);

    let (difficulty, ds_difficulty) = tokio::try_join!(
        client.prev_difficulty(),
        client.prev_ds_difficulty(),
    )?;
    println!("prev difficulty:     {}", difficulty);
    println!("prev DS difficulty:  {}", ds_difficulty);

    match client.node_type().await {
        Ok(node_type) => println!("node type:           {}", node_type),
        Err(e) => println!("node type:           unavailable ({})", e),
    }
    match client.node_state().await {
        Ok(state) => println!("node state:          {}", state),
        Err(e) => println!("node state:          unavailable ({})", e),
    }

    Ok(())
}

fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("ziladmin=debug,info"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
