use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use prize_vault::{
    VaultClient,
    WalletSession,
    app::{
        self,
        AppConfig,
    },
    provider::StationProvider,
    session::{
        SessionStore,
        resolve_state_dir,
    },
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: autoprize-vault [--station-url <url>] [--contract <address>]\n\
         [--state-dir <path>] [--refresh-ms <millis>]\n\
         \n\
         Flags:\n\
           --station-url <url>  Wallet daemon endpoint (default {})\n\
           --contract <address> Vault contract address (default {})\n\
           --state-dir <path>   Session/log directory (default ~/.autoprize)\n\
           --refresh-ms <ms>    Account refresh interval (default {})",
        app::DEFAULT_STATION_URL,
        app::DEFAULT_CONTRACT_ADDRESS,
        app::DEFAULT_REFRESH_MS,
    );
    std::process::exit(0);
}

fn parse_cli_args() -> Result<AppConfig> {
    let mut args = std::env::args().skip(1);
    let mut station_url: Option<String> = None;
    let mut contract_address: Option<String> = None;
    let mut state_dir: Option<String> = None;
    let mut refresh_ms: Option<u64> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--station-url" => {
                let url = args
                    .next()
                    .ok_or_else(|| eyre!("--station-url requires a URL argument"))?;
                if station_url.is_some() {
                    return Err(eyre!("--station-url may only be specified once"));
                }
                station_url = Some(url);
            }
            "--contract" => {
                let address = args
                    .next()
                    .ok_or_else(|| eyre!("--contract requires an address argument"))?;
                if contract_address.is_some() {
                    return Err(eyre!("--contract may only be specified once"));
                }
                contract_address = Some(address);
            }
            "--state-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--state-dir requires a path argument"))?;
                if state_dir.is_some() {
                    return Err(eyre!("--state-dir may only be specified once"));
                }
                state_dir = Some(dir);
            }
            "--refresh-ms" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--refresh-ms requires a millisecond value"))?;
                if refresh_ms.is_some() {
                    return Err(eyre!("--refresh-ms may only be specified once"));
                }
                let millis = raw
                    .parse::<u64>()
                    .wrap_err("--refresh-ms expects a positive integer")?;
                if millis == 0 {
                    return Err(eyre!("--refresh-ms must be greater than zero"));
                }
                refresh_ms = Some(millis);
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    Ok(AppConfig {
        station_url: station_url
            .unwrap_or_else(|| app::DEFAULT_STATION_URL.to_string()),
        contract_address: contract_address
            .unwrap_or_else(|| app::DEFAULT_CONTRACT_ADDRESS.to_string()),
        state_dir,
        refresh_interval: Duration::from_millis(
            refresh_ms.unwrap_or(app::DEFAULT_REFRESH_MS),
        ),
    })
}

/// Logs go to a file in the state directory; stdout belongs to the
/// alternate screen.
fn init_tracing(state_dir: Option<&str>) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = resolve_state_dir(state_dir)?;
    let appender = tracing_appender::rolling::never(&dir, "autoprize.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = parse_cli_args()?;
    let store = SessionStore::new(config.state_dir.as_deref())?;
    let _log_guard = init_tracing(config.state_dir.as_deref())?;
    tracing::info!(
        station_url = %config.station_url,
        contract = %config.contract_address,
        "starting autoprize-vault client"
    );

    let provider = StationProvider::new(&config.station_url)?;
    let client = VaultClient::new(provider, &config.contract_address);
    let session = WalletSession::new(client, store);
    let controller = app::AppController::new(session, config.refresh_interval);
    app::run_app(controller).await
}
