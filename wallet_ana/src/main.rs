use abi::address::validate_wallet_address;
use abi::Config;
use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::sync::Arc;
use wallet_ana::WalletInspector;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let matches = Command::new("Wallet Analyzer")
        .version("1.0")
        .about("Summarises a Sui wallet: SUI balance, holdings and recent activity")
        .arg(Arg::new("address")
            .short('a')
            .long("address")
            .value_name("WALLET_ADDRESS")
            .required(true))
        .arg(Arg::new("tokens")
            .short('t')
            .long("tokens")
            .help("Print only the per-type holdings table")
            .action(ArgAction::SetTrue))
        .get_matches();

    let address = matches
        .get_one::<String>("address")
        .map(String::as_str)
        .unwrap_or_default();
    let address = validate_wallet_address(address)?;

    let config = Arc::new(Config::from_env()?);
    let inspector = WalletInspector::connect(config)?;

    if matches.get_flag("tokens") {
        let holdings = inspector.tokens().fetch(address).await?;
        println!("{}", serde_json::to_string_pretty(&holdings)?);
    } else {
        let report = inspector.inspect(address).await;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
