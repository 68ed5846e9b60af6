use std::process;
use std::sync::Arc;

use bbox_addon_stacks::format::{explorer_contract_url, explorer_tx_url, format_listing_fee};
use bbox_addon_stacks::rpc::StacksRpc;
use bbox_addon_stacks::{
    resolve_network, BboxContract, InMemoryNetworkPreference, NetworkKey, NetworkPreference,
};
use bbox_kit::bbox_error;
use bbox_kit::errors::{remediation, summary, BboxError, BboxResult, ErrorAttachments};
use bbox_kit::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value as JsonValue};

mod env;
mod preference;

use env::BboxEnv;
use preference::FileNetworkPreference;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Show or change the network used by every other command
    #[clap(subcommand, name = "network", bin_name = "network")]
    Network(NetworkCommand),
    /// Print the listing fee charged by the contract
    #[clap(name = "fee", bin_name = "fee")]
    Fee,
    /// Print the number of listed apps
    #[clap(name = "total-apps", bin_name = "total-apps")]
    TotalApps,
    /// Print a listed app
    #[clap(name = "app", bin_name = "app")]
    App(AppQuery),
    /// Print the vote cast by a principal on an app
    #[clap(name = "vote-of", bin_name = "vote-of")]
    VoteOf(UserQuery),
    /// Print the rating given by a principal to an app
    #[clap(name = "rating-of", bin_name = "rating-of")]
    RatingOf(UserQuery),
    /// Print explorer links
    #[clap(subcommand, name = "explorer", bin_name = "explorer")]
    Explorer(ExplorerCommand),
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum NetworkCommand {
    /// Print the resolved network profile
    #[clap(name = "show", bin_name = "show")]
    Show,
    /// Persist the network choice
    #[clap(name = "set", bin_name = "set")]
    Set(SetNetwork),
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct SetNetwork {
    /// One of mainnet, testnet or devnet
    pub network: String,
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct AppQuery {
    pub app_id: u64,
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct UserQuery {
    /// Principal of the voter
    pub voter: String,
    pub app_id: u64,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum ExplorerCommand {
    /// Link to a transaction on the resolved network
    #[clap(name = "tx", bin_name = "tx")]
    Tx(ExplorerTx),
    /// Link to the listing contract on the resolved network
    #[clap(name = "contract", bin_name = "contract")]
    Contract,
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct ExplorerTx {
    pub txid: String,
}

pub fn main() {
    let logger = hiro_system_kit::log::setup_logger();
    let _guard = hiro_system_kit::log::setup_global_logger(logger.clone());
    let ctx = Context::new(logger);

    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            println!("{}", e);
            process::exit(1);
        }
    };

    let env = BboxEnv::load();
    if let Err(e) = hiro_system_kit::nestable_block_on(handle_command(opts, &env, &ctx)) {
        ctx.try_log(|logger| error!(logger, "{}", summary(&e)));
        if let Some(help) = remediation(&e) {
            eprintln!("{}", help);
        }
        std::thread::sleep(std::time::Duration::from_millis(500));
        process::exit(1);
    }
}

/// `BBOX_NETWORK` shadows the persisted choice without overwriting it.
fn load_preference(env: &BboxEnv) -> BboxResult<Arc<dyn NetworkPreference>> {
    match &env.network {
        Some(network) => Ok(Arc::new(InMemoryNetworkPreference::new(Some(network.as_str())))),
        None => Ok(Arc::new(FileNetworkPreference::new(env.preference_dir())?)),
    }
}

fn print_json(value: &JsonValue) -> BboxResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| bbox_error!(BboxError::Config, "Failed to render output: {}", e))?;
    println!("{}", rendered);
    Ok(())
}

fn read_client(env: &BboxEnv, ctx: &Context) -> BboxResult<BboxContract> {
    Ok(BboxContract::new(Arc::new(StacksRpc::new()), load_preference(env)?, ctx))
}

async fn handle_command(opts: Opts, env: &BboxEnv, ctx: &Context) -> BboxResult<()> {
    match opts.command {
        Command::Network(NetworkCommand::Set(cmd)) => handle_network_set(&cmd, env, ctx),
        Command::Network(NetworkCommand::Show) => {
            let profile = resolve_network(load_preference(env)?.as_ref());
            print_json(&json!({
                "network": profile.key.as_str(),
                "contract_id": profile.contract_id,
                "api_url": profile.api_url,
            }))
        }
        Command::Fee => {
            let fee = read_client(env, ctx)?.get_listing_fee().await;
            print_json(&json!({
                "token": fee.token,
                "amount": fee.amount.to_string(),
                "display": format_listing_fee(&fee.amount, &fee.token),
            }))
        }
        Command::TotalApps => print_json(&json!(read_client(env, ctx)?.get_total_apps().await)),
        Command::App(cmd) => print_optional(read_client(env, ctx)?.get_app(cmd.app_id).await),
        Command::VoteOf(cmd) => {
            print_optional(read_client(env, ctx)?.get_user_vote(&cmd.voter, cmd.app_id).await)
        }
        Command::RatingOf(cmd) => {
            print_optional(read_client(env, ctx)?.get_user_rating(&cmd.voter, cmd.app_id).await)
        }
        Command::Explorer(ExplorerCommand::Tx(cmd)) => {
            let profile = resolve_network(load_preference(env)?.as_ref());
            println!("{}", explorer_tx_url(&cmd.txid, profile.key.as_str()));
            Ok(())
        }
        Command::Explorer(ExplorerCommand::Contract) => {
            println!("{}", explorer_contract_url(resolve_network(load_preference(env)?.as_ref())));
            Ok(())
        }
    }
}

fn print_optional(value: Option<bbox_addon_stacks::codec::NormalizedValue>) -> BboxResult<()> {
    print_json(&value.map(|v| v.to_json()).unwrap_or(JsonValue::Null))
}

fn handle_network_set(cmd: &SetNetwork, env: &BboxEnv, ctx: &Context) -> BboxResult<()> {
    let key = NetworkKey::parse(&cmd.network)
        .ok_or_else(|| bbox_error!(BboxError::Config, "unknown network '{}'", cmd.network))
        .with_documentation("Pick one of mainnet, testnet or devnet.")?;
    let preference = FileNetworkPreference::new(env.preference_dir())?;
    preference.set(key.as_str())?;
    ctx.try_log(|logger| {
        info!(logger, "network set to {} ({})", key, preference.path().display())
    });
    if env.network.is_some() {
        ctx.try_log(|logger| warn!(logger, "BBOX_NETWORK is set and overrides this choice"));
    }
    Ok(())
}
