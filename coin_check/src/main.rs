use abi::address::{validate_token_reference, validate_wallet_address};
use abi::{AnalysisError, Config};
use anyhow::Result;
use coin_check::{is_healthy, TokenInspector};
use log::{error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use wallet_ana::WalletInspector;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Filter;

struct Services {
    wallets: WalletInspector,
    tokens: TokenInspector,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type Reply = WithStatus<Json>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let listen_address = env::var("LISTEN_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string());
    let listen_port = env::var("LISTEN_PORT")
        .unwrap_or_else(|_| "3030".to_string())
        .parse::<u16>()?;

    let config = Arc::new(Config::from_env()?);
    let services = Arc::new(Services {
        wallets: WalletInspector::connect(config.clone())?,
        tokens: TokenInspector::connect(config)?,
    });
    let with_services = warp::any().map(move || services.clone());

    let check = warp::path("check")
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_services.clone())
        .and_then(handle_check);
    let token = warp::path("token")
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_services.clone())
        .and_then(handle_token);
    let token_info = warp::path("token_info")
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_services.clone())
        .and_then(handle_token_info);
    let health_check = warp::path("health_check")
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_services)
        .and_then(handle_health_check);

    let routes = warp::get()
        .and(check.or(token).or(token_info).or(health_check))
        .with(warp::cors().allow_any_origin());

    info!("listening on {}:{}", listen_address, listen_port);
    warp::serve(routes).run((listen_address.parse::<std::net::IpAddr>()?, listen_port)).await;

    Ok(())
}

fn ok<T: Serialize>(body: &T) -> Reply {
    warp::reply::with_status(warp::reply::json(body), StatusCode::OK)
}

/// Renders an analysis failure as a readable message; raw transport detail stays in the log.
fn failure(err: &AnalysisError) -> Reply {
    let (status, message) = match err {
        AnalysisError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AnalysisError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            "Invalid token contract address or object not found".to_string(),
        ),
        AnalysisError::Transport(_) | AnalysisError::Rpc(_) | AnalysisError::Config(_) => {
            error!("analysis failed: {}", err);
            (
                StatusCode::BAD_GATEWAY,
                "Unable to reach the Sui network, try again later".to_string(),
            )
        }
    };
    warp::reply::with_status(warp::reply::json(&ErrorBody { error: message }), status)
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Result<&'a str, AnalysisError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| AnalysisError::Validation(format!("missing `{}` query parameter", name)))
}

async fn handle_check(
    params: HashMap<String, String>,
    services: Arc<Services>,
) -> Result<Reply, warp::Rejection> {
    let address = match param(&params, "address").and_then(validate_wallet_address) {
        Ok(address) => address,
        Err(e) => return Ok(failure(&e)),
    };
    let report = services.wallets.inspect(address).await;
    Ok(ok(&report))
}

async fn handle_token(
    params: HashMap<String, String>,
    services: Arc<Services>,
) -> Result<Reply, warp::Rejection> {
    let address = match param(&params, "address").and_then(validate_wallet_address) {
        Ok(address) => address,
        Err(e) => return Ok(failure(&e)),
    };
    Ok(match services.wallets.tokens().fetch(address).await {
        Ok(holdings) => ok(&holdings),
        Err(e) => failure(&e),
    })
}

async fn handle_token_info(
    params: HashMap<String, String>,
    services: Arc<Services>,
) -> Result<Reply, warp::Rejection> {
    let token = match param(&params, "token_address").and_then(validate_token_reference) {
        Ok(token) => token,
        Err(e) => return Ok(failure(&e)),
    };
    Ok(match services.tokens.inspect(token).await {
        Ok(report) => ok(&report),
        Err(e) => failure(&e),
    })
}

async fn handle_health_check(
    params: HashMap<String, String>,
    services: Arc<Services>,
) -> Result<Reply, warp::Rejection> {
    let token = match param(&params, "token_address").and_then(validate_token_reference) {
        Ok(token) => token,
        Err(e) => return Ok(failure(&e)),
    };
    Ok(match services.tokens.inspect(token).await {
        Ok(report) => {
            let healthy = is_healthy(&report);
            info!("Token Address: {}, Health Status: {:?}", token, healthy);
            ok(&healthy)
        }
        Err(e) => failure(&e),
    })
}
