//! Payout Allocation Server
//!
//! HTTP endpoints around the allocation calculator.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::allocation::{AllocationCalculator, AllocationResult, MarketData};
use crate::config::Config;
use crate::error::AllocationError;
use crate::format::FormatOptions;
use crate::payout::{OnChainPayoutRecord, PayoutRecord};
use crate::prices::PriceBook;
use crate::split::{allocate_split, SplitAllocation, SplitBeneficiary};
use crate::vault::{VaultRecord, VaultState};

pub struct AppState {
    pub calculator: AllocationCalculator,
    pub prices: PriceBook,
    pub started_at: std::time::Instant,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            calculator: AllocationCalculator::new(config.formatting),
            prices: PriceBook::from_prices(config.prices.clone()),
            started_at: std::time::Instant::now(),
        }
    }

    fn market_for(&self, vault: Option<&VaultState>, explicit_price: Option<f64>) -> MarketData {
        let token_price_usd = explicit_price.unwrap_or_else(|| {
            vault
                .map(|vault| self.prices.price_of(&vault.token.address))
                .unwrap_or(0.0)
        });
        MarketData { token_price_usd }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    #[serde(default)]
    pub vault: Option<VaultRecord>,
    #[serde(default)]
    pub payout: Option<PayoutRecord>,
    #[serde(default)]
    pub on_chain_payouts: Vec<OnChainPayoutRecord>,
    #[serde(default)]
    pub percentage_to_pay_of_vault: Option<String>,
    #[serde(default)]
    pub percentage_of_payout: Option<String>,
    /// Overrides the price book
    #[serde(default)]
    pub token_price_usd: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitAllocationRequest {
    pub vault: VaultRecord,
    #[serde(default)]
    pub payout: PayoutRecord,
    #[serde(default)]
    pub on_chain_payouts: Vec<OnChainPayoutRecord>,
    pub percentage_to_pay_of_vault: String,
    pub beneficiaries: Vec<SplitBeneficiary>,
    #[serde(default)]
    pub token_price_usd: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub uptime_secs: u64,
    pub version: String,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request(error: AllocationError) -> ApiError {
    warn!("Rejected allocation request: {}", error);
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error.to_string() })),
    )
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config", get(config_handler))
        .route("/api/v1/allocation", post(allocation_handler))
        .route("/api/v1/split-allocation", post(split_allocation_handler))
        .route("/api/v1/prices", get(prices_handler).put(update_prices_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        uptime_secs: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn config_handler(State(state): State<Arc<AppState>>) -> Json<FormatOptions> {
    Json(state.calculator.format_options())
}

async fn allocation_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AllocationRequest>,
) -> Result<Json<AllocationResult>, ApiError> {
    let vault = request
        .vault
        .as_ref()
        .map(VaultState::try_from)
        .transpose()
        .map_err(bad_request)?;
    let market = state.market_for(vault.as_ref(), request.token_price_usd);

    let result = state
        .calculator
        .compute(
            vault.as_ref(),
            request.payout.as_ref(),
            &request.on_chain_payouts,
            request.percentage_to_pay_of_vault.as_deref(),
            request.percentage_of_payout.as_deref(),
            market,
        )
        .map_err(bad_request)?;

    Ok(Json(result))
}

async fn split_allocation_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SplitAllocationRequest>,
) -> Result<Json<SplitAllocation>, ApiError> {
    let vault = VaultState::try_from(&request.vault).map_err(bad_request)?;
    let market = state.market_for(Some(&vault), request.token_price_usd);

    let split = allocate_split(
        &state.calculator,
        &vault,
        &request.payout,
        &request.on_chain_payouts,
        &request.percentage_to_pay_of_vault,
        &request.beneficiaries,
        market,
    )
    .map_err(bad_request)?;

    Ok(Json(split))
}

async fn prices_handler(State(state): State<Arc<AppState>>) -> Json<HashMap<String, f64>> {
    Json(state.prices.snapshot())
}

async fn update_prices_handler(
    State(state): State<Arc<AppState>>,
    Json(prices): Json<HashMap<String, f64>>,
) -> Json<serde_json::Value> {
    let stored = state.prices.upsert_many(prices);
    info!("Updated {} token prices", stored);
    Json(json!({ "stored": stored, "total": state.prices.len() }))
}

/// Run the server
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config));
    if state.prices.is_empty() {
        warn!("No token prices configured, USD amounts render as 0$ until prices are pushed");
    } else {
        info!("Loaded {} seed token prices", state.prices.len());
    }

    let app = create_router(state);
    let addr = format!("{}:{}", config.host(), config.port());

    info!("Starting Payout Allocation server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
