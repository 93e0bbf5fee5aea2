// Peer Ledger - HTTP API
// Routes, wire types, and error-to-status mapping for the ledger operations

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::Account;
use crate::error::LedgerError;
use crate::ledger::{AdviceReport, BalanceReport, Ledger, TransferReceipt};

pub const TRANSFER_OK_MESSAGE: &str = "Transferencia realizada con éxito";

/// Detail returned for every 5xx; the cause is only logged.
pub const INTERNAL_ERROR_DETAIL: &str = "Error interno del servidor";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    ledger: Arc<Ledger>,
}

// ============================================================================
// Wire types
// ============================================================================

/// GET /saldo/:usuario
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub usuario: String,
    pub saldo_actual: f64,
    pub moneda: String,
}

/// GET /consejo/:usuario
#[derive(Debug, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub usuario: String,
    pub analisis: String,
    pub consejo: String,
}

/// POST /transferir body
#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub origen: String,
    pub destino: String,
    pub cantidad: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub mensaje: String,
    pub saldo_origen_nuevo: f64,
    pub saldo_destino_nuevo: f64,
}

/// One entry of GET /usuarios
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub usuario: String,
    pub saldo: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl From<BalanceReport> for BalanceResponse {
    fn from(report: BalanceReport) -> Self {
        Self {
            usuario: report.name,
            saldo_actual: report.balance,
            moneda: report.currency.to_string(),
        }
    }
}

impl From<AdviceReport> for AdviceResponse {
    fn from(report: AdviceReport) -> Self {
        Self {
            usuario: report.name,
            analisis: report.analysis_version.to_string(),
            consejo: report.tier.as_str().to_string(),
        }
    }
}

impl From<TransferReceipt> for TransferResponse {
    fn from(receipt: TransferReceipt) -> Self {
        Self {
            mensaje: TRANSFER_OK_MESSAGE.to_string(),
            saldo_origen_nuevo: receipt.source_balance,
            saldo_destino_nuevo: receipt.destination_balance,
        }
    }
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            usuario: account.name,
            saldo: account.balance,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Request failure rendered as `{"detail": ...}` with a matching status code.
#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),

    /// The blocking task running the ledger call panicked or was cancelled
    Task(JoinError),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Ledger(LedgerError::InvalidAmount(_)) => {
                (StatusCode::BAD_REQUEST, "La cantidad debe ser positiva")
            }
            ApiError::Ledger(LedgerError::InsufficientFunds { .. }) => {
                (StatusCode::BAD_REQUEST, "Fondos insuficientes")
            }
            ApiError::Ledger(LedgerError::SourceNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Usuario origen no encontrado")
            }
            ApiError::Ledger(LedgerError::DestinationNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Usuario destino no encontrado")
            }
            ApiError::Ledger(LedgerError::AccountNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Usuario no encontrado")
            }
            ApiError::Ledger(err @ (LedgerError::Storage(_) | LedgerError::LockPoisoned)) => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL)
            }
            ApiError::Task(err) => {
                tracing::error!(error = %err, "ledger task failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL)
            }
        };

        let body = ErrorResponse {
            detail: detail.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Run a ledger call on the blocking pool so SQLite waits never stall a
/// runtime worker.
async fn with_ledger<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Ledger) -> Result<T, LedgerError> + Send + 'static,
    T: Send + 'static,
{
    let ledger = Arc::clone(&state.ledger);
    let result = tokio::task::spawn_blocking(move || f(ledger.as_ref()))
        .await
        .map_err(ApiError::Task)?;
    Ok(result?)
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health - Health check
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// GET /saldo/:usuario - Current balance; unknown accounts report 0
async fn get_balance(
    State(state): State<AppState>,
    Path(usuario): Path<String>,
) -> ApiResult<Json<BalanceResponse>> {
    let report = with_ledger(&state, move |ledger| ledger.get_balance(&usuario)).await?;
    Ok(Json(report.into()))
}

/// GET /consejo/:usuario - Advice tier for the current balance
async fn get_advice(
    State(state): State<AppState>,
    Path(usuario): Path<String>,
) -> ApiResult<Json<AdviceResponse>> {
    let report = with_ledger(&state, move |ledger| ledger.get_advice(&usuario)).await?;
    Ok(Json(report.into()))
}

/// POST /transferir - Move funds between two accounts
async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> ApiResult<Json<TransferResponse>> {
    let receipt = with_ledger(&state, move |ledger| {
        ledger.transfer(&request.origen, &request.destino, request.cantidad)
    })
    .await?;
    Ok(Json(receipt.into()))
}

/// GET /usuarios - All accounts ordered by name
async fn list_accounts(State(state): State<AppState>) -> ApiResult<Json<Vec<AccountResponse>>> {
    let accounts = with_ledger(&state, |ledger| ledger.list_accounts()).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

// ============================================================================
// Router
// ============================================================================

/// Build the application router. Cross-origin requests are allowed from
/// anywhere.
pub fn router(ledger: Arc<Ledger>) -> Router {
    let state = AppState { ledger };

    Router::new()
        .route("/health", get(health_check))
        .route("/saldo/:usuario", get(get_balance))
        .route("/consejo/:usuario", get(get_advice))
        .route("/transferir", post(transfer))
        .route("/usuarios", get(list_accounts))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
