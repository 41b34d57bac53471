use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::connection::Connection;
use crate::error::AppError;

const COMPANY_INFO_FALLBACK: &str = "Failed to get company info";

/// Read access to the QuickBooks Online accounting API.
#[async_trait]
pub trait AccountingApi: Send + Sync {
    /// Fetch the company info record for the connection's realm.
    async fn get_company_info(&self, conn: &Connection) -> Result<Value, AppError>;
}

/// `AccountingApi` over HTTPS with reqwest.
pub struct QuickBooksClient {
    http: reqwest::Client,
}

// {"Fault": {"Error": [{"Message": "...", "Detail": "...", "code": "..."}], "type": "..."}}
#[derive(Debug, Deserialize)]
struct FaultEnvelope {
    #[serde(rename = "Fault")]
    fault: Fault,
}

#[derive(Debug, Deserialize)]
struct Fault {
    #[serde(rename = "Error", default)]
    errors: Vec<FaultError>,
}

#[derive(Debug, Deserialize)]
struct FaultError {
    #[serde(rename = "Message")]
    message: Option<String>,
    #[serde(rename = "Detail")]
    detail: Option<String>,
}

impl QuickBooksClient {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl AccountingApi for QuickBooksClient {
    async fn get_company_info(&self, conn: &Connection) -> Result<Value, AppError> {
        let resp = self
            .http
            .get(conn.company_info_url())
            .bearer_auth(conn.access_token())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::Downstream(format!("Company info request failed: {e}")))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Downstream(fault_message(&body)));
        }

        resp.json()
            .await
            .map_err(|e| AppError::Downstream(format!("Failed to parse company info: {e}")))
    }
}

/// Best human-readable message from a Fault body.
fn fault_message(body: &str) -> String {
    serde_json::from_str::<FaultEnvelope>(body)
        .ok()
        .and_then(|env| env.fault.errors.into_iter().next())
        .and_then(|err| err.detail.or(err.message))
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| COMPANY_INFO_FALLBACK.to_string())
}
