//! Google Sheets v4 values API client.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::SheetsAuth;
use crate::error::StoreError;
use crate::{SheetStore, StoreFuture};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Connection settings for one spreadsheet.
#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    pub spreadsheet_id: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GoogleSheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    updated_rows: usize,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    #[serde(default)]
    updates: Option<UpdateResponse>,
}

/// [`SheetStore`] backed by the Sheets REST API.
#[derive(Debug, Clone)]
pub struct GoogleSheetsStore {
    client: reqwest::Client,
    config: GoogleSheetsConfig,
    auth: Arc<SheetsAuth>,
}

impl GoogleSheetsStore {
    pub fn new(config: GoogleSheetsConfig, auth: SheetsAuth) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .user_agent("fundsheet/0.1.0")
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Auth(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            config,
            auth: Arc::new(auth),
        })
    }

    fn values_url(&self, sheet: &str, range: &str) -> String {
        let a1 = format!("{sheet}!{range}");
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.spreadsheet_id,
            urlencoding::encode(&a1)
        )
    }

    /// Numbers come back raw so the sheet locale cannot change the decimal
    /// separator; dates keep their displayed text.
    fn read_url(&self, sheet: &str, range: &str) -> String {
        format!(
            "{}?valueRenderOption=UNFORMATTED_VALUE&dateTimeRenderOption=FORMATTED_STRING",
            self.values_url(sheet, range)
        )
    }

    async fn send(
        &self,
        sheet: &str,
        range: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let token = self.auth.bearer_token(&self.client).await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::Request {
                sheet: sheet.to_string(),
                range: range.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                sheet: sheet.to_string(),
                range: range.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn decode<T: for<'de> Deserialize<'de>>(
        sheet: &str,
        range: &str,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        response.json::<T>().await.map_err(|e| StoreError::Decode {
            sheet: sheet.to_string(),
            range: range.to_string(),
            message: e.to_string(),
        })
    }

    async fn read_values(&self, sheet: &str, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        tracing::debug!(sheet, range, "reading sheet range");
        let request = self.client.get(self.read_url(sheet, range));
        let response = self.send(sheet, range, request).await?;
        let body: ValueRange = Self::decode(sheet, range, response).await?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn append_values(
        &self,
        sheet: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<usize, StoreError> {
        tracing::debug!(sheet, range, rows = rows.len(), "appending rows");
        let url = format!(
            "{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            self.values_url(sheet, range)
        );
        let request = self
            .client
            .post(url)
            .json(&json!({ "majorDimension": "ROWS", "values": rows }));
        let response = self.send(sheet, range, request).await?;
        let body: AppendResponse = Self::decode(sheet, range, response).await?;

        Ok(body.updates.map_or(0, |updates| updates.updated_rows))
    }

    async fn update_values(
        &self,
        sheet: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<usize, StoreError> {
        tracing::debug!(sheet, range, rows = rows.len(), "updating range");
        let url = format!(
            "{}?valueInputOption=USER_ENTERED",
            self.values_url(sheet, range)
        );
        let request = self.client.put(url).json(&json!({
            "range": format!("{sheet}!{range}"),
            "majorDimension": "ROWS",
            "values": rows,
        }));
        let response = self.send(sheet, range, request).await?;
        let body: UpdateResponse = Self::decode(sheet, range, response).await?;

        Ok(body.updated_rows)
    }
}

impl SheetStore for GoogleSheetsStore {
    fn read<'a>(&'a self, sheet: &'a str, range: &'a str) -> StoreFuture<'a, Vec<Vec<String>>> {
        Box::pin(self.read_values(sheet, range))
    }

    fn append<'a>(
        &'a self,
        sheet: &'a str,
        range: &'a str,
        rows: Vec<Vec<String>>,
    ) -> StoreFuture<'a, usize> {
        Box::pin(self.append_values(sheet, range, rows))
    }

    fn update<'a>(
        &'a self,
        sheet: &'a str,
        range: &'a str,
        rows: Vec<Vec<String>>,
    ) -> StoreFuture<'a, usize> {
        Box::pin(self.update_values(sheet, range, rows))
    }
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
