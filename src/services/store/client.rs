use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::StoreConfig;

use super::records::{Record, RecordPage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Patients,
    Appointments,
    Waitlist,
    Recalls,
    CallLogs,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Patients => "Patients",
            Table::Appointments => "Appointments",
            Table::Waitlist => "Waitlist",
            Table::Recalls => "Recalls",
            Table::CallLogs => "CallLogs",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{table} request returned {status}: {body}")]
    Status {
        table: &'static str,
        status: u16,
        body: String,
    },
}

/// Bearer-token client for the spreadsheet-style practice store. Requests
/// log table names and statuses only; field content stays out of the logs.
#[derive(Clone)]
pub struct PracticeStore {
    client: Client,
    api_url: String,
    base_id: String,
    token: String,
}

impl PracticeStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            base_id: config.base_id.clone(),
            token: config.token.clone(),
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}/{}", self.api_url, self.base_id, table.name())
    }

    async fn check(
        response: reqwest::Response,
        table: Table,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut body = response.text().await.unwrap_or_default();
        body.truncate(ERROR_BODY_LIMIT);
        Err(StoreError::Status {
            table: table.name(),
            status: status.as_u16(),
            body,
        })
    }

    /// List one page of records, optionally narrowed by the service's
    /// formula filter syntax.
    pub async fn list<T: DeserializeOwned>(
        &self,
        table: Table,
        filter_formula: Option<&str>,
        max_records: Option<u32>,
    ) -> Result<Vec<Record<T>>, StoreError> {
        let mut request = self
            .client
            .get(self.table_url(table))
            .bearer_auth(&self.token);
        if let Some(formula) = filter_formula {
            request = request.query(&[("filterByFormula", formula)]);
        }
        if let Some(max) = max_records {
            request = request.query(&[("maxRecords", max.to_string())]);
        }

        debug!(table = table.name(), "store list");
        let response = Self::check(request.send().await?, table).await?;
        let page: RecordPage<T> = response.json().await?;
        Ok(page.records)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        table: Table,
        record_id: &str,
    ) -> Result<Record<T>, StoreError> {
        let url = format!("{}/{}", self.table_url(table), record_id);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = Self::check(response, table).await?;
        Ok(response.json().await?)
    }

    pub async fn create<T: Serialize + DeserializeOwned>(
        &self,
        table: Table,
        fields: &T,
    ) -> Result<Record<T>, StoreError> {
        debug!(table = table.name(), "store create");
        let response = self
            .client
            .post(self.table_url(table))
            .bearer_auth(&self.token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let response = Self::check(response, table).await?;
        Ok(response.json().await?)
    }

    pub async fn update<T: Serialize + DeserializeOwned>(
        &self,
        table: Table,
        record_id: &str,
        fields: &T,
    ) -> Result<Record<T>, StoreError> {
        let url = format!("{}/{}", self.table_url(table), record_id);
        debug!(table = table.name(), "store update");
        let response = self
            .client
            .patch(url)
            .bearer_auth(&self.token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let response = Self::check(response, table).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, table: Table, record_id: &str) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.table_url(table), record_id);
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(response, table).await?;
        Ok(())
    }
}
