//! Break ledger backed by a PostgREST-style gateway
//!
//! Records live in a single table (`breaks` by default). Opening inserts a
//! row and reads back its generated id; closing patches `end_time` and
//! `duration_minutes` on the row selected by `id=eq.{id}`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opsdesk_core::BreakLedger;
use opsdesk_domain::constants::REST_PATH_PREFIX;
use opsdesk_domain::{
    BackendConfig, BreakClosure, BreakId, BreakRecord, NewBreak, OpsDeskError, Result,
};
use reqwest::{Method, RequestBuilder, Response};
use tracing::{debug, info, instrument};
use url::Url;

use crate::errors::{status_error, InfraError};
use crate::http::HttpClient;

const PREFER_REPRESENTATION: &str = "return=representation";

/// REST implementation of [`BreakLedger`].
#[derive(Debug, Clone)]
pub struct RestBreakLedger {
    http: HttpClient,
    table_url: Url,
}

impl RestBreakLedger {
    /// Build a ledger client from backend settings.
    ///
    /// # Errors
    ///
    /// Returns `OpsDeskError::Config` when the url is not absolute or the
    /// credentials cannot be sent as headers.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = HttpClient::for_backend(config)?;
        Self::with_client(config, http)
    }

    /// Same as [`RestBreakLedger::new`] with a caller-supplied client.
    pub fn with_client(config: &BackendConfig, http: HttpClient) -> Result<Self> {
        let table_url = table_url(&config.url, &config.breaks_table)?;
        Ok(Self { http, table_url })
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.http.send(builder).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    async fn records(response: Response) -> Result<Vec<BreakRecord>> {
        let bytes = response.bytes().await.map_err(InfraError::from)?;
        Ok(serde_json::from_slice(&bytes).map_err(InfraError::from)?)
    }
}

#[async_trait]
impl BreakLedger for RestBreakLedger {
    #[instrument(skip(self), fields(table = %self.table_url.path()))]
    async fn open_auto_idle_break(
        &self,
        user_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<BreakId> {
        let payload = NewBreak::auto_idle(user_id, started_at);
        let builder = self
            .http
            .request(Method::POST, self.table_url.clone())
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&payload);

        let response = self.execute(builder).await?;
        let record = Self::records(response).await?.into_iter().next().ok_or_else(|| {
            OpsDeskError::Backend("insert returned no break record".into())
        })?;

        debug!(break_id = %record.id, "auto-idle break inserted");
        Ok(record.id)
    }

    #[instrument(skip(self), fields(break_id = %id))]
    async fn close_break(&self, id: &BreakId, closure: BreakClosure) -> Result<()> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));

        let builder = self
            .http
            .request(Method::PATCH, url)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&closure);

        let response = self.execute(builder).await?;
        if Self::records(response).await?.is_empty() {
            return Err(OpsDeskError::NotFound(format!("break {} does not exist", id)));
        }

        info!(duration_minutes = closure.duration_minutes, "break closed in ledger");
        Ok(())
    }
}

fn table_url(base: &str, table: &str) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|err| OpsDeskError::Config(format!("invalid backend url {:?}: {}", base, err)))?;
    if url.cannot_be_a_base() {
        return Err(OpsDeskError::Config(format!("backend url {:?} cannot be a base", base)));
    }
    if table.trim().is_empty() {
        return Err(OpsDeskError::Config("breaks table must not be empty".into()));
    }

    url.path_segments_mut()
        .map_err(|()| OpsDeskError::Config(format!("backend url {:?} cannot be a base", base)))?
        .pop_if_empty()
        .extend(REST_PATH_PREFIX.split('/'))
        .push(table);
    url.set_query(None);
    Ok(url)
}
