//! HTTP client for a Harvest-shaped time tracking API
//!
//! This module wraps the provider's v2 REST endpoints behind the
//! [`TimeSource`] trait so the report engine never depends on the network
//! directly. The client holds nothing but the account credentials and an
//! HTTP handle; every call fetches fresh data, follows the provider's
//! `next_page` pagination, and surfaces non-2xx responses as upstream
//! errors without retrying.

use crate::config::Credentials;
use crate::error::{Result, TallyError};
use crate::filters::{DateRange, EntryFilter};
use crate::types::{Client, Project, TimeEntry};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Production API root
pub const DEFAULT_BASE_URL: &str = "https://api.harvestapp.com/v2";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only port to the time tracking provider
///
/// The report assembler talks to this trait; the binary hands it a
/// [`HarvestClient`], tests hand it a fixture.
#[async_trait]
pub trait TimeSource: Send + Sync {
    /// Time entries within the inclusive range, with the optional
    /// client-side filter already applied
    async fn time_entries(
        &self,
        range: DateRange,
        filter: Option<&EntryFilter>,
    ) -> Result<Vec<TimeEntry>>;

    /// Unfiltered project listing
    async fn projects(&self) -> Result<Vec<Project>>;

    /// Unfiltered client listing
    async fn clients(&self) -> Result<Vec<Client>>;
}

#[derive(Deserialize)]
struct TimeEntriesPage {
    time_entries: Vec<TimeEntry>,
    next_page: Option<u32>,
}

#[derive(Deserialize)]
struct ProjectsPage {
    projects: Vec<Project>,
    next_page: Option<u32>,
}

#[derive(Deserialize)]
struct ClientsPage {
    clients: Vec<Client>,
    next_page: Option<u32>,
}

/// Thin wrapper around the provider's REST API
pub struct HarvestClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HarvestClient {
    /// Create a client against the production API with the default timeout
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_options(credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit base URL and timeout
    ///
    /// The base URL override exists for tests and self-hosted mirrors; the
    /// timeout bounds worst-case latency for callers that cannot cancel.
    pub fn with_options(
        credentials: Credentials,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials,
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.credentials.token)
            .header("Harvest-Account-Id", &self.credentials.account_id)
            .header(
                reqwest::header::USER_AGENT,
                concat!("timetally/", env!("CARGO_PKG_VERSION")),
            )
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TallyError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Fetch every page of a listing endpoint
    async fn get_paged<P, T>(
        &self,
        path: &str,
        base_query: &[(&str, String)],
        items: fn(P) -> (Vec<T>, Option<u32>),
    ) -> Result<Vec<T>>
    where
        P: DeserializeOwned,
    {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let mut query = base_query.to_vec();
            query.push(("page", page.to_string()));

            let response = self.get(path, &query).await?;
            let parsed: P = response.json().await?;
            let (batch, next_page) = items(parsed);
            debug!(path, page, count = batch.len(), "fetched page");
            all.extend(batch);

            match next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(all)
    }

    /// Fetch time entries for an inclusive date range
    pub async fn fetch_time_entries(
        &self,
        range: DateRange,
        filter: Option<&EntryFilter>,
    ) -> Result<Vec<TimeEntry>> {
        let query = [
            ("from", range.from.to_string()),
            ("to", range.to.to_string()),
        ];
        let entries = self
            .get_paged("time_entries", &query, |page: TimeEntriesPage| {
                (page.time_entries, page.next_page)
            })
            .await?;

        Ok(match filter {
            Some(filter) => filter.apply(entries),
            None => entries,
        })
    }

    /// Fetch the full project listing
    pub async fn fetch_projects(&self) -> Result<Vec<Project>> {
        self.get_paged("projects", &[], |page: ProjectsPage| {
            (page.projects, page.next_page)
        })
        .await
    }

    /// Fetch the full client listing
    pub async fn fetch_clients(&self) -> Result<Vec<Client>> {
        self.get_paged("clients", &[], |page: ClientsPage| {
            (page.clients, page.next_page)
        })
        .await
    }

    /// Lightweight credential probe against the "who am I" endpoint
    ///
    /// Returns `Ok(false)` when the provider rejects the credentials;
    /// network-level failures still propagate as errors.
    pub async fn test_connection(&self) -> Result<bool> {
        match self.get("users/me", &[]).await {
            Ok(_) => Ok(true),
            Err(TallyError::Upstream { status, message }) => {
                debug!(status, %message, "credential probe rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl TimeSource for HarvestClient {
    async fn time_entries(
        &self,
        range: DateRange,
        filter: Option<&EntryFilter>,
    ) -> Result<Vec<TimeEntry>> {
        self.fetch_time_entries(range, filter).await
    }

    async fn projects(&self) -> Result<Vec<Project>> {
        self.fetch_projects().await
    }

    async fn clients(&self) -> Result<Vec<Client>> {
        self.fetch_clients().await
    }
}
