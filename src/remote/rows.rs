use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{
    CachedSummary, Entry, MonthKey, Rating, TrackerDefinition, TrackerKind, TrackerValues, UserId,
};
use crate::remote::RemoteRows;

#[derive(Debug, Serialize, Deserialize)]
struct EntryRow {
    user_id: String,
    date: NaiveDate,
    rating: Rating,
    journal_entry: String,
    #[serde(default)]
    custom_trackers: TrackerValues,
    #[serde(default)]
    starred: bool,
}

impl EntryRow {
    fn new(user: &UserId, entry: &Entry) -> Self {
        EntryRow {
            user_id: user.0.clone(),
            date: entry.date,
            rating: entry.rating,
            journal_entry: entry.text.clone(),
            custom_trackers: entry.trackers.clone(),
            starred: entry.starred,
        }
    }

    fn into_entry(self) -> Entry {
        Entry {
            date: self.date,
            rating: self.rating,
            text: self.journal_entry,
            trackers: self.custom_trackers,
            starred: self.starred,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TrackerRow {
    user_id: String,
    name: String,
    #[serde(rename = "type")]
    kind: TrackerKind,
    icon_classname: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SummaryRow {
    user_id: String,
    month: u32,
    year: i32,
    summary: String,
    #[serde(default)]
    average_rating: Option<f64>,
}

/// PostgREST-style row gateway. One table per record kind, rows filtered by
/// equality query parameters.
pub struct RestRows {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestRows {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn table(&self, name: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, name)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn ensure_success(response: Response, what: &str) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(AppError::Remote(format!("{what}: {status} {body}")))
        }
    }
}

#[async_trait]
impl RemoteRows for RestRows {
    async fn fetch_entries(&self, user: &UserId) -> Result<Vec<Entry>> {
        let response = self
            .authed(self.client.get(self.table("entries")))
            .query(&[("user_id", format!("eq.{user}"))])
            .send()
            .await?;
        let rows: Vec<EntryRow> = Self::ensure_success(response, "fetch entries")
            .await?
            .json()
            .await?;
        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn insert_entry(&self, user: &UserId, entry: &Entry) -> Result<()> {
        let response = self
            .authed(self.client.post(self.table("entries")))
            .json(&EntryRow::new(user, entry))
            .send()
            .await?;
        Self::ensure_success(response, "insert entry").await?;
        Ok(())
    }

    async fn update_entry(&self, user: &UserId, entry: &Entry) -> Result<()> {
        let response = self
            .authed(self.client.patch(self.table("entries")))
            .query(&[
                ("user_id", format!("eq.{user}")),
                ("date", format!("eq.{}", entry.date)),
            ])
            .json(&json!({
                "rating": entry.rating,
                "journal_entry": entry.text,
                "custom_trackers": entry.trackers,
                "starred": entry.starred,
            }))
            .send()
            .await?;
        Self::ensure_success(response, "update entry").await?;
        Ok(())
    }

    async fn delete_entry(&self, user: &UserId, date: NaiveDate) -> Result<()> {
        let response = self
            .authed(self.client.delete(self.table("entries")))
            .query(&[
                ("user_id", format!("eq.{user}")),
                ("date", format!("eq.{date}")),
            ])
            .send()
            .await?;
        Self::ensure_success(response, "delete entry").await?;
        Ok(())
    }

    async fn set_entry_starred(&self, user: &UserId, date: NaiveDate, starred: bool) -> Result<()> {
        let response = self
            .authed(self.client.patch(self.table("entries")))
            .query(&[
                ("user_id", format!("eq.{user}")),
                ("date", format!("eq.{date}")),
            ])
            .json(&json!({ "starred": starred }))
            .send()
            .await?;
        Self::ensure_success(response, "set starred").await?;
        Ok(())
    }

    async fn fetch_trackers(&self, user: &UserId) -> Result<Vec<TrackerDefinition>> {
        let response = self
            .authed(self.client.get(self.table("custom_trackers")))
            .query(&[("user_id", format!("eq.{user}"))])
            .send()
            .await?;
        let rows: Vec<TrackerRow> = Self::ensure_success(response, "fetch trackers")
            .await?
            .json()
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| TrackerDefinition {
                name: row.name,
                kind: row.kind,
                icon: row.icon_classname,
            })
            .collect())
    }

    async fn insert_tracker(&self, user: &UserId, tracker: &TrackerDefinition) -> Result<()> {
        let row = TrackerRow {
            user_id: user.0.clone(),
            name: tracker.name.clone(),
            kind: tracker.kind,
            icon_classname: tracker.icon.clone(),
        };
        let response = self
            .authed(self.client.post(self.table("custom_trackers")))
            .json(&row)
            .send()
            .await?;
        Self::ensure_success(response, "insert tracker").await?;
        Ok(())
    }

    async fn delete_tracker(&self, user: &UserId, name: &str) -> Result<()> {
        let response = self
            .authed(self.client.delete(self.table("custom_trackers")))
            .query(&[
                ("user_id", format!("eq.{user}")),
                ("name", format!("eq.{name}")),
            ])
            .send()
            .await?;
        Self::ensure_success(response, "delete tracker").await?;
        Ok(())
    }

    async fn set_tracker_icon(&self, user: &UserId, name: &str, icon: &str) -> Result<()> {
        let response = self
            .authed(self.client.patch(self.table("custom_trackers")))
            .query(&[
                ("user_id", format!("eq.{user}")),
                ("name", format!("eq.{name}")),
            ])
            .json(&json!({ "icon_classname": icon }))
            .send()
            .await?;
        Self::ensure_success(response, "set tracker icon").await?;
        Ok(())
    }

    async fn fetch_summary(&self, user: &UserId, key: MonthKey) -> Result<Option<CachedSummary>> {
        let response = self
            .authed(self.client.get(self.table("summaries")))
            .query(&[
                ("user_id", format!("eq.{user}")),
                ("month", format!("eq.{}", key.month)),
                ("year", format!("eq.{}", key.year)),
            ])
            .send()
            .await?;
        let mut rows: Vec<SummaryRow> = Self::ensure_success(response, "fetch summary")
            .await?
            .json()
            .await?;
        Ok(rows.pop().map(|row| CachedSummary {
            month: row.month,
            year: row.year,
            raw_text: row.summary,
            average_rating: row.average_rating,
        }))
    }

    async fn insert_summary(&self, user: &UserId, summary: &CachedSummary) -> Result<()> {
        let row = SummaryRow {
            user_id: user.0.clone(),
            month: summary.month,
            year: summary.year,
            summary: summary.raw_text.clone(),
            average_rating: summary.average_rating,
        };
        let response = self
            .authed(self.client.post(self.table("summaries")))
            .json(&row)
            .send()
            .await?;
        Self::ensure_success(response, "insert summary").await?;
        Ok(())
    }

    async fn update_summary(&self, user: &UserId, summary: &CachedSummary) -> Result<bool> {
        let response = self
            .authed(self.client.patch(self.table("summaries")))
            .header("Prefer", "return=representation")
            .query(&[
                ("user_id", format!("eq.{user}")),
                ("month", format!("eq.{}", summary.month)),
                ("year", format!("eq.{}", summary.year)),
            ])
            .json(&json!({
                "summary": summary.raw_text,
                "average_rating": summary.average_rating,
            }))
            .send()
            .await?;
        let updated: Vec<SummaryRow> = Self::ensure_success(response, "update summary")
            .await?
            .json()
            .await?;
        Ok(!updated.is_empty())
    }

    async fn delete_summary(&self, user: &UserId, key: MonthKey) -> Result<()> {
        let response = self
            .authed(self.client.delete(self.table("summaries")))
            .query(&[
                ("user_id", format!("eq.{user}")),
                ("month", format!("eq.{}", key.month)),
                ("year", format!("eq.{}", key.year)),
            ])
            .send()
            .await?;
        Self::ensure_success(response, "delete summary").await?;
        Ok(())
    }
}
