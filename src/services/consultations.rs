// Consultation API service - REST client for the consultation backend
//
// Thin wrappers: attach the bearer token, call the endpoint, hand the body
// to the envelope normalizer. No retry anywhere; the caller decides.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::envelope;
use crate::error::{Error, Result};
use crate::models::{Admin, CallStatus, Consultation};

/// Request body for `PUT /api/v1/consultation/{id}/call-status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCallStatus {
    pub call_status: CallStatus,
    pub call_notes: String,
    pub called_by: String,
    pub called_by_id: String,
}

pub struct ConsultationService {
    client: Client,
    base_url: String,
    secret: String,
}

impl ConsultationService {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            secret: config.encryption_key.clone(),
        })
    }

    /// `GET /api/v1/consultation/all` - the full record list.
    pub async fn fetch_all(&self, token: &str) -> Result<Vec<Consultation>> {
        tracing::info!("fetching consultations");
        let request = self
            .client
            .get(self.url("/api/v1/consultation/all"))
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json");
        let body = self.send(request).await?;
        self.records_from(body)
    }

    /// `GET /api/v1/consultation/admin-consultations` - the admin-scoped
    /// list, optionally restricted to a submission date range.
    pub async fn fetch_admin_consultations(
        &self,
        token: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Consultation>> {
        tracing::info!(?start_date, ?end_date, "fetching admin consultations");
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(start) = start_date {
            query.push(("startDate", start.to_string()));
        }
        if let Some(end) = end_date {
            query.push(("endDate", end.to_string()));
        }

        let mut request = self
            .client
            .get(self.url("/api/v1/consultation/admin-consultations"))
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            request = request.query(&query);
        }
        let body = self.send(request).await?;
        self.records_from(body)
    }

    /// `PUT /api/v1/consultation/{id}/call-status` - mutates the call
    /// tracking fields and echoes the updated record back.
    pub async fn update_call_status(
        &self,
        token: &str,
        id: &str,
        update: &UpdateCallStatus,
    ) -> Result<Consultation> {
        tracing::info!(consultation = id, status = update.call_status.as_str(), "updating call status");
        let request = self
            .client
            .put(self.url(&format!("/api/v1/consultation/{}/call-status", id)))
            .bearer_auth(token)
            .json(update);
        let body = self.send(request).await?;
        let record = envelope::extract_record(body, &self.secret)?;
        Ok(serde_json::from_value(record)?)
    }

    /// `POST /api/v1/consultation/generate-ai-notes` - drafts call notes
    /// from the consultation data.
    pub async fn generate_ai_notes(
        &self,
        token: &str,
        consultation: &Consultation,
    ) -> Result<String> {
        tracing::info!(consultation = %consultation.id, "generating AI call notes");
        let request = self
            .client
            .post(self.url("/api/v1/consultation/generate-ai-notes"))
            .bearer_auth(token)
            .json(&json!({ "consultationData": consultation }));
        let body = self.send(request).await?;
        envelope::extract_notes(body, &self.secret)
    }

    /// `GET /api/v1/admin` - the counselors list for the call report view.
    pub async fn fetch_admins(&self, token: &str) -> Result<Vec<Admin>> {
        let request = self
            .client
            .get(self.url("/api/v1/admin"))
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json");
        let body = self.send(request).await?;
        let values = envelope::extract_records(body, &self.secret)?;
        values
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(Error::from))
            .collect()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn records_from(&self, body: Value) -> Result<Vec<Consultation>> {
        let values = envelope::extract_records(body, &self.secret)?;
        values
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(Error::from))
            .collect()
    }

    /// Sends the request and returns the parsed 2xx body. Timeouts get
    /// their own error kind; other transport failures pass through; non-2xx
    /// surfaces the server-supplied message when one exists.
    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("message")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("server returned {}", status));
            tracing::warn!("api error ({}): {}", status, message);
            return Err(Error::Api { message });
        }
        response.json().await.map_err(classify_transport)
    }
}

fn classify_transport(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout
    } else {
        Error::Transport(error)
    }
}
