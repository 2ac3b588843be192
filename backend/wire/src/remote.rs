use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{
    ADMIN_ANALYTICS_PATH, ADMIN_CONTACTS_PATH, CONTACT_PATH, HEALTH_PATH, TRACK_VIEW_PATH,
    models::{
        AnalyticsList, ContactForm, ContactSubmission, ErrorBody, Health, ProjectAnalytics,
        ProjectView, SubmissionList,
    },
};

const FALLBACK_REJECTION: &str = "Failed to submit form";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Rejected(String),

    #[error("Network error. Please check your connection and try again.")]
    Network(#[from] reqwest::Error),
}

/// HTTP client for the portfolio backend.
///
/// `base_url` includes any route prefix, e.g.
/// `https://host/functions/v1/make-server-1a91da27`.
#[derive(Clone, Debug)]
pub struct PortfolioClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PortfolioClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));

        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Records a project link click. Never fails: tracking must not get in
    /// the visitor's way, so errors are only logged.
    pub async fn track_project_view(&self, project_id: &str, project_title: &str) {
        let payload = ProjectView {
            project_id: project_id.to_string(),
            project_title: Some(project_title.to_string()),
        };

        let result = self
            .request(Method::POST, TRACK_VIEW_PATH)
            .json(&payload)
            .send()
            .await
            .and_then(Response::error_for_status);

        if let Err(e) = result {
            debug!("Failed to track project view: {e}");
        }
    }

    /// Submits the contact form. The form is only borrowed so the caller
    /// still holds what the visitor typed if this fails.
    pub async fn submit_contact_form(&self, form: &ContactForm) -> Result<(), ClientError> {
        let response = self
            .request(Method::POST, CONTACT_PATH)
            .json(form)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| FALLBACK_REJECTION.to_string());

        Err(ClientError::Rejected(message))
    }

    pub async fn contact_submissions(&self) -> Result<Vec<ContactSubmission>, ClientError> {
        let list: SubmissionList = self.fetch(ADMIN_CONTACTS_PATH).await?;

        Ok(list.submissions)
    }

    pub async fn project_analytics(&self) -> Result<Vec<ProjectAnalytics>, ClientError> {
        let list: AnalyticsList = self.fetch(ADMIN_ANALYTICS_PATH).await?;

        Ok(list.analytics)
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        self.fetch(HEALTH_PATH).await
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());

            return Err(ClientError::Rejected(message));
        }

        Ok(response.json().await?)
    }
}
