use crate::error::FetchError;
use crate::mubi::api;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::traits::ListSource;
use async_trait::async_trait;
use mubi_export_config::Config;
use mubi_export_models::Dataset;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, ORIGIN, REFERER};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};


/// Bodies logged or reported in errors are cut to this many characters
const BODY_PREVIEW_CHARS: usize = 400;

const MUBI_WEB_ORIGIN: &str = "https://mubi.com";

/// Everything the client needs to talk to the service for one user
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub user_id: String,
    pub token: Option<String>,
    pub per_page: u32,
    pub country: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub page_delay: Duration,
    pub ratings_fallback_endpoints: Vec<String>,
    pub retry: RetryPolicy,
    /// Log every request and response (status, headers, truncated body)
    pub debug: bool,
}

impl ClientOptions {
    pub fn from_config(config: &Config, user_id: impl Into<String>, token: Option<String>, debug: bool) -> Self {
        Self {
            base_url: config.api.base_url.clone(),
            user_id: user_id.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            per_page: config.export.per_page,
            country: config.export.country.clone(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            user_agent: config.api.user_agent.clone(),
            page_delay: Duration::from_millis(config.api.page_delay_ms),
            ratings_fallback_endpoints: config.api.ratings_fallback_endpoints.clone(),
            retry: RetryPolicy::from_config(&config.retry),
            debug,
        }
    }
}

pub struct MubiClient {
    client: Client,
    options: ClientOptions,
    sleeper: Arc<dyn Sleeper>,
}

impl MubiClient {
    pub fn new(options: ClientOptions) -> Result<Self, FetchError> {
        let headers = default_headers(&options)?;
        let client = Client::builder()
            .user_agent(options.user_agent.clone())
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|e| FetchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            options,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replace the wall-clock sleeper used for retry and page delays
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/users/{}/{}",
            self.options.base_url.trim_end_matches('/'),
            self.options.user_id,
            endpoint
        )
    }

    /// Fetch every page of `endpoint`, starting at page 1
    pub async fn fetch_endpoint(&self, endpoint: &str) -> Result<Vec<Value>, FetchError> {
        let url = self.endpoint_url(endpoint);
        let mut items = Vec::new();
        let mut previous_page: Option<Vec<Value>> = None;
        let mut page: u32 = 1;

        loop {
            let body = self.fetch_page(&url, endpoint, page).await?;
            let page_items = api::extract_items(&body);
            let more = api::has_more(&body, page, page_items.len());

            debug!(
                endpoint = endpoint,
                page = page,
                items_on_page = page_items.len(),
                has_more = more,
                "Fetched page"
            );

            // A server that ignores `page` would otherwise loop forever
            if !page_items.is_empty() && previous_page.as_ref() == Some(&page_items) {
                warn!(
                    endpoint = endpoint,
                    page = page,
                    "Page repeats the previous one, stopping pagination"
                );
                break;
            }

            items.extend(page_items.iter().cloned());
            if !more {
                break;
            }

            previous_page = Some(page_items);
            page += 1;

            if !self.options.page_delay.is_zero() {
                self.sleeper.sleep(self.options.page_delay).await;
            }
        }

        info!("Fetched {} items from {} ({} pages)", items.len(), endpoint, page);
        Ok(items)
    }

    /// One page, retried while the service answers 429
    async fn fetch_page(&self, url: &str, endpoint: &str, page: u32) -> Result<Value, FetchError> {
        let retry = &self.options.retry;
        let mut attempt: u32 = 1;

        loop {
            if self.options.debug {
                debug!(
                    url = url,
                    page = page,
                    per_page = self.options.per_page,
                    attempt = attempt,
                    authenticated = self.options.token.is_some(),
                    "GET"
                );
            }

            let response = self
                .client
                .get(url)
                .query(&[("page", page), ("per_page", self.options.per_page)])
                .send()
                .await
                .map_err(|source| FetchError::Transport {
                    endpoint: endpoint.to_string(),
                    page,
                    source,
                })?;

            let status = response.status();
            let retry_after = parse_retry_after(response.headers());
            if self.options.debug {
                debug!(status = %status, headers = ?response.headers(), "Response received");
            }

            let text = response.text().await.map_err(|source| FetchError::Transport {
                endpoint: endpoint.to_string(),
                page,
                source,
            })?;

            if self.options.debug {
                debug!(body = %truncate(&text), "Response body");
            }

            if status.is_success() {
                return serde_json::from_str(&text).map_err(|e| FetchError::Decode {
                    endpoint: endpoint.to_string(),
                    page,
                    message: e.to_string(),
                });
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if !retry.should_retry(attempt) {
                    warn!(
                        endpoint = endpoint,
                        page = page,
                        attempts = attempt,
                        "Rate limit persisted, giving up"
                    );
                    return Err(FetchError::RateLimitExceeded {
                        endpoint: endpoint.to_string(),
                        page,
                        attempts: attempt,
                    });
                }

                let delay = retry.delay_for(attempt, retry_after);
                warn!(
                    endpoint = endpoint,
                    page = page,
                    attempt = attempt,
                    "Rate limited (429), waiting {:?} before retrying",
                    delay
                );
                self.sleeper.sleep(delay).await;
                attempt += 1;
                continue;
            }

            warn!("MUBI API error: {} on {} page {}", status, endpoint, page);
            return Err(FetchError::Http {
                endpoint: endpoint.to_string(),
                page,
                status: status.as_u16(),
                body: truncate(&text),
            });
        }
    }

    /// Ratings, falling back to alternative endpoints when the primary one
    /// answers with an HTTP error
    async fn fetch_ratings(&self) -> Result<Vec<Value>, FetchError> {
        let primary = Dataset::Ratings.endpoint();
        let error = match self.fetch_endpoint(primary).await {
            Ok(items) => return Ok(items),
            Err(e) if e.is_http() && !self.options.ratings_fallback_endpoints.is_empty() => e,
            Err(e) => return Err(e),
        };

        warn!("Failed to fetch {}: {}. Trying fallback endpoints", primary, error);
        for endpoint in &self.options.ratings_fallback_endpoints {
            info!("Trying fallback endpoint: {}", endpoint);
            match self.fetch_endpoint(endpoint).await {
                Ok(items) if !items.is_empty() => {
                    info!("Found {} ratings on endpoint {}", items.len(), endpoint);
                    return Ok(items);
                }
                Ok(_) => debug!("Fallback endpoint {} returned no items", endpoint),
                Err(e) => debug!("Fallback endpoint {} failed: {}", endpoint, e),
            }
        }

        Err(error)
    }
}

#[async_trait]
impl ListSource for MubiClient {
    fn source_name(&self) -> &str {
        "mubi"
    }

    async fn fetch_all(&self, dataset: Dataset) -> Result<Vec<Value>, FetchError> {
        match dataset {
            Dataset::Watchlist => self.fetch_endpoint(dataset.endpoint()).await,
            Dataset::Ratings => self.fetch_ratings().await,
        }
    }
}

/// Header set mirroring the MUBI web client
fn default_headers(options: &ClientOptions) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));
    headers.insert(REFERER, HeaderValue::from_static("https://mubi.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static(MUBI_WEB_ORIGIN));
    headers.insert(HeaderName::from_static("client"), HeaderValue::from_static("web"));
    headers.insert(
        HeaderName::from_static("client-accept-audio-codecs"),
        HeaderValue::from_static("aac"),
    );
    headers.insert(
        HeaderName::from_static("client-accept-video-codecs"),
        HeaderValue::from_static("h265,vp9,h264"),
    );

    let country = HeaderValue::from_str(&options.country)
        .map_err(|_| FetchError::Config(format!("Invalid country code: {}", options.country)))?;
    headers.insert(HeaderName::from_static("client-country"), country);

    let anonymous_id = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
        .map_err(|e| FetchError::Config(e.to_string()))?;
    headers.insert(HeaderName::from_static("anonymous_user_id"), anonymous_id);

    if let Some(token) = &options.token {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| FetchError::Config("Token contains invalid header characters".to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
    }

    Ok(headers)
}

/// `Retry-After` in seconds; HTTP-date values are ignored
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= BODY_PREVIEW_CHARS {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
        cut.push('…');
        cut
    }
}
