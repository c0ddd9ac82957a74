//! ipdata.co lookup client.

use crate::record::Record;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Public ipdata.co endpoint.
pub const BASE_URL: &str = "https://api.ipdata.co";

/// Header carrying the API key. Kept out of the query string so the key
/// doesn't end up in access logs.
const API_KEY_HEADER: &str = "api-key";

#[derive(Debug, Error)]
pub enum Error {
  #[error("request to {url} failed: {source}")]
  Transport {
    url: String,
    #[source]
    source: reqwest::Error,
  },
  #[error("malformed response body: {0}")]
  Decode(#[from] serde_json::Error),
  #[error("{0}")]
  BadRequest(String),
  #[error("Unauthorized: {0}")]
  Unauthorized(String),
  #[error("you have exceeded requests limit. See https://ipdata.co")]
  RateLimited,
  #[error("Unknown Error ({status}): {detail}")]
  UnknownApi { status: StatusCode, detail: String },
}

/// Body ipdata.co sends alongside a non-2xx status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  message: String,
}

/// Maps a non-2xx response onto the error taxonomy.
///
/// 429 never looks at the body. Every other status needs a decodable
/// `{"message": ...}` body to be classified; anything else is reported as
/// [`Error::UnknownApi`] with the decode failure as detail.
pub fn classify_failure(status: StatusCode, body: &str) -> Error {
  if status == StatusCode::TOO_MANY_REQUESTS {
    return Error::RateLimited;
  }

  match serde_json::from_str::<ErrorBody>(body) {
    Ok(ErrorBody { message }) => match status {
      StatusCode::BAD_REQUEST => Error::BadRequest(message),
      StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
      _ => Error::UnknownApi {
        status,
        detail: message,
      },
    },
    Err(e) => Error::UnknownApi {
      status,
      detail: format!("undecodable error body: {e}"),
    },
  }
}

/// Client for the ipdata.co lookup API.
///
/// One GET per lookup, no retries, no caching. Configuration is fixed once
/// the client is built.
#[derive(Debug, Clone)]
pub struct Client {
  http: reqwest::Client,
  base_url: String,
  api_key: Option<String>,
  user_agent: String,
}

impl Client {
  /// Builds a client against the public endpoint.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Transport`] if the underlying HTTP client cannot be
  /// initialised (e.g. no TLS backend available).
  pub fn new(user_agent: impl Into<String>) -> Result<Self, Error> {
    let http = reqwest::Client::builder()
      .build()
      .map_err(|source| Error::Transport {
        url: BASE_URL.to_string(),
        source,
      })?;

    Ok(Self {
      http,
      base_url: BASE_URL.to_string(),
      api_key: None,
      user_agent: user_agent.into(),
    })
  }

  /// Sets the API key. An empty key is the same as no key.
  #[must_use]
  pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
    self.api_key = api_key.filter(|key| !key.is_empty());
    self
  }

  /// Points the client at another endpoint, e.g. a mock server.
  #[must_use]
  pub fn with_base_url(mut self, base_url: &str) -> Self {
    self.base_url = base_url.trim_end_matches('/').to_string();
    self
  }

  /// Looks up the caller's own public address.
  ///
  /// # Errors
  ///
  /// See [`Client::fetch_for_address`].
  pub async fn fetch_self(&self) -> Result<Record, Error> {
    self.fetch("").await
  }

  /// Looks up `address`. The address is passed through as-is; the service
  /// decides whether it is valid.
  ///
  /// # Errors
  ///
  /// - [`Error::Transport`] if the request cannot be sent or the body read
  /// - [`Error::RateLimited`], [`Error::BadRequest`], [`Error::Unauthorized`]
  ///   or [`Error::UnknownApi`] for a non-2xx status
  /// - [`Error::Decode`] if a 2xx body is not a valid record
  pub async fn fetch_for_address(
    &self,
    address: &str,
  ) -> Result<Record, Error> {
    self.fetch(address).await
  }

  async fn fetch(&self, address: &str) -> Result<Record, Error> {
    let url = format!("{}/{address}", self.base_url);

    let mut request = self
      .http
      .get(&url)
      .header(header::ACCEPT, "application/json")
      .header(header::CONTENT_TYPE, "application/json")
      .header(header::USER_AGENT, &self.user_agent);
    if let Some(key) = &self.api_key {
      request = request.header(API_KEY_HEADER, key);
    }

    let transport = |source: reqwest::Error| Error::Transport {
      url: url.clone(),
      source,
    };

    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    let body = response.bytes().await.map_err(transport)?;

    if !status.is_success() {
      let text = String::from_utf8_lossy(&body);
      return Err(classify_failure(status, &text));
    }

    Ok(Record::from_bytes(&body)?)
  }
}
