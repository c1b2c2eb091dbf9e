// HTTP client wrapper for the Weav AI services
//
// Every call carries the bearer token from the configuration and runs to
// completion before the next statement executes. Status classification lives
// here so the service modules only see typed errors.

use crate::config::Config;
use crate::error::Error;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

pub struct Client {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_weav_url, &config.token)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, method = %method, "issuing request");
        self.http.request(method, url).bearer_auth(&self.token)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let response = self.request(Method::GET, path).send().await?;
        Self::decode(response).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        Self::decode(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::decode(response).await
    }

    /// POST and hand back the checked response so the caller can consume the
    /// body as a stream.
    pub async fn post_stream<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, Error> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::check_status(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        Self::decode(response).await
    }

    /// PUT where only the status matters; the body is not decoded.
    pub async fn put_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), Error> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let response = self.request(Method::PATCH, path).json(body).send().await?;
        Self::decode(response).await
    }

    /// DELETE with a JSON body, as the chat-history endpoint expects.
    pub async fn delete_json<B: Serialize>(&self, path: &str, body: &B) -> Result<(), Error> {
        let response = self.request(Method::DELETE, path).json(body).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, Error> {
        let response = self
            .request(Method::POST, path)
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Classify the status code; 2xx passes the response through.
    async fn check_status(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            StatusCode::UNPROCESSABLE_ENTITY => {
                let detail = response.json().await.ok();
                Err(Error::Validation { detail })
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(Error::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }
}
