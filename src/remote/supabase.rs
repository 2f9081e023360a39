//! Supabase Storage backend
//!
//! Documents live in one bucket, keyed by `{comic-slug}/{doc}.json`. All
//! requests go through the shared retry policy; uploads use the upsert
//! header so a re-run overwrites rather than conflicts.

use crate::harvest::fetcher::{classify_send_error, classify_status};
use crate::harvest::retry::RetryPolicy;
use crate::remote::traits::{ObjectEntry, ObjectStore, RemoteResult};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;

/// Supabase Storage list API page size
const LIST_PAGE_SIZE: usize = 100;

pub struct SupabaseStore {
    client: Client,
    endpoint: String,
    bucket: String,
    api_key: String,
    retry: RetryPolicy,
}

impl SupabaseStore {
    pub fn new(
        client: Client,
        endpoint: &str,
        bucket: &str,
        api_key: &str,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            api_key: api_key.to_string(),
            retry,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.endpoint, self.bucket, path
        )
    }

    fn list_url(&self) -> String {
        format!("{}/storage/v1/object/list/{}", self.endpoint, self.bucket)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
    }
}

/// One item of a Supabase list response; folders come back without an id
#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
    id: Option<String>,
}

#[async_trait]
impl ObjectStore for SupabaseStore {
    async fn get(&self, path: &str) -> RemoteResult<Option<Vec<u8>>> {
        let url = self.object_url(path);

        let bytes = self
            .retry
            .run(&url, || {
                let url = url.clone();
                async move {
                    let response = self
                        .authed(self.client.get(&url))
                        .send()
                        .await
                        .map_err(|e| classify_send_error(&url, e))?;

                    // Absent objects are a normal outcome, not an error; the
                    // storage API reports them as 404 or 400 depending on
                    // version
                    if response.status() == StatusCode::NOT_FOUND
                        || response.status() == StatusCode::BAD_REQUEST
                    {
                        return Ok(None);
                    }

                    let response = classify_status(&url, response)?;
                    let bytes = response.bytes().await.map_err(|e| FetchError::Network {
                        url: url.clone(),
                        message: e.to_string(),
                    })?;

                    Ok(Some(bytes.to_vec()))
                }
            })
            .await?;

        Ok(bytes)
    }

    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> RemoteResult<()> {
        let url = self.object_url(path);

        self.retry
            .run(&url, || {
                let body = bytes.clone();
                let url = url.clone();
                async move {
                    let response = self
                        .authed(self.client.post(&url))
                        .header("x-upsert", "true")
                        .header(reqwest::header::CONTENT_TYPE, content_type)
                        .body(body)
                        .send()
                        .await
                        .map_err(|e| classify_send_error(&url, e))?;

                    classify_status(&url, response)?;
                    Ok(())
                }
            })
            .await?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> RemoteResult<Vec<ObjectEntry>> {
        let url = self.list_url();
        let mut entries = Vec::new();
        let mut offset = 0usize;

        loop {
            let body = serde_json::json!({
                "prefix": prefix,
                "limit": LIST_PAGE_SIZE,
                "offset": offset,
                "sortBy": { "column": "name", "order": "asc" },
            });

            let items: Vec<ListItem> = self
                .retry
                .run(&url, || {
                    let body = body.clone();
                    let url = url.clone();
                    async move {
                        let response = self
                            .authed(self.client.post(&url))
                            .json(&body)
                            .send()
                            .await
                            .map_err(|e| classify_send_error(&url, e))?;

                        let response = classify_status(&url, response)?;
                        response.json().await.map_err(|e| FetchError::Network {
                            url: url.clone(),
                            message: e.to_string(),
                        })
                    }
                })
                .await?;

            let count = items.len();
            entries.extend(items.into_iter().map(|item| ObjectEntry {
                is_prefix: item.id.is_none(),
                name: item.name,
            }));

            // A short page means the listing is exhausted
            if count < LIST_PAGE_SIZE {
                break;
            }
            offset += LIST_PAGE_SIZE;
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> SupabaseStore {
        SupabaseStore::new(
            Client::new(),
            &server.uri(),
            "manga-data",
            "test-key",
            RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(2)),
        )
    }

    #[tokio::test]
    async fn test_get_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/object/manga-data/foo/chapters.json"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"slug":"foo"}"#))
            .mount(&server)
            .await;

        let bytes = store(&server).get("foo/chapters.json").await.unwrap();
        assert_eq!(bytes.unwrap(), br#"{"slug":"foo"}"#);
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/object/manga-data/foo/chapters.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let bytes = store(&server).get("foo/chapters.json").await.unwrap();
        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn test_put_upserts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/manga-data/foo/metadata.json"))
            .and(header("x-upsert", "true"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .put(
                "foo/metadata.json",
                br#"{"slug":"foo"}"#.to_vec(),
                "application/json",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_marks_folders() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/list/manga-data"))
            .and(body_partial_json(serde_json::json!({ "prefix": "" })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[
                    {"name": "solo-leveling", "id": null},
                    {"name": "comics-list.json", "id": "3f6e"}
                ]"#,
            ))
            .mount(&server)
            .await;

        let entries = store(&server).list("").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_prefix);
        assert!(!entries[1].is_prefix);
    }
}
