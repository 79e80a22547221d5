pub mod fitness_v1_types;
use async_google_apis_common as common;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;

use self::fitness_v1_types::{DataPoint, DataSource, Dataset, ListDataSourcesResponse};
use super::Provider;
use crate::auth::{current_credential, Authorizer};
use crate::error::FitError;
use crate::window::DatasetId;

pub use common::TlsClient;

const FITNESS_BASE_URL: &str = "https://www.googleapis.com/fitness/v1/users/";

/// Characters left alone in path segments and query values; everything else is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Builds the HTTPS client shared by the authenticator and the API calls.
pub fn https_client() -> TlsClient {
    let conn = hyper_rustls::HttpsConnector::with_native_roots();
    hyper::Client::builder().build(conn)
}

/// GoogleFitProvider - talks to the Google Fitness REST API on behalf of one user.
pub struct GoogleFitProvider {
    https_client: TlsClient,
    authorizer: Arc<dyn Authorizer>,
    user_id: String,
}

impl GoogleFitProvider {
    pub fn new(
        https_client: TlsClient,
        authorizer: Arc<dyn Authorizer>,
        user_id: impl Into<String>,
    ) -> GoogleFitProvider {
        GoogleFitProvider {
            https_client,
            authorizer,
            user_id: user_id.into(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        let credential = current_credential(self.authorizer.as_ref(), chrono::Utc::now()).await?;
        log::debug!("GET {}", url);

        let req = hyper::Request::builder()
            .method(hyper::Method::GET)
            .uri(url)
            .header(
                hyper::header::AUTHORIZATION,
                format!("Bearer {}", credential.access_token()),
            )
            .header(hyper::header::ACCEPT, "application/json")
            .body(hyper::Body::empty())?;

        let resp = self.https_client.request(req).await?;
        let status = resp.status();
        let body = hyper::body::to_bytes(resp.into_body()).await?;
        decode_response(status, &body)
    }
}

#[async_trait]
impl Provider for GoogleFitProvider {
    async fn list_data_sources(&self) -> anyhow::Result<Vec<DataSource>> {
        let url = data_sources_url(&self.user_id);
        let resp: ListDataSourcesResponse = self.get(&url).await?;
        let sources = resp.data_source.unwrap_or_default();
        log::debug!("{} data sources registered", sources.len());
        Ok(sources)
    }

    async fn dataset_points(
        &self,
        data_source_id: &str,
        dataset_id: &DatasetId,
    ) -> anyhow::Result<Vec<DataPoint>> {
        let user_id = self.user_id.as_str();
        collect_pages(move |page_token: Option<String>| {
            let url = dataset_url(user_id, data_source_id, dataset_id, page_token.as_deref());
            async move { self.get::<Dataset>(&url).await }
        })
        .await
    }
}

/// Turns a response into `T`, or into [`FitError::Api`] when the status is not 2xx.
fn decode_response<T: DeserializeOwned>(
    status: hyper::StatusCode,
    body: &[u8],
) -> anyhow::Result<T> {
    if !status.is_success() {
        return Err(FitError::Api {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
        .into());
    }
    Ok(serde_json::from_slice(body)?)
}

/// Reads a paged dataset to the end. `fetch` gets the token of the page to read (`None` for
/// the first); points come back in page order. A missing or empty `nextPageToken` stops.
async fn collect_pages<F, Fut>(mut fetch: F) -> anyhow::Result<Vec<DataPoint>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = anyhow::Result<Dataset>>,
{
    let mut points = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = fetch(page_token.take()).await?;
        points.extend(page.point.unwrap_or_default());
        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }
    Ok(points)
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn data_sources_url(user_id: &str) -> String {
    format!("{}{}/dataSources", FITNESS_BASE_URL, encode(user_id))
}

fn dataset_url(
    user_id: &str,
    data_source_id: &str,
    dataset_id: &DatasetId,
    page_token: Option<&str>,
) -> String {
    let mut url = format!(
        "{}{}/dataSources/{}/datasets/{}",
        FITNESS_BASE_URL,
        encode(user_id),
        encode(data_source_id),
        encode(dataset_id.as_str())
    );
    if let Some(token) = page_token {
        url.push_str("?pageToken=");
        url.push_str(&encode(token));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn page(starts: &[i64], next_page_token: Option<&str>) -> Dataset {
        Dataset {
            point: Some(
                starts
                    .iter()
                    .map(|&start| DataPoint {
                        start_time_nanos: Some(start),
                        ..DataPoint::default()
                    })
                    .collect(),
            ),
            next_page_token: next_page_token.map(str::to_string),
            ..Dataset::default()
        }
    }

    #[tokio::test]
    async fn pages_are_concatenated_in_order() {
        let mut pages: VecDeque<Dataset> = vec![
            page(&[1, 2], Some("second")),
            page(&[3], Some("third")),
            page(&[4, 5], Some("")),
        ]
        .into_iter()
        .collect();
        let mut requested = Vec::new();

        let points = collect_pages(|token| {
            requested.push(token);
            let next = pages.pop_front();
            async move { next.ok_or_else(|| anyhow::anyhow!("read past the last page")) }
        })
        .await
        .unwrap();

        let starts: Vec<i64> = points.iter().filter_map(|p| p.start_time_nanos).collect();
        assert_eq!(starts, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            requested,
            vec![None, Some("second".to_string()), Some("third".to_string())]
        );
    }

    #[tokio::test]
    async fn a_page_without_token_is_the_last() {
        let mut calls = 0;
        let points = collect_pages(|_| {
            calls += 1;
            async { Ok::<_, anyhow::Error>(page(&[7], None)) }
        })
        .await
        .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn a_failing_page_aborts_the_read() {
        let mut calls = 0;
        let err = collect_pages(|_| {
            calls += 1;
            let attempt = calls;
            async move {
                let result: anyhow::Result<Dataset> = if attempt == 1 {
                    Ok(page(&[1], Some("next")))
                } else {
                    Err(FitError::Api {
                        status: 500,
                        body: "backend error".to_string(),
                    }
                    .into())
                };
                result
            }
        })
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FitError>(),
            Some(FitError::Api { status: 500, .. })
        ));
        assert_eq!(calls, 2);
    }

    #[test]
    fn forbidden_status_surfaces_as_api_error() {
        let body = br#"{"error": {"code": 403, "message": "insufficient scope"}}"#;
        let err = decode_response::<Dataset>(hyper::StatusCode::FORBIDDEN, body).unwrap_err();
        match err.downcast_ref::<FitError>() {
            Some(FitError::Api { status, body }) => {
                assert_eq!(*status, 403);
                assert!(body.contains("insufficient scope"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn success_body_is_decoded() {
        let body = br#"{"point": [{"startTimeNanos": "5", "value": [{"fpVal": 70.5}]}]}"#;
        let dataset = decode_response::<Dataset>(hyper::StatusCode::OK, body).unwrap();
        let points = dataset.point.unwrap();
        assert_eq!(points[0].start_time_nanos, Some(5));
        assert!(dataset.next_page_token.is_none());
    }

    #[test]
    fn malformed_success_body_is_an_error() {
        assert!(decode_response::<Dataset>(hyper::StatusCode::OK, b"<html>").is_err());
    }

    #[test]
    fn data_sources_url_targets_the_user() {
        assert_eq!(
            data_sources_url("me"),
            "https://www.googleapis.com/fitness/v1/users/me/dataSources"
        );
    }

    #[test]
    fn dataset_url_escapes_the_source_id() {
        let id = DatasetId::from_nanos(1_000_000_000_000_000_000, 1_000_086_400_000_000_000);
        let url = dataset_url(
            "me",
            "derived:com.google.heart_rate.bpm:com.google.android.gms:merge_heart_rate_bpm",
            &id,
            None,
        );
        assert_eq!(
            url,
            "https://www.googleapis.com/fitness/v1/users/me/dataSources/\
             derived%3Acom.google.heart_rate.bpm%3Acom.google.android.gms%3Amerge_heart_rate_bpm\
             /datasets/1000000000000000000-1000086400000000000"
        );
    }

    #[test]
    fn page_token_goes_in_the_query() {
        let id = DatasetId::from_nanos(1, 2);
        let url = dataset_url("me", "raw", &id, Some("a/b+c="));
        assert!(url.ends_with("/datasets/1-2?pageToken=a%2Fb%2Bc%3D"));
    }
}
