//! HTTP metrics source
//!
//! Uses reqwest, which runs on top of the browser's fetch API in wasm builds.

use crate::fetcher::{parse_body, MetricsSource};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use metrics_view_shared::{DataTable, MetricsViewError, MetricsViewResult};
use url::Url;

/// Resolve the configured data URL. Relative URLs need the page's location
/// as `base`.
pub fn resolve_endpoint(data_url: &str, base: Option<&str>) -> MetricsViewResult<Url> {
    let invalid = |message: String| MetricsViewError::InvalidConfig {
        message,
        field: Some("dataUrl".to_string()),
    };

    match Url::parse(data_url) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| {
                invalid(format!("Relative data URL {data_url:?} needs a base location"))
            })?;
            Url::parse(base)
                .and_then(|base| base.join(data_url))
                .map_err(|e| invalid(format!("Cannot resolve {data_url:?} against {base:?}: {e}")))
        }
        Err(e) => Err(invalid(format!("Invalid data URL {data_url:?}: {e}"))),
    }
}

/// Fetches metric tables with `GET <endpoint>?<query>`
#[derive(Debug, Clone)]
pub struct HttpMetricsSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpMetricsSource {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    async fn get(&self, query: &[(String, String)]) -> MetricsViewResult<DataTable> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| MetricsViewError::DataFetch {
                message: format!("{e} (URL: {})", self.endpoint),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricsViewError::DataFetch {
                message: format!("HTTP {status} (URL: {})", self.endpoint),
            });
        }

        let body = response.text().await.map_err(|e| MetricsViewError::DataFetch {
            message: format!("Failed to read body: {e}"),
        })?;

        let table = parse_body(&body)?;
        log::debug!(
            "Fetched {} rows x {} columns from {}",
            table.row_count(),
            table.column_count(),
            self.endpoint
        );
        Ok(table)
    }
}

impl MetricsSource for HttpMetricsSource {
    fn fetch<'a>(
        &'a self,
        query: &'a [(String, String)],
    ) -> LocalBoxFuture<'a, MetricsViewResult<DataTable>> {
        self.get(query).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute() {
        let url = resolve_endpoint("https://carbon.local:9443/metrics/data", None).unwrap();
        assert_eq!(url.as_str(), "https://carbon.local:9443/metrics/data");
    }

    #[test]
    fn test_resolve_relative_against_page() {
        let url = resolve_endpoint(
            "metrics_ajaxprocessor.jsp",
            Some("https://carbon.local:9443/carbon/metrics-view/index.jsp?region=region1"),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://carbon.local:9443/carbon/metrics-view/metrics_ajaxprocessor.jsp"
        );
    }

    #[test]
    fn test_resolve_relative_without_base() {
        assert!(matches!(
            resolve_endpoint("data.jsp", None),
            Err(MetricsViewError::InvalidConfig { .. })
        ));
    }
}
