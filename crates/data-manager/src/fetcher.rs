//! Data fetching for charts

use crate::query::{self, FilterForm, QueryParams};
use futures::future::LocalBoxFuture;
use metrics_view_shared::{DataTable, MetricsPayload, MetricsViewResult};
use std::rc::Rc;

/// Something that answers a metrics query with a data table.
///
/// Implementations issue exactly one request per call and never retry.
pub trait MetricsSource {
    fn fetch<'a>(&'a self, query: &'a [(String, String)])
        -> LocalBoxFuture<'a, MetricsViewResult<DataTable>>;
}

/// Parse the endpoint's JSON body. A missing or empty `data` array yields an
/// empty table.
pub fn parse_body(body: &str) -> MetricsViewResult<DataTable> {
    let payload: MetricsPayload = serde_json::from_str(body)?;
    DataTable::try_from(payload)
}

/// Builds queries and runs them against a metrics source
#[derive(Clone)]
pub struct DataFetcher {
    source: Rc<dyn MetricsSource>,
}

impl DataFetcher {
    pub fn new(source: impl MetricsSource + 'static) -> Self {
        Self {
            source: Rc::new(source),
        }
    }

    pub fn from_shared(source: Rc<dyn MetricsSource>) -> Self {
        Self { source }
    }

    /// Build the query for one chart; see [`query::build_query`]
    pub fn build_query(&self, form: &FilterForm, chart_id: &str) -> MetricsViewResult<QueryParams> {
        query::build_query(form, chart_id)
    }

    /// Issue a single request for the query
    pub async fn fetch(&self, query: &QueryParams) -> MetricsViewResult<DataTable> {
        self.source.fetch(query).await
    }
}
