//! Data crate for the metrics view
//! Builds per-chart queries from the filter form and fetches metric tables

pub mod fetcher;
pub mod http_client;
pub mod query;

pub use fetcher::{parse_body, DataFetcher, MetricsSource};
pub use http_client::{resolve_endpoint, HttpMetricsSource};
pub use query::{
    build_query, FilterForm, FromPreset, PresetUnit, QueryParams, RangeMode, CUSTOM_RANGE, FROM_FIELD,
};
