//! Query building for the metrics endpoint
//!
//! A query is the filter form's fields in order, followed by the chart id
//! and, for custom ranges, the upper bound.

use chrono::{DateTime, Duration, Utc};
use metrics_view_shared::{MetricsViewError, MetricsViewResult, RangeBound, TimeRange};
use once_cell::sync::Lazy;
use regex::Regex;

/// Form field holding the time range preset
pub const FROM_FIELD: &str = "from";
/// Query parameter carrying the custom range's upper bound
pub const TO_FIELD: &str = "to";
/// Query parameter carrying the chart id
pub const TYPE_FIELD: &str = "type";
/// Value of the `from` field selecting a custom range
pub const CUSTOM_RANGE: &str = "custom";

/// Ordered `(name, value)` pairs sent as the query string
pub type QueryParams = Vec<(String, String)>;

// Same grammar the endpoint accepts: a signed count followed by a unit
static RELATIVE_PRESET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(-?\d+)([hdm])").expect("static regex"));

/// Unit of a relative time range preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetUnit {
    Minutes,
    Hours,
    Days,
}

/// A parsed value of the `from` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FromPreset {
    /// Offset from now, e.g. `-1h`
    Relative { count: i64, unit: PresetUnit },
    /// Absolute start in epoch milliseconds
    Absolute(i64),
}

impl FromPreset {
    pub fn parse(value: &str) -> Option<Self> {
        if let Some(caps) = RELATIVE_PRESET.captures(value) {
            let count = caps[1].parse().ok()?;
            let unit = match &caps[2] {
                "m" => PresetUnit::Minutes,
                "h" => PresetUnit::Hours,
                _ => PresetUnit::Days,
            };
            return Some(FromPreset::Relative { count, unit });
        }

        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            return value.parse().ok().map(FromPreset::Absolute);
        }

        None
    }

    /// Start of the window this preset describes, relative to `now`.
    /// `None` when the offset does not fit a timestamp.
    pub fn start_millis(&self, now: DateTime<Utc>) -> Option<i64> {
        match *self {
            FromPreset::Relative { count, unit } => {
                let offset = match unit {
                    PresetUnit::Minutes => Duration::try_minutes(count),
                    PresetUnit::Hours => Duration::try_hours(count),
                    PresetUnit::Days => Duration::try_days(count),
                }?;
                now.checked_add_signed(offset).map(|t| t.timestamp_millis())
            }
            FromPreset::Absolute(millis) => Some(millis),
        }
    }
}

/// How the `from` field selects the time window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeMode {
    Custom,
    Preset(String),
    Unspecified,
}

/// Current state of the filter form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterForm {
    fields: QueryParams,
    custom_from: Option<DateTime<Utc>>,
    custom_to: Option<DateTime<Utc>>,
}

impl FilterForm {
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace a field's value, appending the field if the form lacks it
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Set the custom range pickers from epoch milliseconds
    pub fn set_custom_range(&mut self, from: Option<i64>, to: Option<i64>) {
        self.custom_from = from.and_then(DateTime::<Utc>::from_timestamp_millis);
        self.custom_to = to.and_then(DateTime::<Utc>::from_timestamp_millis);
    }

    pub fn custom_from(&self) -> Option<DateTime<Utc>> {
        self.custom_from
    }

    pub fn custom_to(&self) -> Option<DateTime<Utc>> {
        self.custom_to
    }

    pub fn range_mode(&self) -> RangeMode {
        match self.field(FROM_FIELD) {
            Some(CUSTOM_RANGE) => RangeMode::Custom,
            Some(preset) => RangeMode::Preset(preset.to_string()),
            None => RangeMode::Unspecified,
        }
    }

    /// The custom range, or which of its bounds are missing
    pub fn custom_range(&self) -> MetricsViewResult<TimeRange> {
        match (self.custom_from, self.custom_to) {
            (Some(from), Some(to)) => Ok(TimeRange::new(from.timestamp_millis(), to.timestamp_millis())),
            (from, to) => {
                let mut missing = Vec::new();
                if from.is_none() {
                    missing.push(RangeBound::From);
                }
                if to.is_none() {
                    missing.push(RangeBound::To);
                }
                Err(MetricsViewError::MissingRangeBound { missing })
            }
        }
    }
}

/// Build the query for one chart.
///
/// Fails with a validation error, and nothing must be fetched, when a custom
/// range lacks a bound or the `from` preset does not resolve to a start time.
pub fn build_query(form: &FilterForm, chart_id: &str) -> MetricsViewResult<QueryParams> {
    let mut params = form.fields.clone();
    params.push((TYPE_FIELD.to_string(), chart_id.to_string()));

    match form.range_mode() {
        RangeMode::Custom => {
            let range = form.custom_range()?;
            if range.start > range.end {
                log::warn!("Custom range for {chart_id} ends before it starts");
            }
            if let Some(from) = params.iter_mut().find(|(k, _)| k == FROM_FIELD) {
                from.1 = range.start.to_string();
            }
            params.push((TO_FIELD.to_string(), range.end.to_string()));
        }
        RangeMode::Preset(value) => {
            let start = FromPreset::parse(&value).and_then(|preset| preset.start_millis(Utc::now()));
            match start {
                Some(start) => log::debug!("{chart_id} window starts at {start}"),
                None => return Err(MetricsViewError::InvalidFromPreset { value }),
            }
        }
        RangeMode::Unspecified => {}
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(params: &QueryParams) -> Vec<(&str, &str)> {
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn test_preset_query_appends_type() {
        let form = FilterForm::new([("source", "carbon-1"), ("from", "-1h")]);
        let params = build_query(&form, "memory").unwrap();

        assert_eq!(
            pairs(&params),
            [("source", "carbon-1"), ("from", "-1h"), ("type", "memory")]
        );
    }

    #[test]
    fn test_custom_range_overwrites_from() {
        let mut form = FilterForm::new([("source", "carbon-1"), ("from", "custom")]);
        form.set_custom_range(Some(1_438_000_000_000), Some(1_438_003_600_000));

        let params = build_query(&form, "cpu").unwrap();
        assert_eq!(
            pairs(&params),
            [
                ("source", "carbon-1"),
                ("from", "1438000000000"),
                ("type", "cpu"),
                ("to", "1438003600000"),
            ]
        );
    }

    #[test]
    fn test_custom_range_missing_upper_bound() {
        let mut form = FilterForm::new([("source", "carbon-1"), ("from", "custom")]);
        form.set_custom_range(Some(1_438_000_000_000), None);

        assert_eq!(
            build_query(&form, "cpu"),
            Err(MetricsViewError::MissingRangeBound {
                missing: vec![RangeBound::To]
            })
        );

        form.set_custom_range(None, None);
        assert_eq!(
            build_query(&form, "cpu"),
            Err(MetricsViewError::MissingRangeBound {
                missing: vec![RangeBound::From, RangeBound::To]
            })
        );
    }

    #[test]
    fn test_invalid_preset_is_rejected() {
        let form = FilterForm::new([("from", "yesterday")]);
        assert!(matches!(
            build_query(&form, "cpu"),
            Err(MetricsViewError::InvalidFromPreset { .. })
        ));

        let form = FilterForm::new([("from", "")]);
        assert!(build_query(&form, "cpu").is_err());

        // parses, but reaches past any representable timestamp
        let form = FilterForm::new([("from", "-99999999999999d")]);
        assert_eq!(
            build_query(&form, "cpu"),
            Err(MetricsViewError::InvalidFromPreset {
                value: "-99999999999999d".to_string()
            })
        );

        // no from field at all is passed through untouched
        let form = FilterForm::new([("source", "carbon-1")]);
        assert!(build_query(&form, "cpu").is_ok());
    }

    #[test]
    fn test_from_preset_grammar() {
        assert_eq!(
            FromPreset::parse("-30m"),
            Some(FromPreset::Relative {
                count: -30,
                unit: PresetUnit::Minutes
            })
        );
        assert_eq!(
            FromPreset::parse("-1d"),
            Some(FromPreset::Relative {
                count: -1,
                unit: PresetUnit::Days
            })
        );
        assert_eq!(
            FromPreset::parse("1438000000000"),
            Some(FromPreset::Absolute(1_438_000_000_000))
        );
        assert_eq!(FromPreset::parse("-1w"), None);
    }

    #[test]
    fn test_from_preset_start() {
        let now = DateTime::<Utc>::from_timestamp_millis(10 * 3_600_000).unwrap();
        let preset = FromPreset::parse("-2h").unwrap();
        assert_eq!(preset.start_millis(now), Some(8 * 3_600_000));
        assert_eq!(FromPreset::Absolute(42).start_millis(now), Some(42));

        let far = FromPreset::Relative {
            count: i64::MAX / 2,
            unit: PresetUnit::Days,
        };
        assert_eq!(far.start_millis(now), None);
    }

    #[test]
    fn test_set_field_replaces_in_place() {
        let mut form = FilterForm::new([("source", "a"), ("from", "-1h")]);
        form.set_field("source", "b");
        form.set_field("extra", "x");

        assert_eq!(
            pairs(&form.fields().to_vec()),
            [("source", "b"), ("from", "-1h"), ("extra", "x")]
        );
    }
}
