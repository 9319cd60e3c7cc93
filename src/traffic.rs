use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::coerce::{float_or_zero, int_or_zero, is_falsy, round_to};
use crate::validate::{array_items, Partition, RejectReason};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSummary {
    /// Monthly points in date order, each passed through as-is.
    pub historical: Vec<Value>,
    pub visits_total_count: Value,
    pub average_monthly_visits: f64,
    pub visits_growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficSection {
    pub traffic: TrafficSummary,
    pub traffic_sources: Value,
    pub ranking: Value,
}

pub fn normalize_traffic(
    traffic: Option<&Value>,
    traffic_sources: Option<&Value>,
    ranking: Option<&Value>,
) -> TrafficSection {
    let historical = sort_historical(array_items(traffic, "historical").to_vec());

    let visits_total_count = match traffic.and_then(|t| t.get("visitsTotalCount")) {
        Some(total) if !total.is_null() => total.clone(),
        _ => Value::from(
            historical
                .iter()
                .map(|p| int_or_zero(p.get("visits")).unwrap_or(0))
                .sum::<i64>(),
        ),
    };

    TrafficSection {
        traffic: TrafficSummary {
            average_monthly_visits: average_visits(&historical),
            visits_growth_rate: growth_rate(&historical),
            historical,
            visits_total_count,
        },
        traffic_sources: object_or_empty(traffic_sources),
        ranking: object_or_empty(ranking),
    }
}

/// Orders points by their `date` string. If any point has no usable date the
/// input order is kept.
pub fn sort_historical(points: Vec<Value>) -> Vec<Value> {
    let keys = Partition::from_items(&points, date_key);
    if !keys.is_clean() {
        warn!(
            action = "sort",
            component = "traffic",
            unsortable = keys.dropped.len(),
            "Historical points have unusable dates, keeping input order"
        );
        return points;
    }

    let mut keyed: Vec<(String, Value)> = keys.valid.into_iter().zip(points).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, point)| point).collect()
}

fn date_key(point: &Value) -> Result<String, RejectReason> {
    let obj = point.as_object().ok_or(RejectReason::NotAnObject)?;
    match obj.get("date") {
        None => Ok(String::new()),
        Some(Value::String(date)) => Ok(date.clone()),
        Some(_) => Err(RejectReason::InvalidField("date")),
    }
}

fn point_visits(point: &Value) -> f64 {
    float_or_zero(point.get("visits")).unwrap_or(0.0)
}

/// Relative change from the first to the last point.
pub fn growth_rate(historical: &[Value]) -> f64 {
    let [first, .., last] = historical else {
        return 0.0;
    };
    let first = point_visits(first);
    if first <= 0.0 {
        return 0.0;
    }
    round_to((point_visits(last) - first) / first, 3)
}

#[allow(clippy::cast_precision_loss)]
pub fn average_visits(historical: &[Value]) -> f64 {
    if historical.is_empty() {
        return 0.0;
    }
    let total: f64 = historical.iter().map(point_visits).sum();
    round_to(total / historical.len() as f64, 2)
}

fn object_or_empty(value: Option<&Value>) -> Value {
    match value {
        Some(v) if !is_falsy(v) => v.clone(),
        _ => json!({}),
    }
}
