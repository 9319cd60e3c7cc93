use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::coerce::{float_or_zero, round_to, to_int};
use crate::validate::{array_items, Partition, RejectReason};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBucket {
    pub min_age: i64,
    pub max_age: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenderSplit {
    pub male: f64,
    pub female: f64,
}

impl Default for GenderSplit {
    fn default() -> Self {
        Self {
            male: 0.5,
            female: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub age_distribution: Vec<AgeBucket>,
    pub gender_distribution: GenderSplit,
}

/// Normalizes the `demographics` section of a payload.
///
/// Age buckets come back sorted by `minAge` with values expressed as
/// fractions of the total; the gender split is rescaled to sum to one.
pub fn normalize_demographics(raw: Option<&Value>) -> Demographics {
    let buckets = validate_age_buckets(array_items(raw, "ageDistribution"));
    if !buckets.is_clean() {
        debug!(
            action = "drop",
            component = "demographics",
            dropped = buckets.dropped.len(),
            kept = buckets.valid.len(),
            "Dropped malformed age buckets"
        );
    }

    let gender = raw
        .and_then(|r| r.get("genderDistribution"))
        .and_then(Value::as_object);

    Demographics {
        age_distribution: normalize_age_buckets(buckets.valid),
        gender_distribution: normalize_gender(gender),
    }
}

pub fn validate_age_buckets(items: &[Value]) -> Partition<AgeBucket> {
    Partition::from_items(items, parse_age_bucket)
}

fn parse_age_bucket(item: &Value) -> Result<AgeBucket, RejectReason> {
    let obj = item.as_object().ok_or(RejectReason::NotAnObject)?;
    let min_age = required_int(obj, "minAge")?;
    let max_age = required_int(obj, "maxAge")?;
    let value = float_or_zero(obj.get("value")).ok_or(RejectReason::InvalidField("value"))?;
    Ok(AgeBucket {
        min_age,
        max_age,
        value: value.max(0.0),
    })
}

fn required_int(obj: &Map<String, Value>, field: &'static str) -> Result<i64, RejectReason> {
    let value = obj.get(field).ok_or(RejectReason::MissingField(field))?;
    to_int(value).ok_or(RejectReason::InvalidField(field))
}

/// Sorts buckets by lower bound and rewrites their values as fractions.
pub fn normalize_age_buckets(mut buckets: Vec<AgeBucket>) -> Vec<AgeBucket> {
    buckets.sort_by_key(|b| b.min_age);
    let values: Vec<f64> = buckets.iter().map(|b| b.value).collect();
    for (bucket, fraction) in buckets.iter_mut().zip(fractions(&values)) {
        bucket.value = round_to(fraction, 3);
    }
    buckets
}

pub fn normalize_gender(raw: Option<&Map<String, Value>>) -> GenderSplit {
    let read = |key: &str| float_or_zero(raw.and_then(|g| g.get(key)));
    let (male, female) = match (read("male"), read("female")) {
        (Some(m), Some(f)) => (m.max(0.0), f.max(0.0)),
        _ => (0.0, 0.0),
    };

    if male <= 0.0 && female <= 0.0 {
        return GenderSplit::default();
    }

    let split = fractions(&[male, female]);
    GenderSplit {
        male: round_to(split[0], 3),
        female: round_to(split[1], 3),
    }
}

/// Each value as a share of the total, or equal shares when nothing is
/// positive.
#[allow(clippy::cast_precision_loss)]
fn fractions(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        let n = values.len() as f64;
        return vec![1.0 / n; values.len()];
    }
    values.iter().map(|v| v / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn demographics(raw: Value) -> Demographics {
        normalize_demographics(Some(&raw))
    }

    #[test]
    fn zero_gender_defaults_to_even_split() {
        let d = demographics(json!({"genderDistribution": {"male": 0, "female": 0}}));
        assert_eq!(d.gender_distribution, GenderSplit { male: 0.5, female: 0.5 });

        let d = demographics(json!({}));
        assert_eq!(d.gender_distribution, GenderSplit { male: 0.5, female: 0.5 });
    }

    #[test]
    fn gender_is_rescaled_to_one() {
        let d = demographics(json!({"genderDistribution": {"male": 30, "female": 10}}));
        assert_eq!(d.gender_distribution, GenderSplit { male: 0.75, female: 0.25 });

        let d = demographics(json!({"genderDistribution": {"male": "2", "female": 1}}));
        assert_eq!(d.gender_distribution, GenderSplit { male: 0.667, female: 0.333 });
    }

    #[test]
    fn bad_gender_value_zeroes_both_fields() {
        let d = demographics(json!({"genderDistribution": {"male": "lots", "female": 0.9}}));
        assert_eq!(d.gender_distribution, GenderSplit::default());
    }

    #[test]
    fn all_zero_buckets_get_equal_weight() {
        let d = demographics(json!({"ageDistribution": [
            {"minAge": 18, "maxAge": 24, "value": 0},
            {"minAge": 25, "maxAge": 34, "value": 0}
        ]}));
        let values: Vec<f64> = d.age_distribution.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![0.5, 0.5]);
    }

    #[test]
    fn buckets_are_sorted_and_sum_to_one() {
        let d = demographics(json!({"ageDistribution": [
            {"minAge": 45, "maxAge": 54, "value": 12.0},
            {"minAge": 18, "maxAge": 24, "value": 20.0},
            {"minAge": 25, "maxAge": 34, "value": 31.0},
            {"minAge": 35, "maxAge": 44, "value": 17.0}
        ]}));
        let mins: Vec<i64> = d.age_distribution.iter().map(|b| b.min_age).collect();
        assert_eq!(mins, vec![18, 25, 35, 45]);

        let sum: f64 = d.age_distribution.iter().map(|b| b.value).sum();
        assert!((sum - 1.0).abs() <= 0.001 * 4.0, "sum was {sum}");
        assert_eq!(d.age_distribution[0].value, 0.25);
    }

    #[test]
    fn malformed_buckets_are_dropped_individually() {
        let items = vec![
            json!({"minAge": 18, "maxAge": 24, "value": 1}),
            json!({"minAge": "teen", "maxAge": 19, "value": 1}),
            json!({"maxAge": 64, "value": 1}),
            json!("not a bucket"),
            json!({"minAge": "25", "maxAge": 34.0, "value": null}),
        ];
        let part = validate_age_buckets(&items);
        assert_eq!(part.valid.len(), 2);
        assert_eq!(part.valid[1], AgeBucket { min_age: 25, max_age: 34, value: 0.0 });

        let reasons: Vec<RejectReason> = part.dropped.into_iter().map(|r| r.reason).collect();
        assert_eq!(
            reasons,
            vec![
                RejectReason::InvalidField("minAge"),
                RejectReason::MissingField("minAge"),
                RejectReason::NotAnObject,
            ]
        );
    }

    #[test]
    fn non_array_age_distribution_is_empty() {
        let d = demographics(json!({"ageDistribution": {"18-24": 0.3}}));
        assert!(d.age_distribution.is_empty());
    }

    #[test]
    fn normalizing_twice_is_stable() {
        let first = demographics(json!({
            "ageDistribution": [
                {"minAge": 25, "maxAge": 34, "value": 3},
                {"minAge": 18, "maxAge": 24, "value": 1}
            ],
            "genderDistribution": {"male": 6, "female": 2}
        }));
        let again = demographics(serde_json::to_value(&first).unwrap());
        assert_eq!(first, again);
    }
}
