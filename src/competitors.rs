use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::coerce::{int_or_zero, to_float};
use crate::validate::{array_items, Partition, RejectReason};

/// Number of competitors kept after ranking.
pub const MAX_TOP_COMPETITORS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub domain: String,
    pub visits_total_count: u64,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitors {
    pub top_similarity_competitors: Vec<Competitor>,
    /// Every competitor that survived cleaning, not only the top entries.
    pub competitors_count: usize,
}

pub fn normalize_competitors(raw: Option<&Value>) -> Competitors {
    let cleaned = validate_competitors(array_items(raw, "topSimilarityCompetitors"));
    if !cleaned.is_clean() {
        debug!(
            action = "drop",
            component = "competitors",
            dropped = cleaned.dropped.len(),
            kept = cleaned.valid.len(),
            "Dropped malformed competitor entries"
        );
    }

    let mut ranked = cleaned.valid;
    let competitors_count = ranked.len();
    rank_competitors(&mut ranked);
    ranked.truncate(MAX_TOP_COMPETITORS);

    Competitors {
        top_similarity_competitors: ranked,
        competitors_count,
    }
}

pub fn validate_competitors(items: &[Value]) -> Partition<Competitor> {
    Partition::from_items(items, parse_competitor)
}

/// Highest similarity first, visits break ties. Equal entries keep their
/// input order.
pub fn rank_competitors(competitors: &mut [Competitor]) {
    competitors.sort_by(|a, b| {
        b.similarity_score
            .total_cmp(&a.similarity_score)
            .then_with(|| b.visits_total_count.cmp(&a.visits_total_count))
    });
}

fn parse_competitor(item: &Value) -> Result<Competitor, RejectReason> {
    let obj = item.as_object().ok_or(RejectReason::NotAnObject)?;

    let domain = match obj.get("domain") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if domain.is_empty() {
        return Err(RejectReason::EmptyDomain);
    }

    let visits = int_or_zero(obj.get("visitsTotalCount"))
        .ok_or(RejectReason::InvalidField("visitsTotalCount"))?;

    // An explicit zero is a real score; only a missing one defaults.
    let similarity = match obj.get("similarityScore") {
        None | Some(Value::Null) => 0.0,
        Some(v) => to_float(v).ok_or(RejectReason::InvalidField("similarityScore"))?,
    };

    Ok(Competitor {
        domain,
        visits_total_count: u64::try_from(visits).unwrap_or(0),
        similarity_score: similarity,
    })
}
