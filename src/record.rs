use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::competitors::{normalize_competitors, Competitors};
use crate::demographics::{normalize_demographics, Demographics};
use crate::source::RawPayload;
use crate::traffic::{normalize_traffic, TrafficSummary};

/// Flattened per-domain result. Field order is the output key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub domain: String,
    pub overview: Value,
    pub interests: Value,
    pub competitors: Competitors,
    pub searches_source: Value,
    pub incoming_referrals: Value,
    pub ads_source: Value,
    pub social_networks_source: Value,
    pub technologies: Value,
    pub recent_ads: Value,
    pub demographics: Demographics,
    pub geography: Value,
    pub traffic_sources: Value,
    pub ranking: Value,
    pub traffic: TrafficSummary,
}

pub fn build_record(raw: &RawPayload) -> OutputRecord {
    let domain = raw.domain().unwrap_or("unknown").to_string();
    debug!(action = "build", component = "record", domain = %domain, "Building record");

    let traffic = normalize_traffic(
        raw.section("traffic"),
        raw.section("trafficSources"),
        raw.section("ranking"),
    );
    let object = |key: &str| raw.section(key).cloned().unwrap_or_else(|| json!({}));
    let array = |key: &str| raw.section(key).cloned().unwrap_or_else(|| json!([]));

    OutputRecord {
        overview: object("overview"),
        interests: array("interests"),
        competitors: normalize_competitors(raw.section("competitors")),
        searches_source: object("searchesSource"),
        incoming_referrals: object("incomingReferrals"),
        ads_source: object("adsSource"),
        social_networks_source: object("socialNetworksSource"),
        technologies: array("technologies"),
        recent_ads: array("recentAds"),
        demographics: normalize_demographics(raw.section("demographics")),
        geography: object("geography"),
        traffic_sources: traffic.traffic_sources,
        ranking: traffic.ranking,
        traffic: traffic.traffic,
        domain,
    }
}
