//! Deterministic synthetic analytics payloads.
//!
//! Stands in for a live analytics backend. Every domain maps to its own
//! seeded RNG, so repeated runs against the same anchor month produce
//! identical payloads. The generated sections are deliberately raw (shuffled
//! history, unnormalized age buckets, more competitors than are kept) so the
//! normalizers have real work to do.

use chrono::{Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::debug;

use crate::coerce::round_to;
use crate::source::{FetchError, PayloadSource, RawPayload};

const HISTORY_MONTHS: u32 = 6;
const COMPETITOR_COUNT: usize = 12;

const AGE_BUCKETS: [(i64, i64); 6] = [(18, 24), (25, 34), (35, 44), (45, 54), (55, 64), (65, 120)];
const TRAFFIC_CHANNELS: [&str; 7] = [
    "direct",
    "search",
    "social",
    "referrals",
    "mail",
    "paidReferrals",
    "displayAds",
];
const CATEGORIES: [&str; 8] = [
    "Computers_Electronics_and_Technology",
    "E-commerce_and_Shopping",
    "News_and_Media",
    "Finance",
    "Travel_and_Tourism",
    "Arts_and_Entertainment",
    "Health",
    "Science_and_Education",
];
const INTERESTS: [&str; 10] = [
    "Programming",
    "Online Shopping",
    "Personal Finance",
    "Video Games",
    "Travel",
    "Fitness",
    "Music Streaming",
    "Startups",
    "Photography",
    "Cooking",
];
const TECHNOLOGIES: [(&str, &str); 8] = [
    ("Analytics", "Google Analytics"),
    ("CDN", "Cloudflare"),
    ("JavaScript Framework", "React"),
    ("Web Server", "nginx"),
    ("Tag Manager", "Google Tag Manager"),
    ("Payments", "Stripe"),
    ("Hosting", "Amazon Web Services"),
    ("A/B Testing", "Optimizely"),
];
const COUNTRIES: [&str; 8] = ["US", "GB", "DE", "IN", "FR", "CA", "BR", "JP"];
const TLDS: [&str; 4] = ["com", "net", "io", "co"];
const PREFIXES: [&str; 6] = ["get", "my", "the", "try", "go", "use"];
const SOCIAL_NETWORKS: [&str; 5] = ["YouTube", "Reddit", "Facebook", "LinkedIn", "X"];
const AD_NETWORKS: [&str; 4] = ["Google Display Network", "Taboola", "Outbrain", "Criteo"];
const KEYWORDS: [&str; 6] = ["login", "pricing", "reviews", "alternatives", "download", "support"];

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    anchor: NaiveDate,
}

impl SyntheticSource {
    /// Payload history ends at the month containing `anchor`.
    pub fn new(anchor: NaiveDate) -> Self {
        Self { anchor }
    }

    pub fn generate(&self, domain: &str) -> Value {
        let mut rng = StdRng::seed_from_u64(seed_for(domain));
        let name = domain.split('.').next().unwrap_or(domain);
        let base_visits = rng.random_range(50_000..20_000_000u64) as f64;

        json!({
            "domain": domain,
            "overview": overview(&mut rng, domain, name),
            "traffic": traffic(&mut rng, self.anchor, base_visits),
            "trafficSources": shares_map(&mut rng, &TRAFFIC_CHANNELS),
            "ranking": ranking(&mut rng),
            "demographics": demographics(&mut rng),
            "competitors": competitors(&mut rng, name, base_visits),
            "interests": pick(&mut rng, &INTERESTS, 5),
            "technologies": technologies(&mut rng),
            "recentAds": recent_ads(&mut rng, self.anchor, domain),
            "geography": {
                "topCountries": named_shares(&mut rng, &COUNTRIES, 5, "countryCode", "visitsShare"),
            },
            "searchesSource": {
                "organicShare": round_to(rng.random_range(0.5..0.95), 3),
                "topKeywords": pick(&mut rng, &KEYWORDS, 4)
                    .into_iter()
                    .map(|k| json!({ "keyword": format!("{name} {k}"), "share": round_to(rng.random_range(0.01..0.2), 3) }))
                    .collect::<Vec<_>>(),
            },
            "incomingReferrals": {
                "topReferrals": (0..3)
                    .map(|_| json!({ "domain": competitor_domain(&mut rng, name), "share": round_to(rng.random_range(0.01..0.3), 3) }))
                    .collect::<Vec<_>>(),
            },
            "adsSource": {
                "topAdNetworks": named_shares(&mut rng, &AD_NETWORKS, 3, "name", "share"),
            },
            "socialNetworksSource": {
                "topSocialNetworks": named_shares(&mut rng, &SOCIAL_NETWORKS, 4, "name", "share"),
            },
        })
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl PayloadSource for SyntheticSource {
    fn fetch(&self, domain: &str) -> Result<RawPayload, FetchError> {
        if domain.trim().is_empty() {
            return Err(FetchError::InvalidPayload {
                domain: domain.to_string(),
                reason: "domain is empty".to_string(),
            });
        }
        debug!(action = "generate", component = "synthetic_source", domain, "Generating synthetic analytics");
        let payload = RawPayload::from_value(domain, self.generate(domain))?;
        debug!(
            action = "generated",
            component = "synthetic_source",
            domain,
            sections = ?payload.keys().collect::<Vec<_>>(),
            "Generated payload"
        );
        Ok(payload)
    }
}

/// FNV-1a, stable across platforms and releases.
fn seed_for(domain: &str) -> u64 {
    domain
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3))
}

fn overview(rng: &mut StdRng, domain: &str, name: &str) -> Value {
    let mut title: Vec<char> = name.chars().collect();
    if let Some(first) = title.first_mut() {
        *first = first.to_ascii_uppercase();
    }
    let title: String = title.into_iter().collect();
    let category = CATEGORIES[rng.random_range(0..CATEGORIES.len())];
    json!({
        "siteName": domain,
        "title": title,
        "description": format!("{title} is a website in the {} category.", category.replace('_', " ")),
        "category": category,
        "averageVisitDurationSeconds": rng.random_range(30..900u32),
        "pagesPerVisit": round_to(rng.random_range(1.2..9.0), 2),
        "bounceRate": round_to(rng.random_range(0.2..0.8), 3),
    })
}

fn traffic(rng: &mut StdRng, anchor: NaiveDate, base_visits: f64) -> Value {
    let mut historical: Vec<Value> = (0..HISTORY_MONTHS)
        .filter_map(|offset| anchor.checked_sub_months(Months::new(offset)))
        .map(|month| {
            let visits = (base_visits * rng.random_range(0.8..1.2)).round() as u64;
            json!({
                "date": month.format("%Y-%m").to_string(),
                "visits": visits,
                "uniqueVisitors": (visits as f64 * rng.random_range(0.4..0.7)).round() as u64,
            })
        })
        .collect();
    historical.shuffle(rng);

    let mut traffic = json!({ "historical": historical });
    // Some payloads carry their own total, the rest leave it to the consumer.
    if rng.random_bool(0.5) {
        traffic["visitsTotalCount"] = json!((base_visits * f64::from(HISTORY_MONTHS)).round() as u64);
    }
    traffic
}

fn ranking(rng: &mut StdRng) -> Value {
    let global = rng.random_range(100..2_000_000u64);
    json!({
        "globalRank": global,
        "countryRank": {
            "countryCode": COUNTRIES[rng.random_range(0..COUNTRIES.len())],
            "rank": global / rng.random_range(2..20u64) + 1,
        },
        "categoryRank": {
            "category": CATEGORIES[rng.random_range(0..CATEGORIES.len())],
            "rank": global / rng.random_range(20..200u64) + 1,
        },
    })
}

fn demographics(rng: &mut StdRng) -> Value {
    let mut buckets: Vec<Value> = AGE_BUCKETS
        .iter()
        .map(|(min_age, max_age)| {
            json!({ "minAge": min_age, "maxAge": max_age, "value": round_to(rng.random_range(5.0..40.0), 1) })
        })
        .collect();
    buckets.shuffle(rng);

    let male = round_to(rng.random_range(30.0..70.0), 1);
    json!({
        "ageDistribution": buckets,
        "genderDistribution": { "male": male, "female": round_to(100.0 - male, 1) },
    })
}

fn competitors(rng: &mut StdRng, name: &str, base_visits: f64) -> Value {
    let list: Vec<Value> = (0..COMPETITOR_COUNT)
        .map(|_| {
            json!({
                "domain": competitor_domain(rng, name),
                "visitsTotalCount": (base_visits * rng.random_range(0.05..3.0)).round() as u64,
                "similarityScore": round_to(rng.random_range(0.3..0.99), 3),
            })
        })
        .collect();
    json!({ "topSimilarityCompetitors": list })
}

fn competitor_domain(rng: &mut StdRng, name: &str) -> String {
    let prefix = PREFIXES[rng.random_range(0..PREFIXES.len())];
    let tld = TLDS[rng.random_range(0..TLDS.len())];
    format!("{prefix}{name}{}.{tld}", rng.random_range(1..100u32))
}

fn technologies(rng: &mut StdRng) -> Value {
    let mut stack = TECHNOLOGIES.to_vec();
    stack.shuffle(rng);
    stack
        .into_iter()
        .take(4)
        .map(|(category, name)| json!({ "category": category, "name": name }))
        .collect()
}

fn recent_ads(rng: &mut StdRng, anchor: NaiveDate, domain: &str) -> Value {
    (0..3u32)
        .map(|i| {
            let seen = anchor.checked_sub_months(Months::new(i)).unwrap_or(anchor);
            json!({
                "title": format!("{domain} offer #{}", rng.random_range(100..1000u32)),
                "landingPage": format!("https://{domain}/promo/{}", i + 1),
                "firstSeen": seen.format("%Y-%m-%d").to_string(),
            })
        })
        .collect()
}

fn pick(rng: &mut StdRng, pool: &[&'static str], n: usize) -> Vec<&'static str> {
    let mut picked = pool.to_vec();
    picked.shuffle(rng);
    picked.truncate(n);
    picked
}

fn shares(rng: &mut StdRng, n: usize) -> Vec<f64> {
    let weights: Vec<f64> = (0..n).map(|_| rng.random_range(0.05..1.0)).collect();
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| round_to(w / total, 3)).collect()
}

fn shares_map(rng: &mut StdRng, keys: &[&str]) -> Value {
    let split = shares(rng, keys.len());
    keys.iter()
        .zip(split)
        .map(|(k, share)| ((*k).to_string(), json!(share)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn named_shares(rng: &mut StdRng, pool: &[&'static str], n: usize, name_key: &str, share_key: &str) -> Value {
    let names = pick(rng, pool, n);
    let split = shares(rng, names.len());
    names
        .into_iter()
        .zip(split)
        .map(|(name, share)| {
            let mut entry = serde_json::Map::new();
            entry.insert(name_key.to_string(), json!(name));
            entry.insert(share_key.to_string(), json!(share));
            Value::Object(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SyntheticSource {
        SyntheticSource::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn same_domain_same_payload() {
        let src = source();
        assert_eq!(src.generate("example.com"), src.generate("example.com"));
        assert_ne!(src.generate("example.com"), src.generate("example.org"));
    }

    #[test]
    fn payload_has_every_section() {
        let payload = source().fetch("example.com").unwrap();
        for key in [
            "domain",
            "overview",
            "traffic",
            "trafficSources",
            "ranking",
            "demographics",
            "competitors",
            "interests",
            "technologies",
            "recentAds",
            "geography",
            "searchesSource",
            "incomingReferrals",
            "adsSource",
            "socialNetworksSource",
        ] {
            assert!(payload.section(key).is_some(), "missing section {key}");
        }
        assert_eq!(payload.domain(), Some("example.com"));
    }

    #[test]
    fn history_covers_six_months_ending_at_anchor() {
        let payload = source().generate("example.com");
        let mut dates: Vec<&str> = payload["traffic"]["historical"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["date"].as_str())
            .collect();
        dates.sort_unstable();
        assert_eq!(dates, vec!["2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06"]);
    }

    #[test]
    fn generates_more_competitors_than_are_kept() {
        let payload = source().generate("example.com");
        let list = payload["competitors"]["topSimilarityCompetitors"].as_array().unwrap();
        assert_eq!(list.len(), COMPETITOR_COUNT);
    }

    #[test]
    fn empty_domain_is_rejected() {
        let err = source().fetch("  ").unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload { .. }));
    }
}
