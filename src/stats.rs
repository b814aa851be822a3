//! On-demand click statistics
//!
//! The aggregator is a pure function over a shortcode's click log: nothing
//! here is stored or incrementally maintained, every call recomputes from
//! the append-order event list.

use chrono::{Local, Timelike};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use url::Url;

use crate::model::ClickEvent;

/// Referrer bucket for clicks without an originating URL
pub const DIRECT_REFERRER: &str = "direct";

/// Number of recent clicks reported by [`ClickStats::recent_clicks`]
pub const RECENT_CLICKS_LIMIT: usize = 10;

/// Summary derived from one shortcode's click log
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClickStats {
    /// Total click events
    pub total: usize,

    /// Distinct truncated user-agent strings seen.
    ///
    /// A weak visitor approximation by design: two visitors sharing a
    /// user-agent collapse into one. Documented, not fixed, since no
    /// stronger signal exists in this system's scope.
    pub unique: usize,

    /// Referrer hostname (or "direct") -> click count
    pub referrer_stats: HashMap<String, u64>,

    /// Approximate location -> click count
    pub location_stats: HashMap<String, u64>,

    /// Click counts bucketed by hour-of-day (0-23) in the viewer's local time
    pub hourly_stats: [u64; 24],

    /// The most recent clicks, newest first, at most [`RECENT_CLICKS_LIMIT`]
    pub recent_clicks: Vec<ClickEvent>,
}

/// Computes the full statistics summary for an append-order click log.
pub fn aggregate(clicks: &[ClickEvent]) -> ClickStats {
    let mut referrer_stats: HashMap<String, u64> = HashMap::new();
    let mut location_stats: HashMap<String, u64> = HashMap::new();
    let mut hourly_stats = [0u64; 24];
    let mut agents: HashSet<&str> = HashSet::new();

    for click in clicks {
        *referrer_stats
            .entry(referrer_host(&click.referrer))
            .or_insert(0) += 1;

        *location_stats.entry(click.location.clone()).or_insert(0) += 1;

        let hour = click.timestamp.with_timezone(&Local).hour() as usize;
        hourly_stats[hour] += 1;

        agents.insert(click.user_agent.as_str());
    }

    // The log is stored append-order (oldest first); this field is the one
    // place the contract demands newest-first.
    let recent_clicks: Vec<ClickEvent> = clicks
        .iter()
        .rev()
        .take(RECENT_CLICKS_LIMIT)
        .cloned()
        .collect();

    ClickStats {
        total: clicks.len(),
        unique: agents.len(),
        referrer_stats,
        location_stats,
        hourly_stats,
        recent_clicks,
    }
}

/// Reduces a stored referrer value to a histogram bucket.
///
/// The literal "direct" marker and anything unparseable or host-less both
/// bucket as "direct".
fn referrer_host(referrer: &str) -> String {
    if referrer == DIRECT_REFERRER {
        return DIRECT_REFERRER.to_string();
    }
    match Url::parse(referrer) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| host.to_string())
            .unwrap_or_else(|| DIRECT_REFERRER.to_string()),
        Err(_) => DIRECT_REFERRER.to_string(),
    }
}
