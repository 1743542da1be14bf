//! Derived statistics over KOLs and the roster.
//!
//! Nothing here is persisted: every figure is recomputed from the platform and
//! post lists it summarises. Malformed numbers (negative counts, NaN or negative
//! costs, missing values) are read as zero rather than rejected, because
//! validation belongs to whoever wrote the record.
//!
//! Count totals saturate at `u64::MAX` instead of overflowing.
//!
//! CPM is always blended: total cost over total impressions at the level being
//! reported, never the mean of per-post CPMs.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kol::{ContentPost, Kol, Platform, PlatformLink};

/// Per-KOL figures derived from its platform links and posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KolMetrics {
    pub total_followers: u64,
    pub total_impressions: u64,
    pub total_cost: f64,
    pub num_posts: usize,
    pub average_cpm: f64,
}

/// Estimated spend on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformBudget {
    pub platform: Platform,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPerformer {
    pub kol_id: Uuid,
    pub name: String,
    pub average_cpm: f64,
    pub total_cost: f64,
    pub total_impressions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterMetrics {
    pub total_kols: usize,
    pub total_spend: f64,
    pub total_impressions: u64,
    pub total_posts: usize,
    pub total_followers_reach: u64,
    pub average_cpm: f64,
    /// Spend allocated to platforms by follower share, in [`Platform::ALL`] order.
    pub budget_by_platform: Vec<PlatformBudget>,
    /// Cheapest CPM first.
    pub top_performers: Vec<TopPerformer>,
}

/// One bar of the CPM-by-KOL chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KolCpm {
    pub kol_id: Uuid,
    pub name: String,
    pub average_cpm: f64,
}

/// Posts of one KOL bucketed into a week starting on Sunday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPerformance {
    pub week_start: NaiveDate,
    pub impressions: u64,
    pub cost: f64,
    pub posts: usize,
}

/// Cost per thousand impressions; zero when there are no impressions.
#[must_use]
#[allow(clippy::cast_precision_loss)] // impression counts stay far below 2^52
pub fn calculate_cpm(cost: f64, impressions: u64) -> f64 {
    if impressions == 0 {
        return 0.0;
    }
    (cost / impressions as f64) * 1000.0
}

/// Return on spend as a percentage; zero when nothing was spent.
#[must_use]
pub fn calculate_roi(revenue: f64, cost: f64) -> f64 {
    let revenue = amount(Some(revenue));
    let cost = amount(Some(cost));
    if cost == 0.0 {
        return 0.0;
    }
    ((revenue - cost) / cost) * 100.0
}

/// Recompute a KOL's metrics from its current platforms and posts.
#[must_use]
pub fn compute_entity_metrics(kol: &Kol) -> KolMetrics {
    metrics_from_parts(kol.platforms(), kol.posts())
}

pub(crate) fn metrics_from_parts(platforms: &[PlatformLink], posts: &[ContentPost]) -> KolMetrics {
    let total_followers = platforms
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(count(p.follower_count)));
    let total_impressions = posts
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(count(p.impressions)));
    let total_cost = posts.iter().map(|p| amount(p.cost)).sum();

    KolMetrics {
        total_followers,
        total_impressions,
        total_cost,
        num_posts: posts.len(),
        average_cpm: calculate_cpm(total_cost, total_impressions),
    }
}

/// Roster-wide totals, platform budget allocation and the `top_n` cheapest
/// KOLs by CPM.
#[must_use]
pub fn compute_roster_metrics<'a, I>(kols: I, top_n: usize) -> RosterMetrics
where
    I: IntoIterator<Item = &'a Kol>,
{
    let mut out = RosterMetrics::default();
    let mut by_platform: BTreeMap<Platform, f64> = BTreeMap::new();
    let mut performers: Vec<TopPerformer> = Vec::new();

    for kol in kols {
        let m = kol.metrics();
        out.total_kols += 1;
        out.total_spend += m.total_cost;
        out.total_impressions = out.total_impressions.saturating_add(m.total_impressions);
        out.total_posts += m.num_posts;
        out.total_followers_reach = out.total_followers_reach.saturating_add(m.total_followers);

        allocate_by_followers(kol, &mut by_platform);

        if m.average_cpm > 0.0 && m.total_cost > 0.0 {
            performers.push(TopPerformer {
                kol_id: kol.id(),
                name: kol.name().to_string(),
                average_cpm: m.average_cpm,
                total_cost: m.total_cost,
                total_impressions: m.total_impressions,
            });
        }
    }

    out.average_cpm = calculate_cpm(out.total_spend, out.total_impressions);
    out.budget_by_platform = by_platform
        .into_iter()
        .map(|(platform, amount)| PlatformBudget { platform, amount })
        .collect();

    // Stable: ties keep roster order.
    performers.sort_by(|a, b| a.average_cpm.total_cmp(&b.average_cpm));
    performers.truncate(top_n);
    out.top_performers = performers;

    out
}

/// Split a KOL's spend across its platforms in proportion to follower counts.
///
/// This is an estimate: posts carry a platform, but spend is attributed by
/// audience share. A KOL without followers contributes nothing.
#[allow(clippy::cast_precision_loss)]
fn allocate_by_followers(kol: &Kol, buckets: &mut BTreeMap<Platform, f64>) {
    let m = kol.metrics();
    if m.total_followers == 0 {
        return;
    }
    let total_followers = m.total_followers as f64;
    for link in kol.platforms() {
        let share = count(link.follower_count) as f64 / total_followers;
        *buckets.entry(link.platform).or_insert(0.0) += m.total_cost * share;
    }
}

/// KOLs with a non-zero CPM, cheapest first. Zero-CPM KOLs are left out.
#[must_use]
pub fn cpm_by_kol<'a, I>(kols: I) -> Vec<KolCpm>
where
    I: IntoIterator<Item = &'a Kol>,
{
    let mut rows: Vec<KolCpm> = kols
        .into_iter()
        .filter(|k| k.metrics().average_cpm > 0.0)
        .map(|k| KolCpm {
            kol_id: k.id(),
            name: k.name().to_string(),
            average_cpm: k.metrics().average_cpm,
        })
        .collect();
    rows.sort_by(|a, b| a.average_cpm.total_cmp(&b.average_cpm));
    rows
}

/// Bucket posts by the Sunday that starts their week, oldest week first.
#[must_use]
pub fn weekly_performance(posts: &[ContentPost]) -> Vec<WeeklyPerformance> {
    let mut weeks: BTreeMap<NaiveDate, WeeklyPerformance> = BTreeMap::new();

    for post in posts {
        let week_start = week_start(post.posted_date);
        let bucket = weeks.entry(week_start).or_insert(WeeklyPerformance {
            week_start,
            impressions: 0,
            cost: 0.0,
            posts: 0,
        });
        bucket.impressions = bucket.impressions.saturating_add(count(post.impressions));
        bucket.cost += amount(post.cost);
        bucket.posts += 1;
    }

    weeks.into_values().collect()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Non-negative count; negatives read as zero.
pub(crate) fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Non-negative finite amount; missing, NaN, infinite and negative read as zero.
pub(crate) fn amount(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;
