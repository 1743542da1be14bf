use chrono::NaiveDate;

use super::*;
use crate::fixtures::{approx, kol, post_on};
use crate::kol::Platform;

#[test]
fn kol_without_posts_has_zero_cpm() {
    let k = kol("Joshua Jake", &[(Platform::Tiktok, 705_000)], &[]);
    let m = compute_entity_metrics(&k);
    assert_eq!(m.num_posts, 0);
    assert_eq!(m.total_impressions, 0);
    assert!(approx(m.total_cost, 0.0));
    assert!(approx(m.average_cpm, 0.0));
    assert_eq!(m.total_followers, 705_000);
}

#[test]
fn blended_cpm_over_two_posts() {
    let k = kol(
        "Crypto Wendy",
        &[],
        &[(100_000, Some(1000.0)), (50_000, Some(500.0))],
    );
    let m = compute_entity_metrics(&k);
    assert_eq!(m.total_impressions, 150_000);
    assert!(approx(m.total_cost, 1500.0));
    assert!(approx(m.average_cpm, 10.0));
    assert_eq!(m.num_posts, 2);
}

#[test]
fn cpm_is_not_mean_of_post_cpms() {
    // Post CPMs are 10.0 and 100.0; their mean (55.0) must not be reported.
    let k = kol("Pix", &[], &[(100_000, Some(1000.0)), (1_000, Some(100.0))]);
    let m = compute_entity_metrics(&k);
    assert!(approx(m.average_cpm, 1100.0 / 101_000.0 * 1000.0));
    assert!(!approx(m.average_cpm, 55.0));
}

#[test]
fn missing_cost_counts_as_zero() {
    let k = kol("Leo", &[], &[(20_000, None), (11_078, Some(0.0))]);
    let m = compute_entity_metrics(&k);
    assert_eq!(m.total_impressions, 31_078);
    assert!(approx(m.total_cost, 0.0));
    assert!(approx(m.average_cpm, 0.0));
}

#[test]
fn malformed_numbers_are_normalized() {
    let k = kol(
        "Bad Data",
        &[(Platform::Youtube, -50)],
        &[
            (-10, Some(100.0)),
            (1_000, Some(f64::NAN)),
            (1_000, Some(-5.0)),
            (1_000, Some(f64::INFINITY)),
        ],
    );
    let m = compute_entity_metrics(&k);
    assert_eq!(m.total_followers, 0);
    assert_eq!(m.total_impressions, 3_000);
    assert!(approx(m.total_cost, 100.0));
    assert!(m.average_cpm.is_finite());
}

#[test]
fn total_cost_is_order_independent() {
    let forward = kol(
        "A",
        &[],
        &[(10, Some(0.1)), (20, Some(0.2)), (30, Some(0.3)), (40, None)],
    );
    let mut posts = forward.posts().to_vec();
    posts.reverse();
    let reversed = forward.with_posts(posts);
    assert!(approx(
        forward.metrics().total_cost,
        reversed.metrics().total_cost
    ));
    assert_eq!(
        forward.metrics().total_impressions,
        reversed.metrics().total_impressions
    );
}

#[test]
fn compute_entity_metrics_is_idempotent() {
    let k = kol(
        "Rise Up",
        &[(Platform::Tiktok, 365_000), (Platform::Twitter, 120_000)],
        &[(74_500, Some(6000.0))],
    );
    let first = compute_entity_metrics(&k);
    let second = compute_entity_metrics(&k);
    assert_eq!(first, second);
    assert_eq!(&first, k.metrics());
}

#[test]
fn empty_roster_is_all_zero() {
    let roster: Vec<crate::Kol> = Vec::new();
    let m = compute_roster_metrics(&roster, 5);
    assert_eq!(m, RosterMetrics::default());
    assert!(m.budget_by_platform.is_empty());
    assert!(m.top_performers.is_empty());
}

#[test]
fn roster_sums_and_blended_cpm() {
    let roster = vec![
        kol("A", &[(Platform::Youtube, 10)], &[(100_000, Some(1000.0))]),
        kol("B", &[(Platform::Tiktok, 10)], &[(50_000, Some(2000.0)), (50_000, None)]),
    ];
    let m = compute_roster_metrics(&roster, 5);
    assert_eq!(m.total_kols, 2);
    assert_eq!(m.total_posts, 3);
    assert_eq!(m.total_impressions, 200_000);
    assert_eq!(m.total_followers_reach, 20);
    assert!(approx(m.total_spend, 3000.0));
    assert!(approx(m.average_cpm, 15.0));
}

#[test]
fn roster_with_single_zero_impression_kol_has_zero_cpm() {
    let roster = vec![kol("Zero", &[(Platform::Youtube, 91_000)], &[])];
    let m = compute_roster_metrics(&roster, 5);
    assert!(approx(m.average_cpm, 0.0));
    assert!(m.average_cpm.is_finite());
}

#[test]
fn idle_kol_does_not_move_roster_cpm() {
    let mut roster = vec![kol("A", &[(Platform::Youtube, 10)], &[(40_000, Some(300.0))])];
    let before = compute_roster_metrics(&roster, 5).average_cpm;
    roster.push(kol("Idle", &[(Platform::Tiktok, 500)], &[]));
    let after = compute_roster_metrics(&roster, 5).average_cpm;
    assert!(approx(before, after));
}

#[test]
fn budget_by_platform_allocates_by_follower_share() {
    let roster = vec![kol(
        "Split",
        &[(Platform::Youtube, 80_000), (Platform::Tiktok, 20_000)],
        &[(10_000, Some(1000.0))],
    )];
    let m = compute_roster_metrics(&roster, 5);
    assert_eq!(m.budget_by_platform.len(), 2);
    assert_eq!(m.budget_by_platform[0].platform, Platform::Youtube);
    assert!(approx(m.budget_by_platform[0].amount, 800.0));
    assert_eq!(m.budget_by_platform[1].platform, Platform::Tiktok);
    assert!(approx(m.budget_by_platform[1].amount, 200.0));
}

#[test]
fn budget_by_platform_sums_to_total_spend_when_all_have_followers() {
    let roster = vec![
        kol(
            "A",
            &[(Platform::Youtube, 258_000), (Platform::Tiktok, 299_000)],
            &[(49_700, Some(15_000.0))],
        ),
        kol(
            "B",
            &[(Platform::Tiktok, 439_000), (Platform::Instagram, 89_000)],
            &[(46_759, Some(12_000.0))],
        ),
        kol("C", &[(Platform::Twitter, 85_000)], &[(15_200, Some(2500.0))]),
    ];
    let m = compute_roster_metrics(&roster, 5);
    let allocated: f64 = m.budget_by_platform.iter().map(|b| b.amount).sum();
    assert!((allocated - m.total_spend).abs() < 1e-6);
}

#[test]
fn kol_without_followers_contributes_nothing_to_platforms() {
    let roster = vec![
        kol("No audience", &[(Platform::Youtube, 0)], &[(1_000, Some(500.0))]),
        kol("No links", &[], &[(1_000, Some(250.0))]),
    ];
    let m = compute_roster_metrics(&roster, 5);
    assert!(approx(m.total_spend, 750.0));
    let allocated: f64 = m.budget_by_platform.iter().map(|b| b.amount).sum();
    assert!(approx(allocated, 0.0));
}

#[test]
fn top_performers_filter_sort_and_truncate() {
    let roster = vec![
        kol("Wendy", &[], &[(49_700, Some(15_000.0))]),
        kol("Jake", &[], &[]),
        kol("Leo", &[], &[(31_078, None)]),
        kol("Bodoggos", &[], &[(145_300, Some(9999.0))]),
        kol("Meg", &[], &[(25_300, Some(2000.0))]),
    ];
    let m = compute_roster_metrics(&roster, 2);
    let names: Vec<&str> = m.top_performers.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Bodoggos", "Meg"]);
}

#[test]
fn top_performers_ties_keep_roster_order() {
    let roster = vec![
        kol("First", &[], &[(1_000, Some(10.0))]),
        kol("Cheap", &[], &[(1_000, Some(1.0))]),
        kol("Second", &[], &[(2_000, Some(20.0))]),
    ];
    let m = compute_roster_metrics(&roster, 10);
    let names: Vec<&str> = m.top_performers.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Cheap", "First", "Second"]);
}

#[test]
fn cpm_by_kol_excludes_zero_and_sorts_ascending() {
    let roster = vec![
        kol("Star", &[], &[(4_300, Some(2500.0))]),
        kol("Idle", &[], &[]),
        kol("Rise", &[], &[(74_500, Some(6000.0))]),
        kol("Unpaid", &[], &[(10_000, None)]),
    ];
    let rows = cpm_by_kol(&roster);
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Rise", "Star"]);
}

#[test]
fn weekly_performance_buckets_by_sunday() {
    let id = uuid::Uuid::new_v4();
    let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
    // 2025-11-02 is a Sunday; 2025-11-08 the following Saturday.
    let posts = vec![
        post_on(id, d(2025, 11, 12), 300, Some(30.0)),
        post_on(id, d(2025, 11, 2), 100, Some(10.0)),
        post_on(id, d(2025, 11, 8), 200, None),
    ];
    let weeks = weekly_performance(&posts);
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[0].week_start, d(2025, 11, 2));
    assert_eq!(weeks[0].impressions, 300);
    assert_eq!(weeks[0].posts, 2);
    assert!(approx(weeks[0].cost, 10.0));
    assert_eq!(weeks[1].week_start, d(2025, 11, 9));
    assert_eq!(weeks[1].posts, 1);
}

#[test]
fn weekly_performance_empty() {
    assert!(weekly_performance(&[]).is_empty());
}

#[test]
fn roi_and_cpm_helpers() {
    assert!(approx(calculate_cpm(1500.0, 150_000), 10.0));
    assert!(approx(calculate_cpm(1500.0, 0), 0.0));
    assert!(approx(calculate_roi(1500.0, 1000.0), 50.0));
    assert!(approx(calculate_roi(500.0, 1000.0), -50.0));
    assert!(approx(calculate_roi(500.0, 0.0), 0.0));
}

#[test]
fn huge_counts_saturate_instead_of_overflowing() {
    let k = kol(
        "Whale",
        &[(Platform::Youtube, i64::MAX), (Platform::Tiktok, i64::MAX), (Platform::Twitter, i64::MAX)],
        &[(i64::MAX, Some(1.0)), (i64::MAX, Some(1.0)), (i64::MAX, Some(1.0))],
    );
    let m = compute_entity_metrics(&k);
    assert_eq!(m.total_impressions, u64::MAX);
    assert_eq!(m.total_followers, u64::MAX);
    assert_eq!(m.num_posts, 3);
    assert!(m.average_cpm.is_finite());
}

#[test]
fn roster_totals_saturate_across_kols() {
    let roster: Vec<Kol> = ["A", "B", "C"]
        .iter()
        .map(|name| {
            kol(
                name,
                &[(Platform::Youtube, i64::MAX)],
                &[(i64::MAX, Some(100.0))],
            )
        })
        .collect();
    let metrics = compute_roster_metrics(&roster, 5);
    assert_eq!(metrics.total_kols, 3);
    assert_eq!(metrics.total_impressions, u64::MAX);
    assert_eq!(metrics.total_followers_reach, u64::MAX);
    assert!(metrics.average_cpm.is_finite());
    assert_eq!(metrics.top_performers.len(), 3);
}

#[test]
fn weekly_bucket_saturates() {
    let id = uuid::Uuid::new_v4();
    let day = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
    let posts: Vec<ContentPost> = (0..3).map(|_| post_on(id, day, i64::MAX, None)).collect();
    let weeks = weekly_performance(&posts);
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0].impressions, u64::MAX);
    assert_eq!(weeks[0].posts, 3);
}
