//! Record builders shared by the unit tests in this crate.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::budget::{BudgetPeriod, Invoice, InvoiceStatus};
use crate::kol::{ContentPost, Kol, KolProfile, KolStatus, Platform, PlatformLink};

pub(crate) fn ts() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-11-01T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub(crate) fn profile(name: &str) -> KolProfile {
    KolProfile {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: None,
        telegram_handle: None,
        notes: None,
        status: KolStatus::Paid,
        kyc_completed: true,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub(crate) fn link(kol_id: Uuid, platform: Platform, followers: i64) -> PlatformLink {
    PlatformLink {
        id: Uuid::new_v4(),
        kol_id,
        platform,
        profile_url: format!("https://{platform}.com/someone"),
        follower_count: followers,
        username: None,
    }
}

pub(crate) fn post(kol_id: Uuid, impressions: i64, cost: Option<f64>) -> ContentPost {
    post_on(kol_id, NaiveDate::from_ymd_opt(2025, 11, 5).expect("date"), impressions, cost)
}

pub(crate) fn post_on(
    kol_id: Uuid,
    posted_date: NaiveDate,
    impressions: i64,
    cost: Option<f64>,
) -> ContentPost {
    ContentPost {
        id: Uuid::new_v4(),
        kol_id,
        platform: Platform::Tiktok,
        url: "https://tiktok.com/@someone/video/1".to_string(),
        title: None,
        posted_date,
        impressions,
        engagement: None,
        clicks: None,
        cost,
        notes: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

/// A KOL with the given `(platform, followers)` links and `(impressions, cost)` posts.
pub(crate) fn kol(name: &str, links: &[(Platform, i64)], posts: &[(i64, Option<f64>)]) -> Kol {
    let profile = profile(name);
    let id = profile.id;
    Kol::new(
        profile,
        links.iter().map(|&(p, f)| link(id, p, f)).collect(),
        posts.iter().map(|&(i, c)| post(id, i, c)).collect(),
        Vec::new(),
    )
}

pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

pub(crate) fn invoice(amount: f64, status: InvoiceStatus) -> Invoice {
    Invoice {
        id: Uuid::new_v4(),
        kol_id: Uuid::new_v4(),
        amount,
        currency: "USD".to_string(),
        status,
        budget_period: BudgetPeriod::Monthly,
        due_date: None,
        paid_date: None,
        invoice_number: None,
        notes: None,
        created_at: ts(),
        updated_at: ts(),
    }
}
