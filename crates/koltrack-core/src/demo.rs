//! Fixed demo roster used when no database is configured, and by `db seed`.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::budget::{BudgetPeriod, InvoiceStatus};
use crate::intent::{CreateKol, NewInvoice, NewPlatformLink, NewPost};
use crate::kol::{KolStatus, Platform};

#[derive(Debug, Clone)]
pub struct DemoKol {
    pub kol: CreateKol,
    pub posts: Vec<NewPost>,
    pub invoices: Vec<DemoInvoice>,
}

#[derive(Debug, Clone, Copy)]
pub struct DemoInvoice {
    pub amount: f64,
    pub status: InvoiceStatus,
    pub budget_period: BudgetPeriod,
    pub due_date: Option<NaiveDate>,
}

impl DemoInvoice {
    #[must_use]
    pub fn for_kol(&self, kol_id: Uuid) -> NewInvoice {
        NewInvoice {
            kol_id,
            amount: self.amount,
            currency: None,
            status: self.status,
            budget_period: self.budget_period,
            due_date: self.due_date,
            invoice_number: None,
            notes: None,
        }
    }
}

struct Entry {
    name: &'static str,
    email: Option<&'static str>,
    telegram: Option<&'static str>,
    status: KolStatus,
    kyc: bool,
    links: &'static [(Platform, &'static str, i64)],
    /// `(year, month, day, impressions, cost)`
    posts: &'static [(i32, u32, u32, i64, Option<f64>)],
    invoice: Option<(f64, InvoiceStatus, BudgetPeriod, (i32, u32, u32))>,
}

const ROSTER: &[Entry] = &[
    Entry {
        name: "Crypto Wendy",
        email: Some("wendy@crypto.com"),
        telegram: Some("@cryptowendy"),
        status: KolStatus::Paid,
        kyc: true,
        links: &[
            (Platform::Youtube, "https://youtube.com/@cryptowendy", 258_000),
            (Platform::Tiktok, "https://www.tiktok.com/@cryptowendy", 299_000),
        ],
        posts: &[
            (2025, 11, 3, 14_200, Some(4_000.0)),
            (2025, 11, 10, 12_500, Some(4_000.0)),
            (2025, 11, 17, 11_800, Some(3_500.0)),
            (2025, 11, 24, 11_200, Some(3_500.0)),
        ],
        invoice: Some((15_000.0, InvoiceStatus::Paid, BudgetPeriod::Monthly, (2025, 12, 1))),
    },
    Entry {
        name: "Joshua Jake",
        email: Some("jake@influencer.io"),
        telegram: None,
        status: KolStatus::InContact,
        kyc: true,
        links: &[(Platform::Tiktok, "https://www.tiktok.com/@joshuajake", 705_000)],
        posts: &[],
        invoice: Some((22_500.0, InvoiceStatus::Paid, BudgetPeriod::Quarterly, (2025, 11, 15))),
    },
    Entry {
        name: "Rise Up Morning Show",
        email: Some("show@riseup.com"),
        telegram: None,
        status: KolStatus::Paid,
        kyc: true,
        links: &[
            (Platform::Tiktok, "https://www.tiktok.com/@riseupmorningshow", 365_000),
            (Platform::Twitter, "https://twitter.com/riseupshow", 120_000),
        ],
        posts: &[
            (2025, 11, 4, 40_000, Some(3_000.0)),
            (2025, 11, 18, 34_500, Some(3_000.0)),
        ],
        invoice: Some((18_000.0, InvoiceStatus::Invoiced, BudgetPeriod::Quarterly, (2025, 12, 15))),
    },
    Entry {
        name: "Crypto with Leo",
        email: Some("leo@crypto.com"),
        telegram: None,
        status: KolStatus::Paid,
        kyc: true,
        links: &[(Platform::Youtube, "https://youtube.com/@cryptowithleo", 180_000)],
        posts: &[(2025, 11, 6, 20_000, None), (2025, 11, 20, 11_078, None)],
        invoice: None,
    },
    Entry {
        name: "Jolly Green Investor",
        email: Some("jolly@investor.com"),
        telegram: None,
        status: KolStatus::Paid,
        kyc: true,
        links: &[
            (Platform::Tiktok, "https://www.tiktok.com/@jollygreeninvestor", 439_000),
            (Platform::Instagram, "https://instagram.com/jollygreeninvestor", 89_000),
        ],
        posts: &[
            (2025, 11, 2, 25_000, Some(6_000.0)),
            (2025, 11, 16, 21_759, Some(6_000.0)),
        ],
        invoice: Some((12_000.0, InvoiceStatus::Paid, BudgetPeriod::Monthly, (2025, 11, 10))),
    },
    Entry {
        name: "Bodoggos",
        email: Some("bodoggos@gmail.com"),
        telegram: None,
        status: KolStatus::Paid,
        kyc: true,
        links: &[(Platform::Tiktok, "https://www.tiktok.com/@bodoggos", 520_000)],
        posts: &[
            (2025, 11, 5, 60_000, Some(3_333.0)),
            (2025, 11, 12, 45_300, Some(3_333.0)),
            (2025, 11, 19, 40_000, Some(3_333.0)),
        ],
        invoice: Some((10_000.0, InvoiceStatus::Invoiced, BudgetPeriod::Monthly, (2025, 12, 20))),
    },
    Entry {
        name: "Wale.Moca",
        email: Some("wale@moca.com"),
        telegram: None,
        status: KolStatus::Paid,
        kyc: true,
        links: &[(Platform::Twitter, "https://x.com/walemoca", 85_000)],
        posts: &[(2025, 11, 21, 15_200, Some(2_500.0))],
        invoice: Some((2_500.0, InvoiceStatus::Paid, BudgetPeriod::Monthly, (2025, 11, 30))),
    },
    Entry {
        name: "When Shift Happens",
        email: None,
        telegram: None,
        status: KolStatus::InContact,
        kyc: false,
        links: &[(Platform::Youtube, "https://youtube.com/@whenshifthappens", 91_000)],
        posts: &[],
        invoice: Some((20_000.0, InvoiceStatus::Pending, BudgetPeriod::OneTime, (2025, 12, 25))),
    },
    Entry {
        name: "Star Platinum",
        email: Some("star@platinum.com"),
        telegram: None,
        status: KolStatus::Paid,
        kyc: true,
        links: &[(Platform::Tiktok, "https://www.tiktok.com/@starplatinum", 125_000)],
        posts: &[(2025, 11, 14, 4_300, Some(2_500.0))],
        invoice: None,
    },
    Entry {
        name: "Pix",
        email: Some("pix@creator.com"),
        telegram: None,
        status: KolStatus::Paid,
        kyc: true,
        links: &[(Platform::Instagram, "https://instagram.com/pix", 200_000)],
        posts: &[(2025, 11, 13, 16_400, Some(2_500.0))],
        invoice: None,
    },
    Entry {
        name: "Andrew Asks",
        email: None,
        telegram: None,
        status: KolStatus::Paid,
        kyc: true,
        links: &[(Platform::Youtube, "https://youtube.com/@andrewasks", 150_000)],
        posts: &[
            (2025, 11, 7, 6_000, Some(1_250.0)),
            (2025, 11, 22, 4_000, Some(1_250.0)),
        ],
        invoice: None,
    },
    Entry {
        name: "Crypto Meg/Mason",
        email: None,
        telegram: None,
        status: KolStatus::Paid,
        kyc: true,
        links: &[
            (Platform::Tiktok, "https://www.tiktok.com/@cryptomeg", 320_000),
            (Platform::Youtube, "https://youtube.com/@cryptomason", 95_000),
        ],
        posts: &[
            (2025, 11, 9, 13_000, Some(1_000.0)),
            (2025, 11, 23, 12_300, Some(1_000.0)),
        ],
        invoice: Some((10_000.0, InvoiceStatus::NotPaid, BudgetPeriod::Monthly, (2025, 11, 20))),
    },
];

/// The demo roster, oldest entry first. Creating the entries in order yields
/// a roster listed newest first.
#[must_use]
pub fn demo_roster() -> Vec<DemoKol> {
    ROSTER.iter().rev().map(build).collect()
}

fn build(entry: &Entry) -> DemoKol {
    let platforms = entry
        .links
        .iter()
        .map(|&(platform, url, followers)| NewPlatformLink {
            platform: Some(platform),
            profile_url: url.to_string(),
            follower_count: followers,
            username: None,
        })
        .collect();

    let post_platform = entry.links.first().map_or(Platform::Youtube, |l| l.0);
    let posts = entry
        .posts
        .iter()
        .enumerate()
        .filter_map(|(i, &(y, m, d, impressions, cost))| {
            Some(NewPost {
                platform: Some(post_platform),
                url: format!("{}/post/{}", entry.links.first()?.1, i + 1),
                title: None,
                posted_date: NaiveDate::from_ymd_opt(y, m, d)?,
                impressions,
                engagement: None,
                clicks: None,
                cost,
                notes: None,
            })
        })
        .collect();

    let invoices = entry
        .invoice
        .iter()
        .map(|&(amount, status, budget_period, (y, m, d))| DemoInvoice {
            amount,
            status,
            budget_period,
            due_date: NaiveDate::from_ymd_opt(y, m, d),
        })
        .collect();

    DemoKol {
        kol: CreateKol {
            name: entry.name.to_string(),
            email: entry.email.map(str::to_string),
            telegram_handle: entry.telegram.map(str::to_string),
            notes: None,
            status: entry.status,
            kyc_completed: entry.kyc,
            platforms,
            documents: Vec::new(),
        },
        posts,
        invoices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_roster_is_valid() {
        let roster = demo_roster();
        assert_eq!(roster.len(), ROSTER.len());
        for entry in &roster {
            entry.kol.validate().unwrap();
            for post in &entry.posts {
                post.validate().unwrap();
            }
        }
    }

    #[test]
    fn demo_posts_keep_every_date() {
        let total_specs: usize = ROSTER.iter().map(|s| s.posts.len()).sum();
        let total_built: usize = demo_roster().iter().map(|d| d.posts.len()).sum();
        assert_eq!(total_specs, total_built);
    }

    #[test]
    fn demo_invoices_total() {
        let amount: f64 = demo_roster()
            .iter()
            .flat_map(|d| d.invoices.iter())
            .map(|i| i.amount)
            .sum();
        assert!((amount - 110_000.0).abs() < 1e-9);
    }
}
