//! `RosterService` behaviour against the in-memory data source.

use std::sync::Arc;

use chrono::NaiveDate;
use koltrack_core::{
    parse_import_file, BudgetPeriod, CreateKol, DocumentType, InvoicePatch, InvoiceStatus,
    KolFilter, KolStatus, NewDocument, NewInvoice, NewPlatformLink, NewPost, Platform, PostPatch,
    UpdateKol,
};
use koltrack_service::{DataSource, RosterService, ServiceError, StaticDataSource};
use uuid::Uuid;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn empty_service() -> RosterService {
    RosterService::new(DataSource::Static(StaticDataSource::default()), 5)
}

async fn demo_service() -> RosterService {
    let service = RosterService::new(DataSource::Static(StaticDataSource::demo()), 5);
    service.load().await.expect("static load never fails");
    service
}

fn link(url: &str, followers: i64) -> NewPlatformLink {
    NewPlatformLink {
        platform: None,
        profile_url: url.to_string(),
        follower_count: followers,
        username: None,
    }
}

fn intent(name: &str, links: Vec<NewPlatformLink>) -> CreateKol {
    CreateKol {
        name: name.to_string(),
        email: None,
        telegram_handle: None,
        notes: None,
        status: KolStatus::Reached,
        kyc_completed: false,
        platforms: links,
        documents: Vec::new(),
    }
}

fn post(impressions: i64, cost: Option<f64>) -> NewPost {
    NewPost {
        platform: Some(Platform::Youtube),
        url: "https://youtube.com/watch?v=abc".to_string(),
        title: None,
        posted_date: NaiveDate::from_ymd_opt(2025, 11, 3).expect("date"),
        impressions,
        engagement: None,
        clicks: None,
        cost,
        notes: None,
    }
}

// ---------------------------------------------------------------------------
// Metrics through mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn posts_drive_blended_cpm_and_platform_budget() {
    let service = empty_service();
    let kol = service
        .create_kol(&intent(
            "Split",
            vec![
                link("https://youtube.com/@split", 80_000),
                link("https://www.tiktok.com/@split", 20_000),
            ],
        ))
        .await
        .expect("create");

    service.add_post(kol.id(), &post(100_000, Some(1000.0))).await.expect("post");
    service.add_post(kol.id(), &post(50_000, Some(500.0))).await.expect("post");

    let stored = service.kol(kol.id()).await.expect("in snapshot");
    assert_eq!(stored.metrics().total_impressions, 150_000);
    assert!(approx(stored.metrics().total_cost, 1500.0));
    assert!(approx(stored.metrics().average_cpm, 10.0));

    let metrics = service.roster_metrics(None).await;
    assert!(approx(metrics.average_cpm, 10.0));
    let budget: Vec<(Platform, f64)> = metrics
        .budget_by_platform
        .iter()
        .map(|b| (b.platform, b.amount))
        .collect();
    assert_eq!(budget.len(), 2);
    assert!(budget
        .iter()
        .any(|(p, a)| *p == Platform::Youtube && approx(*a, 1200.0)));
    assert!(budget
        .iter()
        .any(|(p, a)| *p == Platform::Tiktok && approx(*a, 300.0)));
}

#[tokio::test]
async fn deleting_the_only_post_zeroes_metrics() {
    let service = empty_service();
    let kol = service
        .create_kol(&intent("Solo", vec![link("https://t.me/solo", 1_000)]))
        .await
        .expect("create");
    let created = service
        .add_post(kol.id(), &post(10_000, Some(500.0)))
        .await
        .expect("post");

    service.delete_post(kol.id(), created.id).await.expect("delete");

    let stored = service.kol(kol.id()).await.expect("in snapshot");
    let m = stored.metrics();
    assert_eq!(m.total_impressions, 0);
    assert!(approx(m.total_cost, 0.0));
    assert_eq!(m.num_posts, 0);
    assert!(approx(m.average_cpm, 0.0));
}

#[tokio::test]
async fn clearing_post_cost_recomputes() {
    let service = empty_service();
    let kol = service
        .create_kol(&intent("Edit", vec![link("https://youtube.com/@edit", 10)]))
        .await
        .expect("create");
    let created = service
        .add_post(kol.id(), &post(2_000, Some(20.0)))
        .await
        .expect("post");

    let patch = PostPatch {
        cost: Some(None),
        ..PostPatch::default()
    };
    let updated = service
        .update_post(kol.id(), created.id, &patch)
        .await
        .expect("update");
    assert!(updated.cost.is_none());

    let stored = service.kol(kol.id()).await.expect("in snapshot");
    assert!(approx(stored.metrics().average_cpm, 0.0));
    assert_eq!(stored.metrics().total_impressions, 2_000);
}

#[tokio::test]
async fn untouched_kols_are_shared_between_snapshots() {
    let service = demo_service().await;
    let before = service.snapshot().await;
    let target = before.iter().next().expect("demo roster").id();
    let other = before.iter().nth(1).expect("demo roster").id();

    service.add_post(target, &post(1_000, Some(10.0))).await.expect("post");

    let after = service.snapshot().await;
    assert!(Arc::ptr_eq(
        &before.get_shared(other).expect("present"),
        &after.get_shared(other).expect("present"),
    ));
    assert!(!Arc::ptr_eq(
        &before.get_shared(target).expect("present"),
        &after.get_shared(target).expect("present"),
    ));
}

// ---------------------------------------------------------------------------
// KOL edits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_replaces_platforms_and_keeps_posts() {
    let service = empty_service();
    let kol = service
        .create_kol(&intent(
            "Mover",
            vec![
                link("https://youtube.com/@mover", 500),
                link("https://instagram.com/mover", 500),
            ],
        ))
        .await
        .expect("create");
    service.add_post(kol.id(), &post(1_000, Some(5.0))).await.expect("post");

    let patch = UpdateKol {
        name: Some("  Mover Prime ".to_string()),
        email: Some(Some("mover@example.com".to_string())),
        status: Some(KolStatus::Contracted),
        platforms: Some(vec![link("https://x.com/mover", 9_000)]),
        ..UpdateKol::default()
    };
    let updated = service.update_kol(kol.id(), &patch).await.expect("update");

    assert_eq!(updated.name(), "Mover Prime");
    assert_eq!(updated.profile().status, KolStatus::Contracted);
    assert_eq!(updated.platforms().len(), 1);
    assert_eq!(updated.platforms()[0].platform, Platform::Twitter);
    assert_eq!(updated.metrics().total_followers, 9_000);
    assert_eq!(updated.metrics().num_posts, 1);
}

#[tokio::test]
async fn invalid_intent_leaves_snapshot_untouched() {
    let service = empty_service();
    let err = service
        .create_kol(&intent("   ", Vec::new()))
        .await
        .expect_err("blank name");
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = service
        .create_kol(&intent("Bad", vec![link("https://myspace.com/bad", 1)]))
        .await
        .expect_err("unknown platform");
    assert!(matches!(err, ServiceError::Validation(_)));

    assert!(service.snapshot().await.is_empty());
}

#[tokio::test]
async fn unknown_kol_is_not_found() {
    let service = demo_service().await;
    let before = service.snapshot().await;
    let missing = Uuid::new_v4();

    let err = service
        .add_post(missing, &post(1, None))
        .await
        .expect_err("unknown kol");
    assert!(matches!(err, ServiceError::NotFound { entity: "kol", .. }));
    assert!(service.delete_kol(missing).await.is_err());
    assert!(service.weekly_performance(missing).await.is_err());

    assert_eq!(service.snapshot().await, before);
}

#[tokio::test]
async fn delete_kol_drops_it_and_its_invoices() {
    let service = demo_service().await;
    let wendy = service
        .list_kols(&KolFilter {
            search: Some("wendy".to_string()),
            ..KolFilter::default()
        })
        .await
        .pop()
        .expect("demo roster has Crypto Wendy");
    assert!(!service.list_invoices(Some(wendy.id())).await.is_empty());

    service.delete_kol(wendy.id()).await.expect("delete");

    assert!(service.kol(wendy.id()).await.is_none());
    assert!(service.list_invoices(Some(wendy.id())).await.is_empty());
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[tokio::test]
async fn documents_infer_type_then_accept_override() {
    let service = empty_service();
    let kol = service
        .create_kol(&intent("Papers", Vec::new()))
        .await
        .expect("create");
    let docs = service
        .add_documents(
            kol.id(),
            &[NewDocument {
                name: "Signed Agreement v2.pdf".to_string(),
                doc_type: None,
                size: 4_096,
                url: None,
                file_path: None,
                notes: None,
            }],
        )
        .await
        .expect("add");
    assert_eq!(docs[0].doc_type, DocumentType::Contract);

    let retyped = service
        .retype_document(kol.id(), docs[0].id, DocumentType::Msa)
        .await
        .expect("retype");
    assert_eq!(retyped.doc_type, DocumentType::Msa);
    let stored = service.kol(kol.id()).await.expect("in snapshot");
    assert_eq!(stored.documents()[0].doc_type, DocumentType::Msa);

    service
        .delete_document(kol.id(), docs[0].id)
        .await
        .expect("delete");
    assert!(service.kol(kol.id()).await.expect("kol").documents().is_empty());
    assert!(service.delete_document(kol.id(), docs[0].id).await.is_err());
}

// ---------------------------------------------------------------------------
// Invoices and budget
// ---------------------------------------------------------------------------

#[tokio::test]
async fn demo_budget_summary_matches_invoices() {
    let service = demo_service().await;
    let summary = service.budget_summary(None).await;
    assert!(approx(summary.total_budget, 110_000.0));
    assert!(approx(summary.total_paid, 52_000.0));
    assert!(approx(summary.total_pending, 58_000.0));
    assert!(approx(summary.overdue_amount, 10_000.0));
    assert!(summary.roi.is_none());
}

#[tokio::test]
async fn invoice_paid_transition_moves_budget() {
    let service = empty_service();
    let kol = service
        .create_kol(&intent("Billed", Vec::new()))
        .await
        .expect("create");
    let invoice = service
        .create_invoice(&NewInvoice {
            kol_id: kol.id(),
            amount: 4_000.0,
            currency: None,
            status: InvoiceStatus::Invoiced,
            budget_period: BudgetPeriod::OneTime,
            due_date: None,
            invoice_number: None,
            notes: None,
        })
        .await
        .expect("invoice");
    assert_eq!(invoice.currency, "USD");
    assert!(approx(service.budget_summary(None).await.total_pending, 4_000.0));

    let paid = service
        .update_invoice(
            invoice.id,
            &InvoicePatch {
                status: Some(InvoiceStatus::Paid),
                ..InvoicePatch::default()
            },
        )
        .await
        .expect("update");
    assert!(paid.paid_date.is_some());

    let summary = service.budget_summary(Some(6_000.0)).await;
    assert!(approx(summary.total_paid, 4_000.0));
    assert!(approx(summary.total_pending, 0.0));
    assert!(approx(summary.roi.expect("revenue given"), 50.0));

    service.delete_invoice(invoice.id).await.expect("delete");
    assert!(service.list_invoices(None).await.is_empty());
    assert!(service.delete_invoice(invoice.id).await.is_err());
}

#[tokio::test]
async fn invoice_for_unknown_kol_is_rejected() {
    let service = empty_service();
    let err = service
        .create_invoice(&NewInvoice {
            kol_id: Uuid::new_v4(),
            amount: 1.0,
            currency: None,
            status: InvoiceStatus::Pending,
            budget_period: BudgetPeriod::Weekly,
            due_date: None,
            invoice_number: None,
            notes: None,
        })
        .await
        .expect_err("no such kol");
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn demo_top_performers_are_cheapest_first() {
    let service = demo_service().await;
    let metrics = service.roster_metrics(Some(3)).await;
    assert_eq!(metrics.total_kols, 12);
    assert_eq!(metrics.top_performers.len(), 3);
    for pair in metrics.top_performers.windows(2) {
        assert!(pair[0].average_cpm <= pair[1].average_cpm);
    }

    let series = service.cpm_by_kol().await;
    assert!(series.iter().all(|row| row.average_cpm > 0.0));
    assert_eq!(series[0].kol_id, metrics.top_performers[0].kol_id);
}

#[tokio::test]
async fn weekly_performance_groups_by_sunday() {
    let service = empty_service();
    let kol = service
        .create_kol(&intent("Weekly", Vec::new()))
        .await
        .expect("create");
    // 2025-11-02 is a Sunday; 11-08 closes the same week.
    for (day, impressions) in [(2, 100), (8, 200), (9, 400)] {
        let mut p = post(impressions, Some(1.0));
        p.posted_date = NaiveDate::from_ymd_opt(2025, 11, day).expect("date");
        service.add_post(kol.id(), &p).await.expect("post");
    }

    let weeks = service.weekly_performance(kol.id()).await.expect("known kol");
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[0].week_start, NaiveDate::from_ymd_opt(2025, 11, 2).expect("date"));
    assert_eq!(weeks[0].impressions, 300);
    assert_eq!(weeks[0].posts, 2);
    assert_eq!(weeks[1].impressions, 400);
}

#[tokio::test]
async fn list_kols_filters_by_status_and_platform() {
    let service = demo_service().await;
    let in_contact = service
        .list_kols(&KolFilter {
            statuses: vec![KolStatus::InContact],
            ..KolFilter::default()
        })
        .await;
    assert_eq!(in_contact.len(), 2);

    let on_x = service
        .list_kols(&KolFilter {
            platforms: vec![Platform::Twitter],
            ..KolFilter::default()
        })
        .await;
    assert_eq!(on_x.len(), 2);
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_continues_past_failed_rows() {
    let service = empty_service();
    let file = parse_import_file(
        r"
kols:
  - name: Crypto Wendy
    email: wendy@crypto.com
    platforms:
      - profile_url: https://youtube.com/@cryptowendy
        followers: 258K
  - email: nameless@example.com
  - name: Pix
    platforms:
      - profile_url: https://myspace.com/pix
        followers: 10
",
    )
    .expect("valid yaml");

    let result = service.import(file).await;

    assert_eq!(result.imported_count, 2);
    assert_eq!(result.failed_count, 1);
    assert_eq!(result.errors[0].row, 2);
    assert_eq!(result.errors[0].message, "Name is required");
    assert!(result.warnings.iter().any(|w| w.row == 3));
    assert_eq!(result.imported_ids.len(), 2);

    let snapshot = service.snapshot().await;
    assert_eq!(snapshot.len(), 2);
    // Newest first: Pix was created last.
    assert_eq!(snapshot.iter().next().expect("two kols").name(), "Pix");
    let wendy = snapshot.get(result.imported_ids[0]).expect("imported");
    assert_eq!(wendy.metrics().total_followers, 258_000);
}

#[tokio::test]
async fn import_applies_manual_entry_checks() {
    let service = empty_service();
    let file = parse_import_file(
        r#"{"kols": [
            {"name": "Bad Mail", "email": "nope",
             "platforms": [{"platform": "tiktok", "profile_url": "tiktok"}]},
            {"name": "Good Row", "email": "good@row.io",
             "platforms": [{"profile_url": "https://www.tiktok.com/@good"}]}
        ]}"#,
    )
    .expect("valid json");

    let result = service.import(file).await;

    assert_eq!(result.imported_count, 1);
    assert_eq!(result.failed_count, 1);
    assert_eq!(result.errors[0].row, 1);
    assert_eq!(service.snapshot().await.len(), 1);
}

#[tokio::test]
async fn create_kol_rejects_malformed_email() {
    let service = empty_service();
    let mut bad = intent("Bad Mail", vec![link("https://youtube.com/@bad", 10)]);
    bad.email = Some("nope".to_string());

    let err = service.create_kol(&bad).await.expect_err("email is malformed");
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(service.snapshot().await.is_empty());
}

#[tokio::test]
async fn reload_keeps_roster_and_invoices_in_step() {
    let service = demo_service().await;
    let first = service.load().await.expect("reload");
    let second = service.load().await.expect("reload again");
    assert_eq!(first, second);

    let snapshot = service.snapshot().await;
    let invoices = service.list_invoices(None).await;
    assert_eq!(snapshot.len(), first);
    assert!(!invoices.is_empty());
    assert!(invoices.iter().all(|i| snapshot.get(i.kol_id).is_some()));
}
