//! Invoices and the budget summary computed over them.
//!
//! Invoices are tracked alongside posts but never feed post metrics.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::{amount, calculate_roi};
use crate::CoreError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Invoiced,
    Paid,
    NotPaid,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Pending,
        InvoiceStatus::Invoiced,
        InvoiceStatus::Paid,
        InvoiceStatus::NotPaid,
        InvoiceStatus::Cancelled,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Invoiced => "invoiced",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::NotPaid => "not_paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInvoiceStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    OneTime,
}

impl BudgetPeriod {
    pub const ALL: [BudgetPeriod; 5] = [
        BudgetPeriod::Weekly,
        BudgetPeriod::Monthly,
        BudgetPeriod::Quarterly,
        BudgetPeriod::Yearly,
        BudgetPeriod::OneTime,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Quarterly => "quarterly",
            BudgetPeriod::Yearly => "yearly",
            BudgetPeriod::OneTime => "one_time",
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BudgetPeriod::ALL
            .into_iter()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| CoreError::InvalidBudgetPeriod(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub kol_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub budget_period: BudgetPeriod,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: InvoiceStatus,
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_budget: f64,
    pub total_paid: f64,
    /// Everything not yet paid, including cancelled and overdue invoices.
    pub total_pending: f64,
    /// Sum of `not_paid` invoices.
    pub overdue_amount: f64,
    /// One entry per status, in [`InvoiceStatus::ALL`] order.
    pub count_by_status: Vec<StatusCount>,
    /// Return on paid spend, when a revenue figure was supplied.
    pub roi: Option<f64>,
}

/// Totals over `invoices`. Negative or non-finite amounts count as zero.
#[must_use]
pub fn summarize_budget(invoices: &[Invoice], revenue: Option<f64>) -> BudgetSummary {
    let mut counts: Vec<StatusCount> = InvoiceStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: 0,
            amount: 0.0,
        })
        .collect();
    let mut total_budget = 0.0;
    let mut total_paid = 0.0;
    let mut total_pending = 0.0;
    let mut overdue_amount = 0.0;

    for invoice in invoices {
        let value = amount(Some(invoice.amount));
        total_budget += value;
        match invoice.status {
            InvoiceStatus::Paid => total_paid += value,
            InvoiceStatus::NotPaid => {
                overdue_amount += value;
                total_pending += value;
            }
            _ => total_pending += value,
        }
        if let Some(slot) = counts.iter_mut().find(|c| c.status == invoice.status) {
            slot.count += 1;
            slot.amount += value;
        }
    }

    BudgetSummary {
        total_budget,
        total_paid,
        total_pending,
        overdue_amount,
        count_by_status: counts,
        roi: revenue.map(|r| calculate_roi(r, total_paid)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{approx, invoice};

    fn demo_invoices() -> Vec<Invoice> {
        vec![
            invoice(15_000.0, InvoiceStatus::Paid),
            invoice(22_500.0, InvoiceStatus::Paid),
            invoice(18_000.0, InvoiceStatus::Invoiced),
            invoice(10_000.0, InvoiceStatus::NotPaid),
            invoice(12_000.0, InvoiceStatus::Paid),
            invoice(20_000.0, InvoiceStatus::Pending),
            invoice(10_000.0, InvoiceStatus::Invoiced),
            invoice(2_500.0, InvoiceStatus::Paid),
        ]
    }

    #[test]
    fn summary_totals() {
        let summary = summarize_budget(&demo_invoices(), None);
        assert!(approx(summary.total_budget, 110_000.0));
        assert!(approx(summary.total_paid, 52_000.0));
        assert!(approx(summary.total_pending, 58_000.0));
        assert!(approx(summary.overdue_amount, 10_000.0));
        assert!(approx(
            summary.total_paid + summary.total_pending,
            summary.total_budget
        ));
        assert_eq!(summary.roi, None);
    }

    #[test]
    fn counts_follow_status_order() {
        let summary = summarize_budget(&demo_invoices(), None);
        let statuses: Vec<InvoiceStatus> =
            summary.count_by_status.iter().map(|c| c.status).collect();
        assert_eq!(statuses, InvoiceStatus::ALL.to_vec());
        let counts: Vec<usize> = summary.count_by_status.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![1, 2, 4, 1, 0]);
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = summarize_budget(&[], Some(1000.0));
        assert!(approx(summary.total_budget, 0.0));
        assert_eq!(summary.count_by_status.len(), InvoiceStatus::ALL.len());
        assert_eq!(summary.roi, Some(0.0));
    }

    #[test]
    fn roi_against_paid_spend() {
        let invoices = vec![
            invoice(1_000.0, InvoiceStatus::Paid),
            invoice(5_000.0, InvoiceStatus::Pending),
        ];
        let summary = summarize_budget(&invoices, Some(1_500.0));
        assert!(approx(summary.roi.unwrap(), 50.0));
    }

    #[test]
    fn malformed_amounts_count_as_zero() {
        let invoices = vec![
            invoice(f64::NAN, InvoiceStatus::Paid),
            invoice(-20.0, InvoiceStatus::Pending),
            invoice(30.0, InvoiceStatus::Cancelled),
        ];
        let summary = summarize_budget(&invoices, None);
        assert!(approx(summary.total_budget, 30.0));
        assert!(approx(summary.total_paid, 0.0));
        assert!(approx(summary.total_pending, 30.0));
    }

    #[test]
    fn status_and_period_parse() {
        assert_eq!(
            "not_paid".parse::<InvoiceStatus>().unwrap(),
            InvoiceStatus::NotPaid
        );
        assert!("overdue".parse::<InvoiceStatus>().is_err());
        assert_eq!(
            "one_time".parse::<BudgetPeriod>().unwrap(),
            BudgetPeriod::OneTime
        );
        assert_eq!(
            serde_json::to_string(&BudgetPeriod::OneTime).unwrap(),
            "\"one_time\""
        );
    }
}
