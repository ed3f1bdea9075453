use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Due-date bucket a pending transaction falls into, relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DueBucket {
    /// Pending and past its due date.
    Overdue,
    /// Pending and due today.
    DueToday,
    /// Pending with a due date in the future.
    Upcoming,
    /// Already settled.
    Paid,
}

impl DueBucket {
    /// Classifies a transaction by status and due date.
    pub fn classify(paid: bool, due_date: NaiveDate, today: NaiveDate) -> Self {
        if paid {
            DueBucket::Paid
        } else if due_date < today {
            DueBucket::Overdue
        } else if due_date == today {
            DueBucket::DueToday
        } else {
            DueBucket::Upcoming
        }
    }
}

/// Count and total value of one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BucketTotals {
    pub count: u64,
    pub total: Decimal,
}

impl BucketTotals {
    pub fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.total += amount;
    }
}

/// Count and total value grouped by payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentMethodTotals {
    /// Payment method label, or "unspecified" when the row carries none.
    pub payment_method: String,
    pub count: u64,
    pub total: Decimal,
}

/// Aggregated view of one company's payables or receivables, computed over
/// trusted rows only (validated and not rejected).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransactionSummary {
    pub overdue: BucketTotals,
    pub due_today: BucketTotals,
    pub upcoming: BucketTotals,
    pub paid: BucketTotals,
    pub by_payment_method: Vec<PaymentMethodTotals>,
}

impl TransactionSummary {
    pub fn bucket_mut(&mut self, bucket: DueBucket) -> &mut BucketTotals {
        match bucket {
            DueBucket::Overdue => &mut self.overdue,
            DueBucket::DueToday => &mut self.due_today,
            DueBucket::Upcoming => &mut self.upcoming,
            DueBucket::Paid => &mut self.paid,
        }
    }
}
