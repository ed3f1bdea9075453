//! Typed recurrence rule for financial transactions.
//!
//! The `financial_transactions` table stores the rule as an `occurrence` tag
//! plus four nullable config columns. This module reconstructs a validated
//! tagged enum from those columns and owns the calendar math used when a
//! template fans out into a series.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::entities::financial_transaction::{Model, OccurrenceKind};

/// How a template transaction repeats, with its config made explicit.
///
/// The interpretation of the config columns depends on the occurrence tag,
/// so the combination is validated once here instead of at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceRule {
    /// One-off transaction; never expands.
    Unique,
    /// Repeats every week on the given weekday.
    Weekly { day_of_week: Weekday },
    /// Repeats every month, anchored to a day of month (clamped to month end).
    Monthly { day_of_month: u32 },
    /// A fixed run of `count` installments (the template is installment 1),
    /// one month apart, anchored to `anchor_day`.
    Installments { count: u32, anchor_day: u32 },
}

impl RecurrenceRule {
    /// Builds a rule from the raw column values, validating that the config
    /// matches the occurrence tag.
    pub fn from_parts(
        occurrence: OccurrenceKind,
        day_of_week: Option<i16>,
        day_of_month: Option<i16>,
        installment_count: Option<i32>,
        installment_day: Option<i16>,
    ) -> Result<Self, String> {
        match occurrence {
            OccurrenceKind::Unique => Ok(RecurrenceRule::Unique),
            OccurrenceKind::Weekly => {
                let index = day_of_week
                    .ok_or_else(|| "weekly occurrence requires day_of_week".to_string())?;
                let day_of_week = weekday_from_index(index)
                    .ok_or_else(|| format!("day_of_week must be 0..=6, got {}", index))?;
                Ok(RecurrenceRule::Weekly { day_of_week })
            }
            OccurrenceKind::Monthly => {
                let day = day_of_month
                    .ok_or_else(|| "monthly occurrence requires day_of_month".to_string())?;
                if !(1..=31).contains(&day) {
                    return Err(format!("day_of_month must be 1..=31, got {}", day));
                }
                Ok(RecurrenceRule::Monthly {
                    day_of_month: day as u32,
                })
            }
            OccurrenceKind::Installments => {
                let count = installment_count
                    .ok_or_else(|| "installments occurrence requires installment_count".to_string())?;
                if count < 2 {
                    return Err(format!(
                        "installment_count must be at least 2, got {}",
                        count
                    ));
                }
                let anchor = installment_day
                    .ok_or_else(|| "installments occurrence requires installment_day".to_string())?;
                if !(1..=31).contains(&anchor) {
                    return Err(format!("installment_day must be 1..=31, got {}", anchor));
                }
                Ok(RecurrenceRule::Installments {
                    count: count as u32,
                    anchor_day: anchor as u32,
                })
            }
        }
    }

    /// Reconstructs the rule stored on a transaction row.
    pub fn from_row(row: &Model) -> Result<Self, String> {
        Self::from_parts(
            row.occurrence,
            row.day_of_week,
            row.day_of_month,
            row.installment_count,
            row.installment_day,
        )
    }

    /// The raw column values this rule persists as:
    /// `(day_of_week, day_of_month, installment_count, installment_day)`.
    pub fn column_values(&self) -> (Option<i16>, Option<i16>, Option<i32>, Option<i16>) {
        match *self {
            RecurrenceRule::Unique => (None, None, None, None),
            RecurrenceRule::Weekly { day_of_week } => {
                (Some(weekday_index(day_of_week)), None, None, None)
            }
            RecurrenceRule::Monthly { day_of_month } => {
                (None, Some(day_of_month as i16), None, None)
            }
            RecurrenceRule::Installments { count, anchor_day } => {
                (None, None, Some(count as i32), Some(anchor_day as i16))
            }
        }
    }

    pub fn occurrence(&self) -> OccurrenceKind {
        match self {
            RecurrenceRule::Unique => OccurrenceKind::Unique,
            RecurrenceRule::Weekly { .. } => OccurrenceKind::Weekly,
            RecurrenceRule::Monthly { .. } => OccurrenceKind::Monthly,
            RecurrenceRule::Installments { .. } => OccurrenceKind::Installments,
        }
    }

    /// Due date of the n-th sibling generated from a template due on
    /// `template_due` (n is 1-based; the template itself is occurrence 0).
    ///
    /// Returns `None` for `Unique`.
    pub fn nth_due_date(&self, template_due: NaiveDate, n: u32) -> Option<NaiveDate> {
        match *self {
            RecurrenceRule::Unique => None,
            RecurrenceRule::Weekly { day_of_week } => {
                Some(nth_weekly(template_due, day_of_week, n))
            }
            RecurrenceRule::Monthly { day_of_month } => {
                Some(add_months_clamped(template_due, n, day_of_month))
            }
            RecurrenceRule::Installments { anchor_day, .. } => {
                Some(add_months_clamped(template_due, n, anchor_day))
            }
        }
    }
}

/// 0 = Monday .. 6 = Sunday, matching `Weekday::num_days_from_monday`.
pub fn weekday_from_index(index: i16) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_index(day: Weekday) -> i16 {
    day.num_days_from_monday() as i16
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // First of next month minus one day is always valid.
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    first_of_next.pred_opt().map(|d| d.day()).unwrap_or(28)
}

/// The anchor day within a month, clamped to the month's last day
/// (Jan 31 anchored series lands on Feb 28/29).
pub fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap())
}

/// Advances `from` by `months` calendar months, re-anchoring to `anchor_day`
/// with month-end clamping.
pub fn add_months_clamped(from: NaiveDate, months: u32, anchor_day: u32) -> NaiveDate {
    let total = from.month0() + months;
    let year = from.year() + (total / 12) as i32;
    let month = total % 12 + 1;
    clamped_date(year, month, anchor_day)
}

/// The n-th weekly occurrence after `start` that lands on `target` (n >= 1).
/// When `start` is already on `target`, the first occurrence is one week out.
fn nth_weekly(start: NaiveDate, target: Weekday, n: u32) -> NaiveDate {
    let offset = (7 + target.num_days_from_monday() as i64
        - start.weekday().num_days_from_monday() as i64)
        % 7;
    let first = if offset == 0 {
        start + Duration::days(7)
    } else {
        start + Duration::days(offset)
    };
    first + Duration::days(7 * (n as i64 - 1))
}
