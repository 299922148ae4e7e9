//! Publication gate: duplicate check + daily/monthly quota accounting.
//!
//! Advisory, recomputed on every call from the persisted history, so there
//! is no mutable counter state to drift after a crash or restart. Calendar
//! windows are UTC only.

use anyhow::Result;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaKind {
    Daily,
    Monthly,
}

/// Outcome of one gate evaluation. Duplicate denial is terminal and checked
/// before quotas, so a duplicate never consumes a quota decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum GateOutcome {
    Allowed { daily_used: u32, monthly_used: u32 },
    DeniedDuplicate,
    DeniedQuota { kind: QuotaKind },
}

#[derive(Debug, Clone, Copy)]
pub struct QuotaLimits {
    pub daily: u32,
    pub monthly: u32,
}

/// Half-open UTC calendar windows containing `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaBounds {
    pub day_start: DateTime<Utc>,
    pub next_day: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
    pub next_month: DateTime<Utc>,
}

fn utc_midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid UTC calendar date")
}

/// Pure calendar math; December rolls over to January of the next year.
pub fn quota_bounds(now: DateTime<Utc>) -> QuotaBounds {
    let day_start = utc_midnight(now.year(), now.month(), now.day());
    let next_day = day_start + chrono::Duration::days(1);
    let month_start = utc_midnight(now.year(), now.month(), 1);
    let next_month = if now.month() == 12 {
        utc_midnight(now.year() + 1, 1, 1)
    } else {
        utc_midnight(now.year(), now.month() + 1, 1)
    };
    QuotaBounds {
        day_start,
        next_day,
        month_start,
        next_month,
    }
}

/// Evaluate the gate for one candidate fingerprint at `now`.
pub async fn check(
    store: &Store,
    fp: &str,
    limits: QuotaLimits,
    now: DateTime<Utc>,
) -> Result<GateOutcome> {
    if store.has_been_posted(fp).await? {
        return Ok(GateOutcome::DeniedDuplicate);
    }

    let bounds = quota_bounds(now);
    let daily_used = store
        .count_posted_between(bounds.day_start, bounds.next_day)
        .await?;
    if daily_used >= limits.daily {
        return Ok(GateOutcome::DeniedQuota {
            kind: QuotaKind::Daily,
        });
    }

    let monthly_used = store
        .count_posted_between(bounds.month_start, bounds.next_month)
        .await?;
    if monthly_used >= limits.monthly {
        return Ok(GateOutcome::DeniedQuota {
            kind: QuotaKind::Monthly,
        });
    }

    Ok(GateOutcome::Allowed {
        daily_used,
        monthly_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).single().unwrap()
    }

    #[test]
    fn bounds_cover_the_current_day_and_month() {
        let b = quota_bounds(at(2025, 8, 16, 14));
        assert_eq!(b.day_start, at(2025, 8, 16, 0));
        assert_eq!(b.next_day, at(2025, 8, 17, 0));
        assert_eq!(b.month_start, at(2025, 8, 1, 0));
        assert_eq!(b.next_month, at(2025, 9, 1, 0));
    }

    #[test]
    fn december_rolls_into_next_january() {
        let b = quota_bounds(at(2025, 12, 31, 23));
        assert_eq!(b.month_start, at(2025, 12, 1, 0));
        assert_eq!(b.next_month, at(2026, 1, 1, 0));
        assert_eq!(b.next_day, at(2026, 1, 1, 0));
    }

    #[test]
    fn january_first_starts_a_fresh_month() {
        let b = quota_bounds(at(2026, 1, 1, 0));
        assert_eq!(b.month_start, at(2026, 1, 1, 0));
        assert_eq!(b.next_month, at(2026, 2, 1, 0));
    }
}
