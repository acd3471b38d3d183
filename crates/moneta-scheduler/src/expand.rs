//! Recurrence expansion — pure calendar walk from a rule to concrete dates.
//!
//! The walk starts at the rule's `start_date` (never earlier), advances by a
//! frequency-specific step, and collects every qualifying instant inside the
//! requested window. No clock access and no side effects: identical inputs
//! always yield identical output, which is what lets the notification ledger
//! provide idempotency on top.

use chrono::{DateTime, Datelike, Duration, Months, Utc};

use moneta_core::types::{Frequency, Recurrence};

/// Hard cap on walk steps per expansion. Bounds runaway rules (e.g. a daily
/// rule whose start date is years in the past); hitting it silently truncates
/// the sequence rather than erroring.
pub const EXPANSION_CAP: usize = 1825;

/// Expand `rule` into the ordered occurrences falling within
/// `[window_start, window_end]` (both inclusive).
///
/// Returns an empty vec when the window is inverted, or — without iterating —
/// when the rule ended before the window opened.
pub fn expand(
    rule: &Recurrence,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    if window_start > window_end {
        return out;
    }
    // Fast-path: the rule's life ended before the window opened.
    if rule.end_date.is_some_and(|end| end < window_start) {
        return out;
    }

    let mut cursor = rule.start_date;
    let mut steps = 0usize;

    while cursor <= window_end {
        if steps >= EXPANSION_CAP {
            break;
        }
        steps += 1;

        if rule.end_date.is_some_and(|end| cursor > end) {
            break;
        }

        if qualifies(rule, cursor) && cursor >= window_start {
            out.push(cursor);
        }

        cursor = match advance(rule, cursor) {
            Some(next) => next,
            None => break,
        };
    }

    out
}

/// Whether `cursor` passes the rule's frequency-specific filter.
fn qualifies(rule: &Recurrence, cursor: DateTime<Utc>) -> bool {
    match rule.frequency {
        Frequency::Daily | Frequency::Yearly => true,
        Frequency::Weekly => {
            rule.by_day.is_empty()
                || rule
                    .by_day
                    .iter()
                    .any(|code| code.to_weekday() == cursor.weekday())
        }
        Frequency::Monthly => {
            rule.by_month_day.is_empty() || rule.by_month_day.contains(&cursor.day())
        }
    }
}

/// Advance the walk cursor by one step.
///
/// Weekly/monthly rules with a day filter walk one day at a time so the
/// filter sees every candidate; without a filter they jump by whole
/// weeks/months. `None` means the calendar arithmetic overflowed or the
/// target date does not exist in any reachable year — the walk stops.
fn advance(rule: &Recurrence, cursor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let step = rule.interval.max(1);
    match rule.frequency {
        Frequency::Daily => cursor.checked_add_signed(Duration::days(step as i64)),
        Frequency::Weekly => {
            if rule.by_day.is_empty() {
                cursor.checked_add_signed(Duration::weeks(step as i64))
            } else {
                cursor.checked_add_signed(Duration::days(1))
            }
        }
        Frequency::Monthly => {
            if rule.by_month_day.is_empty() {
                cursor.checked_add_months(Months::new(step))
            } else {
                cursor.checked_add_signed(Duration::days(1))
            }
        }
        Frequency::Yearly => add_years(cursor, step),
    }
}

/// Add `step` years, skipping years where the date does not exist
/// (Feb 29 recurs at most every 8 years, so 8 attempts suffice).
fn add_years(cursor: DateTime<Utc>, step: u32) -> Option<DateTime<Utc>> {
    let mut year = cursor.year();
    for _ in 0..8 {
        year = year.checked_add(step as i32)?;
        if let Some(next) = cursor.with_year(year) {
            return Some(next);
        }
    }
    None
}
