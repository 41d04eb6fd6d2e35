//! Recurring-task rollover.
//!
//! When a recurring task is completed, [`next_occurrence`] builds the draft of
//! its successor. The computation is pure: persisting the draft is the
//! caller's job (see [`crate::organizer::Organizer::toggle_complete`]).
//!
//! Rules:
//! - simple: title and description carry over unchanged
//! - progressive: the first digit run in the title is incremented in place
//!   and the description is cleared
//! - the due date moves one day, week or month forward in the local wall
//!   clock; a missing due date stays missing

use crate::clock::resolve_local;
use crate::model::{Interval, RecurrenceKind, Task, TaskDraft};
use chrono::{DateTime, Datelike, Days, Months, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

/// Increment the first run of ASCII digits in `title`.
///
/// Returns `None` when the title has no digits or the number overflows.
/// Leading zeros are not preserved: `"Run 007"` becomes `"Run 8"`.
#[must_use]
pub fn increment_first_number(title: &str) -> Option<String> {
    let start = title.find(|c: char| c.is_ascii_digit())?;
    let len = title[start..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(title.len() - start);
    let end = start + len;

    let current: u64 = title[start..end].parse().ok()?;
    let next = current.checked_add(1)?;

    Some(format!("{}{next}{}", &title[..start], &title[end..]))
}

/// Title of the successor task.
#[must_use]
pub fn next_title(kind: RecurrenceKind, title: &str) -> String {
    match kind {
        RecurrenceKind::Simple => title.to_string(),
        RecurrenceKind::Progressive => {
            increment_first_number(title).unwrap_or_else(|| title.to_string())
        }
    }
}

/// Advance `due` by one `interval`, keeping the wall-clock time in `zone`.
///
/// Monthly steps keep the day of month; days past the end of a shorter month
/// spill into the next one (Jan 31 → Mar 2 in 2024). If the step can't be
/// represented the date is returned as is.
#[must_use]
pub fn advance_due<Z: TimeZone>(due: DateTime<Utc>, interval: Interval, zone: &Z) -> DateTime<Utc> {
    let local = due.with_timezone(zone).naive_local();
    let stepped = match interval {
        Interval::Daily => local.checked_add_days(Days::new(1)),
        Interval::Weekly => local.checked_add_days(Days::new(7)),
        Interval::Monthly => add_month(local),
    };

    stepped
        .and_then(|naive| resolve_local(zone, naive))
        .unwrap_or(due)
}

fn add_month(local: NaiveDateTime) -> Option<NaiveDateTime> {
    let first = local.date().with_day(1)?.checked_add_months(Months::new(1))?;
    let date = first.checked_add_days(Days::new(u64::from(local.day() - 1)))?;
    Some(date.and_time(local.time()))
}

/// Draft of the task that replaces `task` once it's completed.
///
/// `None` when the task doesn't recur.
#[must_use]
pub fn next_occurrence<Z: TimeZone>(task: &Task, zone: &Z) -> Option<TaskDraft> {
    let recurrence = task.recurrence?;

    let title = next_title(recurrence.kind, &task.title);
    let description = match recurrence.kind {
        RecurrenceKind::Simple => task.description.clone(),
        RecurrenceKind::Progressive => String::new(),
    };
    let due_date = task
        .due_date
        .map(|due| advance_due(due, recurrence.interval, zone));

    debug!(
        task = %task.id,
        %recurrence,
        next_title = %title,
        next_due = ?due_date,
        "computed next occurrence"
    );

    Some(TaskDraft {
        title,
        description,
        is_pinned: task.is_pinned,
        due_date,
        position: task.position,
        recurrence: Some(recurrence),
        checklist: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DstZone;
    use crate::model::Recurrence;
    use chrono::{FixedOffset, NaiveDate};
    use proptest::prelude::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn recurring(title: &str, kind: RecurrenceKind, interval: Interval) -> Task {
        let ts = utc(2023, 12, 1, 0, 0);
        Task {
            id: "tk-rec00001".into(),
            owner: "alice".into(),
            title: title.into(),
            description: "notes".into(),
            is_pinned: true,
            is_completed: false,
            due_date: Some(utc(2024, 1, 1, 10, 0)),
            completed_at: None,
            position: 4,
            recurrence: Some(Recurrence::new(kind, interval)),
            created_at: ts,
            updated_at: ts,
            checklist: Vec::new(),
        }
    }

    #[test]
    fn progressive_increments_first_number() {
        assert_eq!(increment_first_number("Run 3").as_deref(), Some("Run 4"));
        assert_eq!(
            increment_first_number("Week 9 of 12").as_deref(),
            Some("Week 10 of 12")
        );
        assert_eq!(increment_first_number("42").as_deref(), Some("43"));
        assert_eq!(increment_first_number("Run 007").as_deref(), Some("Run 8"));
    }

    #[test]
    fn titles_without_digits_are_left_alone() {
        assert_eq!(increment_first_number("Water plants"), None);
        assert_eq!(
            next_title(RecurrenceKind::Progressive, "Water plants"),
            "Water plants"
        );
    }

    #[test]
    fn overflowing_number_is_left_alone() {
        let title = format!("Lap {}", u64::MAX);
        assert_eq!(increment_first_number(&title), None);
        assert_eq!(next_title(RecurrenceKind::Progressive, &title), title);
    }

    #[test]
    fn simple_keeps_title_and_description() {
        let task = recurring("Run 3", RecurrenceKind::Simple, Interval::Weekly);
        let next = next_occurrence(&task, &Utc).unwrap();
        assert_eq!(next.title, "Run 3");
        assert_eq!(next.description, "notes");
        assert_eq!(next.due_date, Some(utc(2024, 1, 8, 10, 0)));
        assert_eq!(next.position, 4);
        assert!(next.is_pinned);
        assert_eq!(next.recurrence, task.recurrence);
    }

    #[test]
    fn progressive_bumps_title_and_clears_description() {
        let task = recurring("Run 3", RecurrenceKind::Progressive, Interval::Daily);
        let next = next_occurrence(&task, &Utc).unwrap();
        assert_eq!(next.title, "Run 4");
        assert!(next.description.is_empty());
        assert_eq!(next.due_date, Some(utc(2024, 1, 2, 10, 0)));
    }

    #[test]
    fn missing_due_date_stays_missing() {
        let mut task = recurring("Stretch", RecurrenceKind::Simple, Interval::Monthly);
        task.due_date = None;
        let next = next_occurrence(&task, &Utc).unwrap();
        assert_eq!(next.due_date, None);
    }

    #[test]
    fn non_recurring_has_no_successor() {
        let mut task = recurring("Once", RecurrenceKind::Simple, Interval::Daily);
        task.recurrence = None;
        assert!(next_occurrence(&task, &Utc).is_none());
    }

    #[test]
    fn monthly_overflow_spills_into_next_month() {
        let jan31 = utc(2024, 1, 31, 18, 30);
        assert_eq!(
            advance_due(jan31, Interval::Monthly, &Utc),
            utc(2024, 3, 2, 18, 30)
        );
        let jan30_2023 = utc(2023, 1, 30, 8, 0);
        assert_eq!(
            advance_due(jan30_2023, Interval::Monthly, &Utc),
            utc(2023, 3, 2, 8, 0)
        );
        let feb29 = utc(2024, 2, 29, 7, 0);
        assert_eq!(
            advance_due(feb29, Interval::Monthly, &Utc),
            utc(2024, 3, 29, 7, 0)
        );
        let dec15 = utc(2023, 12, 15, 9, 0);
        assert_eq!(
            advance_due(dec15, Interval::Monthly, &Utc),
            utc(2024, 1, 15, 9, 0)
        );
    }

    #[test]
    fn steps_use_local_calendar_of_zone() {
        // 23:30 on Jan 15 at UTC+2 is 21:30 UTC; a month later locally is Feb 15 23:30.
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let due = utc(2024, 1, 15, 21, 30);
        let expected = NaiveDate::from_ymd_opt(2024, 2, 15)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        let next = advance_due(due, Interval::Monthly, &zone);
        assert_eq!(next.with_timezone(&zone).naive_local(), expected);
    }

    #[test]
    fn daily_keeps_nine_am_across_spring_forward() {
        // 09:00 EST on Mar 9 → 09:00 EDT on Mar 10, only 23 hours later.
        let due = utc(2024, 3, 9, 14, 0);
        assert_eq!(advance_due(due, Interval::Daily, &DstZone), utc(2024, 3, 10, 13, 0));
    }

    #[test]
    fn weekly_keeps_nine_am_across_fall_back() {
        // 09:00 EDT on Oct 30 → 09:00 EST on Nov 6.
        let due = utc(2024, 10, 30, 13, 0);
        assert_eq!(advance_due(due, Interval::Weekly, &DstZone), utc(2024, 11, 6, 14, 0));
    }

    #[test]
    fn step_into_spring_gap_lands_an_hour_later() {
        // 02:30 EST on Mar 9; 02:30 on Mar 10 doesn't exist, so 03:30 EDT.
        let due = utc(2024, 3, 9, 7, 30);
        assert_eq!(advance_due(due, Interval::Daily, &DstZone), utc(2024, 3, 10, 7, 30));
    }

    #[test]
    fn step_into_repeated_hour_takes_first_pass() {
        // 01:30 EDT on Oct 27 → 01:30 on Nov 3, which occurs twice; the EDT one wins.
        let due = utc(2024, 10, 27, 5, 30);
        assert_eq!(advance_due(due, Interval::Weekly, &DstZone), utc(2024, 11, 3, 5, 30));
    }

    proptest! {
        #[test]
        fn increment_is_plus_one(prefix in "[a-zA-Z ]{0,8}", n in 0u64..1_000_000, suffix in "[a-zA-Z ]{0,8}") {
            let title = format!("{prefix}{n}{suffix}");
            let next = increment_first_number(&title).unwrap();
            prop_assert_eq!(next, format!("{prefix}{}{suffix}", n + 1));
        }

        #[test]
        fn daily_and_weekly_add_exact_days_in_utc(secs in 0i64..4_000_000_000) {
            let due = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
            prop_assert_eq!(advance_due(due, Interval::Daily, &Utc), due + chrono::Duration::days(1));
            prop_assert_eq!(advance_due(due, Interval::Weekly, &Utc), due + chrono::Duration::days(7));
        }

        #[test]
        fn monthly_keeps_time_of_day(secs in 0i64..4_000_000_000) {
            let due = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
            let next = advance_due(due, Interval::Monthly, &Utc);
            prop_assert!(next > due);
            prop_assert_eq!(next.time(), due.time());
        }
    }
}
