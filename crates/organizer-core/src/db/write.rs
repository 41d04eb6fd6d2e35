//! Write helpers for the task store.
//!
//! Each helper is a single statement (or a short fixed sequence) against a
//! `&Connection`. Callers that need several helpers to land together pass a
//! `Transaction`, which derefs to `Connection`.

use crate::error::TaskError;
use crate::ids::{new_checklist_id, new_task_id};
use crate::model::{ChecklistDraft, Recurrence, TaskDraft};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

type RecurrenceColumns = (i64, Option<&'static str>, Option<&'static str>);

fn recurrence_columns(recurrence: Option<Recurrence>) -> RecurrenceColumns {
    recurrence.map_or((0, None, None), |r| {
        (1, Some(r.kind.as_str()), Some(r.interval.as_str()))
    })
}

fn ensure_touched(changed: usize, task_id: &str) -> Result<()> {
    if changed == 0 {
        return Err(TaskError::NotFound(task_id.to_string()).into());
    }
    Ok(())
}

/// Insert a new task and its checklist. Returns the generated task id.
///
/// # Errors
///
/// Returns an error if an insert fails.
pub fn insert_task(
    conn: &Connection,
    owner: &str,
    draft: &TaskDraft,
    now: DateTime<Utc>,
) -> Result<String> {
    let task_id = new_task_id();
    let (is_recurring, recurring_type, recurring_interval) = recurrence_columns(draft.recurrence);
    let now_us = now.timestamp_micros();

    conn.execute(
        "INSERT INTO tasks (task_id, owner, title, description, is_pinned, is_completed, \
         due_at_us, completed_at_us, position, is_recurring, recurring_type, \
         recurring_interval, created_at_us, updated_at_us) \
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, NULL, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            task_id,
            owner,
            draft.title,
            draft.description,
            i64::from(draft.is_pinned),
            draft.due_date.map(|d| d.timestamp_micros()),
            draft.position,
            is_recurring,
            recurring_type,
            recurring_interval,
            now_us,
        ],
    )
    .with_context(|| format!("insert task '{}'", draft.title))?;

    insert_checklist(conn, &task_id, &draft.checklist, now)?;
    Ok(task_id)
}

/// Overwrite the editable fields of a task. The checklist is left alone;
/// see [`replace_checklist`].
///
/// # Errors
///
/// Returns [`TaskError::NotFound`] if no row matched, or an error if the
/// update fails.
pub fn update_task_fields(
    conn: &Connection,
    task_id: &str,
    draft: &TaskDraft,
    now: DateTime<Utc>,
) -> Result<()> {
    let (is_recurring, recurring_type, recurring_interval) = recurrence_columns(draft.recurrence);
    let changed = conn
        .execute(
            "UPDATE tasks SET title = ?2, description = ?3, is_pinned = ?4, due_at_us = ?5, \
             position = ?6, is_recurring = ?7, recurring_type = ?8, recurring_interval = ?9, \
             updated_at_us = ?10 \
             WHERE task_id = ?1",
            params![
                task_id,
                draft.title,
                draft.description,
                i64::from(draft.is_pinned),
                draft.due_date.map(|d| d.timestamp_micros()),
                draft.position,
                is_recurring,
                recurring_type,
                recurring_interval,
                now.timestamp_micros(),
            ],
        )
        .with_context(|| format!("update task '{task_id}'"))?;
    ensure_touched(changed, task_id)
}

/// Mark a task completed at `completed_at`, or open again when `None`.
///
/// # Errors
///
/// Returns [`TaskError::NotFound`] if no row matched, or an error if the
/// update fails.
pub fn set_completion(
    conn: &Connection,
    task_id: &str,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE tasks SET is_completed = ?2, completed_at_us = ?3, updated_at_us = ?4 \
             WHERE task_id = ?1",
            params![
                task_id,
                i64::from(completed_at.is_some()),
                completed_at.map(|d| d.timestamp_micros()),
                now.timestamp_micros(),
            ],
        )
        .with_context(|| format!("set completion of '{task_id}'"))?;
    ensure_touched(changed, task_id)
}

/// # Errors
///
/// Returns [`TaskError::NotFound`] if no row matched, or an error if the
/// update fails.
pub fn update_description(
    conn: &Connection,
    task_id: &str,
    description: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE tasks SET description = ?2, updated_at_us = ?3 WHERE task_id = ?1",
            params![task_id, description, now.timestamp_micros()],
        )
        .with_context(|| format!("update description of '{task_id}'"))?;
    ensure_touched(changed, task_id)
}

/// # Errors
///
/// Returns [`TaskError::NotFound`] if no row matched, or an error if the
/// update fails.
pub fn set_position(
    conn: &Connection,
    task_id: &str,
    position: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE tasks SET position = ?2, updated_at_us = ?3 WHERE task_id = ?1",
            params![task_id, position, now.timestamp_micros()],
        )
        .with_context(|| format!("set position of '{task_id}'"))?;
    ensure_touched(changed, task_id)
}

/// Delete a task; its checklist goes with it. Returns whether a row existed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_task(conn: &Connection, task_id: &str) -> Result<bool> {
    let changed = conn
        .execute("DELETE FROM tasks WHERE task_id = ?1", params![task_id])
        .with_context(|| format!("delete task '{task_id}'"))?;
    Ok(changed > 0)
}

/// Replace a task's checklist with `items`, numbered in order.
///
/// # Errors
///
/// Returns an error if a statement fails.
pub fn replace_checklist(
    conn: &Connection,
    task_id: &str,
    items: &[ChecklistDraft],
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "DELETE FROM checklist_items WHERE task_id = ?1",
        params![task_id],
    )
    .with_context(|| format!("clear checklist of '{task_id}'"))?;
    insert_checklist(conn, task_id, items, now)
}

/// Flip one checklist item. Returns its new checked state.
///
/// # Errors
///
/// Returns [`TaskError::ChecklistItemNotFound`] if no row matched, or an
/// error if a statement fails.
pub fn toggle_checklist_item(conn: &Connection, item_id: &str, now: DateTime<Utc>) -> Result<bool> {
    let checked: i64 = match conn.query_row(
        "UPDATE checklist_items SET is_checked = 1 - is_checked WHERE item_id = ?1 \
         RETURNING is_checked",
        params![item_id],
        |row| row.get(0),
    ) {
        Ok(value) => value,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(TaskError::ChecklistItemNotFound(item_id.to_string()).into());
        }
        Err(e) => return Err(e).with_context(|| format!("toggle checklist item '{item_id}'")),
    };

    conn.execute(
        "UPDATE tasks SET updated_at_us = ?2 \
         WHERE task_id = (SELECT task_id FROM checklist_items WHERE item_id = ?1)",
        params![item_id, now.timestamp_micros()],
    )
    .with_context(|| format!("touch task of checklist item '{item_id}'"))?;

    Ok(checked != 0)
}

fn insert_checklist(
    conn: &Connection,
    task_id: &str,
    items: &[ChecklistDraft],
    now: DateTime<Utc>,
) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    let mut stmt = conn
        .prepare(
            "INSERT INTO checklist_items (item_id, task_id, text, is_checked, position, \
             created_at_us) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .context("prepare checklist insert")?;
    for (position, item) in (0_i64..).zip(items) {
        stmt.execute(params![
            new_checklist_id(),
            task_id,
            item.text,
            i64::from(item.is_checked),
            position,
            now.timestamp_micros(),
        ])
        .with_context(|| format!("insert checklist item for '{task_id}'"))?;
    }
    Ok(())
}
