//! Read helpers for the task store.
//!
//! All functions take a shared `&Connection` and return typed rows with
//! their checklists attached. Listing is always scoped to one owner.

use super::from_us;
use crate::error::TaskError;
use crate::ids::{CHECKLIST_PREFIX, TASK_PREFIX, normalize_prefix};
use crate::model::{ChecklistItem, Interval, Recurrence, RecurrenceKind, Task};
use anyhow::{Context, Result};
use rusqlite::{Connection, params, types::Type};
use std::collections::HashMap;

const TASK_COLUMNS: &str = "task_id, owner, title, description, is_pinned, is_completed, \
     due_at_us, completed_at_us, position, is_recurring, recurring_type, \
     recurring_interval, created_at_us, updated_at_us";

/// Longest candidate list reported for an ambiguous prefix.
const AMBIGUOUS_SAMPLE: usize = 5;

/// Every task of `owner` ordered by position, oldest first on ties.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tasks(conn: &Connection, owner: &str) -> Result<Vec<Task>> {
    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE owner = ?1 \
         ORDER BY position ASC, created_at_us ASC, task_id ASC"
    );
    let mut stmt = conn.prepare(&sql).context("prepare list_tasks query")?;
    let mut tasks = stmt
        .query_map(params![owner], row_to_task)
        .context("execute list_tasks query")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read task rows")?;

    let mut checklists = checklists_for_owner(conn, owner)?;
    for task in &mut tasks {
        if let Some(items) = checklists.remove(&task.id) {
            task.checklist = items;
        }
    }
    Ok(tasks)
}

/// Fetch one task by exact id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_task(conn: &Connection, task_id: &str) -> Result<Option<Task>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = ?1");
    let mut stmt = conn.prepare(&sql).context("prepare get_task query")?;

    let mut task = match stmt.query_row(params![task_id], row_to_task) {
        Ok(task) => task,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e).context(format!("get_task for '{task_id}'")),
    };
    task.checklist = get_checklist(conn, task_id)?;
    Ok(Some(task))
}

/// Checklist of one task in display order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_checklist(conn: &Connection, task_id: &str) -> Result<Vec<ChecklistItem>> {
    let mut stmt = conn
        .prepare(
            "SELECT item_id, task_id, text, is_checked, position FROM checklist_items \
             WHERE task_id = ?1 ORDER BY position ASC, created_at_us ASC",
        )
        .context("prepare get_checklist query")?;
    let items = stmt
        .query_map(params![task_id], row_to_checklist_item)
        .context("execute get_checklist query")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read checklist rows")?;
    Ok(items)
}

/// Number of tasks `owner` has, completed ones included.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_tasks(conn: &Connection, owner: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE owner = ?1",
        params![owner],
        |row| row.get(0),
    )
    .context("count tasks")
}

/// Resolve user input (full id, id without `tk-`, or a unique prefix) to a
/// task id owned by `owner`.
///
/// # Errors
///
/// Returns [`TaskError::NotFound`] or [`TaskError::AmbiguousId`] wrapped in
/// `anyhow`, or an error if the query fails.
pub fn resolve_task_id(conn: &Connection, owner: &str, input: &str) -> Result<String> {
    let candidate = normalize_prefix(input, TASK_PREFIX);
    let matches = prefix_matches(
        conn,
        "SELECT task_id FROM tasks WHERE owner = ?1 AND task_id = ?2",
        "SELECT task_id FROM tasks \
         WHERE owner = ?1 AND substr(task_id, 1, length(?2)) = ?2 \
         ORDER BY task_id LIMIT ?3",
        owner,
        &candidate,
    )?;
    pick_one(matches, input, || TaskError::NotFound(input.trim().to_string()))
}

/// Resolve user input to a checklist item on one of `owner`'s tasks.
///
/// # Errors
///
/// Returns [`TaskError::ChecklistItemNotFound`] or [`TaskError::AmbiguousId`]
/// wrapped in `anyhow`, or an error if the query fails.
pub fn resolve_checklist_item(
    conn: &Connection,
    owner: &str,
    input: &str,
) -> Result<ChecklistItem> {
    let candidate = normalize_prefix(input, CHECKLIST_PREFIX);
    let matches = prefix_matches(
        conn,
        "SELECT c.item_id FROM checklist_items c JOIN tasks t ON t.task_id = c.task_id \
         WHERE t.owner = ?1 AND c.item_id = ?2",
        "SELECT c.item_id FROM checklist_items c JOIN tasks t ON t.task_id = c.task_id \
         WHERE t.owner = ?1 AND substr(c.item_id, 1, length(?2)) = ?2 \
         ORDER BY c.item_id LIMIT ?3",
        owner,
        &candidate,
    )?;
    let item_id = pick_one(matches, input, || {
        TaskError::ChecklistItemNotFound(input.trim().to_string())
    })?;

    conn.query_row(
        "SELECT item_id, task_id, text, is_checked, position FROM checklist_items \
         WHERE item_id = ?1",
        params![item_id],
        row_to_checklist_item,
    )
    .with_context(|| format!("load checklist item '{item_id}'"))
}

fn prefix_matches(
    conn: &Connection,
    exact_sql: &str,
    prefix_sql: &str,
    owner: &str,
    candidate: &str,
) -> Result<Vec<String>> {
    let exact: Option<String> = match conn.query_row(exact_sql, params![owner, candidate], |row| {
        row.get(0)
    }) {
        Ok(id) => Some(id),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(e).context("exact id lookup"),
    };
    if let Some(id) = exact {
        return Ok(vec![id]);
    }

    let limit = i64::try_from(AMBIGUOUS_SAMPLE + 1).unwrap_or(i64::MAX);
    let mut stmt = conn.prepare(prefix_sql).context("prepare prefix lookup")?;
    let ids = stmt
        .query_map(params![owner, candidate, limit], |row| row.get(0))
        .context("execute prefix lookup")?
        .collect::<rusqlite::Result<Vec<String>>>()
        .context("read prefix matches")?;
    Ok(ids)
}

fn pick_one(
    mut matches: Vec<String>,
    input: &str,
    not_found: impl FnOnce() -> TaskError,
) -> Result<String> {
    match matches.len() {
        0 => Err(not_found().into()),
        1 => Ok(matches.remove(0)),
        _ => {
            matches.truncate(AMBIGUOUS_SAMPLE);
            Err(TaskError::AmbiguousId {
                prefix: input.trim().to_string(),
                matches,
            }
            .into())
        }
    }
}

fn checklists_for_owner(
    conn: &Connection,
    owner: &str,
) -> Result<HashMap<String, Vec<ChecklistItem>>> {
    let mut stmt = conn
        .prepare(
            "SELECT c.item_id, c.task_id, c.text, c.is_checked, c.position \
             FROM checklist_items c JOIN tasks t ON t.task_id = c.task_id \
             WHERE t.owner = ?1 \
             ORDER BY c.task_id, c.position ASC, c.created_at_us ASC",
        )
        .context("prepare checklist query")?;
    let rows = stmt
        .query_map(params![owner], row_to_checklist_item)
        .context("execute checklist query")?;

    let mut grouped: HashMap<String, Vec<ChecklistItem>> = HashMap::new();
    for row in rows {
        let item = row.context("read checklist row")?;
        grouped.entry(item.task_id.clone()).or_default().push(item);
    }
    Ok(grouped)
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let is_recurring = row.get::<_, i64>(9)? != 0;
    let recurrence = if is_recurring {
        let kind: String = row.get(10)?;
        let interval: String = row.get(11)?;
        Some(Recurrence::new(
            kind.parse::<RecurrenceKind>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e)))?,
            interval
                .parse::<Interval>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?,
        ))
    } else {
        None
    };

    Ok(Task {
        id: row.get(0)?,
        owner: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        is_pinned: row.get::<_, i64>(4)? != 0,
        is_completed: row.get::<_, i64>(5)? != 0,
        due_date: row
            .get::<_, Option<i64>>(6)?
            .map(|us| from_us(6, us))
            .transpose()?,
        completed_at: row
            .get::<_, Option<i64>>(7)?
            .map(|us| from_us(7, us))
            .transpose()?,
        position: row.get(8)?,
        recurrence,
        created_at: from_us(12, row.get(12)?)?,
        updated_at: from_us(13, row.get(13)?)?,
        checklist: Vec::new(),
    })
}

fn row_to_checklist_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChecklistItem> {
    Ok(ChecklistItem {
        id: row.get(0)?,
        task_id: row.get(1)?,
        text: row.get(2)?,
        is_checked: row.get::<_, i64>(3)? != 0,
        position: row.get(4)?,
    })
}
