//! SQLite schema for the task store.
//!
//! - `tasks` holds one row per task; the three recurrence columns are either
//!   all set or all empty
//! - `checklist_items` hangs off a task and goes away with it
//! - `store_meta` mirrors the schema version for tools that can't read
//!   `PRAGMA user_version`
//!
//! Timestamps are microseconds since the Unix epoch.

/// Migration v1: tasks, checklists and store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS tasks (
    task_id TEXT PRIMARY KEY,
    owner TEXT NOT NULL CHECK (length(trim(owner)) > 0),
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT NOT NULL DEFAULT '',
    is_pinned INTEGER NOT NULL DEFAULT 0 CHECK (is_pinned IN (0, 1)),
    is_completed INTEGER NOT NULL DEFAULT 0 CHECK (is_completed IN (0, 1)),
    due_at_us INTEGER,
    completed_at_us INTEGER,
    position INTEGER NOT NULL DEFAULT 0,
    is_recurring INTEGER NOT NULL DEFAULT 0 CHECK (is_recurring IN (0, 1)),
    recurring_type TEXT CHECK (
        recurring_type IS NULL OR recurring_type IN ('simple', 'progressive')
    ),
    recurring_interval TEXT CHECK (
        recurring_interval IS NULL OR recurring_interval IN ('daily', 'weekly', 'monthly')
    ),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (task_id LIKE 'tk-%'),
    CHECK (
        (is_recurring = 1 AND recurring_type IS NOT NULL AND recurring_interval IS NOT NULL)
        OR (is_recurring = 0 AND recurring_type IS NULL AND recurring_interval IS NULL)
    )
);

CREATE TABLE IF NOT EXISTS checklist_items (
    item_id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL REFERENCES tasks(task_id) ON DELETE CASCADE,
    text TEXT NOT NULL,
    is_checked INTEGER NOT NULL DEFAULT 0 CHECK (is_checked IN (0, 1)),
    position INTEGER NOT NULL DEFAULT 0,
    created_at_us INTEGER NOT NULL,
    CHECK (item_id LIKE 'ci-%')
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);
";

/// Migration v2: indexes for the per-owner listing and checklist loads.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_tasks_owner_position
    ON tasks(owner, position, created_at_us);

CREATE INDEX IF NOT EXISTS idx_tasks_owner_due
    ON tasks(owner, is_completed, due_at_us);

CREATE INDEX IF NOT EXISTS idx_checklist_task_position
    ON checklist_items(task_id, position);
";

/// Indexes every migrated store must have.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_tasks_owner_position",
    "idx_tasks_owner_due",
    "idx_checklist_task_position",
];
