pub mod task;

pub use task::{
    ChecklistDraft, ChecklistItem, Interval, ParseEnumError, Recurrence, RecurrenceKind, Task,
    TaskDraft,
};
