//! Record identifiers.
//!
//! Tasks are `tk-xxxxxxxx`, checklist items `ci-xxxxxxxx`, where the suffix is
//! eight lowercase base-36 characters. Users may type a suffix without the
//! prefix; [`normalize_prefix`] puts it back.

use rand::Rng;

pub const TASK_PREFIX: &str = "tk-";
pub const CHECKLIST_PREFIX: &str = "ci-";

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 8;

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

#[must_use]
pub fn new_task_id() -> String {
    format!("{TASK_PREFIX}{}", random_suffix())
}

#[must_use]
pub fn new_checklist_id() -> String {
    format!("{CHECKLIST_PREFIX}{}", random_suffix())
}

/// Lowercase and trim user input, adding `prefix` when it's missing.
#[must_use]
pub fn normalize_prefix(input: &str, prefix: &str) -> String {
    let trimmed = input.trim().to_ascii_lowercase();
    if trimmed.starts_with(prefix) {
        trimmed
    } else {
        format!("{prefix}{trimmed}")
    }
}
