//! Owner resolution for CLI commands.
//!
//! The resolution chain: `--user` flag > `ORGANIZER_USER` env > `USER` env >
//! `"local"`. Every task belongs to exactly one owner and commands only see
//! the resolved owner's tasks.

use std::env;

/// Env var naming the task owner.
pub const USER_ENV: &str = "ORGANIZER_USER";

/// Owner used when nothing else is set.
pub const DEFAULT_OWNER: &str = "local";

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

fn resolve_owner_with(cli_flag: Option<&str>, env: &dyn EnvReader) -> String {
    if let Some(user) = cli_flag.map(str::trim).filter(|u| !u.is_empty()) {
        return user.to_string();
    }

    env.get(USER_ENV)
        .or_else(|| env.get("USER"))
        .map_or_else(|| DEFAULT_OWNER.to_string(), |u| u.trim().to_string())
}

/// Resolve the owner whose tasks a command operates on.
pub fn resolve_owner(cli_flag: Option<&str>) -> String {
    resolve_owner_with(cli_flag, &RealEnv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockEnv {
        vars: HashMap<String, String>,
    }

    impl MockEnv {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
            }
        }

        fn var(mut self, key: &str, val: &str) -> Self {
            self.vars.insert(key.to_string(), val.to_string());
            self
        }
    }

    impl EnvReader for MockEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.vars.get(key).filter(|v| !v.trim().is_empty()).cloned()
        }
    }

    #[test]
    fn flag_takes_priority() {
        let env = MockEnv::new().var(USER_ENV, "env-owner").var("USER", "bob");
        assert_eq!(resolve_owner_with(Some("alice"), &env), "alice");
    }

    #[test]
    fn organizer_user_beats_user() {
        let env = MockEnv::new().var(USER_ENV, "env-owner").var("USER", "bob");
        assert_eq!(resolve_owner_with(None, &env), "env-owner");
    }

    #[test]
    fn falls_back_to_login_user() {
        let env = MockEnv::new().var("USER", "bob");
        assert_eq!(resolve_owner_with(None, &env), "bob");
    }

    #[test]
    fn blank_values_are_skipped() {
        let env = MockEnv::new().var(USER_ENV, "  ").var("USER", "bob");
        assert_eq!(resolve_owner_with(Some(""), &env), "bob");
    }

    #[test]
    fn defaults_to_local() {
        assert_eq!(resolve_owner_with(None, &MockEnv::new()), DEFAULT_OWNER);
    }
}
