//! Subprocess environment computation.
//!
//! The ambient environment is taken as a read-only value and a fresh map is returned, so two
//! invocations running at the same time can never observe each other's overrides.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

use crate::spec::EnvironmentOverride;

/// A complete environment table, as handed to the subprocess.
pub type Environment = BTreeMap<OsString, OsString>;

/// Compute the environment a single invocation runs with.
///
/// ## Parameters
/// - `ambient`: the base environment (usually a snapshot of the current process); never modified.
/// - `overrides`: names to remove and names to set.
///
/// ## Returns
/// - (`Environment`): a copy of `ambient` with every removal applied, then every overlay applied.
///
/// ## Notes
/// - Removing a name that is not present is not an error.
/// - Removals run first, so a name that is both removed and set ends up with the set value.
/// - Names are compared exactly, including case.
pub fn effective_environment(ambient: &Environment, overrides: &EnvironmentOverride) -> Environment {
    let mut env = ambient.clone();

    for name in overrides.removals() {
        env.remove(OsStr::new(name));
    }

    for (name, value) in overrides.overlays() {
        env.insert(OsString::from(name), OsString::from(value));
    }

    env
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> Environment {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    fn get<'a>(env: &'a Environment, name: &str) -> Option<&'a str> {
        env.get(OsStr::new(name)).and_then(|v| v.to_str())
    }

    #[test]
    fn test_empty_override_copies_ambient() {
        let ambient = env_of(&[("HOME", "/home/me"), ("PATH", "/bin")]);
        let env = effective_environment(&ambient, &EnvironmentOverride::new());
        assert_eq!(env, ambient);
    }

    #[test]
    fn test_removal_deletes_present_names() {
        let ambient = env_of(&[("HOME", "/home/me"), ("PATH", "/bin")]);
        let env = effective_environment(&ambient, &EnvironmentOverride::new().with_removed("HOME"));
        assert_eq!(get(&env, "HOME"), None);
        assert_eq!(get(&env, "PATH"), Some("/bin"));
    }

    #[test]
    fn test_removal_of_absent_name_is_ignored() {
        let ambient = env_of(&[("PATH", "/bin")]);
        let env = effective_environment(&ambient, &EnvironmentOverride::new().with_removed("USERPROFILE"));
        assert_eq!(env, ambient);
    }

    #[test]
    fn test_overlay_inserts_and_replaces() {
        let ambient = env_of(&[("HOME", "/home/me")]);
        let ov = EnvironmentOverride::new()
            .with_set("HOME", "abcdef")
            .with_set("CC", "gcc");
        let env = effective_environment(&ambient, &ov);
        assert_eq!(get(&env, "HOME"), Some("abcdef"));
        assert_eq!(get(&env, "CC"), Some("gcc"));
    }

    #[test]
    fn test_overlay_wins_over_removal() {
        let ambient = env_of(&[("HOME", "/home/me")]);
        let ov = EnvironmentOverride::new()
            .with_removed("HOME")
            .with_set("HOME", "abcdef");
        let env = effective_environment(&ambient, &ov);
        assert_eq!(get(&env, "HOME"), Some("abcdef"));
    }

    #[test]
    fn test_ambient_is_not_modified() {
        let ambient = env_of(&[("HOME", "/home/me")]);
        let ov = EnvironmentOverride::new()
            .with_removed("HOME")
            .with_set("EXTRA", "1");
        let _ = effective_environment(&ambient, &ov);
        assert_eq!(ambient, env_of(&[("HOME", "/home/me")]));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let ambient = env_of(&[("Home", "/home/me")]);
        let env = effective_environment(&ambient, &EnvironmentOverride::new().with_removed("HOME"));
        assert_eq!(get(&env, "Home"), Some("/home/me"));
    }
}
