use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Flat `--key=value` arguments.
///
/// Tokens that do not start with `--` are ignored. The value is everything
/// after the first `=`, so `--labels=a=b` yields `a=b`. A bare `--flag` is
/// stored as `"true"`. Later duplicates overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgMap {
    values: HashMap<String, String>,
}

impl ArgMap {
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = HashMap::new();
        for arg in args {
            let Some(rest) = arg.as_ref().strip_prefix("--") else {
                continue;
            };
            let (key, value) = match rest.split_once('=') {
                Some((key, value)) => (key, value),
                None => (rest, "true"),
            };
            if key.is_empty() {
                continue;
            }
            values.insert(key.to_string(), value.to_string());
        }
        Self { values }
    }

    /// Parse the current process arguments, skipping the program name.
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Config(format!("missing required argument --{key}")))
    }

    /// Parse a typed value, returning `None` when the key is absent.
    pub fn parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| AppError::Config(format!("invalid value for --{key} ({raw:?}): {e}"))),
            None => Ok(None),
        }
    }

    /// A comma separated list. Items are trimmed and empty items dropped.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(split_list)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_key_value_pairs() {
        let args = ArgMap::parse(["--token=abc", "--projectId=21"]);
        assert_eq!(args.get("token"), Some("abc"));
        assert_eq!(args.get("projectId"), Some("21"));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_ignores_positional_and_short_flags() {
        let args = ArgMap::parse(["run", "-h", "--host=https://gitlab"]);
        assert_eq!(args.len(), 1);
        assert_eq!(args.get("h"), None);
    }

    #[test]
    fn test_value_keeps_everything_after_first_equals() {
        let args = ArgMap::parse(["--labelsToMatch=a=b,c"]);
        assert_eq!(args.get("labelsToMatch"), Some("a=b,c"));
    }

    #[test]
    fn test_bare_flag_is_true() {
        let args = ArgMap::parse(["--dryRun"]);
        assert_eq!(args.parsed::<bool>("dryRun").unwrap(), Some(true));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let args = ArgMap::parse(["--perPage=20", "--perPage=50"]);
        assert_eq!(args.parsed::<u32>("perPage").unwrap(), Some(50));
    }

    #[test]
    fn test_empty_value_is_kept_but_not_required() {
        let args = ArgMap::parse(["--token="]);
        assert_eq!(args.get("token"), Some(""));
        assert!(args.require("token").is_err());
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let args = ArgMap::parse(["--perPage=lots"]);
        let err = args.parsed::<u32>("perPage").unwrap_err();
        assert!(err.to_string().contains("--perPage"));
    }

    #[test]
    fn test_list_trims_and_drops_empty_items() {
        let args = ArgMap::parse(["--labelsToExclude=QA, not a bug,,wontfix "]);
        assert_eq!(
            args.list("labelsToExclude").unwrap(),
            vec!["QA", "not a bug", "wontfix"]
        );
        assert_eq!(args.list("missing"), None);
    }
}
