//! Migration file naming
//!
//! `YYYYMMDDHHMMSS-<description>.js`, with a UTC timestamp so that file
//! names sort in creation order.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub const MIGRATION_EXTENSION: &str = "js";

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_]+").expect("valid slug pattern"));

static FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{14})-(.+)\.js$").expect("valid migration file pattern"));

/// 14-digit UTC timestamp
pub fn migration_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Lowercase, with every run of other characters collapsed to one dash
pub fn normalize_description(description: &str) -> String {
    let lowered = description.to_lowercase();
    NON_SLUG.replace_all(&lowered, "-").trim_matches('-').to_string()
}

pub fn migration_file_name(at: DateTime<Utc>, description: &str) -> String {
    format!(
        "{}-{}.{}",
        migration_timestamp(at),
        normalize_description(description),
        MIGRATION_EXTENSION
    )
}

pub fn alter_description(table_name: &str) -> String {
    format!("alter-{}", table_name)
}

pub fn create_description(model_name: &str) -> String {
    format!("create-{}-table", model_name.to_lowercase())
}

/// Split a migration file name into `(timestamp, description)`
pub fn parse_file_name(file_name: &str) -> Option<(&str, &str)> {
    let caps = FILE_NAME.captures(file_name)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 5, 3).unwrap()
    }

    #[test]
    fn test_timestamp_is_fourteen_digits() {
        assert_eq!(migration_timestamp(at()), "20261019090503");
    }

    #[test]
    fn test_alter_file_name() {
        assert_eq!(
            migration_file_name(at(), &alter_description("users")),
            "20261019090503-alter-users.js"
        );
    }

    #[test]
    fn test_create_file_name_lowercases_model() {
        assert_eq!(
            migration_file_name(at(), &create_description("BlogPost")),
            "20261019090503-create-blogpost-table.js"
        );
    }

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize_description("alter-user_profiles"), "alter-user_profiles");
        assert_eq!(normalize_description("Alter  My.Table!"), "alter-my-table");
        assert_eq!(normalize_description("--x--"), "x");
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(
            parse_file_name("20261019090503-alter-users.js"),
            Some(("20261019090503", "alter-users"))
        );
        assert_eq!(parse_file_name("notes.txt"), None);
        assert_eq!(parse_file_name("2026-alter.js"), None);
    }
}
