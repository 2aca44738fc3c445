use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::new_id;

/// An email granted production data for a subset of airlines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhitelistedUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub enabled_airlines: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WhitelistedUser {
    pub fn new(email: String, name: String, enabled_airlines: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            email,
            name,
            enabled_airlines: normalize_airline_ids(enabled_airlines),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_airline(&self, airline_id: &str) -> bool {
        self.enabled_airlines.iter().any(|id| id == airline_id)
    }
}

/// Splits the persisted comma-joined column. The empty string is the empty set.
pub fn split_airline_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_airline_ids(ids: &[String]) -> String {
    ids.join(",")
}

/// Drops blanks and duplicates, keeping first-seen order.
pub fn normalize_airline_ids(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim();
        if !id.is_empty() && !out.iter().any(|existing| existing == id) {
            out.push(id.to_string());
        }
    }
    out
}

/// Removes `airline_id` when present, appends it otherwise.
pub fn toggle_airline(ids: &[String], airline_id: &str) -> Vec<String> {
    if ids.iter().any(|id| id == airline_id) {
        ids.iter().filter(|id| *id != airline_id).cloned().collect()
    } else {
        let mut out = ids.to_vec();
        out.push(airline_id.to_string());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_column_is_empty_set() {
        assert!(split_airline_ids("").is_empty());
        assert!(split_airline_ids(" , ").is_empty());
        assert_eq!(split_airline_ids("ga,jt"), ids(&["ga", "jt"]));
    }

    #[test]
    fn test_join_then_split() {
        let original = ids(&["ga", "qz"]);
        assert_eq!(split_airline_ids(&join_airline_ids(&original)), original);
        assert_eq!(join_airline_ids(&[]), "");
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let sets = [ids(&[]), ids(&["ga"]), ids(&["ga", "jt", "qg"])];
        for set in &sets {
            for airline in ["ga", "jt", "xx"] {
                let once = toggle_airline(set, airline);
                assert_ne!(&once, set);
                let twice = toggle_airline(&once, airline);
                let mut a = twice.clone();
                let mut b = set.clone();
                a.sort();
                b.sort();
                assert_eq!(a, b, "toggling {} twice on {:?}", airline, set);
            }
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize_airline_ids(ids(&["ga", " ", "ga", "jt "])),
            ids(&["ga", "jt"])
        );
    }
}
