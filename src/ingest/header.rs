// src/ingest/header.rs
//! Header normalization: canonical field keys and column positions.
//!
//! Matching is by normalized name, not position, so `Date,MRR,...` and a
//! reordered `revenue,date,...` header bind identically. Synonym spellings
//! like `New Users`, `new_users`, and `NEW_USERS` all normalize to the
//! canonical `new_users` key.

use std::collections::HashMap;

use super::error::IngestError;

/// The six canonical field keys every upload must provide.
pub const REQUIRED_FIELDS: [&str; 6] = ["date", "mrr", "users", "churn", "new_users", "revenue"];

/// Normalize a raw header token into a canonical field key:
/// trim, lowercase, and collapse each internal whitespace run to `_`.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Mapping from canonical field key to column index in the header row.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    by_key: HashMap<String, usize>,
}

impl HeaderMap {
    /// Build the mapping from the raw header tokens.
    ///
    /// Fails with [`IngestError::MalformedHeader`] naming every missing
    /// required key; no partial parse is attempted. When a normalized key
    /// appears twice, the first column wins.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, IngestError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut by_key = HashMap::new();
        for (idx, name) in fields.into_iter().enumerate() {
            let key = normalize_header(name);
            if !key.is_empty() {
                by_key.entry(key).or_insert(idx);
            }
        }

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|f| !by_key.contains_key(**f))
            .map(|f| f.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::MalformedHeader { missing });
        }

        Ok(Self { by_key })
    }

    /// Column index for a canonical key, if the header provided it.
    pub fn column(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_folds_case_and_whitespace() {
        assert_eq!(normalize_header("  Date "), "date");
        assert_eq!(normalize_header("New Users"), "new_users");
        assert_eq!(normalize_header("NEW_USERS"), "new_users");
        assert_eq!(normalize_header("new \t users"), "new_users");
    }

    #[test]
    fn reordered_header_binds_by_name() {
        let h = HeaderMap::from_fields(["revenue", "new_users", "churn", "users", "mrr", "date"])
            .unwrap();
        assert_eq!(h.column("date"), Some(5));
        assert_eq!(h.column("revenue"), Some(0));
    }

    #[test]
    fn missing_keys_are_all_reported() {
        let err = HeaderMap::from_fields(["date", "mrr", "users", "churn"]).unwrap_err();
        match err {
            IngestError::MalformedHeader { missing } => {
                assert_eq!(missing, vec!["new_users".to_string(), "revenue".to_string()]);
            }
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }

    #[test]
    fn extra_columns_are_ignored() {
        let h = HeaderMap::from_fields([
            "date", "mrr", "users", "churn", "new_users", "revenue", "notes",
        ])
        .unwrap();
        assert_eq!(h.column("notes"), Some(6));
        assert_eq!(h.column("date"), Some(0));
    }
}
