//! Loader for the item and interaction sync feeds.
//!
//! Feeds are either a single JSON array or JSON Lines (one object per line):
//! - items: `{"id": 1, "type": "movie", "title": "...", "genres": ["..."]}`
//! - interactions: `{"user_id": 7, "item_id": 1, "item_type": "movie", "event": "like", "ts": 0}`
//!
//! Blank lines in JSON Lines files are skipped. A malformed line fails the
//! whole load with its line number.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::types::{Interaction, ItemRecord};

/// File names looked up by [`load_dataset`]
pub const ITEMS_FILE: &str = "items.jsonl";
pub const INTERACTIONS_FILE: &str = "interactions.jsonl";

/// Both feeds read from one directory
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    pub items: Vec<ItemRecord>,
    pub interactions: Vec<Interaction>,
}

fn read_feed(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

/// Decode feed content, accepting a JSON array or JSON Lines.
pub fn parse_feed<T: DeserializeOwned>(content: &str, file: &str) -> Result<Vec<T>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| CatalogError::ParseError {
            file: file.to_string(),
            line: e.line(),
            reason: e.to_string(),
        });
    }

    let mut records = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|e| CatalogError::ParseError {
            file: file.to_string(),
            line: line_idx + 1,
            reason: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

pub fn load_items(path: &Path) -> Result<Vec<ItemRecord>> {
    let content = read_feed(path)?;
    let items: Vec<ItemRecord> = parse_feed(&content, &path.display().to_string())?;
    debug!("Parsed {} items from {}", items.len(), path.display());
    Ok(items)
}

pub fn load_interactions(path: &Path) -> Result<Vec<Interaction>> {
    let content = read_feed(path)?;
    let interactions: Vec<Interaction> = parse_feed(&content, &path.display().to_string())?;
    debug!(
        "Parsed {} interactions from {}",
        interactions.len(),
        path.display()
    );
    Ok(interactions)
}

/// Load `items.jsonl` and, when present, `interactions.jsonl` from a directory.
///
/// Both files are parsed in parallel with `rayon::join`.
pub fn load_dataset(data_dir: &Path) -> Result<Dataset> {
    let items_path = data_dir.join(ITEMS_FILE);
    let interactions_path = data_dir.join(INTERACTIONS_FILE);

    let (items, interactions) = rayon::join(
        || load_items(&items_path),
        || {
            if interactions_path.exists() {
                load_interactions(&interactions_path)
            } else {
                Ok(Vec::new())
            }
        },
    );
    let items = items?;
    let interactions = interactions?;

    info!(
        "Loaded {} items and {} interactions from {}",
        items.len(),
        interactions.len(),
        data_dir.display()
    );
    Ok(Dataset {
        items,
        interactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InteractionEvent, ItemType};
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("catalog-loader-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_json_lines() {
        let content = r#"{"id": 1, "type": "movie", "title": "Matrix", "genres": ["Action"]}

{"id": 2, "type": "book", "title": "Harry Potter", "genres": ["Fantasy"]}
"#;
        let items: Vec<ItemRecord> = parse_feed(content, "items.jsonl").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].item_type, ItemType::Book);
    }

    #[test]
    fn test_parse_json_array() {
        let content = r#"[{"user_id": 1, "item_id": 2, "item_type": "series", "event": "like", "ts": 5}]"#;
        let interactions: Vec<Interaction> = parse_feed(content, "interactions.json").unwrap();
        assert_eq!(interactions.len(), 1);
        assert_eq!(interactions[0].event, InteractionEvent::Like);
        assert_eq!(interactions[0].ts, Some(5));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let content = "{\"id\": 1, \"type\": \"movie\", \"title\": \"A\"}\n{not json}\n";
        let err = parse_feed::<ItemRecord>(content, "items.jsonl").unwrap_err();
        match err {
            CatalogError::ParseError { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_items(Path::new("/definitely/not/here/items.jsonl")).unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_dataset_without_interactions() {
        let dir = scratch_dir("no-interactions");
        fs::write(
            dir.join(ITEMS_FILE),
            "{\"id\": 3, \"type\": \"book\", \"title\": \"Slow Reads\", \"genres\": [\"Romance\"]}\n",
        )
        .unwrap();
        let _ = fs::remove_file(dir.join(INTERACTIONS_FILE));

        let dataset = load_dataset(&dir).unwrap();
        assert_eq!(dataset.items.len(), 1);
        assert!(dataset.interactions.is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }
}
