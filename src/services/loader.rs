//! 启动时的批量导入
//!
//! 从 YAML 种子文件读取映射，在单个写事务内全部写入。
//! 任何一条失败都会中止整个事务，不会留下部分数据。

use std::path::Path;

use tracing::{debug, info};

use crate::errors::{Result, UrlshortError};
use crate::storage::{Mapping, URLS_TABLE, UrlStore};

/// Parse a seed document: a YAML sequence of `{path, url}` objects.
///
/// An empty document yields no mappings.
pub fn parse_seed(content: &str) -> Result<Vec<Mapping>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str::<Vec<Mapping>>(content)?)
}

pub fn read_seed_file<P: AsRef<Path>>(path: P) -> Result<Vec<Mapping>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        UrlshortError::file_operation(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let mappings = parse_seed(&content)?;
    debug!("Parsed {} mappings from {}", mappings.len(), path.display());
    Ok(mappings)
}

pub struct BulkLoader;

impl BulkLoader {
    /// Write every mapping in order inside one write transaction, creating
    /// the collection if needed. Later entries win over earlier ones with
    /// the same path.
    pub fn load(store: &UrlStore, mappings: &[Mapping]) -> Result<usize> {
        let written = store.update(|txn| {
            let mut table = txn.open_table(URLS_TABLE)?;
            for mapping in mappings {
                table.insert(mapping.path.as_bytes(), mapping.url.as_bytes())?;
            }
            Ok(mappings.len())
        })?;

        info!("Seeded {} mappings", written);
        Ok(written)
    }

    /// Read the seed file at `path` and load it.
    pub fn load_file<P: AsRef<Path>>(store: &UrlStore, path: P) -> Result<usize> {
        let mappings = read_seed_file(path)?;
        Self::load(store, &mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_lowercase_keys() {
        let seed = r#"
- path: /urlshort
  url: https://github.com/gophercises/urlshort
- path: /urlshort-final
  url: https://github.com/gophercises/urlshort/tree/solution
"#;
        let mappings = parse_seed(seed).unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].path, "/urlshort");
        assert_eq!(
            mappings[1].url,
            "https://github.com/gophercises/urlshort/tree/solution"
        );
    }

    #[test]
    fn test_parse_seed_empty_document() {
        assert!(parse_seed("").unwrap().is_empty());
        assert!(parse_seed("   \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_seed_rejects_mapping_document() {
        let err = parse_seed("path: /a\nurl: https://a.example\n").unwrap_err();
        assert!(matches!(err, UrlshortError::SeedParse(_)));
    }

    #[test]
    fn test_parse_seed_rejects_missing_url() {
        let err = parse_seed("- path: /a\n").unwrap_err();
        assert!(matches!(err, UrlshortError::SeedParse(_)));
    }
}
