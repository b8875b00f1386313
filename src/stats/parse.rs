use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::model::BundleStats;

pub fn load_stats(path: &Path) -> Result<BundleStats> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read stats file {}", path.display()))?;
    let stats = parse_stats(&raw)
        .with_context(|| format!("failed to parse stats file {}", path.display()))?;

    info!(
        path = %path.display(),
        modules = stats.nodes.len(),
        links = stats.links.len(),
        "loaded bundle stats"
    );
    Ok(stats)
}

pub fn parse_stats(raw: &str) -> Result<BundleStats> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in stats file")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type at stats root; expected an object"))?;

    if !object.contains_key("tree") {
        return Err(anyhow!("stats file has no `tree` entry"));
    }

    let stats = BundleStats::deserialize(&parsed).context("invalid stats layout")?;

    let dangling = stats
        .links
        .iter()
        .filter(|link| {
            !stats.nodes.contains_key(&link.source) || !stats.nodes.contains_key(&link.target)
        })
        .count();
    if dangling > 0 {
        debug!(dangling, "links reference modules missing from the node table");
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::stats::model::{Link, SizeKind};

    const SAMPLE: &str = r#"{
        "version": 1,
        "tree": {
            "name": "root",
            "children": [
                { "name": "src", "children": [ { "name": "main.js", "uid": "m1" } ] },
                { "name": "lib.js", "uid": "m2" }
            ]
        },
        "nodes": {
            "m1": { "id": "/src/main.js", "renderedLength": 120, "gzipLength": 60 },
            "m2": { "id": "/lib.js", "renderedLength": 80 }
        },
        "links": [ { "source": "m1", "target": "m2" } ],
        "options": { "gzip": true }
    }"#;

    #[test]
    fn parses_tree_nodes_and_links() {
        let stats = parse_stats(SAMPLE).unwrap();

        assert_eq!(stats.tree.children.len(), 2);
        assert_eq!(stats.nodes["m1"].id, "/src/main.js");
        assert_eq!(stats.nodes["m1"].sizes.get(SizeKind::GzipLength), 60);
        assert_eq!(stats.nodes["m2"].sizes.get(SizeKind::GzipLength), 0);
        assert_eq!(stats.links, vec![Link::new("m1", "m2")]);
        assert!(stats.options.gzip);
    }

    #[test]
    fn rejects_non_object_and_missing_tree() {
        assert!(parse_stats("[1, 2]").is_err());
        assert!(parse_stats(r#"{ "nodes": {} }"#).is_err());
        assert!(parse_stats("not json").is_err());
    }

    #[test]
    fn loads_stats_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let stats = load_stats(file.path()).unwrap();
        assert_eq!(stats.nodes.len(), 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let error = load_stats(&path).unwrap_err();
        assert!(format!("{error:#}").contains("absent.json"));
    }
}
