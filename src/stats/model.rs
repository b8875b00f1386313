use std::collections::HashMap;
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeKind {
    OriginalLength,
    RenderedLength,
    GzipLength,
    SourcemapLength,
}

impl SizeKind {
    pub const ALL: [SizeKind; 4] = [
        Self::OriginalLength,
        Self::RenderedLength,
        Self::GzipLength,
        Self::SourcemapLength,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::OriginalLength => "OL",
            Self::RenderedLength => "RL",
            Self::GzipLength => "GL",
            Self::SourcemapLength => "SL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OriginalLength => "originalLength",
            Self::RenderedLength => "renderedLength",
            Self::GzipLength => "gzipLength",
            Self::SourcemapLength => "sourcemapLength",
        }
    }
}

impl fmt::Display for SizeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown size kind `{0}` (expected one of originalLength, renderedLength, gzipLength, sourcemapLength)")]
pub struct UnknownSizeKind(pub String);

impl FromStr for SizeKind {
    type Err = UnknownSizeKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.label().eq_ignore_ascii_case(trimmed) || kind.code().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| UnknownSizeKind(trimmed.to_owned()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SizeMap {
    pub original_length: u64,
    pub rendered_length: u64,
    pub gzip_length: u64,
    pub sourcemap_length: u64,
}

impl SizeMap {
    pub fn get(&self, kind: SizeKind) -> u64 {
        match kind {
            SizeKind::OriginalLength => self.original_length,
            SizeKind::RenderedLength => self.rendered_length,
            SizeKind::GzipLength => self.gzip_length,
            SizeKind::SourcemapLength => self.sourcemap_length,
        }
    }
}

impl AddAssign for SizeMap {
    fn add_assign(&mut self, other: Self) {
        self.original_length += other.original_length;
        self.rendered_length += other.rendered_length;
        self.gzip_length += other.gzip_length;
        self.sourcemap_length += other.sourcemap_length;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ModuleRecord {
    pub id: String,
    #[serde(flatten)]
    pub sizes: SizeMap,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub children: Vec<TreeEntry>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatsOptions {
    pub gzip: bool,
    pub sourcemap: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BundleStats {
    pub tree: TreeEntry,
    #[serde(default)]
    pub nodes: HashMap<String, ModuleRecord>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub options: StatsOptions,
}

impl BundleStats {
    pub fn available_sizes(&self) -> Vec<SizeKind> {
        let mut sizes = vec![SizeKind::RenderedLength];
        if self.options.gzip {
            sizes.push(SizeKind::GzipLength);
        }
        if self.options.sourcemap {
            sizes.push(SizeKind::SourcemapLength);
            sizes.push(SizeKind::OriginalLength);
        }
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_size_kind_from_label_or_code() {
        assert_eq!("gzipLength".parse(), Ok(SizeKind::GzipLength));
        assert_eq!("rl".parse(), Ok(SizeKind::RenderedLength));
        assert_eq!(
            "brotli".parse::<SizeKind>(),
            Err(UnknownSizeKind("brotli".to_owned()))
        );
    }

    #[test]
    fn size_map_accumulates_every_kind() {
        let mut total = SizeMap {
            rendered_length: 10,
            gzip_length: 4,
            ..SizeMap::default()
        };
        total += SizeMap {
            original_length: 7,
            rendered_length: 5,
            gzip_length: 1,
            sourcemap_length: 2,
        };

        assert_eq!(total.get(SizeKind::OriginalLength), 7);
        assert_eq!(total.get(SizeKind::RenderedLength), 15);
        assert_eq!(total.get(SizeKind::GzipLength), 5);
        assert_eq!(total.get(SizeKind::SourcemapLength), 2);
    }

    #[test]
    fn available_sizes_follow_options() {
        let mut stats = BundleStats::default();
        assert_eq!(stats.available_sizes(), vec![SizeKind::RenderedLength]);

        stats.options = StatsOptions {
            gzip: true,
            sourcemap: true,
        };
        assert_eq!(
            stats.available_sizes(),
            vec![
                SizeKind::RenderedLength,
                SizeKind::GzipLength,
                SizeKind::SourcemapLength,
                SizeKind::OriginalLength,
            ]
        );
    }
}
