use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::stats::{HierarchyNode, Link, ModuleRecord, NodeIndex, SizeKind, SizeMap};
use crate::util::{escape_html, format_bytes, to_fixed};

use super::TooltipError;
use super::index::DependencyIndex;

const LINE_BREAK: &str = "<br/>";

pub trait ContentNode {
    type Key: Clone + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;
    fn size(&self) -> SizeMap;
    fn path(&self) -> String;
    fn uid(&self) -> Option<&str>;
}

impl ContentNode for HierarchyNode<'_> {
    type Key = NodeIndex;

    fn key(&self) -> NodeIndex {
        self.index()
    }

    fn size(&self) -> SizeMap {
        self.value()
    }

    fn path(&self) -> String {
        HierarchyNode::path(self)
    }

    fn uid(&self) -> Option<&str> {
        HierarchyNode::uid(self)
    }
}

pub enum PathLine<'a, N> {
    Ancestors,
    Custom(&'a dyn Fn(&N) -> String),
    Hidden,
}

pub struct ContentConfig<'a, N> {
    total_size: Option<u64>,
    node_size: Option<&'a dyn Fn(&N) -> SizeMap>,
    node_path: PathLine<'a, N>,
    node_uid: Option<&'a dyn Fn(&N) -> Option<String>>,
    nodes: &'a HashMap<String, ModuleRecord>,
    links: &'a [Link],
    sizes: &'a [SizeKind],
    format_bytes: fn(u64) -> String,
}

impl<'a, N: ContentNode> ContentConfig<'a, N> {
    pub fn new(
        nodes: &'a HashMap<String, ModuleRecord>,
        links: &'a [Link],
        sizes: &'a [SizeKind],
    ) -> Self {
        Self {
            total_size: None,
            node_size: None,
            node_path: PathLine::Ancestors,
            node_uid: None,
            nodes,
            links,
            sizes,
            format_bytes,
        }
    }

    pub fn with_total_size(mut self, total_size: Option<u64>) -> Self {
        self.total_size = total_size.filter(|total| *total > 0);
        self
    }

    pub fn with_node_size(mut self, node_size: &'a dyn Fn(&N) -> SizeMap) -> Self {
        self.node_size = Some(node_size);
        self
    }

    pub fn with_node_path(mut self, node_path: PathLine<'a, N>) -> Self {
        self.node_path = node_path;
        self
    }

    pub fn with_node_uid(mut self, node_uid: &'a dyn Fn(&N) -> Option<String>) -> Self {
        self.node_uid = Some(node_uid);
        self
    }

    pub fn with_format_bytes(mut self, format_bytes: fn(u64) -> String) -> Self {
        self.format_bytes = format_bytes;
        self
    }

    fn size_of(&self, node: &N) -> SizeMap {
        match self.node_size {
            Some(accessor) => accessor(node),
            None => node.size(),
        }
    }

    fn path_of(&self, node: &N) -> Option<String> {
        match &self.node_path {
            PathLine::Ancestors => Some(node.path()),
            PathLine::Custom(accessor) => Some(accessor(node)),
            PathLine::Hidden => None,
        }
    }

    fn uid_of<'n>(&self, node: &'n N) -> Option<Cow<'n, str>> {
        match self.node_uid {
            Some(accessor) => accessor(node).map(Cow::Owned),
            None => node.uid().map(Cow::Borrowed),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryLine {
    Path(String),
    Primary {
        kind: SizeKind,
        bytes: String,
        percentage: Option<String>,
    },
    Secondary {
        kind: SizeKind,
        bytes: String,
    },
    ImportedBy(Vec<String>),
}

impl SummaryLine {
    fn write_html(&self, out: &mut String) {
        match self {
            Self::Path(path) => out.push_str(&escape_html(path)),
            Self::Primary {
                kind,
                bytes,
                percentage,
            } => {
                out.push_str(&format!("<b>{}: {bytes}</b>", kind.code()));
                if let Some(percentage) = percentage {
                    out.push_str(&format!(" ({percentage})"));
                }
            }
            Self::Secondary { kind, bytes } => {
                out.push_str(&format!("{}: {bytes}", kind.code()));
            }
            Self::ImportedBy(importers) => {
                out.push_str("<b>Imported By</b>: ");
                out.push_str(LINE_BREAK);
                let escaped = importers
                    .iter()
                    .map(|importer| escape_html(importer))
                    .collect::<Vec<_>>();
                out.push_str(&escaped.join(LINE_BREAK));
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TooltipContent {
    lines: Vec<SummaryLine>,
    html: String,
}

impl TooltipContent {
    fn from_lines(lines: Vec<SummaryLine>) -> Self {
        let mut html = String::new();
        for (position, line) in lines.iter().enumerate() {
            if position > 0 {
                html.push_str(LINE_BREAK);
            }
            line.write_html(&mut html);
        }
        Self { lines, html }
    }

    pub fn lines(&self) -> &[SummaryLine] {
        &self.lines
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

#[derive(Clone, Debug)]
pub struct ContentCache<K> {
    entries: HashMap<K, TooltipContent>,
}

impl<K: Eq + Hash> Default for ContentCache<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> ContentCache<K> {
    pub fn get(&self, key: &K) -> Option<&TooltipContent> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &TooltipContent)> {
        self.entries.iter()
    }
}

pub fn format_percentage(value: u64, total: u64) -> String {
    format!("{}%", to_fixed(100.0 * value as f64 / total as f64, 2))
}

/// Builds one summary per node. Fails without a partial result if two
/// nodes share a key.
pub fn build_cache<N, I>(
    content_nodes: I,
    config: &ContentConfig<'_, N>,
) -> Result<ContentCache<N::Key>, TooltipError>
where
    N: ContentNode,
    I: IntoIterator<Item = N>,
{
    let index = DependencyIndex::build(config.links, config.nodes);
    let mut entries = HashMap::new();

    for node in content_nodes {
        let key = node.key();
        if entries.contains_key(&key) {
            warn!(key = ?key, "content node appears twice in one cache build");
            return Err(TooltipError::DuplicateNode(format!("{key:?}")));
        }

        let content = summarize(&node, config, &index);
        entries.insert(key, content);
    }

    debug!(entries = entries.len(), "built tooltip content cache");
    Ok(ContentCache { entries })
}

fn summarize<N: ContentNode>(
    node: &N,
    config: &ContentConfig<'_, N>,
    index: &DependencyIndex<'_>,
) -> TooltipContent {
    let mut lines = Vec::new();

    if let Some(path) = config.path_of(node) {
        lines.push(SummaryLine::Path(path));
    }

    let values = config.size_of(node);
    if let Some((&primary, secondary)) = config.sizes.split_first() {
        let value = values.get(primary);
        if value != 0 {
            lines.push(SummaryLine::Primary {
                kind: primary,
                bytes: (config.format_bytes)(value),
                percentage: config
                    .total_size
                    .map(|total| format_percentage(value, total)),
            });
        }

        for &kind in secondary {
            lines.push(SummaryLine::Secondary {
                kind,
                bytes: (config.format_bytes)(values.get(kind)),
            });
        }
    }

    if let Some(uid) = config.uid_of(node).filter(|uid| !uid.is_empty())
        && let Some(importers) = index.imported_by(&uid)
    {
        let mut seen = HashSet::new();
        let unique = importers
            .iter()
            .map(|importer| importer.display_id())
            .filter(|id| seen.insert(*id))
            .map(str::to_owned)
            .collect::<Vec<_>>();
        lines.push(SummaryLine::ImportedBy(unique));
    }

    TooltipContent::from_lines(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Hierarchy, TreeEntry};

    struct Fixture {
        hierarchy: Hierarchy,
        nodes: HashMap<String, ModuleRecord>,
        links: Vec<Link>,
    }

    fn module(id: &str, rendered: u64, gzip: u64) -> ModuleRecord {
        ModuleRecord {
            id: id.to_owned(),
            sizes: SizeMap {
                rendered_length: rendered,
                gzip_length: gzip,
                ..SizeMap::default()
            },
        }
    }

    fn leaf(name: &str, uid: &str) -> TreeEntry {
        TreeEntry {
            name: name.to_owned(),
            uid: Some(uid.to_owned()),
            children: Vec::new(),
        }
    }

    fn fixture() -> Fixture {
        let tree = TreeEntry {
            name: "bundle.js".to_owned(),
            uid: None,
            children: vec![
                leaf("a.js", "A"),
                leaf("b.js", "B"),
                leaf("c.js", "C"),
                leaf("empty.js", "E"),
            ],
        };
        let nodes = HashMap::from([
            ("A".to_owned(), module("/src/a.js", 1024, 300)),
            ("B".to_owned(), module("/src/b.js", 1024, 200)),
            ("C".to_owned(), module("/src/c.js", 1024, 100)),
            ("E".to_owned(), module("/src/empty.js", 0, 0)),
        ]);
        let links = vec![
            Link::new("A", "C"),
            Link::new("B", "C"),
            Link::new("A", "C"),
        ];
        let hierarchy = Hierarchy::from_tree(&tree, &nodes);
        Fixture {
            hierarchy,
            nodes,
            links,
        }
    }

    fn html_for(fixture: &Fixture, cache: &ContentCache<NodeIndex>, name: &str) -> String {
        let node = fixture
            .hierarchy
            .iter()
            .find(|node| node.name() == name)
            .unwrap();
        cache.get(&node.index()).unwrap().html().to_owned()
    }

    const SIZES: [SizeKind; 2] = [SizeKind::RenderedLength, SizeKind::GzipLength];

    #[test]
    fn every_node_gets_exactly_one_entry() {
        let fixture = fixture();
        let config = ContentConfig::new(&fixture.nodes, &fixture.links, &SIZES);
        let cache = build_cache(fixture.hierarchy.iter(), &config).unwrap();

        assert_eq!(cache.len(), fixture.hierarchy.len());
        for node in fixture.hierarchy.iter() {
            assert!(cache.get(&node.index()).is_some());
        }
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let fixture = fixture();
        let config = ContentConfig::new(&fixture.nodes, &fixture.links, &SIZES)
            .with_total_size(Some(3072));
        let first = build_cache(fixture.hierarchy.iter(), &config).unwrap();
        let second = build_cache(fixture.hierarchy.iter(), &config).unwrap();

        for (key, content) in first.iter() {
            assert_eq!(second.get(key).unwrap().html(), content.html());
        }
    }

    #[test]
    fn renders_path_sizes_and_percentage() {
        let fixture = fixture();
        let config = ContentConfig::new(&fixture.nodes, &fixture.links, &SIZES)
            .with_total_size(Some(3072));
        let cache = build_cache(fixture.hierarchy.iter(), &config).unwrap();

        assert_eq!(
            html_for(&fixture, &cache, "a.js"),
            "bundle.js/a.js<br/><b>RL: 1KB</b> (33.33%)<br/>GL: 300B"
        );
    }

    #[test]
    fn zero_primary_metric_has_no_primary_line() {
        let fixture = fixture();
        let config = ContentConfig::new(&fixture.nodes, &fixture.links, &SIZES)
            .with_total_size(Some(3072));
        let cache = build_cache(fixture.hierarchy.iter(), &config).unwrap();

        let html = html_for(&fixture, &cache, "empty.js");
        assert_eq!(html, "bundle.js/empty.js<br/>GL: 0B");
        assert!(!html.contains("<b>RL"));
    }

    #[test]
    fn missing_total_never_shows_percentage() {
        let fixture = fixture();
        for total in [None, Some(0)] {
            let config = ContentConfig::new(&fixture.nodes, &fixture.links, &SIZES)
                .with_total_size(total);
            let cache = build_cache(fixture.hierarchy.iter(), &config).unwrap();

            assert!(cache.iter().all(|(_, content)| !content.html().contains('%')));
        }
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(format_percentage(1, 3), "33.33%");
        assert_eq!(format_percentage(2, 3), "66.67%");
        assert_eq!(format_percentage(5, 5), "100.00%");
    }

    #[test]
    fn percentage_ties_round_up() {
        assert_eq!(format_percentage(1, 800), "0.13%");
        assert_eq!(format_percentage(1, 160), "0.63%");
        assert_eq!(format_percentage(1, 32), "3.13%");
    }

    #[test]
    fn injected_byte_formatter_renders_every_size_line() {
        fn kilobytes(bytes: u64) -> String {
            format!("{} kB", bytes / 1000)
        }

        let fixture = fixture();
        let config = ContentConfig::new(&fixture.nodes, &fixture.links, &SIZES)
            .with_node_path(PathLine::Hidden)
            .with_format_bytes(kilobytes);
        let cache = build_cache(fixture.hierarchy.iter(), &config).unwrap();

        assert_eq!(html_for(&fixture, &cache, "b.js"), "<b>RL: 1 kB</b><br/>GL: 0 kB");
    }

    #[test]
    fn imported_by_lists_unique_importers() {
        let fixture = fixture();
        let config = ContentConfig::new(&fixture.nodes, &fixture.links, &SIZES);
        let cache = build_cache(fixture.hierarchy.iter(), &config).unwrap();

        let c = fixture
            .hierarchy
            .iter()
            .find(|node| node.name() == "c.js")
            .unwrap();
        let content = cache.get(&c.index()).unwrap();
        let Some(SummaryLine::ImportedBy(importers)) = content.lines().last() else {
            panic!("expected an imported-by line, got {:?}", content.lines());
        };

        let unique = importers.iter().collect::<HashSet<_>>();
        assert_eq!(importers.len(), 2);
        assert!(unique.contains(&"/src/a.js".to_owned()));
        assert!(unique.contains(&"/src/b.js".to_owned()));
        assert!(
            content
                .html()
                .ends_with("<b>Imported By</b>: <br/>/src/a.js<br/>/src/b.js")
        );
    }

    #[test]
    fn nodes_without_importers_omit_the_line() {
        let fixture = fixture();
        let config = ContentConfig::new(&fixture.nodes, &fixture.links, &SIZES);
        let cache = build_cache(fixture.hierarchy.iter(), &config).unwrap();

        for name in ["a.js", "bundle.js"] {
            assert!(!html_for(&fixture, &cache, name).contains("Imported By"));
        }
    }

    #[test]
    fn hidden_path_and_custom_accessors() {
        let fixture = fixture();
        let fixed_size = |_: &HierarchyNode<'_>| SizeMap {
            rendered_length: 2048,
            ..SizeMap::default()
        };
        let no_uid = |_: &HierarchyNode<'_>| Some(String::new());
        let config = ContentConfig::new(&fixture.nodes, &fixture.links, &SIZES[..1])
            .with_node_path(PathLine::Hidden)
            .with_node_size(&fixed_size)
            .with_node_uid(&no_uid);
        let cache = build_cache(fixture.hierarchy.iter(), &config).unwrap();

        assert_eq!(html_for(&fixture, &cache, "c.js"), "<b>RL: 2KB</b>");
    }

    #[test]
    fn custom_path_and_escaping() {
        let fixture = fixture();
        let shouting = |node: &HierarchyNode<'_>| format!("<{}>", node.name().to_uppercase());
        let config = ContentConfig::new(&fixture.nodes, &fixture.links, &[])
            .with_node_path(PathLine::Custom(&shouting));
        let cache = build_cache(fixture.hierarchy.iter(), &config).unwrap();

        assert_eq!(html_for(&fixture, &cache, "b.js"), "&lt;B.JS&gt;");
    }

    #[test]
    fn duplicate_keys_fail_the_build() {
        let fixture = fixture();
        let config = ContentConfig::new(&fixture.nodes, &fixture.links, &SIZES);
        let root = fixture.hierarchy.root();

        let error = build_cache([root, root], &config).unwrap_err();
        assert_eq!(error, TooltipError::DuplicateNode("NodeIndex(0)".to_owned()));
    }
}
