use std::collections::HashMap;

use super::model::{BundleStats, ModuleRecord, SizeMap, TreeEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

#[derive(Clone, Debug)]
struct HierarchyEntry {
    name: String,
    uid: Option<String>,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    depth: usize,
    value: SizeMap,
}

/// Flattened stats tree with aggregated sizes. Entries are stored in
/// pre-order, so index 0 is the root.
#[derive(Clone, Debug)]
pub struct Hierarchy {
    entries: Vec<HierarchyEntry>,
}

impl Hierarchy {
    pub fn from_stats(stats: &BundleStats) -> Self {
        Self::from_tree(&stats.tree, &stats.nodes)
    }

    pub fn from_tree(tree: &TreeEntry, nodes: &HashMap<String, ModuleRecord>) -> Self {
        let mut hierarchy = Self {
            entries: Vec::new(),
        };
        hierarchy.push_entry(tree, None, 0, nodes);
        hierarchy
    }

    fn push_entry(
        &mut self,
        tree: &TreeEntry,
        parent: Option<NodeIndex>,
        depth: usize,
        nodes: &HashMap<String, ModuleRecord>,
    ) -> NodeIndex {
        let index = NodeIndex(self.entries.len());
        let own_value = tree
            .uid
            .as_ref()
            .and_then(|uid| nodes.get(uid))
            .map(|record| record.sizes)
            .unwrap_or_default();

        self.entries.push(HierarchyEntry {
            name: tree.name.clone(),
            uid: tree.uid.clone(),
            parent,
            children: Vec::with_capacity(tree.children.len()),
            depth,
            value: own_value,
        });

        let mut value = own_value;
        for child in &tree.children {
            let child_index = self.push_entry(child, Some(index), depth + 1, nodes);
            value += self.entries[child_index.0].value;
            self.entries[index.0].children.push(child_index);
        }
        self.entries[index.0].value = value;

        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn root(&self) -> HierarchyNode<'_> {
        self.node(NodeIndex(0))
    }

    pub fn node(&self, index: NodeIndex) -> HierarchyNode<'_> {
        HierarchyNode {
            hierarchy: self,
            index,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = HierarchyNode<'_>> + '_ {
        (0..self.entries.len()).map(move |index| self.node(NodeIndex(index)))
    }

    pub fn max_depth(&self) -> usize {
        self.entries.iter().map(|entry| entry.depth).max().unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HierarchyNode<'a> {
    hierarchy: &'a Hierarchy,
    index: NodeIndex,
}

impl<'a> HierarchyNode<'a> {
    fn entry(&self) -> &'a HierarchyEntry {
        &self.hierarchy.entries[self.index.0]
    }

    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn name(&self) -> &'a str {
        &self.entry().name
    }

    pub fn uid(&self) -> Option<&'a str> {
        self.entry().uid.as_deref()
    }

    pub fn depth(&self) -> usize {
        self.entry().depth
    }

    pub fn value(&self) -> SizeMap {
        self.entry().value
    }

    pub fn parent(&self) -> Option<HierarchyNode<'a>> {
        self.entry().parent.map(|index| self.hierarchy.node(index))
    }

    pub fn children(self) -> impl Iterator<Item = HierarchyNode<'a>> + 'a {
        let hierarchy = self.hierarchy;
        self.entry()
            .children
            .iter()
            .map(move |&index| hierarchy.node(index))
    }

    pub fn is_leaf(&self) -> bool {
        self.entry().children.is_empty()
    }

    pub fn ancestors(self) -> impl Iterator<Item = HierarchyNode<'a>> + 'a {
        std::iter::successors(Some(self), |node| node.parent())
    }

    pub fn path(&self) -> String {
        let mut names = self.ancestors().map(|node| node.name()).collect::<Vec<_>>();
        names.reverse();
        names.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::model::SizeKind;

    fn leaf(name: &str, uid: &str) -> TreeEntry {
        TreeEntry {
            name: name.to_owned(),
            uid: Some(uid.to_owned()),
            children: Vec::new(),
        }
    }

    fn record(id: &str, rendered: u64) -> ModuleRecord {
        ModuleRecord {
            id: id.to_owned(),
            sizes: SizeMap {
                rendered_length: rendered,
                ..SizeMap::default()
            },
        }
    }

    fn sample() -> Hierarchy {
        let tree = TreeEntry {
            name: "bundle.js".to_owned(),
            uid: None,
            children: vec![
                TreeEntry {
                    name: "src".to_owned(),
                    uid: None,
                    children: vec![leaf("a.js", "a"), leaf("b.js", "b")],
                },
                leaf("c.js", "c"),
                leaf("ghost.js", "missing"),
            ],
        };
        let nodes = HashMap::from([
            ("a".to_owned(), record("/src/a.js", 100)),
            ("b".to_owned(), record("/src/b.js", 50)),
            ("c".to_owned(), record("/c.js", 25)),
        ]);
        Hierarchy::from_tree(&tree, &nodes)
    }

    #[test]
    fn parents_aggregate_children_values() {
        let hierarchy = sample();

        assert_eq!(hierarchy.len(), 6);
        assert_eq!(hierarchy.root().value().get(SizeKind::RenderedLength), 175);

        let src = hierarchy.root().children().next().unwrap();
        assert_eq!(src.name(), "src");
        assert_eq!(src.value().get(SizeKind::RenderedLength), 150);
    }

    #[test]
    fn missing_records_count_as_zero() {
        let hierarchy = sample();
        let ghost = hierarchy.iter().find(|node| node.name() == "ghost.js").unwrap();

        assert_eq!(ghost.uid(), Some("missing"));
        assert_eq!(ghost.value(), SizeMap::default());
    }

    #[test]
    fn paths_join_ancestor_names_from_root() {
        let hierarchy = sample();
        let b = hierarchy.iter().find(|node| node.uid() == Some("b")).unwrap();

        assert_eq!(b.path(), "bundle.js/src/b.js");
        assert_eq!(b.depth(), 2);
        assert_eq!(b.ancestors().count(), 3);
        assert_eq!(hierarchy.root().path(), "bundle.js");
        assert_eq!(hierarchy.max_depth(), 2);
    }

    #[test]
    fn iteration_is_pre_order() {
        let hierarchy = sample();
        let names = hierarchy.iter().map(|node| node.name()).collect::<Vec<_>>();

        assert_eq!(
            names,
            vec!["bundle.js", "src", "a.js", "b.js", "c.js", "ghost.js"]
        );
    }
}
