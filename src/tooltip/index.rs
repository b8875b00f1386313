use std::collections::HashMap;

use tracing::debug;

use crate::stats::{Link, ModuleRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkedModule<'a> {
    pub uid: &'a str,
    pub record: Option<&'a ModuleRecord>,
}

impl<'a> LinkedModule<'a> {
    pub fn display_id(&self) -> &'a str {
        self.record.map(|record| record.id.as_str()).unwrap_or(self.uid)
    }
}

/// Forward and reverse import lists keyed by uid. A uid with no links in a
/// given direction has no entry at all.
#[derive(Clone, Debug, Default)]
pub struct DependencyIndex<'a> {
    imported_by: HashMap<&'a str, Vec<LinkedModule<'a>>>,
    imports: HashMap<&'a str, Vec<LinkedModule<'a>>>,
}

impl<'a> DependencyIndex<'a> {
    pub fn build(links: &'a [Link], nodes: &'a HashMap<String, ModuleRecord>) -> Self {
        let mut imported_by: HashMap<&'a str, Vec<LinkedModule<'a>>> = HashMap::new();
        let mut imports: HashMap<&'a str, Vec<LinkedModule<'a>>> = HashMap::new();

        let linked = |uid: &'a str| LinkedModule {
            uid,
            record: nodes.get(uid),
        };

        for link in links {
            imported_by
                .entry(link.target.as_str())
                .or_default()
                .push(linked(link.source.as_str()));
            imports
                .entry(link.source.as_str())
                .or_default()
                .push(linked(link.target.as_str()));
        }

        debug!(
            links = links.len(),
            imported = imported_by.len(),
            importing = imports.len(),
            "built dependency index"
        );

        Self {
            imported_by,
            imports,
        }
    }

    pub fn imported_by(&self, uid: &str) -> Option<&[LinkedModule<'a>]> {
        self.imported_by.get(uid).map(Vec::as_slice)
    }

    pub fn imports(&self, uid: &str) -> Option<&[LinkedModule<'a>]> {
        self.imports.get(uid).map(Vec::as_slice)
    }
}
