use bundle_analisa::stats::{Hierarchy, HierarchyNode, NodeIndex, SizeKind};
use eframe::egui::{Pos2, Rect, pos2};

const PADDING: f32 = 2.0;
const HEADER_HEIGHT: f32 = 14.0;
const MIN_EXTENT: f32 = 1.0;

#[derive(Clone, Copy, Debug)]
pub(super) struct TreemapCell {
    pub(super) index: NodeIndex,
    pub(super) rect: Rect,
    pub(super) depth: usize,
    pub(super) value: u64,
    pub(super) has_header: bool,
}

/// Slice-and-dice layout sized by `kind`. Cells come out parents first, so
/// the last cell containing a point is the deepest one.
pub(super) fn layout_treemap(hierarchy: &Hierarchy, kind: SizeKind, rect: Rect) -> Vec<TreemapCell> {
    let mut cells = Vec::with_capacity(hierarchy.len());
    layout_node(hierarchy.root(), kind, rect, &mut cells);
    cells
}

fn layout_node(node: HierarchyNode<'_>, kind: SizeKind, rect: Rect, cells: &mut Vec<TreemapCell>) {
    if rect.width() < MIN_EXTENT || rect.height() < MIN_EXTENT {
        return;
    }

    let value = node.value().get(kind);
    let mut inner = rect.shrink(PADDING);
    let has_header = node.depth() > 0 && !node.is_leaf() && inner.height() > HEADER_HEIGHT * 2.0;
    if has_header {
        inner.min.y += HEADER_HEIGHT;
    }

    cells.push(TreemapCell {
        index: node.index(),
        rect,
        depth: node.depth(),
        value,
        has_header,
    });

    let children = node
        .children()
        .filter(|child| child.value().get(kind) > 0)
        .collect::<Vec<_>>();
    let total = children
        .iter()
        .map(|child| child.value().get(kind))
        .sum::<u64>();
    if total == 0 || inner.width() < MIN_EXTENT || inner.height() < MIN_EXTENT {
        return;
    }

    let horizontal = inner.width() >= inner.height();
    let mut cursor = if horizontal { inner.min.x } else { inner.min.y };

    for child in children {
        let share = child.value().get(kind) as f32 / total as f32;
        let child_rect = if horizontal {
            let width = inner.width() * share;
            let child_rect = Rect::from_min_max(
                pos2(cursor, inner.min.y),
                pos2(cursor + width, inner.max.y),
            );
            cursor += width;
            child_rect
        } else {
            let height = inner.height() * share;
            let child_rect = Rect::from_min_max(
                pos2(inner.min.x, cursor),
                pos2(inner.max.x, cursor + height),
            );
            cursor += height;
            child_rect
        };
        layout_node(child, kind, child_rect, cells);
    }
}

pub(super) fn cell_at(cells: &[TreemapCell], pointer: Pos2) -> Option<&TreemapCell> {
    cells.iter().rev().find(|cell| cell.rect.contains(pointer))
}
