use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use super::TooltipError;
use super::content::{ContentCache, ContentConfig, ContentNode, TooltipContent, build_cache};
use super::position::{BoxSize, Margin, Placement, Point, position};

pub const OPAQUE: f32 = 1.0;
pub const TRANSPARENT: f32 = 0.0;

pub trait TooltipSurface {
    fn set_opacity(&mut self, opacity: f32);
    fn set_content(&mut self, content: &TooltipContent);
    /// Measured after `set_content`, since the panel size follows its content.
    fn panel_box(&self) -> BoxSize;
    fn viewport_box(&self) -> BoxSize;
    fn apply_placement(&mut self, placement: &Placement);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TooltipState {
    Hidden,
    Visible,
    Positioned(Placement),
}

pub struct TooltipController<K> {
    cache: ContentCache<K>,
    state: TooltipState,
    margin: Margin,
}

impl<K> TooltipController<K>
where
    K: Clone + Eq + Hash + Debug,
{
    pub fn new(margin: Margin) -> Self {
        Self {
            cache: ContentCache::default(),
            state: TooltipState::Hidden,
            margin,
        }
    }

    pub fn state(&self) -> TooltipState {
        self.state
    }

    pub fn cache(&self) -> &ContentCache<K> {
        &self.cache
    }

    pub fn replace_cache(&mut self, cache: ContentCache<K>) {
        self.cache = cache;
    }

    /// Builds a new cache and replaces the current one only on success.
    pub fn build_cache<N, I>(
        &mut self,
        content_nodes: I,
        config: &ContentConfig<'_, N>,
    ) -> Result<(), TooltipError>
    where
        N: ContentNode<Key = K>,
        I: IntoIterator<Item = N>,
    {
        let cache = build_cache(content_nodes, config)?;
        self.replace_cache(cache);
        Ok(())
    }

    pub fn pointer_enter(&mut self, surface: &mut impl TooltipSurface) {
        surface.set_opacity(OPAQUE);
        if self.state == TooltipState::Hidden {
            self.state = TooltipState::Visible;
        }
    }

    pub fn pointer_move(
        &mut self,
        key: &K,
        pointer: Point,
        surface: &mut impl TooltipSurface,
    ) -> Result<Placement, TooltipError> {
        let content = self
            .cache
            .get(key)
            .ok_or_else(|| TooltipError::UnknownNode(format!("{key:?}")))?;
        surface.set_content(content);

        let placement = position(
            pointer,
            surface.panel_box(),
            surface.viewport_box(),
            self.margin,
        );
        surface.apply_placement(&placement);
        self.state = TooltipState::Positioned(placement);
        Ok(placement)
    }

    pub fn pointer_leave(&mut self, surface: &mut impl TooltipSurface) {
        surface.set_opacity(TRANSPARENT);
        if self.state != TooltipState::Hidden {
            debug!("tooltip hidden");
        }
        self.state = TooltipState::Hidden;
    }
}
