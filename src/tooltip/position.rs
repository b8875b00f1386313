#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxSize {
    pub width: f32,
    pub height: f32,
}

impl BoxSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margin {
    pub x: f32,
    pub y: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self { x: 10.0, y: 10.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Start(f32),
    End(f32),
}

impl Anchor {
    fn resolve(pointer: f32, panel: f32, viewport: f32, margin: f32) -> Self {
        let space_after = viewport - pointer;
        if space_after >= panel + margin {
            Self::Start(pointer + margin)
        } else {
            Self::End(space_after + margin)
        }
    }

    pub fn start(self) -> Option<f32> {
        match self {
            Self::Start(offset) => Some(offset),
            Self::End(_) => None,
        }
    }

    pub fn end(self) -> Option<f32> {
        match self {
            Self::Start(_) => None,
            Self::End(offset) => Some(offset),
        }
    }

    fn origin(self, panel: f32, viewport: f32) -> f32 {
        match self {
            Self::Start(offset) => offset,
            Self::End(offset) => viewport - offset - panel,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub vertical: Anchor,
    pub horizontal: Anchor,
}

impl Placement {
    pub fn top(&self) -> Option<f32> {
        self.vertical.start()
    }

    pub fn bottom(&self) -> Option<f32> {
        self.vertical.end()
    }

    pub fn left(&self) -> Option<f32> {
        self.horizontal.start()
    }

    pub fn right(&self) -> Option<f32> {
        self.horizontal.end()
    }

    /// The four style directives; `None` clears the property.
    pub fn style_pairs(&self) -> [(&'static str, Option<String>); 4] {
        let px = |value: Option<f32>| value.map(|value| format!("{value}px"));
        [
            ("top", px(self.top())),
            ("bottom", px(self.bottom())),
            ("left", px(self.left())),
            ("right", px(self.right())),
        ]
    }

    pub fn top_left(&self, panel: BoxSize, viewport: BoxSize) -> Point {
        Point {
            x: self.horizontal.origin(panel.width, viewport.width),
            y: self.vertical.origin(panel.height, viewport.height),
        }
    }
}

/// Places the panel below/right of the pointer when it fits, otherwise
/// anchors it to the opposite viewport edge. Axes are independent.
pub fn position(pointer: Point, panel: BoxSize, viewport: BoxSize, margin: Margin) -> Placement {
    Placement {
        vertical: Anchor::resolve(pointer.y, panel.height, viewport.height, margin.y),
        horizontal: Anchor::resolve(pointer.x, panel.width, viewport.width, margin.x),
    }
}
