//! Overlay placement.
//!
//! Coordinates are AppKit screen points: origin at the bottom-left of the
//! display, y growing upward.

use crate::model::{
    COLLAPSED_HEIGHT, EXPANDED_HEIGHT, FALLBACK_DISPLAY_HEIGHT, FALLBACK_DISPLAY_WIDTH,
    OVERLAY_WIDTH, VERTICAL_OFFSET,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Footprints and offset used to place the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub collapsed: Size,
    pub expanded: Size,
    pub vertical_offset: f64,
    pub fallback_display: Frame,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            collapsed: Size {
                width: OVERLAY_WIDTH,
                height: COLLAPSED_HEIGHT,
            },
            expanded: Size {
                width: OVERLAY_WIDTH,
                height: EXPANDED_HEIGHT,
            },
            vertical_offset: VERTICAL_OFFSET,
            fallback_display: Frame::new(0.0, 0.0, FALLBACK_DISPLAY_WIDTH, FALLBACK_DISPLAY_HEIGHT),
        }
    }
}

impl OverlayLayout {
    pub fn size_for(&self, expanded: bool) -> Size {
        if expanded {
            self.expanded
        } else {
            self.collapsed
        }
    }

    /// Window frame centered horizontally on `display`, and vertically
    /// centered then raised by the offset.
    pub fn frame_for(&self, display: Option<Frame>, expanded: bool) -> Frame {
        let display = display.unwrap_or(self.fallback_display);
        let size = self.size_for(expanded);
        Frame::new(
            display.mid_x() - size.width / 2.0,
            display.mid_y() - size.height / 2.0 + self.vertical_offset,
            size.width,
            size.height,
        )
    }
}
