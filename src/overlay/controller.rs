//! Overlay visibility state machine.
//!
//! Hidden → Visible shows the window, brings the process forward and arms a
//! one-shot auto-hide check. Each show starts a new session; a check that
//! fires for an older session is ignored.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::geometry::{Frame, OverlayLayout};
use crate::events::AppEvent;
use crate::model::AUTO_HIDE_TIMEOUT;
use crate::timers::Timers;

/// OS window API.
pub trait WindowBackend {
    /// Place the window at `frame`, order it front and make it key.
    fn show(&mut self, frame: Frame);

    fn hide(&mut self);

    fn set_frame(&mut self, frame: Frame);

    /// Whether the overlay currently holds keyboard focus.
    fn has_focus(&self) -> bool;

    /// Bring the owning process to the foreground.
    fn activate_process(&mut self);

    /// Primary display frame, if one is available.
    fn primary_display(&self) -> Option<Frame>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowVisibility {
    #[default]
    Hidden,
    Visible,
}

/// Result of an auto-hide check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogOutcome {
    /// The check belongs to an earlier visibility session.
    Stale,
    AlreadyHidden,
    /// The window holds focus; the watchdog is abandoned.
    FocusHeld,
    Hidden,
}

pub struct OverlayWindowController {
    window: Box<dyn WindowBackend>,
    layout: OverlayLayout,
    auto_hide: Duration,
    visibility: WindowVisibility,
    last_shown_at: Option<Instant>,
    session: u64,
    expanded: bool,
}

impl OverlayWindowController {
    pub fn new(window: Box<dyn WindowBackend>) -> Self {
        Self {
            window,
            layout: OverlayLayout::default(),
            auto_hide: AUTO_HIDE_TIMEOUT,
            visibility: WindowVisibility::Hidden,
            last_shown_at: None,
            session: 0,
            expanded: false,
        }
    }

    pub fn with_auto_hide(mut self, timeout: Duration) -> Self {
        self.auto_hide = timeout;
        self
    }

    pub fn with_layout(mut self, layout: OverlayLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn visibility(&self) -> WindowVisibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == WindowVisibility::Visible
    }

    pub fn last_shown_at(&self) -> Option<Instant> {
        self.last_shown_at
    }

    /// Current visibility session; bumped on every Hidden → Visible.
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn auto_hide(&self) -> Duration {
        self.auto_hide
    }

    /// Frame the window would use right now.
    pub fn current_frame(&self) -> Frame {
        self.layout
            .frame_for(self.window.primary_display(), self.expanded)
    }

    pub fn toggle(&mut self, timers: &Timers) -> WindowVisibility {
        match self.visibility {
            WindowVisibility::Visible => self.hide(),
            WindowVisibility::Hidden => self.show(timers),
        }
        self.visibility
    }

    /// Show and arm the auto-hide check. No-op when already visible.
    pub fn show(&mut self, timers: &Timers) {
        if self.is_visible() {
            return;
        }
        let frame = self.current_frame();
        self.window.show(frame);
        self.window.activate_process();

        self.visibility = WindowVisibility::Visible;
        self.last_shown_at = Some(Instant::now());
        self.session += 1;

        timers.after(
            self.auto_hide,
            AppEvent::AutoHideCheck {
                session: self.session,
            },
        );
        info!(session = self.session, expanded = self.expanded, "Overlay shown");
    }

    /// No-op when already hidden.
    pub fn hide(&mut self) {
        if !self.is_visible() {
            return;
        }
        self.window.hide();
        self.visibility = WindowVisibility::Hidden;
        info!(session = self.session, "Overlay hidden");
    }

    /// Switch between the collapsed and expanded footprint, resizing in
    /// place when visible.
    pub fn set_expanded(&mut self, expanded: bool) {
        if self.expanded == expanded {
            return;
        }
        self.expanded = expanded;
        if self.is_visible() {
            let frame = self.current_frame();
            self.window.set_frame(frame);
            debug!(expanded, height = frame.height, "Overlay resized");
        }
    }

    pub fn on_auto_hide_check(&mut self, session: u64) -> WatchdogOutcome {
        if session != self.session {
            return WatchdogOutcome::Stale;
        }
        if !self.is_visible() {
            return WatchdogOutcome::AlreadyHidden;
        }
        if self.window.has_focus() {
            debug!(session, "Overlay has focus, auto-hide abandoned");
            return WatchdogOutcome::FocusHeld;
        }
        debug!(session, "Auto-hiding unfocused overlay");
        self.hide();
        WatchdogOutcome::Hidden
    }
}
