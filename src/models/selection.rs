// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Ad region selection state machine.
//!
//! Tracks a single drag-to-select rectangle in canvas-pixel space through
//! its lifecycle: idle, selecting (pointer held), completed.

use egui::{pos2, Pos2, Rect};

/// Default minimum drag extent on each axis, in canvas pixels.
pub const MIN_SELECTION_SIZE: f32 = 20.0;

/// Rectangle anchored at the drag start point.
///
/// `width` and `height` keep their sign while dragging: a negative width
/// means the pointer is left of the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionRect {
    pub start_x: f32,
    pub start_y: f32,
    pub width: f32,
    pub height: f32,
}

impl SelectionRect {
    /// True when either extent is zero (nothing to draw).
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Canonical top-left anchored rectangle, whatever the drag direction.
    pub fn normalized(&self) -> Rect {
        let x = if self.width < 0.0 {
            self.start_x + self.width
        } else {
            self.start_x
        };
        let y = if self.height < 0.0 {
            self.start_y + self.height
        } else {
            self.start_y
        };
        Rect::from_min_size(pos2(x, y), egui::vec2(self.width.abs(), self.height.abs()))
    }
}

/// Lifecycle of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selecting,
    Completed,
}

/// Outcome of a state machine operation, used for user notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    None,
    Started,
    Completed,
    /// Drag ended below the minimum size and was dropped
    Discarded,
    Reset,
}

/// Drag-to-select state machine.
#[derive(Debug, Clone)]
pub struct Selection {
    rect: SelectionRect,
    state: SelectionState,
    min_size: f32,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(MIN_SELECTION_SIZE)
    }
}

impl Selection {
    /// Create an idle selection with the given minimum drag extent.
    pub fn new(min_size: f32) -> Self {
        Self {
            rect: SelectionRect::default(),
            state: SelectionState::Idle,
            min_size,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn rect(&self) -> &SelectionRect {
        &self.rect
    }

    pub fn is_completed(&self) -> bool {
        self.state == SelectionState::Completed
    }

    /// Anchor a new drag at `point`. Ignored once a selection is completed.
    pub fn start(&mut self, point: Pos2) -> SelectionEvent {
        if self.state == SelectionState::Completed {
            return SelectionEvent::None;
        }

        self.rect = SelectionRect {
            start_x: point.x,
            start_y: point.y,
            width: 0.0,
            height: 0.0,
        };
        self.state = SelectionState::Selecting;
        SelectionEvent::Started
    }

    /// Stretch the rectangle to `point`. No-op unless selecting.
    pub fn update(&mut self, point: Pos2) {
        if self.state != SelectionState::Selecting {
            return;
        }

        self.rect.width = point.x - self.rect.start_x;
        self.rect.height = point.y - self.rect.start_y;
    }

    /// Finish the drag.
    ///
    /// Completes only when both extents exceed the minimum size; otherwise
    /// the rectangle is dropped and a new drag may start.
    pub fn end(&mut self) -> SelectionEvent {
        if self.state != SelectionState::Selecting {
            return SelectionEvent::None;
        }

        if self.rect.width.abs() > self.min_size && self.rect.height.abs() > self.min_size {
            self.state = SelectionState::Completed;
            log::info!(
                "Selection completed: {:?}",
                self.rect.normalized()
            );
            SelectionEvent::Completed
        } else {
            log::debug!(
                "Selection discarded ({:.1} x {:.1})",
                self.rect.width,
                self.rect.height
            );
            self.rect = SelectionRect::default();
            self.state = SelectionState::Idle;
            SelectionEvent::Discarded
        }
    }

    /// Clear all geometry and return to idle.
    pub fn reset(&mut self) -> SelectionEvent {
        self.rect = SelectionRect::default();
        self.state = SelectionState::Idle;
        SelectionEvent::Reset
    }
}
