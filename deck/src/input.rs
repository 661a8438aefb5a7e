//! Input model: pointer buttons and the manager's active gesture.
//!
//! The host translates raw DOM pointer events into calls on
//! [`crate::manager::PanelManager`]; `Gesture` records which panel owns the
//! pointer between pointer-down and pointer-up so moves and releases are
//! routed to the right controller even when the pointer leaves the panel.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::layout::PanelId;

/// Which button a pointer event came from. Only `Primary` starts or ends a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Other,
}

/// Gesture currently tracked by the manager.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A panel is being moved by its header.
    Dragging {
        /// Panel that received the pointer-down.
        panel_id: PanelId,
    },
    /// A panel is being resized from its bottom-right hotzone.
    Resizing {
        /// Panel that received the pointer-down.
        panel_id: PanelId,
    },
}

impl Gesture {
    /// The panel the gesture belongs to, if any.
    #[must_use]
    pub fn panel_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Dragging { panel_id } | Self::Resizing { panel_id } => Some(panel_id),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
