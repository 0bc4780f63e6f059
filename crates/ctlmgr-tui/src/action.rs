//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use ctlmgr_core::{ControllerAction, Snapshot};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A status-bar notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// The one entry a context menu offers, anchored where it was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRequest {
    pub controller: String,
    pub action: ControllerAction,
    /// Terminal cell (column, row) the menu opens at.
    pub anchor: (u16, u16),
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Data ──────────────────────────────────────────────────────
    Refresh,
    SnapshotUpdated(Arc<Snapshot>),

    // ── Context menu ──────────────────────────────────────────────
    OpenContextMenu(MenuRequest),
    ConfirmMenu,
    CancelMenu,

    // ── Help ──────────────────────────────────────────────────────
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
