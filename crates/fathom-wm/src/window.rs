//! Window and application reference types.

use serde::{Deserialize, Serialize};

/// A launchable leaf application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppRef {
    /// Stable identifier; at most one window per id may be open.
    pub id: String,
    /// Title bar text.
    pub title: String,
    /// Single glyph used for the desktop icon and taskbar.
    pub glyph: char,
}

impl AppRef {
    pub fn new(id: impl Into<String>, title: impl Into<String>, glyph: char) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            glyph,
        }
    }
}

/// One open application window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Same as `app.id`.
    pub id: String,
    pub app: AppRef,
    /// Paint order; higher draws on top.
    pub z_index: u32,
}

impl Window {
    pub(crate) fn new(app: &AppRef, z_index: u32) -> Self {
        Self {
            id: app.id.clone(),
            app: app.clone(),
            z_index,
        }
    }
}
