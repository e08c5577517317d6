//! Built-in facility applications.

use crate::window::AppRef;

/// (id, title, glyph) for every application shipped on the station desktop.
const BUILTIN: &[(&str, &str, char)] = &[
    ("terminal", "Terminal", '>'),
    ("files", "File Browser", 'F'),
    ("calculator", "Calculator", '='),
    ("inbox", "Message Inbox", '@'),
    ("cameras", "Camera Feeds", 'O'),
    ("facility-map", "Facility Layout", '#'),
    ("diagnostics", "System Diagnostics", '!'),
    ("sonar", "Sonar Console", '~'),
];

/// Every built-in application, in desktop order.
pub fn builtin_apps() -> Vec<AppRef> {
    BUILTIN
        .iter()
        .map(|(id, title, glyph)| AppRef::new(*id, *title, *glyph))
        .collect()
}

/// Look up a built-in application by id (case-insensitive).
pub fn find_app(id: &str) -> Option<AppRef> {
    BUILTIN
        .iter()
        .find(|(app_id, _, _)| app_id.eq_ignore_ascii_case(id))
        .map(|(id, title, glyph)| AppRef::new(*id, *title, *glyph))
}
