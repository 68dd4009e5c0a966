//! Generic input event identifiers for cross-backend compatibility.

/// Generic key representation for cross-backend compatibility.
///
/// Host backends map their native key codes to these generic values before
/// feeding them into the manager, so the pipeline never sees platform codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    /// Escape key
    Escape,
    /// Return/Enter key
    Return,
    /// Backspace key
    Backspace,
    /// Tab key
    Tab,
    /// Space bar
    Space,
    /// Shift modifier
    Shift,
    /// Ctrl modifier
    Ctrl,
    /// Alt modifier
    Alt,
    /// Unmapped or unrecognized key
    Unknown,
}

/// Pointing-device button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Left/primary button (usually starts a gesture)
    Left,
    /// Right/secondary button
    Right,
    /// Middle button
    Middle,
    /// Stylus barrel or other extra button, by backend-specific index
    Other(u8),
}
