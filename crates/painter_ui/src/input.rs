//! Input events delivered to the viewer.

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
}

/// Keyboard key. Only keys the viewer reacts to are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape key.
    Escape,
}

/// Something that happened to the viewer window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    /// The window was resized to `width` x `height` pixels.
    Resize {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// A mouse button changed state at window position (`x`, `y`).
    Mouse {
        /// Which button.
        button: MouseButton,
        /// `true` on press, `false` on release.
        pressed: bool,
        /// Cursor X in window pixels.
        x: f64,
        /// Cursor Y in window pixels.
        y: f64,
    },
    /// A key was pressed.
    Key(Key),
    /// The window was closed.
    Close,
}

impl ViewerEvent {
    /// Right-button press at (`x`, `y`).
    #[must_use]
    pub const fn right_click(x: f64, y: f64) -> Self {
        Self::Mouse {
            button: MouseButton::Right,
            pressed: true,
            x,
            y,
        }
    }

    /// Returns true if this event ends the viewer session.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Close | Self::Key(Key::Escape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(ViewerEvent::Close.is_terminal());
        assert!(ViewerEvent::Key(Key::Escape).is_terminal());
        assert!(!ViewerEvent::Resize { width: 10, height: 10 }.is_terminal());
        assert!(!ViewerEvent::Mouse { button: MouseButton::Left, pressed: true, x: 0.0, y: 0.0 }.is_terminal());
        assert!(!ViewerEvent::right_click(1.0, 2.0).is_terminal());
    }
}
