//! Keyboard controls for the interactive studio.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::camera::MediaDevices;
use crate::studio::Studio;
use crate::view::Filter;

/// A user action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    ToggleStreaming,
    ZoomIn,
    ZoomOut,
    Filter(Filter),
    NextDevice,
    Save,
    Quit,
}

impl Control {
    /// Whether the control exists while no stream is requested.
    ///
    /// Only the streaming toggle (and quitting) is offered while idle.
    pub fn available_while_idle(self) -> bool {
        matches!(self, Control::ToggleStreaming | Control::Quit)
    }
}

/// Map a key press to a control.
///
/// Key releases and repeats are ignored.
pub fn control_for_key(event: KeyEvent) -> Option<Control> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Control::Quit),
            _ => None,
        };
    }

    match event.code {
        KeyCode::Char(' ') => Some(Control::ToggleStreaming),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Control::ZoomIn),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Control::ZoomOut),
        KeyCode::Char('1') => Some(Control::Filter(Filter::Original)),
        KeyCode::Char('2') => Some(Control::Filter(Filter::Grayscale)),
        KeyCode::Char('3') => Some(Control::Filter(Filter::Blur)),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Control::NextDevice),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Control::Save),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Control::Quit),
        _ => None,
    }
}

/// Apply a synchronous control to the studio.
///
/// Returns `false` if the control was ignored. `Save` and `Quit` need the
/// caller's event loop and are always reported as ignored here.
pub fn apply_control<D: MediaDevices>(studio: &mut Studio<D>, control: Control) -> bool {
    if !studio.is_streaming() && !control.available_while_idle() {
        return false;
    }

    match control {
        Control::ToggleStreaming => {
            studio.toggle_streaming();
            true
        }
        Control::ZoomIn => {
            studio.zoom_in();
            true
        }
        Control::ZoomOut => {
            studio.zoom_out();
            true
        }
        Control::Filter(filter) => studio.set_filter(filter),
        Control::NextDevice => studio.select_next_device(),
        Control::Save | Control::Quit => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(
            control_for_key(press(KeyCode::Char(' '))),
            Some(Control::ToggleStreaming)
        );
        assert_eq!(control_for_key(press(KeyCode::Char('+'))), Some(Control::ZoomIn));
        assert_eq!(control_for_key(press(KeyCode::Char('='))), Some(Control::ZoomIn));
        assert_eq!(control_for_key(press(KeyCode::Char('-'))), Some(Control::ZoomOut));
        assert_eq!(
            control_for_key(press(KeyCode::Char('3'))),
            Some(Control::Filter(Filter::Blur))
        );
        assert_eq!(control_for_key(press(KeyCode::Char('s'))), Some(Control::Save));
        assert_eq!(control_for_key(press(KeyCode::Esc)), Some(Control::Quit));
        assert_eq!(control_for_key(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(control_for_key(event), Some(Control::Quit));

        let event = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(control_for_key(event), None);
    }

    #[test]
    fn test_key_release_ignored() {
        let mut event = press(KeyCode::Char(' '));
        event.kind = KeyEventKind::Release;
        assert_eq!(control_for_key(event), None);
    }

    #[test]
    fn test_idle_controls() {
        assert!(Control::ToggleStreaming.available_while_idle());
        assert!(Control::Quit.available_while_idle());
        assert!(!Control::ZoomIn.available_while_idle());
        assert!(!Control::Save.available_while_idle());
        assert!(!Control::Filter(Filter::Blur).available_while_idle());
    }
}
