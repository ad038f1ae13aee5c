//! Winit keyboard adapter
//!
//! Translates winit key events into [`ViewerAction`]s.

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::app::controls::{CEILING_STEP, ORBIT_STEP, ViewerAction, ZOOM_STEP};

/// Maps a physical key to the action it triggers, if any.
#[must_use]
pub fn translate_key(physical_key: PhysicalKey) -> Option<ViewerAction> {
    let PhysicalKey::Code(code) = physical_key else {
        return None;
    };

    let action = match code {
        KeyCode::KeyF => ViewerAction::ToggleFxaa,
        KeyCode::KeyB => ViewerAction::ToggleBlur,
        KeyCode::KeyD => ViewerAction::ToggleDemo,

        KeyCode::Digit1 => ViewerAction::SetBlurPasses(1),
        KeyCode::Digit2 => ViewerAction::SetBlurPasses(2),
        KeyCode::Digit3 => ViewerAction::SetBlurPasses(3),
        KeyCode::Digit4 => ViewerAction::SetBlurPasses(4),
        KeyCode::Digit5 => ViewerAction::SetBlurPasses(5),

        KeyCode::ArrowLeft => ViewerAction::Orbit { yaw: -ORBIT_STEP, pitch: 0.0 },
        KeyCode::ArrowRight => ViewerAction::Orbit { yaw: ORBIT_STEP, pitch: 0.0 },
        KeyCode::ArrowUp => ViewerAction::Orbit { yaw: 0.0, pitch: ORBIT_STEP },
        KeyCode::ArrowDown => ViewerAction::Orbit { yaw: 0.0, pitch: -ORBIT_STEP },

        KeyCode::PageUp => ViewerAction::Zoom(-ZOOM_STEP),
        KeyCode::PageDown => ViewerAction::Zoom(ZOOM_STEP),

        KeyCode::Equal | KeyCode::NumpadAdd => ViewerAction::AdjustCeiling(CEILING_STEP),
        KeyCode::Minus | KeyCode::NumpadSubtract => ViewerAction::AdjustCeiling(-CEILING_STEP),

        _ => return None,
    };

    Some(action)
}

/// Key presses (including repeats) become actions; releases are ignored.
#[must_use]
pub fn translate_key_event(event: &KeyEvent) -> Option<ViewerAction> {
    if event.state != ElementState::Pressed {
        return None;
    }
    translate_key(event.physical_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_set_blur_passes() {
        assert_eq!(
            translate_key(PhysicalKey::Code(KeyCode::Digit3)),
            Some(ViewerAction::SetBlurPasses(3))
        );
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyQ)), None);
    }
}
