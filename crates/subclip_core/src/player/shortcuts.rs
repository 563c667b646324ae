//! Keyboard shortcuts for the player.
//!
//! | key          | command                    |
//! |--------------|----------------------------|
//! | space, `k`   | play / pause               |
//! | `f`          | toggle fullscreen          |
//! | Escape       | exit fullscreen            |
//! | `m`          | mute / unmute              |
//! | left, right  | seek back / forward        |
//! | up, down     | volume up / down           |
//! | `[`, `]`     | subtitles earlier / later  |
//! | `0`          | reset subtitle offset      |

use super::session::{PlayerCommand, SessionOptions};

/// A key press, independent of any UI toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Space,
    Escape,
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    /// Parse a key name (`"space"`, `"esc"`, `"left"`, or a single character).
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "space" => Key::Space,
            "esc" | "escape" => Key::Escape,
            "left" | "arrowleft" => Key::Left,
            "right" | "arrowright" => Key::Right,
            "up" | "arrowup" => Key::Up,
            "down" | "arrowdown" => Key::Down,
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// Map a key to a player command.
///
/// Letters match case-insensitively. Unbound keys return `None`.
pub fn command_for(key: Key, options: &SessionOptions) -> Option<PlayerCommand> {
    let command = match key {
        Key::Space => PlayerCommand::TogglePlay,
        Key::Escape => PlayerCommand::ExitFullscreen,
        Key::Left => PlayerCommand::SeekBy(-options.seek_step_secs),
        Key::Right => PlayerCommand::SeekBy(options.seek_step_secs),
        Key::Up => PlayerCommand::VolumeBy(options.volume_step),
        Key::Down => PlayerCommand::VolumeBy(-options.volume_step),
        Key::Char(c) => match c.to_ascii_lowercase() {
            'k' => PlayerCommand::TogglePlay,
            'f' => PlayerCommand::ToggleFullscreen,
            'm' => PlayerCommand::ToggleMute,
            '[' => PlayerCommand::OffsetBy(-options.offset_step_secs),
            ']' => PlayerCommand::OffsetBy(options.offset_step_secs),
            '0' => PlayerCommand::ResetOffset,
            ' ' => PlayerCommand::TogglePlay,
            _ => return None,
        },
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names() {
        assert_eq!(Key::parse("Space"), Some(Key::Space));
        assert_eq!(Key::parse("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::parse("esc"), Some(Key::Escape));
        assert_eq!(Key::parse("K"), Some(Key::Char('k')));
        assert_eq!(Key::parse("]"), Some(Key::Char(']')));
        assert_eq!(Key::parse("ctrl"), None);
        assert_eq!(Key::parse(""), None);
    }

    #[test]
    fn bindings_use_configured_steps() {
        let options = SessionOptions {
            offset_step_secs: 0.25,
            offset_limit_secs: 10.0,
            seek_step_secs: 10.0,
            volume_step: 0.05,
        };
        assert_eq!(command_for(Key::Right, &options), Some(PlayerCommand::SeekBy(10.0)));
        assert_eq!(command_for(Key::Down, &options), Some(PlayerCommand::VolumeBy(-0.05)));
        assert_eq!(
            command_for(Key::Char('['), &options),
            Some(PlayerCommand::OffsetBy(-0.25))
        );
    }

    #[test]
    fn letter_bindings() {
        let options = SessionOptions::default();
        assert_eq!(command_for(Key::Char('K'), &options), Some(PlayerCommand::TogglePlay));
        assert_eq!(command_for(Key::Space, &options), Some(PlayerCommand::TogglePlay));
        assert_eq!(command_for(Key::Char('f'), &options), Some(PlayerCommand::ToggleFullscreen));
        assert_eq!(command_for(Key::Escape, &options), Some(PlayerCommand::ExitFullscreen));
        assert_eq!(command_for(Key::Char('m'), &options), Some(PlayerCommand::ToggleMute));
        assert_eq!(command_for(Key::Char('0'), &options), Some(PlayerCommand::ResetOffset));
        assert_eq!(command_for(Key::Char('x'), &options), None);
    }
}
