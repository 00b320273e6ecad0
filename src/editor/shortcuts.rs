use serde::{Deserialize, Serialize};

use crate::domain::Tool;
use crate::editor::messages::Msg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Enter,
    Character(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn control(self) -> bool {
        self.ctrl
    }

    pub fn shift(self) -> bool {
        self.shift
    }
}

pub fn handle_key_event(key: Key, modifiers: Modifiers, text_entry_open: bool) -> Option<Msg> {
    // While typing, only keys that leave the entry are shortcuts
    if text_entry_open {
        return match key {
            Key::Escape => Some(Msg::Escape),
            Key::Enter if !modifiers.shift() => Some(Msg::TextConfirm),
            _ => None,
        };
    }

    match key {
        Key::Escape => Some(Msg::Escape),
        Key::Delete | Key::Backspace => Some(Msg::Delete),
        // Undo/redo shortcuts
        Key::Character(c) if c.eq_ignore_ascii_case(&'z') && modifiers.control() && !modifiers.shift() => {
            Some(Msg::Undo)
        }
        Key::Character(c)
            if (c.eq_ignore_ascii_case(&'y') && modifiers.control())
                || (c.eq_ignore_ascii_case(&'z') && modifiers.control() && modifiers.shift()) =>
        {
            Some(Msg::Redo)
        }
        // Save/copy shortcuts
        Key::Character(c) if c.eq_ignore_ascii_case(&'s') && modifiers.control() => Some(Msg::Download),
        Key::Character(c) if c.eq_ignore_ascii_case(&'c') && modifiers.control() => Some(Msg::Copy),
        // Tool shortcuts
        Key::Character(c) if !modifiers.control() => Tool::from_shortcut(c).map(Msg::select_tool),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
    };
    const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
    };
    const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
    };

    #[test]
    fn test_history_and_export_shortcuts() {
        assert_eq!(handle_key_event(Key::Character('z'), CTRL, false), Some(Msg::Undo));
        assert_eq!(handle_key_event(Key::Character('y'), CTRL, false), Some(Msg::Redo));
        assert_eq!(handle_key_event(Key::Character('Z'), CTRL_SHIFT, false), Some(Msg::Redo));
        assert_eq!(handle_key_event(Key::Character('s'), CTRL, false), Some(Msg::Download));
        assert_eq!(handle_key_event(Key::Character('c'), CTRL, false), Some(Msg::Copy));
    }

    #[test]
    fn test_tool_letters() {
        let expected = [
            ('v', Tool::Select),
            ('a', Tool::Arrow),
            ('l', Tool::Line),
            ('r', Tool::Rect),
            ('c', Tool::Circle),
            ('p', Tool::Pixelate),
            ('b', Tool::Blur),
            ('t', Tool::Text),
        ];
        for (c, tool) in expected {
            assert_eq!(handle_key_event(Key::Character(c), NONE, false), Some(Msg::select_tool(tool)));
        }
        assert_eq!(handle_key_event(Key::Character('x'), NONE, false), None);
    }

    #[test]
    fn test_text_entry_swallows_letters() {
        assert_eq!(handle_key_event(Key::Character('a'), NONE, true), None);
        assert_eq!(handle_key_event(Key::Character('z'), CTRL, true), None);
        assert_eq!(handle_key_event(Key::Delete, NONE, true), None);
        assert_eq!(handle_key_event(Key::Enter, NONE, true), Some(Msg::TextConfirm));
        assert_eq!(handle_key_event(Key::Escape, NONE, true), Some(Msg::Escape));
    }
}
