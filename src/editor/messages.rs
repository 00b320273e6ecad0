//! Message types for the editor session
//!
//! Messages carry view-space pointer coordinates; the session converts them to
//! buffer coordinates using the current zoom. They deserialize from JSON so an
//! editing session can be replayed from a script.

use serde::{Deserialize, Serialize};

use crate::domain::Tool;

use super::shortcuts::{Key, Modifiers};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    PointerDown {
        x: f32,
        y: f32,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    /// Release, or the pointer leaving the canvas
    PointerUp {
        x: f32,
        y: f32,
    },
    /// Raw key press, resolved through the shortcut table
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Escape,
    Delete,
    TextInput {
        text: String,
    },
    TextConfirm,
    TextCancel,
    QuickText {
        text: String,
    },
    SelectTool {
        tool: Tool,
    },
    /// `#rrggbb`
    SetColor {
        color: String,
    },
    SetStrokeWidth {
        width: f32,
    },
    SetFontSize {
        size: f32,
    },
    SetFill {
        fill: bool,
    },
    ZoomIn,
    ZoomOut,
    ResetZoom,
    ZoomToFit {
        container_width: f32,
        container_height: f32,
    },
    Undo,
    Redo,
    Download,
    Copy,
}

impl Msg {
    pub fn select_tool(tool: Tool) -> Self {
        Msg::SelectTool { tool }
    }
}
