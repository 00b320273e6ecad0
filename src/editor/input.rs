//! Pointer and keyboard interaction as a pure state machine
//!
//! [`transition`] takes the current interaction state and an event and returns
//! the next state plus the effects the session must apply. It never touches
//! pixels, so every gesture can be tested without a surface.

use crate::domain::{TextObject, Tool, clamp_font_size};

use super::surface::{TextHit, hit_test_texts};

/// Hint shown in an empty text entry; never committed as text
pub const TEXT_PLACEHOLDER: &str = "Type text...";

/// Offset from the buffer origin for quick text when no pointer position is known
pub const QUICK_TEXT_OFFSET: f32 = 20.0;

/// Whether entered text should become a text object
pub fn is_meaningful_text(text: &str) -> bool {
    !text.trim().is_empty() && text != TEXT_PLACEHOLDER
}

/// Input in persistent-buffer coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    /// Release, or the pointer leaving the canvas
    PointerUp { x: f32, y: f32 },
    Escape,
    Delete,
    /// Replace the contents of the open text entry
    TextInput(String),
    TextConfirm,
    TextCancel,
    /// Add text without opening an entry
    QuickText(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Drawing {
        tool: Tool,
        start_x: f32,
        start_y: f32,
    },
    DraggingText {
        index: usize,
        offset_x: f32,
        offset_y: f32,
    },
    ResizingText {
        index: usize,
        start_y: f32,
        start_font_size: f32,
        start_height: f32,
    },
    TextEditing {
        x: f32,
        y: f32,
        text: String,
    },
}

/// Changes requested by a transition, applied in order
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Flatten all floating text into the buffer and snapshot
    CommitAllText,
    PreviewStroke {
        tool: Tool,
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
    },
    /// Apply a stroke to the buffer and snapshot
    CommitStroke {
        tool: Tool,
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
    },
    ClearOverlay,
    OpenTextEntry { x: f32, y: f32 },
    CloseTextEntry,
    AppendText { text: String, x: f32, y: f32 },
    SelectText(Option<usize>),
    MoveText { index: usize, x: f32, y: f32 },
    ResizeText { index: usize, font_size: f32 },
    RemoveText(usize),
    SelectTool(Tool),
}

/// Read-only view of the session needed to decide a transition
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    pub tool: Tool,
    pub texts: &'a [TextObject],
    pub selected_text: Option<usize>,
    pub last_pointer: Option<(f32, f32)>,
}

pub fn transition(
    state: &Interaction,
    event: &InputEvent,
    ctx: &Context<'_>,
) -> (Interaction, Vec<Effect>) {
    use Interaction as S;

    match (state, event) {
        (_, InputEvent::Escape) => {
            let mut effects = Vec::new();
            match state {
                S::Drawing { .. } => effects.push(Effect::ClearOverlay),
                S::TextEditing { .. } => effects.push(Effect::CloseTextEntry),
                _ => {}
            }
            effects.push(Effect::SelectTool(Tool::Select));
            (S::Idle, effects)
        }

        (S::Idle, InputEvent::PointerDown { x, y }) => pointer_down(*x, *y, ctx),

        (S::TextEditing { x, y, text }, InputEvent::PointerDown { .. })
        | (S::TextEditing { x, y, text }, InputEvent::TextConfirm) => {
            (S::Idle, finish_text_entry(text, *x, *y))
        }
        (S::TextEditing { .. }, InputEvent::TextCancel) => (S::Idle, vec![Effect::CloseTextEntry]),
        (S::TextEditing { x, y, .. }, InputEvent::TextInput(text)) => (
            S::TextEditing {
                x: *x,
                y: *y,
                text: text.clone(),
            },
            Vec::new(),
        ),

        (
            S::Drawing {
                tool,
                start_x,
                start_y,
            },
            InputEvent::PointerMove { x, y },
        ) => (
            state.clone(),
            vec![Effect::PreviewStroke {
                tool: *tool,
                start_x: *start_x,
                start_y: *start_y,
                end_x: *x,
                end_y: *y,
            }],
        ),
        (
            S::Drawing {
                tool,
                start_x,
                start_y,
            },
            InputEvent::PointerUp { x, y },
        ) => (
            S::Idle,
            vec![
                Effect::CommitStroke {
                    tool: *tool,
                    start_x: *start_x,
                    start_y: *start_y,
                    end_x: *x,
                    end_y: *y,
                },
                Effect::ClearOverlay,
            ],
        ),

        (
            S::DraggingText {
                index,
                offset_x,
                offset_y,
            },
            InputEvent::PointerMove { x, y },
        ) => (
            state.clone(),
            vec![Effect::MoveText {
                index: *index,
                x: x - offset_x,
                y: y - offset_y,
            }],
        ),
        (
            S::ResizingText {
                index,
                start_y,
                start_font_size,
                start_height,
            },
            InputEvent::PointerMove { y, .. },
        ) => {
            let scale = (start_height + (y - start_y)) / start_height.max(1.0);
            (
                state.clone(),
                vec![Effect::ResizeText {
                    index: *index,
                    font_size: clamp_font_size(start_font_size * scale),
                }],
            )
        }
        (S::DraggingText { .. } | S::ResizingText { .. }, InputEvent::PointerUp { .. }) => {
            (S::Idle, Vec::new())
        }

        (S::Idle, InputEvent::Delete) => match ctx.selected_text {
            Some(index) if index < ctx.texts.len() => (S::Idle, vec![Effect::RemoveText(index)]),
            _ => (S::Idle, Vec::new()),
        },
        (S::Idle, InputEvent::QuickText(text)) => {
            if !is_meaningful_text(text) {
                return (S::Idle, Vec::new());
            }
            let (x, y) = ctx
                .last_pointer
                .unwrap_or((QUICK_TEXT_OFFSET, QUICK_TEXT_OFFSET));
            (
                S::Idle,
                vec![Effect::AppendText {
                    text: text.clone(),
                    x,
                    y,
                }],
            )
        }

        _ => (state.clone(), Vec::new()),
    }
}

fn pointer_down(x: f32, y: f32, ctx: &Context<'_>) -> (Interaction, Vec<Effect>) {
    match hit_test_texts(ctx.texts, x, y) {
        Some(TextHit::ResizeHandle(index)) => {
            let text = &ctx.texts[index];
            let (_, height) = text.size();
            return (
                Interaction::ResizingText {
                    index,
                    start_y: y,
                    start_font_size: text.font_size,
                    start_height: height,
                },
                vec![Effect::SelectText(Some(index))],
            );
        }
        Some(TextHit::Body(index)) => {
            let text = &ctx.texts[index];
            return (
                Interaction::DraggingText {
                    index,
                    offset_x: x - text.x,
                    offset_y: y - text.y,
                },
                vec![Effect::SelectText(Some(index))],
            );
        }
        None => {}
    }

    match ctx.tool {
        Tool::Select => (Interaction::Idle, vec![Effect::SelectText(None)]),
        Tool::Text => (
            Interaction::TextEditing {
                x,
                y,
                text: String::new(),
            },
            vec![Effect::SelectText(None), Effect::OpenTextEntry { x, y }],
        ),
        tool => {
            let mut effects = Vec::new();
            if !ctx.texts.is_empty() {
                effects.push(Effect::CommitAllText);
            }
            (
                Interaction::Drawing {
                    tool,
                    start_x: x,
                    start_y: y,
                },
                effects,
            )
        }
    }
}

fn finish_text_entry(text: &str, x: f32, y: f32) -> Vec<Effect> {
    let mut effects = Vec::new();
    if is_meaningful_text(text) {
        effects.push(Effect::AppendText {
            text: text.trim().to_string(),
            x,
            y,
        });
    }
    effects.push(Effect::CloseTextEntry);
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeColor;

    fn ctx(tool: Tool, texts: &[TextObject]) -> Context<'_> {
        Context {
            tool,
            texts,
            selected_text: None,
            last_pointer: None,
        }
    }

    fn text_at(x: f32, y: f32) -> TextObject {
        TextObject {
            text: "abc".to_string(),
            x,
            y,
            font_size: 20.0,
            color: ShapeColor::default(),
        }
    }

    fn editing(text: &str) -> Interaction {
        Interaction::TextEditing {
            x: 5.0,
            y: 6.0,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_stroke_gesture() {
        let c = ctx(Tool::Arrow, &[]);
        let (s, effects) = transition(&Interaction::Idle, &InputEvent::PointerDown { x: 1.0, y: 2.0 }, &c);
        assert!(effects.is_empty());
        assert!(matches!(s, Interaction::Drawing { tool: Tool::Arrow, .. }));

        let (s, effects) = transition(&s, &InputEvent::PointerMove { x: 3.0, y: 4.0 }, &c);
        assert!(matches!(effects[..], [Effect::PreviewStroke { end_x: 3.0, end_y: 4.0, .. }]));

        let (s, effects) = transition(&s, &InputEvent::PointerUp { x: 5.0, y: 6.0 }, &c);
        assert_eq!(s, Interaction::Idle);
        assert_eq!(
            effects,
            vec![
                Effect::CommitStroke {
                    tool: Tool::Arrow,
                    start_x: 1.0,
                    start_y: 2.0,
                    end_x: 5.0,
                    end_y: 6.0,
                },
                Effect::ClearOverlay,
            ]
        );
    }

    #[test]
    fn test_stroke_tool_commits_floating_text_first() {
        let texts = [text_at(100.0, 100.0)];
        let (_, effects) = transition(
            &Interaction::Idle,
            &InputEvent::PointerDown { x: 0.0, y: 0.0 },
            &ctx(Tool::Rect, &texts),
        );
        assert_eq!(effects, vec![Effect::CommitAllText]);
    }

    #[test]
    fn test_text_entry_confirm_and_placeholder() {
        let c = ctx(Tool::Text, &[]);
        let (s, effects) = transition(&Interaction::Idle, &InputEvent::PointerDown { x: 5.0, y: 6.0 }, &c);
        assert_eq!(s, editing(""));
        assert!(effects.contains(&Effect::OpenTextEntry { x: 5.0, y: 6.0 }));

        let (s, _) = transition(&s, &InputEvent::TextInput("hello".into()), &c);
        let (s, effects) = transition(&s, &InputEvent::TextConfirm, &c);
        assert_eq!(s, Interaction::Idle);
        assert_eq!(
            effects,
            vec![
                Effect::AppendText {
                    text: "hello".into(),
                    x: 5.0,
                    y: 6.0
                },
                Effect::CloseTextEntry,
            ]
        );

        for discarded in ["", "   ", TEXT_PLACEHOLDER] {
            let (_, effects) = transition(&editing(discarded), &InputEvent::TextConfirm, &c);
            assert_eq!(effects, vec![Effect::CloseTextEntry], "{discarded:?}");
        }
    }

    #[test]
    fn test_click_outside_entry_confirms() {
        let c = ctx(Tool::Text, &[]);
        let (s, effects) = transition(&editing("note"), &InputEvent::PointerDown { x: 90.0, y: 90.0 }, &c);
        assert_eq!(s, Interaction::Idle);
        assert!(matches!(effects[0], Effect::AppendText { .. }));

        let (_, effects) = transition(&editing(""), &InputEvent::PointerDown { x: 90.0, y: 90.0 }, &c);
        assert_eq!(effects, vec![Effect::CloseTextEntry]);
    }

    #[test]
    fn test_confirmed_text_is_trimmed() {
        let c = ctx(Tool::Text, &[]);
        let (_, effects) = transition(&editing("  note\n"), &InputEvent::TextConfirm, &c);
        assert!(matches!(
            &effects[0],
            Effect::AppendText { text, .. } if text == "note"
        ));
    }

    #[test]
    fn test_escape_from_every_state() {
        let c = ctx(Tool::Blur, &[]);
        let states = [
            Interaction::Idle,
            Interaction::Drawing {
                tool: Tool::Blur,
                start_x: 0.0,
                start_y: 0.0,
            },
            Interaction::DraggingText {
                index: 0,
                offset_x: 0.0,
                offset_y: 0.0,
            },
            editing("draft"),
        ];
        for state in states {
            let (s, effects) = transition(&state, &InputEvent::Escape, &c);
            assert_eq!(s, Interaction::Idle);
            assert_eq!(effects.last(), Some(&Effect::SelectTool(Tool::Select)));
            assert!(!effects.iter().any(|e| matches!(e, Effect::AppendText { .. })));
        }
    }

    #[test]
    fn test_drag_text_keeps_grab_offset() {
        let texts = [text_at(10.0, 10.0)];
        let c = ctx(Tool::Arrow, &texts);
        let (s, effects) = transition(&Interaction::Idle, &InputEvent::PointerDown { x: 15.0, y: 12.0 }, &c);
        assert_eq!(effects, vec![Effect::SelectText(Some(0))]);

        let (s, effects) = transition(&s, &InputEvent::PointerMove { x: 55.0, y: 62.0 }, &c);
        assert_eq!(
            effects,
            vec![Effect::MoveText {
                index: 0,
                x: 50.0,
                y: 60.0
            }]
        );
        let (s, effects) = transition(&s, &InputEvent::PointerUp { x: 55.0, y: 62.0 }, &c);
        assert_eq!(s, Interaction::Idle);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_resize_text_clamps() {
        // "abc" at 20px: 60x20 box, handle centred on (70, 30)
        let texts = [text_at(10.0, 10.0)];
        let c = ctx(Tool::Select, &texts);
        let (s, _) = transition(&Interaction::Idle, &InputEvent::PointerDown { x: 70.0, y: 30.0 }, &c);
        assert!(matches!(s, Interaction::ResizingText { index: 0, .. }));

        let (_, effects) = transition(&s, &InputEvent::PointerMove { x: 70.0, y: 50.0 }, &c);
        assert_eq!(
            effects,
            vec![Effect::ResizeText {
                index: 0,
                font_size: 40.0
            }]
        );
        let (_, effects) = transition(&s, &InputEvent::PointerMove { x: 70.0, y: 500.0 }, &c);
        assert_eq!(
            effects,
            vec![Effect::ResizeText {
                index: 0,
                font_size: 72.0
            }]
        );
        let (_, effects) = transition(&s, &InputEvent::PointerMove { x: 70.0, y: -500.0 }, &c);
        assert_eq!(
            effects,
            vec![Effect::ResizeText {
                index: 0,
                font_size: 12.0
            }]
        );
    }

    #[test]
    fn test_select_tool_click_on_empty_clears_selection() {
        let (s, effects) = transition(
            &Interaction::Idle,
            &InputEvent::PointerDown { x: 1.0, y: 1.0 },
            &ctx(Tool::Select, &[]),
        );
        assert_eq!(s, Interaction::Idle);
        assert_eq!(effects, vec![Effect::SelectText(None)]);
    }

    #[test]
    fn test_delete_and_quick_text() {
        let texts = [text_at(0.0, 0.0)];
        let mut c = ctx(Tool::Select, &texts);
        let (_, effects) = transition(&Interaction::Idle, &InputEvent::Delete, &c);
        assert!(effects.is_empty());

        c.selected_text = Some(0);
        let (_, effects) = transition(&Interaction::Idle, &InputEvent::Delete, &c);
        assert_eq!(effects, vec![Effect::RemoveText(0)]);

        let (_, effects) = transition(&Interaction::Idle, &InputEvent::QuickText("hi".into()), &c);
        assert_eq!(
            effects,
            vec![Effect::AppendText {
                text: "hi".into(),
                x: 20.0,
                y: 20.0
            }]
        );
        c.last_pointer = Some((7.0, 8.0));
        let (_, effects) = transition(&Interaction::Idle, &InputEvent::QuickText("hi".into()), &c);
        assert!(matches!(effects[..], [Effect::AppendText { x: 7.0, y: 8.0, .. }]));
    }
}
