//! Editor session: tool state, zoom, surface and history in one place
//!
//! Messages are turned into [`InputEvent`]s in buffer coordinates, run
//! through [`transition`], and the resulting effects are applied here. Only
//! committed strokes, flattened text and exports take history snapshots.

use image::RgbaImage;

use crate::config::{ScrollShotConfig, ShapeColor};
use crate::domain::{Stroke, TextObject, Tool, clamp_font_size};

use super::history::HistoryStack;
use super::input::{Context, Effect, InputEvent, Interaction, transition};
use super::messages::Msg;
use super::shortcuts;
use super::surface::{EditingSurface, FilterSettings};

pub const ZOOM_STEP: f32 = 1.2;
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;
/// Margin kept around the image when fitting it into a container
pub const FIT_PADDING: f32 = 40.0;

/// Zoom that fits a `width` x `height` image inside a container, never enlarging
pub fn fit_zoom(container_width: f32, container_height: f32, width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    let zoom_x = (container_width - FIT_PADDING) / width as f32;
    let zoom_y = (container_height - FIT_PADDING) / height as f32;
    zoom_x.min(zoom_y).clamp(MIN_ZOOM, 1.0)
}

/// Current tool and drawing style
#[derive(Clone, Debug, PartialEq)]
pub struct ToolStyle {
    pub tool: Tool,
    pub color: ShapeColor,
    pub stroke_width: f32,
    pub font_size: f32,
    pub fill_shape: bool,
    pub zoom: f32,
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self::from_config(&ScrollShotConfig::default())
    }
}

impl ToolStyle {
    pub fn from_config(config: &ScrollShotConfig) -> Self {
        Self {
            tool: Tool::Select,
            color: config.color,
            stroke_width: config.stroke_width,
            font_size: clamp_font_size(config.font_size),
            fill_shape: config.fill_shape,
            zoom: 1.0,
        }
    }
}

/// Work the session cannot do itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    Download,
    CopyToClipboard,
}

#[derive(Debug)]
pub struct EditorSession {
    pub style: ToolStyle,
    filters: FilterSettings,
    surface: EditingSurface,
    history: HistoryStack,
    interaction: Interaction,
    /// Last pointer position in buffer coordinates
    last_pointer: Option<(f32, f32)>,
}

impl EditorSession {
    /// Start editing `image`, recording it as the first history entry
    pub fn new(image: RgbaImage, config: &ScrollShotConfig) -> anyhow::Result<Self> {
        let mut session = Self {
            style: ToolStyle::from_config(config),
            filters: FilterSettings {
                block_size: config.pixelation_block_size,
                blur_radius: config.blur_radius,
            },
            surface: EditingSurface::new(image),
            history: HistoryStack::new(config.history_depth),
            interaction: Interaction::Idle,
            last_pointer: None,
        };
        session.history.save(session.surface.persistent())?;
        log::info!(
            "Editor opened {}x{} image",
            session.surface.width(),
            session.surface.height()
        );
        Ok(session)
    }

    pub fn surface(&self) -> &EditingSurface {
        &self.surface
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn is_editing_text(&self) -> bool {
        matches!(self.interaction, Interaction::TextEditing { .. })
    }

    /// Convert view coordinates to persistent-buffer coordinates
    pub fn to_buffer(&self, x: f32, y: f32) -> (f32, f32) {
        (x / self.style.zoom, y / self.style.zoom)
    }

    pub fn update(&mut self, msg: Msg) -> anyhow::Result<Option<Request>> {
        match msg {
            Msg::PointerDown { x, y } => {
                let (x, y) = self.pointer(x, y);
                self.handle_input(InputEvent::PointerDown { x, y })?;
            }
            Msg::PointerMove { x, y } => {
                let (x, y) = self.pointer(x, y);
                self.handle_input(InputEvent::PointerMove { x, y })?;
            }
            Msg::PointerUp { x, y } => {
                let (x, y) = self.pointer(x, y);
                self.handle_input(InputEvent::PointerUp { x, y })?;
            }
            Msg::Key { key, modifiers } => {
                if let Some(msg) = shortcuts::handle_key_event(key, modifiers, self.is_editing_text()) {
                    return self.update(msg);
                }
            }
            Msg::Escape => self.handle_input(InputEvent::Escape)?,
            Msg::Delete => self.handle_input(InputEvent::Delete)?,
            Msg::TextInput { text } => self.handle_input(InputEvent::TextInput(text))?,
            Msg::TextConfirm => self.handle_input(InputEvent::TextConfirm)?,
            Msg::TextCancel => self.handle_input(InputEvent::TextCancel)?,
            Msg::QuickText { text } => self.handle_input(InputEvent::QuickText(text))?,
            Msg::SelectTool { tool } => {
                log::debug!("Tool: {tool:?}");
                self.style.tool = tool;
            }
            Msg::SetColor { color } => self.style.color = color.parse()?,
            Msg::SetStrokeWidth { width } => self.style.stroke_width = width.max(1.0),
            Msg::SetFontSize { size } => self.style.font_size = clamp_font_size(size),
            Msg::SetFill { fill } => self.style.fill_shape = fill,
            Msg::ZoomIn => self.style.zoom = (self.style.zoom * ZOOM_STEP).min(MAX_ZOOM),
            Msg::ZoomOut => self.style.zoom = (self.style.zoom / ZOOM_STEP).max(MIN_ZOOM),
            Msg::ResetZoom => self.style.zoom = 1.0,
            Msg::ZoomToFit {
                container_width,
                container_height,
            } => {
                self.style.zoom = fit_zoom(
                    container_width,
                    container_height,
                    self.surface.width(),
                    self.surface.height(),
                );
            }
            Msg::Undo => {
                self.undo()?;
            }
            Msg::Redo => {
                self.redo()?;
            }
            Msg::Download => return Ok(Some(Request::Download)),
            Msg::Copy => return Ok(Some(Request::CopyToClipboard)),
        }
        Ok(None)
    }

    /// Run a buffer-space event through the interaction state machine
    pub fn handle_input(&mut self, event: InputEvent) -> anyhow::Result<()> {
        let ctx = Context {
            tool: self.style.tool,
            texts: self.surface.texts(),
            selected_text: self.surface.selected_text(),
            last_pointer: self.last_pointer,
        };
        let (next, effects) = transition(&self.interaction, &event, &ctx);
        self.interaction = next;
        for effect in effects {
            self.apply(effect)?;
        }
        Ok(())
    }

    pub fn undo(&mut self) -> anyhow::Result<bool> {
        let changed = self.history.undo(self.surface.persistent_mut())?;
        log::debug!("Undo: step {} of {}", self.history.step(), self.history.len());
        Ok(changed)
    }

    pub fn redo(&mut self) -> anyhow::Result<bool> {
        let changed = self.history.redo(self.surface.persistent_mut())?;
        log::debug!("Redo: step {} of {}", self.history.step(), self.history.len());
        Ok(changed)
    }

    /// Flatten floating text and snapshot, returning the pixels to export
    ///
    /// Pixels already matching the current history state are not saved again.
    pub fn prepare_export(&mut self) -> anyhow::Result<&RgbaImage> {
        self.surface.flatten_text();
        self.history.save_if_changed(self.surface.persistent())?;
        Ok(self.surface.persistent())
    }

    fn pointer(&mut self, x: f32, y: f32) -> (f32, f32) {
        let point = self.to_buffer(x, y);
        self.last_pointer = Some(point);
        point
    }

    fn stroke(&self, tool: Tool, start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> Stroke {
        Stroke {
            tool,
            start_x,
            start_y,
            end_x,
            end_y,
            color: self.style.color,
            width: self.style.stroke_width,
            fill: self.style.fill_shape,
        }
    }

    fn apply(&mut self, effect: Effect) -> anyhow::Result<()> {
        match effect {
            Effect::CommitAllText => {
                if self.surface.flatten_text() {
                    self.history.save(self.surface.persistent())?;
                }
            }
            Effect::PreviewStroke {
                tool,
                start_x,
                start_y,
                end_x,
                end_y,
            } => {
                let stroke = self.stroke(tool, start_x, start_y, end_x, end_y);
                self.surface.preview_stroke(&stroke);
            }
            Effect::CommitStroke {
                tool,
                start_x,
                start_y,
                end_x,
                end_y,
            } => {
                let stroke = self.stroke(tool, start_x, start_y, end_x, end_y);
                self.surface.commit_stroke(&stroke, self.filters);
                self.history.save(self.surface.persistent())?;
            }
            Effect::ClearOverlay => self.surface.clear_overlay(),
            Effect::OpenTextEntry { x, y } => log::debug!("Text entry opened at ({x}, {y})"),
            Effect::CloseTextEntry => log::debug!("Text entry closed"),
            Effect::AppendText { text, x, y } => {
                self.surface.add_text(TextObject {
                    text,
                    x,
                    y,
                    font_size: self.style.font_size,
                    color: self.style.color,
                });
            }
            Effect::SelectText(index) => self.surface.select_text(index),
            Effect::MoveText { index, x, y } => self.surface.move_text(index, x, y),
            Effect::ResizeText { index, font_size } => self.surface.resize_text(index, font_size),
            Effect::RemoveText(index) => {
                self.surface.remove_text(index);
            }
            Effect::SelectTool(tool) => self.style.tool = tool,
        }
        Ok(())
    }
}
