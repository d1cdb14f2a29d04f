use std::path::Path;

use uuid::Uuid;

use crate::canvas::{Color, PixelBuffer};
use crate::components::history::HistoryStack;
use crate::components::tools::{Tool, ToolProperties, clamp_brush_size};
use crate::ops::fill::flood_fill;
use crate::ops::shapes::{Paint, stroke_circle, stroke_rect, stroke_segment};
use crate::settings::SurfaceSettings;
use crate::{log_info, log_warn};

/// Drag in progress between `pointer_down` and `pointer_up`.
#[derive(Clone, Debug)]
struct StrokeState {
    tool: Tool,
    color: Color,
    size: f32,
    start: (f32, f32),
    last: (f32, f32),
    /// Buffer as it was before the drag; shape previews redraw from it.
    snapshot: PixelBuffer,
}

/// One drawing surface: its raster, its history and its tool state.
///
/// Every operation runs synchronously; callers serialize input events.
pub struct DrawingSurface {
    id: Uuid,
    buffer: PixelBuffer,
    history: HistoryStack,
    properties: ToolProperties,
    stroke: Option<StrokeState>,
}

impl DrawingSurface {
    /// A cleared surface with default settings and the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_settings(&SurfaceSettings {
            canvas_width: width,
            canvas_height: height,
            ..SurfaceSettings::default()
        })
    }

    /// A cleared surface whose blank state is the first history entry.
    pub fn with_settings(settings: &SurfaceSettings) -> Self {
        let buffer = PixelBuffer::new(settings.canvas_width, settings.canvas_height);
        let mut history = HistoryStack::new(settings.max_undo_steps);
        history.commit_labeled("Blank canvas", &buffer);

        let surface = Self {
            id: Uuid::new_v4(),
            buffer,
            history,
            properties: ToolProperties {
                tool: Tool::default(),
                color: settings.color,
                size: clamp_brush_size(settings.brush_size),
            },
            stroke: None,
        };
        log_info!(
            "Surface {} created ({}×{}, {} undo steps)",
            surface.id,
            surface.buffer.width(),
            surface.buffer.height(),
            surface.history.capacity()
        );
        surface
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn properties(&self) -> &ToolProperties {
        &self.properties
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    // ---- tool inputs --------------------------------------------------------

    /// Switch tools. An unfinished drag keeps the tool it started with.
    pub fn set_tool(&mut self, tool: Tool) {
        self.properties.tool = tool;
    }

    pub fn set_color(&mut self, color: Color) {
        self.properties.color = color;
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.properties.size = clamp_brush_size(size);
    }

    // ---- pointer input ------------------------------------------------------

    /// Press at canvas coordinates (x, y).
    ///
    /// The fill tool floods immediately and commits, even when the fill
    /// changed nothing. Drag tools start a stroke.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.properties.tool.is_click() {
            let (px, py) = self.clamp_to_pixel(x, y);
            let result = flood_fill(&mut self.buffer, px, py, self.properties.color);
            log_info!(
                "Fill at ({}, {}) with {}: {} pixels",
                px,
                py,
                self.properties.color,
                result.pixels
            );
            self.history.commit_labeled(Tool::Fill.label(), &self.buffer);
            return;
        }

        self.stroke = Some(StrokeState {
            tool: self.properties.tool,
            color: self.properties.color,
            size: self.properties.size,
            start: (x, y),
            last: (x, y),
            snapshot: self.buffer.clone(),
        });
    }

    /// Drag to (x, y). Ignored when no stroke is active.
    ///
    /// Color and size stay as they were at `pointer_down`.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        let color = Paint::Color(stroke.color);
        let size = stroke.size;
        let pos = (x, y);

        if stroke.tool.is_shape() {
            self.buffer.clone_from(&stroke.snapshot);
        }
        match stroke.tool {
            Tool::Brush => stroke_segment(&mut self.buffer, stroke.last, pos, size, color),
            Tool::Eraser => stroke_segment(&mut self.buffer, stroke.last, pos, size, Paint::Erase),
            Tool::Line => stroke_segment(&mut self.buffer, stroke.start, pos, size, color),
            Tool::Rectangle => stroke_rect(&mut self.buffer, stroke.start, pos, size, color),
            Tool::Circle => {
                let dx = x - stroke.start.0;
                let dy = y - stroke.start.1;
                let radius = (dx * dx + dy * dy).sqrt();
                stroke_circle(&mut self.buffer, stroke.start, radius, size, color);
            }
            Tool::Fill => {}
        }
        stroke.last = pos;
    }

    /// Release. Commits the finished stroke; returns whether a commit happened.
    pub fn pointer_up(&mut self) -> bool {
        match self.stroke.take() {
            Some(stroke) => {
                self.history.commit_labeled(stroke.tool.label(), &self.buffer);
                true
            }
            None => false,
        }
    }

    // ---- whole-canvas actions -----------------------------------------------

    pub fn clear(&mut self) {
        self.stroke = None;
        self.buffer.clear();
        self.history.commit_labeled("Clear", &self.buffer);
        log_info!("Surface {} cleared", self.id);
    }

    /// Replace the raster with a cleared one of the new size. History is kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.stroke = None;
        self.buffer = PixelBuffer::new(width, height);
        self.history.commit_labeled("Resize", &self.buffer);
        log_info!(
            "Surface {} resized to {}×{}",
            self.id,
            self.buffer.width(),
            self.buffer.height()
        );
    }

    /// Restore the previous state. Returns `false` at the history floor.
    ///
    /// A drag in progress is rolled back first, so the buffer always ends up
    /// on a committed state.
    pub fn undo(&mut self) -> bool {
        self.cancel_stroke();
        match self.history.undo() {
            Some(entry) => {
                entry.restore_into(&mut self.buffer);
                true
            }
            None => {
                log_info!("Undo ignored: nothing before the first state");
                false
            }
        }
    }

    /// Re-apply the most recently undone state. Returns `false` if none.
    pub fn redo(&mut self) -> bool {
        self.cancel_stroke();
        match self.history.redo() {
            Some(entry) => {
                entry.restore_into(&mut self.buffer);
                true
            }
            None => {
                log_info!("Redo ignored: nothing to redo");
                false
            }
        }
    }

    pub fn export_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.buffer.save_png(path).inspect_err(|e| {
            log_warn!("Export to {} failed: {}", path.display(), e);
        })
    }

    /// Drop an unfinished drag and put back the pixels it started from.
    fn cancel_stroke(&mut self) {
        if let Some(stroke) = self.stroke.take() {
            self.buffer = stroke.snapshot;
        }
    }

    /// Floor pointer coordinates to a pixel and clamp them into the buffer.
    fn clamp_to_pixel(&self, x: f32, y: f32) -> (u32, u32) {
        let (w, h) = self.buffer.dimensions();
        let clamp = |v: f32, max: u32| -> u32 {
            if v.is_nan() || v < 0.0 {
                0
            } else {
                (v.floor() as u32).min(max - 1)
            }
        };
        (clamp(x, w), clamp(y, h))
    }
}
