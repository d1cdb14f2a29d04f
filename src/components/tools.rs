use crate::canvas::Color;

/// Smallest and largest accepted brush size, in pixels.
pub const BRUSH_SIZE_RANGE: (f32, f32) = (1.0, 100.0);

pub const DEFAULT_BRUSH_SIZE: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    Line,
    Rectangle,
    Circle,
    Fill,
}

impl Tool {
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Brush,
            Tool::Eraser,
            Tool::Line,
            Tool::Rectangle,
            Tool::Circle,
            Tool::Fill,
        ]
    }

    /// Identifier used by toolbars and scripts.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Brush => "brush",
            Tool::Eraser => "eraser",
            Tool::Line => "line",
            Tool::Rectangle => "rect",
            Tool::Circle => "circle",
            Tool::Fill => "fill",
        }
    }

    /// Case-insensitive lookup; `rectangle` is accepted for `rect`.
    pub fn from_name(name: &str) -> Option<Tool> {
        match name.trim().to_ascii_lowercase().as_str() {
            "brush" => Some(Tool::Brush),
            "eraser" => Some(Tool::Eraser),
            "line" => Some(Tool::Line),
            "rect" | "rectangle" => Some(Tool::Rectangle),
            "circle" => Some(Tool::Circle),
            "fill" => Some(Tool::Fill),
            _ => None,
        }
    }

    /// Description recorded in the history when the tool's action completes.
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Fill => "Fill",
        }
    }

    /// Shape tools redraw from the pre-stroke snapshot on every move.
    pub fn is_shape(&self) -> bool {
        matches!(self, Tool::Line | Tool::Rectangle | Tool::Circle)
    }

    /// Tools that act once on press instead of tracking a drag.
    pub fn is_click(&self) -> bool {
        matches!(self, Tool::Fill)
    }
}

/// Current tool selection plus the color and size inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolProperties {
    pub tool: Tool,
    pub color: Color,
    pub size: f32,
}

impl Default for ToolProperties {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            color: Color::BLACK,
            size: DEFAULT_BRUSH_SIZE,
        }
    }
}

/// Clamp a brush size into [`BRUSH_SIZE_RANGE`]; NaN falls back to the default.
pub fn clamp_brush_size(size: f32) -> f32 {
    if size.is_nan() {
        return DEFAULT_BRUSH_SIZE;
    }
    size.clamp(BRUSH_SIZE_RANGE.0, BRUSH_SIZE_RANGE.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_every_tool() {
        for tool in Tool::all() {
            assert_eq!(Tool::from_name(tool.name()), Some(*tool));
        }
        assert_eq!(Tool::from_name(" Rectangle "), Some(Tool::Rectangle));
        assert_eq!(Tool::from_name("spray"), None);
    }

    #[test]
    fn only_line_rect_circle_are_shapes() {
        let shapes: Vec<_> = Tool::all().iter().filter(|t| t.is_shape()).collect();
        assert_eq!(shapes, vec![&Tool::Line, &Tool::Rectangle, &Tool::Circle]);
        assert!(Tool::Fill.is_click());
        assert!(!Tool::Brush.is_click());
    }

    #[test]
    fn brush_size_is_clamped() {
        assert_eq!(clamp_brush_size(0.0), 1.0);
        assert_eq!(clamp_brush_size(500.0), 100.0);
        assert_eq!(clamp_brush_size(12.5), 12.5);
        assert_eq!(clamp_brush_size(f32::NAN), DEFAULT_BRUSH_SIZE);
    }
}
