/// RGB color carried on every draw command. Channel values are clamped to
/// 0..=255 when pushed by the script's `color(r, g, b)` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// The color drawing starts with, and the color the stack is reseeded
    /// with whenever `popColor()` empties it.
    pub const BASE: Color = Color { r: 0, g: 0, b: 0 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Semantic shape in canvas pixel space (origin top-left, y-down).
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { x: f64, y: f64, radius: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
}

/// One shape-draw call, fully resolved: the color is whatever sat on top of
/// the color stack at emission time. The buffer of these is rebuilt from
/// scratch every frame and handed to the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub shape: Shape,
    pub color: Color,
}
