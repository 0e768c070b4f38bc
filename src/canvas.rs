use crate::types::{Color, Point, Pt, Rect, Size};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SaveState,
    RestoreState,
    Translate(Pt, Pt),
    // Non-rendered metadata used for layout reporting. Ignored by the PDF writer.
    Meta {
        key: String,
        value: String,
    },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetDash {
        pattern: Vec<Pt>,
        phase: Pt,
    },
    SetFontSize(Pt),
    MoveTo {
        x: Pt,
        y: Pt,
    },
    LineTo {
        x: Pt,
        y: Pt,
    },
    CurveTo {
        x1: Pt,
        y1: Pt,
        x2: Pt,
        y2: Pt,
        x: Pt,
        y: Pt,
    },
    ClosePath,
    Fill,
    Stroke,
    // `y` is the top of the glyph box.
    DrawString {
        x: Pt,
        y: Pt,
        text: String,
    },
    DrawRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::DrawString { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn meta_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.commands.iter().filter_map(move |cmd| match cmd {
            Command::Meta { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
}

/// Stroke style. Widths and dash lengths are in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub width: f32,
    pub color: Color,
    pub dash: Option<f32>,
}

impl Pen {
    pub const fn solid(width: f32, color: Color) -> Self {
        Self {
            width,
            color,
            dash: None,
        }
    }

    pub const fn dashed(width: f32, color: Color, dash: f32) -> Self {
        Self {
            width,
            color,
            dash: Some(dash),
        }
    }
}

/// The drawing operations the stencil renderers need. Coordinates grow to
/// the right and downwards from the current origin.
pub trait Surface {
    fn page_size(&self) -> Size;
    fn save_state(&mut self);
    fn restore_state(&mut self);
    fn translate(&mut self, x: Pt, y: Pt);
    fn set_pen(&mut self, pen: &Pen);
    fn set_fill_color(&mut self, color: Color);
    fn set_font_size(&mut self, size: Pt);
    fn line(&mut self, from: Point, to: Point);
    fn stroke_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect);
    fn stroke_rounded_rect(&mut self, rect: Rect, radius: Pt);
    /// Draws `text` with its glyph box's top-left corner at `(x, y)` using
    /// the current font size and fill colour.
    fn draw_string(&mut self, x: Pt, y: Pt, text: &str);
    fn measure_text(&self, text: &str, font_size: Pt) -> Size;
    fn show_page(&mut self);

    fn meta(&mut self, _key: &str, _value: &str) {}
}

/// Style currently in effect on the recorded page, used to drop redundant
/// state changes.
#[derive(Debug, Clone, PartialEq)]
struct Style {
    fill: Color,
    stroke: Color,
    line_width: Pt,
    dash: Option<Pt>,
    font_size: Pt,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: Pt::from_f32(1.0),
            dash: None,
            font_size: Pt::from_f32(12.0),
        }
    }
}

/// Stores `value` in `slot` and reports whether it differed.
fn update<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Records drawing commands page by page.
pub struct Canvas {
    page_size: Size,
    finished: Vec<Page>,
    page: Page,
    style: Style,
    saved: Vec<Style>,
}

// Bezier control distance for a quarter circle, as a ratio of the radius.
const KAPPA_NUM: i32 = 5523;
const KAPPA_DEN: i32 = 10000;

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            finished: Vec::new(),
            page: Page::new(),
            style: Style::default(),
            saved: Vec::new(),
        }
    }

    fn push(&mut self, cmd: Command) {
        self.page.commands.push(cmd);
    }

    pub fn move_to(&mut self, x: Pt, y: Pt) {
        self.push(Command::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: Pt, y: Pt) {
        self.push(Command::LineTo { x, y });
    }

    pub fn curve_to(&mut self, c1: Point, c2: Point, to: Point) {
        self.push(Command::CurveTo {
            x1: c1.x,
            y1: c1.y,
            x2: c2.x,
            y2: c2.y,
            x: to.x,
            y: to.y,
        });
    }

    pub fn close_path(&mut self) {
        self.push(Command::ClosePath);
    }

    pub fn fill(&mut self) {
        self.push(Command::Fill);
    }

    pub fn stroke(&mut self) {
        self.push(Command::Stroke);
    }

    pub fn draw_rect(&mut self, rect: Rect) {
        self.push(Command::DrawRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        });
    }

    /// Commands recorded on the page that is still open.
    pub fn open_page_len(&self) -> usize {
        self.page.commands.len()
    }

    /// Closes the open page if anything was drawn on it. An untouched canvas
    /// still yields one blank page.
    pub fn finish(mut self) -> Document {
        if self.finished.is_empty() || !self.page.commands.is_empty() {
            self.show_page();
        }
        Document {
            page_size: self.page_size,
            pages: self.finished,
        }
    }
}

impl Surface for Canvas {
    fn page_size(&self) -> Size {
        self.page_size
    }

    fn save_state(&mut self) {
        self.saved.push(self.style.clone());
        self.push(Command::SaveState);
    }

    fn restore_state(&mut self) {
        let Some(style) = self.saved.pop() else {
            return;
        };
        self.style = style;
        self.push(Command::RestoreState);
    }

    fn translate(&mut self, x: Pt, y: Pt) {
        if x != Pt::ZERO || y != Pt::ZERO {
            self.push(Command::Translate(x, y));
        }
    }

    fn set_pen(&mut self, pen: &Pen) {
        if update(&mut self.style.stroke, pen.color) {
            self.push(Command::SetStrokeColor(pen.color));
        }
        let width = Pt::from_f32(pen.width).max(Pt::ZERO);
        if update(&mut self.style.line_width, width) {
            self.push(Command::SetLineWidth(width));
        }
        let dash = pen.dash.map(Pt::from_f32);
        if update(&mut self.style.dash, dash) {
            self.push(Command::SetDash {
                pattern: dash.map(|on| vec![on, on]).unwrap_or_default(),
                phase: Pt::ZERO,
            });
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        if update(&mut self.style.fill, color) {
            self.push(Command::SetFillColor(color));
        }
    }

    fn set_font_size(&mut self, size: Pt) {
        if update(&mut self.style.font_size, size) {
            self.push(Command::SetFontSize(size));
        }
    }

    fn line(&mut self, from: Point, to: Point) {
        self.move_to(from.x, from.y);
        self.line_to(to.x, to.y);
        self.stroke();
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.draw_rect(rect);
        self.stroke();
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.draw_rect(rect);
        self.fill();
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: Pt) {
        let r = radius.min(rect.width / 2).min(rect.height / 2);
        if r <= Pt::ZERO {
            self.stroke_rect(rect);
            return;
        }
        let k = r.mul_ratio(KAPPA_NUM, KAPPA_DEN);
        let (l, t, rt, b) = (rect.x, rect.y, rect.right(), rect.bottom());
        let p = Point::new;

        // clockwise from the top edge, one quarter arc per corner
        self.move_to(l + r, t);
        self.line_to(rt - r, t);
        self.curve_to(p(rt - r + k, t), p(rt, t + r - k), p(rt, t + r));
        self.line_to(rt, b - r);
        self.curve_to(p(rt, b - r + k), p(rt - r + k, b), p(rt - r, b));
        self.line_to(l + r, b);
        self.curve_to(p(l + r - k, b), p(l, b - r + k), p(l, b - r));
        self.line_to(l, t + r);
        self.curve_to(p(l, t + r - k), p(l + r - k, t), p(l + r, t));
        self.close_path();
        self.stroke();
    }

    fn draw_string(&mut self, x: Pt, y: Pt, text: &str) {
        self.push(Command::DrawString {
            x,
            y,
            text: text.to_owned(),
        });
    }

    /// Base-14 Helvetica estimate: 0.6 em per glyph, 1.2 em line height.
    fn measure_text(&self, text: &str, font_size: Pt) -> Size {
        let glyphs = text.chars().count() as i32;
        Size::new(
            (font_size * glyphs).mul_ratio(3, 5),
            font_size.mul_ratio(6, 5),
        )
    }

    fn show_page(&mut self) {
        let page = std::mem::replace(&mut self.page, Page::new());
        self.finished.push(page);
        self.saved.clear();
        self.style = Style::default();
    }

    fn meta(&mut self, key: &str, value: &str) {
        self.push(Command::Meta {
            key: key.to_owned(),
            value: value.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_style_changes_are_elided() {
        let mut canvas = Canvas::new(Size::a4());
        let pen = Pen::solid(0.5, Color::BLACK);
        canvas.set_pen(&pen);
        let after_first = canvas.open_page_len();
        canvas.set_pen(&pen);
        canvas.set_fill_color(Color::BLACK);
        assert_eq!(canvas.open_page_len(), after_first);
    }

    #[test]
    fn restore_brings_back_previous_style() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_font_size(Pt::from_f32(8.0));
        canvas.save_state();
        canvas.set_font_size(Pt::from_f32(10.0));
        canvas.restore_state();
        let before = canvas.open_page_len();
        canvas.set_font_size(Pt::from_f32(8.0));
        assert_eq!(canvas.open_page_len(), before);
    }

    #[test]
    fn rounded_rect_degrades_to_plain_rect() {
        let mut canvas = Canvas::new(Size::a4());
        let rect = Rect::new(Pt::ZERO, Pt::ZERO, Pt::from_f32(40.0), Pt::from_f32(20.0));
        canvas.stroke_rounded_rect(rect, Pt::ZERO);
        let doc = canvas.finish();
        assert_eq!(
            doc.pages[0].commands,
            vec![
                Command::DrawRect {
                    x: Pt::ZERO,
                    y: Pt::ZERO,
                    width: Pt::from_f32(40.0),
                    height: Pt::from_f32(20.0),
                },
                Command::Stroke,
            ]
        );
    }

    #[test]
    fn rounded_rect_has_four_corners() {
        let mut canvas = Canvas::new(Size::a4());
        let rect = Rect::new(Pt::ZERO, Pt::ZERO, Pt::from_f32(40.0), Pt::from_f32(20.0));
        canvas.stroke_rounded_rect(rect, Pt::from_f32(4.0));
        let doc = canvas.finish();
        let curves = doc.pages[0]
            .commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::CurveTo { .. }))
            .count();
        assert_eq!(curves, 4);
    }

    #[test]
    fn finish_always_yields_a_page() {
        let doc = Canvas::new(Size::a4()).finish();
        assert_eq!(doc.pages.len(), 1);

        let mut canvas = Canvas::new(Size::a4());
        canvas.draw_string(Pt::ZERO, Pt::ZERO, "one");
        canvas.show_page();
        canvas.draw_string(Pt::ZERO, Pt::ZERO, "two");
        let doc = canvas.finish();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[1].texts().collect::<Vec<_>>(), vec!["two"]);
    }

    #[test]
    fn text_measurement_scales_with_length() {
        let canvas = Canvas::new(Size::a4());
        let size = canvas.measure_text("abcd", Pt::from_f32(10.0));
        assert_eq!(size.width, Pt::from_f32(24.0));
        assert_eq!(size.height, Pt::from_f32(12.0));
    }
}
