use crate::canvas::Surface;
use crate::types::{Pt, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Near,
    Center,
    Far,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextAlign {
    pub horizontal: Align,
    pub vertical: Align,
}

impl TextAlign {
    pub const CENTER: TextAlign = TextAlign::new(Align::Center, Align::Center);
    pub const TOP_CENTER: TextAlign = TextAlign::new(Align::Center, Align::Near);
    pub const BOTTOM_CENTER: TextAlign = TextAlign::new(Align::Center, Align::Far);
    pub const LEFT_CENTER: TextAlign = TextAlign::new(Align::Near, Align::Center);
    pub const RIGHT_CENTER: TextAlign = TextAlign::new(Align::Far, Align::Center);

    pub const fn new(horizontal: Align, vertical: Align) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

fn offset(align: Align, available: Pt, used: Pt) -> Pt {
    match align {
        Align::Near => Pt::ZERO,
        Align::Center => (available - used) / 2,
        Align::Far => available - used,
    }
}

/// Draws `text` aligned inside `rect` at `font_size`.
pub fn draw_text<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    rect: Rect,
    font_size: Pt,
    align: TextAlign,
) {
    let measured = surface.measure_text(text, font_size);
    let x = rect.x + offset(align.horizontal, rect.width, measured.width);
    let y = rect.y + offset(align.vertical, rect.height, measured.height);
    surface.set_font_size(font_size);
    surface.draw_string(x, y, text);
}

/// Largest font size from `range` (stepping by `step`) at which `sample`
/// still fits strictly inside `max`. Falls back to the range minimum when
/// even that does not fit.
pub fn fit_font_size<S: Surface + ?Sized>(
    surface: &S,
    sample: &str,
    range: (f32, f32),
    step: f32,
    max: Size,
) -> Pt {
    let (min_size, max_size) = (Pt::from_f32(range.0), Pt::from_f32(range.1));
    let step = Pt::from_f32(step).max(Pt::from_f32(0.1));
    let mut best = min_size;
    let mut size = min_size;
    while size <= max_size {
        let measured = surface.measure_text(sample, size);
        if measured.width >= max.width || measured.height >= max.height {
            break;
        }
        best = size;
        size += step;
    }
    best
}
