use crate::canvas::Surface;
use crate::card_plan::CardPlan;
use crate::config;
use crate::debug::DebugLogger;
use crate::error::LayoutError;
use crate::page_template::PageTemplate;
use crate::params::LayoutParameters;
use crate::placement::pack_text_boxes;
use crate::text::{TextAlign, draw_text, fit_font_size};
use crate::types::{Point, Pt, Rect, Size};

pub const READER_SECTION: &str = "reader";

fn mm(value: f32) -> Pt {
    Pt::from_mm(value)
}

/// Footprint of one answer box: a number cell followed by four letter cells.
pub fn text_box_size() -> Size {
    let (width, height) = config::READER_TEXTBOX_CELL_MM;
    Size::new(mm(width) * 5, mm(height))
}

fn title_size() -> Size {
    let (width, height) = config::READER_TEXTBOX_TITLE_MM;
    Size::from_mm(width, height)
}

/// The reader page: a cut-out template the card slides under, followed by
/// one block of numbered answer boxes per card.
pub struct ReaderStencil<'a> {
    params: &'a LayoutParameters,
    template: &'a PageTemplate,
    debug: Option<&'a DebugLogger>,
}

impl<'a> ReaderStencil<'a> {
    pub fn new(params: &'a LayoutParameters, template: &'a PageTemplate) -> Self {
        Self {
            params,
            template,
            debug: None,
        }
    }

    pub fn with_debug(mut self, debug: Option<&'a DebugLogger>) -> Self {
        self.debug = debug;
        self
    }

    /// Draws the reader and returns how many text-box blocks landed on each
    /// page.
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<Vec<usize>, LayoutError> {
        let plans = self.params.card_plans()?;
        let origin = self.template.content_origin();
        let printable = self.template.printable_area();
        let page_bottom = origin.y + printable.height;

        self.open_page(surface, 1);
        let mut blocks_per_page = vec![0usize];

        let offset = mm(config::READER_OFFSET_TOP_MM).max(template_head_height(self.params));
        let reader_origin = Point::new(origin.x, origin.y + offset);
        surface.save_state();
        surface.translate(reader_origin.x, reader_origin.y);
        draw_reader_template(surface, self.params);
        surface.restore_state();

        let overflow = mm(config::READER_CUTLINE_OVERFLOW_MM);
        let mut cursor = reader_origin.y
            + mm(config::READER_TEXTBOXES_GAP_MM)
            + self.params.card_size().height
            + overflow * 2;

        let box_size = text_box_size();
        let title = title_size();
        for plan in &plans {
            let block = pack_text_boxes(plan.word_count(), box_size, printable.width);
            let needed = title.height + block.size.height;
            // the first page always carries the template, so a new page is
            // only ever opened after something was drawn
            if cursor + needed > page_bottom {
                surface.show_page();
                let page = blocks_per_page.len() + 1;
                self.open_page(surface, page);
                blocks_per_page.push(0);
                cursor = origin.y;
            }

            surface.save_state();
            surface.translate(origin.x, cursor);
            draw_card_block(surface, plan, &block.positions);
            surface.restore_state();

            let page = blocks_per_page.len();
            blocks_per_page[page - 1] += 1;
            if let Some(debug) = self.debug {
                debug.log_reader_block(plan.number, page, block.rows, plan.word_count());
            }
            cursor += needed;
        }

        Ok(blocks_per_page)
    }

    fn open_page<S: Surface>(&self, surface: &mut S, page: usize) {
        self.template.begin_page(surface, page);
        if let Some(debug) = self.debug {
            debug.log_page_open(READER_SECTION, page);
        }
    }
}

/// Draws the cut-out template with the card's top-left corner at the
/// current origin. The card is inserted face down, so character positions
/// and word numbers run right to left.
pub fn draw_reader_template<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters) {
    draw_cutline(surface, params);
    draw_guidelines(surface, params);
    draw_row_separators(surface, params);
    draw_row_labels(surface, params);
    draw_word_separators(surface, params);
    draw_character_numbers(surface, params);
    draw_word_numbers(surface, params);
    draw_hints(surface, params);
}

fn number_band_height(params: &LayoutParameters) -> Pt {
    mm(config::READER_NUMBER_BOX_HEIGHT_MM) * (params.card_split() as i32 + 1)
}

/// How far the template reaches above the card's top edge: the cut line or
/// the number band, whichever is taller, plus the cut hint.
pub fn template_head_height(params: &LayoutParameters) -> Pt {
    mm(config::READER_CUTLINE_OVERFLOW_MM).max(number_band_height(params))
        + mm(config::READER_NUMBER_BOX_HEIGHT_MM)
}

fn draw_cutline<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters) {
    let overflow = mm(config::READER_CUTLINE_OVERFLOW_MM);
    surface.set_pen(&config::PEN_CUTLINE);
    surface.line(
        Point::new(Pt::ZERO, -overflow),
        Point::new(Pt::ZERO, params.card_size().height + overflow),
    );
}

fn draw_guidelines<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters) {
    let card = params.card_size();
    let end = card.width + mm(config::READER_GUIDELINE_OVERFLOW_MM);
    surface.set_pen(&config::PEN_GUIDELINE);
    for y in [Pt::ZERO, card.height] {
        surface.line(Point::new(Pt::ZERO, y), Point::new(end, y));
    }
}

/// Thin lines between character rows in the label column, and full-width
/// lines between the sections of a split card.
fn draw_row_separators<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters) {
    let padding = params.padding();
    let cell = params.cell_size();
    let section_height = params.section_size().height;
    let rows = params.encoding().rows();
    let left = -mm(config::READER_LINE_SEPARATOR_WIDTH_MM);

    surface.set_pen(&config::PEN_THIN);
    for section in 0..params.card_split() {
        let top = padding + section_height * section as i32;
        for row in 0..=rows {
            let y = top + cell.height * row as i32;
            surface.line(Point::new(left, y), Point::new(Pt::ZERO, y));
        }
    }

    surface.set_pen(&config::PEN_NORMAL);
    for section in 1..params.card_split() {
        let y = padding + section_height * section as i32;
        surface.line(Point::new(left, y), Point::new(params.card_size().width, y));
    }
}

fn draw_row_labels<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters) {
    let padding = params.padding();
    let cell = params.cell_size();
    let section_height = params.section_size().height;
    let encoding = params.encoding();
    let separator = mm(config::READER_LINE_SEPARATOR_WIDTH_MM);
    let width = separator - mm(config::READER_ENCODING_CHARS_OFFSET_MM);
    let font_size = fit_font_size(
        &*surface,
        config::CELL_SAMPLE,
        config::CELL_FONT_SIZE_RANGE,
        0.2,
        cell.with_width(width),
    );

    surface.set_fill_color(config::CELL_TEXT_COLOR);
    for section in 0..params.card_split() {
        let top = padding + section_height * section as i32;
        for row in 0..encoding.rows() {
            let rect = Rect::new(-separator, top + cell.height * row as i32, width, cell.height);
            let label = encoding.row_label(row).to_string();
            draw_text(surface, &label, rect, font_size, TextAlign::RIGHT_CENTER);
        }
    }
}

/// Vertical lines between character columns over the whole card height,
/// thick between words. Word boundaries reach up through the number band.
fn draw_word_separators<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters) {
    let padding = params.padding();
    let cell = params.cell_size();
    let height = params.card_size().height;
    let band = number_band_height(params);
    let columns = params.max_words_per_section() * 4;

    for column in 0..=columns {
        let x = padding + cell.width * column as i32;
        if column % 4 == 0 {
            surface.set_pen(&config::PEN_THICK);
            surface.line(Point::new(x, -band), Point::new(x, height));
        } else {
            surface.set_pen(&config::PEN_THIN);
            surface.line(Point::new(x, Pt::ZERO), Point::new(x, height));
        }
    }
}

fn draw_character_numbers<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters) {
    let padding = params.padding();
    let cell = params.cell_size();
    let box_height = mm(config::READER_NUMBER_BOX_HEIGHT_MM);
    let font_size = fit_font_size(
        &*surface,
        config::CELL_SAMPLE,
        config::CELL_FONT_SIZE_RANGE,
        0.2,
        Size::new(cell.width, box_height),
    );

    surface.set_fill_color(config::CELL_TEXT_COLOR);
    for column in 0..params.max_words_per_section() * 4 {
        let rect = Rect::new(
            padding + cell.width * column as i32,
            -box_height,
            cell.width,
            box_height,
        );
        let position = 4 - column % 4;
        draw_text(surface, &position.to_string(), rect, font_size, TextAlign::BOTTOM_CENTER);
    }
}

/// One row of word positions per section, above the character numbers.
/// Section `s` covers positions `(s-1)*w+1 ..= s*w`, highest on the left.
fn draw_word_numbers<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters) {
    let padding = params.padding();
    let word = params.word_size();
    let per_section = params.max_words_per_section();
    let box_height = mm(config::READER_NUMBER_BOX_HEIGHT_MM);
    let font_size = fit_font_size(
        &*surface,
        config::WORD_NR_SAMPLE,
        config::WORD_NR_FONT_SIZE_RANGE,
        1.0,
        Size::new(word.width, box_height),
    );

    surface.set_fill_color(config::WORD_NR_COLOR);
    let split = params.card_split();
    for section in 1..=split {
        // the last section sits right above the character numbers
        let y = -box_height * (split - section + 2) as i32;
        for k in 0..per_section {
            let number = per_section * section - k;
            let rect = Rect::new(padding + word.width * k as i32, y, word.width, box_height);
            draw_text(surface, &number.to_string(), rect, font_size, TextAlign::CENTER);
        }
    }
}

fn draw_hints<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters) {
    let hint_height = mm(config::READER_NUMBER_BOX_HEIGHT_MM);
    let font_size = Pt::from_f32(config::READER_HINT_FONT_SIZE);
    let top = -template_head_height(params);
    let cut_width = mm(40.0);
    surface.set_fill_color(config::CELL_TEXT_COLOR);
    draw_text(
        surface,
        config::READER_CUT_TEXT,
        Rect::new(-cut_width / 2, top, cut_width, hint_height),
        font_size,
        TextAlign::BOTTOM_CENTER,
    );

    let card = params.card_size();
    let insert = Rect::new(
        card.width + mm(config::READER_LINE_SEPARATOR_WIDTH_MM),
        Pt::ZERO,
        mm(config::READER_GUIDELINE_OVERFLOW_MM) * 4,
        card.height,
    );
    draw_text(surface, config::READER_INSERT_TEXT, insert, font_size, TextAlign::LEFT_CENTER);
}

/// Title plus the answer boxes of one card, numbered from its first word.
fn draw_card_block<S: Surface + ?Sized>(surface: &mut S, plan: &CardPlan, positions: &[Point]) {
    let title = title_size();
    surface.meta("reader.card", &plan.number.to_string());
    surface.set_fill_color(config::WORD_NR_COLOR);
    draw_text(
        surface,
        &format!("{} {}", config::READER_TEXTBOX_TITLE_TEXT, plan.number),
        Rect::from_size(title),
        Pt::from_f32(config::READER_TEXTBOX_TITLE_FONT_SIZE),
        TextAlign::LEFT_CENTER,
    );

    surface.save_state();
    surface.translate(Pt::ZERO, title.height);
    for (position, word_number) in positions.iter().zip(plan.word_numbers()) {
        draw_text_box(surface, *position, word_number);
    }
    surface.restore_state();
}

fn draw_text_box<S: Surface + ?Sized>(surface: &mut S, at: Point, word_number: usize) {
    let (cell_width, cell_height) = config::READER_TEXTBOX_CELL_MM;
    let cell = Size::from_mm(cell_width, cell_height);

    surface.set_fill_color(config::WORD_NR_COLOR);
    draw_text(
        surface,
        &format!("{word_number}."),
        Rect::at(at, cell),
        Pt::from_f32(config::READER_TEXTBOX_NR_FONT_SIZE),
        TextAlign::RIGHT_CENTER,
    );

    surface.set_pen(&config::PEN_NORMAL);
    surface.stroke_rect(Rect::new(at.x + cell.width, at.y, cell.width * 4, cell.height));
    surface.set_pen(&config::PEN_THIN);
    for column in 2..5 {
        let x = at.x + cell.width * column;
        surface.line(Point::new(x, at.y), Point::new(x, at.y + cell.height));
    }
}
