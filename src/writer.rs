use crate::canvas::Surface;
use crate::card_plan::{CardPlan, SectionPlan};
use crate::config;
use crate::debug::DebugLogger;
use crate::error::LayoutError;
use crate::page_template::PageTemplate;
use crate::params::LayoutParameters;
use crate::placement::{GridPlacer, global_card_index};
use crate::text::{TextAlign, draw_text, fit_font_size};
use crate::types::{Point, Pt, Rect};

pub const WRITER_SECTION: &str = "writer";

/// Punching stencils: every effective card, repeated for each copy, packed
/// onto as many pages as needed.
pub struct WriterStencil<'a> {
    params: &'a LayoutParameters,
    template: &'a PageTemplate,
    debug: Option<&'a DebugLogger>,
}

impl<'a> WriterStencil<'a> {
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

    pub fn placer(&self) -> Result<GridPlacer, LayoutError> {
        GridPlacer::new(
            self.template.printable_area(),
            self.params.card_size(),
            Pt::from_mm(config::CARD_MARGIN_MM),
        )
    }

    /// Draws all cards and returns how many landed on each page.
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<Vec<usize>, LayoutError> {
        let placer = self.placer()?;
        let plans = self.params.card_plans()?;
        let effective = self.params.effective_card_count();
        let origin = self.template.content_origin();
        let mut cards_per_page: Vec<usize> = Vec::new();

        for copy in 1..=self.params.copies() {
            for plan in &plans {
                let index = global_card_index(plan.number, copy, effective);
                let placement = placer.place(index)?;
                if placement.page > cards_per_page.len() {
                    if !cards_per_page.is_empty() {
                        surface.show_page();
                    }
                    cards_per_page.push(0);
                    self.template.begin_page(surface, placement.page);
                    if let Some(debug) = self.debug {
                        debug.log_page_open(WRITER_SECTION, placement.page);
                    }
                }

                surface.save_state();
                surface.translate(origin.x + placement.origin.x, origin.y + placement.origin.y);
                surface.meta("writer.card", &format!("{}/{}", plan.number, copy));
                draw_card(surface, self.params, plan);
                surface.restore_state();

                cards_per_page[placement.page - 1] += 1;
                if let Some(debug) = self.debug {
                    debug.log_card_placed(plan.number, copy, &placement);
                }
            }
        }

        Ok(cards_per_page)
    }
}

/// Draws one card at the current origin: outline, then each section below
/// the previous one inside the padding.
pub fn draw_card<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters, plan: &CardPlan) {
    surface.set_pen(&config::PEN_NORMAL);
    surface.stroke_rounded_rect(Rect::from_size(params.card_size()), params.corner_radius());

    let fonts = WordFonts::fit(&*surface, params);
    let section_height = params.section_size().height;
    surface.save_state();
    surface.translate(params.padding(), params.padding());
    for section in &plan.sections {
        draw_section(surface, params, section, &fonts);
        surface.translate(Pt::ZERO, section_height);
    }
    surface.restore_state();
}

struct WordFonts {
    number: Pt,
    cell: Pt,
}

impl WordFonts {
    fn fit<S: Surface + ?Sized>(surface: &S, params: &LayoutParameters) -> Self {
        Self {
            number: fit_font_size(
                surface,
                config::WORD_NR_SAMPLE,
                config::WORD_NR_FONT_SIZE_RANGE,
                1.0,
                params.word_size(),
            ),
            cell: fit_font_size(
                surface,
                config::CELL_SAMPLE,
                config::CELL_FONT_SIZE_RANGE,
                0.2,
                params.cell_size(),
            ),
        }
    }
}

fn draw_section<S: Surface + ?Sized>(
    surface: &mut S,
    params: &LayoutParameters,
    section: &SectionPlan,
    fonts: &WordFonts,
) {
    let word = params.word_size();
    let word_rect = Rect::from_size(word);
    surface.save_state();
    for (i, word_number) in section.words.clone().enumerate() {
        // neighbouring words and stacked sections alternate shading
        if (section.number + i) % 2 == 0 {
            surface.set_fill_color(config::WORD_CELL_SHADE);
            surface.fill_rect(word_rect);
        }
        surface.set_pen(&config::PEN_NORMAL);
        surface.stroke_rect(word_rect);

        surface.set_fill_color(config::WORD_NR_COLOR);
        draw_text(
            surface,
            &word_number.to_string(),
            word_rect,
            fonts.number,
            TextAlign::TOP_CENTER,
        );

        draw_cell_grid(surface, params);
        draw_cell_labels(surface, params, fonts.cell);
        surface.translate(word.width, Pt::ZERO);
    }
    surface.restore_state();
}

fn draw_cell_grid<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters) {
    let word = params.word_size();
    let cell = params.cell_size();
    surface.set_pen(&config::PEN_THIN);
    for row in 1..params.encoding().rows() {
        let y = cell.height * row as i32;
        surface.line(Point::new(Pt::ZERO, y), Point::new(word.width, y));
    }
    for column in 1..4 {
        let x = cell.width * column;
        surface.line(Point::new(x, Pt::ZERO), Point::new(x, word.height));
    }
}

fn draw_cell_labels<S: Surface + ?Sized>(surface: &mut S, params: &LayoutParameters, font_size: Pt) {
    let cell = params.cell_size();
    let encoding = params.encoding();
    surface.set_fill_color(config::CELL_TEXT_COLOR);
    for row in 0..encoding.rows() {
        let label = encoding.row_label(row).to_string();
        for column in 0..4 {
            let rect = Rect::new(
                cell.width * column,
                cell.height * row as i32,
                cell.width,
                cell.height,
            );
            draw_text(surface, &label, rect, font_size, TextAlign::CENTER);
        }
    }
}
