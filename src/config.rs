//! Fixed limits, defaults and document styling.
//!
//! Lengths are in millimetres unless the name says otherwise; they are turned
//! into [`Pt`](crate::Pt) at the point of use.

use std::ops::RangeInclusive;

use crate::canvas::Pen;
use crate::params::{Encoding, PdfSections};
use crate::types::Color;

pub const SEED_LENGTH_RANGE: RangeInclusive<usize> = 10..=39;
pub const CARD_COUNT_RANGE: RangeInclusive<usize> = 1..=13;
pub const CARD_SPLIT_RANGE: RangeInclusive<usize> = 1..=6;
pub const WRITER_COPIES_RANGE: RangeInclusive<usize> = 1..=10;

pub const CARD_WIDTH_RANGE_MM: (f32, f32) = (15.0, 180.0);
pub const CARD_HEIGHT_RANGE_MM: (f32, f32) = (15.0, 250.0);
pub const CARD_RADIUS_RANGE_MM: (f32, f32) = (0.0, 10.0);
pub const CARD_PADDING_RANGE_MM: (f32, f32) = (0.0, 10.0);

pub const CARD_SPLIT_DEFAULT: usize = 1;
pub const WRITER_COPIES_DEFAULT: usize = 1;
pub const CARD_ENCODING_DEFAULT: Encoding = Encoding::Alphabet;
pub const SECTIONS_DEFAULT: PdfSections = PdfSections::WRITER.union(PdfSections::READER);
pub const CARD_RADIUS_DEFAULT_MM: f32 = 3.0;
/// Must be remembered when changed: a reader only lines up with cards that
/// were generated with the same padding.
pub const CARD_PADDING_DEFAULT_MM: f32 = 1.5;

/// Gap between neighbouring cards on a writer page.
pub const CARD_MARGIN_MM: f32 = 3.0;

pub const DOCUMENT_MARGIN_H_MM: f32 = 10.0;
pub const DOCUMENT_MARGIN_TOP_MM: f32 = 20.0;
pub const DOCUMENT_MARGIN_BOTTOM_MM: f32 = 15.0;

pub const DOCUMENT_TITLE: &str = "DIY seed backup";
pub const WRITER_HEADER_TEXT: &str = "Writer stencil - place over the card and punch one cell per character";
pub const READER_HEADER_TEXT: &str = "Reader - cut along the dotted line and slide the card under it";
pub const MANUAL_HEADER_TEXT: &str = "Manual - how to punch and read the cards";
pub const FOOTER_TEXT: &str = "DIY seed backup";
pub const HEADER_FONT_SIZE: f32 = 11.0;
pub const FOOTER_FONT_SIZE: f32 = 7.0;

pub const WORD_NR_FONT_SIZE_RANGE: (f32, f32) = (4.0, 9.0);
pub const WORD_NR_SAMPLE: &str = "42.";
pub const CELL_FONT_SIZE_RANGE: (f32, f32) = (2.0, 8.0);
pub const CELL_SAMPLE: &str = "M";

pub const WORD_CELL_SHADE: Color = Color::gray(0.88);
pub const WORD_NR_COLOR: Color = Color::gray(0.35);
pub const CELL_TEXT_COLOR: Color = Color::gray(0.55);

pub const PEN_NORMAL: Pen = Pen::solid(0.5, Color::BLACK);
pub const PEN_THIN: Pen = Pen::solid(0.2, Color::gray(0.4));
pub const PEN_THICK: Pen = Pen::solid(0.9, Color::BLACK);
pub const PEN_CUTLINE: Pen = Pen::dashed(0.7, Color::rgb(0.85, 0.1, 0.1), 2.0);
pub const PEN_GUIDELINE: Pen = Pen::dashed(0.3, Color::gray(0.5), 1.0);

/// Distance from the top margin to the reader template.
pub const READER_OFFSET_TOP_MM: f32 = 15.0;
/// Gap between the reader template and the first text-box block.
pub const READER_TEXTBOXES_GAP_MM: f32 = 15.0;
pub const READER_CUTLINE_OVERFLOW_MM: f32 = 10.0;
pub const READER_GUIDELINE_OVERFLOW_MM: f32 = 15.0;
pub const READER_LINE_SEPARATOR_WIDTH_MM: f32 = 6.0;
pub const READER_ENCODING_CHARS_OFFSET_MM: f32 = 1.0;
pub const READER_NUMBER_BOX_HEIGHT_MM: f32 = 5.0;
pub const READER_CUT_TEXT: &str = "cut here";
pub const READER_INSERT_TEXT: &str = "<- insert card face down";
pub const READER_HINT_FONT_SIZE: f32 = 8.0;

pub const READER_TEXTBOX_CELL_MM: (f32, f32) = (6.0, 7.0);
pub const READER_TEXTBOX_TITLE_MM: (f32, f32) = (60.0, 8.0);
pub const READER_TEXTBOX_TITLE_TEXT: &str = "Card";
pub const READER_TEXTBOX_TITLE_FONT_SIZE: f32 = 10.0;
pub const READER_TEXTBOX_NR_FONT_SIZE: f32 = 7.0;
