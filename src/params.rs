use std::ops::RangeInclusive;

use bitflags::bitflags;
use sha2::{Digest, Sha256};

use crate::config;
use crate::error::LayoutError;
use crate::types::{Pt, Size};

/// How a word is punched: which character rows each word column offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// `a`..`z` plus a pad row for words shorter than four letters.
    Alphabet,
    /// `0`..`9`, the word's list index written as four digits.
    Numeric,
}

impl Encoding {
    const PAD: char = '-';

    pub fn rows(self) -> usize {
        match self {
            Encoding::Alphabet => 27,
            Encoding::Numeric => 10,
        }
    }

    pub fn row_label(self, row: usize) -> char {
        let (first, last) = match self {
            Encoding::Alphabet => (b'a', 25),
            Encoding::Numeric => (b'0', 9),
        };
        if row > last {
            return Self::PAD;
        }
        char::from(first + row as u8)
    }

    fn tag(self) -> &'static str {
        match self {
            Encoding::Alphabet => "alphabet",
            Encoding::Numeric => "numeric",
        }
    }
}

bitflags! {
    /// Parts of the generated document.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PdfSections: u8 {
        const WRITER = 1;
        const READER = 2;
        /// A caller-supplied PDF appended after the reader.
        const MANUAL = 4;
    }
}

/// Second configuration tier. Supplying it means supplying all of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StencilOptions {
    pub card_split: usize,
    pub encoding: Encoding,
    pub copies: usize,
    pub sections: PdfSections,
}

impl Default for StencilOptions {
    fn default() -> Self {
        Self {
            card_split: config::CARD_SPLIT_DEFAULT,
            encoding: config::CARD_ENCODING_DEFAULT,
            copies: config::WRITER_COPIES_DEFAULT,
            sections: config::SECTIONS_DEFAULT,
        }
    }
}

/// Third configuration tier: the physical finish of a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardFinish {
    pub corner_radius: Pt,
    pub padding: Pt,
}

impl Default for CardFinish {
    fn default() -> Self {
        Self {
            corner_radius: Pt::from_mm(config::CARD_RADIUS_DEFAULT_MM),
            padding: Pt::from_mm(config::CARD_PADDING_DEFAULT_MM),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub card_size: Size,
    pub card_count: usize,
    pub seed_length: usize,
    pub stencil: Option<StencilOptions>,
    pub finish: Option<CardFinish>,
}

impl LayoutConfig {
    pub fn new(card_size: Size, card_count: usize, seed_length: usize) -> Self {
        Self {
            card_size,
            card_count,
            seed_length,
            stencil: None,
            finish: None,
        }
    }

    pub fn with_stencil(mut self, stencil: StencilOptions) -> Self {
        self.stencil = Some(stencil);
        self
    }

    pub fn with_finish(mut self, finish: CardFinish) -> Self {
        self.finish = Some(finish);
        self
    }
}

/// Validated inputs of one generation run. Every geometric value is derived
/// from these on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParameters {
    seed_length: usize,
    card_count: usize,
    card_size: Size,
    stencil: StencilOptions,
    finish: CardFinish,
}

impl LayoutParameters {
    pub fn new(config: LayoutConfig) -> Result<Self, LayoutError> {
        check_count("seed length", config.seed_length, &config::SEED_LENGTH_RANGE)?;
        check_count("card count", config.card_count, &config::CARD_COUNT_RANGE)?;
        check_length("card width", config.card_size.width, config::CARD_WIDTH_RANGE_MM)?;
        check_length("card height", config.card_size.height, config::CARD_HEIGHT_RANGE_MM)?;

        if let Some(stencil) = &config.stencil {
            check_count("card split", stencil.card_split, &config::CARD_SPLIT_RANGE)?;
            check_count("copies", stencil.copies, &config::WRITER_COPIES_RANGE)?;
            if stencil.sections.is_empty() {
                return Err(LayoutError::out_of_range(
                    "sections",
                    "none",
                    "[writer, reader, manual]",
                ));
            }
        }
        if let Some(finish) = &config.finish {
            check_length("corner radius", finish.corner_radius, config::CARD_RADIUS_RANGE_MM)?;
            check_length("padding", finish.padding, config::CARD_PADDING_RANGE_MM)?;
        }

        let params = Self {
            seed_length: config.seed_length,
            card_count: config.card_count,
            card_size: config.card_size,
            stencil: config.stencil.unwrap_or_default(),
            finish: config.finish.unwrap_or_default(),
        };
        if !params.grid_size().is_positive() {
            return Err(LayoutError::out_of_range(
                "padding",
                params.finish.padding,
                "less than half of the card's shorter side",
            ));
        }
        // rounding can still leave a positive grid with empty cells
        if !params.cell_size().is_positive() {
            return Err(LayoutError::out_of_range(
                "padding",
                params.finish.padding,
                "small enough to leave every character cell a positive size",
            ));
        }
        Ok(params)
    }

    pub fn seed_length(&self) -> usize {
        self.seed_length
    }

    pub fn card_count(&self) -> usize {
        self.card_count
    }

    pub fn card_size(&self) -> Size {
        self.card_size
    }

    pub fn card_split(&self) -> usize {
        self.stencil.card_split
    }

    pub fn encoding(&self) -> Encoding {
        self.stencil.encoding
    }

    pub fn copies(&self) -> usize {
        self.stencil.copies
    }

    pub fn sections(&self) -> PdfSections {
        self.stencil.sections
    }

    pub fn corner_radius(&self) -> Pt {
        self.finish.corner_radius
    }

    pub fn padding(&self) -> Pt {
        self.finish.padding
    }

    /// Card area inside the padding.
    pub fn grid_size(&self) -> Size {
        self.card_size.inset(self.finish.padding)
    }

    pub fn section_size(&self) -> Size {
        let grid = self.grid_size();
        grid.with_height(grid.height / self.card_split() as i32)
    }

    pub fn total_section_count(&self) -> usize {
        self.card_count * self.card_split()
    }

    /// Rounded up: every section but the last populated one is full.
    pub fn max_words_per_section(&self) -> usize {
        self.seed_length.div_ceil(self.total_section_count())
    }

    pub fn max_words_per_card(&self) -> usize {
        self.max_words_per_section() * self.card_split()
    }

    pub fn word_size(&self) -> Size {
        let section = self.section_size();
        section.with_width(section.width / self.max_words_per_section() as i32)
    }

    /// Each word is four cells wide and one row per encoding symbol tall.
    pub fn cell_size(&self) -> Size {
        let word = self.word_size();
        Size::new(word.width / 4, word.height / self.encoding().rows() as i32)
    }

    /// Requested cards minus trailing cards that the rounded-up distribution
    /// leaves without a single word.
    pub fn effective_card_count(&self) -> usize {
        let per_card = self.max_words_per_card();
        let empty_slots = self.card_count * per_card - self.seed_length;
        self.card_count - empty_slots / per_card
    }

    /// Short digest of everything that determines where a word sits on a
    /// card. Cards and readers only match when their fingerprints do.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.seed_length as u64).to_le_bytes());
        hasher.update((self.card_count as u64).to_le_bytes());
        hasher.update(self.card_size.width.to_milli_i64().to_le_bytes());
        hasher.update(self.card_size.height.to_milli_i64().to_le_bytes());
        hasher.update((self.card_split() as u64).to_le_bytes());
        hasher.update(self.encoding().tag().as_bytes());
        hasher.update(self.padding().to_milli_i64().to_le_bytes());
        let digest = hasher.finalize();
        digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

fn check_count(
    parameter: &'static str,
    value: usize,
    range: &RangeInclusive<usize>,
) -> Result<(), LayoutError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(LayoutError::out_of_range(
        parameter,
        value,
        format!("[{}-{}]", range.start(), range.end()),
    ))
}

fn check_length(parameter: &'static str, value: Pt, range_mm: (f32, f32)) -> Result<(), LayoutError> {
    let (min, max) = (Pt::from_mm(range_mm.0), Pt::from_mm(range_mm.1));
    if min <= value && value <= max {
        return Ok(());
    }
    Err(LayoutError::out_of_range(
        parameter,
        value,
        format!("[{}-{}]mm", range_mm.0, range_mm.1),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed_length: usize, card_count: usize, card_split: usize) -> LayoutParameters {
        LayoutParameters::new(
            LayoutConfig::new(Size::from_mm(85.0, 54.0), card_count, seed_length).with_stencil(
                StencilOptions {
                    card_split,
                    ..StencilOptions::default()
                },
            ),
        )
        .expect("valid parameters")
    }

    fn parameter_of(err: LayoutError) -> &'static str {
        match err {
            LayoutError::OutOfRange { parameter, .. } => parameter,
            other => panic!("expected range error, got {other}"),
        }
    }

    #[test]
    fn two_cards_of_twelve() {
        let p = params(24, 2, 1);
        assert_eq!(p.total_section_count(), 2);
        assert_eq!(p.max_words_per_section(), 12);
        assert_eq!(p.max_words_per_card(), 12);
        assert_eq!(p.effective_card_count(), 2);
    }

    #[test]
    fn five_cards_round_up() {
        let p = params(24, 5, 1);
        assert_eq!(p.max_words_per_section(), 5);
        assert_eq!(p.max_words_per_card(), 5);
        assert_eq!(p.effective_card_count(), 5);
    }

    #[test]
    fn trailing_empty_cards_are_dropped() {
        // 13 cards * 2 words leaves 16 slots for 10 words: cards 6..13 are empty.
        let p = params(10, 13, 2);
        assert_eq!(p.max_words_per_section(), 1);
        assert_eq!(p.max_words_per_card(), 2);
        assert_eq!(p.effective_card_count(), 5);
    }

    #[test]
    fn ceiling_property_holds_everywhere() {
        for seed in config::SEED_LENGTH_RANGE {
            for cards in config::CARD_COUNT_RANGE {
                for split in config::CARD_SPLIT_RANGE {
                    let p = params(seed, cards, split);
                    let sections = p.total_section_count();
                    let per_section = p.max_words_per_section();
                    assert!(per_section * sections >= seed);
                    if seed % sections != 0 {
                        assert!((per_section - 1) * sections < seed);
                    }
                    let effective = p.effective_card_count();
                    assert!(effective >= 1 && effective <= cards);
                    // every effective card starts inside the seed, the next one would not
                    assert!((effective - 1) * p.max_words_per_card() < seed);
                    assert!(effective * p.max_words_per_card() >= seed);
                }
            }
        }
    }

    #[test]
    fn derived_geometry_follows_card_size() {
        let p = LayoutParameters::new(
            LayoutConfig::new(Size::from_mm(90.0, 60.0), 2, 24)
                .with_stencil(StencilOptions {
                    card_split: 2,
                    encoding: Encoding::Numeric,
                    copies: 1,
                    sections: PdfSections::WRITER,
                })
                .with_finish(CardFinish {
                    corner_radius: Pt::from_mm(2.0),
                    padding: Pt::from_mm(3.0),
                }),
        )
        .expect("valid parameters");
        let grid = p.grid_size();
        assert_eq!(grid, Size::from_mm(90.0, 60.0).inset(Pt::from_mm(3.0)));
        assert_eq!(p.section_size().height, grid.height / 2);
        assert_eq!(p.max_words_per_section(), 6);
        assert_eq!(p.word_size().width, grid.width / 6);
        assert_eq!(p.word_size().height, p.section_size().height);
        assert_eq!(p.cell_size().width, p.word_size().width / 4);
        assert_eq!(p.cell_size().height, p.word_size().height / 10);
    }

    #[test]
    fn identical_inputs_give_identical_geometry() {
        let a = params(18, 3, 2);
        let b = params(18, 3, 2);
        assert_eq!(a, b);
        assert_eq!(a.cell_size(), b.cell_size());
        assert_eq!(a.word_size(), b.word_size());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_tracks_padding_but_not_copies() {
        let base = LayoutConfig::new(Size::from_mm(85.0, 54.0), 2, 24);
        let plain = LayoutParameters::new(base).expect("valid");
        let copies = LayoutParameters::new(base.with_stencil(StencilOptions {
            copies: 3,
            ..StencilOptions::default()
        }))
        .expect("valid");
        let padded = LayoutParameters::new(base.with_finish(CardFinish {
            padding: Pt::from_mm(2.0),
            ..CardFinish::default()
        }))
        .expect("valid");
        assert_eq!(plain.fingerprint(), copies.fingerprint());
        assert_ne!(plain.fingerprint(), padded.fingerprint());
        assert_eq!(plain.fingerprint().len(), 16);
    }

    #[test]
    fn zero_cards_rejected() {
        let err = LayoutParameters::new(LayoutConfig::new(Size::from_mm(85.0, 54.0), 0, 24))
            .unwrap_err();
        match err {
            LayoutError::OutOfRange {
                parameter,
                value,
                allowed,
            } => {
                assert_eq!(parameter, "card count");
                assert_eq!(value, "0");
                assert_eq!(allowed, "[1-13]");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn validation_order_reports_first_offender() {
        let bad_size = Size::from_mm(5.0, 5.0);
        let err = LayoutParameters::new(LayoutConfig::new(bad_size, 0, 9)).unwrap_err();
        assert_eq!(parameter_of(err), "seed length");
        let err = LayoutParameters::new(LayoutConfig::new(bad_size, 0, 24)).unwrap_err();
        assert_eq!(parameter_of(err), "card count");
        let err = LayoutParameters::new(LayoutConfig::new(bad_size, 2, 24)).unwrap_err();
        assert_eq!(parameter_of(err), "card width");
        let err =
            LayoutParameters::new(LayoutConfig::new(Size::from_mm(85.0, 300.0), 2, 24)).unwrap_err();
        assert_eq!(parameter_of(err), "card height");

        let size = Size::from_mm(85.0, 54.0);
        let err = LayoutParameters::new(
            LayoutConfig::new(size, 2, 24)
                .with_stencil(StencilOptions {
                    card_split: 0,
                    copies: 0,
                    ..StencilOptions::default()
                })
                .with_finish(CardFinish {
                    corner_radius: Pt::from_mm(20.0),
                    padding: Pt::from_mm(20.0),
                }),
        )
        .unwrap_err();
        assert_eq!(parameter_of(err), "card split");
        let err = LayoutParameters::new(LayoutConfig::new(size, 2, 24).with_stencil(StencilOptions {
            copies: 11,
            ..StencilOptions::default()
        }))
        .unwrap_err();
        assert_eq!(parameter_of(err), "copies");
        let err = LayoutParameters::new(LayoutConfig::new(size, 2, 24).with_finish(CardFinish {
            corner_radius: Pt::from_mm(11.0),
            padding: Pt::from_mm(20.0),
        }))
        .unwrap_err();
        assert_eq!(parameter_of(err), "corner radius");
        let err = LayoutParameters::new(LayoutConfig::new(size, 2, 24).with_finish(CardFinish {
            corner_radius: Pt::ZERO,
            padding: Pt::from_mm(10.5),
        }))
        .unwrap_err();
        assert_eq!(parameter_of(err), "padding");
    }

    #[test]
    fn padding_that_swallows_the_card_is_rejected() {
        let err = LayoutParameters::new(
            LayoutConfig::new(Size::from_mm(15.0, 15.0), 1, 12).with_finish(CardFinish {
                corner_radius: Pt::ZERO,
                padding: Pt::from_mm(7.5),
            }),
        )
        .unwrap_err();
        assert_eq!(parameter_of(err), "padding");
    }

    #[test]
    fn padding_that_leaves_empty_cells_is_rejected() {
        let config = LayoutConfig::new(Size::from_mm(15.0, 15.0), 1, 39).with_finish(CardFinish {
            corner_radius: Pt::ZERO,
            padding: Pt::from_mm(7.49),
        });
        let err = LayoutParameters::new(config).unwrap_err();
        assert_eq!(parameter_of(err), "padding");
    }

    #[test]
    fn smallest_cards_keep_positive_cells() {
        for split in config::CARD_SPLIT_RANGE {
            let p = LayoutParameters::new(
                LayoutConfig::new(Size::from_mm(15.0, 15.0), 1, 39)
                    .with_stencil(StencilOptions {
                        card_split: split,
                        ..StencilOptions::default()
                    })
                    .with_finish(CardFinish {
                        corner_radius: Pt::ZERO,
                        padding: Pt::ZERO,
                    }),
            )
            .expect("valid parameters");
            assert!(p.cell_size().is_positive(), "split {split}");
        }
    }

    #[test]
    fn empty_section_selection_is_rejected() {
        let err = LayoutParameters::new(
            LayoutConfig::new(Size::from_mm(85.0, 54.0), 2, 24).with_stencil(StencilOptions {
                sections: PdfSections::empty(),
                ..StencilOptions::default()
            }),
        )
        .unwrap_err();
        assert_eq!(parameter_of(err), "sections");
    }

    #[test]
    fn encoding_row_labels() {
        assert_eq!(Encoding::Alphabet.rows(), 27);
        assert_eq!(Encoding::Alphabet.row_label(0), 'a');
        assert_eq!(Encoding::Alphabet.row_label(25), 'z');
        assert_eq!(Encoding::Alphabet.row_label(26), '-');
        assert_eq!(Encoding::Numeric.rows(), 10);
        assert_eq!(Encoding::Numeric.row_label(9), '9');
    }
}
