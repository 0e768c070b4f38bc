use crate::error::LayoutError;
use crate::types::{Point, Pt, Size};

/// Where one card lands on the writer pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// 1-based.
    pub page: usize,
    /// 0-based row on the page.
    pub row: usize,
    /// 0-based column within the row.
    pub column: usize,
    /// Top-left corner relative to the printable area.
    pub origin: Point,
}

/// Packs equally sized card slots left to right, top to bottom, starting a new
/// page once a page is full.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPlacer {
    safe_size: Size,
    cards_per_row: usize,
    rows_per_page: usize,
}

impl GridPlacer {
    /// `area` is the printable page area; `margin` is the gap kept between
    /// neighbouring cards. The last card in a row or column may use the
    /// margin of the page edge, hence `area + margin` in the fit.
    pub fn new(area: Size, card_size: Size, margin: Pt) -> Result<Self, LayoutError> {
        let safe_size = safe_area_size(card_size, margin);
        let cards_per_row = (area.width + margin).div_floor(safe_size.width).max(0) as usize;
        let rows_per_page = (area.height + margin).div_floor(safe_size.height).max(0) as usize;
        if cards_per_row == 0 || rows_per_page == 0 {
            return Err(LayoutError::CardDoesNotFit {
                card: format!("{}x{}", safe_size.width, safe_size.height),
                area: format!("{}x{}", area.width, area.height),
            });
        }
        Ok(Self {
            safe_size,
            cards_per_row,
            rows_per_page,
        })
    }

    pub fn safe_size(&self) -> Size {
        self.safe_size
    }

    pub fn cards_per_row(&self) -> usize {
        self.cards_per_row
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn cards_per_page(&self) -> usize {
        self.cards_per_row * self.rows_per_page
    }

    /// Pages needed for `card_total` slots.
    pub fn page_count(&self, card_total: usize) -> usize {
        card_total.div_ceil(self.cards_per_page())
    }

    /// Placement of the `index`-th slot (1-based, counted across all copies).
    pub fn place(&self, index: usize) -> Result<Placement, LayoutError> {
        if index == 0 {
            return Err(LayoutError::SlotIndex { index });
        }
        let per_page = self.cards_per_page();
        let page = (index - 1) / per_page + 1;
        let position = (index - 1) % per_page;
        let row = position / self.cards_per_row;
        let column = position % self.cards_per_row;
        let origin = Point::new(
            self.safe_size.width * column as i32,
            self.safe_size.height * row as i32,
        );
        Ok(Placement {
            page,
            row,
            column,
            origin,
        })
    }
}

pub fn safe_area_size(card_size: Size, margin: Pt) -> Size {
    card_size.grow(margin)
}

/// Slot index of `card` in writer set `copy`; sets follow each other.
pub fn global_card_index(card: usize, copy: usize, effective_card_count: usize) -> usize {
    card + (copy - 1) * effective_card_count
}

/// Result of packing a run of equally sized boxes into a bounded width.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxBlock {
    /// Top-left corner of each box relative to the block origin.
    pub positions: Vec<Point>,
    pub rows: usize,
    /// Bounding size of the block including the spacing under the last row,
    /// so the next block can start right at `size.height`.
    pub size: Size,
}

/// Row pitch of a box block: one and a half box heights.
pub fn box_row_pitch(box_size: Size) -> Pt {
    box_size.height.mul_ratio(3, 2)
}

/// Places `count` boxes left to right. A new row starts whenever the next box
/// would cross `available_width`; a box wider than the width gets a row of
/// its own.
pub fn pack_text_boxes(count: usize, box_size: Size, available_width: Pt) -> BoxBlock {
    if count == 0 {
        return BoxBlock {
            positions: Vec::new(),
            rows: 0,
            size: Size::ZERO,
        };
    }

    let pitch = box_row_pitch(box_size);
    let mut positions = Vec::with_capacity(count);
    let mut x = Pt::ZERO;
    let mut y = Pt::ZERO;
    let mut rows = 1usize;
    let mut widest = Pt::ZERO;

    for idx in 0..count {
        positions.push(Point::new(x, y));
        x += box_size.width;
        widest = widest.max(x);
        let more = idx + 1 < count;
        if more && x + box_size.width > available_width {
            x = Pt::ZERO;
            y += pitch;
            rows += 1;
        }
    }

    BoxBlock {
        positions,
        rows,
        size: Size::new(widest, pitch * rows as i32),
    }
}
