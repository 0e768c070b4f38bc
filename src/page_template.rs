use crate::canvas::Surface;
use crate::doc_context::DocContext;
use crate::types::{Margins, Point, Size};
use std::sync::Arc;

pub type OnPageCallback = Arc<dyn Fn(&mut dyn Surface, &DocContext) + Send + Sync>;

/// Page geometry shared by every page of one section, plus the decoration
/// drawn when a page is opened.
#[derive(Clone)]
pub struct PageTemplate {
    pub name: String,
    pub page_size: Size,
    pub margins: Margins,
    on_page: Option<OnPageCallback>,
}

impl PageTemplate {
    pub fn new(name: impl Into<String>, page_size: Size, margins: Margins) -> Self {
        Self {
            name: name.into(),
            page_size,
            margins,
            on_page: None,
        }
    }

    pub fn set_on_page<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut dyn Surface, &DocContext) + Send + Sync + 'static,
    {
        self.on_page = Some(Arc::new(callback));
        self
    }

    pub fn printable_area(&self) -> Size {
        self.margins.printable(self.page_size)
    }

    pub fn content_origin(&self) -> Point {
        Point::new(self.margins.left, self.margins.top)
    }

    /// Runs the page decoration for page `page_number` of this section.
    /// Leaves the surface's state as it found it.
    pub fn begin_page<S: Surface>(&self, surface: &mut S, page_number: usize) {
        surface.meta("page.section", &self.name);
        if let Some(callback) = &self.on_page {
            surface.save_state();
            callback(surface, &DocContext::new(page_number, &self.name));
            surface.restore_state();
        }
    }
}
