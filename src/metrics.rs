#[derive(Debug, Clone, Default)]
pub struct PageMetrics {
    /// 1-based position in the joined document.
    pub page_number: usize,
    pub section: String,
    pub command_count: usize,
    /// Writer cards or reader text-box blocks drawn on the page.
    pub card_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentMetrics {
    pub pages: Vec<PageMetrics>,
    pub total_render_ms: f64,
}

impl DocumentMetrics {
    pub fn section_pages(&self, section: &str) -> usize {
        self.pages.iter().filter(|page| page.section == section).count()
    }
}
