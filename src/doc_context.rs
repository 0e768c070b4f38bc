#[derive(Debug, Clone)]
pub struct DocContext {
    /// 1-based, counted within the section being rendered.
    pub page_number: usize,
    pub section: String,
}

impl DocContext {
    pub fn new(page_number: usize, section: impl Into<String>) -> Self {
        Self {
            page_number,
            section: section.into(),
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.page_number == 1
    }
}
