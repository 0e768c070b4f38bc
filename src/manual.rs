use std::fmt;
use std::sync::Arc;

use lopdf::{Dictionary, Document as LoDocument, Object as LoObject, ObjectId as LoObjectId};

use crate::canvas::Surface;
use crate::debug::DebugLogger;
use crate::error::LayoutError;
use crate::page_template::PageTemplate;
use crate::pdf::lopdf_err;

pub const MANUAL_SECTION: &str = "manual";

// Page attributes a page may inherit from its page tree ancestors.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const MAX_TREE_DEPTH: usize = 64;

/// A caller-supplied PDF appended after the reader. Its pages are imported
/// unchanged; only the section header and footer are stamped on top.
#[derive(Clone)]
pub struct ManualPdf {
    bytes: Arc<[u8]>,
    page_count: usize,
}

impl fmt::Debug for ManualPdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualPdf")
            .field("bytes", &self.bytes.len())
            .field("page_count", &self.page_count)
            .finish()
    }
}

impl ManualPdf {
    /// Parses `bytes` once up front so a broken manual fails before any
    /// layout work.
    pub fn load(bytes: impl Into<Vec<u8>>) -> Result<Self, LayoutError> {
        let bytes: Arc<[u8]> = bytes.into().into();
        let source = parse(&bytes)?;
        let page_count = source.get_pages().len();
        if page_count == 0 {
            return Err(LayoutError::Pdf("manual has no pages".to_string()));
        }
        Ok(Self { bytes, page_count })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Moves the manual's pages into `target` below the page tree node
    /// `parent`. Returns the imported page ids in reading order.
    pub(crate) fn import_pages(
        &self,
        target: &mut LoDocument,
        parent: LoObjectId,
    ) -> Result<Vec<LoObjectId>, LayoutError> {
        let mut source = parse(&self.bytes)?;
        source.renumber_objects_with(target.max_id + 1);
        let page_ids: Vec<LoObjectId> = source.get_pages().values().copied().collect();

        let mut pages = Vec::with_capacity(page_ids.len());
        for id in &page_ids {
            let mut page = source.get_dictionary(*id).map_err(lopdf_err)?.clone();
            for key in INHERITABLE {
                if page.has(key) {
                    continue;
                }
                if let Some(value) = inherited(&source, &page, key) {
                    page.set(key, value);
                }
            }
            page.set("Parent", parent);
            pages.push((*id, page));
        }

        if source.max_id > target.max_id {
            target.max_id = source.max_id;
        }
        target.objects.extend(
            source
                .objects
                .into_iter()
                .filter(|(_, object)| !is_tree_node(object)),
        );
        for (id, page) in pages {
            target.objects.insert(id, LoObject::Dictionary(page));
        }
        Ok(page_ids)
    }
}

fn parse(bytes: &[u8]) -> Result<LoDocument, LayoutError> {
    let source = LoDocument::load_mem(bytes).map_err(lopdf_err)?;
    if source.is_encrypted() {
        return Err(LayoutError::Pdf("manual is encrypted".to_string()));
    }
    Ok(source)
}

fn inherited(source: &LoDocument, page: &Dictionary, key: &[u8]) -> Option<LoObject> {
    let mut parent = page.get(b"Parent").and_then(LoObject::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let node = source.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(LoObject::as_reference).ok();
    }
    None
}

// The source catalog and page tree are replaced by the target's.
fn is_tree_node(object: &LoObject) -> bool {
    let LoObject::Dictionary(dict) = object else {
        return false;
    };
    matches!(dict.get(b"Type"), Ok(LoObject::Name(name)) if name == b"Pages" || name == b"Catalog")
}

/// Records one overlay page per manual page. Each carries the section
/// decoration and is matched with its manual page on PDF export.
pub struct ManualSection<'a> {
    manual: &'a ManualPdf,
    template: &'a PageTemplate,
    debug: Option<&'a DebugLogger>,
}

impl<'a> ManualSection<'a> {
    pub fn new(manual: &'a ManualPdf, template: &'a PageTemplate) -> Self {
        Self {
            manual,
            template,
            debug: None,
        }
    }

    pub fn with_debug(mut self, debug: Option<&'a DebugLogger>) -> Self {
        self.debug = debug;
        self
    }

    pub fn render<S: Surface>(&self, surface: &mut S) -> Vec<usize> {
        for page in 1..=self.manual.page_count() {
            if page > 1 {
                surface.show_page();
            }
            self.template.begin_page(surface, page);
            if let Some(debug) = self.debug {
                debug.log_page_open(MANUAL_SECTION, page);
            }
        }
        vec![0; self.manual.page_count()]
    }
}
