use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::canvas::{Canvas, Document, Surface};
use crate::config;
use crate::debug::DebugLogger;
use crate::doc_context::DocContext;
use crate::error::LayoutError;
use crate::manual::{MANUAL_SECTION, ManualPdf, ManualSection};
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::page_template::PageTemplate;
use crate::params::{LayoutParameters, PdfSections};
use crate::pdf;
use crate::reader::{READER_SECTION, ReaderStencil};
use crate::text::{TextAlign, draw_text};
use crate::types::{Margins, Pt, Rect, Size};
use crate::writer::{WRITER_SECTION, WriterStencil};

pub struct GeneratorBuilder {
    params: LayoutParameters,
    page_size: Size,
    margins: Margins,
    debug_path: Option<PathBuf>,
    manual: Option<Vec<u8>>,
}

impl GeneratorBuilder {
    pub fn new(params: LayoutParameters) -> Self {
        Self {
            params,
            page_size: Size::a4(),
            margins: Margins::from_mm(
                config::DOCUMENT_MARGIN_TOP_MM,
                config::DOCUMENT_MARGIN_H_MM,
                config::DOCUMENT_MARGIN_BOTTOM_MM,
                config::DOCUMENT_MARGIN_H_MM,
            ),
            debug_path: None,
            manual: None,
        }
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.page_size = size;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    // Write a JSONL trace of layout decisions.
    pub fn debug_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    /// PDF bytes of the manual appended when the manual section is
    /// selected.
    pub fn manual(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.manual = Some(bytes.into());
        self
    }

    pub fn build(self) -> Result<Generator, LayoutError> {
        if !self.margins.printable(self.page_size).is_positive() {
            return Err(LayoutError::out_of_range(
                "margins",
                format!("{}x{}", self.page_size.width, self.page_size.height),
                "a positive printable area",
            ));
        }
        let manual = if self.params.sections().contains(PdfSections::MANUAL) {
            let Some(bytes) = self.manual else {
                return Err(LayoutError::MissingManual);
            };
            Some(ManualPdf::load(bytes)?)
        } else {
            None
        };
        let debug = if let Some(path) = self.debug_path {
            Some(Arc::new(DebugLogger::new(path)?))
        } else {
            None
        };
        Ok(Generator {
            params: self.params,
            page_size: self.page_size,
            margins: self.margins,
            manual,
            debug,
        })
    }
}

/// Produces the complete backup document: writer stencils, the reader and
/// the manual, in that order, for whichever sections are selected.
pub struct Generator {
    params: LayoutParameters,
    page_size: Size,
    margins: Margins,
    manual: Option<ManualPdf>,
    debug: Option<Arc<DebugLogger>>,
}

#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub document: Document,
    pub metrics: DocumentMetrics,
    pub fingerprint: String,
    /// Pages imported under the manual section on export.
    pub manual: Option<ManualPdf>,
}

impl GeneratedDocument {
    pub fn to_pdf(&self) -> Result<Vec<u8>, LayoutError> {
        pdf::document_to_pdf(&self.document, config::DOCUMENT_TITLE, self.manual.as_ref())
    }
}

struct RenderedSection {
    name: &'static str,
    document: Document,
    items_per_page: Vec<usize>,
}

impl Generator {
    pub fn builder(params: LayoutParameters) -> GeneratorBuilder {
        GeneratorBuilder::new(params)
    }

    pub fn generate(&self) -> Result<GeneratedDocument, LayoutError> {
        let started = Instant::now();
        let fingerprint = self.params.fingerprint();
        let debug = self.debug.as_deref();
        if let Some(logger) = debug {
            logger.log_params(
                &fingerprint,
                self.params.effective_card_count(),
                self.params.max_words_per_section(),
            );
        }

        let sections = self.params.sections();
        let mut rendered = Vec::new();
        if sections.contains(PdfSections::WRITER) {
            let template = self.section_template(WRITER_SECTION, config::WRITER_HEADER_TEXT, &fingerprint);
            let mut canvas = Canvas::new(self.page_size);
            let items_per_page = WriterStencil::new(&self.params, &template)
                .with_debug(debug)
                .render(&mut canvas)?;
            rendered.push(RenderedSection {
                name: WRITER_SECTION,
                document: canvas.finish(),
                items_per_page,
            });
        }
        if sections.contains(PdfSections::READER) {
            let template = self.section_template(READER_SECTION, config::READER_HEADER_TEXT, &fingerprint);
            let mut canvas = Canvas::new(self.page_size);
            let items_per_page = ReaderStencil::new(&self.params, &template)
                .with_debug(debug)
                .render(&mut canvas)?;
            rendered.push(RenderedSection {
                name: READER_SECTION,
                document: canvas.finish(),
                items_per_page,
            });
        }
        if let Some(manual) = &self.manual {
            let template = self.section_template(MANUAL_SECTION, config::MANUAL_HEADER_TEXT, &fingerprint);
            let mut canvas = Canvas::new(self.page_size);
            let items_per_page = ManualSection::new(manual, &template)
                .with_debug(debug)
                .render(&mut canvas);
            rendered.push(RenderedSection {
                name: MANUAL_SECTION,
                document: canvas.finish(),
                items_per_page,
            });
        }

        let mut metrics = DocumentMetrics::default();
        for section in &rendered {
            for (idx, page) in section.document.pages.iter().enumerate() {
                metrics.pages.push(PageMetrics {
                    page_number: metrics.pages.len() + 1,
                    section: section.name.to_string(),
                    command_count: page.commands.len(),
                    card_count: section.items_per_page.get(idx).copied().unwrap_or(0),
                });
            }
        }

        let document = join_documents(rendered.into_iter().map(|section| section.document).collect())?;
        metrics.total_render_ms = started.elapsed().as_secs_f64() * 1000.0;

        if let Some(logger) = debug {
            logger.emit_summary("generate");
            logger.flush();
        }
        Ok(GeneratedDocument {
            document,
            metrics,
            fingerprint,
            manual: self.manual.clone(),
        })
    }

    fn section_template(&self, name: &str, header: &str, fingerprint: &str) -> PageTemplate {
        let header = header.to_string();
        let footer_stem = format!("{} | layout {}", config::FOOTER_TEXT, fingerprint);
        let page_size = self.page_size;
        let margins = self.margins;
        PageTemplate::new(name, page_size, margins).set_on_page(move |surface, ctx| {
            if ctx.is_first_page() {
                draw_header(surface, &header, page_size, margins);
            }
            draw_footer(surface, &footer_stem, ctx, page_size, margins);
        })
    }
}

fn draw_header(surface: &mut dyn Surface, text: &str, page_size: Size, margins: Margins) {
    let rect = Rect::new(
        margins.left,
        Pt::ZERO,
        page_size.width - margins.left - margins.right,
        margins.top,
    );
    surface.set_fill_color(config::WORD_NR_COLOR);
    draw_text(
        surface,
        text,
        rect,
        Pt::from_f32(config::HEADER_FONT_SIZE),
        TextAlign::LEFT_CENTER,
    );
}

fn draw_footer(
    surface: &mut dyn Surface,
    stem: &str,
    ctx: &DocContext,
    page_size: Size,
    margins: Margins,
) {
    let rect = Rect::new(
        margins.left,
        page_size.height - margins.bottom,
        page_size.width - margins.left - margins.right,
        margins.bottom,
    );
    surface.set_fill_color(config::CELL_TEXT_COLOR);
    draw_text(
        surface,
        &format!("{stem} | {} page {}", ctx.section, ctx.page_number),
        rect,
        Pt::from_f32(config::FOOTER_FONT_SIZE),
        TextAlign::RIGHT_CENTER,
    );
}

/// Appends the pages of every document, in order, into one.
pub fn join_documents(documents: Vec<Document>) -> Result<Document, LayoutError> {
    let mut documents = documents.into_iter();
    let Some(mut joined) = documents.next() else {
        return Err(LayoutError::EmptyDocumentSet);
    };
    for document in documents {
        if document.page_size != joined.page_size {
            return Err(LayoutError::InconsistentPageSize);
        }
        joined.pages.extend(document.pages);
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manual::tests::sample_manual;
    use crate::params::{CardFinish, Encoding, LayoutConfig, StencilOptions};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn params(sections: PdfSections, copies: usize) -> LayoutParameters {
        LayoutParameters::new(
            LayoutConfig::new(Size::from_mm(85.0, 54.0), 5, 24).with_stencil(StencilOptions {
                card_split: 1,
                encoding: Encoding::Alphabet,
                copies,
                sections,
            }),
        )
        .expect("valid parameters")
    }

    fn generate(params: LayoutParameters) -> GeneratedDocument {
        Generator::builder(params)
            .build()
            .expect("build")
            .generate()
            .expect("generate")
    }

    #[test]
    fn writer_pages_come_before_the_reader() {
        let out = generate(params(PdfSections::WRITER | PdfSections::READER, 3));
        let sections: Vec<&str> = out
            .document
            .pages
            .iter()
            .flat_map(|page| page.meta_values("page.section"))
            .collect();
        assert_eq!(sections, vec!["writer", "writer", "reader"]);
        assert_eq!(out.metrics.section_pages(WRITER_SECTION), 2);
        assert_eq!(out.metrics.section_pages(READER_SECTION), 1);
        assert_eq!(out.metrics.pages.len(), out.document.pages.len());

        let writer_cards: usize = out
            .metrics
            .pages
            .iter()
            .filter(|page| page.section == WRITER_SECTION)
            .map(|page| page.card_count)
            .sum();
        assert_eq!(writer_cards, 15);
        let numbers: Vec<usize> = out.metrics.pages.iter().map(|page| page.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn header_on_first_page_and_footer_everywhere() {
        let out = generate(params(PdfSections::WRITER, 3));
        let fingerprint = out.fingerprint.clone();
        let first: Vec<&str> = out.document.pages[0].texts().collect();
        let second: Vec<&str> = out.document.pages[1].texts().collect();
        assert!(first.contains(&config::WRITER_HEADER_TEXT));
        assert!(!second.contains(&config::WRITER_HEADER_TEXT));
        for (idx, texts) in [first, second].iter().enumerate() {
            let footer = format!(
                "{} | layout {} | writer page {}",
                config::FOOTER_TEXT,
                fingerprint,
                idx + 1
            );
            assert!(texts.contains(&footer.as_str()), "page {}", idx + 1);
        }
    }

    #[test]
    fn only_selected_sections_are_rendered() {
        let out = generate(params(PdfSections::READER, 1));
        assert_eq!(out.document.pages.len(), 1);
        assert_eq!(out.metrics.section_pages(WRITER_SECTION), 0);
        assert!(out.document.pages[0].texts().any(|t| t == config::READER_HEADER_TEXT));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate(params(PdfSections::WRITER | PdfSections::READER, 2));
        let b = generate(params(PdfSections::WRITER | PdfSections::READER, 2));
        assert_eq!(a.document, b.document);
        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn finish_does_not_change_the_fingerprint_but_padding_does() {
        let base = params(PdfSections::WRITER, 1);
        let rounder = LayoutParameters::new(
            LayoutConfig::new(Size::from_mm(85.0, 54.0), 5, 24).with_finish(CardFinish {
                corner_radius: Pt::from_mm(6.0),
                padding: Pt::from_mm(1.5),
            }),
        )
        .unwrap();
        let padded = LayoutParameters::new(
            LayoutConfig::new(Size::from_mm(85.0, 54.0), 5, 24).with_finish(CardFinish {
                corner_radius: Pt::from_mm(3.0),
                padding: Pt::from_mm(4.0),
            }),
        )
        .unwrap();
        assert_eq!(generate(base.clone()).fingerprint, generate(rounder).fingerprint);
        assert_ne!(generate(base).fingerprint, generate(padded).fingerprint);
    }

    #[test]
    fn join_rejects_empty_and_mismatched_sets() {
        assert!(matches!(join_documents(Vec::new()), Err(LayoutError::EmptyDocumentSet)));
        let a4 = Canvas::new(Size::a4()).finish();
        let letter = Canvas::new(Size::new(Pt::from_f32(612.0), Pt::from_f32(792.0))).finish();
        assert!(matches!(
            join_documents(vec![a4.clone(), letter]),
            Err(LayoutError::InconsistentPageSize)
        ));
        let joined = join_documents(vec![a4.clone(), a4]).unwrap();
        assert_eq!(joined.pages.len(), 2);
    }

    #[test]
    fn card_larger_than_the_page_fails() {
        let params = LayoutParameters::new(LayoutConfig::new(Size::from_mm(180.0, 250.0), 2, 24)).unwrap();
        let err = Generator::builder(params)
            .page_size(Size::from_mm(148.0, 210.0))
            .build()
            .unwrap()
            .generate()
            .unwrap_err();
        assert!(matches!(err, LayoutError::CardDoesNotFit { .. }));
    }

    #[test]
    fn debug_trace_records_every_card() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let path = std::env::temp_dir().join(format!("seedstencil_generator_{nanos}.jsonl"));
        Generator::builder(params(PdfSections::WRITER | PdfSections::READER, 2))
            .debug_path(&path)
            .build()
            .unwrap()
            .generate()
            .unwrap();
        let text = std::fs::read_to_string(&path).expect("read trace");
        assert!(text.lines().next().unwrap().starts_with("{\"type\":\"layout.params\""));
        assert_eq!(text.matches("\"type\":\"layout.card_placed\"").count(), 10);
        assert_eq!(text.matches("\"type\":\"layout.reader_block\"").count(), 5);
        assert!(text.contains("\"layout.page_open\":3"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn manual_pages_follow_the_reader() {
        let out = Generator::builder(params(PdfSections::all(), 1))
            .manual(sample_manual(2))
            .build()
            .expect("build")
            .generate()
            .expect("generate");
        let sections: Vec<&str> = out
            .document
            .pages
            .iter()
            .flat_map(|page| page.meta_values("page.section"))
            .collect();
        assert_eq!(sections, vec!["writer", "reader", "manual", "manual"]);
        assert_eq!(out.metrics.section_pages(MANUAL_SECTION), 2);
        assert!(out.document.pages[2].texts().any(|t| t == config::MANUAL_HEADER_TEXT));
        assert!(!out.document.pages[3].texts().any(|t| t == config::MANUAL_HEADER_TEXT));

        let bytes = out.to_pdf().expect("pdf");
        let loaded = lopdf::Document::load_mem(&bytes).expect("load");
        let pages = loaded.get_pages();
        assert_eq!(pages.len(), 4);
        let content = |n: u32| loaded.get_page_content(pages[&n]).expect("content");
        let has = |haystack: &[u8], needle: &str| {
            haystack.windows(needle.len()).any(|window| window == needle.as_bytes())
        };
        assert!(has(&content(1), "writer page 1"));
        assert!(has(&content(2), "reader page 1"));
        assert!(has(&content(3), "(MANUAL 1) Tj"));
        assert!(has(&content(3), "manual page 1"));
        assert!(has(&content(4), "(MANUAL 2) Tj"));
        assert!(has(&content(4), "manual page 2"));
    }

    #[test]
    fn manual_section_needs_manual_bytes() {
        let err = Generator::builder(params(PdfSections::MANUAL, 1)).build().err();
        assert!(matches!(err, Some(LayoutError::MissingManual)));
        let err = Generator::builder(params(PdfSections::MANUAL, 1))
            .manual(b"%PDF-1.5 truncated".to_vec())
            .build()
            .err();
        assert!(matches!(err, Some(LayoutError::Pdf(_))));
    }

    #[test]
    fn manual_is_ignored_unless_selected() {
        let out = Generator::builder(params(PdfSections::WRITER, 1))
            .manual(sample_manual(3))
            .build()
            .expect("build")
            .generate()
            .expect("generate");
        assert_eq!(out.metrics.section_pages(MANUAL_SECTION), 0);
        assert!(out.manual.is_none());
        let loaded = lopdf::Document::load_mem(&out.to_pdf().expect("pdf")).expect("load");
        assert_eq!(loaded.get_pages().len(), out.document.pages.len());
    }
}
