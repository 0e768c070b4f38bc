mod canvas;
mod card_plan;
pub mod config;
mod debug;
mod doc_context;
mod error;
mod generator;
mod manual;
mod metrics;
mod page_template;
mod params;
pub mod pdf;
mod placement;
mod reader;
mod text;
mod types;
mod writer;

pub use canvas::{Canvas, Command, Document, Page, Pen, Surface};
pub use card_plan::{CardPlan, SectionPlan};
pub use debug::DebugLogger;
pub use doc_context::DocContext;
pub use error::LayoutError;
pub use generator::{GeneratedDocument, Generator, GeneratorBuilder, join_documents};
pub use manual::{MANUAL_SECTION, ManualPdf, ManualSection};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use page_template::PageTemplate;
pub use params::{CardFinish, Encoding, LayoutConfig, LayoutParameters, PdfSections, StencilOptions};
pub use placement::{BoxBlock, GridPlacer, Placement, global_card_index, pack_text_boxes};
pub use reader::{READER_SECTION, ReaderStencil};
pub use text::{Align, TextAlign, draw_text, fit_font_size};
pub use types::{Color, Margins, Point, Pt, Rect, Size};
pub use writer::{WRITER_SECTION, WriterStencil};
