use lopdf::{
    Dictionary, Document as LoDocument, Object as LoObject, ObjectId as LoObjectId,
    Stream as LoStream, dictionary,
};

use crate::canvas::{Command, Document, Page};
use crate::error::LayoutError;
use crate::manual::{MANUAL_SECTION, ManualPdf};
use crate::types::{Color, Pt};

// Must not clash with font names already used by imported manual pages.
const FONT_RESOURCE: &str = "SsHelv";

pub(crate) fn lopdf_err(err: lopdf::Error) -> LayoutError {
    LayoutError::Pdf(err.to_string())
}

/// Serializes a recorded document. Every page shares one base-14
/// Helvetica font resource. Pages recorded for the manual section are
/// stamped onto the pages of `manual`, which must supply exactly as many.
pub fn document_to_pdf(
    document: &Document,
    title: &str,
    manual: Option<&ManualPdf>,
) -> Result<Vec<u8>, LayoutError> {
    let overlays = document.pages.iter().filter(|page| is_manual_page(page)).count();
    let supplied = manual.map_or(0, ManualPdf::page_count);
    if overlays != supplied {
        return Err(LayoutError::Pdf(format!(
            "document has {overlays} manual pages, manual supplies {supplied}"
        )));
    }

    let mut doc = LoDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_RESOURCE => font_id },
    });
    let mut imported = match manual {
        Some(manual) => manual.import_pages(&mut doc, pages_id)?,
        None => Vec::new(),
    }
    .into_iter();

    let page_height = document.page_size.height;
    let media_box: Vec<LoObject> = vec![
        0.into(),
        0.into(),
        document.page_size.width.to_f32().into(),
        page_height.to_f32().into(),
    ];

    let mut kids: Vec<LoObject> = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let content = page_content(&page.commands, page_height);
        if is_manual_page(page) {
            let Some(page_id) = imported.next() else {
                return Err(LayoutError::Pdf("manual ran out of pages".to_string()));
            };
            stamp_page(&mut doc, page_id, font_id, content)?;
            kids.push(page_id.into());
            continue;
        }
        let content_id = doc.add_object(LoStream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => media_box.clone(),
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        LoObject::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => LoObject::string_literal(title),
        "Producer" => LoObject::string_literal(concat!("seedstencil ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    if manual.is_some() {
        doc.prune_objects();
    }
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| lopdf_err(lopdf::Error::from(e)))?;
    Ok(out)
}

fn is_manual_page(page: &Page) -> bool {
    page.meta_values("page.section").any(|section| section == MANUAL_SECTION)
}

/// Appends the recorded decoration to an imported page, inside its own
/// graphics state, and adds the Helvetica resource it draws with.
fn stamp_page(
    doc: &mut LoDocument,
    page_id: LoObjectId,
    font_id: LoObjectId,
    content: String,
) -> Result<(), LayoutError> {
    let page = doc.get_dictionary(page_id).map_err(lopdf_err)?;
    let mut resources = resolve_dict(doc, page.get(b"Resources").ok());
    let mut fonts = resolve_dict(doc, resources.get(b"Font").ok());
    fonts.set(FONT_RESOURCE, font_id);
    resources.set("Font", fonts);
    doc.get_object_mut(page_id)
        .and_then(LoObject::as_dict_mut)
        .map_err(lopdf_err)?
        .set("Resources", resources);
    doc.add_page_contents(page_id, format!("q\n{content}Q\n").into_bytes())
        .map_err(lopdf_err)
}

// Shared dictionaries are copied so other pages keep their resources.
fn resolve_dict(doc: &LoDocument, object: Option<&LoObject>) -> Dictionary {
    match object {
        Some(LoObject::Dictionary(dict)) => dict.clone(),
        Some(LoObject::Reference(id)) => doc.get_dictionary(*id).cloned().unwrap_or_default(),
        _ => Dictionary::new(),
    }
}

/// Content stream for one page. Commands use a top-left origin with y
/// growing downwards; every y is flipped against the page height.
fn page_content(commands: &[Command], page_height: Pt) -> String {
    let mut stream = ContentStream::new(page_height);
    for cmd in commands {
        stream.apply(cmd);
    }
    stream.out
}

struct ContentStream {
    out: String,
    page_height: Pt,
    // Text size is not part of the PDF graphics state until a Tf is
    // written, so it is tracked alongside q/Q here.
    font_size: Pt,
    saved_font_sizes: Vec<Pt>,
}

impl ContentStream {
    fn new(page_height: Pt) -> Self {
        Self {
            out: String::new(),
            page_height,
            font_size: Pt::from_f32(12.0),
            saved_font_sizes: Vec::new(),
        }
    }

    fn op(&mut self, operands: &[String], operator: &str) {
        for operand in operands {
            self.out.push_str(operand);
            self.out.push(' ');
        }
        self.out.push_str(operator);
        self.out.push('\n');
    }

    fn x(&self, x: Pt) -> String {
        fmt_pt(x)
    }

    fn y(&self, y: Pt) -> String {
        fmt_pt(self.page_height - y)
    }

    fn apply(&mut self, cmd: &Command) {
        match cmd {
            Command::SaveState => {
                self.saved_font_sizes.push(self.font_size);
                self.op(&[], "q");
            }
            Command::RestoreState => {
                if let Some(size) = self.saved_font_sizes.pop() {
                    self.font_size = size;
                }
                self.op(&[], "Q");
            }
            Command::Translate(dx, dy) => {
                self.op(&["1 0 0 1".to_string(), fmt_pt(*dx), fmt_pt(-*dy)], "cm");
            }
            Command::Meta { .. } => {}
            Command::SetFillColor(color) => self.op(&color_operands(*color), "rg"),
            Command::SetStrokeColor(color) => self.op(&color_operands(*color), "RG"),
            Command::SetLineWidth(width) => self.op(&[fmt_pt(*width)], "w"),
            Command::SetDash { pattern, phase } => {
                let dashes = pattern.iter().map(|len| fmt_pt(*len)).collect::<Vec<_>>();
                self.op(&[format!("[{}]", dashes.join(" ")), fmt_pt(*phase)], "d");
            }
            Command::SetFontSize(size) => self.font_size = *size,
            Command::MoveTo { x, y } => self.op(&[self.x(*x), self.y(*y)], "m"),
            Command::LineTo { x, y } => self.op(&[self.x(*x), self.y(*y)], "l"),
            Command::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                let operands = [
                    self.x(*x1),
                    self.y(*y1),
                    self.x(*x2),
                    self.y(*y2),
                    self.x(*x),
                    self.y(*y),
                ];
                self.op(&operands, "c");
            }
            Command::ClosePath => self.op(&[], "h"),
            Command::Fill => self.op(&[], "f"),
            Command::Stroke => self.op(&[], "S"),
            Command::DrawString { x, y, text } => {
                // Td positions the baseline; one em below the box top.
                let baseline = *y + self.font_size;
                self.op(&[], "BT");
                self.op(&[format!("/{FONT_RESOURCE}"), fmt_pt(self.font_size)], "Tf");
                self.op(&[self.x(*x), self.y(baseline)], "Td");
                self.op(&[format!("({})", escape_pdf_string(text))], "Tj");
                self.op(&[], "ET");
            }
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                let bottom = *y + *height;
                self.op(&[self.x(*x), self.y(bottom), fmt_pt(*width), fmt_pt(*height)], "re");
            }
        }
    }
}

fn escape_pdf_string(input: &str) -> String {
    input
        .chars()
        .map(|ch| match ch {
            '\\' | '(' | ')' => format!("\\{ch}"),
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            // Helvetica is WinAnsi-encoded; stencil text is ASCII.
            c if !c.is_ascii() => "?".to_string(),
            c => c.to_string(),
        })
        .collect()
}

fn color_operands(color: Color) -> [String; 3] {
    [color.r, color.g, color.b].map(|channel| {
        let channel = if channel.is_nan() { 0.0 } else { channel.clamp(0.0, 1.0) };
        format_milli((channel * 1000.0).round() as i64)
    })
}

/// Decimal with at most three fraction digits and no trailing zeros.
fn format_milli(milli: i64) -> String {
    let sign = if milli < 0 { "-" } else { "" };
    let (whole, frac) = (milli.unsigned_abs() / 1000, milli.unsigned_abs() % 1000);
    if frac == 0 {
        return if whole == 0 { "0".to_string() } else { format!("{sign}{whole}") };
    }
    let digits = format!("{frac:03}");
    format!("{sign}{whole}.{}", digits.trim_end_matches('0'))
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}
