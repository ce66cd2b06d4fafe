use crate::assets::AssetStore;
use crate::debug::{DebugLogger, json_escape};
use crate::doc_template::DocTemplate;
use crate::error::DossierError;
use crate::flowable::{
    ImageFlowable, Pagination, Paragraph, Rule, Spacer, TextAlign, TextStyle,
};
use crate::font;
use crate::page_template::PageTemplate;
use crate::pdf::{self, PdfOptions};
use crate::types::{Color, Margins, Pt, Rect, Size};
use crate::canvas::Document;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// One titled block of body text. Ordering of sections and of paragraphs
/// within a section is preserved exactly in the output.
#[derive(Debug, Clone)]
pub struct Section {
    pub heading: String,
    pub paragraphs: Vec<String>,
}

impl Section {
    pub fn new(heading: impl Into<String>, paragraphs: &[&str]) -> Self {
        Self {
            heading: heading.into(),
            paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Logical reference to a figure, resolved against the asset store only at
/// render time.
#[derive(Debug, Clone)]
pub struct ImageRef {
    pub name: String,
}

impl ImageRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Declarative description of one report. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ReportSpec {
    pub title: String,
    pub sections: Vec<Section>,
    pub images: Vec<ImageRef>,
}

impl ReportSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_image(mut self, name: impl Into<String>) -> Self {
        self.images.push(ImageRef::new(name));
        self
    }
}

fn mm(value: f32) -> Pt {
    Pt::from_mm(value)
}

// Band of page furniture above the body: the header line plus its gap.
fn header_band() -> Pt {
    mm(15.0)
}

// Footer baseline distance from the bottom page edge, independent of body
// content height.
fn footer_rise() -> Pt {
    mm(15.0)
}

fn brand_navy() -> Color {
    Color::from_rgb8(0, 51, 102)
}

fn header_gray() -> Color {
    Color::from_rgb8(100, 100, 100)
}

fn footer_gray() -> Color {
    Color::from_rgb8(150, 150, 150)
}

fn warning_red() -> Color {
    Color::from_rgb8(200, 0, 0)
}

pub const VISUAL_SECTION_HEADING: &str = "Visual Data Analysis & Insights";

/// Lays report specs out across pages and serializes them to PDF. Content
/// anomalies (missing figures, non-encodable text) degrade in-document; only
/// I/O failures surface to the caller.
pub struct Composer {
    page_size: Size,
    margins: Margins,
    header_text: Option<String>,
    store: AssetStore,
    debug: Option<Arc<DebugLogger>>,
}

pub struct ComposerBuilder {
    page_size: Size,
    margins: Margins,
    header_text: Option<String>,
    asset_root: PathBuf,
    debug_log: Option<PathBuf>,
}

impl ComposerBuilder {
    pub fn new() -> Self {
        Self {
            page_size: Size::a4(),
            margins: Margins {
                top: mm(10.0),
                right: mm(10.0),
                bottom: mm(15.0),
                left: mm(10.0),
            },
            header_text: None,
            asset_root: PathBuf::from("."),
            debug_log: None,
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

    /// Fixed running-header line. Defaults to the report title.
    pub fn header_text(mut self, text: impl Into<String>) -> Self {
        self.header_text = Some(text.into());
        self
    }

    pub fn asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_log = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Composer, DossierError> {
        let body_width = self.page_size.width - self.margins.left - self.margins.right;
        let body_height = self.page_size.height
            - self.margins.top
            - header_band()
            - self.margins.bottom;
        if body_width <= Pt::ZERO {
            return Err(DossierError::InvalidConfiguration(
                "horizontal margins leave no body width".to_string(),
            ));
        }
        if body_height <= Pt::ZERO {
            return Err(DossierError::InvalidConfiguration(
                "vertical margins leave no body height".to_string(),
            ));
        }
        let debug = match self.debug_log {
            Some(path) => Some(Arc::new(DebugLogger::new(path)?)),
            None => None,
        };
        Ok(Composer {
            page_size: self.page_size,
            margins: self.margins,
            header_text: self.header_text,
            store: AssetStore::new(self.asset_root),
            debug,
        })
    }
}

impl Default for ComposerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn builder() -> ComposerBuilder {
        ComposerBuilder::new()
    }

    pub fn asset_store(&self) -> &AssetStore {
        &self.store
    }

    fn body_frame(&self) -> Rect {
        Rect {
            x: self.margins.left,
            y: self.margins.top + header_band(),
            width: self.page_size.width - self.margins.left - self.margins.right,
            height: self.page_size.height
                - self.margins.top
                - header_band()
                - self.margins.bottom,
        }
    }

    fn page_template(&self, header_text: String) -> PageTemplate {
        let page_size = self.page_size;
        let margin_top = self.margins.top;
        let margin_right = self.margins.right;
        PageTemplate::new("report", page_size)
            .with_frame(self.body_frame())
            .set_on_page(move |canvas, ctx| {
                let header_size = Pt::from_f32(10.0);
                let width =
                    font::measure_text_width("Helvetica-Bold", header_size, &header_text);
                canvas.set_font_name("Helvetica-Bold");
                canvas.set_font_size(header_size);
                canvas.set_fill_color(header_gray());
                canvas.draw_string(
                    page_size.width - margin_right - width,
                    margin_top,
                    header_text.clone(),
                );

                let footer_size = Pt::from_f32(8.0);
                let footer_text = format!("Page {}", ctx.page_number);
                let width =
                    font::measure_text_width("Helvetica-Oblique", footer_size, &footer_text);
                canvas.set_font_name("Helvetica-Oblique");
                canvas.set_font_size(footer_size);
                canvas.set_fill_color(footer_gray());
                canvas.draw_string(
                    (page_size.width - width).mul_ratio(1, 2),
                    page_size.height - footer_rise(),
                    footer_text,
                );
            })
    }

    /// Drop everything outside printable ASCII. Loss is logged, never fatal.
    fn sanitize(&self, input: &str) -> String {
        let output: String = input
            .chars()
            .filter(|c| c.is_ascii() && (*c == '\n' || !c.is_ascii_control()))
            .collect();
        let dropped = input.chars().count() - output.chars().count();
        if dropped > 0 {
            if let Some(logger) = self.debug.as_deref() {
                logger.log_json(&format!(
                    "{{\"type\":\"compose.encoding_loss\",\"dropped\":{},\"sample\":\"{}\"}}",
                    dropped,
                    json_escape(&truncate_preview(input, 80))
                ));
                logger.increment("compose.encoding_loss", dropped as u64);
            }
        }
        output
    }

    /// Lay the report out into a page list. Pure in its inputs except for
    /// probing the asset store; missing figures degrade to in-document
    /// warnings.
    pub fn compose(&self, spec: &ReportSpec) -> Result<Document, DossierError> {
        let header_text = self.sanitize(
            self.header_text
                .as_deref()
                .unwrap_or(spec.title.as_str()),
        );
        let mut doc = DocTemplate::new(vec![self.page_template(header_text)]);
        if let Some(debug) = self.debug.clone() {
            doc = doc.with_debug(debug);
        }

        let title_style = TextStyle::new("Helvetica-Bold", Pt::from_f32(24.0))
            .with_color(brand_navy())
            .with_line_height(mm(20.0));
        doc.add_flowable(Box::new(
            Paragraph::new(self.sanitize(&spec.title))
                .with_style(title_style)
                .with_align(TextAlign::Center),
        ));
        doc.add_flowable(Box::new(Spacer::new_pt(mm(5.0))));
        doc.add_flowable(Box::new(Rule::new(0.57)));
        doc.add_flowable(Box::new(Spacer::new_pt(mm(10.0))));

        let heading_style = TextStyle::new("Helvetica-Bold", Pt::from_f32(14.0))
            .with_color(brand_navy())
            .with_line_height(mm(10.0));
        let body_style =
            TextStyle::new("Helvetica", Pt::from_f32(11.0)).with_line_height(mm(7.0));
        for section in &spec.sections {
            doc.add_flowable(Box::new(
                Paragraph::new(self.sanitize(&section.heading))
                    .with_style(heading_style.clone())
                    .with_pagination(Pagination::keep_together()),
            ));
            doc.add_flowable(Box::new(Spacer::new_pt(mm(2.0))));
            for paragraph in &section.paragraphs {
                doc.add_flowable(Box::new(
                    Paragraph::new(self.sanitize(paragraph)).with_style(body_style.clone()),
                ));
                doc.add_flowable(Box::new(Spacer::new_pt(mm(3.0))));
            }
        }

        if !spec.images.is_empty() {
            let visual_style = TextStyle::new("Helvetica-Bold", Pt::from_f32(16.0))
                .with_color(brand_navy())
                .with_line_height(mm(10.0));
            doc.add_flowable(Box::new(
                Paragraph::new(VISUAL_SECTION_HEADING)
                    .with_style(visual_style)
                    .with_pagination(Pagination::before_page()),
            ));
            doc.add_flowable(Box::new(Spacer::new_pt(mm(10.0))));

            let warning_style = TextStyle::new("Helvetica-Oblique", Pt::from_f32(10.0))
                .with_color(warning_red())
                .with_line_height(mm(10.0));
            for image_ref in &spec.images {
                match self.store.resolve(&image_ref.name) {
                    Some(asset) => {
                        let width = mm(180.0);
                        let height = width.mul_ratio(asset.height as i32, asset.width as i32);
                        doc.add_flowable(Box::new(
                            ImageFlowable::new_pt(
                                width,
                                height,
                                asset.path.to_string_lossy().into_owned(),
                            )
                            .with_indent(mm(5.0)),
                        ));
                        doc.add_flowable(Box::new(Spacer::new_pt(mm(10.0))));
                    }
                    None => {
                        if let Some(logger) = self.debug.as_deref() {
                            logger.log_json(&format!(
                                "{{\"type\":\"compose.missing_asset\",\"asset\":\"{}\"}}",
                                json_escape(&image_ref.name)
                            ));
                            logger.increment("compose.missing_asset", 1);
                        }
                        doc.add_flowable(Box::new(
                            Paragraph::new(format!(
                                "[Note: {} is not available in the asset store]",
                                self.sanitize(&image_ref.name)
                            ))
                            .with_style(warning_style.clone()),
                        ));
                        doc.add_flowable(Box::new(Spacer::new_pt(mm(5.0))));
                    }
                }
            }
        }

        doc.build()
    }

    pub fn compose_to_writer<W: Write>(
        &self,
        spec: &ReportSpec,
        writer: &mut W,
    ) -> Result<usize, DossierError> {
        let document = self.compose(spec)?;
        let options = PdfOptions {
            document_title: Some(self.sanitize(&spec.title)),
        };
        let bytes_written = pdf::document_to_pdf_to_writer(&document, &options, writer)?;
        if let Some(logger) = self.debug.as_deref() {
            logger.emit_summary("compose_to_writer");
        }
        Ok(bytes_written)
    }

    pub fn compose_to_file(
        &self,
        spec: &ReportSpec,
        path: impl AsRef<std::path::Path>,
    ) -> Result<usize, DossierError> {
        let mut file = std::fs::File::create(path)?;
        self.compose_to_writer(spec, &mut file)
    }
}

fn truncate_preview(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let mut out = String::new();
    for (idx, ch) in input.chars().enumerate() {
        if idx >= max_chars {
            break;
        }
        out.push(ch);
    }
    out.push_str("...");
    out
}
