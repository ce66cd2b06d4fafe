mod assets;
mod batch;
mod canvas;
mod catalog;
mod debug;
mod doc_template;
mod error;
mod flowable;
mod font;
mod frame;
mod page_template;
mod pdf;
mod pdfinspect;
mod report;
mod types;

pub use assets::{AssetStore, ImageAsset, VISUALIZATIONS_DIR};
pub use batch::{BatchEntry, generate_all, load_artifact};
pub use canvas::{Canvas, Command, Document, Page};
pub use catalog::{Catalog, Topic};
pub use doc_template::DocTemplate;
pub use error::DossierError;
pub use flowable::{
    BreakAfter, BreakBefore, BreakInside, Flowable, ImageFlowable, Pagination, Paragraph, Rule,
    Spacer, TextAlign, TextStyle,
};
pub use frame::{AddResult, Frame, FrameState};
pub use page_template::{DocContext, FrameSpec, PageTemplate};
pub use pdf::document_to_pdf;
pub use pdfinspect::{
    PdfInspectError, PdfInspectErrorCode, PdfInspectReport, inspect_pdf_bytes, inspect_pdf_path,
};
pub use report::{
    Composer, ComposerBuilder, ImageRef, ReportSpec, Section, VISUAL_SECTION_HEADING,
};
pub use types::{Color, Margins, Pt, Rect, Size};
