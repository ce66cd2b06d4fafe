use crate::canvas::{Canvas, Document};
use crate::debug::{DebugLogger, json_escape};
use crate::error::DossierError;
use crate::flowable::{BreakAfter, BreakBefore, Flowable};
use crate::frame::{AddResult, Frame};
use crate::page_template::{DocContext, PageTemplate};
use std::collections::VecDeque;
use std::sync::Arc;

/// Pagination engine: consumes a story of flowables and flows it into the
/// frames of successive pages, starting a new page whenever a block would
/// overflow the current one or forces a break.
pub struct DocTemplate {
    page_templates: Vec<PageTemplate>,
    story: Vec<Box<dyn Flowable>>,
    debug: Option<Arc<DebugLogger>>,
}

// Selection rule: page n uses templates[min(n - 1, len - 1)]; the last
// template repeats for the remainder of the document.
fn select_template(page_templates: &[PageTemplate], page_number: usize) -> &PageTemplate {
    let idx = page_number.saturating_sub(1).min(page_templates.len() - 1);
    &page_templates[idx]
}

fn begin_page(template: &PageTemplate, page_number: usize, canvas: &mut Canvas) -> Vec<Frame> {
    if let Some(callback) = template.on_page() {
        callback(canvas, &DocContext::new(page_number, &template.name));
    }
    template.instantiate_frames()
}

impl DocTemplate {
    pub fn new(page_templates: Vec<PageTemplate>) -> Self {
        Self {
            page_templates,
            story: Vec::new(),
            debug: None,
        }
    }

    pub(crate) fn with_debug(mut self, debug: Arc<DebugLogger>) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn add_flowable(&mut self, flowable: Box<dyn Flowable>) {
        self.story.push(flowable);
    }

    pub fn build(self) -> Result<Document, DossierError> {
        if self.page_templates.is_empty() {
            return Err(DossierError::MissingPageTemplate);
        }

        let debug = self.debug.clone();
        let log_page_break = |from_page: usize, reason: &str, flowable_name: &str| {
            let Some(logger) = debug.as_deref() else {
                return;
            };
            let json = format!(
                "{{\"type\":\"compose.page_break\",\"reason\":\"{}\",\"from_page\":{},\"to_page\":{},\"flowable\":\"{}\"}}",
                reason,
                from_page,
                from_page + 1,
                json_escape(flowable_name)
            );
            logger.log_json(&json);
            logger.increment("compose.page_break", 1);
        };

        let template = select_template(&self.page_templates, 1);
        let mut canvas = Canvas::new(template.page_size);
        let mut page_number = 1usize;
        let mut frames = begin_page(template, page_number, &mut canvas);
        let mut frame_index = 0usize;
        let mut placed_on_page = false;

        let mut story: VecDeque<Box<dyn Flowable>> = self.story.into();
        while let Some(flowable) = story.pop_front() {
            let mut current = flowable;
            let mut suppress_break_before = false;
            loop {
                let name = current.debug_name();
                let pagination = current.pagination();

                if !suppress_break_before
                    && matches!(pagination.break_before, BreakBefore::Page)
                    && (placed_on_page || frame_index > 0)
                {
                    log_page_break(page_number, "break_before_page", name);
                    canvas.show_page();
                    page_number += 1;
                    let template = select_template(&self.page_templates, page_number);
                    frames = begin_page(template, page_number, &mut canvas);
                    frame_index = 0;
                    placed_on_page = false;
                }

                if frame_index >= frames.len() {
                    log_page_break(page_number, "frame_exhausted", name);
                    canvas.show_page();
                    page_number += 1;
                    let template = select_template(&self.page_templates, page_number);
                    frames = begin_page(template, page_number, &mut canvas);
                    frame_index = 0;
                    placed_on_page = false;
                }

                if frames.is_empty() {
                    return Err(DossierError::MissingPageTemplate);
                }

                let is_last_frame = frame_index + 1 >= frames.len();
                let frame = &mut frames[frame_index];
                match frame.add(current, &mut canvas) {
                    AddResult::Placed => {
                        placed_on_page = true;
                        if matches!(pagination.break_after, BreakAfter::Page) {
                            log_page_break(page_number, "break_after_page", name);
                            canvas.show_page();
                            page_number += 1;
                            let template = select_template(&self.page_templates, page_number);
                            frames = begin_page(template, page_number, &mut canvas);
                            frame_index = 0;
                            placed_on_page = false;
                        }
                        break;
                    }
                    AddResult::Split(remaining) => {
                        placed_on_page = true;
                        log_page_break(page_number, "flowable_split", name);
                        suppress_break_before = true;
                        current = remaining;
                        frame_index += 1;
                    }
                    AddResult::Overflow(remaining) => {
                        if !placed_on_page && is_last_frame {
                            let rect = frames[frame_index].rect();
                            let size = remaining.wrap(rect.width, rect.height);
                            return Err(DossierError::UnplaceableBlock(format!(
                                "{} {}x{}pt in {}x{}pt frame",
                                name,
                                size.width.to_f32(),
                                size.height.to_f32(),
                                rect.width.to_f32(),
                                rect.height.to_f32()
                            )));
                        }
                        log_page_break(page_number, "frame_overflow", name);
                        current = remaining;
                        frame_index += 1;
                    }
                }
            }
        }

        Ok(canvas.finish())
    }
}
