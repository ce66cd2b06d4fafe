use crate::canvas::Canvas;
use crate::font;
use crate::types::{Color, Pt, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakBefore {
    Auto,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakAfter {
    Auto,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakInside {
    Auto,
    Avoid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pagination {
    pub break_before: BreakBefore,
    pub break_after: BreakAfter,
    pub break_inside: BreakInside,
    pub orphans: usize,
    pub widows: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            break_before: BreakBefore::Auto,
            break_after: BreakAfter::Auto,
            break_inside: BreakInside::Auto,
            orphans: 1,
            widows: 1,
        }
    }
}

impl Pagination {
    pub fn before_page() -> Self {
        Self {
            break_before: BreakBefore::Page,
            ..Self::default()
        }
    }

    pub fn keep_together() -> Self {
        Self {
            break_inside: BreakInside::Avoid,
            ..Self::default()
        }
    }

    fn resolved_orphans(self) -> usize {
        self.orphans.max(1)
    }

    fn resolved_widows(self) -> usize {
        self.widows.max(1)
    }
}

pub trait Flowable: FlowableClone + Send + Sync {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size;
    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)>;
    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, avail_height: Pt);

    fn pagination(&self) -> Pagination {
        Pagination::default()
    }

    fn debug_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub trait FlowableClone {
    fn clone_box(&self) -> Box<dyn Flowable>;
}

impl<T> FlowableClone for T
where
    T: 'static + Flowable + Clone,
{
    fn clone_box(&self) -> Box<dyn Flowable> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Flowable> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone)]
pub struct TextStyle {
    pub font_name: String,
    pub font_size: Pt,
    pub line_height: Pt,
    pub line_height_is_auto: bool,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_name: "Helvetica".to_string(),
            font_size: Pt::from_f32(12.0),
            line_height: Pt::ZERO,
            line_height_is_auto: true,
            color: Color::BLACK,
        }
    }
}

impl TextStyle {
    pub fn new(font_name: impl Into<String>, font_size: Pt) -> Self {
        Self {
            font_name: font_name.into(),
            font_size,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_line_height(mut self, line_height: Pt) -> Self {
        self.line_height = line_height;
        self.line_height_is_auto = false;
        self
    }
}

#[derive(Debug, Clone)]
struct LineLayout {
    text: String,
    width: Pt,
}

/// Wrapped body text. Lines are the unit of soft pagination: a paragraph may
/// split between wrapped lines but a single line never splits.
#[derive(Clone)]
pub struct Paragraph {
    text: String,
    style: TextStyle,
    align: TextAlign,
    pagination: Pagination,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
            align: TextAlign::Left,
            pagination: Pagination::default(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    fn measure(&self, text: &str) -> Pt {
        font::measure_text_width(&self.style.font_name, self.style.font_size, text)
    }

    fn effective_line_height(&self) -> Pt {
        if self.style.line_height_is_auto {
            return font::metrics_for(&self.style.font_name).line_height(self.style.font_size);
        }
        self.style.line_height
    }

    fn layout_lines(&self, avail_width: Pt) -> Vec<LineLayout> {
        let max_width = avail_width.max(Pt::from_f32(1.0));
        let space_width = self.measure(" ");
        let mut lines: Vec<String> = Vec::new();
        for segment in self.text.split('\n') {
            if segment.is_empty() {
                lines.push(String::new());
                continue;
            }
            let mut current = String::new();
            let mut current_width = Pt::ZERO;
            for word in segment.split_whitespace() {
                let word_width = self.measure(word);
                if current.is_empty() {
                    // An overlong word still occupies a single line; it is
                    // never broken mid-word.
                    current.push_str(word);
                    current_width = word_width;
                } else {
                    let next_width = current_width + space_width + word_width;
                    if next_width <= max_width {
                        current.push(' ');
                        current.push_str(word);
                        current_width = next_width;
                    } else {
                        lines.push(std::mem::take(&mut current));
                        current.push_str(word);
                        current_width = word_width;
                    }
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }
        if lines.is_empty() {
            lines.push(String::new());
        }

        lines
            .into_iter()
            .map(|line| {
                let width = if line.is_empty() {
                    Pt::ZERO
                } else {
                    self.measure(&line)
                };
                LineLayout { text: line, width }
            })
            .collect()
    }

    fn from_lines(&self, lines: &[LineLayout], continuation: bool) -> Paragraph {
        let text = lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let pagination = if continuation {
            Pagination {
                break_before: BreakBefore::Auto,
                ..self.pagination
            }
        } else {
            Pagination {
                break_before: BreakBefore::Auto,
                break_after: BreakAfter::Auto,
                ..self.pagination
            }
        };
        Paragraph {
            text,
            style: self.style.clone(),
            align: self.align,
            pagination,
        }
    }
}

impl Flowable for Paragraph {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        let lines = self.layout_lines(avail_width);
        let line_height = self.effective_line_height();
        let height = line_height * (lines.len() as i32);
        let width = lines
            .iter()
            .fold(Pt::ZERO, |acc, line| acc.max(line.width))
            .min(avail_width);
        Size { width, height }
    }

    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        let lines = self.layout_lines(avail_width);
        let lh = self.effective_line_height().to_milli_i64();
        let ah = avail_height.to_milli_i64();
        if lh <= 0 || ah <= 0 {
            return None;
        }
        let max_lines = (ah / lh) as usize;
        let total_lines = lines.len();
        if max_lines == 0 || max_lines >= total_lines {
            return None;
        }

        let orphans = self.pagination.resolved_orphans();
        let widows = self.pagination.resolved_widows();
        let mut split_at = max_lines;
        if split_at < orphans {
            // Too few lines would stay behind; move the whole paragraph.
            return None;
        }
        if total_lines - split_at < widows {
            let adjusted = total_lines.saturating_sub(widows);
            if adjusted < orphans {
                return None;
            }
            split_at = adjusted.min(max_lines);
        }
        if split_at == 0 || split_at >= total_lines {
            return None;
        }

        let first = self.from_lines(&lines[..split_at], false);
        let second = self.from_lines(&lines[split_at..], true);
        Some((Box::new(first), Box::new(second)))
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let lines = self.layout_lines(avail_width);
        canvas.set_font_name(&self.style.font_name);
        canvas.set_font_size(self.style.font_size);
        canvas.set_fill_color(self.style.color);

        let line_height = self.effective_line_height();
        let mut cursor_y = y;
        for line in &lines {
            let offset = match self.align {
                TextAlign::Left => Pt::ZERO,
                TextAlign::Center => (avail_width - line.width).max(Pt::ZERO).mul_ratio(1, 2),
                TextAlign::Right => (avail_width - line.width).max(Pt::ZERO),
            };
            if !line.text.is_empty() {
                canvas.draw_string(x + offset, cursor_y, line.text.clone());
            }
            cursor_y += line_height;
        }
    }

    fn pagination(&self) -> Pagination {
        self.pagination
    }

    fn debug_name(&self) -> &'static str {
        "Paragraph"
    }
}

#[derive(Clone)]
pub struct Spacer {
    height: Pt,
    pagination: Pagination,
}

impl Spacer {
    pub fn new(height: f32) -> Self {
        Self::new_pt(Pt::from_f32(height))
    }

    pub fn new_pt(height: Pt) -> Self {
        Self {
            height,
            pagination: Pagination::default(),
        }
    }
}

impl Flowable for Spacer {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: self.height.max(Pt::ZERO),
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, _canvas: &mut Canvas, _x: Pt, _y: Pt, _avail_width: Pt, _avail_height: Pt) {}

    fn pagination(&self) -> Pagination {
        self.pagination
    }

    fn debug_name(&self) -> &'static str {
        "Spacer"
    }
}

/// Full-width horizontal rule, stroked at the middle of its band.
#[derive(Clone)]
pub struct Rule {
    thickness: Pt,
    color: Color,
}

impl Rule {
    pub fn new(thickness: f32) -> Self {
        Self {
            thickness: Pt::from_f32(thickness),
            color: Color::BLACK,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Flowable for Rule {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: self.thickness.max(Pt::from_f32(1.0)),
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let mid = y + self.thickness.max(Pt::from_f32(1.0)).mul_ratio(1, 2);
        canvas.set_stroke_color(self.color);
        canvas.set_line_width(self.thickness);
        canvas.move_to(x, mid);
        canvas.line_to(x + avail_width, mid);
        canvas.stroke();
    }

    fn debug_name(&self) -> &'static str {
        "Rule"
    }
}

/// A placed raster figure. Images never split: one that does not fit moves
/// wholesale to the next page.
#[derive(Clone)]
pub struct ImageFlowable {
    pub width: Pt,
    pub height: Pt,
    pub resource_id: String,
    indent: Pt,
    pagination: Pagination,
}

impl ImageFlowable {
    pub fn new_pt(width: Pt, height: Pt, resource_id: impl Into<String>) -> Self {
        Self {
            width,
            height,
            resource_id: resource_id.into(),
            indent: Pt::ZERO,
            pagination: Pagination::default(),
        }
    }

    pub fn with_indent(mut self, indent: Pt) -> Self {
        self.indent = indent.max(Pt::ZERO);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

impl Flowable for ImageFlowable {
    fn wrap(&self, _avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, _avail_width: Pt, _avail_height: Pt) {
        canvas.draw_image(
            x + self.indent,
            y,
            self.width,
            self.height,
            self.resource_id.clone(),
        );
    }

    fn pagination(&self) -> Pagination {
        self.pagination
    }

    fn debug_name(&self) -> &'static str {
        "Image"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, Command};
    use crate::types::Size as PageSize;

    fn body_style() -> TextStyle {
        TextStyle::new("Helvetica", Pt::from_f32(11.0)).with_line_height(Pt::from_mm(7.0))
    }

    #[test]
    fn paragraph_wraps_greedily_at_word_boundaries() {
        let para = Paragraph::new("alpha beta gamma delta").with_style(body_style());
        // Wide enough for roughly two words per line.
        let avail = Pt::from_f32(70.0);
        let size = para.wrap(avail, Pt::from_f32(1000.0));
        let line_height = Pt::from_mm(7.0);
        assert_eq!(size.height, line_height * 2);
    }

    #[test]
    fn paragraph_split_respects_line_boundaries() {
        let para = Paragraph::new("one two three four five six seven eight").with_style(body_style());
        let avail = Pt::from_f32(60.0);
        let full = para.wrap(avail, Pt::from_f32(1000.0));
        let line_height = Pt::from_mm(7.0);
        let total_lines = (full.height.to_milli_i64() / line_height.to_milli_i64()) as i32;
        assert!(total_lines > 2);

        // Room for exactly two lines.
        let (first, second) = para
            .split(avail, line_height * 2)
            .expect("paragraph should split");
        let first_size = first.wrap(avail, Pt::from_f32(1000.0));
        assert_eq!(first_size.height, line_height * 2);
        let second_size = second.wrap(avail, Pt::from_f32(1000.0));
        assert_eq!(
            second_size.height,
            line_height * (total_lines - 2)
        );
    }

    #[test]
    fn paragraph_refuses_split_below_orphan_minimum() {
        let para = Paragraph::new("one two three four five six seven eight")
            .with_style(body_style())
            .with_pagination(Pagination {
                orphans: 3,
                widows: 1,
                ..Pagination::default()
            });
        let avail = Pt::from_f32(60.0);
        let line_height = Pt::from_mm(7.0);
        // Only two lines fit, below the orphan minimum: move the whole block.
        assert!(para.split(avail, line_height * 2).is_none());
    }

    #[test]
    fn single_line_never_splits() {
        let para = Paragraph::new("short").with_style(body_style());
        assert!(
            para.split(Pt::from_f32(500.0), Pt::from_f32(3.0))
                .is_none()
        );
    }

    #[test]
    fn centered_lines_are_offset_by_half_the_slack() {
        let para = Paragraph::new("mid")
            .with_style(body_style())
            .with_align(TextAlign::Center);
        let avail = Pt::from_f32(100.0);
        let mut canvas = Canvas::new(PageSize::a4());
        para.draw(&mut canvas, Pt::ZERO, Pt::ZERO, avail, Pt::from_f32(50.0));
        let doc = canvas.finish();
        let (x, width) = doc.pages[0]
            .commands
            .iter()
            .find_map(|cmd| match cmd {
                Command::DrawString { x, text, .. } => Some((
                    *x,
                    font::measure_text_width("Helvetica", Pt::from_f32(11.0), text),
                )),
                _ => None,
            })
            .expect("expected a DrawString");
        assert_eq!(x, (avail - width).mul_ratio(1, 2));
    }

    #[test]
    fn rule_strokes_across_the_available_width() {
        let rule = Rule::new(0.57);
        let mut canvas = Canvas::new(PageSize::a4());
        rule.draw(
            &mut canvas,
            Pt::from_f32(28.0),
            Pt::ZERO,
            Pt::from_f32(539.0),
            Pt::from_f32(10.0),
        );
        let doc = canvas.finish();
        let has_stroke = doc.pages[0]
            .commands
            .iter()
            .any(|cmd| matches!(cmd, Command::Stroke));
        let line_end = doc.pages[0].commands.iter().find_map(|cmd| match cmd {
            Command::LineTo { x, .. } => Some(*x),
            _ => None,
        });
        assert!(has_stroke);
        assert_eq!(line_end, Some(Pt::from_f32(28.0) + Pt::from_f32(539.0)));
    }

    #[test]
    fn image_reports_fixed_size_and_never_splits() {
        let image = ImageFlowable::new_pt(
            Pt::from_f32(510.0),
            Pt::from_f32(300.0),
            "visualizations/sales_trend_line.png",
        );
        let size = image.wrap(Pt::from_f32(538.0), Pt::from_f32(100.0));
        assert_eq!(size.height, Pt::from_f32(300.0));
        assert!(
            image
                .split(Pt::from_f32(538.0), Pt::from_f32(100.0))
                .is_none()
        );
    }
}
