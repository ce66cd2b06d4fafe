use crate::canvas::{Command, Document, Page};
use crate::font;
use crate::types::{Color, Pt, Size};
use fixed::types::I32F32;
use image::GenericImageView;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub(crate) struct PdfOptions {
    pub document_title: Option<String>,
}

const PDF_HEADER: &[u8] = b"%PDF-1.7\n";
const PDF_CATALOG_ID: usize = 1;
const PDF_PAGES_ID: usize = 2;
const PDF_RESOURCES_ID: usize = 3;

struct StreamFont {
    resource: String,
    object_id: usize,
    base_name: &'static str,
}

struct PdfStream<'a, W: Write> {
    writer: &'a mut W,
    options: &'a PdfOptions,
    page_size: Size,
    offset: usize,
    offsets: Vec<usize>,
    next_id: usize,
    page_ids: Vec<usize>,
    fonts: BTreeMap<String, StreamFont>,
    next_font_resource: usize,
    image_name_map: HashMap<String, Option<String>>,
    image_entries: Vec<(String, usize)>,
    next_image_index: usize,
}

impl<'a, W: Write> PdfStream<'a, W> {
    fn new(writer: &'a mut W, options: &'a PdfOptions, page_size: Size) -> io::Result<Self> {
        let mut stream = Self {
            writer,
            options,
            page_size,
            offset: 0,
            offsets: vec![0; 16],
            next_id: PDF_RESOURCES_ID + 1,
            page_ids: Vec::new(),
            fonts: BTreeMap::new(),
            next_font_resource: 1,
            image_name_map: HashMap::new(),
            image_entries: Vec::new(),
            next_image_index: 1,
        };
        write_bytes(stream.writer, PDF_HEADER, &mut stream.offset)?;
        Ok(stream)
    }

    fn alloc_ids(&mut self, count: usize) -> usize {
        let start = self.next_id;
        self.next_id += count;
        if self.offsets.len() < self.next_id {
            self.offsets.resize(self.next_id, 0);
        }
        start
    }

    fn write_object(&mut self, obj_id: usize, body: &str) -> io::Result<()> {
        if let Some(slot) = self.offsets.get_mut(obj_id) {
            *slot = self.offset;
        }
        write_str(self.writer, &format!("{} 0 obj\n", obj_id), &mut self.offset)?;
        write_bytes(self.writer, body.as_bytes(), &mut self.offset)?;
        write_bytes(self.writer, b"\nendobj\n", &mut self.offset)?;
        Ok(())
    }

    fn add_page(&mut self, page: &Page) -> io::Result<()> {
        let content = self.render_commands(&page.commands)?;
        let content_id = self.alloc_ids(1);
        self.write_object(
            content_id,
            &format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ),
        )?;
        let page_id = self.alloc_ids(1);
        self.write_object(
            page_id,
            &format!(
                "<< /Type /Page /Parent {} 0 R /Contents {} 0 R /Resources {} 0 R >>",
                PDF_PAGES_ID, content_id, PDF_RESOURCES_ID
            ),
        )?;
        self.page_ids.push(page_id);
        Ok(())
    }

    fn ensure_font(&mut self, name: &str) -> (String, usize) {
        if let Some(font) = self.fonts.get(name) {
            return (font.resource.clone(), font.object_id);
        }
        let resource = format!("F{}", self.next_font_resource);
        self.next_font_resource += 1;
        let object_id = self.alloc_ids(1);
        self.fonts.insert(
            name.to_string(),
            StreamFont {
                resource: resource.clone(),
                object_id,
                base_name: font::base14_name(name),
            },
        );
        (resource, object_id)
    }

    fn ensure_image(&mut self, source: &str) -> io::Result<Option<String>> {
        if let Some(entry) = self.image_name_map.get(source) {
            return Ok(entry.clone());
        }
        let Some(image) = load_image(source) else {
            self.image_name_map.insert(source.to_string(), None);
            return Ok(None);
        };

        let smask_id = match image.alpha.as_ref() {
            Some(alpha) => {
                let id = self.alloc_ids(1);
                self.write_object(id, &smask_object(alpha))?;
                Some(id)
            }
            None => None,
        };
        let obj_id = self.alloc_ids(1);
        self.write_object(obj_id, &image_object(&image, smask_id))?;

        let name = format!("Im{}", self.next_image_index);
        self.next_image_index += 1;
        self.image_entries.push((name.clone(), obj_id));
        self.image_name_map
            .insert(source.to_string(), Some(name.clone()));
        Ok(Some(name))
    }

    fn render_commands(&mut self, commands: &[Command]) -> io::Result<String> {
        let page_height = self.page_size.height;
        let mut out = String::new();
        let mut current_font_name = "Helvetica".to_string();
        let mut current_font_size = Pt::from_f32(12.0);

        for cmd in commands {
            match cmd {
                Command::SetFillColor(color) => {
                    out.push_str(&format!(
                        "{} {} {} rg\n",
                        fmt(color.r),
                        fmt(color.g),
                        fmt(color.b)
                    ));
                }
                Command::SetStrokeColor(color) => {
                    out.push_str(&format!(
                        "{} {} {} RG\n",
                        fmt(color.r),
                        fmt(color.g),
                        fmt(color.b)
                    ));
                }
                Command::SetLineWidth(width) => {
                    out.push_str(&format!("{} w\n", fmt_pt(*width)));
                }
                Command::SetFontName(name) => {
                    current_font_name = name.clone();
                }
                Command::SetFontSize(size) => {
                    current_font_size = *size;
                }
                Command::MoveTo { x, y } => {
                    out.push_str(&format!("{} {} m\n", fmt_pt(*x), fmt_pt(page_height - *y)));
                }
                Command::LineTo { x, y } => {
                    out.push_str(&format!("{} {} l\n", fmt_pt(*x), fmt_pt(page_height - *y)));
                }
                Command::Stroke => out.push_str("S\n"),
                Command::DrawString { x, y, text } => {
                    let (resource, _) = self.ensure_font(&current_font_name);
                    out.push_str("BT\n");
                    out.push_str(&format!("/{} {} Tf\n", resource, fmt_pt(current_font_size)));
                    out.push_str(&format!(
                        "{} {} Td\n",
                        fmt_pt(*x),
                        fmt_pt(page_height - *y - current_font_size)
                    ));
                    out.push_str(&format!("({}) Tj\n", encode_pdf_string(text)));
                    out.push_str("ET\n");
                }
                Command::DrawImage {
                    x,
                    y,
                    width,
                    height,
                    resource_id,
                } => {
                    if let Some(name) = self.ensure_image(resource_id)? {
                        let draw_y = page_height - *y - *height;
                        out.push_str("q\n");
                        out.push_str(&format!(
                            "{} 0 0 {} {} {} cm\n",
                            fmt_pt(*width),
                            fmt_pt(*height),
                            fmt_pt(*x),
                            fmt_pt(draw_y)
                        ));
                        out.push_str(&format!("/{} Do\n", name));
                        out.push_str("Q\n");
                    }
                }
            }
        }
        Ok(out)
    }

    fn finish(&mut self) -> io::Result<usize> {
        let fonts = std::mem::take(&mut self.fonts);
        for font in fonts.values() {
            self.write_object(
                font.object_id,
                &format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_name
                ),
            )?;
        }

        let mut resources = String::from("<< /Font << ");
        for font in fonts.values() {
            resources.push_str(&format!("/{} {} 0 R ", font.resource, font.object_id));
        }
        resources.push_str(">>");
        if !self.image_entries.is_empty() {
            resources.push_str(" /XObject << ");
            for (name, obj_id) in &self.image_entries {
                resources.push_str(&format!("/{} {} 0 R ", name, obj_id));
            }
            resources.push_str(">>");
        }
        resources.push_str(" >>");
        self.write_object(PDF_RESOURCES_ID, &resources)?;

        let kids = self
            .page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        self.write_object(
            PDF_PAGES_ID,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 {} {}] >>",
                kids,
                self.page_ids.len(),
                fmt_pt(self.page_size.width),
                fmt_pt(self.page_size.height)
            ),
        )?;

        let mut info_id = None;
        if let Some(title) = self.options.document_title.clone() {
            let id = self.alloc_ids(1);
            self.write_object(id, &format!("<< /Title ({}) >>", encode_pdf_string(&title)))?;
            info_id = Some(id);
        }

        let mut catalog = format!("<< /Type /Catalog /Pages {} 0 R", PDF_PAGES_ID);
        if info_id.is_some() {
            catalog.push_str(" /ViewerPreferences << /DisplayDocTitle true >>");
        }
        catalog.push_str(" >>");
        self.write_object(PDF_CATALOG_ID, &catalog)?;

        let total_objects = self.next_id - 1;
        let xref_start = self.offset;
        write_str(
            self.writer,
            &format!("xref\n0 {}\n", total_objects + 1),
            &mut self.offset,
        )?;
        write_bytes(self.writer, b"0000000000 65535 f \n", &mut self.offset)?;
        for id in 1..=total_objects {
            let obj_offset = self.offsets.get(id).copied().unwrap_or(0);
            write_str(
                self.writer,
                &format!("{:010} 00000 n \n", obj_offset),
                &mut self.offset,
            )?;
        }
        let mut trailer = format!(
            "trailer\n<< /Size {} /Root {} 0 R",
            total_objects + 1,
            PDF_CATALOG_ID
        );
        if let Some(id) = info_id {
            trailer.push_str(&format!(" /Info {} 0 R", id));
        }
        trailer.push_str(&format!(" >>\nstartxref\n{}\n%%EOF", xref_start));
        write_str(self.writer, &trailer, &mut self.offset)?;
        Ok(self.offset)
    }
}

pub fn document_to_pdf(document: &Document) -> io::Result<Vec<u8>> {
    document_to_pdf_with_options(document, &PdfOptions::default())
}

pub(crate) fn document_to_pdf_with_options(
    document: &Document,
    options: &PdfOptions,
) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    document_to_pdf_to_writer(document, options, &mut out)?;
    Ok(out)
}

pub(crate) fn document_to_pdf_to_writer<W: Write>(
    document: &Document,
    options: &PdfOptions,
    writer: &mut W,
) -> io::Result<usize> {
    let mut stream = PdfStream::new(writer, options, document.page_size)?;
    for page in &document.pages {
        stream.add_page(page)?;
    }
    stream.finish()
}

fn write_bytes<W: Write>(writer: &mut W, data: &[u8], offset: &mut usize) -> io::Result<()> {
    writer.write_all(data)?;
    *offset += data.len();
    Ok(())
}

fn write_str<W: Write>(writer: &mut W, data: &str, offset: &mut usize) -> io::Result<()> {
    write_bytes(writer, data.as_bytes(), offset)
}

/// Escape a string for a PDF literal. Content is expected to be printable
/// ASCII by the time it reaches the writer; anything else degrades to '?'
/// rather than corrupting the stream.
fn encode_pdf_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ' '..='~' => out.push(ch),
            _ => out.push('?'),
        }
    }
    out
}

fn fmt(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = I32F32::from_num(value);
    let scaled = (fixed * I32F32::from_num(1000)).round();
    format_milli(scaled.to_num())
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        format!("{}{}", sign, int_part)
    } else {
        let mut s = format!("{}{}.{:03}", sign, int_part, frac_part);
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        s
    }
}

struct ImageData {
    width: u32,
    height: u32,
    color_space: &'static str,
    bits_per_component: u8,
    dct: bool,
    data: Vec<u8>,
    alpha: Option<AlphaData>,
}

struct AlphaData {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

fn load_image(source: &str) -> Option<ImageData> {
    let bytes = std::fs::read(Path::new(source)).ok()?;
    decode_image_bytes(&bytes)
}

fn decode_image_bytes(data: &[u8]) -> Option<ImageData> {
    let format = image::guess_format(data).ok();
    let decoded = image::load_from_memory(data).ok()?;
    let (width, height) = decoded.dimensions();

    // JPEG passes through as DCTDecode; everything else is expanded to raw
    // RGB samples with a separate gray soft mask when alpha is present.
    if matches!(format, Some(image::ImageFormat::Jpeg)) {
        let color_space = match decoded.color() {
            image::ColorType::L8 | image::ColorType::La8 => "/DeviceGray",
            _ => "/DeviceRGB",
        };
        return Some(ImageData {
            width,
            height,
            color_space,
            bits_per_component: 8,
            dct: true,
            data: data.to_vec(),
            alpha: None,
        });
    }

    let rgba = decoded.to_rgba8();
    let mut rgb = Vec::with_capacity((width as usize) * (height as usize) * 3);
    let mut alpha = Vec::with_capacity((width as usize) * (height as usize));
    let mut has_alpha = false;
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        if a != 255 {
            has_alpha = true;
        }
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    Some(ImageData {
        width,
        height,
        color_space: "/DeviceRGB",
        bits_per_component: 8,
        dct: false,
        data: rgb,
        alpha: has_alpha.then_some(AlphaData {
            width,
            height,
            data: alpha,
        }),
    })
}

fn image_object(image: &ImageData, smask_id: Option<usize>) -> String {
    let stream_data = encode_stream_data(&image.data);
    let filter = if image.dct {
        "[/ASCIIHexDecode /DCTDecode]"
    } else {
        "/ASCIIHexDecode"
    };
    let smask = smask_id
        .map(|id| format!(" /SMask {} 0 R", id))
        .unwrap_or_default();
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent {} /Length {} /Filter {}{} >>\nstream\n{}\nendstream",
        image.width,
        image.height,
        image.color_space,
        image.bits_per_component,
        stream_data.len(),
        filter,
        smask,
        stream_data
    )
}

fn smask_object(alpha: &AlphaData) -> String {
    let stream_data = encode_stream_data(&alpha.data);
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceGray /BitsPerComponent 8 /Length {} /Filter /ASCIIHexDecode >>\nstream\n{}\nendstream",
        alpha.width,
        alpha.height,
        stream_data.len(),
        stream_data
    )
}

fn encode_stream_data(data: &[u8]) -> String {
    let mut hex = String::with_capacity(data.len() * 2 + data.len() / 32 + 1);
    for (idx, byte) in data.iter().enumerate() {
        if idx > 0 && idx % 64 == 0 {
            hex.push('\n');
        }
        hex.push_str(&format!("{:02x}", byte));
    }
    hex.push('>');
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::types::Size;

    fn count_token(haystack: &[u8], token: &[u8]) -> usize {
        if token.is_empty() || haystack.len() < token.len() {
            return 0;
        }
        haystack
            .windows(token.len())
            .filter(|window| *window == token)
            .count()
    }

    fn two_page_document() -> Document {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_font_name("Helvetica-Bold");
        canvas.set_font_size(Pt::from_f32(14.0));
        canvas.draw_string(Pt::from_f32(28.0), Pt::from_f32(70.0), "Project Summary");
        canvas.show_page();
        canvas.set_font_name("Helvetica-Bold");
        canvas.set_font_size(Pt::from_f32(14.0));
        canvas.draw_string(Pt::from_f32(28.0), Pt::from_f32(70.0), "Page two body");
        canvas.finish()
    }

    #[test]
    fn writer_emits_header_pages_and_xref() {
        let bytes = document_to_pdf(&two_page_document()).expect("pdf");
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.ends_with(b"%%EOF"));
        assert_eq!(count_token(&bytes, b"/Type /Page "), 2);
        assert_eq!(count_token(&bytes, b"/Count 2"), 1);
        assert_eq!(count_token(&bytes, b"startxref"), 1);
    }

    #[test]
    fn text_lands_in_the_content_stream_with_the_font_resource() {
        let bytes = document_to_pdf(&two_page_document()).expect("pdf");
        assert_eq!(count_token(&bytes, b"(Project Summary) Tj"), 1);
        assert_eq!(count_token(&bytes, b"/BaseFont /Helvetica-Bold"), 1);
    }

    #[test]
    fn fonts_are_shared_across_pages() {
        let bytes = document_to_pdf(&two_page_document()).expect("pdf");
        // One font object, referenced from both content streams.
        assert_eq!(count_token(&bytes, b"/Type /Font"), 1);
        assert_eq!(count_token(&bytes, b"/F1 14 Tf"), 2);
    }

    #[test]
    fn string_escaping_protects_delimiters_and_non_ascii() {
        assert_eq!(encode_pdf_string("a(b)c"), "a\\(b\\)c");
        assert_eq!(encode_pdf_string("back\\slash"), "back\\\\slash");
        assert_eq!(encode_pdf_string("caf\u{e9}"), "caf?");
    }

    #[test]
    fn milli_formatting_trims_trailing_zeros() {
        assert_eq!(format_milli(0), "0");
        assert_eq!(format_milli(19845), "19.845");
        assert_eq!(format_milli(28000), "28");
        assert_eq!(format_milli(-500), "-0.5");
    }

    #[test]
    fn missing_image_source_is_skipped_not_fatal() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.draw_image(
            Pt::from_f32(42.0),
            Pt::from_f32(100.0),
            Pt::from_f32(510.0),
            Pt::from_f32(300.0),
            "/nonexistent/figure.png",
        );
        let bytes = document_to_pdf(&canvas.finish()).expect("pdf");
        assert_eq!(count_token(&bytes, b"/XObject"), 0);
        assert_eq!(count_token(&bytes, b" Do"), 0);
    }

    #[test]
    fn png_image_embeds_as_an_xobject() {
        let dir = std::env::temp_dir().join(format!(
            "dossier_pdf_img_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("figure.png");
        image::RgbImage::from_pixel(6, 4, image::Rgb([200, 10, 10]))
            .save(&path)
            .expect("save png");

        let mut canvas = Canvas::new(Size::a4());
        canvas.draw_image(
            Pt::from_f32(42.0),
            Pt::from_f32(100.0),
            Pt::from_f32(510.0),
            Pt::from_f32(340.0),
            path.to_string_lossy().as_ref(),
        );
        let bytes = document_to_pdf(&canvas.finish()).expect("pdf");
        assert_eq!(count_token(&bytes, b"/Subtype /Image"), 1);
        assert_eq!(count_token(&bytes, b"/Width 6"), 1);
        assert_eq!(count_token(&bytes, b"/Im1 Do"), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn identical_documents_serialize_to_identical_bytes() {
        let doc = two_page_document();
        let a = document_to_pdf(&doc).expect("pdf a");
        let b = document_to_pdf(&doc).expect("pdf b");
        assert_eq!(a, b);
    }

    #[test]
    fn title_option_emits_info_dictionary() {
        let options = PdfOptions {
            document_title: Some("Sales & Revenue Performance".to_string()),
        };
        let bytes =
            document_to_pdf_with_options(&two_page_document(), &options).expect("pdf");
        assert_eq!(count_token(&bytes, b"/Title (Sales & Revenue Performance)"), 1);
        assert_eq!(count_token(&bytes, b"/Info"), 1);
    }
}
