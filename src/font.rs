use crate::types::Pt;

/// Metrics for the built-in base-14 fonts the composer uses. Widths are in
/// 1000-unit em space, indexed from `first_char`, matching the Adobe AFM
/// data for the Helvetica family. No font programs are embedded; the PDF
/// writer references the viewer-provided Type1 fonts by name.
pub(crate) struct FontMetrics {
    first_char: u8,
    last_char: u8,
    widths: &'static [u16],
    ascent: i16,
    descent: i16,
    missing_width: u16,
}

impl FontMetrics {
    fn advance_for_char(&self, ch: char) -> u16 {
        let code = ch as u32;
        let first = self.first_char as u32;
        let last = self.last_char as u32;
        if code < first || code > last {
            return self.missing_width;
        }
        let idx = (code - first) as usize;
        self.widths.get(idx).copied().unwrap_or(self.missing_width)
    }

    pub(crate) fn measure_text_width(&self, font_size: Pt, text: &str) -> Pt {
        let mut total_units: i32 = 0;
        for ch in text.chars() {
            total_units = total_units.saturating_add(self.advance_for_char(ch) as i32);
        }
        if total_units <= 0 {
            return Pt::ZERO;
        }
        font_size.mul_ratio(total_units, 1000)
    }

    pub(crate) fn line_height(&self, font_size: Pt) -> Pt {
        let height_1000 = self.ascent as i32 - self.descent as i32;
        if height_1000 <= 0 {
            return font_size;
        }
        font_size.mul_ratio(height_1000, 1000)
    }
}

/// Resolve a logical font name to its metrics. Oblique variants share their
/// upright widths in the AFM data, so two tables cover the family.
pub(crate) fn metrics_for(name: &str) -> &'static FontMetrics {
    match name {
        "Helvetica-Bold" | "Helvetica-BoldOblique" => &HELVETICA_BOLD,
        _ => &HELVETICA,
    }
}

/// Canonical /BaseFont name for the PDF writer. Unknown names fall back to
/// Helvetica rather than emitting an unresolvable font reference.
pub(crate) fn base14_name(name: &str) -> &'static str {
    match name {
        "Helvetica-Bold" => "Helvetica-Bold",
        "Helvetica-Oblique" => "Helvetica-Oblique",
        "Helvetica-BoldOblique" => "Helvetica-BoldOblique",
        _ => "Helvetica",
    }
}

pub(crate) fn measure_text_width(name: &str, font_size: Pt, text: &str) -> Pt {
    metrics_for(name).measure_text_width(font_size, text)
}

static HELVETICA: FontMetrics = FontMetrics {
    first_char: 32,
    last_char: 126,
    widths: &HELVETICA_WIDTHS,
    ascent: 718,
    descent: -207,
    missing_width: 278,
};

static HELVETICA_BOLD: FontMetrics = FontMetrics {
    first_char: 32,
    last_char: 126,
    widths: &HELVETICA_BOLD_WIDTHS,
    ascent: 718,
    descent: -207,
    missing_width: 278,
};

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_and_bold_differ_where_afm_says_so() {
        let size = Pt::from_f32(10.0);
        let regular = measure_text_width("Helvetica", size, "i");
        let bold = measure_text_width("Helvetica-Bold", size, "i");
        assert_eq!(regular.to_milli_i64(), 2220);
        assert_eq!(bold.to_milli_i64(), 2780);
    }

    #[test]
    fn oblique_shares_upright_widths() {
        let size = Pt::from_f32(11.0);
        let upright = measure_text_width("Helvetica", size, "Quarterly");
        let oblique = measure_text_width("Helvetica-Oblique", size, "Quarterly");
        assert_eq!(upright, oblique);
    }

    #[test]
    fn out_of_range_chars_use_missing_width() {
        let size = Pt::from_f32(10.0);
        let w = measure_text_width("Helvetica", size, "\t");
        assert_eq!(w.to_milli_i64(), 2780);
    }

    #[test]
    fn line_height_spans_ascent_to_descent() {
        let lh = metrics_for("Helvetica").line_height(Pt::from_f32(10.0));
        assert_eq!(lh.to_milli_i64(), 9250);
    }

    #[test]
    fn unknown_names_fall_back_to_helvetica() {
        assert_eq!(base14_name("Times-Roman"), "Helvetica");
        let a = measure_text_width("Times-Roman", Pt::from_f32(10.0), "x");
        let b = measure_text_width("Helvetica", Pt::from_f32(10.0), "x");
        assert_eq!(a, b);
    }
}
