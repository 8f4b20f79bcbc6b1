// fitagent — Minimal PDF writer (text only, base-14 Type1 fonts)
//
// Layout is in millimetres with the origin at the top-left of the page, the
// way the cursor moves while writing. Coordinates are flipped into PDF user
// space (points, origin bottom-left) when text is emitted.

use super::RenderError;
use std::io::Write;

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;
const PT_PER_MM: f64 = 72.0 / 25.4;
const CELL_PADDING_MM: f64 = 1.0;

// Glyph widths (1/1000 em) for bytes 32..=126, from the Adobe AFM files.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Width used for Latin-1 glyphs outside the ASCII table.
const FALLBACK_WIDTH: u16 = 556;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    fn base_font(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn glyph_width(&self, byte: u8) -> u16 {
        let table = match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match byte {
            32..=126 => table[(byte - 32) as usize],
            _ => FALLBACK_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Encode `text` as WinAnsi bytes. Printable ASCII and the Latin-1
/// supplement map one to one; anything else is rejected.
pub fn encode(text: &str) -> Result<Vec<u8>, RenderError> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => Ok(c as u8),
            other => Err(RenderError::Unencodable(other)),
        })
        .collect()
}

/// Like [`encode`], substituting `?` for unencodable characters.
pub fn encode_lossy(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Escape bytes for a PDF literal string, keeping the output ASCII.
fn escape_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 8);
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{:03o}", b)),
        }
    }
    out
}

pub struct PdfWriter {
    pages: Vec<String>,
    max_pages: usize,
    title: String,
    font: Font,
    font_size: f64,
    left_margin: f64,
    top_margin: f64,
    right_margin: f64,
    break_margin: f64,
    x: f64,
    y: f64,
}

impl PdfWriter {
    pub fn new(max_pages: usize) -> Self {
        Self {
            pages: Vec::new(),
            max_pages,
            title: String::new(),
            font: Font::Helvetica,
            font_size: 12.0,
            left_margin: 10.0,
            top_margin: 10.0,
            right_margin: 10.0,
            break_margin: 20.0,
            x: 10.0,
            y: 10.0,
        }
    }

    pub fn set_margins(&mut self, left: f64, top: f64, right: f64) {
        self.left_margin = left;
        self.top_margin = top;
        self.right_margin = right;
        if self.pages.is_empty() {
            self.x = left;
            self.y = top;
        }
    }

    /// Content below `A4_HEIGHT_MM - margin` goes to a new page.
    pub fn set_auto_page_break(&mut self, margin: f64) {
        self.break_margin = margin;
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_font(&mut self, font: Font, size_pt: f64) {
        self.font = font;
        self.font_size = size_pt;
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn add_page(&mut self) -> Result<(), RenderError> {
        if self.pages.len() >= self.max_pages {
            return Err(RenderError::PageLimit(self.max_pages));
        }
        self.pages.push(String::new());
        self.x = self.left_margin;
        self.y = self.top_margin;
        Ok(())
    }

    /// Write `text` in a box of width `w` (0 = up to the right margin) and
    /// height `h`, then move to the start of the next line.
    pub fn cell(&mut self, w: f64, h: f64, text: &str, align: Align) -> Result<(), RenderError> {
        let bytes = encode(text)?;
        self.ensure_room(h)?;

        let w = if w <= 0.0 { self.line_right() - self.x } else { w };
        let text_x = match align {
            Align::Left => self.x + CELL_PADDING_MM,
            Align::Center => self.x + ((w - self.text_width(&bytes)) / 2.0).max(0.0),
        };
        if !bytes.is_empty() {
            self.emit(text_x, h, &bytes);
        }
        self.ln(h);
        Ok(())
    }

    pub fn ln(&mut self, h: f64) {
        self.x = self.left_margin;
        self.y += h;
    }

    /// Flow `text` from the current position, wrapping at the right margin.
    /// Words are kept whole where they fit on a line; longer runs are broken
    /// by character.
    pub fn write(&mut self, h: f64, text: &str) -> Result<(), RenderError> {
        let bytes = encode(text)?;
        let mut rest: &[u8] = &bytes;

        while !rest.is_empty() {
            let at_line_start = self.x <= self.left_margin + f64::EPSILON;
            let avail = self.line_right() - self.x;
            let (take, skip) = self.fit(rest, avail, at_line_start);

            if take == 0 && skip == 0 {
                self.ln(h);
                continue;
            }
            if take == 0 && at_line_start {
                rest = &rest[skip..];
                continue;
            }
            if take > 0 {
                self.ensure_room(h)?;
                let piece = &rest[..take];
                self.emit(self.x, h, piece);
                self.x += self.text_width(piece);
            }
            rest = &rest[take + skip..];
            if !rest.is_empty() {
                self.ln(h);
            }
        }
        Ok(())
    }

    /// Serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        if self.pages.is_empty() {
            self.add_page()?;
        }

        let mut out: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();
        let page_count = self.pages.len();
        // 1 catalog, 2 page tree, 3-4 fonts, 5 info, then page + contents pairs.
        let page_obj = |i: usize| 6 + 2 * i;

        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        offsets.push(out.len());
        write!(out, "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n")?;

        offsets.push(out.len());
        let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", page_obj(i))).collect();
        write!(
            out,
            "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
            kids.join(" "),
            page_count
        )?;

        for (num, font) in [(3, Font::Helvetica), (4, Font::HelveticaBold)] {
            offsets.push(out.len());
            write!(
                out,
                "{} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>\nendobj\n",
                num,
                font.base_font()
            )?;
        }

        offsets.push(out.len());
        write!(
            out,
            "5 0 obj\n<< /Title ({}) /Producer (fitagent {}) /CreationDate ({}) >>\nendobj\n",
            escape_literal(&encode_lossy(&self.title)),
            crate::VERSION,
            chrono::Utc::now().format("D:%Y%m%d%H%M%SZ")
        )?;

        let media_w = A4_WIDTH_MM * PT_PER_MM;
        let media_h = A4_HEIGHT_MM * PT_PER_MM;
        for (i, content) in self.pages.iter().enumerate() {
            let num = page_obj(i);

            offsets.push(out.len());
            write!(
                out,
                "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>\nendobj\n",
                num,
                media_w,
                media_h,
                num + 1
            )?;

            offsets.push(out.len());
            write!(
                out,
                "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
                num + 1,
                content.len(),
                content
            )?;
        }

        let xref_pos = out.len();
        write!(out, "xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1)?;
        for offset in &offsets {
            write!(out, "{:010} 00000 n \n", offset)?;
        }
        write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_pos
        )?;

        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn line_right(&self) -> f64 {
        A4_WIDTH_MM - self.right_margin
    }

    fn text_width(&self, bytes: &[u8]) -> f64 {
        bytes
            .iter()
            .map(|&b| self.char_width(b))
            .sum()
    }

    fn char_width(&self, byte: u8) -> f64 {
        self.font.glyph_width(byte) as f64 * self.font_size / 1000.0 / PT_PER_MM
    }

    /// How many bytes of `rest` go on the current line, and how many
    /// separator bytes to drop after them. `(0, 0)` asks for a line break.
    fn fit(&self, rest: &[u8], avail: f64, at_line_start: bool) -> (usize, usize) {
        let mut width = 0.0;
        let mut last_space = None;

        for (i, &b) in rest.iter().enumerate() {
            if b == b' ' {
                last_space = Some(i);
            }
            width += self.char_width(b);
            if width > avail {
                return match last_space {
                    Some(space) => (space, 1),
                    None if !at_line_start => (0, 0),
                    None => (i.max(1), 0),
                };
            }
        }
        (rest.len(), 0)
    }

    fn ensure_room(&mut self, h: f64) -> Result<(), RenderError> {
        if self.pages.is_empty() {
            return self.add_page();
        }
        if self.y + h > A4_HEIGHT_MM - self.break_margin {
            let x = self.x;
            self.add_page()?;
            self.x = x;
        }
        Ok(())
    }

    fn emit(&mut self, x: f64, h: f64, bytes: &[u8]) {
        let font_mm = self.font_size / PT_PER_MM;
        let baseline = self.y + 0.5 * h + 0.3 * font_mm;
        let op = format!(
            "BT /{} {:.2} Tf {:.2} {:.2} Td ({}) Tj ET\n",
            self.font.resource(),
            self.font_size,
            x * PT_PER_MM,
            (A4_HEIGHT_MM - baseline) * PT_PER_MM,
            escape_literal(bytes)
        );
        if let Some(page) = self.pages.last_mut() {
            page.push_str(&op);
        }
    }
}
