//! PDF serialization of laid-out pages
//!
//! Uses `pdf-writer` directly: one Type 1 Helvetica font shared by every
//! page, one DCT image XObject per embedded photo, one content stream per
//! page. Layout coordinates (top-left origin) are flipped here.

use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect as PdfRect, Ref, Str};

use super::images::PreparedImage;
use super::layout::{LayoutItem, PageLayout, Rect, PAGE_HEIGHT, PAGE_WIDTH};

const FONT_NAME: Name<'static> = Name(b"F1");

/// Incrementally builds a PDF from page layouts
pub struct PdfBuilder {
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    page_tree_id: Ref,
    font_id: Ref,
    page_ids: Vec<Ref>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            pdf: Pdf::new(),
            next_id: 1,
            catalog_id: Ref::new(1),
            page_tree_id: Ref::new(1),
            font_id: Ref::new(1),
            page_ids: Vec::new(),
        };
        builder.catalog_id = builder.alloc();
        builder.page_tree_id = builder.alloc();
        builder.font_id = builder.alloc();
        builder
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of pages written so far
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Write the pages of one moment
    ///
    /// `images[i]` is the prepared form of photo `i`; layout items that
    /// point at a `None` entry are ignored.
    pub fn add_pages(&mut self, pages: &[PageLayout], images: &[Option<PreparedImage>]) {
        let mut image_ids: Vec<Option<Ref>> = vec![None; images.len()];

        for page in pages {
            let page_id = self.alloc();
            let content_id = self.alloc();
            let mut content = Content::new();
            let mut used: Vec<(String, Ref)> = Vec::new();

            for item in &page.items {
                match item {
                    LayoutItem::Text { x, y, size, text } => {
                        draw_line_of_text(&mut content, *x, *y, *size, text);
                    }
                    LayoutItem::TextBox {
                        rect,
                        size,
                        line_height,
                        lines,
                    } => {
                        content.save_state();
                        let flipped = flip(rect);
                        content.rect(flipped.x, flipped.y, flipped.width, flipped.height);
                        content.clip_nonzero();
                        content.end_path();
                        for (i, line) in lines.iter().enumerate() {
                            let top = rect.y + i as f32 * line_height;
                            draw_line_of_text(&mut content, rect.x, top, *size, line);
                        }
                        content.restore_state();
                    }
                    LayoutItem::Track { x, y, width } => {
                        content.set_stroke_gray(0.6);
                        content.set_line_width(2.0);
                        content.move_to(*x, PAGE_HEIGHT - y);
                        content.line_to(x + width, PAGE_HEIGHT - y);
                        content.stroke();
                    }
                    LayoutItem::Marker(rect) => {
                        let flipped = flip(rect);
                        content.set_fill_rgb(0.2, 0.4, 0.9);
                        content.rect(flipped.x, flipped.y, flipped.width, flipped.height);
                        content.fill_nonzero();
                        content.set_fill_gray(0.0);
                    }
                    LayoutItem::Image { index, rect } => {
                        let Some(Some(prepared)) = images.get(*index) else {
                            continue;
                        };
                        let id = match image_ids[*index] {
                            Some(id) => id,
                            None => {
                                let id = self.write_image(prepared);
                                image_ids[*index] = Some(id);
                                id
                            }
                        };

                        let name = format!("Im{}", index);
                        let flipped = flip(rect);
                        content.save_state();
                        content.transform([
                            flipped.width,
                            0.0,
                            0.0,
                            flipped.height,
                            flipped.x,
                            flipped.y,
                        ]);
                        content.x_object(Name(name.as_bytes()));
                        content.restore_state();

                        if !used.iter().any(|(n, _)| *n == name) {
                            used.push((name, id));
                        }
                    }
                }
            }

            self.pdf.stream(content_id, &content.finish());

            let mut pdf_page = self.pdf.page(page_id);
            pdf_page.media_box(PdfRect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
            pdf_page.parent(self.page_tree_id);
            pdf_page.contents(content_id);
            let mut resources = pdf_page.resources();
            resources.fonts().pair(FONT_NAME, self.font_id);
            if !used.is_empty() {
                let mut x_objects = resources.x_objects();
                for (name, id) in &used {
                    x_objects.pair(Name(name.as_bytes()), *id);
                }
                x_objects.finish();
            }
            resources.finish();
            pdf_page.finish();

            self.page_ids.push(page_id);
        }
    }

    fn write_image(&mut self, prepared: &PreparedImage) -> Ref {
        let id = self.alloc();
        let mut image = self.pdf.image_xobject(id, &prepared.jpeg);
        image.filter(Filter::DctDecode);
        image.width(prepared.size.width as i32);
        image.height(prepared.size.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        image.finish();
        id
    }

    /// Write the catalog, page tree and font, and return the file bytes
    pub fn finish(mut self) -> Vec<u8> {
        self.pdf.catalog(self.catalog_id).pages(self.page_tree_id);
        self.pdf
            .pages(self.page_tree_id)
            .kids(self.page_ids.iter().copied())
            .count(self.page_ids.len() as i32);
        self.pdf
            .type1_font(self.font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        self.pdf.finish()
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_line_of_text(content: &mut Content, x: f32, top: f32, size: f32, text: &str) {
    let encoded = encode_win_ansi(text);
    content.begin_text();
    content.set_font(FONT_NAME, size);
    content.next_line(x, PAGE_HEIGHT - top - size);
    content.show(Str(&encoded));
    content.end_text();
}

/// Convert a top-left rect into PDF's bottom-left space
fn flip(rect: &Rect) -> Rect {
    Rect {
        x: rect.x,
        y: PAGE_HEIGHT - rect.y - rect.height,
        width: rect.width,
        height: rect.height,
    }
}

/// Encode text for the standard Helvetica font
///
/// Latin-1 printable characters map directly, a few typographic marks map
/// to their WinAnsi slots, everything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c as u8,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2026}' => 0x85,
            '\u{20AC}' => 0x80,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}
