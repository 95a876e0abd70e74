//! Page layout for exported moments
//!
//! Layout works in points on a US Letter page with the origin at the top
//! left and y growing downwards. The PDF writer flips coordinates when it
//! serializes. Nothing here touches image bytes; callers pass the decoded
//! size of each photo (or `None` when it could not be decoded).

use tracing::warn;

use crate::models::Moment;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 50.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Lowest y an image may reach
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - MARGIN;

pub const DATE_FONT_SIZE: f32 = 14.0;
pub const DATE_Y: f32 = MARGIN;

pub const DESCRIPTION_FONT_SIZE: f32 = 12.0;
pub const DESCRIPTION_LINE_HEIGHT: f32 = 15.0;
pub const DESCRIPTION_BOX: Rect = Rect {
    x: MARGIN,
    y: 80.0,
    width: CONTENT_WIDTH,
    height: 150.0,
};

pub const TRACK_START: f32 = MARGIN;
pub const TRACK_WIDTH: f32 = CONTENT_WIDTH;
pub const TRACK_Y: f32 = 250.0;
pub const MARKER_SIZE: f32 = 10.0;

pub const IMAGES_TOP: f32 = 280.0;
pub const IMAGE_SPACING: f32 = 10.0;

/// Average Helvetica glyph width as a fraction of the font size
const AVERAGE_GLYPH_WIDTH: f32 = 0.5;

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Pixel dimensions of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// One drawing instruction on a page
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutItem {
    /// Single line of text; `y` is the top of the line
    Text {
        x: f32,
        y: f32,
        size: f32,
        text: String,
    },
    /// Pre-wrapped lines clipped to `rect`
    TextBox {
        rect: Rect,
        size: f32,
        line_height: f32,
        lines: Vec<String>,
    },
    /// Horizontal emotion track
    Track { x: f32, y: f32, width: f32 },
    /// Filled emotion marker
    Marker(Rect),
    /// Photo `index` of the moment, drawn into `rect`
    Image { index: usize, rect: Rect },
}

/// Everything drawn on one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub items: Vec<LayoutItem>,
}

impl PageLayout {
    /// Images placed on this page
    pub fn images(&self) -> impl Iterator<Item = (usize, &Rect)> {
        self.items.iter().filter_map(|item| match item {
            LayoutItem::Image { index, rect } => Some((*index, rect)),
            _ => None,
        })
    }
}

/// Lay out one moment, starting on a fresh page
///
/// `image_sizes[i]` is the decoded size of `moment.images[i]`; `None`
/// entries are skipped without moving the cursor.
pub fn layout_moment(moment: &Moment, image_sizes: &[Option<ImageSize>]) -> Vec<PageLayout> {
    let mut pages = Vec::new();
    let mut page = PageLayout::default();

    page.items.push(LayoutItem::Text {
        x: MARGIN,
        y: DATE_Y,
        size: DATE_FONT_SIZE,
        text: moment.formatted_timestamp(),
    });

    page.items.push(LayoutItem::TextBox {
        rect: DESCRIPTION_BOX,
        size: DESCRIPTION_FONT_SIZE,
        line_height: DESCRIPTION_LINE_HEIGHT,
        lines: fit_lines(
            &moment.description,
            DESCRIPTION_BOX,
            DESCRIPTION_FONT_SIZE,
            DESCRIPTION_LINE_HEIGHT,
        ),
    });

    page.items.push(LayoutItem::Track {
        x: TRACK_START,
        y: TRACK_Y,
        width: TRACK_WIDTH,
    });

    match marker_rect(moment.emotion) {
        Some(rect) => page.items.push(LayoutItem::Marker(rect)),
        None => warn!(
            "Moment {} has emotion {} with no drawable position, omitting marker",
            moment.id, moment.emotion
        ),
    }

    let mut cursor = IMAGES_TOP;
    for (index, size) in image_sizes.iter().enumerate() {
        let Some(size) = size else {
            continue;
        };

        let Some((width, height)) = scaled_size(*size) else {
            warn!(
                "Skipping image {} of moment {}: degenerate size {}x{}",
                index, moment.id, size.width, size.height
            );
            continue;
        };

        if cursor + height > CONTENT_BOTTOM {
            pages.push(std::mem::take(&mut page));
            cursor = MARGIN;
        }

        page.items.push(LayoutItem::Image {
            index,
            rect: Rect {
                x: MARGIN + (CONTENT_WIDTH - width) / 2.0,
                y: cursor,
                width,
                height,
            },
        });
        cursor += height + IMAGE_SPACING;
    }

    pages.push(page);
    pages
}

/// Marker square for an emotion score
///
/// Centred on `TRACK_START + TRACK_WIDTH * emotion`. Scores outside
/// [0, 1] land outside the track. Returns `None` when the position is not
/// a finite page coordinate, including scores too large for `f32`.
pub fn marker_rect(emotion: f64) -> Option<Rect> {
    let center = f64::from(TRACK_START) + f64::from(TRACK_WIDTH) * emotion;
    let x = (center - f64::from(MARKER_SIZE) / 2.0) as f32;
    if !x.is_finite() {
        return None;
    }
    Some(Rect {
        x,
        y: TRACK_Y - MARKER_SIZE / 2.0,
        width: MARKER_SIZE,
        height: MARKER_SIZE,
    })
}

/// Size of an image scaled to the content width
///
/// Normally `width = CONTENT_WIDTH` and `height = width * aspect`. That rule
/// is overridden for images taller than a whole page of content: those are
/// shrunk to the content height with the aspect kept, so they still fit on
/// one fresh page. Returns `None` for zero-sized images.
pub fn scaled_size(size: ImageSize) -> Option<(f32, f32)> {
    if size.width == 0 || size.height == 0 {
        return None;
    }

    let aspect = size.height as f32 / size.width as f32;
    let max_height = CONTENT_BOTTOM - MARGIN;

    let mut width = CONTENT_WIDTH;
    let mut height = width * aspect;
    if height > max_height {
        height = max_height;
        width = height / aspect;
    }
    Some((width, height))
}

/// Word-wrap `text` into `rect`, dropping lines that do not fit
pub fn fit_lines(text: &str, rect: Rect, font_size: f32, line_height: f32) -> Vec<String> {
    let max_lines = (rect.height / line_height).floor() as usize;
    let mut lines = wrap_text(text, rect.width, font_size);
    lines.truncate(max_lines);
    lines
}

/// Word-wrap `text` to `width` points using an average glyph width
///
/// Explicit newlines start new lines; words longer than a line are split.
pub fn wrap_text(text: &str, width: f32, font_size: f32) -> Vec<String> {
    let max_chars = ((width / (font_size * AVERAGE_GLYPH_WIDTH)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();

            // Break words that cannot fit on any line
            while chars.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = chars.split_off(max_chars);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }

            let word_len = chars.len();
            if word_len == 0 {
                continue;
            }

            if current_len > 0 && current_len + 1 + word_len > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chars);
            current_len += word_len;
        }

        lines.push(current);
    }

    lines
}
