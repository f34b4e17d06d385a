//! Paginating layout engine for A4 pages.
//!
//! All coordinates are millimetres with the origin at the top-left of
//! the page; the writer converts to PDF points. The engine tracks a
//! cursor down the page and opens a continuation page whenever a block
//! would cross the break line.

use serde::{Deserialize, Serialize};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_X_MM: f32 = 20.0;
pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_X_MM;
/// First page leaves room for the title header block.
pub const FIRST_PAGE_TOP_MM: f32 = 80.0;
pub const CONTINUATION_TOP_MM: f32 = 40.0;
/// Content past this line moves to the next page.
pub const PAGE_BREAK_MM: f32 = 250.0;
pub const FOOTER_Y_MM: f32 = 285.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const GRAY: Self = Self::new(0.42, 0.45, 0.5);
    pub const LIGHT_GRAY: Self = Self::new(0.95, 0.96, 0.97);
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

/// One drawing primitive, positioned in page-local millimetres.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Text {
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        color: Rgb,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
        line_width: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb,
        line_width: f32,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub commands: Vec<DrawCommand>,
}

/// Line height in mm for a font size in points.
#[must_use]
pub fn line_height(size: f32) -> f32 {
    size * 0.46
}

/// Greedy word wrap against an estimated character budget for the given
/// width. Helvetica averages about half an em per glyph; precise metrics
/// are not worth carrying for a report layout.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn wrap(text: &str, width_mm: f32, size: f32) -> Vec<String> {
    let max_chars = ((width_mm / (size * 0.176)).floor() as usize).max(8);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
        // A single over-long token still has to land somewhere.
        while current.len() > max_chars {
            let head: String = current.chars().take(max_chars).collect();
            current = current.chars().skip(max_chars).collect();
            lines.push(head);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Cursor-based page builder. `y` always points at the top of the next
/// block on the current page.
pub struct LayoutEngine {
    pages: Vec<Page>,
    y: f32,
}

impl LayoutEngine {
    #[must_use]
    pub fn new(start_y: f32) -> Self {
        Self {
            pages: vec![Page::default()],
            y: start_y,
        }
    }

    #[must_use]
    pub const fn cursor(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Starts a continuation page if a block of `height` mm would cross
    /// the break line. Returns true when a page break happened.
    pub fn ensure_room(&mut self, height: f32) -> bool {
        if self.y + height > PAGE_BREAK_MM {
            self.pages.push(Page::default());
            self.y = CONTINUATION_TOP_MM;
            true
        } else {
            false
        }
    }

    pub fn advance(&mut self, height: f32) {
        self.y += height;
    }

    /// Emits a command on the current page without moving the cursor.
    pub fn raw(&mut self, command: DrawCommand) {
        if let Some(page) = self.pages.last_mut() {
            page.commands.push(command);
        }
    }

    /// Emits a command on a specific page; used for header blocks drawn
    /// after their contents are measured.
    pub fn raw_on(&mut self, page_index: usize, command: DrawCommand) {
        if let Some(page) = self.pages.get_mut(page_index) {
            page.commands.push(command);
        }
    }

    /// One line of text at the cursor, breaking the page first if needed.
    pub fn text_line(&mut self, x: f32, size: f32, style: FontStyle, color: Rgb, text: &str) {
        let height = line_height(size);
        self.ensure_room(height);
        self.raw(DrawCommand::Text {
            x,
            y: self.y + height * 0.8,
            size,
            style,
            color,
            text: text.to_string(),
        });
        self.advance(height);
    }

    /// Word-wrapped text across as many lines and pages as it takes.
    pub fn wrapped_text(
        &mut self,
        x: f32,
        width: f32,
        size: f32,
        style: FontStyle,
        color: Rgb,
        text: &str,
    ) {
        for line in wrap(text, width, size) {
            self.text_line(x, size, style, color, &line);
        }
    }

    /// Closes the layout, stamping every page with the given footer.
    #[must_use]
    pub fn finish<F>(mut self, footer: F) -> Vec<Page>
    where
        F: Fn(usize, usize) -> Vec<DrawCommand>,
    {
        let total = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.commands.extend(footer(index + 1, total));
        }
        self.pages
    }
}
