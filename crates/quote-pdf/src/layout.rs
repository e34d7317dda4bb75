//! Document layout on a single tall canvas
//!
//! Coordinates are PDF points with the origin at the canvas top-left and y
//! growing downwards. Sections are built as self-contained blocks and placed
//! with a running cursor; a block that would straddle a page boundary starts
//! on the next page instead.

use quote_ledger::{format_currency, format_percent, DerivedTotals};
use quote_types::{LineItem, ResolvedParty, DOCUMENT_SERIES};

use crate::config::PageConfig;
use crate::fonts::{FontWeight, TextMeasure};
use crate::paginate::page_count;

/// Points per millimetre
pub const MM: f32 = 72.0 / 25.4;
/// Points per CSS pixel
const PX: f32 = 0.75;

const BODY_SIZE: f32 = 9.0;
const HEADING_SIZE: f32 = 10.0;
const COMPANY_SIZE: f32 = 16.0;
const TOTAL_SIZE: f32 = 11.0;
const NOTE_SIZE: f32 = 8.0;

const LINE_HEIGHT: f32 = 1.25;
/// Baseline position within the em box
const ASCENT: f32 = 0.8;
const NOTE_GRAY: f32 = 0.4;
const RULE_WIDTH: f32 = 0.5;

const LOGO_BOX: f32 = 108.0 * PX;
const BOX_PADDING: f32 = 8.0 * PX;
const BOX_MIN_HEIGHT: f32 = 50.0 * PX;
const BOX_GAP: f32 = 20.0 * PX;
const VALUE_INDENT: f32 = 30.0 * PX;
const LABEL_GAP: f32 = 4.0 * PX;
const ROW_GAP: f32 = 8.0 * PX;
const SIGNATURE_RULE: f32 = 80.0 * PX;
const COLUMN_GUTTER: f32 = 4.0;

/// Tolerance when deciding whether a block still fits on the page
const FIT_EPSILON: f32 = 1e-3;

/// Page size and margin in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Height a block can occupy on one page
    pub fn usable_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageConfig::default().geometry()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub baseline: f32,
    pub size: f32,
    pub weight: FontWeight,
    /// Fill gray level, 0 is black
    pub gray: f32,
    pub text: String,
}

/// A vector drawing primitive positioned on the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextRun),
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        width: f32,
    },
    Frame {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
    },
    Logo {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl Element {
    /// Top and bottom canvas y this element paints
    pub fn vertical_extent(&self) -> (f32, f32) {
        match self {
            Element::Text(run) => (
                run.baseline - run.size * ASCENT,
                run.baseline + run.size * (1.0 - ASCENT),
            ),
            Element::Rule { y, width, .. } => (y - width / 2.0, y + width / 2.0),
            Element::Frame {
                y,
                height,
                line_width,
                ..
            } => (y - line_width / 2.0, y + height + line_width / 2.0),
            Element::Logo { y, height, .. } => (*y, y + height),
        }
    }

    fn shifted(mut self, dy: f32) -> Self {
        match &mut self {
            Element::Text(run) => run.baseline += dy,
            Element::Rule { y, .. } | Element::Frame { y, .. } | Element::Logo { y, .. } => {
                *y += dy
            }
        }
        self
    }
}

/// The laid-out document before pagination
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub elements: Vec<Element>,
}

impl Canvas {
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text(run) => Some(run),
            _ => None,
        })
    }

    /// First text run with exactly this content
    pub fn find_text(&self, text: &str) -> Option<&TextRun> {
        self.text_runs().find(|run| run.text == text)
    }
}

/// Intrinsic pixel size of the logo, when one is embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoSlot {
    pub width: u32,
    pub height: u32,
}

/// Everything the template prints, already resolved to strings where needed
#[derive(Debug, Clone)]
pub struct DocumentContent<'a> {
    pub items: &'a [LineItem],
    pub totals: &'a DerivedTotals,
    pub issuer: &'a ResolvedParty,
    pub recipient: &'a ResolvedParty,
    pub title: &'a str,
    pub sequence_number: &'a str,
    pub issue_date: &'a str,
    pub logo: Option<LogoSlot>,
}

/// Vertical cursor that keeps blocks from straddling page boundaries
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    y: f32,
    page_height: f32,
    margin: f32,
}

impl Cursor {
    pub fn new(page_height: f32, margin: f32) -> Self {
        Self {
            y: margin,
            page_height,
            margin,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn advance(&mut self, gap: f32) {
        self.y += gap;
    }

    /// Reserve `height` and return the block's top
    ///
    /// Blocks taller than a page's usable height are placed where they are
    /// and simply run across the boundary.
    pub fn place(&mut self, height: f32) -> f32 {
        let page = (self.y / self.page_height).floor();
        let page_top = page * self.page_height;

        if page > 0.0 && self.y < page_top + self.margin {
            self.y = page_top + self.margin;
        }

        let limit = page_top + self.page_height - self.margin;
        let usable = self.page_height - 2.0 * self.margin;
        if self.y + height > limit + FIT_EPSILON && height <= usable {
            tracing::trace!("Block of {:.1}pt moved to page {}", height, page as usize + 2);
            self.y = page_top + self.page_height + self.margin;
        }

        let top = self.y;
        self.y += height;
        top
    }
}

/// Elements positioned relative to the block's own top
#[derive(Debug, Default)]
struct Block {
    height: f32,
    elements: Vec<Element>,
}

impl Block {
    fn text(&mut self, x: f32, top: f32, size: f32, weight: FontWeight, text: impl Into<String>) {
        self.styled_text(x, top, size, weight, 0.0, text);
    }

    fn styled_text(
        &mut self,
        x: f32,
        top: f32,
        size: f32,
        weight: FontWeight,
        gray: f32,
        text: impl Into<String>,
    ) {
        let baseline = top + size * (LINE_HEIGHT - 1.0) / 2.0 + size * ASCENT;
        self.elements.push(Element::Text(TextRun {
            x,
            baseline,
            size,
            weight,
            gray,
            text: text.into(),
        }));
        self.grow_to(top + line_height(size));
    }

    fn push(&mut self, element: Element) {
        let (_, bottom) = element.vertical_extent();
        self.elements.push(element);
        self.grow_to(bottom);
    }

    fn grow_to(&mut self, bottom: f32) {
        self.height = self.height.max(bottom);
    }

    /// Merge `other` so that its top sits at `dy`
    fn append(&mut self, other: Block, dy: f32) {
        self.elements
            .extend(other.elements.into_iter().map(|e| e.shifted(dy)));
        self.grow_to(dy + other.height);
    }
}

fn line_height(size: f32) -> f32 {
    size * LINE_HEIGHT
}

/// Greedy word wrap; words wider than `max_width` are broken by character
pub fn wrap_text(
    measure: &dyn TextMeasure,
    text: &str,
    size: f32,
    weight: FontWeight,
    max_width: f32,
) -> Vec<String> {
    let fits = |candidate: &str| measure.text_width(candidate, size, weight) <= max_width;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if fits(word) {
            current = word.to_string();
            continue;
        }

        for c in word.chars() {
            current.push(c);
            if !fits(&current) && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

struct Layout<'a> {
    measure: &'a dyn TextMeasure,
    geometry: PageGeometry,
    cursor: Cursor,
    elements: Vec<Element>,
}

impl<'a> Layout<'a> {
    fn new(measure: &'a dyn TextMeasure, geometry: PageGeometry) -> Self {
        Self {
            measure,
            geometry,
            cursor: Cursor::new(geometry.height, geometry.margin),
            elements: Vec::new(),
        }
    }

    fn left(&self) -> f32 {
        self.geometry.margin
    }

    fn width(&self, text: &str, size: f32, weight: FontWeight) -> f32 {
        self.measure.text_width(text, size, weight)
    }

    fn centered_x(&self, text: &str, size: f32, weight: FontWeight, left: f32, width: f32) -> f32 {
        left + (width - self.width(text, size, weight)) / 2.0
    }

    fn right_x(&self, text: &str, size: f32, weight: FontWeight, right: f32) -> f32 {
        right - self.width(text, size, weight)
    }

    fn place(&mut self, block: Block) {
        let top = self.cursor.place(block.height);
        self.elements
            .extend(block.elements.into_iter().map(|e| e.shifted(top)));
    }

    fn gap(&mut self, height: f32) {
        self.cursor.advance(height);
    }

    fn header(&self, issuer: &ResolvedParty, logo: Option<LogoSlot>) -> Block {
        let mut block = Block::default();
        let left = self.left();
        let width = self.geometry.content_width();
        let mut y = 0.0;

        if let Some(slot) = logo.filter(|s| s.width > 0 && s.height > 0) {
            let scale = (LOGO_BOX / slot.width as f32).min(LOGO_BOX / slot.height as f32);
            let (w, h) = (slot.width as f32 * scale, slot.height as f32 * scale);
            block.push(Element::Logo {
                x: left + (width - w) / 2.0,
                y: (LOGO_BOX - h) / 2.0,
                width: w,
                height: h,
            });
            block.grow_to(LOGO_BOX);
            y = LOGO_BOX + 10.0 * PX;
        }

        let name = issuer.name.to_uppercase();
        for line in wrap_text(self.measure, &name, COMPANY_SIZE, FontWeight::Bold, width) {
            let x = self.centered_x(&line, COMPANY_SIZE, FontWeight::Bold, left, width);
            block.text(x, y, COMPANY_SIZE, FontWeight::Bold, line);
            y += line_height(COMPANY_SIZE);
        }
        y += 5.0 * PX;

        let ids = format!("Α.Φ.Μ.: {} Δ.Ο.Υ.: {}", issuer.tax_id, issuer.tax_office);
        for line in wrap_text(self.measure, &ids, BODY_SIZE, FontWeight::Regular, width) {
            let x = self.centered_x(&line, BODY_SIZE, FontWeight::Regular, left, width);
            block.text(x, y, BODY_SIZE, FontWeight::Regular, line);
            y += line_height(BODY_SIZE);
        }
        block
    }

    /// Bold label with its value indented on the lines below
    fn labelled_fields(&self, fields: &[(&str, &str)], x: f32, top: f32, width: f32) -> Block {
        let mut block = Block::default();
        let mut y = top;

        for (i, (label, value)) in fields.iter().enumerate() {
            block.text(x, y, BODY_SIZE, FontWeight::Bold, *label);
            y += line_height(BODY_SIZE) + LABEL_GAP;

            let lines = wrap_text(
                self.measure,
                value,
                BODY_SIZE,
                FontWeight::Regular,
                width - VALUE_INDENT,
            );
            for line in lines {
                block.text(x + VALUE_INDENT, y, BODY_SIZE, FontWeight::Regular, line);
                y += line_height(BODY_SIZE);
            }
            if i + 1 < fields.len() {
                y += ROW_GAP;
            }
        }
        block.grow_to(y);
        block
    }

    fn info_boxes(&self, content: &DocumentContent<'_>) -> Block {
        let box_width = (self.geometry.content_width() - BOX_GAP) / 2.0;
        let inner = box_width - 2.0 * BOX_PADDING;
        let left_x = self.left();
        let right_x = left_x + box_width + BOX_GAP;

        let recipient = content.recipient;
        let client = self.labelled_fields(
            &[
                ("ΕΠΩΝΥΜΙΑ:", recipient.name.as_str()),
                ("Α.Φ.Μ.:", recipient.tax_id.as_str()),
                ("Δ.Ο.Υ.:", recipient.tax_office.as_str()),
                ("ΔΙΕΥΘΥΝΣΗ:", recipient.address.as_str()),
            ],
            left_x + BOX_PADDING,
            BOX_PADDING,
            inner,
        );

        let mut details = Block::default();
        let mut y = BOX_PADDING;
        let title_x = right_x + BOX_PADDING;
        for line in wrap_text(self.measure, content.title, HEADING_SIZE, FontWeight::Bold, inner) {
            let x = self.centered_x(&line, HEADING_SIZE, FontWeight::Bold, title_x, inner);
            details.text(x, y, HEADING_SIZE, FontWeight::Bold, line);
            y += line_height(HEADING_SIZE);
        }
        y += 10.0 * PX;
        let fields = self.labelled_fields(
            &[
                ("ΣΕΙΡΑ:", DOCUMENT_SERIES),
                ("ΑΡΙΘΜΟΣ:", content.sequence_number),
                ("ΗΜΕΡΟΜΗΝΙΑ:", content.issue_date),
            ],
            title_x,
            0.0,
            inner,
        );
        details.append(fields, y);

        let height = (client.height.max(details.height) + BOX_PADDING).max(BOX_MIN_HEIGHT);
        let mut block = Block::default();
        for x in [left_x, right_x] {
            block.push(Element::Frame {
                x,
                y: 0.0,
                width: box_width,
                height,
                line_width: RULE_WIDTH,
            });
        }
        block.append(client, 0.0);
        block.append(details, 0.0);
        block
    }

    fn column_edges(&self) -> (f32, f32, f32) {
        let left = self.left();
        let width = self.geometry.content_width();
        (left, left + width * 0.05, left + width)
    }

    fn table_header(&self) -> Block {
        let mut block = Block::default();
        let (index_x, name_x, right) = self.column_edges();

        block.text(index_x, 0.0, HEADING_SIZE, FontWeight::Bold, "A/A");
        block.text(
            name_x,
            0.0,
            HEADING_SIZE,
            FontWeight::Bold,
            "ΠΕΡΙΓΡΑΦΗ - ΑΝΑΛΥΣΗ ΥΠΗΡΕΣΙΑΣ",
        );
        let x = self.right_x("ΑΞΙΑ", HEADING_SIZE, FontWeight::Bold, right);
        block.text(x, 0.0, HEADING_SIZE, FontWeight::Bold, "ΑΞΙΑ");

        let rule_y = line_height(HEADING_SIZE) + 5.0 * PX;
        block.push(Element::Rule {
            x1: index_x,
            x2: right,
            y: rule_y,
            width: RULE_WIDTH,
        });
        block.grow_to(rule_y + ROW_GAP);
        block
    }

    fn item_row(&self, index: usize, item: &LineItem, line_total: f64) -> Block {
        let mut block = Block::default();
        let (index_x, name_x, right) = self.column_edges();
        let name_width = self.geometry.content_width() * 0.70 - COLUMN_GUTTER;

        block.text(index_x, 0.0, BODY_SIZE, FontWeight::Regular, (index + 1).to_string());

        let lines = wrap_text(
            self.measure,
            &item.name,
            BODY_SIZE,
            FontWeight::Regular,
            name_width,
        );
        let mut y = 0.0;
        for line in lines {
            block.text(name_x, y, BODY_SIZE, FontWeight::Regular, line);
            y += line_height(BODY_SIZE);
        }

        if item.has_discount() {
            y += 2.0 * PX;
            let note = format!("(Εκπτώση: {}%)", format_percent(item.discount_rate));
            block.styled_text(name_x, y, NOTE_SIZE, FontWeight::Regular, NOTE_GRAY, note);
        }

        let amount = format_currency(line_total);
        let x = self.right_x(&amount, BODY_SIZE, FontWeight::Regular, right);
        block.text(x, 0.0, BODY_SIZE, FontWeight::Regular, amount);
        block
    }

    fn summary(&self, totals: &DerivedTotals) -> Block {
        let mut block = Block::default();
        let width = self.geometry.content_width();
        let top = 10.0 * PX;

        block.text(self.left(), top, BODY_SIZE, FontWeight::Bold, "ΣΧΟΛΙΑ:");

        let box_width = width * 0.48;
        let box_x = self.left() + width - box_width;
        let label_x = box_x + BOX_PADDING;
        let value_right = box_x + box_width - BOX_PADDING;

        let mut rows = vec![("ΚΑΘΑΡΗ ΑΞΙΑ:", format_currency(totals.subtotal))];
        if totals.has_discount() {
            rows.push((
                "ΣΥΝΟΛΙΚΗ ΕΚΠΤΩΣΗ:",
                format!("-{}", format_currency(totals.total_discount)),
            ));
        }
        rows.push(("Φ.Π.Α.:", format_currency(totals.vat_total)));

        let mut y = top + BOX_PADDING;
        for (label, value) in rows {
            block.text(label_x, y, BODY_SIZE, FontWeight::Bold, label);
            let x = self.right_x(&value, BODY_SIZE, FontWeight::Regular, value_right);
            block.text(x, y, BODY_SIZE, FontWeight::Regular, value);
            y += line_height(BODY_SIZE) + ROW_GAP;
        }

        y += 5.0 * PX;
        let grand_total = format_currency(totals.grand_total);
        block.text(label_x, y, TOTAL_SIZE, FontWeight::Bold, "ΤΕΛΙΚΗ ΑΞΙΑ:");
        let x = self.right_x(&grand_total, TOTAL_SIZE, FontWeight::Bold, value_right);
        block.text(x, y, TOTAL_SIZE, FontWeight::Bold, grand_total);
        y += line_height(TOTAL_SIZE) + BOX_PADDING;

        block.push(Element::Frame {
            x: box_x,
            y: top,
            width: box_width,
            height: y - top,
            line_width: RULE_WIDTH,
        });
        block
    }

    fn signature(&self) -> Block {
        let mut block = Block::default();
        let left = self.left();
        let width = self.geometry.content_width();
        let top = 30.0 * PX;

        let label = "Ο ΕΚΔΟΤΗΣ";
        let x = self.centered_x(label, BODY_SIZE, FontWeight::Bold, left, width);
        block.text(x, top, BODY_SIZE, FontWeight::Bold, label);

        let rule_y = top + line_height(BODY_SIZE) + 5.0 * PX + 10.0 * PX;
        let rule_x = left + (width - SIGNATURE_RULE) / 2.0;
        block.push(Element::Rule {
            x1: rule_x,
            x2: rule_x + SIGNATURE_RULE,
            y: rule_y,
            width: RULE_WIDTH,
        });
        block
    }

    /// Canvas height: content plus bottom margin, clipped to the last page
    fn finish(self) -> Canvas {
        let content_bottom = self.cursor.y();
        let pages = page_count(content_bottom, self.geometry.height);
        let height =
            (content_bottom + self.geometry.margin).min(pages as f32 * self.geometry.height);

        Canvas {
            width: self.geometry.width,
            height,
            elements: self.elements,
        }
    }
}

/// Lay out the whole document on one canvas
pub fn layout_document(
    content: &DocumentContent<'_>,
    geometry: &PageGeometry,
    measure: &dyn TextMeasure,
) -> Canvas {
    let mut layout = Layout::new(measure, *geometry);

    let header = layout.header(content.issuer, content.logo);
    layout.place(header);
    layout.gap(20.0 * PX);

    let boxes = layout.info_boxes(content);
    layout.place(boxes);
    layout.gap(15.0 * PX + 15.0 * PX);

    let rows: Vec<Block> = content
        .items
        .iter()
        .zip(&content.totals.lines)
        .enumerate()
        .map(|(i, (item, line))| layout.item_row(i, item, line.line_total))
        .collect();

    // The header rides along with the first row
    let mut rows = rows.into_iter();
    let mut head = layout.table_header();
    if let Some(first) = rows.next() {
        let offset = head.height;
        head.append(first, offset);
    }
    layout.place(head);
    for row in rows {
        layout.gap(ROW_GAP);
        layout.place(row);
    }
    layout.gap(10.0 * PX + 10.0 * PX);

    let summary = layout.summary(content.totals);
    layout.place(summary);

    let signature = layout.signature();
    layout.place(signature);

    let canvas = layout.finish();
    tracing::debug!(
        "Laid out {} elements on a {:.1}pt canvas",
        canvas.elements.len(),
        canvas.height
    );
    canvas
}
