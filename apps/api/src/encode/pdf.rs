//! PDF writer for rendered documents.
//!
//! Typesets the block model of a `RenderedDocument` with the standard Helvetica
//! fonts. Flow pages (letters, CVs) use A4 portrait and break onto as many physical
//! pages as needed; every slide starts its own A5 landscape page.
//!
//! CV styles and the deck theme are drawn as filled shapes (header band, rule,
//! accent bar) so the PDF carries the same layouts as the HTML.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::encode::metrics::{to_win_ansi, wrap_text};
use crate::models::document::{CvStyle, DocumentKind};
use crate::render::blocks::{Block, Page, PageRole};
use crate::render::RenderedDocument;

const A4: (f32, f32) = (595.0, 842.0);
const A5_LANDSCAPE: (f32, f32) = (595.0, 420.0);
const FLOW_MARGIN: f32 = 56.0;
const SLIDE_MARGIN: f32 = 40.0;
const LEADING: f32 = 1.35;
const BULLET_INDENT: f32 = 14.0;

const HEADER_PAD: f32 = 12.0;
const RULE_GAP: f32 = 5.0;
const RULE_WEIGHT: f32 = 1.2;
const EDGE_BAR_WIDTH: f32 = 10.0;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("content stream encoding failed: {0}")]
    Content(#[from] lopdf::Error),

    #[error("document serialization failed: {0}")]
    Save(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgb(f32, f32, f32);

const INK: Rgb = Rgb(0.0, 0.0, 0.0);
const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
const NAVY: Rgb = Rgb(0.12, 0.23, 0.42);
const SLATE: Rgb = Rgb(0.25, 0.25, 0.25);
const CORAL: Rgb = Rgb(0.85, 0.33, 0.24);
const DECK_TEAL: Rgb = Rgb(0.06, 0.40, 0.38);

/// Treatment of the leading heading of each logical page.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Header {
    Plain,
    /// Full-width band behind the heading; heading set in white.
    Band(Rgb),
    /// Thin rule under the heading across the text width.
    Rule(Rgb),
    /// Heading set in the accent colour.
    Accent(Rgb),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Theme {
    header: Header,
    /// Bar down the left edge of every physical page.
    edge_bar: Option<Rgb>,
}

impl Theme {
    fn for_document(kind: DocumentKind, style: Option<CvStyle>) -> Self {
        let (header, edge_bar) = match kind {
            DocumentKind::Cv => match style.unwrap_or_default() {
                CvStyle::Modern => (Header::Band(NAVY), None),
                CvStyle::Classic => (Header::Rule(SLATE), None),
                CvStyle::Creative => (Header::Accent(CORAL), Some(CORAL)),
            },
            DocumentKind::PitchDeck => (Header::Band(DECK_TEAL), None),
            DocumentKind::CoverLetter | DocumentKind::ApplicationBundle => (Header::Plain, None),
        };
        Theme { header, edge_bar }
    }
}

struct Style {
    size: f32,
    bold: bool,
    space_before: f32,
}

fn style_for(block: &Block, role: PageRole) -> Style {
    let slide = role != PageRole::Flow;
    match block {
        Block::Title(_) => Style {
            size: if slide { 28.0 } else { 20.0 },
            bold: true,
            space_before: 0.0,
        },
        Block::Heading(_) => Style {
            size: if slide { 20.0 } else { 13.0 },
            bold: true,
            space_before: 6.0,
        },
        Block::Paragraph(_) | Block::Bullet(_) => Style {
            size: if slide { 14.0 } else { 11.0 },
            bold: false,
            space_before: 3.0,
        },
        Block::Meta(_) => Style {
            size: if slide { 11.0 } else { 9.0 },
            bold: false,
            space_before: 1.0,
        },
        Block::Spacer => Style {
            size: 10.0,
            bold: false,
            space_before: 0.0,
        },
    }
}

/// One physical page: its size, filled shapes and positioned text runs.
struct PhysicalPage {
    size: (f32, f32),
    fills: Vec<Fill>,
    runs: Vec<TextRun>,
}

impl PhysicalPage {
    fn blank(size: (f32, f32), theme: Theme) -> Self {
        let fills = theme
            .edge_bar
            .map(|color| Fill {
                x: 0.0,
                y: 0.0,
                w: EDGE_BAR_WIDTH,
                h: size.1,
                color,
            })
            .into_iter()
            .collect();
        Self {
            size,
            fills,
            runs: Vec::new(),
        }
    }
}

struct Fill {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: Rgb,
}

struct TextRun {
    x: f32,
    y: f32,
    size: f32,
    bold: bool,
    color: Rgb,
    text: String,
}

/// Lays out the logical pages onto physical pages.
fn layout(pages: &[Page], theme: Theme) -> Vec<PhysicalPage> {
    let mut out: Vec<PhysicalPage> = Vec::new();

    for page in pages {
        let (size, margin) = match page.role {
            PageRole::Flow => (A4, FLOW_MARGIN),
            _ => (A5_LANDSCAPE, SLIDE_MARGIN),
        };
        let text_width = size.0 - 2.0 * margin;
        let mut current = PhysicalPage::blank(size, theme);
        let mut y = size.1 - margin;

        let leading_heading = page
            .blocks
            .iter()
            .position(|b| *b != Block::Spacer)
            .filter(|&i| matches!(page.blocks[i], Block::Title(_) | Block::Heading(_)));

        for (index, block) in page.blocks.iter().enumerate() {
            let style = style_for(block, page.role);
            if let Block::Spacer = block {
                y -= style.size;
                continue;
            }

            let header = if leading_heading == Some(index) {
                theme.header
            } else {
                Header::Plain
            };
            let color = match header {
                Header::Band(_) => WHITE,
                Header::Accent(accent) => accent,
                Header::Plain | Header::Rule(_) => INK,
            };
            let (indent, prefix) = match block {
                Block::Bullet(_) => (BULLET_INDENT, Some("•")),
                _ => (0.0, None),
            };
            let max_em = (text_width - indent) / style.size;
            let line_height = style.size * LEADING;
            y -= style.space_before;

            for (i, line) in wrap_text(block.text(), max_em, style.bold)
                .into_iter()
                .enumerate()
            {
                if y - line_height < margin {
                    out.push(current);
                    current = PhysicalPage::blank(size, theme);
                    y = size.1 - margin;
                }
                y -= line_height;
                if i == 0 {
                    if let Some(marker) = prefix {
                        current.runs.push(TextRun {
                            x: margin,
                            y,
                            size: style.size,
                            bold: false,
                            color: INK,
                            text: marker.to_string(),
                        });
                    }
                }
                current.runs.push(TextRun {
                    x: margin + indent,
                    y,
                    size: style.size,
                    bold: style.bold,
                    color,
                    text: line,
                });
            }

            match header {
                Header::Band(fill) => {
                    let bottom = y - HEADER_PAD;
                    current.fills.push(Fill {
                        x: 0.0,
                        y: bottom,
                        w: size.0,
                        h: size.1 - bottom,
                        color: fill,
                    });
                    y = bottom - HEADER_PAD;
                }
                Header::Rule(line) => {
                    y -= RULE_GAP;
                    current.fills.push(Fill {
                        x: margin,
                        y,
                        w: text_width,
                        h: RULE_WEIGHT,
                        color: line,
                    });
                    y -= RULE_GAP;
                }
                Header::Plain | Header::Accent(_) => {}
            }
        }
        out.push(current);
    }
    out
}

fn set_fill_color(ops: &mut Vec<Operation>, color: Rgb) {
    ops.push(Operation::new(
        "rg",
        vec![
            Object::Real(color.0),
            Object::Real(color.1),
            Object::Real(color.2),
        ],
    ));
}

/// Shapes go first so text is painted over them.
fn page_operations(page: &PhysicalPage) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(page.fills.len() * 5 + page.runs.len() * 7);
    for fill in &page.fills {
        ops.push(Operation::new("q", vec![]));
        set_fill_color(&mut ops, fill.color);
        ops.push(Operation::new(
            "re",
            vec![
                Object::Real(fill.x),
                Object::Real(fill.y),
                Object::Real(fill.w),
                Object::Real(fill.h),
            ],
        ));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }
    ops.extend(text_operations(&page.runs));
    ops
}

fn text_operations(runs: &[TextRun]) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(runs.len() * 7);
    for run in runs {
        let font = if run.bold { FONT_BOLD } else { FONT_REGULAR };
        let colored = run.color != INK;
        if colored {
            ops.push(Operation::new("q", vec![]));
            set_fill_color(&mut ops, run.color);
        }
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![font.into(), Object::Integer(run.size.round() as i64)],
        ));
        ops.push(Operation::new(
            "Td",
            vec![
                Object::Integer(run.x.round() as i64),
                Object::Integer(run.y.round() as i64),
            ],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_win_ansi(&run.text))],
        ));
        ops.push(Operation::new("ET", vec![]));
        if colored {
            ops.push(Operation::new("Q", vec![]));
        }
    }
    ops
}

/// Encodes a rendered document as PDF bytes.
///
/// Content streams are left uncompressed.
pub fn write_pdf(rendered: &RenderedDocument) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular,
            FONT_BOLD => bold,
        },
    });

    let theme = Theme::for_document(rendered.kind, rendered.style);
    let physical = layout(&rendered.pages, theme);
    let mut kids: Vec<Object> = Vec::with_capacity(physical.len());
    for page in &physical {
        let content = Content {
            operations: page_operations(page),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(page.size.0 as i64),
            Object::Integer(page.size.1 as i64),
        ];
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => media_box,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(to_win_ansi(&document_title(rendered))),
        "Producer" => Object::string_literal("dossier"),
        "CreationDate" => Object::string_literal(
            rendered.rendered_on.format("D:%Y%m%d000000Z").to_string()
        ),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfError::Save(e.to_string()))?;
    Ok(bytes)
}

fn document_title(rendered: &RenderedDocument) -> String {
    let meta = &rendered.metadata;
    let name = meta.applicant_name.as_deref().unwrap_or_default();
    match meta.project_name.as_deref() {
        Some(project) if rendered.kind == DocumentKind::PitchDeck => project.to_string(),
        _ => format!("{} - {}", rendered.kind, name),
    }
}

/// Widest line of a page's text in points, for layout assertions.
#[cfg(test)]
fn widest_run(page: &PhysicalPage) -> f32 {
    use crate::encode::metrics::measure_str;
    page.runs
        .iter()
        .map(|r| r.x + measure_str(&r.text, r.bold) * r.size)
        .fold(0.0, f32::max)
}
