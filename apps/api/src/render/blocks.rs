//! Block model shared by the HTML templates and the PDF encoder.
//!
//! Synthesized text is never trusted as markup: it is parsed into blocks here and
//! every block is escaped by the template engine on output.

use serde::Serialize;

/// A single typeset unit of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Block {
    /// Document or slide title (largest size).
    Title(String),
    Heading(String),
    Paragraph(String),
    Bullet(String),
    /// Small secondary line: contact details, date stamp, captions.
    Meta(String),
    Spacer,
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Block::Title(t)
            | Block::Heading(t)
            | Block::Paragraph(t)
            | Block::Bullet(t)
            | Block::Meta(t) => t,
            Block::Spacer => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRole {
    /// Flowing body (letters, CVs). May span several physical pages.
    Flow,
    TitleSlide,
    ContentSlide,
    ContactSlide,
}

/// A logical page. Slides always start a new physical page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub role: PageRole,
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new(role: PageRole, blocks: Vec<Block>) -> Self {
        Self { role, blocks }
    }

    /// All block text joined by newlines.
    #[cfg(test)]
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A synthesized slide before it becomes a `Page`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slide {
    pub title: String,
    pub blocks: Vec<Block>,
}

const BULLET_MARKERS: [&str; 3] = ["- ", "* ", "• "];

/// Parses plain synthesized text into blocks.
///
/// `#`-prefixed lines become headings, `-`/`*`/`•` lines bullets, and runs of
/// other lines are joined into paragraphs. Blank lines end a paragraph.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            flush(&mut paragraph, &mut blocks);
            continue;
        }
        if line.starts_with('#') {
            flush(&mut paragraph, &mut blocks);
            let heading = strip_emphasis(line.trim_start_matches('#').trim());
            if !heading.is_empty() {
                blocks.push(Block::Heading(heading));
            }
            continue;
        }
        if let Some(item) = BULLET_MARKERS.iter().find_map(|m| line.strip_prefix(m)) {
            flush(&mut paragraph, &mut blocks);
            let item = item.trim();
            if !item.is_empty() {
                blocks.push(Block::Bullet(item.to_string()));
            }
            continue;
        }
        paragraph.push(line);
    }
    flush(&mut paragraph, &mut blocks);
    blocks
}

/// Splits synthesized deck content into slides on `---` separator lines.
///
/// The first non-empty line of each chunk is the slide title. Chunks titled
/// "Contact" are dropped: the renderer owns the closing contact slide.
pub fn parse_slides(text: &str) -> Vec<Slide> {
    let mut chunks: Vec<Vec<&str>> = vec![Vec::new()];
    for line in text.lines() {
        if is_separator(line) {
            chunks.push(Vec::new());
        } else if let Some(current) = chunks.last_mut() {
            current.push(line);
        }
    }

    chunks
        .into_iter()
        .filter_map(|lines| {
            let mut iter = lines.into_iter().skip_while(|l| l.trim().is_empty());
            let title_line = iter.next()?;
            let title = strip_emphasis(title_line.trim().trim_start_matches('#').trim());
            let body: Vec<&str> = iter.collect();
            Some(Slide {
                title,
                blocks: parse_blocks(&body.join("\n")),
            })
        })
        .filter(|slide| !slide.title.eq_ignore_ascii_case("contact"))
        .collect()
}

fn flush(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(paragraph.join(" ")));
        paragraph.clear();
    }
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

fn strip_emphasis(text: &str) -> String {
    text.trim_matches(|c| c == '*' || c == '_').trim().to_string()
}
