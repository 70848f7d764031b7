/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    Bold(String),
    Italic(String),
    Code(String),
}

impl Span {
    /// The literal text carried by the span, without delimiters.
    pub fn text(&self) -> &str {
        match self {
            Span::Plain(text) | Span::Bold(text) | Span::Italic(text) | Span::Code(text) => text,
        }
    }
}

/// Block-level elements parsed from a section body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Raw paragraph markup, source lines joined with `\n`.
    Paragraph(String),
    Heading {
        level: u8,
        text: String,
    },
    List(Vec<String>),
    /// Fenced code lines, kept verbatim.
    Code(Vec<String>),
    /// Table rows; the first row is rendered as the header band.
    Table(Vec<Vec<String>>),
}

impl Block {
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading { .. } => "heading",
            Block::List(_) => "list",
            Block::Code(_) => "code",
            Block::Table(_) => "table",
        }
    }
}
