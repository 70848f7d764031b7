use std::sync::LazyLock;

use regex::Regex;

use crate::block::Block;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("heading pattern is valid"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+]\s+(.+)$").expect("list item pattern is valid"));
static SEPARATOR_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s|:-]*-[\s|:-]*$").expect("separator pattern is valid"));

const FENCE: &str = "```";

/// A fence line, optionally followed by an info string. Backticks after the
/// fence mean inline code (```` ```x``` ````), not a code block.
fn is_opening_fence(trimmed: &str) -> bool {
    trimmed
        .strip_prefix(FENCE)
        .is_some_and(|info| !info.contains('`'))
}

/// Parse a section body into a list of blocks, in source order.
pub fn parse(body: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut state = ParseState::None;

    for line in body.lines() {
        process_line(line, &mut state, &mut blocks);
    }
    state.flush(&mut blocks);

    log::debug!("parsed {} blocks", blocks.len());
    blocks
}

/// The block currently being accumulated.
#[derive(Debug, Default)]
enum ParseState {
    #[default]
    None,
    Paragraph(Vec<String>),
    List(Vec<String>),
    Code(Vec<String>),
    Table(Vec<String>),
}

impl ParseState {
    fn flush(&mut self, blocks: &mut Vec<Block>) {
        match std::mem::take(self) {
            ParseState::None => {}
            ParseState::Paragraph(lines) => blocks.push(Block::Paragraph(lines.join("\n"))),
            ParseState::List(items) => blocks.push(Block::List(items)),
            ParseState::Code(lines) => blocks.push(Block::Code(lines)),
            ParseState::Table(lines) => {
                let rows = table_rows(&lines);
                if !rows.is_empty() {
                    blocks.push(Block::Table(rows));
                }
            }
        }
    }
}

fn process_line(line: &str, state: &mut ParseState, blocks: &mut Vec<Block>) {
    let trimmed = line.trim();

    // Inside a fence every line is verbatim until the closing fence.
    if let ParseState::Code(lines) = state {
        if trimmed == FENCE {
            state.flush(blocks);
        } else {
            lines.push(line.to_string());
        }
        return;
    }

    if trimmed.is_empty() {
        state.flush(blocks);
        return;
    }

    if is_opening_fence(trimmed) {
        state.flush(blocks);
        *state = ParseState::Code(Vec::new());
        return;
    }

    if let Some(caps) = HEADING.captures(trimmed) {
        state.flush(blocks);
        blocks.push(Block::Heading {
            level: caps[1].len() as u8,
            text: caps[2].trim().to_string(),
        });
        return;
    }

    if let Some(caps) = LIST_ITEM.captures(trimmed) {
        let item = caps[1].trim().to_string();
        match state {
            ParseState::List(items) => items.push(item),
            _ => {
                state.flush(blocks);
                *state = ParseState::List(vec![item]);
            }
        }
        return;
    }

    if trimmed.contains('|') {
        if !matches!(state, ParseState::Table(_)) {
            state.flush(blocks);
            *state = ParseState::Table(Vec::new());
        }
        if let ParseState::Table(lines) = state {
            if !is_separator_row(trimmed) {
                lines.push(trimmed.to_string());
            }
        }
        return;
    }

    match state {
        ParseState::Paragraph(lines) => lines.push(trimmed.to_string()),
        _ => {
            state.flush(blocks);
            *state = ParseState::Paragraph(vec![trimmed.to_string()]);
        }
    }
}

fn is_separator_row(line: &str) -> bool {
    SEPARATOR_ROW.is_match(line)
}

/// Split buffered table lines into trimmed cells.
///
/// The empty cells produced by the outer pipes are dropped, and rows left
/// with fewer than two cells are discarded.
fn table_rows(lines: &[String]) -> Vec<Vec<String>> {
    lines
        .iter()
        .filter_map(|line| {
            let mut cells: Vec<String> =
                line.split('|').map(|cell| cell.trim().to_string()).collect();
            if cells.first().is_some_and(String::is_empty) {
                cells.remove(0);
            }
            if cells.last().is_some_and(String::is_empty) {
                cells.pop();
            }
            if cells.len() > 1 {
                Some(cells)
            } else {
                log::debug!("dropping table row with fewer than two cells: {line:?}");
                None
            }
        })
        .collect()
}

/// Serialize blocks back into the markup dialect accepted by [`parse`].
pub fn to_markup(blocks: &[Block]) -> String {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        out.push(block_to_markup(block));
    }
    out.join("\n\n")
}

fn block_to_markup(block: &Block) -> String {
    match block {
        Block::Paragraph(text) => text.clone(),
        Block::Heading { level, text } => {
            format!("{} {}", "#".repeat(*level as usize), text)
        }
        Block::List(items) => items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Code(lines) => {
            let mut out = String::from(FENCE);
            for line in lines {
                out.push('\n');
                out.push_str(line);
            }
            out.push('\n');
            out.push_str(FENCE);
            out
        }
        Block::Table(rows) => {
            let mut out = Vec::with_capacity(rows.len() + 1);
            for (i, row) in rows.iter().enumerate() {
                out.push(format!("| {} |", row.join(" | ")));
                if i == 0 {
                    out.push(format!("|{}|", vec!["---"; row.len()].join("|")));
                }
            }
            out.join("\n")
        }
    }
}
