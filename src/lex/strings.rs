use super::{is_ident_char, TokenKind};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum LiteralKind {
    // quoted strings, backticks, `%q`-style literals and quoted symbols
    Str,
    Regexp,
    // `%w` / `%i` word arrays and their interpolating cousins
    Words,
}

impl LiteralKind {
    pub fn closing_token(self) -> TokenKind {
        return match self {
            LiteralKind::Str => TokenKind::TStringEnd,
            LiteralKind::Regexp => TokenKind::RegexpEnd,
            LiteralKind::Words => TokenKind::WordsSep,
        };
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Literal {
    pub kind: LiteralKind,
    pub open: Option<char>,
    pub close: char,
    pub interpolate: bool,
    // nesting of paired delimiters, `%q(a (b) c)` is one literal
    depth: usize,
}

impl Literal {
    pub fn new(kind: LiteralKind, delimiter: char, interpolate: bool) -> Literal {
        let (open, close) = match delimiter {
            '(' => (Some('('), ')'),
            '[' => (Some('['), ']'),
            '{' => (Some('{'), '}'),
            '<' => (Some('<'), '>'),
            other => (None, other),
        };
        return Literal { kind, open, close, interpolate, depth: 0 };
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Chunk {
    Content(usize),
    // whitespace between the words of a word array
    Separator(usize),
    // `#{`, always two bytes
    Interpolation,
    // the closing delimiter, including regexp flags
    Close(usize),
}

/**
 * Scan the next piece of a literal body. Lengths are in bytes from the
 * start of `input`, which must not be empty.
 */
pub fn next_chunk(literal: &mut Literal, input: &str) -> Chunk {
    let first = match input.chars().next() {
        Some(c) => c,
        None => return Chunk::Content(0),
    };

    if literal.kind == LiteralKind::Words && first.is_whitespace() {
        let len = input.find(|c: char| !c.is_whitespace()).unwrap_or(input.len());
        return Chunk::Separator(len);
    }
    if first == literal.close && literal.depth == 0 {
        let mut len = first.len_utf8();
        if literal.kind == LiteralKind::Regexp {
            let flags = &input[len..];
            len += flags.find(|c: char| !c.is_ascii_lowercase()).unwrap_or(flags.len());
        }
        return Chunk::Close(len);
    }
    if literal.interpolate && input.starts_with("#{") {
        return Chunk::Interpolation;
    }

    let mut chars = input.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '#' if literal.interpolate && input[index..].starts_with("#{") => {
                return Chunk::Content(index);
            }
            c if Some(c) == literal.open => {
                literal.depth += 1;
            }
            c if c == literal.close => {
                if literal.depth == 0 {
                    return Chunk::Content(index);
                }
                literal.depth -= 1;
            }
            c if literal.kind == LiteralKind::Words && c.is_whitespace() => {
                return Chunk::Content(index);
            }
            _ => {}
        }
    }
    return Chunk::Content(input.len());
}

/// A heredoc waiting for its terminator line. `indented` allows blanks
/// in front of the terminator, as `<<-` and `<<~` do.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Heredoc<'a> {
    pub id: &'a str,
    pub indented: bool,
    pub interpolate: bool,
}

/**
 * Read a heredoc opener such as `<<EOS`, `<<~EOS` or `<<-'SQL'` at the
 * start of `input`, returning its length in bytes.
 */
pub fn heredoc_start(input: &str) -> Option<(usize, Heredoc)> {
    if !input.starts_with("<<") {
        return None;
    }
    let body = &input[2..];
    let (indented, body) = match body.chars().next()? {
        '-' | '~' => (true, &body[1..]),
        _ => (false, body),
    };
    let prefix = input.len() - body.len();
    let first = body.chars().next()?;
    return match first {
        '\'' | '"' | '`' => {
            let quoted = &body[1..];
            let end = quoted.find(|c: char| c == first || c == '\n')?;
            if end == 0 || !quoted[end..].starts_with(first) {
                return None;
            }
            let heredoc = Heredoc { id: &quoted[..end], indented, interpolate: first != '\'' };
            Some((prefix + end + 2, heredoc))
        }
        c if is_ident_char(c) && !c.is_ascii_digit() => {
            let len = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
            let heredoc = Heredoc { id: &body[..len], indented, interpolate: true };
            Some((prefix + len, heredoc))
        }
        _ => None,
    };
}

/**
 * Scan the next piece of a heredoc body. The terminator only counts at
 * the start of a line, and its length leaves the newline behind.
 */
pub fn next_heredoc_chunk(heredoc: &Heredoc, input: &str, line_start: bool) -> Chunk {
    let line_len = input.find('\n').map_or(input.len(), |n| n + 1);
    let line = &input[..line_len];
    if line_start {
        let text = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        let candidate = if heredoc.indented { text.trim_start() } else { text };
        if candidate == heredoc.id {
            return Chunk::Close(text.len());
        }
    }
    if !heredoc.interpolate {
        return Chunk::Content(line_len);
    }
    if line.starts_with("#{") {
        return Chunk::Interpolation;
    }

    let mut chars = line.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '#' if line[index..].starts_with("#{") => return Chunk::Content(index),
            _ => {}
        }
    }
    return Chunk::Content(line_len);
}
