//! Nesting and completeness of partially typed Ruby source.
//!
//! A console reads one line at a time. After each line it needs to know
//! how deeply the buffered source is nested (to draw the prompt), whether
//! the buffer is a complete chunk of code, and whether the last line made
//! it unrecoverably wrong.

use std::collections::HashSet;

use crate::lex::{Token, TokenKind};
use crate::parse::{Event, ParseError, Parser};

lazy_static! {
    static ref BLOCK_KEYWORDS: HashSet<&'static str> =
        "class module def begin if unless case while until for do"
            .split_whitespace()
            .collect();
    static ref TERMINATION_WORDS: HashSet<&'static str> =
        ["exit", "quit"].iter().cloned().collect();
}

/**
 * Whether `close` finishes a literal opened by `open`. Only the last
 * character of each is compared: `%w{` is closed by `}`, `"` by `"`.
 */
pub fn tokens_match(open: &str, close: &str) -> bool {
    return match (open.chars().last(), close.chars().last()) {
        (Some(o), Some(c)) if o == c => true,
        (Some(o), Some(c)) => match (o, c) {
            ('{', '}') | ('(', ')') | ('[', ']') | ('<', '>') => true,
            _ => false,
        },
        _ => false,
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ReflectOptions {
    /// report a top-level `exit` or `quit` as a request to stop
    pub detect_termination: bool,
}

impl Default for ReflectOptions {
    fn default() -> ReflectOptions {
        return ReflectOptions {
            detect_termination: true,
        };
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Reflection {
    raw_level: isize,
    code_block: bool,
    syntax_error: Option<String>,
    terminate: bool,
}

impl Reflection {
    /// Nesting depth, never below zero.
    pub fn level(&self) -> usize {
        if self.raw_level < 0 {
            return 0;
        }
        return self.raw_level as usize;
    }

    /// Nesting depth before clamping. Negative when there are more
    /// closers than openers.
    pub fn raw_level(&self) -> isize {
        return self.raw_level;
    }

    /// True when the source parses cleanly and no literal is left open.
    pub fn is_code_block(&self) -> bool {
        return self.code_block;
    }

    /// The parser's message, only for errors more input cannot fix.
    pub fn syntax_error(&self) -> Option<&str> {
        return self.syntax_error.as_deref();
    }

    pub fn has_syntax_error(&self) -> bool {
        return self.syntax_error.is_some();
    }

    pub fn terminate(&self) -> bool {
        return self.terminate;
    }
}

#[derive(Debug, Default)]
struct Walk {
    level: isize,
    in_string: Option<String>,
    in_regexp: Option<String>,
    in_word_array: Option<String>,
    terminate: bool,
    parse_failed: bool,
    syntax_error: Option<String>,
}

fn close_literal(open: &mut Option<String>, close: &str) -> bool {
    let matched = open.as_ref().map_or(false, |o| tokens_match(o, close));
    if matched {
        *open = None;
    }
    return matched;
}

impl Walk {
    fn token(&mut self, token: &Token, options: &ReflectOptions) {
        let text = token.text.as_str();
        match token.kind {
            TokenKind::Keyword if self.in_string.is_none() && self.in_regexp.is_none() => {
                if BLOCK_KEYWORDS.contains(text) {
                    self.level += 1;
                } else if text == "end" {
                    self.level -= 1;
                }
            }
            TokenKind::LBracket | TokenKind::LBrace | TokenKind::EmbExprBeg => {
                self.level += 1;
            }
            TokenKind::RBracket | TokenKind::RBrace => {
                self.level -= 1;
            }
            // a heredoc body starts on the next line, the rest of this
            // one is still code
            TokenKind::TStringBeg | TokenKind::SymBeg if !text.starts_with("<<") => {
                if self.in_string.is_none() {
                    self.in_string = Some(text.to_string());
                    self.level += 1;
                }
            }
            TokenKind::TStringEnd => {
                if close_literal(&mut self.in_string, text) {
                    self.level -= 1;
                }
            }
            TokenKind::QWordsBeg => {
                self.in_word_array = Some(text.trim().to_string());
                self.level += 1;
            }
            TokenKind::WordsSep => {
                if close_literal(&mut self.in_word_array, text) {
                    self.level -= 1;
                }
            }
            TokenKind::RegexpBeg => {
                self.in_regexp = Some(text.to_string());
                self.level += 1;
            }
            TokenKind::RegexpEnd => {
                let delimiter = text.trim_end_matches(|c: char| c.is_ascii_alphabetic());
                if close_literal(&mut self.in_regexp, delimiter) {
                    self.level -= 1;
                }
            }
            TokenKind::Ident
                if options.detect_termination
                    && self.level == 0
                    && TERMINATION_WORDS.contains(text) =>
            {
                self.terminate = true;
            }
            _ => {}
        }
    }

    fn parse_error(&mut self, error: ParseError) {
        self.parse_failed = true;
        // running out of input is never a real mistake, the user may
        // still be typing
        if !error.is_unexpected_end() {
            self.syntax_error = Some(error.message);
        }
    }

    fn finish(self) -> Reflection {
        let open_literal = self.in_string.is_some()
            || self.in_regexp.is_some()
            || self.in_word_array.is_some();
        return Reflection {
            raw_level: self.level,
            code_block: !self.parse_failed && !open_literal,
            syntax_error: self.syntax_error,
            terminate: self.terminate,
        };
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Reflector {
    options: ReflectOptions,
}

impl Reflector {
    pub fn new(options: ReflectOptions) -> Reflector {
        return Reflector { options };
    }

    pub fn options(&self) -> &ReflectOptions {
        return &self.options;
    }

    pub fn reflect(&self, source: &str) -> Reflection {
        let mut walk = Walk::default();
        for event in Parser::new(source) {
            match event {
                Event::Token(token) => walk.token(&token, &self.options),
                Event::ParseError(error) => walk.parse_error(error),
            }
        }
        let reflection = walk.finish();
        debug!(
            "reflected {} bytes: level {}, code block {}, syntax error {:?}",
            source.len(),
            reflection.raw_level,
            reflection.code_block,
            reflection.syntax_error
        );
        return reflection;
    }
}

/// Reflect with the default options.
pub fn reflect(source: &str) -> Reflection {
    return Reflector::default().reflect(source);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_levels() {
        assert_eq!(0, reflect("").level());
        assert_eq!(1, reflect("class Foo").level());
        assert_eq!(2, reflect("class Foo; def foo").level());
        assert_eq!(1, reflect("class Foo; def foo; end").level());
        assert_eq!(0, reflect("class Foo; def foo; end; end").level());
        assert_eq!(1, reflect("[1,\n2").level());
        assert_eq!(2, reflect("foo(1) { [").level());
        assert_eq!(1, reflect("'abc").level());
        assert_eq!(0, reflect("\"#{1 + 2}\"").level());
        assert_eq!(0, reflect("%W{a #{b} c}").level());
    }

    #[test]
    fn test_parens_do_not_nest() {
        assert_eq!(0, reflect("foo('bar'").level());
        assert_eq!(0, reflect("foo(").level());
    }

    #[test]
    fn test_modifiers_do_not_nest() {
        assert_eq!(0, reflect("x if y").level());
        assert_eq!(0, reflect("foo rescue nil").level());
        assert_eq!(1, reflect("while x do").level());
        assert_eq!(1, reflect("until done?").level());
        assert_eq!(1, reflect("for i in list do").level());
        assert_eq!(1, reflect("5.times do |i|").level());
    }

    #[test]
    fn test_keywords_inside_strings() {
        assert_eq!(0, reflect("'class Foo'").level());
        assert_eq!(0, reflect("x =~ /if end/").level());
        assert_eq!(0, reflect("\"#{if x then 1 end}\"").level());
    }

    #[test]
    fn test_inner_string_closes_the_outer_one() {
        let reflection = reflect("\"#{\"x\"}");
        assert_eq!(0, reflection.level());
        assert!(!reflection.is_code_block());
        assert_eq!(None, reflection.syntax_error());
    }

    #[test]
    fn test_heredocs() {
        let open = reflect("x = <<EOS");
        assert_eq!(0, open.level());
        assert!(!open.is_code_block());
        assert_eq!(None, open.syntax_error());

        assert!(!reflect("x = <<~EOS\n  if y").is_code_block());
        assert!(reflect("x = <<EOS\nhi\nEOS").is_code_block());
        assert_eq!(1, reflect("foo(<<~EOS) do |x|\n  end\nEOS").level());
        assert!(reflect("class << self\nend").is_code_block());
    }

    #[test]
    fn test_line_continuation() {
        let reflection = reflect("puts 'a' \\");
        assert_eq!(0, reflection.level());
        assert!(!reflection.is_code_block());
        assert_eq!(None, reflection.syntax_error());
        assert!(reflect("puts 'a' \\\n  'b'").is_code_block());
    }

    #[test]
    fn test_negative_level_is_clamped() {
        let reflection = reflect("end");
        assert_eq!(0, reflection.level());
        assert_eq!(-1, reflection.raw_level());
        assert_eq!(
            Some("syntax error, unexpected keyword_end, expecting $end"),
            reflection.syntax_error()
        );
    }

    #[test]
    fn test_code_blocks() {
        assert!(reflect("").is_code_block());
        assert!(reflect("5").is_code_block());
        assert!(reflect("x = 1").is_code_block());
        assert!(reflect("%w{a b c}").is_code_block());
        assert!(reflect("x =~ /foo/i").is_code_block());
        assert!(reflect("class Foo; end").is_code_block());

        assert!(!reflect("class Foo").is_code_block());
        assert!(!reflect("foo('bar'").is_code_block());
        assert!(!reflect("1 +").is_code_block());
        assert!(!reflect("=begin").is_code_block());
        assert!(!reflect("def; foo").is_code_block());
        assert!(reflect("def foo(a:, b: 1); end").is_code_block());
        assert!(reflect("items\n  .map(&:to_s)\n  .join").is_code_block());
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(None, reflect("def foo; p :ok").syntax_error());
        assert_eq!(None, reflect("foo('bar'").syntax_error());
        assert_eq!(
            Some("syntax error, unexpected ';'"),
            reflect("def; foo").syntax_error()
        );
        assert!(reflect("class foo").has_syntax_error());
        assert!(!reflect("class Foo").has_syntax_error());
    }

    #[test]
    fn test_termination() {
        assert!(reflect("exit").terminate());
        assert!(reflect("quit").terminate());
        assert!(reflect("x = 1; exit").terminate());
        assert!(!reflect("def foo; exit").terminate());
        assert!(!reflect("exit_code = 1").terminate());
        assert!(!reflect("'exit'").terminate());

        let reflector = Reflector::new(ReflectOptions {
            detect_termination: false,
        });
        assert!(!reflector.reflect("exit").terminate());
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("%w{", "}"));
        assert!(tokens_match("\"", "\""));
        assert!(tokens_match("%q(", ")"));
        assert!(tokens_match("%r[", "]"));
        assert!(tokens_match("%i<", ">"));
        assert!(tokens_match("%Q|", "|"));
        assert!(!tokens_match("'", "\""));
        assert!(!tokens_match("%w{", " "));
        assert!(!tokens_match("", "}"));
    }
}
