pub mod utils;

use std::collections::HashSet;

use crate::lex::{Lexer, Token, TokenKind};
use self::utils::describe;

/// Reported when the input stops in the middle of a construct. This is
/// the one error that more input can fix.
pub const UNEXPECTED_END: &str = "syntax error, unexpected $end";

pub const CONSTANT_NAME: &str = "class/module name must be CONSTANT";

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub line: u32,
}

impl ParseError {
    fn new<S: Into<String>>(message: S, line: u32) -> ParseError {
        return ParseError { message: message.into(), line };
    }

    pub fn is_unexpected_end(&self) -> bool {
        return self.message == UNEXPECTED_END;
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Event {
    Token(Token),
    ParseError(ParseError),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Frame {
    // anything closed by `end`
    Block,
    Paren,
    Bracket,
    Brace,
    Interpolation,
}

impl Frame {
    fn closer(self) -> &'static str {
        return match self {
            Frame::Block => "keyword_end",
            Frame::Paren => "')'",
            Frame::Bracket => "']'",
            Frame::Brace | Frame::Interpolation => "'}'",
        };
    }
}

/// Where we are inside the current expression.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Position {
    // nothing yet, a statement may start here
    Start,
    // an operand is required (after a binary operator, `if`, `.`)
    Operand,
    // a list item is required (after a comma, a splat or a block pass)
    Item,
    // an operand was just completed
    After,
    // after `key:`, whose value may be left out as in `def foo(a:)`
    Label,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Expect {
    Nothing,
    ClassName,
    MethodName,
    // a method name was read, `.` would make it a singleton receiver
    MethodDot,
    BlockParams,
    InBlockParams,
}

lazy_static! {
    static ref PREFIX_OPERATORS: HashSet<&'static str> =
        "- + ! ~ * ** & :: -> .. ...".split_whitespace().collect();
}

fn unexpected(token: &Token) -> String {
    return format!("syntax error, unexpected {}", describe(token));
}

/**

A shallow recognizer for Ruby. It does not build a tree; it tracks just
enough (open blocks and brackets, and whether an operand is due) to tell
apart source that is unfinished from source that is wrong.

The parser passes every token through as an `Event::Token`. The first
problem found is reported as an `Event::ParseError` directly after the
offending token, and the stream stops there. Input that ends while
something is still open reports `UNEXPECTED_END` as its last event.

 */
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    frames: Vec<Frame>,
    position: Position,
    expect: Expect,
    pending: Option<ParseError>,
    line: u32,
    done: bool,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Parser<'a> {
        return Parser {
            lexer: Lexer::new(input),
            frames: Vec::new(),
            position: Position::Start,
            expect: Expect::Nothing,
            pending: None,
            line: 1,
            done: false,
        };
    }

    fn awaiting_input(&self) -> bool {
        return self.lexer.open_construct().is_some()
            || !self.frames.is_empty()
            || self.position == Position::Operand
            || self.position == Position::Item
            || self.position == Position::Label
            || self.expect == Expect::ClassName
            || self.expect == Expect::MethodName
            || self.expect == Expect::InBlockParams;
    }

    fn check(&mut self, token: &Token) -> Result<(), String> {
        match token.kind {
            TokenKind::Space
            | TokenKind::Comment
            | TokenKind::IgnoredNewline
            | TokenKind::TStringContent
            | TokenKind::TStringEnd
            | TokenKind::RegexpEnd
            | TokenKind::WordsSep => return Ok(()),
            _ => {}
        }

        match self.expect {
            Expect::Nothing => {}
            Expect::ClassName => return self.class_name(token),
            Expect::MethodName => return self.method_name(token),
            Expect::MethodDot => {
                self.expect = Expect::Nothing;
                if token.kind == TokenKind::Period {
                    self.expect = Expect::MethodName;
                    return Ok(());
                }
            }
            Expect::BlockParams => {
                self.expect = Expect::Nothing;
                if token.is(TokenKind::Op, "|") {
                    self.expect = Expect::InBlockParams;
                    return Ok(());
                }
                if token.is(TokenKind::Op, "||") {
                    return Ok(());
                }
            }
            Expect::InBlockParams => {
                if token.is(TokenKind::Op, "|") {
                    self.expect = Expect::Nothing;
                    self.position = Position::Start;
                }
                return Ok(());
            }
        }

        return match token.kind {
            TokenKind::Newline | TokenKind::Semicolon => self.end_statement(token),
            TokenKind::Comma => {
                if self.position != Position::Label {
                    self.require_operand_done(token)?;
                }
                self.position = Position::Item;
                Ok(())
            }
            TokenKind::LParen => self.open(Frame::Paren),
            TokenKind::LBracket => self.open(Frame::Bracket),
            TokenKind::LBrace => {
                self.expect = Expect::BlockParams;
                self.open(Frame::Brace)
            }
            TokenKind::EmbExprBeg => self.open(Frame::Interpolation),
            TokenKind::RParen => self.close(token, Frame::Paren),
            TokenKind::RBracket => self.close(token, Frame::Bracket),
            TokenKind::RBrace => match self.frames.last() {
                Some(Frame::Interpolation) => self.close(token, Frame::Interpolation),
                _ => self.close(token, Frame::Brace),
            },
            TokenKind::Keyword => self.keyword(token),
            TokenKind::ModifierKeyword => {
                self.require_operand_done(token)?;
                self.position = if token.text == "do" {
                    Position::Start
                } else {
                    Position::Operand
                };
                Ok(())
            }
            TokenKind::Op => self.operator(token),
            TokenKind::Period => {
                self.require_operand_done(token)?;
                self.position = Position::Operand;
                Ok(())
            }
            TokenKind::Label => {
                self.position = Position::Label;
                Ok(())
            }
            TokenKind::Invalid => Err(format!(
                "Invalid char '{}' in expression",
                token.text.escape_default()
            )),
            _ => {
                self.position = Position::After;
                Ok(())
            }
        };
    }

    fn require_operand_done(&self, token: &Token) -> Result<(), String> {
        if self.position != Position::After {
            return Err(unexpected(token));
        }
        return Ok(());
    }

    fn end_statement(&mut self, token: &Token) -> Result<(), String> {
        match self.position {
            Position::Operand | Position::Item | Position::Label => return Err(unexpected(token)),
            _ => {}
        }
        self.position = Position::Start;
        return Ok(());
    }

    fn open(&mut self, frame: Frame) -> Result<(), String> {
        self.frames.push(frame);
        self.position = Position::Start;
        return Ok(());
    }

    fn close(&mut self, token: &Token, frame: Frame) -> Result<(), String> {
        if self.position == Position::Operand {
            return Err(unexpected(token));
        }
        return match self.frames.last() {
            Some(&open) if open == frame => {
                self.frames.pop();
                self.position = Position::After;
                Ok(())
            }
            Some(&open) => Err(format!("{}, expecting {}", unexpected(token), open.closer())),
            None => Err(unexpected(token)),
        };
    }

    fn close_block(&mut self, token: &Token) -> Result<(), String> {
        match self.position {
            Position::Operand | Position::Item | Position::Label => return Err(unexpected(token)),
            _ => {}
        }
        return match self.frames.last() {
            Some(Frame::Block) => {
                self.frames.pop();
                self.position = Position::After;
                Ok(())
            }
            Some(&open) => Err(format!("{}, expecting {}", unexpected(token), open.closer())),
            None => Err(format!("{}, expecting $end", unexpected(token))),
        };
    }

    // `else`, `when` and friends only make sense directly inside a block
    fn within_block(&self, token: &Token) -> Result<(), String> {
        match (self.position, self.frames.last()) {
            (Position::Operand, _) | (Position::Item, _) | (Position::Label, _) => {
                Err(unexpected(token))
            }
            (_, Some(Frame::Block)) => Ok(()),
            _ => Err(unexpected(token)),
        }
    }

    fn keyword(&mut self, token: &Token) -> Result<(), String> {
        match token.text.as_str() {
            "class" | "module" => {
                self.frames.push(Frame::Block);
                self.expect = Expect::ClassName;
            }
            "def" => {
                self.frames.push(Frame::Block);
                self.expect = Expect::MethodName;
            }
            "begin" | "case" => {
                self.frames.push(Frame::Block);
                self.position = Position::Start;
            }
            "if" | "unless" | "while" | "until" | "for" => {
                self.frames.push(Frame::Block);
                self.position = Position::Operand;
            }
            "do" => {
                self.frames.push(Frame::Block);
                self.expect = Expect::BlockParams;
                self.position = Position::Start;
            }
            "end" => return self.close_block(token),
            "then" | "else" | "ensure" => {
                self.within_block(token)?;
                self.position = Position::Start;
            }
            "rescue" => {
                // `rescue => e` and `rescue Error` both follow directly
                self.within_block(token)?;
                self.position = Position::After;
            }
            "elsif" | "when" | "in" => {
                self.within_block(token)?;
                self.position = Position::Operand;
            }
            "and" | "or" => {
                self.require_operand_done(token)?;
                self.position = Position::Operand;
            }
            "not" | "defined?" | "alias" | "undef" => {
                self.position = Position::Operand;
            }
            "BEGIN" | "END" => {
                self.position = Position::Start;
            }
            _ => {
                self.position = Position::After;
            }
        }
        return Ok(());
    }

    fn operator(&mut self, token: &Token) -> Result<(), String> {
        let op = token.text.as_str();
        if self.position == Position::After {
            self.position = Position::Operand;
            return Ok(());
        }
        if !PREFIX_OPERATORS.contains(op) {
            return Err(unexpected(token));
        }
        self.position = match op {
            // a bare splat or block pass, as in `foo(*)`
            "*" | "**" | "&" if self.position != Position::Operand => Position::Item,
            _ => Position::Operand,
        };
        return Ok(());
    }

    fn class_name(&mut self, token: &Token) -> Result<(), String> {
        self.expect = Expect::Nothing;
        return match token.kind {
            TokenKind::Const => {
                self.position = Position::After;
                Ok(())
            }
            TokenKind::Op if token.text == "<<" || token.text == "::" => {
                self.position = Position::Operand;
                Ok(())
            }
            TokenKind::Ident => Err(CONSTANT_NAME.to_string()),
            _ => Err(unexpected(token)),
        };
    }

    fn method_name(&mut self, token: &Token) -> Result<(), String> {
        return match token.kind {
            TokenKind::Ident | TokenKind::Const | TokenKind::Op => {
                self.expect = Expect::MethodDot;
                self.position = Position::After;
                Ok(())
            }
            _ => {
                self.expect = Expect::Nothing;
                Err(unexpected(token))
            }
        };
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if let Some(error) = self.pending.take() {
            return Some(Event::ParseError(error));
        }
        if self.done {
            return None;
        }
        match self.lexer.next() {
            Some(token) => {
                self.line = token.line;
                if let Err(message) = self.check(&token) {
                    debug!("parse error on line {}: {}", token.line, message);
                    self.pending = Some(ParseError::new(message, token.line));
                    self.done = true;
                }
                return Some(Event::Token(token));
            }
            None => {
                self.done = true;
                if self.awaiting_input() {
                    return Some(Event::ParseError(ParseError::new(UNEXPECTED_END, self.line)));
                }
                return None;
            }
        }
    }
}

/// The first error in `input`, if any.
pub fn first_error(input: &str) -> Option<ParseError> {
    for event in Parser::new(input) {
        if let Event::ParseError(error) = event {
            return Some(error);
        }
    }
    return None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::lex_all;
    use pretty_assertions::assert_eq;

    macro_rules! assert_parses {
        ($input: expr) => {
            assert_eq!(None, first_error($input), "parsing {:?}", $input);
        };
    }

    macro_rules! assert_parse_error {
        ($input: expr, $message: expr) => {
            assert_eq!(
                Some($message.to_string()),
                first_error($input).map(|e| e.message),
                "parsing {:?}",
                $input
            );
        };
    }

    #[test]
    fn test_complete_statements() {
        assert_parses!("");
        assert_parses!("x = 1");
        assert_parses!("a, b = 1, 2");
        assert_parses!("foo(*args, &blk)");
        assert_parses!("def ==(other); end");
        assert_parses!("def self.foo; end");
        assert_parses!("x = [1, 2,]");
        assert_parses!("{a: 1, 'b' => 2}");
        assert_parses!("while x do\n  y\nend");
        assert_parses!("for i in 1..3 do\nend");
        assert_parses!("begin\n  x\nrescue => e\n  y\nensure\n  z\nend");
        assert_parses!("x = if y then 1 else 2 end");
        assert_parses!("case x\nwhen 1 then :a\nelse :b\nend");
        assert_parses!("foo.each do |x|\n  puts x\nend");
        assert_parses!("[1, 2].map { |x| x * 2 }");
        assert_parses!("->(x) { x }");
        assert_parses!("p(1,\n2)");
        assert_parses!("\"a #{b} c\" + %w{d e}.join");
        assert_parses!("class Foo < Bar; end");
        assert_parses!("class << self; end");
        assert_parses!("return if x");
        assert_parses!("foo rescue nil");
        assert_parses!("def foo(a:)\nend");
        assert_parses!("def foo(a:, b: 1); end");
        assert_parses!("foo(key: 1, other:)");
        assert_parses!("x = <<~EOS\n  body #{y}\nEOS\nz");
        assert_parses!("foo(<<A, <<B)\na\nA\nb\nB");
        assert_parses!("items\n  .map { |i| i * 2 }\n  &.sum");
    }

    #[test]
    fn test_incomplete_input() {
        assert_parse_error!("class Foo", UNEXPECTED_END);
        assert_parse_error!("def foo; p :ok", UNEXPECTED_END);
        assert_parse_error!("foo('bar'", UNEXPECTED_END);
        assert_parse_error!("1 +", UNEXPECTED_END);
        assert_parse_error!("x if", UNEXPECTED_END);
        assert_parse_error!("[1,\n2", UNEXPECTED_END);
        assert_parse_error!("'abc", UNEXPECTED_END);
        assert_parse_error!("\"a #{b", UNEXPECTED_END);
        assert_parse_error!("=begin\nnotes", UNEXPECTED_END);
        assert_parse_error!("def", UNEXPECTED_END);
        assert_parse_error!("foo do |a,", UNEXPECTED_END);
        assert_parse_error!("puts 'a' \\", UNEXPECTED_END);
        assert_parse_error!("x = 1 + \\", UNEXPECTED_END);
        assert_parse_error!("x = <<EOS", UNEXPECTED_END);
        assert_parse_error!("x = <<-EOS\nbody", UNEXPECTED_END);
        assert_parse_error!("def foo(a:", UNEXPECTED_END);
    }

    #[test]
    fn test_genuine_errors() {
        assert_parse_error!("def; foo", "syntax error, unexpected ';'");
        assert_parse_error!("end", "syntax error, unexpected keyword_end, expecting $end");
        assert_parse_error!("class foo", CONSTANT_NAME);
        assert_parse_error!("(1 + 2]", "syntax error, unexpected ']', expecting ')'");
        assert_parse_error!("x = == 2", "syntax error, unexpected tEQ");
        assert_parse_error!("foo(1 +)", "syntax error, unexpected ')'");
        assert_parse_error!("}", "syntax error, unexpected '}'");
        assert_parse_error!("else", "syntax error, unexpected keyword_else");
        assert_parse_error!("x = \u{1}", "Invalid char '\\u{1}' in expression");
        assert_parse_error!("foo.;", "syntax error, unexpected ';'");
    }

    #[test]
    fn test_events_pass_tokens_through() {
        let input = "class Foo\n  def bar; 1 end\nend";
        let tokens: Vec<Token> = Parser::new(input)
            .filter_map(|event| match event {
                Event::Token(token) => Some(token),
                Event::ParseError(_) => None,
            })
            .collect();
        assert_eq!(lex_all(input), tokens);
    }

    #[test]
    fn test_stops_after_first_error() {
        let events: Vec<Event> = Parser::new("x\nend; end").collect();
        let errors: Vec<&ParseError> = events
            .iter()
            .filter_map(|event| match event {
                Event::ParseError(error) => Some(error),
                Event::Token(_) => None,
            })
            .collect();
        assert_eq!(1, errors.len());
        assert_eq!(2, errors[0].line);
        // the error comes right after `end`
        match &events[events.len() - 2] {
            Event::Token(token) => assert_eq!("end", token.text),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
