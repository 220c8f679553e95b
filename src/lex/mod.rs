use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char as char_parse, one_of};
use nom::combinator::recognize;
use nom::multi::many1;
use nom::sequence::pair;
use nom::{IResult, InputTake};
use nom_locate::LocatedSpan;

use std::collections::HashSet;

pub mod num;
pub mod strings;

use self::strings::{heredoc_start, next_heredoc_chunk, Chunk, Heredoc, Literal, LiteralKind};

pub type LexInput<'a> = LocatedSpan<&'a str>;

/**

Ruby is line oriented but otherwise free-form. Whether a character starts
a literal or an operator depends on what came before it (`a / b` divides,
`p /b/` matches), so the lexer carries a small state describing the
position inside the current expression, plus a stack of open literals.

 */
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Keyword,
    // `if`, `unless`, `while`, `until`, `rescue` used as statement
    // modifiers, and the `do` closing a loop condition
    ModifierKeyword,
    Ident,
    Const,
    IVar,
    CVar,
    GVar,
    Int,
    Float,
    Symbol,
    CharLit,
    Label,
    Op,
    Period,
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    TStringBeg,
    TStringContent,
    TStringEnd,
    SymBeg,
    EmbExprBeg,
    RegexpBeg,
    RegexpEnd,
    QWordsBeg,
    WordsSep,
    Space,
    Comment,
    Newline,
    IgnoredNewline,
    Invalid,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: usize,
}

impl Token {
    fn from_span(kind: TokenKind, span: LexInput) -> Token {
        return Token {
            kind,
            text: span.fragment().to_string(),
            line: span.location_line(),
            column: span.get_column(),
        };
    }

    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        return self.kind == kind && self.text == text;
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LexState {
    // start of an expression
    Beg,
    // after `return`, `break` and friends
    Mid,
    // after a name that may take command arguments
    Arg,
    // after a complete operand
    End,
    // after `.`, `&.` or `::`
    Dot,
    // where a method name is expected (`def`, `alias`, `undef`)
    Fname,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpenConstruct {
    Literal(LiteralKind),
    Interpolation,
    EmbeddedDocument,
    Heredoc,
    // a trailing backslash
    LineContinuation,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Mode<'a> {
    Literal(Literal),
    Interpolation { braces: usize },
    // `resume` is the state to restore once the terminator line is read
    Heredoc { heredoc: Heredoc<'a>, resume: LexState },
}

lazy_static! {
pub static ref KWDS: HashSet<&'static str> = "
     alias     and       begin     BEGIN     break     case
     class     def       defined?  do        else      elsif
     end       END       ensure    false     for       if
     in        module    next      nil       not       or
     redo      rescue    retry     return    self      super
     then      true      undef     unless    until     when
     while     yield     __FILE__  __LINE__  __ENCODING__".split_whitespace().collect();
}

fn is_keyword(s: &str) -> bool {
    return KWDS.contains(s);
}

fn is_blank(c: char) -> bool {
    return c == ' ' || c == '\t' || c == '\r' || c == '\x0b' || c == '\x0c';
}

pub fn is_ident_char(c: char) -> bool {
    return c.is_alphanumeric() || c == '_' || !c.is_ascii();
}

fn ident_len(s: &str) -> usize {
    return s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len());
}

// `=begin`, `=end` and `__END__` only count when they start a line and
// stand alone as a word
fn starts_line_keyword(s: &str, keyword: &str) -> bool {
    return s.starts_with(keyword)
        && s[keyword.len()..].chars().next().map_or(true, |c| c.is_whitespace());
}

pub fn parse_whitespace(input: LexInput) -> IResult<LexInput, LexInput> {
    return recognize(many1(alt((
        take_while1(is_blank),
        tag("\\\r\n"),
        tag("\\\n"),
    ))))(input);
}

pub fn parse_comment(input: LexInput) -> IResult<LexInput, LexInput> {
    return recognize(pair(char_parse('#'), take_while(|c: char| c != '\n')))(input);
}

pub fn parse_operator(input: LexInput) -> IResult<LexInput, LexInput> {
    return alt((
        alt((tag("**="), tag("<=>"), tag("==="), tag("..."),
             tag("<<="), tag(">>="), tag("&&="), tag("||="))),
        alt((tag("**"), tag("=="), tag("!="), tag("=~"), tag("!~"),
             tag(">="), tag("<="), tag("&&"), tag("||"), tag("<<"), tag(">>"))),
        alt((tag("+="), tag("-="), tag("*="), tag("/="), tag("%="),
             tag("|="), tag("&="), tag("^="), tag("=>"), tag("->"),
             tag(".."), tag("::"))),
        recognize(one_of("+-*/%=<>!&|^~?:.")),
    ))(input);
}

// operators that can be defined as methods, as in `def <=>(other)` or `:[]=`
pub fn parse_method_operator(input: LexInput) -> IResult<LexInput, LexInput> {
    return alt((
        alt((tag("[]="), tag("[]"), tag("+@"), tag("-@"), tag("!@"), tag("~@"),
             tag("<=>"), tag("==="), tag("=="), tag("=~"), tag("!~"), tag("!="))),
        alt((tag("**"), tag("<<"), tag(">>"), tag("<="), tag(">="))),
        recognize(one_of("+-*/%<>!&|^~")),
    ))(input);
}

fn global_var_len(rest: &str) -> Option<usize> {
    let body = &rest[1..];
    let first = body.chars().next()?;
    if first == '-' {
        let option = body[1..].chars().next()?;
        if is_ident_char(option) {
            return Some(2 + option.len_utf8());
        }
        return None;
    }
    if first.is_ascii_digit() {
        return Some(1 + body.find(|c: char| !c.is_ascii_digit()).unwrap_or(body.len()));
    }
    if is_ident_char(first) {
        return Some(1 + ident_len(body));
    }
    if "~*$?!@/\\;,.=:<>\"&`'+".contains(first) {
        return Some(2);
    }
    return None;
}

// `foo\n  .bar` carries on with the next line
fn continues_chain(next_line: &str) -> bool {
    let text = next_line.trim_start_matches(is_blank);
    return (text.starts_with('.') && !text.starts_with("..")) || text.starts_with("&.");
}

fn symbol_len(body: &str) -> Option<usize> {
    let first = body.chars().next()?;
    if first == '$' {
        return global_var_len(body);
    }
    if first == '@' {
        let sigil = if body.starts_with("@@") { 2 } else { 1 };
        let name = &body[sigil..];
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        return match ident_len(name) {
            0 => None,
            n => Some(sigil + n),
        };
    }
    if is_ident_char(first) && !first.is_ascii_digit() {
        let len = ident_len(body);
        let mut after = body[len..].chars();
        return match (after.next(), after.next()) {
            (Some('?'), next) | (Some('!'), next) if next != Some('=') => Some(len + 1),
            (Some('='), next) if next != Some('=') && next != Some('~') && next != Some('>') => {
                Some(len + 1)
            }
            _ => Some(len),
        };
    }
    return parse_method_operator(LexInput::new(body))
        .ok()
        .map(|(_, op)| op.fragment().len());
}

pub struct Lexer<'a> {
    rest: LexInput<'a>,
    state: LexState,
    modes: Vec<Mode<'a>>,
    // heredocs opened on the current line, their bodies start on the next
    heredocs: Vec<Heredoc<'a>>,
    // bracket depths at which a `while`/`until`/`for` condition is open
    conditions: Vec<usize>,
    depth: usize,
    space_seen: bool,
    line_start: bool,
    open_embdoc: bool,
    // `class << self` is never a heredoc
    class_seen: bool,
    continued: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        return Lexer {
            rest: LexInput::new(input),
            state: LexState::Beg,
            modes: Vec::new(),
            heredocs: Vec::new(),
            conditions: Vec::new(),
            depth: 0,
            space_seen: true,
            line_start: true,
            open_embdoc: false,
            class_seen: false,
            continued: false,
            finished: false,
        };
    }

    pub fn state(&self) -> LexState {
        return self.state;
    }

    /**
     * What is still open once the input has been consumed, if anything.
     * An unterminated literal, interpolation or embedded document means
     * the source cannot be complete yet.
     */
    pub fn open_construct(&self) -> Option<OpenConstruct> {
        if self.open_embdoc {
            return Some(OpenConstruct::EmbeddedDocument);
        }
        if self.continued {
            return Some(OpenConstruct::LineContinuation);
        }
        if !self.heredocs.is_empty() {
            return Some(OpenConstruct::Heredoc);
        }
        return match self.modes.last() {
            Some(Mode::Literal(literal)) => Some(OpenConstruct::Literal(literal.kind)),
            Some(Mode::Interpolation { .. }) => Some(OpenConstruct::Interpolation),
            Some(Mode::Heredoc { .. }) => Some(OpenConstruct::Heredoc),
            None => None,
        };
    }

    fn remaining(&self) -> &'a str {
        return *self.rest.fragment();
    }

    fn emit(&mut self, len: usize, kind: TokenKind) -> Token {
        let (rest, taken) = self.rest.take_split(len);
        self.rest = rest;
        self.space_seen = match kind {
            TokenKind::Space | TokenKind::Comment | TokenKind::Newline | TokenKind::IgnoredNewline => true,
            _ => false,
        };
        self.line_start = taken.fragment().ends_with('\n');
        if kind != TokenKind::Space {
            self.class_seen = false;
        }
        return Token::from_span(kind, taken);
    }

    fn run<P>(&mut self, parser: P, kind: TokenKind) -> Option<Token>
    where
        P: Fn(LexInput<'a>) -> IResult<LexInput<'a>, LexInput<'a>>,
    {
        return match parser(self.rest) {
            Ok((_, taken)) => Some(self.emit(taken.fragment().len(), kind)),
            Err(_) => None,
        };
    }

    fn invalid(&mut self) -> Token {
        let len = self.remaining().chars().next().map_or(0, |c| c.len_utf8());
        return self.emit(len, TokenKind::Invalid);
    }

    fn literal_allowed(&self, next: Option<char>) -> bool {
        return match self.state {
            LexState::Beg | LexState::Mid => true,
            LexState::Arg => self.space_seen && next.map_or(false, |c| !c.is_whitespace()),
            _ => false,
        };
    }

    fn end_conditions(&mut self) {
        while let Some(&depth) = self.conditions.last() {
            if depth < self.depth {
                break;
            }
            self.conditions.pop();
        }
    }

    fn lex_code(&mut self) -> Option<Token> {
        let rest = self.remaining();
        if self.line_start && self.modes.is_empty() {
            if starts_line_keyword(rest, "__END__") {
                self.finished = true;
                return None;
            }
            if starts_line_keyword(rest, "=begin") {
                return Some(self.embedded_document());
            }
        }
        if self.state == LexState::Fname {
            if let Some(token) = self.run(parse_method_operator, TokenKind::Op) {
                self.state = LexState::End;
                return Some(token);
            }
        }

        let mut chars = rest.chars();
        let c = chars.next()?;
        let next = chars.next();
        let token = match c {
            c if is_blank(c) => self.run(parse_whitespace, TokenKind::Space),
            '\\' if next == Some('\n') || rest.starts_with("\\\r\n") => {
                self.run(parse_whitespace, TokenKind::Space)
            }
            '\\' if next.is_none() => {
                // the next line has not been typed yet
                self.continued = true;
                Some(self.emit(1, TokenKind::Space))
            }
            '#' => self.run(parse_comment, TokenKind::Comment),
            '\n' => Some(self.newline()),
            ';' => {
                self.end_conditions();
                self.state = LexState::Beg;
                Some(self.emit(1, TokenKind::Semicolon))
            }
            ',' => {
                self.state = LexState::Beg;
                Some(self.emit(1, TokenKind::Comma))
            }
            '(' | '[' | '{' => Some(self.open_bracket(c)),
            ')' | ']' | '}' => Some(self.close_bracket(c)),
            '\'' | '"' | '`' => {
                let literal = Literal::new(LiteralKind::Str, c, c != '\'');
                Some(self.begin_literal(1, TokenKind::TStringBeg, literal))
            }
            ':' => Some(self.colon()),
            '?' => Some(self.question_mark()),
            '/' if self.literal_allowed(next) => {
                let literal = Literal::new(LiteralKind::Regexp, '/', true);
                Some(self.begin_literal(1, TokenKind::RegexpBeg, literal))
            }
            '%' => self.percent_literal().or_else(|| self.operator()),
            '<' if next == Some('<')
                && !self.class_seen
                && self.literal_allowed(rest[2..].chars().next()) =>
            {
                self.heredoc().or_else(|| self.operator())
            }
            '.' if next != Some('.') => {
                self.state = LexState::Dot;
                Some(self.emit(1, TokenKind::Period))
            }
            '&' if next == Some('.') => {
                self.state = LexState::Dot;
                Some(self.emit(2, TokenKind::Period))
            }
            '@' => self.instance_var(),
            '$' => self.global_var(),
            '0'..='9' => self.number(),
            c if is_ident_char(c) => Some(self.identifier()),
            _ => self.operator(),
        };
        return Some(token.unwrap_or_else(|| self.invalid()));
    }

    fn lex_literal(&mut self) -> Option<Token> {
        let rest = self.remaining();
        let chunk = match self.modes.last_mut() {
            Some(Mode::Literal(literal)) => strings::next_chunk(literal, rest),
            _ => return None,
        };
        let token = match chunk {
            Chunk::Content(len) => self.emit(len, TokenKind::TStringContent),
            Chunk::Separator(len) => self.emit(len, TokenKind::WordsSep),
            Chunk::Interpolation => {
                self.modes.push(Mode::Interpolation { braces: 0 });
                self.state = LexState::Beg;
                self.emit(2, TokenKind::EmbExprBeg)
            }
            Chunk::Close(len) => {
                let kind = match self.modes.pop() {
                    Some(Mode::Literal(literal)) => literal.kind.closing_token(),
                    _ => TokenKind::TStringEnd,
                };
                self.state = LexState::End;
                self.emit(len, kind)
            }
        };
        return Some(token);
    }

    fn lex_heredoc(&mut self) -> Option<Token> {
        let (heredoc, resume) = match self.modes.last() {
            Some(&Mode::Heredoc { heredoc, resume }) => (heredoc, resume),
            _ => return None,
        };
        let token = match next_heredoc_chunk(&heredoc, self.remaining(), self.line_start) {
            Chunk::Content(len) | Chunk::Separator(len) => self.emit(len, TokenKind::TStringContent),
            Chunk::Interpolation => {
                self.modes.push(Mode::Interpolation { braces: 0 });
                self.state = LexState::Beg;
                self.emit(2, TokenKind::EmbExprBeg)
            }
            Chunk::Close(len) => {
                self.modes.pop();
                self.state = resume;
                self.emit(len, TokenKind::TStringEnd)
            }
        };
        return Some(token);
    }

    fn newline(&mut self) -> Token {
        // a newline after an operator, a comma or `def` continues the expression
        let token = match self.state {
            LexState::Beg | LexState::Dot | LexState::Fname => {
                self.emit(1, TokenKind::IgnoredNewline)
            }
            _ if continues_chain(&self.remaining()[1..]) => self.emit(1, TokenKind::IgnoredNewline),
            _ => {
                self.end_conditions();
                self.state = LexState::Beg;
                self.emit(1, TokenKind::Newline)
            }
        };
        if !self.heredocs.is_empty() {
            let heredoc = self.heredocs.remove(0);
            self.modes.push(Mode::Heredoc { heredoc, resume: self.state });
        }
        return token;
    }

    fn embedded_document(&mut self) -> Token {
        let rest = self.remaining();
        let mut offset = 0;
        let mut closed = false;
        let len = loop {
            match rest[offset..].find('\n') {
                None => break rest.len(),
                Some(newline) => {
                    let line = offset + newline + 1;
                    if starts_line_keyword(&rest[line..], "=end") {
                        closed = true;
                        break rest[line..].find('\n').map_or(rest.len(), |n| line + n);
                    }
                    offset = line;
                }
            }
        };
        self.open_embdoc = !closed;
        return self.emit(len, TokenKind::Comment);
    }

    fn open_bracket(&mut self, c: char) -> Token {
        self.depth += 1;
        if c == '{' {
            if let Some(Mode::Interpolation { braces }) = self.modes.last_mut() {
                *braces += 1;
            }
        }
        self.state = LexState::Beg;
        let kind = match c {
            '(' => TokenKind::LParen,
            '[' => TokenKind::LBracket,
            _ => TokenKind::LBrace,
        };
        return self.emit(1, kind);
    }

    fn close_bracket(&mut self, c: char) -> Token {
        if c == '}' {
            if let Some(Mode::Interpolation { braces }) = self.modes.last_mut() {
                if *braces == 0 {
                    // closes `#{`, back inside the enclosing literal
                    self.modes.pop();
                    return self.emit(1, TokenKind::RBrace);
                }
                *braces -= 1;
            }
        }
        self.depth = self.depth.saturating_sub(1);
        self.state = LexState::End;
        let kind = match c {
            ')' => TokenKind::RParen,
            ']' => TokenKind::RBracket,
            _ => TokenKind::RBrace,
        };
        return self.emit(1, kind);
    }

    fn begin_literal(&mut self, len: usize, kind: TokenKind, literal: Literal) -> Token {
        self.modes.push(Mode::Literal(literal));
        self.state = LexState::Beg;
        return self.emit(len, kind);
    }

    fn colon(&mut self) -> Token {
        let rest = self.remaining();
        if rest.starts_with("::") {
            self.state = LexState::Dot;
            return self.emit(2, TokenKind::Op);
        }
        let body = &rest[1..];
        match body.chars().next() {
            Some(quote @ '"') | Some(quote @ '\'') => {
                let literal = Literal::new(LiteralKind::Str, quote, quote == '"');
                return self.begin_literal(2, TokenKind::SymBeg, literal);
            }
            Some(c) if self.state != LexState::End && !c.is_whitespace() => {
                if let Some(len) = symbol_len(body) {
                    self.state = LexState::End;
                    return self.emit(1 + len, TokenKind::Symbol);
                }
            }
            _ => {}
        }
        self.state = LexState::Beg;
        return self.emit(1, TokenKind::Op);
    }

    fn question_mark(&mut self) -> Token {
        let rest = self.remaining();
        let allowed = match self.state {
            LexState::Beg | LexState::Mid => true,
            LexState::Arg => self.space_seen,
            _ => false,
        };
        let mut chars = rest[1..].chars();
        if let (true, Some(c)) = (allowed, chars.next()) {
            if !c.is_whitespace() {
                let len = match c {
                    '\\' => 2 + chars.next().map_or(0, |e| e.len_utf8()),
                    _ => 1 + c.len_utf8(),
                };
                let after = rest[len..].chars().next();
                if c == '\\' || !is_ident_char(c) || !after.map_or(false, is_ident_char) {
                    self.state = LexState::End;
                    return self.emit(len, TokenKind::CharLit);
                }
            }
        }
        self.state = LexState::Beg;
        return self.emit(1, TokenKind::Op);
    }

    fn percent_literal(&mut self) -> Option<Token> {
        let rest = self.remaining();
        let mut chars = rest[1..].chars();
        let first = chars.next()?;
        if !self.literal_allowed(Some(first)) || (self.state == LexState::Arg && first == '=') {
            return None;
        }
        let (type_char, delimiter) = if first.is_ascii_alphabetic() {
            (Some(first), chars.next()?)
        } else {
            (None, first)
        };
        if delimiter.is_alphanumeric() || delimiter.is_whitespace() {
            return None;
        }
        let (kind, token_kind, interpolate) = match type_char {
            None | Some('Q') | Some('x') => (LiteralKind::Str, TokenKind::TStringBeg, true),
            Some('q') => (LiteralKind::Str, TokenKind::TStringBeg, false),
            Some('s') => (LiteralKind::Str, TokenKind::SymBeg, false),
            Some('w') | Some('i') => (LiteralKind::Words, TokenKind::QWordsBeg, false),
            Some('W') | Some('I') => (LiteralKind::Words, TokenKind::QWordsBeg, true),
            Some('r') => (LiteralKind::Regexp, TokenKind::RegexpBeg, true),
            Some(_) => return None,
        };
        let len = 1 + type_char.map_or(0, |c| c.len_utf8()) + delimiter.len_utf8();
        let literal = Literal::new(kind, delimiter, interpolate);
        return Some(self.begin_literal(len, token_kind, literal));
    }

    fn heredoc(&mut self) -> Option<Token> {
        let (len, heredoc) = heredoc_start(self.remaining())?;
        self.heredocs.push(heredoc);
        self.state = LexState::End;
        return Some(self.emit(len, TokenKind::TStringBeg));
    }

    fn operator(&mut self) -> Option<Token> {
        let token = self.run(parse_operator, TokenKind::Op)?;
        self.state = match self.state {
            LexState::Fname => LexState::End,
            _ if token.text == "::" => LexState::Dot,
            _ => LexState::Beg,
        };
        return Some(token);
    }

    fn instance_var(&mut self) -> Option<Token> {
        let rest = self.remaining();
        let (sigil, kind) = if rest.starts_with("@@") {
            (2, TokenKind::CVar)
        } else {
            (1, TokenKind::IVar)
        };
        let name = &rest[sigil..];
        if name.starts_with(|c: char| c.is_ascii_digit()) || ident_len(name) == 0 {
            return None;
        }
        self.state = LexState::End;
        return Some(self.emit(sigil + ident_len(name), kind));
    }

    fn global_var(&mut self) -> Option<Token> {
        let len = global_var_len(self.remaining())?;
        self.state = LexState::End;
        return Some(self.emit(len, TokenKind::GVar));
    }

    fn number(&mut self) -> Option<Token> {
        let (_, (span, kind)) = num::parse_number(self.rest).ok()?;
        self.state = LexState::End;
        return Some(self.emit(span.fragment().len(), kind));
    }

    fn identifier(&mut self) -> Token {
        let rest = self.remaining();
        let mut len = ident_len(rest);
        let mut after = rest[len..].chars();
        let suffix = after.next();
        let following = after.next();

        match self.state {
            LexState::Beg | LexState::Mid | LexState::Arg
                if suffix == Some(':') && following != Some(':') =>
            {
                self.state = LexState::Beg;
                return self.emit(len + 1, TokenKind::Label);
            }
            _ => {}
        }
        if (suffix == Some('?') || suffix == Some('!')) && following != Some('=') {
            len += 1;
        }

        let word = &rest[..len];
        let previous = self.state;
        if previous != LexState::Dot && previous != LexState::Fname && is_keyword(word) {
            return self.keyword(len, word);
        }
        let kind = if word.starts_with(|c: char| c.is_uppercase()) {
            TokenKind::Const
        } else {
            TokenKind::Ident
        };
        self.state = match previous {
            LexState::Fname => LexState::End,
            _ => LexState::Arg,
        };
        return self.emit(len, kind);
    }

    fn keyword(&mut self, len: usize, word: &str) -> Token {
        let modifier = match word {
            "if" | "unless" | "while" | "until" | "rescue" => self.state != LexState::Beg,
            "do" => self.conditions.last() == Some(&self.depth),
            _ => false,
        };
        if modifier && word == "do" {
            self.conditions.pop();
        }
        if !modifier && (word == "while" || word == "until" || word == "for") {
            self.conditions.push(self.depth);
        }
        self.state = match word {
            "end" | "self" | "nil" | "true" | "false" | "redo" | "retry"
            | "__FILE__" | "__LINE__" | "__ENCODING__" => LexState::End,
            "def" | "alias" | "undef" => LexState::Fname,
            "return" | "break" | "next" | "yield" | "super" | "defined?" => LexState::Mid,
            _ => LexState::Beg,
        };
        let kind = if modifier {
            TokenKind::ModifierKeyword
        } else {
            TokenKind::Keyword
        };
        let token = self.emit(len, kind);
        self.class_seen = word == "class";
        return token;
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished || self.remaining().is_empty() {
            return None;
        }
        let token = match self.modes.last() {
            Some(Mode::Literal(_)) => self.lex_literal(),
            Some(Mode::Heredoc { .. }) => self.lex_heredoc(),
            _ => self.lex_code(),
        }?;
        trace!("{:?} {:?} at {}:{}", token.kind, token.text, token.line, token.column);
        return Some(token);
    }
}

pub fn lex_all(input: &str) -> Vec<Token> {
    return Lexer::new(input).collect();
}

pub fn no_ignored_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let mut return_value: Vec<Token> = Vec::new();
    for token in tokens.into_iter() {
        match token.kind {
            TokenKind::Space | TokenKind::Comment | TokenKind::IgnoredNewline => {}
            _ => return_value.push(token),
        }
    }
    return return_value;
}

#[macro_export]
macro_rules! assert_full_lex {
    ($input: expr, $expected: expr) => {
        let tokens = $crate::lex::no_ignored_tokens($crate::lex::lex_all($input));
        let lexed: Vec<($crate::lex::TokenKind, &str)> = tokens
            .iter()
            .map(|t| (t.kind, t.text.as_str()))
            .collect();
        let expected: Vec<($crate::lex::TokenKind, &str)> = $expected;
        assert_eq!(expected, lexed, "tokens of {:?}", $input);
    };
}
