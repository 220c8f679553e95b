use std::fmt;

use crate::reflect::{Reflection, Reflector};

/**
 * The lines typed so far for the statement being entered. Reflection is
 * computed lazily and thrown away whenever the buffer changes.
 */
#[derive(Debug, Clone, Default)]
pub struct Source {
    lines: Vec<String>,
    reflector: Reflector,
    reflection: Option<Reflection>,
}

impl Source {
    pub fn new() -> Source {
        return Source::default();
    }

    pub fn with_reflector(reflector: Reflector) -> Source {
        return Source {
            lines: Vec::new(),
            reflector,
            reflection: None,
        };
    }

    /// Append a line with its trailing whitespace removed. Returns false,
    /// leaving the buffer alone, when nothing is left of it.
    pub fn push(&mut self, line: &str) -> bool {
        let line = line.trim_end();
        if line.is_empty() {
            return false;
        }
        self.lines.push(line.to_string());
        self.reflection = None;
        return true;
    }

    pub fn pop(&mut self) -> Option<String> {
        let line = self.lines.pop();
        if line.is_some() {
            self.reflection = None;
        }
        return line;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.reflection = None;
    }

    pub fn lines(&self) -> &[String] {
        return &self.lines;
    }

    pub fn len(&self) -> usize {
        return self.lines.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.lines.is_empty();
    }

    pub fn text(&self) -> String {
        return self.lines.join("\n");
    }

    pub fn reflect(&mut self) -> &Reflection {
        let reflector = &self.reflector;
        let lines = &self.lines;
        return self
            .reflection
            .get_or_insert_with(|| reflector.reflect(&lines.join("\n")));
    }

    pub fn level(&mut self) -> usize {
        return self.reflect().level();
    }

    /// A complete chunk of code, ready to hand to an evaluator.
    pub fn code_block(&mut self) -> bool {
        let reflection = self.reflect();
        return reflection.is_code_block() && reflection.level() == 0;
    }

    pub fn syntax_error(&mut self) -> Option<String> {
        return self.reflect().syntax_error().map(|s| s.to_string());
    }

    pub fn terminate(&mut self) -> bool {
        return self.reflect().terminate();
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}", self.lines.join("\n"));
    }
}
