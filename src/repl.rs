use std::io;
use std::io::{BufRead, Write};
use std::str::FromStr;

use termion::{color, style};

use crate::error::{Error, Result};
use crate::reflect::Reflector;
use crate::source::Source;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PromptMode {
    // irb(main):001:0>
    Default,
    // >>
    Simple,
    Null,
}

impl FromStr for PromptMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<PromptMode> {
        return match s {
            "default" => Ok(PromptMode::Default),
            "simple" => Ok(PromptMode::Simple),
            "null" | "none" => Ok(PromptMode::Null),
            other => Err(Error::InvalidPromptMode(other.to_string())),
        };
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub prompt: PromptMode,
    pub color: bool,
    pub reflector: Reflector,
}

impl Default for ConsoleConfig {
    fn default() -> ConsoleConfig {
        return ConsoleConfig {
            prompt: PromptMode::Default,
            color: true,
            reflector: Reflector::default(),
        };
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum LineOutcome {
    // nothing but whitespace
    Skip,
    // the statement goes on, prompt for another line
    More,
    // a complete block, re-indented
    Evaluate(String),
    // the line was dropped from the buffer
    SyntaxError(String),
    Terminate,
}

pub fn format_syntax_error(line: usize, message: &str) -> String {
    return format!("SyntaxError: compile error\n(irb):{}: {}", line, message);
}

/**
 * One console session: the pending source, the line counter used in
 * prompts and error messages, and the nesting level each buffered line
 * should be indented to.
 */
pub struct Context {
    config: ConsoleConfig,
    source: Source,
    line: usize,
    indents: Vec<usize>,
}

impl Context {
    pub fn new(config: ConsoleConfig) -> Context {
        let source = Source::with_reflector(config.reflector);
        return Context {
            config,
            source,
            line: 1,
            indents: Vec::new(),
        };
    }

    pub fn line(&self) -> usize {
        return self.line;
    }

    pub fn source(&self) -> &Source {
        return &self.source;
    }

    pub fn prompt(&mut self) -> String {
        let continuing = !self.source.is_empty();
        return match self.config.prompt {
            PromptMode::Default => {
                let level = self.source.level();
                let marker = if continuing { '*' } else { '>' };
                format!("irb(main):{:03}:{}{} ", self.line, level, marker)
            }
            PromptMode::Simple if continuing => "?> ".to_string(),
            PromptMode::Simple => ">> ".to_string(),
            PromptMode::Null => String::new(),
        };
    }

    pub fn process_line(&mut self, line: &str) -> LineOutcome {
        let level_before = self.source.level();
        if !self.source.push(line) {
            self.line += 1;
            return LineOutcome::Skip;
        }

        let outcome = if self.source.terminate() {
            info!("termination requested on line {}", self.line);
            LineOutcome::Terminate
        } else if let Some(message) = self.source.syntax_error() {
            self.source.pop();
            LineOutcome::SyntaxError(format_syntax_error(self.line, &message))
        } else {
            // a line that closes a block sits at the outer level
            let level_after = self.source.level();
            self.indents.push(level_before.min(level_after));
            if self.source.code_block() {
                let block = self.indented_block();
                self.source.clear();
                self.indents.clear();
                LineOutcome::Evaluate(block)
            } else {
                LineOutcome::More
            }
        };
        self.line += 1;
        return outcome;
    }

    fn indented_block(&self) -> String {
        return self
            .source
            .lines()
            .iter()
            .zip(self.indents.iter())
            .map(|(line, level)| format!("{}{}", "  ".repeat(*level), line.trim_start()))
            .collect::<Vec<String>>()
            .join("\n");
    }
}

pub fn run(config: ConsoleConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let interactive = termion::is_tty(&stdin);
    let color = config.color && termion::is_tty(&stdout);
    let mut context = Context::new(config);

    let input = &mut String::new();

    loop {
        if interactive {
            write!(stdout, "{}", context.prompt())?;
            // we flush to make sure it shows up
            stdout.flush()?;
        }

        input.clear();
        if stdin.lock().read_line(input)? == 0 {
            if interactive {
                writeln!(stdout)?;
            }
            break;
        }

        match context.process_line(input) {
            LineOutcome::Skip | LineOutcome::More => {}
            LineOutcome::Evaluate(block) => writeln!(stdout, "{}", block)?,
            LineOutcome::SyntaxError(message) => {
                if color {
                    writeln!(stdout, "{}{}{}", color::Fg(color::Red), message, style::Reset)?;
                } else {
                    writeln!(stdout, "{}", message)?;
                }
            }
            LineOutcome::Terminate => break,
        }
    }
    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context(prompt: PromptMode) -> Context {
        return Context::new(ConsoleConfig {
            prompt,
            color: false,
            reflector: Reflector::default(),
        });
    }

    #[test]
    fn test_prompt_modes() {
        assert_eq!(Ok(PromptMode::Simple), "simple".parse());
        assert_eq!(Ok(PromptMode::Null), "none".parse());
        assert_eq!(
            Err(Error::InvalidPromptMode("fancy".to_string())),
            "fancy".parse::<PromptMode>()
        );

        let mut ctx = context(PromptMode::Default);
        assert_eq!("irb(main):001:0> ", ctx.prompt());
        assert_eq!(LineOutcome::More, ctx.process_line("class Foo\n"));
        assert_eq!("irb(main):002:1* ", ctx.prompt());

        let mut ctx = context(PromptMode::Simple);
        assert_eq!(">> ", ctx.prompt());
        ctx.process_line("[1,");
        assert_eq!("?> ", ctx.prompt());

        assert_eq!("", context(PromptMode::Null).prompt());
    }

    #[test]
    fn test_blocks_are_collected_and_reindented() {
        let mut ctx = context(PromptMode::Default);
        for line in &["class Foo", "def bar", "1", "end"] {
            assert_eq!(LineOutcome::More, ctx.process_line(line));
        }
        assert_eq!(
            LineOutcome::Evaluate("class Foo\n  def bar\n    1\n  end\nend".to_string()),
            ctx.process_line("end")
        );
        assert!(ctx.source().is_empty());
        assert_eq!(6, ctx.line());
    }

    #[test]
    fn test_syntax_error_rolls_back_the_line() {
        let mut ctx = context(PromptMode::Default);
        assert_eq!(LineOutcome::More, ctx.process_line("class Foo"));
        assert_eq!(
            LineOutcome::SyntaxError(
                "SyntaxError: compile error\n(irb):2: syntax error, unexpected ';'".to_string()
            ),
            ctx.process_line("def;")
        );
        assert_eq!(vec!["class Foo".to_string()], ctx.source().lines().to_vec());
        assert_eq!(
            LineOutcome::Evaluate("class Foo\nend".to_string()),
            ctx.process_line("end")
        );
    }

    #[test]
    fn test_skip_and_terminate() {
        let mut ctx = context(PromptMode::Default);
        assert_eq!(LineOutcome::Skip, ctx.process_line("   \n"));
        assert_eq!(2, ctx.line());
        assert_eq!(LineOutcome::Evaluate("x = 1".to_string()), ctx.process_line("x = 1"));
        assert_eq!(LineOutcome::Terminate, ctx.process_line("exit"));

        let mut ctx = Context::new(ConsoleConfig {
            prompt: PromptMode::Null,
            color: false,
            reflector: Reflector::new(crate::reflect::ReflectOptions {
                detect_termination: false,
            }),
        });
        assert_eq!(LineOutcome::Evaluate("exit".to_string()), ctx.process_line("exit"));
    }
}
