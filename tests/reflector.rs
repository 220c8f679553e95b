#[macro_use]
extern crate ruby_reflect;

use pretty_assertions::assert_eq;
use ruby_reflect::repl::{ConsoleConfig, Context, LineOutcome, PromptMode};
use ruby_reflect::{reflect, Source};

#[test]
fn test_empty_buffer() {
    assert_reflects!("", level: 0, code_block: true);
}

#[test]
fn test_class_and_def_nesting() {
    assert_eq!(1, reflect("class Foo").level());
    assert_eq!(2, reflect("class Foo; def foo").level());
    assert_eq!(1, reflect("class Foo; def foo; end").level());
    assert_reflects!("class Foo; def foo; end; end", level: 0, code_block: true);
}

#[test]
fn test_unterminated_def_wants_more_input() {
    assert_reflects!("def foo; p :ok", level: 1, code_block: false);
}

#[test]
fn test_def_without_name_is_a_syntax_error() {
    assert_syntax_error!("def; foo");
    assert_syntax_error!("def; foo", "syntax error, unexpected ';'");
}

#[test]
fn test_unterminated_call_and_string() {
    assert_reflects!("foo('bar'", level: 0, code_block: false);
}

#[test]
fn test_literals_close_with_their_delimiters() {
    assert_reflects!("%w{a b c}", level: 0, code_block: true);
    assert_reflects!("x =~ /foo/i", level: 0, code_block: true);
    assert_reflects!("%r<a+>mx", level: 0, code_block: true);
    assert_reflects!(":\"quoted sym\"", level: 0, code_block: true);
    assert_reflects!("%w{a b", level: 1, code_block: false);
    assert_reflects!("x = /foo", level: 1, code_block: false);
}

#[test]
fn test_unfinished_lines_are_not_errors() {
    assert_reflects!("puts 'a' \\", level: 0, code_block: false);
    assert_reflects!("x = 1 + \\", level: 0, code_block: false);
    assert_reflects!("x = <<EOS", level: 0, code_block: false);
    assert_reflects!("x = <<~EOS\n  body", level: 0, code_block: false);
    assert_reflects!("def foo(a:", level: 1, code_block: false);
}

#[test]
fn test_heredoc_closes_on_its_terminator() {
    assert_reflects!("x = <<EOS\nhi\nEOS", level: 0, code_block: true);
    assert_reflects!("sql = <<-'SQL'\n  select 1\n  SQL", level: 0, code_block: true);
}

#[test]
fn test_well_formed_statements() {
    let statements = vec![
        "x = 1",
        "puts 'hello'",
        "[1, 2, 3].map { |x| x * 2 }",
        "h = {a: 1, 'b' => [2, 3]}",
        "x = y ? 1 : 2",
        "return unless ready?",
        "a, b = b, a",
        "@count += 1 if defined?(@count)",
        "\"sum: #{[1, 2].sum}\"",
        "def foo; end",
        "foo.bar&.baz(1, *rest, **opts, &blk)",
        "def foo(a:); end",
        "def foo(a:, b: 1); end",
        "puts 'a' \\\n  'b'",
        "items\n  .map(&:to_s)\n  .join(', ')",
    ];
    for statement in statements {
        assert_reflects!(statement, level: 0, code_block: true);
    }
}

#[test]
fn test_opening_constructs_are_incomplete() {
    let openers = vec![
        "class Foo",
        "module Bar",
        "def foo(a, b)",
        "if x",
        "unless x",
        "while x",
        "until x",
        "case x",
        "begin",
        "for i in list",
        "5.times do |i|",
        "[1,",
        "{",
        "'abc",
    ];
    for opener in openers {
        let reflection = reflect(opener);
        assert!(!reflection.is_code_block(), "code block state of {:?}", opener);
        assert_eq!(None, reflection.syntax_error(), "syntax error in {:?}", opener);
    }
}

#[test]
fn test_removing_the_last_end_drops_one_level() {
    let closed = "class Foo; def foo; end; end";
    let open = "class Foo; def foo; end;";
    assert_eq!(0, reflect(closed).level());
    assert_eq!(1, reflect(open).level());
}

#[test]
fn test_reflection_is_repeatable() {
    for input in &["class Foo", "def; foo", "foo('bar'", "%w{a b c}", "end"] {
        assert_eq!(reflect(input), reflect(input));
    }
}

#[test]
fn test_stray_end_is_clamped_and_reported() {
    let reflection = reflect("x = 1\nend");
    assert_eq!(0, reflection.level());
    assert_eq!(-1, reflection.raw_level());
    assert!(reflection.has_syntax_error());
}

#[test]
fn test_source_buffer_session() {
    let mut source = Source::new();
    assert!(source.push("class Foo"));
    assert_eq!(1, source.level());
    assert!(source.push("  def foo"));
    assert_eq!(2, source.level());
    assert!(!source.push(""));
    assert!(source.push("  def; x"));
    assert!(source.syntax_error().is_some());
    source.pop();
    assert_eq!(None, source.syntax_error());
    assert!(source.push("  end"));
    assert!(source.push("end"));
    assert!(source.code_block());
    assert_eq!("class Foo\n  def foo\n  end\nend", source.text());
}

#[test]
fn test_console_session() {
    let mut context = Context::new(ConsoleConfig {
        prompt: PromptMode::Default,
        color: false,
        ..ConsoleConfig::default()
    });
    let outcomes: Vec<LineOutcome> = vec![
        "def greet(name)",
        "\"hello #{name}\"",
        "",
        "end",
        "greet(",
        "1 +",
        "2)",
        "end",
        "quit",
    ]
    .into_iter()
    .map(|line| context.process_line(line))
    .collect();

    assert_eq!(
        vec![
            LineOutcome::More,
            LineOutcome::More,
            LineOutcome::Skip,
            LineOutcome::Evaluate("def greet(name)\n  \"hello #{name}\"\nend".to_string()),
            LineOutcome::More,
            LineOutcome::More,
            LineOutcome::Evaluate("greet(\n1 +\n2)".to_string()),
            LineOutcome::SyntaxError(
                "SyntaxError: compile error\n(irb):8: syntax error, unexpected keyword_end, expecting $end"
                    .to_string()
            ),
            LineOutcome::Terminate,
        ],
        outcomes
    );
}
