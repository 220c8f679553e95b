extern crate argh;
extern crate simplelog;
#[macro_use]
extern crate log;

extern crate ruby_reflect;

use argh::FromArgs;
use simplelog::{LevelFilter, TermLogger};

use std::fs::File;
use std::io::{self, Read};

use ruby_reflect::error::{Error, Result};
use ruby_reflect::parse::{Event, Parser};
use ruby_reflect::repl::{self, ConsoleConfig, PromptMode};
use ruby_reflect::{ReflectOptions, Reflector};

#[derive(FromArgs)]
#[argh(description="Nesting and completeness of Ruby source, line by line")]
struct MainOpts {
    #[argh(option, default="String::from(\"warn\")",
           description="log verbosity: none, error, warn, info, debug, trace (or 0-5)")]
    log_level: String,
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Reflect(ReflectCmd),
    Console(ConsoleCmd),
}

#[derive(FromArgs)]
#[argh(subcommand, name="reflect", description="reflect a file, a snippet or stdin once")]
struct ReflectCmd {
    #[argh(positional, description="the script to reflect, `-` for stdin")]
    script: Option<String>,
    #[argh(option, short='e', description="reflect this code instead of a file")]
    code: Option<String>,
    #[argh(switch, description="just show me the token and error stream")]
    tokens: bool,
    #[argh(switch, description="report the level without clamping it at zero")]
    raw_level: bool,
    #[argh(switch, description="do not treat a top-level exit or quit as termination")]
    no_exit: bool,
}

#[derive(FromArgs)]
#[argh(subcommand, name="console", description="read lines from stdin like an interactive console")]
struct ConsoleCmd {
    #[argh(option, default="PromptMode::Default", description="prompt style: default, simple or null")]
    prompt: PromptMode,
    #[argh(switch, description="print syntax errors without colour")]
    no_color: bool,
    #[argh(switch, description="do not stop on a top-level exit or quit")]
    no_exit: bool,
}

fn setup_log_verbosity(verbosity: &str) -> Result<()> {
    let level_filter = match verbosity {
        "0" | "none" => LevelFilter::Off,
        "1" | "err" | "error" | "min" => LevelFilter::Error,
        "2" | "warn" | "warning" | "default" => LevelFilter::Warn,
        "3" | "info" => LevelFilter::Info,
        "4" | "debug" => LevelFilter::Debug,
        "5" | "trace" | "max" | "all" => LevelFilter::Trace,
        other => return Err(Error::InvalidLogLevel(other.to_string())),
    };
    let mut config_builder = simplelog::ConfigBuilder::new();
    let logger_conf = config_builder
        .set_time_level(LevelFilter::Error)
        .set_target_level(LevelFilter::Debug)
        .set_location_level(LevelFilter::Error)
        .set_time_format_str("%H:%M:%S%.6f")
        .build();
    if TermLogger::init(level_filter, logger_conf, simplelog::TerminalMode::Mixed).is_err() {
        eprintln!("logger already initialized");
    }
    return Ok(());
}

fn read_input(cmd: &ReflectCmd) -> Result<String> {
    if let Some(code) = &cmd.code {
        return Ok(code.clone());
    }
    let mut contents = String::new();
    match cmd.script.as_deref() {
        None | Some("-") => {
            io::stdin().read_to_string(&mut contents)?;
        }
        Some(filepath) => {
            let mut file = File::open(filepath)?;
            file.read_to_string(&mut contents)?;
        }
    }
    return Ok(contents);
}

fn reflect_once(cmd: ReflectCmd) -> Result<()> {
    let contents = read_input(&cmd)?;

    if cmd.tokens {
        // only show the event stream
        for event in Parser::new(&contents) {
            match event {
                Event::Token(token) => {
                    println!("{}:{}\t{:?}\t{:?}", token.line, token.column, token.kind, token.text);
                }
                Event::ParseError(error) => {
                    println!("{}\tParseError\t{:?}", error.line, error.message);
                }
            }
        }
        return Ok(());
    }

    let reflector = Reflector::new(ReflectOptions {
        detect_termination: !cmd.no_exit,
    });
    let reflection = reflector.reflect(&contents);
    if cmd.raw_level {
        println!("level: {}", reflection.raw_level());
    } else {
        println!("level: {}", reflection.level());
    }
    println!("code_block: {}", reflection.is_code_block());
    println!("syntax_error: {}", reflection.syntax_error().unwrap_or("none"));
    println!("terminate: {}", reflection.terminate());
    return Ok(());
}

fn run(opts: MainOpts) -> Result<()> {
    setup_log_verbosity(&opts.log_level)?;
    match opts.command {
        Command::Reflect(cmd) => reflect_once(cmd),
        Command::Console(cmd) => {
            let config = ConsoleConfig {
                prompt: cmd.prompt,
                color: !cmd.no_color,
                reflector: Reflector::new(ReflectOptions {
                    detect_termination: !cmd.no_exit,
                }),
            };
            info!("starting console with {:?}", config);
            repl::run(config)
        }
    }
}

fn main(){
    let opts: MainOpts = argh::from_env();
    if let Err(e) = run(opts) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
