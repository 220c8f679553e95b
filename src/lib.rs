extern crate nom;
extern crate nom_locate;

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod macros;
pub mod error;
pub mod lex;
pub mod parse;
pub mod reflect;
pub mod source;
pub mod repl;

pub use reflect::{reflect, tokens_match, ReflectOptions, Reflection, Reflector};
pub use source::Source;
