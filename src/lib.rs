//! stomp - bind command-line tokens to typed option slots.
//!
//! A caller describes its options in an [`OptionTable`], one
//! [`OptionDescriptor`] per destination field, and hands the table a
//! mutable destination and the raw tokens. Matching, coercion, boolean
//! toggles and required-option checks are done in a single pass; any
//! malformed input aborts with a [`ParseError`].
//!
//! ```
//! use stomp::{OptionDescriptor, OptionTable};
//!
//! #[derive(Default)]
//! struct Args {
//!     first: String,
//!     num: i32,
//! }
//!
//! let table = OptionTable::new()
//!     .with(OptionDescriptor::string("first", |a: &mut Args| &mut a.first).required(true))
//!     .with(OptionDescriptor::integer("num", |a: &mut Args| &mut a.num).short("n"));
//!
//! let mut args = Args::default();
//! table.parse(&mut args, &["--first", "hello", "-n", "42"]).unwrap();
//! assert_eq!(args.first, "hello");
//! assert_eq!(args.num, 42);
//! ```

pub mod config;
pub mod output;
pub mod parser;
pub mod store;
pub mod table;
pub mod value;

pub use config::{ConfigError, OptionConfig, TableConfig};
pub use output::{render_env, render_json};
pub use parser::{bind, parse, validate, BindingResult, BooleanState, ParseError};
pub use store::{StoreError, ValueStore};
pub use table::{OptionDescriptor, OptionTable, Slot, SlotRefused, TableError};
pub use value::{coerce, Value, ValueKind};
