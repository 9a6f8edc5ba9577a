//! Arena-backed lazy JSON parsing for hot paths.
//!
//! This library targets workloads that chew through large volumes of JSON
//! (log pipelines, metrics scrapers, streaming ingestion) where a
//! reflective decoder's per-value allocations dominate. A [`Parser`] keeps
//! a backing buffer and a node arena that are recycled on every parse;
//! string and number payloads stay slices of that buffer, and escape
//! sequences are only decoded when a value is actually read.
//!
//! # Examples
//!
//! Parse and read:
//!
//! ```rust
//! let mut parser = lazyjson::Parser::new();
//! let value = parser.parse(r#"{"name":"Ada","scores":[1,2,3]}"#)?;
//!
//! assert_eq!(value.get_str(&["name"]), Some("Ada"));
//! assert_eq!(value.get_i64(&["scores", "2"]), 3);
//! assert!(value.exists(&["scores"]));
//! assert!(!value.exists(&["address"]));
//! # Ok::<(), lazyjson::JsonError>(())
//! ```
//!
//! The returned value borrows the parser: it stays valid until the next
//! `parse` call, and the borrow checker will not let it outlive one.
//!
//! Strict getters report what went wrong instead of returning zero:
//!
//! ```rust
//! let mut parser = lazyjson::Parser::new();
//! let value = parser.parse(r#"{"port":"8080"}"#)?;
//!
//! let err = value.get(&["port"]).unwrap().as_i64().unwrap_err();
//! assert!(err.to_string().contains("doesn't contain number"));
//! # Ok::<(), lazyjson::JsonError>(())
//! ```
//!
//! Update in place and serialize:
//!
//! ```rust
//! let mut parser = lazyjson::Parser::new();
//! let value = parser.parse(r#"{"a":1,"b":2}"#)?;
//!
//! value.set("b", value.null_value());
//! value.del("a");
//! assert_eq!(value.to_string(), r#"{"b":null}"#);
//! # Ok::<(), lazyjson::JsonError>(())
//! ```
//!
//! Scan a stream of whitespace-delimited values (JSON lines):
//!
//! ```rust
//! let mut scanner = lazyjson::Scanner::new();
//! scanner.init("{\"n\":1}\n{\"n\":2}\n{\"n\":3}");
//!
//! let mut sum = 0;
//! while scanner.next() {
//!     sum += scanner.value().map(|v| v.get_i64(&["n"])).unwrap_or(0);
//! }
//! assert!(scanner.error().is_none());
//! assert_eq!(sum, 6);
//! ```
//!
//! The grammar is json.org JSON plus three deliberate extensions: `NaN` /
//! `Inf` tokens (any case, optionally signed) where a number is expected,
//! elided integer or fractional parts (`.5`, `5.`), and raw control
//! characters inside strings. The standalone [`validate`] checker is strict
//! RFC grammar and accepts none of those.
//!
//! A parser and the values it hands out are a strictly single-threaded
//! unit. Keep one parser per worker; [`take_parser`] / [`put_parser`]
//! maintain a small per-thread pool.

mod arena;
pub mod decode;
pub mod error;
pub mod num;
mod text;
pub mod types;

pub use decode::pool::{put_parser, take_parser};
pub use decode::scanner::Scanner;
pub use decode::validation::{validate, validate_bytes};
pub use decode::{Parser, MAX_DEPTH};
pub use error::{ErrorKind, JsonError, JsonResult};
pub use types::{Object, Value, ValueType};
