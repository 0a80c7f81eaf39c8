//! Zone file reading and hostname extraction
//!
//! # Module Organization
//!
//! - `parser` - RFC 1035 master file reader
//! - `name` - Domain names as found in a zone
//! - `record` - Record types and the extracted hostname map
//! - `extract` - Hostname extraction from a parsed zone
//! - `error` - Zone parse errors
//!
//! # Example
//!
//! ```rust
//! use zonecert::zone::{RecordType, extract};
//!
//! let hostnames = extract("www IN A 192.0.2.1\n", "example.com")?;
//! assert_eq!(hostnames.get("www.example.com"), Some(RecordType::A));
//! # Ok::<(), zonecert::zone::ZoneParseError>(())
//! ```

pub mod error;
pub mod extract;
pub mod name;
pub mod parser;
pub mod record;

pub use error::ZoneParseError;
pub use extract::{ExtractOptions, extract, extract_with};
pub use name::Name;
pub use parser::{Zone, decode_zone, parse_zone};
pub use record::{HostnameMap, HostnameRecord, RecordType, RrType};
