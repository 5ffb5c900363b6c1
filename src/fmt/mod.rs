/*!
Parsing and printing of metadata strings, typestrings and ISO 8601
timestamps.

There are two sub-modules:

* [`metadata`] handles the `[5ms]` metadata grammar, the bare `5ms` and
`us/3` forms, typestrings like `M8[D]` and metadata records. Most callers
use it through `FromStr` on [`Metadata`](crate::Metadata) and
[`TemporalType`](crate::TemporalType).
* [`iso8601`] parses timestamps like `2011-03-15T10:30:45.250Z` into a
calendar struct and the finest unit present in the text, and prints
calendar structs at a given unit.
*/

pub mod iso8601;
pub mod metadata;

/// The result of parsing a value out of a slice of bytes.
///
/// This contains both the parsed value and the offset at which the value
/// ended in the input given. This makes it possible to parse, for example, a
/// timestamp embedded in a larger string.
#[derive(Debug)]
pub(crate) struct Parsed<'i, V> {
    /// The value parsed.
    pub(crate) value: V,
    /// The remaining unparsed input.
    pub(crate) input: &'i [u8],
}
