/*!
Parsing and printing of ISO 8601 timestamps.

The parser accepts a permissive subset of ISO 8601: a signed year of any
length, optionally followed by a month, a day, a time of day with up to 18
fraction digits and a UTC offset. The unit of the result is the finest field
present in the text, so `"2011-03"` parses at month resolution and
`"2011-03-15T10:30:45.250"` at millisecond resolution. The empty string and
`NaT` (in any case) parse as NaT.

The printer writes a calendar struct at a chosen unit, optionally shifted
to a fixed UTC offset.

# Example

```
use scaledtime::{
    civil::DateTime,
    fmt::iso8601::{DateTimeParser, DateTimePrinter},
    Unit,
};

let parsed = DateTimeParser::new().parse("2011-03-15T10:30:45.250Z")?;
assert_eq!(parsed.unit(), Unit::Millisecond);

let dt = parsed.to_utc()?;
assert_eq!(dt, DateTime::date(2011, 3, 15).at(10, 30, 45, 250_000));

let printer = DateTimePrinter::new().unit(Some(Unit::Second));
assert_eq!(printer.datetime_to_string(&dt)?, "2011-03-15T10:30:45");

// `DateTime` also implements `FromStr` and `Display` via these.
let dt: DateTime = "2011-03-15T10:30+01:00".parse()?;
assert_eq!(dt.to_string(), "2011-03-15T09:30");

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use crate::{civil::DateTime, error::Error};

pub use self::{
    parser::{DateTimeParser, ParsedDateTime},
    printer::DateTimePrinter,
};

mod parser;
mod printer;

static PARSER: DateTimeParser = DateTimeParser::new();
static PRINTER: DateTimePrinter = DateTimePrinter::new();

/// Parses an ISO 8601 timestamp into UTC with the default parser.
impl core::str::FromStr for DateTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<DateTime, Error> {
        PARSER.parse(s)?.to_utc()
    }
}

/// Writes the datetime at the coarsest unit (no coarser than days) that
/// loses nothing.
impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        PRINTER.print_datetime(self, f).map_err(|_| core::fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn from_str_and_display() {
        let dt: DateTime = "1969-12-31T23:59:59.999999999Z".parse().unwrap();
        assert_eq!(dt.to_string(), "1969-12-31T23:59:59.999999999");

        let dt: DateTime = "nat".parse().unwrap();
        assert!(dt.is_nat());
        assert_eq!(dt.to_string(), "NaT");

        assert!("2011-02-30".parse::<DateTime>().unwrap_err().is_value());
    }
}
