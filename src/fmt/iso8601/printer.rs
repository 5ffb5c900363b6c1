use alloc::string::String;

use crate::{
    civil::DateTime,
    error::{fmt::iso8601::Error as E, Error},
    Unit,
};

/// A printer for ISO 8601 datetimes.
///
/// The unit decides how many fields are written:
///
/// | unit            | output                        |
/// |-----------------|-------------------------------|
/// | `Y`             | `2011`                        |
/// | `M`             | `2011-03`                     |
/// | `W`, `B`, `D`   | `2011-03-15`                  |
/// | `h`             | `2011-03-15T10`               |
/// | `m`             | `2011-03-15T10:30`            |
/// | `s`             | `2011-03-15T10:30:45`         |
/// | `ms` to `as`    | `2011-03-15T10:30:45.250` etc |
///
/// Sub-second units write 3, 6, 9, 12, 15 or 18 fraction digits. When no
/// unit is set (or the unit is generic), the coarsest unit that loses
/// nothing is used, but never one coarser than days.
///
/// When an offset is set, the datetime given is treated as UTC: the offset
/// is added to its fields and, for units of hours or finer, written as
/// `+HH:MM` or `-HH:MM` after the time.
///
/// NaT prints as `NaT`.
///
/// # Example
///
/// ```
/// use scaledtime::{civil::DateTime, fmt::iso8601::DateTimePrinter, Unit};
///
/// let dt = DateTime::date(2011, 3, 15).at(10, 30, 45, 250_000);
///
/// let printer = DateTimePrinter::new();
/// assert_eq!(printer.datetime_to_string(&dt)?, "2011-03-15T10:30:45.250");
///
/// let printer =
///     DateTimePrinter::new().unit(Some(Unit::Minute)).offset(Some(-90));
/// assert_eq!(printer.datetime_to_string(&dt)?, "2011-03-15T09:00-01:30");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DateTimePrinter {
    unit: Option<Unit>,
    offset: Option<i32>,
}

impl DateTimePrinter {
    /// Create a new printer with lossless unit detection and no offset.
    #[inline]
    pub const fn new() -> DateTimePrinter {
        DateTimePrinter { unit: None, offset: None }
    }

    /// Set the unit to print at. Fields finer than the unit are not
    /// written.
    #[inline]
    pub const fn unit(self, unit: Option<Unit>) -> DateTimePrinter {
        DateTimePrinter { unit, ..self }
    }

    /// Set a fixed UTC offset, in minutes east of UTC.
    #[inline]
    pub const fn offset(self, offset: Option<i32>) -> DateTimePrinter {
        DateTimePrinter { offset, ..self }
    }

    /// Print the given datetime to a new string.
    ///
    /// # Errors
    ///
    /// This returns an error when applying the offset carries the year out
    /// of range.
    pub fn datetime_to_string(&self, dt: &DateTime) -> Result<String, Error> {
        let mut buf = String::with_capacity(32);
        self.print_datetime(dt, &mut buf)?;
        Ok(buf)
    }

    /// Print the given datetime to the writer given.
    ///
    /// # Errors
    ///
    /// This returns an error when the writer fails or when applying the
    /// offset carries the year out of range.
    pub fn print_datetime<W: core::fmt::Write>(
        &self,
        dt: &DateTime,
        mut wtr: W,
    ) -> Result<(), Error> {
        if dt.is_nat() {
            return wtr.write_str("NaT").map_err(|_| E::PrintFailed.into());
        }
        let mut dt = *dt;
        if let Some(offset) = self.offset {
            dt.add_minutes(offset)?;
        }
        let unit = match self.unit {
            None | Some(Unit::Generic) => lossless_unit(&dt),
            Some(unit) => unit,
        };
        self.print_fields(&dt, unit, &mut wtr).map_err(|_| E::PrintFailed)?;
        Ok(())
    }

    fn print_fields<W: core::fmt::Write>(
        &self,
        dt: &DateTime,
        unit: Unit,
        wtr: &mut W,
    ) -> core::fmt::Result {
        if dt.year < 0 {
            write!(wtr, "-{:04}", dt.year.unsigned_abs())?;
        } else {
            write!(wtr, "{:04}", dt.year)?;
        }
        if unit == Unit::Year {
            return Ok(());
        }
        write!(wtr, "-{:02}", dt.month)?;
        if unit == Unit::Month {
            return Ok(());
        }
        write!(wtr, "-{:02}", dt.day)?;
        if unit <= Unit::Day {
            return Ok(());
        }
        write!(wtr, "T{:02}", dt.hour)?;
        if unit > Unit::Hour {
            write!(wtr, ":{:02}", dt.minute)?;
        }
        if unit > Unit::Minute {
            write!(wtr, ":{:02}", dt.second)?;
        }
        if unit > Unit::Second {
            let us = i64::from(dt.microsecond);
            let ps = i64::from(dt.picosecond);
            let attos = i64::from(dt.attosecond);
            match unit {
                Unit::Millisecond => write!(wtr, ".{:03}", us / 1_000)?,
                Unit::Microsecond => write!(wtr, ".{us:06}")?,
                Unit::Nanosecond => {
                    write!(wtr, ".{:09}", us * 1_000 + ps / 1_000)?
                }
                Unit::Picosecond => {
                    write!(wtr, ".{:012}", us * 1_000_000 + ps)?
                }
                Unit::Femtosecond => write!(
                    wtr,
                    ".{:012}{:03}",
                    us * 1_000_000 + ps,
                    attos / 1_000,
                )?,
                _ => write!(wtr, ".{:012}{attos:06}", us * 1_000_000 + ps)?,
            }
        }
        if let Some(offset) = self.offset {
            let sign = if offset < 0 { '-' } else { '+' };
            let offset = offset.unsigned_abs();
            write!(wtr, "{sign}{:02}:{:02}", offset / 60, offset % 60)?;
        }
        Ok(())
    }
}

impl Default for DateTimePrinter {
    fn default() -> DateTimePrinter {
        DateTimePrinter::new()
    }
}

/// Returns the coarsest unit, no coarser than days, at which printing `dt`
/// writes every non-zero field.
fn lossless_unit(dt: &DateTime) -> Unit {
    if dt.attosecond != 0 {
        if dt.attosecond % 1_000 != 0 {
            Unit::Attosecond
        } else {
            Unit::Femtosecond
        }
    } else if dt.picosecond != 0 {
        if dt.picosecond % 1_000 != 0 {
            Unit::Picosecond
        } else {
            Unit::Nanosecond
        }
    } else if dt.microsecond != 0 {
        if dt.microsecond % 1_000 != 0 {
            Unit::Microsecond
        } else {
            Unit::Millisecond
        }
    } else if dt.second != 0 {
        Unit::Second
    } else if dt.minute != 0 {
        Unit::Minute
    } else if dt.hour != 0 {
        Unit::Hour
    } else {
        Unit::Day
    }
}
