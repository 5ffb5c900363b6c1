use crate::{
    civil,
    error::{civil::Error as E, Error},
    Metadata,
};

/// A decomposed proleptic Gregorian datetime.
///
/// This is the intermediate form that every unit conversion passes through.
/// Its fields are public and are not validated by this type. The fields
/// have these natural ranges:
///
/// * `year` is any `i64`, except that `i64::MIN` marks the struct as NaT.
/// * `month` is `1..=12` and `day` is `1..=31` (bounded by the month).
/// * `hour` is `0..=23`, `minute` and `second` are `0..=59`.
/// * `microsecond` is `0..=999_999`.
/// * `picosecond` is the number of picoseconds beyond `microsecond`, in
/// `0..=999_999`.
/// * `attosecond` is the number of attoseconds beyond `picosecond`, in
/// `0..=999_999`.
///
/// The default value is the Unix epoch, 1970-01-01T00:00:00.
///
/// # Example
///
/// ```
/// use scaledtime::{civil::DateTime, Metadata, Unit};
///
/// let dt = DateTime::date(2011, 3, 15).at(10, 30, 45, 250_000);
/// let ms = Metadata::from_unit(Unit::Millisecond);
/// let ticks = dt.to_scaled(ms)?;
/// assert_eq!(ticks, 1_300_185_045_250);
/// assert_eq!(DateTime::from_scaled(ms, ticks)?, dt);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct DateTime {
    pub year: i64,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
    pub microsecond: i32,
    pub picosecond: i32,
    pub attosecond: i32,
}

impl DateTime {
    /// The Unix epoch, 1970-01-01T00:00:00.
    pub const EPOCH: DateTime = DateTime::date(1970, 1, 1);

    /// The calendar struct corresponding to a NaT value. Every field other
    /// than the year is that of the epoch.
    pub const NAT: DateTime = DateTime { year: crate::NAT, ..DateTime::EPOCH };

    /// Creates a datetime at midnight on the given date.
    #[inline]
    pub const fn date(year: i64, month: i32, day: i32) -> DateTime {
        DateTime {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            microsecond: 0,
            picosecond: 0,
            attosecond: 0,
        }
    }

    /// Returns this datetime with its time of day replaced. The sub
    /// microsecond fields are set to zero.
    #[inline]
    pub const fn at(
        self,
        hour: i32,
        minute: i32,
        second: i32,
        microsecond: i32,
    ) -> DateTime {
        DateTime {
            hour,
            minute,
            second,
            microsecond,
            picosecond: 0,
            attosecond: 0,
            ..self
        }
    }

    /// Returns true when this struct represents NaT.
    #[inline]
    pub const fn is_nat(&self) -> bool {
        self.year == crate::NAT
    }

    /// Adds the given number of minutes to this datetime, carrying into
    /// hours, days, months and years as needed.
    ///
    /// The fields must be valid before calling this. Day carries step
    /// through one month at a time, so that each month contributes its own
    /// length.
    ///
    /// This is a no-op on NaT. An error is returned when carrying moves the
    /// year out of the range of `i64`.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::civil::DateTime;
    ///
    /// let mut dt = DateTime::date(2024, 3, 1).at(0, 30, 0, 0);
    /// dt.add_minutes(-60)?;
    /// assert_eq!(dt, DateTime::date(2024, 2, 29).at(23, 30, 0, 0));
    ///
    /// let mut dt = DateTime::date(1999, 12, 31).at(23, 0, 0, 0);
    /// dt.add_minutes(24 * 60 * 32)?;
    /// assert_eq!(dt, DateTime::date(2000, 2, 1).at(23, 0, 0, 0));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn add_minutes(&mut self, minutes: i32) -> Result<(), Error> {
        if self.is_nat() {
            return Ok(());
        }
        // Minutes and hours have fixed lengths, so these carries don't need
        // to loop.
        let minute = i64::from(self.minute) + i64::from(minutes);
        let hour = i64::from(self.hour) + minute.div_euclid(60);
        let mut day = i64::from(self.day) + hour.div_euclid(24);
        // OK because `rem_euclid` is within `0..60` and `0..24`.
        self.minute = minute.rem_euclid(60) as i32;
        self.hour = hour.rem_euclid(24) as i32;

        while day < 1 {
            self.month -= 1;
            if self.month < 1 {
                self.year = self
                    .year
                    .checked_sub(1)
                    .ok_or(E::YearOutOfRange { year: self.year })?;
                self.month = 12;
            }
            day += i64::from(civil::days_in_month(self.year, self.month));
        }
        loop {
            let len = i64::from(civil::days_in_month(self.year, self.month));
            if day <= len {
                break;
            }
            day -= len;
            self.month += 1;
            if self.month > 12 {
                self.year = self
                    .year
                    .checked_add(1)
                    .ok_or(E::YearOutOfRange { year: self.year })?;
                self.month = 1;
            }
        }
        // OK because `day` is now within the month.
        self.day = day as i32;
        Ok(())
    }

    /// Adds the given number of seconds to this datetime, carrying into
    /// minutes and beyond as needed.
    ///
    /// This is a no-op on NaT.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::civil::DateTime;
    ///
    /// let mut dt = DateTime::EPOCH;
    /// dt.add_seconds(-1)?;
    /// assert_eq!(dt, DateTime::date(1969, 12, 31).at(23, 59, 59, 0));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn add_seconds(&mut self, seconds: i32) -> Result<(), Error> {
        if self.is_nat() {
            return Ok(());
        }
        let second = i64::from(self.second) + i64::from(seconds);
        // OK because `rem_euclid` is within `0..60`.
        self.second = second.rem_euclid(60) as i32;
        // OK because this is at most `i32::MAX / 60` plus one in magnitude.
        let minutes = second.div_euclid(60) as i32;
        if minutes != 0 {
            self.add_minutes(minutes)?;
        }
        Ok(())
    }

    /// Converts this datetime into a tick count under the given metadata.
    ///
    /// This is a convenience for
    /// [`convert::calendar_to_scaled`](crate::convert::calendar_to_scaled).
    #[inline]
    pub fn to_scaled(&self, meta: Metadata) -> Result<i64, Error> {
        crate::convert::calendar_to_scaled(meta, self)
    }

    /// Decomposes a tick count under the given metadata into a datetime.
    ///
    /// This is a convenience for
    /// [`convert::scaled_to_calendar`](crate::convert::scaled_to_calendar).
    #[inline]
    pub fn from_scaled(meta: Metadata, value: i64) -> Result<DateTime, Error> {
        crate::convert::scaled_to_calendar(meta, value)
    }
}

impl Default for DateTime {
    fn default() -> DateTime {
        DateTime::EPOCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_minutes_month_lengths() {
        let mut dt = DateTime::date(2023, 3, 1);
        dt.add_minutes(-1).unwrap();
        assert_eq!(dt, DateTime::date(2023, 2, 28).at(23, 59, 0, 0));

        let mut dt = DateTime::date(2023, 1, 31).at(23, 59, 0, 0);
        dt.add_minutes(1).unwrap();
        assert_eq!(dt, DateTime::date(2023, 2, 1));

        let mut dt = DateTime::date(2000, 1, 1);
        dt.add_minutes(-60 * 24 * 366).unwrap();
        assert_eq!(dt, DateTime::date(1998, 12, 31).at(0, 0, 0, 0));

        let mut dt = DateTime::date(2024, 2, 28).at(12, 0, 0, 0);
        dt.add_minutes(i32::MAX).unwrap();
        assert_eq!(dt, DateTime::date(6107, 3, 23).at(14, 7, 0, 0));
        dt.add_minutes(i32::MIN).unwrap();
        assert_eq!(dt, DateTime::date(2024, 2, 28).at(11, 59, 0, 0));
    }

    #[test]
    fn add_seconds_carries() {
        let mut dt = DateTime::date(2011, 12, 31).at(23, 59, 30, 0);
        dt.add_seconds(45).unwrap();
        assert_eq!(dt, DateTime::date(2012, 1, 1).at(0, 0, 15, 0));

        let mut dt = DateTime::NAT;
        dt.add_seconds(-45).unwrap();
        assert!(dt.is_nat());
    }

    #[test]
    fn year_overflow() {
        let mut dt = DateTime::date(i64::MAX, 12, 31).at(23, 59, 0, 0);
        let err = dt.add_minutes(1).unwrap_err();
        assert!(err.is_overflow());
    }
}
