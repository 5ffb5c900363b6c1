/*!
Temporal type descriptors.

A [`TemporalType`] pairs a [`Kind`] (instant or duration) with the
[`Metadata`] its tick counts are interpreted under. It is the plain value
that stands in for a typed array's element type, and it is what type
promotion produces when two temporal types meet.
*/

use crate::{error::Error, Metadata};

/// The kind of a temporal value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// A point in time, counted in ticks since 1970-01-01T00:00:00.
    Datetime,
    /// A signed span of time, counted in ticks.
    Timedelta,
}

impl Kind {
    /// Returns the long type tag for this kind, without metadata.
    pub fn tag(self) -> &'static str {
        match self {
            Kind::Datetime => "datetime64",
            Kind::Timedelta => "timedelta64",
        }
    }

    /// Returns a short human readable name, as used in error messages.
    pub(crate) fn noun(self) -> &'static str {
        match self {
            Kind::Datetime => "instant",
            Kind::Timedelta => "timedelta",
        }
    }
}

impl core::fmt::Display for Kind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.noun())
    }
}

/// A kind of temporal value together with its metadata.
///
/// `Display` renders the long typestring form, e.g., `datetime64[5ms]`. The
/// brackets are omitted for generic metadata, so generic durations render as
/// `timedelta64`. `FromStr` accepts both the long tags and the short `M8` and
/// `m8` tags.
///
/// # Example
///
/// ```
/// use scaledtime::{Kind, Metadata, TemporalType, Unit};
///
/// let a: TemporalType = "M8[5ms]".parse()?;
/// let b: TemporalType = "m8[2us]".parse()?;
/// let c = TemporalType::promote(a, b)?;
/// assert_eq!(c.to_string(), "datetime64[2us]");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TemporalType {
    kind: Kind,
    meta: Metadata,
}

impl TemporalType {
    /// Creates a new temporal type.
    #[inline]
    pub const fn new(kind: Kind, meta: Metadata) -> TemporalType {
        TemporalType { kind, meta }
    }

    /// Returns the kind of value this type describes.
    #[inline]
    pub fn kind(self) -> Kind {
        self.kind
    }

    /// Returns this type's metadata.
    #[inline]
    pub fn meta(self) -> Metadata {
        self.meta
    }

    /// Returns the type two temporal types are promoted to when combined.
    ///
    /// The result is an instant type if either side is an instant type, and
    /// a duration type otherwise. Its metadata is the
    /// [greatest common divisor](Metadata::gcd) of both metadata, where
    /// nonlinear units are handled strictly on whichever side is a duration.
    /// Instants in years or months can combine with days (the months simply
    /// become days), but a duration of months cannot be expressed in days.
    ///
    /// # Errors
    ///
    /// This returns the same errors as [`Metadata::gcd`].
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::TemporalType;
    ///
    /// let month: TemporalType = "M8[M]".parse()?;
    /// let day: TemporalType = "M8[D]".parse()?;
    /// let promoted = TemporalType::promote(month, day)?;
    /// assert_eq!(promoted.to_string(), "datetime64[D]");
    ///
    /// let month: TemporalType = "m8[M]".parse()?;
    /// let day: TemporalType = "m8[D]".parse()?;
    /// assert!(TemporalType::promote(month, day).unwrap_err().is_casting());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn promote(
        ty1: TemporalType,
        ty2: TemporalType,
    ) -> Result<TemporalType, Error> {
        let meta = Metadata::gcd(
            ty1.meta,
            ty2.meta,
            ty1.kind == Kind::Timedelta,
            ty2.kind == Kind::Timedelta,
        )?;
        let kind = if ty1.kind == Kind::Datetime || ty2.kind == Kind::Datetime
        {
            Kind::Datetime
        } else {
            Kind::Timedelta
        };
        Ok(TemporalType { kind, meta })
    }

    /// Returns true when both types have equivalent metadata, regardless of
    /// their kinds.
    ///
    /// Metadata is equivalent when the unit and multiplier match. All generic
    /// metadata is equivalent.
    #[inline]
    pub fn is_equivalent(self, other: TemporalType) -> bool {
        self.meta == other.meta
    }
}

impl core::fmt::Display for TemporalType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}{}", self.kind.tag(), self.meta)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TemporalType {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TemporalType {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<TemporalType, D::Error> {
        use serde::de;

        struct TemporalTypeVisitor;

        impl<'de> de::Visitor<'de> for TemporalTypeVisitor {
            type Value = TemporalType;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str("a typestring like `datetime64[5ms]`")
            }

            #[inline]
            fn visit_bytes<E: de::Error>(
                self,
                value: &[u8],
            ) -> Result<TemporalType, E> {
                crate::fmt::metadata::parse_typestr(value)
                    .map_err(de::Error::custom)
            }

            #[inline]
            fn visit_str<E: de::Error>(
                self,
                value: &str,
            ) -> Result<TemporalType, E> {
                self.visit_bytes(value.as_bytes())
            }
        }

        deserializer.deserialize_str(TemporalTypeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use crate::Unit;

    use super::*;

    fn ty(s: &str) -> TemporalType {
        s.parse().unwrap()
    }

    #[test]
    fn promotion() {
        let p = |a: &str, b: &str| TemporalType::promote(ty(a), ty(b));

        assert_eq!(p("M8[5ms]", "M8[2us]").unwrap(), ty("M8[2us]"));
        assert_eq!(p("m8[h]", "m8[90m]").unwrap(), ty("m8[30m]"));
        assert_eq!(p("m8[h]", "M8[D]").unwrap(), ty("M8[h]"));
        assert_eq!(p("M8", "m8[3s]").unwrap(), ty("M8[3s]"));
        assert_eq!(p("m8", "m8").unwrap(), ty("m8"));
        assert_eq!(p("M8[Y]", "m8[M]").unwrap(), ty("M8[M]"));
        assert_eq!(p("M8[Y]", "M8[W]").unwrap(), ty("M8[W]"));

        insta::assert_snapshot!(
            p("m8[Y]", "M8[D]").unwrap_err(),
            @"cannot get a common metadata divisor for metadata [Y] and [D] because they have incompatible nonlinear base time units",
        );
        assert!(p("M8[B]", "m8[D]").unwrap_err().is_casting());

        let business = p("M8[B]", "M8[h]").unwrap();
        assert_eq!(business.meta(), Metadata::from_unit(Unit::Hour));
        let business = p("M8[2B]", "M8[4D]").unwrap();
        assert_eq!(business.meta(), Metadata::new(Unit::Day, 2).unwrap());
    }

    #[test]
    fn equivalence() {
        assert!(ty("M8[5ms]").is_equivalent(ty("m8[5ms]")));
        assert!(ty("M8").is_equivalent(ty("m8")));
        assert!(!ty("M8[5ms]").is_equivalent(ty("M8[ms]")));
        assert!(!ty("M8[1000ms]").is_equivalent(ty("M8[s]")));
    }

    #[test]
    fn display() {
        insta::assert_snapshot!(ty("M8[25s]"), @"datetime64[25s]");
        insta::assert_snapshot!(ty("timedelta64[us/4]"), @"timedelta64[250ns]");
        insta::assert_snapshot!(ty("datetime64"), @"datetime64");
        insta::assert_snapshot!(Kind::Timedelta, @"timedelta");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&ty("m8[15m]")).unwrap();
        assert_eq!(json, r#""timedelta64[15m]""#);
        let got: TemporalType = serde_json::from_str(&json).unwrap();
        assert_eq!(got, ty("m8[15m]"));
        assert!(serde_json::from_str::<TemporalType>(r#""M9[s]""#).is_err());
    }
}
