use crate::error::{util::ParseIntError, Error};

/// Parses an `i64` number from the beginning to the end of the given slice of
/// ASCII digit characters.
///
/// If any byte in the given slice is not `[0-9]`, then this returns an error.
/// Similarly, if the number parsed does not fit into a `i64`, then this
/// returns an error. Notably, this routine does not permit parsing a negative
/// integer. (We use `i64` because everything in this crate uses signed
/// integers, and because a higher level parser can easily handle the sign.)
#[cfg_attr(feature = "perf-inline", inline(always))]
pub(crate) fn i64(bytes: &[u8]) -> Result<i64, Error> {
    if bytes.is_empty() {
        return Err(Error::from(ParseIntError::NoDigitsFound));
    }
    let mut n: i64 = 0;
    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return Err(Error::from(ParseIntError::InvalidDigit(byte)));
        }
        let digit = i64::from(byte - b'0');
        n = n
            .checked_mul(10)
            .and_then(|n| n.checked_add(digit))
            .ok_or(ParseIntError::TooBig)?;
    }
    Ok(n)
}

/// Splits the given input into two slices at the given position.
///
/// If the position is greater than the length of the slice given, then this
/// returns `None`.
#[cfg_attr(feature = "perf-inline", inline(always))]
pub(crate) fn split(input: &[u8], at: usize) -> Option<(&[u8], &[u8])> {
    if at > input.len() {
        None
    } else {
        Some(input.split_at(at))
    }
}

/// Returns the length of the longest prefix of `input` made up of ASCII
/// digits.
#[cfg_attr(feature = "perf-inline", inline(always))]
pub(crate) fn digits_len(input: &[u8]) -> usize {
    input.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_i64() {
        assert_eq!(i64(b"0").unwrap(), 0);
        assert_eq!(i64(b"00012").unwrap(), 12);
        assert_eq!(i64(b"9223372036854775807").unwrap(), i64::MAX);
        insta::assert_snapshot!(
            i64(b"9223372036854775808").unwrap_err(),
            @"number too big to parse into 64-bit integer",
        );
        insta::assert_snapshot!(
            i64(b"").unwrap_err(),
            @"invalid number, no digits found",
        );
        insta::assert_snapshot!(
            i64(b"1a").unwrap_err(),
            @"invalid digit, expected 0-9 but got a",
        );
    }

    #[test]
    fn split_and_digits() {
        assert_eq!(split(b"abc", 1), Some((&b"a"[..], &b"bc"[..])));
        assert_eq!(split(b"abc", 3), Some((&b"abc"[..], &b""[..])));
        assert_eq!(split(b"abc", 4), None);
        assert_eq!(digits_len(b"123ms"), 3);
        assert_eq!(digits_len(b"ms"), 0);
    }
}
