/*!
Provides convenience routines for escaping raw bytes in error messages.

Metadata strings and timestamps are nominally ASCII, but callers can hand us
any bytes at all. These wrappers make sure an error message never contains
raw control characters or invalid UTF-8.
*/

/// Provides a `Display` and `Debug` implementation for a single byte.
///
/// Printable ASCII is emitted as is. Everything else is emitted as an
/// escape sequence, with hex escapes in upper case (`\xFF`).
#[derive(Clone, Copy)]
pub(crate) struct Byte(pub(crate) u8);

impl core::fmt::Display for Byte {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.0 {
            b' ' => f.write_str(" "),
            b'\0' => f.write_str("\\0"),
            b'\n' => f.write_str("\\n"),
            b'\r' => f.write_str("\\r"),
            b'\t' => f.write_str("\\t"),
            b'\\' => f.write_str("\\\\"),
            b if b.is_ascii_graphic() => {
                core::fmt::Display::fmt(&char::from(b), f)
            }
            b => write!(f, "\\x{b:02X}"),
        }
    }
}

impl core::fmt::Debug for Byte {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// Provides a `Display` and `Debug` implementation for `&[u8]`.
///
/// Valid UTF-8 is emitted with control characters escaped. Bytes that are
/// not part of a valid UTF-8 sequence are emitted as hex escapes.
#[derive(Clone, Copy)]
pub(crate) struct Bytes<'a>(pub(crate) &'a [u8]);

impl<'a> core::fmt::Display for Bytes<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut bytes = self.0;
        while !bytes.is_empty() {
            let (valid, rest) = match core::str::from_utf8(bytes) {
                Ok(valid) => (valid, &[][..]),
                Err(err) => {
                    let (valid, rest) = bytes.split_at(err.valid_up_to());
                    // `valid_up_to` guarantees this prefix is valid UTF-8.
                    let valid = core::str::from_utf8(valid).unwrap_or("");
                    (valid, rest)
                }
            };
            for ch in valid.chars() {
                match ch {
                    '\0' => f.write_str("\\0")?,
                    '\x01'..='\x08' | '\x0b' | '\x0c' | '\x0e'..='\x1f'
                    | '\x7f' => write!(f, "\\x{:02x}", u32::from(ch))?,
                    _ => write!(f, "{}", ch.escape_debug())?,
                }
            }
            if let Some((&byte, rest)) = rest.split_first() {
                write!(f, "\\x{byte:02x}")?;
                bytes = rest;
            } else {
                bytes = rest;
            }
        }
        Ok(())
    }
}

impl<'a> core::fmt::Debug for Bytes<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "\"{self}\"")
    }
}
