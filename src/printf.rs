//! Compact printf-style formatting engine.
//!
//! Every text the shell produces goes through here. Only a small, fixed
//! subset of conversions is supported:
//!
//! ```text
//! %[0|-][width][l|L]<conv>
//!
//! conv  s  string       c  character
//!       b  binary       o  octal
//!       d  signed dec   u  unsigned dec
//!       x  hex (case of the letter picks the digit case)
//! ```
//!
//! Examples:
//!
//! ```text
//! "%d",       1234        "1234"
//! "%6d,%3d%%", -200, 5    "  -200,  5%"
//! "%-6u",     100         "100   "
//! "%04x",     0xA3        "00a3"
//! "%08lX",    0x123ABC    "00123ABC"
//! "%016b",    0x550F      "0101010100001111"
//! "%4s",      "abc"       " abc"
//! ```
//!
//! Width only ever adds padding, it never truncates. Unknown conversion
//! letters are emitted as-is. Native numerals are 32 bits, `l` selects 64.

use crate::sink::{BufferSink, Sink};

/// Scratch digits per numeral. Longer numerals keep their low digits only.
pub const SCRATCH_DIGITS: usize = 16;

/// A formatting argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    /// Byte string for `%s`.
    Str(&'a [u8]),
    /// Single byte for `%c`.
    Char(u8),
    /// Signed integer (sign-extended to 64 bits).
    Signed(i64),
    /// Unsigned integer (zero-extended to 64 bits).
    Unsigned(u64),
}

impl<'a> Arg<'a> {
    fn as_signed(self) -> i64 {
        match self {
            Arg::Signed(v) => v,
            Arg::Unsigned(v) => v as i64,
            Arg::Char(c) => c as i64,
            Arg::Str(_) => 0,
        }
    }

    fn as_unsigned(self) -> u64 {
        match self {
            Arg::Signed(v) => v as u64,
            Arg::Unsigned(v) => v,
            Arg::Char(c) => c as u64,
            Arg::Str(_) => 0,
        }
    }

    fn as_bytes(self) -> &'a [u8] {
        match self {
            Arg::Str(s) => s,
            _ => &[],
        }
    }

    fn as_char(self) -> u8 {
        match self {
            Arg::Char(c) => c,
            Arg::Str(s) => s.first().copied().unwrap_or(0),
            other => other.as_unsigned() as u8,
        }
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Arg::Str(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(s: &'a [u8]) -> Self {
        Arg::Str(s)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Arg<'a> {
    fn from(s: &'a [u8; N]) -> Self {
        Arg::Str(s)
    }
}

impl From<char> for Arg<'_> {
    fn from(c: char) -> Self {
        Arg::Char(c as u8)
    }
}

impl From<u8> for Arg<'_> {
    fn from(c: u8) -> Self {
        Arg::Char(c)
    }
}

macro_rules! impl_arg_from {
    ($variant:ident, $wide:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Arg<'_> {
                #[inline]
                fn from(v: $t) -> Self {
                    Arg::$variant(v as $wide)
                }
            }
        )+
    };
}

impl_arg_from!(Signed, i64, i8, i16, i32, i64, isize);
impl_arg_from!(Unsigned, u64, u16, u32, u64, usize);

/// What a conversion produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    String,
    Char,
    Binary,
    Octal,
    DecimalSigned,
    DecimalUnsigned,
    Hex,
    /// Unknown letter, emitted unchanged.
    Literal(u8),
}

impl Conversion {
    fn radix(self) -> u64 {
        match self {
            Conversion::Binary => 2,
            Conversion::Octal => 8,
            Conversion::Hex => 16,
            _ => 10,
        }
    }
}

/// A parsed `%` conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub zero_pad: bool,
    pub left_justify: bool,
    pub long_arg: bool,
    pub width: usize,
    pub conversion: Conversion,
    /// Conversion letter was upper case (`X` gives `A-F`).
    pub upper: bool,
}

impl FormatSpec {
    /// Parse the conversion that follows a `%`.
    ///
    /// Returns the parsed conversion and the number of bytes consumed, or `None` if the
    /// template ends before the conversion letter.
    pub fn parse(bytes: &[u8]) -> Option<(Self, usize)> {
        let mut spec = FormatSpec {
            zero_pad: false,
            left_justify: false,
            long_arg: false,
            width: 0,
            conversion: Conversion::Literal(0),
            upper: false,
        };
        let mut i = 0;

        // Flags are mutually exclusive, first one wins
        match bytes.first() {
            Some(b'0') => {
                spec.zero_pad = true;
                i += 1;
            }
            Some(b'-') => {
                spec.left_justify = true;
                i += 1;
            }
            _ => {}
        }

        while let Some(&c) = bytes.get(i).filter(|c| c.is_ascii_digit()) {
            spec.width = spec.width.saturating_mul(10).saturating_add((c - b'0') as usize);
            i += 1;
        }

        if matches!(bytes.get(i), Some(b'l' | b'L')) {
            spec.long_arg = true;
            i += 1;
        }

        let letter = *bytes.get(i)?;
        spec.upper = letter.is_ascii_uppercase();
        spec.conversion = match letter.to_ascii_uppercase() {
            b'S' => Conversion::String,
            b'C' => Conversion::Char,
            b'B' => Conversion::Binary,
            b'O' => Conversion::Octal,
            b'D' => Conversion::DecimalSigned,
            b'U' => Conversion::DecimalUnsigned,
            b'X' => Conversion::Hex,
            _ => Conversion::Literal(letter),
        };

        Some((spec, i + 1))
    }
}

/// The sink refused output before a single byte was sent.
///
/// Carries the sink's non-positive return code verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkRefused(pub i32);

impl core::fmt::Display for SinkRefused {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sink refused output ({})", self.0)
    }
}

/// Counts bytes sent during one formatting call.
struct Emitter<'s, S: Sink + ?Sized> {
    sink: &'s mut S,
    sent: usize,
}

impl<S: Sink + ?Sized> Emitter<'_, S> {
    #[inline]
    fn put(&mut self, byte: u8) -> Result<(), i32> {
        let n = self.sink.emit(byte);
        if n <= 0 {
            return Err(n);
        }
        self.sent += n as usize;
        Ok(())
    }

    fn put_all(&mut self, bytes: &[u8]) -> Result<(), i32> {
        bytes.iter().try_for_each(|&b| self.put(b))
    }

    fn repeat(&mut self, byte: u8, count: usize) -> Result<(), i32> {
        (0..count).try_for_each(|_| self.put(byte))
    }

    fn finish(self, outcome: Result<(), i32>) -> Result<usize, SinkRefused> {
        match outcome {
            Err(code) if self.sent == 0 => Err(SinkRefused(code)),
            _ => Ok(self.sent),
        }
    }
}

/// Format `template` with `args` into `sink`.
///
/// Returns the number of bytes sent. If the sink refuses, formatting stops:
/// the partial count is returned if anything was sent in this call, otherwise
/// the sink's refusal code comes back as [`SinkRefused`].
pub fn format<S: Sink + ?Sized>(
    sink: &mut S,
    template: &str,
    args: &[Arg<'_>],
) -> Result<usize, SinkRefused> {
    let mut out = Emitter { sink, sent: 0 };
    let outcome = render(&mut out, template.as_bytes(), args);
    out.finish(outcome)
}

fn render<S: Sink + ?Sized>(
    out: &mut Emitter<'_, S>,
    template: &[u8],
    args: &[Arg<'_>],
) -> Result<(), i32> {
    let mut args = args.iter().copied();
    let mut i = 0;

    while i < template.len() {
        let c = template[i];
        i += 1;
        if c != b'%' {
            out.put(c)?;
            continue;
        }

        let Some((spec, used)) = FormatSpec::parse(&template[i..]) else {
            break;
        };
        i += used;

        match spec.conversion {
            Conversion::Literal(letter) => out.put(letter)?,
            Conversion::Char => {
                if let Some(arg) = args.next() {
                    out.put(arg.as_char())?;
                }
            }
            Conversion::String => {
                let s = args.next().map(Arg::as_bytes).unwrap_or(&[]);
                let pad = spec.width.saturating_sub(s.len());
                if !spec.left_justify {
                    out.repeat(b' ', pad)?;
                }
                out.put_all(s)?;
                if spec.left_justify {
                    out.repeat(b' ', pad)?;
                }
            }
            _ => {
                let arg = args.next().unwrap_or(Arg::Unsigned(0));
                let mut digits = [0u8; SCRATCH_DIGITS + 1];
                let n = numeral(&spec, arg, &mut digits);
                let pad = spec.width.saturating_sub(n);
                if !spec.left_justify {
                    out.repeat(if spec.zero_pad { b'0' } else { b' ' }, pad)?;
                }
                for &d in digits[..n].iter().rev() {
                    out.put(d)?;
                }
                if spec.left_justify {
                    out.repeat(b' ', pad)?;
                }
            }
        }
    }

    Ok(())
}

/// Render a numeral least-significant digit first, sign last.
///
/// Returns the number of bytes produced in `digits`.
fn numeral(spec: &FormatSpec, arg: Arg<'_>, digits: &mut [u8; SCRATCH_DIGITS + 1]) -> usize {
    let (mut value, negative) = match (spec.conversion, spec.long_arg) {
        (Conversion::DecimalSigned, true) => {
            let v = arg.as_signed();
            (v.unsigned_abs(), v < 0)
        }
        (Conversion::DecimalSigned, false) => {
            let v = arg.as_signed() as i32;
            (v.unsigned_abs() as u64, v < 0)
        }
        (_, true) => (arg.as_unsigned(), false),
        (_, false) => (arg.as_unsigned() as u32 as u64, false),
    };

    let radix = spec.conversion.radix();
    let letters = if spec.upper { b'A' } else { b'a' };
    let mut n = 0;
    loop {
        let d = (value % radix) as u8;
        value /= radix;
        digits[n] = if d > 9 { letters + d - 10 } else { b'0' + d };
        n += 1;
        if value == 0 || n == SCRATCH_DIGITS {
            break;
        }
    }
    if negative {
        digits[n] = b'-';
        n += 1;
    }
    n
}

/// Emit a single byte, same refusal contract as [`format`].
pub fn put_byte<S: Sink + ?Sized>(sink: &mut S, byte: u8) -> Result<usize, SinkRefused> {
    let mut out = Emitter { sink, sent: 0 };
    let outcome = out.put(byte);
    out.finish(outcome)
}

/// Emit raw bytes, same refusal contract as [`format`].
pub fn put_bytes<S: Sink + ?Sized>(sink: &mut S, bytes: &[u8]) -> Result<usize, SinkRefused> {
    let mut out = Emitter { sink, sent: 0 };
    let outcome = out.put_all(bytes);
    out.finish(outcome)
}

/// Emit a string, same refusal contract as [`format`].
#[inline]
pub fn put_str<S: Sink + ?Sized>(sink: &mut S, s: &str) -> Result<usize, SinkRefused> {
    put_bytes(sink, s.as_bytes())
}

/// Format into a fixed buffer (`snprintf`).
///
/// The buffer is always NUL-terminated (if it has any room at all) and never
/// overrun. Output that does not fit is dropped silently. Returns the number
/// of bytes written, excluding the terminator.
pub fn snformat(buf: &mut [u8], template: &str, args: &[Arg<'_>]) -> usize {
    let mut sink = BufferSink::new(buf);
    let _ = format(&mut sink, template, args);
    sink.len()
}

/// printf into a [`Sink`].
///
/// ```ignore
/// shell_printf!(&mut sink, "%-8s %04x\r\n", "REG", 0xA3);
/// ```
#[macro_export]
macro_rules! shell_printf {
    ($sink:expr, $fmt:expr) => {
        $crate::printf::format($sink, $fmt, &[])
    };
    ($sink:expr, $fmt:expr, $($arg:expr),+ $(,)?) => {
        $crate::printf::format($sink, $fmt, &[$($crate::printf::Arg::from($arg)),+])
    };
}

/// snprintf into a byte buffer, returns bytes written.
#[macro_export]
macro_rules! shell_snprintf {
    ($buf:expr, $fmt:expr) => {
        $crate::printf::snformat($buf, $fmt, &[])
    };
    ($buf:expr, $fmt:expr, $($arg:expr),+ $(,)?) => {
        $crate::printf::snformat($buf, $fmt, &[$($crate::printf::Arg::from($arg)),+])
    };
}
