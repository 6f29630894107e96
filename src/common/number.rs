//! Locale-invariant number text for cell values and attributes.

use std::fmt::Write;

/// Append `n` to `buf` using the shortest round-trip representation.
///
/// Integral values are written without a fractional part (`123456`, not
/// `123456.0`).
#[inline]
pub fn write_num(buf: &mut String, n: f64) {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buffer = itoa::Buffer::new();
        buf.push_str(buffer.format(n as i64));
    } else {
        let mut buffer = ryu::Buffer::new();
        let s = buffer.format(n);
        match s.strip_suffix(".0") {
            Some(trimmed) => buf.push_str(trimmed),
            None => buf.push_str(s),
        }
    }
}

/// Format a number with [`write_num`] into a new string.
#[inline]
pub fn fmt_num(n: f64) -> String {
    let mut s = String::with_capacity(24);
    write_num(&mut s, n);
    s
}

/// Round to ten decimal places, the precision used for serial dates.
pub fn round_10(n: f64) -> f64 {
    let mut s = String::with_capacity(24);
    let _ = write!(s, "{:.10}", n);
    s.parse().unwrap_or(n)
}

/// Whether `s` looks like a plain decimal or scientific number.
///
/// Matches an optional sign, digits with an optional fraction (or a bare
/// fraction) and an optional exponent.
pub fn is_numeric(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;
    let mut frac_digits = 0;
    if i < b.len() && b[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        i += 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == b.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_have_no_fraction() {
        assert_eq!(fmt_num(123456.0), "123456");
        assert_eq!(fmt_num(-3.0), "-3");
        assert_eq!(fmt_num(0.0), "0");
    }

    #[test]
    fn fractions_are_shortest() {
        assert_eq!(fmt_num(1.5), "1.5");
        assert_eq!(fmt_num(0.1), "0.1");
        assert_eq!(fmt_num(39653.5), "39653.5");
    }

    #[test]
    fn rounding_to_ten_places() {
        assert_eq!(round_10(0.5000000000001), 0.5);
        assert_eq!(round_10(39653.0), 39653.0);
    }

    #[test]
    fn numeric_detection() {
        for s in ["1", "-1", "+1.5", ".5", "5.", "1e10", "1.5E-3"] {
            assert!(is_numeric(s), "{s}");
        }
        for s in ["", "-", ".", "abc", "1e", "1.2.3", "0x10", " 1"] {
            assert!(!is_numeric(s), "{s}");
        }
    }
}
