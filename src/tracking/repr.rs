//! Argument rendering for call histories.
//!
//! Positional arguments are rendered as a tuple literal: `('a',)`, `(1, 2.5)`, `()`.
//! Strings are quoted so `('1',)` and `(1,)` stay distinguishable in a replay.

// == Arg Repr ==
/// Quoted, unambiguous rendering of a single argument.
pub trait ArgRepr {
    fn repr(&self) -> String;
}

impl ArgRepr for str {
    fn repr(&self) -> String {
        let quote = if self.contains('\'') && !self.contains('"') {
            '"'
        } else {
            '\''
        };

        let mut out = String::with_capacity(self.len() + 2);
        out.push(quote);
        for c in self.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(quote);
        out
    }
}

impl ArgRepr for String {
    fn repr(&self) -> String {
        self.as_str().repr()
    }
}

impl<T: ArgRepr + ?Sized> ArgRepr for &T {
    fn repr(&self) -> String {
        (**self).repr()
    }
}

impl ArgRepr for i64 {
    fn repr(&self) -> String {
        self.to_string()
    }
}

impl ArgRepr for u64 {
    fn repr(&self) -> String {
        self.to_string()
    }
}

impl ArgRepr for i32 {
    fn repr(&self) -> String {
        self.to_string()
    }
}

impl ArgRepr for f64 {
    fn repr(&self) -> String {
        format!("{:?}", self)
    }
}

impl ArgRepr for Vec<u8> {
    fn repr(&self) -> String {
        repr_bytes(self)
    }
}

/// Renders a byte string as `b'...'`, escaping non-printable bytes as `\xNN`.
pub fn repr_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push_str("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push('\'');
    out
}

// == Call Args ==
/// A positional argument list that can be rendered for the input history.
pub trait CallArgs {
    fn render(&self) -> String;
}

impl CallArgs for () {
    fn render(&self) -> String {
        "()".to_string()
    }
}

impl<A: ArgRepr> CallArgs for (A,) {
    fn render(&self) -> String {
        format!("({},)", self.0.repr())
    }
}

impl<A: ArgRepr, B: ArgRepr> CallArgs for (A, B) {
    fn render(&self) -> String {
        format!("({}, {})", self.0.repr(), self.1.repr())
    }
}

impl<A: ArgRepr, B: ArgRepr, C: ArgRepr> CallArgs for (A, B, C) {
    fn render(&self) -> String {
        format!("({}, {}, {})", self.0.repr(), self.1.repr(), self.2.repr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_repr_quoting() {
        assert_eq!("a".repr(), "'a'");
        assert_eq!("it's".repr(), "\"it's\"");
        assert_eq!("say \"hi\"".repr(), "'say \"hi\"'");
        assert_eq!("both ' \"".repr(), "'both \\' \"'");
        assert_eq!("line\nbreak".repr(), "'line\\nbreak'");
    }

    #[test]
    fn test_number_repr() {
        assert_eq!(42i64.repr(), "42");
        assert_eq!(1.5f64.repr(), "1.5");
        assert_eq!(3.0f64.repr(), "3.0");
    }

    #[test]
    fn test_bytes_repr() {
        assert_eq!(repr_bytes(b"abc"), "b'abc'");
        assert_eq!(repr_bytes(&[0x00, 0xff]), "b'\\x00\\xff'");
        assert_eq!(repr_bytes(b"a'b"), "b'a\\'b'");
    }

    #[test]
    fn test_tuple_render() {
        assert_eq!(().render(), "()");
        assert_eq!(("a",).render(), "('a',)");
        assert_eq!((1i64, 2.5f64).render(), "(1, 2.5)");
        assert_eq!(("k".to_string(), 3i64, "v").render(), "('k', 3, 'v')");
    }
}
