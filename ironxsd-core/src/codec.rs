//! Scalar codecs for XSD built-in types.
//!
//! Every scalar is encoded to and decoded from its XSD lexical form. Decoding
//! never panics: [`XmlScalar::decode`] returns `None` on malformed text and
//! [`decode_lenient`] falls back to the type's default with a failure flag.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// How malformed scalar content is handled while reading a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecodePolicy {
    /// Log a warning and keep the type's default value.
    #[default]
    Lenient,
    /// Abort the enclosing read with [`crate::Error::ScalarDecode`].
    Strict,
}

/// A value with a symmetric XSD text encoding.
pub trait XmlScalar: Sized + Default {
    /// XSD name of the scalar kind, used in diagnostics.
    const KIND: &'static str;

    /// Encodes the value to its XSD lexical form.
    fn encode(&self) -> String;

    /// Decodes a value from its XSD lexical form.
    fn decode(text: &str) -> Option<Self>;
}

/// Decodes `text`, returning the default value and `false` on failure.
#[must_use]
pub fn decode_lenient<T: XmlScalar>(text: &str) -> (T, bool) {
    match T::decode(text) {
        Some(value) => (value, true),
        None => (T::default(), false),
    }
}

impl XmlScalar for String {
    const KIND: &'static str = "string";

    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

macro_rules! integer_scalar {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl XmlScalar for $ty {
                const KIND: &'static str = $kind;

                fn encode(&self) -> String {
                    self.to_string()
                }

                fn decode(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }
            }
        )*
    };
}

integer_scalar! {
    i8 => "byte",
    i16 => "short",
    i32 => "int",
    i64 => "long",
    u8 => "unsignedByte",
    u16 => "unsignedShort",
    u32 => "unsignedInt",
    u64 => "unsignedLong",
}

/// Floats encode as the shortest text that parses back to the same value.
/// Magnitudes below `1e-6` or at least `1e21` use exponent form (`1e300`),
/// others plain decimal. Infinities and NaN use the XSD spellings.
macro_rules! float_scalar {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl XmlScalar for $ty {
                const KIND: &'static str = $kind;

                fn encode(&self) -> String {
                    if self.is_nan() {
                        "NaN".to_string()
                    } else if self.is_infinite() {
                        String::from(if self.is_sign_positive() { "INF" } else { "-INF" })
                    } else if *self != 0.0 && !(1e-6..1e21).contains(&self.abs()) {
                        // Shortest round-trip digits in exponent form.
                        format!("{self:e}")
                    } else {
                        self.to_string()
                    }
                }

                fn decode(text: &str) -> Option<Self> {
                    match text.trim() {
                        "INF" | "+INF" => Some(<$ty>::INFINITY),
                        "-INF" => Some(<$ty>::NEG_INFINITY),
                        "NaN" => Some(<$ty>::NAN),
                        other => other.parse().ok(),
                    }
                }
            }
        )*
    };
}

float_scalar! {
    f32 => "float",
    f64 => "double",
}

impl XmlScalar for bool {
    const KIND: &'static str = "boolean";

    fn encode(&self) -> String {
        String::from(if *self { "true" } else { "false" })
    }

    fn decode(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") || text == "1" {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") || text == "0" {
            Some(false)
        } else {
            None
        }
    }
}

impl XmlScalar for NaiveDate {
    const KIND: &'static str = "date";

    fn encode(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }

    fn decode(text: &str) -> Option<Self> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
    }
}

impl XmlScalar for NaiveTime {
    const KIND: &'static str = "time";

    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl XmlScalar for NaiveDateTime {
    const KIND: &'static str = "dateTime";

    fn encode(&self) -> String {
        format!("{}T{}", self.date().encode(), self.time().encode())
    }

    fn decode(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl XmlScalar for DateTime<FixedOffset> {
    const KIND: &'static str = "dateTime";

    fn encode(&self) -> String {
        self.to_rfc3339()
    }

    fn decode(text: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(text.trim()).ok()
    }
}
