//! Value formatters
//!
//! A formatter turns the integer being animated into the text pushed to the
//! display sink. Formatters are shared between the animator and its running
//! timer, so they are reference counted.

use std::sync::Arc;

/// Converts an animated value into display text
pub type Formatter = Arc<dyn Fn(i64) -> String + Send + Sync>;

/// The default formatter: plain decimal digits
pub fn plain() -> Formatter {
    Arc::new(|value: i64| value.to_string())
}

/// Decimal digits grouped in thousands, e.g. `grouped(",")` gives `1,234,567`
pub fn grouped(separator: impl Into<String>) -> Formatter {
    let separator = separator.into();
    Arc::new(move |value: i64| group_digits(value, &separator))
}

fn group_digits(value: i64, separator: &str) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len() + 1);

    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}
