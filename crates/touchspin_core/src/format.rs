//! Conversion between numeric values and input text
//!
//! The formatter is a borrowed view over a [`Settings`] snapshot, so it always
//! reflects the decimals, decorations and callbacks currently in effect.

use crate::settings::Settings;
use crate::step::to_fixed;

/// Parse the leading number of `text`, ignoring leading whitespace and any
/// trailing garbage (`"12px"` parses as `12`)
///
/// Returns `None` when no digits are found or the result is not finite.
pub fn parse_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if end < len && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < len && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if has_digits || frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        }
    }

    if !has_digits {
        return None;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < len && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < len && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Formats and parses values according to a settings snapshot
#[derive(Clone, Copy, Debug)]
pub struct ValueFormatter<'a> {
    settings: &'a Settings,
}

impl<'a> ValueFormatter<'a> {
    /// Create a formatter for `settings`
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Remove prefix/postfix decoration and surrounding whitespace
    pub fn strip_decoration<'t>(&self, text: &'t str) -> &'t str {
        let mut stripped = text.trim();
        if !self.settings.prefix.is_empty() {
            stripped = stripped
                .strip_prefix(self.settings.prefix.as_str())
                .unwrap_or(stripped)
                .trim_start();
        }
        if !self.settings.postfix.is_empty() {
            stripped = stripped
                .strip_suffix(self.settings.postfix.as_str())
                .unwrap_or(stripped)
                .trim_end();
        }
        stripped
    }

    /// Text handed to the numeric parser: decoration stripped, then
    /// `callback_before_calculation` applied
    pub fn prepare(&self, text: &str) -> String {
        let stripped = self.strip_decoration(text);
        match &self.settings.callback_before_calculation {
            Some(callback) => callback.call(stripped),
            None => stripped.to_string(),
        }
    }

    /// Parse input text into a value; `None` stands for an empty or
    /// non-numeric input
    pub fn parse(&self, text: &str) -> Option<f64> {
        parse_float(&self.prepare(text))
    }

    /// Fixed-point text with `callback_after_calculation` applied, without
    /// decoration
    ///
    /// This is what the host input displays; prefix and postfix are rendered
    /// around it by the renderer.
    pub fn format_bare(&self, value: f64) -> String {
        let fixed = to_fixed(value, self.settings.decimals);
        match &self.settings.callback_after_calculation {
            Some(callback) => callback.call(&fixed),
            None => fixed,
        }
    }

    /// Fully decorated text: `prefix + format_bare(value) + postfix`
    pub fn format(&self, value: f64) -> String {
        let mut text = String::with_capacity(
            self.settings.prefix.len() + self.settings.postfix.len() + 16,
        );
        text.push_str(&self.settings.prefix);
        text.push_str(&self.format_bare(value));
        text.push_str(&self.settings.postfix);
        text
    }

    /// Decorate already-formatted bare text
    pub fn decorate(&self, bare: &str) -> String {
        format!("{}{}{}", self.settings.prefix, bare, self.settings.postfix)
    }
}
