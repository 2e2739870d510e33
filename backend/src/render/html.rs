//! HTML text helpers shared by the layout, pages and chart renderers.

use std::borrow::Cow;
use std::fmt::{self, Write};

use chrono::Month;

/// Escapes text for use in element content and quoted attribute values.
///
/// # Examples
/// ```
/// use dashboard::render::html::escape;
///
/// assert_eq!(escape("Bread & <Butter>"), "Bread &amp; &lt;Butter&gt;");
/// assert_eq!(escape("plain"), "plain");
/// ```
#[must_use]
pub fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 16);
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut grouped = String::with_capacity(len + len / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn grouped_decimal(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = formatted
        .split_once('.')
        .map_or((formatted.as_str(), None), |(integer, digits)| {
            (integer, Some(digits))
        });
    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    let mut text = format!("{sign}{}", group_thousands(whole));
    if let Some(digits) = fraction {
        text.push('.');
        text.push_str(digits);
    }
    text
}

/// Dollar amount with thousands separators and cents.
///
/// # Examples
/// ```
/// use dashboard::render::html::money;
///
/// assert_eq!(money(1234567.891), "$1,234,567.89");
/// assert_eq!(money(-5.5), "-$5.50");
/// ```
#[must_use]
pub fn money(value: f64) -> String {
    let text = grouped_decimal(value, 2);
    text.strip_prefix('-')
        .map_or_else(|| format!("${text}"), |rest| format!("-${rest}"))
}

/// Whole number with thousands separators.
#[must_use]
pub fn count(value: f64) -> String {
    grouped_decimal(value, 0)
}

/// Fixed-point number with one decimal place.
#[must_use]
pub fn decimal(value: f64) -> String {
    grouped_decimal(value, 1)
}

/// Ratio in `0..=1` as a percentage with one decimal place.
#[must_use]
pub fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Three-letter month label.
#[must_use]
pub const fn short_month(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// Writes a metric card with an optional signed change.
pub(crate) fn metric_card(
    out: &mut String,
    label: &str,
    value: &str,
    delta: Option<(f64, &str)>,
) -> fmt::Result {
    write!(
        out,
        r#"<div class="card"><div class="metric-container"><div class="metric-label">{}</div><div class="metric-value">{}</div>"#,
        escape(label),
        escape(value)
    )?;
    if let Some((change, description)) = delta {
        let class = if change >= 0.0 { "delta-up" } else { "delta-down" };
        write!(
            out,
            r#"<div class="{class}">{change:+.1}% {}</div>"#,
            escape(description)
        )?;
    }
    out.write_str("</div></div>")
}

/// Opens a data table with the given column headers.
pub(crate) fn table_start(
    out: &mut String,
    caption: Option<&str>,
    headers: &[&str],
) -> fmt::Result {
    out.write_str(r#"<table class="dataframe">"#)?;
    if let Some(text) = caption {
        write!(out, "<caption>{}</caption>", escape(text))?;
    }
    out.write_str("<thead><tr>")?;
    for header in headers {
        write!(out, "<th>{}</th>", escape(header))?;
    }
    out.write_str("</tr></thead><tbody>")
}

/// Writes one row of plain-text cells.
pub(crate) fn table_row<S: AsRef<str>>(out: &mut String, cells: &[S]) -> fmt::Result {
    out.write_str("<tr>")?;
    for cell in cells {
        write!(out, "<td>{}</td>", escape(cell.as_ref()))?;
    }
    out.write_str("</tr>")
}

/// Closes a table opened with [`table_start`].
pub(crate) fn table_end(out: &mut String) -> fmt::Result {
    out.write_str("</tbody></table>")
}

/// Writes a titled section opening tag.
pub(crate) fn section_start(out: &mut String, heading: &str) -> fmt::Result {
    write!(out, r#"<section class="card"><h2>{}</h2>"#, escape(heading))
}

/// Closes a section opened with [`section_start`].
pub(crate) fn section_end(out: &mut String) -> fmt::Result {
    out.write_str("</section>")
}

/// Writes a muted paragraph.
pub(crate) fn note(out: &mut String, text: &str) -> fmt::Result {
    write!(out, r#"<p class="note">{}</p>"#, escape(text))
}
