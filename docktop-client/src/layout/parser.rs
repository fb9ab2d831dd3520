//! Parser for the layout description language.
//!
//! Each non-blank line is a row of widgets, rendered top to bottom. A line
//! whose first non-space character is `#` is a comment. Tokens are separated
//! by whitespace and follow `(ROWSPAN:)?NAME(/WEIGHT)?`:
//!
//! ```text
//! # cpu graph on top, two tables below it
//! 2:cpu host/2
//! volumes network
//! ```
//!
//! - names are case-insensitive and stored lower-cased
//! - a widget is as wide as its weight divided by the total weight of its row
//! - `N:` makes the widget N rows tall; shorter widgets from the following
//!   lines fill the space beside it (see [`super::grid`])
//! - a rowspan or weight that is not a positive integer becomes 1
//!
//! Parsing never fails. Malformed tokens are coerced and reported through
//! `tracing`, unknown names are only rejected when widgets are instantiated.

use std::{convert::Infallible, fmt, io::BufRead, str::FromStr};

use tracing::warn;

use crate::error::Result;

/// One parsed layout token.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSpec {
    /// Lower-cased widget name.
    pub name: String,
    /// Raw width weight, always >= 1.
    pub weight: u32,
    /// Number of layout rows the widget covers, always >= 1.
    pub row_span: u32,
    /// `weight` divided by the total weight of the row.
    pub share: f64,
}

impl WidgetSpec {
    pub fn new(name: impl Into<String>, weight: u32, row_span: u32) -> Self {
        Self {
            name: name.into().to_lowercase(),
            weight: weight.max(1),
            row_span: row_span.max(1),
            share: 1.0,
        }
    }
}

impl fmt::Display for WidgetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // An empty or `#`-prefixed name needs the span prefix to survive a reparse.
        if self.row_span > 1 || self.name.is_empty() || self.name.starts_with('#') {
            write!(f, "{}:", self.row_span)?;
        }
        f.write_str(&self.name)?;
        if self.weight > 1 {
            write!(f, "/{}", self.weight)?;
        }
        Ok(())
    }
}

/// Ordered rows of widget specs, top to bottom, each row left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub rows: Vec<Vec<WidgetSpec>>,
}

impl Layout {
    /// Parses layout text. Total: any input yields a layout.
    pub fn parse(text: &str) -> Self {
        parse_layout(text)
    }

    /// Reads and parses a layout from a file or any other buffered reader.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; only I/O failures are
    /// errors.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut rows = Vec::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if let Some(row) = parse_line(&String::from_utf8_lossy(&line)) {
                rows.push(row);
            }
        }
        Ok(Self { rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over every spec in reading order.
    pub fn specs(&self) -> impl Iterator<Item = &WidgetSpec> {
        self.rows.iter().flatten()
    }
}

impl FromStr for Layout {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let mut first = true;
            for spec in row {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{spec}")?;
                first = false;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// Parses layout text into rows, coercing malformed tokens instead of failing.
pub fn parse_layout(text: &str) -> Layout {
    Layout {
        rows: text.lines().filter_map(parse_line).collect(),
    }
}

fn parse_line(line: &str) -> Option<Vec<WidgetSpec>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut row: Vec<WidgetSpec> = line.split_whitespace().map(parse_token).collect();

    let total: u64 = row.iter().map(|s| u64::from(s.weight)).sum();
    let total = total.max(1) as f64;
    for spec in &mut row {
        spec.share = f64::from(spec.weight) / total;
    }

    Some(row)
}

fn parse_token(token: &str) -> WidgetSpec {
    let mut slash_parts = token.split('/');
    let head = slash_parts.next().unwrap_or_default();
    let weight = slash_parts
        .next()
        .map(|w| coerce_positive(w, "weight", token))
        .unwrap_or(1);
    if slash_parts.next().is_some() {
        warn!(token, "layout token has more than one '/', extra parts ignored");
    }

    let (row_span, name) = match head.split_once(':') {
        Some((span, rest)) => {
            let name = match rest.split_once(':') {
                Some((name, _)) => {
                    warn!(token, "layout token has more than one ':', extra parts ignored");
                    name
                }
                None => rest,
            };
            (coerce_positive(span, "rowspan", token), name)
        }
        None => (1, head),
    };

    WidgetSpec::new(name, weight, row_span)
}

/// Parses a positive integer, falling back to 1 with a diagnostic.
fn coerce_positive(raw: &str, what: &'static str, token: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => n.min(i64::from(u32::MAX)) as u32,
        Ok(n) => {
            warn!(token, value = n, "layout {what} must be at least 1, using 1");
            1
        }
        Err(e) => {
            warn!(token, error = %e, "layout {what} is not an integer, using 1");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn only(text: &str) -> WidgetSpec {
        let layout = Layout::parse(text);
        assert_eq!(layout.rows.len(), 1);
        assert_eq!(layout.rows[0].len(), 1);
        layout.rows[0][0].clone()
    }

    #[test]
    fn test_span_name_weight() {
        let spec = only("2:net/3");
        assert_eq!(spec.name, "net");
        assert_eq!(spec.row_span, 2);
        assert_eq!(spec.weight, 3);
        assert_eq!(spec.share, 1.0);
    }

    #[test]
    fn test_bare_name_defaults() {
        let spec = only("cpu");
        assert_eq!(spec, WidgetSpec::new("cpu", 1, 1));
    }

    #[test]
    fn test_names_are_lower_cased() {
        assert_eq!(only("CPU").name, "cpu");
        assert_eq!(only("3:NetWork/2").name, "network");
    }

    #[test]
    fn test_bad_numbers_coerce_to_one() {
        for token in ["0:cpu/0", "-2:cpu/-7", "x:cpu/y", ":cpu/", "1.5:cpu/2.5"] {
            let spec = only(token);
            assert_eq!(spec.row_span, 1, "{token}");
            assert_eq!(spec.weight, 1, "{token}");
            assert_eq!(spec.name, "cpu", "{token}");
        }
    }

    #[test]
    fn test_coercion_is_reported() {
        let (layout, logs) = crate::log::capture_warnings(|| Layout::parse("0:cpu/x"));
        assert_eq!(layout.rows[0][0], WidgetSpec::new("cpu", 1, 1));
        assert!(logs.contains("rowspan must be at least 1"), "{logs}");
        assert!(logs.contains("weight is not an integer"), "{logs}");

        let (_, logs) = crate::log::capture_warnings(|| Layout::parse("2:cpu/3"));
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn test_extra_parts_ignored() {
        let spec = only("2:cpu/3/9");
        assert_eq!((spec.row_span, spec.weight), (2, 3));

        let spec = only("2:cpu:4/3");
        assert_eq!(spec.name, "cpu");
        assert_eq!(spec.row_span, 2);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let layout = Layout::parse("# header\n\n   \ncpu\n   # indented comment\nnet mem\n");
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.rows[1].len(), 2);
    }

    #[test]
    fn test_hash_inside_line_is_a_name() {
        let layout = Layout::parse("cpu #x");
        assert_eq!(layout.rows[0][1].name, "#x");
    }

    #[test]
    fn test_row_shares() {
        let layout = Layout::parse("disk/2 mem/4\nvolumes network");
        let shares: Vec<f64> = layout.rows[0].iter().map(|s| s.share).collect();
        assert!((shares[0] - 2.0 / 6.0).abs() < 1e-9);
        assert!((shares[1] - 4.0 / 6.0).abs() < 1e-9);
        assert!(layout.rows[1].iter().all(|s| (s.share - 0.5).abs() < 1e-9));
    }

    #[test]
    fn test_zero_weights_still_sum_to_one() {
        let layout = Layout::parse("a/0 b/0 c/-1");
        let sum: f64 = layout.rows[0].iter().map(|s| s.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        assert!(Layout::parse("").is_empty());
        assert!(Layout::parse("# only a comment\n\n").is_empty());
    }

    #[test]
    fn test_display_is_canonical() {
        let layout = Layout::parse("CPU/1 1:mem 3:net/2\n\n# c\nvolumes");
        assert_eq!(layout.to_string(), "cpu mem 3:net/2\nvolumes\n");
    }

    #[test]
    fn test_display_keeps_degenerate_names() {
        let layout = Layout::parse("1:#x 1: /4");
        let again = Layout::parse(&layout.to_string());
        assert_eq!(layout, again);
    }

    #[test]
    fn test_from_reader() {
        let text = "cpu\nvolumes network\n";
        let layout = Layout::from_reader(std::io::Cursor::new(text)).unwrap();
        assert_eq!(layout, Layout::parse(text));
    }

    #[test]
    fn test_from_reader_tolerates_invalid_utf8() {
        let bytes: &[u8] = b"cpu\r\n\xffnet volumes\n";
        let layout = Layout::from_reader(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.rows[0][0].name, "cpu");
        assert_eq!(layout.rows[1][0].name, "\u{fffd}net");
        assert_eq!(layout.rows[1][1].name, "volumes");
    }

    fn token() -> impl Strategy<Value = String> {
        "(-?[0-9]{0,2}:)?[a-zA-Z#]{0,6}(/-?[0-9a-z]{0,2}){0,2}"
    }

    fn layout_text() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::collection::vec(token(), 0..5), 0..6).prop_map(|rows| {
            rows.into_iter()
                .map(|r| r.join(" "))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    proptest! {
        #[test]
        fn prop_shares_sum_to_one(text in layout_text()) {
            for row in Layout::parse(&text).rows {
                let sum: f64 = row.iter().map(|s| s.share).sum();
                prop_assert!((sum - 1.0).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_span_and_weight_positive(t in token()) {
            for spec in Layout::parse(&t).specs() {
                prop_assert!(spec.row_span >= 1);
                prop_assert!(spec.weight >= 1);
            }
        }

        #[test]
        fn prop_round_trip(text in layout_text()) {
            let parsed = Layout::parse(&text);
            prop_assert_eq!(Layout::parse(&parsed.to_string()), parsed);
        }
    }
}
