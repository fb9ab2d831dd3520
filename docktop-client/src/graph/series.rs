//! Bounded per-key sample history for line graphs.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, VecDeque},
};

/// A series is trimmed once it holds this many times the visible width.
pub const TRIM_FACTOR: usize = 4;

/// Sample history and display metadata for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: String,
    /// Oldest first.
    pub samples: VecDeque<f64>,
    /// Index into the palette, see [`assign_colors`].
    pub color: usize,
    /// Text drawn after the key in the legend.
    pub label: String,
    pub bold: bool,
}

impl Series {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            samples: VecDeque::new(),
            color: 0,
            label: String::new(),
            bold: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    series: BTreeMap<String, Series>,
    palette_len: usize,
    /// Width of the last viewport the series were drawn in; 0 until first draw.
    visible_width: usize,
}

impl SeriesBuffer {
    pub fn new(palette_len: usize) -> Self {
        Self {
            series: BTreeMap::new(),
            palette_len: palette_len.max(1),
            visible_width: 0,
        }
    }

    /// Appends `value` to the series for `key`, creating it if needed.
    pub fn observe(&mut self, key: &str, value: f64) {
        let is_new = !self.series.contains_key(key);
        let visible_width = self.visible_width;
        let series = self
            .series
            .entry(key.to_string())
            .or_insert_with(|| Series::new(key));
        series.samples.push_back(value);
        trim_series(series, visible_width);

        if is_new {
            self.recolor();
        }
    }

    pub fn set_label(&mut self, key: &str, label: impl Into<String>) {
        if let Some(series) = self.series.get_mut(key) {
            series.label = label.into();
        }
    }

    pub fn set_bold(&mut self, key: &str, bold: bool) {
        if let Some(series) = self.series.get_mut(key) {
            series.bold = bold;
        }
    }

    /// Drops every series whose key fails `keep`, then reassigns colors.
    pub fn retain_keys<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.series.len();
        self.series.retain(|key, _| keep(key));
        if self.series.len() != before {
            self.recolor();
        }
    }

    /// Records the viewport width and trims every series against it.
    pub fn set_visible_width(&mut self, width: usize) {
        self.visible_width = width;
        for series in self.series.values_mut() {
            trim_series(series, width);
        }
    }

    pub fn visible_width(&self) -> usize {
        self.visible_width
    }

    pub fn get(&self, key: &str) -> Option<&Series> {
        self.series.get(key)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Series in legend order: natural sort of the keys.
    pub fn display_order(&self) -> Vec<&Series> {
        let mut out: Vec<&Series> = self.series.values().collect();
        out.sort_by(|a, b| natural_cmp(&a.key, &b.key).then_with(|| a.key.cmp(&b.key)));
        out
    }

    fn recolor(&mut self) {
        let colors = assign_colors(self.series.keys().map(String::as_str), self.palette_len);
        for (key, color) in colors {
            if let Some(series) = self.series.get_mut(&key) {
                series.color = color;
            }
        }
    }
}

fn trim_series(series: &mut Series, visible_width: usize) {
    if visible_width == 0 {
        return;
    }
    let len = series.samples.len();
    if len > TRIM_FACTOR * visible_width {
        series.samples.drain(..len - visible_width);
    }
}

/// Maps every key to a palette index: keys sorted, then cycled through the palette.
///
/// Depends only on the set of keys, never on the order they arrived in.
pub fn assign_colors<'a, I>(keys: I, palette_len: usize) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = keys.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();
    let palette_len = palette_len.max(1);
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, key)| (key.to_string(), i % palette_len))
        .collect()
}

/// Compares strings with runs of ASCII digits ordered by numeric value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_digits(&mut a);
                let nb = take_digits(&mut b);
                let ord = cmp_digit_runs(&na, &nb);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits<I: Iterator<Item = char>>(it: &mut std::iter::Peekable<I>) -> String {
    let mut digits = String::new();
    while let Some(c) = it.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
