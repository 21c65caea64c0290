// src/extractors/value.rs

/// Textual multiplier following a figure ("$2.5 million").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magnitude {
    Thousand,
    Million,
    Billion,
}

impl Magnitude {
    // Largest first: the first word found wins.
    pub const ALL: [Magnitude; 3] = [Magnitude::Billion, Magnitude::Million, Magnitude::Thousand];

    pub fn word(self) -> &'static str {
        match self {
            Magnitude::Thousand => "thousand",
            Magnitude::Million => "million",
            Magnitude::Billion => "billion",
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Magnitude::Thousand => 1e3,
            Magnitude::Million => 1e6,
            Magnitude::Billion => 1e9,
        }
    }
}

/// Best-effort conversion of a matched figure to a number.
///
/// Currency symbols, thousands separators, percent signs and whitespace are
/// removed and a magnitude word is applied as a multiplier. Percentages stay
/// in percentage points (`"45%"` is `45.0`). Anything that does not reduce to
/// a finite number yields `None`, which downstream means "enter manually".
/// So does a figure whose separators are not groups of three (`"$1,00,000"`).
pub fn parse_value(raw: &str) -> Option<f64> {
    if !has_regular_grouping(raw) {
        tracing::trace!("Irregular digit grouping in '{}', leaving parsed value empty", raw);
        return None;
    }

    let mut cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
        .collect();

    let mut multiplier = 1.0;
    if let Some(magnitude) = Magnitude::ALL.into_iter().find(|m| cleaned.contains(m.word())) {
        cleaned = cleaned.replace(magnitude.word(), "");
        multiplier = magnitude.multiplier();
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            let scaled = value * multiplier;
            scaled.is_finite().then_some(scaled)
        }
        _ => {
            tracing::trace!("Could not normalize '{}', leaving parsed value empty", raw);
            None
        }
    }
}

/// Thousands separators, if any, must split the integer part into groups of three.
fn has_regular_grouping(raw: &str) -> bool {
    let integer_part: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    if !integer_part.contains(',') {
        return true;
    }
    let mut groups = integer_part.split(',');
    let leading = groups.next().unwrap_or_default();
    (1..=3).contains(&leading.len()) && groups.all(|g| g.len() == 3)
}
