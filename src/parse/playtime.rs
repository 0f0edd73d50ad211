//! Playtime string aggregation.
//!
//! Playtime is stored as typed, e.g. "412 PS + 7,9 PC": one segment per
//! platform, joined with `+`, comma or period as the decimal separator.

/// Sum the hour counts of a playtime string, rounded to one decimal place.
/// Segments without a leading numeric token contribute 0, so unparseable or
/// empty input yields 0.0.
pub fn parse_playtime(text: &str) -> f64 {
    let mut total = 0.0;

    for segment in text.split('+') {
        let segment = segment.trim();
        let token: String = segment
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
            .collect();
        let token = token.replace(',', ".");
        if token.is_empty() {
            continue;
        }
        if let Ok(value) = token.parse::<f64>() {
            total += value;
        }
    }

    (total * 10.0).round() / 10.0
}
