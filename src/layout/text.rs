const ELLIPSIS: char = '\u{2026}';

/// Trims `text` so it fits into `max_width` pixels at `font_size`, ending
/// with an ellipsis when anything was cut.
pub(super) fn fit_label(text: &str, max_width: f32, font_size: f32) -> String {
    let text = text.trim();
    if text_width(text, font_size) <= max_width {
        return text.to_string();
    }

    let budget = max_width - char_width_factor(ELLIPSIS) * font_size;
    let mut fitted = String::new();
    let mut width = 0.0;
    for ch in text.chars() {
        let advance = char_width_factor(ch) * font_size;
        if width + advance > budget {
            break;
        }
        width += advance;
        fitted.push(ch);
    }
    let mut fitted = fitted.trim_end().to_string();
    fitted.push(ELLIPSIS);
    fitted
}

pub(super) fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

pub(super) fn char_width_factor(ch: char) -> f32 {
    // Average advances of a sans-serif UI font, relative to the font size.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        '-' | '_' => 0.4,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'f' | 'r' | 't' => 0.34,
        'i' | 'j' | 'l' => 0.235,
        'm' | 'w' => 0.84,
        '0'..='9' => 0.6,
        '@' | '#' | '%' | '&' => 0.946,
        ELLIPSIS => 0.8,
        _ => 0.568,
    }
}
