//! src/util/humanize.rs

/// Group digits in threes: `1234567` → `"1,234,567"`.
pub fn format_population(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Cut `text` to at most `width` characters, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_population() {
        assert_eq!(format_population(0), "0");
        assert_eq!(format_population(999), "999");
        assert_eq!(format_population(1_000), "1,000");
        assert_eq!(format_population(67_391_582), "67,391,582");
        assert_eq!(format_population(1_402_112_000), "1,402,112,000");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("France", 10), "France");
        assert_eq!(truncate("United Kingdom", 6), "Unite…");
        assert_eq!(truncate("abc", 0), "");
    }
}
