/// Placeholder for values the source did not report
pub const MISSING: &str = "—";

/// Format a count with the pt-BR thousands separator, e.g. 45892 -> "45.892"
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Format a ratio with two decimals and a decimal comma
pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v).replace('.', ","),
        _ => MISSING.to_string(),
    }
}

/// Format a percentage with one decimal and a decimal comma
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value).replace('.', ",")
}

/// "Sim" / "Não", or a dash when unknown
pub fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Sim",
        Some(false) => "Não",
        None => MISSING,
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
