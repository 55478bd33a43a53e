//! Display helpers shared by CLI output.

/// Format a byte count with the largest whole unit.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{} KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format a price with thousands separators; fractional prices keep two
/// decimals.
pub fn format_price(price: f64) -> String {
    let negative = price < 0.0;
    let abs = price.abs();
    let whole = abs.trunc() as u64;
    let frac = abs - abs.trunc();

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if frac > 0.0 {
        let cents = (frac * 100.0).round() as u64;
        out.push_str(&format!(",{:02}", cents.min(99)));
    }
    out
}
