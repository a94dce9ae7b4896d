// crates/common/src/format.rs
//! Display helpers shared by report renderers.

/// `$1,234.56`, `$0.1234`, `$0.000012` or `N/A` for the unavailable sentinel
pub fn format_price(price: f64) -> String {
    if price == 0.0 {
        return "N/A".to_string();
    }
    if price < 0.01 {
        return format!("${:.6}", price);
    }
    if price < 1.0 {
        return format!("${:.4}", price);
    }
    format!("${}", group_thousands(&format!("{:.2}", price)))
}

/// Percent change with two decimals, no sign padding
pub fn format_change(change: f64) -> String {
    if change == 0.0 || !change.is_finite() {
        return "0.00".to_string();
    }
    format!("{:.2}", change)
}

/// `no_breach` -> `No Breach`
pub fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn group_thousands(fixed: &str) -> String {
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed, ""));
    let digits = int_part.len();

    let mut grouped = String::with_capacity(digits + digits / 3 + frac_part.len() + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !frac_part.is_empty() {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}
