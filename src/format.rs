use rust_decimal::Decimal;

fn group_int_digits(int_part: &str) -> String {
    // Insert commas every 3 digits, preserving any leading zeros.
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

fn grouped_fixed_2dp(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let s = format!("{:.2}", abs);
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_int_digits(int_part));
    out.push('.');
    out.push_str(frac_part);
    out
}

/// Render a quantity as `#,##0.00`.
pub fn format_amount(value: Decimal) -> String {
    grouped_fixed_2dp(value)
}

/// Render a dollar value as `$#,##0.00` (sign before the symbol).
pub fn format_usd(value: Decimal) -> String {
    let s = grouped_fixed_2dp(value);
    match s.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${s}"),
    }
}
