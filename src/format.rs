use chrono::{NaiveDate, NaiveDateTime};

/// Value is already on the 0..100 scale.
pub fn format_percentage(pct: f64) -> String {
    if !pct.is_finite() {
        return "0.0%".to_string();
    }
    format!("{pct:.1}%")
}

pub fn format_fraction(p: f64) -> String {
    format_percentage(p * 100.0)
}

/// pt-BR grouping: `300000` -> `300.000`.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        .map(format_naive_date)
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%d/%m/%Y %H:%M").to_string()
}

pub fn format_goal_diff(diff: i32) -> String {
    if diff > 0 {
        format!("+{diff}")
    } else {
        diff.to_string()
    }
}

/// `19:30:00` -> `19:30`; missing kickoff -> `TBD`.
pub fn kickoff_label(raw: Option<&str>) -> String {
    let Some(t) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return "TBD".to_string();
    };
    let b = t.as_bytes();
    if b.len() >= 5 && b[2] == b':' && t.is_char_boundary(5) {
        t[..5].to_string()
    } else {
        t.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_use_one_decimal() {
        assert_eq!(format_percentage(46.62), "46.6%");
        assert_eq!(format_percentage(0.1), "0.1%");
        assert_eq!(format_percentage(f64::NAN), "0.0%");
        assert_eq!(format_fraction(0.55), "55.0%");
    }

    #[test]
    fn numbers_group_by_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(300000), "300.000");
        assert_eq!(format_number(1234567), "1.234.567");
    }

    #[test]
    fn dates_are_day_first() {
        assert_eq!(format_date(Some("2025-03-01")), "01/03/2025");
        assert_eq!(format_date(Some("01/03/2025")), "N/A");
        assert_eq!(format_date(None), "N/A");
    }

    #[test]
    fn kickoff_and_goal_diff_labels() {
        assert_eq!(kickoff_label(Some("19:30:00")), "19:30");
        assert_eq!(kickoff_label(Some("  ")), "TBD");
        assert_eq!(kickoff_label(None), "TBD");
        assert_eq!(format_goal_diff(3), "+3");
        assert_eq!(format_goal_diff(0), "0");
        assert_eq!(format_goal_diff(-2), "-2");
    }
}
