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

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    // Try to parse ISO format and convert to readable
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        // Try to parse YYYY-MM-DD format
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Format an amount of money with two decimals
pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Shorten a UUID order id to its first block for list display
pub fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Crème brûlée", 8), "Crème...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-01T08:00:00Z"), "Mar 01, 2025");
        assert_eq!(format_date("2025-03-01 08:00"), "2025-03-01");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_format_money_and_short_id() {
        assert_eq!(format_money(12.5), "$12.50");
        assert_eq!(short_id("5f0c6e1a-9d2b-4c43"), "5f0c6e1a");
        assert_eq!(short_id("plain"), "plain");
    }
}
