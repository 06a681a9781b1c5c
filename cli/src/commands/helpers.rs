use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use std::io::{self, BufRead, Write};

/// Resolve a date argument to an ISO `YYYY-MM-DD` string.
pub(crate) fn parse_date(date_str: Option<String>) -> Result<String> {
    match date_str {
        None => Ok(Local::now().date_naive().to_string()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive().to_string()),
            "yesterday" => Ok((Local::now().date_naive() - chrono::Duration::days(1)).to_string()),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(|d| d.to_string())
                .with_context(|| format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday")),
        },
    }
}

/// Validate a target/burned argument before it is stored as raw text.
pub(crate) fn validate_non_negative(value: f64, what: &str) -> Result<()> {
    if !value.is_finite() {
        bail!("{what} must be a finite number");
    }
    if value < 0.0 {
        bail!("{what} must not be negative");
    }
    Ok(())
}

pub(crate) fn json_error(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Ask a y/N question on stdin; anything but y/yes declines.
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_iso() {
        assert_eq!(
            parse_date(Some("2024-01-15".to_string())).unwrap(),
            "2024-01-15"
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date(Some("15/01/2024".to_string())).is_err());
        assert!(parse_date(Some("soonish".to_string())).is_err());
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today.to_string());
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today.to_string());
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            (today - chrono::Duration::days(1)).to_string()
        );
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(0.0, "Calorie target").is_ok());
        assert!(validate_non_negative(2000.0, "Calorie target").is_ok());
        assert!(validate_non_negative(-1.0, "Calorie target").is_err());
        assert!(validate_non_negative(f64::INFINITY, "Calorie target").is_err());
    }
}
