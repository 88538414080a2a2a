//! Value parsers for text scraped off profile pages.
//!
//! Every parser returns `Result<_, ParseError>`; extraction code turns the
//! error into an unset field with `.ok()`.

use crate::error::ParseError;
use crate::model::StatValue;
use url::Url;

const LOAN_SUFFIX: &str = "(on loan)";

/// Parse a market value such as `€45.5M`, `£750K` or `$10`.
///
/// Any leading currency symbol is dropped.
pub fn market_value(raw: &str) -> Result<i64, ParseError> {
    let cleaned: String = raw
        .trim_start_matches(|c: char| !c.is_alphanumeric() && c != '.')
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return Err(ParseError::Empty);
    }

    let malformed = || ParseError::Malformed(raw.to_string());

    let (number, multiplier) = if let Some(n) = cleaned.strip_suffix('M') {
        (n, 1_000_000.0)
    } else if let Some(n) = cleaned.strip_suffix('K') {
        (n, 1_000.0)
    } else {
        return cleaned.trim().parse::<i64>().map_err(|_| malformed());
    };

    let value: f64 = number.trim().parse().map_err(|_| malformed())?;
    if !value.is_finite() {
        return Err(malformed());
    }
    Ok((value * multiplier).round() as i64)
}

/// Parse a statistic cell: `87%`, `1,5`, `23`.
///
/// A decimal point after normalization yields a float, otherwise an integer.
pub fn stat_value(raw: &str) -> Result<StatValue, ParseError> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let normalized = trimmed.replace(',', ".");
    let parsed = if normalized.contains('.') {
        normalized.parse::<f64>().ok().filter(|v| v.is_finite()).map(StatValue::Float)
    } else {
        normalized.parse::<i64>().ok().map(StatValue::Int)
    };
    parsed.ok_or_else(|| ParseError::Malformed(raw.to_string()))
}

/// Leading whitespace-separated token as an integer: `"183 cm"` -> 183.
pub fn leading_int(raw: &str) -> Result<i64, ParseError> {
    let token = raw.split_whitespace().next().ok_or(ParseError::Empty)?;
    if !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::Malformed(raw.to_string()));
    }
    token
        .parse()
        .map_err(|_| ParseError::Malformed(raw.to_string()))
}

/// A shirt number is all digits or nothing.
pub fn shirt_number(raw: &str) -> Result<i64, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::Malformed(raw.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| ParseError::Malformed(raw.to_string()))
}

/// Drop a trailing `(on loan)` qualifier from a club name.
pub fn strip_loan_suffix(club: &str) -> &str {
    match club.strip_suffix(LOAN_SUFFIX) {
        Some(rest) => rest.trim_end(),
        None => club,
    }
}

/// The numeric player id is the second-to-last path segment:
/// `https://www.fotmob.com/players/30981/lionel-messi` -> 30981.
pub fn player_id_from_url(link: &str) -> Option<i64> {
    let url = Url::parse(link).ok()?;
    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();
    if segments.len() < 2 {
        return None;
    }
    segments[segments.len() - 2].parse().ok()
}

/// Last path segment, used to identify a player in logs.
pub fn slug(link: &str) -> &str {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_value() {
        assert_eq!(market_value("€45.5M"), Ok(45_500_000));
        assert_eq!(market_value("€750K"), Ok(750_000));
        assert_eq!(market_value("€10"), Ok(10));
        assert_eq!(market_value("€1,200K"), Ok(1_200_000));
        assert_eq!(market_value("€4.35m"), Ok(4_350_000));
        assert_eq!(market_value("£45.5M"), Ok(45_500_000));
        assert_eq!(market_value("$750K"), Ok(750_000));
        assert_eq!(market_value("€ 2M"), Ok(2_000_000));
        assert_eq!(market_value("N/A"), Err(ParseError::Malformed("N/A".to_string())));
        assert_eq!(market_value("  "), Err(ParseError::Empty));
    }

    #[test]
    fn test_stat_value() {
        assert_eq!(stat_value("87%"), Ok(StatValue::Int(87)));
        assert_eq!(stat_value("1,5"), Ok(StatValue::Float(1.5)));
        assert_eq!(stat_value("23"), Ok(StatValue::Int(23)));
        assert_eq!(stat_value("64.2%"), Ok(StatValue::Float(64.2)));
        assert_eq!(stat_value(""), Err(ParseError::Empty));
        assert!(stat_value("-").is_err());
        assert!(stat_value("n/a").is_err());
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("183 cm"), Ok(183));
        assert_eq!(leading_int("27 years"), Ok(27));
        assert!(leading_int("unknown").is_err());
        assert_eq!(leading_int(""), Err(ParseError::Empty));
    }

    #[test]
    fn test_shirt_number() {
        assert_eq!(shirt_number("10"), Ok(10));
        assert!(shirt_number("-").is_err());
    }

    #[test]
    fn test_strip_loan_suffix() {
        assert_eq!(strip_loan_suffix("Girona (on loan)"), "Girona");
        assert_eq!(strip_loan_suffix("Girona"), "Girona");
    }

    #[test]
    fn test_player_id_from_url() {
        assert_eq!(
            player_id_from_url("https://www.fotmob.com/players/30981/lionel-messi"),
            Some(30981)
        );
        assert_eq!(
            player_id_from_url("https://www.fotmob.com/players/lionel-messi"),
            None
        );
        assert_eq!(player_id_from_url("not a url"), None);
    }

    #[test]
    fn test_slug() {
        assert_eq!(
            slug("https://www.fotmob.com/players/30981/lionel-messi"),
            "lionel-messi"
        );
    }
}
