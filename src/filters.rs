use std::fmt::Display;

use askama::Result;
use rust_decimal::Decimal;

use crate::timeline::parse_instant;

// Custom filters available to every template as `|weight`, `|short_hash`,
// `|datetime` and `|date`.

/// Weight without trailing zeros: `20.000` renders as `20`.
pub fn weight<T: Display>(value: T) -> Result<String> {
    let raw = value.to_string();
    Ok(match raw.parse::<Decimal>() {
        Ok(d) => d.normalize().to_string(),
        Err(_) => raw,
    })
}

/// `0x1234567890…abcdef` for long hashes.
pub fn short_hash<T: Display>(value: T) -> Result<String> {
    let raw = value.to_string();
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() <= 20 {
        return Ok(raw);
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    Ok(format!("{}…{}", head, tail))
}

pub fn datetime<T: Display>(value: T) -> Result<String> {
    let raw = value.to_string();
    Ok(match parse_instant(&raw) {
        Some(at) => at.format("%b %-d, %Y %H:%M").to_string(),
        None => raw,
    })
}

pub fn date<T: Display>(value: T) -> Result<String> {
    let raw = value.to_string();
    Ok(match parse_instant(&raw) {
        Some(at) => at.format("%b %-d, %Y").to_string(),
        None => raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_drops_trailing_zeros() {
        assert_eq!(weight("20.000").unwrap(), "20");
        assert_eq!(weight("12.50").unwrap(), "12.5");
        assert_eq!(weight("n/a").unwrap(), "n/a");
    }

    #[test]
    fn hashes_are_shortened() {
        assert_eq!(short_hash("0xabc").unwrap(), "0xabc");
        assert_eq!(
            short_hash("0x9f86d081884c7d659a2feaa0c55ad015a3bf4f1b").unwrap(),
            "0x9f86d081…bf4f1b"
        );
    }

    #[test]
    fn dates_render_readably() {
        assert_eq!(datetime("2024-03-05T08:15:00Z").unwrap(), "Mar 5, 2024 08:15");
        assert_eq!(date("2024-03-05").unwrap(), "Mar 5, 2024");
        assert_eq!(date("soon").unwrap(), "soon");
    }
}
