//! Comma-separated number parsing.
//!
//! The CLI accepts angle and intensity lists as free text such as
//! `"0, 10, 20"`. Tokens are split on commas and trimmed; any empty or
//! non-numeric token is a hard error (exit code 2) naming its 1-based position.

use crate::error::AppError;

/// Parse a comma-separated list of floats.
pub fn parse_csv_floats(label: &str, text: &str) -> Result<Vec<f64>, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::new(2, format!("No {label} given. Please enter some data.")));
    }

    text.split(',')
        .enumerate()
        .map(|(i, raw)| {
            let token = raw.trim();
            if token.is_empty() {
                return Err(AppError::new(
                    2,
                    format!("Empty {label} value at position {}.", i + 1),
                ));
            }
            token.parse::<f64>().map_err(|e| {
                AppError::new(
                    2,
                    format!("Invalid {label} value '{token}' at position {}: {e}", i + 1),
                )
            })
        })
        .collect()
}

/// Render values back into the comma-separated form accepted by [`parse_csv_floats`].
pub fn format_csv_floats(values: &[f64], decimals: usize) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.decimals$}")).collect();
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_whitespace() {
        let v = parse_csv_floats("angle", " 0, 10 ,20,  -35.5 ").unwrap();
        assert_eq!(v, vec![0.0, 10.0, 20.0, -35.5]);
    }

    #[test]
    fn rejects_empty_input() {
        let err = parse_csv_floats("intensity", "   ").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn reports_position_of_bad_token() {
        let err = parse_csv_floats("angle", "0, 10, ten, 30").unwrap_err();
        assert!(err.to_string().contains("'ten' at position 3"), "{err}");

        let err = parse_csv_floats("angle", "0,,20").unwrap_err();
        assert!(err.to_string().contains("position 2"), "{err}");
    }

    #[test]
    fn format_round_trips_through_parse() {
        let values = [0.75, 0.42, 1.3];
        let text = format_csv_floats(&values, 2);
        assert_eq!(text, "0.75, 0.42, 1.30");
        assert_eq!(parse_csv_floats("intensity", &text).unwrap(), values);
    }
}
