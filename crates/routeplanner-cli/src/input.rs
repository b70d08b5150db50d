//! Coordinate input for the route command.
//!
//! Coordinates are entered in normalized map units. Values outside
//! `0..=100` are rejected both on the command line and at the prompt.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

/// Smallest accepted coordinate.
pub const MIN_COORDINATE: f64 = 0.0;

/// Largest accepted coordinate.
pub const MAX_COORDINATE: f64 = 100.0;

/// Parse a coordinate, rejecting non-numbers and out-of-range values.
///
/// Doubles as a clap `value_parser`.
pub fn parse_coordinate(value: &str) -> std::result::Result<f64, String> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;

    if !(MIN_COORDINATE..=MAX_COORDINATE).contains(&parsed) {
        return Err(format!(
            "{} is outside the range {} to {}",
            parsed, MIN_COORDINATE, MAX_COORDINATE
        ));
    }

    Ok(parsed)
}

/// Ask for one coordinate until a valid value is entered.
///
/// `label` names the coordinate, e.g. `start X`.
pub fn prompt_coordinate<R, W>(label: &str, reader: &mut R, writer: &mut W) -> Result<f64>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(
            writer,
            "Please enter the {} coordinate of the route ({} to {}): ",
            label, MIN_COORDINATE, MAX_COORDINATE
        )?;
        writer.flush()?;

        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .with_context(|| format!("failed to read the {} coordinate", label))?;
        if read == 0 {
            bail!("input ended before the {} coordinate was entered", label);
        }

        match parse_coordinate(&line) {
            Ok(value) => return Ok(value),
            Err(reason) => tracing::debug!(label, %reason, "rejected coordinate input"),
        }
    }
}

/// Use `given` when present, otherwise prompt for the value.
pub fn coordinate_or_prompt<R, W>(
    given: Option<f64>,
    label: &str,
    reader: &mut R,
    writer: &mut W,
) -> Result<f64>
where
    R: BufRead,
    W: Write,
{
    match given {
        Some(value) => Ok(value),
        None => prompt_coordinate(label, reader, writer),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parses_values_in_range() {
        assert_eq!(parse_coordinate("0"), Ok(0.0));
        assert_eq!(parse_coordinate(" 42.5 \n"), Ok(42.5));
        assert_eq!(parse_coordinate("100"), Ok(100.0));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(parse_coordinate("-0.1").is_err());
        assert!(parse_coordinate("100.01").is_err());
        assert!(parse_coordinate("north").is_err());
        assert!(parse_coordinate("").is_err());
        assert!(parse_coordinate("NaN").is_err());
    }

    #[test]
    fn prompt_repeats_until_valid() {
        let mut reader = Cursor::new("abc\n150\n-3\n12.5\n");
        let mut output = Vec::new();

        let value = prompt_coordinate("start X", &mut reader, &mut output).expect("valid input");
        assert_eq!(value, 12.5);

        let text = String::from_utf8(output).expect("utf8 prompts");
        assert_eq!(
            text.matches("Please enter the start X coordinate of the route (0 to 100): ")
                .count(),
            4
        );
    }

    #[test]
    fn prompt_fails_on_end_of_input() {
        let mut reader = Cursor::new("500\n");
        let mut output = Vec::new();

        let err = prompt_coordinate("end Y", &mut reader, &mut output).unwrap_err();
        assert!(err.to_string().contains("end Y"));
    }

    #[test]
    fn given_value_skips_prompt() {
        let mut reader = Cursor::new("");
        let mut output = Vec::new();

        let value =
            coordinate_or_prompt(Some(7.0), "end X", &mut reader, &mut output).expect("given");
        assert_eq!(value, 7.0);
        assert!(output.is_empty());
    }
}
