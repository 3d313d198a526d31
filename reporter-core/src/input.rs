use std::io::{self, BufRead, Write};

use crate::model::CityQuery;

pub const PROMPT: &str = "Enter a city name: ";
pub const EMPTY_CITY_MESSAGE: &str = "City name cannot be empty. Please try again.";

/// Prompt until a non-blank city name is entered.
///
/// Returns `Ok(None)` if the input ends before that happens.
pub fn prompt_city<R, W>(input: &mut R, output: &mut W) -> io::Result<Option<CityQuery>>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        let read = input.read_line(&mut line).map_err(|e| {
            io::Error::new(e.kind(), format!("failed to read city name: {e}"))
        })?;
        if read == 0 {
            return Ok(None);
        }

        match CityQuery::parse(&line) {
            Some(city) => return Ok(Some(city)),
            None => writeln!(output, "{EMPTY_CITY_MESSAGE}")?,
        }
    }
}
