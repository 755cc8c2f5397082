use std::io::{BufRead, Write};

use crate::utils::error::Result;

/// Asks a yes/no question. Only an explicit `y`/`yes` counts as consent;
/// end of input counts as a refusal.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<bool> {
    write!(output, "{} (y/n): ", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Asks how many records to process. Blank or non-numeric answers mean "all".
pub fn ask_limit<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Option<usize>> {
    write!(
        output,
        "Enter the number of businesses to process (leave blank for all): "
    )?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().parse::<usize>().ok())
}
