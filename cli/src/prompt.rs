use std::io::{BufRead, Write};
use tonelink_core::parse_bits;

use crate::error::CliError;

/// What `--send` collects interactively
#[derive(Debug, PartialEq)]
pub struct SendRequest {
    pub message: Vec<u8>,
    pub error_fractions: Vec<f64>,
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String, CliError> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CliError::InvalidInput(format!(
                "input closed while waiting for: {}",
                question.trim_end_matches(|c: char| c == ' ' || c == ':')
            )));
        }
        Ok(line.trim().to_string())
    }

    pub fn send_request(&mut self) -> Result<SendRequest, CliError> {
        let message = parse_bits(&self.ask("Message bits: ")?)?;

        let answer = self.ask("Number of bit errors to simulate: ")?;
        let count: usize = answer
            .parse()
            .map_err(|_| CliError::InvalidInput(format!("not a count: {:?}", answer)))?;

        let mut error_fractions = Vec::with_capacity(count);
        for i in 0..count {
            let answer = self.ask(&format!("Error {} position in [0, 1): ", i + 1))?;
            let fraction: f64 = answer
                .parse()
                .map_err(|_| CliError::InvalidInput(format!("not a number: {:?}", answer)))?;
            error_fractions.push(fraction);
        }

        Ok(SendRequest {
            message,
            error_fractions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> (Result<SendRequest, CliError>, String) {
        let mut output = Vec::new();
        let result = Prompter::new(input.as_bytes(), &mut output).send_request();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_collects_message_and_errors() {
        let (result, transcript) = run("1011\n2\n0.2\n0.75\n");
        assert_eq!(
            result.unwrap(),
            SendRequest {
                message: vec![1, 0, 1, 1],
                error_fractions: vec![0.2, 0.75],
            }
        );
        assert!(transcript.contains("Message bits: "));
        assert!(transcript.contains("Error 2 position"));
    }

    #[test]
    fn test_zero_errors() {
        let (result, _) = run("  110 \n0\n");
        let request = result.unwrap();
        assert_eq!(request.message, vec![1, 1, 0]);
        assert!(request.error_fractions.is_empty());
    }

    #[test]
    fn test_rejects_non_binary_message() {
        let (result, _) = run("10a1\n0\n");
        assert!(matches!(result, Err(CliError::Modem(_))));
    }

    #[test]
    fn test_rejects_bad_count() {
        let (result, _) = run("1011\ntwo\n");
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_eof_is_an_error() {
        let (result, _) = run("1011\n1\n");
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
