use ufmt_macros::uDebug;
use winnow::ascii::digit1;
use winnow::combinator::alt;
use winnow::token::{literal, rest};
use winnow::{Parser, Result};

/// A line received from the motion controller.
///
/// Only the arrival of a line matters to the handshake. The classification is
/// used to report what the controller thought of each line.
#[derive(Debug, uDebug, PartialEq, Copy, Clone)]
pub enum Response {
    /// `ok`, optionally followed by anything.
    Ok,
    /// `error:N`.
    Error(u16),
    /// `ALARM:N`.
    Alarm(u16),
    /// Anything else (banners, status reports, feedback messages).
    Other,
}
impl Response {
    /// Classifies a raw response line, including its line terminator.
    pub fn classify(line: &[u8]) -> Response {
        match core::str::from_utf8(line) {
            Err(_) => Response::Other,
            Ok(text) => parse_response
                .parse(text.trim_end())
                .unwrap_or(Response::Other),
        }
    }
}

/// Parse a full response line.
fn parse_response<'s>(input: &mut &'s str) -> Result<Response> {
    alt((parse_ok, parse_error, parse_alarm)).parse_next(input)
}

/// Parse an "ok" response.
fn parse_ok<'s>(input: &mut &'s str) -> Result<Response> {
    (literal("ok"), rest).map(|_| Response::Ok).parse_next(input)
}

/// Parse an "error:N" response.
fn parse_error<'s>(input: &mut &'s str) -> Result<Response> {
    let _ = literal("error:").parse_next(input)?;
    parse_code.map(Response::Error).parse_next(input)
}

/// Parse an "ALARM:N" response.
fn parse_alarm<'s>(input: &mut &'s str) -> Result<Response> {
    let _ = literal("ALARM:").parse_next(input)?;
    parse_code.map(Response::Alarm).parse_next(input)
}

/// Parse digits (0-9) as a u16 code.
fn parse_code<'s>(input: &mut &'s str) -> Result<u16> {
    digit1.try_map(str::parse).parse_next(input)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_examples() {
        assert_eq!(Response::Ok, Response::classify(b"ok\r\n"));
        assert_eq!(Response::Ok, Response::classify(b"ok\n"));
        assert_eq!(Response::Ok, Response::classify(b"ok T:21.0 /0.0\n"));
        assert_eq!(Response::Error(20), Response::classify(b"error:20\r\n"));
        assert_eq!(Response::Alarm(1), Response::classify(b"ALARM:1\r\n"));
        assert_eq!(
            Response::Other,
            Response::classify(b"Grbl 1.1h ['$' for help]\r\n")
        );
        assert_eq!(Response::Other, Response::classify(b"\r\n"));
        assert_eq!(Response::Other, Response::classify(b"error:\r\n"));
        assert_eq!(Response::Other, Response::classify(&[0xff, b'\n']));
    }

    #[test]
    fn test_parse_code() {
        let mut input1 = "42";
        let mut input2 = "x";
        let mut input3 = "70000";
        assert_eq!(Ok(42), parse_code(&mut input1));
        assert!(parse_code(&mut input2).is_err());
        assert!(parse_code(&mut input3).is_err());
    }

    proptest! {
        #[test]
        fn test_error_codes(code: u16) {
            let line = format!("error:{}\r\n", code);
            prop_assert_eq!(
                Response::Error(code),
                Response::classify(line.as_bytes())
            );
        }
    }

    proptest! {
        #[test]
        fn test_never_panics(line in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = Response::classify(&line);
        }
    }
}
