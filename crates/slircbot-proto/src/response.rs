//! Numeric server replies.
//!
//! Numerics are carried as their raw three-digit code. Only the welcome
//! reply drives client behavior; every other code is passed on as is.
//!
//! # Reference
//! - RFC 2812 Section 5: Replies

use std::fmt;
use std::str::FromStr;

/// A three-digit numeric reply code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Response(u16);

impl Response {
    /// `001` - registration accepted.
    pub const RPL_WELCOME: Response = Response(1);

    /// Wrap a raw numeric code.
    pub const fn new(code: u16) -> Self {
        Response(code)
    }

    /// The numeric code.
    pub const fn code(self) -> u16 {
        self.0
    }
}

impl FromStr for Response {
    type Err = ();

    /// Accepts exactly three ASCII digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 3 && s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse::<u16>().map(Response).map_err(|_| ())
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric() {
        assert_eq!("001".parse::<Response>(), Ok(Response::RPL_WELCOME));
        assert_eq!("433".parse::<Response>().map(Response::code), Ok(433));
        assert!("1".parse::<Response>().is_err());
        assert!("PRIVMSG".parse::<Response>().is_err());
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(Response::RPL_WELCOME.to_string(), "001");
        assert_eq!(Response::new(42).to_string(), "042");
    }
}

