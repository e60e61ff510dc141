//! Comment area of a JPL SPK kernel.
//!
//! JPL kernels carry a free-text comment area between the file record and the first summary
//! record. For DE kernels it usually states the ephemeris version
//! (`"JPL planetary and lunar ephemeris DE440"`) and the covered span
//! (`"JD   2287184.5   to   JD   2688976.5"`). Both are optional: a kernel without them still
//! loads, only [`KernelComment`] is then absent.
use std::fmt;

use nom::{
    bytes::complete::{tag, take_until},
    character::complete::{multispace1, not_line_ending},
    number::complete::double,
    IResult,
};

/// Bytes of text stored in each 1024-byte comment record.
const COMMENT_CHARS_PER_RECORD: usize = 1000;

/// End-of-comment marker.
const EOT: u8 = 0x04;

#[derive(Debug, PartialEq, Clone)]
pub struct KernelComment {
    pub version: String,
    pub start_jd: Option<f64>,
    pub end_jd: Option<f64>,
}

/// Extract the comment text from the comment records. NUL bytes are line ends.
pub fn comment_text(records: &[u8]) -> String {
    let text: Vec<u8> = records
        .chunks(1024)
        .flat_map(|record| &record[..record.len().min(COMMENT_CHARS_PER_RECORD)])
        .copied()
        .take_while(|&b| b != EOT)
        .map(|b| if b == 0 { b'\n' } else { b })
        .collect();
    String::from_utf8_lossy(&text).into_owned()
}

impl KernelComment {
    fn parse_version(input: &str) -> IResult<&str, &str> {
        let (input, _) = take_until("JPL planetary and lunar ephemeris")(input)?;
        let (input, _) = tag("JPL planetary and lunar ephemeris")(input)?;
        let (input, version) = not_line_ending(input)?;
        Ok((input, version.trim()))
    }

    fn parse_jd_range(input: &str) -> IResult<&str, (f64, f64)> {
        let (input, _) = take_until("JD ")(input)?;
        let (input, _) = tag("JD")(input)?;
        let (input, _) = multispace1(input)?;
        let (input, start_jd) = double(input)?;
        let (input, _) = multispace1(input)?;
        let (input, _) = tag("to")(input)?;
        let (input, _) = multispace1(input)?;
        let (input, _) = tag("JD")(input)?;
        let (input, _) = multispace1(input)?;
        let (input, end_jd) = double(input)?;
        Ok((input, (start_jd, end_jd)))
    }

    /// Look for the version line and, after it, the Julian date span.
    ///
    /// Return
    /// ----------
    /// * `None` if the text carries no version line.
    pub fn parse(text: &str) -> Option<Self> {
        let (rest, version) = Self::parse_version(text).ok()?;
        let span = Self::parse_jd_range(rest).ok().map(|(_, span)| span);
        Some(KernelComment {
            version: version.to_string(),
            start_jd: span.map(|(start, _)| start),
            end_jd: span.map(|(_, end)| end),
        })
    }
}

impl fmt::Display for KernelComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JPL ephemeris {}", self.version)?;
        if let (Some(start), Some(end)) = (self.start_jd, self.end_jd) {
            write!(f, " (JD {start} to JD {end})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod kernel_comment_test {
    use super::*;

    #[test]
    fn test_parse_comment() {
        let text = "; de440.bsp LOG FILE\n\nJPL planetary and lunar ephemeris DE440\nIntegrated 25 June 2020\n\nTime span covered by ephemeris:\n\n31-DEC-1549 00:00 to   25-JAN-2650 00:00\nJD   2287184.5   to   JD   2688976.5\n";
        let comment = KernelComment::parse(text).unwrap();
        assert_eq!(
            comment,
            KernelComment {
                version: "DE440".to_string(),
                start_jd: Some(2287184.5),
                end_jd: Some(2688976.5),
            }
        );
        assert_eq!(
            comment.to_string(),
            "JPL ephemeris DE440 (JD 2287184.5 to JD 2688976.5)"
        );
    }

    #[test]
    fn test_comment_without_span() {
        let comment = KernelComment::parse("JPL planetary and lunar ephemeris DE421\n").unwrap();
        assert_eq!(comment.version, "DE421");
        assert_eq!(comment.start_jd, None);
    }

    #[test]
    fn test_comment_without_version() {
        assert_eq!(KernelComment::parse("synthetic kernel\n"), None);
    }

    #[test]
    fn test_comment_text() {
        let mut record = vec![b' '; 1024];
        record[..5].copy_from_slice(b"ab\0cd");
        record[5] = EOT;
        assert_eq!(comment_text(&record), "ab\ncd");
    }
}
