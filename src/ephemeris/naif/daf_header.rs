//! DAF (Double Precision Array File) file record.
//!
//! The first 1024-byte record of a DAF container (an SPK kernel here) gives the summary layout
//! (`nd`, `ni`), the record numbers of the first and last summary records, the first free address
//! and the binary format of the numeric data.
//!
//! Only little-endian (`LTL-IEEE`) SPK kernels are accepted: [`DAFHeader::validate`] rejects
//! anything else before a single summary is decoded.
//!
//! # See also
//! ------------
//! * [`DAFHeader::parse`] – Binary decoder for the first DAF record.
//! * NAIF/SPICE DAF required reading (file layout, summaries, addresses).
use std::fmt;

use nom::{bytes::complete::take, number::complete::le_i32, IResult};

use crate::skywatch_errors::SkywatchError;

/// Size in bytes of a DAF physical record.
pub const DAF_RECORD_BYTES: usize = 1024;

/// In-memory representation of the DAF/SPK file record, trimmed of padding.
#[derive(Debug, PartialEq, Clone)]
pub struct DAFHeader {
    /// 8-byte identifier, `"DAF/SPK"` for SPK kernels.
    pub idword: String,
    /// 60-byte internal kernel name.
    pub internal_filename: String,
    /// Number of double-precision components in each summary (ND).
    pub nd: i32,
    /// Number of integer components in each summary (NI).
    pub ni: i32,
    /// Record number of the first summary record.
    pub fward: i32,
    /// Record number of the last summary record.
    pub bward: i32,
    /// First free address (in double-precision words, 1-based).
    pub free: i32,
    /// Platform tag describing numeric representation (e.g. `"LTL-IEEE"`).
    pub locfmt: String,
}

impl DAFHeader {
    /// Parse the first 1024-byte DAF record.
    ///
    /// Arguments
    /// -----------------
    /// * `input`: A byte slice starting at the beginning of the file.
    ///
    /// Return
    /// ----------
    /// * `(remaining, header)` with every text field trimmed.
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, id_word) = take(8usize)(input)?;
        let (input, nd) = le_i32(input)?;
        let (input, ni) = le_i32(input)?;
        let (input, ifname) = take(60usize)(input)?;
        let (input, fward) = le_i32(input)?;
        let (input, bward) = le_i32(input)?;
        let (input, free) = le_i32(input)?;
        let (input, locfmt) = take(8usize)(input)?;
        // reserved block and FTP validation string
        let (input, _) = take(603usize + 28)(input)?;
        Ok((
            input,
            DAFHeader {
                idword: String::from_utf8_lossy(id_word).trim().to_string(),
                internal_filename: String::from_utf8_lossy(ifname).trim().to_string(),
                nd,
                ni,
                fward,
                bward,
                free,
                locfmt: String::from_utf8_lossy(locfmt).trim().to_string(),
            },
        ))
    }

    /// Check that the file is a little-endian SPK kernel with the standard summary layout.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`, or [`SkywatchError::EphemerisLoad`] naming the first failed check.
    pub fn validate(&self) -> Result<(), SkywatchError> {
        if self.idword != "DAF/SPK" {
            return Err(SkywatchError::EphemerisLoad(format!(
                "not an SPK kernel (id word {:?})",
                self.idword
            )));
        }
        if self.locfmt != "LTL-IEEE" {
            return Err(SkywatchError::EphemerisLoad(format!(
                "unsupported binary format {:?}, only LTL-IEEE kernels are read",
                self.locfmt
            )));
        }
        if self.nd != 2 || self.ni != 6 {
            return Err(SkywatchError::EphemerisLoad(format!(
                "unexpected SPK summary layout ND={} NI={}",
                self.nd, self.ni
            )));
        }
        if self.fward < 2 {
            return Err(SkywatchError::EphemerisLoad(format!(
                "invalid first summary record {}",
                self.fward
            )));
        }
        Ok(())
    }

    /// Size of one summary, in double-precision words.
    pub fn summary_words(&self) -> usize {
        self.nd as usize + (self.ni as usize).div_ceil(2)
    }
}

impl fmt::Display for DAFHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LABEL_WIDTH: usize = 18;
        const VALUE_WIDTH: usize = 50;

        let border = format!(
            "+{:-<label$}+{:-<value$}+",
            "",
            "",
            label = LABEL_WIDTH + 1,
            value = VALUE_WIDTH + 1
        );

        let rows = [
            ("ID Word", self.idword.clone()),
            ("Internal Name", self.internal_filename.clone()),
            ("ND / NI", format!("{} doubles, {} integers", self.nd, self.ni)),
            (
                "Summary records",
                format!("first #{}, last #{}", self.fward, self.bward),
            ),
            ("Free Addr", self.free.to_string()),
            ("Binary Format", self.locfmt.clone()),
        ];

        writeln!(f, "{border}")?;
        writeln!(
            f,
            "| {:<label$}| {:<value$}|",
            "DAF File Header",
            "",
            label = LABEL_WIDTH,
            value = VALUE_WIDTH
        )?;
        writeln!(f, "{border}")?;
        for (label, value) in rows {
            writeln!(
                f,
                "| {:<label$}| {:<value$}|",
                label,
                value,
                label = LABEL_WIDTH,
                value = VALUE_WIDTH
            )?;
        }
        writeln!(f, "{border}")
    }
}

#[cfg(test)]
mod daf_header_test {
    use super::*;

    fn header_bytes(idword: &[u8; 8], locfmt: &[u8; 8]) -> Vec<u8> {
        let mut buf = vec![0u8; DAF_RECORD_BYTES];
        buf[0..8].copy_from_slice(idword);
        buf[8..12].copy_from_slice(&2i32.to_le_bytes());
        buf[12..16].copy_from_slice(&6i32.to_le_bytes());
        buf[16..76].copy_from_slice(&[b' '; 60]);
        buf[16..23].copy_from_slice(b"NIO2SPK");
        buf[76..80].copy_from_slice(&4i32.to_le_bytes());
        buf[80..84].copy_from_slice(&4i32.to_le_bytes());
        buf[84..88].copy_from_slice(&14974889i32.to_le_bytes());
        buf[88..96].copy_from_slice(locfmt);
        buf
    }

    #[test]
    fn test_parse_daf_header() {
        let bytes = header_bytes(b"DAF/SPK ", b"LTL-IEEE");
        let (rest, header) = DAFHeader::parse(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            header,
            DAFHeader {
                idword: "DAF/SPK".to_string(),
                internal_filename: "NIO2SPK".to_string(),
                nd: 2,
                ni: 6,
                fward: 4,
                bward: 4,
                free: 14974889,
                locfmt: "LTL-IEEE".to_string(),
            }
        );
        assert!(header.validate().is_ok());
        assert_eq!(header.summary_words(), 5);
    }

    #[test]
    fn test_reject_big_endian() {
        let bytes = header_bytes(b"DAF/SPK ", b"BIG-IEEE");
        let (_, header) = DAFHeader::parse(&bytes).unwrap();
        assert!(matches!(
            header.validate(),
            Err(SkywatchError::EphemerisLoad(_))
        ));
    }

    #[test]
    fn test_reject_other_daf() {
        let bytes = header_bytes(b"DAF/PCK ", b"LTL-IEEE");
        let (_, header) = DAFHeader::parse(&bytes).unwrap();
        assert!(header.validate().is_err());
    }

    #[test]
    fn test_display_daf_header() {
        let bytes = header_bytes(b"DAF/SPK ", b"LTL-IEEE");
        let (_, header) = DAFHeader::parse(&bytes).unwrap();
        let output = format!("{header}");
        assert!(output.contains("| ID Word           | DAF/SPK"));
        assert!(output.contains("first #4, last #4"));
        assert!(output.contains("LTL-IEEE"));
    }
}
