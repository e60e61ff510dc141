//! Directory footer of an SPK type 2/3 segment.
//!
//! The last four words of a Chebyshev segment give:
//!
//! * `init`: start epoch of the first record (TDB seconds past J2000),
//! * `intlen`: length of each record's time span (seconds),
//! * `rsize`: **record size in double-precision words**, not bytes,
//! * `n_records`: number of records in the segment.
use hifitime::{Duration, Epoch};
use nom::{number::complete::le_f64, IResult};

#[derive(Debug, PartialEq, Clone)]
pub struct DirectoryData {
    pub init: f64,
    pub intlen: f64,
    pub rsize: usize,
    pub n_records: usize,
}

impl DirectoryData {
    /// Decode the four directory words.
    ///
    /// Arguments
    /// -----------------
    /// * `input`: the 32 bytes ending the segment, i.e. words `final_addr - 3 ..= final_addr`.
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, init) = le_f64(input)?;
        let (input, intlen) = le_f64(input)?;
        let (input, rsize) = le_f64(input)?;
        let (input, n_records) = le_f64(input)?;

        Ok((
            input,
            DirectoryData {
                init,
                intlen,
                rsize: rsize as usize,
                n_records: n_records as usize,
            },
        ))
    }

    /// Index of the record covering `et`, clamped to the record range.
    pub fn record_index(&self, et: f64) -> usize {
        let raw = ((et - self.init) / self.intlen).floor();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.n_records.saturating_sub(1))
        }
    }
}

impl std::fmt::Display for DirectoryData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let epoch = Epoch::from_et_seconds(self.init);
        let record_length = Duration::from_seconds(self.intlen);
        write!(
            f,
            "init {epoch} | intlen {record_length} | rsize {} | {} records",
            self.rsize, self.n_records
        )
    }
}
