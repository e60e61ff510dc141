use std::fmt;

use hifitime::Epoch;
use nom::{
    number::complete::{le_f64, le_i32},
    IResult,
};

/// Descriptor of one SPK segment, as stored in a DAF summary record.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub start_epoch: f64,
    pub end_epoch: f64,
    pub target: i32,
    pub center: i32,
    pub frame_id: i32,
    pub data_type: i32,
    pub initial_addr: i32,
    pub final_addr: i32,
}

impl Summary {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, start_epoch) = le_f64(input)?;
        let (input, end_epoch) = le_f64(input)?;

        let (input, target) = le_i32(input)?;
        let (input, center) = le_i32(input)?;
        let (input, frame_id) = le_i32(input)?;
        let (input, data_type) = le_i32(input)?;
        let (input, initial_addr) = le_i32(input)?;
        let (input, final_addr) = le_i32(input)?;
        Ok((
            input,
            Summary {
                start_epoch,
                end_epoch,
                target,
                center,
                frame_id,
                data_type,
                initial_addr,
                final_addr,
            },
        ))
    }

    /// Whether the segment covers `et` (TDB seconds past J2000), bounds included.
    pub fn covers(&self, et: f64) -> bool {
        (self.start_epoch..=self.end_epoch).contains(&et)
    }
}

/// Header of a DAF summary record: link to the next record and number of summaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRecordControl {
    pub next: usize,
    pub previous: usize,
    pub n_summaries: usize,
}

impl SummaryRecordControl {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, next) = le_f64(input)?;
        let (input, previous) = le_f64(input)?;
        let (input, n_summaries) = le_f64(input)?;
        Ok((
            input,
            SummaryRecordControl {
                next: next as usize,
                previous: previous as usize,
                n_summaries: n_summaries as usize,
            },
        ))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = Epoch::from_et_seconds(self.start_epoch);
        let end = Epoch::from_et_seconds(self.end_epoch);
        write!(
            f,
            "{:>4} wrt {:>4} | type {} | frame {} | {} → {} | words {}..{}",
            self.target,
            self.center,
            self.data_type,
            self.frame_id,
            start,
            end,
            self.initial_addr,
            self.final_addr
        )
    }
}
