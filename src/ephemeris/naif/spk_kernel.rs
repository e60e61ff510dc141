//! In-memory SPK kernel.
//!
//! [`SpkKernel`] loads a whole NAIF DAF/SPK file at once: the file record is validated, the linked
//! list of summary records is walked, and every Chebyshev segment (types 2 and 3) is decoded into
//! [`EphemerisRecord`]s. Loading is all-or-nothing: a truncated or inconsistent segment fails the
//! whole load. Segments of any other SPK type are skipped with a warning.
//!
//! Queries resolve a body down to the solar system barycenter by chaining segments
//! (`Moon → Earth-Moon barycenter → SSB`), summing the partial states.
//!
//! # Example
//! ```rust, no_run
//! use camino::Utf8Path;
//! use skywatch::ephemeris::{naif::spk_kernel::SpkKernel, Body, Ephemeris};
//! use skywatch::time::TimePoint;
//!
//! let kernel = SpkKernel::open(Utf8Path::new("de421.bsp"))?;
//! let t = TimePoint::from_utc_str("2024-06-20T19:00:00Z")?;
//! let moon = kernel.position(Body::Moon, &t)?;
//! println!("{kernel}\n{:?}", moon.position);
//! # Ok::<(), skywatch::skywatch_errors::SkywatchError>(())
//! ```
use std::{collections::HashMap, fmt};

use camino::Utf8Path;
use hifitime::Epoch;
use nalgebra::Vector3;
use tracing::{debug, info, warn};

use super::{
    daf_header::{DAFHeader, DAF_RECORD_BYTES},
    directory::DirectoryData,
    ephemeris_record::EphemerisRecord,
    kernel_comment::{comment_text, KernelComment},
    summary_record::{Summary, SummaryRecordControl},
};
use crate::{
    ephemeris::{naif_ids::system_barycenter, Body, BodyPosition, Ephemeris},
    skywatch_errors::SkywatchError,
    time::TimePoint,
};

/// Longest segment chain followed before giving up (guards against cyclic kernels).
const MAX_CHAIN_DEPTH: usize = 8;

fn address_overflow() -> SkywatchError {
    SkywatchError::EphemerisLoad("DAF address arithmetic overflows".to_string())
}

/// Slice of `count` double-precision words starting at the 1-based DAF address `address`.
fn words(bytes: &[u8], address: usize, count: usize) -> Result<&[u8], SkywatchError> {
    let start = address
        .checked_sub(1)
        .ok_or_else(|| SkywatchError::EphemerisLoad("DAF address 0 is invalid".to_string()))?
        .checked_mul(8)
        .ok_or_else(address_overflow)?;
    let end = count
        .checked_mul(8)
        .and_then(|len| start.checked_add(len))
        .ok_or_else(address_overflow)?;
    bytes.get(start..end).ok_or_else(|| {
        SkywatchError::EphemerisLoad(format!(
            "kernel truncated: words {address}..{} out of file",
            address.saturating_add(count)
        ))
    })
}

/// First word address of the 1-based DAF record `record`.
fn record_address(record: usize) -> Result<usize, SkywatchError> {
    record
        .checked_sub(1)
        .and_then(|r| r.checked_mul(DAF_RECORD_BYTES / 8))
        .and_then(|w| w.checked_add(1))
        .ok_or_else(address_overflow)
}

/// One decoded Chebyshev segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SpkSegment {
    pub summary: Summary,
    pub directory: DirectoryData,
    pub records: Vec<EphemerisRecord>,
}

impl SpkSegment {
    /// Decode the segment described by `summary`.
    ///
    /// Return
    /// ----------
    /// * `Ok(None)` for SPK types other than 2 and 3.
    fn read(bytes: &[u8], summary: Summary) -> Result<Option<Self>, SkywatchError> {
        let components = match summary.data_type {
            2 => 3,
            3 => 6,
            other => {
                warn!(
                    body = summary.target,
                    center = summary.center,
                    data_type = other,
                    "skipping SPK segment of unsupported type"
                );
                return Ok(None);
            }
        };

        if summary.initial_addr < 1 || summary.final_addr < summary.initial_addr.saturating_add(3) {
            return Err(SkywatchError::EphemerisLoad(format!(
                "segment {} wrt {} has an invalid address range {}..{}",
                summary.target, summary.center, summary.initial_addr, summary.final_addr
            )));
        }

        let initial = summary.initial_addr as usize;
        let last = summary.final_addr as usize;

        let (_, directory) = DirectoryData::parse(words(bytes, last - 3, 4)?)?;
        let data_end = directory
            .rsize
            .checked_mul(directory.n_records)
            .and_then(|len| initial.checked_add(len));
        let consistent = directory.rsize > 2
            && (directory.rsize - 2) % components == 0
            && directory.n_records > 0
            && directory.intlen > 0.0
            && data_end.is_some_and(|end| end <= last - 3);
        if !consistent {
            return Err(SkywatchError::EphemerisLoad(format!(
                "segment {} wrt {} has an inconsistent directory: {directory}",
                summary.target, summary.center
            )));
        }

        let ncoeff = (directory.rsize - 2) / components;
        let records = (0..directory.n_records)
            .map(|i| -> Result<EphemerisRecord, SkywatchError> {
                let raw = words(bytes, initial + i * directory.rsize, directory.rsize)?;
                let (_, record) = EphemerisRecord::parse(raw, ncoeff)?;
                Ok(record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            body = summary.target,
            center = summary.center,
            records = records.len(),
            "decoded SPK segment"
        );

        Ok(Some(SpkSegment {
            summary,
            directory,
            records,
        }))
    }

    /// Position (km) and velocity (km/s) of the target relative to the center at `et`.
    pub fn state(&self, et: f64) -> (Vector3<f64>, Vector3<f64>) {
        self.records[self.directory.record_index(et)].interpolate(et)
    }
}

/// A loaded, immutable SPK kernel.
#[derive(Debug, Clone)]
pub struct SpkKernel {
    header: DAFHeader,
    comment: Option<KernelComment>,
    segments: HashMap<i32, Vec<SpkSegment>>,
}

impl SpkKernel {
    /// Read and decode the kernel stored at `path`.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: location of a little-endian SPK file (e.g. `de421.bsp`).
    ///
    /// Return
    /// ----------
    /// * The decoded kernel, or the first I/O or format error met.
    ///
    /// See also
    /// ------------
    /// * [`SpkKernel::from_bytes`] – Decoder used on the file content.
    pub fn open(path: &Utf8Path) -> Result<Self, SkywatchError> {
        let bytes = std::fs::read(path)?;
        let kernel = Self::from_bytes(&bytes)?;
        info!(
            path = %path,
            segments = kernel.segment_count(),
            version = kernel.comment.as_ref().map(|c| c.version.as_str()).unwrap_or("unknown"),
            "loaded SPK kernel"
        );
        Ok(kernel)
    }

    /// Decode a kernel held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SkywatchError> {
        let (_, header) = DAFHeader::parse(bytes)?;
        header.validate()?;

        let fward = header.fward as usize;
        let comment = if fward > 2 {
            let area = bytes
                .get(DAF_RECORD_BYTES..(fward - 1) * DAF_RECORD_BYTES)
                .unwrap_or_default();
            KernelComment::parse(&comment_text(area))
        } else {
            None
        };

        let summary_bytes = header.summary_words() * 8;
        let max_records = bytes.len() / DAF_RECORD_BYTES + 1;
        let mut segments: HashMap<i32, Vec<SpkSegment>> = HashMap::new();
        let mut record_number = fward;
        let mut visited = 0;

        while record_number != 0 {
            visited += 1;
            if visited > max_records {
                return Err(SkywatchError::EphemerisLoad(
                    "summary records form a cycle".to_string(),
                ));
            }

            let record = words(bytes, record_address(record_number)?, 128)?;
            let (summaries, control) = SummaryRecordControl::parse(record)?;
            for i in 0..control.n_summaries {
                let raw = summaries
                    .get(i * summary_bytes..(i + 1) * summary_bytes)
                    .ok_or_else(|| {
                        SkywatchError::EphemerisLoad(format!(
                            "summary record {record_number} declares {} summaries",
                            control.n_summaries
                        ))
                    })?;
                let (_, summary) = Summary::parse(raw)?;
                if let Some(segment) = SpkSegment::read(bytes, summary)? {
                    segments
                        .entry(segment.summary.target)
                        .or_default()
                        .push(segment);
                }
            }
            record_number = control.next;
        }

        if segments.is_empty() {
            return Err(SkywatchError::EphemerisLoad(
                "kernel holds no Chebyshev segment".to_string(),
            ));
        }

        Ok(SpkKernel {
            header,
            comment,
            segments,
        })
    }

    pub fn header(&self) -> &DAFHeader {
        &self.header
    }

    pub fn comment(&self) -> Option<&KernelComment> {
        self.comment.as_ref()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.values().map(Vec::len).sum()
    }

    /// Segments whose target is `naif_id`, in file order.
    pub fn segments_for(&self, naif_id: i32) -> &[SpkSegment] {
        self.segments
            .get(&naif_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// NAIF id actually looked up for `naif_id`: itself, or its system barycenter when the kernel
    /// only carries the barycenter.
    fn lookup_id(&self, naif_id: i32) -> Option<i32> {
        if self.segments.contains_key(&naif_id) {
            return Some(naif_id);
        }
        system_barycenter(naif_id).filter(|bary| self.segments.contains_key(bary))
    }

    /// Sum the segment chain from `naif_id` down to the solar system barycenter.
    fn barycentric_state(
        &self,
        naif_id: i32,
        t: &TimePoint,
    ) -> Result<(Vector3<f64>, Vector3<f64>), SkywatchError> {
        let et = t.et_seconds();
        let mut position = Vector3::zeros();
        let mut velocity = Vector3::zeros();
        let mut current = naif_id;

        for _ in 0..MAX_CHAIN_DEPTH {
            if current == 0 {
                return Ok((position, velocity));
            }
            let id = self
                .lookup_id(current)
                .ok_or(SkywatchError::UnknownBody(naif_id))?;
            if id != current {
                debug!(body = current, barycenter = id, "using system barycenter");
            }
            let segment = self
                .segments_for(id)
                .iter()
                .find(|segment| segment.summary.covers(et))
                .ok_or_else(|| SkywatchError::OutOfRangeTime {
                    body: naif_id,
                    epoch: t.to_string(),
                })?;

            let (p, v) = segment.state(et);
            position += p;
            velocity += v;
            current = segment.summary.center;
        }

        Err(SkywatchError::UnknownBody(naif_id))
    }

    /// Sorted, disjoint ET spans over which [`SpkKernel::barycentric_state`] resolves `naif_id`
    /// after `depth` links of the chain.
    ///
    /// Each segment only owns the part of its span not already covered by an earlier segment of
    /// the same target, and that part is intersected with the spans of its own center.
    fn resolvable_spans(&self, naif_id: i32, depth: usize) -> Vec<(f64, f64)> {
        if naif_id == 0 {
            return vec![(f64::NEG_INFINITY, f64::INFINITY)];
        }
        if depth == MAX_CHAIN_DEPTH {
            return Vec::new();
        }
        let Some(id) = self.lookup_id(naif_id) else {
            return Vec::new();
        };

        let mut centers: HashMap<i32, Vec<(f64, f64)>> = HashMap::new();
        let mut claimed: Vec<(f64, f64)> = Vec::new();
        let mut spans = Vec::new();
        for segment in self.segments_for(id) {
            let own = (segment.summary.start_epoch, segment.summary.end_epoch);
            let center = centers
                .entry(segment.summary.center)
                .or_insert_with(|| self.resolvable_spans(segment.summary.center, depth + 1));
            for (a, b) in unclaimed(own, &claimed) {
                spans.extend(
                    center
                        .iter()
                        .map(|&(c0, c1)| (a.max(c0), b.min(c1)))
                        .filter(|(lo, hi)| lo <= hi),
                );
            }
            claimed.push(own);
            claimed = merge_spans(claimed);
        }
        merge_spans(spans)
    }
}

impl Ephemeris for SpkKernel {
    fn position(&self, body: Body, t: &TimePoint) -> Result<BodyPosition, SkywatchError> {
        let (position, velocity) = self.barycentric_state(body.naif_id(), t)?;
        Ok(BodyPosition {
            position,
            velocity,
            epoch: *t,
        })
    }

    fn coverage(&self, body: Body) -> Option<(TimePoint, TimePoint)> {
        let pieces = self.resolvable_spans(body.naif_id(), 0);
        if pieces.len() > 1 {
            debug!(
                body = body.naif_id(),
                pieces = pieces.len(),
                "coverage has gaps, keeping the longest span"
            );
        }
        let (start, end) = pieces
            .into_iter()
            .max_by(|a, b| (a.1 - a.0).total_cmp(&(b.1 - b.0)))?;
        Some((
            TimePoint::from_epoch(Epoch::from_et_seconds(start)),
            TimePoint::from_epoch(Epoch::from_et_seconds(end)),
        ))
    }
}

/// Sort `spans` and merge the overlapping or touching ones.
fn merge_spans(mut spans: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Parts of `(a, b)` outside the sorted, disjoint `claimed` spans.
fn unclaimed((a, b): (f64, f64), claimed: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if !claimed.iter().any(|&(c0, c1)| c0 <= b && c1 >= a) {
        return vec![(a, b)];
    }
    let mut pieces = Vec::new();
    let mut cursor = a;
    for &(c0, c1) in claimed.iter().filter(|&&(c0, c1)| c0 <= b && c1 >= a) {
        if c0 > cursor {
            pieces.push((cursor, c0));
        }
        cursor = cursor.max(c1);
    }
    if cursor < b {
        pieces.push((cursor, b));
    }
    pieces
}

impl fmt::Display for SpkKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        if let Some(comment) = &self.comment {
            writeln!(f, "{comment}")?;
        }
        let mut targets: Vec<_> = self.segments.keys().copied().collect();
        targets.sort_unstable();
        for target in targets {
            for segment in self.segments_for(target) {
                writeln!(f, "{} | {}", segment.summary, segment.directory)?;
            }
        }
        Ok(())
    }
}
