#![allow(dead_code)]
//! Synthetic SPK kernels and shared fixtures for the integration tests.

use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use skywatch::{constants::AU, observers::GeodeticLocation, time::TimePoint};

const RECORD_WORDS: usize = 128;

/// One Chebyshev segment to be written in a synthetic kernel.
#[derive(Debug, Clone)]
pub struct SyntheticSegment {
    pub target: i32,
    pub center: i32,
    pub data_type: i32,
    pub init: f64,
    pub intlen: f64,
    /// Full records: `[mid, radius, coefficients...]`
    pub records: Vec<Vec<f64>>,
}

impl SyntheticSegment {
    pub fn start(&self) -> f64 {
        self.init
    }

    pub fn end(&self) -> f64 {
        self.init + self.intlen * self.records.len() as f64
    }

    /// Type 2 segment approximating `state(et) -> [x, y, z]` (km) with `ncoeff` Chebyshev
    /// coefficients per component, fitted at the Chebyshev nodes of each record.
    pub fn fit(
        target: i32,
        center: i32,
        init: f64,
        intlen: f64,
        n_records: usize,
        ncoeff: usize,
        state: impl Fn(f64) -> [f64; 3],
    ) -> Self {
        let records = (0..n_records)
            .map(|i| {
                let radius = intlen / 2.0;
                let mid = init + intlen * i as f64 + radius;
                let nodes: Vec<f64> = (0..ncoeff)
                    .map(|k| (PI * (k as f64 + 0.5) / ncoeff as f64).cos())
                    .collect();
                let samples: Vec<[f64; 3]> =
                    nodes.iter().map(|tau| state(mid + tau * radius)).collect();

                let mut record = vec![mid, radius];
                for axis in 0..3 {
                    for j in 0..ncoeff {
                        let sum: f64 = (0..ncoeff)
                            .map(|k| {
                                samples[k][axis]
                                    * (PI * j as f64 * (k as f64 + 0.5) / ncoeff as f64).cos()
                            })
                            .sum();
                        let scale = if j == 0 { 1.0 } else { 2.0 };
                        record.push(scale * sum / ncoeff as f64);
                    }
                }
                record
            })
            .collect();

        SyntheticSegment {
            target,
            center,
            data_type: 2,
            init,
            intlen,
            records,
        }
    }

    /// Segment of a body moving on a straight line: `position + velocity * et` (km, km/s).
    pub fn linear(
        target: i32,
        center: i32,
        init: f64,
        intlen: f64,
        n_records: usize,
        position: [f64; 3],
        velocity: [f64; 3],
    ) -> Self {
        Self::fit(target, center, init, intlen, n_records, 3, move |et| {
            [
                position[0] + velocity[0] * et,
                position[1] + velocity[1] * et,
                position[2] + velocity[2] * et,
            ]
        })
    }

    /// Segment of a body at rest relative to its center.
    pub fn fixed(target: i32, center: i32, init: f64, intlen: f64, position: [f64; 3]) -> Self {
        Self::linear(target, center, init, intlen, 1, position, [0.0; 3])
    }

    /// Same segment stored as type 3: velocity coefficients appended to each record.
    pub fn as_type_3(mut self) -> Self {
        for record in &mut self.records {
            let ncoeff = (record.len() - 2) / 3;
            record.extend(std::iter::repeat(0.0).take(3 * ncoeff));
        }
        self.data_type = 3;
        self
    }

    fn words(&self) -> Vec<f64> {
        let rsize = self.records[0].len();
        let mut words: Vec<f64> = self.records.iter().flatten().copied().collect();
        words.extend([self.init, self.intlen, rsize as f64, self.records.len() as f64]);
        words
    }
}

/// Builder of an in-memory little-endian SPK kernel.
#[derive(Debug, Clone)]
pub struct SpkWriter {
    pub segments: Vec<SyntheticSegment>,
    pub comment: Option<String>,
    pub summaries_per_record: usize,
    pub locfmt: &'static str,
}

impl Default for SpkWriter {
    fn default() -> Self {
        SpkWriter {
            segments: Vec::new(),
            comment: None,
            summaries_per_record: 25,
            locfmt: "LTL-IEEE",
        }
    }
}

fn put_f64(buffer: &mut [u8], word_address: usize, value: f64) {
    let start = (word_address - 1) * 8;
    buffer[start..start + 8].copy_from_slice(&value.to_le_bytes());
}

impl SpkWriter {
    pub fn with_segment(mut self, segment: SyntheticSegment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let comment_records = self
            .comment
            .as_ref()
            .map(|text| text.len() / 1000 + 1)
            .unwrap_or(0);
        let chunks: Vec<&[SyntheticSegment]> =
            self.segments.chunks(self.summaries_per_record).collect();
        let n_summary_records = chunks.len().max(1);

        // file record, comments, then (summary, name) record pairs
        let fward = 2 + comment_records;
        let bward = fward + 2 * (n_summary_records - 1);
        let data_record = fward + 2 * n_summary_records;
        let mut address = (data_record - 1) * RECORD_WORDS + 1;

        let mut data: Vec<f64> = Vec::new();
        let mut summaries = Vec::new();
        for segment in &self.segments {
            let words = segment.words();
            summaries.push((segment, address, address + words.len() - 1));
            address += words.len();
            data.extend(words);
        }
        let free = address;

        let total_words = (data_record - 1) * RECORD_WORDS + data.len();
        let total_records = total_words.div_ceil(RECORD_WORDS);
        let mut buffer = vec![0u8; total_records * RECORD_WORDS * 8];

        // file record
        buffer[..8].copy_from_slice(b"DAF/SPK ");
        buffer[8..12].copy_from_slice(&2i32.to_le_bytes());
        buffer[12..16].copy_from_slice(&6i32.to_le_bytes());
        let mut name = [b' '; 60];
        name[..16].copy_from_slice(b"SYNTHETIC KERNEL");
        buffer[16..76].copy_from_slice(&name);
        buffer[76..80].copy_from_slice(&(fward as i32).to_le_bytes());
        buffer[80..84].copy_from_slice(&(bward as i32).to_le_bytes());
        buffer[84..88].copy_from_slice(&(free as i32).to_le_bytes());
        buffer[88..96].copy_from_slice(self.locfmt.as_bytes());

        // comment area
        if let Some(text) = &self.comment {
            let mut bytes: Vec<u8> = text
                .bytes()
                .map(|b| if b == b'\n' { 0 } else { b })
                .collect();
            bytes.push(0x04);
            for (i, chunk) in bytes.chunks(1000).enumerate() {
                let start = (1 + i) * 1024;
                buffer[start..start + chunk.len()].copy_from_slice(chunk);
            }
        }

        // summary records
        for (i, chunk) in summaries.chunks(self.summaries_per_record).enumerate() {
            let record = fward + 2 * i;
            let first_word = (record - 1) * RECORD_WORDS + 1;
            let next = if i + 1 < n_summary_records {
                record + 2
            } else {
                0
            };
            let previous = if i == 0 { 0 } else { record - 2 };
            put_f64(&mut buffer, first_word, next as f64);
            put_f64(&mut buffer, first_word + 1, previous as f64);
            put_f64(&mut buffer, first_word + 2, chunk.len() as f64);

            for (k, (segment, initial, last)) in chunk.iter().enumerate() {
                let base = (first_word + 2 + 5 * k) * 8;
                buffer[base..base + 8].copy_from_slice(&segment.start().to_le_bytes());
                buffer[base + 8..base + 16].copy_from_slice(&segment.end().to_le_bytes());
                let ints = [
                    segment.target,
                    segment.center,
                    1,
                    segment.data_type,
                    *initial as i32,
                    *last as i32,
                ];
                for (j, value) in ints.iter().enumerate() {
                    let at = base + 16 + 4 * j;
                    buffer[at..at + 4].copy_from_slice(&value.to_le_bytes());
                }
            }
        }

        // segment data
        let data_start = (data_record - 1) * RECORD_WORDS + 1;
        for (i, value) in data.iter().enumerate() {
            put_f64(&mut buffer, data_start + i, *value);
        }

        buffer
    }
}

/// Start of the coverage of the scenario kernel: 2024-06-01 (TDB seconds past J2000).
pub const SCENARIO_START_ET: f64 = 770_472_000.0;

/// Length of each scenario record: 4 days.
pub const SCENARIO_INTLEN: f64 = 4.0 * 86_400.0;

/// Number of records of the scenario kernel (60 days).
pub const SCENARIO_RECORDS: usize = 15;

/// Geocentric distance of the scenario Moon (km).
pub const MOON_DISTANCE: f64 = 384_400.0;

/// Sidereal period of the scenario Moon (days).
pub const MOON_PERIOD_DAYS: f64 = 27.321_661;

/// Position of the scenario Moon relative to the Earth-Moon barycenter (km): circular orbit
/// in the ICRF equatorial plane.
pub fn scenario_moon(et: f64) -> [f64; 3] {
    let phase = 2.0 * PI * et / (MOON_PERIOD_DAYS * 86_400.0);
    [MOON_DISTANCE * phase.cos(), MOON_DISTANCE * phase.sin(), 0.0]
}

/// Kernel of the scenario tests:
/// * Sun (10) at rest at the solar system barycenter,
/// * Earth-Moon barycenter (3) at rest at (-1 AU, 0, 0), Earth (399) on it,
/// * Moon (301) on a circular equatorial orbit around the Earth-Moon barycenter,
/// * Mars only through its system barycenter (4),
/// * no Jupiter.
pub fn scenario_writer() -> SpkWriter {
    let span = SCENARIO_INTLEN * SCENARIO_RECORDS as f64;
    SpkWriter::default()
        .with_comment(
            "; synthetic.bsp LOG FILE\n\nJPL planetary and lunar ephemeris DE-SYNTH\n\nJD   2460462.5   to   JD   2460522.5\n",
        )
        .with_segment(SyntheticSegment::fixed(
            10,
            0,
            SCENARIO_START_ET,
            span,
            [0.0, 0.0, 0.0],
        ))
        .with_segment(SyntheticSegment::fixed(
            3,
            0,
            SCENARIO_START_ET,
            span,
            [-AU, 0.0, 0.0],
        ))
        .with_segment(SyntheticSegment::fixed(
            399,
            3,
            SCENARIO_START_ET,
            span,
            [0.0, 0.0, 0.0],
        ))
        .with_segment(SyntheticSegment::fit(
            301,
            3,
            SCENARIO_START_ET,
            SCENARIO_INTLEN,
            SCENARIO_RECORDS,
            14,
            scenario_moon,
        ))
        .with_segment(
            SyntheticSegment::fixed(4, 0, SCENARIO_START_ET, span, [AU, 1.2 * AU, 0.3 * AU])
                .as_type_3(),
        )
}

pub fn scenario_kernel_bytes() -> Vec<u8> {
    scenario_writer().to_bytes()
}

/// Observer of the reference report (Colorado, USA).
pub fn colorado() -> GeodeticLocation {
    GeodeticLocation::new(38.478752, -107.877739, 0.0).unwrap()
}

pub fn scenario_time() -> TimePoint {
    TimePoint::from_utc_str("2024-06-20T19:00:00Z").unwrap()
}

/// Hipparcos rows used by the catalog tests (Polaris, Sirius, one row without astrometry).
pub const HIP_ROWS: &str = "\
H|       11767| |02 31 47.08|+89 15 50.9| 1.97| |H|037.94614689|+89.26413805| |   7.56|   44.22|  -11.74|  0.39|  0.45|  0.47|  0.55|  0.51|
H|       32349| |06 45 09.25|-16 42 47.3|-1.44| |H|101.28854105|-16.71314306| | 379.21| -546.01|-1223.08|  1.09|  0.79|  0.42|  0.56|  0.46|
H|         143| |00 01 49.47|+00 39 27.0| 9.82| |G|            |            | |       |        |        |      |      |      |      |      |
";

pub fn assert_angle_eq(actual_degrees: f64, expected_degrees: f64, epsilon: f64) {
    let diff = (actual_degrees - expected_degrees + 180.0).rem_euclid(360.0) - 180.0;
    assert_abs_diff_eq!(diff, 0.0, epsilon = epsilon);
}
