//! Reader for NAIF SPK kernels (DAF containers of Chebyshev segments).
mod daf_header;
mod directory;
mod ephemeris_record;
mod kernel_comment;
pub mod spk_kernel;
mod summary_record;

pub use daf_header::DAFHeader;
pub use directory::DirectoryData;
pub use ephemeris_record::EphemerisRecord;
pub use kernel_comment::KernelComment;
pub use summary_record::Summary;
