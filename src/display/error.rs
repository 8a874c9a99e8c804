use thiserror::Error;

/// Failures at the display driver boundary. The render path itself never
/// fails per frame; these cover driver construction and hardware I/O.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display driver '{0}' not compiled in (build with the 'hardware' feature)")]
    DriverUnavailable(&'static str),

    #[error("intensity {level} outside driver range 0..={max}")]
    IntensityRange { level: u8, max: u8 },

    #[error("display I/O error: {0}")]
    Io(String),
}
