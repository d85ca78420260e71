/// Failure categories surfaced by the pipeline.
///
/// Each category maps to a stable process exit code:
/// - 2: bad input or configuration (caller can fix the invocation)
/// - 3: the data cannot support the requested analysis
/// - 4: a numeric computation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InvalidBinConfig,
    Io,
    OverlapWindowEmpty,
    InsufficientBins,
    InsufficientPoints,
    FitDidNotConverge,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::InvalidBinConfig | ErrorKind::Io => 2,
            ErrorKind::OverlapWindowEmpty
            | ErrorKind::InsufficientBins
            | ErrorKind::InsufficientPoints => 3,
            ErrorKind::FitDidNotConverge => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn invalid_bin_config(min_size: f64, max_size: f64, step: f64) -> Self {
        Self::new(
            ErrorKind::InvalidBinConfig,
            format!(
                "Invalid bin configuration: min={min_size}, max={max_size}, step={step} \
                 (need finite min < max and step > 0 producing at least one bin)."
            ),
        )
    }

    pub fn overlap_window_empty(c_min: f64, c_max: f64) -> Self {
        Self::new(
            ErrorKind::OverlapWindowEmpty,
            format!("No clasts inside the overlap window ({c_min}, {c_max}]; cannot scale datasets."),
        )
    }

    pub fn insufficient_bins(surviving: usize, required: usize) -> Self {
        Self::new(
            ErrorKind::InsufficientBins,
            format!(
                "Only {surviving} bin(s) survive the support filter; at least {required} are needed \
                 for a cumulative curve."
            ),
        )
    }

    pub fn insufficient_points(available: usize, required: usize) -> Self {
        Self::new(
            ErrorKind::InsufficientPoints,
            format!("Only {available} usable point(s) available; at least {required} are needed."),
        )
    }

    pub fn fit_did_not_converge(what: &str, iterations: usize) -> Self {
        Self::new(
            ErrorKind::FitDidNotConverge,
            format!("{what} fit did not converge within {iterations} iteration(s)."),
        )
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_kind() {
        assert_eq!(AppError::invalid_input("x").exit_code(), 2);
        assert_eq!(AppError::invalid_bin_config(1.0, 0.0, 0.1).exit_code(), 2);
        assert_eq!(AppError::overlap_window_empty(0.3, 0.5).exit_code(), 3);
        assert_eq!(AppError::insufficient_bins(1, 2).exit_code(), 3);
        assert_eq!(AppError::insufficient_points(0, 2).exit_code(), 3);
        assert_eq!(AppError::fit_did_not_converge("Rosin-Rammler", 200).exit_code(), 4);
    }

    #[test]
    fn display_is_the_message() {
        let err = AppError::new(ErrorKind::Io, "boom");
        assert_eq!(format!("{err}"), "boom");
    }
}
