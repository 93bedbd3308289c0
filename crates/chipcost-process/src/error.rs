//! Error types for chipcost-process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("layer {layer}: negative area {area}")]
    NegativeArea { layer: String, area: f64 },

    #[error("layer {layer}: negative litho percent {litho_percent}")]
    NegativeLithoPercent { layer: String, litho_percent: f64 },

    #[error("layer {layer}: die of area {area} with aspect ratio {aspect_ratio} has a zero-length side")]
    ZeroDieSide {
        layer: String,
        area: f64,
        aspect_ratio: f64,
    },

    #[error("layer {layer}: no die of area {area} fits on wafer {wafer}")]
    NoDiesPerWafer {
        layer: String,
        wafer: String,
        area: f64,
    },

    #[error("unknown test failure distribution: {0}")]
    UnknownDistribution(String),

    #[error(transparent)]
    Core(#[from] chipcost_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
