use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No nodes available for snapping")]
    NoPointsFound,
    #[error("Unknown POI label: {0}")]
    UnknownLabel(String),
    #[error("Missing dataset: {0}")]
    MissingDataset(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(#[from] geojson::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}
