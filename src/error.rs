use thiserror::Error;

/// The fatal error taxonomy of the mission-generation core.
///
/// Non-fatal conditions (the `EmptyResultError` and `Warning` kinds of
/// spec §7) are never represented here — they are folded into
/// [`crate::request::MissionResponse::warnings`] instead, since an empty
/// pattern or a limit breach does not abort the pipeline.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("projection error: {0}")]
    Projection(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("xml encoding error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
