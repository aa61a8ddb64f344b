use thiserror::Error;

// Datasets are curated by hand, so every variant is fatal for the run: the
// record or the layout gets fixed at the source rather than skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("no {expected} defined for {label}")]
    MissingParentage { label: String, expected: String },

    #[error("{label} must have 1 or 2 {key}, found: {count}")]
    InvalidParentCount {
        label: String,
        key: String,
        count: usize,
    },

    #[error("record {index} has no string label under key `{key}`")]
    MissingLabel { index: usize, key: String },

    #[error("`{key}` of {label} must be a list of name strings")]
    InvalidParentList { label: String, key: String },

    #[error("co-parents {a} and {b} share a position; cannot project their union")]
    DegenerateGeometry { a: String, b: String },
}
