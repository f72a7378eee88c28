/// Problems found while loading opening data.
#[derive(Debug, thiserror::Error)]
pub enum OpeningDataError {
    #[error("Failed to parse opening {source_name}: {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Duplicate opening id: {0}")]
    DuplicateId(String),
    #[error("{opening_id}/{variation_id}: move {index} ({uci}) is illegal: {reason}")]
    IllegalBookMove {
        opening_id: String,
        variation_id: String,
        index: usize,
        uci: String,
        reason: String,
    },
    #[error("{opening_id}/{variation_id}: move {index} is {uci} = {actual}, but the book says {recorded}")]
    SanMismatch {
        opening_id: String,
        variation_id: String,
        index: usize,
        uci: String,
        recorded: String,
        actual: String,
    },
}
