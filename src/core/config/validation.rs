use super::settings::AppConfig;
use crate::core::errors::ApiError;

pub fn validate_config(config: &AppConfig) -> Result<(), ApiError> {
    if config.server.host.trim().is_empty() {
        return Err(invalid("server.host", "must not be empty"));
    }

    let openai = &config.openai;
    if openai.base_url.trim().is_empty() {
        return Err(invalid("openai.base_url", "must not be empty"));
    }
    if !(0.0..=2.0).contains(&openai.temperature) {
        return Err(invalid("openai.temperature", "must be between 0 and 2"));
    }
    if openai.max_tokens == 0 {
        return Err(invalid("openai.max_tokens", "must be at least 1"));
    }

    if config.pinecone.index_name.trim().is_empty() {
        return Err(invalid("pinecone.index_name", "must not be empty"));
    }

    let indexing = &config.indexing;
    validate_range("indexing.chunk_size", indexing.chunk_size as u64, 1, 1_000_000)?;
    validate_range("indexing.batch_size", indexing.batch_size as u64, 1, 1_000)?;
    validate_range(
        "indexing.vector_dimension",
        indexing.vector_dimension as u64,
        1,
        20_000,
    )?;
    validate_range(
        "indexing.ready_timeout_secs",
        indexing.ready_timeout_secs,
        1,
        86_400,
    )?;
    if indexing.chunk_overlap >= indexing.chunk_size {
        return Err(invalid(
            "indexing.chunk_overlap",
            "must be smaller than indexing.chunk_size",
        ));
    }
    if !matches!(
        indexing.metric.as_str(),
        "cosine" | "euclidean" | "dotproduct"
    ) {
        return Err(invalid(
            "indexing.metric",
            "must be one of cosine, euclidean, dotproduct",
        ));
    }

    Ok(())
}

fn validate_range(path: &str, value: u64, min: u64, max: u64) -> Result<(), ApiError> {
    if value < min || value > max {
        return Err(invalid(path, &format!("must be between {min} and {max}")));
    }
    Ok(())
}

fn invalid(path: &str, reason: &str) -> ApiError {
    ApiError::BadRequest(format!("Invalid config: {path} {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk() {
        let mut config = AppConfig::default();
        config.indexing.chunk_size = 100;
        config.indexing.chunk_overlap = 100;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let mut config = AppConfig::default();
        config.openai.temperature = 3.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_unknown_metric() {
        let mut config = AppConfig::default();
        config.indexing.metric = "manhattan".to_string();
        assert!(validate_config(&config).is_err());
    }
}
