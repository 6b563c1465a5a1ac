/// Validates the provided API key against the expected key.
///
/// `expected` is resolved at startup (from `API_KEY`) and passed in, so validation never reads
/// the environment per request. A missing expected key rejects every request.
#[allow(clippy::result_large_err)]
pub fn validate_api_key(provided_key: &str, expected: Option<&str>) -> Result<(), tonic::Status> {
    let expected_key =
        expected.ok_or_else(|| tonic::Status::internal("API_KEY not set in environment"))?;

    if provided_key == expected_key {
        Ok(())
    } else {
        Err(tonic::Status::unauthenticated("Invalid API key"))
    }
}
