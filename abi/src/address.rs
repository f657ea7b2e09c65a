use crate::error::AnalysisError;

pub const ADDRESS_PREFIX: &str = "0x";
pub const MIN_ADDRESS_LEN: usize = 10;

/// Prefix and length check only; no checksum validation.
pub fn validate_wallet_address(address: &str) -> Result<&str, AnalysisError> {
    let address = address.trim();
    if !address.starts_with(ADDRESS_PREFIX) || address.len() < MIN_ADDRESS_LEN {
        return Err(AnalysisError::Validation(format!(
            "invalid Sui wallet address `{}`: must start with '{}' and be at least {} characters",
            address, ADDRESS_PREFIX, MIN_ADDRESS_LEN
        )));
    }
    Ok(address)
}

/// Accepts an object id (`0x...`) or a fully qualified type (`0x2::sui::SUI`).
pub fn validate_token_reference(token: &str) -> Result<&str, AnalysisError> {
    let token = token.trim();
    if token.starts_with(ADDRESS_PREFIX) || token.contains("::") {
        Ok(token)
    } else {
        Err(AnalysisError::Validation(format!(
            "invalid token reference `{}`: use an object id starting with '0x' or a fully qualified type",
            token
        )))
    }
}
