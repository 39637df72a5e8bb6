//! Timeout validation utilities

use std::time::Duration;
use crate::error::{MCPResult, ValidationError};

/// Validate timeout duration
/// 
/// Consolidates implementation from core/config.rs and server validation
pub fn validate_timeout(timeout: Duration) -> MCPResult<()> {
    const MIN_TIMEOUT: Duration = Duration::from_millis(100);
    const MAX_TIMEOUT: Duration = Duration::from_secs(3600); // 1 hour
    
    if timeout < MIN_TIMEOUT {
        return Err(ValidationError::ValueOutOfRange {
            field: "timeout".to_string(),
            min: format!("{}ms", MIN_TIMEOUT.as_millis()),
            max: format!("{}s", MAX_TIMEOUT.as_secs()),
            actual: format!("{}ms", timeout.as_millis()),
        }.into());
    }
    
    if timeout > MAX_TIMEOUT {
        return Err(ValidationError::ValueOutOfRange {
            field: "timeout".to_string(),
            min: format!("{}ms", MIN_TIMEOUT.as_millis()),
            max: format!("{}s", MAX_TIMEOUT.as_secs()),
            actual: format!("{}s", timeout.as_secs()),
        }.into());
    }
    
    Ok(())
}

/// Check if a timeout duration is valid (returns bool for quick checks)
pub fn is_valid_timeout(timeout: Duration) -> bool {
    validate_timeout(timeout).is_ok()
}

/// Validate retry count
pub fn validate_retry_count(retries: u32) -> MCPResult<()> {
    const MAX_RETRIES: u32 = 10;
    
    if retries > MAX_RETRIES {
        return Err(ValidationError::ValueOutOfRange {
            field: "retry_count".to_string(),
            min: "0".to_string(),
            max: MAX_RETRIES.to_string(),
            actual: retries.to_string(),
        }.into());
    }
    
    Ok(())
}

/// Validate backoff multiplier
pub fn validate_backoff_multiplier(multiplier: f64) -> MCPResult<()> {
    const MIN_MULTIPLIER: f64 = 1.0;
    const MAX_MULTIPLIER: f64 = 10.0;
    
    if multiplier < MIN_MULTIPLIER || multiplier > MAX_MULTIPLIER {
        return Err(ValidationError::ValueOutOfRange {
            field: "backoff_multiplier".to_string(),
            min: MIN_MULTIPLIER.to_string(),
            max: MAX_MULTIPLIER.to_string(),
            actual: multiplier.to_string(),
        }.into());
    }
    
    if !multiplier.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "backoff_multiplier".to_string(),
            expected: "finite number".to_string(),
        }.into());
    }
    
    Ok(())
}

/// Get recommended timeout for operation type
pub fn get_recommended_timeout(operation: &str) -> Duration {
    match operation {
        "ping" => Duration::from_secs(5),
        "initialize" => Duration::from_secs(30),
        "shutdown" => Duration::from_secs(10),
        "tools/list" => Duration::from_secs(10),
        "tools/call" => Duration::from_secs(300), // 5 minutes for tool execution
        "resources/list" => Duration::from_secs(30),
        "resources/read" => Duration::from_secs(60),
        "prompts/list" => Duration::from_secs(10),
        "prompts/get" => Duration::from_secs(30),
        "sampling/createMessage" => Duration::from_secs(120), // 2 minutes for LLM calls
        "completion/complete" => Duration::from_secs(30),
        _ => Duration::from_secs(30), // Default timeout
    }
}
