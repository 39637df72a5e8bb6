//! Session validation utilities

use crate::error::{MCPResult, ValidationError};

/// Validate session ID format (visible ASCII characters only)
/// 
/// Consolidates implementation from transport/streamable_http/server.rs
pub fn validate_session_id(session_id: &str) -> MCPResult<()> {
    if session_id.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "session_id".to_string(),
        }.into());
    }
    
    // Check that all characters are visible ASCII (0x21-0x7E)
    if !session_id.chars().all(|c| {
        let code = c as u8;
        code >= 0x21 && code <= 0x7E
    }) {
        return Err(ValidationError::InvalidFormat {
            field: "session_id".to_string(),
            expected: "visible ASCII characters only (0x21-0x7E)".to_string(),
        }.into());
    }
    
    // Check reasonable length limits
    if session_id.len() < 8 {
        return Err(ValidationError::ValueOutOfRange {
            field: "session_id".to_string(),
            min: "8".to_string(),
            max: "255".to_string(),
            actual: session_id.len().to_string(),
        }.into());
    }
    
    if session_id.len() > 255 {
        return Err(ValidationError::ValueOutOfRange {
            field: "session_id".to_string(),
            min: "8".to_string(),
            max: "255".to_string(),
            actual: session_id.len().to_string(),
        }.into());
    }
    
    Ok(())
}

/// Check if a session ID format is valid (returns bool for quick checks)
pub fn is_valid_session_id(session_id: &str) -> bool {
    validate_session_id(session_id).is_ok()
}

/// Validate event ID for Server-Sent Events
pub fn validate_event_id(event_id: &str) -> MCPResult<()> {
    if event_id.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "event_id".to_string(),
        }.into());
    }
    
    // Event IDs should be alphanumeric with hyphens (UUID format is common)
    if !event_id.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "event_id".to_string(),
            expected: "alphanumeric characters and hyphens only".to_string(),
        }.into());
    }
    
    Ok(())
}
