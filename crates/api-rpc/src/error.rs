//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use lineup_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const INTERNAL_ERROR: i32 = 5000;
    /// The store could not be reached; the user should try again
    pub const STORE_UNAVAILABLE: i32 = 5001;
    pub const CHAT_ERROR: i32 = 5003;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Domain(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::StoreUnavailable(msg) => {
            ErrorObjectOwned::owned(code::STORE_UNAVAILABLE, msg, None::<()>)
        }
        AppError::Chat(e) => ErrorObjectOwned::owned(code::CHAT_ERROR, e.to_string(), None::<()>),
        AppError::Config(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
        AppError::Internal(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_core::domain::DomainError;
    use lineup_core::port::ChatError;

    #[test]
    fn test_error_codes() {
        let cases = vec![
            (
                AppError::Domain(DomainError::InvalidId {
                    field: "member_id",
                    reason: "must not be empty".into(),
                }),
                code::VALIDATION_ERROR,
            ),
            (AppError::StoreUnavailable("busy".into()), code::STORE_UNAVAILABLE),
            (AppError::Chat(ChatError::NotFound), code::CHAT_ERROR),
            (AppError::Config("bad url".into()), code::INTERNAL_ERROR),
            (AppError::Internal("boom".into()), code::INTERNAL_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(to_rpc_error(err).code(), expected);
        }
    }
}
