//! Error classification logic

use crate::contract::{error_message, ApiVersion};
use crate::Error;

/// Map a non-success HTTP response to a classified error.
///
/// The message is the service's own text, read from the version's error field.
pub(crate) fn classify_status(version: ApiVersion, status: u16, body: &[u8]) -> Error {
    let message = error_message(version, body);
    match status {
        400 => Error::BadRequest { message },
        401 => Error::Unauthorized { message },
        404 => Error::NotFound { message },
        500..=599 => Error::ServerError { status, message },
        _ => Error::Remote { status, message },
    }
}
