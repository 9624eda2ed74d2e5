use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::ClientError;

/// Wire wrapper returned by every backend endpoint:
/// `{"success": bool, "data": ..., "message": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T = IgnoredAny> {
    pub(crate) success: bool,
    pub(crate) data: Option<T>,
    pub(crate) message: Option<String>,
}

impl<T> Envelope<T> {
    /// Converts a `success: false` envelope into an application failure.
    fn check(self) -> Result<(Option<T>, Option<String>), ClientError> {
        if self.success {
            Ok((self.data, self.message))
        } else {
            Err(ClientError::Rejected {
                message: self.message,
            })
        }
    }

    /// Success envelope that must carry `data`.
    pub(crate) fn into_data(self) -> Result<T, ClientError> {
        let (data, _) = self.check()?;
        data.ok_or_else(|| ClientError::Malformed("success envelope without data".to_string()))
    }

    /// Success envelope of a mutation; only the message matters.
    pub(crate) fn into_message(self) -> Result<Option<String>, ClientError> {
        let (_, message) = self.check()?;
        Ok(message)
    }
}
