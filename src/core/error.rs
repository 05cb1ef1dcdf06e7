//! Errors raised by the proxy endpoints before or after talking to
//! the gateway. Display strings are shown to end users verbatim.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ProxyError {
    #[error("طلب غير صالح: {0}")]
    InvalidBody(String),

    #[error("الرسائل مطلوبة")]
    MissingMessages,

    #[error("رسالة غير صالحة: {0}")]
    InvalidMessage(String),

    #[error("الموضوع مطلوب")]
    MissingTopic,

    #[error("Gateway API key is not configured")]
    MissingApiKey,

    #[error("فشل في إنشاء الشعر")]
    EmptyCompletion,
}

impl ProxyError {
    /// True when the request itself was invalid and nothing was sent
    /// upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProxyError::InvalidBody(_)
                | ProxyError::MissingMessages
                | ProxyError::InvalidMessage(_)
                | ProxyError::MissingTopic
        )
    }
}
