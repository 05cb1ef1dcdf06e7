//! Client for the OpenAI compatible model gateway.

mod core;

pub use self::core::{
    Content, ContentPart, GatewayError, ImageUrl, Message, Role, check_response, completion,
    completion_stream,
};
