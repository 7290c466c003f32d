pub mod image_data;
pub mod message;
pub mod wire;

pub use image_data::ImageFormat;
pub use message::Message;
pub use message::MessageRole;
pub use message::Submission;
pub use wire::ChatReply;
pub use wire::ChatRequest;
