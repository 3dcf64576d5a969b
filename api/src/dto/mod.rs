pub mod response;
pub mod transfer_token;

pub use response::DataResponse;
pub use transfer_token::{CreateTransferTokenRequest, UpdateTransferTokenRequest};
