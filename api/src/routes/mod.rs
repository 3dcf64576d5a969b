pub mod transfer_tokens;
