pub mod transfer_token;

pub use transfer_token::{
    InMemoryTransferTokenRepository, InMemoryTransaction, TransferTokenRepository,
    TransferTokenTransaction,
};
