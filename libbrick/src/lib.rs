pub mod address;
pub mod amount;
pub mod balance;
pub mod channel;
pub mod cryptography;
pub mod error;
pub mod helpers;
pub mod host;
pub mod storage;
