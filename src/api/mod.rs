pub mod client;
pub mod proxy;

pub use client::{DonationApiClient, ensure_confirmable};
