//! Chrome DevTools Protocol adapter for [`crate::TargetProvider`] and [`crate::RemoteTarget`].

mod browser;
mod client;
mod page;


pub use browser::{CdpBrowser, PageInfo};
pub use client::CdpClient;
pub use page::CdpTarget;
