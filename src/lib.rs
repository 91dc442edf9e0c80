pub mod ai;
pub mod config;
pub mod conversation;
pub mod markdown;
pub mod persistence;
pub mod session;
pub mod storage;
pub mod theme;
pub mod types;
pub mod view_state;

#[cfg(feature = "proxy")]
pub mod proxy;

#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;
