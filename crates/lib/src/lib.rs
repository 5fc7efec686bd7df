//! Folio core library — the conversational session core of the portfolio
//! site's assistant widget: message log, bounded context window, request
//! lifecycle, widget state, and the remote inference gateway adapters.

pub mod config;
pub mod controller;
pub mod gateway;
pub mod session;
pub mod storage;
pub mod widget;
