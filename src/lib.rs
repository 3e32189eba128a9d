//! Live satellite position tracking.
//!
//! A [`Poller`](poller::Poller) queries the SOAP position service once per cycle and
//! publishes the newest [`PositionRecord`](position::PositionRecord) on a
//! [`NotificationChannel`](notify::NotificationChannel), from which any number of
//! consumers receive it without blocking the poll loop.

pub mod config;
pub mod notify;
pub mod poller;
pub mod position;
pub mod soap;
pub mod web;
