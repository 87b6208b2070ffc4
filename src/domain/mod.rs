//! Core domain types and logic.

pub mod allocator;
pub mod backtest;
pub mod error;
pub mod instrument;
pub mod rates;
pub mod regime;
pub mod series;
pub mod simulation;
pub mod window;
