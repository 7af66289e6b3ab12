//! Application layer orchestrating the order lifecycle.
//!
//! This module defines the `PaymentEngine`, the single entry point for order
//! creation, settlement and fee withdrawal, plus the reentrancy guard that
//! protects settlement against callbacks from the external asset transfer.

pub mod engine;
pub mod guard;
