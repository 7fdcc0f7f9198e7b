//! Metro Simulation Library
//!
//! A tick-driven simulation of a growing metro network that can run headless
//! or behind any presentation layer.

pub mod simulation;
