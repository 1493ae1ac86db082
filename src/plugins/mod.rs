//! Policy tables and the two hooks built on them.

pub mod gate;
pub mod intercept;
pub mod manifest;
pub mod superpowers;
pub mod transition;
