//! Core markup text primitives
//!
//! This module contains the fundamental building blocks for reading and
//! writing markup text:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Entities: entity decoding with Cow (zero-copy when possible) and escaping
//! - Attributes: start-tag attribute tokenizing

pub mod attributes;
pub mod entities;
pub mod scanner;
