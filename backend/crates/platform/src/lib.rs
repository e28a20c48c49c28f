//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, secure randomness)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Bearer token signing and verification (JWS, HS256)

pub mod crypto;
pub mod password;
pub mod token;
