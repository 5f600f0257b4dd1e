//! Authentication and session validation
//!
//! This module provides the credential and token core of the service:
//! - Signed token issuance and verification (HS256, algorithm pinned)
//! - Password hashing with Argon2
//! - Session-gate middleware for protected routes
//! - Authentication service for registration, login, and introspection

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{Claims, IssuedToken, TokenCodec, TokenConfig, TokenError};
pub use middleware::{session_gate, AuthenticatedAccount, GateError};
pub use password::{HasherParams, PasswordError, PasswordHasher};
pub use service::{
    AuthError, AuthService, LoginRequest, LoginResponse, RegisterRequest, TokenIntrospection,
};
