pub mod auth;
pub mod hasher;
pub mod jwt;
pub mod paginator;
pub mod redirect;
pub mod upload;
