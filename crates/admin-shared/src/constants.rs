//! Application-wide constants

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 900;
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 604800;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Upper bound on parent-chain traversal when rebuilding a menu tree.
/// Parent links are acyclic by invariant; the bound keeps a corrupted
/// chain from looping forever.
pub const MAX_ANCESTOR_DEPTH: usize = 64;
