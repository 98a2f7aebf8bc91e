//! System-wide constants for the wager escrow engine.

/// Basis-point denominator: 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Default platform fee in basis points (2.5%).
pub const DEFAULT_FEE_BPS: u16 = 250;

/// Smallest stake accepted by default (one base unit).
pub const DEFAULT_MIN_WAGER: u64 = 1;

/// Default lifetime of a game record before anyone may expire it.
pub const DEFAULT_GAME_EXPIRY_SECS: i64 = 86_400;

/// Default cap on the opaque `game_data` payload, in bytes.
pub const DEFAULT_MAX_GAME_DATA_LEN: usize = 1024;

/// Number of stakes a fully joined game holds in escrow.
pub const STAKES_PER_GAME: u64 = 2;

/// Domain separator for escrow address derivation.
pub const ESCROW_SEED: &[u8] = b"wager:escrow:v1:";

/// Domain separator for receipt payload hashing.
pub const RECEIPT_SEED: &[u8] = b"wager:receipt:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "wager";
