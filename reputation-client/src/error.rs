use solana_sdk::pubkey::Pubkey;

/// Result type used throughout the crate.
pub type Result<T = (), E = Error> = core::result::Result<T, E>;

/// Errors surfaced by the codec, the instruction builders and the query
/// layer.
///
/// None of these are retried at this layer.  Bounds and discriminator
/// failures are fatal to the decode they occur in; bulk scans catch them
/// per-candidate and skip the offending account instead of aborting the
/// whole batch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Buffer too short for a fixed-width field or a declared variable
    /// length.
    #[error("buffer too short: need {need} bytes at offset {offset}, have {have}")]
    Bounds { offset: usize, need: usize, have: usize },

    /// First eight bytes of the account do not match the expected account
    /// discriminator.  Either the account holds a different type or the
    /// data is corrupted or foreign.
    #[error("bad discriminator for {kind}: expected {expected:?}, found {found:?}")]
    Discriminator {
        kind: &'static str,
        expected: [u8; 8],
        found: [u8; 8],
    },

    /// Re-deriving the account address from its decoded contents did not
    /// reproduce the address the data was fetched from.  The account is
    /// not trusted regardless of its discriminator.
    #[error("account {actual} does not match address {derived} re-derived from its contents")]
    AddressMismatch { actual: Pubkey, derived: Pubkey },

    /// Caller-supplied season disagrees with the current on-chain season.
    /// This is an optimistic client-side check; the program re-validates
    /// authoritatively.
    #[error("season mismatch: caller supplied {supplied}, on-chain config is at season {current}")]
    SeasonMismatch { supplied: u16, current: u16 },

    /// Season values are encoded as u16 on the wire.
    #[error("season {0} is outside the 0..=65535 range")]
    SeasonOutOfRange(u32),

    /// Decay rates are basis points, at most 10000.
    #[error("decay rate {0} exceeds 10000 basis points")]
    DecayOutOfRange(u16),

    /// Requested increase would push the points total past `u64::MAX`.
    #[error("points total overflows u64: {current} + {amount}")]
    PointsOverflow { current: u64, amount: u64 },

    /// The referenced Config account does not exist yet.
    #[error("no config account found at {0}")]
    ConfigNotFound(Pubkey),

    /// Metadata URI bytes are not valid UTF-8.
    #[error("metadata uri is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Error returned by the RPC collaborator.
    #[error(transparent)]
    Client(#[from] solana_client::client_error::ClientError),
}
