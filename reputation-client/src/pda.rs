//! Seed assembly for the program's derived addresses.
//!
//! The derivation itself is Solana's standard seed-hash-and-probe algorithm
//! via [`Pubkey::find_program_address`]; this module only owns the seed
//! ordering, which is part of the program's contract.

use solana_sdk::pubkey::Pubkey;

pub const CONFIG_SEED: &[u8] = b"config";
pub const PROJECT_META_SEED: &[u8] = b"project_meta";
pub const REPUTATION_SEED: &[u8] = b"reputation";

/// Address of the Config account for `owner`.  Exactly one Config exists
/// per owner per program deployment.
pub fn config_address(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED, owner.as_ref()], program_id)
}

/// Address of the ProjectMetadata account for `owner`.
pub fn project_metadata_address(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PROJECT_META_SEED, owner.as_ref()], program_id)
}

/// Address of the Reputation account for `(config, user, season)`.
///
/// `season` is wrapped to 16 bits before seeding.  Callers passing a wider
/// value get the truncated season; this matches the on-chain seed layout
/// and is deliberate.
pub fn reputation_address(
    program_id: &Pubkey,
    config: &Pubkey,
    user: &Pubkey,
    season: u32,
) -> (Pubkey, u8) {
    let season = (season & 0xFFFF) as u16;
    Pubkey::find_program_address(
        &[
            REPUTATION_SEED,
            config.as_ref(),
            user.as_ref(),
            &season.to_le_bytes(),
        ],
        program_id,
    )
}
