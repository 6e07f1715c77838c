//! Builders producing [`Instruction`] values for every program operation.
//!
//! Each builder resolves the instruction discriminator, serialises the
//! arguments in the exact order and width the program expects, derives the
//! addresses its account list references and emits the ordered
//! account-reference list.  The order of the account metas is part of the
//! wire contract and must never be rearranged.
//!
//! Builders that take an [`AccountSource`] pre-validate against live state
//! before encoding: they fetch the Config and reject a season that does not
//! match the current on-chain season.  This is an optimistic check only;
//! the program re-validates authoritatively.

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::codec;
use crate::discriminator::{instruction_discriminator, DISCRIMINATOR_LEN};
use crate::error::{Error, Result};
use crate::pda;
use crate::source::AccountSource;
use crate::state::{Config, Reputation};

/// Upper bound of the decay rate in basis points.
pub const MAX_DECAY_BPS: u16 = 10_000;

fn payload(name: &str, args_len: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(DISCRIMINATOR_LEN + args_len);
    data.extend_from_slice(&instruction_discriminator(name));
    data
}

fn season_arg(season: u32) -> Result<u16> {
    u16::try_from(season).map_err(|_| Error::SeasonOutOfRange(season))
}

async fn fetch_config<S: AccountSource + ?Sized>(
    source: &S,
    program_id: &Pubkey,
    owner: &Pubkey,
) -> Result<(Pubkey, Config)> {
    let (address, _) = pda::config_address(program_id, owner);
    let data = source
        .get_account_data(&address)
        .await?
        .ok_or(Error::ConfigNotFound(address))?;
    Ok((address, Config::decode(&data)?))
}

fn expect_current_season(config: &Config, supplied: u16) -> Result {
    if config.current_season != supplied {
        return Err(Error::SeasonMismatch { supplied, current: config.current_season });
    }
    Ok(())
}

/// Creates the Config account for `owner`.
pub fn initialize_config(
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    reward_token: &Pubkey,
    initial_season: u32,
) -> Result<Instruction> {
    let initial_season = season_arg(initial_season)?;
    let (config, _) = pda::config_address(program_id, owner);
    let mut data = payload("initializeConfig", 66);
    data.extend_from_slice(owner.as_ref());
    data.extend_from_slice(reward_token.as_ref());
    codec::write_u16_le(&mut data, initial_season);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new(config, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    })
}

fn config_update(
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    data: Vec<u8>,
) -> Instruction {
    let (config, _) = pda::config_address(program_id, owner);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(config, false),
        ],
        data,
    }
}

/// Hands control of the space to a new authority address.
pub fn set_authority(
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    new_authority: &Pubkey,
) -> Instruction {
    let mut data = payload("setAuthority", 32);
    data.extend_from_slice(new_authority.as_ref());
    config_update(program_id, authority, owner, data)
}

/// Advances (or rewinds) the space's current season.
pub fn set_season(
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    new_season: u32,
) -> Result<Instruction> {
    let new_season = season_arg(new_season)?;
    let mut data = payload("setSeason", 2);
    codec::write_u16_le(&mut data, new_season);
    Ok(config_update(program_id, authority, owner, data))
}

/// Sets the decay rate.  Rejects values above [`MAX_DECAY_BPS`] before
/// anything touches the network.
pub fn set_decay(
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    decay_bps: u16,
) -> Result<Instruction> {
    if decay_bps > MAX_DECAY_BPS {
        return Err(Error::DecayOutOfRange(decay_bps));
    }
    let mut data = payload("setDecay", 2);
    codec::write_u16_le(&mut data, decay_bps);
    Ok(config_update(program_id, authority, owner, data))
}

/// Replaces the space's reward token address.
pub fn set_reward_token(
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    new_token: &Pubkey,
) -> Instruction {
    let mut data = payload("setRewardToken", 32);
    data.extend_from_slice(new_token.as_ref());
    config_update(program_id, authority, owner, data)
}

/// Closes the Config account, refunding rent to the authority.
pub fn close_config(program_id: &Pubkey, authority: &Pubkey, owner: &Pubkey) -> Instruction {
    let (config, _) = pda::config_address(program_id, owner);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new(config, false),
        ],
        data: payload("closeConfig", 0),
    }
}

/// Administrative close of a user's Reputation account, bypassing the
/// season guard.  Addresses only, no arguments.
pub fn admin_close(
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    user: &Pubkey,
    season: u32,
) -> Result<Instruction> {
    let season = season_arg(season)?;
    let (config, _) = pda::config_address(program_id, owner);
    let (reputation, _) = pda::reputation_address(program_id, &config, user, season.into());
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(config, false),
            AccountMeta::new(reputation, false),
        ],
        data: payload("adminClose", 0),
    })
}

/// Moves a balance between two users within a season.  Addresses only, no
/// arguments.
pub fn transfer_reputation(
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    from_user: &Pubkey,
    to_user: &Pubkey,
    season: u32,
) -> Result<Instruction> {
    let season = season_arg(season)?;
    let (config, _) = pda::config_address(program_id, owner);
    let (from, _) = pda::reputation_address(program_id, &config, from_user, season.into());
    let (to, _) = pda::reputation_address(program_id, &config, to_user, season.into());
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new_readonly(config, false),
            AccountMeta::new(from, false),
            AccountMeta::new(to, false),
        ],
        data: payload("transferReputation", 0),
    })
}

/// Creates or updates the ProjectMetadata account for `owner`.
pub fn upsert_metadata(
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    uri: &str,
) -> Instruction {
    let (config, _) = pda::config_address(program_id, owner);
    let (metadata, _) = pda::project_metadata_address(program_id, owner);
    let mut data = payload("upsertMetadata", 4 + uri.len());
    codec::write_str(&mut data, uri);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(config, false),
            AccountMeta::new(metadata, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    }
}

/// Shared tail of the add/reset path: season guard, address derivation and
/// encoding of the absolute points total.
async fn encode_new_total<S: AccountSource + ?Sized>(
    source: &S,
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    user: &Pubkey,
    season: u16,
    new_total: u64,
) -> Result<Instruction> {
    let (config_address, config) = fetch_config(source, program_id, owner).await?;
    expect_current_season(&config, season)?;
    let (reputation, _) = pda::reputation_address(program_id, &config_address, user, season.into());
    let mut data = payload("addReputation", 8);
    codec::write_u64_le(&mut data, new_total);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(config_address, false),
            AccountMeta::new(reputation, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    })
}

/// Increases `user`'s points for the current season by `amount`.
///
/// The program stores absolute totals, so this fetches the current balance
/// (zero if the account does not exist yet) and encodes `current + amount`.
pub async fn add_reputation<S: AccountSource + ?Sized>(
    source: &S,
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    user: &Pubkey,
    season: u32,
    amount: u64,
) -> Result<Instruction> {
    let season = season_arg(season)?;
    let (config_address, _) = pda::config_address(program_id, owner);
    let (reputation, _) = pda::reputation_address(program_id, &config_address, user, season.into());
    let current = match source.get_account_data(&reputation).await? {
        Some(data) => Reputation::decode(&data)?.points,
        None => 0,
    };
    let new_total = current
        .checked_add(amount)
        .ok_or(Error::PointsOverflow { current, amount })?;
    encode_new_total(source, program_id, authority, owner, user, season, new_total).await
}

/// Resets `user`'s points for the current season to zero.
///
/// This is the add-points path with an absolute target of zero; it reuses
/// the same discriminator and season guard.
pub async fn reset_reputation<S: AccountSource + ?Sized>(
    source: &S,
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    user: &Pubkey,
    season: u32,
) -> Result<Instruction> {
    let season = season_arg(season)?;
    encode_new_total(source, program_id, authority, owner, user, season, 0).await
}

/// Closes a user's Reputation account for `season`, refunding rent to the
/// authority.  The season must match the on-chain current season.
pub async fn close_reputation<S: AccountSource + ?Sized>(
    source: &S,
    program_id: &Pubkey,
    authority: &Pubkey,
    owner: &Pubkey,
    user: &Pubkey,
    season: u32,
) -> Result<Instruction> {
    let season = season_arg(season)?;
    let (config_address, config) = fetch_config(source, program_id, owner).await?;
    expect_current_season(&config, season)?;
    let (reputation, _) = pda::reputation_address(program_id, &config_address, user, season.into());
    let mut data = payload("closeReputation", 2);
    codec::write_u16_le(&mut data, season);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(config_address, false),
            AccountMeta::new(reputation, false),
        ],
        data,
    })
}
