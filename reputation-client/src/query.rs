//! Dual-layout scan and reconciliation of Reputation accounts.
//!
//! Two account layout generations coexist on-chain, so a season/owner query
//! issues two independent `getProgramAccounts` calls, one filter set per
//! layout, and merges the results.  The server-side filters are a hint, not
//! proof: every candidate is re-validated by re-deriving its expected
//! address from the decoded contents.  Spoofed or stale accounts fail that
//! check and are dropped silently.

use std::collections::HashSet;

use solana_sdk::pubkey::Pubkey;

use crate::discriminator::account_discriminator;
use crate::error::{Error, Result};
use crate::pda;
use crate::source::{AccountFilter, AccountSource};
use crate::state::{
    Reputation, REPUTATION_CURRENT_OWNER_OFFSET, REPUTATION_CURRENT_SEASON_OFFSET,
    REPUTATION_LEGACY_SEASON_OFFSET,
};

/// Result cap applied when the caller does not supply one.
pub const DEFAULT_QUERY_LIMIT: usize = 50_000;

/// A decoded Reputation account together with the address it lives at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReputationRecord {
    pub address: Pubkey,
    pub reputation: Reputation,
}

/// Rejects a candidate whose re-derived address does not reproduce the
/// address it was fetched from.  The discriminator and memcmp filters alone
/// are not sufficient proof of authenticity.
fn verify_address(
    program_id: &Pubkey,
    config: &Pubkey,
    address: &Pubkey,
    reputation: &Reputation,
) -> Result {
    let (derived, _) =
        pda::reputation_address(program_id, config, &reputation.user, reputation.season.into());
    if derived != *address {
        return Err(Error::AddressMismatch { actual: *address, derived });
    }
    Ok(())
}

/// All verified Reputation records for `(owner, season)`, sorted by points
/// descending and truncated to `limit` (default [`DEFAULT_QUERY_LIMIT`]).
///
/// The two layout queries run concurrently.  A failure of either one
/// degrades to zero hits from that layout rather than failing the call, so
/// this never returns an error; partial results are better than none while
/// one filter shape is unsupported or throttled.
pub async fn query_by_season_and_owner<S: AccountSource + ?Sized>(
    source: &S,
    program_id: &Pubkey,
    owner: &Pubkey,
    season: u32,
    limit: Option<usize>,
) -> Vec<ReputationRecord> {
    let season = (season & 0xFFFF) as u16;
    let limit = limit.unwrap_or(DEFAULT_QUERY_LIMIT);
    let discriminator = account_discriminator(Reputation::ACCOUNT_NAME).to_vec();

    let legacy_filters = vec![
        AccountFilter::Memcmp { offset: 0, bytes: discriminator.clone() },
        AccountFilter::Memcmp {
            offset: REPUTATION_LEGACY_SEASON_OFFSET,
            bytes: season.to_le_bytes().to_vec(),
        },
    ];
    let current_filters = vec![
        AccountFilter::Memcmp { offset: 0, bytes: discriminator },
        AccountFilter::Memcmp {
            offset: REPUTATION_CURRENT_OWNER_OFFSET,
            bytes: owner.as_ref().to_vec(),
        },
        AccountFilter::Memcmp {
            offset: REPUTATION_CURRENT_SEASON_OFFSET,
            bytes: season.to_le_bytes().to_vec(),
        },
    ];

    let (legacy, current) = tokio::join!(
        source.get_program_accounts(program_id, legacy_filters),
        source.get_program_accounts(program_id, current_filters),
    );
    let legacy = legacy.unwrap_or_else(|err| {
        tracing::warn!(%err, "legacy-layout reputation scan failed, continuing without it");
        Vec::new()
    });
    let current = current.unwrap_or_else(|err| {
        tracing::warn!(%err, "current-layout reputation scan failed, continuing without it");
        Vec::new()
    });

    let (config, _) = pda::config_address(program_id, owner);
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for (address, data) in legacy.into_iter().chain(current) {
        if !seen.insert(address) {
            continue;
        }
        let reputation = match Reputation::decode(&data) {
            Ok(reputation) => reputation,
            Err(err) => {
                tracing::debug!(%address, %err, "skipping undecodable candidate");
                continue;
            }
        };
        // The legacy filter can alias into the user field of a
        // current-layout account; the decoded season settles it.
        if reputation.season != season {
            continue;
        }
        if let Err(err) = verify_address(program_id, &config, &address, &reputation) {
            tracing::debug!(%address, %err, "skipping candidate failing address re-derivation");
            continue;
        }
        records.push(ReputationRecord { address, reputation });
    }

    records.sort_by(|a, b| b.reputation.points.cmp(&a.reputation.points));
    records.truncate(limit);
    records
}
