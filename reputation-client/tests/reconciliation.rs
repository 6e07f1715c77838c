//! End-to-end tests of the query reconciliation and the pre-validating
//! instruction builders, run against an in-memory account source.

use std::collections::HashMap;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_sdk::pubkey::Pubkey;

use reputation_client::discriminator::instruction_discriminator;
use reputation_client::state::REPUTATION_LEGACY_SEASON_OFFSET;
use reputation_client::{
    instruction, pda, query_by_season_and_owner, AccountFilter, AccountSource, Config, Error,
    Reputation, Result,
};

/// Account map standing in for the RPC collaborator.  Filters are applied
/// the same way the server applies memcmp/dataSize predicates.
#[derive(Default)]
struct MockSource {
    accounts: HashMap<Pubkey, Vec<u8>>,
    fail_legacy_scan: bool,
}

fn satisfies(filters: &[AccountFilter], data: &[u8]) -> bool {
    filters.iter().all(|filter| match filter {
        AccountFilter::Memcmp { offset, bytes } => data
            .get(*offset..offset + bytes.len())
            .is_some_and(|window| window == bytes.as_slice()),
        AccountFilter::DataSize(size) => data.len() as u64 == *size,
    })
}

#[async_trait]
impl AccountSource for MockSource {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        Ok(self.accounts.get(address).cloned())
    }

    async fn get_program_accounts(
        &self,
        _program_id: &Pubkey,
        filters: Vec<AccountFilter>,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        let is_legacy_scan = filters.iter().any(|filter| {
            matches!(filter, AccountFilter::Memcmp { offset, .. }
                     if *offset == REPUTATION_LEGACY_SEASON_OFFSET)
        });
        if self.fail_legacy_scan && is_legacy_scan {
            let kind = ClientErrorKind::Custom("scan unavailable".to_owned());
            return Err(ClientError::from(kind).into());
        }
        Ok(self
            .accounts
            .iter()
            .filter(|(_, data)| satisfies(&filters, data))
            .map(|(address, data)| (*address, data.clone()))
            .collect())
    }
}

struct Fixture {
    program_id: Pubkey,
    owner: Pubkey,
    authority: Pubkey,
    config: Pubkey,
    source: MockSource,
}

fn fixture(current_season: u16) -> Fixture {
    let program_id = Pubkey::new_unique();
    let owner = Pubkey::new_unique();
    let authority = Pubkey::new_unique();
    let (config, bump) = pda::config_address(&program_id, &owner);
    let mut source = MockSource::default();
    source.accounts.insert(
        config,
        Config {
            version: 1,
            owner,
            authority,
            reward_token: Pubkey::new_unique(),
            current_season,
            decay_bps: 100,
            bump,
        }
        .encode(),
    );
    Fixture { program_id, owner, authority, config, source }
}

impl Fixture {
    /// Stores a Reputation account at its proper derived address.
    fn insert_reputation(&mut self, user: Pubkey, season: u16, points: u64, legacy: bool) -> Pubkey {
        let (address, bump) =
            pda::reputation_address(&self.program_id, &self.config, &user, season.into());
        let reputation = Reputation {
            version: 1,
            user,
            season,
            points,
            last_update_slot: 1_000,
            bump,
        };
        let data = if legacy {
            reputation.encode_legacy()
        } else {
            reputation.encode_current(&self.owner)
        };
        self.source.accounts.insert(address, data);
        address
    }
}

#[tokio::test]
async fn dual_layout_merge_returns_both_generations() {
    let mut fx = fixture(3);
    let legacy_user = Pubkey::new_unique();
    let current_user = Pubkey::new_unique();
    let legacy_address = fx.insert_reputation(legacy_user, 3, 10, true);
    let current_address = fx.insert_reputation(current_user, 3, 20, false);
    // Different season, must not appear.
    fx.insert_reputation(Pubkey::new_unique(), 4, 99, false);

    let records =
        query_by_season_and_owner(&fx.source, &fx.program_id, &fx.owner, 3, None).await;

    let addresses: Vec<Pubkey> = records.iter().map(|record| record.address).collect();
    assert_eq!(addresses, vec![current_address, legacy_address]);
    assert_eq!(records[0].reputation.points, 20);
    assert_eq!(records[1].reputation.points, 10);
}

#[tokio::test]
async fn account_matching_both_filters_is_returned_once() {
    let mut fx = fixture(5);
    // A current-layout account whose user key begins with the season bytes
    // aliases into the legacy filter's season offset, so both scans hit it.
    let mut aliased = [0xABu8; 32];
    aliased[0] = 5;
    aliased[1] = 0;
    let user = Pubkey::new_from_array(aliased);
    let address = fx.insert_reputation(user, 5, 7, false);

    let records =
        query_by_season_and_owner(&fx.source, &fx.program_id, &fx.owner, 5, None).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, address);
}

#[tokio::test]
async fn spoofed_account_fails_address_rederivation() {
    let mut fx = fixture(3);
    let genuine = fx.insert_reputation(Pubkey::new_unique(), 3, 10, false);

    // Syntactically valid account parked at an address that is not the PDA
    // for its own decoded (owner, user, season).
    let spoofed = Reputation {
        version: 1,
        user: Pubkey::new_unique(),
        season: 3,
        points: 1_000_000,
        last_update_slot: 1_000,
        bump: 255,
    };
    fx.source
        .accounts
        .insert(Pubkey::new_unique(), spoofed.encode_current(&fx.owner));

    let records =
        query_by_season_and_owner(&fx.source, &fx.program_id, &fx.owner, 3, None).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, genuine);
}

#[tokio::test]
async fn failed_legacy_scan_degrades_to_current_results() {
    let mut fx = fixture(3);
    fx.insert_reputation(Pubkey::new_unique(), 3, 10, true);
    let current_address = fx.insert_reputation(Pubkey::new_unique(), 3, 20, false);
    fx.source.fail_legacy_scan = true;

    let records =
        query_by_season_and_owner(&fx.source, &fx.program_id, &fx.owner, 3, None).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, current_address);
}

#[tokio::test]
async fn results_are_sorted_and_truncated() {
    let mut fx = fixture(3);
    fx.insert_reputation(Pubkey::new_unique(), 3, 5, false);
    fx.insert_reputation(Pubkey::new_unique(), 3, 50, true);
    fx.insert_reputation(Pubkey::new_unique(), 3, 25, false);

    let records =
        query_by_season_and_owner(&fx.source, &fx.program_id, &fx.owner, 3, Some(2)).await;

    let points: Vec<u64> = records.iter().map(|record| record.reputation.points).collect();
    assert_eq!(points, vec![50, 25]);
}

#[tokio::test]
async fn add_reputation_rejects_stale_season_before_any_write() {
    let fx = fixture(3);
    let user = Pubkey::new_unique();

    let err = instruction::add_reputation(
        &fx.source, &fx.program_id, &fx.authority, &fx.owner, &user, 5, 10,
    )
    .await
    .unwrap_err();

    match err {
        Error::SeasonMismatch { supplied: 5, current: 3 } => (),
        other => panic!("expected season mismatch, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains('5') && message.contains('3'), "message: {message}");
}

#[tokio::test]
async fn add_reputation_encodes_the_new_total() {
    let mut fx = fixture(3);
    let user = Pubkey::new_unique();
    fx.insert_reputation(user, 3, 40, false);

    let ix = instruction::add_reputation(
        &fx.source, &fx.program_id, &fx.authority, &fx.owner, &user, 3, 2,
    )
    .await
    .unwrap();

    assert_eq!(&ix.data[..8], instruction_discriminator("addReputation"));
    assert_eq!(ix.data[8..16], 42u64.to_le_bytes());
}

#[tokio::test]
async fn add_reputation_defaults_missing_balance_to_zero() {
    let fx = fixture(3);
    let user = Pubkey::new_unique();

    let ix = instruction::add_reputation(
        &fx.source, &fx.program_id, &fx.authority, &fx.owner, &user, 3, 17,
    )
    .await
    .unwrap();

    assert_eq!(ix.data[8..16], 17u64.to_le_bytes());
}

#[tokio::test]
async fn reset_reuses_the_add_path_with_a_zero_target() {
    let mut fx = fixture(3);
    let user = Pubkey::new_unique();
    fx.insert_reputation(user, 3, 40, false);

    let ix = instruction::reset_reputation(
        &fx.source, &fx.program_id, &fx.authority, &fx.owner, &user, 3,
    )
    .await
    .unwrap();

    assert_eq!(&ix.data[..8], instruction_discriminator("addReputation"));
    assert_eq!(ix.data[8..16], 0u64.to_le_bytes());
}

#[tokio::test]
async fn builders_require_an_existing_config() {
    let fx = fixture(3);
    let missing_owner = Pubkey::new_unique();
    let user = Pubkey::new_unique();

    let err = instruction::close_reputation(
        &fx.source, &fx.program_id, &fx.authority, &missing_owner, &user, 3,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::ConfigNotFound(_)));
}
