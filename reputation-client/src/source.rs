//! Seam to the network collaborator.
//!
//! Everything that touches the chain goes through [`AccountSource`], so the
//! codec and query layers stay testable against an in-memory map of
//! accounts.  The trait is implemented for the nonblocking
//! [`RpcClient`]; retry, timeout and commitment policy beyond the defaults
//! belong to that client, not to this crate.

use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;

use crate::error::Result;

/// Byte-level predicate applied server-side by `getProgramAccounts`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountFilter {
    /// Account data must equal `bytes` at `offset`.
    Memcmp { offset: usize, bytes: Vec<u8> },
    /// Account data must be exactly this long.
    DataSize(u64),
}

/// The two network primitives this crate needs.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Raw data of the account at `address`, or `None` if it does not
    /// exist.
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// All accounts owned by `program_id` whose data satisfies every
    /// filter.
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<AccountFilter>,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>>;
}

#[async_trait]
impl AccountSource for RpcClient {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = self
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<AccountFilter>,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        let filters = filters
            .into_iter()
            .map(|filter| match filter {
                AccountFilter::Memcmp { offset, bytes } => {
                    RpcFilterType::Memcmp(Memcmp::new_raw_bytes(offset, bytes))
                }
                AccountFilter::DataSize(size) => RpcFilterType::DataSize(size),
            })
            .collect();
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self
            .get_program_accounts_with_config(program_id, config)
            .await?;
        Ok(accounts
            .into_iter()
            .map(|(address, account)| (address, account.data))
            .collect())
    }
}
