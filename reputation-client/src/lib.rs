//! Client-side codec and query layer for the space-reputation Solana
//! program.
//!
//! The program tracks per-user reputation points inside a "space": one
//! [`Config`](state::Config) account per space, one
//! [`Reputation`](state::Reputation) account per (space, user, season) and
//! an optional [`ProjectMetadata`](state::ProjectMetadata) pointer.  This
//! crate mirrors the program's data layout without needing its IDL at
//! runtime: it derives the program's addresses from seed tuples
//! ([`pda`]), serialises instruction payloads in the exact byte layout the
//! program expects ([`instruction`]) and parses raw account bytes back into
//! typed records ([`state`]).
//!
//! Network access goes through the [`source::AccountSource`] trait, which
//! is implemented for the nonblocking
//! [`RpcClient`](solana_client::nonblocking::rpc_client::RpcClient).
//! Transaction construction, signing and submission are out of scope; the
//! builders emit plain [`Instruction`](solana_sdk::instruction::Instruction)
//! values for whatever submission path the caller uses.
//!
//! Reputation accounts exist in two on-chain layout generations.  The
//! [`query`] module scans both concurrently, merges and de-duplicates the
//! results, and re-derives each candidate's address from its decoded
//! contents before trusting it.

pub mod codec;
pub mod discriminator;
pub mod error;
pub mod instruction;
pub mod pda;
pub mod query;
pub mod source;
pub mod state;

pub use error::{Error, Result};
pub use query::{query_by_season_and_owner, ReputationRecord, DEFAULT_QUERY_LIMIT};
pub use source::{AccountFilter, AccountSource};
pub use state::{Config, ProjectMetadata, Reputation};
