//! Anchor-style 8-byte discriminators derived from namespaced preimages.
//!
//! Instructions hash `"global:<snake_case_name>"`, accounts hash
//! `"account:<TypeName>"` (account names are never case-converted).  The
//! first eight bytes of the SHA-256 digest form the tag.  Digests are
//! memoised per preimage for the process lifetime; the name space is small
//! and closed so the cache never needs eviction.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use sha2::{Digest, Sha256};

pub const DISCRIMINATOR_LEN: usize = 8;

/// External (camelCase) to on-chain (snake_case) names for every known
/// instruction.  Unrecognised names fall back to [`camel_to_snake`], which
/// is the forward-compatibility path for instructions added after this
/// table was written.
const KNOWN_INSTRUCTIONS: &[(&str, &str)] = &[
    ("initializeConfig", "initialize_config"),
    ("setAuthority", "set_authority"),
    ("setSeason", "set_season"),
    ("setDecay", "set_decay"),
    ("setRewardToken", "set_reward_token"),
    ("addReputation", "add_reputation"),
    ("closeReputation", "close_reputation"),
    ("transferReputation", "transfer_reputation"),
    ("closeConfig", "close_config"),
    ("adminClose", "admin_close"),
    ("upsertMetadata", "upsert_metadata"),
];

fn cache() -> &'static Mutex<HashMap<String, [u8; DISCRIMINATOR_LEN]>> {
    static CACHE: OnceLock<Mutex<HashMap<String, [u8; DISCRIMINATOR_LEN]>>> = OnceLock::new();
    CACHE.get_or_init(Mutex::default)
}

fn cached_digest(preimage: String) -> [u8; DISCRIMINATOR_LEN] {
    let mut cache = cache().lock().unwrap_or_else(PoisonError::into_inner);
    *cache.entry(preimage).or_insert_with_key(|preimage| {
        let digest = Sha256::digest(preimage.as_bytes());
        let mut out = [0u8; DISCRIMINATOR_LEN];
        out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
        out
    })
}

/// Discriminator of the instruction `name` given in its external camelCase
/// calling convention.
pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let snake = KNOWN_INSTRUCTIONS
        .iter()
        .find(|(camel, _)| *camel == name)
        .map(|(_, snake)| (*snake).to_owned())
        .unwrap_or_else(|| camel_to_snake(name));
    cached_digest(format!("global:{snake}"))
}

/// Discriminator of the account type `name` (exact spelling, no case
/// conversion).
pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    cached_digest(format!("account:{name}"))
}

/// Generic camelCase to snake_case conversion: an underscore is inserted
/// before every uppercase letter following a lowercase letter or digit,
/// doubled underscores are collapsed, and the result is lowercased.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev = None::<char>;
    for ch in name.chars() {
        if ch.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.push(ch.to_ascii_lowercase());
        prev = Some(ch);
    }
    while out.contains("__") {
        out = out.replace("__", "_");
    }
    out
}
