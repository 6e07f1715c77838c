//! Typed views over the program's raw account bytes.
//!
//! Every account starts with its 8-byte discriminator.  Decoders validate
//! the discriminator and the minimum length before unpacking fields in
//! declared order; the matching encoders exist for tests and tooling and
//! reproduce the exact on-chain layout, reserved tail bytes included.
//!
//! Reputation accounts exist in two on-chain layout generations.  The
//! current layout embeds the owning-space id between the version and user
//! fields and is at least [`REPUTATION_CURRENT_LEN`] bytes; anything
//! shorter uses the legacy field order.  Both decode to the same
//! [`Reputation`] record.

use solana_sdk::pubkey::Pubkey;

use crate::codec;
use crate::discriminator::{account_discriminator, DISCRIMINATOR_LEN};
use crate::error::{Error, Result};

/// Total Config account length: fields end at offset 110, followed by three
/// reserved bytes the program allocates for future use.
pub const CONFIG_LEN: usize = 113;
/// Minimum length of a legacy-layout Reputation account (fields end at 60,
/// the program pads to 64).
pub const REPUTATION_LEGACY_LEN: usize = 64;
/// Minimum length of a current-layout Reputation account; also the layout
/// detection threshold.
pub const REPUTATION_CURRENT_LEN: usize = 92;
/// Minimum ProjectMetadata length: an empty URI plus the trailing bump.
pub const PROJECT_METADATA_MIN_LEN: usize = 46;

/// Byte offset of the season field in a legacy Reputation account.
pub const REPUTATION_LEGACY_SEASON_OFFSET: usize = 41;
/// Byte offset of the embedded owner id in a current Reputation account.
pub const REPUTATION_CURRENT_OWNER_OFFSET: usize = 9;
/// Byte offset of the season field in a current Reputation account.
pub const REPUTATION_CURRENT_SEASON_OFFSET: usize = 73;

/// Checks length and discriminator, returning the cursor position right
/// after the tag.
fn expect_discriminator(kind: &'static str, data: &[u8]) -> Result<usize> {
    if data.len() < DISCRIMINATOR_LEN {
        return Err(Error::Bounds { offset: 0, need: DISCRIMINATOR_LEN, have: data.len() });
    }
    let expected = account_discriminator(kind);
    let mut found = [0u8; DISCRIMINATOR_LEN];
    found.copy_from_slice(&data[..DISCRIMINATOR_LEN]);
    if found != expected {
        return Err(Error::Discriminator { kind, expected, found });
    }
    Ok(DISCRIMINATOR_LEN)
}

fn expect_len(data: &[u8], need: usize) -> Result {
    if data.len() < need {
        return Err(Error::Bounds { offset: 0, need, have: data.len() });
    }
    Ok(())
}

/// Per-space configuration.  Its address is fully determined by
/// `deriveAddress(["config", owner], program_id)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub version: u8,
    pub owner: Pubkey,
    pub authority: Pubkey,
    pub reward_token: Pubkey,
    pub current_season: u16,
    pub decay_bps: u16,
    pub bump: u8,
}

impl Config {
    pub const ACCOUNT_NAME: &'static str = "Config";

    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut offset = expect_discriminator(Self::ACCOUNT_NAME, data)?;
        expect_len(data, CONFIG_LEN)?;
        Ok(Self {
            version: codec::read_u8(data, &mut offset)?,
            owner: codec::read_pubkey(data, &mut offset)?,
            authority: codec::read_pubkey(data, &mut offset)?,
            reward_token: codec::read_pubkey(data, &mut offset)?,
            current_season: codec::read_u16_le(data, &mut offset)?,
            decay_bps: codec::read_u16_le(data, &mut offset)?,
            bump: codec::read_u8(data, &mut offset)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CONFIG_LEN);
        out.extend_from_slice(&account_discriminator(Self::ACCOUNT_NAME));
        out.push(self.version);
        out.extend_from_slice(self.owner.as_ref());
        out.extend_from_slice(self.authority.as_ref());
        out.extend_from_slice(self.reward_token.as_ref());
        codec::write_u16_le(&mut out, self.current_season);
        codec::write_u16_le(&mut out, self.decay_bps);
        out.push(self.bump);
        out.resize(CONFIG_LEN, 0);
        out
    }
}

/// Per-(space, user, season) points balance.  Both on-chain layout
/// generations decode to this shape; the current layout's embedded owner id
/// is skipped, not returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reputation {
    pub version: u8,
    pub user: Pubkey,
    pub season: u16,
    pub points: u64,
    pub last_update_slot: u64,
    pub bump: u8,
}

impl Reputation {
    pub const ACCOUNT_NAME: &'static str = "Reputation";

    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut offset = expect_discriminator(Self::ACCOUNT_NAME, data)?;
        if data.len() >= REPUTATION_CURRENT_LEN {
            let version = codec::read_u8(data, &mut offset)?;
            codec::skip(data, &mut offset, 32)?;
            Ok(Self {
                version,
                user: codec::read_pubkey(data, &mut offset)?,
                season: codec::read_u16_le(data, &mut offset)?,
                points: codec::read_u64_le(data, &mut offset)?,
                last_update_slot: codec::read_u64_le(data, &mut offset)?,
                bump: codec::read_u8(data, &mut offset)?,
            })
        } else {
            expect_len(data, REPUTATION_LEGACY_LEN)?;
            Ok(Self {
                version: codec::read_u8(data, &mut offset)?,
                user: codec::read_pubkey(data, &mut offset)?,
                season: codec::read_u16_le(data, &mut offset)?,
                points: codec::read_u64_le(data, &mut offset)?,
                last_update_slot: codec::read_u64_le(data, &mut offset)?,
                bump: codec::read_u8(data, &mut offset)?,
            })
        }
    }

    /// Encodes the current layout, which embeds the owning-space id.
    pub fn encode_current(&self, owner: &Pubkey) -> Vec<u8> {
        let mut out = Vec::with_capacity(REPUTATION_CURRENT_LEN);
        out.extend_from_slice(&account_discriminator(Self::ACCOUNT_NAME));
        out.push(self.version);
        out.extend_from_slice(owner.as_ref());
        out.extend_from_slice(self.user.as_ref());
        codec::write_u16_le(&mut out, self.season);
        codec::write_u64_le(&mut out, self.points);
        codec::write_u64_le(&mut out, self.last_update_slot);
        out.push(self.bump);
        out
    }

    /// Encodes the legacy layout (no embedded owner id, padded to 64).
    pub fn encode_legacy(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(REPUTATION_LEGACY_LEN);
        out.extend_from_slice(&account_discriminator(Self::ACCOUNT_NAME));
        out.push(self.version);
        out.extend_from_slice(self.user.as_ref());
        codec::write_u16_le(&mut out, self.season);
        codec::write_u64_le(&mut out, self.points);
        codec::write_u64_le(&mut out, self.last_update_slot);
        out.push(self.bump);
        out.resize(REPUTATION_LEGACY_LEN, 0);
        out
    }
}

/// Per-space metadata pointer: a UTF-8 URI with a 32-bit length prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub version: u8,
    pub owner: Pubkey,
    pub uri: String,
    pub bump: u8,
}

impl ProjectMetadata {
    pub const ACCOUNT_NAME: &'static str = "ProjectMetadata";

    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut offset = expect_discriminator(Self::ACCOUNT_NAME, data)?;
        expect_len(data, PROJECT_METADATA_MIN_LEN)?;
        let version = codec::read_u8(data, &mut offset)?;
        let owner = codec::read_pubkey(data, &mut offset)?;
        let uri_len = codec::read_u32_le(data, &mut offset)? as usize;
        // The declared length must leave room for the trailing bump byte.
        let need = uri_len
            .checked_add(1)
            .ok_or(Error::Bounds { offset, need: usize::MAX, have: data.len() })?;
        if offset + need > data.len() {
            return Err(Error::Bounds { offset, need, have: data.len() });
        }
        let uri = String::from_utf8(data[offset..offset + uri_len].to_vec())?;
        offset += uri_len;
        let bump = codec::read_u8(data, &mut offset)?;
        Ok(Self { version, owner, uri, bump })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PROJECT_METADATA_MIN_LEN + self.uri.len());
        out.extend_from_slice(&account_discriminator(Self::ACCOUNT_NAME));
        out.push(self.version);
        out.extend_from_slice(self.owner.as_ref());
        codec::write_str(&mut out, &self.uri);
        out.push(self.bump);
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_config() -> Config {
        Config {
            version: 1,
            owner: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            reward_token: Pubkey::new_unique(),
            current_season: 3,
            decay_bps: 250,
            bump: 254,
        }
    }

    fn sample_reputation() -> Reputation {
        Reputation {
            version: 1,
            user: Pubkey::new_unique(),
            season: 3,
            points: 1_234_567,
            last_update_slot: 987_654_321,
            bump: 251,
        }
    }

    #[test]
    fn config_round_trip() {
        let config = sample_config();
        let data = config.encode();
        assert_eq!(data.len(), CONFIG_LEN);
        assert_eq!(Config::decode(&data).unwrap(), config);
    }

    #[test]
    fn config_one_byte_short_is_a_bounds_error() {
        let data = sample_config().encode();
        assert!(matches!(
            Config::decode(&data[..CONFIG_LEN - 1]),
            Err(Error::Bounds { need: CONFIG_LEN, .. }),
        ));
        assert!(Config::decode(&data[..CONFIG_LEN]).is_ok());
    }

    #[test]
    fn config_rejects_foreign_discriminator() {
        let mut data = sample_config().encode();
        data[..8].copy_from_slice(&account_discriminator("Reputation"));
        assert!(matches!(
            Config::decode(&data),
            Err(Error::Discriminator { kind: "Config", .. }),
        ));
    }

    #[test]
    fn reputation_round_trip_both_layouts() {
        let reputation = sample_reputation();
        let owner = Pubkey::new_unique();

        let current = reputation.encode_current(&owner);
        assert_eq!(current.len(), REPUTATION_CURRENT_LEN);
        assert_eq!(Reputation::decode(&current).unwrap(), reputation);

        let legacy = reputation.encode_legacy();
        assert_eq!(legacy.len(), REPUTATION_LEGACY_LEN);
        assert_eq!(Reputation::decode(&legacy).unwrap(), reputation);
    }

    #[test]
    fn reputation_layout_field_offsets() {
        let reputation = sample_reputation();
        let owner = Pubkey::new_unique();

        let current = reputation.encode_current(&owner);
        assert_eq!(
            &current[REPUTATION_CURRENT_OWNER_OFFSET..REPUTATION_CURRENT_OWNER_OFFSET + 32],
            owner.as_ref(),
        );
        assert_eq!(
            current[REPUTATION_CURRENT_SEASON_OFFSET..REPUTATION_CURRENT_SEASON_OFFSET + 2],
            reputation.season.to_le_bytes(),
        );

        let legacy = reputation.encode_legacy();
        assert_eq!(
            legacy[REPUTATION_LEGACY_SEASON_OFFSET..REPUTATION_LEGACY_SEASON_OFFSET + 2],
            reputation.season.to_le_bytes(),
        );
    }

    #[test]
    fn decoding_is_idempotent() {
        let data = sample_reputation().encode_legacy();
        assert_eq!(Reputation::decode(&data).unwrap(), Reputation::decode(&data).unwrap());
    }

    #[test]
    fn short_legacy_reputation_is_a_bounds_error() {
        let data = sample_reputation().encode_legacy();
        assert!(matches!(
            Reputation::decode(&data[..REPUTATION_LEGACY_LEN - 1]),
            Err(Error::Bounds { .. }),
        ));
    }

    #[test]
    fn project_metadata_round_trip() {
        let metadata = ProjectMetadata {
            version: 1,
            owner: Pubkey::new_unique(),
            uri: "ipfs://bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi".into(),
            bump: 255,
        };
        assert_eq!(ProjectMetadata::decode(&metadata.encode()).unwrap(), metadata);
    }

    #[test]
    fn project_metadata_uri_overrun_is_a_bounds_error() {
        let metadata = ProjectMetadata {
            version: 1,
            owner: Pubkey::new_unique(),
            uri: "https://example.org".into(),
            bump: 255,
        };
        let mut data = metadata.encode();
        // Inflate the declared URI length past the end of the buffer.
        data[41..45].copy_from_slice(&1_000u32.to_le_bytes());
        assert!(matches!(ProjectMetadata::decode(&data), Err(Error::Bounds { .. })));
    }

    #[test]
    fn project_metadata_length_must_include_trailing_bump() {
        let metadata = ProjectMetadata {
            version: 1,
            owner: Pubkey::new_unique(),
            uri: "x".into(),
            bump: 9,
        };
        let mut data = metadata.encode();
        // Declared URI length swallows the bump byte exactly.
        data[41..45].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(ProjectMetadata::decode(&data), Err(Error::Bounds { .. })));
    }
}
