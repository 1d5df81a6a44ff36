//! Resolution of the default transaction sender.

use std::str::FromStr;

use alloy_core::primitives::Address;
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};
use anyhow::{Context, Result};

use crate::error::DeployError;

/// The mnemonic Anvil and Hardhat derive their development accounts from.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Where the default sender comes from, in order of precedence.
#[derive(Debug, Clone, Default)]
pub struct SenderSource<'a> {
    pub from: Option<Address>,
    pub private_key: Option<&'a str>,
    pub mnemonic: Option<&'a str>,
    pub mnemonic_index: u32,
}

impl SenderSource<'_> {
    /// The sender address: an explicit address, else the address of the private key,
    /// else the address at `mnemonic_index` of the mnemonic.
    pub fn resolve(&self) -> Result<Address> {
        if let Some(from) = self.from {
            return Ok(from);
        }

        if let Some(private_key) = self.private_key {
            let signer = PrivateKeySigner::from_str(private_key.trim())
                .context("Failed to parse private key")?;
            return Ok(Address::from_slice(signer.address().as_slice()));
        }

        if let Some(phrase) = self.mnemonic {
            let signer = MnemonicBuilder::<English>::default()
                .phrase(phrase.trim())
                .index(self.mnemonic_index)
                .context("Invalid mnemonic derivation index")?
                .build()
                .context("Failed to derive account from mnemonic")?;
            return Ok(Address::from_slice(signer.address().as_slice()));
        }

        Err(DeployError::MissingSender.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;

    const ANVIL_ACCOUNT_0: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

    #[test]
    fn test_explicit_address_wins() {
        let from = address!("00000000000000000000000000000000000000aa");
        let source = SenderSource {
            from: Some(from),
            mnemonic: Some(DEV_MNEMONIC),
            ..Default::default()
        };

        assert_eq!(source.resolve().unwrap(), from);
    }

    #[test]
    fn test_private_key_derivation() {
        let source = SenderSource {
            private_key: Some("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
            ..Default::default()
        };

        assert_eq!(source.resolve().unwrap(), ANVIL_ACCOUNT_0);
    }

    #[test]
    fn test_mnemonic_derivation() {
        let source = SenderSource {
            mnemonic: Some(DEV_MNEMONIC),
            ..Default::default()
        };
        assert_eq!(source.resolve().unwrap(), ANVIL_ACCOUNT_0);

        let source = SenderSource {
            mnemonic: Some(DEV_MNEMONIC),
            mnemonic_index: 1,
            ..Default::default()
        };
        assert_eq!(
            source.resolve().unwrap(),
            address!("70997970c51812dc3a010c7d01b50e0d17dc79c8")
        );
    }

    #[test]
    fn test_missing_sender() {
        let err = SenderSource::default().resolve().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::MissingSender)
        ));
    }

    #[test]
    fn test_invalid_private_key() {
        let source = SenderSource {
            private_key: Some("0x1234"),
            ..Default::default()
        };
        assert!(source.resolve().is_err());
    }
}
