//! Wallet adapter: the key-holding side of a session.

use std::path::Path;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signer},
    transaction::Transaction,
};

use crate::error::ClientError;

/// What the app needs from a wallet. The public key is only exposed while
/// connected; a disconnected wallet must refuse to sign.
pub trait WalletAdapter {
    fn connect(&mut self) -> Result<Pubkey, ClientError>;
    fn disconnect(&mut self);
    fn public_key(&self) -> Option<Pubkey>;
    /// Sign `tx` in place against its `recent_blockhash`.
    fn sign_transaction(&self, tx: &mut Transaction) -> Result<(), ClientError>;

    fn is_connected(&self) -> bool {
        self.public_key().is_some()
    }
}

/// Wallet backed by a local keypair file.
#[derive(Default)]
pub struct KeypairWallet {
    keypair: Option<Keypair>,
    connected: bool,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Some(keypair),
            connected: false,
        }
    }

    /// A wallet with no key; `connect` always fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let keypair = read_keypair_file(path).map_err(|e| {
            ClientError::Config(format!(
                "failed to read keypair from {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::new(keypair))
    }
}

impl WalletAdapter for KeypairWallet {
    fn connect(&mut self) -> Result<Pubkey, ClientError> {
        let key = self
            .keypair
            .as_ref()
            .map(|k| k.pubkey())
            .ok_or(ClientError::WalletNotConnected)?;
        self.connected = true;
        Ok(key)
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn public_key(&self) -> Option<Pubkey> {
        if !self.connected {
            return None;
        }
        self.keypair.as_ref().map(|k| k.pubkey())
    }

    fn sign_transaction(&self, tx: &mut Transaction) -> Result<(), ClientError> {
        let keypair = match (&self.keypair, self.connected) {
            (Some(k), true) => k,
            _ => return Err(ClientError::WalletNotConnected),
        };
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[keypair], blockhash)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{hash::Hash, system_instruction};

    #[test]
    fn test_identity_follows_connection() {
        let keypair = Keypair::new();
        let expected = keypair.pubkey();
        let mut wallet = KeypairWallet::new(keypair);

        assert_eq!(wallet.public_key(), None);
        assert_eq!(wallet.connect().unwrap(), expected);
        assert_eq!(wallet.public_key(), Some(expected));
        wallet.disconnect();
        assert!(!wallet.is_connected());
    }

    #[test]
    fn test_empty_wallet_cannot_connect() {
        let mut wallet = KeypairWallet::empty();
        assert_eq!(wallet.connect(), Err(ClientError::WalletNotConnected));
    }

    #[test]
    fn test_signs_only_while_connected() {
        let keypair = Keypair::new();
        let payer = keypair.pubkey();
        let mut wallet = KeypairWallet::new(keypair);
        let ix = system_instruction::transfer(&payer, &Pubkey::new_unique(), 1);
        let mut tx = Transaction::new_with_payer(&[ix], Some(&payer));
        tx.message.recent_blockhash = Hash::new_unique();

        assert_eq!(
            wallet.sign_transaction(&mut tx),
            Err(ClientError::WalletNotConnected)
        );

        wallet.connect().unwrap();
        wallet.sign_transaction(&mut tx).unwrap();
        assert!(tx.is_signed());
    }
}
