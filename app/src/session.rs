use solana_sdk::pubkey::Pubkey;

use crate::client::ChainClient;
use crate::rpc::StakingRpc;
use crate::wallet::WalletAdapter;

/// Chain client plus the wallet it signs with. The client is absent when the
/// deployment is not configured; views then render a "not configured" state.
pub struct Session<R, W> {
    client: Option<ChainClient<R>>,
    wallet: W,
}

impl<R: StakingRpc, W: WalletAdapter> Session<R, W> {
    pub fn new(client: Option<ChainClient<R>>, wallet: W) -> Self {
        Self { client, wallet }
    }

    pub fn client(&self) -> Option<&ChainClient<R>> {
        self.client.as_ref()
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn wallet_mut(&mut self) -> &mut W {
        &mut self.wallet
    }

    /// Connected wallet address.
    pub fn address(&self) -> Option<Pubkey> {
        self.wallet.public_key()
    }
}
