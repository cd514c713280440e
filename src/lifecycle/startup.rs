//! Startup orchestration.
//!
//! # Order
//! 1. Convert the configured amount (a bad amount or unit stops here)
//! 2. Find the funding account in the vault (no key material is fatal)
//! 3. Unlock it
//! 4. Read the network id, falling back to the configured default
//! 5. Read the funding account's nonce baseline
//! 6. Hand back the pipeline and balance query, ready to serve

use std::sync::Arc;

use crate::blockchain::gateway::{ChainGateway, KeyVault};
use crate::config::FaucetConfig;
use crate::faucet::{
    parse_address, BalanceQuery, DispensePipeline, FaucetError, FaucetSession, Fallbacks,
    PassphraseSource,
};
use crate::units::{format_amount, to_smallest_unit, Denomination};

/// Everything the HTTP layer needs.
pub struct FaucetServices {
    pub session: Arc<FaucetSession>,
    pub pipeline: Arc<DispensePipeline>,
    pub balances: Arc<BalanceQuery>,
}

/// Build the faucet services from `config`, failing fast on anything fatal.
pub async fn bootstrap(
    config: &FaucetConfig,
    gateway: Arc<dyn ChainGateway>,
    vault: Arc<dyn KeyVault>,
    passphrase: Arc<dyn PassphraseSource>,
) -> Result<FaucetServices, FaucetError> {
    let denomination: Denomination = config.faucet.unit.parse()?;
    let amount = to_smallest_unit(&config.faucet.amount, denomination)?;
    let funding = parse_address(&config.faucet.from)?;
    let fallbacks = Fallbacks::from(&config.chain);

    if vault.list_accounts().await?.is_empty() {
        return Err(FaucetError::WalletEmpty);
    }
    let account = vault.find_account(funding).await?;

    let network_id = fallbacks.network_id(gateway.network_id().await);
    let session = Arc::new(FaucetSession::new(
        funding,
        amount,
        denomination,
        network_id,
        passphrase,
    ));

    session.ensure_unlocked(vault.as_ref(), &account).await?;
    session.nonces().ensure_ready(gateway.as_ref(), funding).await?;

    tracing::info!(
        from = %funding,
        amount = %format_amount(amount, Some(denomination)),
        network_id = network_id.0,
        nonce = session.nonces().current(),
        "Faucet ready"
    );

    let pipeline = Arc::new(DispensePipeline::new(
        gateway.clone(),
        vault,
        session.clone(),
        fallbacks,
    ));
    let balances = Arc::new(BalanceQuery::new(gateway));

    Ok(FaucetServices {
        session,
        pipeline,
        balances,
    })
}
