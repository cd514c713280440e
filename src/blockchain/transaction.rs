//! Transaction building and signing.
//!
//! # Responsibilities
//! - Hold the fields of one native-coin transfer
//! - Turn them into an EIP-155 legacy transaction
//! - Sign and encode for `eth_sendRawTransaction`

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{SignedTransaction, VaultError, VaultResult};

/// One transfer from the funding account, built and signed within a single
/// dispense and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    pub to: Address,
    pub value: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub network_id: u64,
}

impl TransactionIntent {
    /// The unsigned legacy transaction for this intent.
    pub fn to_legacy(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.network_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: Bytes::new(),
        }
    }
}

/// Sign `intent` with `signer` and encode it for broadcast.
pub fn sign_intent(
    signer: &PrivateKeySigner,
    intent: &TransactionIntent,
) -> VaultResult<SignedTransaction> {
    let mut tx = intent.to_legacy();
    let signature = signer
        .sign_transaction_sync(&mut tx)
        .map_err(|e| VaultError::Signing(e.to_string()))?;

    let envelope: TxEnvelope = tx.into_signed(signature).into();
    let hash = *envelope.tx_hash();

    Ok(SignedTransaction {
        hash,
        raw: Bytes::from(envelope.encoded_2718()),
        nonce: intent.nonce,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::eips::eip2718::Decodable2718;

    // Anvil's first account; publicly known, test only.
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn intent() -> TransactionIntent {
        TransactionIntent {
            to: Address::repeat_byte(0x11),
            value: U256::from(16888u64),
            nonce: 7,
            gas_limit: 21000,
            gas_price: 1,
            network_id: 16888,
        }
    }

    #[test]
    fn test_legacy_fields() {
        let tx = intent().to_legacy();
        assert_eq!(tx.chain_id, Some(16888));
        assert_eq!(tx.nonce, 7);
        assert_eq!(tx.to, TxKind::Call(Address::repeat_byte(0x11)));
        assert!(tx.input.is_empty());
    }

    #[test]
    fn test_sign_and_decode() {
        let signer: PrivateKeySigner = TEST_PRIVATE_KEY.parse().unwrap();
        let signed = sign_intent(&signer, &intent()).unwrap();
        assert_eq!(signed.nonce, 7);

        let decoded = TxEnvelope::decode_2718(&mut signed.raw.as_ref()).unwrap();
        assert_eq!(*decoded.tx_hash(), signed.hash);

        let legacy = decoded.as_legacy().expect("legacy transaction");
        assert_eq!(legacy.tx().nonce, 7);
        assert_eq!(legacy.tx().chain_id, Some(16888));
        assert_eq!(legacy.tx().value, U256::from(16888u64));
    }
}
