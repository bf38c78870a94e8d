//! Signed transaction construction with greedy coin selection.
//!
//! Coins are selected in ascending `(value, height)` order until the target
//! value is strictly exceeded. The transaction carries a single output; any
//! remainder above the target is left behind as implicit fee (change outputs
//! are out of scope for this protocol).

use tracing::debug;

use obol_core::crypto::{self, KeyPair};
use obol_core::types::{Transaction, TxIn, TxOut, UnspentTxOut};

use crate::error::WalletError;

/// Build a signed transaction paying `value` to `to_addr` out of the given
/// spendable coins.
///
/// Every selected input is signed over the spend message binding it to the
/// output set. Fails with [`WalletError::InsufficientFunds`] when the coins
/// cannot strictly exceed the target.
pub fn build_send_txn(
    utxos: &[UnspentTxOut],
    to_addr: &str,
    value: u64,
    keypair: &KeyPair,
) -> Result<Transaction, WalletError> {
    let mut coins: Vec<&UnspentTxOut> = utxos.iter().collect();
    coins.sort_by_key(|u| (u.value, u.height));

    let mut selected = Vec::new();
    let mut total: u64 = 0;
    for coin in coins {
        selected.push(coin);
        total = total.saturating_add(coin.value);
        if total > value {
            break;
        }
    }

    if total <= value {
        return Err(WalletError::InsufficientFunds {
            have: total,
            need: value,
        });
    }

    let txout = TxOut {
        value,
        to_address: to_addr.to_string(),
    };

    let pubkey = keypair.public_bytes();
    let txins = selected
        .iter()
        .map(|coin| {
            let outpoint = coin.outpoint();
            let message =
                crypto::build_spend_message(&outpoint, &pubkey, 0, std::slice::from_ref(&txout))?;
            Ok(TxIn {
                to_spend: Some(outpoint),
                unlock_sig: keypair.sign(&message),
                unlock_pk: Some(pubkey.clone()),
                sequence: 0,
            })
        })
        .collect::<Result<Vec<_>, WalletError>>()?;

    debug!(
        "built txn spending {} coins across {} inputs ({} implicit fee)",
        total,
        txins.len(),
        total - value
    );

    Ok(Transaction {
        txins,
        txouts: vec![txout],
        locktime: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use obol_core::types::Hash256;

    fn utxo(value: u64, height: i64, byte: u8, addr: &str) -> UnspentTxOut {
        UnspentTxOut {
            value,
            to_address: addr.to_string(),
            txid: Hash256([byte; 32]),
            tx_idx: 0,
            is_coinbase: false,
            height,
        }
    }

    #[test]
    fn selects_smallest_coins_first() {
        let kp = KeyPair::generate();
        let addr = kp.address();
        let utxos = vec![
            utxo(500, 1, 1, &addr),
            utxo(10, 2, 2, &addr),
            utxo(20, 3, 3, &addr),
        ];

        // Needs to exceed 25: selects 10, then 20.
        let txn = build_send_txn(&utxos, "1dest", 25, &kp).unwrap();
        assert_eq!(txn.txins.len(), 2);
        assert_eq!(txn.txouts.len(), 1);
        assert_eq!(txn.txouts[0].value, 25);
        assert_eq!(txn.txouts[0].to_address, "1dest");
    }

    #[test]
    fn breaks_value_ties_by_height() {
        let kp = KeyPair::generate();
        let addr = kp.address();
        let older = utxo(10, 1, 1, &addr);
        let newer = utxo(10, 9, 2, &addr);
        let utxos = vec![newer, older.clone()];

        let txn = build_send_txn(&utxos, "1dest", 5, &kp).unwrap();
        assert_eq!(txn.txins.len(), 1);
        assert_eq!(
            txn.txins[0].to_spend.as_ref().unwrap(),
            &older.outpoint()
        );
    }

    #[test]
    fn exact_total_is_insufficient() {
        // Selection must strictly exceed the target.
        let kp = KeyPair::generate();
        let utxos = vec![utxo(100, 1, 1, &kp.address())];
        assert!(matches!(
            build_send_txn(&utxos, "1dest", 100, &kp),
            Err(WalletError::InsufficientFunds { have: 100, need: 100 })
        ));
    }

    #[test]
    fn empty_wallet_is_insufficient() {
        let kp = KeyPair::generate();
        assert!(matches!(
            build_send_txn(&[], "1dest", 1, &kp),
            Err(WalletError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn inputs_verify_against_owner_address() {
        let kp = KeyPair::generate();
        let addr = kp.address();
        let coin = utxo(100, 1, 1, &addr);
        let txn = build_send_txn(&[coin.clone()], "1dest", 60, &kp).unwrap();

        let txin = &txn.txins[0];
        let pk = txin.unlock_pk.as_deref().unwrap();
        assert_eq!(obol_core::address::pubkey_to_address(pk), addr);

        let message = crypto::build_spend_message(
            txin.to_spend.as_ref().unwrap(),
            pk,
            txin.sequence,
            &txn.txouts,
        )
        .unwrap();
        assert!(crypto::verify_signature(pk, &message, &txin.unlock_sig).is_ok());
    }
}
