//! Transaction types and the coinstake shape rule.
//!
//! Transactions are the `bitcoin` crate's; X1 only adds the structural test
//! that recognises a proof-of-stake reward transaction.

pub use bitcoin::{
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
    locktime::absolute::LockTime, transaction::Version,
};

/// Number of outputs a coinstake transaction carries.
pub const COINSTAKE_OUTPUT_COUNT: usize = 3;

/// Returns true if `tx` has the shape of a coinstake transaction.
///
/// A coinstake spends at least one real previous output, has exactly three
/// outputs, and its first output is the empty marker: zero value and an
/// empty script.
pub fn is_coinstake(tx: &Transaction) -> bool {
    let spends_output = tx
        .input
        .first()
        .is_some_and(|input| !input.previous_output.is_null());

    spends_output
        && tx.output.len() == COINSTAKE_OUTPUT_COUNT
        && tx.output.first().is_some_and(is_empty_output)
}

fn is_empty_output(output: &TxOut) -> bool {
    output.value == Amount::ZERO && output.script_pubkey.is_empty()
}
