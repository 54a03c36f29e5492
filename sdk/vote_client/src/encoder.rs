//! One-hot ballot encoding and bound encryption.

use std::cell::RefCell;
use std::collections::HashSet;

use tracing::debug;

use crate::address::NetworkId;
use crate::crypto::{BallotBinding, CryptoService, EncryptedBallotMaterial, SigningContext};
use crate::error::VoteError;
use crate::ledger::TransportError;

/// A selection among N options: exactly one entry is 1, the rest are 0.
///
/// Only [`encode_one_hot`] builds one, so the invariant always holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OneHotVector(Vec<u32>);

impl OneHotVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

pub fn encode_one_hot(option_count: usize, selected: usize) -> Result<OneHotVector, VoteError> {
    if selected >= option_count {
        return Err(VoteError::Validation(format!(
            "option index {selected} is out of range for {option_count} options"
        )));
    }
    let mut entries = vec![0; option_count];
    entries[selected] = 1;
    Ok(OneHotVector(entries))
}

/// Requests encryption of one-hot ballots and refuses any material that is
/// not bound to the requested (contract, voter) pair or has been seen before.
pub struct BallotEncoder<'a, C: CryptoService> {
    crypto: &'a C,
    network: NetworkId,
    seen_proofs: RefCell<HashSet<Vec<u8>>>,
}

impl<'a, C: CryptoService> BallotEncoder<'a, C> {
    pub fn new(crypto: &'a C, network: NetworkId) -> Self {
        Self {
            crypto,
            network,
            seen_proofs: RefCell::new(HashSet::new()),
        }
    }

    pub fn encrypt(
        &self,
        binding: &BallotBinding<C::Address>,
        plaintext: &OneHotVector,
        ctx: &SigningContext<C::Address>,
    ) -> Result<EncryptedBallotMaterial<C::Address>, VoteError> {
        if ctx.signer != binding.voter {
            return Err(VoteError::Validation(
                "ballots must be signed by the voter they are bound to".into(),
            ));
        }

        let material = self
            .crypto
            .encrypt_one_hot(binding, plaintext, &self.network, ctx)?;

        if material.binding != *binding {
            return Err(bad_material("bound to a different contract or voter"));
        }
        if material.handles.len() != plaintext.len() {
            return Err(bad_material(&format!(
                "{} handles for {} options",
                material.handles.len(),
                plaintext.len()
            )));
        }
        if material.proof.is_empty() {
            return Err(bad_material("empty input proof"));
        }
        if !self.seen_proofs.borrow_mut().insert(material.proof.clone()) {
            return Err(bad_material("input proof was issued before"));
        }

        debug!(
            network = %self.network,
            handles = material.handles.len(),
            "ballot encrypted"
        );
        Ok(material)
    }
}

fn bad_material(detail: &str) -> VoteError {
    VoteError::Transaction(TransportError::BadResponse(format!(
        "encryption service returned unusable material: {detail}"
    )))
}
