//! The encryption and decryption service surface.

use std::collections::HashMap;
use std::fmt;

use crate::address::NetworkId;
use crate::encoder::OneHotVector;
use crate::ledger::{CipherHandle, TransportError};

/// The (contract, voter) pair an encrypted input is bound to. Material
/// produced under one binding is rejected under any other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BallotBinding<A> {
    pub contract: A,
    pub voter: A,
}

/// Output of one encryption request. Single use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedBallotMaterial<A> {
    /// Binding the service reports it encrypted under.
    pub binding: BallotBinding<A>,
    /// One handle per option, in option order.
    pub handles: Vec<CipherHandle>,
    pub proof: Vec<u8>,
}

/// Who is signing requests in this session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningContext<A> {
    pub signer: A,
}

impl<A> SigningContext<A> {
    pub fn new(signer: A) -> Self {
        Self { signer }
    }
}

pub trait CryptoService {
    type Address: Clone + fmt::Debug + PartialEq;

    /// Encrypt `plaintext` bound to `binding`. Every call must return fresh
    /// handles and a fresh proof.
    fn encrypt_one_hot(
        &self,
        binding: &BallotBinding<Self::Address>,
        plaintext: &OneHotVector,
        network: &NetworkId,
        ctx: &SigningContext<Self::Address>,
    ) -> Result<EncryptedBallotMaterial<Self::Address>, TransportError>;

    /// Decrypt a batch of handles on behalf of `requester`.
    fn decrypt_aggregate(
        &self,
        contract: &Self::Address,
        handles: &[CipherHandle],
        requester: &Self::Address,
        network: &NetworkId,
        ctx: &SigningContext<Self::Address>,
    ) -> Result<HashMap<CipherHandle, u64>, TransportError>;
}
