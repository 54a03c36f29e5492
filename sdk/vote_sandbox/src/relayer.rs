//! `CryptoService` backed by the mock FHE executor.

use std::cell::Cell;
use std::collections::HashMap;

use fhe_executor::{ExecutorError, FheExecutorClient};
use soroban_sdk::{Address, Env, Vec as SorobanVec};
use tracing::debug;

use vote_client::{
    BallotBinding, CipherHandle, CryptoService, EncryptedBallotMaterial, NetworkId, OneHotVector,
    RevertReason, SigningContext, TransportError,
};

use crate::convert::{from_handles, settle, to_handles};

/// Encrypts ballots and serves decryption for one network.
pub struct MockRelayer {
    executor: FheExecutorClient<'static>,
    network: NetworkId,
    encryptions: Cell<usize>,
    decryptions: Cell<usize>,
}

impl MockRelayer {
    pub fn new(env: &Env, executor: &Address, network: NetworkId) -> Self {
        Self {
            executor: FheExecutorClient::new(env, executor),
            network,
            encryptions: Cell::new(0),
            decryptions: Cell::new(0),
        }
    }

    pub fn encryptions(&self) -> usize {
        self.encryptions.get()
    }

    pub fn decryptions(&self) -> usize {
        self.decryptions.get()
    }

    fn serve(&self, network: &NetworkId) -> Result<(), TransportError> {
        if *network != self.network {
            return Err(TransportError::Unreachable(format!(
                "relayer serves `{}`, not `{network}`",
                self.network
            )));
        }
        Ok(())
    }
}

fn executor_revert(err: ExecutorError) -> RevertReason {
    RevertReason::Code(err as u32)
}

impl CryptoService for MockRelayer {
    type Address = Address;

    fn encrypt_one_hot(
        &self,
        binding: &BallotBinding<Address>,
        plaintext: &OneHotVector,
        network: &NetworkId,
        _ctx: &SigningContext<Address>,
    ) -> Result<EncryptedBallotMaterial<Address>, TransportError> {
        self.serve(network)?;
        self.encryptions.set(self.encryptions.get() + 1);

        let env = &self.executor.env;
        let mut values = SorobanVec::new(env);
        for entry in plaintext.as_slice() {
            values.push_back(u64::from(*entry));
        }

        let input = settle(
            self.executor
                .try_encrypt_input(&binding.contract, &binding.voter, &values),
            executor_revert,
        )?;
        debug!(handles = input.handles.len(), "input encrypted");

        Ok(EncryptedBallotMaterial {
            binding: binding.clone(),
            handles: to_handles(&input.handles),
            proof: input.proof.to_array().to_vec(),
        })
    }

    fn decrypt_aggregate(
        &self,
        contract: &Address,
        handles: &[CipherHandle],
        requester: &Address,
        network: &NetworkId,
        _ctx: &SigningContext<Address>,
    ) -> Result<HashMap<CipherHandle, u64>, TransportError> {
        self.serve(network)?;
        self.decryptions.set(self.decryptions.get() + 1);

        let batch = from_handles(&self.executor.env, handles);
        let values = match self.executor.try_decrypt(contract, &batch, requester) {
            Err(Ok(ExecutorError::NotAllowed)) => {
                return Err(TransportError::AccessDenied(
                    "requester may not decrypt these handles".into(),
                ))
            }
            outcome => settle(outcome, executor_revert)?,
        };

        if values.len() as usize != handles.len() {
            return Err(TransportError::BadResponse(format!(
                "{} values for {} handles",
                values.len(),
                handles.len()
            )));
        }
        Ok(handles.iter().copied().zip(values.iter()).collect())
    }
}
