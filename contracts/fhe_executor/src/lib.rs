#![no_std]
//! Mock FHE coprocessor.
//!
//! Ciphertexts are represented by opaque 32-byte handles. The executor keeps
//! the plaintext behind every handle in its own storage so that homomorphic
//! operations and threshold decryption can be emulated deterministically in a
//! sandbox. Only the access-control surface is meant to be realistic:
//!
//! - Encrypted input is bound to one `(contract, user)` pair and its proof can
//!   be spent exactly once.
//! - A contract may only operate on handles it has been granted.
//! - Decryption requires the handle to be public, or granted to both the
//!   consuming contract and the requester.

pub mod events;

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, xdr::ToXdr, Address, Bytes, BytesN,
    Env, Vec,
};

// ── TTL constants ───────────────────────────────────────────────────────────

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

/// Upper bound on the number of values in a single encrypted input.
pub const MAX_INPUT_VALUES: u32 = 16;

// ── Storage keys ────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
enum DataKey {
    Nonce,
    Plaintext(BytesN<32>),
    Binding(BytesN<32>),
    Allowed(BytesN<32>, Address),
    Public(BytesN<32>),
}

// ── Public types ────────────────────────────────────────────────────────────

/// Ciphertext handles plus the proof that binds them to a contract and user.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedInput {
    pub handles: Vec<BytesN<32>>,
    pub proof: BytesN<32>,
}

/// Stored per input proof.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputBinding {
    pub contract: Address,
    pub user: Address,
    pub handles: Vec<BytesN<32>>,
    pub spent: bool,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ExecutorError {
    UnknownHandle = 1,
    UnknownProof = 2,
    ProofAlreadySpent = 3,
    BindingMismatch = 4,
    NotAllowed = 5,
    Overflow = 6,
    InvalidInput = 7,
    NotOneHot = 8,
}

// ── Contract ────────────────────────────────────────────────────────────────

#[contract]
pub struct FheExecutor;

#[contractimpl]
impl FheExecutor {
    // ── Input ───────────────────────────────────────────────────────────────

    /// Encrypt `values` for consumption by `contract` on behalf of `user`.
    ///
    /// Every call yields fresh handles and a fresh proof, even for identical
    /// plaintexts.
    pub fn encrypt_input(
        env: Env,
        contract: Address,
        user: Address,
        values: Vec<u64>,
    ) -> Result<EncryptedInput, ExecutorError> {
        user.require_auth();
        if values.is_empty() || values.len() > MAX_INPUT_VALUES {
            return Err(ExecutorError::InvalidInput);
        }

        let mut salt = Bytes::new(&env);
        salt.append(&contract.clone().to_xdr(&env));
        salt.append(&user.clone().to_xdr(&env));

        let mut handles: Vec<BytesN<32>> = Vec::new(&env);
        for value in values.iter() {
            let handle = Self::fresh_handle(&env, &salt)?;
            Self::store_plaintext(&env, &handle, value);
            handles.push_back(handle);
        }

        let proof = Self::input_proof(&env, &salt, &handles);
        let binding = InputBinding {
            contract: contract.clone(),
            user: user.clone(),
            handles: handles.clone(),
            spent: false,
        };
        Self::store(&env, &DataKey::Binding(proof.clone()), &binding);

        events::publish_input_registered(&env, contract, user, proof.clone(), handles.len());

        Ok(EncryptedInput { handles, proof })
    }

    /// Consume an input proof on behalf of `contract`.
    ///
    /// Succeeds once per proof. On success `contract` is granted every handle
    /// carried by the input.
    pub fn verify_input(
        env: Env,
        contract: Address,
        user: Address,
        handles: Vec<BytesN<32>>,
        proof: BytesN<32>,
    ) -> Result<(), ExecutorError> {
        Self::spend_input(&env, contract, user, handles, proof, false)
    }

    /// Like [`verify_input`](Self::verify_input), but also proves the input
    /// is one-hot: every value is 0 or 1 and exactly one is 1. The proof is
    /// left unspent when the check fails.
    pub fn verify_one_hot(
        env: Env,
        contract: Address,
        user: Address,
        handles: Vec<BytesN<32>>,
        proof: BytesN<32>,
    ) -> Result<(), ExecutorError> {
        Self::spend_input(&env, contract, user, handles, proof, true)
    }

    // ── Homomorphic operations ──────────────────────────────────────────────

    /// Encrypt a public constant for `contract`.
    pub fn trivial_encrypt(
        env: Env,
        contract: Address,
        value: u64,
    ) -> Result<BytesN<32>, ExecutorError> {
        contract.require_auth();
        let salt = contract.clone().to_xdr(&env);
        let handle = Self::fresh_handle(&env, &salt)?;
        Self::store_plaintext(&env, &handle, value);
        Self::grant(&env, &handle, &contract);
        Ok(handle)
    }

    /// Homomorphic addition. Both operands must be granted to `contract`.
    pub fn add(
        env: Env,
        contract: Address,
        lhs: BytesN<32>,
        rhs: BytesN<32>,
    ) -> Result<BytesN<32>, ExecutorError> {
        contract.require_auth();
        Self::require_allowed(&env, &lhs, &contract)?;
        Self::require_allowed(&env, &rhs, &contract)?;

        let sum = Self::plaintext(&env, &lhs)?
            .checked_add(Self::plaintext(&env, &rhs)?)
            .ok_or(ExecutorError::Overflow)?;

        let salt = contract.clone().to_xdr(&env);
        let handle = Self::fresh_handle(&env, &salt)?;
        Self::store_plaintext(&env, &handle, sum);
        Self::grant(&env, &handle, &contract);
        Ok(handle)
    }

    // ── Access control ──────────────────────────────────────────────────────

    /// Share a handle `contract` holds with `account`.
    pub fn allow(
        env: Env,
        contract: Address,
        handle: BytesN<32>,
        account: Address,
    ) -> Result<(), ExecutorError> {
        contract.require_auth();
        Self::require_allowed(&env, &handle, &contract)?;
        Self::grant(&env, &handle, &account);
        Ok(())
    }

    /// Make a handle `contract` holds decryptable by anyone.
    pub fn make_public(env: Env, contract: Address, handle: BytesN<32>) -> Result<(), ExecutorError> {
        contract.require_auth();
        Self::require_allowed(&env, &handle, &contract)?;
        Self::store(&env, &DataKey::Public(handle.clone()), &true);
        events::publish_handle_published(&env, contract, handle);
        Ok(())
    }

    pub fn is_allowed(env: Env, handle: BytesN<32>, account: Address) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Allowed(handle, account))
    }

    pub fn is_public(env: Env, handle: BytesN<32>) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::Public(handle))
            .unwrap_or(false)
    }

    // ── Decryption ──────────────────────────────────────────────────────────

    /// Threshold-decryption stand-in.
    ///
    /// Values are returned in the order of `handles`. The whole batch fails
    /// if any single handle is not decryptable by `requester`.
    pub fn decrypt(
        env: Env,
        contract: Address,
        handles: Vec<BytesN<32>>,
        requester: Address,
    ) -> Result<Vec<u64>, ExecutorError> {
        requester.require_auth();

        let mut values: Vec<u64> = Vec::new(&env);
        for handle in handles.iter() {
            let value = Self::plaintext(&env, &handle)?;
            let public = Self::is_public(env.clone(), handle.clone());
            let granted = Self::is_allowed(env.clone(), handle.clone(), contract.clone())
                && Self::is_allowed(env.clone(), handle.clone(), requester.clone());
            if !public && !granted {
                return Err(ExecutorError::NotAllowed);
            }
            values.push_back(value);
        }

        events::publish_decryption_served(&env, contract, requester, handles.len());
        Ok(values)
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    fn spend_input(
        env: &Env,
        contract: Address,
        user: Address,
        handles: Vec<BytesN<32>>,
        proof: BytesN<32>,
        one_hot: bool,
    ) -> Result<(), ExecutorError> {
        contract.require_auth();

        let key = DataKey::Binding(proof.clone());
        let mut binding: InputBinding = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(ExecutorError::UnknownProof)?;

        if binding.spent {
            return Err(ExecutorError::ProofAlreadySpent);
        }
        if binding.contract != contract || binding.user != user || binding.handles != handles {
            return Err(ExecutorError::BindingMismatch);
        }
        if one_hot {
            Self::require_one_hot(env, &handles)?;
        }

        binding.spent = true;
        Self::store(env, &key, &binding);
        for handle in handles.iter() {
            Self::grant(env, &handle, &contract);
        }

        events::publish_input_spent(env, contract, user, proof);
        Ok(())
    }

    fn require_one_hot(env: &Env, handles: &Vec<BytesN<32>>) -> Result<(), ExecutorError> {
        let mut ones = 0u32;
        for handle in handles.iter() {
            match Self::plaintext(env, &handle)? {
                0 => {}
                1 => ones += 1,
                _ => return Err(ExecutorError::NotOneHot),
            }
        }
        if ones != 1 {
            return Err(ExecutorError::NotOneHot);
        }
        Ok(())
    }

    fn fresh_handle(env: &Env, salt: &Bytes) -> Result<BytesN<32>, ExecutorError> {
        let nonce: u64 = env.storage().instance().get(&DataKey::Nonce).unwrap_or(0);
        let next = nonce.checked_add(1).ok_or(ExecutorError::Overflow)?;
        env.storage().instance().set(&DataKey::Nonce, &next);
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);

        let mut buf = Bytes::from_slice(env, b"fhe-handle");
        buf.extend_from_array(&nonce.to_be_bytes());
        buf.append(salt);
        Ok(env.crypto().sha256(&buf).into())
    }

    fn input_proof(env: &Env, salt: &Bytes, handles: &Vec<BytesN<32>>) -> BytesN<32> {
        let mut buf = Bytes::from_slice(env, b"fhe-input");
        buf.append(salt);
        for handle in handles.iter() {
            buf.extend_from_array(&handle.to_array());
        }
        env.crypto().sha256(&buf).into()
    }

    fn plaintext(env: &Env, handle: &BytesN<32>) -> Result<u64, ExecutorError> {
        env.storage()
            .persistent()
            .get(&DataKey::Plaintext(handle.clone()))
            .ok_or(ExecutorError::UnknownHandle)
    }

    fn store_plaintext(env: &Env, handle: &BytesN<32>, value: u64) {
        Self::store(env, &DataKey::Plaintext(handle.clone()), &value);
    }

    fn grant(env: &Env, handle: &BytesN<32>, account: &Address) {
        Self::store(env, &DataKey::Allowed(handle.clone(), account.clone()), &true);
    }

    fn require_allowed(
        env: &Env,
        handle: &BytesN<32>,
        account: &Address,
    ) -> Result<(), ExecutorError> {
        Self::plaintext(env, handle)?;
        if !Self::is_allowed(env.clone(), handle.clone(), account.clone()) {
            return Err(ExecutorError::NotAllowed);
        }
        Ok(())
    }

    fn store<V>(env: &Env, key: &DataKey, value: &V)
    where
        V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
    {
        env.storage().persistent().set(key, value);
        env.storage()
            .persistent()
            .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}
