//! Conversions between Soroban host values and `vote_client` types.

use soroban_sdk::{Address, BytesN, Env, InvokeError, String as SorobanString, Vec as SorobanVec};
use vote_client::{CipherHandle, RevertReason, Topic, TopicId, TransportError, Visibility};

use privacy_vote::VoteError as HubError;

pub fn to_std_string(value: &SorobanString) -> String {
    let mut buf = vec![0u8; value.len() as usize];
    value.copy_into_slice(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn to_handle(bytes: &BytesN<32>) -> CipherHandle {
    CipherHandle::from_bytes(bytes.to_array())
}

pub fn to_handles(values: &SorobanVec<BytesN<32>>) -> Vec<CipherHandle> {
    values.iter().map(|bytes| to_handle(&bytes)).collect()
}

pub fn from_handles(env: &Env, handles: &[CipherHandle]) -> SorobanVec<BytesN<32>> {
    let mut out = SorobanVec::new(env);
    for handle in handles {
        out.push_back(BytesN::from_array(env, &handle.to_bytes()));
    }
    out
}

/// Input proofs are 32-byte digests on this ledger.
pub fn proof_bytes(env: &Env, proof: &[u8]) -> Result<BytesN<32>, TransportError> {
    let array: [u8; 32] = proof
        .try_into()
        .map_err(|_| TransportError::BadResponse(format!("input proof has {} bytes", proof.len())))?;
    Ok(BytesN::from_array(env, &array))
}

pub fn visibility_to_hub(visibility: Visibility) -> privacy_vote::Visibility {
    match visibility {
        Visibility::Private => privacy_vote::Visibility::Private,
        Visibility::Public => privacy_vote::Visibility::Public,
    }
}

pub fn topic_from_hub(id: TopicId, topic: privacy_vote::Topic) -> Topic<Address> {
    Topic {
        id,
        name: to_std_string(&topic.name),
        details: to_std_string(&topic.details),
        options: topic.options.iter().map(|label| to_std_string(&label)).collect(),
        open_at: topic.open_at,
        close_at: topic.close_at,
        published: topic.published,
        owner: topic.owner,
        visibility: match topic.visibility {
            privacy_vote::Visibility::Private => Visibility::Private,
            privacy_vote::Visibility::Public => Visibility::Public,
        },
    }
}

pub fn hub_revert(err: HubError) -> RevertReason {
    match err {
        HubError::AlreadyVoted => RevertReason::DuplicateSubmission,
        HubError::TopicNotFound => RevertReason::TopicNotFound,
        HubError::TopicNotOpen | HubError::TopicNotClosed => RevertReason::OutsideWindow,
        HubError::BallotLengthMismatch => RevertReason::MalformedBallot,
        HubError::InvalidInputProof => RevertReason::InvalidProof,
        HubError::Unauthorized => RevertReason::Unauthorized,
        HubError::InvalidName | HubError::InvalidOptions | HubError::InvalidWindow => {
            RevertReason::InvalidTopic
        }
        other => RevertReason::Code(other as u32),
    }
}

/// Flatten the nested result of a generated `try_*` client call.
pub fn settle<T, C, E>(
    outcome: Result<Result<T, C>, Result<E, InvokeError>>,
    revert: impl FnOnce(E) -> RevertReason,
) -> Result<T, TransportError>
where
    C: core::fmt::Debug,
{
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(TransportError::BadResponse(format!("{err:?}"))),
        Err(Ok(err)) => Err(TransportError::Reverted(revert(err))),
        Err(Err(err)) => Err(TransportError::Reverted(RevertReason::Aborted(format!(
            "{err:?}"
        )))),
    }
}

/// Contract functions that cannot fail still report host errors.
pub fn host_revert(err: soroban_sdk::Error) -> RevertReason {
    RevertReason::Aborted(format!("{err:?}"))
}
