#![allow(dead_code)]

use topcoat_core::keygen::run_keygen;
use topcoat_core::sign::run_sign;
use topcoat_core::transport::async_trait;
use topcoat_core::{
    KeyPair, MemoryTransport, Message, Outcome, ParameterSet, Result, Signature, Transport,
};

/// Memory endpoint that rewrites every outgoing message
pub struct TamperingTransport<F> {
    inner: MemoryTransport,
    tamper: F,
}

impl<F> TamperingTransport<F>
where
    F: Fn(Message) -> Message + Send + Sync,
{
    pub fn new(inner: MemoryTransport, tamper: F) -> Self {
        Self { inner, tamper }
    }
}

#[async_trait]
impl<F> Transport for TamperingTransport<F>
where
    F: Fn(Message) -> Message + Send + Sync,
{
    async fn send(&self, message: &Message) -> Result<()> {
        self.inner.send(&(self.tamper)(message.clone())).await
    }

    async fn receive(&self) -> Result<Message> {
        self.inner.receive().await
    }
}

pub async fn keygen_pair(params: &ParameterSet) -> (KeyPair, KeyPair) {
    let (alice, bob) = MemoryTransport::pair();
    let (a, b) = tokio::join!(
        run_keygen(params, &alice, "alice"),
        run_keygen(params, &bob, "bob"),
    );
    (
        a.unwrap().completed().expect("alice keygen completes"),
        b.unwrap().completed().expect("bob keygen completes"),
    )
}

pub async fn sign_pair(
    params: &ParameterSet,
    alice_keys: &KeyPair,
    bob_keys: &KeyPair,
    message: &[u8],
) -> (Signature, Signature) {
    let (alice, bob) = MemoryTransport::pair();
    let (a, b) = tokio::join!(
        run_sign(
            params,
            &alice,
            &alice_keys.public_key,
            &alice_keys.share,
            message,
            "alice"
        ),
        run_sign(
            params,
            &bob,
            &bob_keys.public_key,
            &bob_keys.share,
            message,
            "bob"
        ),
    );
    (
        a.unwrap().completed().expect("alice signing completes"),
        b.unwrap().completed().expect("bob signing completes"),
    )
}

pub fn aborted<T>(outcome: Result<Outcome<T>>) -> topcoat_core::AbortReason {
    outcome
        .unwrap()
        .abort_reason()
        .expect("protocol should abort")
}
