//! Nonce allocation for the funding account.
//!
//! # States
//! ```text
//! Uninitialized → Ready: first chain query adopted as the baseline
//! ```
//!
//! `allocate` is one atomic read-increment and never touches the network.
//! `observe` only ever raises the counter, so a lagging node reporting a
//! lower nonce cannot make an allocated value come around again.

use alloy::primitives::Address;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::blockchain::gateway::ChainGateway;
use crate::blockchain::types::{GatewayError, GatewayResult};
use crate::observability::metrics;

/// Allocator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceState {
    Uninitialized,
    Ready,
}

/// Errors from the allocator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NonceError {
    #[error("nonce allocator used before its baseline was read from the chain")]
    Uninitialized,
}

/// Hands out strictly increasing nonces for one account.
#[derive(Debug, Default)]
pub struct NonceAllocator {
    next: AtomicU64,
    ready: OnceCell<()>,
}

impl NonceAllocator {
    /// An allocator that still needs its chain baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator that starts at `baseline` without asking the chain.
    pub fn with_baseline(baseline: u64) -> Self {
        Self {
            next: AtomicU64::new(baseline),
            ready: OnceCell::new_with(Some(())),
        }
    }

    pub fn state(&self) -> NonceState {
        if self.ready.initialized() {
            NonceState::Ready
        } else {
            NonceState::Uninitialized
        }
    }

    /// Read the baseline for `address` from the chain on first call.
    ///
    /// Concurrent callers wait for the single in-flight query. A failed query
    /// leaves the allocator uninitialized so the next caller retries.
    pub async fn ensure_ready(
        &self,
        gateway: &dyn ChainGateway,
        address: Address,
    ) -> GatewayResult<()> {
        self.ready
            .get_or_try_init(|| async {
                let baseline = gateway.nonce_at(address).await?;
                let next = self.observe(baseline);
                tracing::info!(address = %address, nonce = next, "Nonce allocator ready");
                Ok::<(), GatewayError>(())
            })
            .await
            .map(|_| ())
    }

    /// Raise the counter to `chain_nonce` if the chain is ahead.
    ///
    /// Returns the counter after the update.
    pub fn observe(&self, chain_nonce: u64) -> u64 {
        let previous = self.next.fetch_max(chain_nonce, Ordering::SeqCst);
        if chain_nonce > previous {
            tracing::debug!(from = previous, to = chain_nonce, "Nonce baseline raised by chain");
            metrics::record_next_nonce(chain_nonce);
        }
        previous.max(chain_nonce)
    }

    /// Take the next nonce.
    pub fn allocate(&self) -> Result<u64, NonceError> {
        if self.state() != NonceState::Ready {
            return Err(NonceError::Uninitialized);
        }
        let nonce = self.next.fetch_add(1, Ordering::SeqCst);
        metrics::record_next_nonce(nonce + 1);
        Ok(nonce)
    }

    /// Next value `allocate` would return.
    pub fn current(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_uninitialized_refuses_allocation() {
        let allocator = NonceAllocator::new();
        assert_eq!(allocator.state(), NonceState::Uninitialized);
        assert_eq!(allocator.allocate(), Err(NonceError::Uninitialized));
    }

    #[test]
    fn test_sequential_allocation() {
        let allocator = NonceAllocator::with_baseline(5);
        assert_eq!(allocator.state(), NonceState::Ready);
        assert_eq!(allocator.allocate(), Ok(5));
        assert_eq!(allocator.allocate(), Ok(6));
        assert_eq!(allocator.current(), 7);
    }

    #[test]
    fn test_observe_only_raises() {
        let allocator = NonceAllocator::with_baseline(10);
        assert_eq!(allocator.observe(3), 10);
        assert_eq!(allocator.allocate(), Ok(10));

        assert_eq!(allocator.observe(50), 50);
        assert_eq!(allocator.allocate(), Ok(50));

        // Node lagging behind what was already handed out.
        allocator.observe(50);
        assert_eq!(allocator.allocate(), Ok(51));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allocation_is_gapless() {
        let allocator = Arc::new(NonceAllocator::with_baseline(100));
        let mut handles = Vec::new();
        for _ in 0..64 {
            let allocator = allocator.clone();
            handles.push(tokio::spawn(async move {
                let mut taken = Vec::new();
                for _ in 0..16 {
                    taken.push(allocator.allocate().unwrap());
                    tokio::task::yield_now().await;
                }
                taken
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for nonce in handle.await.unwrap() {
                assert!(seen.insert(nonce), "nonce {nonce} handed out twice");
            }
        }
        let expected: HashSet<u64> = (100..100 + 64 * 16).collect();
        assert_eq!(seen, expected);
    }
}
