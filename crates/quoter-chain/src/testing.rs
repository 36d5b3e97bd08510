//! In-memory chain for tests.

use crate::{ChainError, ChainInterface};
use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct State {
	responses: HashMap<(Address, [u8; 4]), Result<Bytes, ChainError>>,
	calls: HashMap<Address, usize>,
	latency: Option<Duration>,
}

/// Scripted [`ChainInterface`] that records the calls it receives.
///
/// Clones share state, so a test can keep a handle after boxing one copy
/// into a `ChainService`.
#[derive(Clone, Default)]
pub struct MockChain {
	block_number: Arc<AtomicU64>,
	block_number_calls: Arc<AtomicU64>,
	state: Arc<Mutex<State>>,
}

impl MockChain {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_block_number(&self, block: u64) {
		self.block_number.store(block, Ordering::SeqCst);
	}

	pub fn set_latency(&self, latency: Duration) {
		self.state.lock().unwrap().latency = Some(latency);
	}

	/// Scripts the result of calls to `to` whose calldata starts with `selector`.
	pub fn respond(&self, to: Address, selector: [u8; 4], result: Result<Bytes, ChainError>) {
		self.state
			.lock()
			.unwrap()
			.responses
			.insert((to, selector), result);
	}

	pub fn block_number_calls(&self) -> u64 {
		self.block_number_calls.load(Ordering::SeqCst)
	}

	pub fn calls_to(&self, to: Address) -> usize {
		self.state
			.lock()
			.unwrap()
			.calls
			.get(&to)
			.copied()
			.unwrap_or_default()
	}

	pub fn total_calls(&self) -> usize {
		self.state.lock().unwrap().calls.values().sum()
	}

	async fn delay(&self) {
		let latency = self.state.lock().unwrap().latency;
		if let Some(latency) = latency {
			tokio::time::sleep(latency).await;
		}
	}
}

#[async_trait]
impl ChainInterface for MockChain {
	async fn block_number(&self) -> Result<u64, ChainError> {
		self.block_number_calls.fetch_add(1, Ordering::SeqCst);
		self.delay().await;
		Ok(self.block_number.load(Ordering::SeqCst))
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
		let response = {
			let mut state = self.state.lock().unwrap();
			*state.calls.entry(to).or_default() += 1;
			let selector: [u8; 4] = data
				.get(..4)
				.and_then(|s| s.try_into().ok())
				.unwrap_or_default();
			state.responses.get(&(to, selector)).cloned()
		};
		self.delay().await;
		response.unwrap_or_else(|| Err(ChainError::Call(format!("no response scripted for {}", to))))
	}
}
