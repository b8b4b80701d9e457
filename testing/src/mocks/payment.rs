//! Mock payment SDK.

use booklane_gateway::{
    BillingDetails, CardDetails, PaymentMethodRef, PaymentProvider, PaymentRejection,
};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct PaymentState {
    scripted: VecDeque<Result<PaymentMethodRef, PaymentRejection>>,
    billing_seen: Vec<BillingDetails>,
}

/// In-memory stand-in for the external payment SDK.
///
/// Ready by default; individual creations can be scripted to reject.
#[derive(Debug, Clone)]
pub struct MockPaymentProvider {
    ready: Arc<AtomicBool>,
    created: Arc<AtomicUsize>,
    state: Arc<Mutex<PaymentState>>,
}

impl MockPaymentProvider {
    /// A ready provider that accepts every card.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(true)),
            created: Arc::new(AtomicUsize::new(0)),
            state: Arc::new(Mutex::new(PaymentState::default())),
        }
    }

    /// A provider whose SDK has not finished initializing.
    #[must_use]
    pub fn not_ready() -> Self {
        let provider = Self::new();
        provider.ready.store(false, Ordering::SeqCst);
        provider
    }

    /// Flip SDK readiness.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Script the next creation to reject.
    pub fn reject_next(&self, rejection: PaymentRejection) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .scripted
            .push_back(Err(rejection));
    }

    /// Number of creation attempts observed.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Billing details passed to each creation attempt.
    #[must_use]
    pub fn billing_seen(&self) -> Vec<BillingDetails> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .billing_seen
            .clone()
    }
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentProvider for MockPaymentProvider {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn create_payment_method(
        &self,
        _card: &CardDetails,
        billing: &BillingDetails,
    ) -> impl Future<Output = Result<PaymentMethodRef, PaymentRejection>> + Send {
        let billing = billing.clone();
        async move {
            let attempt = self.created.fetch_add(1, Ordering::SeqCst) + 1;
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.billing_seen.push(billing);
            state
                .scripted
                .pop_front()
                .unwrap_or_else(|| Ok(PaymentMethodRef(format!("pm-mock-{attempt}"))))
        }
    }
}
