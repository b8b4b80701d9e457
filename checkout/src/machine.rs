//! Checkout state machine.

use crate::error::CheckoutError;
use crate::form::{CheckoutForm, FormField};
use booklane_commerce::Cart;
use booklane_gateway::{CardDetails, CommerceGateway, OrderRequest, PaymentProvider};
use std::collections::BTreeMap;

/// Flat shipping charge, in minor currency units.
pub const SHIPPING_FLAT: u64 = 499;

/// Tax rate applied to the subtotal, in percent.
pub const TAX_RATE_PERCENT: u64 = 10;

/// Computed totals for the frozen cart snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Sum of line totals
    pub subtotal: u64,
    /// Flat shipping charge
    pub shipping: u64,
    /// Tax on the subtotal
    pub tax: u64,
    /// Grand total
    pub total: u64,
}

impl Totals {
    fn from_subtotal(subtotal: u64) -> Self {
        let tax = subtotal * TAX_RATE_PERCENT / 100;
        Self {
            subtotal,
            shipping: SHIPPING_FLAT,
            tax,
            total: subtotal + SHIPPING_FLAT + tax,
        }
    }
}

/// Stage a payment attempt failed in, as surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// The payment SDK was not ready
    PaymentSdk,
    /// Payment-method creation was rejected
    PaymentMethod,
    /// Order placement was rejected or unreachable
    Order,
}

impl FailureStage {
    /// Stage identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PaymentSdk => "payment-sdk",
            Self::PaymentMethod => "payment-method",
            Self::Order => "order",
        }
    }
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current stage of the checkout session.
///
/// No stage is skipped on the way to `Succeeded`, and nothing is
/// re-entered once it is reached. `Failed` is reachable from every
/// non-terminal stage and resubmission re-enters `Validating` from the
/// current form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStage {
    /// Waiting for submission
    Idle,
    /// Checking required fields
    Validating,
    /// Waiting on the payment SDK
    CreatingPaymentMethod,
    /// Waiting on the commerce backend
    PlacingOrder,
    /// Order accepted
    Succeeded,
    /// A step failed
    Failed {
        /// Which step failed
        stage: FailureStage,
        /// Why
        reason: String,
    },
}

/// One checkout session.
///
/// Created when the checkout view is entered with a non-empty cart and
/// discarded on success or navigation away. The cart snapshot and the
/// idempotency key are fixed at creation; the commerce store is never
/// touched - clearing the cart after success is the caller's decision.
pub struct CheckoutMachine<G, P>
where
    G: CommerceGateway,
    P: PaymentProvider,
{
    gateway: G,
    payments: P,
    token: String,
    form: CheckoutForm,
    validation_errors: BTreeMap<FormField, String>,
    stage: CheckoutStage,
    snapshot: Cart,
    totals: Totals,
    idempotency_key: String,
}

impl<G, P> CheckoutMachine<G, P>
where
    G: CommerceGateway,
    P: PaymentProvider,
{
    /// Open a checkout session over a frozen cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when the snapshot has no
    /// lines.
    pub fn new(gateway: G, payments: P, token: String, snapshot: Cart) -> Result<Self, CheckoutError> {
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let totals = Totals::from_subtotal(snapshot.subtotal());
        Ok(Self {
            gateway,
            payments,
            token,
            form: CheckoutForm::default(),
            validation_errors: BTreeMap::new(),
            stage: CheckoutStage::Idle,
            snapshot,
            totals,
            idempotency_key: uuid::Uuid::new_v4().to_string(),
        })
    }

    /// The form, for rendering.
    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// The form, for editing between submissions.
    pub fn form_mut(&mut self) -> &mut CheckoutForm {
        &mut self.form
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> &CheckoutStage {
        &self.stage
    }

    /// Field errors from the last validation pass.
    #[must_use]
    pub const fn validation_errors(&self) -> &BTreeMap<FormField, String> {
        &self.validation_errors
    }

    /// The frozen cart snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &Cart {
        &self.snapshot
    }

    /// Totals computed from the snapshot at entry.
    #[must_use]
    pub const fn totals(&self) -> &Totals {
        &self.totals
    }

    /// This session's order deduplication key, stable across retries.
    #[must_use]
    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    /// Drive the machine through validation, payment-method creation, and
    /// order placement.
    ///
    /// Each remote step is a single suspension point with one success and
    /// one failure edge. On any failure the form keeps its values; from
    /// `Failed` a resubmission re-enters `Validating`.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::AlreadyCompleted`] after a success
    /// - [`CheckoutError::ValidationFailed`] with the blank fields
    /// - [`CheckoutError::PaymentSdkNotReady`] before SDK initialization
    /// - [`CheckoutError::PaymentRejected`] on card rejection
    /// - [`CheckoutError::OrderPlacementFailed`] on backend rejection
    #[tracing::instrument(skip_all, fields(idempotency_key = %self.idempotency_key))]
    pub async fn submit(&mut self, card: &CardDetails) -> Result<(), CheckoutError> {
        if self.stage == CheckoutStage::Succeeded {
            return Err(CheckoutError::AlreadyCompleted);
        }

        self.stage = CheckoutStage::Validating;
        let errors = self.form.validate();
        if !errors.is_empty() {
            let fields: Vec<FormField> = errors.keys().copied().collect();
            tracing::debug!(?fields, "validation failed, returning to idle");
            self.validation_errors = errors;
            self.stage = CheckoutStage::Idle;
            return Err(CheckoutError::ValidationFailed { fields });
        }
        self.validation_errors.clear();

        if !self.payments.is_ready() {
            self.fail(FailureStage::PaymentSdk, "not-ready");
            return Err(CheckoutError::PaymentSdkNotReady);
        }

        self.stage = CheckoutStage::CreatingPaymentMethod;
        let billing = self.form.billing_details();
        let payment_method = match self.payments.create_payment_method(card, &billing).await {
            Ok(reference) => reference,
            Err(rejection) => {
                self.fail(FailureStage::PaymentMethod, &rejection.message);
                return Err(rejection.into());
            },
        };

        self.stage = CheckoutStage::PlacingOrder;
        let order = OrderRequest {
            shipping_address: self.form.shipping_address(),
            payment_method: payment_method.0,
            idempotency_key: self.idempotency_key.clone(),
        };
        if let Err(error) = self.gateway.place_order(&self.token, &order).await {
            self.fail(FailureStage::Order, &error.to_string());
            return Err(error.into());
        }

        tracing::info!("checkout succeeded");
        self.stage = CheckoutStage::Succeeded;
        Ok(())
    }

    fn fail(&mut self, stage: FailureStage, reason: &str) {
        tracing::warn!(stage = %stage, reason, "checkout step failed");
        self.stage = CheckoutStage::Failed {
            stage,
            reason: reason.to_owned(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booklane_gateway::{GatewayError, PaymentRejection};
    use booklane_testing::fixtures;
    use booklane_testing::mocks::{GatewayOp, MockCommerceGateway, MockPaymentProvider};

    fn snapshot() -> Cart {
        let mut cart = Cart::new();
        cart.apply_delta(&booklane_gateway::ProductId::from("b1"), 2, 450);
        cart.apply_delta(&booklane_gateway::ProductId::from("b2"), 1, 100);
        cart
    }

    fn machine(
        gateway: &MockCommerceGateway,
        payments: &MockPaymentProvider,
    ) -> CheckoutMachine<MockCommerceGateway, MockPaymentProvider> {
        CheckoutMachine::new(
            gateway.clone(),
            payments.clone(),
            "test-token".to_owned(),
            snapshot(),
        )
        .expect("non-empty snapshot")
    }

    fn fill_form(machine: &mut CheckoutMachine<MockCommerceGateway, MockPaymentProvider>) {
        *machine.form_mut() = CheckoutForm {
            first_name: "Jo".into(),
            last_name: "March".into(),
            email: "jo@example.com".into(),
            address: "1 Orchard House".into(),
            city: "Concord".into(),
            zip_code: "01742".into(),
            country: "US".into(),
        };
    }

    #[test]
    fn empty_cart_is_rejected_at_entry() {
        let result = CheckoutMachine::new(
            MockCommerceGateway::new(),
            MockPaymentProvider::new(),
            "test-token".to_owned(),
            Cart::new(),
        );
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn totals_are_computed_from_the_snapshot() {
        let machine = machine(&MockCommerceGateway::new(), &MockPaymentProvider::new());
        let totals = machine.totals();
        assert_eq!(totals.subtotal, 1000);
        assert_eq!(totals.shipping, 499);
        assert_eq!(totals.tax, 100);
        assert_eq!(totals.total, 1599);
    }

    #[tokio::test]
    async fn happy_path_walks_every_stage_to_succeeded() {
        let gateway = MockCommerceGateway::new();
        let payments = MockPaymentProvider::new();
        let mut machine = machine(&gateway, &payments);
        fill_form(&mut machine);

        machine.submit(&fixtures::card()).await.expect("checkout");

        assert_eq!(*machine.stage(), CheckoutStage::Succeeded);
        assert_eq!(payments.created_count(), 1);
        assert_eq!(payments.billing_seen()[0].name, "Jo March");
        let orders = gateway.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].idempotency_key, machine.idempotency_key());
        assert_eq!(orders[0].shipping_address.city, "Concord");
    }

    #[tokio::test]
    async fn blank_fields_never_reach_payment_method_creation() {
        let gateway = MockCommerceGateway::new();
        let payments = MockPaymentProvider::new();
        let mut machine = machine(&gateway, &payments);
        fill_form(&mut machine);
        machine.form_mut().email = String::new();
        machine.form_mut().city = String::new();

        let error = machine.submit(&fixtures::card()).await.expect_err("blank");

        match error {
            CheckoutError::ValidationFailed { fields } => {
                assert_eq!(fields, vec![FormField::Email, FormField::City]);
            },
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*machine.stage(), CheckoutStage::Idle);
        let errors = machine.validation_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key(&FormField::Email));
        assert!(errors.contains_key(&FormField::City));
        assert_eq!(payments.created_count(), 0);
        assert_eq!(gateway.request_count(GatewayOp::PlaceOrder), 0);
    }

    #[tokio::test]
    async fn sdk_not_ready_fails_before_creating_payment_method() {
        let gateway = MockCommerceGateway::new();
        let payments = MockPaymentProvider::not_ready();
        let mut machine = machine(&gateway, &payments);
        fill_form(&mut machine);

        let error = machine.submit(&fixtures::card()).await.expect_err("sdk");

        assert!(matches!(error, CheckoutError::PaymentSdkNotReady));
        assert_eq!(
            *machine.stage(),
            CheckoutStage::Failed {
                stage: FailureStage::PaymentSdk,
                reason: "not-ready".to_owned(),
            }
        );
        assert_eq!(payments.created_count(), 0);
    }

    #[tokio::test]
    async fn card_rejection_keeps_the_form_editable_for_retry() {
        let gateway = MockCommerceGateway::new();
        let payments = MockPaymentProvider::new();
        payments.reject_next(PaymentRejection::new("card declined"));
        let mut machine = machine(&gateway, &payments);
        fill_form(&mut machine);

        let error = machine.submit(&fixtures::card()).await.expect_err("declined");
        assert!(matches!(error, CheckoutError::PaymentRejected(_)));
        assert_eq!(
            *machine.stage(),
            CheckoutStage::Failed {
                stage: FailureStage::PaymentMethod,
                reason: "card declined".to_owned(),
            }
        );
        assert_eq!(machine.form().email, "jo@example.com");
        assert_eq!(gateway.request_count(GatewayOp::PlaceOrder), 0);

        // Retry with corrected card details goes through.
        machine.submit(&fixtures::card()).await.expect("retry");
        assert_eq!(*machine.stage(), CheckoutStage::Succeeded);
    }

    #[tokio::test]
    async fn order_failure_after_successful_payment_keeps_cart_and_form() {
        let gateway = MockCommerceGateway::new();
        gateway.fail_next(
            GatewayOp::PlaceOrder,
            GatewayError::ApiError {
                status: 500,
                message: "order service down".to_owned(),
            },
        );
        let payments = MockPaymentProvider::new();
        let mut machine = machine(&gateway, &payments);
        fill_form(&mut machine);

        let error = machine.submit(&fixtures::card()).await.expect_err("order");

        assert!(matches!(error, CheckoutError::OrderPlacementFailed(_)));
        assert!(matches!(
            machine.stage(),
            CheckoutStage::Failed {
                stage: FailureStage::Order,
                ..
            }
        ));
        // Payment method was created but no order recorded - the partial-
        // failure gap the idempotency key exists for.
        assert_eq!(payments.created_count(), 1);
        assert!(gateway.orders().is_empty());
        assert!(!machine.snapshot().is_empty());
        assert_eq!(machine.form().email, "jo@example.com");
    }

    #[tokio::test]
    async fn retry_after_order_failure_reuses_the_idempotency_key() {
        let gateway = MockCommerceGateway::new();
        gateway.fail_next(
            GatewayOp::PlaceOrder,
            GatewayError::Timeout,
        );
        let payments = MockPaymentProvider::new();
        let mut machine = machine(&gateway, &payments);
        fill_form(&mut machine);

        let key_before = machine.idempotency_key().to_owned();
        let _ = machine.submit(&fixtures::card()).await.expect_err("timeout");

        machine.submit(&fixtures::card()).await.expect("retry");
        assert_eq!(machine.idempotency_key(), key_before);
        let orders = gateway.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].idempotency_key, key_before);
    }

    #[tokio::test]
    async fn nothing_is_re_entered_after_succeeded() {
        let gateway = MockCommerceGateway::new();
        let payments = MockPaymentProvider::new();
        let mut machine = machine(&gateway, &payments);
        fill_form(&mut machine);

        machine.submit(&fixtures::card()).await.expect("checkout");
        let error = machine.submit(&fixtures::card()).await.expect_err("again");

        assert!(matches!(error, CheckoutError::AlreadyCompleted));
        assert_eq!(gateway.request_count(GatewayOp::PlaceOrder), 1);
    }
}
