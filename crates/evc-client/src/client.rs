//! EVC API client implementation.

use std::sync::Arc;

use evc_core::{
    classify, Customer, Expectation, Outcome, Payload, PropertyBag, Purchase, Verb,
    MAX_PURCHASE_DAYS, MIN_PURCHASE_DAYS,
};

use crate::config::EvcConfig;
use crate::emulation::EmulatedTransport;
use crate::error::ClientError;
use crate::transport::{HttpTransport, Transport};

const CUSTOMER_EXISTS: Expectation = Expectation::Flag {
    affirmative: "ok: evc customer exists",
    negative: "fail: unknown evc customer",
};

const CUSTOMER_IS_PERSONAL: Expectation = Expectation::Flag {
    affirmative: "ok",
    negative: "fail: this is not a personal customer of you",
};

const CUSTOMER_ADDED: Expectation = Expectation::Sentinel("ok: customer added");

/// EVC reseller-credit API client.
///
/// Every method performs exactly one request. The client holds no state besides
/// its transport, so it can be cloned and shared between tasks freely.
#[derive(Clone)]
pub struct EvcClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for EvcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvcClient").finish_non_exhaustive()
    }
}

impl EvcClient {
    /// Create a client talking to the endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the configuration is incomplete or
    /// the HTTP client cannot be built.
    pub fn new(config: &EvcConfig) -> Result<Self, ClientError> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }

    /// Create a client over a custom transport.
    #[must_use]
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Create a client backed by [`EmulatedTransport`].
    #[must_use]
    pub fn emulated() -> Self {
        Self::with_transport(EmulatedTransport::new())
    }

    /// Does the customer exist in the EVC customer base.
    ///
    /// This does not check whether the customer is a personal customer of the
    /// reseller; see [`EvcClient::is_personal`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers anything but
    /// the two known answers.
    pub async fn exists(&self, customer: i64) -> Result<bool, ClientError> {
        let payload = self
            .call(
                Verb::CheckEvcCustomer,
                vec![("customer", customer.to_string())],
                CUSTOMER_EXISTS,
            )
            .await?;

        expect_flag(payload)
    }

    /// Make an EVC customer a personal customer of the reseller.
    ///
    /// The customer must already exist in the EVC customer base. Making them a
    /// personal customer lets them see the reseller's files and opens a personal
    /// account balance.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Logic`] unless the backend confirms the creation.
    pub async fn create_personal_customer(&self, customer: i64) -> Result<(), ClientError> {
        self.call(
            Verb::AddCustomer,
            vec![("customer", customer.to_string())],
            CUSTOMER_ADDED,
        )
        .await?;

        tracing::info!(customer, "Personal customer created");
        Ok(())
    }

    /// Read the personal account balance of a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not `ok: <integer>`.
    pub async fn check_account(&self, customer: i64) -> Result<i64, ClientError> {
        let payload = self
            .call(
                Verb::GetCustomerAccount,
                vec![("customer", customer.to_string())],
                Expectation::Integer,
            )
            .await?;

        expect_integer(payload)
    }

    /// Overwrite the personal account balance of a customer.
    ///
    /// Prefer [`EvcClient::add_credit`] for adjustments: a purchase made at the same
    /// time would be lost by an overwrite.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not `ok: <integer>`.
    pub async fn set_credit(&self, customer: i64, balance: i64) -> Result<(), ClientError> {
        self.call(
            Verb::SetCustomerAccount,
            vec![
                ("customer", customer.to_string()),
                ("credits", balance.to_string()),
            ],
            Expectation::Integer,
        )
        .await?;

        tracing::info!(customer, balance, "Customer balance set");
        Ok(())
    }

    /// Add credits to (or, with a negative `delta`, remove credits from) a personal
    /// account balance and return the new balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not `ok: <integer>`.
    pub async fn add_credit(&self, customer: i64, delta: i64) -> Result<i64, ClientError> {
        let payload = self
            .call(
                Verb::AddCustomerAccount,
                vec![
                    ("customer", customer.to_string()),
                    ("credits", delta.to_string()),
                ],
                Expectation::Integer,
            )
            .await?;

        let balance = expect_integer(payload)?;
        tracing::info!(customer, delta, balance, "Credits added");
        Ok(balance)
    }

    /// Is the customer a personal customer of the reseller.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers anything but
    /// the two known answers.
    pub async fn is_personal(&self, customer: i64) -> Result<bool, ClientError> {
        let payload = self
            .call(
                Verb::CheckCustomer,
                vec![("customer", customer.to_string())],
                CUSTOMER_IS_PERSONAL,
            )
            .await?;

        expect_flag(payload)
    }

    /// List the personal customers of the reseller.
    ///
    /// Entries without a usable identifier are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a valid JSON list.
    pub async fn get_personal_customers(&self) -> Result<Vec<Customer>, ClientError> {
        let payload = self
            .call(Verb::ListCustomers, Vec::new(), Expectation::Records)
            .await?;

        let bags = expect_records(payload)?;
        let received = bags.len();
        let customers: Vec<Customer> = bags
            .into_iter()
            .map(Customer::from_bag)
            .filter(|c| c.identifier().is_some())
            .collect();

        if customers.len() < received {
            tracing::debug!(
                dropped = received - customers.len(),
                "Dropped customers without identifier"
            );
        }

        Ok(customers)
    }

    /// Purchases performed during the last `days` days (1 to 99).
    ///
    /// When `customer` is given only that customer's purchases are returned; the
    /// filter is applied locally as well, whatever the backend sent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without sending anything when `days` is
    /// out of range, or an error if the request fails or the body is not a valid
    /// JSON list.
    pub async fn get_purchases(
        &self,
        days: i64,
        customer: Option<i64>,
    ) -> Result<Vec<Purchase>, ClientError> {
        if !(MIN_PURCHASE_DAYS..=MAX_PURCHASE_DAYS).contains(&days) {
            return Err(ClientError::Validation(format!(
                "days must be between {MIN_PURCHASE_DAYS} and {MAX_PURCHASE_DAYS}, got {days}"
            )));
        }

        let mut params = vec![("lastdays", days.to_string())];
        if let Some(customer) = customer {
            params.push(("customer", customer.to_string()));
        }

        let payload = self
            .call(Verb::GetRecentPurchases, params, Expectation::Records)
            .await?;

        let purchases = expect_records(payload)?
            .into_iter()
            .map(Purchase::from_bag)
            .filter(|p| customer.map_or(true, |id| p.customer() == Some(id)))
            .collect();

        Ok(purchases)
    }

    /// Send one request and classify the answer.
    async fn call(
        &self,
        verb: Verb,
        mut params: Vec<(&'static str, String)>,
        expectation: Expectation,
    ) -> Result<Payload, ClientError> {
        params.insert(0, ("verb", verb.as_str().to_string()));

        tracing::debug!(%verb, "Sending EVC request");

        let response = match self.transport.send(&params).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%verb, error = %err, "EVC request failed");
                return Err(err);
            }
        };

        let classified = classify(response.status, &response.body, expectation);
        tracing::debug!(
            %verb,
            status = classified.status,
            success = classified.is_success(),
            "EVC response classified"
        );

        match classified.outcome {
            Outcome::Success(payload) => Ok(payload),
            Outcome::LogicFailure(message) => Err(ClientError::Logic(message)),
            Outcome::CredentialFailure(message) => {
                tracing::warn!(%verb, %message, "EVC rejected the credentials");
                Err(ClientError::Credential(message))
            }
            Outcome::NetworkFailure(message) => {
                tracing::warn!(%verb, status = classified.status, "EVC returned an error status");
                Err(ClientError::Network {
                    message,
                    status: Some(classified.status),
                })
            }
        }
    }
}

fn expect_integer(payload: Payload) -> Result<i64, ClientError> {
    match payload {
        Payload::Integer(n) => Ok(n),
        other => Err(unexpected_payload(&other)),
    }
}

fn expect_flag(payload: Payload) -> Result<bool, ClientError> {
    match payload {
        Payload::Flag(flag) => Ok(flag),
        other => Err(unexpected_payload(&other)),
    }
}

fn expect_records(payload: Payload) -> Result<Vec<PropertyBag>, ClientError> {
    match payload {
        Payload::Records(records) => Ok(records),
        other => Err(unexpected_payload(&other)),
    }
}

fn unexpected_payload(payload: &Payload) -> ClientError {
    ClientError::Logic(format!("unexpected payload: {payload:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Params, RawResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replies with a canned response and records what was sent.
    #[derive(Default)]
    struct StubTransport {
        status: u16,
        body: String,
        calls: AtomicUsize,
        last_params: Mutex<Vec<(&'static str, String)>>,
    }

    impl StubTransport {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body: body.to_string(),
                ..Self::default()
            })
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, params: &Params) -> Result<RawResponse, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_params.lock().unwrap() = params.to_vec();
            Ok(RawResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn client(status: u16, body: &str) -> (EvcClient, Arc<StubTransport>) {
        let stub = StubTransport::new(status, body);
        (EvcClient::with_transport(Arc::clone(&stub)), stub)
    }

    fn sent(stub: &StubTransport, key: &str) -> Option<String> {
        stub.last_params
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    }

    #[tokio::test]
    async fn exists_true_and_false() {
        let (c, stub) = client(200, "ok: evc customer exists");
        assert!(c.exists(33333).await.unwrap());
        assert_eq!(sent(&stub, "verb").as_deref(), Some("checkevccustomer"));
        assert_eq!(sent(&stub, "customer").as_deref(), Some("33333"));

        let (c, _) = client(200, "fail: unknown evc customer");
        assert!(!c.exists(33333).await.unwrap());
    }

    #[tokio::test]
    async fn exists_propagates_other_failures() {
        let (c, _) = client(200, "fail: no user authorization");
        assert!(c.exists(33333).await.unwrap_err().is_credential());

        let (c, _) = client(500, "foo bar");
        let err = c.exists(33333).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Network {
                status: Some(500),
                ..
            }
        ));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn create_personal_customer_requires_exact_sentinel() {
        let (c, stub) = client(200, "ok: customer added");
        c.create_personal_customer(22222).await.unwrap();
        assert_eq!(sent(&stub, "verb").as_deref(), Some("addcustomer"));

        let (c, _) = client(200, "ok");
        assert!(c.create_personal_customer(22222).await.unwrap_err().is_logic());

        let (c, _) = client(200, "fail: customer already exists");
        let err = c.create_personal_customer(33333).await.unwrap_err();
        assert!(err.to_string().contains("fail: customer already exists"));
    }

    #[tokio::test]
    async fn check_account_scenarios() {
        let (c, stub) = client(200, "ok: 42");
        assert_eq!(c.check_account(33333).await.unwrap(), 42);
        assert_eq!(sent(&stub, "verb").as_deref(), Some("getcustomeraccount"));

        let (c, _) = client(200, "fail: this is not a personal customer of you");
        let err = c.check_account(11111).await.unwrap_err();
        assert!(err.is_logic());
        assert!(err
            .to_string()
            .contains("fail: this is not a personal customer of you"));
    }

    #[tokio::test]
    async fn check_account_integer_range() {
        let cases = [("ok: -12", -12), ("ok: 0", 0), ("ok: 1234567890", 1_234_567_890)];
        for (body, expected) in cases {
            let (c, _) = client(200, body);
            assert_eq!(c.check_account(33333).await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn add_credit_sends_delta_and_returns_balance() {
        let (c, stub) = client(200, "ok: 62");
        assert_eq!(c.add_credit(33333, 20).await.unwrap(), 62);
        assert_eq!(sent(&stub, "verb").as_deref(), Some("addcustomeraccount"));
        assert_eq!(sent(&stub, "credits").as_deref(), Some("20"));

        let (c, stub) = client(200, "ok: 32");
        c.add_credit(33333, -10).await.unwrap();
        assert_eq!(sent(&stub, "credits").as_deref(), Some("-10"));
    }

    #[tokio::test]
    async fn set_credit_validates_echo() {
        let (c, stub) = client(200, "ok: 100");
        c.set_credit(33333, 100).await.unwrap();
        assert_eq!(sent(&stub, "verb").as_deref(), Some("setcustomeraccount"));
        assert_eq!(sent(&stub, "credits").as_deref(), Some("100"));

        let (c, _) = client(200, "ok: done");
        assert!(c.set_credit(33333, 100).await.unwrap_err().is_logic());
    }

    #[tokio::test]
    async fn is_personal_answers() {
        let (c, stub) = client(200, "ok");
        assert!(c.is_personal(33333).await.unwrap());
        assert_eq!(sent(&stub, "verb").as_deref(), Some("checkcustomer"));

        let (c, _) = client(200, "fail: this is not a personal customer of you");
        assert!(!c.is_personal(22222).await.unwrap());

        let (c, _) = client(200, "ok: yes");
        assert!(c.is_personal(22222).await.unwrap_err().is_logic());

        let (c, _) = client(200, "fail: unknown verb");
        assert!(c.is_personal(22222).await.unwrap_err().is_credential());
    }

    #[tokio::test]
    async fn personal_customers_without_identifier_are_dropped() {
        let body = r#"ok: JSON follows {"data":[{"Customer":1,"Credits":5},{"Credits":7},{"Customer":"x"}]}"#;
        let (c, stub) = client(200, body);
        let customers = c.get_personal_customers().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].identifier(), Some(1));
        assert_eq!(customers[0].credit(), 5);
        assert_eq!(sent(&stub, "verb").as_deref(), Some("listcustomers"));
        assert_eq!(sent(&stub, "customer"), None);
    }

    #[tokio::test]
    async fn purchases_days_out_of_range_never_hit_the_network() {
        let (c, stub) = client(200, r#"ok: JSON follows {"data":[]}"#);
        for days in [-1, 0, 100, 365] {
            let err = c.get_purchases(days, None).await.unwrap_err();
            assert!(err.is_validation(), "days {days}");
        }
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);

        c.get_purchases(1, None).await.unwrap();
        c.get_purchases(99, None).await.unwrap();
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn purchases_are_filtered_locally() {
        let body = concat!(
            r#"ok: JSON follows {"data":["#,
            r#"{"Customer":33333,"Filename":"a"},"#,
            r#"{"Customer":44444,"Filename":"b"},"#,
            r#"{"Customer":"33333","Filename":"c"}"#,
            "]}"
        );
        let (c, stub) = client(200, body);

        let all = c.get_purchases(7, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(sent(&stub, "lastdays").as_deref(), Some("7"));

        let mine = c.get_purchases(7, Some(33333)).await.unwrap();
        assert_eq!(sent(&stub, "customer").as_deref(), Some("33333"));
        let files: Vec<_> = mine.iter().filter_map(Purchase::filename).collect();
        assert_eq!(files, ["a", "c"]);
    }

    #[tokio::test]
    async fn scenario_d_single_purchase() {
        let (c, _) = client(
            200,
            r#"ok: JSON follows {"data":[{"Customer":33333,"Filename":"f"}]}"#,
        );
        let purchases = c.get_purchases(5, None).await.unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].customer(), Some(33333));
        assert_eq!(purchases[0].filename(), Some("f"));
    }

    #[tokio::test]
    async fn credential_failure_on_every_operation() {
        let (c, _) = client(200, "fail: no api authorization");
        assert!(c.exists(1).await.unwrap_err().is_credential());
        assert!(c.create_personal_customer(1).await.unwrap_err().is_credential());
        assert!(c.check_account(1).await.unwrap_err().is_credential());
        assert!(c.add_credit(1, 1).await.unwrap_err().is_credential());
        assert!(c.set_credit(1, 1).await.unwrap_err().is_credential());
        assert!(c.is_personal(1).await.unwrap_err().is_credential());
        assert!(c.get_personal_customers().await.unwrap_err().is_credential());
        assert!(c.get_purchases(1, None).await.unwrap_err().is_credential());
    }

    #[tokio::test]
    async fn network_failure_on_every_operation() {
        let (c, _) = client(500, "ok: 42");
        let results = [
            c.exists(1).await.map(|_| ()),
            c.create_personal_customer(1).await,
            c.check_account(1).await.map(|_| ()),
            c.add_credit(1, 1).await.map(|_| ()),
            c.set_credit(1, 1).await,
            c.is_personal(1).await.map(|_| ()),
            c.get_personal_customers().await.map(|_| ()),
            c.get_purchases(1, None).await.map(|_| ()),
        ];
        for result in results {
            let err = result.unwrap_err();
            assert!(err.is_network());
            assert!(err.to_string().contains("500"));
        }
    }

    #[tokio::test]
    async fn same_payload_yields_equal_records() {
        let body = r#"ok: JSON follows {"data":[{"Customer":1,"Filename":"f","Extra":[1,2]}]}"#;
        let (c, _) = client(200, body);
        let first = c.get_purchases(3, None).await.unwrap();
        let second = c.get_purchases(3, None).await.unwrap();
        assert_eq!(first, second);
    }
}
