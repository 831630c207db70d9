//! Offline stand-in for the EVC backend.
//!
//! [`EmulatedTransport`] answers every verb from fixed fixtures without any network
//! access, which makes it usable for local development and for tests of code that
//! depends on [`EvcClient`](crate::EvcClient).
//!
//! | Customer | Behaviour |
//! |----------|-----------|
//! | `33333`, `44444` | personal customers, balance 42 |
//! | `22222` | EVC customer, not personal |
//! | `11111` and others | unknown to EVC |
//! | `55555` | transport failure |
//! | `66666` | `fail: no user authorization` |
//! | `77777` | `fail: emulated logic failure` |

use async_trait::async_trait;
use evc_core::Verb;

use crate::error::ClientError;
use crate::transport::{Params, RawResponse, Transport};

/// Balance of every emulated personal customer.
pub const EMULATED_BALANCE: i64 = 42;

const NOT_PERSONAL: &str = "fail: this is not a personal customer of you";

/// Body of `listcustomers`.
pub const CUSTOMERS_FIXTURE: &str = concat!(
    r#"ok: JSON follows {"data":["#,
    r#"{"Customer":33333,"Credits":42,"Name":"Workshop One"},"#,
    r#"{"Customer":44444,"Credits":42,"Name":"Workshop Two"}"#,
    "]}"
);

/// Body of `getrecentpurchases`.
pub const PURCHASES_FIXTURE: &str = concat!(
    r#"ok: JSON follows {"data":["#,
    r#"{"Customer":33333,"Filename":"stage1.bin","ComputerName":"WS-01","IP":"192.0.2.10","#,
    r#""Manufacturer":"Audi","Series":"A4","Build":"2015","Model":"2.0 TDI","#,
    r#""Characteristic":"150hp","Output":"110kW","Project type":"Stage 1","#,
    r#""Ecu Manufacturer":"Bosch","Ecu Build":"EDC17C64","ECU_Nr_ECU":"03L906018","#,
    r#""ECU_Nr_Prod":"0281017","Software":"1037","SoftwareVersion":"541","#,
    r#""Date":"2019-12-30T10:20:30"},"#,
    r#"{"Customer":44444,"Filename":"egr-off.bin","ComputerName":"WS-02","IP":"192.0.2.11","#,
    r#""Manufacturer":"BMW","Series":"3","Build":"2012","Model":"320d","#,
    r#""Date":"2019-12-31T08:00:00","Status":"done"},"#,
    r#"{"Customer":33333,"Filename":"dpf-off.bin","Date":"not a date"}"#,
    "]}"
);

/// A transport that never leaves the process.
#[derive(Debug, Clone, Default)]
pub struct EmulatedTransport;

impl EmulatedTransport {
    /// Create an emulated transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for EmulatedTransport {
    async fn send(&self, params: &Params) -> Result<RawResponse, ClientError> {
        let Some(verb) = param(params, "verb") else {
            return Ok(RawResponse::ok("fail: no verb"));
        };

        let customer = param(params, "customer")
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);
        let credits = param(params, "credits")
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);

        match customer {
            55555 => {
                return Err(ClientError::Network {
                    message: "emulated transport failure for customer 55555".into(),
                    status: None,
                })
            }
            66666 => return Ok(RawResponse::ok("fail: no user authorization")),
            77777 => return Ok(RawResponse::ok("fail: emulated logic failure")),
            _ => {}
        }

        let body = match verb.parse::<Verb>() {
            Ok(verb) => answer(verb, customer, credits),
            Err(_) => "fail: unknown verb".to_string(),
        };

        Ok(RawResponse::ok(body))
    }
}

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.as_str())
}

const fn is_personal(customer: i64) -> bool {
    matches!(customer, 33333 | 44444)
}

fn answer(verb: Verb, customer: i64, credits: i64) -> String {
    let personal = is_personal(customer);

    match verb {
        Verb::AddCustomer => match customer {
            22222 => "ok: customer added".into(),
            33333 | 44444 => "fail: customer already exists".into(),
            _ => "fail: unknown customer".into(),
        },
        Verb::AddCustomerAccount if personal => format!("ok: {}", EMULATED_BALANCE + credits),
        Verb::SetCustomerAccount if personal => format!("ok: {credits}"),
        Verb::GetCustomerAccount if personal => format!("ok: {EMULATED_BALANCE}"),
        Verb::CheckCustomer if personal => "ok".into(),
        Verb::AddCustomerAccount
        | Verb::SetCustomerAccount
        | Verb::GetCustomerAccount
        | Verb::CheckCustomer => NOT_PERSONAL.into(),
        Verb::CheckEvcCustomer => match customer {
            22222 | 33333 | 44444 => "ok: evc customer exists".into(),
            _ => "fail: unknown evc customer".into(),
        },
        Verb::ListCustomers => CUSTOMERS_FIXTURE.into(),
        Verb::GetRecentPurchases => PURCHASES_FIXTURE.into(),
    }
}
