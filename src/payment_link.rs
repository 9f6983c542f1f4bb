use crate::error::{Error, Result};
use url::{form_urlencoded, Url};

pub const DEMO_BASE_URL: &str = "https://intg-kryptonim.devone.cc/iframe-form";
pub const DEMO_AMOUNT: &str = "0.5";
pub const DEMO_CURRENCY: &str = "USDC";

pub const PARAM_KEY_AMOUNT: &str = "amount";
pub const PARAM_KEY_CURRENCY: &str = "currency";

pub type PaymentParam<'a> = (&'static str, &'a str);

/// Configuration of a link into the hosted payment form.
///
/// Built fresh for every payment attempt and turned into a [`Url`] with
/// [`PaymentLink::to_url`].
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentLink {
    base: Url,
    amount: Option<String>,
    currency: Option<String>,
}

impl PaymentLink {
    pub fn new(base: &str) -> Result<PaymentLink> {
        let base = Url::parse(base).map_err(|source| Error::InvalidBaseUrl {
            input: base.to_string(),
            source,
        })?;

        Ok(PaymentLink {
            base,
            amount: None,
            currency: None,
        })
    }

    /// The link the demo opens: half a USDC on the integration environment.
    pub fn demo() -> Result<PaymentLink> {
        Ok(PaymentLink::new(DEMO_BASE_URL)?
            .with_amount(DEMO_AMOUNT)
            .with_currency(DEMO_CURRENCY))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn set_amount<T: ToString>(&mut self, amount: Option<T>) {
        self.amount = amount.map(|a| a.to_string());
    }

    pub fn with_amount<T: ToString>(mut self, amount: T) -> Self {
        self.set_amount(Some(amount));
        self
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn set_currency<T: ToString>(&mut self, currency: Option<T>) {
        self.currency = currency.map(|c| c.to_string());
    }

    pub fn with_currency<T: ToString>(mut self, currency: T) -> Self {
        self.set_currency(Some(currency));
        self
    }

    /// Query parameters that have a value, always in `amount`, `currency` order.
    pub fn query_params(&self) -> impl Iterator<Item = PaymentParam<'_>> {
        let params = vec![
            (PARAM_KEY_AMOUNT, &self.amount),
            (PARAM_KEY_CURRENCY, &self.currency),
        ];

        params
            .into_iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
    }

    pub fn to_url(&self) -> Url {
        let mut url = self.base.clone();
        let query: Vec<String> = self
            .query_params()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect();

        // the base keeps its own query only when there is nothing to replace it with
        if !query.is_empty() {
            url.set_query(Some(&query.join("&")));
        }

        tracing::debug!(url = %url, "built payment link");
        url
    }
}

/// Percent-encodes a query name or value, spaces included (`%20`, not `+`).
fn encode_component(input: &str) -> String {
    // a literal '+' is serialized as %2B, so every '+' left is a space
    form_urlencoded::byte_serialize(input.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
