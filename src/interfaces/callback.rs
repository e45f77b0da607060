//! The inbound payment-callback URL contract.
//!
//! The OS can hand a redirect URL to either of the app's two entry points;
//! both route the raw string through `parse_callback` so the contract is
//! enforced in exactly one place. A URL is only this subsystem's concern
//! when both the scheme and the host token match.

use crate::domain::order::PaymentReference;
use crate::domain::session::SessionId;
use crate::error::{CheckoutError, Result};
use url::Url;

/// URL scheme the OS registers for this app's payment redirects.
pub const CALLBACK_SCHEME: &str = "canteen";
/// Host token designating a payment-status callback.
pub const CALLBACK_HOST: &str = "payment-status";

const PARAM_SESSION: &str = "session_id";
const PARAM_STATUS: &str = "status";
const PARAM_PAYMENT: &str = "payment_id";

const STATUS_SUCCESS: &str = "success";
const STATUS_FAILURE: &str = "failure";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Success { payment_reference: PaymentReference },
    Failure,
}

/// A validated payment callback: which session it belongs to and how the
/// provider says the payment ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCallback {
    pub session_id: SessionId,
    pub outcome: CallbackOutcome,
}

/// Parses an inbound deep-link URL against the payment-callback contract.
///
/// Returns `Ok(None)` when the URL is not a payment callback at all (wrong
/// scheme or host); such URLs belong to other parts of the app and must not
/// produce side effects here. Fails with `MalformedCallback` when the URL
/// claims to be a payment callback but required parameters are missing or
/// invalid; a successful outcome must carry the settlement id.
pub fn parse_callback(raw: &str) -> Result<Option<PaymentCallback>> {
    let url = match Url::parse(raw.trim()) {
        Ok(url) => url,
        Err(err) => {
            let claims_contract = raw
                .trim_start()
                .to_ascii_lowercase()
                .starts_with(&format!("{CALLBACK_SCHEME}://"));
            return if claims_contract {
                Err(CheckoutError::MalformedCallback(err.to_string()))
            } else {
                Ok(None)
            };
        }
    };

    if url.scheme() != CALLBACK_SCHEME || url.host_str() != Some(CALLBACK_HOST) {
        return Ok(None);
    }

    let mut session_id = None;
    let mut status = None;
    let mut payment_id = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            PARAM_SESSION => session_id = Some(value.into_owned()),
            PARAM_STATUS => status = Some(value.into_owned()),
            PARAM_PAYMENT => payment_id = Some(value.into_owned()),
            _ => {}
        }
    }

    let session_id = session_id.ok_or_else(|| {
        CheckoutError::MalformedCallback(format!("missing '{PARAM_SESSION}' parameter"))
    })?;
    let session_id: SessionId = session_id.parse().map_err(|_| {
        CheckoutError::MalformedCallback(format!(
            "'{PARAM_SESSION}' is not a valid correlation id"
        ))
    })?;

    let outcome = match status.as_deref() {
        Some(STATUS_SUCCESS) => {
            let payment_id = payment_id.ok_or_else(|| {
                CheckoutError::MalformedCallback(format!(
                    "successful callback is missing '{PARAM_PAYMENT}'"
                ))
            })?;
            let payment_reference = PaymentReference::new(payment_id)
                .map_err(|err| CheckoutError::MalformedCallback(err.to_string()))?;
            CallbackOutcome::Success { payment_reference }
        }
        Some(STATUS_FAILURE) => CallbackOutcome::Failure,
        Some(other) => {
            return Err(CheckoutError::MalformedCallback(format!(
                "unknown status '{other}'"
            )));
        }
        None => {
            return Err(CheckoutError::MalformedCallback(format!(
                "missing '{PARAM_STATUS}' parameter"
            )));
        }
    };

    Ok(Some(PaymentCallback {
        session_id,
        outcome,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionId {
        SessionId::generate()
    }

    #[test]
    fn test_parses_successful_callback() {
        let id = session();
        let url = format!(
            "canteen://payment-status?session_id={id}&status=success&payment_id=pay_abc"
        );

        let callback = parse_callback(&url).unwrap().unwrap();
        assert_eq!(callback.session_id, id);
        assert_eq!(
            callback.outcome,
            CallbackOutcome::Success {
                payment_reference: PaymentReference::new("pay_abc").unwrap()
            }
        );
    }

    #[test]
    fn test_parses_failed_callback_without_payment_id() {
        let id = session();
        let url = format!("canteen://payment-status?session_id={id}&status=failure");

        let callback = parse_callback(&url).unwrap().unwrap();
        assert_eq!(callback.outcome, CallbackOutcome::Failure);
    }

    #[test]
    fn test_foreign_scheme_and_host_are_not_ours() {
        let id = session();
        for url in [
            format!("https://payment-status?session_id={id}&status=success&payment_id=p"),
            format!("othershop://payment-status?session_id={id}&status=success&payment_id=p"),
            format!("canteen://menu?session_id={id}&status=success&payment_id=p"),
            "notaurl".to_string(),
        ] {
            assert!(parse_callback(&url).unwrap().is_none(), "{url}");
        }
    }

    #[test]
    fn test_missing_parameters_are_malformed() {
        let id = session();
        for url in [
            "canteen://payment-status".to_string(),
            format!("canteen://payment-status?session_id={id}"),
            format!("canteen://payment-status?session_id={id}&status=success"),
            "canteen://payment-status?status=success&payment_id=p".to_string(),
        ] {
            assert!(
                matches!(
                    parse_callback(&url),
                    Err(CheckoutError::MalformedCallback(_))
                ),
                "{url}"
            );
        }
    }

    #[test]
    fn test_invalid_session_id_is_malformed() {
        let url = "canteen://payment-status?session_id=not-a-uuid&status=success&payment_id=p";
        assert!(matches!(
            parse_callback(url),
            Err(CheckoutError::MalformedCallback(_))
        ));
    }

    #[test]
    fn test_unknown_status_is_malformed() {
        let id = session();
        let url = format!("canteen://payment-status?session_id={id}&status=pending");
        assert!(matches!(
            parse_callback(&url),
            Err(CheckoutError::MalformedCallback(_))
        ));
    }
}
