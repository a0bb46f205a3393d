//! The Amazon Pay client: retry-governed dispatch of signed requests.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use log::debug;
use serde_json::Value;

use crate::config::{Config, Session};
use crate::constants::*;
use crate::hash::hex_sha256;
use crate::http::{HttpSend, ReqwestHttpSend};
use crate::request::{canonical_query, canonical_request_string, prepare_headers, validate_method};
use crate::signer::Signer;
use crate::time::{format_pay_date, now};
use crate::{Error, Result};

/// Client for the Amazon Pay v2 API.
///
/// Holds the immutable [`Session`] and the [`Signer`]; every call builds its
/// own request-scoped canonical request and signature, so one client can be
/// shared freely across concurrent callers.
///
/// Non-2xx responses are returned for inspection, never raised; errors are
/// reserved for configuration, signing, and exhausted transport failures.
#[derive(Debug, Clone)]
pub struct Client {
    session: Session,
    signer: Signer,
    http: Arc<dyn HttpSend>,
}

impl Client {
    /// Create a new client from the given configuration.
    ///
    /// Fails if required config keys are missing, the region is unknown, or
    /// the private key PEM cannot be parsed.
    pub fn new(config: &Config) -> Result<Self> {
        let session = Session::resolve(config)?;
        let signer = Signer::new(session.private_key(), session.public_key_id())?;

        Ok(Self {
            session,
            signer,
            http: Arc::new(ReqwestHttpSend::default()),
        })
    }

    /// Replace the HTTP transport implementation.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// The resolved session context.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Perform a signed API call.
    ///
    /// Rebuilds the timestamp, canonical request and signature from scratch
    /// on every attempt. Responses with a status in the retryable set and
    /// transport failures are retried with backoff delays of 1s, 2s and 4s;
    /// both paths consume the slot indexed by the pre-increment retry count.
    /// Once the budget of 3 retries is exhausted, the last error response is
    /// returned as-is while the last transport failure is returned as an
    /// error.
    pub async fn api_call(
        &self,
        url_fragment: &str,
        method: Method,
        payload: Option<&Value>,
        headers: &HeaderMap,
        query_params: &[(String, String)],
    ) -> Result<http::Response<Bytes>> {
        validate_method(&method)?;

        let query = canonical_query(query_params);
        let uri = self.build_uri(url_fragment, &query)?;
        let host = uri
            .host()
            .ok_or_else(|| Error::request_invalid("request URI has no host"))?
            .to_string();
        let body = match payload {
            Some(v) => Bytes::from(serde_json::to_vec(v)?),
            None => Bytes::new(),
        };

        let mut retries = 0;
        loop {
            let req = self.build_signed_request(&method, &uri, &host, &query, headers, &body)?;

            match self.http.http_send(req).await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if RETRYABLE_STATUS_CODES.contains(&status) && retries < MAX_RETRIES {
                        let delay = BACKOFF_DELAYS[retries];
                        debug!(
                            "retryable status {status}, backing off {delay:?} before retry {}",
                            retries + 1
                        );
                        tokio::time::sleep(delay).await;
                        retries += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(e) => {
                    if retries < MAX_RETRIES {
                        let delay = BACKOFF_DELAYS[retries];
                        debug!(
                            "transport failure: {e}, backing off {delay:?} before retry {}",
                            retries + 1
                        );
                        tokio::time::sleep(delay).await;
                        retries += 1;
                        continue;
                    }
                    return Err(Error::transport_failed(format!(
                        "request failed after {} attempts",
                        retries + 1
                    ))
                    .with_source(e));
                }
            }
        }
    }

    /// Build one fully signed HTTP request. Fresh timestamp, canonical
    /// request and signature on every call.
    fn build_signed_request(
        &self,
        method: &Method,
        uri: &Uri,
        host: &str,
        query: &str,
        user_headers: &HeaderMap,
        body: &Bytes,
    ) -> Result<http::Request<Bytes>> {
        let timestamp = format_pay_date(now());
        let canonical_headers =
            prepare_headers(&self.session, host, user_headers, body, &timestamp)?;

        let canonical_request = canonical_request_string(
            method,
            uri.path(),
            query,
            &canonical_headers,
            &hex_sha256(body),
        );
        debug!("calculated canonical request: {canonical_request}");

        let signed_headers = self
            .signer
            .sign_headers(&canonical_request, &canonical_headers)?;
        let mut authorization =
            HeaderValue::from_str(&self.signer.authorization_header(&signed_headers))?;
        authorization.set_sensitive(true);

        let mut builder = http::Request::builder()
            .method(method.clone())
            .uri(uri.clone());
        for (k, v) in &canonical_headers {
            builder = builder.header(HeaderName::try_from(k.as_str())?, HeaderValue::from_str(v)?);
        }
        builder = builder.header(HEADER_AUTHORIZATION, authorization);

        Ok(builder.body(body.clone())?)
    }

    fn build_uri(&self, url_fragment: &str, query: &str) -> Result<Uri> {
        let mut s = format!("{}{url_fragment}", self.session.base_url());
        if !query.is_empty() {
            s.push('?');
            s.push_str(query);
        }
        Ok(s.parse()?)
    }

    /// Generate a signature for an Amazon Pay button payload supplied as a
    /// raw JSON string. The string is signed as-is.
    pub fn generate_button_signature(&self, payload: &str) -> Result<String> {
        self.signer.sign(payload)
    }

    /// Generate a signature for an Amazon Pay button payload, serializing
    /// the value to JSON before signing.
    pub fn generate_button_signature_from_json(&self, payload: &Value) -> Result<String> {
        self.signer.sign(&serde_json::to_string(payload)?)
    }
}

// Business operations. Each is a one-line mapping of (path fragment, verb)
// onto `api_call`; payload and response bodies are opaque JSON.
impl Client {
    /// Create a merchant account.
    pub async fn create_merchant_account(
        &self,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(MERCHANT_ACCOUNTS_PATH, Method::POST, Some(payload), headers, &[])
            .await
    }

    /// Update a merchant account. Requires the `x-amz-pay-authtoken` header.
    pub async fn update_merchant_account(
        &self,
        merchant_account_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{MERCHANT_ACCOUNTS_PATH}/{merchant_account_id}"),
            Method::PATCH,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Claim a merchant account.
    pub async fn merchant_account_claim(
        &self,
        merchant_account_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{MERCHANT_ACCOUNTS_PATH}/{merchant_account_id}/claim"),
            Method::POST,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Fetch buyer details for the given buyer token.
    pub async fn get_buyer(
        &self,
        buyer_token: &str,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{BUYERS_PATH}/{buyer_token}"),
            Method::GET,
            None,
            headers,
            &[],
        )
        .await
    }

    /// Create a checkout session.
    pub async fn create_checkout_session(
        &self,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(CHECKOUT_SESSIONS_PATH, Method::POST, Some(payload), headers, &[])
            .await
    }

    /// Fetch a checkout session.
    pub async fn get_checkout_session(
        &self,
        checkout_session_id: &str,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{CHECKOUT_SESSIONS_PATH}/{checkout_session_id}"),
            Method::GET,
            None,
            headers,
            &[],
        )
        .await
    }

    /// Update a checkout session.
    pub async fn update_checkout_session(
        &self,
        checkout_session_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{CHECKOUT_SESSIONS_PATH}/{checkout_session_id}"),
            Method::PATCH,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Confirm completion of buyer checkout.
    pub async fn complete_checkout_session(
        &self,
        checkout_session_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{CHECKOUT_SESSIONS_PATH}/{checkout_session_id}/complete"),
            Method::POST,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Finalize a checkout session.
    pub async fn finalize_checkout_session(
        &self,
        checkout_session_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{CHECKOUT_SESSIONS_PATH}/{checkout_session_id}/finalize"),
            Method::POST,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Fetch a charge permission.
    pub async fn get_charge_permission(
        &self,
        charge_permission_id: &str,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{CHARGE_PERMISSIONS_PATH}/{charge_permission_id}"),
            Method::GET,
            None,
            headers,
            &[],
        )
        .await
    }

    /// Update a charge permission.
    pub async fn update_charge_permission(
        &self,
        charge_permission_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{CHARGE_PERMISSIONS_PATH}/{charge_permission_id}"),
            Method::PATCH,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Close a charge permission, preventing further charges.
    pub async fn close_charge_permission(
        &self,
        charge_permission_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{CHARGE_PERMISSIONS_PATH}/{charge_permission_id}/close"),
            Method::DELETE,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Initiate a new charge.
    pub async fn create_charge(
        &self,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(CHARGES_PATH, Method::POST, Some(payload), headers, &[])
            .await
    }

    /// Fetch a charge.
    pub async fn get_charge(
        &self,
        charge_id: &str,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{CHARGES_PATH}/{charge_id}"),
            Method::GET,
            None,
            headers,
            &[],
        )
        .await
    }

    /// Capture an authorized charge.
    pub async fn capture_charge(
        &self,
        charge_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{CHARGES_PATH}/{charge_id}/capture"),
            Method::POST,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Cancel a charge before capture.
    pub async fn cancel_charge(
        &self,
        charge_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{CHARGES_PATH}/{charge_id}/cancel"),
            Method::DELETE,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Initiate a refund for a captured charge.
    pub async fn create_refund(
        &self,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(REFUNDS_PATH, Method::POST, Some(payload), headers, &[])
            .await
    }

    /// Fetch a refund.
    pub async fn get_refund(
        &self,
        refund_id: &str,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{REFUNDS_PATH}/{refund_id}"),
            Method::GET,
            None,
            headers,
            &[],
        )
        .await
    }

    /// List reports matching the given query parameters.
    pub async fn get_reports(
        &self,
        headers: &HeaderMap,
        query_params: &[(String, String)],
    ) -> Result<http::Response<Bytes>> {
        self.api_call(REPORTS_PATH, Method::GET, None, headers, query_params)
            .await
    }

    /// Fetch a report by id.
    pub async fn get_report_by_id(
        &self,
        report_id: &str,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{REPORTS_PATH}/{report_id}"),
            Method::GET,
            None,
            headers,
            &[],
        )
        .await
    }

    /// Request generation of a new report.
    pub async fn create_report(
        &self,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(REPORTS_PATH, Method::POST, Some(payload), headers, &[])
            .await
    }

    /// Fetch a report document by id.
    pub async fn get_report_document(
        &self,
        report_document_id: &str,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{REPORT_DOCUMENTS_PATH}/{report_document_id}"),
            Method::GET,
            None,
            headers,
            &[],
        )
        .await
    }

    /// List report schedules matching the given query parameters.
    pub async fn get_report_schedules(
        &self,
        headers: &HeaderMap,
        query_params: &[(String, String)],
    ) -> Result<http::Response<Bytes>> {
        self.api_call(REPORT_SCHEDULES_PATH, Method::GET, None, headers, query_params)
            .await
    }

    /// Fetch a report schedule by id.
    pub async fn get_report_schedule_by_id(
        &self,
        report_schedule_id: &str,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{REPORT_SCHEDULES_PATH}/{report_schedule_id}"),
            Method::GET,
            None,
            headers,
            &[],
        )
        .await
    }

    /// Create a report schedule.
    pub async fn create_report_schedule(
        &self,
        payload: &Value,
        headers: &HeaderMap,
        query_params: &[(String, String)],
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            REPORT_SCHEDULES_PATH,
            Method::POST,
            Some(payload),
            headers,
            query_params,
        )
        .await
    }

    /// Cancel a report schedule.
    pub async fn cancel_report_schedule(
        &self,
        report_schedule_id: &str,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{REPORT_SCHEDULES_PATH}/{report_schedule_id}"),
            Method::DELETE,
            None,
            headers,
            &[],
        )
        .await
    }

    /// List disbursements matching the given query parameters.
    pub async fn get_disbursements(
        &self,
        headers: &HeaderMap,
        query_params: &[(String, String)],
    ) -> Result<http::Response<Bytes>> {
        self.api_call(DISBURSEMENTS_PATH, Method::GET, None, headers, query_params)
            .await
    }

    /// Notify Amazon Pay of a newly created chargeback dispute.
    /// Requires the `x-amz-pay-idempotency-key` header.
    pub async fn create_dispute(
        &self,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(DISPUTES_PATH, Method::POST, Some(payload), headers, &[])
            .await
    }

    /// Update the status details of a dispute.
    pub async fn update_dispute(
        &self,
        dispute_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{DISPUTES_PATH}/{dispute_id}"),
            Method::PATCH,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Contest a dispute on behalf of the merchant.
    pub async fn contest_dispute(
        &self,
        dispute_id: &str,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(
            &format!("{DISPUTES_PATH}/{dispute_id}/contest"),
            Method::POST,
            Some(payload),
            headers,
            &[],
        )
        .await
    }

    /// Upload file-based evidence for a contested dispute.
    /// Requires the `x-amz-pay-idempotency-key` header.
    pub async fn upload_file(
        &self,
        payload: &Value,
        headers: &HeaderMap,
    ) -> Result<http::Response<Bytes>> {
        self.api_call(FILES_PATH, Method::POST, Some(payload), headers, &[])
            .await
    }
}
