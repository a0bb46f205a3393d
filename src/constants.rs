//! Fixed protocol constants for the Amazon Pay v2 API.

use std::time::Duration;

/// Signature algorithm identifier carried in the authorization header.
pub const AMAZON_SIGNATURE_ALGORITHM: &str = "AMZN-PAY-RSASSA-PSS-V2";

/// Salt length in bytes for RSA-PSS signing.
pub const SALT_LENGTH: usize = 32;

/// SDK identity reported on every request.
pub const SDK_TYPE: &str = "amzn-pay-rust-sdk";
/// SDK version reported on every request.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// API version segment of the base URL.
pub const API_VERSION: &str = "v2";

/// `accept` header name.
pub const HEADER_ACCEPT: &str = "accept";
/// `content-type` header name.
pub const HEADER_CONTENT_TYPE: &str = "content-type";
/// `content-length` header name. Omitted on empty payloads.
pub const HEADER_CONTENT_LENGTH: &str = "content-length";
/// `authorization` header name.
pub const HEADER_AUTHORIZATION: &str = "authorization";
/// The only content type this API speaks.
pub const APPLICATION_JSON: &str = "application/json";

/// Region header carrying the session region code.
pub const X_AMZ_PAY_REGION: &str = "x-amz-pay-region";
/// Timestamp header, `20240719T123456Z` form.
pub const X_AMZ_PAY_DATE: &str = "x-amz-pay-date";
/// Host header carrying the request URI host.
pub const X_AMZ_PAY_HOST: &str = "x-amz-pay-host";
/// SDK type identity header.
pub const X_AMZ_PAY_SDK_TYPE: &str = "x-amz-pay-sdk-type";
/// SDK version identity header.
pub const X_AMZ_PAY_SDK_VERSION: &str = "x-amz-pay-sdk-version";

/// Maximum number of re-attempts after the initial try.
pub const MAX_RETRIES: usize = 3;

/// Backoff delays indexed by retry count.
pub const BACKOFF_DELAYS: [Duration; MAX_RETRIES] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// Status codes that trigger a retry. Exact set, no others.
pub const RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

// Resource path fragments, relative to the resolved base URL.

/// Merchant accounts resource.
pub const MERCHANT_ACCOUNTS_PATH: &str = "merchantAccounts";
/// Buyers resource.
pub const BUYERS_PATH: &str = "buyers";
/// Checkout sessions resource.
pub const CHECKOUT_SESSIONS_PATH: &str = "checkoutSessions";
/// Charge permissions resource.
pub const CHARGE_PERMISSIONS_PATH: &str = "chargePermissions";
/// Charges resource.
pub const CHARGES_PATH: &str = "charges";
/// Refunds resource.
pub const REFUNDS_PATH: &str = "refunds";
/// Reports resource.
pub const REPORTS_PATH: &str = "reports";
/// Report schedules resource.
pub const REPORT_SCHEDULES_PATH: &str = "report-schedules";
/// Report documents resource.
pub const REPORT_DOCUMENTS_PATH: &str = "report-documents";
/// Disbursements resource.
pub const DISBURSEMENTS_PATH: &str = "disbursements";
/// Disputes resource.
pub const DISPUTES_PATH: &str = "disputes";
/// Dispute evidence files resource.
pub const FILES_PATH: &str = "files";
