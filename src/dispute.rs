//! Dispute enumerations used in dispute payload `statusDetails`.
//!
//! These serialize to the exact wire strings the Amazon Pay dispute APIs
//! expect.

// Variant names are the wire strings themselves.
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

/// Reason a buyer filed the dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeFilingReason {
    ProductNotReceived,
    ProductUnacceptable,
    ProductNoLongerNeeded,
    CreditNotProcessed,
    Overcharged,
    DuplicateCharge,
    SubscriptionCancelled,
    Unrecognized,
    Fraudulent,
    Other,
}

/// Reason code attached to a dispute state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeReasonCode {
    MerchantResponseRequired,
    MerchantAdditionalEvidencesRequired,
    BuyerAdditionalEvidencesRequired,
    MerchantAcceptedDispute,
    MerchantResponseDeadlineExpired,
    BuyerCancelled,
    InvestigatorResolved,
    AutoResolved,
    ChargebackFiled,
}

/// Final resolution of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeResolution {
    BuyerWon,
    MerchantWon,
    NoFault,
}

/// Lifecycle state of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeState {
    UnderReview,
    ActionRequired,
    Resolved,
    Closed,
}

/// Type of evidence attached when contesting a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceType {
    ProductDescription,
    Receipt,
    CancellationPolicy,
    CustomerSignature,
    TrackingNumber,
    Other,
}
