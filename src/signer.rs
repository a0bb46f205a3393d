//! RSA-PSS signing and authorization-header assembly.

use std::fmt::{Debug, Formatter};

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::SigningKey;
use rsa::sha2::Sha256;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::RsaPrivateKey;

use crate::constants::{AMAZON_SIGNATURE_ALGORITHM, SALT_LENGTH};
use crate::hash::{base64_encode, hex_sha256};
use crate::request::{signed_header_names, CanonicalHeaders};
use crate::{Error, Result};

/// Signer computes RSA-PSS(SHA-256) signatures over canonical requests and
/// standalone payloads.
///
/// PSS uses MGF1 with SHA-256 and a fixed 32 byte salt. The salt is random,
/// so signature bytes vary run to run; verification with the corresponding
/// public key succeeds for every generated signature.
#[derive(Clone)]
pub struct Signer {
    private_key: RsaPrivateKey,
    public_key_id: String,
}

impl Debug for Signer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("public_key_id", &self.public_key_id)
            .field("private_key", &"***")
            .finish()
    }
}

impl Signer {
    /// Create a signer from a PEM-encoded RSA private key.
    ///
    /// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1
    /// (`BEGIN RSA PRIVATE KEY`) encodings.
    pub fn new(private_key_pem: &str, public_key_id: impl Into<String>) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_key_pem))
            .map_err(|e| {
                Error::credential_invalid(format!("failed to parse private key: {e}"))
            })?;

        Ok(Self {
            private_key,
            public_key_id: public_key_id.into(),
        })
    }

    /// Sign a message and return the base64-encoded signature.
    ///
    /// The string actually fed into RSA-PSS is
    /// `"AMZN-PAY-RSASSA-PSS-V2\n" + hex(SHA256(message))`.
    pub fn sign(&self, message: &str) -> Result<String> {
        let hashed_request = format!(
            "{AMAZON_SIGNATURE_ALGORITHM}\n{}",
            hex_sha256(message.as_bytes())
        );

        let signing_key =
            SigningKey::<Sha256>::new_with_salt_len(self.private_key.clone(), SALT_LENGTH);
        let signature = signing_key
            .try_sign_with_rng(&mut rand::thread_rng(), hashed_request.as_bytes())
            .map_err(|e| Error::signing_failed(format!("rsa-pss signing failed: {e}")))?;

        Ok(base64_encode(&signature.to_bytes()))
    }

    /// Sign a canonical request and wrap the result as the
    /// `SignedHeaders=..., Signature=...` value.
    pub fn sign_headers(
        &self,
        canonical_request: &str,
        canonical_headers: &CanonicalHeaders,
    ) -> Result<String> {
        let signature = self.sign(canonical_request)?;
        Ok(format!(
            "SignedHeaders={}, Signature={signature}",
            signed_header_names(canonical_headers)
        ))
    }

    /// Assemble the full authorization header value.
    pub fn authorization_header(&self, signed_headers_value: &str) -> String {
        format!(
            "{AMAZON_SIGNATURE_ALGORITHM} PublicKeyId={}, {signed_headers_value}",
            self.public_key_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::canonicalize_headers;
    use rsa::pss::Signature;
    use rsa::signature::{Keypair, Verifier};

    const TEST_KEY_PKCS8: &str = include_str!("../tests/fixtures/test_key_pkcs8.pem");
    const TEST_KEY_PKCS1: &str = include_str!("../tests/fixtures/test_key_pkcs1.pem");

    fn signer() -> Signer {
        Signer::new(TEST_KEY_PKCS8, "SANDBOX-1234").unwrap()
    }

    fn verify(signer: &Signer, message: &str, signature_b64: &str) -> bool {
        let hashed_request = format!(
            "{AMAZON_SIGNATURE_ALGORITHM}\n{}",
            hex_sha256(message.as_bytes())
        );
        let signing_key =
            SigningKey::<Sha256>::new_with_salt_len(signer.private_key.clone(), SALT_LENGTH);
        let verifying_key = signing_key.verifying_key();
        let bytes = crate::hash::base64_decode(signature_b64).unwrap();
        let signature = Signature::try_from(bytes.as_slice()).unwrap();
        verifying_key
            .verify(hashed_request.as_bytes(), &signature)
            .is_ok()
    }

    #[test]
    fn test_sign_verifies_with_public_key() {
        let signer = signer();
        let signature = signer.sign("string_to_sign").unwrap();
        assert!(verify(&signer, "string_to_sign", &signature));
    }

    #[test]
    fn test_signatures_vary_but_all_verify() {
        // PSS salt is randomized, so two signatures over the same message
        // almost surely differ while both verify.
        let signer = signer();
        let a = signer.sign("string_to_sign").unwrap();
        let b = signer.sign("string_to_sign").unwrap();
        assert_ne!(a, b);
        assert!(verify(&signer, "string_to_sign", &a));
        assert!(verify(&signer, "string_to_sign", &b));
    }

    #[test]
    fn test_signature_does_not_verify_other_message() {
        let signer = signer();
        let signature = signer.sign("string_to_sign").unwrap();
        assert!(!verify(&signer, "another_string", &signature));
    }

    #[test]
    fn test_pkcs1_pem_accepted() {
        assert!(Signer::new(TEST_KEY_PKCS1, "SANDBOX-1234").is_ok());
    }

    #[test]
    fn test_malformed_key_rejected() {
        let err = Signer::new("not a pem", "SANDBOX-1234").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::CredentialInvalid);
    }

    #[test]
    fn test_sign_headers_format() {
        let signer = signer();
        let headers = canonicalize_headers([
            ("content-type", "application/json"),
            ("accept", "application/json"),
        ]);
        let value = signer.sign_headers("canonical_request", &headers).unwrap();
        assert!(value.starts_with("SignedHeaders=accept;content-type, Signature="));
    }

    #[test]
    fn test_authorization_header_format() {
        let signer = signer();
        let value = signer.authorization_header("SignedHeaders=accept, Signature=abc");
        assert_eq!(
            value,
            "AMZN-PAY-RSASSA-PSS-V2 PublicKeyId=SANDBOX-1234, SignedHeaders=accept, Signature=abc"
        );
    }
}
