//! Verificação HMAC-SHA256 dos webhooks (Stripe e D4Sign)

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Tolerância de relógio para o timestamp do Stripe
pub const STRIPE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignatureError {
    #[error("header de assinatura ausente ou malformado")]
    Malformed,
    #[error("timestamp fora da tolerância")]
    Expired,
    #[error("assinatura não confere")]
    Mismatch,
}

fn verify_hex(secret: &[u8], payload: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

/// `Stripe-Signature: t=<unix>,v1=<hex>[,v1=<hex>...]` sobre `"{t}.{payload}"`
pub fn verify_stripe_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now_unix: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if candidates.is_empty() {
        return Err(SignatureError::Malformed);
    }
    if (now_unix - timestamp).abs() > STRIPE_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    let mut signed = format!("{}.", timestamp).into_bytes();
    signed.extend_from_slice(payload);

    if candidates
        .iter()
        .any(|candidate| verify_hex(secret.as_bytes(), &signed, candidate))
    {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// D4Sign: `Content-Hmac: sha256=<hex>` calculado sobre o uuid do documento
pub fn verify_d4sign_signature(
    document_uuid: &str,
    header: &str,
    secret: &str,
) -> Result<(), SignatureError> {
    let signature = header
        .trim()
        .strip_prefix("sha256=")
        .ok_or(SignatureError::Malformed)?;

    if verify_hex(secret.as_bytes(), document_uuid.as_bytes(), signature) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hmac_sha256_hex(secret: &[u8], payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_stripe_signature_accepts_valid_and_rejects_tampering() {
        let payload = br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;
        let secret = "whsec_test";
        let t = 1_700_000_000;
        let mut signed = format!("{}.", t).into_bytes();
        signed.extend_from_slice(payload);
        let sig = hmac_sha256_hex(secret.as_bytes(), &signed);
        let header = format!("t={},v1={}", t, sig);

        assert_eq!(verify_stripe_signature(payload, &header, secret, t + 10), Ok(()));
        assert_eq!(
            verify_stripe_signature(b"{}", &header, secret, t + 10),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_stripe_signature(payload, &header, secret, t + 301),
            Err(SignatureError::Expired)
        );
        assert_eq!(
            verify_stripe_signature(payload, "v1=abc", secret, t),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn test_d4sign_signature() {
        let uuid = "8e4a2b4c-1b1c-4a6e-9d1f-123456789abc";
        let header = format!("sha256={}", hmac_sha256_hex(b"d4-secret", uuid.as_bytes()));
        assert!(verify_d4sign_signature(uuid, &header, "d4-secret").is_ok());
        assert_eq!(
            verify_d4sign_signature(uuid, &header, "errado"),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_d4sign_signature(uuid, "md5=abc", "d4-secret"),
            Err(SignatureError::Malformed)
        );
    }
}
