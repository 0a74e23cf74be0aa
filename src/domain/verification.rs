//! Fluxo de verificação de documentos
//!
//! Por documento: `not_submitted → pending → approved | rejected`.
//! Um documento rejeitado pode ser reenviado e volta a `pending`.

use super::DomainError;
use crate::models::document::{DocumentStatus, DocumentType, VerificationStatus};

pub const REQUIRED_DOCUMENTS: [DocumentType; 2] =
    [DocumentType::Cnh, DocumentType::ResidenceProof];

/// Deriva o status do usuário a partir do último status de cada documento
pub fn derive_status(documents: &[(DocumentType, DocumentStatus)]) -> VerificationStatus {
    let status_of = |doc_type: DocumentType| {
        documents
            .iter()
            .find(|(t, _)| *t == doc_type)
            .map(|(_, status)| *status)
    };

    let required: Vec<Option<DocumentStatus>> =
        REQUIRED_DOCUMENTS.iter().map(|t| status_of(*t)).collect();

    if required.iter().all(|s| *s == Some(DocumentStatus::Approved)) {
        VerificationStatus::Verified
    } else if required.iter().any(|s| *s == Some(DocumentStatus::Rejected)) {
        VerificationStatus::Rejected
    } else if required.iter().any(Option::is_none) {
        VerificationStatus::NotSubmitted
    } else {
        VerificationStatus::Pending
    }
}

pub fn ensure_can_confirm_payment(status: VerificationStatus) -> Result<(), DomainError> {
    match status {
        VerificationStatus::Verified => Ok(()),
        other => Err(DomainError::VerificationRequired(other)),
    }
}

/// Decisão do administrador sobre um documento
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewDecision {
    Approve,
    Reject { reason: String },
}

pub fn review(current: DocumentStatus, decision: &ReviewDecision) -> Result<DocumentStatus, DomainError> {
    if current != DocumentStatus::Pending {
        return Err(DomainError::InvalidTransition(
            "apenas documentos pendentes podem ser revisados".to_string(),
        ));
    }
    match decision {
        ReviewDecision::Approve => Ok(DocumentStatus::Approved),
        ReviewDecision::Reject { reason } if reason.trim().is_empty() => Err(
            DomainError::InvalidInput("o motivo da rejeição é obrigatório".to_string()),
        ),
        ReviewDecision::Reject { .. } => Ok(DocumentStatus::Rejected),
    }
}

/// Envio ou reenvio: só não é permitido substituir um documento já aprovado
pub fn ensure_can_submit(current: Option<DocumentStatus>) -> Result<(), DomainError> {
    match current {
        Some(DocumentStatus::Approved) => Err(DomainError::Conflict(
            "documento já aprovado não pode ser substituído".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_submitted() {
        assert_eq!(derive_status(&[]), VerificationStatus::NotSubmitted);
        assert_eq!(
            derive_status(&[(DocumentType::Cnh, DocumentStatus::Approved)]),
            VerificationStatus::NotSubmitted
        );
    }

    #[test]
    fn test_all_approved_is_verified() {
        let docs = [
            (DocumentType::Cnh, DocumentStatus::Approved),
            (DocumentType::ResidenceProof, DocumentStatus::Approved),
        ];
        assert_eq!(derive_status(&docs), VerificationStatus::Verified);
        assert!(ensure_can_confirm_payment(derive_status(&docs)).is_ok());
    }

    #[test]
    fn test_approved_cnh_and_rejected_residence_blocks_payment() {
        let docs = [
            (DocumentType::Cnh, DocumentStatus::Approved),
            (DocumentType::ResidenceProof, DocumentStatus::Rejected),
        ];
        let status = derive_status(&docs);
        assert_eq!(status, VerificationStatus::Rejected);
        assert_eq!(
            ensure_can_confirm_payment(status),
            Err(DomainError::VerificationRequired(VerificationStatus::Rejected))
        );
    }

    #[test]
    fn test_resubmitted_document_goes_back_to_pending() {
        assert!(ensure_can_submit(Some(DocumentStatus::Rejected)).is_ok());
        let docs = [
            (DocumentType::Cnh, DocumentStatus::Approved),
            (DocumentType::ResidenceProof, DocumentStatus::Pending),
        ];
        assert_eq!(derive_status(&docs), VerificationStatus::Pending);
        assert!(matches!(
            ensure_can_confirm_payment(VerificationStatus::Pending),
            Err(DomainError::VerificationRequired(_))
        ));
    }

    #[test]
    fn test_review_rules() {
        assert_eq!(
            review(DocumentStatus::Pending, &ReviewDecision::Approve),
            Ok(DocumentStatus::Approved)
        );
        assert!(matches!(
            review(DocumentStatus::Approved, &ReviewDecision::Approve),
            Err(DomainError::InvalidTransition(_))
        ));
        assert!(matches!(
            review(DocumentStatus::Pending, &ReviewDecision::Reject { reason: "  ".into() }),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            ensure_can_submit(Some(DocumentStatus::Approved)),
            Err(DomainError::Conflict(_))
        ));
    }
}
