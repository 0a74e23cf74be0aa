use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::document::{DocumentType, UserDocument, VerificationStatus};

// Envio (ou reenvio) de documento; o arquivo já está no storage
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitDocumentRequest {
    pub document_type: DocumentType,

    #[validate(url)]
    pub document_url: String,

    #[validate(length(min = 1, max = 50))]
    pub document_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectDocumentRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct VerificationSummary {
    pub status: VerificationStatus,
    pub documents: Vec<UserDocument>,
}
