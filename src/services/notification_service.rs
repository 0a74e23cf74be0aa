//! E-mails transacionais
//!
//! Envio best-effort: falhas são registradas em log e nunca desfazem a
//! operação que originou a notificação.

use std::sync::Arc;

use crate::clients::{EmailMessage, Notifier};
use crate::domain::contract_lifecycle::{ContractData, ContractParty};
use crate::models::booking::Booking;
use crate::models::document::{DocumentStatus, UserDocument};
use crate::models::user::User;
use crate::models::vehicle::Vehicle;

pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    async fn send(&self, to: &str, subject: String, html: String) {
        let message = EmailMessage {
            to: to.to_string(),
            subject,
            html,
        };
        if let Err(e) = self.notifier.send_email(message).await {
            tracing::warn!("⚠️ Falha ao enviar e-mail para {}: {}", to, e);
        }
    }

    pub async fn booking_confirmed(&self, booking: &Booking, vehicle: &Vehicle, renter: &User, owner: &User) {
        let period = format!("{} a {}", booking.start_date, booking.end_date);
        self.send(
            &renter.email,
            format!("Reserva confirmada: {}", vehicle.display_name()),
            format!(
                "<p>Olá {},</p><p>Sua reserva do {} para {} foi confirmada. Total pago: R$ {}.</p>\
                 <p>Você receberá o contrato para assinatura em breve.</p>",
                renter.name,
                vehicle.display_name(),
                period,
                booking.total_price
            ),
        )
        .await;
        self.send(
            &owner.email,
            format!("Nova reserva confirmada: {}", vehicle.display_name()),
            format!(
                "<p>Olá {},</p><p>{} reservou seu {} para {}.</p>",
                owner.name,
                renter.name,
                vehicle.display_name(),
                period
            ),
        )
        .await;
    }

    pub async fn contract_sent(&self, data: &ContractData) {
        for party in [&data.renter, &data.owner] {
            self.send(
                &party.email,
                format!("Contrato {} aguardando sua assinatura", data.contract_number),
                format!(
                    "<p>Olá {},</p><p>O contrato {} foi enviado para assinatura eletrônica. \
                     Verifique o e-mail do provedor de assinatura.</p>",
                    party.name, data.contract_number
                ),
            )
            .await;
        }
    }

    pub async fn contract_completed(&self, data: &ContractData, signed_pdf_url: Option<&str>) {
        let link = signed_pdf_url
            .map(|url| format!("<p><a href=\"{}\">Baixar contrato assinado</a></p>", url))
            .unwrap_or_default();
        for party in [&data.renter, &data.owner] {
            self.send(
                &party.email,
                format!("Contrato {} assinado por todas as partes", data.contract_number),
                completed_body(party, data, &link),
            )
            .await;
        }
    }

    pub async fn document_reviewed(&self, user: &User, document: &UserDocument) {
        let (subject, body) = match document.status {
            DocumentStatus::Approved => (
                format!("{} aprovado", document.document_type.label()),
                format!(
                    "<p>Olá {},</p><p>Seu documento ({}) foi aprovado.</p>",
                    user.name,
                    document.document_type.label()
                ),
            ),
            DocumentStatus::Rejected => (
                format!("{} recusado", document.document_type.label()),
                format!(
                    "<p>Olá {},</p><p>Seu documento ({}) foi recusado: {}.</p>\
                     <p>Envie uma nova versão pelo aplicativo.</p>",
                    user.name,
                    document.document_type.label(),
                    document.rejection_reason.as_deref().unwrap_or("sem motivo informado")
                ),
            ),
            DocumentStatus::Pending => return,
        };
        self.send(&user.email, subject, body).await;
    }
}

fn completed_body(party: &ContractParty, data: &ContractData, link: &str) -> String {
    format!(
        "<p>Olá {},</p><p>O contrato {} do {} {} foi assinado por locador e locatário. \
         A vistoria de entrega já pode ser agendada.</p>{}",
        party.name, data.contract_number, data.vehicle.brand, data.vehicle.model, link
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ClientResult;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_email(&self, message: EmailMessage) -> ClientResult<()> {
            self.sent.lock().await.push(message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_rejection_mail_includes_reason() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = NotificationService::new(notifier.clone());

        let user = User {
            id: uuid::Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password_hash: String::new(),
            phone: None,
            role: crate::models::user::UserRole::Renter,
            verification_status: crate::models::document::VerificationStatus::Rejected,
            created_at: chrono::Utc::now(),
        };
        let document = UserDocument {
            id: uuid::Uuid::new_v4(),
            user_id: user.id,
            document_type: crate::models::document::DocumentType::Cnh,
            document_url: "https://files.example/cnh.jpg".into(),
            document_number: None,
            status: DocumentStatus::Rejected,
            rejection_reason: Some("foto ilegível".into()),
            uploaded_at: chrono::Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        };

        service.document_reviewed(&user, &document).await;

        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ana@example.com");
        assert!(sent[0].html.contains("foto ilegível"));
    }
}
