//! Ciclo de vida dos contratos de locação
//!
//! Geração a partir da reserva confirmada, envio para assinatura, eventos do
//! provedor (webhook ou reconciliação) e cancelamento. Toda transição grava um
//! registro em `contract_events`; a chave única do evento torna a aplicação de
//! webhooks repetidos um no-op.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use tera::{Context, Tera};
use uuid::Uuid;

use crate::clients::{PdfRenderer, RemoteDocumentState, SignatureProvider, Signer};
use crate::domain::contract_lifecycle::{
    generate_contract_number, ContractBooking, ContractData, ContractParty, ContractState,
    ContractTerms, ContractVehicle, LifecycleEvent, Transition,
};
use crate::domain::DomainError;
use crate::dto::webhook_dto::{SignatureEvent, SignatureNotification};
use crate::middleware::AuthenticatedUser;
use crate::models::booking::{Booking, BookingStatus, InspectionStatus};
use crate::models::contract::{Contract, ContractEvent, ContractFile, ContractStatus, NewContractEvent};
use crate::models::settings::AdminSettings;
use crate::models::user::User;
use crate::models::vehicle::Vehicle;
use crate::repositories::{BookingRepository, ContractRepository, UserRepository, VehicleRepository};
use crate::services::notification_service::NotificationService;
use crate::services::settings_service::SettingsService;
use crate::state::{AppState, CONTRACT_TEMPLATE};
use crate::utils::errors::{forbidden_error, not_found_error, AppError};

/// Foro usado quando a localização do veículo não traz a cidade
const DEFAULT_JURISDICTION: &str = "São Paulo/SP";

/// Resultado da aplicação de um evento do provedor de assinatura
#[derive(Debug)]
pub enum SignatureOutcome {
    Applied(Contract),
    Unchanged(&'static str),
    Duplicate,
    Ignored(String),
}

pub struct ContractService {
    pool: PgPool,
    contracts: ContractRepository,
    bookings: BookingRepository,
    vehicles: VehicleRepository,
    users: UserRepository,
    settings: SettingsService,
    signatures: Arc<dyn SignatureProvider>,
    pdf: Arc<dyn PdfRenderer>,
    templates: Arc<Tera>,
    notifications: NotificationService,
    public_base_url: String,
}

impl ContractService {
    pub fn new(state: &AppState) -> Self {
        let pool = state.pool.clone();
        Self {
            contracts: ContractRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            settings: SettingsService::new(pool.clone()),
            signatures: state.providers.signatures.clone(),
            pdf: state.providers.pdf.clone(),
            templates: state.templates.clone(),
            notifications: NotificationService::new(state.providers.notifier.clone()),
            public_base_url: state.config.public_base_url.trim_end_matches('/').to_string(),
            pool,
        }
    }

    fn unsigned_pdf_url(&self, contract_id: Uuid) -> String {
        format!("{}/api/contracts/{}/pdf", self.public_base_url, contract_id)
    }

    /// Publicada somente depois que o PDF assinado está em `contract_signed_files`
    fn signed_pdf_url(&self, contract_id: Uuid) -> String {
        format!("{}/api/contracts/{}/signed-pdf", self.public_base_url, contract_id)
    }

    // ------------------------------------------------------------------
    // Consultas

    async fn booking_of(&self, contract: &Contract) -> Result<Booking, AppError> {
        self.bookings
            .find_by_id(contract.booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", contract.booking_id))
    }

    /// Contrato visível apenas às partes da reserva e aos admins
    pub async fn get(&self, user: AuthenticatedUser, id: Uuid) -> Result<Contract, AppError> {
        let contract = self
            .contracts
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Contract", id))?;
        let booking = self.booking_of(&contract).await?;
        ensure_party(user, &booking)?;
        Ok(contract)
    }

    pub async fn get_by_booking(&self, user: AuthenticatedUser, booking_id: Uuid) -> Result<Contract, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", booking_id))?;
        ensure_party(user, &booking)?;
        self.contracts
            .find_active_by_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reserva {} não possui contrato ativo", booking_id)))
    }

    pub async fn list_mine(&self, user: AuthenticatedUser) -> Result<Vec<Contract>, AppError> {
        self.contracts.list_for_user(user.user_id).await
    }

    pub async fn events(&self, user: AuthenticatedUser, id: Uuid) -> Result<Vec<ContractEvent>, AppError> {
        self.get(user, id).await?;
        self.contracts.list_events(id).await
    }

    pub async fn unsigned_pdf(&self, user: AuthenticatedUser, id: Uuid) -> Result<ContractFile, AppError> {
        self.get(user, id).await?;
        self.contracts
            .find_file(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("PDF do contrato {} não encontrado", id)))
    }

    /// PDF assinado armazenado; baixa do provedor se a conclusão não conseguiu
    pub async fn signed_pdf(&self, user: AuthenticatedUser, id: Uuid) -> Result<ContractFile, AppError> {
        let contract = self.get(user, id).await?;
        signed_document_id(&contract)?;
        if let Some(file) = self.contracts.find_signed_file(id).await? {
            return Ok(file);
        }
        self.store_signed_pdf(&contract).await
    }

    /// Baixa o documento assinado e guarda os bytes junto do contrato
    async fn store_signed_pdf(&self, contract: &Contract) -> Result<ContractFile, AppError> {
        let document_id = signed_document_id(contract)?;
        let signed = self.signatures.download_signed(document_id).await?;
        let url = self.signed_pdf_url(contract.id);

        let mut tx = self.pool.begin().await?;
        let file = ContractRepository::store_signed_file_tx(
            &mut *tx,
            contract.id,
            &signed.content_type,
            &signed.bytes,
            &url,
        )
        .await?;
        ContractRepository::insert_event_tx(
            &mut *tx,
            &NewContractEvent {
                contract_id: contract.id,
                event_key: format!("signed_pdf:{}", document_id),
                action: "signed_pdf_stored".to_string(),
                previous_status: Some(contract.status),
                new_status: Some(contract.status),
                performed_by: None,
                details: Some(json!({ "bytes": signed.bytes.len() })),
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!("📥 PDF assinado do contrato {} armazenado ({} bytes)", contract.id, signed.bytes.len());
        Ok(file)
    }

    // ------------------------------------------------------------------
    // Geração

    /// Gera o rascunho do contrato de uma reserva confirmada
    pub async fn generate_for_booking(
        &self,
        booking_id: Uuid,
        actor: Option<AuthenticatedUser>,
    ) -> Result<Contract, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", booking_id))?;
        if let Some(user) = actor {
            ensure_party(user, &booking)?;
        }
        if booking.status != BookingStatus::Confirmed {
            return Err(DomainError::InvalidTransition(format!(
                "contrato só pode ser gerado para reserva confirmada (status atual: {})",
                booking.status.as_str()
            ))
            .into());
        }
        if self.contracts.find_active_by_booking(booking_id).await?.is_some() {
            return Err(DomainError::Conflict("a reserva já possui um contrato ativo".to_string()).into());
        }

        let vehicle = self
            .vehicles
            .find_by_id(booking.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", booking.vehicle_id))?;
        let renter = self.user(booking.renter_id).await?;
        let owner = self.user(booking.owner_id).await?;
        let settings = self.settings.current().await?;

        let data = build_contract_data(&booking, &vehicle, &renter, &owner, &settings);
        let html = render_contract(&self.templates, &data)?;
        let rendered = self.pdf.render_html(&html).await?;

        let mut tx = self.pool.begin().await?;
        if ContractRepository::find_active_by_booking_tx(&mut *tx, booking_id).await?.is_some() {
            return Err(DomainError::Conflict("a reserva já possui um contrato ativo".to_string()).into());
        }
        let mut contract =
            ContractRepository::create_tx(&mut *tx, booking_id, &data, actor.map(|u| u.user_id)).await?;
        let pdf_url = self.unsigned_pdf_url(contract.id);
        ContractRepository::store_file_tx(&mut *tx, contract.id, &rendered.content_type, &rendered.bytes, &pdf_url)
            .await?;
        ContractRepository::insert_event_tx(
            &mut *tx,
            &NewContractEvent {
                contract_id: contract.id,
                event_key: "generated".to_string(),
                action: "generated".to_string(),
                previous_status: None,
                new_status: Some(ContractStatus::Draft),
                performed_by: actor.map(|u| u.user_id),
                details: Some(json!({ "contract_number": data.contract_number })),
            },
        )
        .await?;
        tx.commit().await?;

        contract.pdf_url = Some(pdf_url);
        tracing::info!(
            "📝 Contrato {} ({}) gerado para a reserva {}",
            contract.contract_number,
            contract.id,
            booking_id
        );
        Ok(contract)
    }

    async fn user(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("User", id))
    }

    // ------------------------------------------------------------------
    // Envio e cancelamento

    /// Envia o contrato para assinatura; falha no provedor mantém o rascunho.
    /// A trava da linha só é tomada depois das chamadas ao provedor
    pub async fn send(&self, user: AuthenticatedUser, id: Uuid) -> Result<Contract, AppError> {
        let contract = self.get(user, id).await?;
        contract.state().send()?;

        let file = self
            .contracts
            .find_file(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("PDF do contrato {} ausente", id)))?;
        let data = contract.data().clone();
        let signers = [
            Signer { name: data.renter.name.clone(), email: data.renter.email.clone() },
            Signer { name: data.owner.name.clone(), email: data.owner.email.clone() },
        ];
        let document_id = dispatch_for_signature(
            self.signatures.as_ref(),
            &format!("Contrato {}", data.contract_number),
            &file.content,
            &signers,
            &format!("Contrato de locação {} - alugae.mobi", data.contract_number),
        )
        .await?;

        match self.record_sent(user, id, &document_id).await {
            Ok(updated) => {
                tracing::info!("✉️ Contrato {} enviado para assinatura (documento {})", id, document_id);
                self.notifications.contract_sent(&data).await;
                Ok(updated)
            }
            Err(e) => {
                // envio concorrente ou cancelamento venceu: descarta o documento recém-criado
                discard_remote(self.signatures.as_ref(), &document_id, "envio descartado").await;
                Err(e)
            }
        }
    }

    async fn record_sent(&self, user: AuthenticatedUser, id: Uuid, document_id: &str) -> Result<Contract, AppError> {
        let mut tx = self.pool.begin().await?;
        let contract = ContractRepository::find_by_id_for_update_tx(&mut *tx, id)
            .await?
            .ok_or_else(|| not_found_error("Contract", id))?;
        let current = contract.state();
        let next = current.send()?;

        ContractRepository::set_external_document_tx(&mut *tx, id, document_id).await?;
        let updated = ContractRepository::update_state_tx(&mut *tx, id, &next, None).await?;
        ContractRepository::insert_event_tx(
            &mut *tx,
            &NewContractEvent {
                contract_id: id,
                event_key: format!("sent:{}", document_id),
                action: LifecycleEvent::Sent.action().to_string(),
                previous_status: Some(current.status),
                new_status: Some(next.status),
                performed_by: Some(user.user_id),
                details: Some(json!({ "external_document_id": document_id })),
            },
        )
        .await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn cancel(&self, user: AuthenticatedUser, id: Uuid, reason: &str) -> Result<Contract, AppError> {
        self.get(user, id).await?;

        let mut tx = self.pool.begin().await?;
        let contract = ContractRepository::find_by_id_for_update_tx(&mut *tx, id)
            .await?
            .ok_or_else(|| not_found_error("Contract", id))?;
        let cancelled = Self::cancel_locked(&mut *tx, &contract, reason, Some(user.user_id)).await?;
        tx.commit().await?;

        self.cancel_remote(&cancelled, reason).await;
        tracing::info!("🛑 Contrato {} cancelado por {}: {}", id, user.user_id, reason);
        Ok(cancelled)
    }

    /// Cancela um contrato já travado pela transação corrente
    pub async fn cancel_locked(
        conn: &mut PgConnection,
        contract: &Contract,
        reason: &str,
        performed_by: Option<Uuid>,
    ) -> Result<Contract, AppError> {
        let current = contract.state();
        let next = current.cancel(reason)?;
        let updated = ContractRepository::update_state_tx(&mut *conn, contract.id, &next, None).await?;
        ContractRepository::insert_event_tx(
            &mut *conn,
            &NewContractEvent {
                contract_id: contract.id,
                event_key: format!("cancelled:{}", Uuid::new_v4()),
                action: "cancelled".to_string(),
                previous_status: Some(current.status),
                new_status: Some(ContractStatus::Cancelled),
                performed_by,
                details: Some(json!({ "reason": reason })),
            },
        )
        .await?;
        Ok(updated)
    }

    /// Cancela o documento no provedor; falhas apenas logadas
    pub async fn cancel_remote(&self, contract: &Contract, reason: &str) {
        if let Some(document_id) = &contract.external_document_id {
            discard_remote(self.signatures.as_ref(), document_id, reason).await;
        }
    }

    // ------------------------------------------------------------------
    // Eventos do provedor

    pub async fn handle_signature(&self, notification: SignatureNotification) -> Result<SignatureOutcome, AppError> {
        let mut tx = self.pool.begin().await?;
        let contract = match ContractRepository::find_by_external_id_for_update_tx(
            &mut *tx,
            &notification.document_id,
        )
        .await?
        {
            Some(contract) => contract,
            None => {
                tracing::warn!("⚠️ Webhook para documento desconhecido {}", notification.document_id);
                return Ok(SignatureOutcome::Ignored(format!(
                    "documento {} desconhecido",
                    notification.document_id
                )));
            }
        };

        let event = match to_lifecycle_event(&notification.event, contract.data()) {
            Ok(event) => event,
            Err(reason) => {
                tracing::info!("ℹ️ Evento {} sem efeito: {}", notification.event_key, reason);
                return Ok(SignatureOutcome::Ignored(reason));
            }
        };

        let outcome = self
            .apply_event(&mut *tx, &contract, &event, &notification.event_key)
            .await?;
        tx.commit().await?;

        Ok(self.after_event(&contract, outcome).await)
    }

    /// Consulta o provedor e aplica o que os webhooks não entregaram
    pub async fn reconcile(&self, user: AuthenticatedUser, id: Uuid) -> Result<Contract, AppError> {
        let contract = self.get(user, id).await?;
        let document_id = contract.external_document_id.clone().ok_or_else(|| {
            DomainError::InvalidTransition("contrato ainda não foi enviado para assinatura".to_string())
        })?;
        if contract.state().is_terminal() {
            if contract.status == ContractStatus::Completed && contract.signed_pdf_url.is_none() {
                self.store_signed_pdf(&contract).await?;
                return self.get(user, id).await;
            }
            return Ok(contract);
        }

        let remote = self.signatures.document_status(&document_id).await?;
        let mut pending: Vec<(LifecycleEvent, String)> = Vec::new();
        for signer in &remote.signers {
            let (Some(signed_at), Some(party)) = (signer.signed_at, contract.data().party_for_email(&signer.email))
            else {
                continue;
            };
            let key = SignatureNotification::signed(&document_id, &signer.email).event_key;
            pending.push((LifecycleEvent::Signed { party, signed_at }, key));
        }
        match remote.state {
            RemoteDocumentState::Finished => pending.push((
                LifecycleEvent::Finished,
                SignatureNotification::finished(&document_id).event_key,
            )),
            RemoteDocumentState::Cancelled => pending.push((
                LifecycleEvent::Cancelled { reason: "cancelado no provedor de assinatura".to_string() },
                SignatureNotification::cancelled(&document_id, None).event_key,
            )),
            RemoteDocumentState::Pending => {}
        }

        let mut last = contract.clone();
        for (event, key) in pending {
            let mut tx = self.pool.begin().await?;
            let locked = ContractRepository::find_by_id_for_update_tx(&mut *tx, id)
                .await?
                .ok_or_else(|| not_found_error("Contract", id))?;
            let outcome = self.apply_event(&mut *tx, &locked, &event, &key).await?;
            tx.commit().await?;
            if let SignatureOutcome::Applied(updated) = self.after_event(&locked, outcome).await {
                last = updated;
            }
        }

        tracing::info!("🔄 Contrato {} reconciliado: {}", id, last.status.as_str());
        Ok(last)
    }

    async fn apply_event(
        &self,
        conn: &mut PgConnection,
        contract: &Contract,
        event: &LifecycleEvent,
        event_key: &str,
    ) -> Result<SignatureOutcome, AppError> {
        let current = contract.state();
        let transition = current.apply(event)?;

        let (new_status, note) = match &transition {
            Transition::Updated(next) => (next.status, None),
            Transition::Unchanged(reason) => (current.status, Some(*reason)),
        };
        let first_delivery = ContractRepository::insert_event_tx(
            &mut *conn,
            &NewContractEvent {
                contract_id: contract.id,
                event_key: event_key.to_string(),
                action: event.action().to_string(),
                previous_status: Some(current.status),
                new_status: Some(new_status),
                performed_by: None,
                details: note.map(|n| json!({ "note": n })),
            },
        )
        .await?;

        match settle_event(first_delivery, transition) {
            EventStep::Duplicate => {
                tracing::info!("🔁 Evento {} já processado para o contrato {}", event_key, contract.id);
                Ok(SignatureOutcome::Duplicate)
            }
            EventStep::Unchanged(reason) => Ok(SignatureOutcome::Unchanged(reason)),
            EventStep::Persist(next) => {
                let updated =
                    ContractRepository::update_state_tx(&mut *conn, contract.id, &next, Some(event_key)).await?;
                if updated.status == ContractStatus::Completed {
                    BookingRepository::set_inspection_status_tx(
                        &mut *conn,
                        updated.booking_id,
                        InspectionStatus::Pending,
                    )
                    .await?;
                }
                tracing::info!(
                    "✍️ Contrato {}: {} -> {}",
                    contract.id,
                    current.status.as_str(),
                    updated.status.as_str()
                );
                Ok(SignatureOutcome::Applied(updated))
            }
        }
    }

    /// Na conclusão baixa o PDF assinado antes de avisar as partes. Falha no
    /// download fica para a reconciliação ou para o primeiro download
    async fn after_event(&self, before: &Contract, outcome: SignatureOutcome) -> SignatureOutcome {
        let mut updated = match outcome {
            SignatureOutcome::Applied(updated) => updated,
            other => return other,
        };
        if updated.status == ContractStatus::Completed && before.status != ContractStatus::Completed {
            match self.store_signed_pdf(&updated).await {
                Ok(_) => updated.signed_pdf_url = Some(self.signed_pdf_url(updated.id)),
                Err(e) => tracing::warn!(
                    "⚠️ PDF assinado do contrato {} não foi baixado agora: {}",
                    updated.id,
                    e
                ),
            }
            self.notifications
                .contract_completed(updated.data(), updated.signed_pdf_url.as_deref())
                .await;
        }
        SignatureOutcome::Applied(updated)
    }
}

/// O que fazer com um evento já avaliado pela máquina de estados
#[derive(Debug, PartialEq)]
enum EventStep {
    Duplicate,
    Unchanged(&'static str),
    Persist(ContractState),
}

/// Chave de evento já registrada vence qualquer transição calculada
fn settle_event(first_delivery: bool, transition: Transition) -> EventStep {
    match (first_delivery, transition) {
        (false, _) => EventStep::Duplicate,
        (true, Transition::Unchanged(reason)) => EventStep::Unchanged(reason),
        (true, Transition::Updated(next)) => EventStep::Persist(next),
    }
}

/// Identificador do documento no provedor de um contrato já concluído
fn signed_document_id(contract: &Contract) -> Result<&str, AppError> {
    if contract.status != ContractStatus::Completed {
        return Err(DomainError::InvalidTransition(
            "o contrato ainda não foi assinado pelas duas partes".to_string(),
        )
        .into());
    }
    contract
        .external_document_id
        .as_deref()
        .ok_or_else(|| AppError::NotFound(format!("contrato {} sem documento no provedor", contract.id)))
}

/// Sobe o PDF, cadastra os signatários e dispara o envio. Se algo falha
/// depois do upload o documento remoto é cancelado
async fn dispatch_for_signature(
    signatures: &dyn SignatureProvider,
    name: &str,
    pdf: &[u8],
    signers: &[Signer],
    message: &str,
) -> Result<String, AppError> {
    let document_id = signatures.upload_document(name, pdf).await?;
    let dispatched = async {
        signatures.add_signers(&document_id, signers).await?;
        signatures.send_to_signers(&document_id, message).await
    }
    .await;
    if let Err(e) = dispatched {
        discard_remote(signatures, &document_id, "falha no envio para assinatura").await;
        return Err(e.into());
    }
    Ok(document_id)
}

async fn discard_remote(signatures: &dyn SignatureProvider, document_id: &str, reason: &str) {
    if let Err(e) = signatures.cancel_document(document_id, reason).await {
        tracing::warn!("⚠️ Falha ao cancelar documento {} no provedor: {}", document_id, e);
    }
}

fn ensure_party(user: AuthenticatedUser, booking: &Booking) -> Result<(), AppError> {
    if booking.involves(user.user_id) || user.is_admin() {
        Ok(())
    } else {
        Err(forbidden_error("acessar contrato", "usuário não é parte da reserva"))
    }
}

/// Traduz o evento do provedor; `Err` com o motivo quando não há efeito
fn to_lifecycle_event(event: &SignatureEvent, data: &ContractData) -> Result<LifecycleEvent, String> {
    match event {
        SignatureEvent::Finished => Ok(LifecycleEvent::Finished),
        SignatureEvent::Cancelled { reason } => Ok(LifecycleEvent::Cancelled {
            reason: reason
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| "cancelado no provedor de assinatura".to_string()),
        }),
        SignatureEvent::Signed { email } => data
            .party_for_email(email)
            .map(|party| LifecycleEvent::Signed { party, signed_at: Utc::now() })
            .ok_or_else(|| format!("signatário {} não é parte do contrato", email)),
        SignatureEvent::Other { type_post } => Err(format!("tipo de notificação {} ignorado", type_post)),
    }
}

/// Cidade do anúncio (`"Cidade, UF"` ou `"Cidade/UF"`) como foro
fn jurisdiction_for(location: &str) -> String {
    let location = location.trim();
    if location.is_empty() {
        DEFAULT_JURISDICTION.to_string()
    } else {
        location.replace(", ", "/")
    }
}

pub fn build_contract_data(
    booking: &Booking,
    vehicle: &Vehicle,
    renter: &User,
    owner: &User,
    settings: &AdminSettings,
) -> ContractData {
    ContractData {
        contract_number: generate_contract_number(Utc::now().year()),
        booking_id: booking.id,
        vehicle_id: vehicle.id,
        renter_id: renter.id,
        owner_id: owner.id,
        vehicle: ContractVehicle {
            brand: vehicle.brand.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            license_plate: vehicle.license_plate.clone(),
            location: vehicle.location.clone(),
        },
        renter: ContractParty {
            name: renter.name.clone(),
            email: renter.email.clone(),
            phone: renter.phone.clone(),
        },
        owner: ContractParty {
            name: owner.name.clone(),
            email: owner.email.clone(),
            phone: owner.phone.clone(),
        },
        booking: ContractBooking {
            start_date: booking.start_date,
            end_date: booking.end_date,
            day_count: i64::from(booking.day_count),
            daily_rate: booking.daily_rate,
            service_fee: booking.service_fee,
            insurance_fee: booking.insurance_fee,
            discount: booking.discount,
            total_price: booking.total_price,
            security_deposit: booking.security_deposit,
        },
        terms: ContractTerms {
            cancellation_policy_days: settings.cancellation_policy_days,
            currency: settings.currency.clone(),
            jurisdiction: jurisdiction_for(&vehicle.location),
        },
    }
}

pub fn render_contract(templates: &Tera, data: &ContractData) -> Result<String, AppError> {
    let context = Context::from_serialize(data)
        .map_err(|e| AppError::Internal(format!("contexto do contrato inválido: {}", e)))?;
    templates
        .render(CONTRACT_TEMPLATE, &context)
        .map_err(|e| AppError::Internal(format!("falha ao renderizar contrato: {}", e)))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::clients::{ClientError, ClientResult, RemoteDocumentStatus, RenderedDocument};
    use crate::domain::contract_lifecycle::Party;
    use crate::models::booking::PaymentStatus;
    use crate::models::document::VerificationStatus;
    use crate::models::user::UserRole;
    use crate::models::vehicle::{ApprovalStatus, DepositType};
    use crate::state::load_templates;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    /// Provedor que registra as chamadas e falha na etapa pedida
    #[derive(Default)]
    struct ScriptedSignatures {
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSignatures {
        fn failing_on(step: &'static str) -> Self {
            Self { fail_on: Some(step), ..Self::default() }
        }

        fn step(&self, name: &str) -> ClientResult<()> {
            self.calls.lock().unwrap().push(name.to_string());
            if self.fail_on == Some(name) {
                return Err(ClientError::Status { provider: "fake", status: 400, body: name.to_string() });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SignatureProvider for ScriptedSignatures {
        async fn upload_document(&self, _name: &str, _pdf: &[u8]) -> ClientResult<String> {
            self.step("upload")?;
            Ok("doc-1".to_string())
        }

        async fn add_signers(&self, _document_id: &str, _signers: &[Signer]) -> ClientResult<()> {
            self.step("add_signers")
        }

        async fn send_to_signers(&self, _document_id: &str, _message: &str) -> ClientResult<()> {
            self.step("send")
        }

        async fn document_status(&self, _document_id: &str) -> ClientResult<RemoteDocumentStatus> {
            self.step("status")?;
            Ok(RemoteDocumentStatus { state: RemoteDocumentState::Pending, signers: Vec::new() })
        }

        async fn cancel_document(&self, document_id: &str, _reason: &str) -> ClientResult<()> {
            self.step(&format!("cancel:{}", document_id))
        }

        async fn download_signed(&self, _document_id: &str) -> ClientResult<RenderedDocument> {
            self.step("download")?;
            Ok(RenderedDocument { content_type: "application/pdf".to_string(), bytes: b"%PDF".to_vec() })
        }
    }

    fn signers() -> [Signer; 2] {
        [
            Signer { name: "Ana".to_string(), email: "ana@example.com".to_string() },
            Signer { name: "Bruno".to_string(), email: "bruno@example.com".to_string() },
        ]
    }

    fn contract(status: ContractStatus, document: Option<&str>) -> Contract {
        Contract {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            contract_number: "CT2025ABCD1234".to_string(),
            status,
            contract_data: sqlx::types::Json(sample_data()),
            external_document_id: document.map(str::to_string),
            renter_signed: false,
            renter_signed_at: None,
            owner_signed: false,
            owner_signed_at: None,
            pdf_url: None,
            signed_pdf_url: None,
            last_event_key: None,
            cancellation_reason: None,
            cancelled_at: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_data() -> ContractData {
        ContractData {
            contract_number: "CT2025ABCD1234".to_string(),
            booking_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            renter_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            vehicle: ContractVehicle {
                brand: "Fiat".to_string(),
                model: "Argo".to_string(),
                year: 2022,
                license_plate: "ABC1D23".to_string(),
                location: "Campinas, SP".to_string(),
            },
            renter: ContractParty {
                name: "Ana Locatária".to_string(),
                email: "ana@example.com".to_string(),
                phone: None,
            },
            owner: ContractParty {
                name: "Bruno Proprietário".to_string(),
                email: "bruno@example.com".to_string(),
                phone: Some("11999990000".to_string()),
            },
            booking: ContractBooking {
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                day_count: 3,
                daily_rate: Decimal::new(10000, 2),
                service_fee: Decimal::new(3000, 2),
                insurance_fee: Decimal::new(4500, 2),
                discount: Decimal::ZERO,
                total_price: Decimal::new(37500, 2),
                security_deposit: Decimal::new(6000, 2),
            },
            terms: ContractTerms {
                cancellation_policy_days: 2,
                currency: "BRL".to_string(),
                jurisdiction: "Campinas/SP".to_string(),
            },
        }
    }

    #[test]
    fn test_contract_template_renders_snapshot() {
        let tera = load_templates().unwrap();
        let html = render_contract(&tera, &sample_data()).unwrap();
        assert!(html.contains("CT2025ABCD1234"));
        assert!(html.contains("Ana Locatária"));
        assert!(html.contains("ABC1D23"));
        assert!(html.contains("375.00"));
    }

    #[test]
    fn test_signed_event_maps_signer_to_party() {
        let data = sample_data();
        let event = to_lifecycle_event(&SignatureEvent::Signed { email: "BRUNO@example.com".into() }, &data).unwrap();
        assert!(matches!(event, LifecycleEvent::Signed { party: Party::Owner, .. }));

        let unknown = to_lifecycle_event(&SignatureEvent::Signed { email: "x@y.com".into() }, &data);
        assert!(unknown.is_err());
        assert!(to_lifecycle_event(&SignatureEvent::Other { type_post: "2".into() }, &data).is_err());
    }

    #[test]
    fn test_cancel_without_reason_gets_default() {
        let event = to_lifecycle_event(&SignatureEvent::Cancelled { reason: Some("  ".into()) }, &sample_data()).unwrap();
        assert_eq!(
            event,
            LifecycleEvent::Cancelled { reason: "cancelado no provedor de assinatura".to_string() }
        );
    }

    #[test]
    fn test_jurisdiction_from_location() {
        assert_eq!(jurisdiction_for("Campinas, SP"), "Campinas/SP");
        assert_eq!(jurisdiction_for("  "), DEFAULT_JURISDICTION);
    }

    #[test]
    fn test_contract_data_keeps_source_identifiers() {
        let now = Utc::now();
        let renter = User {
            id: Uuid::new_v4(),
            name: "Ana Locatária".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: String::new(),
            phone: None,
            role: UserRole::Renter,
            verification_status: VerificationStatus::Verified,
            created_at: now,
        };
        let owner = User {
            id: Uuid::new_v4(),
            name: "Bruno Proprietário".to_string(),
            email: "bruno@example.com".to_string(),
            role: UserRole::Owner,
            ..renter.clone()
        };
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            brand: "Fiat".to_string(),
            model: "Argo".to_string(),
            year: 2022,
            license_plate: "ABC1D23".to_string(),
            location: "Campinas, SP".to_string(),
            price_per_day: Decimal::new(10000, 2),
            deposit_type: DepositType::Percentage,
            deposit_value: Decimal::new(20, 0),
            is_available: true,
            approval_status: ApprovalStatus::Approved,
            status_reason: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        let booking = Booking {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            renter_id: renter.id,
            owner_id: owner.id,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            day_count: 3,
            daily_rate: Decimal::new(10000, 2),
            base_price: Decimal::new(30000, 2),
            service_fee: Decimal::new(3000, 2),
            insurance_fee: Decimal::new(4500, 2),
            discount: Decimal::ZERO,
            total_price: Decimal::new(37500, 2),
            security_deposit: Decimal::new(6000, 2),
            coupon_code: None,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            payment_intent_id: Some("pi_1".to_string()),
            inspection_status: InspectionStatus::NotRequired,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        let data = build_contract_data(&booking, &vehicle, &renter, &owner, &AdminSettings::default());
        let stored = serde_json::to_value(&data).unwrap();
        let back: ContractData = serde_json::from_value(stored).unwrap();

        assert_eq!(back.booking_id, booking.id);
        assert_eq!(back.vehicle_id, vehicle.id);
        assert_eq!(back.renter_id, renter.id);
        assert_eq!(back.owner_id, owner.id);
        assert_eq!(back.terms.jurisdiction, "Campinas/SP");
    }

    #[test]
    fn test_replayed_event_key_is_duplicate_even_if_state_would_change() {
        let sent = ContractState::draft().send().unwrap();
        let event = LifecycleEvent::Signed { party: Party::Renter, signed_at: Utc::now() };

        let fresh = settle_event(true, sent.apply(&event).unwrap());
        assert!(matches!(fresh, EventStep::Persist(ref next) if next.status == ContractStatus::RenterSigned));

        assert_eq!(settle_event(false, sent.apply(&event).unwrap()), EventStep::Duplicate);
    }

    #[test]
    fn test_new_key_for_late_signature_is_recorded_without_change() {
        let sent = ContractState::draft().send().unwrap();
        let completed = match sent.apply(&LifecycleEvent::Finished).unwrap() {
            Transition::Updated(state) => state,
            Transition::Unchanged(reason) => panic!("esperava conclusão: {}", reason),
        };
        let late = LifecycleEvent::Signed { party: Party::Owner, signed_at: Utc::now() };
        assert!(matches!(
            settle_event(true, completed.apply(&late).unwrap()),
            EventStep::Unchanged(_)
        ));
    }

    #[test]
    fn test_signed_pdf_requires_completed_contract_with_document() {
        let sent = contract(ContractStatus::Sent, Some("doc-1"));
        assert!(matches!(
            signed_document_id(&sent),
            Err(AppError::Domain(DomainError::InvalidTransition(_)))
        ));

        let orphan = contract(ContractStatus::Completed, None);
        assert!(matches!(signed_document_id(&orphan), Err(AppError::NotFound(_))));

        let completed = contract(ContractStatus::Completed, Some("doc-1"));
        assert_eq!(signed_document_id(&completed).unwrap(), "doc-1");
    }

    #[tokio::test]
    async fn test_dispatch_cancels_uploaded_document_when_signers_fail() {
        let provider = ScriptedSignatures::failing_on("add_signers");
        let result = dispatch_for_signature(&provider, "Contrato", b"%PDF", &signers(), "assine").await;

        assert!(matches!(result, Err(AppError::ExternalApi(_))));
        assert_eq!(provider.calls(), vec!["upload", "add_signers", "cancel:doc-1"]);
    }

    #[tokio::test]
    async fn test_dispatch_failing_upload_leaves_nothing_to_cancel() {
        let provider = ScriptedSignatures::failing_on("upload");
        let result = dispatch_for_signature(&provider, "Contrato", b"%PDF", &signers(), "assine").await;

        assert!(result.is_err());
        assert_eq!(provider.calls(), vec!["upload"]);
    }

    #[tokio::test]
    async fn test_dispatch_returns_document_id() {
        let provider = ScriptedSignatures::default();
        let document_id = dispatch_for_signature(&provider, "Contrato", b"%PDF", &signers(), "assine")
            .await
            .unwrap();

        assert_eq!(document_id, "doc-1");
        assert_eq!(provider.calls(), vec!["upload", "add_signers", "send"]);
    }
}
