//! Reservas: orçamento, criação, pagamento, cancelamento e conclusão
//!
//! A confirmação do pagamento repete a checagem de disponibilidade dentro de
//! uma transação SERIALIZABLE; a constraint de exclusão em `bookings` barra
//! qualquer corrida que sobreviva (mapeada para 409). Reserva paga que é
//! cancelada recebe o estorno integral.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::clients::{NewPaymentIntent, PaymentIntent, PaymentIntentStatus, PaymentProvider};
use crate::domain::availability::check_range;
use crate::domain::pricing::{quote, BookingQuote, CouponTerms, DepositRule};
use crate::domain::verification::ensure_can_confirm_payment;
use crate::domain::{DateRange, DomainError};
use crate::dto::booking_dto::{BookingRequest, CheckoutResponse};
use crate::middleware::AuthenticatedUser;
use crate::models::booking::{Booking, BookingStatus, NewBooking, PaymentStatus};
use crate::models::contract::Contract;
use crate::models::document::VerificationStatus;
use crate::models::settings::AdminSettings;
use crate::models::vehicle::Vehicle;
use crate::repositories::{
    AvailabilityRepository, BookingRepository, ContractRepository, CouponRepository, UserRepository,
    VehicleRepository,
};
use crate::services::availability_service::{
    confirmed_to_ranges, ensure_bookable, period_rules, requested_range, AvailabilityService,
};
use crate::services::contract_service::ContractService;
use crate::services::notification_service::NotificationService;
use crate::services::settings_service::SettingsService;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, not_found_error, AppError};

/// Valor da chave `kind` nos metadados do payment intent
pub const PAYMENT_KIND_BOOKING: &str = "booking";

pub struct BookingService {
    pool: PgPool,
    bookings: BookingRepository,
    vehicles: VehicleRepository,
    users: UserRepository,
    coupons: CouponRepository,
    availability: AvailabilityService,
    settings: SettingsService,
    contracts: ContractService,
    payments: Arc<dyn PaymentProvider>,
    notifications: NotificationService,
}

impl BookingService {
    pub fn new(state: &AppState) -> Self {
        let pool = state.pool.clone();
        Self {
            bookings: BookingRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            coupons: CouponRepository::new(pool.clone()),
            availability: AvailabilityService::new(pool.clone()),
            settings: SettingsService::new(pool.clone()),
            contracts: ContractService::new(state),
            payments: state.providers.payments.clone(),
            notifications: NotificationService::new(state.providers.notifier.clone()),
            pool,
        }
    }

    async fn vehicle(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    async fn coupon_terms(&self, code: Option<&str>) -> Result<Option<CouponTerms>, AppError> {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(None);
        };
        let coupon = self
            .coupons
            .find_by_code(&code.to_uppercase())
            .await?
            .ok_or_else(|| DomainError::CouponRejected("Cupom não encontrado".to_string()))?;
        Ok(Some(coupon.terms()))
    }

    fn price(
        vehicle: &Vehicle,
        range: &DateRange,
        settings: &AdminSettings,
        coupon: Option<&CouponTerms>,
    ) -> Result<BookingQuote, DomainError> {
        quote(
            vehicle.price_per_day,
            range.start(),
            range.end(),
            &settings.fee_policy(),
            &DepositRule {
                deposit_type: vehicle.deposit_type,
                value: vehicle.deposit_value,
            },
            coupon,
            Utc::now(),
        )
    }

    // ------------------------------------------------------------------
    // Orçamento e criação

    /// Orçamento sem persistir nada
    pub async fn quote(&self, request: &BookingRequest) -> Result<BookingQuote, AppError> {
        let range = requested_range(request.start_date, request.end_date)?;
        let vehicle = self.vehicle(request.vehicle_id).await?;
        let settings = self.settings.current().await?;
        self.availability.ensure_available(&vehicle, &range, &settings).await?;
        let coupon = self.coupon_terms(request.coupon_code.as_deref()).await?;
        Ok(Self::price(&vehicle, &range, &settings, coupon.as_ref())?)
    }

    pub async fn create(&self, user: AuthenticatedUser, request: BookingRequest) -> Result<Booking, AppError> {
        let range = requested_range(request.start_date, request.end_date)?;
        let vehicle = self.vehicle(request.vehicle_id).await?;
        if vehicle.owner_id == user.user_id {
            return Err(DomainError::Conflict(
                "o proprietário não pode reservar o próprio veículo".to_string(),
            )
            .into());
        }

        let settings = self.settings.current().await?;
        self.availability.ensure_available(&vehicle, &range, &settings).await?;
        let coupon = self.coupon_terms(request.coupon_code.as_deref()).await?;
        let priced = Self::price(&vehicle, &range, &settings, coupon.as_ref())?;

        let booking = self
            .bookings
            .create(NewBooking {
                vehicle_id: vehicle.id,
                renter_id: user.user_id,
                owner_id: vehicle.owner_id,
                range,
                breakdown: priced.breakdown,
                security_deposit: priced.security_deposit,
                coupon_code: priced.coupon_code,
            })
            .await?;

        tracing::info!(
            "📅 Reserva {} criada: veículo {} de {} a {} (total {})",
            booking.id,
            vehicle.id,
            booking.start_date,
            booking.end_date,
            booking.total_price
        );
        Ok(booking)
    }

    // ------------------------------------------------------------------
    // Consultas

    pub async fn list_mine(&self, user: AuthenticatedUser) -> Result<Vec<Booking>, AppError> {
        self.bookings.list_for_user(user.user_id).await
    }

    pub async fn get(&self, user: AuthenticatedUser, id: Uuid) -> Result<Booking, AppError> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Booking", id))?;
        if !booking.involves(user.user_id) && !user.is_admin() {
            return Err(forbidden_error("acessar reserva", "usuário não é parte da reserva"));
        }
        Ok(booking)
    }

    // ------------------------------------------------------------------
    // Pagamento

    pub async fn checkout(&self, user: AuthenticatedUser, id: Uuid) -> Result<CheckoutResponse, AppError> {
        let booking = self.get(user, id).await?;
        if booking.renter_id != user.user_id {
            return Err(forbidden_error("pagar reserva", "apenas o locatário pode pagar"));
        }
        ensure_pending(&booking)?;

        let settings = self.settings.current().await?;
        let amount_cents = to_cents(booking.total_price)?;

        // checkout repetido devolve o mesmo intent para não haver dois pagáveis
        if let Some(existing) = &booking.payment_intent_id {
            let intent = self.payments.retrieve_payment_intent(existing).await?;
            if reusable_intent(&intent, amount_cents) {
                tracing::info!("💳 Reutilizando payment intent {} da reserva {}", intent.id, booking.id);
                return Ok(CheckoutResponse {
                    payment_intent_id: intent.id,
                    client_secret: intent.client_secret,
                    amount: booking.total_price,
                    currency: settings.currency,
                });
            }
        }

        let intent = self
            .payments
            .create_payment_intent(NewPaymentIntent {
                amount_cents,
                currency: settings.currency.to_lowercase(),
                description: format!("Reserva {} - alugae.mobi", booking.id),
                metadata: HashMap::from([
                    ("kind".to_string(), PAYMENT_KIND_BOOKING.to_string()),
                    ("booking_id".to_string(), booking.id.to_string()),
                    ("user_id".to_string(), user.user_id.to_string()),
                ]),
            })
            .await?;

        self.bookings.set_payment_intent(booking.id, &intent.id).await?;
        tracing::info!("💳 Payment intent {} criado para a reserva {}", intent.id, booking.id);

        Ok(CheckoutResponse {
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            amount: booking.total_price,
            currency: settings.currency,
        })
    }

    /// Confirmação pedida pelo locatário após o pagamento no front
    pub async fn confirm_payment(&self, user: AuthenticatedUser, id: Uuid) -> Result<Booking, AppError> {
        let booking = self.get(user, id).await?;
        if booking.renter_id != user.user_id && !user.is_admin() {
            return Err(forbidden_error("confirmar pagamento", "apenas o locatário pode confirmar"));
        }
        let intent_id = booking.payment_intent_id.clone().ok_or_else(|| {
            DomainError::InvalidTransition("a reserva ainda não possui pagamento iniciado".to_string())
        })?;
        let intent = self.payments.retrieve_payment_intent(&intent_id).await?;
        self.confirm(booking, intent).await
    }

    /// Confirmação vinda do webhook `payment_intent.succeeded`. A reserva é
    /// achada pelo intent gravado ou, se ele foi substituído, pelos metadados
    pub async fn confirm_from_webhook(&self, intent: PaymentIntent) -> Result<Option<Booking>, AppError> {
        let booking = match self.bookings.find_by_payment_intent(&intent.id).await? {
            Some(booking) => Some(booking),
            None => match booking_id_from_metadata(&intent) {
                Some(id) => self.bookings.find_by_id(id).await?,
                None => None,
            },
        };
        let Some(booking) = booking else {
            tracing::warn!("⚠️ Payment intent {} sem reserva associada", intent.id);
            return Ok(None);
        };
        // o corpo do webhook não é fonte de verdade: consulta o provedor
        let intent = self.payments.retrieve_payment_intent(&intent.id).await?;
        self.confirm(booking, intent).await.map(Some)
    }

    /// `payment_intent.payment_failed`: reserva continua pendente
    pub async fn payment_failed(&self, intent: &PaymentIntent) -> Result<(), AppError> {
        if let Some(booking) = self.bookings.find_by_payment_intent(&intent.id).await? {
            self.bookings.mark_payment_failed(booking.id).await?;
            tracing::warn!("❌ Pagamento {} recusado para a reserva {}", intent.id, booking.id);
        }
        Ok(())
    }

    async fn confirm(&self, booking: Booking, intent: PaymentIntent) -> Result<Booking, AppError> {
        if booking.status == BookingStatus::Confirmed && booking.payment_status == PaymentStatus::Paid {
            return Ok(booking);
        }
        ensure_pending(&booking)?;

        let renter = self
            .users
            .find_by_id(booking.renter_id)
            .await?
            .ok_or_else(|| not_found_error("User", booking.renter_id))?;
        let expected_cents = to_cents(booking.total_price)?;
        if payment_gate(renter.verification_status, &intent, expected_cents)? == PaymentGate::Declined {
            self.bookings.mark_payment_failed(booking.id).await?;
            return Err(DomainError::PaymentDeclined(format!(
                "pagamento {} não foi aprovado",
                intent.id
            ))
            .into());
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let locked = BookingRepository::find_by_id_for_update_tx(&mut *tx, booking.id)
            .await?
            .ok_or_else(|| not_found_error("Booking", booking.id))?;
        ensure_pending(&locked)?;
        let vehicle = VehicleRepository::find_by_id_tx(&mut *tx, locked.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", locked.vehicle_id))?;
        ensure_bookable(&vehicle)?;

        let range = locked.range().ok_or_else(|| {
            AppError::Internal(format!("reserva {} com intervalo inválido", locked.id))
        })?;
        let confirmed =
            confirmed_to_ranges(BookingRepository::confirmed_ranges_tx(&mut *tx, vehicle.id, locked.id).await?);
        let periods = AvailabilityRepository::list_for_vehicle_tx(&mut *tx, vehicle.id).await?;
        check_range(&range, &confirmed, &period_rules(&periods))?;

        let confirmed_booking = BookingRepository::mark_confirmed_tx(&mut *tx, locked.id, &intent.id).await?;
        if let Some(code) = &confirmed_booking.coupon_code {
            if !CouponRepository::increment_usage_tx(&mut *tx, code).await? {
                tracing::warn!("⚠️ Cupom {} já atingiu o limite de usos", code);
            }
        }
        tx.commit().await?;

        tracing::info!("✅ Reserva {} confirmada (pagamento {})", confirmed_booking.id, intent.id);

        if let Err(e) = self.contracts.generate_for_booking(confirmed_booking.id, None).await {
            tracing::error!(
                "❌ Falha ao gerar contrato da reserva {}: {} (use POST /api/bookings/{}/contract)",
                confirmed_booking.id,
                e,
                confirmed_booking.id
            );
        }
        self.notify_confirmed(&confirmed_booking, &vehicle).await;
        Ok(confirmed_booking)
    }

    async fn notify_confirmed(&self, booking: &Booking, vehicle: &Vehicle) {
        let renter = self.users.find_by_id(booking.renter_id).await;
        let owner = self.users.find_by_id(booking.owner_id).await;
        match (renter, owner) {
            (Ok(Some(renter)), Ok(Some(owner))) => {
                self.notifications
                    .booking_confirmed(booking, vehicle, &renter, &owner)
                    .await
            }
            _ => tracing::warn!("⚠️ Partes da reserva {} não encontradas para notificação", booking.id),
        }
    }

    /// Gera novamente o contrato quando a geração automática falhou
    pub async fn generate_contract(&self, user: AuthenticatedUser, id: Uuid) -> Result<Contract, AppError> {
        self.get(user, id).await?;
        self.contracts.generate_for_booking(id, Some(user)).await
    }

    // ------------------------------------------------------------------
    // Cancelamento e conclusão

    pub async fn cancel(&self, user: AuthenticatedUser, id: Uuid, reason: Option<&str>) -> Result<Booking, AppError> {
        let booking = self.get(user, id).await?;
        if refund_due(&booking) {
            // cancelada antes, mas o estorno não foi concluído
            return self.refund(booking).await;
        }
        let settings = self.settings.current().await?;
        ensure_can_cancel(&booking, user, settings.cancellation_policy_days, Utc::now().date_naive())?;

        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or("cancelada pelo usuário")
            .to_string();

        let mut tx = self.pool.begin().await?;
        let locked = BookingRepository::find_by_id_for_update_tx(&mut *tx, id)
            .await?
            .ok_or_else(|| not_found_error("Booking", id))?;
        ensure_can_cancel(&locked, user, settings.cancellation_policy_days, Utc::now().date_naive())?;

        let cancelled_contract = match ContractRepository::find_active_by_booking_tx(&mut *tx, id).await? {
            Some(contract) if !contract.state().is_terminal() => Some(
                ContractService::cancel_locked(&mut *tx, &contract, &reason, Some(user.user_id)).await?,
            ),
            _ => None,
        };
        let cancelled = BookingRepository::cancel_tx(&mut *tx, id, &reason).await?;
        tx.commit().await?;

        if let Some(contract) = &cancelled_contract {
            self.contracts.cancel_remote(contract, &reason).await;
        }
        tracing::info!("🛑 Reserva {} cancelada por {}: {}", id, user.user_id, reason);

        if refund_due(&cancelled) {
            return self.refund(cancelled).await;
        }
        Ok(cancelled)
    }

    /// Estorno integral; repetir o cancelamento refaz só esta etapa
    async fn refund(&self, booking: Booking) -> Result<Booking, AppError> {
        let Some(intent_id) = booking.payment_intent_id.as_deref() else {
            return Ok(booking);
        };
        let refund = match self.payments.refund(intent_id, to_cents(booking.total_price)?).await {
            Ok(refund) => refund,
            Err(e) => {
                tracing::error!(
                    "❌ Estorno da reserva {} falhou: {} (cancele novamente para refazer)",
                    booking.id,
                    e
                );
                return Err(e.into());
            }
        };
        let refunded = self.bookings.mark_refunded(booking.id).await?;
        tracing::info!("↩️ Reserva {} estornada ({}, {} centavos)", booking.id, refund.id, refund.amount);
        Ok(refunded)
    }

    pub async fn complete(&self, user: AuthenticatedUser, id: Uuid) -> Result<Booking, AppError> {
        let booking = self.get(user, id).await?;
        user.require_owner_or_admin(booking.owner_id)?;
        if booking.status != BookingStatus::Confirmed {
            return Err(DomainError::InvalidTransition(format!(
                "apenas reservas confirmadas podem ser concluídas (status atual: {})",
                booking.status.as_str()
            ))
            .into());
        }
        if Utc::now().date_naive() < booking.end_date {
            return Err(DomainError::InvalidTransition(
                "a reserva só pode ser concluída após a data de devolução".to_string(),
            )
            .into());
        }
        let completed = self.bookings.mark_completed(id).await?;
        tracing::info!("🏁 Reserva {} concluída", id);
        Ok(completed)
    }
}

fn ensure_pending(booking: &Booking) -> Result<(), DomainError> {
    if booking.status != BookingStatus::Pending {
        return Err(DomainError::InvalidTransition(format!(
            "a reserva está {} e não aceita pagamento",
            booking.status.as_str()
        )));
    }
    Ok(())
}

/// Locatário precisa respeitar a antecedência mínima; proprietário e admin
/// podem cancelar até o início da locação
fn ensure_can_cancel(
    booking: &Booking,
    user: AuthenticatedUser,
    notice_days: i32,
    today: chrono::NaiveDate,
) -> Result<(), AppError> {
    if !matches!(booking.status, BookingStatus::Pending | BookingStatus::Confirmed) {
        return Err(DomainError::InvalidTransition(format!(
            "reserva {} não pode ser cancelada",
            booking.status.as_str()
        ))
        .into());
    }

    if user.is_admin() || user.user_id == booking.owner_id {
        if today >= booking.start_date {
            return Err(DomainError::InvalidTransition(
                "a locação já começou e não pode ser cancelada".to_string(),
            )
            .into());
        }
        return Ok(());
    }

    if user.user_id == booking.renter_id {
        let deadline = booking.start_date - Duration::days(i64::from(notice_days));
        if booking.status == BookingStatus::Confirmed && today > deadline {
            return Err(DomainError::InvalidTransition(format!(
                "cancelamento exige {} dia(s) de antecedência",
                notice_days
            ))
            .into());
        }
        if today >= booking.start_date {
            return Err(DomainError::InvalidTransition(
                "a locação já começou e não pode ser cancelada".to_string(),
            )
            .into());
        }
        return Ok(());
    }

    Err(forbidden_error("cancelar reserva", "usuário não é parte da reserva"))
}

/// Intent anterior ainda serve: mesmo valor e não cancelado
fn reusable_intent(intent: &PaymentIntent, amount_cents: i64) -> bool {
    intent.amount == amount_cents && intent.status != PaymentIntentStatus::Canceled
}

fn booking_id_from_metadata(intent: &PaymentIntent) -> Option<Uuid> {
    if intent.metadata.get("kind").map(String::as_str) != Some(PAYMENT_KIND_BOOKING) {
        return None;
    }
    intent.metadata.get("booking_id")?.parse().ok()
}

/// Cancelada com pagamento ainda retido no provedor
fn refund_due(booking: &Booking) -> bool {
    booking.status == BookingStatus::Cancelled
        && booking.payment_status == PaymentStatus::Paid
        && booking.payment_intent_id.is_some()
}

#[derive(Debug, PartialEq, Eq)]
enum PaymentGate {
    Approved,
    /// Recusado ou cancelado no provedor: a reserva fica com pagamento falho
    Declined,
}

/// Checagens antes da transação, nesta ordem: verificação do locatário,
/// status do intent e valor pago
fn payment_gate(
    verification: VerificationStatus,
    intent: &PaymentIntent,
    expected_cents: i64,
) -> Result<PaymentGate, AppError> {
    ensure_can_confirm_payment(verification)?;
    match intent.status {
        PaymentIntentStatus::Succeeded => {}
        PaymentIntentStatus::Canceled | PaymentIntentStatus::RequiresPaymentMethod => {
            return Ok(PaymentGate::Declined)
        }
        _ => {
            return Err(DomainError::Conflict(
                "pagamento em processamento, tente novamente em instantes".to_string(),
            )
            .into())
        }
    }
    if intent.amount != expected_cents {
        return Err(AppError::Conflict(format!(
            "valor pago ({} centavos) difere do total da reserva",
            intent.amount
        )));
    }
    Ok(PaymentGate::Approved)
}

/// Valor em centavos para o provedor de pagamento
pub fn to_cents(amount: Decimal) -> Result<i64, AppError> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| AppError::BadRequest(format!("valor inválido: {}", amount)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::InspectionStatus;
    use crate::models::user::UserRole;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn booking(status: BookingStatus, renter: Uuid, owner: Uuid) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            renter_id: renter,
            owner_id: owner,
            start_date: d(2025, 3, 10),
            end_date: d(2025, 3, 13),
            day_count: 3,
            daily_rate: Decimal::new(10000, 2),
            base_price: Decimal::new(30000, 2),
            service_fee: Decimal::new(3000, 2),
            insurance_fee: Decimal::new(4500, 2),
            discount: Decimal::ZERO,
            total_price: Decimal::new(37500, 2),
            security_deposit: Decimal::new(6000, 2),
            coupon_code: None,
            status,
            payment_status: PaymentStatus::Pending,
            payment_intent_id: None,
            inspection_status: InspectionStatus::NotRequired,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(id: Uuid, role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser { user_id: id, role }
    }

    fn intent(status: PaymentIntentStatus, amount: i64) -> PaymentIntent {
        PaymentIntent {
            id: "pi_1".to_string(),
            amount,
            currency: "brl".to_string(),
            status,
            client_secret: Some("pi_1_secret".to_string()),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_to_cents() {
        assert_eq!(to_cents(Decimal::new(37500, 2)).unwrap(), 37500);
        assert_eq!(to_cents(Decimal::new(1999, 2)).unwrap(), 1999);
    }

    #[test]
    fn test_renter_cancellation_respects_notice() {
        let renter = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let b = booking(BookingStatus::Confirmed, renter, owner);
        let as_renter = user(renter, UserRole::Renter);

        // início em 10/03 com 2 dias de antecedência: até 08/03
        assert!(ensure_can_cancel(&b, as_renter, 2, d(2025, 3, 8)).is_ok());
        assert!(ensure_can_cancel(&b, as_renter, 2, d(2025, 3, 9)).is_err());
    }

    #[test]
    fn test_pending_booking_cancels_without_notice() {
        let renter = Uuid::new_v4();
        let b = booking(BookingStatus::Pending, renter, Uuid::new_v4());
        assert!(ensure_can_cancel(&b, user(renter, UserRole::Renter), 2, d(2025, 3, 9)).is_ok());
    }

    #[test]
    fn test_owner_cancels_until_start() {
        let owner = Uuid::new_v4();
        let b = booking(BookingStatus::Confirmed, Uuid::new_v4(), owner);
        let as_owner = user(owner, UserRole::Owner);
        assert!(ensure_can_cancel(&b, as_owner, 2, d(2025, 3, 9)).is_ok());
        assert!(ensure_can_cancel(&b, as_owner, 2, d(2025, 3, 10)).is_err());
    }

    #[test]
    fn test_stranger_and_final_states_cannot_cancel() {
        let b = booking(BookingStatus::Confirmed, Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(
            ensure_can_cancel(&b, user(Uuid::new_v4(), UserRole::Renter), 2, d(2025, 3, 1)),
            Err(AppError::Forbidden(_))
        ));

        let admin = user(Uuid::new_v4(), UserRole::Admin);
        let done = booking(BookingStatus::Completed, Uuid::new_v4(), Uuid::new_v4());
        assert!(ensure_can_cancel(&done, admin, 2, d(2025, 3, 1)).is_err());
    }

    #[test]
    fn test_payment_requires_pending_booking() {
        let b = booking(BookingStatus::Cancelled, Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(ensure_pending(&b), Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn test_unverified_renter_is_rejected_before_intent_status() {
        // mesmo com o intent recusado, a verificação vem primeiro
        let declined = intent(PaymentIntentStatus::Canceled, 37500);
        let result = payment_gate(VerificationStatus::Pending, &declined, 37500);
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::VerificationRequired(VerificationStatus::Pending)))
        ));
    }

    #[test]
    fn test_declined_intent_is_reported_before_amount() {
        let declined = intent(PaymentIntentStatus::RequiresPaymentMethod, 1);
        assert_eq!(
            payment_gate(VerificationStatus::Verified, &declined, 37500).unwrap(),
            PaymentGate::Declined
        );
    }

    #[test]
    fn test_processing_intent_waits_and_wrong_amount_conflicts() {
        let processing = intent(PaymentIntentStatus::Processing, 37500);
        assert!(matches!(
            payment_gate(VerificationStatus::Verified, &processing, 37500),
            Err(AppError::Domain(DomainError::Conflict(_)))
        ));

        let short = intent(PaymentIntentStatus::Succeeded, 30000);
        assert!(matches!(
            payment_gate(VerificationStatus::Verified, &short, 37500),
            Err(AppError::Conflict(_))
        ));

        let paid = intent(PaymentIntentStatus::Succeeded, 37500);
        assert_eq!(
            payment_gate(VerificationStatus::Verified, &paid, 37500).unwrap(),
            PaymentGate::Approved
        );
    }

    #[test]
    fn test_checkout_reuses_open_or_paid_intent() {
        assert!(reusable_intent(&intent(PaymentIntentStatus::RequiresPaymentMethod, 37500), 37500));
        assert!(reusable_intent(&intent(PaymentIntentStatus::Succeeded, 37500), 37500));
        assert!(!reusable_intent(&intent(PaymentIntentStatus::Canceled, 37500), 37500));
        assert!(!reusable_intent(&intent(PaymentIntentStatus::RequiresPaymentMethod, 30000), 37500));
    }

    #[test]
    fn test_replaced_intent_still_points_to_its_booking() {
        let booking_id = Uuid::new_v4();
        let mut paid = intent(PaymentIntentStatus::Succeeded, 37500);
        paid.metadata = HashMap::from([
            ("kind".to_string(), PAYMENT_KIND_BOOKING.to_string()),
            ("booking_id".to_string(), booking_id.to_string()),
        ]);
        assert_eq!(booking_id_from_metadata(&paid), Some(booking_id));

        paid.metadata.insert("kind".to_string(), "coins".to_string());
        assert_eq!(booking_id_from_metadata(&paid), None);
    }

    #[test]
    fn test_refund_due_only_for_cancelled_paid_bookings() {
        let mut b = booking(BookingStatus::Cancelled, Uuid::new_v4(), Uuid::new_v4());
        b.payment_status = PaymentStatus::Paid;
        b.payment_intent_id = Some("pi_1".to_string());
        assert!(refund_due(&b));

        b.payment_status = PaymentStatus::Refunded;
        assert!(!refund_due(&b));

        let mut confirmed = booking(BookingStatus::Confirmed, Uuid::new_v4(), Uuid::new_v4());
        confirmed.payment_status = PaymentStatus::Paid;
        confirmed.payment_intent_id = Some("pi_1".to_string());
        assert!(!refund_due(&confirmed));

        let unpaid = booking(BookingStatus::Cancelled, Uuid::new_v4(), Uuid::new_v4());
        assert!(!refund_due(&unpaid));
    }
}
