//! Máquina de estados do contrato
//!
//! `draft → sent → (renter_signed | owner_signed) → completed`, com
//! `cancelled` a partir de qualquer estado não terminal. Eventos vindos do
//! provedor de assinatura depois de um estado terminal são ignorados.

use chrono::{DateTime, NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;
use crate::models::contract::ContractStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Renter,
    Owner,
}

/// Evento interno, já validado e traduzido do payload do provedor
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Sent,
    Signed {
        party: Party,
        signed_at: DateTime<Utc>,
    },
    Finished,
    Cancelled {
        reason: String,
    },
}

impl LifecycleEvent {
    pub fn action(&self) -> &'static str {
        match self {
            LifecycleEvent::Sent => "sent",
            LifecycleEvent::Signed { party: Party::Renter, .. } => "renter_signed",
            LifecycleEvent::Signed { party: Party::Owner, .. } => "owner_signed",
            LifecycleEvent::Finished => "finished",
            LifecycleEvent::Cancelled { .. } => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractState {
    pub status: ContractStatus,
    pub renter_signed_at: Option<DateTime<Utc>>,
    pub owner_signed_at: Option<DateTime<Utc>>,
    /// Preenchida pelo serviço só depois que o PDF assinado foi armazenado
    pub signed_pdf_url: Option<String>,
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nada muda; o motivo vai para a trilha de auditoria
    Unchanged(&'static str),
    Updated(ContractState),
}

impl ContractState {
    pub fn draft() -> Self {
        Self {
            status: ContractStatus::Draft,
            renter_signed_at: None,
            owner_signed_at: None,
            signed_pdf_url: None,
            cancellation_reason: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ContractStatus::Completed | ContractStatus::Cancelled
        )
    }

    pub fn send(&self) -> Result<ContractState, DomainError> {
        match self.status {
            ContractStatus::Draft => Ok(ContractState {
                status: ContractStatus::Sent,
                ..self.clone()
            }),
            ContractStatus::Completed | ContractStatus::Cancelled => {
                Err(DomainError::InvalidTransition(format!(
                    "contrato {} não pode ser enviado",
                    self.status.as_str()
                )))
            }
            _ => Err(DomainError::Conflict(
                "contrato já foi enviado para assinatura".to_string(),
            )),
        }
    }

    pub fn cancel(&self, reason: &str) -> Result<ContractState, DomainError> {
        if self.is_terminal() {
            return Err(DomainError::Conflict(format!(
                "contrato {} não pode ser cancelado",
                self.status.as_str()
            )));
        }
        Ok(ContractState {
            status: ContractStatus::Cancelled,
            cancellation_reason: Some(reason.to_string()),
            ..self.clone()
        })
    }

    /// Aplica um evento do provedor de assinatura
    pub fn apply(&self, event: &LifecycleEvent) -> Result<Transition, DomainError> {
        if self.is_terminal() {
            return Ok(Transition::Unchanged("contrato já finalizado"));
        }

        match event {
            LifecycleEvent::Sent => match self.status {
                ContractStatus::Draft => Ok(Transition::Updated(self.send()?)),
                _ => Ok(Transition::Unchanged("contrato já enviado")),
            },
            LifecycleEvent::Signed { party, signed_at } => {
                if self.status == ContractStatus::Draft {
                    return Err(DomainError::InvalidTransition(
                        "assinatura recebida para contrato ainda não enviado".to_string(),
                    ));
                }

                let mut next = self.clone();
                let slot = match party {
                    Party::Renter => &mut next.renter_signed_at,
                    Party::Owner => &mut next.owner_signed_at,
                };
                if slot.is_some() {
                    return Ok(Transition::Unchanged("assinatura já registrada"));
                }
                *slot = Some(*signed_at);

                next.status = match (next.renter_signed_at, next.owner_signed_at) {
                    (Some(_), Some(_)) => ContractStatus::Completed,
                    (Some(_), None) => ContractStatus::RenterSigned,
                    (None, Some(_)) => ContractStatus::OwnerSigned,
                    (None, None) => next.status,
                };
                Ok(Transition::Updated(next))
            }
            LifecycleEvent::Finished => {
                if self.status == ContractStatus::Draft {
                    return Err(DomainError::InvalidTransition(
                        "conclusão recebida para contrato ainda não enviado".to_string(),
                    ));
                }
                let now = Utc::now();
                Ok(Transition::Updated(ContractState {
                    status: ContractStatus::Completed,
                    renter_signed_at: self.renter_signed_at.or(Some(now)),
                    owner_signed_at: self.owner_signed_at.or(Some(now)),
                    signed_pdf_url: self.signed_pdf_url.clone(),
                    cancellation_reason: None,
                }))
            }
            LifecycleEvent::Cancelled { reason } => Ok(Transition::Updated(self.cancel(reason)?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractParty {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractVehicle {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractBooking {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub day_count: i64,
    pub daily_rate: Decimal,
    pub service_fee: Decimal,
    pub insurance_fee: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
    pub security_deposit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub cancellation_policy_days: i32,
    pub currency: String,
    pub jurisdiction: String,
}

/// Snapshot das variáveis preenchidas no template do contrato
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractData {
    pub contract_number: String,
    pub booking_id: Uuid,
    pub vehicle_id: Uuid,
    pub renter_id: Uuid,
    pub owner_id: Uuid,
    pub vehicle: ContractVehicle,
    pub renter: ContractParty,
    pub owner: ContractParty,
    pub booking: ContractBooking,
    pub terms: ContractTerms,
}

impl ContractData {
    /// Identifica a parte pelo e-mail do signatário (sem diferenciar maiúsculas)
    pub fn party_for_email(&self, email: &str) -> Option<Party> {
        let email = email.trim();
        if self.renter.email.eq_ignore_ascii_case(email) {
            Some(Party::Renter)
        } else if self.owner.email.eq_ignore_ascii_case(email) {
            Some(Party::Owner)
        } else {
            None
        }
    }
}

/// `CT{ano}{8 caracteres alfanuméricos maiúsculos}`
pub fn generate_contract_number(year: i32) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect();
    format!("CT{}{}", year, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sent() -> ContractState {
        ContractState::draft().send().unwrap()
    }

    fn signed(party: Party) -> LifecycleEvent {
        LifecycleEvent::Signed {
            party,
            signed_at: Utc::now(),
        }
    }

    fn updated(t: Transition) -> ContractState {
        match t {
            Transition::Updated(state) => state,
            Transition::Unchanged(reason) => panic!("esperava transição, veio: {}", reason),
        }
    }

    #[test]
    fn test_send_only_from_draft() {
        let state = sent();
        assert_eq!(state.status, ContractStatus::Sent);
        assert!(matches!(state.send(), Err(DomainError::Conflict(_))));

        let cancelled = state.cancel("teste").unwrap();
        assert!(matches!(cancelled.send(), Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn test_renter_then_owner_completes_and_late_events_are_noops() {
        let after_renter = updated(sent().apply(&signed(Party::Renter)).unwrap());
        assert_eq!(after_renter.status, ContractStatus::RenterSigned);

        let completed = updated(after_renter.apply(&signed(Party::Owner)).unwrap());
        assert_eq!(completed.status, ContractStatus::Completed);
        assert!(completed.renter_signed_at.is_some());
        assert!(completed.owner_signed_at.is_some());
        // a URL só aparece quando o PDF assinado é baixado e armazenado
        assert_eq!(completed.signed_pdf_url, None);

        assert!(matches!(
            completed.apply(&signed(Party::Owner)).unwrap(),
            Transition::Unchanged(_)
        ));
        assert!(matches!(
            completed.apply(&LifecycleEvent::Sent).unwrap(),
            Transition::Unchanged(_)
        ));
    }

    #[test]
    fn test_owner_first_then_duplicate_owner_is_noop() {
        let after_owner = updated(sent().apply(&signed(Party::Owner)).unwrap());
        assert_eq!(after_owner.status, ContractStatus::OwnerSigned);
        assert!(matches!(
            after_owner.apply(&signed(Party::Owner)).unwrap(),
            Transition::Unchanged(_)
        ));
    }

    #[test]
    fn test_signature_on_draft_is_invalid() {
        let result = ContractState::draft().apply(&signed(Party::Renter));
        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn test_cancel_rules() {
        let partially = updated(sent().apply(&signed(Party::Renter)).unwrap());
        let cancelled = partially.cancel("locatário desistiu").unwrap();
        assert_eq!(cancelled.status, ContractStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("locatário desistiu"));

        let completed = updated(sent().apply(&LifecycleEvent::Finished).unwrap());
        assert!(matches!(completed.cancel("tarde demais"), Err(DomainError::Conflict(_))));
        assert!(matches!(cancelled.cancel("de novo"), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn test_provider_cancellation_after_completion_is_ignored() {
        let completed = updated(sent().apply(&LifecycleEvent::Finished).unwrap());
        let result = completed
            .apply(&LifecycleEvent::Cancelled { reason: "provedor".into() })
            .unwrap();
        assert!(matches!(result, Transition::Unchanged(_)));
    }

    fn sample_data() -> ContractData {
        ContractData {
            contract_number: generate_contract_number(2025),
            booking_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            renter_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            vehicle: ContractVehicle {
                brand: "Fiat".into(),
                model: "Argo".into(),
                year: 2022,
                license_plate: "BRA2E19".into(),
                location: "São Paulo, SP".into(),
            },
            renter: ContractParty {
                name: "Ana Souza".into(),
                email: "ana@example.com".into(),
                phone: Some("11999990000".into()),
            },
            owner: ContractParty {
                name: "Carlos Lima".into(),
                email: "Carlos@Example.com".into(),
                phone: None,
            },
            booking: ContractBooking {
                start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
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
                currency: "BRL".into(),
                jurisdiction: "São Paulo/SP".into(),
            },
        }
    }

    #[test]
    fn test_contract_data_json_round_trip() {
        let data = sample_data();
        let json = serde_json::to_value(&data).unwrap();
        let back: ContractData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_party_lookup_ignores_case() {
        let data = sample_data();
        assert_eq!(data.party_for_email("carlos@example.com"), Some(Party::Owner));
        assert_eq!(data.party_for_email(" ANA@example.com "), Some(Party::Renter));
        assert_eq!(data.party_for_email("outro@example.com"));
    }

    #[test]
    fn test_contract_number_format() {
        let number = generate_contract_number(2025);
        assert_eq!(number.len(), 14);
        assert!(number.starts_with("CT2025"));
        assert!(number[6..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
