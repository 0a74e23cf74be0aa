//! Motor de disponibilidade
//!
//! Um veículo está disponível para `[start, end)` quando:
//! - não há reserva confirmada sobreposta;
//! - não há período marcado como indisponível sobreposto;
//! - se o proprietário declarou períodos disponíveis, o intervalo está
//!   inteiramente coberto por eles (períodos contíguos são unidos).
//!
//! Sem períodos disponíveis declarados o veículo é disponível por padrão.

use uuid::Uuid;

use super::{DateRange, DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRule {
    pub id: Option<Uuid>,
    pub range: DateRange,
    pub is_available: bool,
}

pub fn check_range(
    request: &DateRange,
    confirmed: &[DateRange],
    periods: &[PeriodRule],
) -> Result<(), DomainError> {
    if let Some(booking) = confirmed.iter().find(|b| b.overlaps(request)) {
        return Err(DomainError::Conflict(format!(
            "veículo já reservado entre {} e {}",
            booking.start(),
            booking.end()
        )));
    }

    if let Some(blocked) = periods
        .iter()
        .find(|p| !p.is_available && p.range.overlaps(request))
    {
        return Err(DomainError::Conflict(format!(
            "veículo indisponível entre {} e {}",
            blocked.range.start(),
            blocked.range.end()
        )));
    }

    let declared: Vec<DateRange> = periods
        .iter()
        .filter(|p| p.is_available)
        .map(|p| p.range)
        .collect();

    if declared.is_empty() {
        return Ok(());
    }

    if merge_contiguous(declared)
        .iter()
        .any(|window| window.contains(request))
    {
        Ok(())
    } else {
        Err(DomainError::Conflict(
            "o período solicitado está fora da disponibilidade informada pelo proprietário"
                .to_string(),
        ))
    }
}

pub fn is_range_available(
    request: &DateRange,
    confirmed: &[DateRange],
    periods: &[PeriodRule],
) -> bool {
    check_range(request, confirmed, periods).is_ok()
}

/// Une intervalos que se tocam ou se sobrepõem, ordenados pelo início
fn merge_contiguous(mut ranges: Vec<DateRange>) -> Vec<DateRange> {
    ranges.sort_by_key(|r| r.start());
    let mut merged: Vec<DateRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start() <= last.end() => {
                if range.end() > last.end() {
                    // start < end continua válido: só estendemos o fim
                    *last = DateRange {
                        start: last.start(),
                        end: range.end(),
                    };
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Períodos do mesmo veículo nunca se sobrepõem
pub fn ensure_period_does_not_overlap(
    candidate: &DateRange,
    existing: &[PeriodRule],
    exclude_id: Option<Uuid>,
) -> Result<(), DomainError> {
    let clash = existing
        .iter()
        .filter(|p| exclude_id.is_none() || p.id != exclude_id)
        .find(|p| p.range.overlaps(candidate));

    match clash {
        Some(p) => Err(DomainError::Conflict(format!(
            "já existe um período cadastrado entre {} e {}",
            p.range.start(),
            p.range.end()
        ))),
        None => Ok(()),
    }
}

pub fn ensure_booking_length(
    range: &DateRange,
    minimum_days: i32,
    maximum_days: i32,
) -> Result<(), DomainError> {
    let days = range.days();
    if days < i64::from(minimum_days) {
        return Err(DomainError::InvalidRange(format!(
            "a reserva deve ter no mínimo {} dia(s)",
            minimum_days
        )));
    }
    if days > i64::from(maximum_days) {
        return Err(DomainError::InvalidRange(format!(
            "a reserva deve ter no máximo {} dias",
            maximum_days
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range(from: (u32, u32), to: (u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, from.0, from.1).unwrap(),
            NaiveDate::from_ymd_opt(2025, to.0, to.1).unwrap(),
        )
        .unwrap()
    }

    fn period(r: DateRange, is_available: bool) -> PeriodRule {
        PeriodRule {
            id: Some(Uuid::new_v4()),
            range: r,
            is_available,
        }
    }

    #[test]
    fn test_default_available_without_periods() {
        assert!(is_range_available(&range((4, 1), (4, 5)), &[], &[]));
    }

    #[test]
    fn test_overlapping_confirmed_booking_blocks() {
        let confirmed = [range((4, 3), (4, 6))];
        assert!(!is_range_available(&range((4, 1), (4, 4)), &confirmed, &[]));
        assert!(!is_range_available(&range((4, 5), (4, 9)), &confirmed, &[]));
    }

    #[test]
    fn test_back_to_back_bookings_are_allowed() {
        let confirmed = [range((4, 3), (4, 6))];
        assert!(is_range_available(&range((4, 1), (4, 3)), &confirmed, &[]));
        assert!(is_range_available(&range((4, 6), (4, 9)), &confirmed, &[]));
    }

    #[test]
    fn test_unavailable_period_always_wins() {
        let periods = [
            period(range((4, 1), (4, 30)), true),
            period(range((4, 10), (4, 12)), false),
        ];
        assert!(!is_range_available(&range((4, 9), (4, 11)), &[], &periods));
        assert!(is_range_available(&range((4, 2), (4, 9)), &[], &periods));
    }

    #[test]
    fn test_declared_periods_must_cover_request() {
        let periods = [period(range((5, 1), (5, 10)), true)];
        assert!(is_range_available(&range((5, 2), (5, 10)), &[], &periods));
        assert!(!is_range_available(&range((5, 8), (5, 12)), &[], &periods));
    }

    #[test]
    fn test_contiguous_periods_are_merged() {
        let periods = [
            period(range((5, 10), (5, 20)), true),
            period(range((5, 1), (5, 10)), true),
        ];
        assert!(is_range_available(&range((5, 5), (5, 15)), &[], &periods));

        let gapped = [
            period(range((5, 1), (5, 9)), true),
            period(range((5, 10), (5, 20)), true),
        ];
        assert!(!is_range_available(&range((5, 5), (5, 15)), &[], &gapped));
    }

    #[test]
    fn test_period_overlap_is_conflict_except_itself() {
        let existing = [period(range((6, 1), (6, 10)), true)];
        let candidate = range((6, 5), (6, 12));
        assert!(matches!(
            ensure_period_does_not_overlap(&candidate, &existing, None),
            Err(DomainError::Conflict(_))
        ));
        assert!(ensure_period_does_not_overlap(&candidate, &existing, existing[0].id).is_ok());
        assert!(ensure_period_does_not_overlap(&range((6, 10), (6, 12)), &existing, None).is_ok());
    }

    #[test]
    fn test_booking_length_bounds() {
        assert!(ensure_booking_length(&range((7, 1), (7, 2)), 1, 30).is_ok());
        assert!(ensure_booking_length(&range((7, 1), (7, 2)), 2, 30).is_err());
        assert!(ensure_booking_length(&range((7, 1), (8, 15)), 1, 30).is_err());
    }
}
