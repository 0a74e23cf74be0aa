//! Utilitários de validação
//!
//! Validadores customizados usados pelos DTOs com `#[validate(custom = ...)]`.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Mercosul (ABC1D23) ou padrão antigo (ABC1234)
    static ref LICENSE_PLATE: Regex = Regex::new(r"^[A-Z]{3}[0-9][A-Z0-9][0-9]{2}$").unwrap();
    static ref COUPON_CODE: Regex = Regex::new(r"^[A-Z0-9_-]{3,50}$").unwrap();
    static ref PHONE_DIGITS: Regex = Regex::new(r"^\+?[0-9]{10,15}$").unwrap();
}

/// Remove hífen e espaços, converte para maiúsculas
pub fn normalize_license_plate(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    if !LICENSE_PLATE.is_match(&normalize_license_plate(value)) {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

pub fn validate_coupon_code(value: &str) -> Result<(), ValidationError> {
    if !COUPON_CODE.is_match(value) {
        let mut error = ValidationError::new("coupon_code");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let clean: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if !PHONE_DIGITS.is_match(&clean) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_plates() {
        assert!(validate_license_plate("BRA2E19").is_ok());
        assert!(validate_license_plate("abc-1234").is_ok());
        assert!(validate_license_plate("AB12345").is_err());
        assert!(validate_license_plate("ABCD123").is_err());
        assert_eq!(normalize_license_plate("abc-1234"), "ABC1234");
    }

    #[test]
    fn test_coupon_codes() {
        assert!(validate_coupon_code("BEMVINDO_10").is_ok());
        assert!(validate_coupon_code("ab").is_err());
        assert!(validate_coupon_code("minusculo").is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("(11) 99999-0000").is_ok());
        assert!(validate_phone("+5511999990000").is_ok());
        assert!(validate_phone("1234").is_err());
    }
}
