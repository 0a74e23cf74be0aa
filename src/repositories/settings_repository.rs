use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::settings::AdminSettings;
use crate::utils::errors::AppError;

const SETTINGS_COLUMNS: &str = r#"
    service_fee_percentage, insurance_fee_percentage, minimum_booking_days,
    maximum_booking_days, cancellation_policy_days, currency, updated_at
"#;

#[derive(Debug, Clone, Default)]
pub struct SettingsChanges {
    pub service_fee_percentage: Option<Decimal>,
    pub insurance_fee_percentage: Option<Decimal>,
    pub minimum_booking_days: Option<i32>,
    pub maximum_booking_days: Option<i32>,
    pub cancellation_policy_days: Option<i32>,
    pub currency: Option<String>,
}

pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Linha única; valores padrão se a migration ainda não a criou
    pub async fn get(&self) -> Result<AdminSettings, AppError> {
        let query = format!("SELECT {} FROM admin_settings WHERE id = 1", SETTINGS_COLUMNS);
        let settings = sqlx::query_as::<_, AdminSettings>(&query)
            .fetch_optional(&self.pool)
            .await?;
        Ok(settings.unwrap_or_default())
    }

    pub async fn update(&self, changes: SettingsChanges) -> Result<AdminSettings, AppError> {
        sqlx::query("INSERT INTO admin_settings (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(&self.pool)
            .await?;

        let query = format!(
            r#"
            UPDATE admin_settings SET
                service_fee_percentage = COALESCE($1, service_fee_percentage),
                insurance_fee_percentage = COALESCE($2, insurance_fee_percentage),
                minimum_booking_days = COALESCE($3, minimum_booking_days),
                maximum_booking_days = COALESCE($4, maximum_booking_days),
                cancellation_policy_days = COALESCE($5, cancellation_policy_days),
                currency = COALESCE($6, currency),
                updated_at = NOW()
            WHERE id = 1
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        );
        let settings = sqlx::query_as::<_, AdminSettings>(&query)
            .bind(changes.service_fee_percentage)
            .bind(changes.insurance_fee_percentage)
            .bind(changes.minimum_booking_days)
            .bind(changes.maximum_booking_days)
            .bind(changes.cancellation_policy_days)
            .bind(changes.currency)
            .fetch_one(&self.pool)
            .await?;
        Ok(settings)
    }
}
