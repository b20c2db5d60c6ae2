//! Per-company quota accounting.
//!
//! Quota is evaluated per (event, area, company). Pending and approved rows
//! count against it; rejected rows do not.

use accreditation_common::{AppError, AppResult, FallbackArea, QuotaDetail};
use accreditation_db::{
    entities::{accreditation::AccreditationStatus, area},
    repositories::AccreditationRepository,
};
use serde::Serialize;

/// An area code with its per-company maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaDefinition {
    pub code: String,
    pub name: String,
    pub max_quota: i32,
}

impl From<area::Model> for AreaDefinition {
    fn from(a: area::Model) -> Self {
        Self {
            code: a.code,
            name: a.name,
            max_quota: a.max_quota,
        }
    }
}

impl From<&FallbackArea> for AreaDefinition {
    fn from(a: &FallbackArea) -> Self {
        Self {
            code: a.code.clone(),
            name: a.name.clone(),
            max_quota: a.max_quota,
        }
    }
}

/// Find an area by code, ignoring case.
#[must_use]
pub fn find_area<'a>(areas: &'a [AreaDefinition], code: &str) -> Option<&'a AreaDefinition> {
    let code = code.trim();
    areas.iter().find(|a| a.code.eq_ignore_ascii_case(code))
}

/// Existing valid rows versus the configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capacity {
    pub existing: i64,
    pub max: i64,
}

impl Capacity {
    /// Whether `requested` more rows fit.
    #[must_use]
    pub const fn fits(&self, requested: i64) -> bool {
        self.existing.saturating_add(requested) <= self.max
    }

    /// Refuse the whole batch when it does not fit.
    pub fn ensure_fits(&self, area: &str, company: &str, requested: i64) -> AppResult<()> {
        if self.fits(requested) {
            return Ok(());
        }

        Err(AppError::QuotaExceeded(QuotaDetail {
            area: area.to_string(),
            company: company.to_string(),
            max: self.max,
            existing: self.existing,
            requested,
        }))
    }
}

/// Quota accounting over the accreditation store.
#[derive(Clone)]
pub struct QuotaService {
    accreditation_repo: AccreditationRepository,
}

impl QuotaService {
    #[must_use]
    pub const fn new(accreditation_repo: AccreditationRepository) -> Self {
        Self { accreditation_repo }
    }

    /// Count valid rows for the triple and pair them with the area maximum.
    pub async fn compute_available_capacity(
        &self,
        event_id: i32,
        area: &AreaDefinition,
        company: &str,
    ) -> AppResult<Capacity> {
        let all = self
            .accreditation_repo
            .count_for_company(event_id, &area.code, company, None)
            .await?;
        let rejected = self
            .accreditation_repo
            .count_for_company(
                event_id,
                &area.code,
                company,
                Some(AccreditationStatus::Rejected),
            )
            .await?;

        let existing = i64::try_from(all.saturating_sub(rejected)).unwrap_or(i64::MAX);

        tracing::debug!(
            event_id,
            area = %area.code,
            empresa = %company,
            all,
            rejected,
            max = area.max_quota,
            "Computed quota usage"
        );

        Ok(Capacity {
            existing,
            max: i64::from(area.max_quota),
        })
    }

    /// Check that a batch of `requested` rows fits.
    pub async fn check(
        &self,
        event_id: i32,
        area: &AreaDefinition,
        company: &str,
        requested: usize,
    ) -> AppResult<Capacity> {
        let capacity = self
            .compute_available_capacity(event_id, area, company)
            .await?;
        let requested = i64::try_from(requested).unwrap_or(i64::MAX);
        capacity.ensure_fits(&area.code, company, requested)?;
        Ok(capacity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn prensa(max_quota: i32) -> AreaDefinition {
        AreaDefinition {
            code: "prensa".to_string(),
            name: "Prensa".to_string(),
            max_quota,
        }
    }

    fn service_with_counts(all: i64, rejected: i64) -> QuotaService {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    [maplit::btreemap! { "num_items" => Value::BigInt(Some(all)) }],
                    [maplit::btreemap! { "num_items" => Value::BigInt(Some(rejected)) }],
                ])
                .into_connection(),
        );
        QuotaService::new(AccreditationRepository::new(db))
    }

    #[test]
    fn test_fits_boundary() {
        let capacity = Capacity {
            existing: 3,
            max: 5,
        };
        assert!(capacity.fits(2));
        assert!(!capacity.fits(3));
    }

    #[test]
    fn test_huge_batch_is_refused_without_overflow() {
        let capacity = Capacity {
            existing: 3,
            max: 5,
        };
        assert!(!capacity.fits(i64::MAX));

        let err = capacity
            .ensure_fits("prensa", "Canal X", i64::MAX)
            .unwrap_err();
        match err {
            AppError::QuotaExceeded(detail) => assert_eq!(detail.total(), i64::MAX),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ensure_fits_carries_numbers() {
        let capacity = Capacity {
            existing: 3,
            max: 5,
        };
        let err = capacity.ensure_fits("prensa", "Canal X", 3).unwrap_err();
        match err {
            AppError::QuotaExceeded(detail) => {
                assert_eq!(detail.existing, 3);
                assert_eq!(detail.requested, 3);
                assert_eq!(detail.max, 5);
                assert_eq!(detail.total(), 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_find_area_ignores_case() {
        let areas = vec![prensa(10)];
        assert!(find_area(&areas, "PRENSA").is_some());
        assert!(find_area(&areas, " prensa ").is_some());
        assert!(find_area(&areas, "radio").is_none());
    }

    #[tokio::test]
    async fn test_rejected_rows_do_not_count() {
        let service = service_with_counts(4, 2);
        let capacity = service
            .compute_available_capacity(1, &prensa(5), "Canal X")
            .await
            .unwrap();
        assert_eq!(capacity.existing, 2);
        assert_eq!(capacity.max, 5);
    }

    #[tokio::test]
    async fn test_check_accepts_exact_fill() {
        let service = service_with_counts(3, 0);
        let capacity = service.check(1, &prensa(5), "Canal X", 2).await.unwrap();
        assert_eq!(capacity.existing, 3);
    }

    #[tokio::test]
    async fn test_check_refuses_overflow() {
        let service = service_with_counts(3, 0);
        let result = service.check(1, &prensa(5), "Canal X", 3).await;
        assert!(matches!(result, Err(AppError::QuotaExceeded(_))));
    }
}
