//! Máquina de estados de hitos del waybill
//!
//! Los cuatro hitos operativos (llegada a carga, fin de carga/despacho, llegada
//! a descarga, fin de descarga) son timestamps opcionales que el operador puede
//! informar en cualquier orden. Cuando hay dos o más, deben ser no decrecientes
//! en ese orden; cada violación se atribuye al campo posterior del par.
//!
//! También deriva duraciones y distancia recorrida, y decide el cierre
//! automático del pedido.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationErrors;

use crate::utils::errors::{field_error, AppError};

/// Hitos en su orden cronológico obligatorio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Milestone {
    ArrivalAtLoading,
    LoadingCompleted,
    ArrivalAtOffloading,
    UnloadingCompleted,
}

impl Milestone {
    pub const SEQUENCE: [Milestone; 4] = [
        Milestone::ArrivalAtLoading,
        Milestone::LoadingCompleted,
        Milestone::ArrivalAtOffloading,
        Milestone::UnloadingCompleted,
    ];

    /// Nombre del campo en la API, usado para atribuir errores
    pub fn field(self) -> &'static str {
        match self {
            Milestone::ArrivalAtLoading => "arrival_at_loading",
            Milestone::LoadingCompleted => "loading_completed_at",
            Milestone::ArrivalAtOffloading => "arrival_at_offloading",
            Milestone::UnloadingCompleted => "unloading_completed_at",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Milestone::ArrivalAtLoading => "Arrival at loading",
            Milestone::LoadingCompleted => "Loading completed",
            Milestone::ArrivalAtOffloading => "Arrival at offloading",
            Milestone::UnloadingCompleted => "Unloading completed",
        }
    }
}

/// Etapa alcanzada: el hito más avanzado informado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MilestoneStage {
    Unset,
    ArrivalAtLoading,
    LoadingCompleted,
    ArrivalAtOffloading,
    UnloadingCompleted,
}

impl From<Milestone> for MilestoneStage {
    fn from(milestone: Milestone) -> Self {
        match milestone {
            Milestone::ArrivalAtLoading => MilestoneStage::ArrivalAtLoading,
            Milestone::LoadingCompleted => MilestoneStage::LoadingCompleted,
            Milestone::ArrivalAtOffloading => MilestoneStage::ArrivalAtOffloading,
            Milestone::UnloadingCompleted => MilestoneStage::UnloadingCompleted,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MilestoneTimeline {
    pub arrival_at_loading: Option<DateTime<Utc>>,
    pub loading_completed_at: Option<DateTime<Utc>>,
    pub arrival_at_offloading: Option<DateTime<Utc>>,
    pub unloading_completed_at: Option<DateTime<Utc>>,
}

/// Par de hitos fuera de orden
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneViolation {
    pub milestone: Milestone,
    pub earlier: Milestone,
    pub message: String,
}

impl MilestoneTimeline {
    pub fn get(&self, milestone: Milestone) -> Option<DateTime<Utc>> {
        match milestone {
            Milestone::ArrivalAtLoading => self.arrival_at_loading,
            Milestone::LoadingCompleted => self.loading_completed_at,
            Milestone::ArrivalAtOffloading => self.arrival_at_offloading,
            Milestone::UnloadingCompleted => self.unloading_completed_at,
        }
    }

    pub fn stage(&self) -> MilestoneStage {
        Milestone::SEQUENCE
            .iter()
            .rev()
            .find(|m| self.get(**m).is_some())
            .map(|m| MilestoneStage::from(*m))
            .unwrap_or(MilestoneStage::Unset)
    }

    /// Compara cada hito informado con el hito anterior más cercano que también lo esté
    pub fn violations(&self) -> Vec<MilestoneViolation> {
        let mut violations = Vec::new();
        let mut previous: Option<(Milestone, DateTime<Utc>)> = None;

        for milestone in Milestone::SEQUENCE {
            let Some(at) = self.get(milestone) else {
                continue;
            };
            if let Some((earlier, earlier_at)) = previous {
                if at < earlier_at {
                    violations.push(MilestoneViolation {
                        milestone,
                        earlier,
                        message: format!(
                            "{} ({}) cannot be earlier than {} ({})",
                            milestone.label(),
                            at.to_rfc3339(),
                            earlier.label().to_lowercase(),
                            earlier_at.to_rfc3339()
                        ),
                    });
                }
            }
            previous = Some((milestone, at));
        }

        violations
    }

    pub fn loading_duration_minutes(&self) -> Option<i64> {
        positive_minutes(self.arrival_at_loading, self.loading_completed_at)
    }

    pub fn unloading_duration_minutes(&self) -> Option<i64> {
        positive_minutes(self.arrival_at_offloading, self.unloading_completed_at)
    }
}

fn positive_minutes(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Option<i64> {
    let minutes = (to? - from?).num_minutes();
    (minutes > 0).then_some(minutes)
}

/// Distancia recorrida; solo se informa si es positiva
pub fn run_distance(start_odometer: Decimal, closing_odometer: Option<Decimal>) -> Option<Decimal> {
    let distance = closing_odometer? - start_odometer;
    (distance > Decimal::ZERO).then_some(distance)
}

/// Campos de hitos y cierre presentes en una actualización
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestonePatch {
    pub arrival_at_loading: Option<DateTime<Utc>>,
    pub loading_completed_at: Option<DateTime<Utc>>,
    pub arrival_at_offloading: Option<DateTime<Utc>>,
    pub unloading_completed_at: Option<DateTime<Utc>>,
    pub closing_odometer: Option<Decimal>,
}

impl MilestonePatch {
    pub fn is_empty(&self) -> bool {
        self.arrival_at_loading.is_none()
            && self.loading_completed_at.is_none()
            && self.arrival_at_offloading.is_none()
            && self.unloading_completed_at.is_none()
            && self.closing_odometer.is_none()
    }

    /// Fin de descarga y odómetro de cierre en la misma actualización
    pub fn closes_order(&self) -> bool {
        self.unloading_completed_at.is_some() && self.closing_odometer.is_some()
    }
}

/// Resultado de aplicar un patch válido
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneOutcome {
    pub timeline: MilestoneTimeline,
    pub closing_odometer: Option<Decimal>,
    pub run_distance: Option<Decimal>,
    pub closes_order: bool,
}

/// Fusiona el patch con el estado actual, valida orden y odómetro, y calcula derivados.
///
/// Todas las violaciones se devuelven juntas como errores por campo.
pub fn apply_patch(
    current: &MilestoneTimeline,
    start_odometer: Decimal,
    current_closing_odometer: Option<Decimal>,
    patch: &MilestonePatch,
) -> Result<MilestoneOutcome, AppError> {
    let timeline = MilestoneTimeline {
        arrival_at_loading: patch.arrival_at_loading.or(current.arrival_at_loading),
        loading_completed_at: patch.loading_completed_at.or(current.loading_completed_at),
        arrival_at_offloading: patch.arrival_at_offloading.or(current.arrival_at_offloading),
        unloading_completed_at: patch.unloading_completed_at.or(current.unloading_completed_at),
    };
    let closing_odometer = patch.closing_odometer.or(current_closing_odometer);

    let mut errors = ValidationErrors::new();
    for violation in timeline.violations() {
        errors.add(
            violation.milestone.field(),
            field_error("milestone_order", violation.message),
        );
    }
    if let Some(closing) = closing_odometer {
        if closing < start_odometer {
            errors.add(
                "closing_odometer",
                field_error(
                    "odometer_below_start",
                    format!("Closing odometer must be ≥ {}", start_odometer),
                ),
            );
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(MilestoneOutcome {
        timeline,
        closing_odometer,
        run_distance: run_distance(start_odometer, closing_odometer),
        closes_order: patch.closes_order(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, hour, minute, 0).unwrap()
    }

    fn field_names(err: &AppError) -> Vec<&'static str> {
        match err {
            AppError::Validation(errors) => {
                let mut fields: Vec<_> = errors.field_errors().keys().copied().collect();
                fields.sort();
                fields
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_loading_completed_before_arrival_is_attributed_to_loading_completed() {
        let patch = MilestonePatch {
            arrival_at_loading: Some(at(10, 0)),
            loading_completed_at: Some(at(9, 0)),
            ..Default::default()
        };
        let err = apply_patch(&MilestoneTimeline::default(), Decimal::ZERO, None, &patch).unwrap_err();
        assert_eq!(field_names(&err), vec!["loading_completed_at"]);
    }

    #[test]
    fn test_patch_is_checked_against_stored_milestones() {
        let current = MilestoneTimeline {
            arrival_at_offloading: Some(at(15, 0)),
            ..Default::default()
        };
        let patch = MilestonePatch {
            unloading_completed_at: Some(at(14, 30)),
            ..Default::default()
        };
        let err = apply_patch(&current, Decimal::ZERO, None, &patch).unwrap_err();
        assert_eq!(field_names(&err), vec!["unloading_completed_at"]);
    }

    #[test]
    fn test_gap_in_sequence_still_compares_nearest_earlier_milestone() {
        let timeline = MilestoneTimeline {
            arrival_at_loading: Some(at(12, 0)),
            arrival_at_offloading: Some(at(11, 0)),
            ..Default::default()
        };
        let violations = timeline.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].milestone, Milestone::ArrivalAtOffloading);
        assert_eq!(violations[0].earlier, Milestone::ArrivalAtLoading);
    }

    #[test]
    fn test_equal_timestamps_are_allowed() {
        let timeline = MilestoneTimeline {
            arrival_at_loading: Some(at(8, 0)),
            loading_completed_at: Some(at(8, 0)),
            ..Default::default()
        };
        assert!(timeline.violations().is_empty());
        assert_eq!(timeline.loading_duration_minutes(), None);
    }

    #[test]
    fn test_increasing_milestones_yield_positive_durations() {
        let patch = MilestonePatch {
            arrival_at_loading: Some(at(6, 0)),
            loading_completed_at: Some(at(7, 30)),
            arrival_at_offloading: Some(at(12, 0)),
            unloading_completed_at: Some(at(12, 45)),
            closing_odometer: None,
        };
        let outcome = apply_patch(&MilestoneTimeline::default(), Decimal::ZERO, None, &patch).unwrap();
        assert_eq!(outcome.timeline.loading_duration_minutes(), Some(90));
        assert_eq!(outcome.timeline.unloading_duration_minutes(), Some(45));
        assert_eq!(outcome.timeline.stage(), MilestoneStage::UnloadingCompleted);
        assert!(!outcome.closes_order);
    }

    #[test]
    fn test_closing_odometer_below_start_is_rejected_with_minimum() {
        let patch = MilestonePatch {
            closing_odometer: Some(Decimal::from(100)),
            ..Default::default()
        };
        let err = apply_patch(&MilestoneTimeline::default(), Decimal::from(150), None, &patch).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                let fields = errors.field_errors();
                let messages = fields.get("closing_odometer").unwrap();
                assert_eq!(messages[0].message.as_deref(), Some("Closing odometer must be ≥ 150"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unloading_and_closing_odometer_close_the_order() {
        let current = MilestoneTimeline {
            arrival_at_loading: Some(at(6, 0)),
            loading_completed_at: Some(at(7, 0)),
            arrival_at_offloading: Some(at(11, 0)),
            unloading_completed_at: None,
        };
        let patch = MilestonePatch {
            unloading_completed_at: Some(at(11, 40)),
            closing_odometer: Some(Decimal::from(1_420)),
            ..Default::default()
        };
        let outcome = apply_patch(&current, Decimal::from(1_000), None, &patch).unwrap();
        assert!(outcome.closes_order);
        assert_eq!(outcome.run_distance, Some(Decimal::from(420)));
    }

    #[test]
    fn test_closing_odometer_alone_does_not_close() {
        let patch = MilestonePatch {
            closing_odometer: Some(Decimal::from(200)),
            ..Default::default()
        };
        let outcome = apply_patch(&MilestoneTimeline::default(), Decimal::from(150), None, &patch).unwrap();
        assert!(!outcome.closes_order);
        assert_eq!(outcome.run_distance, Some(Decimal::from(50)));
    }

    #[test]
    fn test_run_distance_only_when_positive() {
        assert_eq!(run_distance(Decimal::from(150), Some(Decimal::from(150))), None);
        assert_eq!(run_distance(Decimal::from(150), None), None);
        assert_eq!(run_distance(Decimal::from(150), Some(Decimal::from(175))), Some(Decimal::from(25)));
    }

    #[test]
    fn test_stage_reports_furthest_milestone() {
        assert_eq!(MilestoneTimeline::default().stage(), MilestoneStage::Unset);
        let timeline = MilestoneTimeline {
            loading_completed_at: Some(at(9, 0)),
            ..Default::default()
        };
        assert_eq!(timeline.stage(), MilestoneStage::LoadingCompleted);
    }
}
