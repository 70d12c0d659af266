// ==========================================
// Motor de Asignación - Run Configuration
// ==========================================
// Strongly-typed replacement for the loose flag bag the callers used to
// send: every recognized option is enumerated with its default.
// ==========================================

use crate::domain::types::AllocationMethod;
use serde::{Deserialize, Serialize};

/// Configuration for one assignment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Baseline distinct evaluators per registration
    pub num_evaluadores: usize,
    /// Max registrations one evaluator grades before another is provisioned
    pub cuota_por_evaluador: usize,
    /// Allocation strategy; only SIMPLE is implemented
    pub metodo: AllocationMethod,
    /// Skip evaluators from the registration's own institution
    pub evitar_misma_institucion: bool,
    /// Accepted and recorded; imposes no extra rule under SIMPLE because the
    /// evaluator pool is already filtered to the requested area
    pub evitar_misma_area: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_evaluadores: 2,
            cuota_por_evaluador: 30,
            metodo: AllocationMethod::Simple,
            evitar_misma_institucion: true,
            evitar_misma_area: true,
        }
    }
}

impl RunConfig {
    /// Validate numeric bounds before any work is attempted
    pub fn validate(&self) -> Result<(), String> {
        if self.num_evaluadores < 1 {
            return Err("num_evaluadores debe ser >= 1".to_string());
        }
        if self.cuota_por_evaluador < 1 {
            return Err("cuota_por_evaluador debe ser >= 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.num_evaluadores, 2);
        assert_eq!(cfg.cuota_por_evaluador, 30);
        assert_eq!(cfg.metodo, AllocationMethod::Simple);
        assert!(cfg.evitar_misma_institucion);
        assert!(cfg.evitar_misma_area);
    }

    #[test]
    fn test_validate_rejects_zero() {
        let cfg = RunConfig {
            num_evaluadores: 0,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = RunConfig {
            cuota_por_evaluador: 0,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
