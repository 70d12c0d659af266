// ==========================================
// Motor de Asignación - Input Validation
// ==========================================
// Selector parsing happens before any catalog access: a missing area or an
// unknown level label never triggers partial work.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::{AllocationMethod, EducationalLevel, Phase};

pub fn require_area(area_id: &str) -> ApiResult<String> {
    let trimmed = area_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::ValidationError(
            "se requiere el área de competencia".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn parse_level(nivel: &str) -> ApiResult<EducationalLevel> {
    if nivel.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "se requiere el nivel educativo".to_string(),
        ));
    }
    nivel.parse::<EducationalLevel>().map_err(ApiError::ValidationError)
}

pub fn parse_phase(fase: &str) -> ApiResult<Phase> {
    if fase.trim().is_empty() {
        return Err(ApiError::ValidationError("se requiere la fase".to_string()));
    }
    fase.parse::<Phase>().map_err(ApiError::ValidationError)
}

/// Parse the method label and reject anything but SIMPLE: BALANCEADO is a
/// distinct strategy with no specified semantics, not an alias.
pub fn parse_supported_method(metodo: &str) -> ApiResult<AllocationMethod> {
    let method = metodo
        .parse::<AllocationMethod>()
        .map_err(ApiError::ValidationError)?;
    match method {
        AllocationMethod::Simple => Ok(method),
        AllocationMethod::Balanceado => {
            Err(ApiError::UnsupportedMethod(method.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_selectors_rejected() {
        assert!(require_area("  ").is_err());
        assert!(parse_level("").is_err());
        assert!(parse_phase(" ").is_err());
    }

    #[test]
    fn test_valid_selectors() {
        assert_eq!(require_area(" MAT ").unwrap(), "MAT");
        assert_eq!(parse_level("secundaria").unwrap(), EducationalLevel::Secundaria);
        assert_eq!(parse_phase("clasificacion").unwrap(), Phase::Clasificacion);
    }

    #[test]
    fn test_balanceado_is_rejected_not_aliased() {
        assert!(matches!(
            parse_supported_method("balanceado"),
            Err(ApiError::UnsupportedMethod(_))
        ));
        assert_eq!(
            parse_supported_method("simple").unwrap(),
            AllocationMethod::Simple
        );
    }
}
