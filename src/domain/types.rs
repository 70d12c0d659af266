// ==========================================
// Motor de Asignación - Domain Types
// ==========================================
// Serialization format: SCREAMING_SNAKE_CASE (matches database labels)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Phase (Fase)
// ==========================================
// Competition stage: qualifying round or final
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Clasificacion,
    Final,
}

impl Phase {
    /// Database label for this phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Clasificacion => "CLASIFICACION",
            Phase::Final => "FINAL",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLASIFICACION" => Ok(Phase::Clasificacion),
            "FINAL" => Ok(Phase::Final),
            other => Err(format!("fase desconocida: {}", other)),
        }
    }
}

// ==========================================
// Educational Level (Nivel)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EducationalLevel {
    Primaria,
    Secundaria,
}

impl EducationalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationalLevel::Primaria => "PRIMARIA",
            EducationalLevel::Secundaria => "SECUNDARIA",
        }
    }
}

impl fmt::Display for EducationalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EducationalLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRIMARIA" => Ok(EducationalLevel::Primaria),
            "SECUNDARIA" => Ok(EducationalLevel::Secundaria),
            other => Err(format!("nivel desconocido: {}", other)),
        }
    }
}

// ==========================================
// Grade Bucket
// ==========================================
// Cohort key: cohorts are derived strictly from the grade recorded on each
// registration, never from a flat level label. Ordered (level, grade) so
// cohort iteration is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GradeBucket {
    pub level: EducationalLevel,
    pub grade: u8,
}

impl GradeBucket {
    pub fn new(level: EducationalLevel, grade: u8) -> Self {
        Self { level, grade }
    }

    /// Human-readable label, e.g. "PRIMARIA 3°"
    pub fn label(&self) -> String {
        format!("{} {}°", self.level, self.grade)
    }
}

impl fmt::Display for GradeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// Allocation Method (Metodo)
// ==========================================
// Only SIMPLE (round-robin) is implemented. BALANCEADO parses so stored
// configs round-trip, but the API rejects it as an unsupported strategy:
// its semantics were never specified and it is not a synonym of SIMPLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationMethod {
    Simple,
    Balanceado,
}

impl AllocationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationMethod::Simple => "SIMPLE",
            AllocationMethod::Balanceado => "BALANCEADO",
        }
    }
}

impl fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AllocationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SIMPLE" => Ok(AllocationMethod::Simple),
            "BALANCEADO" => Ok(AllocationMethod::Balanceado),
            other => Err(format!("metodo desconocido: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_round_trip() {
        assert_eq!("clasificacion".parse::<Phase>().unwrap(), Phase::Clasificacion);
        assert_eq!("FINAL".parse::<Phase>().unwrap(), Phase::Final);
        assert_eq!(Phase::Clasificacion.to_string(), "CLASIFICACION");
        assert!("semifinal".parse::<Phase>().is_err());
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(
            " primaria ".parse::<EducationalLevel>().unwrap(),
            EducationalLevel::Primaria
        );
        assert!("kinder".parse::<EducationalLevel>().is_err());
    }

    #[test]
    fn test_grade_bucket_ordering() {
        let p3 = GradeBucket::new(EducationalLevel::Primaria, 3);
        let p5 = GradeBucket::new(EducationalLevel::Primaria, 5);
        let s1 = GradeBucket::new(EducationalLevel::Secundaria, 1);
        assert!(p3 < p5);
        assert!(p5 < s1);
        assert_eq!(s1.label(), "SECUNDARIA 1°");
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(
            "simple".parse::<AllocationMethod>().unwrap(),
            AllocationMethod::Simple
        );
        assert_eq!(
            "BALANCEADO".parse::<AllocationMethod>().unwrap(),
            AllocationMethod::Balanceado
        );
    }
}
