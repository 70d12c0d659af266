// ==========================================
// Motor de Asignación - Config Manager
// ==========================================
// Storage: config_kv table (key-value, scope_id = 'global')
// Purpose: operators can adjust run defaults (e.g. cuota_por_evaluador)
// without redeploying; per-run params still override everything.
// ==========================================

use crate::config::run_config::RunConfig;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

const SCOPE_GLOBAL: &str = "global";

pub const KEY_NUM_EVALUADORES: &str = "asignacion/num_evaluadores";
pub const KEY_CUOTA_POR_EVALUADOR: &str = "asignacion/cuota_por_evaluador";
pub const KEY_METODO: &str = "asignacion/metodo";
pub const KEY_EVITAR_MISMA_INSTITUCION: &str = "asignacion/evitar_misma_institucion";
pub const KEY_EVITAR_MISMA_AREA: &str = "asignacion/evitar_misma_area";

pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Read a global-scope config value; None when the key is absent
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![SCOPE_GLOBAL, key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a global-scope config value (UPSERT)
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (scope_id, key) DO UPDATE SET value = excluded.value",
            params![SCOPE_GLOBAL, key, value],
        )?;
        Ok(())
    }

    fn parse_override<T: FromStr>(raw: Option<String>, key: &str) -> RepositoryResult<Option<T>> {
        match raw {
            None => Ok(None),
            Some(v) => v.trim().parse::<T>().map(Some).map_err(|_| {
                RepositoryError::FieldValueError {
                    field: key.to_string(),
                    message: format!("valor no interpretable: {}", v),
                }
            }),
        }
    }

    fn parse_bool(raw: Option<String>, key: &str) -> RepositoryResult<Option<bool>> {
        match raw.as_deref().map(str::trim) {
            None => Ok(None),
            Some("true") | Some("1") => Ok(Some(true)),
            Some("false") | Some("0") => Ok(Some(false)),
            Some(v) => Err(RepositoryError::FieldValueError {
                field: key.to_string(),
                message: format!("valor booleano no interpretable: {}", v),
            }),
        }
    }

    /// Compiled-in defaults overlaid with whatever config_kv carries
    pub fn load_run_config(&self) -> RepositoryResult<RunConfig> {
        let mut cfg = RunConfig::default();

        if let Some(v) =
            Self::parse_override(self.get_config_value(KEY_NUM_EVALUADORES)?, KEY_NUM_EVALUADORES)?
        {
            cfg.num_evaluadores = v;
        }
        if let Some(v) = Self::parse_override(
            self.get_config_value(KEY_CUOTA_POR_EVALUADOR)?,
            KEY_CUOTA_POR_EVALUADOR,
        )? {
            cfg.cuota_por_evaluador = v;
        }
        if let Some(v) = Self::parse_override(self.get_config_value(KEY_METODO)?, KEY_METODO)? {
            cfg.metodo = v;
        }
        if let Some(v) = Self::parse_bool(
            self.get_config_value(KEY_EVITAR_MISMA_INSTITUCION)?,
            KEY_EVITAR_MISMA_INSTITUCION,
        )? {
            cfg.evitar_misma_institucion = v;
        }
        if let Some(v) = Self::parse_bool(
            self.get_config_value(KEY_EVITAR_MISMA_AREA)?,
            KEY_EVITAR_MISMA_AREA,
        )? {
            cfg.evitar_misma_area = v;
        }

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::AllocationMethod;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults_when_table_empty() {
        let mgr = setup();
        let cfg = mgr.load_run_config().unwrap();
        assert_eq!(cfg, RunConfig::default());
    }

    #[test]
    fn test_overrides_apply() {
        let mgr = setup();
        mgr.set_config_value(KEY_CUOTA_POR_EVALUADOR, "25").unwrap();
        mgr.set_config_value(KEY_EVITAR_MISMA_INSTITUCION, "false")
            .unwrap();
        mgr.set_config_value(KEY_METODO, "SIMPLE").unwrap();

        let cfg = mgr.load_run_config().unwrap();
        assert_eq!(cfg.cuota_por_evaluador, 25);
        assert!(!cfg.evitar_misma_institucion);
        assert_eq!(cfg.metodo, AllocationMethod::Simple);
        // untouched keys keep their defaults
        assert_eq!(cfg.num_evaluadores, 2);
    }

    #[test]
    fn test_garbage_value_is_reported() {
        let mgr = setup();
        mgr.set_config_value(KEY_NUM_EVALUADORES, "muchos").unwrap();
        assert!(mgr.load_run_config().is_err());
    }
}
