// ==========================================
// Motor de Asignación - Config Layer
// ==========================================

pub mod config_manager;
pub mod run_config;

pub use config_manager::ConfigManager;
pub use run_config::RunConfig;
