use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Vaxledger";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,vaxledger=debug".to_string()
}

/// Get the application data directory
/// ~/Vaxledger/ on all platforms
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Vaxledger")
}

/// Path of the clinic database file.
pub fn database_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}
