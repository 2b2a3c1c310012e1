use hbenergy::core::io::hbplus::MAX_HBONDS;

pub struct DefaultsConfig {
    pub program: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub all_bonds: bool,
    pub max_records: usize,
    pub fix_hydrogen_names: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            program: "ecalc".to_string(),
            timeout_secs: 300,
            max_retries: 0,
            all_bonds: false,
            max_records: MAX_HBONDS,
            fix_hydrogen_names: false,
        }
    }
}
