pub struct DefaultsConfig {
    pub multiplicity: i64,
    pub pauling_threshold: f64,
    pub repeat_anions: bool,
    pub repeat_cations: bool,
    pub count_max_ions: usize,
    pub count_threshold: u32,
    pub primitive_only: bool,
    pub sublattice_class: String,
    pub build_structures: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            multiplicity: 1,
            pauling_threshold: 0.0,
            repeat_anions: true,
            repeat_cations: true,
            count_max_ions: 4,
            count_threshold: 8,
            primitive_only: false,
            sublattice_class: "S".to_string(),
            build_structures: false,
        }
    }
}
