
pub mod config;
pub mod error;

pub mod data {
    pub mod record;
    pub mod loader;
    pub mod history;
    pub mod sqlite;
}

pub mod layout {
    pub mod rows;
}

pub mod metrics {
    pub mod distribution;
    pub mod quantiles;
    pub mod offsets;
    pub mod compare;
}

pub mod plot {
    pub mod chart_data;
}
