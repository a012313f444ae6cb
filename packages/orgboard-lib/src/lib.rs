pub mod config;
pub mod defaults;
pub mod utils;

pub mod prelude {
    pub use crate::config::{DashboardArgs, DashboardConfig, GraphQlApiConfig, MutableConfig};
    pub use crate::defaults;
    pub use crate::utils::init_logging;
}
