pub mod org;

pub mod prelude {
    pub use crate::org::*;
}
