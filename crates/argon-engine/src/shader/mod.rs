//! Shader program construction.
//!
//! Two stage sources (vertex, fragment) are compiled and linked into one
//! program object. Stage objects never outlive construction; the program is
//! released when its `ShaderProgram` drops.

mod program;
mod source;
mod stage;

pub use program::{INFO_LOG_CAPACITY, ShaderProgram};
pub use source::ShaderSource;
pub use stage::ShaderStage;
