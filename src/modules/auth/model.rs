pub use matricula_models::auth::*;
