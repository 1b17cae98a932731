pub mod documents;
pub mod fees;
pub mod grants;
pub mod submissions;
pub mod validation;
