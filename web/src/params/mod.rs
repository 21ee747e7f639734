pub(crate) mod engagement;
pub(crate) mod session;
