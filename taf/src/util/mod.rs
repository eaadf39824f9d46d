pub(crate) mod hash;
pub(crate) mod io;
pub(crate) mod math;
