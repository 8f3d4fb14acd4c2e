pub(crate) mod blend;
pub(crate) mod border;
pub(crate) mod gradient;
pub(crate) mod pipeline;
pub(crate) mod scale;
