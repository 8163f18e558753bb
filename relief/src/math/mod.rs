mod arange;

pub(crate) use arange::arange;
