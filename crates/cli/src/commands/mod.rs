pub(crate) mod remind;
pub(crate) mod serve;
pub(crate) mod watch;
