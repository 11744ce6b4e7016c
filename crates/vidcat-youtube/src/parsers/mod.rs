pub(crate) mod embed;
pub(crate) mod watch;
