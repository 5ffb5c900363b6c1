/*!
Internal logging macros.

These forward to the `log` crate when the `logging` feature is enabled and
expand to nothing otherwise. This crate does no I/O, so the only things worth
logging are the surprising decisions made during unit promotion and value
ingestion (at `debug` level) and the intermediate results of calendar
decomposition (at `trace` level).
*/

macro_rules! log {
    ($($tt:tt)*) => {
        #[cfg(feature = "logging")]
        {
            $($tt)*
        }
    }
}

macro_rules! debug {
    ($($tt:tt)*) => { log!(log::debug!($($tt)*)) }
}

macro_rules! trace {
    ($($tt:tt)*) => { log!(log::trace!($($tt)*)) }
}
