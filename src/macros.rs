// Logging facade. Expands to `tracing` or `defmt` when the matching feature is on, and to
// nothing otherwise, so hot paths pay nothing in the default build. `defmt` wins when both are
// enabled.

#[cfg(all(feature = "tracing", not(feature = "defmt")))]
macro_rules! ring_log {
    (trace, $($arg:expr),*) => { ::tracing::trace!($($arg),*) };
    (debug, $($arg:expr),*) => { ::tracing::debug!($($arg),*) };
}

#[cfg(feature = "defmt")]
macro_rules! ring_log {
    (trace, $($arg:expr),*) => { ::defmt::trace!($($arg),*) };
    (debug, $($arg:expr),*) => { ::defmt::debug!($($arg),*) };
}

#[cfg(not(any(feature = "tracing", feature = "defmt")))]
macro_rules! ring_log {
    ($level:ident, $($arg:expr),*) => {{ $( let _ = &$arg; )* }};
}

macro_rules! ring_trace {
    ($($arg:expr),* $(,)?) => (ring_log!(trace, $($arg),*));
}

macro_rules! ring_debug {
    ($($arg:expr),* $(,)?) => (ring_log!(debug, $($arg),*));
}
