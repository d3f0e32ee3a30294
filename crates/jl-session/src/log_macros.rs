/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field so callers never spell the string
/// literal. Domains: `sys` (session lifecycle), `hist` (undo/redo log),
/// `conv` (operator conversion), `store` (session storage), `conf`
/// (configuration).
///
/// ```ignore
/// jl_info!(sys, entries = 3, "editor session opened");
/// jl_debug!(conv, from = "==", to = "and", "node converted");
/// ```

#[doc(hidden)]
macro_rules! jl_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

macro_rules! jl_warn {
    ($domain:ident, $($rest:tt)*) => {
        jl_log!(warn, $domain, $($rest)*)
    };
}

macro_rules! jl_info {
    ($domain:ident, $($rest:tt)*) => {
        jl_log!(info, $domain, $($rest)*)
    };
}

macro_rules! jl_debug {
    ($domain:ident, $($rest:tt)*) => {
        jl_log!(debug, $domain, $($rest)*)
    };
}
