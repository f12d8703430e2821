//! Internal logging shims.
//!
//! Forward to `defmt` when the `defmt` feature is enabled and compile to
//! nothing otherwise.

macro_rules! trace {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        defmt::trace!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

macro_rules! debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        defmt::debug!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

macro_rules! warning {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        defmt::warn!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

pub(crate) use {debug, trace, warning};

#[cfg(test)]
mod tests {
    use super::{debug, trace, warning};

    #[test]
    #[warn(unused_variables)]
    fn shims_accept_format_arguments() {
        let register = 0x2Du8;
        trace!("read {=u8:#x}", register);
        debug!("plain message");
        warning!("values {} {}", register, [1i16, 2, 3],);
    }
}
