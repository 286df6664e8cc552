//! Call-site logging macros.
//!
//! Each macro formats its message, captures the call site with
//! [`location!`](crate::location) and calls `log` on the given handler.
//! Per-call metadata goes in a leading `{ key => value, ... };` block.
//!
//! ```
//! use debugtools_core::{minfo, mwarning, MultiLogHandler};
//!
//! let handler = MultiLogHandler::new("app", Vec::new());
//! minfo!(handler, "started in {} ms", 12);
//! mwarning!(handler, { "attempt" => 3u32 }; "retrying {}", "upload");
//! ```

/// Log at an explicit level.
#[macro_export]
macro_rules! mlog {
    ($handler:expr, $level:expr, { $($key:expr => $value:expr),* $(,)? }; $($arg:tt)+) => {
        $handler.log(
            $level,
            &::std::format!($($arg)+),
            ::std::option::Option::Some($crate::metadata! { $($key => $value),* }),
            $crate::location!(),
        )
    };
    ($handler:expr, $level:expr, $($arg:tt)+) => {
        $handler.log(
            $level,
            &::std::format!($($arg)+),
            ::std::option::Option::None,
            $crate::location!(),
        )
    };
}

#[macro_export]
macro_rules! mtrace {
    ($handler:expr, $($arg:tt)+) => { $crate::mlog!($handler, $crate::LogLevel::Trace, $($arg)+) };
}

#[macro_export]
macro_rules! mdebug {
    ($handler:expr, $($arg:tt)+) => { $crate::mlog!($handler, $crate::LogLevel::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! minfo {
    ($handler:expr, $($arg:tt)+) => { $crate::mlog!($handler, $crate::LogLevel::Info, $($arg)+) };
}

#[macro_export]
macro_rules! mnotice {
    ($handler:expr, $($arg:tt)+) => { $crate::mlog!($handler, $crate::LogLevel::Notice, $($arg)+) };
}

#[macro_export]
macro_rules! mwarning {
    ($handler:expr, $($arg:tt)+) => { $crate::mlog!($handler, $crate::LogLevel::Warning, $($arg)+) };
}

#[macro_export]
macro_rules! merror {
    ($handler:expr, $($arg:tt)+) => { $crate::mlog!($handler, $crate::LogLevel::Error, $($arg)+) };
}

#[macro_export]
macro_rules! mcritical {
    ($handler:expr, $($arg:tt)+) => { $crate::mlog!($handler, $crate::LogLevel::Critical, $($arg)+) };
}
