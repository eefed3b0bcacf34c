use std::{fmt::Display, panic::Location};

pub(crate) mod reexports {
    //! re-exports

    pub use super::CustomWrapErr as _;
    pub use color_eyre::eyre::{bail, ensure, eyre};
    pub use color_eyre::{Report as Error, Result};
}
use reexports::*;

pub trait CustomWrapErr<T> {
    fn wrap_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    fn wrap_err_with<C, F>(self, context: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;

    /// like google map red dot, only record the location info without any context message.
    fn dot(self) -> Result<T>;
}

fn located(context: impl Display, caller: &Location<'_>) -> String {
    format!(
        "{} at `{}:{}:{}`",
        context,
        caller.file(),
        caller.line(),
        caller.column()
    )
}

fn location(caller: &Location<'_>) -> String {
    format!(
        "at `{}:{}:{}`",
        caller.file(),
        caller.line(),
        caller.column()
    )
}

impl<T, E> CustomWrapErr<T> for core::result::Result<T, E>
where
    E: Display,
    core::result::Result<T, E>: color_eyre::eyre::WrapErr<T, E>,
{
    #[inline]
    #[track_caller]
    fn wrap_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        let caller = Location::caller();
        color_eyre::eyre::WrapErr::wrap_err(self, located(context, caller))
    }

    #[inline]
    #[track_caller]
    fn wrap_err_with<C, F>(self, context: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        let caller = Location::caller();
        color_eyre::eyre::WrapErr::wrap_err_with(self, || located(context(), caller))
    }

    #[inline]
    #[track_caller]
    fn dot(self) -> Result<T> {
        let caller = Location::caller();
        color_eyre::eyre::WrapErr::wrap_err(self, location(caller))
    }
}

impl<T> CustomWrapErr<T> for Option<T> {
    #[inline]
    #[track_caller]
    fn wrap_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        let caller = Location::caller();
        self.ok_or_else(|| eyre!(located(context, caller)))
    }

    #[inline]
    #[track_caller]
    fn wrap_err_with<C, F>(self, context: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        let caller = Location::caller();
        self.ok_or_else(|| eyre!(located(context(), caller)))
    }

    #[inline]
    #[track_caller]
    fn dot(self) -> Result<T> {
        let caller = Location::caller();
        self.ok_or_else(|| eyre!("no value {}", location(caller)))
    }
}

#[cfg(test)]
mod tests {
    use super::reexports::*;

    #[test]
    fn wrap_err_records_the_call_site() {
        let res: core::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let report = res.wrap_err("read main.scss").unwrap_err();
        let msg = format!("{report:#}");
        assert!(msg.starts_with("read main.scss at `src/ext/eyre.rs:"), "{msg}");
        assert!(msg.ends_with("gone"), "{msg}");
    }

    #[test]
    fn dot_on_none_is_an_error() {
        let none: Option<u8> = None;
        let msg = none.dot().unwrap_err().to_string();
        assert!(msg.starts_with("no value at `src/ext/eyre.rs:"), "{msg}");
    }
}
