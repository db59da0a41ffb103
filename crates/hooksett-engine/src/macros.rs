//! Convenience macros for building call arguments.

/// Macro for quickly building [`Args`](crate::tracking::Args).
///
/// # Example
/// ```rust,ignore
/// let args = args! {
///     "learning_rate" => 0.2,
///     "epochs" => 5u32,
/// };
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::tracking::Args::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let args = $crate::tracking::Args::new();
        $(
            let args = args.with($name, $value);
        )+
        args
    }};
}
