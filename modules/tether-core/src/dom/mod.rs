//! DOM object proxies. Each proxy turns method calls into one JavaScript
//! statement on its receiver (`ele1`, `window`, `localStorage`, ...).
//!
//! All variants compose the same [`DomProxy`]; typed helpers are generated
//! from method tables with the macros below.

/// Typed methods that forward their arguments as-is.
///
/// `fn_name => "jsName"(arg: Type, ...);`
macro_rules! proxy_methods {
    ($( $(#[$meta:meta])* $fn_name:ident => $js:literal ( $($arg:ident : $ty:ty),* ); )*) => {
        $(
            $(#[$meta])*
            pub fn $fn_name(mut self, $($arg: $ty),*) -> $crate::error::EngineResult<Self> {
                self.proxy.call_method($js, &[$(::serde_json::Value::from($arg)),*])?;
                Ok(self)
            }
        )*
    };
}

/// Typed methods with one optional string argument, omitted when `None`.
macro_rules! optional_arg_methods {
    ($( $(#[$meta:meta])* $fn_name:ident => $js:literal; )*) => {
        $(
            $(#[$meta])*
            pub fn $fn_name(mut self, arg: Option<&str>) -> $crate::error::EngineResult<Self> {
                match arg {
                    Some(arg) if !arg.is_empty() => {
                        self.proxy.call_method($js, &[::serde_json::Value::from(arg)])?
                    }
                    _ => self.proxy.call_method($js, &[])?,
                };
                Ok(self)
            }
        )*
    };
}

mod console;
mod jquery;
mod location;
mod proxy;
mod storage;
mod window;

pub use console::Console;
pub use jquery::JQuery;
pub use location::Location;
pub use proxy::DomProxy;
pub use storage::{InstanceStorage, WebStorage};
pub use window::Window;

/// Unique JavaScript identifier, for window handles and timers that the
/// caller didn't name.
pub(crate) fn unique_name(prefix: &str) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &token[..13])
}
